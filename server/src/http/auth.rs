//! Bearer authentication: user JWTs and the internal service key.

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::acl::UserRole;

//////////////////////////////////////////////////
// Data structs
//////////////////////////////////////////////////

/// Secrets the extractors validate against, registered as app data.
#[derive(Debug, Clone)]
pub struct AuthKeys {
    pub jwt_secret: String,
    pub internal_api_key: String,
}

/// Access-token payload minted by the auth service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i32,
    pub role: UserRole,
    pub exp: usize,
}

/// Mints an HS256 access token; the platform's auth service does the same.
pub fn issue_token(
    secret: &str,
    user_id: i32,
    role: UserRole,
    ttl: Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    let exp = (Utc::now() + ttl).timestamp().max(0) as usize;
    encode(
        &Header::default(),
        &Claims { user_id, role, exp },
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

//////////////////////////////////////////////////
// ─────────────  Extractors  ─────────────
//////////////////////////////////////////////////

pub mod extractor {
    use super::{AuthKeys, Claims};
    use crate::acl::{Permission, UserRole};
    use crate::error::TeamError;
    use actix_web::{
        dev::Payload, error::ErrorUnauthorized, web, FromRequest, HttpRequest,
        Result as ActixResult,
    };
    use futures_util::future::{ready, Ready};
    use jsonwebtoken::{decode, DecodingKey, Validation};

    fn bearer(req: &HttpRequest) -> ActixResult<&str> {
        // Expect:  Authorization: Bearer <token>
        let hdr = req
            .headers()
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ErrorUnauthorized("missing Authorization header"))?;
        hdr.strip_prefix("Bearer ")
            .ok_or_else(|| ErrorUnauthorized("malformed Authorization header"))
    }

    fn keys(req: &HttpRequest) -> ActixResult<&AuthKeys> {
        req.app_data::<web::Data<AuthKeys>>()
            .map(|k| k.get_ref())
            .ok_or_else(|| ErrorUnauthorized("server mis-config"))
    }

    /// Validated actor of a user-facing request.
    #[derive(Debug, Clone)]
    pub struct JwtAuth {
        pub user_id: i32,
        pub role: UserRole,
    }

    impl JwtAuth {
        pub fn require(&self, permission: Permission) -> Result<(), TeamError> {
            if permission.allows(self.role) {
                Ok(())
            } else {
                Err(TeamError::Forbidden)
            }
        }
    }

    impl FromRequest for JwtAuth {
        type Error = actix_web::Error;
        type Future = Ready<ActixResult<Self, Self::Error>>;

        fn from_request(req: &HttpRequest, _pl: &mut Payload) -> Self::Future {
            let res = (|| {
                let token = bearer(req)?;
                let secret = &keys(req)?.jwt_secret;
                let data = decode::<Claims>(
                    token,
                    &DecodingKey::from_secret(secret.as_bytes()),
                    &Validation::default(),
                )
                .map_err(|_| ErrorUnauthorized("invalid / expired token"))?;

                Ok(JwtAuth {
                    user_id: data.claims.user_id,
                    role: data.claims.role,
                })
            })();

            ready(res)
        }
    }

    /// Caller presented the shared internal API key.
    #[derive(Debug, Clone, Copy)]
    pub struct InternalKey;

    impl FromRequest for InternalKey {
        type Error = actix_web::Error;
        type Future = Ready<ActixResult<Self, Self::Error>>;

        fn from_request(req: &HttpRequest, _pl: &mut Payload) -> Self::Future {
            let res = (|| {
                let token = bearer(req)?;
                if token != keys(req)?.internal_api_key {
                    return Err(ErrorUnauthorized("invalid api key"));
                }
                Ok(InternalKey)
            })();

            ready(res)
        }
    }
}
pub use extractor::{InternalKey, JwtAuth};
