//! Best-effort attachment of live user profile data. Never fails.

use std::collections::HashMap;

use super::dto::MateView;
use crate::clients::UserDirectory;

pub async fn mate(users: &dyn UserDirectory, view: MateView) -> MateView {
    let profile = users.try_get_user(view.user_id).await;
    view.with_profile(profile.as_ref())
}

/// One batched lookup for the whole list.
pub async fn mates(users: &dyn UserDirectory, views: Vec<MateView>) -> Vec<MateView> {
    if views.is_empty() {
        return views;
    }
    let ids: Vec<i32> = views.iter().map(|v| v.user_id).collect();
    let profiles: HashMap<_, _> = users
        .try_get_users_many(&ids)
        .await
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    views
        .into_iter()
        .map(|v| {
            let profile = profiles.get(&v.user_id);
            v.with_profile(profile)
        })
        .collect()
}
