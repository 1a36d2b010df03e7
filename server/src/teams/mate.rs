use std::sync::Arc;

use super::dto::MateView;
use super::{enrich, on_conflict};
use crate::acl::Permission;
use crate::clients::{Profile, UserDirectory};
use crate::db::models::{NewMate, TeamMate};
use crate::db::{constraint, BrandTeamStore, StoreError};
use crate::error::TeamError;

/// Brand-team memberships. One per user across all teams.
pub struct MateEngine {
    store: Arc<dyn BrandTeamStore>,
    users: Arc<dyn UserDirectory>,
}

impl MateEngine {
    pub fn new(store: Arc<dyn BrandTeamStore>, users: Arc<dyn UserDirectory>) -> Self {
        Self { store, users }
    }

    pub async fn find(&self, user_id: i32) -> Result<Option<TeamMate>, TeamError> {
        Ok(self.store.find_mate(user_id).await?)
    }

    pub async fn get(&self, user_id: i32) -> Result<Option<MateView>, TeamError> {
        match self.find(user_id).await? {
            Some(mate) => Ok(Some(enrich::mate(self.users.as_ref(), MateView::from(&mate)).await)),
            None => Ok(None),
        }
    }

    pub async fn members(&self, team_id: i32) -> Result<Vec<TeamMate>, TeamError> {
        Ok(self.store.list_mates(team_id).await?)
    }

    pub async fn list(&self, team_id: i32) -> Result<Vec<MateView>, TeamError> {
        let views = self.members(team_id).await?.iter().map(MateView::from).collect();
        Ok(enrich::mates(self.users.as_ref(), views).await)
    }

    pub async fn count(&self, team_id: i32) -> Result<i64, TeamError> {
        Ok(self.store.count_mates(team_id).await?)
    }

    pub async fn captains(&self, team_id: i32) -> Result<Vec<MateView>, TeamError> {
        let views = self
            .store
            .list_captains(team_id)
            .await?
            .iter()
            .map(MateView::from)
            .collect();
        Ok(enrich::mates(self.users.as_ref(), views).await)
    }

    /// Checks that `user_id` may join a team right now and returns their live
    /// profile.
    pub async fn admit(&self, user_id: i32) -> Result<Profile, TeamError> {
        if self.find(user_id).await?.is_some() {
            return Err(TeamError::AlreadyMember);
        }
        let profile = self
            .users
            .get_user(user_id)
            .await
            .map_err(TeamError::user_lookup)?;
        if !Permission::CanBeInTeam.allows(profile.role) {
            return Err(TeamError::IneligibleRole);
        }
        Ok(profile)
    }

    pub async fn add(
        &self,
        team_id: i32,
        user_id: i32,
        is_captain: bool,
    ) -> Result<MateView, TeamError> {
        let profile = self.admit(user_id).await?;
        let mate = self
            .store
            .insert_mate(
                team_id,
                NewMate {
                    user_id,
                    is_captain,
                    role_desc: None,
                },
            )
            .await
            .map_err(|e| match e {
                StoreError::MissingParent(_) => TeamError::TeamNotFound,
                other => on_conflict(constraint::TEAM_MATE_USER, TeamError::AlreadyMember)(other),
            })?;
        log::info!("user {user_id} joined team {team_id}");
        Ok(MateView::from(&mate).with_profile(Some(&profile)))
    }

    /// Deletes the membership; the team goes with its last one.
    pub async fn remove(&self, user_id: i32, silent: bool) -> Result<MateView, TeamError> {
        let removal = self
            .store
            .remove_mate(user_id)
            .await?
            .ok_or(TeamError::NotAMember)?;
        if let Some(team) = &removal.dissolved {
            log::info!("team {} ({}) dissolved after its last member left", team.id, team.name);
        }

        let view = MateView::from(&removal.mate);
        if silent {
            Ok(view)
        } else {
            Ok(enrich::mate(self.users.as_ref(), view).await)
        }
    }

    pub async fn set_captain(&self, user_id: i32, is_captain: bool) -> Result<MateView, TeamError> {
        let mate = self
            .store
            .set_mate_captain(user_id, is_captain)
            .await?
            .ok_or(TeamError::NotAMember)?;
        Ok(enrich::mate(self.users.as_ref(), MateView::from(&mate)).await)
    }

    pub async fn set_role_description(
        &self,
        user_id: i32,
        role_desc: Option<&str>,
    ) -> Result<MateView, TeamError> {
        let mate = self
            .store
            .set_mate_role(user_id, role_desc)
            .await?
            .ok_or(TeamError::NotAMember)?;
        Ok(enrich::mate(self.users.as_ref(), MateView::from(&mate)).await)
    }
}
