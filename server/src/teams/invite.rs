use std::sync::Arc;

use async_trait::async_trait;

use super::dto::{InviteView, MateView};
use super::{on_conflict, MateEngine, TeamEngine};
use crate::clients::UserDirectory;
use crate::db::models::TeamInvite;
use crate::db::{constraint, InviteStore, StoreError};
use crate::error::TeamError;
use crate::events::{EventHandler, InboundEvent};

/// Pending invitations into brand teams.
pub struct InviteEngine {
    store: Arc<dyn InviteStore>,
    teams: Arc<TeamEngine>,
    mates: Arc<MateEngine>,
    users: Arc<dyn UserDirectory>,
}

impl InviteEngine {
    pub fn new(
        store: Arc<dyn InviteStore>,
        teams: Arc<TeamEngine>,
        mates: Arc<MateEngine>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            store,
            teams,
            mates,
            users,
        }
    }

    pub async fn invite(&self, team_id: i32, user_id: i32) -> Result<InviteView, TeamError> {
        if !self
            .users
            .exists(user_id)
            .await
            .map_err(TeamError::user_lookup)?
        {
            return Err(TeamError::UserNotFound);
        }
        if self.store.find_invite(team_id, user_id).await?.is_some() {
            return Err(TeamError::AlreadyInvited);
        }
        if self.mates.find(user_id).await?.is_some() {
            return Err(TeamError::AlreadyMember);
        }

        let invite = self
            .store
            .insert_invite(team_id, user_id)
            .await
            .map_err(|e| match e {
                StoreError::MissingParent(_) => TeamError::TeamNotFound,
                other => on_conflict(constraint::TEAM_INVITE, TeamError::AlreadyInvited)(other),
            })?;
        log::info!("user {user_id} invited to team {team_id}");

        let team_name = self.teams.find(team_id).await?.map(|t| t.name);
        let user_name = self
            .users
            .try_get_user(user_id)
            .await
            .map(|p| p.formatted_name);
        Ok(InviteView {
            team_id: invite.team_id,
            user_id: invite.user_id,
            team_name,
            user_name,
        })
    }

    pub async fn list_for_user(&self, user_id: i32) -> Result<Vec<InviteView>, TeamError> {
        let invites = self.store.invites_for_user(user_id).await?;
        if invites.is_empty() {
            return Ok(Vec::new());
        }
        let names = self.teams.name_map().await?;
        Ok(invites
            .into_iter()
            .map(|TeamInvite { team_id, user_id }| InviteView {
                team_id,
                user_id,
                team_name: names.get(&team_id).cloned(),
                user_name: None,
            })
            .collect())
    }

    pub async fn decline(&self, team_id: i32, user_id: i32) -> Result<(), TeamError> {
        if !self.store.delete_invite(team_id, user_id).await? {
            return Err(TeamError::NoSuchInvite);
        }
        Ok(())
    }

    /// Joins the team, then discards every pending invite of the user. A failed
    /// join leaves the invites untouched.
    pub async fn accept(&self, team_id: i32, user_id: i32) -> Result<MateView, TeamError> {
        if self.store.find_invite(team_id, user_id).await?.is_none() {
            return Err(TeamError::NoSuchInvite);
        }
        let mate = self.mates.add(team_id, user_id, false).await?;
        let purged = self.clear_for_user(user_id).await?;
        log::debug!("accepted invite into team {team_id}; {purged} invites of user {user_id} cleared");
        Ok(mate)
    }

    pub async fn clear_for_user(&self, user_id: i32) -> Result<u64, TeamError> {
        Ok(self.store.delete_invites_for_user(user_id).await?)
    }
}

#[async_trait]
impl EventHandler for InviteEngine {
    fn name(&self) -> &'static str {
        "invites"
    }

    async fn handle(&self, event: &InboundEvent) {
        let Some(user_id) = event.departed_user() else {
            return;
        };
        if let Err(e) = self.clear_for_user(user_id).await {
            log::warn!("invite cleanup for user {user_id} failed: {e}");
        }
    }
}
