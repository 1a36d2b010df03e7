use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use super::dto::{MateView, TeamView};
use super::{on_conflict, MateEngine};
use crate::db::models::Team;
use crate::db::{constraint, BrandTeamStore, StoreError};
use crate::error::TeamError;
use crate::events::{EventHandler, InboundEvent};

/// Brand-team identity: creation, naming, lookup and roster changes that must
/// respect the captaincy rule.
pub struct TeamEngine {
    store: Arc<dyn BrandTeamStore>,
    mates: Arc<MateEngine>,
}

impl TeamEngine {
    pub fn new(store: Arc<dyn BrandTeamStore>, mates: Arc<MateEngine>) -> Self {
        Self { store, mates }
    }

    /// Creates the team with `captain_user_id` as its first member and captain.
    pub async fn create(&self, name: &str, captain_user_id: i32) -> Result<TeamView, TeamError> {
        let profile = self.mates.admit(captain_user_id).await?;
        let (team, captain) = self
            .store
            .create_team_with_captain(name, captain_user_id)
            .await
            .map_err(|e| {
                if e.is_conflict_on(constraint::TEAM_MATE_USER) {
                    TeamError::AlreadyMember
                } else {
                    on_conflict(constraint::TEAM_NAME, TeamError::NameAlreadyUsed)(e)
                }
            })?;
        log::info!("team {} ({}) created by user {captain_user_id}", team.id, team.name);

        let captain = MateView::from(&captain).with_profile(Some(&profile));
        Ok(TeamView::new(team, vec![captain]))
    }

    pub async fn rename(&self, team_id: i32, name: &str) -> Result<Team, TeamError> {
        self.store
            .rename_team(team_id, name)
            .await
            .map_err(on_conflict(constraint::TEAM_NAME, TeamError::NameAlreadyUsed))?
            .ok_or(TeamError::TeamNotFound)
    }

    /// Removes the team together with its memberships and invites.
    pub async fn delete(&self, team_id: i32) -> Result<(), TeamError> {
        if !self.store.delete_team(team_id).await? {
            return Err(TeamError::TeamNotFound);
        }
        log::info!("team {team_id} deleted");
        Ok(())
    }

    pub async fn find(&self, team_id: i32) -> Result<Option<Team>, TeamError> {
        Ok(self.store.find_team(team_id).await?)
    }

    pub async fn exists(&self, team_id: i32) -> Result<bool, TeamError> {
        Ok(self.find(team_id).await?.is_some())
    }

    pub async fn get_info(&self, team_id: i32) -> Result<TeamView, TeamError> {
        let team = self.find(team_id).await?.ok_or(TeamError::TeamNotFound)?;
        let mates = self.mates.list(team_id).await?;
        Ok(TeamView::new(team, mates))
    }

    pub async fn get_by_member(&self, user_id: i32) -> Result<TeamView, TeamError> {
        let mate = self
            .mates
            .find(user_id)
            .await?
            .ok_or(TeamError::UserNotInTeam)?;
        self.get_info(mate.team_id).await
    }

    /// The team `user_id` captains.
    pub async fn get_by_captain(&self, user_id: i32) -> Result<Team, TeamError> {
        let mate = self
            .mates
            .find(user_id)
            .await?
            .ok_or(TeamError::UserNotInTeam)?;
        if !mate.is_captain {
            return Err(TeamError::UserIsNotOwner);
        }
        self.find(mate.team_id).await?.ok_or(TeamError::TeamNotFound)
    }

    pub async fn list_all(&self) -> Result<Vec<Team>, TeamError> {
        Ok(self.store.list_teams().await?)
    }

    pub async fn name_map(&self) -> Result<HashMap<i32, String>, TeamError> {
        Ok(self
            .list_all()
            .await?
            .into_iter()
            .map(|t| (t.id, t.name))
            .collect())
    }

    /// Leave (`within = None`) or kick from the captain's team. The only
    /// captain cannot leave while others stay; the last member takes the team
    /// with them.
    pub async fn remove_member(
        &self,
        user_id: i32,
        within: Option<i32>,
    ) -> Result<MateView, TeamError> {
        let mate = self.mates.find(user_id).await?.ok_or(TeamError::NotAMember)?;
        if within.is_some_and(|team_id| team_id != mate.team_id) {
            return Err(TeamError::NotYourMate);
        }
        if mate.is_captain {
            let captains = self.store.list_captains(mate.team_id).await?;
            let size = self.store.count_mates(mate.team_id).await?;
            if captains.len() <= 1 && size > 1 {
                return Err(TeamError::LastCaptain);
            }
        }
        self.mates.remove(user_id, false).await
    }

    pub async fn set_captain(
        &self,
        team_id: i32,
        user_id: i32,
        is_captain: bool,
    ) -> Result<MateView, TeamError> {
        let mate = self.mates.find(user_id).await?.ok_or(TeamError::NotAMember)?;
        if mate.team_id != team_id {
            return Err(TeamError::NotYourMate);
        }
        if !is_captain && mate.is_captain && self.store.list_captains(team_id).await?.len() <= 1 {
            return Err(TeamError::LastCaptain);
        }
        self.mates.set_captain(user_id, is_captain).await
    }

    /// Silent removal for users gone upstream; the captaincy rule does not
    /// apply and redelivery is a no-op.
    async fn forget_user(&self, user_id: i32) -> Result<(), StoreError> {
        if let Some(removal) = self.store.remove_mate(user_id).await? {
            log::info!(
                "removed departed user {user_id} from team {}",
                removal.mate.team_id
            );
        }
        Ok(())
    }
}

#[async_trait]
impl EventHandler for TeamEngine {
    fn name(&self) -> &'static str {
        "brand-teams"
    }

    async fn handle(&self, event: &InboundEvent) {
        let Some(user_id) = event.departed_user() else {
            return;
        };
        if let Err(e) = self.forget_user(user_id).await {
            log::warn!("brand team cleanup for user {user_id} failed: {e}");
        }
    }
}
