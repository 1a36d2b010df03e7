use std::sync::Arc;

use async_trait::async_trait;

use super::dto::{HackathonTeamView, HackathonTeamWithMates, MateView, SubmissionView};
use super::{enrich, MateEngine, SubmissionEngine, TeamEngine};
use crate::clients::{HackathonDirectory, UserDirectory};
use crate::db::models::{CapacityBreach, HackathonTeam, HackathonTeamMate, NewMate};
use crate::db::{constraint, HackathonTeamStore, StoreError};
use crate::error::TeamError;
use crate::events::{EventHandler, EventPublisher, InboundEvent, OutboundEvent};
use crate::metrics;

fn breach(b: CapacityBreach) -> TeamError {
    match b {
        CapacityBreach::TeamSize => TeamError::TeamTooLarge,
        CapacityBreach::Participants => TeamError::HackathonFull,
    }
}

fn seat_error(err: StoreError) -> TeamError {
    match err {
        StoreError::Capacity(b) => breach(b),
        StoreError::MissingParent(_) => TeamError::TeamNotFound,
        e if e.is_conflict_on(constraint::HACKATHON_TEAM_NAME) => TeamError::AlreadyParticipating,
        e if e.is_conflict_on(constraint::HACKATHON_SEAT)
            || e.is_conflict_on(constraint::HACKATHON_TEAM_PAIR) =>
        {
            TeamError::AlreadyParticipatingInHackathon
        }
        other => TeamError::Store(other),
    }
}

/// Teams registered for a single hackathon, built from a brand team's roster.
pub struct HackathonTeamEngine {
    store: Arc<dyn HackathonTeamStore>,
    teams: Arc<TeamEngine>,
    mates: Arc<MateEngine>,
    submissions: Arc<SubmissionEngine>,
    hackathons: Arc<dyn HackathonDirectory>,
    users: Arc<dyn UserDirectory>,
    publisher: Arc<dyn EventPublisher>,
}

impl HackathonTeamEngine {
    pub fn new(
        store: Arc<dyn HackathonTeamStore>,
        teams: Arc<TeamEngine>,
        mates: Arc<MateEngine>,
        submissions: Arc<SubmissionEngine>,
        hackathons: Arc<dyn HackathonDirectory>,
        users: Arc<dyn UserDirectory>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            store,
            teams,
            mates,
            submissions,
            hackathons,
            users,
            publisher,
        }
    }

    async fn ensure_registry_open(&self, hackathon_id: i32) -> Result<(), TeamError> {
        let open = self
            .hackathons
            .can_edit_team_registry(hackathon_id)
            .await
            .map_err(TeamError::hackathon_lookup)?;
        if open {
            Ok(())
        } else {
            Err(TeamError::RegistryClosed)
        }
    }

    async fn announce_deleted(&self, team: &HackathonTeam) {
        let event = OutboundEvent::HackathonTeamDeleted(team.clone());
        if let Err(e) = self.publisher.publish(&event).await {
            log::warn!("could not announce deletion of hackathon team {}: {e}", team.id);
        }
    }

    /// Registers `brand_team_id` for the hackathon with the subset of its
    /// members listed in `member_user_ids`. Captaincy and role descriptions are
    /// copied as they are now.
    pub async fn create(
        &self,
        brand_team_id: i32,
        hackathon_id: i32,
        member_user_ids: &[i32],
    ) -> Result<HackathonTeamWithMates, TeamError> {
        if member_user_ids.is_empty() {
            return Err(TeamError::EmptyTeam);
        }
        self.ensure_registry_open(hackathon_id).await?;

        let hackathon = self
            .hackathons
            .get_hackathon(hackathon_id)
            .await
            .map_err(TeamError::hackathon_lookup)?;
        let brand = self.teams.get_info(brand_team_id).await?;

        // One registration per brand team, tracked through the team name.
        if self.store.team_name_taken(&brand.name, hackathon_id).await? {
            return Err(TeamError::AlreadyParticipating);
        }

        let selected: Vec<&MateView> = brand
            .mates
            .iter()
            .filter(|m| member_user_ids.contains(&m.user_id))
            .collect();
        for mate in &selected {
            if self.store.find_mate(mate.user_id, hackathon_id).await?.is_some() {
                return Err(TeamError::AlreadyParticipatingInHackathon);
            }
        }
        if selected.is_empty() {
            return Err(TeamError::EmptyTeam);
        }
        if !selected.iter().any(|m| m.is_captain) {
            return Err(TeamError::NoCaptain);
        }

        let capacity = hackathon.capacity();
        let size = selected.len() as i64;
        let registered = self.store.count_participants(hackathon_id).await?;
        capacity.check(size, registered + size).map_err(breach)?;

        let seats: Vec<NewMate> = selected
            .iter()
            .map(|m| NewMate {
                user_id: m.user_id,
                is_captain: m.is_captain,
                role_desc: m.role_desc.clone(),
            })
            .collect();
        let (team, rows) = self
            .store
            .register_team(hackathon_id, &brand.name, &seats, capacity)
            .await
            .map_err(seat_error)?;
        metrics::record_registration();
        log::info!(
            "brand team {brand_team_id} registered for hackathon {hackathon_id} as team {} with {} members",
            team.id,
            rows.len()
        );

        let views = rows.iter().map(MateView::from).collect();
        Ok(HackathonTeamWithMates {
            team: HackathonTeamView::new(team, Some(hackathon.name), None),
            mates: enrich::mates(self.users.as_ref(), views).await,
        })
    }

    /// Seats a member of `from_brand_team_id` in an existing hackathon team,
    /// inheriting their brand captaincy and role.
    pub async fn add_member(
        &self,
        from_brand_team_id: i32,
        to_team_id: i32,
        user_id: i32,
    ) -> Result<MateView, TeamError> {
        let team = self
            .store
            .find_team(to_team_id)
            .await?
            .ok_or(TeamError::TeamNotFound)?;
        self.ensure_registry_open(team.hackathon_id).await?;

        let brand_mate = self.mates.find(user_id).await?.ok_or(TeamError::NotAMember)?;
        if brand_mate.team_id != from_brand_team_id {
            return Err(TeamError::Mismatch);
        }
        if self.store.find_mate(user_id, team.hackathon_id).await?.is_some() {
            return Err(TeamError::AlreadyParticipatingInHackathon);
        }

        let capacity = self
            .hackathons
            .get_hackathon(team.hackathon_id)
            .await
            .map_err(TeamError::hackathon_lookup)?
            .capacity();
        let size = self.store.count_mates(team.id).await?;
        let registered = self.store.count_participants(team.hackathon_id).await?;
        capacity.check(size + 1, registered + 1).map_err(breach)?;

        let mate = self
            .store
            .add_mate(&team, NewMate::from(&brand_mate), capacity)
            .await
            .map_err(seat_error)?;
        log::info!("user {user_id} joined hackathon team {}", team.id);
        Ok(enrich::mate(self.users.as_ref(), MateView::from(&mate)).await)
    }

    /// Leave or kick. The last member takes the team with them.
    pub async fn remove_member(
        &self,
        hackathon_id: i32,
        user_id: i32,
        silent: bool,
    ) -> Result<MateView, TeamError> {
        if self.store.find_mate(user_id, hackathon_id).await?.is_none() {
            return Err(TeamError::NotAMember);
        }
        self.ensure_registry_open(hackathon_id).await?;
        let mate = self.detach(hackathon_id, user_id).await?;

        let view = MateView::from(&mate);
        if silent {
            Ok(view)
        } else {
            Ok(enrich::mate(self.users.as_ref(), view).await)
        }
    }

    async fn detach(&self, hackathon_id: i32, user_id: i32) -> Result<HackathonTeamMate, TeamError> {
        let removal = self
            .store
            .remove_mate(hackathon_id, user_id)
            .await?
            .ok_or(TeamError::NotAMember)?;
        if let Some(team) = &removal.dissolved {
            log::info!("hackathon team {} ({}) dissolved after its last member left", team.id, team.name);
            self.announce_deleted(team).await;
        }
        Ok(removal.mate)
    }

    pub async fn set_captain(
        &self,
        hackathon_id: i32,
        user_id: i32,
        is_captain: bool,
    ) -> Result<MateView, TeamError> {
        let mate = self
            .store
            .find_mate(user_id, hackathon_id)
            .await?
            .ok_or(TeamError::NotAMember)?;
        self.ensure_registry_open(hackathon_id).await?;
        if !is_captain
            && mate.is_captain
            && self.store.list_captains(mate.team_id).await?.len() <= 1
        {
            return Err(TeamError::LastCaptain);
        }

        let mate = self
            .store
            .set_mate_captain(hackathon_id, user_id, is_captain)
            .await?
            .ok_or(TeamError::NotAMember)?;
        Ok(enrich::mate(self.users.as_ref(), MateView::from(&mate)).await)
    }

    pub async fn set_role_description(
        &self,
        hackathon_id: i32,
        user_id: i32,
        role_desc: Option<&str>,
    ) -> Result<MateView, TeamError> {
        if self.store.find_mate(user_id, hackathon_id).await?.is_none() {
            return Err(TeamError::NotAMember);
        }
        self.ensure_registry_open(hackathon_id).await?;

        let mate = self
            .store
            .set_mate_role(hackathon_id, user_id, role_desc)
            .await?
            .ok_or(TeamError::NotAMember)?;
        Ok(enrich::mate(self.users.as_ref(), MateView::from(&mate)).await)
    }

    pub async fn get_mate(&self, user_id: i32, hackathon_id: i32) -> Result<MateView, TeamError> {
        let mate = self
            .store
            .find_mate(user_id, hackathon_id)
            .await?
            .ok_or(TeamError::NotAMember)?;
        Ok(enrich::mate(self.users.as_ref(), MateView::from(&mate)).await)
    }

    /// Fails `NotYourMate` unless both users sit in the same team of this
    /// hackathon.
    pub async fn ensure_teammates(
        &self,
        hackathon_id: i32,
        actor_user_id: i32,
        target_user_id: i32,
    ) -> Result<HackathonTeamMate, TeamError> {
        let actor = self
            .store
            .find_mate(actor_user_id, hackathon_id)
            .await?
            .ok_or(TeamError::NotAMember)?;
        let target = self
            .store
            .find_mate(target_user_id, hackathon_id)
            .await?
            .ok_or(TeamError::NotAMember)?;
        if actor.team_id != target.team_id {
            return Err(TeamError::NotYourMate);
        }
        Ok(target)
    }

    async fn submission_of(&self, team: &HackathonTeam) -> Result<Option<SubmissionView>, TeamError> {
        self.submissions.get(team.hackathon_id, team.id).await
    }

    pub async fn get_by_id(&self, team_id: i32) -> Result<HackathonTeamView, TeamError> {
        let team = self
            .store
            .find_team(team_id)
            .await?
            .ok_or(TeamError::TeamNotFound)?;
        let hackathon_name = self
            .hackathons
            .try_get_hackathon(team.hackathon_id)
            .await
            .map(|h| h.name);
        let submission = self.submission_of(&team).await?;
        Ok(HackathonTeamView::new(team, hackathon_name, submission))
    }

    pub async fn list_mates(&self, team_id: i32) -> Result<Vec<MateView>, TeamError> {
        let views = self
            .store
            .list_mates(team_id)
            .await?
            .iter()
            .map(MateView::from)
            .collect();
        Ok(enrich::mates(self.users.as_ref(), views).await)
    }

    /// Team, enriched roster, submission and hackathon name in one view.
    pub async fn get_total(&self, team_id: i32) -> Result<HackathonTeamWithMates, TeamError> {
        let team = self.get_by_id(team_id).await?;
        let mates = self.list_mates(team_id).await?;
        Ok(HackathonTeamWithMates { team, mates })
    }

    pub async fn list_for_hackathon(
        &self,
        hackathon_id: i32,
    ) -> Result<Vec<HackathonTeamView>, TeamError> {
        let teams = self.store.teams_for_hackathon(hackathon_id).await?;
        if teams.is_empty() {
            return Ok(Vec::new());
        }
        let hackathon_name = self
            .hackathons
            .try_get_hackathon(hackathon_id)
            .await
            .map(|h| h.name);

        let mut views = Vec::with_capacity(teams.len());
        for team in teams {
            let submission = self.submission_of(&team).await?;
            views.push(HackathonTeamView::new(team, hackathon_name.clone(), submission));
        }
        Ok(views)
    }

    /// Teams by id across hackathons; unknown ids are skipped.
    pub async fn list_many(&self, team_ids: &[i32]) -> Result<Vec<HackathonTeamView>, TeamError> {
        let mut views = Vec::new();
        for team in self.store.teams_by_ids(team_ids).await? {
            let submission = self.submission_of(&team).await?;
            views.push(HackathonTeamView::new(team, None, submission));
        }
        Ok(views)
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

    pub async fn registered_count(&self, hackathon_id: i32) -> Result<i64, TeamError> {
        Ok(self.store.count_participants(hackathon_id).await?)
    }

    pub async fn delete_team(&self, team_id: i32) -> Result<HackathonTeam, TeamError> {
        let team = self
            .store
            .delete_team(team_id)
            .await?
            .ok_or(TeamError::TeamNotFound)?;
        log::info!("hackathon team {} ({}) deleted", team.id, team.name);
        self.announce_deleted(&team).await;
        Ok(team)
    }

    /// Drops every seat of a departed user. Runs regardless of registry state;
    /// one failed seat does not stop the rest.
    async fn forget_user(&self, user_id: i32) -> Result<(), StoreError> {
        for seat in self.store.mates_of_user(user_id).await? {
            match self.detach(seat.hackathon_id, user_id).await {
                Ok(_) | Err(TeamError::NotAMember) => {}
                Err(e) => log::warn!(
                    "could not remove user {user_id} from hackathon {}: {e}",
                    seat.hackathon_id
                ),
            }
        }
        Ok(())
    }
}

#[async_trait]
impl EventHandler for HackathonTeamEngine {
    fn name(&self) -> &'static str {
        "hackathon-teams"
    }

    async fn handle(&self, event: &InboundEvent) {
        if let Some(user_id) = event.departed_user() {
            if let Err(e) = self.forget_user(user_id).await {
                log::warn!("hackathon team cleanup for user {user_id} failed: {e}");
            }
            return;
        }
        if let InboundEvent::HackathonDeleted { id } = *event {
            match self.store.delete_teams_for_hackathon(id).await {
                Ok(n) => log::info!("deleted {n} teams of removed hackathon {id}"),
                Err(e) => log::warn!("team cleanup for hackathon {id} failed: {e}"),
            }
        }
    }
}
