#![allow(clippy::significant_drop_tightening)]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::constraint;
use super::models::{
    Capacity, HackathonTeam, HackathonTeamMate, NewMate, NewSubmission, Removal, Submission, Team,
    TeamInvite, TeamMate,
};
use super::store::{BrandTeamStore, HackathonTeamStore, InviteStore, StoreError, SubmissionStore};

#[derive(Default)]
struct State {
    teams: BTreeMap<i32, Team>,
    /// keyed by user id: one brand membership per user
    mates: BTreeMap<i32, TeamMate>,
    invites: BTreeSet<(i32, i32)>,
    hackathon_teams: BTreeMap<i32, HackathonTeam>,
    /// keyed by (hackathon_id, user_id)
    hackathon_mates: BTreeMap<(i32, i32), HackathonTeamMate>,
    /// keyed by (team_id, hackathon_id)
    submissions: BTreeMap<(i32, i32), Submission>,
}

impl State {
    fn drop_brand_team(&mut self, team_id: i32) -> Option<Team> {
        let team = self.teams.remove(&team_id)?;
        self.mates.retain(|_, m| m.team_id != team_id);
        self.invites.retain(|(t, _)| *t != team_id);
        Some(team)
    }

    fn drop_hackathon_team(&mut self, team_id: i32) -> Option<HackathonTeam> {
        let team = self.hackathon_teams.remove(&team_id)?;
        self.hackathon_mates.retain(|_, m| m.team_id != team_id);
        self.submissions.retain(|(t, _), _| *t != team_id);
        Some(team)
    }

    fn hackathon_team_size(&self, team_id: i32) -> i64 {
        self.hackathon_mates
            .values()
            .filter(|m| m.team_id == team_id)
            .count() as i64
    }

    fn participants(&self, hackathon_id: i32) -> i64 {
        self.hackathon_mates
            .keys()
            .filter(|(h, _)| *h == hackathon_id)
            .count() as i64
    }
}

/// Process-local store with the same uniqueness and cascade rules as the
/// Postgres schema. Every compound mutation runs under one write lock.
pub struct MemoryStore {
    state: RwLock<State>,
    next_team_id: AtomicI32,
    next_hackathon_team_id: AtomicI32,
    next_submission_id: AtomicI32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::default()),
            next_team_id: AtomicI32::new(1),
            next_hackathon_team_id: AtomicI32::new(1),
            next_submission_id: AtomicI32::new(1),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, StoreError> {
        self.state.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, StoreError> {
        self.state.write().map_err(|_| StoreError::Poisoned)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BrandTeamStore for MemoryStore {
    async fn create_team_with_captain(
        &self,
        name: &str,
        captain_user_id: i32,
    ) -> Result<(Team, TeamMate), StoreError> {
        let mut state = self.write()?;
        if state.teams.values().any(|t| t.name == name) {
            return Err(StoreError::Conflict(constraint::TEAM_NAME.into()));
        }
        if state.mates.contains_key(&captain_user_id) {
            return Err(StoreError::Conflict(constraint::TEAM_MATE_USER.into()));
        }

        let id = self.next_team_id.fetch_add(1, Ordering::SeqCst);
        let team = Team {
            id,
            name: name.to_owned(),
        };
        let captain = TeamMate {
            team_id: id,
            user_id: captain_user_id,
            is_captain: true,
            role_desc: None,
        };
        state.teams.insert(id, team.clone());
        state.mates.insert(captain_user_id, captain.clone());
        Ok((team, captain))
    }

    async fn find_team(&self, team_id: i32) -> Result<Option<Team>, StoreError> {
        Ok(self.read()?.teams.get(&team_id).cloned())
    }

    async fn list_teams(&self) -> Result<Vec<Team>, StoreError> {
        Ok(self.read()?.teams.values().cloned().collect())
    }

    async fn rename_team(&self, team_id: i32, name: &str) -> Result<Option<Team>, StoreError> {
        let mut state = self.write()?;
        if state
            .teams
            .values()
            .any(|t| t.name == name && t.id != team_id)
        {
            return Err(StoreError::Conflict(constraint::TEAM_NAME.into()));
        }
        Ok(state.teams.get_mut(&team_id).map(|team| {
            name.clone_into(&mut team.name);
            team.clone()
        }))
    }

    async fn delete_team(&self, team_id: i32) -> Result<bool, StoreError> {
        Ok(self.write()?.drop_brand_team(team_id).is_some())
    }

    async fn find_mate(&self, user_id: i32) -> Result<Option<TeamMate>, StoreError> {
        Ok(self.read()?.mates.get(&user_id).cloned())
    }

    async fn list_mates(&self, team_id: i32) -> Result<Vec<TeamMate>, StoreError> {
        Ok(self
            .read()?
            .mates
            .values()
            .filter(|m| m.team_id == team_id)
            .cloned()
            .collect())
    }

    async fn list_captains(&self, team_id: i32) -> Result<Vec<TeamMate>, StoreError> {
        Ok(self
            .read()?
            .mates
            .values()
            .filter(|m| m.team_id == team_id && m.is_captain)
            .cloned()
            .collect())
    }

    async fn count_mates(&self, team_id: i32) -> Result<i64, StoreError> {
        Ok(self
            .read()?
            .mates
            .values()
            .filter(|m| m.team_id == team_id)
            .count() as i64)
    }

    async fn insert_mate(&self, team_id: i32, mate: NewMate) -> Result<TeamMate, StoreError> {
        let mut state = self.write()?;
        if !state.teams.contains_key(&team_id) {
            return Err(StoreError::MissingParent("team_mates_team_id_fkey".into()));
        }
        if state.mates.contains_key(&mate.user_id) {
            return Err(StoreError::Conflict(constraint::TEAM_MATE_USER.into()));
        }
        let row = TeamMate {
            team_id,
            user_id: mate.user_id,
            is_captain: mate.is_captain,
            role_desc: mate.role_desc,
        };
        state.mates.insert(row.user_id, row.clone());
        Ok(row)
    }

    async fn set_mate_captain(
        &self,
        user_id: i32,
        is_captain: bool,
    ) -> Result<Option<TeamMate>, StoreError> {
        let mut state = self.write()?;
        Ok(state.mates.get_mut(&user_id).map(|m| {
            m.is_captain = is_captain;
            m.clone()
        }))
    }

    async fn set_mate_role(
        &self,
        user_id: i32,
        role_desc: Option<&str>,
    ) -> Result<Option<TeamMate>, StoreError> {
        let mut state = self.write()?;
        Ok(state.mates.get_mut(&user_id).map(|m| {
            m.role_desc = role_desc.map(str::to_owned);
            m.clone()
        }))
    }

    async fn remove_mate(
        &self,
        user_id: i32,
    ) -> Result<Option<Removal<TeamMate, Team>>, StoreError> {
        let mut state = self.write()?;
        let Some(mate) = state.mates.remove(&user_id) else {
            return Ok(None);
        };
        let remaining = state.mates.values().any(|m| m.team_id == mate.team_id);
        let dissolved = if remaining {
            None
        } else {
            state.drop_brand_team(mate.team_id)
        };
        Ok(Some(Removal { mate, dissolved }))
    }
}

#[async_trait]
impl InviteStore for MemoryStore {
    async fn insert_invite(&self, team_id: i32, user_id: i32) -> Result<TeamInvite, StoreError> {
        let mut state = self.write()?;
        if !state.teams.contains_key(&team_id) {
            return Err(StoreError::MissingParent("team_invites_team_id_fkey".into()));
        }
        if !state.invites.insert((team_id, user_id)) {
            return Err(StoreError::Conflict(constraint::TEAM_INVITE.into()));
        }
        Ok(TeamInvite { team_id, user_id })
    }

    async fn find_invite(
        &self,
        team_id: i32,
        user_id: i32,
    ) -> Result<Option<TeamInvite>, StoreError> {
        Ok(self
            .read()?
            .invites
            .contains(&(team_id, user_id))
            .then_some(TeamInvite { team_id, user_id }))
    }

    async fn invites_for_user(&self, user_id: i32) -> Result<Vec<TeamInvite>, StoreError> {
        Ok(self
            .read()?
            .invites
            .iter()
            .filter(|(_, u)| *u == user_id)
            .map(|&(team_id, user_id)| TeamInvite { team_id, user_id })
            .collect())
    }

    async fn delete_invite(&self, team_id: i32, user_id: i32) -> Result<bool, StoreError> {
        Ok(self.write()?.invites.remove(&(team_id, user_id)))
    }

    async fn delete_invites_for_user(&self, user_id: i32) -> Result<u64, StoreError> {
        let mut state = self.write()?;
        let before = state.invites.len();
        state.invites.retain(|(_, u)| *u != user_id);
        Ok((before - state.invites.len()) as u64)
    }
}

#[async_trait]
impl HackathonTeamStore for MemoryStore {
    async fn register_team(
        &self,
        hackathon_id: i32,
        name: &str,
        mates: &[NewMate],
        capacity: Capacity,
    ) -> Result<(HackathonTeam, Vec<HackathonTeamMate>), StoreError> {
        let mut state = self.write()?;
        capacity
            .check(
                mates.len() as i64,
                state.participants(hackathon_id) + mates.len() as i64,
            )
            .map_err(StoreError::Capacity)?;
        if state
            .hackathon_teams
            .values()
            .any(|t| t.hackathon_id == hackathon_id && t.name == name)
        {
            return Err(StoreError::Conflict(constraint::HACKATHON_TEAM_NAME.into()));
        }
        let mut seen = BTreeSet::new();
        for mate in mates {
            if !seen.insert(mate.user_id)
                || state
                    .hackathon_mates
                    .contains_key(&(hackathon_id, mate.user_id))
            {
                return Err(StoreError::Conflict(constraint::HACKATHON_SEAT.into()));
            }
        }

        let id = self.next_hackathon_team_id.fetch_add(1, Ordering::SeqCst);
        let team = HackathonTeam {
            id,
            hackathon_id,
            name: name.to_owned(),
        };
        state.hackathon_teams.insert(id, team.clone());
        let rows: Vec<HackathonTeamMate> = mates
            .iter()
            .map(|m| HackathonTeamMate {
                team_id: id,
                hackathon_id,
                user_id: m.user_id,
                is_captain: m.is_captain,
                role_desc: m.role_desc.clone(),
            })
            .collect();
        for row in &rows {
            state
                .hackathon_mates
                .insert((hackathon_id, row.user_id), row.clone());
        }
        Ok((team, rows))
    }

    async fn add_mate(
        &self,
        team: &HackathonTeam,
        mate: NewMate,
        capacity: Capacity,
    ) -> Result<HackathonTeamMate, StoreError> {
        let mut state = self.write()?;
        if !state.hackathon_teams.contains_key(&team.id) {
            return Err(StoreError::MissingParent(
                "hackathon_team_mates_team_id_fkey".into(),
            ));
        }
        if state
            .hackathon_mates
            .contains_key(&(team.hackathon_id, mate.user_id))
        {
            return Err(StoreError::Conflict(constraint::HACKATHON_SEAT.into()));
        }
        capacity
            .check(
                state.hackathon_team_size(team.id) + 1,
                state.participants(team.hackathon_id) + 1,
            )
            .map_err(StoreError::Capacity)?;

        let row = HackathonTeamMate {
            team_id: team.id,
            hackathon_id: team.hackathon_id,
            user_id: mate.user_id,
            is_captain: mate.is_captain,
            role_desc: mate.role_desc,
        };
        state
            .hackathon_mates
            .insert((team.hackathon_id, row.user_id), row.clone());
        Ok(row)
    }

    async fn find_team(&self, team_id: i32) -> Result<Option<HackathonTeam>, StoreError> {
        Ok(self.read()?.hackathon_teams.get(&team_id).cloned())
    }

    async fn teams_for_hackathon(
        &self,
        hackathon_id: i32,
    ) -> Result<Vec<HackathonTeam>, StoreError> {
        Ok(self
            .read()?
            .hackathon_teams
            .values()
            .filter(|t| t.hackathon_id == hackathon_id)
            .cloned()
            .collect())
    }

    async fn teams_by_ids(&self, team_ids: &[i32]) -> Result<Vec<HackathonTeam>, StoreError> {
        let state = self.read()?;
        Ok(team_ids
            .iter()
            .filter_map(|id| state.hackathon_teams.get(id).cloned())
            .collect())
    }

    async fn team_name_taken(&self, name: &str, hackathon_id: i32) -> Result<bool, StoreError> {
        Ok(self
            .read()?
            .hackathon_teams
            .values()
            .any(|t| t.hackathon_id == hackathon_id && t.name == name))
    }

    async fn find_mate(
        &self,
        user_id: i32,
        hackathon_id: i32,
    ) -> Result<Option<HackathonTeamMate>, StoreError> {
        Ok(self
            .read()?
            .hackathon_mates
            .get(&(hackathon_id, user_id))
            .cloned())
    }

    async fn mates_of_user(&self, user_id: i32) -> Result<Vec<HackathonTeamMate>, StoreError> {
        Ok(self
            .read()?
            .hackathon_mates
            .values()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_mates(&self, team_id: i32) -> Result<Vec<HackathonTeamMate>, StoreError> {
        Ok(self
            .read()?
            .hackathon_mates
            .values()
            .filter(|m| m.team_id == team_id)
            .cloned()
            .collect())
    }

    async fn list_captains(&self, team_id: i32) -> Result<Vec<HackathonTeamMate>, StoreError> {
        Ok(self
            .read()?
            .hackathon_mates
            .values()
            .filter(|m| m.team_id == team_id && m.is_captain)
            .cloned()
            .collect())
    }

    async fn count_mates(&self, team_id: i32) -> Result<i64, StoreError> {
        Ok(self.read()?.hackathon_team_size(team_id))
    }

    async fn count_participants(&self, hackathon_id: i32) -> Result<i64, StoreError> {
        Ok(self.read()?.participants(hackathon_id))
    }

    async fn set_mate_captain(
        &self,
        hackathon_id: i32,
        user_id: i32,
        is_captain: bool,
    ) -> Result<Option<HackathonTeamMate>, StoreError> {
        let mut state = self.write()?;
        Ok(state
            .hackathon_mates
            .get_mut(&(hackathon_id, user_id))
            .map(|m| {
                m.is_captain = is_captain;
                m.clone()
            }))
    }

    async fn set_mate_role(
        &self,
        hackathon_id: i32,
        user_id: i32,
        role_desc: Option<&str>,
    ) -> Result<Option<HackathonTeamMate>, StoreError> {
        let mut state = self.write()?;
        Ok(state
            .hackathon_mates
            .get_mut(&(hackathon_id, user_id))
            .map(|m| {
                m.role_desc = role_desc.map(str::to_owned);
                m.clone()
            }))
    }

    async fn remove_mate(
        &self,
        hackathon_id: i32,
        user_id: i32,
    ) -> Result<Option<Removal<HackathonTeamMate, HackathonTeam>>, StoreError> {
        let mut state = self.write()?;
        let Some(mate) = state.hackathon_mates.remove(&(hackathon_id, user_id)) else {
            return Ok(None);
        };
        let dissolved = if state.hackathon_team_size(mate.team_id) == 0 {
            state.drop_hackathon_team(mate.team_id)
        } else {
            None
        };
        Ok(Some(Removal { mate, dissolved }))
    }

    async fn delete_team(&self, team_id: i32) -> Result<Option<HackathonTeam>, StoreError> {
        Ok(self.write()?.drop_hackathon_team(team_id))
    }

    async fn delete_teams_for_hackathon(&self, hackathon_id: i32) -> Result<u64, StoreError> {
        let mut state = self.write()?;
        let ids: Vec<i32> = state
            .hackathon_teams
            .values()
            .filter(|t| t.hackathon_id == hackathon_id)
            .map(|t| t.id)
            .collect();
        for id in &ids {
            state.drop_hackathon_team(*id);
        }
        Ok(ids.len() as u64)
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn upsert_submission(&self, data: NewSubmission) -> Result<Submission, StoreError> {
        let mut state = self.write()?;
        if !state.hackathon_teams.contains_key(&data.team_id) {
            return Err(StoreError::MissingParent(
                "team_submissions_team_id_fkey".into(),
            ));
        }
        let key = (data.team_id, data.hackathon_id);
        let id = match state.submissions.get(&key) {
            Some(existing) => existing.id,
            None => self.next_submission_id.fetch_add(1, Ordering::SeqCst),
        };
        let row = Submission {
            id,
            team_id: data.team_id,
            hackathon_id: data.hackathon_id,
            name: data.name,
            s3_key: data.s3_key,
            content_type: data.content_type,
            uploaded_at: Utc::now(),
        };
        state.submissions.insert(key, row.clone());
        Ok(row)
    }

    async fn find_submission(
        &self,
        hackathon_id: i32,
        team_id: i32,
    ) -> Result<Option<Submission>, StoreError> {
        Ok(self
            .read()?
            .submissions
            .get(&(team_id, hackathon_id))
            .cloned())
    }
}
