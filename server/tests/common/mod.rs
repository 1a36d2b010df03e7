#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};

use team_service::acl::UserRole;
use team_service::app::{Collaborators, Engines, Stores};
use team_service::clients::{
    Hackathon, HackathonDirectory, MemoryObjectStorage, Profile, UpstreamError, UserDirectory,
};
use team_service::db::models::Team;
use team_service::db::MemoryStore;
use team_service::events::RecordingPublisher;
use team_service::teams::SubmissionConfig;

//////////////////////////////////////////////////
// Fake user service
//////////////////////////////////////////////////

#[derive(Default)]
pub struct FakeUsers {
    profiles: Mutex<HashMap<i32, Profile>>,
    down: AtomicBool,
}

impl FakeUsers {
    pub fn add(&self, id: i32, role: UserRole) {
        self.profiles.lock().unwrap().insert(
            id,
            Profile {
                id,
                is_banned: false,
                formatted_name: format!("User {id}"),
                role,
                uploads: Some(Vec::new()),
            },
        );
    }

    pub fn remove(&self, id: i32) {
        self.profiles.lock().unwrap().remove(&id);
    }

    /// Every call fails as if the service timed out.
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), UpstreamError> {
        if self.down.load(Ordering::SeqCst) {
            Err(UpstreamError::Unavailable("connection timed out".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl UserDirectory for FakeUsers {
    async fn get_user(&self, user_id: i32) -> Result<Profile, UpstreamError> {
        self.check()?;
        self.profiles
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .ok_or(UpstreamError::NotFound)
    }

    async fn get_users_many(&self, user_ids: &[i32]) -> Result<Vec<Profile>, UpstreamError> {
        self.check()?;
        let profiles = self.profiles.lock().unwrap();
        Ok(user_ids
            .iter()
            .filter_map(|id| profiles.get(id).cloned())
            .collect())
    }
}

//////////////////////////////////////////////////
// Fake hackathon service
//////////////////////////////////////////////////

struct HackathonState {
    hackathon: Hackathon,
    registry_open: bool,
    uploads_open: bool,
}

#[derive(Default)]
pub struct FakeHackathons {
    hackathons: Mutex<HashMap<i32, HackathonState>>,
}

impl FakeHackathons {
    pub fn add(&self, id: i32, max_team_mates: i64, max_participants: i64) {
        let now = Utc::now();
        self.hackathons.lock().unwrap().insert(
            id,
            HackathonState {
                hackathon: Hackathon {
                    id,
                    name: format!("Hackathon {id}"),
                    max_participant_count: max_participants,
                    max_team_mates_count: max_team_mates,
                    start_date: now,
                    score_start_date: now + Duration::days(2),
                    end_date: now + Duration::days(3),
                },
                registry_open: true,
                uploads_open: true,
            },
        );
    }

    pub fn set_registry_open(&self, id: i32, open: bool) {
        if let Some(h) = self.hackathons.lock().unwrap().get_mut(&id) {
            h.registry_open = open;
        }
    }

    pub fn set_uploads_open(&self, id: i32, open: bool) {
        if let Some(h) = self.hackathons.lock().unwrap().get_mut(&id) {
            h.uploads_open = open;
        }
    }
}

#[async_trait]
impl HackathonDirectory for FakeHackathons {
    async fn get_hackathon(&self, hackathon_id: i32) -> Result<Hackathon, UpstreamError> {
        self.hackathons
            .lock()
            .unwrap()
            .get(&hackathon_id)
            .map(|h| h.hackathon.clone())
            .ok_or(UpstreamError::NotFound)
    }

    async fn can_edit_team_registry(&self, hackathon_id: i32) -> Result<bool, UpstreamError> {
        self.hackathons
            .lock()
            .unwrap()
            .get(&hackathon_id)
            .map(|h| h.registry_open)
            .ok_or(UpstreamError::NotFound)
    }

    async fn can_upload_submissions(&self, hackathon_id: i32) -> Result<bool, UpstreamError> {
        self.hackathons
            .lock()
            .unwrap()
            .get(&hackathon_id)
            .map(|h| h.uploads_open)
            .ok_or(UpstreamError::NotFound)
    }
}

//////////////////////////////////////////////////
// Harness
//////////////////////////////////////////////////

pub const PUBLIC_URL: &str = "http://teams.test/";

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub users: Arc<FakeUsers>,
    pub hackathons: Arc<FakeHackathons>,
    pub storage: Arc<MemoryObjectStorage>,
    pub publisher: Arc<RecordingPublisher>,
    pub engines: Engines,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let users = Arc::new(FakeUsers::default());
        let hackathons = Arc::new(FakeHackathons::default());
        let storage = Arc::new(MemoryObjectStorage::new());
        let publisher = Arc::new(RecordingPublisher::new());

        let engines = Engines::build(
            Stores::shared(store.clone()),
            Collaborators {
                users: users.clone(),
                hackathons: hackathons.clone(),
                storage: storage.clone(),
                publisher: publisher.clone(),
            },
            SubmissionConfig::new("hackathons", PUBLIC_URL).unwrap(),
        );

        Harness {
            store,
            users,
            hackathons,
            storage,
            publisher,
            engines,
        }
    }

    /// Registers plain users in the fake user service.
    pub fn register_users(&self, ids: &[i32]) {
        for &id in ids {
            self.users.add(id, UserRole::User);
        }
    }

    /// Brand team captained by `captain` with `members` joined as non-captains.
    pub async fn brand_team(&self, name: &str, captain: i32, members: &[i32]) -> Team {
        self.register_users(&[captain]);
        self.register_users(members);
        let view = self.engines.teams.create(name, captain).await.unwrap();
        for &user_id in members {
            self.engines.mates.add(view.id, user_id, false).await.unwrap();
        }
        Team {
            id: view.id,
            name: view.name,
        }
    }
}
