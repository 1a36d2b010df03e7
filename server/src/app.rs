//! Wiring: stores and collaborators in, engines and the event relay out.

use std::sync::Arc;

use sqlx::PgPool;

use crate::clients::{HackathonDirectory, ObjectStorage, UserDirectory};
use crate::db::{
    BrandTeamStore, HackathonTeamStore, InviteStore, MemoryStore, PgStore, SubmissionStore,
};
use crate::events::{EventPublisher, EventRelay};
use crate::teams::{
    HackathonTeamEngine, InviteEngine, MateEngine, SubmissionConfig, SubmissionEngine, TeamEngine,
};

/// One handle per store concern; usually all backed by the same store.
#[derive(Clone)]
pub struct Stores {
    pub brand: Arc<dyn BrandTeamStore>,
    pub invites: Arc<dyn InviteStore>,
    pub hackathon: Arc<dyn HackathonTeamStore>,
    pub submissions: Arc<dyn SubmissionStore>,
}

impl Stores {
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: BrandTeamStore + InviteStore + HackathonTeamStore + SubmissionStore + 'static,
    {
        Stores {
            brand: store.clone(),
            invites: store.clone(),
            hackathon: store.clone(),
            submissions: store,
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self::shared(Arc::new(PgStore::new(pool)))
    }

    pub fn memory() -> Self {
        Self::shared(Arc::new(MemoryStore::new()))
    }
}

#[derive(Clone)]
pub struct Collaborators {
    pub users: Arc<dyn UserDirectory>,
    pub hackathons: Arc<dyn HackathonDirectory>,
    pub storage: Arc<dyn ObjectStorage>,
    pub publisher: Arc<dyn EventPublisher>,
}

#[derive(Clone)]
pub struct Engines {
    pub mates: Arc<MateEngine>,
    pub teams: Arc<TeamEngine>,
    pub invites: Arc<InviteEngine>,
    pub submissions: Arc<SubmissionEngine>,
    pub hackathon_teams: Arc<HackathonTeamEngine>,
}

impl Engines {
    pub fn build(stores: Stores, collab: Collaborators, submission: SubmissionConfig) -> Self {
        let mates = Arc::new(MateEngine::new(stores.brand.clone(), collab.users.clone()));
        let teams = Arc::new(TeamEngine::new(stores.brand, mates.clone()));
        let invites = Arc::new(InviteEngine::new(
            stores.invites,
            teams.clone(),
            mates.clone(),
            collab.users.clone(),
        ));
        let submissions = Arc::new(SubmissionEngine::new(
            stores.submissions,
            collab.hackathons.clone(),
            collab.storage,
            submission,
        ));
        let hackathon_teams = Arc::new(HackathonTeamEngine::new(
            stores.hackathon,
            teams.clone(),
            mates.clone(),
            submissions.clone(),
            collab.hackathons,
            collab.users,
            collab.publisher,
        ));

        Engines {
            mates,
            teams,
            invites,
            submissions,
            hackathon_teams,
        }
    }

    /// Relay with every engine that reacts to bus events, in cleanup order.
    pub fn relay(&self) -> EventRelay {
        let mut relay = EventRelay::new();
        relay
            .listen(self.teams.clone())
            .listen(self.invites.clone())
            .listen(self.hackathon_teams.clone());
        relay
    }
}
