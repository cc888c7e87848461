//! Shared test helpers for integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use meethub_core::config::{EngineConfig, QuotaConfig};
use meethub_core::traits::EventSink;
use meethub_core::types::{ActionType, ActorId, SeatCapacity, SessionId};
use meethub_engine::{AdmissionEngine, CollectingEventSink};
use meethub_entity::{Actor, ActorRole};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}

/// An engine wired to a collecting sink, with a pre-registered staff
/// actor for administrative calls.
pub struct TestEngine {
    pub engine: AdmissionEngine,
    pub sink: Arc<CollectingEventSink>,
    pub staff_id: ActorId,
}

impl TestEngine {
    /// Engine with the default quota configuration.
    pub async fn new() -> Self {
        Self::with_limits(&[]).await
    }

    /// Engine with specific per-action quota limits overriding the
    /// defaults.
    pub async fn with_limits(limits: &[(ActionType, u32)]) -> Self {
        init_tracing();

        let mut quota = QuotaConfig::default();
        for (action, limit) in limits {
            quota.limits.insert(*action, *limit);
        }
        let sink = Arc::new(CollectingEventSink::new());
        let engine = AdmissionEngine::new(
            EngineConfig { quota },
            Arc::clone(&sink) as Arc<dyn EventSink>,
        );

        let staff = Actor::new("Organizer", ActorRole::Staff);
        let staff_id = staff.id;
        engine.register_actor(staff).await;

        Self {
            engine,
            sink,
            staff_id,
        }
    }

    /// Registers a fresh attendee and returns its id.
    pub async fn attendee(&self, name: &str) -> ActorId {
        let actor = Actor::new(name, ActorRole::Attendee);
        let id = actor.id;
        self.engine.register_actor(actor).await;
        id
    }

    /// Creates a scheduled session in a unique room, starting an hour
    /// from now.
    pub async fn session(&self, capacity: u32) -> SessionId {
        let starts_at = Utc::now() + Duration::hours(1);
        self.session_at(
            capacity,
            &format!("Room {}", Uuid::new_v4()),
            starts_at,
            starts_at + Duration::hours(1),
        )
        .await
    }

    /// Creates a scheduled session at a specific place and time.
    pub async fn session_at(
        &self,
        capacity: u32,
        location: &str,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    ) -> SessionId {
        self.engine
            .create_session(
                self.staff_id,
                "Test session",
                SeatCapacity::from(capacity),
                starts_at,
                ends_at,
                location,
            )
            .await
            .expect("create session")
            .id
    }
}
