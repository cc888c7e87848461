//! Actor entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use meethub_core::types::ActorId;

use crate::connection::ConnectMethod;

/// A participant identity on the platform.
///
/// Actors are created at registration and never deleted; suspension is a
/// soft disable (`suspended_at` set) that leaves history intact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    /// Unique actor identifier.
    pub id: ActorId,
    /// Display name.
    pub display_name: String,
    /// The actor's role, which affects some quota tiers.
    pub role: ActorRole,
    /// Whether the actor has checked in at the venue.
    pub checked_in: bool,
    /// When the actor was suspended, if ever.
    pub suspended_at: Option<DateTime<Utc>>,
    /// Privacy settings governing how others may connect.
    pub privacy: PrivacySettings,
    /// When the actor registered.
    pub created_at: DateTime<Utc>,
}

impl Actor {
    /// Creates a new active actor with default privacy settings.
    pub fn new(display_name: impl Into<String>, role: ActorRole) -> Self {
        Self {
            id: ActorId::new(),
            display_name: display_name.into(),
            role,
            checked_in: false,
            suspended_at: None,
            privacy: PrivacySettings::default(),
            created_at: Utc::now(),
        }
    }

    /// Whether the actor is currently suspended.
    pub fn is_suspended(&self) -> bool {
        self.suspended_at.is_some()
    }
}

/// Roles an actor can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    /// A regular event participant.
    Attendee,
    /// A session speaker.
    Speaker,
    /// Event staff with administrative privileges.
    Staff,
}

impl ActorRole {
    /// Stable snake_case name used in configuration keys and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Attendee => "attendee",
            Self::Speaker => "speaker",
            Self::Staff => "staff",
        }
    }

    /// Whether this role may perform staff-only operations.
    pub fn is_staff(&self) -> bool {
        matches!(self, Self::Staff)
    }
}

impl std::fmt::Display for ActorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-actor privacy settings for incoming connection requests.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PrivacySettings {
    /// Whether others may connect by scanning this actor's QR code.
    pub allow_qr_scan: bool,
    /// Whether others may connect by entering this actor's manual code.
    pub allow_manual_entry: bool,
}

impl Default for PrivacySettings {
    fn default() -> Self {
        Self {
            allow_qr_scan: true,
            allow_manual_entry: true,
        }
    }
}

impl PrivacySettings {
    /// Whether the given connect method is allowed by these settings.
    pub fn allows_method(&self, method: ConnectMethod) -> bool {
        match method {
            ConnectMethod::QrScan => self.allow_qr_scan,
            ConnectMethod::ManualEntry => self.allow_manual_entry,
        }
    }
}
