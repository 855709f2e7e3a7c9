//! # Event Payload
//!
//! The civic event carried as transaction data. Encoding is deterministic:
//! struct fields serialize in declaration order and both maps are `BTreeMap`,
//! so the same event always produces the same bytes regardless of insertion
//! order.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Kind of civic event being anchored.
///
/// String-valued on the wire so new event kinds from the host app survive a
/// round trip as [`CivicEventType::Other`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CivicEventType {
    /// A grievance was submitted by a citizen.
    GrievanceSubmitted,
    /// A grievance was marked resolved.
    GrievanceResolved,
    /// A quadratic-voting ballot was cast.
    VoteCast,
    /// A public-works project reached a milestone.
    ProjectMilestone,
    /// Manual connectivity check ("send test transaction").
    TestPing,
    /// Any event kind this crate does not know about.
    Other(String),
}

impl CivicEventType {
    /// Canonical string form used in the encoded payload.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::GrievanceSubmitted => "grievance_submitted",
            Self::GrievanceResolved => "grievance_resolved",
            Self::VoteCast => "vote_cast",
            Self::ProjectMilestone => "project_milestone",
            Self::TestPing => "test_ping",
            Self::Other(s) => s,
        }
    }
}

impl From<&str> for CivicEventType {
    fn from(s: &str) -> Self {
        match s {
            "grievance_submitted" => Self::GrievanceSubmitted,
            "grievance_resolved" => Self::GrievanceResolved,
            "vote_cast" => Self::VoteCast,
            "project_milestone" => Self::ProjectMilestone,
            "test_ping" => Self::TestPing,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for CivicEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CivicEventType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CivicEventType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EventTypeVisitor;

        impl Visitor<'_> for EventTypeVisitor {
            type Value = CivicEventType;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a civic event type string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(CivicEventType::from(v))
            }
        }

        deserializer.deserialize_str(EventTypeVisitor)
    }
}

/// A civic event prepared for anchoring.
///
/// Serialized to compact JSON and carried verbatim as transaction data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPayload {
    /// What happened.
    pub event_type: CivicEventType,

    /// Identifiers of the subjects involved (e.g. `village_id`,
    /// `grievance_id`). Sorted map for deterministic encoding.
    pub subject_ids: BTreeMap<String, String>,

    /// Free-form metadata attached by the host app.
    pub metadata: BTreeMap<String, serde_json::Value>,

    /// When the event was created in the host app.
    pub created_at: DateTime<Utc>,
}

impl EventPayload {
    /// Create a payload with no subjects or metadata.
    #[must_use]
    pub fn new(event_type: CivicEventType) -> Self {
        Self {
            event_type,
            subject_ids: BTreeMap::new(),
            metadata: BTreeMap::new(),
            created_at: Utc::now(),
        }
    }

    /// Attach a subject identifier.
    #[must_use]
    pub fn with_subject(mut self, key: &str, value: &str) -> Self {
        self.subject_ids.insert(key.to_string(), value.to_string());
        self
    }

    /// Attach a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: &str, value: serde_json::Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }

    /// Deterministic byte encoding: compact JSON, sorted map keys.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        // BTreeMap ordering + fixed struct field order make this stable.
        serde_json::to_vec(self).unwrap_or_default()
    }

    /// Hex form of [`EventPayload::encode`], `0x`-prefixed, as carried in
    /// transaction data fields.
    #[must_use]
    pub fn encode_hex(&self) -> String {
        format!("0x{}", hex::encode(self.encode()))
    }
}
