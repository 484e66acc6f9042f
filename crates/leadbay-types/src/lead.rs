//! Lead entity and its request DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle status of a captured lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    Qualified,
    Closed,
}

impl std::fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Qualified => "qualified",
            LeadStatus::Closed => "closed",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for LeadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(LeadStatus::New),
            "contacted" => Ok(LeadStatus::Contacted),
            "qualified" => Ok(LeadStatus::Qualified),
            "closed" => Ok(LeadStatus::Closed),
            other => Err(format!("invalid lead status: '{other}'")),
        }
    }
}

/// A lead captured from an embedded widget.
///
/// `metadata` is always a JSON object and `conversation` always a JSON
/// array; the store normalizes both on read so callers never see raw
/// column text or null.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub id: i64,
    pub phone: Option<String>,
    pub bhk_type: String,
    pub bhk: Option<String>,
    pub microsite: String,
    pub lead_source: String,
    pub status: LeadStatus,
    pub metadata: Value,
    pub conversation: Value,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for `LeadStore::create`. Missing fields take the entity
/// defaults: `lead_source` = "ChatWidget", `status` = new, `metadata` =
/// `{}`, `conversation` = `[]`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLead {
    pub phone: Option<String>,
    pub bhk_type: String,
    pub bhk: Option<String>,
    pub microsite: String,
    pub lead_source: Option<String>,
    pub status: Option<LeadStatus>,
    pub metadata: Option<Value>,
    pub conversation: Option<Value>,
    pub location: Option<String>,
}

/// Partial update for a lead. Only fields present are rewritten; an
/// all-`None` patch is a no-op that returns the current row.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateLead {
    pub phone: Option<String>,
    pub bhk_type: Option<String>,
    pub bhk: Option<String>,
    pub lead_source: Option<String>,
    pub status: Option<LeadStatus>,
    pub metadata: Option<Value>,
    pub conversation: Option<Value>,
    pub location: Option<String>,
}

impl UpdateLead {
    /// True when no field is present (the no-op update case).
    pub fn is_empty(&self) -> bool {
        self.phone.is_none()
            && self.bhk_type.is_none()
            && self.bhk.is_none()
            && self.lead_source.is_none()
            && self.status.is_none()
            && self.metadata.is_none()
            && self.conversation.is_none()
            && self.location.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for s in ["new", "contacted", "qualified", "closed"] {
            let status: LeadStatus = s.parse().unwrap();
            assert_eq!(status.to_string(), s);
        }
    }

    #[test]
    fn test_status_rejects_unknown() {
        assert!("stale".parse::<LeadStatus>().is_err());
    }

    #[test]
    fn test_default_status_is_new() {
        assert_eq!(LeadStatus::default(), LeadStatus::New);
    }

    #[test]
    fn test_empty_patch_detected() {
        assert!(UpdateLead::default().is_empty());
        let patch = UpdateLead {
            status: Some(LeadStatus::Contacted),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
