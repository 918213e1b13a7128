//! Song request model and lifecycle states

use serde::{Deserialize, Serialize};

/// Lifecycle status of a song request
///
/// Pending is the only non-terminal state for the automatic pipeline.
/// Rejected can still become Approved through a moderator override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "Pending",
            RequestStatus::Approved => "Approved",
            RequestStatus::Rejected => "Rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(RequestStatus::Pending),
            "Approved" => Some(RequestStatus::Approved),
            "Rejected" => Some(RequestStatus::Rejected),
            _ => None,
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Action a moderator can take on a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationAction {
    Approve,
    Reject,
    /// Force a Rejected request to Approved, bypassing automatic verdicts
    Override,
}

impl ModerationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationAction::Approve => "approve",
            ModerationAction::Reject => "reject",
            ModerationAction::Override => "override",
        }
    }
}

/// A guest's request to queue one song
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SongRequest {
    /// Generated request ID (UUID v4)
    pub id: String,
    /// Song being requested
    pub song_id: i64,
    /// Anonymous requester identity supplied by the client
    pub requester_id: String,
    /// Current lifecycle status
    pub status: RequestStatus,
    /// True once a human moderator has decided this request.
    /// The automatic pipeline never mutates a moderated request.
    pub moderated: bool,
    /// Unix timestamp of submission
    pub requested_at: i64,
}
