//! Moderation gate
//!
//! Pure decision function fusing the catalog's explicit flag with the
//! classifier result. It holds no state; override rules live in the
//! lifecycle layer where request status is known.

use serde::{Deserialize, Serialize};

/// Automatic verdict for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

/// Machine-readable reason an automatic rejection carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Explicit content flagged by the catalog source
    ExplicitFlagged,
    /// Inappropriate lyrics detected by the classifier
    LyricsUnclean,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::ExplicitFlagged => "explicit_flagged",
            RejectReason::LyricsUnclean => "lyrics_unclean",
        }
    }
}

/// The gate's output: a decision plus every reason that applies
#[derive(Debug, Clone)]
pub struct Verdict {
    pub decision: Decision,
    pub reasons: Vec<RejectReason>,
}

impl Verdict {
    pub fn is_reject(&self) -> bool {
        self.decision == Decision::Reject
    }
}

/// Decide on a request given the explicit flag and, when a
/// classification has completed, the classifier result.
///
/// `lyrics_clean = None` means classification has not run yet; the
/// explicit flag alone decides and the request awaits re-evaluation
/// once the asynchronous resolution completes.
pub fn decide(explicit: bool, lyrics_clean: Option<bool>) -> Verdict {
    let mut reasons = Vec::new();

    if explicit {
        reasons.push(RejectReason::ExplicitFlagged);
    }

    if lyrics_clean == Some(false) {
        reasons.push(RejectReason::LyricsUnclean);
    }

    let decision = if reasons.is_empty() {
        Decision::Approve
    } else {
        Decision::Reject
    };

    Verdict { decision, reasons }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_and_not_explicit_approves() {
        let verdict = decide(false, Some(true));
        assert_eq!(verdict.decision, Decision::Approve);
        assert!(verdict.reasons.is_empty());
    }

    #[test]
    fn test_unchecked_and_not_explicit_approves() {
        let verdict = decide(false, None);
        assert_eq!(verdict.decision, Decision::Approve);
    }

    #[test]
    fn test_explicit_rejects_regardless_of_lyrics() {
        for lyrics in [None, Some(true), Some(false)] {
            let verdict = decide(true, lyrics);
            assert_eq!(verdict.decision, Decision::Reject);
            assert!(verdict.reasons.contains(&RejectReason::ExplicitFlagged));
        }
    }

    #[test]
    fn test_unclean_lyrics_reject() {
        let verdict = decide(false, Some(false));
        assert_eq!(verdict.decision, Decision::Reject);
        assert_eq!(verdict.reasons, vec![RejectReason::LyricsUnclean]);
    }

    #[test]
    fn test_both_reasons_surface_together() {
        let verdict = decide(true, Some(false));
        assert_eq!(verdict.decision, Decision::Reject);
        assert_eq!(
            verdict.reasons,
            vec![RejectReason::ExplicitFlagged, RejectReason::LyricsUnclean]
        );
    }

    #[test]
    fn test_reason_codes_serialize_snake_case() {
        assert_eq!(
            serde_json::to_string(&RejectReason::ExplicitFlagged).unwrap(),
            "\"explicit_flagged\""
        );
        assert_eq!(
            serde_json::to_string(&RejectReason::LyricsUnclean).unwrap(),
            "\"lyrics_unclean\""
        );
    }
}
