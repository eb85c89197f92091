//! Action Status
//!
//! The per-(user, quest) state machine. REWARDED is absolutely terminal;
//! an admin may re-open REJECTED back into the review queue.

use derive_more::Display;
use serde::{Deserialize, Serialize};

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    /// Claimed, awaiting proof submission
    #[display("claimed")]
    Claimed,
    /// Proof submitted, awaiting review
    #[display("submitted")]
    Submitted,
    /// Rejected; only an admin re-open leaves this state
    #[display("rejected")]
    Rejected,
    /// Rewarded; terminal, no transition out
    #[display("rewarded")]
    Rewarded,
}

impl ActionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionStatus::Claimed => "claimed",
            ActionStatus::Submitted => "submitted",
            ActionStatus::Rejected => "rejected",
            ActionStatus::Rewarded => "rewarded",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "claimed" => Some(ActionStatus::Claimed),
            "submitted" => Some(ActionStatus::Submitted),
            "rejected" => Some(ActionStatus::Rejected),
            "rewarded" => Some(ActionStatus::Rewarded),
            _ => None,
        }
    }

    /// Legal transitions of the state machine
    pub fn can_transition_to(&self, next: ActionStatus) -> bool {
        match self {
            ActionStatus::Claimed => matches!(
                next,
                ActionStatus::Submitted | ActionStatus::Rejected | ActionStatus::Rewarded
            ),
            ActionStatus::Submitted => matches!(
                next,
                ActionStatus::Rewarded | ActionStatus::Rejected | ActionStatus::Submitted
            ),
            // Admin re-open only
            ActionStatus::Rejected => matches!(next, ActionStatus::Submitted),
            // Reward finality is absolute
            ActionStatus::Rewarded => false,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ActionStatus::Rewarded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewarded_is_terminal() {
        for next in [
            ActionStatus::Claimed,
            ActionStatus::Submitted,
            ActionStatus::Rejected,
            ActionStatus::Rewarded,
        ] {
            assert!(!ActionStatus::Rewarded.can_transition_to(next));
        }
    }

    #[test]
    fn test_rejected_can_only_reopen() {
        assert!(ActionStatus::Rejected.can_transition_to(ActionStatus::Submitted));
        assert!(!ActionStatus::Rejected.can_transition_to(ActionStatus::Rewarded));
        assert!(!ActionStatus::Rejected.can_transition_to(ActionStatus::Claimed));
    }

    #[test]
    fn test_resubmission_is_legal() {
        assert!(ActionStatus::Submitted.can_transition_to(ActionStatus::Submitted));
    }

    #[test]
    fn test_claimed_transitions() {
        assert!(ActionStatus::Claimed.can_transition_to(ActionStatus::Submitted));
        assert!(ActionStatus::Claimed.can_transition_to(ActionStatus::Rejected));
        assert!(ActionStatus::Claimed.can_transition_to(ActionStatus::Rewarded));
    }
}
