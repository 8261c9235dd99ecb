//! Review consensus state machine for video annotation sign-off.
//!
//! A video's review status is a pure function of the set of reviewer votes
//! and the required-reviewer set carried by the video's subpart. The
//! computation lives here, storage-free, so the DB and API layers share one
//! implementation and the rules can be unit-tested directly.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/* --------------------------------------------------------------------------
Constants
-------------------------------------------------------------------------- */

/// Comment written by the automatic reset when annotation content changes
/// underneath an approved video.
pub const AUTO_RESET_COMMENT: &str = "Auto-reset: Content modified after approval";

/// Maximum length for a reviewer comment or revocation reason.
pub const MAX_REVIEW_COMMENT_LENGTH: usize = 2_000;

/* --------------------------------------------------------------------------
Actions and statuses
-------------------------------------------------------------------------- */

/// A reviewer's decision on a video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    Approve,
    Reject,
}

impl ReviewAction {
    /// The TEXT column value stored for this action.
    pub fn as_str(self) -> &'static str {
        match self {
            ReviewAction::Approve => "approve",
            ReviewAction::Reject => "reject",
        }
    }

    /// Parse a stored or user-supplied action value.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "approve" => Ok(ReviewAction::Approve),
            "reject" => Ok(ReviewAction::Reject),
            other => Err(CoreError::Validation(format!(
                "Invalid review action '{other}'. Must be approve or reject"
            ))),
        }
    }
}

/// Derived approval status of a video.
///
/// `NotSubmitted` is the initial state and the target of both explicit
/// revocation and the content-change auto-reset. The remaining states are
/// derived from the vote set by [`compute_review_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    NotSubmitted,
    PendingReview,
    InReview,
    Approved,
    Rejected,
}

impl ReviewStatus {
    /// The TEXT column value stored for this status.
    pub fn as_str(self) -> &'static str {
        match self {
            ReviewStatus::NotSubmitted => "not_submitted",
            ReviewStatus::PendingReview => "pending_review",
            ReviewStatus::InReview => "in_review",
            ReviewStatus::Approved => "approved",
            ReviewStatus::Rejected => "rejected",
        }
    }

    /// Parse a stored status value.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "not_submitted" => Ok(ReviewStatus::NotSubmitted),
            "pending_review" => Ok(ReviewStatus::PendingReview),
            "in_review" => Ok(ReviewStatus::InReview),
            "approved" => Ok(ReviewStatus::Approved),
            "rejected" => Ok(ReviewStatus::Rejected),
            other => Err(CoreError::Validation(format!(
                "Invalid review status '{other}'"
            ))),
        }
    }
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single reviewer's vote. At most one exists per reviewer per video.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewVote {
    pub reviewer_id: DbId,
    pub action: ReviewAction,
}

/* --------------------------------------------------------------------------
Consensus computation
-------------------------------------------------------------------------- */

/// Compute the consensus status from the current vote set and the
/// required-reviewer set.
///
/// - No votes: `PendingReview`.
/// - Any reject: `Rejected`. Rejection dominates approvals regardless of
///   vote order or count; only withdrawing or overwriting the rejecting
///   reviewer's own vote clears it.
/// - Otherwise every vote is an approval. With a non-empty required set,
///   the video is `Approved` once every required reviewer has approved and
///   `InReview` while only some have. With an empty required set, any one
///   approval is enough.
pub fn compute_review_status(votes: &[ReviewVote], required_reviewers: &[DbId]) -> ReviewStatus {
    if votes.is_empty() {
        return ReviewStatus::PendingReview;
    }

    if votes.iter().any(|v| v.action == ReviewAction::Reject) {
        return ReviewStatus::Rejected;
    }

    let approved: HashSet<DbId> = votes
        .iter()
        .filter(|v| v.action == ReviewAction::Approve)
        .map(|v| v.reviewer_id)
        .collect();

    if required_reviewers.is_empty() {
        if approved.is_empty() {
            ReviewStatus::PendingReview
        } else {
            ReviewStatus::Approved
        }
    } else if required_reviewers.iter().all(|r| approved.contains(r)) {
        ReviewStatus::Approved
    } else {
        ReviewStatus::InReview
    }
}

/// Validate a reviewer comment or revocation reason.
pub fn validate_review_comment(comment: &str) -> Result<(), CoreError> {
    if comment.len() > MAX_REVIEW_COMMENT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Review comment exceeds maximum length of {MAX_REVIEW_COMMENT_LENGTH} characters"
        )));
    }
    Ok(())
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;

    fn approve(reviewer_id: DbId) -> ReviewVote {
        ReviewVote {
            reviewer_id,
            action: ReviewAction::Approve,
        }
    }

    fn reject(reviewer_id: DbId) -> ReviewVote {
        ReviewVote {
            reviewer_id,
            action: ReviewAction::Reject,
        }
    }

    #[test]
    fn test_no_votes_is_pending_review() {
        assert_eq!(compute_review_status(&[], &[]), ReviewStatus::PendingReview);
        assert_eq!(
            compute_review_status(&[], &[1, 2]),
            ReviewStatus::PendingReview
        );
    }

    #[test]
    fn test_single_approval_without_required_set_approves() {
        assert_eq!(
            compute_review_status(&[approve(7)], &[]),
            ReviewStatus::Approved
        );
    }

    #[test]
    fn test_any_reject_forces_rejected() {
        assert_eq!(
            compute_review_status(&[reject(1)], &[]),
            ReviewStatus::Rejected
        );
        // Rejection dominates concurrent approvals from other reviewers.
        assert_eq!(
            compute_review_status(&[approve(1), reject(2), approve(3)], &[1, 2, 3]),
            ReviewStatus::Rejected
        );
        // Vote order does not matter.
        assert_eq!(
            compute_review_status(&[reject(2), approve(1), approve(3)], &[1, 2, 3]),
            ReviewStatus::Rejected
        );
    }

    #[test]
    fn test_partial_consensus_is_in_review() {
        assert_eq!(
            compute_review_status(&[approve(1)], &[1, 2]),
            ReviewStatus::InReview
        );
    }

    #[test]
    fn test_full_consensus_approves() {
        assert_eq!(
            compute_review_status(&[approve(1), approve(2)], &[1, 2]),
            ReviewStatus::Approved
        );
    }

    #[test]
    fn test_extra_approvals_do_not_block_consensus() {
        // A non-required reviewer approving alongside the required set.
        assert_eq!(
            compute_review_status(&[approve(1), approve(2), approve(99)], &[1, 2]),
            ReviewStatus::Approved
        );
    }

    #[test]
    fn test_only_non_required_approvals_is_in_review() {
        assert_eq!(
            compute_review_status(&[approve(99)], &[1, 2]),
            ReviewStatus::InReview
        );
    }

    #[test]
    fn test_two_reviewer_scenario() {
        // Subpart requires {A=1, B=2}.
        let required = [1, 2];

        // A approves: partial consensus.
        let votes = vec![approve(1)];
        assert_eq!(
            compute_review_status(&votes, &required),
            ReviewStatus::InReview
        );

        // B approves: full consensus.
        let votes = vec![approve(1), approve(2)];
        assert_eq!(
            compute_review_status(&votes, &required),
            ReviewStatus::Approved
        );

        // A changes their vote to reject: rejection dominates.
        let votes = vec![reject(1), approve(2)];
        assert_eq!(
            compute_review_status(&votes, &required),
            ReviewStatus::Rejected
        );

        // A withdraws: recomputed from B's approval alone.
        let votes = vec![approve(2)];
        assert_eq!(
            compute_review_status(&votes, &required),
            ReviewStatus::InReview
        );
    }

    #[test]
    fn test_action_round_trip() {
        assert_eq!(ReviewAction::parse("approve").unwrap(), ReviewAction::Approve);
        assert_eq!(ReviewAction::parse("reject").unwrap(), ReviewAction::Reject);
        assert_eq!(ReviewAction::Approve.as_str(), "approve");
        assert_eq!(ReviewAction::Reject.as_str(), "reject");
    }

    #[test]
    fn test_invalid_action_rejected() {
        let result = ReviewAction::parse("flag");
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Invalid review action"));
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            ReviewStatus::NotSubmitted,
            ReviewStatus::PendingReview,
            ReviewStatus::InReview,
            ReviewStatus::Approved,
            ReviewStatus::Rejected,
        ] {
            assert_eq!(ReviewStatus::parse(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn test_invalid_status_rejected() {
        assert!(ReviewStatus::parse("under_review").is_err());
        assert!(ReviewStatus::parse("").is_err());
    }

    #[test]
    fn test_comment_length_cap() {
        assert!(validate_review_comment("looks good").is_ok());
        let long = "x".repeat(MAX_REVIEW_COMMENT_LENGTH + 1);
        assert!(validate_review_comment(&long).is_err());
    }
}
