//! Business logic services.

#![allow(missing_docs)]

pub mod issue;
pub mod issue_input;
pub mod issue_record;
pub mod stats;
pub mod vote_direction;

pub use issue::{IssueService, ReconcileOutcome};
pub use issue_input::{normalize_ids, Direction, IssueAttributes, NewIssue, VoteEntry};
pub use issue_record::IssueRecord;
pub use stats::{StatsCache, TallyScorer, VoteScorer, VoteStats};
pub use vote_direction::VoteDirectionService;
