//! Database entities.

#![allow(missing_docs)]

pub mod category;
pub mod issue;
pub mod issue_category;
pub mod issue_promise;
pub mod issue_topic;
pub mod promise;
pub mod topic;
pub mod user;
pub mod vote;
pub mod vote_connection;
pub mod vote_direction;

pub use category::Entity as Category;
pub use issue::Entity as Issue;
pub use issue_category::Entity as IssueCategory;
pub use issue_promise::Entity as IssuePromise;
pub use issue_topic::Entity as IssueTopic;
pub use promise::Entity as Promise;
pub use topic::Entity as Topic;
pub use user::Entity as User;
pub use vote::Entity as Vote;
pub use vote_connection::Entity as VoteConnection;
pub use vote_direction::Entity as VoteDirection;
