//! Database repositories.

mod category;
mod issue;
mod promise;
mod topic;
mod user;
mod vote;
mod vote_connection;
mod vote_direction;

pub use category::CategoryRepository;
pub use issue::{IssueAssociation, IssueRepository};
pub use promise::PromiseRepository;
pub use topic::TopicRepository;
pub use user::UserRepository;
pub use vote::VoteRepository;
pub use vote_connection::VoteConnectionRepository;
pub use vote_direction::VoteDirectionRepository;
