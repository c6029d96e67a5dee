//! Vote direction service: how votes relate to topics.

use hdo_common::AppResult;
use hdo_db::entities::vote_direction;
use hdo_db::repositories::VoteDirectionRepository;
use sea_orm::{NotSet, Set};

use super::issue_input::Direction;

/// Service recording the direction of votes on topics.
#[derive(Clone)]
pub struct VoteDirectionService {
    direction_repo: VoteDirectionRepository,
}

impl VoteDirectionService {
    /// Create a new vote direction service.
    #[must_use]
    pub const fn new(direction_repo: VoteDirectionRepository) -> Self {
        Self { direction_repo }
    }

    /// Record how a vote relates to a topic.
    ///
    /// [`Direction::Unrelated`] removes any recorded direction and returns
    /// `None`. Otherwise the existing row is updated in place or a new one is
    /// created.
    pub async fn record(
        &self,
        topic_id: i32,
        vote_id: i32,
        direction: Direction,
    ) -> AppResult<Option<vote_direction::Model>> {
        let existing = self
            .direction_repo
            .find_by_topic_and_vote(topic_id, vote_id)
            .await?;

        match (existing, direction) {
            (Some(existing), Direction::Unrelated) => {
                self.direction_repo.delete(existing.id).await?;
                tracing::debug!(topic_id, vote_id, "Vote direction removed");
                Ok(None)
            }
            (None, Direction::Unrelated) => Ok(None),
            (Some(existing), direction) if existing.matches == direction.matches() => {
                Ok(Some(existing))
            }
            (Some(existing), direction) => {
                let mut active: vote_direction::ActiveModel = existing.into();
                active.matches = Set(direction.matches());
                self.direction_repo.update(active).await.map(Some)
            }
            (None, direction) => self
                .direction_repo
                .create(vote_direction::ActiveModel {
                    id: NotSet,
                    vote_id: Set(vote_id),
                    topic_id: Set(topic_id),
                    matches: Set(direction.matches()),
                })
                .await
                .map(Some),
        }
    }

    /// Directions recorded for a topic.
    pub async fn for_topic(&self, topic_id: i32) -> AppResult<Vec<vote_direction::Model>> {
        self.direction_repo.find_by_topic(topic_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn direction(id: i32, matches: bool) -> vote_direction::Model {
        vote_direction::Model {
            id,
            vote_id: 5,
            topic_id: 2,
            matches,
        }
    }

    #[tokio::test]
    async fn test_record_same_direction_is_noop() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[direction(1, true)]])
                .into_connection(),
        );

        let service = VoteDirectionService::new(VoteDirectionRepository::new(db));
        let result = service.record(2, 5, Direction::For).await.unwrap();

        assert_eq!(result, Some(direction(1, true)));
    }

    #[tokio::test]
    async fn test_record_unrelated_deletes() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[direction(1, false)]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let service = VoteDirectionService::new(VoteDirectionRepository::new(db));
        let result = service.record(2, 5, Direction::Unrelated).await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_record_unrelated_without_row() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<vote_direction::Model>::new()])
                .into_connection(),
        );

        let service = VoteDirectionService::new(VoteDirectionRepository::new(db));
        assert!(service.record(2, 5, Direction::Unrelated).await.unwrap().is_none());
    }
}
