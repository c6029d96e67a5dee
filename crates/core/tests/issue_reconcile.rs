//! Issue editing flows against an in-memory database.

#![allow(clippy::unwrap_used)]

use chrono::{Duration, TimeZone, Utc};
use hdo_core::{
    Direction, IssueAttributes, IssueService, NewIssue, StatsCache, VoteDirectionService,
    VoteEntry,
};
use hdo_db::entities::{issue, user, vote};
use hdo_db::repositories::{
    CategoryRepository, IssueAssociation, IssueRepository, TopicRepository, UserRepository,
    VoteConnectionRepository, VoteDirectionRepository, VoteRepository,
};
use hdo_db::test_utils::TestDatabase;
use serde_json::json;

struct Fixture {
    db: TestDatabase,
    service: IssueService,
}

impl Fixture {
    async fn new() -> Self {
        let db = TestDatabase::in_memory().await.unwrap();
        let service = IssueService::new(
            IssueRepository::new(db.shared()),
            VoteConnectionRepository::new(db.shared()),
            UserRepository::new(db.shared()),
            StatsCache::default(),
        );
        Self { db, service }
    }

    async fn user(&self, name: &str) -> user::Model {
        UserRepository::new(self.db.shared())
            .create(name)
            .await
            .unwrap()
    }

    async fn vote(&self, subject: &str, days_ago: i64) -> vote::Model {
        let base = Utc.with_ymd_and_hms(2012, 6, 1, 12, 0, 0).unwrap();
        VoteRepository::new(self.db.shared())
            .create(subject, (base - Duration::days(days_ago)).into())
            .await
            .unwrap()
    }

    async fn issue(&self, title: &str) -> issue::Model {
        self.service
            .create_issue(
                NewIssue {
                    title: title.to_string(),
                    description: None,
                    published: false,
                },
                None,
            )
            .await
            .unwrap()
            .unwrap()
    }
}

fn attributes(value: serde_json::Value) -> IssueAttributes {
    IssueAttributes::from_json(value).unwrap()
}

#[tokio::test]
async fn test_for_vote_creates_matching_connection() {
    let fx = Fixture::new().await;
    let editor = fx.user("Ola").await;
    let vote = fx.vote("Statsbudsjettet", 1).await;
    let issue = fx.issue("Lavere skatt").await;

    let outcome = fx
        .service
        .update_attributes_and_votes_for_user(
            issue.id,
            None,
            vec![VoteEntry::new(vote.id, Direction::For)],
            editor.id,
        )
        .await
        .unwrap();

    assert!(outcome.saved);
    assert!(outcome.changed);

    let record = fx.service.load(issue.id).await.unwrap();
    assert_eq!(record.connections().len(), 1);
    assert!(record.connections()[0].matches);
    assert!(fx.service.vote_for(issue.id, vote.id).await.unwrap());
    assert!(!fx.service.vote_against(issue.id, vote.id).await.unwrap());
}

#[tokio::test]
async fn test_against_vote_is_classified() {
    let fx = Fixture::new().await;
    let editor = fx.user("Kari").await;
    let vote = fx.vote("Bompenger", 3).await;
    let issue = fx.issue("Fjerne bompenger").await;

    fx.service
        .update_attributes_and_votes_for_user(
            issue.id,
            None,
            vec![VoteEntry::new(vote.id, Direction::Against).with("comment", json!("Nei"))],
            editor.id,
        )
        .await
        .unwrap();

    assert!(fx.service.vote_against(issue.id, vote.id).await.unwrap());
    assert!(!fx.service.vote_for(issue.id, vote.id).await.unwrap());

    let connection = fx
        .service
        .connection_for(issue.id, vote.id)
        .await
        .unwrap()
        .unwrap();
    assert!(!connection.matches);
    assert_eq!(connection.data, json!({ "comment": "Nei" }));
}

#[tokio::test]
async fn test_unrelated_removes_connection() {
    let fx = Fixture::new().await;
    let editor = fx.user("Ola").await;
    let vote = fx.vote("Statsbudsjettet", 1).await;
    let issue = fx.issue("Lavere skatt").await;

    fx.service
        .update_attributes_and_votes_for_user(
            issue.id,
            None,
            vec![VoteEntry::new(vote.id, Direction::For)],
            editor.id,
        )
        .await
        .unwrap();

    let outcome = fx
        .service
        .update_attributes_and_votes_for_user(
            issue.id,
            None,
            vec![VoteEntry::new(vote.id, Direction::Unrelated)],
            editor.id,
        )
        .await
        .unwrap();

    assert!(outcome.saved);
    assert!(outcome.changed);
    assert!(fx
        .service
        .connection_for(issue.id, vote.id)
        .await
        .unwrap()
        .is_none());
    assert!(fx.service.load(issue.id).await.unwrap().connections().is_empty());
}

#[tokio::test]
async fn test_identical_resend_changes_nothing() {
    let fx = Fixture::new().await;
    let editor = fx.user("Ola").await;
    let vote = fx.vote("Statsbudsjettet", 1).await;
    let issue = fx.issue("Lavere skatt").await;
    let entries = || vec![VoteEntry::new(vote.id, Direction::For).with("comment", json!("Ja"))];

    fx.service
        .update_attributes_and_votes_for_user(
            issue.id,
            Some(attributes(json!({ "title": "Lavere skatt", "published": true }))),
            entries(),
            editor.id,
        )
        .await
        .unwrap();
    let before = fx.service.get_issue(issue.id).await.unwrap();

    let outcome = fx
        .service
        .update_attributes_and_votes_for_user(
            issue.id,
            Some(attributes(json!({ "title": "Lavere skatt", "published": true }))),
            entries(),
            editor.id,
        )
        .await
        .unwrap();

    assert!(outcome.saved);
    assert!(!outcome.changed);

    let after = fx.service.get_issue(issue.id).await.unwrap();
    assert_eq!(before.updated_at, after.updated_at);
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_equivalent_association_ids_are_unchanged() {
    let fx = Fixture::new().await;
    let editor = fx.user("Ola").await;
    let categories = CategoryRepository::new(fx.db.shared());
    let first = categories.create("Skatt").await.unwrap();
    let second = categories.create("Samferdsel").await.unwrap();
    let issue = fx.issue("Lavere skatt").await;

    let ids = [second.id.to_string(), first.id.to_string()];
    let outcome = fx
        .service
        .update_attributes_and_votes_for_user(
            issue.id,
            Some(attributes(json!({ "category_ids": ids }))),
            Vec::new(),
            editor.id,
        )
        .await
        .unwrap();
    assert!(outcome.changed);

    let messy = [
        first.id.to_string(),
        second.id.to_string(),
        second.id.to_string(),
        String::new(),
    ];
    let outcome = fx
        .service
        .update_attributes_and_votes_for_user(
            issue.id,
            Some(attributes(json!({ "category_ids": messy }))),
            Vec::new(),
            editor.id,
        )
        .await
        .unwrap();

    assert!(outcome.saved);
    assert!(!outcome.changed);

    let record = fx.service.load(issue.id).await.unwrap();
    let mut expected = vec![first.id, second.id];
    expected.sort_unstable();
    assert_eq!(record.association_ids(IssueAssociation::Categories), expected);
}

#[tokio::test]
async fn test_topic_ids_are_replaced() {
    let fx = Fixture::new().await;
    let editor = fx.user("Ola").await;
    let topics = TopicRepository::new(fx.db.shared());
    let kept = topics.create("Formuesskatt").await.unwrap();
    let dropped = topics.create("Arveavgift").await.unwrap();
    let issue = fx.issue("Lavere skatt").await;

    fx.service
        .update_attributes_and_votes_for_user(
            issue.id,
            Some(attributes(
                json!({ "topic_ids": [kept.id.to_string(), dropped.id.to_string()] }),
            )),
            Vec::new(),
            editor.id,
        )
        .await
        .unwrap();

    fx.service
        .update_attributes_and_votes_for_user(
            issue.id,
            Some(attributes(json!({ "topic_ids": [kept.id.to_string()] }))),
            Vec::new(),
            editor.id,
        )
        .await
        .unwrap();

    let record = fx.service.load(issue.id).await.unwrap();
    assert_eq!(record.association_ids(IssueAssociation::Topics), [kept.id]);
}

#[tokio::test]
async fn test_editor_is_recorded() {
    let fx = Fixture::new().await;
    let editor = fx.user("Kari").await;
    let issue = fx.issue("Lavere skatt").await;

    fx.service
        .update_attributes_and_votes_for_user(
            issue.id,
            Some(attributes(json!({ "description": "Kutt i skatten" }))),
            Vec::new(),
            editor.id,
        )
        .await
        .unwrap();

    let stored = fx.service.get_issue(issue.id).await.unwrap();
    assert_eq!(stored.last_updated_by_id, Some(editor.id));
    assert_eq!(stored.description.as_deref(), Some("Kutt i skatten"));

    let record = fx.service.load(issue.id).await.unwrap();
    let localizer = hdo_common::Localizer::default();
    assert_eq!(record.last_updated_by_name(&localizer), "Kari");
}

#[tokio::test]
async fn test_unchanged_request_keeps_previous_editor() {
    let fx = Fixture::new().await;
    let first = fx.user("Kari").await;
    let second = fx.user("Ola").await;
    let issue = fx.issue("Lavere skatt").await;

    fx.service
        .update_attributes_and_votes_for_user(
            issue.id,
            Some(attributes(json!({ "published": true }))),
            Vec::new(),
            first.id,
        )
        .await
        .unwrap();
    fx.service
        .update_attributes_and_votes_for_user(
            issue.id,
            Some(attributes(json!({ "published": true }))),
            Vec::new(),
            second.id,
        )
        .await
        .unwrap();

    let stored = fx.service.get_issue(issue.id).await.unwrap();
    assert_eq!(stored.last_updated_by_id, Some(first.id));
}

#[tokio::test]
async fn test_duplicate_title_is_rejected() {
    let fx = Fixture::new().await;
    let editor = fx.user("Ola").await;
    fx.issue("Lavere skatt").await;
    let other = fx.issue("Bompenger").await;

    let duplicate = fx
        .service
        .create_issue(
            NewIssue {
                title: "Lavere skatt".to_string(),
                description: None,
                published: false,
            },
            None,
        )
        .await
        .unwrap();
    assert!(duplicate.is_none());

    let outcome = fx
        .service
        .update_attributes_and_votes_for_user(
            other.id,
            Some(attributes(json!({ "title": "Lavere skatt", "published": true }))),
            Vec::new(),
            editor.id,
        )
        .await
        .unwrap();

    assert!(!outcome.saved);
    assert!(outcome.changed);

    let stored = fx.service.get_issue(other.id).await.unwrap();
    assert_eq!(stored.title, "Bompenger");
    assert!(!stored.published);
}

#[tokio::test]
async fn test_blank_title_is_rejected() {
    let fx = Fixture::new().await;
    let editor = fx.user("Ola").await;
    let issue = fx.issue("Lavere skatt").await;

    let outcome = fx
        .service
        .update_attributes_and_votes_for_user(
            issue.id,
            Some(attributes(json!({ "title": "   " }))),
            Vec::new(),
            editor.id,
        )
        .await
        .unwrap();

    assert!(!outcome.saved);
    assert_eq!(
        fx.service.get_issue(issue.id).await.unwrap().title,
        "Lavere skatt"
    );
}

#[tokio::test]
async fn test_title_change_updates_slug() {
    let fx = Fixture::new().await;
    let editor = fx.user("Ola").await;
    let issue = fx.issue("Lavere skatt").await;
    assert_eq!(issue.slug, "lavere-skatt");

    fx.service
        .update_attributes_and_votes_for_user(
            issue.id,
            Some(attributes(json!({ "title": "Høyere skatt" }))),
            Vec::new(),
            editor.id,
        )
        .await
        .unwrap();

    let found = fx.service.find_by_slug("høyere-skatt").await.unwrap();
    assert_eq!(found.map(|i| i.id), Some(issue.id));
}

#[tokio::test]
async fn test_slugs_are_unique() {
    let fx = Fixture::new().await;
    let first = fx.issue("Lavere skatt").await;
    let second = fx.issue("Lavere skatt!").await;

    assert_eq!(first.slug, "lavere-skatt");
    assert_eq!(second.slug, "lavere-skatt--2");
}

#[tokio::test]
async fn test_stats_are_invalidated_on_change() {
    let fx = Fixture::new().await;
    let editor = fx.user("Ola").await;
    let first = fx.vote("Statsbudsjettet", 2).await;
    let second = fx.vote("Revidert budsjett", 1).await;
    let issue = fx.issue("Lavere skatt").await;

    fx.service
        .update_attributes_and_votes_for_user(
            issue.id,
            None,
            vec![VoteEntry::new(first.id, Direction::For)],
            editor.id,
        )
        .await
        .unwrap();

    let stats = fx.service.stats(issue.id).await.unwrap();
    assert_eq!(stats.total, 1);
    assert!(fx.service.stats_cache().get(issue.id).await.is_some());

    fx.service
        .update_attributes_and_votes_for_user(
            issue.id,
            None,
            vec![VoteEntry::new(second.id, Direction::Against)],
            editor.id,
        )
        .await
        .unwrap();
    assert!(fx.service.stats_cache().get(issue.id).await.is_none());

    let stats = fx.service.stats(issue.id).await.unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.for_count, 1);
    assert_eq!(stats.against_count, 1);

    fx.service
        .update_attributes_and_votes_for_user(
            issue.id,
            None,
            vec![VoteEntry::new(first.id, Direction::Unrelated)],
            editor.id,
        )
        .await
        .unwrap();
    assert!(fx.service.stats_cache().get(issue.id).await.is_none());
    assert_eq!(fx.service.stats(issue.id).await.unwrap().total, 1);
}

#[tokio::test]
async fn test_vote_ordering() {
    let fx = Fixture::new().await;
    let editor = fx.user("Ola").await;
    let old = fx.vote("Gammel", 30).await;
    let recent = fx.vote("Ny", 1).await;
    let stale = fx.issue("Gammel sak").await;
    let fresh = fx.issue("Ny sak").await;
    let quiet = fx.issue("Stille sak").await;

    fx.service
        .update_attributes_and_votes_for_user(
            stale.id,
            None,
            vec![VoteEntry::new(old.id, Direction::For)],
            editor.id,
        )
        .await
        .unwrap();
    fx.service
        .update_attributes_and_votes_for_user(
            fresh.id,
            None,
            vec![
                VoteEntry::new(recent.id, Direction::For),
                VoteEntry::new(old.id, Direction::Against),
            ],
            editor.id,
        )
        .await
        .unwrap();

    let ordered: Vec<_> = fx
        .service
        .list_vote_ordered()
        .await
        .unwrap()
        .into_iter()
        .map(|i| i.id)
        .collect();
    assert_eq!(ordered, vec![fresh.id, stale.id, quiet.id]);

    let votes: Vec<_> = fx
        .service
        .votes_for_issue(fresh.id)
        .await
        .unwrap()
        .into_iter()
        .map(|v| v.id)
        .collect();
    assert_eq!(votes, vec![old.id, recent.id]);
}

#[tokio::test]
async fn test_list_published() {
    let fx = Fixture::new().await;
    let editor = fx.user("Ola").await;
    let draft = fx.issue("Utkast").await;
    let public = fx.issue("Publisert").await;

    fx.service
        .update_attributes_and_votes_for_user(
            public.id,
            Some(attributes(json!({ "published": true }))),
            Vec::new(),
            editor.id,
        )
        .await
        .unwrap();

    let published: Vec<_> = fx
        .service
        .list_published()
        .await
        .unwrap()
        .into_iter()
        .map(|i| i.id)
        .collect();
    assert_eq!(published, vec![public.id]);
    assert!(!published.contains(&draft.id));
}

#[tokio::test]
async fn test_delete_removes_connections() {
    let fx = Fixture::new().await;
    let editor = fx.user("Ola").await;
    let vote = fx.vote("Statsbudsjettet", 1).await;
    let issue = fx.issue("Lavere skatt").await;

    fx.service
        .update_attributes_and_votes_for_user(
            issue.id,
            None,
            vec![VoteEntry::new(vote.id, Direction::For)],
            editor.id,
        )
        .await
        .unwrap();

    fx.service.delete_issue(issue.id).await.unwrap();

    assert!(fx.service.get_issue(issue.id).await.is_err());
    assert!(VoteConnectionRepository::new(fx.db.shared())
        .find_by_issue(issue.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_unknown_issue_is_an_error() {
    let fx = Fixture::new().await;
    let editor = fx.user("Ola").await;

    let result = fx
        .service
        .update_attributes_and_votes_for_user(999, None, Vec::new(), editor.id)
        .await;

    assert!(matches!(
        result,
        Err(hdo_common::AppError::IssueNotFound(999))
    ));
}

#[tokio::test]
async fn test_vote_direction_for_topic() {
    let fx = Fixture::new().await;
    let topic = TopicRepository::new(fx.db.shared())
        .create("Formuesskatt")
        .await
        .unwrap();
    let vote = fx.vote("Statsbudsjettet", 1).await;
    let service = VoteDirectionService::new(VoteDirectionRepository::new(fx.db.shared()));

    let recorded = service
        .record(topic.id, vote.id, Direction::For)
        .await
        .unwrap()
        .unwrap();
    assert!(recorded.matches);

    let flipped = service
        .record(topic.id, vote.id, Direction::Against)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(flipped.id, recorded.id);
    assert!(!flipped.matches);

    assert!(service
        .record(topic.id, vote.id, Direction::Unrelated)
        .await
        .unwrap()
        .is_none());
    assert!(service.for_topic(topic.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_direction_flip_refreshes_stats() {
    let fx = Fixture::new().await;
    let editor = fx.user("Ola").await;
    let vote = fx.vote("Statsbudsjettet", 1).await;
    let issue = fx.issue("Lavere skatt").await;

    fx.service
        .update_attributes_and_votes_for_user(
            issue.id,
            None,
            vec![VoteEntry::new(vote.id, Direction::For)],
            editor.id,
        )
        .await
        .unwrap();

    let stats = fx.service.stats(issue.id).await.unwrap();
    assert_eq!((stats.for_count, stats.against_count), (1, 0));

    fx.service
        .update_attributes_and_votes_for_user(
            issue.id,
            None,
            vec![VoteEntry::new(vote.id, Direction::Against)],
            editor.id,
        )
        .await
        .unwrap();

    assert!(fx.service.stats_cache().get(issue.id).await.is_none());
    let stats = fx.service.stats(issue.id).await.unwrap();
    assert_eq!((stats.for_count, stats.against_count), (0, 1));
}

#[tokio::test]
async fn test_direction_flip_updates_connection_in_place() {
    let fx = Fixture::new().await;
    let editor = fx.user("Ola").await;
    let vote = fx.vote("Statsbudsjettet", 1).await;
    let issue = fx.issue("Lavere skatt").await;

    fx.service
        .update_attributes_and_votes_for_user(
            issue.id,
            None,
            vec![VoteEntry::new(vote.id, Direction::For)],
            editor.id,
        )
        .await
        .unwrap();
    let before = fx
        .service
        .connection_for(issue.id, vote.id)
        .await
        .unwrap()
        .unwrap();

    let outcome = fx
        .service
        .update_attributes_and_votes_for_user(
            issue.id,
            None,
            vec![VoteEntry::new(vote.id, Direction::Against)],
            editor.id,
        )
        .await
        .unwrap();

    assert!(outcome.saved);
    assert!(outcome.changed);

    let connections = fx.service.load(issue.id).await.unwrap().connections().to_vec();
    assert_eq!(connections.len(), 1);
    assert_eq!(connections[0].id, before.id);
    assert!(!connections[0].matches);
}

#[tokio::test]
async fn test_vote_only_change_touches_issue() {
    let fx = Fixture::new().await;
    let editor = fx.user("Ola").await;
    let vote = fx.vote("Statsbudsjettet", 1).await;
    let issue = fx.issue("Lavere skatt").await;

    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    let outcome = fx
        .service
        .update_attributes_and_votes_for_user(
            issue.id,
            None,
            vec![VoteEntry::new(vote.id, Direction::For)],
            editor.id,
        )
        .await
        .unwrap();
    assert!(outcome.changed);

    let stored = fx.service.get_issue(issue.id).await.unwrap();
    assert!(stored.updated_at > issue.updated_at);
    assert_eq!(stored.title, issue.title);
    assert_eq!(stored.last_updated_by_id, Some(editor.id));
}

#[tokio::test]
async fn test_unrelated_without_connection_stores_non_matching() {
    let fx = Fixture::new().await;
    let editor = fx.user("Ola").await;
    let vote = fx.vote("Statsbudsjettet", 1).await;
    let issue = fx.issue("Lavere skatt").await;

    let outcome = fx
        .service
        .update_attributes_and_votes_for_user(
            issue.id,
            None,
            vec![VoteEntry::new(vote.id, Direction::Unrelated)],
            editor.id,
        )
        .await
        .unwrap();

    assert!(outcome.changed);

    let connection = fx
        .service
        .connection_for(issue.id, vote.id)
        .await
        .unwrap()
        .unwrap();
    assert!(!connection.matches);
    assert!(fx.service.vote_against(issue.id, vote.id).await.unwrap());
}
