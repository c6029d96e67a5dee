//! Issue service.
//!
//! Editors change an issue in one step: they send new attribute values
//! together with the direction each vote takes on the issue. The service
//! merges both into the stored issue and saves it once.

use chrono::Utc;
use hdo_common::{slugify, AppError, AppResult};
use hdo_db::entities::{issue, vote, vote_connection};
use hdo_db::repositories::{
    IssueAssociation, IssueRepository, UserRepository, VoteConnectionRepository,
};
use sea_orm::{NotSet, Set};
use serde_json::{Map, Value};
use std::sync::Arc;
use validator::Validate;

use super::issue_input::{Direction, IssueAttributes, NewIssue, TitleRules, VoteEntry};
use super::issue_record::IssueRecord;
use super::stats::{StatsCache, VoteStats};

const ASSOCIATIONS: [IssueAssociation; 3] = [
    IssueAssociation::Topics,
    IssueAssociation::Categories,
    IssueAssociation::Promises,
];

/// Result of [`IssueService::update_attributes_and_votes_for_user`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Whether the final save passed validation.
    pub saved: bool,
    /// Whether any vote connection, association or attribute changed.
    pub changed: bool,
}

/// Issue service for business logic.
#[derive(Clone)]
pub struct IssueService {
    issue_repo: IssueRepository,
    connection_repo: VoteConnectionRepository,
    user_repo: UserRepository,
    stats: StatsCache,
}

impl IssueService {
    /// Create a new issue service.
    #[must_use]
    pub const fn new(
        issue_repo: IssueRepository,
        connection_repo: VoteConnectionRepository,
        user_repo: UserRepository,
        stats: StatsCache,
    ) -> Self {
        Self {
            issue_repo,
            connection_repo,
            user_repo,
            stats,
        }
    }

    /// The stats cache shared by this service.
    #[must_use]
    pub const fn stats_cache(&self) -> &StatsCache {
        &self.stats
    }

    /// Get an issue row by ID.
    pub async fn get_issue(&self, issue_id: i32) -> AppResult<issue::Model> {
        self.issue_repo.get_by_id(issue_id).await
    }

    /// Find an issue by its slug.
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<issue::Model>> {
        self.issue_repo.find_by_slug(slug).await
    }

    /// Published issues.
    pub async fn list_published(&self) -> AppResult<Vec<issue::Model>> {
        self.issue_repo.find_published().await
    }

    /// All issues, most recently voted on first.
    pub async fn list_vote_ordered(&self) -> AppResult<Vec<issue::Model>> {
        self.issue_repo.find_vote_ordered().await
    }

    /// Votes connected to an issue, oldest first.
    pub async fn votes_for_issue(&self, issue_id: i32) -> AppResult<Vec<vote::Model>> {
        self.issue_repo.find_votes(issue_id).await
    }

    /// Load an issue with its editor, associations and vote connections.
    pub async fn load(&self, issue_id: i32) -> AppResult<IssueRecord> {
        let issue = self.issue_repo.get_by_id(issue_id).await?;

        let last_updated_by = match issue.last_updated_by_id {
            Some(user_id) => self.user_repo.find_by_id(user_id).await?,
            None => None,
        };
        let connections = self.connection_repo.find_by_issue(issue_id).await?;

        let mut record = IssueRecord::new(issue, last_updated_by, connections);
        for association in ASSOCIATIONS {
            let ids = self
                .issue_repo
                .association_ids(association, issue_id)
                .await?;
            record = record.with_association_ids(association, ids);
        }

        Ok(record)
    }

    /// Create an issue.
    ///
    /// Returns `None` when the title is blank or already taken.
    pub async fn create_issue(
        &self,
        input: NewIssue,
        user_id: Option<i32>,
    ) -> AppResult<Option<issue::Model>> {
        if let Err(e) = input.validate() {
            tracing::warn!(error = %e, "Rejected new issue");
            return Ok(None);
        }
        if self.issue_repo.title_taken(&input.title, None).await? {
            tracing::warn!(title = %input.title, "Rejected new issue: title taken");
            return Ok(None);
        }

        let slug = self.unique_slug(&slugify(&input.title), None).await?;
        let now = Utc::now();

        let model = issue::ActiveModel {
            id: NotSet,
            title: Set(input.title),
            description: Set(input.description),
            published: Set(input.published),
            slug: Set(slug),
            last_updated_by_id: Set(user_id),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let created = self.issue_repo.create(model).await?;
        tracing::info!(issue_id = created.id, slug = %created.slug, "Issue created");

        Ok(Some(created))
    }

    /// Delete an issue and everything it owns.
    pub async fn delete_issue(&self, issue_id: i32) -> AppResult<()> {
        self.issue_repo.get_by_id(issue_id).await?;
        self.stats.invalidate(issue_id).await;
        self.issue_repo.delete(issue_id).await?;

        tracing::info!(issue_id, "Issue deleted");
        Ok(())
    }

    /// Merge attribute changes and vote directions into an issue and save it.
    ///
    /// Vote entries are applied first, in order. A vote marked
    /// [`Direction::Unrelated`] loses its existing connection; any other entry
    /// updates the existing connection or creates one. Failures while writing
    /// connections abort the call with an error and leave earlier writes in
    /// place.
    ///
    /// The issue is then saved once. A blank or duplicate title makes the save
    /// fail with `saved == false` rather than an error; in that case no
    /// attribute or association change is written.
    pub async fn update_attributes_and_votes_for_user(
        &self,
        issue_id: i32,
        attributes: Option<IssueAttributes>,
        votes: Vec<VoteEntry>,
        user_id: i32,
    ) -> AppResult<ReconcileOutcome> {
        let user = self.user_repo.get_by_id(user_id).await?;
        let mut record = self.load(issue_id).await?;

        let requested_ids = match &attributes {
            Some(attributes) => attributes.normalized_associations()?,
            None => Vec::new(),
        };

        let mut changed = false;

        for entry in votes {
            changed |= self.apply_vote_entry(&mut record, entry).await?;
        }

        if changed {
            let now = Utc::now();
            self.issue_repo.touch(issue_id, now.into()).await?;
            record.mark_touched(now);
        }

        let mut pending_ids = Vec::new();
        if let Some(attributes) = &attributes {
            for (association, ids) in requested_ids {
                if ids.as_slice() != record.association_ids(association) {
                    changed = true;
                    pending_ids.push((association, ids));
                }
            }

            record.assign(attributes);
            changed |= record.attributes_changed();
        }

        if changed {
            record.set_last_updated_by(user);
        }

        let saved = self.save(&mut record, pending_ids).await?;

        Ok(ReconcileOutcome { saved, changed })
    }

    /// Apply one vote entry, returning whether the connection set changed.
    ///
    /// Every write to a connection drops the issue's cached stats first.
    async fn apply_vote_entry(&self, record: &mut IssueRecord, entry: VoteEntry) -> AppResult<bool> {
        let issue_id = record.id();
        let existing = self
            .connection_repo
            .find_by_issue_and_vote(issue_id, entry.vote_id)
            .await?;

        tracing::debug!(
            issue_id,
            vote_id = entry.vote_id,
            direction = ?entry.direction,
            existing = existing.is_some(),
            "Applying vote direction"
        );

        match existing {
            Some(connection) if entry.direction == Direction::Unrelated => {
                self.remove_vote_connection(record, &connection).await?;
                Ok(true)
            }
            Some(connection) => {
                let matches = entry.direction.matches();
                let data = merge_data(&connection.data, entry.data);
                if connection.matches == matches && connection.data == data {
                    return Ok(false);
                }

                let mut active: vote_connection::ActiveModel = connection.into();
                active.matches = Set(matches);
                active.data = Set(data);

                self.stats.invalidate(issue_id).await;
                let updated = self.connection_repo.update(active).await?;
                record.replace_connection(updated);
                Ok(true)
            }
            None => {
                self.add_vote_connection(
                    record,
                    entry.vote_id,
                    entry.direction.matches(),
                    Value::Object(entry.data),
                )
                .await?;
                Ok(true)
            }
        }
    }

    /// Connect a vote to an issue.
    ///
    /// The issue's cached stats are dropped before the row is written.
    pub async fn add_vote_connection(
        &self,
        record: &mut IssueRecord,
        vote_id: i32,
        matches: bool,
        data: Value,
    ) -> AppResult<vote_connection::Model> {
        self.stats.invalidate(record.id()).await;

        let created = self
            .connection_repo
            .create(vote_connection::ActiveModel {
                id: NotSet,
                vote_id: Set(vote_id),
                issue_id: Set(record.id()),
                matches: Set(matches),
                data: Set(data),
            })
            .await?;

        record.push_connection(created.clone());
        Ok(created)
    }

    /// Disconnect a vote from an issue.
    ///
    /// The issue's cached stats are dropped before the row is deleted.
    pub async fn remove_vote_connection(
        &self,
        record: &mut IssueRecord,
        connection: &vote_connection::Model,
    ) -> AppResult<()> {
        if connection.issue_id != record.id() {
            return Err(AppError::BadRequest(format!(
                "Vote connection {} does not belong to issue {}",
                connection.id,
                record.id()
            )));
        }

        self.stats.invalidate(record.id()).await;
        self.connection_repo.delete(connection.id).await?;
        record.drop_connection(connection.id);
        Ok(())
    }

    /// Validate and write the record, returning whether it passed validation.
    async fn save(
        &self,
        record: &mut IssueRecord,
        pending_ids: Vec<(IssueAssociation, Vec<i32>)>,
    ) -> AppResult<bool> {
        let issue_id = record.id();

        if let Err(e) = TitleRules::new(record.title()).validate() {
            tracing::warn!(issue_id, error = %e, "Issue not saved: invalid title");
            return Ok(false);
        }
        if self
            .issue_repo
            .title_taken(record.title(), Some(issue_id))
            .await?
        {
            tracing::warn!(issue_id, title = %record.title(), "Issue not saved: title taken");
            return Ok(false);
        }

        if record.is_dirty() {
            if record.attributes_changed() {
                record.touch(Utc::now());
            }
            if record.issue().slug != record.persisted_slug() {
                let slug = self
                    .unique_slug(&record.issue().slug, Some(issue_id))
                    .await?;
                record.set_slug(slug);
            }

            let stored = self.issue_repo.update(record.changes()).await?;
            record.mark_persisted(stored);
        }

        for (association, ids) in pending_ids {
            self.issue_repo
                .replace_association_ids(association, issue_id, &ids)
                .await?;
            record.set_association_ids(association, ids);
        }

        tracing::info!(issue_id, "Issue saved");
        Ok(true)
    }

    /// Find a slug not used by any other issue, appending `--2`, `--3`, ...
    async fn unique_slug(&self, base: &str, except_id: Option<i32>) -> AppResult<String> {
        let base = if base.is_empty() { "issue" } else { base };

        let mut candidate = base.to_string();
        let mut sequence = 1;
        loop {
            match self.issue_repo.find_by_slug(&candidate).await? {
                Some(existing) if Some(existing.id) != except_id => {
                    sequence += 1;
                    candidate = format!("{base}--{sequence}");
                }
                _ => return Ok(candidate),
            }
        }
    }

    /// Whether some connection marks the vote as supporting the issue.
    pub async fn vote_for(&self, issue_id: i32, vote_id: i32) -> AppResult<bool> {
        self.connection_repo
            .has_connection(issue_id, vote_id, true)
            .await
    }

    /// Whether some connection marks the vote as opposing the issue.
    pub async fn vote_against(&self, issue_id: i32, vote_id: i32) -> AppResult<bool> {
        self.connection_repo
            .has_connection(issue_id, vote_id, false)
            .await
    }

    /// The connection between an issue and a vote, if any.
    pub async fn connection_for(
        &self,
        issue_id: i32,
        vote_id: i32,
    ) -> AppResult<Option<vote_connection::Model>> {
        self.connection_repo
            .find_by_issue_and_vote(issue_id, vote_id)
            .await
    }

    /// Vote stats for an issue, computed on first use.
    pub async fn stats(&self, issue_id: i32) -> AppResult<Arc<VoteStats>> {
        if let Some(stats) = self.stats.get(issue_id).await {
            return Ok(stats);
        }

        let connections = self.connection_repo.find_by_issue(issue_id).await?;
        Ok(self.stats.get_or_compute(issue_id, &connections).await)
    }
}

/// Overlay incoming pass-through fields on the stored ones.
fn merge_data(stored: &Value, incoming: Map<String, Value>) -> Value {
    let mut merged = match stored {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    merged.extend(incoming);
    Value::Object(merged)
}
