//! A loaded issue with its associations, vote connections and change tracking.

use chrono::{DateTime, Utc};
use hdo_common::i18n::{KEY_NOBODY, KEY_NOT_PUBLISHED, KEY_PUBLISHED};
use hdo_common::{slugify, Localizer};
use hdo_db::entities::{issue, user, vote_connection};
use hdo_db::repositories::IssueAssociation;
use once_cell::unsync::OnceCell;
use sea_orm::Set;

use super::issue_input::IssueAttributes;

/// An issue as loaded for editing.
///
/// Keeps the row as it was loaded next to the working copy so that the
/// save step can tell exactly which columns differ.
#[derive(Debug, Clone)]
pub struct IssueRecord {
    issue: issue::Model,
    snapshot: issue::Model,
    last_updated_by: Option<user::Model>,
    topic_ids: Vec<i32>,
    category_ids: Vec<i32>,
    promise_ids: Vec<i32>,
    connections: Vec<vote_connection::Model>,
    downcased_title: OnceCell<String>,
}

impl IssueRecord {
    /// Wrap freshly loaded rows.
    #[must_use]
    pub fn new(
        issue: issue::Model,
        last_updated_by: Option<user::Model>,
        connections: Vec<vote_connection::Model>,
    ) -> Self {
        Self {
            snapshot: issue.clone(),
            issue,
            last_updated_by,
            topic_ids: Vec::new(),
            category_ids: Vec::new(),
            promise_ids: Vec::new(),
            connections,
            downcased_title: OnceCell::new(),
        }
    }

    /// Attach sorted association ids.
    #[must_use]
    pub fn with_association_ids(mut self, association: IssueAssociation, ids: Vec<i32>) -> Self {
        self.set_association_ids(association, ids);
        self
    }

    #[must_use]
    pub const fn id(&self) -> i32 {
        self.issue.id
    }

    /// The working copy of the issue row.
    #[must_use]
    pub const fn issue(&self) -> &issue::Model {
        &self.issue
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.issue.title
    }

    #[must_use]
    pub const fn is_published(&self) -> bool {
        self.issue.published
    }

    /// Vote connections currently known for the issue.
    #[must_use]
    pub fn connections(&self) -> &[vote_connection::Model] {
        &self.connections
    }

    /// Sorted ids linked through an association.
    #[must_use]
    pub fn association_ids(&self, association: IssueAssociation) -> &[i32] {
        match association {
            IssueAssociation::Topics => &self.topic_ids,
            IssueAssociation::Categories => &self.category_ids,
            IssueAssociation::Promises => &self.promise_ids,
        }
    }

    pub(crate) fn set_association_ids(&mut self, association: IssueAssociation, mut ids: Vec<i32>) {
        ids.sort_unstable();
        match association {
            IssueAssociation::Topics => self.topic_ids = ids,
            IssueAssociation::Categories => self.category_ids = ids,
            IssueAssociation::Promises => self.promise_ids = ids,
        }
    }

    pub(crate) fn push_connection(&mut self, connection: vote_connection::Model) {
        self.connections.push(connection);
    }

    pub(crate) fn replace_connection(&mut self, connection: vote_connection::Model) {
        if let Some(slot) = self.connections.iter_mut().find(|c| c.id == connection.id) {
            *slot = connection;
        }
    }

    pub(crate) fn drop_connection(&mut self, connection_id: i32) {
        self.connections.retain(|c| c.id != connection_id);
    }

    /// The connection to a vote, if any.
    #[must_use]
    pub fn connection_for(&self, vote_id: i32) -> Option<&vote_connection::Model> {
        self.connections.iter().find(|c| c.vote_id == vote_id)
    }

    /// Whether some connection marks the vote as supporting the issue.
    #[must_use]
    pub fn vote_for(&self, vote_id: i32) -> bool {
        self.connections
            .iter()
            .any(|c| c.matches && c.vote_id == vote_id)
    }

    /// Whether some connection marks the vote as opposing the issue.
    #[must_use]
    pub fn vote_against(&self, vote_id: i32) -> bool {
        self.connections
            .iter()
            .any(|c| !c.matches && c.vote_id == vote_id)
    }

    /// Change the title, re-deriving the slug.
    pub fn set_title(&mut self, title: &str) {
        if self.issue.title != title {
            self.issue.title = title.to_string();
            self.issue.slug = slugify(title);
            self.downcased_title = OnceCell::new();
        }
    }

    pub(crate) fn persisted_slug(&self) -> &str {
        &self.snapshot.slug
    }

    pub(crate) fn set_slug(&mut self, slug: String) {
        self.issue.slug = slug;
    }

    /// Apply attribute changes to the working copy.
    ///
    /// Association ids are handled separately by the service; only the scalar
    /// columns are assigned here.
    pub fn assign(&mut self, attributes: &IssueAttributes) {
        if let Some(title) = &attributes.title {
            self.set_title(title);
        }
        if let Some(description) = &attributes.description {
            self.issue.description = description.clone();
        }
        if let Some(published) = attributes.published {
            self.issue.published = published;
        }
    }

    /// Whether any editable column differs from the loaded row.
    #[must_use]
    pub fn attributes_changed(&self) -> bool {
        self.issue.title != self.snapshot.title
            || self.issue.description != self.snapshot.description
            || self.issue.published != self.snapshot.published
    }

    /// Whether any column at all differs from the loaded row.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.issue != self.snapshot
    }

    /// Set the modification timestamp without touching anything else.
    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.issue.updated_at = at.into();
    }

    /// Record that the issue was persisted as it is now.
    pub(crate) fn mark_touched(&mut self, at: DateTime<Utc>) {
        self.touch(at);
        self.snapshot.updated_at = self.issue.updated_at;
    }

    pub fn set_last_updated_by(&mut self, user: user::Model) {
        self.issue.last_updated_by_id = Some(user.id);
        self.last_updated_by = Some(user);
    }

    /// Active model with exactly the columns that differ from the loaded row
    /// marked for update.
    #[must_use]
    pub fn changes(&self) -> issue::ActiveModel {
        let mut active: issue::ActiveModel = self.snapshot.clone().into();

        if self.issue.title != self.snapshot.title {
            active.title = Set(self.issue.title.clone());
        }
        if self.issue.slug != self.snapshot.slug {
            active.slug = Set(self.issue.slug.clone());
        }
        if self.issue.description != self.snapshot.description {
            active.description = Set(self.issue.description.clone());
        }
        if self.issue.published != self.snapshot.published {
            active.published = Set(self.issue.published);
        }
        if self.issue.last_updated_by_id != self.snapshot.last_updated_by_id {
            active.last_updated_by_id = Set(self.issue.last_updated_by_id);
        }
        if self.issue.updated_at != self.snapshot.updated_at {
            active.updated_at = Set(self.issue.updated_at);
        }

        active
    }

    /// Adopt the stored row after a successful save.
    pub(crate) fn mark_persisted(&mut self, stored: issue::Model) {
        self.snapshot = stored.clone();
        self.issue = stored;
    }

    /// The title with its first character lower-cased.
    pub fn downcased_title(&self) -> &str {
        self.downcased_title
            .get_or_init(|| downcase_first(&self.issue.title))
    }

    /// Localized label for the publication state.
    #[must_use]
    pub fn published_text(&self, localizer: &Localizer) -> String {
        if self.issue.published {
            localizer.t(KEY_PUBLISHED)
        } else {
            localizer.t(KEY_NOT_PUBLISHED)
        }
    }

    /// Publication state as a CSS-friendly token.
    #[must_use]
    pub const fn published_state(&self) -> &'static str {
        if self.issue.published {
            "published"
        } else {
            "not-published"
        }
    }

    /// Name of the last editor, or the localized "nobody".
    #[must_use]
    pub fn last_updated_by_name(&self, localizer: &Localizer) -> String {
        self.last_updated_by
            .as_ref()
            .map_or_else(|| localizer.t(KEY_NOBODY), |user| user.name.clone())
    }
}

fn downcase_first(title: &str) -> String {
    let mut chars = title.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
