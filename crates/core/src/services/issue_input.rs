//! Editor input for issues: attribute changes and vote directions.

use hdo_common::{AppError, AppResult};
use hdo_db::repositories::IssueAssociation;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use validator::{Validate, ValidationError};

/// Keys in vote data that are derived by the reconciliation and never stored
/// as pass-through data.
const RESERVED_VOTE_KEYS: [&str; 5] = ["direction", "matches", "vote_id", "issue_id", "id"];

/// Attribute changes an editor may apply to an issue.
///
/// Only the fields listed here are accepted; anything else is rejected when
/// parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IssueAttributes {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub published: Option<bool>,
    pub category_ids: Option<Vec<String>>,
    pub promise_ids: Option<Vec<String>>,
    pub topic_ids: Option<Vec<String>>,
}

fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

impl IssueAttributes {
    /// Parse attributes from a JSON object, rejecting unknown fields.
    pub fn from_json(value: Value) -> AppResult<Self> {
        serde_json::from_value(value).map_err(|e| AppError::Validation(e.to_string()))
    }

    /// Raw ids supplied for an association, if the field was present.
    #[must_use]
    pub fn raw_ids(&self, association: IssueAssociation) -> Option<&[String]> {
        match association {
            IssueAssociation::Topics => self.topic_ids.as_deref(),
            IssueAssociation::Categories => self.category_ids.as_deref(),
            IssueAssociation::Promises => self.promise_ids.as_deref(),
        }
    }

    /// Normalized id lists for every association present in the attributes.
    ///
    /// Fails on the first id that is not an integer, before anything has been
    /// written.
    pub fn normalized_associations(&self) -> AppResult<Vec<(IssueAssociation, Vec<i32>)>> {
        [
            IssueAssociation::Categories,
            IssueAssociation::Promises,
            IssueAssociation::Topics,
        ]
        .into_iter()
        .filter_map(|association| {
            self.raw_ids(association).map(|raw| {
                normalize_ids(raw)
                    .map(|ids| (association, ids))
                    .map_err(|e| {
                        AppError::Validation(format!("{}: {e}", association.field_name()))
                    })
            })
        })
        .collect()
    }
}

/// Normalize a list of string-encoded ids.
///
/// Empty entries are dropped, the rest parsed, sorted and deduplicated so
/// that the result can be compared against the ids already linked.
pub fn normalize_ids(raw: &[String]) -> AppResult<Vec<i32>> {
    let mut ids = raw
        .iter()
        .filter(|id| !id.is_empty())
        .map(|id| {
            id.trim()
                .parse::<i32>()
                .map_err(|_| AppError::Validation(format!("invalid id {id:?}")))
        })
        .collect::<AppResult<Vec<_>>>()?;

    ids.sort_unstable();
    ids.dedup();
    Ok(ids)
}

/// Input for creating an issue.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewIssue {
    #[validate(length(min = 1), custom(function = "validate_not_blank"))]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub published: bool,
}

/// Title rules checked before an issue is saved.
#[derive(Debug, Validate)]
pub(crate) struct TitleRules {
    #[validate(length(min = 1), custom(function = "validate_not_blank"))]
    pub title: String,
}

impl TitleRules {
    pub(crate) fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
        }
    }
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// How a vote relates to an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// The vote supports the issue.
    For,
    /// The vote opposes the issue.
    Against,
    /// The vote has nothing to do with the issue.
    Unrelated,
}

impl Direction {
    /// Value stored in `vote_connection.matches`.
    #[must_use]
    pub fn matches(self) -> bool {
        self == Self::For
    }
}

/// A vote direction submitted by an editor, with pass-through data.
#[derive(Debug, Clone, PartialEq)]
pub struct VoteEntry {
    pub vote_id: i32,
    pub direction: Direction,
    pub data: Map<String, Value>,
}

impl VoteEntry {
    /// Create an entry without extra data.
    #[must_use]
    pub fn new(vote_id: i32, direction: Direction) -> Self {
        Self {
            vote_id,
            direction,
            data: Map::new(),
        }
    }

    /// Attach a pass-through field.
    #[must_use]
    pub fn with(mut self, key: &str, value: Value) -> Self {
        if !RESERVED_VOTE_KEYS.contains(&key) {
            self.data.insert(key.to_string(), value);
        }
        self
    }

    /// Parse entries from an object keyed by vote id, e.g.
    /// `{"12": {"direction": "for", "comment": "..."}}`.
    ///
    /// Entries come back ordered by vote id.
    pub fn parse_map(value: Value) -> AppResult<Vec<Self>> {
        let Value::Object(map) = value else {
            return Err(AppError::Validation("votes must be an object".to_string()));
        };

        let mut entries = map
            .into_iter()
            .map(|(key, data)| Self::parse_one(&key, data))
            .collect::<AppResult<Vec<_>>>()?;

        entries.sort_by_key(|entry| entry.vote_id);
        Ok(entries)
    }

    fn parse_one(key: &str, data: Value) -> AppResult<Self> {
        let vote_id = key
            .trim()
            .parse::<i32>()
            .map_err(|_| AppError::Validation(format!("invalid vote id {key:?}")))?;

        let Value::Object(mut data) = data else {
            return Err(AppError::Validation(format!(
                "data for vote {vote_id} must be an object"
            )));
        };

        let direction = data
            .remove("direction")
            .ok_or_else(|| AppError::Validation(format!("missing direction for vote {vote_id}")))
            .and_then(|d| {
                serde_json::from_value::<Direction>(d).map_err(|e| {
                    AppError::Validation(format!("invalid direction for vote {vote_id}: {e}"))
                })
            })?;

        for key in RESERVED_VOTE_KEYS {
            data.remove(key);
        }

        Ok(Self {
            vote_id,
            direction,
            data,
        })
    }
}
