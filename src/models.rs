use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;

/// Represents a GitHub user profile from the `/users/{username}` API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserProfile {
    pub login: String,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub avatar_url: String,
    pub bio: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub html_url: String,
    #[serde(default, deserialize_with = "lenient")]
    pub public_repos: u32,
    #[serde(default, deserialize_with = "lenient")]
    pub followers: u32,
    #[serde(default, deserialize_with = "lenient")]
    pub following: u32,
    #[serde(default, deserialize_with = "lenient")]
    pub created_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// Display name, falling back to the login when the profile has none.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.login)
    }

    /// "Joined March 2020", or `None` when the creation instant is unknown.
    pub fn joined_label(&self) -> Option<String> {
        self.created_at
            .map(|at| format!("Joined {}", at.format("%B %Y")))
    }
}

/// A single repository from `/users/{username}/repos`.
///
/// Every field defaults individually so one malformed value never rejects
/// the record. Missing instants stay `None` and sort as the minimal key.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Repository {
    #[serde(default, deserialize_with = "lenient")]
    pub id: u64,
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub language: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub stargazers_count: u32,
    #[serde(default, deserialize_with = "lenient")]
    pub forks_count: u32,
    #[serde(default, deserialize_with = "lenient")]
    pub open_issues_count: u32,
    #[serde(default, deserialize_with = "lenient")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient")]
    pub html_url: String,
}

impl Repository {
    /// Declared language, treating an empty string as undeclared.
    pub fn declared_language(&self) -> Option<&str> {
        self.language
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
    }
}

/// Decodes a repository list element by element, skipping entries that are
/// not JSON objects instead of failing the whole batch. A repeated non-zero
/// id keeps only its first record.
pub fn repositories_from_values(values: Vec<serde_json::Value>) -> Vec<Repository> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| {
            if !value.is_object() {
                tracing::warn!(index, "skipping repository record that is not an object");
                return None;
            }
            match serde_json::from_value::<Repository>(value) {
                Ok(repo) if repo.id != 0 && !seen.insert(repo.id) => {
                    tracing::warn!(index, id = repo.id, "skipping duplicate repository id");
                    None
                }
                Ok(repo) => Some(repo),
                Err(e) => {
                    tracing::warn!(index, error = %e, "skipping malformed repository record");
                    None
                }
            }
        })
        .collect()
}

/// Deserializes `T`, substituting `T::default()` for nulls and values of the
/// wrong shape.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}
