//! Client-generated discussion identifiers.

use std::fmt;

use rand::RngExt;
use rand::distr::Alphanumeric;
use serde::{Deserialize, Serialize};

/// Length of the random suffix of a generated identifier.
const SUFFIX_LEN: usize = 7;

/// Opaque identifier correlating a question channel with its answer channel.
///
/// Generated once per widget and never persisted; the server treats it as
/// an opaque routing key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiscussionId(String);

impl DiscussionId {
    /// Generate a fresh identifier of the form
    /// `discussion-<millisecond timestamp>-<7-char base-36 suffix>`.
    pub fn generate() -> Self {
        let suffix: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(SUFFIX_LEN)
            .map(char::from)
            .map(|c| c.to_ascii_lowercase())
            .collect();
        DiscussionId(format!(
            "discussion-{}-{}",
            chrono::Utc::now().timestamp_millis(),
            suffix
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DiscussionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for DiscussionId {
    fn from(value: String) -> Self {
        DiscussionId(value)
    }
}

impl From<&str> for DiscussionId {
    fn from(value: &str) -> Self {
        DiscussionId(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_id_has_expected_shape() {
        let id = DiscussionId::generate();
        let parts: Vec<&str> = id.as_str().splitn(3, '-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "discussion");
        assert!(parts[1].parse::<i64>().expect("millis") > 0);
        assert_eq!(parts[2].len(), SUFFIX_LEN);
        assert!(
            parts[2]
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn generated_ids_differ() {
        assert_ne!(DiscussionId::generate(), DiscussionId::generate());
    }
}
