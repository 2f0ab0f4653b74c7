//! Search configuration.

use serde::{Deserialize, Serialize};

/// Environment variable overriding [`SearchConfig::max_rounds`].
pub const MAX_ROUNDS_ENV: &str = "BLOCKFLOW_MAX_SEARCH_ROUNDS";

/// Configuration for [`GraphSearch`](super::GraphSearch).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum number of BFS rounds before the search stops and reports
    /// [`SearchStatus::Truncated`](super::SearchStatus::Truncated). Default: 20.
    pub max_rounds: usize,
}

impl SearchConfig {
    /// Default round cap. Deep enough for any chain a single device builds.
    pub const DEFAULT_MAX_ROUNDS: usize = 20;

    /// Reads `BLOCKFLOW_MAX_SEARCH_ROUNDS`, falling back to the default when
    /// it is unset or not a number.
    pub fn from_env() -> Self {
        let raw = std::env::var(MAX_ROUNDS_ENV).ok();
        Self::from_env_value(raw.as_deref())
    }

    fn from_env_value(raw: Option<&str>) -> Self {
        let max_rounds = match raw {
            None => Self::DEFAULT_MAX_ROUNDS,
            Some(value) => match value.trim().parse::<usize>() {
                Ok(rounds) => rounds,
                Err(_) => {
                    tracing::warn!(
                        var = MAX_ROUNDS_ENV,
                        value = %value,
                        "ignoring unparsable search round limit"
                    );
                    Self::DEFAULT_MAX_ROUNDS
                }
            },
        };
        SearchConfig { max_rounds }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            max_rounds: Self::DEFAULT_MAX_ROUNDS,
        }
    }
}
