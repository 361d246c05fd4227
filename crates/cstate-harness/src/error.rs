use thiserror::Error;

pub type Result<T> = std::result::Result<T, HarnessError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HarnessError {
    #[error("field did not settle within {limit} cycles")]
    CycleLimitExceeded { limit: usize },
}

impl HarnessError {
    #[must_use]
    pub fn cycle_limit(limit: usize) -> Self {
        Self::CycleLimitExceeded { limit }
    }
}
