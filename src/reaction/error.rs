use std::fmt;

/// Error returned when mapping a reaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReactionError {
    /// The educt side is empty.
    NoEducts,
    /// The product side is empty.
    NoProducts,
    /// The worker pool could not be built.
    ThreadPool(String),
}

impl fmt::Display for ReactionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoEducts => write!(f, "reaction has no educts"),
            Self::NoProducts => write!(f, "reaction has no products"),
            Self::ThreadPool(detail) => write!(f, "failed to build worker pool: {detail}"),
        }
    }
}

impl std::error::Error for ReactionError {}

impl From<rayon::ThreadPoolBuildError> for ReactionError {
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        Self::ThreadPool(e.to_string())
    }
}
