//! Error types for compiling and querying speed regions.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SpeedRegionsError>;

#[derive(Debug, Error)]
pub enum SpeedRegionsError {
    /// A feature was rejected before compilation started.
    #[error("Invalid feature {feature} in feature collection {collection}: {reason}")]
    InvalidFeature {
        collection: usize,
        feature: usize,
        reason: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Duplicate rule id: {0}")]
    DuplicateRuleId(String),

    #[error("Cannot find parent rule with id {0}")]
    MissingParentRule(String),

    #[error("Found circular dependencies in rule parent ids around rule id {0}")]
    CircularRuleDependency(String),

    #[error("More than one speed rule exists for encoder {encoder} and regiontype {region_type}")]
    DuplicateRuleBinding {
        encoder: String,
        region_type: String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Internal defect in the quadtree compiler; never caused by user input.
    #[error("Quadtree compiler invariant violated: {0}")]
    CompilerInvariant(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationErrorWithContext(String),

    #[error("Invalid file format")]
    InvalidFormat,
}

impl From<serde_json::Error> for SpeedRegionsError {
    fn from(e: serde_json::Error) -> Self {
        SpeedRegionsError::SerializationErrorWithContext(e.to_string())
    }
}

impl SpeedRegionsError {
    pub(crate) fn invalid_feature(collection: usize, feature: usize, reason: impl Into<String>) -> Self {
        SpeedRegionsError::InvalidFeature {
            collection,
            feature,
            reason: reason.into(),
        }
    }

    /// Whether this error describes bad input data rather than an I/O or internal failure.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            SpeedRegionsError::InvalidFeature { .. }
                | SpeedRegionsError::InvalidInput(_)
                | SpeedRegionsError::DuplicateRuleId(_)
                | SpeedRegionsError::MissingParentRule(_)
                | SpeedRegionsError::CircularRuleDependency(_)
                | SpeedRegionsError::DuplicateRuleBinding { .. }
        )
    }
}
