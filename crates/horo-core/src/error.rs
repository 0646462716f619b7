//! Error types for the engine. Bad defining data surfaces as a
//! [`ConfigurationError`]; bad request parameters as
//! [`HoroError::InvalidParameter`].

use thiserror::Error;

/// Malformed defining data, or a label that the presentation does not know.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("unknown generator: {0}")]
    UnknownGenerator(String),

    #[error("generators {first} and {second} share rank {rank}")]
    DuplicateRank {
        first: String,
        second: String,
        rank: i64,
    },

    #[error("generator {0} is listed as commuting with itself")]
    SelfCommutation(String),

    #[error("{from} commutes with {to}, but {to} does not list {from}")]
    AsymmetricCommutation { from: String, to: String },

    #[error("{0} generators exceed the supported maximum of {max}", max = crate::MAX_GENERATORS)]
    TooManyGenerators(usize),

    #[error("the ordering defines no generators")]
    EmptyAlphabet,

    #[error("precondition violated: {0}")]
    PreconditionViolated(String),
}

/// Errors returned by the horosphere engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HoroError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, HoroError>;
