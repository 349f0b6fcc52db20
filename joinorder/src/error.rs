use thiserror::Error;

pub type OptResult<T> = Result<T, OptError>;

/// Errors detected before the join order search starts.
///
/// Once the query passes validation no error can happen during enumeration, every later phase
/// only combines fragments that were already valid.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptError {
    #[error("malformed query: {0}")]
    MalformedQuery(String),

    #[error("too many relations: {count}, at most {max} are supported")]
    TooManyRelations { count: usize, max: usize },

    #[error("invalid optimizer config: {0}")]
    InvalidConfig(String),
}

impl OptError {
    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        OptError::MalformedQuery(msg.into())
    }
}
