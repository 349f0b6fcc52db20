//! Errors of the SQL frontend.

use joinorder::error::OptError;
use thiserror::Error;

pub type SqlResult<T> = Result<T, SqlError>;

#[derive(Debug, Error)]
pub enum SqlError {
    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("empty query")]
    EmptyQuery,

    #[error("multiple statements not supported")]
    MultipleStatements,

    #[error("no row count known for table {0:?}")]
    UnknownTable(String),

    #[error(transparent)]
    Optimizer(#[from] OptError),

    #[error("invalid settings: {0}")]
    Settings(#[from] serde_yaml::Error),
}

impl From<sqlparser::parser::ParserError> for SqlError {
    fn from(e: sqlparser::parser::ParserError) -> Self {
        SqlError::Syntax(e.to_string())
    }
}
