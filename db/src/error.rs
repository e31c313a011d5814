use thiserror::Error as ThisError;

/// Domain error taxonomy. Everything a storage operation can signal to a
/// caller; the HTTP layer decides user-facing status codes.
#[derive(Debug, ThisError)]
pub enum Error {
    #[error("{0} already exists")]
    AlreadyExists(&'static str),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("data integrity violation: {0}")]
    DataIntegrity(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub fn validation(reason: impl Into<String>) -> Self {
        Error::Validation(reason.into())
    }
}

/// Translates constraint violations raised by an INSERT into the domain
/// taxonomy: a unique-constraint hit means the pair is `what` and already
/// present, a foreign-key hit means the referenced `missing` row is gone.
pub(crate) fn map_insert_err(
    err: sqlx::Error,
    what: &'static str,
    missing: &'static str,
) -> Error {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return Error::AlreadyExists(what);
        }
        if db_err.is_foreign_key_violation() {
            return Error::NotFound(missing);
        }
    }
    Error::Sqlx(err)
}
