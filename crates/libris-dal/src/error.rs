use serde::Serialize;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Invalid value of a single named input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Database error: {0}")]
    DatabaseError(#[source] sqlx::Error),

    #[error("Database unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),

    #[error("User password error: {0}")]
    UserPasswordError(#[from] argon2::password_hash::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid field {0}")]
    InvalidField(FieldError),

    #[error("Invalid fields: {}", .0.iter().map(|f| f.field).collect::<Vec<_>>().join(", "))]
    InvalidFields(Vec<FieldError>),

    #[error("No fields provided")]
    NoFieldsProvided,

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Record already exists: {0}")]
    AlreadyExists(String),

    #[error("Multiple records matched: {0}")]
    MultipleMatched(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Record contended: {0}")]
    Contended(String),
}

impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed => Error::Unavailable(e),
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                Error::AlreadyExists(db_err.message().to_string())
            }
            other => Error::DatabaseError(other),
        }
    }
}
