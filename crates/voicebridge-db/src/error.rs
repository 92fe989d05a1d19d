use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database io error: {0}")]
    Io(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}
