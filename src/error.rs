use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoardError {
    #[error("Task id already exists: {id}")]
    DuplicateId { id: String },

    #[error("Invalid board configuration: {reason}")]
    InvalidConfig { reason: String },
}

pub type Result<T> = std::result::Result<T, BoardError>;
