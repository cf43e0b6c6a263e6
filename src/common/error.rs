use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    /// A graph received two nodes with the same index. Level setup must abort.
    #[error("Graph already has a node with index {index}")]
    DuplicateNode { index: usize },

    #[error("Invalid geometry: {reason}")]
    InvalidGeometry { reason: String },

    #[error("Agent {agent} has not been set up for a level")]
    NotSetUp { agent: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Infrastructure error: {0}")]
    InfrastructureError(String),
}

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Event journal error: {0}")]
    Journal(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] anyhow::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;
pub type ApplicationResult<T> = Result<T, ApplicationError>;
