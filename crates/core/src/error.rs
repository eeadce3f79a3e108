use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Unknown device platform: {0}")]
    UnknownPlatform(String),

    #[error("Unknown priority level: {0}")]
    UnknownPriority(String),
}
