//! Error types for the league service
//!
//! Fallible operations return `anyhow::Result`; the variants below are the
//! failures callers (mostly the HTTP layer) need to tell apart.

use crate::types::GameId;

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Domain errors raised by ingestion, storage and the admin surface
#[derive(Debug, thiserror::Error)]
pub enum LeagueError {
    #[error("Storage unavailable: {message}")]
    StorageUnavailable { message: String },

    #[error("Invalid upload: {reason}")]
    InvalidUpload {
        reason: String,
        details: Vec<String>,
    },

    #[error(
        "Game IDs not found in schedule: {}. Please upload the schedule first.",
        .ids.join(", ")
    )]
    UnknownGameIds { ids: Vec<GameId> },

    #[error("Game not found: {game_id}")]
    GameNotFound { game_id: GameId },

    #[error("Recap not found for game: {game_id}")]
    RecapNotFound { game_id: GameId },

    #[error("Missing or invalid admin token")]
    Unauthorized,

    #[error("Admin access is disabled: no admin token configured")]
    AdminDisabled,

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Internal service error: {message}")]
    InternalError { message: String },
}

impl LeagueError {
    /// Upload rejection with no per-row detail
    pub fn invalid_upload(reason: impl Into<String>) -> Self {
        LeagueError::InvalidUpload {
            reason: reason.into(),
            details: Vec::new(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        LeagueError::StorageUnavailable {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_game_ids_message_lists_ids() {
        let err = LeagueError::UnknownGameIds {
            ids: vec!["41".to_string(), "42".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Game IDs not found in schedule: 41, 42. Please upload the schedule first."
        );
    }

    #[test]
    fn test_downcast_through_anyhow() {
        let err: anyhow::Error = LeagueError::storage("disk gone").into();
        assert!(matches!(
            err.downcast_ref::<LeagueError>(),
            Some(LeagueError::StorageUnavailable { .. })
        ));
    }
}
