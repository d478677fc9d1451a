use skilltrack_core::error::CoreError;

/// Errors raised while gathering data for a notification.
///
/// Transport failures are not represented here: dispatchers swallow them and
/// report a plain `false`.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    /// The user/skill store query failed.
    #[error("Store query failed: {0}")]
    Store(#[from] sqlx::Error),

    /// Stored data could not be mapped into domain types.
    #[error(transparent)]
    Core(#[from] CoreError),
}
