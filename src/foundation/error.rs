/// Convenience result type used across the player.
pub type PlayerResult<T> = Result<T, PlayerError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum PlayerError {
    /// Malformed manifest, missing required resource or uncompilable page.
    #[error("project load error: {0}")]
    ProjectLoad(String),

    /// App logic faulted during a lifecycle call (init, tick, draw, event dispatch).
    #[error("runtime error: {0}")]
    Runtime(String),

    /// Missing or corrupt resource, or decode failure.
    #[error("asset error: {0}")]
    Asset(String),

    /// Pipeline-level failure assembling a frame.
    #[error("render error: {0}")]
    Render(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PlayerError {
    /// Build a [`PlayerError::ProjectLoad`] value.
    pub fn project_load(msg: impl Into<String>) -> Self {
        Self::ProjectLoad(msg.into())
    }

    /// Build a [`PlayerError::Runtime`] value.
    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }

    /// Build a [`PlayerError::Asset`] value.
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`PlayerError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Return `true` for errors raised by app logic rather than by the engine.
    pub fn is_app_fault(&self) -> bool {
        matches!(self, Self::Runtime(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
