/// Convenience result type used across the crate.
pub type LayersResult<T> = Result<T, LayersError>;

/// Error taxonomy for stack mutations, lifecycle bridging and state encoding.
///
/// Everything except [`LayersError::Serde`] and [`LayersError::Other`] signals either
/// programmer misuse or a desynchronized engine. None of them are retried internally; they
/// surface synchronously from the mutation call that triggered them.
#[derive(thiserror::Error, Debug)]
pub enum LayersError {
    /// An operation was attempted in a phase that does not allow it.
    #[error("illegal state: {0}")]
    IllegalState(String),

    /// A stack index outside the current bounds.
    #[error("index {index} out of bounds for stack of size {len}")]
    IndexOutOfBounds {
        /// Requested index.
        index: usize,
        /// Stack size at the time of the request.
        len: usize,
    },

    /// No factory is registered for a layer type tag.
    #[error("unable to instantiate layer '{0}': no factory registered")]
    Instantiation(String),

    /// Internal bookkeeping disagrees with itself.
    #[error("internal consistency error: {0}")]
    Consistency(String),

    /// A container view could not be resolved through the backend.
    #[error("container not found: {0}")]
    ContainerNotFound(String),

    /// A required layer argument is missing or has the wrong type.
    #[error("argument error: {0}")]
    Argument(String),

    /// Errors when encoding or decoding persisted state.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from a backend or dependency.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LayersError {
    /// Build a [`LayersError::IllegalState`] value.
    pub fn illegal_state(msg: impl Into<String>) -> Self {
        Self::IllegalState(msg.into())
    }

    /// Build a [`LayersError::IndexOutOfBounds`] value.
    pub fn out_of_bounds(index: usize, len: usize) -> Self {
        Self::IndexOutOfBounds { index, len }
    }

    /// Build a [`LayersError::Instantiation`] value.
    pub fn instantiation(tag: impl Into<String>) -> Self {
        Self::Instantiation(tag.into())
    }

    /// Build a [`LayersError::Consistency`] value.
    pub fn consistency(msg: impl Into<String>) -> Self {
        Self::Consistency(msg.into())
    }

    /// Build a [`LayersError::ContainerNotFound`] value.
    pub fn container_not_found(msg: impl Into<String>) -> Self {
        Self::ContainerNotFound(msg.into())
    }

    /// Build a [`LayersError::Argument`] value.
    pub fn argument(msg: impl Into<String>) -> Self {
        Self::Argument(msg.into())
    }

    /// Build a [`LayersError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for LayersError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
