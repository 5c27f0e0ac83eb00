//=========================================================================
// Error Types
//=========================================================================
//
// Typed failures surfaced by the director and its collaborators.
//
// None of these abort a transition. They are returned to the caller
// where one exists, and otherwise recorded as diagnostics while the
// sequence continues with reduced functionality.
//
//=========================================================================

//=== External Dependencies ===============================================

use thiserror::Error;

//=== LoadError ===========================================================

/// Failure reported by a [`crate::core::bridge::SceneLoader`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The loader has no scene registered under this name.
    #[error("scene `{0}` is not registered with the loader")]
    UnknownScene(String),

    /// Backend-specific failure while starting the load.
    #[error("loader failed to start `{scene}`: {reason}")]
    Backend { scene: String, reason: String },
}

//=== OverlayError ========================================================

/// Reasons an overlay registration is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverlayError {
    /// Another overlay already uses this name.
    #[error("overlay name `{0}` is already registered")]
    DuplicateName(String),

    /// The same overlay instance is already registered under another name.
    #[error("overlay `{name}` is already registered as `{existing}`")]
    DuplicateInstance { name: String, existing: String },

    /// The resource materializer produced nothing for the key.
    #[error("no resource found for overlay `{name}` (key `{key}`)")]
    ResourceNotFound { name: String, key: String },

    /// The materialized object does not expose the overlay capability.
    #[error("resource `{key}` for overlay `{name}` has no overlay capability")]
    MissingCapability { name: String, key: String },

    /// No resource materializer was configured.
    #[error("cannot materialize overlay `{0}`: no resource materializer configured")]
    NoMaterializer(String),
}

//=== ParamError ==========================================================

/// Failure delivering a typed parameter to a scene handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    /// The handler has no typed entry point at all.
    #[error("handler has no typed entry for `{type_name}`")]
    NoTypedEntry { type_name: &'static str },

    /// The typed entry point expects another type.
    #[error("typed entry expects `{expected}`, got `{found}`")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// The typed entry point accepted the type but rejected the value.
    #[error("typed entry rejected the parameter: {0}")]
    Rejected(String),
}

//=== ChangeError =========================================================

/// Reasons a scene change request is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChangeError {
    /// Another transition is in flight; requests are dropped, not queued.
    #[error("change to `{requested}` dropped: transition to `{in_flight}` in flight")]
    Busy { requested: String, in_flight: String },

    /// The application has begun shutting down.
    #[error("change to `{0}` refused: director is shutting down")]
    ShuttingDown(String),

    /// The runtime owning the director is gone.
    #[error("change to `{0}` lost: director runtime disconnected")]
    Disconnected(String),

    /// The runtime's command queue is full.
    #[error("change to `{0}` dropped: command queue full")]
    Backlog(String),
}

//=========================================================================
// Unit Tests
//=========================================================================
