//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use aetheric_director::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Director
pub use crate::core::director::{
    ChangeRequest, Diagnostic, Director, DirectorBuilder, DirectorConfig, DirectorState,
};

// Runtime
pub use crate::runtime::{DirectorHandle, Runtime, RuntimeBuilder};

// Engine bridge
pub use crate::core::bridge::{InputDispatcher, LoadHandle, ResourceMaterializer, SceneGraph, SceneLoader};

// Scene capabilities
pub use crate::core::scene::{
    shared, AnimationStatus, LoadReporter, LoadingProgress, Route, SceneHandler, SceneObject,
    SceneParam, SceneTransition, Shared, Stage,
};

// Overlays, input and effects
pub use crate::core::effects::{Easing, Fade};
pub use crate::core::input::InputGate;
pub use crate::core::overlay::{LoadingOverlay, Overlay, OverlayTable};
pub use crate::core::progress::blend;

// Errors
pub use crate::error::{ChangeError, LoadError, OverlayError, ParamError};
