//=========================================================================
// Scene System
//=========================================================================
//
// Scene-side capabilities the director drives during a transition.
//
// Architecture:
//   SceneObject (top-level object of a scene)
//     ├─ handler:    Shared<dyn SceneHandler>     (enter / exit / readiness)
//     ├─ transition: Shared<dyn SceneTransition>  (animated in / out)
//     ├─ progress:   Shared<dyn LoadingProgress>  (progress sink)
//     └─ overlay:    Shared<dyn LoadingOverlay>   (loading overlay lifecycle)
//
// Flow:
//   SceneGraph::root_objects() → SceneCapabilities::resolve() → Director
//
// Capabilities are attached explicitly when a scene builds its objects;
// nothing is discovered by runtime type inspection.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

//=== Internal Dependencies ===============================================

use crate::core::overlay::LoadingOverlay;
use crate::error::ParamError;

//=== Module Declarations =================================================

mod capability;
mod param;
mod stage;

//=== Public API ==========================================================

pub use capability::{CapabilityRegistry, SceneCapabilities};
pub use param::SceneParam;
pub use stage::{LoadReporter, Stage};

//=== Shared Ownership ====================================================

/// Single-threaded shared handle used for every scene capability.
///
/// Scenes own their objects; the director only clones these handles for
/// the duration of one transition.
pub type Shared<T> = Rc<RefCell<T>>;

/// Wraps a value into a [`Shared`] handle.
pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

//=== Route ===============================================================

/// Endpoints of a transition, handed to every transition hook.
///
/// `from` is `None` for the boot transition of the first scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route<'a> {
    pub from: Option<&'a str>,
    pub to: &'a str,
}

impl<'a> Route<'a> {
    pub fn new(from: Option<&'a str>, to: &'a str) -> Self {
        Self { from, to }
    }
}

//=== Capability Traits ===================================================

/// Lifecycle hooks of a scene.
///
/// All methods have defaults, so a handler only overrides what it needs.
/// `progress` reports readiness after `on_enter`; the director waits for
/// it to reach 1.0 while a loading overlay is shown.
pub trait SceneHandler {
    /// Called once the scene is active.
    fn on_enter(&mut self) {}

    /// Typed entry point receiving the request's parameter.
    ///
    /// Called instead of [`SceneHandler::on_enter`] when the request carries
    /// a parameter. Returning an error makes the director fall back to the
    /// untyped `on_enter` and discard the parameter.
    fn on_enter_with(&mut self, param: SceneParam) -> Result<(), ParamError> {
        Err(ParamError::NoTypedEntry {
            type_name: param.type_name(),
        })
    }

    /// Called before the scene is replaced.
    fn on_exit(&mut self) {}

    /// Readiness in `[0, 1]`. Defaults to immediately ready.
    fn progress(&self) -> f32 {
        1.0
    }
}

/// Completion state of a transition animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationStatus {
    Running,
    Finished,
}

/// Animated entry and exit of a scene or overlay.
///
/// `transition_in` / `transition_out` start an animation; the director then
/// calls [`SceneTransition::update`] once per frame until it reports
/// [`AnimationStatus::Finished`].
pub trait SceneTransition {
    /// Sets the initial visual state before the entry animation starts.
    fn prepare_in(&mut self, _route: Route<'_>) {}

    /// Starts the entry animation.
    fn transition_in(&mut self, route: Route<'_>);

    /// Sets the initial visual state before the exit animation starts.
    fn prepare_out(&mut self, _route: Route<'_>) {}

    /// Starts the exit animation.
    fn transition_out(&mut self, route: Route<'_>);

    /// Advances the running animation by one frame.
    fn update(&mut self, dt: f32) -> AnimationStatus;
}

/// Sink for loading progress in `[0, 1]`.
///
/// Values arrive once per frame and never decrease within a transition.
pub trait LoadingProgress {
    fn on_progress(&mut self, value: f32);
}

//=== SceneObject =========================================================

/// A top-level object of a scene with its explicit capability table.
///
/// One backing value may provide several capabilities by attaching clones
/// of the same [`Shared`] handle.
#[derive(Clone, Default)]
pub struct SceneObject {
    name: String,
    handler: Option<Shared<dyn SceneHandler>>,
    transition: Option<Shared<dyn SceneTransition>>,
    progress: Option<Shared<dyn LoadingProgress>>,
    overlay: Option<Shared<dyn LoadingOverlay>>,
}

impl SceneObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    //--- Capability Attachment --------------------------------------------

    pub fn with_handler<T: SceneHandler + 'static>(mut self, handler: Shared<T>) -> Self {
        let handler: Shared<dyn SceneHandler> = handler;
        self.handler = Some(handler);
        self
    }

    pub fn with_transition<T: SceneTransition + 'static>(mut self, transition: Shared<T>) -> Self {
        let transition: Shared<dyn SceneTransition> = transition;
        self.transition = Some(transition);
        self
    }

    pub fn with_progress<T: LoadingProgress + 'static>(mut self, progress: Shared<T>) -> Self {
        let progress: Shared<dyn LoadingProgress> = progress;
        self.progress = Some(progress);
        self
    }

    pub fn with_overlay<T: LoadingOverlay + 'static>(mut self, overlay: Shared<T>) -> Self {
        let overlay: Shared<dyn LoadingOverlay> = overlay;
        self.overlay = Some(overlay);
        self
    }

    //--- Capability Queries -----------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handler(&self) -> Option<&Shared<dyn SceneHandler>> {
        self.handler.as_ref()
    }

    pub fn transition(&self) -> Option<&Shared<dyn SceneTransition>> {
        self.transition.as_ref()
    }

    pub fn progress(&self) -> Option<&Shared<dyn LoadingProgress>> {
        self.progress.as_ref()
    }

    pub fn overlay(&self) -> Option<&Shared<dyn LoadingOverlay>> {
        self.overlay.as_ref()
    }
}

impl fmt::Debug for SceneObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneObject")
            .field("name", &self.name)
            .field("handler", &self.handler.is_some())
            .field("transition", &self.transition.is_some())
            .field("progress", &self.progress.is_some())
            .field("overlay", &self.overlay.is_some())
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
