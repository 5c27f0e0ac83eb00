//=========================================================================
// Loading Overlays
//=========================================================================
//
// Name-keyed registry of reusable loading overlays.
//
// Architecture:
//   OverlayTable
//     └─ entries: HashMap<String, Overlay>
//          ├─ lifecycle:  Shared<dyn LoadingOverlay>  (initialize / show / hide)
//          ├─ transition: Option<Shared<dyn SceneTransition>>
//          ├─ progress:   Option<Shared<dyn LoadingProgress>>
//          └─ scene:      Option<String>  (backing scene loaded before showing)
//
// Overlays are initialized exactly once, start hidden, and live for the
// lifetime of the table.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

//=== External Dependencies ===============================================

use log::debug;

//=== Internal Dependencies ===============================================

use crate::core::bridge::ResourceMaterializer;
use crate::core::scene::{LoadingProgress, SceneObject, SceneTransition, Shared};
use crate::error::OverlayError;

//=== LoadingOverlay Trait ================================================

/// Lifecycle of a loading overlay.
pub trait LoadingOverlay {
    /// Called once when the overlay is registered.
    fn initialize(&mut self) {}

    /// Makes the overlay visible.
    fn show(&mut self) {}

    /// Hides the overlay.
    fn hide(&mut self) {}
}

//=== Overlay =============================================================

/// Capability bundle of one registered overlay.
#[derive(Clone)]
pub struct Overlay {
    lifecycle: Shared<dyn LoadingOverlay>,
    transition: Option<Shared<dyn SceneTransition>>,
    progress: Option<Shared<dyn LoadingProgress>>,
    scene: Option<String>,
}

impl Overlay {
    pub fn new<T: LoadingOverlay + 'static>(lifecycle: Shared<T>) -> Self {
        let lifecycle: Shared<dyn LoadingOverlay> = lifecycle;
        Self {
            lifecycle,
            transition: None,
            progress: None,
            scene: None,
        }
    }

    /// Builds an overlay from a materialized object.
    ///
    /// Returns `None` if the object has no overlay capability. Transition
    /// and progress capabilities are taken from the same object.
    pub fn from_object(object: &SceneObject) -> Option<Self> {
        let lifecycle = object.overlay()?.clone();

        Some(Self {
            lifecycle,
            transition: object.transition().cloned(),
            progress: object.progress().cloned(),
            scene: None,
        })
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

    /// Marks the overlay as presentation-backed by `scene`.
    ///
    /// The director loads and activates the backing scene before showing
    /// the overlay.
    pub fn backed_by_scene(mut self, scene: impl Into<String>) -> Self {
        self.scene = Some(scene.into());
        self
    }

    //--- Accessors --------------------------------------------------------

    pub fn transition(&self) -> Option<&Shared<dyn SceneTransition>> {
        self.transition.as_ref()
    }

    pub fn progress(&self) -> Option<&Shared<dyn LoadingProgress>> {
        self.progress.as_ref()
    }

    pub fn scene(&self) -> Option<&str> {
        self.scene.as_deref()
    }

    /// Returns `true` if both overlays wrap the same instance.
    pub fn is_same_instance(&self, other: &Overlay) -> bool {
        std::ptr::eq(
            Rc::as_ptr(&self.lifecycle) as *const (),
            Rc::as_ptr(&other.lifecycle) as *const (),
        )
    }

    //--- Lifecycle --------------------------------------------------------

    pub(crate) fn show(&self) {
        self.lifecycle.borrow_mut().show();
    }

    pub(crate) fn hide(&self) {
        self.lifecycle.borrow_mut().hide();
    }

    fn initialize(&self) {
        self.lifecycle.borrow_mut().initialize();
    }
}

impl fmt::Debug for Overlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Overlay")
            .field("transition", &self.transition.is_some())
            .field("progress", &self.progress.is_some())
            .field("scene", &self.scene)
            .finish()
    }
}

//=== OverlayTable ========================================================

/// Registry of named loading overlays.
///
/// A name and an instance are each registered at most once.
#[derive(Debug, Default)]
pub struct OverlayTable {
    entries: HashMap<String, Overlay>,
}

impl OverlayTable {
    pub fn new() -> Self {
        Self::default()
    }

    //--- Registration -----------------------------------------------------

    /// Registers `overlay` under `name`, then initializes and hides it.
    ///
    /// Refused when the name or the instance is already registered; the
    /// existing entry is left untouched.
    pub fn register(&mut self, name: impl Into<String>, overlay: Overlay) -> Result<(), OverlayError> {
        let name = name.into();

        if self.entries.contains_key(&name) {
            return Err(OverlayError::DuplicateName(name));
        }

        if let Some((existing, _)) = self
            .entries
            .iter()
            .find(|(_, registered)| registered.is_same_instance(&overlay))
        {
            return Err(OverlayError::DuplicateInstance {
                name,
                existing: existing.clone(),
            });
        }

        overlay.initialize();
        overlay.hide();

        debug!("Registered loading overlay {:?}", name);
        self.entries.insert(name, overlay);
        Ok(())
    }

    /// Materializes an overlay from `key` and registers it under `name`.
    pub fn register_from_source(
        &mut self,
        name: impl Into<String>,
        key: &str,
        materializer: &mut dyn ResourceMaterializer,
    ) -> Result<(), OverlayError> {
        let name = name.into();

        // Checked first so a duplicate never instantiates a resource
        if self.entries.contains_key(&name) {
            return Err(OverlayError::DuplicateName(name));
        }

        let Some(object) = materializer.load_by_key(key) else {
            return Err(OverlayError::ResourceNotFound {
                name,
                key: key.to_string(),
            });
        };

        let Some(overlay) = Overlay::from_object(&object) else {
            return Err(OverlayError::MissingCapability {
                name,
                key: key.to_string(),
            });
        };

        self.register(name, overlay)
    }

    //--- Queries ----------------------------------------------------------

    pub fn lookup(&self, name: &str) -> Option<&Overlay> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
