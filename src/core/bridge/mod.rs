//=========================================================================
// Engine Bridge
//=========================================================================
//
// Contract between the director and the engine subsystems it drives.
//
// Components:
// - `SceneLoader`: background load + deferred activation of scenes
// - `SceneGraph`: active scene and its top-level objects
// - `InputDispatcher`: per-scene input enable/disable
// - `ResourceMaterializer`: instantiates overlay resources by key
//
// The director owns boxed implementations. Engines that need to keep
// their own handle on a collaborator pass an `Rc<RefCell<T>>`, which
// implements every trait by delegation.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::cell::RefCell;
use std::rc::Rc;

//=== Internal Dependencies ===============================================

use crate::core::scene::SceneObject;
use crate::error::LoadError;

//=== LoadHandle ==========================================================

/// Opaque identifier of one in-flight scene load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadHandle(pub u64);

//=== Collaborator Traits =================================================

/// Loads scenes in the background and activates them on request.
///
/// A load starts deactivated: native progress climbs towards the loader's
/// activation threshold (conventionally 0.9) and stays there until
/// [`SceneLoader::activate`] is called.
pub trait SceneLoader {
    /// Starts loading `scene` without activating it.
    fn begin_load(&mut self, scene: &str) -> Result<LoadHandle, LoadError>;

    /// Loader-native progress of the load.
    fn native_progress(&mut self, handle: LoadHandle) -> f32;

    /// Allows the loaded scene to replace the active one.
    fn activate(&mut self, handle: LoadHandle);

    /// Returns `true` once activation has finished.
    fn is_complete(&mut self, handle: LoadHandle) -> bool;
}

/// Read access to the engine's scene graph.
pub trait SceneGraph {
    /// Name of the currently active scene.
    fn active_scene(&self) -> Option<String>;

    /// Top-level objects of `scene`, empty when it is not loaded.
    fn root_objects(&self, scene: &str) -> Vec<SceneObject>;
}

/// Enables and disables input dispatch per scene.
pub trait InputDispatcher {
    fn set_enabled(&mut self, scene: &str, enabled: bool);
}

/// Instantiates objects from a resource key.
pub trait ResourceMaterializer {
    fn load_by_key(&mut self, key: &str) -> Option<SceneObject>;
}

//=== Shared Delegation ===================================================

impl<T: SceneLoader + ?Sized> SceneLoader for Rc<RefCell<T>> {
    fn begin_load(&mut self, scene: &str) -> Result<LoadHandle, LoadError> {
        self.borrow_mut().begin_load(scene)
    }

    fn native_progress(&mut self, handle: LoadHandle) -> f32 {
        self.borrow_mut().native_progress(handle)
    }

    fn activate(&mut self, handle: LoadHandle) {
        self.borrow_mut().activate(handle)
    }

    fn is_complete(&mut self, handle: LoadHandle) -> bool {
        self.borrow_mut().is_complete(handle)
    }
}

impl<T: SceneGraph + ?Sized> SceneGraph for Rc<RefCell<T>> {
    fn active_scene(&self) -> Option<String> {
        self.borrow().active_scene()
    }

    fn root_objects(&self, scene: &str) -> Vec<SceneObject> {
        self.borrow().root_objects(scene)
    }
}

impl<T: InputDispatcher + ?Sized> InputDispatcher for Rc<RefCell<T>> {
    fn set_enabled(&mut self, scene: &str, enabled: bool) {
        self.borrow_mut().set_enabled(scene, enabled)
    }
}

impl<T: ResourceMaterializer + ?Sized> ResourceMaterializer for Rc<RefCell<T>> {
    fn load_by_key(&mut self, key: &str) -> Option<SceneObject> {
        self.borrow_mut().load_by_key(key)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
