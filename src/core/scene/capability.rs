//=========================================================================
// Capability Registry
//=========================================================================
//
// Resolves the optional handler, transition and progress capabilities of
// a scene from its top-level objects.
//
// The first object exposing a capability wins. Absence is normal and
// every director step skips its action when a capability is missing.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::debug;

//=== Internal Dependencies ===============================================

use super::{LoadingProgress, SceneHandler, SceneObject, SceneTransition, Shared};
use crate::core::bridge::SceneGraph;

//=== SceneCapabilities ===================================================

/// Capabilities borrowed from one scene for the duration of a transition.
#[derive(Clone, Default)]
pub struct SceneCapabilities {
    pub handler: Option<Shared<dyn SceneHandler>>,
    pub transition: Option<Shared<dyn SceneTransition>>,
    pub progress: Option<Shared<dyn LoadingProgress>>,
}

impl SceneCapabilities {
    /// Picks the first object providing each capability.
    pub fn from_objects(objects: &[SceneObject]) -> Self {
        let mut caps = Self::default();

        for object in objects {
            Self::claim(&mut caps.handler, object.handler(), object, "handler");
            Self::claim(&mut caps.transition, object.transition(), object, "transition");
            Self::claim(&mut caps.progress, object.progress(), object, "progress");
        }

        caps
    }

    /// Returns `true` when the scene exposes none of the capabilities.
    pub fn is_empty(&self) -> bool {
        self.handler.is_none() && self.transition.is_none() && self.progress.is_none()
    }

    fn claim<T: ?Sized>(
        slot: &mut Option<Shared<T>>,
        offered: Option<&Shared<T>>,
        object: &SceneObject,
        capability: &str,
    ) {
        let Some(offered) = offered else {
            return;
        };

        if slot.is_some() {
            debug!(
                "Ignoring extra {} capability on object {:?} (first one wins)",
                capability,
                object.name()
            );
            return;
        }

        *slot = Some(offered.clone());
    }
}

impl std::fmt::Debug for SceneCapabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneCapabilities")
            .field("handler", &self.handler.is_some())
            .field("transition", &self.transition.is_some())
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

//=== CapabilityRegistry ==================================================

/// Capability lookup over a [`SceneGraph`].
pub struct CapabilityRegistry<'a> {
    graph: &'a dyn SceneGraph,
}

impl<'a> CapabilityRegistry<'a> {
    pub fn new(graph: &'a dyn SceneGraph) -> Self {
        Self { graph }
    }

    /// Resolves the capabilities of `scene`.
    pub fn resolve(&self, scene: &str) -> SceneCapabilities {
        let objects = self.graph.root_objects(scene);
        let caps = SceneCapabilities::from_objects(&objects);

        debug!("Resolved capabilities of scene {:?}: {:?}", scene, caps);
        caps
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
