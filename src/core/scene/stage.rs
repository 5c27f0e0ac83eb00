//=========================================================================
// Stage
//=========================================================================
//
// In-process scene backend: loads scenes from registered blueprints and
// keeps the objects of the active scene.
//
// Architecture:
//   register_scene*() → blueprints: HashMap<String, Blueprint>
//
//   begin_load()
//     └─ preload on worker thread ──LoadMessage──> Receiver (pumped per poll)
//   activate() + worker finished
//     └─ is_complete() builds the scene and swaps the active objects
//
// Native progress follows the usual engine convention: the worker's
// fraction is scaled to 0.9 and holds there until the load is activated
// and instantiated.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

//=== External Dependencies ===============================================

use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use log::{debug, info, warn};

//=== Internal Dependencies ===============================================

use super::SceneObject;
use crate::core::bridge::{LoadHandle, ResourceMaterializer, SceneGraph, SceneLoader};
use crate::core::progress::clamp_unit;
use crate::error::LoadError;

//=== Constants ===========================================================

/// Native progress at which a loaded but not yet activated scene parks.
const NATIVE_ACTIVATION_THRESHOLD: f32 = 0.9;

//=== Blueprint Types =====================================================

type Preload = Arc<dyn Fn(&LoadReporter) -> Result<(), String> + Send + Sync>;
type Build = Box<dyn Fn() -> Vec<SceneObject>>;
type Resource = Box<dyn Fn() -> SceneObject>;

struct Blueprint {
    preload: Option<Preload>,
    build: Build,
}

//=== LoadReporter ========================================================

#[derive(Debug)]
enum LoadMessage {
    Progress(f32),
    Finished(Result<(), String>),
}

/// Progress channel handed to a preload job on its worker thread.
#[derive(Debug, Clone)]
pub struct LoadReporter {
    sender: Sender<LoadMessage>,
}

impl LoadReporter {
    /// Reports the fraction of preload work done, in `[0, 1]`.
    pub fn report(&self, fraction: f32) {
        // A dropped receiver means the stage is gone
        let _ = self.sender.send(LoadMessage::Progress(clamp_unit(fraction)));
    }
}

//=== PendingLoad =========================================================

struct PendingLoad {
    scene: String,
    receiver: Option<Receiver<LoadMessage>>,
    fraction: f32,
    finished: bool,
    activated: bool,
}

impl PendingLoad {
    fn pump(&mut self) {
        let Some(receiver) = &self.receiver else {
            return;
        };

        loop {
            match receiver.try_recv() {
                Ok(LoadMessage::Progress(fraction)) => {
                    self.fraction = self.fraction.max(fraction);
                }
                Ok(LoadMessage::Finished(result)) => {
                    if let Err(reason) = result {
                        warn!("Preload of scene {:?} failed: {}", self.scene, reason);
                    }
                    self.finish();
                    return;
                }
                Err(TryRecvError::Empty) => return,
                Err(TryRecvError::Disconnected) => {
                    warn!("Preload worker of scene {:?} exited without finishing", self.scene);
                    self.finish();
                    return;
                }
            }
        }
    }

    fn finish(&mut self) {
        self.fraction = 1.0;
        self.finished = true;
        self.receiver = None;
    }
}

//=== Stage ===============================================================

/// Blueprint-driven scene backend implementing the engine bridge.
#[derive(Default)]
pub struct Stage {
    blueprints: HashMap<String, Blueprint>,
    resources: HashMap<String, Resource>,
    pending: HashMap<u64, PendingLoad>,
    next_handle: u64,
    active: Option<String>,
    objects: Vec<SceneObject>,
}

impl Stage {
    pub fn new() -> Self {
        Self::default()
    }

    //--- Registration -----------------------------------------------------

    /// Registers a scene built synchronously on activation.
    pub fn register_scene<F>(&mut self, name: impl Into<String>, build: F)
    where
        F: Fn() -> Vec<SceneObject> + 'static,
    {
        self.insert_blueprint(name.into(), None, Box::new(build));
    }

    /// Registers a scene whose `preload` runs on a worker thread before
    /// the scene can be activated.
    pub fn register_scene_with_preload<P, F>(&mut self, name: impl Into<String>, preload: P, build: F)
    where
        P: Fn(&LoadReporter) -> Result<(), String> + Send + Sync + 'static,
        F: Fn() -> Vec<SceneObject> + 'static,
    {
        self.insert_blueprint(name.into(), Some(Arc::new(preload)), Box::new(build));
    }

    /// Registers `name` and makes it the active scene immediately.
    pub fn register_default<F>(&mut self, name: impl Into<String>, build: F)
    where
        F: Fn() -> Vec<SceneObject> + 'static,
    {
        let name = name.into();
        self.objects = build();
        self.active = Some(name.clone());
        info!("Default scene {:?} active with {} objects", name, self.objects.len());
        self.insert_blueprint(name, None, Box::new(build));
    }

    /// Registers a resource instantiated by key.
    pub fn register_resource<F>(&mut self, key: impl Into<String>, make: F)
    where
        F: Fn() -> SceneObject + 'static,
    {
        self.resources.insert(key.into(), Box::new(make));
    }

    fn insert_blueprint(&mut self, name: String, preload: Option<Preload>, build: Build) {
        if self.blueprints.contains_key(&name) {
            warn!("Scene {:?} registered twice, replacing blueprint", name);
        }
        self.blueprints.insert(name, Blueprint { preload, build });
    }

    //--- Queries ----------------------------------------------------------

    pub fn has_scene(&self, name: &str) -> bool {
        self.blueprints.contains_key(name)
    }

    /// Number of loads started but not yet instantiated.
    pub fn pending_loads(&self) -> usize {
        self.pending.len()
    }

    //--- Instantiation ----------------------------------------------------

    fn instantiate(&mut self, scene: String) {
        let Some(blueprint) = self.blueprints.get(&scene) else {
            warn!("Blueprint of scene {:?} vanished before activation", scene);
            return;
        };

        self.objects = (blueprint.build)();
        info!("Scene {:?} active with {} objects", scene, self.objects.len());
        self.active = Some(scene);
    }
}

//=== Bridge Implementations ==============================================

impl SceneLoader for Stage {
    fn begin_load(&mut self, scene: &str) -> Result<LoadHandle, LoadError> {
        let Some(blueprint) = self.blueprints.get(scene) else {
            return Err(LoadError::UnknownScene(scene.to_string()));
        };

        let id = self.next_handle;
        self.next_handle += 1;

        let mut pending = PendingLoad {
            scene: scene.to_string(),
            receiver: None,
            fraction: 0.0,
            finished: false,
            activated: false,
        };

        match &blueprint.preload {
            Some(preload) => {
                let (sender, receiver) = unbounded();
                let preload = Arc::clone(preload);
                let reporter = LoadReporter { sender: sender.clone() };

                thread::Builder::new()
                    .name(format!("preload-{}", scene))
                    .spawn(move || {
                        let result = preload(&reporter);
                        let _ = sender.send(LoadMessage::Finished(result));
                    })
                    .map_err(|e| LoadError::Backend {
                        scene: scene.to_string(),
                        reason: e.to_string(),
                    })?;

                pending.receiver = Some(receiver);
            }
            None => pending.finish(),
        }

        debug!("Began loading scene {:?} (handle {})", scene, id);
        self.pending.insert(id, pending);
        Ok(LoadHandle(id))
    }

    fn native_progress(&mut self, handle: LoadHandle) -> f32 {
        match self.pending.get_mut(&handle.0) {
            Some(pending) => {
                pending.pump();
                pending.fraction * NATIVE_ACTIVATION_THRESHOLD
            }
            None => 1.0,
        }
    }

    fn activate(&mut self, handle: LoadHandle) {
        if let Some(pending) = self.pending.get_mut(&handle.0) {
            pending.activated = true;
        }
    }

    fn is_complete(&mut self, handle: LoadHandle) -> bool {
        let Some(pending) = self.pending.get_mut(&handle.0) else {
            return true;
        };

        pending.pump();
        if !(pending.activated && pending.finished) {
            return false;
        }

        if let Some(pending) = self.pending.remove(&handle.0) {
            self.instantiate(pending.scene);
        }
        true
    }
}

impl SceneGraph for Stage {
    fn active_scene(&self) -> Option<String> {
        self.active.clone()
    }

    fn root_objects(&self, scene: &str) -> Vec<SceneObject> {
        if self.active.as_deref() == Some(scene) {
            self.objects.clone()
        } else {
            Vec::new()
        }
    }
}

impl ResourceMaterializer for Stage {
    fn load_by_key(&mut self, key: &str) -> Option<SceneObject> {
        self.resources.get(key).map(|make| make())
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
