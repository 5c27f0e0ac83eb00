//=========================================================================
// Test Doubles
//=========================================================================
//
// Scripted collaborators and recording capabilities sharing one event
// journal, so tests can assert the exact order of side effects.
//
// Journal entries:
//   loader.begin:X  loader.activate:X  loader.complete:X
//   input.off:X     input.on:X         resource.load:K
//   X.enter  X.enter_with:N  X.exit
//   X.transition_in  X.in_done  X.transition_out  X.out_done
//   X.initialize  X.show  X.hide
//
//=========================================================================

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::core::bridge::{InputDispatcher, LoadHandle, ResourceMaterializer, SceneGraph, SceneLoader};
use crate::core::director::Director;
use crate::core::overlay::LoadingOverlay;
use crate::core::scene::{
    shared, AnimationStatus, LoadingProgress, Route, SceneHandler, SceneObject, SceneParam,
    SceneTransition, Shared,
};
use crate::error::{LoadError, ParamError};

//=== Journal =============================================================

pub(crate) type Journal = Rc<RefCell<Vec<String>>>;

pub(crate) fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

fn note(journal: &Journal, entry: impl Into<String>) {
    journal.borrow_mut().push(entry.into());
}

pub(crate) fn count(journal: &Journal, entry: &str) -> usize {
    journal.borrow().iter().filter(|e| e.as_str() == entry).count()
}

pub(crate) fn position(journal: &Journal, entry: &str) -> usize {
    journal
        .borrow()
        .iter()
        .position(|e| e == entry)
        .unwrap_or_else(|| panic!("{entry:?} missing from journal {:?}", journal.borrow()))
}

pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

//=== MockWorld ===========================================================

struct MockLoad {
    scene: String,
    polls: u32,
    activated: bool,
    activation_wait: u32,
    complete: bool,
}

/// Scripted engine implementing every collaborator trait.
///
/// Native progress climbs linearly to 0.9 over `polls_to_ready` polls;
/// activation completes `activation_frames` completion checks after
/// `activate`.
pub(crate) struct MockWorld {
    journal: Journal,
    active: Option<String>,
    scenes: HashMap<String, Vec<SceneObject>>,
    resources: HashMap<String, SceneObject>,
    loads: HashMap<u64, MockLoad>,
    next_handle: u64,
    polls_to_ready: u32,
    activation_frames: u32,
}

impl MockWorld {
    pub(crate) fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            active: None,
            scenes: HashMap::new(),
            resources: HashMap::new(),
            loads: HashMap::new(),
            next_handle: 0,
            polls_to_ready: 3,
            activation_frames: 1,
        }
    }

    pub(crate) fn with_scene(mut self, name: &str, objects: Vec<SceneObject>) -> Self {
        self.scenes.insert(name.to_string(), objects);
        self
    }

    pub(crate) fn with_active(mut self, name: &str) -> Self {
        self.active = Some(name.to_string());
        self
    }

    pub(crate) fn with_resource(mut self, key: &str, object: SceneObject) -> Self {
        self.resources.insert(key.to_string(), object);
        self
    }

    pub(crate) fn with_polls_to_ready(mut self, polls: u32) -> Self {
        self.polls_to_ready = polls.max(1);
        self
    }

    pub(crate) fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }
}

impl SceneLoader for MockWorld {
    fn begin_load(&mut self, scene: &str) -> Result<LoadHandle, LoadError> {
        if !self.scenes.contains_key(scene) {
            return Err(LoadError::UnknownScene(scene.to_string()));
        }

        note(&self.journal, format!("loader.begin:{scene}"));
        let id = self.next_handle;
        self.next_handle += 1;
        self.loads.insert(
            id,
            MockLoad {
                scene: scene.to_string(),
                polls: 0,
                activated: false,
                activation_wait: self.activation_frames,
                complete: false,
            },
        );
        Ok(LoadHandle(id))
    }

    fn native_progress(&mut self, handle: LoadHandle) -> f32 {
        let Some(load) = self.loads.get_mut(&handle.0) else {
            return 0.0;
        };
        if load.complete {
            return 1.0;
        }

        load.polls += 1;
        if load.polls >= self.polls_to_ready {
            0.9
        } else {
            0.9 * load.polls as f32 / self.polls_to_ready as f32
        }
    }

    fn activate(&mut self, handle: LoadHandle) {
        if let Some(load) = self.loads.get_mut(&handle.0) {
            load.activated = true;
            note(&self.journal, format!("loader.activate:{}", load.scene));
        }
    }

    fn is_complete(&mut self, handle: LoadHandle) -> bool {
        let Some(load) = self.loads.get_mut(&handle.0) else {
            return false;
        };
        if load.complete {
            return true;
        }
        if !load.activated {
            return false;
        }
        if load.activation_wait > 0 {
            load.activation_wait -= 1;
            return false;
        }

        load.complete = true;
        note(&self.journal, format!("loader.complete:{}", load.scene));
        self.active = Some(load.scene.clone());
        true
    }
}

impl SceneGraph for MockWorld {
    fn active_scene(&self) -> Option<String> {
        self.active.clone()
    }

    fn root_objects(&self, scene: &str) -> Vec<SceneObject> {
        if self.active.as_deref() != Some(scene) {
            return Vec::new();
        }
        self.scenes.get(scene).cloned().unwrap_or_default()
    }
}

impl InputDispatcher for MockWorld {
    fn set_enabled(&mut self, scene: &str, enabled: bool) {
        let state = if enabled { "on" } else { "off" };
        note(&self.journal, format!("input.{state}:{scene}"));
    }
}

impl ResourceMaterializer for MockWorld {
    fn load_by_key(&mut self, key: &str) -> Option<SceneObject> {
        note(&self.journal, format!("resource.load:{key}"));
        self.resources.get(key).cloned()
    }
}

//=== RecordingHandler ====================================================

/// Typed parameter accepted by handlers built with `accepting_levels`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LevelId(pub u32);

pub(crate) struct RecordingHandler {
    name: &'static str,
    journal: Journal,
    accepts_levels: bool,
    pub(crate) readiness: f32,
    pub(crate) level: Option<LevelId>,
}

impl RecordingHandler {
    pub(crate) fn new(name: &'static str, journal: &Journal) -> Shared<Self> {
        shared(Self {
            name,
            journal: journal.clone(),
            accepts_levels: false,
            readiness: 1.0,
            level: None,
        })
    }

    pub(crate) fn accepting_levels(name: &'static str, journal: &Journal) -> Shared<Self> {
        let handler = Self::new(name, journal);
        handler.borrow_mut().accepts_levels = true;
        handler
    }
}

impl SceneHandler for RecordingHandler {
    fn on_enter(&mut self) {
        note(&self.journal, format!("{}.enter", self.name));
    }

    fn on_enter_with(&mut self, param: SceneParam) -> Result<(), ParamError> {
        if !self.accepts_levels {
            return Err(ParamError::NoTypedEntry {
                type_name: param.type_name(),
            });
        }

        let level = param.downcast::<LevelId>()?;
        note(&self.journal, format!("{}.enter_with:{}", self.name, level.0));
        self.level = Some(level);
        Ok(())
    }

    fn on_exit(&mut self) {
        note(&self.journal, format!("{}.exit", self.name));
    }

    fn progress(&self) -> f32 {
        self.readiness
    }
}

//=== RecordingReporter ===================================================

#[derive(Default)]
pub(crate) struct RecordingReporter {
    pub(crate) values: Vec<f32>,
}

impl RecordingReporter {
    pub(crate) fn new() -> Shared<Self> {
        shared(Self::default())
    }

    pub(crate) fn last(&self) -> Option<f32> {
        self.values.last().copied()
    }

    pub(crate) fn is_non_decreasing(&self) -> bool {
        self.values.windows(2).all(|pair| pair[0] <= pair[1])
    }
}

impl LoadingProgress for RecordingReporter {
    fn on_progress(&mut self, value: f32) {
        self.values.push(value);
    }
}

//=== RecordingEffect =====================================================

/// Transition effect lasting a fixed number of frames.
pub(crate) struct RecordingEffect {
    name: &'static str,
    journal: Journal,
    frames: u32,
    remaining: u32,
    running: Option<&'static str>,
    pub(crate) routes: Vec<(Option<String>, String)>,
}

impl RecordingEffect {
    pub(crate) fn new(name: &'static str, frames: u32, journal: &Journal) -> Shared<Self> {
        shared(Self {
            name,
            journal: journal.clone(),
            frames,
            remaining: 0,
            running: None,
            routes: Vec::new(),
        })
    }

    fn begin(&mut self, direction: &'static str, route: Route<'_>) {
        note(&self.journal, format!("{}.transition_{}", self.name, direction));
        self.routes
            .push((route.from.map(str::to_string), route.to.to_string()));
        self.remaining = self.frames;
        self.running = Some(direction);
    }
}

impl SceneTransition for RecordingEffect {
    fn transition_in(&mut self, route: Route<'_>) {
        self.begin("in", route);
    }

    fn transition_out(&mut self, route: Route<'_>) {
        self.begin("out", route);
    }

    fn update(&mut self, _dt: f32) -> AnimationStatus {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining > 0 {
            return AnimationStatus::Running;
        }

        if let Some(direction) = self.running.take() {
            note(&self.journal, format!("{}.{}_done", self.name, direction));
        }
        AnimationStatus::Finished
    }
}

//=== RecordingOverlay ====================================================

pub(crate) struct RecordingOverlay {
    name: &'static str,
    journal: Journal,
}

impl RecordingOverlay {
    pub(crate) fn new(name: &'static str, journal: &Journal) -> Shared<Self> {
        shared(Self {
            name,
            journal: journal.clone(),
        })
    }
}

impl LoadingOverlay for RecordingOverlay {
    fn initialize(&mut self) {
        note(&self.journal, format!("{}.initialize", self.name));
    }

    fn show(&mut self) {
        note(&self.journal, format!("{}.show", self.name));
    }

    fn hide(&mut self) {
        note(&self.journal, format!("{}.hide", self.name));
    }
}

//=== Driving =============================================================

/// Ticks until the director is idle; returns the number of ticks.
pub(crate) fn drive_until_idle(director: &mut Director, dt: f32) -> usize {
    const MAX_TICKS: usize = 10_000;

    let mut ticks = 0;
    while director.is_busy() {
        assert!(ticks < MAX_TICKS, "director still busy after {MAX_TICKS} ticks");
        director.tick(dt);
        ticks += 1;
    }
    ticks
}
