//=========================================================================
// Scene Director
//
// Single-flight orchestrator of scene transitions.
//
// Architecture:
// ```text
//     DirectorBuilder  ──build()──>  Director
//         │                              │
//         ├─ with_materializer()         ├─ change()   Idle → Preparing
//         ├─ with_overlay()              ├─ tick(dt)   advances the sequence
//         ├─ with_activation_threshold() ├─ start()    boot entry
//         └─ with_min_loading_time()     └─ shutdown() refuses further work
// ```
//
// States:
//   Idle → Preparing → LoadingWithoutOverlay | LoadingWithOverlay
//        → Activating → Entering → Idle
//
// At most one transition is in flight. A request arriving while busy is
// dropped and reported, never queued.
//
//=========================================================================

//=== Module Declarations =================================================

mod diagnostic;
mod request;
mod sequence;


//=== Public API ==========================================================

pub use diagnostic::{Diagnostic, MAX_DIAGNOSTICS};
pub use request::ChangeRequest;

//=== External Dependencies ===============================================

use log::{debug, info, warn};

//=== Internal Dependencies ===============================================

use crate::core::bridge::{InputDispatcher, ResourceMaterializer, SceneGraph, SceneLoader};
use crate::core::overlay::{Overlay, OverlayTable};
use crate::core::scene::{CapabilityRegistry, SceneCapabilities};
use crate::error::{ChangeError, OverlayError};
use diagnostic::Diagnostics;
use sequence::{Context, Sequence};

//=== DirectorState =======================================================

/// Externally observable phase of the director.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectorState {
    Idle,
    Preparing,
    LoadingWithoutOverlay,
    LoadingWithOverlay,
    Activating,
    Entering,
}

//=== DirectorConfig ======================================================

/// Tunables applied to every transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectorConfig {
    /// Loader-native progress treated as fully loaded.
    pub activation_threshold: f32,
    /// Minimum loading time for requests that do not set their own.
    pub min_loading_time: f32,
}

impl Default for DirectorConfig {
    fn default() -> Self {
        Self {
            activation_threshold: 0.9,
            min_loading_time: 0.0,
        }
    }
}

//=== Services ============================================================

struct Services {
    loader: Box<dyn SceneLoader>,
    graph: Box<dyn SceneGraph>,
    input: Box<dyn InputDispatcher>,
    materializer: Option<Box<dyn ResourceMaterializer>>,
}

//=== DirectorBuilder =====================================================

/// Builder for configuring and constructing a [`Director`].
///
/// # Default Values
///
/// - **Activation threshold**: 0.9
/// - **Minimum loading time**: 0.0 seconds
///
/// # Examples
///
/// ```
/// use aetheric_director::prelude::*;
///
/// let stage = shared(Stage::new());
/// stage.borrow_mut().register_default("Main", Vec::new);
///
/// let mut director = DirectorBuilder::new(stage.clone(), stage.clone(), InputGate::new())
///     .with_materializer(stage.clone())
///     .with_min_loading_time(0.5)
///     .build();
///
/// director.start();
/// assert_eq!(director.state(), DirectorState::Idle);
/// ```
pub struct DirectorBuilder {
    services: Services,
    overlays: Vec<(String, Overlay)>,
    config: DirectorConfig,
}

impl DirectorBuilder {
    /// Creates a builder around the three mandatory collaborators.
    pub fn new<L, G, I>(loader: L, graph: G, input: I) -> Self
    where
        L: SceneLoader + 'static,
        G: SceneGraph + 'static,
        I: InputDispatcher + 'static,
    {
        Self {
            services: Services {
                loader: Box::new(loader),
                graph: Box::new(graph),
                input: Box::new(input),
                materializer: None,
            },
            overlays: Vec::new(),
            config: DirectorConfig::default(),
        }
    }

    /// Sets the collaborator used to materialize overlays by key.
    pub fn with_materializer<M: ResourceMaterializer + 'static>(mut self, materializer: M) -> Self {
        self.services.materializer = Some(Box::new(materializer));
        self
    }

    /// Registers an overlay when the director is built.
    pub fn with_overlay(mut self, name: impl Into<String>, overlay: Overlay) -> Self {
        self.overlays.push((name.into(), overlay));
        self
    }

    /// Sets the loader-native progress that counts as fully loaded.
    ///
    /// Default: 0.9
    ///
    /// # Panics
    ///
    /// Panics if `threshold` is not in `(0, 1]`.
    pub fn with_activation_threshold(mut self, threshold: f32) -> Self {
        assert!(
            threshold > 0.0 && threshold <= 1.0,
            "Activation threshold must be in (0, 1], got {}",
            threshold
        );
        self.config.activation_threshold = threshold;
        self
    }

    /// Sets the default minimum loading time in seconds.
    ///
    /// Default: 0.0
    ///
    /// # Panics
    ///
    /// Panics if `seconds` is negative or not finite.
    pub fn with_min_loading_time(mut self, seconds: f32) -> Self {
        assert!(
            seconds.is_finite() && seconds >= 0.0,
            "Minimum loading time must be finite and non-negative, got {}",
            seconds
        );
        self.config.min_loading_time = seconds;
        self
    }

    pub fn build(self) -> Director {
        info!(
            "Building director (activation threshold: {}, min loading time: {}s, overlays: {})",
            self.config.activation_threshold,
            self.config.min_loading_time,
            self.overlays.len()
        );

        let mut director = Director {
            services: self.services,
            overlays: OverlayTable::new(),
            config: self.config,
            diagnostics: Diagnostics::default(),
            sequence: None,
            booted: false,
            shutting_down: false,
        };

        for (name, overlay) in self.overlays {
            // Rejections are kept in the diagnostic journal
            let _ = director.register_overlay(name, overlay);
        }

        director
    }
}

//=== Director ============================================================

/// Scene transition orchestrator.
///
/// Owns the overlay table and borrows scene capabilities for the length
/// of one transition. Drive it by calling [`Director::tick`] once per
/// frame, or hand it to a [`crate::Runtime`].
pub struct Director {
    services: Services,
    overlays: OverlayTable,
    config: DirectorConfig,
    diagnostics: Diagnostics,
    sequence: Option<Sequence>,
    booted: bool,
    shutting_down: bool,
}

impl Director {
    //=== Transitions =====================================================

    //--- change() ---------------------------------------------------------
    //
    // Runs the Preparing step synchronously: snapshots the active scene's
    // capabilities and blocks its input. Loading starts on the next tick.
    //
    pub fn change(&mut self, request: ChangeRequest) -> Result<(), ChangeError> {
        let (target, overlay_name, min_loading_time, param) = request.into_parts();

        if self.shutting_down {
            return Err(self.drop_request(ChangeError::ShuttingDown(target)));
        }

        if let Some(sequence) = &self.sequence {
            let error = ChangeError::Busy {
                requested: target,
                in_flight: sequence.target().to_string(),
            };
            return Err(self.drop_request(error));
        }

        let overlay = overlay_name.and_then(|name| self.resolve_overlay(&name));
        let min_loading_time = match min_loading_time {
            Some(seconds) if seconds.is_finite() => seconds.max(0.0),
            Some(seconds) => {
                warn!(
                    "Ignoring minimum loading time {} for {:?}, using {}s",
                    seconds, target, self.config.min_loading_time
                );
                self.config.min_loading_time
            }
            None => self.config.min_loading_time,
        };

        let origin = self.services.graph.active_scene();
        let outgoing = match &origin {
            Some(scene) => {
                let caps = CapabilityRegistry::new(&*self.services.graph).resolve(scene);
                self.services.input.set_enabled(scene, false);
                caps
            }
            None => SceneCapabilities::default(),
        };

        info!(
            "Transition {:?} → {:?} started (overlay: {}, min loading time: {}s)",
            origin,
            target,
            overlay.is_some(),
            min_loading_time
        );

        self.sequence = Some(Sequence::change(
            origin,
            target,
            outgoing,
            overlay,
            param,
            min_loading_time,
        ));
        Ok(())
    }

    /// Enters the scene that is active at application start.
    ///
    /// Calls its handler's `on_enter` and plays its entry transition with
    /// input blocked. Only the first call has an effect.
    pub fn start(&mut self) {
        if self.booted {
            debug!("Director already started");
            return;
        }
        if self.shutting_down {
            debug!("Director is shutting down, skipping start");
            return;
        }
        self.booted = true;

        if let Some(sequence) = &self.sequence {
            debug!("Transition to {:?} already running, skipping boot entry", sequence.target());
            return;
        }

        let Some(scene) = self.services.graph.active_scene() else {
            warn!("No active scene at start");
            return;
        };

        info!("Entering initial scene {:?}", scene);
        self.sequence = Some(Sequence::boot(scene));
        self.advance(0.0);
    }

    /// Advances the in-flight transition by one frame.
    pub fn tick(&mut self, dt: f32) {
        if self.shutting_down {
            return;
        }
        self.advance(dt);
    }

    /// Begins shutdown: the idle scene's handler exits and further
    /// requests are refused.
    pub fn shutdown(&mut self) {
        if self.shutting_down {
            return;
        }
        self.shutting_down = true;

        match &self.sequence {
            Some(sequence) => {
                warn!("Shutting down with transition to {:?} in flight", sequence.target());
            }
            None => {
                if let Some(scene) = self.services.graph.active_scene() {
                    let caps = CapabilityRegistry::new(&*self.services.graph).resolve(&scene);
                    if let Some(handler) = caps.handler {
                        handler.borrow_mut().on_exit();
                    }
                }
            }
        }

        info!("Director shut down");
    }

    //=== Overlays ========================================================

    /// Registers a loading overlay. Rejections are also recorded as a
    /// [`Diagnostic::OverlayRejected`].
    pub fn register_overlay(&mut self, name: impl Into<String>, overlay: Overlay) -> Result<(), OverlayError> {
        let result = self.overlays.register(name, overlay);
        self.note_overlay_result(result)
    }

    /// Materializes the overlay stored under `key` and registers it as `name`.
    pub fn register_overlay_from_source(&mut self, name: impl Into<String>, key: &str) -> Result<(), OverlayError> {
        let name = name.into();

        let result = match self.services.materializer.as_mut() {
            Some(materializer) => self.overlays.register_from_source(name, key, &mut **materializer),
            None => Err(OverlayError::NoMaterializer(name)),
        };
        self.note_overlay_result(result)
    }

    pub fn overlay(&self, name: &str) -> Option<&Overlay> {
        self.overlays.lookup(name)
    }

    pub fn overlays(&self) -> &OverlayTable {
        &self.overlays
    }

    //=== Queries =========================================================

    pub fn state(&self) -> DirectorState {
        self.sequence
            .as_ref()
            .map_or(DirectorState::Idle, |sequence| sequence.state())
    }

    pub fn is_busy(&self) -> bool {
        self.sequence.is_some()
    }

    /// Target of the transition in flight.
    pub fn in_flight_target(&self) -> Option<&str> {
        self.sequence.as_ref().map(|sequence| sequence.target())
    }

    pub fn is_started(&self) -> bool {
        self.booted
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down
    }

    pub fn config(&self) -> &DirectorConfig {
        &self.config
    }

    /// Diagnostics recorded since the last [`Director::take_diagnostics`],
    /// at most [`MAX_DIAGNOSTICS`] of the most recent.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.diagnostics.entries()
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.diagnostics.take()
    }

    //=== Internals =======================================================

    fn advance(&mut self, dt: f32) {
        let Some(sequence) = self.sequence.as_mut() else {
            return;
        };

        let mut cx = Context {
            services: &mut self.services,
            diagnostics: &mut self.diagnostics,
            activation_threshold: self.config.activation_threshold,
        };

        if sequence.advance(&mut cx, dt) {
            info!("Transition to {:?} finished", sequence.target());
            self.sequence = None;
        }
    }

    /// Looks up `name`, materializing it on demand when a materializer is
    /// configured.
    fn resolve_overlay(&mut self, name: &str) -> Option<Overlay> {
        if let Some(overlay) = self.overlays.lookup(name) {
            return Some(overlay.clone());
        }

        if let Some(materializer) = self.services.materializer.as_mut() {
            match self.overlays.register_from_source(name, name, &mut **materializer) {
                Ok(()) => {
                    info!("Materialized loading overlay {:?} on demand", name);
                    return self.overlays.lookup(name).cloned();
                }
                Err(error) => debug!("On-demand overlay materialization failed: {}", error),
            }
        }

        self.diagnostics.record(Diagnostic::OverlayMissing {
            name: name.to_string(),
        });
        None
    }

    fn note_overlay_result(&mut self, result: Result<(), OverlayError>) -> Result<(), OverlayError> {
        if let Err(error) = &result {
            self.diagnostics.record(Diagnostic::OverlayRejected(error.clone()));
        }
        result
    }

    fn drop_request(&mut self, error: ChangeError) -> ChangeError {
        self.diagnostics.record(Diagnostic::RequestDropped(error.clone()));
        error
    }
}
