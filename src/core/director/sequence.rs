//=========================================================================
// Transition Sequence
//=========================================================================
//
// Step function of one in-flight transition.
//
// Flow (no overlay):
//   Settle → BeginLoad → PollLoad[0,1] → HideOrigin → ExitOrigin
//     → Activate → AwaitActivation → Enter → RevealTarget → Finish
//
// Flow (overlay):
//   Settle → BeginLoad → [BeginOverlayLoad → PollOverlayLoad] → HideOrigin
//     → ExitOrigin → [AwaitOverlayScene] → ShowOverlay → PollLoad[0,0.5]
//     → Activate → AwaitActivation → Enter → PollReadiness[0.5,1]
//     → HideOverlay → DismissOverlay → RevealTarget → Finish
//
// The target load always starts before the origin is touched, so a
// target the loader rejects ends the transition with the origin intact.
//
// Each tick runs steps until one suspends. Polls test their predicate
// before suspending; animations start, then suspend until finished. Only
// the first step of a tick sees the frame's dt.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::mem;

//=== External Dependencies ===============================================

use log::debug;

//=== Internal Dependencies ===============================================

use super::diagnostic::{Diagnostic, Diagnostics};
use super::{DirectorState, Services};
use crate::core::bridge::LoadHandle;
use crate::core::overlay::Overlay;
use crate::core::progress::{ProgressPhase, ProgressSpan};
use crate::core::scene::{
    AnimationStatus, CapabilityRegistry, LoadingProgress, Route, SceneCapabilities, SceneParam,
    SceneTransition, Shared,
};
use crate::error::LoadError;

//=== Step ================================================================

pub(super) enum Step {
    Settle,
    BeginOverlayLoad,
    PollOverlayLoad,
    HideOrigin,
    ExitOrigin,
    AwaitOverlayScene,
    ShowOverlay,
    BeginLoad,
    PollLoad(ProgressPhase),
    Activate,
    AwaitActivation,
    Enter,
    PollReadiness(ProgressPhase),
    HideOverlay,
    DismissOverlay,
    RevealTarget,
    Finish,
    Animate {
        effect: Shared<dyn SceneTransition>,
        then: Box<Step>,
    },
}

impl Step {
    fn name(&self) -> &'static str {
        match self {
            Step::Settle => "Settle",
            Step::BeginOverlayLoad => "BeginOverlayLoad",
            Step::PollOverlayLoad => "PollOverlayLoad",
            Step::HideOrigin => "HideOrigin",
            Step::ExitOrigin => "ExitOrigin",
            Step::AwaitOverlayScene => "AwaitOverlayScene",
            Step::ShowOverlay => "ShowOverlay",
            Step::BeginLoad => "BeginLoad",
            Step::PollLoad(_) => "PollLoad",
            Step::Activate => "Activate",
            Step::AwaitActivation => "AwaitActivation",
            Step::Enter => "Enter",
            Step::PollReadiness(_) => "PollReadiness",
            Step::HideOverlay => "HideOverlay",
            Step::DismissOverlay => "DismissOverlay",
            Step::RevealTarget => "RevealTarget",
            Step::Finish => "Finish",
            Step::Animate { .. } => "Animate",
        }
    }
}

/// Outcome of running one step.
pub(super) enum Flow {
    /// Run `Step` within the same tick.
    Next(Step),
    /// Yield to the next tick, then resume at `Step`.
    Suspend(Step),
    Done,
}

//=== Context =============================================================

pub(super) struct Context<'a> {
    pub(super) services: &'a mut Services,
    pub(super) diagnostics: &'a mut Diagnostics,
    pub(super) activation_threshold: f32,
}

//=== Sequence ============================================================

pub(super) struct Sequence {
    origin: Option<String>,
    target: String,
    outgoing: SceneCapabilities,
    incoming: SceneCapabilities,
    overlay: Option<Overlay>,
    param: Option<SceneParam>,
    min_loading_time: f32,
    overlay_load: Option<LoadHandle>,
    load: Option<LoadHandle>,
    step: Step,
}

impl Sequence {
    //--- Construction -----------------------------------------------------

    pub(super) fn change(
        origin: Option<String>,
        target: String,
        outgoing: SceneCapabilities,
        overlay: Option<Overlay>,
        param: Option<SceneParam>,
        min_loading_time: f32,
    ) -> Self {
        Self {
            origin,
            target,
            outgoing,
            incoming: SceneCapabilities::default(),
            overlay,
            param,
            min_loading_time,
            overlay_load: None,
            load: None,
            step: Step::Settle,
        }
    }

    /// Entry of the scene that is already active at startup.
    pub(super) fn boot(scene: String) -> Self {
        let mut sequence = Self::change(None, scene, SceneCapabilities::default(), None, None, 0.0);
        sequence.step = Step::Enter;
        sequence
    }

    //--- Queries ----------------------------------------------------------

    pub(super) fn target(&self) -> &str {
        &self.target
    }

    pub(super) fn state(&self) -> DirectorState {
        self.state_of(&self.step)
    }

    fn state_of(&self, step: &Step) -> DirectorState {
        match step {
            Step::Settle => DirectorState::Preparing,
            Step::BeginOverlayLoad
            | Step::PollOverlayLoad
            | Step::HideOrigin
            | Step::ExitOrigin
            | Step::AwaitOverlayScene
            | Step::ShowOverlay
            | Step::BeginLoad
            | Step::PollLoad(_) => {
                if self.overlay.is_some() {
                    DirectorState::LoadingWithOverlay
                } else {
                    DirectorState::LoadingWithoutOverlay
                }
            }
            Step::Activate | Step::AwaitActivation => DirectorState::Activating,
            Step::Enter
            | Step::PollReadiness(_)
            | Step::HideOverlay
            | Step::DismissOverlay
            | Step::RevealTarget
            | Step::Finish => DirectorState::Entering,
            Step::Animate { then, .. } => self.state_of(then),
        }
    }

    fn route(&self) -> Route<'_> {
        Route::new(self.origin.as_deref(), &self.target)
    }

    //--- advance() --------------------------------------------------------
    //
    // Runs steps until one suspends or the sequence ends. Returns `true`
    // once the transition is done.
    //
    pub(super) fn advance(&mut self, cx: &mut Context<'_>, dt: f32) -> bool {
        let mut dt = dt.max(0.0);

        loop {
            let step = mem::replace(&mut self.step, Step::Finish);

            match self.run(step, cx, dt) {
                Flow::Next(next) => {
                    debug!("Transition to {:?}: entering {}", self.target, next.name());
                    self.step = next;
                    dt = 0.0;
                }
                Flow::Suspend(next) => {
                    self.step = next;
                    return false;
                }
                Flow::Done => return true,
            }
        }
    }

    fn run(&mut self, step: Step, cx: &mut Context<'_>, dt: f32) -> Flow {
        match step {
            Step::Settle => self.settle(),
            Step::BeginOverlayLoad => self.begin_overlay_load(cx),
            Step::PollOverlayLoad => self.poll_overlay_load(cx),
            Step::HideOrigin => self.hide_origin(),
            Step::ExitOrigin => self.exit_origin(cx),
            Step::AwaitOverlayScene => self.await_overlay_scene(cx),
            Step::ShowOverlay => self.show_overlay(),
            Step::BeginLoad => self.begin_load(cx),
            Step::PollLoad(phase) => self.poll_load(cx, phase, dt),
            Step::Activate => self.activate(cx),
            Step::AwaitActivation => self.await_activation(cx),
            Step::Enter => self.enter(cx),
            Step::PollReadiness(phase) => self.poll_readiness(phase, dt),
            Step::HideOverlay => self.hide_overlay(),
            Step::DismissOverlay => self.dismiss_overlay(),
            Step::RevealTarget => self.reveal_target(),
            Step::Finish => self.finish(cx),
            Step::Animate { effect, then } => {
                let status = effect.borrow_mut().update(dt);
                match status {
                    AnimationStatus::Finished => Flow::Next(*then),
                    AnimationStatus::Running => Flow::Suspend(Step::Animate { effect, then }),
                }
            }
        }
    }

    //=== Preparing / Loading =============================================

    fn settle(&mut self) -> Flow {
        Flow::Next(Step::BeginLoad)
    }

    fn begin_overlay_load(&mut self, cx: &mut Context<'_>) -> Flow {
        let Some(scene) = self.overlay.as_ref().and_then(|o| o.scene()).map(str::to_string) else {
            return Flow::Next(Step::HideOrigin);
        };

        match cx.services.loader.begin_load(&scene) {
            Ok(handle) => {
                self.overlay_load = Some(handle);
                Flow::Next(Step::PollOverlayLoad)
            }
            Err(error) => {
                // The overlay still works without its backing scene
                cx.diagnostics.record(Diagnostic::LoadFailed { scene, error });
                Flow::Next(Step::HideOrigin)
            }
        }
    }

    fn begin_load(&mut self, cx: &mut Context<'_>) -> Flow {
        match cx.services.loader.begin_load(&self.target) {
            Ok(handle) => self.load = Some(handle),
            Err(error) => return self.abort(cx, error),
        }

        match &self.overlay {
            Some(overlay) if overlay.scene().is_some() => Flow::Next(Step::BeginOverlayLoad),
            Some(_) => Flow::Next(Step::HideOrigin),
            None => Flow::Next(Step::PollLoad(ProgressPhase::new(
                ProgressSpan::FULL,
                self.min_loading_time,
            ))),
        }
    }

    fn poll_overlay_load(&mut self, cx: &mut Context<'_>) -> Flow {
        let Some(handle) = self.overlay_load else {
            return Flow::Next(Step::HideOrigin);
        };

        let native = cx.services.loader.native_progress(handle) / cx.activation_threshold;
        if native >= 1.0 {
            Flow::Next(Step::HideOrigin)
        } else {
            Flow::Suspend(Step::PollOverlayLoad)
        }
    }

    fn hide_origin(&mut self) -> Flow {
        let effect = self.outgoing.transition.clone();
        self.animate(effect, false, Step::ExitOrigin)
    }

    fn exit_origin(&mut self, cx: &mut Context<'_>) -> Flow {
        if let Some(handler) = &self.outgoing.handler {
            handler.borrow_mut().on_exit();
        }

        if self.overlay.is_none() {
            return Flow::Next(Step::Activate);
        }

        match self.overlay_load {
            Some(handle) => {
                cx.services.loader.activate(handle);
                Flow::Next(Step::AwaitOverlayScene)
            }
            None => Flow::Next(Step::ShowOverlay),
        }
    }

    fn await_overlay_scene(&mut self, cx: &mut Context<'_>) -> Flow {
        match self.overlay_load {
            Some(handle) if !cx.services.loader.is_complete(handle) => {
                Flow::Suspend(Step::AwaitOverlayScene)
            }
            _ => Flow::Next(Step::ShowOverlay),
        }
    }

    fn show_overlay(&mut self) -> Flow {
        // The first half of the bar is timed from the moment it is visible
        let first_half = Step::PollLoad(ProgressPhase::new(
            ProgressSpan::FIRST_HALF,
            self.min_loading_time,
        ));

        let Some(overlay) = &self.overlay else {
            return Flow::Next(first_half);
        };

        overlay.show();
        debug!("Loading overlay shown for {:?}", self.target);

        let effect = overlay.transition().cloned();
        self.animate(effect, true, first_half)
    }

    fn poll_load(&mut self, cx: &mut Context<'_>, mut phase: ProgressPhase, dt: f32) -> Flow {
        let native = match self.load {
            Some(handle) => cx.services.loader.native_progress(handle),
            None => 1.0,
        };

        phase.advance(dt);
        let sample = phase.sample(native / cx.activation_threshold);

        let reporter = match &self.overlay {
            Some(overlay) => overlay.progress().cloned(),
            None => self.outgoing.progress.clone(),
        };
        deliver(reporter.as_ref(), sample.value);

        if !sample.done {
            return Flow::Suspend(Step::PollLoad(phase));
        }

        if self.overlay.is_some() {
            Flow::Next(Step::Activate)
        } else {
            Flow::Next(Step::HideOrigin)
        }
    }

    //=== Activating ======================================================

    fn activate(&mut self, cx: &mut Context<'_>) -> Flow {
        if let Some(handle) = self.load {
            cx.services.loader.activate(handle);
        }
        Flow::Next(Step::AwaitActivation)
    }

    fn await_activation(&mut self, cx: &mut Context<'_>) -> Flow {
        match self.load {
            Some(handle) if !cx.services.loader.is_complete(handle) => {
                Flow::Suspend(Step::AwaitActivation)
            }
            _ => Flow::Next(Step::Enter),
        }
    }

    //=== Entering ========================================================

    fn enter(&mut self, cx: &mut Context<'_>) -> Flow {
        self.incoming = CapabilityRegistry::new(&*cx.services.graph).resolve(&self.target);
        cx.services.input.set_enabled(&self.target, false);

        let param = self.param.take();
        match (&self.incoming.handler, param) {
            (Some(handler), Some(param)) => {
                let delivered = handler.borrow_mut().on_enter_with(param);
                if let Err(error) = delivered {
                    cx.diagnostics.record(Diagnostic::ParamDropped {
                        scene: self.target.clone(),
                        error,
                    });
                    handler.borrow_mut().on_enter();
                }
            }
            (Some(handler), None) => handler.borrow_mut().on_enter(),
            (None, Some(param)) => {
                debug!(
                    "Scene {:?} has no handler, discarding {} parameter",
                    self.target,
                    param.type_name()
                );
            }
            (None, None) => {}
        }

        if self.overlay.is_some() {
            Flow::Next(Step::PollReadiness(ProgressPhase::new(
                ProgressSpan::SECOND_HALF,
                self.min_loading_time,
            )))
        } else {
            Flow::Next(Step::RevealTarget)
        }
    }

    fn poll_readiness(&mut self, mut phase: ProgressPhase, dt: f32) -> Flow {
        let readiness = match &self.incoming.handler {
            Some(handler) => handler.borrow().progress(),
            None => 1.0,
        };

        phase.advance(dt);
        let sample = phase.sample(readiness);

        let reporter = self.overlay.as_ref().and_then(|o| o.progress().cloned());
        deliver(reporter.as_ref(), sample.value);

        if sample.done {
            Flow::Next(Step::HideOverlay)
        } else {
            Flow::Suspend(Step::PollReadiness(phase))
        }
    }

    fn hide_overlay(&mut self) -> Flow {
        let effect = self.overlay.as_ref().and_then(|o| o.transition().cloned());
        self.animate(effect, false, Step::DismissOverlay)
    }

    fn dismiss_overlay(&mut self) -> Flow {
        if let Some(overlay) = &self.overlay {
            overlay.hide();
            debug!("Loading overlay hidden for {:?}", self.target);
        }
        Flow::Next(Step::RevealTarget)
    }

    fn reveal_target(&mut self) -> Flow {
        let effect = self.incoming.transition.clone();
        self.animate(effect, true, Step::Finish)
    }

    fn finish(&mut self, cx: &mut Context<'_>) -> Flow {
        cx.services.input.set_enabled(&self.target, true);
        self.restore_origin_input(cx);
        Flow::Done
    }

    //=== Helpers =========================================================

    /// Starts `effect` in the given direction and resumes at `then` once it
    /// finishes; without an effect, continues immediately.
    fn animate(&self, effect: Option<Shared<dyn SceneTransition>>, entering: bool, then: Step) -> Flow {
        let Some(effect) = effect else {
            return Flow::Next(then);
        };

        {
            let route = self.route();
            let mut animation = effect.borrow_mut();
            if entering {
                animation.prepare_in(route);
                animation.transition_in(route);
            } else {
                animation.prepare_out(route);
                animation.transition_out(route);
            }
        }

        Flow::Suspend(Step::Animate {
            effect,
            then: Box::new(then),
        })
    }

    fn restore_origin_input(&self, cx: &mut Context<'_>) {
        if let Some(origin) = &self.origin {
            if origin != &self.target {
                cx.services.input.set_enabled(origin, true);
            }
        }
    }

    /// Ends the transition after the target could not be loaded. Runs
    /// before the origin is hidden or exited, so only its input needs
    /// restoring.
    fn abort(&mut self, cx: &mut Context<'_>, error: LoadError) -> Flow {
        cx.diagnostics.record(Diagnostic::LoadFailed {
            scene: self.target.clone(),
            error,
        });

        if let Some(origin) = &self.origin {
            cx.services.input.set_enabled(origin, true);
        }
        Flow::Done
    }
}

fn deliver(reporter: Option<&Shared<dyn LoadingProgress>>, value: f32) {
    if let Some(reporter) = reporter {
        reporter.borrow_mut().on_progress(value);
    }
}
