//=========================================================================
// Transition Effects
//=========================================================================
//
// Ready-made scene transitions.
//
// `Fade` drives a full-screen curtain alpha that the renderer reads each
// frame: fade to black, load, fade back in. Custom effects implement
// `SceneTransition` the same way.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::scene::{AnimationStatus, Route, SceneTransition};

//=== Easing ==============================================================

/// Easing functions for transition curves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Easing {
    /// Constant speed throughout.
    #[default]
    Linear,
    /// Start slow, accelerate.
    EaseIn,
    /// Start fast, decelerate.
    EaseOut,
    /// Start slow, speed up, then slow down.
    EaseInOut,
}

impl Easing {
    /// Apply the easing function to a linear progress value (0.0 to 1.0).
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

//=== Fade ================================================================

/// Curtain fade.
///
/// `alpha` is the curtain opacity: 1.0 fully covers the scene. Entry fades
/// the curtain out (1 → 0), exit fades it in (0 → 1).
#[derive(Clone, Debug)]
pub struct Fade {
    duration: f32,
    easing: Easing,
    alpha: f32,
    from: f32,
    to: f32,
    elapsed: f32,
    running: bool,
}

impl Fade {
    /// Create a linear fade lasting `duration` seconds.
    pub fn new(duration: f32) -> Self {
        Self {
            duration: duration.max(0.0),
            easing: Easing::Linear,
            alpha: 0.0,
            from: 0.0,
            to: 0.0,
            elapsed: 0.0,
            running: false,
        }
    }

    /// Set the easing function for this fade.
    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Current curtain opacity.
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Whether an animation is in progress.
    pub fn is_running(&self) -> bool {
        self.running
    }

    fn start(&mut self, from: f32, to: f32) {
        self.from = from;
        self.to = to;
        self.alpha = from;
        self.elapsed = 0.0;
        self.running = true;
    }
}

//--- SceneTransition -----------------------------------------------------

impl SceneTransition for Fade {
    fn prepare_in(&mut self, _route: Route<'_>) {
        self.alpha = 1.0;
    }

    fn transition_in(&mut self, _route: Route<'_>) {
        self.start(1.0, 0.0);
    }

    fn prepare_out(&mut self, _route: Route<'_>) {
        self.alpha = 0.0;
    }

    fn transition_out(&mut self, _route: Route<'_>) {
        self.start(0.0, 1.0);
    }

    fn update(&mut self, dt: f32) -> AnimationStatus {
        if !self.running {
            return AnimationStatus::Finished;
        }

        self.elapsed += dt.max(0.0);

        let t = if self.duration > 0.0 {
            (self.elapsed / self.duration).min(1.0)
        } else {
            1.0
        };

        let eased = self.easing.apply(t);
        self.alpha = self.from + (self.to - self.from) * eased;

        if t >= 1.0 {
            self.alpha = self.to;
            self.running = false;
            AnimationStatus::Finished
        } else {
            AnimationStatus::Running
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
