//=========================================================================
// Input Gate
//
// Per-scene input dispatch switch used by the director to block user
// input while a transition runs.
//
// Responsibilities:
// - Track which scenes currently have input dispatch disabled
// - Filter per-frame event batches for disabled scenes
// - Count disable/enable toggles for diagnostics
//
// Notes:
// Scenes are enabled unless explicitly disabled, so a scene the gate
// has never heard of receives input normally.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::collections::HashSet;

//=== External Crates =====================================================

use log::debug;

//=== Internal Imports ====================================================

use crate::core::bridge::InputDispatcher;

//=== InputGate ===========================================================

#[derive(Debug, Default)]
pub struct InputGate {
    disabled: HashSet<String>,
    toggles: u64,
}

impl InputGate {
    //--- Construction -----------------------------------------------------
    pub fn new() -> Self {
        Self::default()
    }

    //--- Query Methods ----------------------------------------------------

    /// Returns `true` if input for `scene` is dispatched.
    pub fn is_enabled(&self, scene: &str) -> bool {
        !self.disabled.contains(scene)
    }

    /// Number of effective enable/disable changes so far.
    pub fn toggles(&self) -> u64 {
        self.toggles
    }

    //--- admit() ----------------------------------------------------------
    //
    // Passes a frame's events through when the scene accepts input,
    // otherwise drops the whole batch.
    //
    pub fn admit<E>(&self, scene: &str, events: Vec<E>) -> Vec<E> {
        if self.is_enabled(scene) {
            events
        } else {
            if !events.is_empty() {
                debug!("Dropped {} input events for blocked scene {:?}", events.len(), scene);
            }
            Vec::new()
        }
    }
}

impl InputDispatcher for InputGate {
    fn set_enabled(&mut self, scene: &str, enabled: bool) {
        let changed = if enabled {
            self.disabled.remove(scene)
        } else {
            self.disabled.insert(scene.to_string())
        };

        if changed {
            self.toggles += 1;
            debug!(
                "Input dispatch for scene {:?} {}",
                scene,
                if enabled { "enabled" } else { "disabled" }
            );
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
