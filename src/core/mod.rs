//=========================================================================
// Core Systems
//
// Subsystems of the scene director.
//
// Responsibilities:
// - `bridge`: contract with the engine (loader, scene graph, input, resources)
// - `scene`: scene capabilities, typed parameters and the Stage backend
// - `overlay`: registry of reusable loading overlays
// - `progress`: blending of raw progress with minimum-duration pacing
// - `director`: the single-flight transition state machine
// - `input` / `effects`: ready-made input gate and fade transition
//
// Notes:
// Everything here is single-threaded and driven once per frame. Only
// the Stage's preload workers and the runtime's command channel cross
// thread boundaries.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod bridge;
pub mod director;
pub mod effects;
pub mod input;
pub mod overlay;
pub mod progress;
pub mod scene;

#[cfg(test)]
pub(crate) mod testing;

//=== Public Exports ======================================================

pub use director::{ChangeRequest, Diagnostic, Director, DirectorBuilder, DirectorConfig, DirectorState};
pub use overlay::{LoadingOverlay, Overlay, OverlayTable};
pub use progress::blend;
