//=========================================================================
// Aetheric Director — Library Root
//
// Frame-driven scene transitions: background loading, loading overlays,
// paced progress and scene handler re-entry under one director.
//
// Responsibilities:
// - Expose the director and its builder (`Director`, `DirectorBuilder`)
// - Expose the capability and collaborator traits scenes and engines implement
// - Provide a fixed-rate runtime with thread-safe request handles
//
// Typical usage:
// ```no_run
// use aetheric_director::prelude::*;
//
// let stage = shared(Stage::new());
// stage.borrow_mut().register_default("Main", Vec::new);
// stage.borrow_mut().register_scene("Shop", Vec::new);
//
// let director = DirectorBuilder::new(stage.clone(), stage.clone(), InputGate::new()).build();
// let runtime = RuntimeBuilder::new().build(director);
// runtime.handle().change(ChangeRequest::new("Shop")).ok();
// runtime.run();
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` holds the director and every subsystem it drives. `error`
// holds the typed failures shared across them.
//
pub mod core;
pub mod error;
pub mod prelude;

//--- Internal Modules ----------------------------------------------------
//
// `runtime` defines the fixed-rate loop; its types are re-exported below.
//
mod runtime;

//--- Public Exports ------------------------------------------------------

pub use crate::core::{ChangeRequest, Director, DirectorBuilder};
pub use runtime::{Command, DirectorHandle, Runtime, RuntimeBuilder, TickControl};
