//=========================================================================
// Director Runtime
//
// Frame scheduler that owns a Director and drives it at a fixed rate.
//
// Architecture:
// ```text
//     RuntimeBuilder  ──build(director)──>  Runtime  ──run()──>  Director
//         │                                   │
//         ├─ with_tps()                       ├─ handle() → DirectorHandle (Send + Clone)
//         └─ with_channel_capacity()          └─ step(dt) one frame
//
//     DirectorHandle ──Command──> bounded channel ──drain──> Director::change
// ```
//
// Commands are applied at frame boundaries, before the director ticks.
// The loop runs on the calling thread because scene capabilities are
// single-threaded; other threads talk to it through handles.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::thread;
use std::time::{Duration, Instant};

//=== External Dependencies ===============================================

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};
use log::{info, warn};

//=== Internal Dependencies ===============================================

use crate::core::director::{ChangeRequest, Director};
use crate::error::ChangeError;

//=== Command =============================================================

/// Message from a [`DirectorHandle`] to the runtime.
#[derive(Debug)]
pub enum Command {
    Change(ChangeRequest),
    Shutdown,
}

/// Update loop control signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    Exit,
}

//=== DirectorHandle ======================================================

/// Cloneable, thread-safe sender of scene change requests.
#[derive(Debug, Clone)]
pub struct DirectorHandle {
    sender: Sender<Command>,
}

impl DirectorHandle {
    /// Queues a change for the next frame.
    ///
    /// Acceptance here only means the request reached the runtime; it is
    /// still dropped if a transition is in flight when it is applied.
    pub fn change(&self, request: ChangeRequest) -> Result<(), ChangeError> {
        let target = request.target().to_string();

        self.sender
            .try_send(Command::Change(request))
            .map_err(|e| match e {
                TrySendError::Full(_) => ChangeError::Backlog(target),
                TrySendError::Disconnected(_) => ChangeError::Disconnected(target),
            })
    }

    /// Asks the runtime to stop after the current frame.
    ///
    /// Returns `false` if the runtime is gone or its queue is full.
    pub fn shutdown(&self) -> bool {
        match self.sender.try_send(Command::Shutdown) {
            Ok(()) => true,
            Err(e) => {
                warn!("Shutdown request not delivered: {}", e);
                false
            }
        }
    }
}

//=== RuntimeBuilder ======================================================

/// Builder for configuring and constructing a [`Runtime`].
///
/// # Default Values
///
/// - **TPS**: 60.0 (director ticks per second)
/// - **Channel capacity**: 128 commands
///
/// # Examples
///
/// ```
/// use aetheric_director::prelude::*;
///
/// let stage = shared(Stage::new());
/// stage.borrow_mut().register_default("Main", Vec::new);
/// let director = DirectorBuilder::new(stage.clone(), stage.clone(), InputGate::new()).build();
///
/// let runtime = RuntimeBuilder::new().with_tps(120.0).build(director);
/// runtime.handle().shutdown();
///
/// let director = runtime.run();
/// assert!(director.is_shutting_down());
/// ```
#[derive(Debug, Clone)]
pub struct RuntimeBuilder {
    tps: f64,
    channel_capacity: usize,
}

impl RuntimeBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            tps: 60.0,
            channel_capacity: 128,
        }
    }

    /// Sets the target ticks per second.
    ///
    /// Default: 60.0
    ///
    /// # Panics
    ///
    /// Panics if `tps <= 0.0`.
    pub fn with_tps(mut self, tps: f64) -> Self {
        assert!(tps > 0.0, "TPS must be positive, got {}", tps);
        self.tps = tps;
        self
    }

    /// Sets the capacity of the command channel.
    ///
    /// Default: 128
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Channel capacity must be positive");
        self.channel_capacity = capacity;
        self
    }

    pub fn build(self, director: Director) -> Runtime {
        info!("Building runtime (TPS: {}, channel: {})", self.tps, self.channel_capacity);

        let (sender, receiver) = bounded(self.channel_capacity);

        Runtime {
            director,
            sender,
            receiver,
            frame_duration: Duration::from_secs_f64(1.0 / self.tps),
        }
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//=== Runtime =============================================================

/// Fixed-rate driver of a [`Director`].
pub struct Runtime {
    director: Director,
    sender: Sender<Command>,
    receiver: Receiver<Command>,
    frame_duration: Duration,
}

impl Runtime {
    /// Returns a new handle for sending commands to this runtime.
    pub fn handle(&self) -> DirectorHandle {
        DirectorHandle {
            sender: self.sender.clone(),
        }
    }

    pub fn director(&self) -> &Director {
        &self.director
    }

    pub fn director_mut(&mut self) -> &mut Director {
        &mut self.director
    }

    //--- step() -----------------------------------------------------------
    //
    // One frame: apply queued commands, then tick the director. Returns
    // Exit once a shutdown command has been processed.
    //
    pub fn step(&mut self, dt: f32) -> TickControl {
        if self.drain_commands() == TickControl::Exit {
            self.director.shutdown();
            return TickControl::Exit;
        }

        self.director.tick(dt);
        TickControl::Continue
    }

    //--- run() ------------------------------------------------------------
    //
    // Starts the director if needed and steps it at the configured rate
    // until shut down. Blocks the calling thread.
    //
    pub fn run(mut self) -> Director {
        info!("Starting runtime (frame: {:?})", self.frame_duration);

        if !self.director.is_started() {
            self.director.start();
        }

        let mut previous = Instant::now();

        loop {
            let frame_start = Instant::now();
            let dt = frame_start.duration_since(previous).as_secs_f32();
            previous = frame_start;

            if self.step(dt) == TickControl::Exit {
                break;
            }

            let elapsed = frame_start.elapsed();
            if elapsed < self.frame_duration {
                thread::sleep(self.frame_duration - elapsed);
            }
        }

        info!("Runtime stopped");
        self.director
    }

    /// Applies pending commands (bounded to prevent starvation).
    fn drain_commands(&mut self) -> TickControl {
        const MAX_COMMANDS_PER_FRAME: usize = 100;

        let mut drained = 0;

        while drained < MAX_COMMANDS_PER_FRAME {
            match self.receiver.try_recv() {
                Ok(Command::Change(request)) => {
                    // Refusals are recorded in the director's diagnostics
                    let _ = self.director.change(request);
                    drained += 1;
                }
                Ok(Command::Shutdown) => {
                    info!("Shutdown command received");
                    return TickControl::Exit;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return TickControl::Exit,
            }
        }

        if drained >= MAX_COMMANDS_PER_FRAME {
            warn!("Command queue backlog: drained {} commands this frame", drained);
        }

        TickControl::Continue
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
