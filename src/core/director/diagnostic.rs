//=========================================================================
// Director Diagnostics
//=========================================================================
//
// Journal of degradations that did not stop the director: rejected or
// missing overlays, dropped parameters and requests, failed loads.
//
// Every entry is logged when recorded. The journal keeps the most recent
// `MAX_DIAGNOSTICS` entries until taken; older ones survive only in the log.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{error, warn};
use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::error::{ChangeError, LoadError, OverlayError, ParamError};

//=== Diagnostic ==========================================================

/// A recoverable problem the director worked around.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    #[error("overlay registration rejected: {0}")]
    OverlayRejected(OverlayError),

    #[error("overlay `{name}` is not registered; continuing without overlay")]
    OverlayMissing { name: String },

    #[error("parameter for scene `{scene}` dropped: {error}")]
    ParamDropped { scene: String, error: ParamError },

    #[error("loading `{scene}` failed: {error}")]
    LoadFailed { scene: String, error: LoadError },

    #[error("{0}")]
    RequestDropped(ChangeError),
}

//=== Diagnostics =========================================================

/// Entries retained between two `take` calls.
pub const MAX_DIAGNOSTICS: usize = 256;

#[derive(Debug, Default)]
pub(super) struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub(super) fn record(&mut self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::LoadFailed { .. } => error!("{}", diagnostic),
            _ => warn!("{}", diagnostic),
        }

        if self.entries.len() >= MAX_DIAGNOSTICS {
            // Oldest first
            self.entries.remove(0);
        }
        self.entries.push(diagnostic);
    }

    pub(super) fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub(super) fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.entries)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
