//! Global run-state flags.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Pause and edit-mode flags. Either one halts train motion; edit mode
/// additionally allows picking up terminated trains.
#[derive(Resource, Debug, Default, Clone, Copy, Serialize, Deserialize)]
pub struct RunFlags {
    pub paused: bool,
    pub edit_mode: bool,
}

impl RunFlags {
    /// Trains hold position while either flag is up.
    pub fn halted(&self) -> bool {
        self.paused || self.edit_mode
    }
}
