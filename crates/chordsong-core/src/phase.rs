// Chordsong Key Phase
// Press/release state of a host key event

use std::fmt;

/// Represents the phase of a host key event.
///
/// Only `Press` events drive a capture session; everything else is
/// delivered by the host but ignored by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyPhase {
    #[default]
    Press,
    Release,
    /// Auto-repeat, double-click and any other host-specific value
    Other,
}

impl KeyPhase {
    /// Returns true only for a fresh press
    pub fn is_press(self) -> bool {
        matches!(self, KeyPhase::Press)
    }

    /// Returns true if this is a RELEASE event
    pub fn is_released(self) -> bool {
        matches!(self, KeyPhase::Release)
    }

    /// Map a host event value (`"PRESS"`, `"RELEASE"`, ...) to a phase
    pub fn from_host(value: &str) -> Self {
        match value {
            "PRESS" => KeyPhase::Press,
            "RELEASE" => KeyPhase::Release,
            _ => KeyPhase::Other,
        }
    }
}

impl fmt::Display for KeyPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPhase::Press => write!(f, "press"),
            KeyPhase::Release => write!(f, "release"),
            KeyPhase::Other => write!(f, "other"),
        }
    }
}
