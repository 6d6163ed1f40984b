//! Transition symbols: the signed single-step rung displacement.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::LadderError;

/// One agent's move for one step: down a rung, stay, or up a rung.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transition {
    Down,
    Stay,
    Up,
}

impl Transition {
    /// Signed rung displacement: -1, 0, or +1.
    pub fn delta(self) -> i64 {
        match self {
            Self::Down => -1,
            Self::Stay => 0,
            Self::Up => 1,
        }
    }
}

impl TryFrom<i64> for Transition {
    type Error = LadderError;

    fn try_from(delta: i64) -> Result<Self, Self::Error> {
        match delta {
            -1 => Ok(Self::Down),
            0 => Ok(Self::Stay),
            1 => Ok(Self::Up),
            other => Err(LadderError::invalid_argument(format!(
                "delta must be -1, 0 or 1, got {other}"
            ))),
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+}", self.delta())
    }
}
