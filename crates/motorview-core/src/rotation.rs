//! Idle auto-rotation of the whole assembly

use serde::{Deserialize, Serialize};

use crate::interaction::InteractionState;

/// Local axis the assembly spins around
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationAxis {
    X,
    Y,
    #[default]
    Z,
}

/// Advances a fixed angle per frame tick while nothing is hovered or selected
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoRotation {
    pub increment: f32,
    pub axis: RotationAxis,
    angle: f32,
}

impl AutoRotation {
    pub fn new(increment: f32, axis: RotationAxis) -> Self {
        Self {
            increment,
            axis,
            angle: 0.0,
        }
    }

    /// Angle to rotate by this tick
    pub fn tick(&mut self, state: &InteractionState) -> f32 {
        if !state.is_idle() {
            return 0.0;
        }
        self.angle += self.increment;
        self.increment
    }

    /// Total rotation applied so far
    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn reset(&mut self) {
        self.angle = 0.0;
    }
}
