//! Interaction, label and rotation settings for a viewer session

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::anchor::AnglePolicy;
use crate::catalog::UnclassifiedPolicy;
use crate::interaction::{HighlightPalette, HighlightScope, Highlighter};
use crate::mesh::Color;
use crate::rotation::{AutoRotation, RotationAxis};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Hover and selected colors must differ (both {0})")]
    IndistinctHighlight(String),
    #[error("Label scale factor must be positive and finite, got {0}")]
    InvalidScaleFactor(f32),
    #[error("Rotation increment must be finite, got {0}")]
    InvalidIncrement(f32),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub unclassified: UnclassifiedPolicy,
    #[serde(default)]
    pub highlight: HighlightConfig,
    #[serde(default)]
    pub labels: LabelConfig,
    #[serde(default)]
    pub rotation: RotationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightConfig {
    #[serde(default)]
    pub scope: HighlightScope,
    /// Emissive color of the mesh under the pointer
    #[serde(default = "default_hover_color")]
    pub hover_color: Color,
    /// Emissive color of the clicked mesh
    #[serde(default = "default_selected_color")]
    pub selected_color: Color,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            scope: HighlightScope::default(),
            hover_color: default_hover_color(),
            selected_color: default_selected_color(),
        }
    }
}

fn default_hover_color() -> Color {
    HighlightPalette::default().hover
}

fn default_selected_color() -> Color {
    HighlightPalette::default().selected
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Label distance in multiples of the largest member diagonal
    #[serde(default = "default_scale_factor")]
    pub scale_factor: f32,
    #[serde(default)]
    pub angle: AnglePolicy,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            scale_factor: default_scale_factor(),
            angle: AnglePolicy::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_scale_factor() -> f32 {
    3.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationConfig {
    /// Radians per frame tick while idle
    #[serde(default = "default_increment")]
    pub increment: f32,
    #[serde(default)]
    pub axis: RotationAxis,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            increment: default_increment(),
            axis: RotationAxis::default(),
        }
    }
}

fn default_increment() -> f32 {
    0.001
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.highlight.hover_color == self.highlight.selected_color {
            return Err(ConfigError::IndistinctHighlight(
                self.highlight.hover_color.to_hex_string(),
            ));
        }
        let scale = self.labels.scale_factor;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(ConfigError::InvalidScaleFactor(scale));
        }
        if !self.rotation.increment.is_finite() {
            return Err(ConfigError::InvalidIncrement(self.rotation.increment));
        }
        Ok(())
    }

    pub fn highlighter(&self) -> Highlighter {
        Highlighter::new(
            self.highlight.scope,
            HighlightPalette {
                hover: self.highlight.hover_color,
                selected: self.highlight.selected_color,
            },
        )
    }

    pub fn auto_rotation(&self) -> AutoRotation {
        AutoRotation::new(self.rotation.increment, self.rotation.axis)
    }
}
