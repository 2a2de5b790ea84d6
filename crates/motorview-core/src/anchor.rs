//! Floating label placement for part groups

use glam::Vec3;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::f32::consts::TAU;

use crate::mesh::Aabb;

/// Anchor for a floating label, in the same space as the member bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelAnchor {
    /// Unweighted mean of the member box centers
    pub group_center: Vec3,
    /// Where the label text goes
    pub label_position: Vec3,
}

impl LabelAnchor {
    /// Place a label `max_diagonal * scale_factor` away from the group center
    /// in the XY plane, at `angle` radians. `None` for an empty group.
    pub fn compute(bounds: &[Aabb], angle: f32, scale_factor: f32) -> Option<Self> {
        if bounds.is_empty() {
            return None;
        }
        let sum: Vec3 = bounds.iter().map(Aabb::center).sum();
        let group_center = sum / bounds.len() as f32;
        let max_radius = bounds.iter().map(Aabb::diagonal).fold(0.0_f32, f32::max);

        let offset = Vec3::new(angle.cos(), angle.sin(), 0.0) * max_radius * scale_factor;
        Some(Self {
            group_center,
            label_position: group_center + offset,
        })
    }

    /// Distance between label and center
    pub fn offset_length(&self) -> f32 {
        (self.label_position - self.group_center).length()
    }
}

/// How the placement angle of a label is chosen
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnglePolicy {
    /// Derived from the group key, identical on every frame
    #[default]
    Stable,
    /// New random angle on each request
    Random,
    /// Same angle for every group, in radians
    Fixed(f32),
}

impl AnglePolicy {
    pub fn angle_for(&self, group_key: &str) -> f32 {
        match self {
            AnglePolicy::Stable => stable_angle(group_key),
            AnglePolicy::Random => rand::random::<f32>() * TAU,
            AnglePolicy::Fixed(angle) => *angle,
        }
    }
}

/// Map the first four bytes of the key's SHA-256 digest onto `[0, 2π)`
fn stable_angle(key: &str) -> f32 {
    let digest = Sha256::digest(key.as_bytes());
    let word = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
    (word as f64 / (u32::MAX as f64 + 1.0) * std::f64::consts::TAU) as f32
}
