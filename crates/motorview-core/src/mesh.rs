//! Mesh identifiers, bounds and colors supplied by the asset loader

use glam::{Affine3A, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Identifier of one renderable primitive surface (a glTF node name such as `mesh_17`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeshId(pub String);

impl MeshId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MeshId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MeshId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for MeshId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Tightest box around a set of points, `None` when the set is empty
    pub fn from_points<I: IntoIterator<Item = Vec3>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self { min, max })
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Length of the box diagonal
    pub fn diagonal(&self) -> f32 {
        (self.max - self.min).length()
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }

    /// Box enclosing this box after an affine transform
    pub fn transformed(&self, transform: &Affine3A) -> Aabb {
        let corners = self.corners().map(|c| transform.transform_point3(c));
        // Eight corners, never empty
        Aabb::from_points(corners).unwrap_or(*self)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    #[error("Invalid color '{0}': expected six hex digits such as \"#5d3fd3\"")]
    InvalidHex(String),
}

/// sRGB color with components in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value
    pub fn from_hex(hex: u32) -> Self {
        Self::from_srgb8([(hex >> 16) as u8, (hex >> 8) as u8, hex as u8])
    }

    pub fn from_srgb8(rgb: [u8; 3]) -> Self {
        Self {
            r: rgb[0] as f32 / 255.0,
            g: rgb[1] as f32 / 255.0,
            b: rgb[2] as f32 / 255.0,
        }
    }

    /// Parse `"#rrggbb"` or `"rrggbb"`
    pub fn from_hex_str(s: &str) -> Result<Self, ColorError> {
        let digits = s.trim().trim_start_matches('#');
        if digits.len() != 6 {
            return Err(ColorError::InvalidHex(s.to_string()));
        }
        let bytes = hex::decode(digits).map_err(|_| ColorError::InvalidHex(s.to_string()))?;
        Ok(Self::from_srgb8([bytes[0], bytes[1], bytes[2]]))
    }

    pub fn to_srgb8(&self) -> [u8; 3] {
        [self.r, self.g, self.b].map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
    }

    pub fn to_hex_string(&self) -> String {
        format!("#{}", hex::encode(self.to_srgb8()))
    }

    pub fn to_array(&self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl TryFrom<String> for Color {
    type Error = ColorError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Color::from_hex_str(&s)
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_hex_string()
    }
}

/// One mesh as reported by the asset loader
#[derive(Debug, Clone, PartialEq)]
pub struct MeshDescriptor {
    pub id: MeshId,
    /// Bounds in assembly-local space
    pub bounds: Aabb,
    /// Resting emissive color before any highlight
    pub base_color: Color,
}

impl MeshDescriptor {
    pub fn new(id: impl Into<MeshId>, bounds: Aabb, base_color: Color) -> Self {
        Self {
            id: id.into(),
            bounds,
            base_color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_aabb_from_points() {
        let aabb = Aabb::from_points([
            Vec3::new(1.0, -2.0, 0.5),
            Vec3::new(-1.0, 2.0, 0.0),
            Vec3::new(0.0, 0.0, 3.0),
        ])
        .unwrap();
        assert_eq!(aabb.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(aabb.center(), Vec3::new(0.0, 0.0, 1.5));
        assert!(Aabb::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn test_aabb_diagonal() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::new(3.0, 4.0, 0.0));
        assert_relative_eq!(aabb.diagonal(), 5.0);
    }

    #[test]
    fn test_aabb_transformed() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let moved = aabb.transformed(&Affine3A::from_translation(Vec3::new(2.0, 0.0, 0.0)));
        assert_eq!(moved.min, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(moved.max, Vec3::new(3.0, 1.0, 1.0));

        let rotated =
            aabb.transformed(&Affine3A::from_rotation_z(std::f32::consts::FRAC_PI_2));
        assert_relative_eq!(rotated.min.x, -1.0, epsilon = 1e-6);
        assert_relative_eq!(rotated.max.y, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_color_hex() {
        let c = Color::from_hex(0x5d3fd3);
        assert_eq!(c.to_srgb8(), [0x5d, 0x3f, 0xd3]);
        assert_eq!(c.to_hex_string(), "#5d3fd3");
        assert_eq!(Color::from_hex_str("#5D3FD3").unwrap(), c);
        assert_eq!(Color::from_hex_str("ffffff").unwrap(), Color::WHITE);
        assert!(Color::from_hex_str("#fff").is_err());
        assert!(Color::from_hex_str("#gggggg").is_err());
    }

    #[test]
    fn test_color_serde_as_string() {
        let json = serde_json::to_string(&Color::from_hex(0x102030)).unwrap();
        assert_eq!(json, "\"#102030\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back.to_srgb8(), [0x10, 0x20, 0x30]);
        assert!(serde_json::from_str::<Color>("\"blue\"").is_err());
    }
}
