//! Common types used across Crossport
//!
//! This module provides shared type definitions used by multiple crates.

use serde::{Deserialize, Serialize};

/// Stable identity key of a source asset.
///
/// Assigned by the source engine's asset database and carried through
/// the export run unchanged; two assets compare equal exactly when the
/// source database considers them the same asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetKey(pub u64);

impl AssetKey {
    /// Create a new asset key
    pub fn new(key: u64) -> Self {
        Self(key)
    }

    /// Get the raw key value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for AssetKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016X}", self.0)
    }
}

impl From<u64> for AssetKey {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// 3D vector (velocities, descriptive motion statistics)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

impl Default for Vec3 {
    fn default() -> Self {
        Self::ZERO
    }
}
