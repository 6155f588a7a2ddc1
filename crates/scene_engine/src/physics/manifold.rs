//! Contact manifolds reported by the narrow phase

use crate::foundation::math::Vec3;

use super::BodyHandle;

/// One contact between two bodies
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactPoint {
    /// Contact location on body A
    pub position_on_a: Vec3,
    /// Contact location on body B
    pub position_on_b: Vec3,
    /// Contact normal pointing from B towards A
    pub normal_on_b: Vec3,
    /// Signed separation; negative means the shapes overlap
    pub distance: f32,
}

impl ContactPoint {
    /// Whether the shapes actually overlap at this point
    pub fn is_penetrating(&self) -> bool {
        self.distance < 0.0
    }
}

/// Contact points between one pair of bodies for one simulation step
#[derive(Debug, Clone, PartialEq)]
pub struct ContactManifold {
    /// First body
    pub body_a: BodyHandle,
    /// Second body
    pub body_b: BodyHandle,
    /// User data of the first body at detection time
    pub user_data_a: u64,
    /// User data of the second body at detection time
    pub user_data_b: u64,
    /// Up to four contact points
    pub points: Vec<ContactPoint>,
}

impl ContactManifold {
    /// Maximum number of points kept per manifold
    pub const MAX_POINTS: usize = 4;

    /// Number of contact points
    pub fn num_contacts(&self) -> usize {
        self.points.len()
    }

    /// Deepest (most negative) distance among the points
    pub fn min_distance(&self) -> Option<f32> {
        self.points.iter().map(|p| p.distance).reduce(f32::min)
    }
}
