use cgmath::{InnerSpace, Vector3};
use serde::{Deserialize, Serialize};

/// Closed 3D axis-aligned bounding box in world-space coordinates.
///
/// Represents the region `[min, max]` on each axis. Overlap is inclusive:
/// two boxes that merely touch on a face are considered intersecting.
/// Trigger volumes are authored slightly oversized, so touch == inside.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb3 {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl Aabb3 {
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    pub fn from_center_half_extents(center: Vector3<f32>, half: Vector3<f32>) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Each axis must have `min <= max`.
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    pub fn intersects(&self, other: &Aabb3) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    pub fn contains_point(&self, p: Vector3<f32>) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    pub fn union(&self, other: &Aabb3) -> Aabb3 {
        Aabb3 {
            min: Vector3::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            max: Vector3::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        }
    }
}

/// Collision shape for the player: a vertical line segment swept by a
/// sphere of the given radius. `start` is the lower segment point and is
/// the agent's canonical world position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Capsule {
    pub start: Vector3<f32>,
    pub end: Vector3<f32>,
    pub radius: f32,
}

impl Capsule {
    pub fn new(start: Vector3<f32>, end: Vector3<f32>, radius: f32) -> Self {
        Self { start, end, radius }
    }

    pub fn translate(&mut self, delta: Vector3<f32>) {
        self.start += delta;
        self.end += delta;
    }

    /// Conservative bounds: the segment's box inflated by the radius.
    pub fn bounds(&self) -> Aabb3 {
        let seg = Aabb3::new(self.start, self.start).union(&Aabb3::new(self.end, self.end));
        let r = Vector3::new(self.radius, self.radius, self.radius);
        Aabb3::new(seg.min - r, seg.max + r)
    }

}

/// Result of a capsule-vs-world query: the surface normal at the deepest
/// contact and how far the capsule has sunk past that surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceContact {
    pub normal: Vector3<f32>,
    pub depth: f32,
}

impl SurfaceContact {
    /// A floor-like contact points upward; walls and ceilings do not.
    pub fn is_floor(&self) -> bool {
        self.normal.y > 0.0
    }
}

pub fn vec3_is_finite(v: Vector3<f32>) -> bool {
    v.x.is_finite() && v.y.is_finite() && v.z.is_finite()
}

/// Closest point to `p` on segment `ab`.
pub fn closest_point_on_segment(
    p: Vector3<f32>,
    a: Vector3<f32>,
    b: Vector3<f32>,
) -> Vector3<f32> {
    let ab = b - a;
    let len_sq = ab.magnitude2();
    if len_sq <= 1e-12 {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}
