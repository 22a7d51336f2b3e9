use cgmath::{InnerSpace, Vector3};
use crate::spatial::{Aabb3, Capsule, SurfaceContact};

const DEGENERATE_DISTANCE: f32 = 1e-6;

#[derive(Clone, Copy, Debug)]
struct Triangle {
    a: Vector3<f32>,
    b: Vector3<f32>,
    c: Vector3<f32>,
    normal: Vector3<f32>,
    bounds: Aabb3,
}

impl Triangle {
    fn new(a: Vector3<f32>, b: Vector3<f32>, c: Vector3<f32>) -> Option<Self> {
        let n = (b - a).cross(c - a);
        if n.magnitude2() <= 1e-12 {
            return None;
        }
        let bounds = Aabb3::new(a, a)
            .union(&Aabb3::new(b, b))
            .union(&Aabb3::new(c, c));
        Some(Self {
            a,
            b,
            c,
            normal: n.normalize(),
            bounds,
        })
    }
}

/// Immutable spatial structure over static world geometry. Built once at
/// load time from a triangle soup; the only query is capsule penetration.
///
/// The query returns the deepest surface contact, matching the behavior the
/// locomotion integrator expects: resolve the worst penetration this tick
/// and let the next tick pick up whatever remains.
pub struct StaticCollisionVolume {
    triangles: Vec<Triangle>,
    bounds: Aabb3,
}

impl StaticCollisionVolume {
    pub fn from_triangles<I>(triangles: I) -> Self
    where
        I: IntoIterator<Item = [Vector3<f32>; 3]>,
    {
        let triangles: Vec<Triangle> = triangles
            .into_iter()
            .filter_map(|[a, b, c]| Triangle::new(a, b, c))
            .collect();
        let bounds = triangles
            .iter()
            .map(|t| t.bounds)
            .reduce(|acc, b| acc.union(&b))
            .unwrap_or(Aabb3::new(
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(0.0, 0.0, 0.0),
            ));
        Self { triangles, bounds }
    }

    /// Horizontal square floor at height `y`, spanning `±half_extent` on X/Z.
    /// Wound so the surface normal points up.
    pub fn flat_floor(y: f32, half_extent: f32) -> Self {
        let h = half_extent;
        let p00 = Vector3::new(-h, y, -h);
        let p10 = Vector3::new(h, y, -h);
        let p01 = Vector3::new(-h, y, h);
        let p11 = Vector3::new(h, y, h);
        Self::from_triangles([[p00, p01, p10], [p10, p01, p11]])
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn bounds(&self) -> Aabb3 {
        self.bounds
    }

    /// Nearest-surface query: `Some` when the capsule penetrates any
    /// triangle, carrying the contact normal and penetration depth of the
    /// deepest contact; `None` when the capsule is clear.
    pub fn capsule_contact(&self, capsule: &Capsule) -> Option<SurfaceContact> {
        let query_bounds = capsule.bounds();
        let mut deepest: Option<SurfaceContact> = None;
        for tri in &self.triangles {
            if !tri.bounds.intersects(&query_bounds) {
                continue;
            }
            let Some(contact) = capsule_triangle_contact(capsule, tri) else {
                continue;
            };
            match deepest {
                Some(best) if best.depth >= contact.depth => {}
                _ => deepest = Some(contact),
            }
        }
        deepest
    }
}

fn capsule_triangle_contact(capsule: &Capsule, tri: &Triangle) -> Option<SurfaceContact> {
    let (on_segment, on_triangle) =
        closest_points_segment_triangle(capsule.start, capsule.end, tri);
    let offset = on_segment - on_triangle;
    let dist = offset.magnitude();
    if dist >= capsule.radius {
        return None;
    }
    let normal = if dist > DEGENERATE_DISTANCE {
        offset / dist
    } else {
        // Segment touches the triangle plane; fall back to the face normal,
        // oriented toward the capsule axis.
        let mid = (capsule.start + capsule.end) * 0.5;
        if (mid - on_triangle).dot(tri.normal) >= 0.0 {
            tri.normal
        } else {
            -tri.normal
        }
    };
    Some(SurfaceContact {
        normal,
        depth: capsule.radius - dist,
    })
}

/// Closest pair of points between segment `pq` and a triangle.
///
/// Candidates: both segment endpoints projected onto the triangle, the
/// plane-crossing point (if the segment spans the plane), and the three
/// edge-vs-segment closest pairs. The true minimum is always among these.
fn closest_points_segment_triangle(
    p: Vector3<f32>,
    q: Vector3<f32>,
    tri: &Triangle,
) -> (Vector3<f32>, Vector3<f32>) {
    let mut best_dist_sq = f32::INFINITY;
    let mut best = (p, tri.a);

    let mut consider = |seg_pt: Vector3<f32>, tri_pt: Vector3<f32>| {
        let d = (seg_pt - tri_pt).magnitude2();
        if d < best_dist_sq {
            best_dist_sq = d;
            best = (seg_pt, tri_pt);
        }
    };

    for seg_pt in [p, q] {
        consider(seg_pt, closest_point_on_triangle(seg_pt, tri));
    }

    // Where the segment crosses the triangle plane, the face interior may
    // be closest to an interior segment point.
    let dp = (p - tri.a).dot(tri.normal);
    let dq = (q - tri.a).dot(tri.normal);
    if (dp > 0.0) != (dq > 0.0) && (dp - dq).abs() > DEGENERATE_DISTANCE {
        let t = dp / (dp - dq);
        let crossing = p + (q - p) * t;
        consider(crossing, closest_point_on_triangle(crossing, tri));
    }

    for (ea, eb) in [(tri.a, tri.b), (tri.b, tri.c), (tri.c, tri.a)] {
        let (s1, s2) = closest_points_segment_segment(p, q, ea, eb);
        consider(s1, s2);
    }

    best
}

/// Closest point to `p` on a triangle (Voronoi-region walk).
fn closest_point_on_triangle(p: Vector3<f32>, tri: &Triangle) -> Vector3<f32> {
    let (a, b, c) = (tri.a, tri.b, tri.c);
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;
    let d1 = ab.dot(ap);
    let d2 = ac.dot(ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return a;
    }

    let bp = p - b;
    let d3 = ab.dot(bp);
    let d4 = ac.dot(bp);
    if d3 >= 0.0 && d4 <= d3 {
        return b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return a + ab * v;
    }

    let cp = p - c;
    let d5 = ab.dot(cp);
    let d6 = ac.dot(cp);
    if d6 >= 0.0 && d5 <= d6 {
        return c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return a + ac * w;
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return b + (c - b) * w;
    }

    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    a + ab * v + ac * w
}

/// Closest pair of points between segments `p1q1` and `p2q2`.
fn closest_points_segment_segment(
    p1: Vector3<f32>,
    q1: Vector3<f32>,
    p2: Vector3<f32>,
    q2: Vector3<f32>,
) -> (Vector3<f32>, Vector3<f32>) {
    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;
    let a = d1.magnitude2();
    let e = d2.magnitude2();
    let f = d2.dot(r);

    if a <= 1e-12 && e <= 1e-12 {
        return (p1, p2);
    }
    if a <= 1e-12 {
        let t = (f / e).clamp(0.0, 1.0);
        return (p1, p2 + d2 * t);
    }

    let c = d1.dot(r);
    let (mut s, mut t);
    if e <= 1e-12 {
        t = 0.0;
        s = (-c / a).clamp(0.0, 1.0);
    } else {
        let b = d1.dot(d2);
        let denom = a * e - b * b;
        s = if denom > 1e-12 {
            ((b * f - c * e) / denom).clamp(0.0, 1.0)
        } else {
            0.0
        };
        t = (b * s + f) / e;
        if t < 0.0 {
            t = 0.0;
            s = (-c / a).clamp(0.0, 1.0);
        } else if t > 1.0 {
            t = 1.0;
            s = ((b - c) / a).clamp(0.0, 1.0);
        }
    }
    (p1 + d1 * s, p2 + d2 * t)
}
