//! Box-box narrow phase
//!
//! Separating-axis test over the 15 candidate axes of two oriented boxes: the
//! three face normals of each box and the nine cross products of their edges.
//! The axis with the largest signed separation becomes the contact normal,
//! and that separation is the contact distance (negative = overlap).
//!
//! Face contacts clip the incident face against the side planes of the
//! reference face and keep up to four of the deepest points. Edge contacts
//! report the closest points of the two edges.

use crate::foundation::math::Vec3;

use super::manifold::{ContactManifold, ContactPoint};
use super::shape::OrientedBox;

/// Edge axes must beat the best face axis by this much to be picked
const EDGE_BIAS: f32 = 1.0e-3;
const PARALLEL_EPSILON: f32 = 1.0e-6;
const SAME_POINT_EPSILON: f32 = 1.0e-5;

#[derive(Debug, Clone, Copy)]
enum Feature {
    FaceA,
    FaceB,
    Edges(usize, usize),
}

/// Contact points between `a` and `b`, or `None` when they are further apart
/// than `margin`. Normals point from `b` towards `a`.
pub(crate) fn box_box_contact(a: &OrientedBox, b: &OrientedBox, margin: f32) -> Option<Vec<ContactPoint>> {
    let offset = a.center - b.center;
    let mut best = (f32::NEG_INFINITY, Vec3::zeros(), Feature::FaceA);

    for (owner, feature) in [(a, Feature::FaceA), (b, Feature::FaceB)] {
        for axis in owner.axes {
            let (gap, normal) = separation(a, b, &offset, axis);
            if gap > margin {
                return None;
            }
            if gap > best.0 {
                best = (gap, normal, feature);
            }
        }
    }

    let best_face = best.0;
    for i in 0..3 {
        for j in 0..3 {
            let cross = a.axes[i].cross(&b.axes[j]);
            let length = cross.norm();
            if length < PARALLEL_EPSILON {
                continue;
            }
            let (gap, normal) = separation(a, b, &offset, cross / length);
            if gap > margin {
                return None;
            }
            if gap > best_face + EDGE_BIAS && gap > best.0 {
                best = (gap, normal, Feature::Edges(i, j));
            }
        }
    }

    let (distance, normal, feature) = best;
    let points = match feature {
        Feature::FaceB => face_contact(b, a, &normal, margin)
            .into_iter()
            .map(|(on_a, depth)| ContactPoint {
                position_on_a: on_a,
                position_on_b: on_a - normal * depth,
                normal_on_b: normal,
                distance: depth,
            })
            .collect(),
        Feature::FaceA => face_contact(a, b, &-normal, margin)
            .into_iter()
            .map(|(on_b, depth)| ContactPoint {
                position_on_a: on_b + normal * depth,
                position_on_b: on_b,
                normal_on_b: normal,
                distance: depth,
            })
            .collect(),
        Feature::Edges(i, j) => {
            let (a0, a1) = a.edge_towards(i, &-normal);
            let (b0, b1) = b.edge_towards(j, &normal);
            let on_b = closest_points_on_segments(a0, a1, b0, b1).1;
            vec![ContactPoint {
                position_on_a: on_b + normal * distance,
                position_on_b: on_b,
                normal_on_b: normal,
                distance,
            }]
        }
    };

    if points.is_empty() {
        None
    } else {
        Some(points)
    }
}

/// Signed gap between the boxes' shadows on `axis`, with the axis flipped to
/// point from `b` towards `a`
fn separation(a: &OrientedBox, b: &OrientedBox, offset: &Vec3, axis: Vec3) -> (f32, Vec3) {
    let axis = if offset.dot(&axis) < 0.0 { -axis } else { axis };
    let gap = offset.dot(&axis) - a.projected_radius(&axis) - b.projected_radius(&axis);
    (gap, axis)
}

/// Points of `incident`'s face inside the reference face of `reference` whose
/// outward normal is `outward`, with their signed depth along it
fn face_contact(reference: &OrientedBox, incident: &OrientedBox, outward: &Vec3, margin: f32) -> Vec<(Vec3, f32)> {
    let face_axis = (0..3)
        .max_by(|&i, &j| {
            let di = reference.axes[i].dot(outward).abs();
            let dj = reference.axes[j].dot(outward).abs();
            di.total_cmp(&dj)
        })
        .unwrap_or(0);
    let face_center = reference.center + outward * reference.half_extents[face_axis];

    let mut polygon = incident.face_towards(&-outward).to_vec();
    for side in (0..3).filter(|&k| k != face_axis) {
        let axis = reference.axes[side];
        let reach = axis.dot(&reference.center);
        let half = reference.half_extents[side];
        polygon = clip(&polygon, &axis, reach + half);
        polygon = clip(&polygon, &-axis, -reach + half);
    }

    let mut points: Vec<(Vec3, f32)> = Vec::with_capacity(polygon.len());
    for point in polygon {
        let depth = (point - face_center).dot(outward);
        if depth > margin {
            continue;
        }
        if points.iter().all(|(kept, _)| (kept - point).norm() > SAME_POINT_EPSILON) {
            points.push((point, depth));
        }
    }
    points.sort_by(|x, y| x.1.total_cmp(&y.1));
    points.truncate(ContactManifold::MAX_POINTS);
    points
}

/// Keep the part of `polygon` where `normal . p <= limit` (Sutherland-Hodgman)
fn clip(polygon: &[Vec3], normal: &Vec3, limit: f32) -> Vec<Vec3> {
    let mut kept = Vec::with_capacity(polygon.len() + 1);
    for (i, current) in polygon.iter().enumerate() {
        let next = &polygon[(i + 1) % polygon.len()];
        let here = normal.dot(current) - limit;
        let there = normal.dot(next) - limit;
        if here <= 0.0 {
            kept.push(*current);
        }
        if (here < 0.0 && there > 0.0) || (here > 0.0 && there < 0.0) {
            kept.push(current + (next - current) * (here / (here - there)));
        }
    }
    kept
}

/// Closest points between segments `p1-q1` and `p2-q2`
#[allow(clippy::many_single_char_names)]
fn closest_points_on_segments(p1: Vec3, q1: Vec3, p2: Vec3, q2: Vec3) -> (Vec3, Vec3) {
    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;
    let a = d1.dot(&d1);
    let e = d2.dot(&d2);
    let f = d2.dot(&r);

    let (s, t) = if a <= PARALLEL_EPSILON && e <= PARALLEL_EPSILON {
        (0.0, 0.0)
    } else if a <= PARALLEL_EPSILON {
        (0.0, (f / e).clamp(0.0, 1.0))
    } else {
        let c = d1.dot(&r);
        if e <= PARALLEL_EPSILON {
            ((-c / a).clamp(0.0, 1.0), 0.0)
        } else {
            let b = d1.dot(&d2);
            let denominator = a * e - b * b;
            let s = if denominator > PARALLEL_EPSILON {
                ((b * f - c * e) / denominator).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let t = (b * s + f) / e;
            if t < 0.0 {
                ((-c / a).clamp(0.0, 1.0), 0.0)
            } else if t > 1.0 {
                (((b - c) / a).clamp(0.0, 1.0), 1.0)
            } else {
                (s, t)
            }
        }
    };
    (p1 + d1 * s, p2 + d2 * t)
}
