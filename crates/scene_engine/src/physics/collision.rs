//! Per-frame collision records
//!
//! A record names an unordered pair of colliding entities. The set is rebuilt
//! from the contact manifolds after every physics step.

use std::hash::{Hash, Hasher};

use crate::ecs::Entity;

use super::manifold::ContactManifold;

/// Collision record for two entities, equal regardless of member order
#[derive(Debug, Clone, Copy)]
pub struct CollisionRecord {
    /// First entity as reported
    pub entity_a: Entity,
    /// Second entity as reported
    pub entity_b: Entity,
}

impl CollisionRecord {
    /// Create a new record
    pub fn new(entity_a: Entity, entity_b: Entity) -> Self {
        Self { entity_a, entity_b }
    }

    /// Whether `entity` is one of the pair
    pub fn involves(&self, entity: Entity) -> bool {
        self.entity_a == entity || self.entity_b == entity
    }

    /// The partner of `entity` in this pair
    pub fn other(&self, entity: Entity) -> Option<Entity> {
        if self.entity_a == entity {
            Some(self.entity_b)
        } else if self.entity_b == entity {
            Some(self.entity_a)
        } else {
            None
        }
    }

    fn ordered(&self) -> (Entity, Entity) {
        if self.entity_a <= self.entity_b {
            (self.entity_a, self.entity_b)
        } else {
            (self.entity_b, self.entity_a)
        }
    }
}

impl PartialEq for CollisionRecord {
    fn eq(&self, other: &Self) -> bool {
        (self.entity_a == other.entity_a && self.entity_b == other.entity_b)
            || (self.entity_a == other.entity_b && self.entity_b == other.entity_a)
    }
}

impl Eq for CollisionRecord {}

impl Hash for CollisionRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ordered().hash(state);
    }
}

/// Rebuild `records` from `manifolds`.
///
/// Only contact points with negative distance count. Each unordered pair is
/// kept once, found by a linear scan of the records already built; contact
/// counts per frame are small.
pub fn collect_collision_records(manifolds: &[ContactManifold], records: &mut Vec<CollisionRecord>) {
    records.clear();
    for manifold in manifolds {
        for point in &manifold.points {
            if !point.is_penetrating() {
                continue;
            }
            let record = CollisionRecord::new(
                Entity::from_bits(manifold.user_data_a),
                Entity::from_bits(manifold.user_data_b),
            );
            if !records.contains(&record) {
                records.push(record);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::physics::manifold::ContactPoint;
    use crate::physics::BodyHandle;
    use slotmap::{Key, SlotMap};
    use std::collections::HashSet;

    fn entities(count: usize) -> Vec<Entity> {
        let mut map: SlotMap<Entity, ()> = SlotMap::with_key();
        (0..count).map(|_| map.insert(())).collect()
    }

    fn point(distance: f32) -> ContactPoint {
        ContactPoint {
            position_on_a: Vec3::zeros(),
            position_on_b: Vec3::zeros(),
            normal_on_b: Vec3::y(),
            distance,
        }
    }

    fn manifold(a: Entity, b: Entity, distances: &[f32]) -> ContactManifold {
        ContactManifold {
            body_a: BodyHandle::null(),
            body_b: BodyHandle::null(),
            user_data_a: a.to_bits(),
            user_data_b: b.to_bits(),
            points: distances.iter().copied().map(point).collect(),
        }
    }

    #[test]
    fn test_record_symmetry() {
        let e = entities(3);
        assert_eq!(CollisionRecord::new(e[0], e[1]), CollisionRecord::new(e[1], e[0]));
        assert_ne!(CollisionRecord::new(e[0], e[1]), CollisionRecord::new(e[0], e[2]));

        let mut set = HashSet::new();
        set.insert(CollisionRecord::new(e[0], e[1]));
        assert!(set.contains(&CollisionRecord::new(e[1], e[0])));
    }

    #[test]
    fn test_two_points_same_pair_dedup() {
        let e = entities(2);
        let mut records = Vec::new();
        collect_collision_records(&[manifold(e[0], e[1], &[-0.01, -0.02])], &mut records);

        assert_eq!(records, vec![CollisionRecord::new(e[0], e[1])]);
    }

    #[test]
    fn test_reversed_manifolds_dedup() {
        let e = entities(2);
        let mut records = Vec::new();
        collect_collision_records(
            &[manifold(e[0], e[1], &[-0.01]), manifold(e[1], e[0], &[-0.03])],
            &mut records,
        );
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_only_penetrating_points_count() {
        let e = entities(4);
        let mut records = vec![CollisionRecord::new(e[2], e[3])];
        collect_collision_records(
            &[manifold(e[0], e[1], &[0.01, 0.0]), manifold(e[2], e[3], &[0.02, -0.001])],
            &mut records,
        );

        assert_eq!(records, vec![CollisionRecord::new(e[3], e[2])]);
    }

    #[test]
    fn test_previous_frame_cleared() {
        let e = entities(2);
        let mut records = vec![CollisionRecord::new(e[0], e[1])];
        collect_collision_records(&[], &mut records);
        assert!(records.is_empty());
    }

    #[test]
    fn test_other_and_involves() {
        let e = entities(3);
        let record = CollisionRecord::new(e[0], e[1]);
        assert!(record.involves(e[1]));
        assert!(!record.involves(e[2]));
        assert_eq!(record.other(e[0]), Some(e[1]));
        assert_eq!(record.other(e[2]), None);
    }
}
