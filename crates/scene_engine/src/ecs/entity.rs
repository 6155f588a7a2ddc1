//! Entity implementation
//!
//! Entities are generational handles: a slot index plus a version that is
//! bumped every time the slot is freed, so a stale handle never aliases the
//! entity that later reuses its slot.

use slotmap::{Key, KeyData};

slotmap::new_key_type! {
    /// Entity identifier
    pub struct Entity;
}

impl Entity {
    /// Raw 64-bit tag for this handle (index and version packed together).
    ///
    /// This is the value stored in physics user data so contact reports can be
    /// resolved back to entities.
    pub fn to_bits(self) -> u64 {
        self.data().as_ffi()
    }

    /// Rebuild a handle from [`Entity::to_bits`]
    pub fn from_bits(bits: u64) -> Self {
        KeyData::from_ffi(bits).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn test_bits_roundtrip() {
        let mut entities: SlotMap<Entity, ()> = SlotMap::with_key();
        let entity = entities.insert(());

        assert_eq!(Entity::from_bits(entity.to_bits()), entity);
    }

    #[test]
    fn test_reused_slot_gets_new_identity() {
        let mut entities: SlotMap<Entity, ()> = SlotMap::with_key();
        let first = entities.insert(());
        entities.remove(first);
        let second = entities.insert(());

        assert_ne!(first, second);
        assert_ne!(first.to_bits(), second.to_bits());
        assert!(!entities.contains_key(first));
    }

    #[test]
    fn test_null_entity() {
        assert!(Entity::null().is_null());
        assert_eq!(Entity::default(), Entity::null());
    }
}
