use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Global string interner for object IDs — fast comparisons, low memory.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// A lightweight, interned identifier for scene objects.
/// Internally a `Spur` index — 4 bytes, Copy, Eq, Hash in O(1).
///
/// The underlying string is a v4 UUID for objects created by Easel, but any
/// non-empty string an imported document carries is accepted as-is; commands
/// and snapshots only ever compare ids, never parse them.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(Spur);

impl ObjectId {
    /// Intern a string as an ObjectId, or return the existing id if already
    /// interned.
    pub fn intern(s: &str) -> Self {
        ObjectId(INTERNER.get_or_intern(s))
    }

    /// Generate a fresh random id. Uniqueness comes from the UUID, not the
    /// interner, so ids minted here never collide with imported ones.
    pub fn fresh() -> Self {
        Self::intern(&uuid::Uuid::new_v4().to_string())
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.as_str())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ObjectId::intern(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = ObjectId::intern("id_legacy_7");
        let b = ObjectId::intern("id_legacy_7");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "id_legacy_7");
    }

    #[test]
    fn fresh_ids_are_unique() {
        let a = ObjectId::fresh();
        let b = ObjectId::fresh();
        assert_ne!(a, b);
    }

    #[test]
    fn fresh_ids_are_uuids() {
        let id = ObjectId::fresh();
        let s = id.as_str();
        assert_eq!(s.len(), 36);
        assert_eq!(s.bytes().filter(|b| *b == b'-').count(), 4);
    }

    #[test]
    fn serializes_as_bare_string() {
        let id = ObjectId::intern("abc");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"abc\"");
        let back: ObjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
