//! Snapshot codec: capture and re-apply the tracked property set of one
//! object at one instant.
//!
//! Snapshots are plain owned values. Capturing clones the property record
//! out of the object, so later mutation of the object can never bleed into
//! a snapshot already taken — the before/after pairs inside Modify commands
//! depend on that. Applying writes the whole record back and then refreshes
//! the object's cached bounds, which is what keeps interaction geometry
//! honest after an undo.

use crate::model::{Props, SceneObject, TextProps};
use serde::{Deserialize, Serialize};

/// An immutable capture of one object's tracked properties. The text block
/// is present exactly when the captured object was text-capable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    props: Props,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<TextProps>,
}

impl Snapshot {
    /// Capture the current state of `obj`.
    pub fn of(obj: &SceneObject) -> Self {
        Self {
            props: obj.props.clone(),
            text: obj.text.clone(),
        }
    }

    /// Write every captured property back onto `obj`, then recompute its
    /// cached bounds. The text block is only written when this snapshot
    /// carries one; a snapshot of a plain shape leaves text state alone.
    pub fn apply_to(&self, obj: &mut SceneObject) {
        obj.props = self.props.clone();
        if self.text.is_some() {
            obj.text = self.text.clone();
        }
        obj.update_coords();
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    pub fn text(&self) -> Option<&TextProps> {
        self.text.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PathData;
    use pretty_assertions::assert_eq;

    #[test]
    fn capture_does_not_alias_the_object() {
        let mut rect = SceneObject::rect();
        let snap = Snapshot::of(&rect);

        rect.props.left = 999.0;
        rect.props.eraser.push(PathData::new(vec![(0.0, 0.0), (5.0, 5.0)]));

        assert_eq!(snap.props().left, 120.0);
        assert!(snap.props().eraser.is_empty());
    }

    #[test]
    fn apply_restores_and_refreshes_coords() {
        let mut rect = SceneObject::rect();
        let before = Snapshot::of(&rect);

        rect.props.left = 400.0;
        rect.props.scale_x = 3.0;
        rect.update_coords();
        assert_eq!(rect.coords().left, 400.0);

        before.apply_to(&mut rect);
        assert_eq!(rect.props.left, 120.0);
        assert_eq!(rect.props.scale_x, 1.0);
        // Cached bounds must track the restore, not the stale transform.
        assert_eq!(rect.coords().left, 120.0);
        assert_eq!(rect.coords().width, 160.0);
    }

    #[test]
    fn equality_is_structural() {
        let mut text = SceneObject::text();
        let a = Snapshot::of(&text);
        let b = Snapshot::of(&text);
        assert_eq!(a, b);

        text.text.as_mut().unwrap().text.push('!');
        let c = Snapshot::of(&text);
        assert_ne!(a, c);
    }

    #[test]
    fn identical_gesture_produces_equal_snapshots() {
        // Press and release without moving: before == after, the no-op the
        // capture layer suppresses.
        let mut rect = SceneObject::rect();
        let before = Snapshot::of(&rect);
        rect.props.left += 15.0;
        rect.props.left -= 15.0;
        rect.update_coords();
        let after = Snapshot::of(&rect);
        assert_eq!(before, after);
    }
}
