//! In-editor copy/paste.
//!
//! Copy stores deep clones of the current selection; the scene keeps its
//! originals untouched. Paste clones the buffer again with freshly minted
//! ids (recursively, so grouped children never collide either), shifts each
//! clone by a fixed offset so it never lands exactly on its original, and
//! records the lot as one history entry. The stored buffer is never
//! mutated; pasting the same copy twice puts both clones at the same spot.

use easel_core::id::ObjectId;
use easel_core::model::SceneObject;
use easel_core::scene::Scene;

use crate::commands::Command;
use crate::history::CommandManager;

/// How far a pasted clone lands from the copied original, on both axes.
pub const PASTE_OFFSET: f32 = 20.0;

#[derive(Default)]
pub struct Clipboard {
    buffer: Vec<SceneObject>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clone the selection into the buffer, in stacking order. An empty
    /// selection leaves the previous buffer intact. Returns how many
    /// objects were copied.
    pub fn copy(&mut self, scene: &Scene) -> usize {
        let grabbed: Vec<SceneObject> = scene
            .objects()
            .iter()
            .filter(|obj| scene.selection().contains(&obj.id()))
            .cloned()
            .collect();
        if grabbed.is_empty() {
            return 0;
        }
        let count = grabbed.len();
        self.buffer = grabbed;
        count
    }

    /// Insert a clone of the buffer, shifted by the fixed paste offset, as
    /// one undoable step and return the minted ids. A lone pasted object
    /// gets selected; a multi-object paste leaves the selection alone.
    pub fn paste(&self, history: &mut CommandManager, scene: &mut Scene) -> Vec<ObjectId> {
        if self.buffer.is_empty() {
            return Vec::new();
        }
        let select_single = self.buffer.len() == 1;
        let mut ids = Vec::with_capacity(self.buffer.len());
        let mut adds = Vec::with_capacity(self.buffer.len());
        for stored in &self.buffer {
            let mut fresh = stored.clone();
            fresh.props.left += PASTE_OFFSET;
            fresh.props.top += PASTE_OFFSET;
            fresh.regenerate_ids();
            fresh.update_coords();
            ids.push(fresh.id());
            adds.push(Command::add(fresh, select_single));
        }
        history.execute(scene, Command::batch("paste", adds));
        ids
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use easel_core::model::Shape;

    #[test]
    fn paste_offsets_and_mints_a_new_id() {
        let mut scene = Scene::new();
        let mut history = CommandManager::default();
        let mut clipboard = Clipboard::new();
        let original = scene.add(SceneObject::rect());
        scene.select_only(original);

        assert_eq!(clipboard.copy(&scene), 1);
        let pasted = clipboard.paste(&mut history, &mut scene);

        assert_eq!(pasted.len(), 1);
        assert_ne!(pasted[0], original);
        assert_eq!(scene.len(), 2);
        assert_eq!(scene.get(pasted[0]).unwrap().props.left, 140.0);
        assert_eq!(scene.selection(), &[pasted[0]]);
        assert_eq!(history.peek_undo_label().as_deref(), Some("paste"));

        history.undo(&mut scene);
        assert_eq!(scene.len(), 1);
        assert!(scene.contains(original));
    }

    #[test]
    fn repeated_paste_lands_at_the_same_fixed_offset() {
        let mut scene = Scene::new();
        let mut history = CommandManager::default();
        let mut clipboard = Clipboard::new();
        let original = scene.add(SceneObject::rect());
        scene.select_only(original);
        clipboard.copy(&scene);

        let first = clipboard.paste(&mut history, &mut scene);
        let second = clipboard.paste(&mut history, &mut scene);

        // Pasting never shifts the stored copy: every clone sits at the
        // copied original's position plus the fixed offset.
        assert_eq!(scene.get(first[0]).unwrap().props.left, 140.0);
        assert_eq!(scene.get(second[0]).unwrap().props.left, 140.0);
        assert_ne!(first[0], second[0]);
        assert_eq!(scene.get(original).unwrap().props.left, 120.0);
    }

    #[test]
    fn multi_paste_is_one_entry_and_keeps_selection() {
        let mut scene = Scene::new();
        let mut history = CommandManager::default();
        let mut clipboard = Clipboard::new();
        let a = scene.add(SceneObject::rect());
        let b = scene.add(SceneObject::circle());
        scene.set_selection(&[a, b]);

        assert_eq!(clipboard.copy(&scene), 2);
        let pasted = clipboard.paste(&mut history, &mut scene);

        assert_eq!(pasted.len(), 2);
        assert_eq!(scene.len(), 4);
        assert_eq!(history.depth(), 1);
        // A multi-object paste does not steal the selection.
        assert_eq!(scene.selection(), &[a, b]);

        history.undo(&mut scene);
        assert_eq!(scene.len(), 2);
        history.redo(&mut scene);
        assert_eq!(scene.len(), 4);
    }

    #[test]
    fn pasted_group_children_get_fresh_ids() {
        let mut scene = Scene::new();
        let mut history = CommandManager::default();
        let mut clipboard = Clipboard::new();

        let child = SceneObject::rect();
        let child_id = child.id();
        let group = scene.add(SceneObject::group(vec![child]));
        scene.select_only(group);

        clipboard.copy(&scene);
        let pasted = clipboard.paste(&mut history, &mut scene);

        let Shape::Group { children } = &scene.get(pasted[0]).unwrap().shape else {
            panic!("pasted object should still be a group");
        };
        assert_eq!(children.len(), 1);
        assert_ne!(children[0].id(), child_id);
    }

    #[test]
    fn copy_with_nothing_selected_keeps_the_buffer() {
        let mut scene = Scene::new();
        let mut history = CommandManager::default();
        let mut clipboard = Clipboard::new();
        let original = scene.add(SceneObject::rect());
        scene.select_only(original);
        clipboard.copy(&scene);

        scene.clear_selection();
        assert_eq!(clipboard.copy(&scene), 0);
        assert_eq!(clipboard.len(), 1);

        let pasted = clipboard.paste(&mut history, &mut scene);
        assert_eq!(pasted.len(), 1);
    }

    #[test]
    fn paste_with_empty_buffer_is_silent() {
        let mut scene = Scene::new();
        let mut history = CommandManager::default();
        let clipboard = Clipboard::new();

        assert!(clipboard.paste(&mut history, &mut scene).is_empty());
        assert_eq!(history.depth(), 0);
    }
}
