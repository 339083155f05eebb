//! Retained scene container: the ordered object list commands mutate.
//!
//! Stacking order is list order (last = topmost). The scene owns every
//! top-level object; everything else in the system addresses objects by
//! `ObjectId` and resolves through the scene at use time. Selection is a
//! list of ids, not references, so it degrades to nothing when the objects
//! it points at leave the scene.

use crate::id::ObjectId;
use crate::model::{Color, SceneObject};
use smallvec::SmallVec;

#[derive(Debug, Clone)]
pub struct Scene {
    objects: Vec<SceneObject>,
    selection: SmallVec<[ObjectId; 2]>,
    editing_text: Option<ObjectId>,
    pub background: Color,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            selection: SmallVec::new(),
            editing_text: None,
            background: Color::WHITE,
        }
    }

    // ─── Object list ─────────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    /// Append on top of the stack. Returns the object's id.
    pub fn add(&mut self, obj: SceneObject) -> ObjectId {
        let id = obj.id();
        self.objects.push(obj);
        id
    }

    /// Insert at `index`, clamped into the valid range. Returns the
    /// position actually used.
    pub fn insert_clamped(&mut self, index: usize, obj: SceneObject) -> usize {
        let index = index.min(self.objects.len());
        self.objects.insert(index, obj);
        index
    }

    /// Detach an object, returning it together with the stack position it
    /// held. Selection and text-editing state referring to it are dropped.
    pub fn remove(&mut self, id: ObjectId) -> Option<(usize, SceneObject)> {
        let index = self.index_of(id)?;
        let obj = self.objects.remove(index);
        self.selection.retain(|s| *s != id);
        if self.editing_text == Some(id) {
            self.editing_text = None;
        }
        Some((index, obj))
    }

    /// Move an object to `target` in the stacking order: detach, clamp the
    /// target to the post-removal range, reinsert. Returns (from, to), or
    /// None when the id is not on the scene.
    pub fn move_to(&mut self, id: ObjectId, target: usize) -> Option<(usize, usize)> {
        let from = self.index_of(id)?;
        let obj = self.objects.remove(from);
        let to = target.min(self.objects.len());
        self.objects.insert(to, obj);
        if to != target {
            log::trace!("reorder target {target} clamped to {to}");
        }
        Some((from, to))
    }

    pub fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| o.id() == id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id() == id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.id() == id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.index_of(id).is_some()
    }

    // ─── Selection ───────────────────────────────────────────────────────

    pub fn selection(&self) -> &[ObjectId] {
        &self.selection
    }

    /// Replace the selection. Ids not currently on the scene are dropped.
    pub fn set_selection(&mut self, ids: &[ObjectId]) {
        self.selection = ids.iter().copied().filter(|id| self.contains(*id)).collect();
    }

    pub fn select_only(&mut self, id: ObjectId) {
        self.set_selection(&[id]);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// The single selected object, when exactly one is selected.
    pub fn sole_selection(&self) -> Option<ObjectId> {
        match self.selection.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    // ─── Text editing marker ─────────────────────────────────────────────

    /// The text object currently in edit mode, if any. Hosts set this when
    /// the user enters inline editing; delete shortcuts consult it so
    /// Backspace edits text instead of removing the object.
    pub fn editing_text(&self) -> Option<ObjectId> {
        self.editing_text
    }

    pub fn set_editing_text(&mut self, id: Option<ObjectId>) {
        self.editing_text = id.filter(|id| self.contains(*id));
    }

    // ─── Wholesale replacement ───────────────────────────────────────────

    /// Replace the whole scene content, dropping selection and edit state.
    /// Used by document import once a payload has fully parsed.
    pub fn reset(&mut self, background: Color, objects: Vec<SceneObject>) {
        self.objects = objects;
        self.background = background;
        self.selection.clear();
        self.editing_text = None;
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene_with(n: usize) -> (Scene, Vec<ObjectId>) {
        let mut scene = Scene::new();
        let ids = (0..n).map(|_| scene.add(SceneObject::rect())).collect();
        (scene, ids)
    }

    #[test]
    fn add_and_lookup() {
        let (scene, ids) = scene_with(3);
        assert_eq!(scene.len(), 3);
        assert_eq!(scene.index_of(ids[1]), Some(1));
        assert!(scene.get(ids[2]).is_some());
    }

    #[test]
    fn remove_returns_position_and_clears_selection() {
        let (mut scene, ids) = scene_with(3);
        scene.select_only(ids[1]);

        let (index, obj) = scene.remove(ids[1]).unwrap();
        assert_eq!(index, 1);
        assert_eq!(obj.id(), ids[1]);
        assert!(scene.selection().is_empty());
        assert_eq!(scene.len(), 2);
        assert!(scene.remove(ids[1]).is_none());
    }

    #[test]
    fn move_to_clamps_past_the_end() {
        let (mut scene, ids) = scene_with(3);
        let (from, to) = scene.move_to(ids[0], 99).unwrap();
        assert_eq!((from, to), (0, 2));
        assert_eq!(scene.objects()[2].id(), ids[0]);
    }

    #[test]
    fn move_to_bottom() {
        let (mut scene, ids) = scene_with(3);
        let (from, to) = scene.move_to(ids[2], 0).unwrap();
        assert_eq!((from, to), (2, 0));
        assert_eq!(scene.objects()[0].id(), ids[2]);
    }

    #[test]
    fn insert_clamped_reports_actual_position() {
        let (mut scene, _) = scene_with(2);
        let pos = scene.insert_clamped(10, SceneObject::circle());
        assert_eq!(pos, 2);
    }

    #[test]
    fn selection_filters_absent_ids() {
        let (mut scene, ids) = scene_with(2);
        let ghost = ObjectId::fresh();
        scene.set_selection(&[ids[0], ghost]);
        assert_eq!(scene.selection(), &[ids[0]]);
        assert_eq!(scene.sole_selection(), Some(ids[0]));
    }

    #[test]
    fn reset_drops_selection_and_edit_state() {
        let (mut scene, ids) = scene_with(2);
        scene.select_only(ids[0]);
        let text_id = scene.add(SceneObject::text());
        scene.set_editing_text(Some(text_id));

        scene.reset(Color::WHITE, vec![SceneObject::circle()]);
        assert_eq!(scene.len(), 1);
        assert!(scene.selection().is_empty());
        assert_eq!(scene.editing_text(), None);
    }
}
