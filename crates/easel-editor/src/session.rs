//! Editing session: scene + history + capture + clipboard in one place.
//!
//! `Session` is what a host shell talks to. Toolbar buttons, the property
//! panel, keyboard handling, and document load/save all route through here,
//! so every mutation that should be undoable goes through the command
//! manager and nothing else has to remember to record itself.
//!
//! Pointer tools are the exception by design: during a live gesture they
//! mutate `scene` directly for responsiveness and only talk to the session
//! at gesture boundaries (`begin_change` / `end_change`), which is when the
//! history entry gets made.

use easel_core::id::ObjectId;
use easel_core::model::{Color, SceneObject};
use easel_core::scene::Scene;
use easel_core::serialize::{DocumentError, export_json, import_json};
use easel_core::snapshot::Snapshot;

use crate::capture::CaptureBindings;
use crate::clipboard::Clipboard;
use crate::commands::{ChangeKind, Command, MetaPatch};
use crate::history::{CommandManager, HistoryState};
use crate::shortcuts::{ShortcutAction, ShortcutMap};

pub struct Session {
    /// The live scene. Hosts may read freely; pointer tools mutate it
    /// directly mid-gesture and report the gesture boundaries back here.
    pub scene: Scene,

    history: CommandManager,
    capture: CaptureBindings,
    clipboard: Clipboard,
}

impl Session {
    pub fn new() -> Self {
        Self {
            scene: Scene::new(),
            history: CommandManager::default(),
            capture: CaptureBindings::new(),
            clipboard: Clipboard::new(),
        }
    }

    // ─── Object creation ─────────────────────────────────────────────────

    /// Drop a default rectangle on the scene and select it.
    pub fn add_rect(&mut self) -> ObjectId {
        self.add_object(SceneObject::rect(), true)
    }

    /// Drop a default circle on the scene and select it.
    pub fn add_circle(&mut self) -> ObjectId {
        self.add_object(SceneObject::circle(), true)
    }

    /// Drop a default text block on the scene and select it.
    pub fn add_text(&mut self) -> ObjectId {
        self.add_object(SceneObject::text(), true)
    }

    /// Add an arbitrary object as one undoable step.
    pub fn add_object(&mut self, object: SceneObject, select: bool) -> ObjectId {
        let id = object.id();
        self.history
            .execute(&mut self.scene, Command::add(object, select));
        id
    }

    // ─── Selection & deletion ────────────────────────────────────────────

    pub fn select(&mut self, ids: &[ObjectId]) {
        self.scene.set_selection(ids);
    }

    pub fn select_only(&mut self, id: ObjectId) {
        self.scene.select_only(id);
    }

    pub fn clear_selection(&mut self) {
        self.scene.clear_selection();
    }

    /// Delete everything selected as one undoable step. Returns how many
    /// objects went; zero means nothing was selected and nothing was
    /// recorded.
    pub fn delete_selection(&mut self) -> usize {
        let targets: Vec<ObjectId> = self.scene.selection().to_vec();
        if targets.is_empty() {
            return 0;
        }
        self.history
            .execute(&mut self.scene, Command::remove(&targets));
        targets.len()
    }

    // ─── Stacking order ──────────────────────────────────────────────────
    //
    // All four verbs require exactly one selected object and skip recording
    // when the move would not change anything (already at the edge).

    pub fn bring_forward(&mut self) -> bool {
        self.restack(|from, top| (from + 1).min(top))
    }

    pub fn send_backward(&mut self) -> bool {
        self.restack(|from, _| from.saturating_sub(1))
    }

    pub fn bring_to_front(&mut self) -> bool {
        self.restack(|_, top| top)
    }

    pub fn send_to_back(&mut self) -> bool {
        self.restack(|_, _| 0)
    }

    fn restack(&mut self, place: impl FnOnce(usize, usize) -> usize) -> bool {
        let Some(id) = self.scene.sole_selection() else {
            return false;
        };
        let Some(from) = self.scene.index_of(id) else {
            return false;
        };
        let to = place(from, self.scene.len() - 1);
        if to == from {
            return false;
        }
        self.history
            .execute(&mut self.scene, Command::reorder(id, from, to));
        true
    }

    // ─── Property edits ──────────────────────────────────────────────────

    /// One-shot edit from the property panel: capture, apply the closure,
    /// diff, record. An edit that changes nothing observable records
    /// nothing. Returns whether a history entry was made.
    pub fn edit_object(
        &mut self,
        id: ObjectId,
        change: ChangeKind,
        edit: impl FnOnce(&mut SceneObject),
    ) -> bool {
        let Some(obj) = self.scene.get_mut(id) else {
            log::debug!("edit: {id} not on scene");
            return false;
        };
        let before = Snapshot::of(obj);
        edit(obj);
        obj.update_coords();
        let after = Snapshot::of(obj);
        if before == after {
            return false;
        }
        self.history
            .execute(&mut self.scene, Command::modify(id, before, after, change));
        true
    }

    /// Patch an object's metadata record as one undoable step.
    pub fn update_metadata(&mut self, id: ObjectId, patch: MetaPatch) {
        if !self.scene.contains(id) {
            log::debug!("metadata: {id} not on scene");
            return;
        }
        self.history
            .execute(&mut self.scene, Command::update_meta(id, patch));
    }

    pub fn rename(&mut self, id: ObjectId, name: impl Into<String>) {
        self.update_metadata(
            id,
            MetaPatch {
                name: Some(name.into()),
                kind: None,
            },
        );
    }

    /// Canvas background color. Not undoable: the original design treats
    /// it as a document setting, not an edit.
    pub fn set_background(&mut self, color: Color) {
        self.scene.background = color;
    }

    // ─── Gesture boundaries ──────────────────────────────────────────────

    /// A pointer gesture is starting on `id`.
    pub fn begin_change(&mut self, id: ObjectId) {
        self.capture.begin_change(&self.history, &self.scene, id);
    }

    /// A pointer gesture on `id` ended; diff and record.
    pub fn end_change(&mut self, id: ObjectId, change: ChangeKind) {
        self.capture
            .end_change(&mut self.history, &mut self.scene, id, change);
    }

    /// The drawing tool finished a freehand stroke it already placed.
    pub fn stroke_finished(&mut self, id: ObjectId) {
        self.capture
            .stroke_completed(&mut self.history, &mut self.scene, id);
    }

    pub fn begin_erase(&mut self) {
        self.capture.begin_erase(&self.history, &self.scene);
    }

    pub fn end_erase(&mut self) {
        self.capture.end_erase(&mut self.history, &mut self.scene);
    }

    // ─── Text editing ────────────────────────────────────────────────────

    /// Enter inline editing on a text object. While editing is active the
    /// shortcut table is suppressed (see `handle_key`). Returns false for
    /// unknown or non-text targets.
    pub fn begin_text_edit(&mut self, id: ObjectId) -> bool {
        let Some(obj) = self.scene.get(id) else {
            return false;
        };
        if !obj.is_text() {
            return false;
        }
        self.scene.set_editing_text(Some(id));
        self.capture.begin_change(&self.history, &self.scene, id);
        true
    }

    /// Leave inline editing, recording one text change if anything differs
    /// from when editing began.
    pub fn end_text_edit(&mut self) {
        let Some(id) = self.scene.editing_text() else {
            return;
        };
        self.scene.set_editing_text(None);
        self.capture
            .end_change(&mut self.history, &mut self.scene, id, ChangeKind::Text);
    }

    // ─── Clipboard ───────────────────────────────────────────────────────

    /// Copy the selection into the session clipboard. Returns the count.
    pub fn copy(&mut self) -> usize {
        self.clipboard.copy(&self.scene)
    }

    /// Paste the clipboard as one undoable step and return the minted ids.
    pub fn paste(&mut self) -> Vec<ObjectId> {
        self.clipboard.paste(&mut self.history, &mut self.scene)
    }

    // ─── History ─────────────────────────────────────────────────────────

    /// Undo the most recent step. Returns its label for status UI.
    pub fn undo(&mut self) -> Option<String> {
        self.undo_redo_boundary();
        self.history.undo(&mut self.scene)
    }

    /// Redo the most recently undone step. Returns its label.
    pub fn redo(&mut self) -> Option<String> {
        self.undo_redo_boundary();
        self.history.redo(&mut self.scene)
    }

    /// History travel while a text edit is open first closes the edit, so
    /// the in-flight change becomes its own entry instead of vanishing.
    fn undo_redo_boundary(&mut self) {
        if self.scene.editing_text().is_some() {
            self.end_text_edit();
        }
    }

    pub fn history(&self) -> &CommandManager {
        &self.history
    }

    pub fn history_state(&self) -> HistoryState {
        self.history.state()
    }

    /// Install a listener invoked after every history change.
    pub fn set_on_change(&mut self, listener: impl FnMut(&HistoryState) + 'static) {
        self.history.set_on_change(listener);
    }

    /// Override the modify-merge window (tests use `Duration::ZERO`).
    pub fn set_merge_window(&mut self, window: std::time::Duration) {
        self.history.set_merge_window(window);
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    /// Resolve and dispatch one key event. Returns the action taken, or
    /// `None` when the combo is unbound or text editing has focus.
    pub fn handle_key(
        &mut self,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    ) -> Option<ShortcutAction> {
        let editing = self.scene.editing_text().is_some();
        let action = ShortcutMap::resolve(key, ctrl, shift, alt, meta, editing)?;
        match action {
            ShortcutAction::Undo => {
                self.undo();
            }
            ShortcutAction::Redo => {
                self.redo();
            }
            ShortcutAction::Delete => {
                self.delete_selection();
            }
            ShortcutAction::Copy => {
                self.copy();
            }
            ShortcutAction::Paste => {
                self.paste();
            }
            ShortcutAction::Deselect => self.scene.clear_selection(),
            ShortcutAction::SendBackward => {
                self.send_backward();
            }
            ShortcutAction::BringForward => {
                self.bring_forward();
            }
            ShortcutAction::SendToBack => {
                self.send_to_back();
            }
            ShortcutAction::BringToFront => {
                self.bring_to_front();
            }
        }
        Some(action)
    }

    // ─── Documents ───────────────────────────────────────────────────────

    /// Serialize the scene to the document format.
    pub fn export(&self) -> Result<String, DocumentError> {
        export_json(&self.scene)
    }

    /// Replace the scene with a parsed document. On failure the session is
    /// left exactly as it was; on success the history and pending gesture
    /// state are gone, since every recorded command referred to the old
    /// scene. The clipboard survives so copy can span documents.
    pub fn import(&mut self, json: &str) -> Result<(), DocumentError> {
        let scene = import_json(json)?;
        self.scene = scene;
        self.capture.clear();
        self.history.clear();
        log::info!("imported document with {} objects", self.scene.len());
        Ok(())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────
