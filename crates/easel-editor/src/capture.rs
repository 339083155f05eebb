//! Turns tool gestures into history entries.
//!
//! Tools mutate the scene directly while a gesture is in flight; nothing
//! reaches history until the gesture ends. `CaptureBindings` holds the
//! pre-gesture snapshots in the meantime and emits a single command per
//! finished gesture. Every entry point checks the manager's replay flag
//! first, so scene mutations made by undo/redo are never re-recorded.

use std::collections::HashMap;

use easel_core::id::ObjectId;
use easel_core::scene::Scene;
use easel_core::snapshot::Snapshot;

use crate::commands::{ChangeKind, Command};
use crate::history::CommandManager;

#[derive(Default)]
pub struct CaptureBindings {
    /// Pre-gesture state keyed by object. A second `begin_change` for the
    /// same object overwrites the entry; the newest gesture start wins.
    before: HashMap<ObjectId, Snapshot>,
    /// Full-scene state taken when an erase gesture starts.
    erase_baseline: Option<Vec<(ObjectId, Snapshot)>>,
}

impl CaptureBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// A pointer or text gesture is starting on `id`: remember how the
    /// object looks right now.
    pub fn begin_change(&mut self, history: &CommandManager, scene: &Scene, id: ObjectId) {
        if history.is_replaying() {
            return;
        }
        if let Some(obj) = scene.get(id) {
            self.before.insert(id, Snapshot::of(obj));
        }
    }

    /// The gesture on `id` ended: diff against the remembered state and
    /// record one Modify. A gesture that changed nothing records nothing.
    /// An end without a matching begin seeds the current state as the
    /// baseline for the next end and stays silent, which keeps a missed
    /// gesture start from producing a corrupt half-snapshot entry.
    pub fn end_change(
        &mut self,
        history: &mut CommandManager,
        scene: &mut Scene,
        id: ObjectId,
        change: ChangeKind,
    ) {
        if history.is_replaying() {
            return;
        }
        let Some(obj) = scene.get(id) else {
            self.before.remove(&id);
            return;
        };
        let after = Snapshot::of(obj);
        let Some(before) = self.before.remove(&id) else {
            self.before.insert(id, after);
            return;
        };
        if before == after {
            return;
        }
        history.execute(scene, Command::modify(id, before, after, change));
    }

    /// A freehand stroke finished and the drawing tool has already placed
    /// the path on the scene. Record the addition without re-adding and
    /// without stealing the selection.
    pub fn stroke_completed(
        &mut self,
        history: &mut CommandManager,
        scene: &mut Scene,
        id: ObjectId,
    ) {
        if history.is_replaying() {
            return;
        }
        let Some(obj) = scene.get(id) else {
            log::debug!("stroke ended but {id} is not on the scene");
            return;
        };
        let kind = obj.kind();
        history.execute(scene, Command::add_existing(id, kind));
    }

    /// An erase gesture is starting. The eraser can touch any number of
    /// objects before it lifts, so baseline the whole scene.
    pub fn begin_erase(&mut self, history: &CommandManager, scene: &Scene) {
        if history.is_replaying() {
            return;
        }
        self.erase_baseline = Some(
            scene
                .objects()
                .iter()
                .map(|obj| (obj.id(), Snapshot::of(obj)))
                .collect(),
        );
    }

    /// The erase gesture ended: every object that differs from the
    /// baseline becomes one Modify, and the lot lands as a single batch so
    /// one undo lifts the whole gesture. An erase that touched nothing
    /// records nothing.
    pub fn end_erase(&mut self, history: &mut CommandManager, scene: &mut Scene) {
        if history.is_replaying() {
            self.erase_baseline = None;
            return;
        }
        let Some(baseline) = self.erase_baseline.take() else {
            return;
        };
        let mut changes = Vec::new();
        for (id, before) in baseline {
            // Objects deleted mid-gesture fall out of the diff.
            let Some(obj) = scene.get(id) else { continue };
            let after = Snapshot::of(obj);
            if before != after {
                changes.push(Command::modify(id, before, after, ChangeKind::Erase));
            }
        }
        if changes.is_empty() {
            return;
        }
        history.execute(scene, Command::batch("erase", changes));
    }

    /// Drop all pending gesture state. Called when the scene is replaced
    /// wholesale and the remembered snapshots no longer describe anything.
    pub fn clear(&mut self) {
        self.before.clear();
        self.erase_baseline = None;
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────
