//! Dual-stack undo/redo history.
//!
//! `CommandManager` owns every command after execution. New work lands on
//! the undo stack (most recent last) and clears the redo stack; undo pops
//! one entry, reverts it, and parks it on the redo stack. Depth is capped:
//! once the undo stack is full the oldest entry falls off the bottom and
//! that state becomes unreachable.
//!
//! While the manager replays a command it raises a flag that capture code
//! checks before recording, so programmatic mutations made by undo/redo
//! never produce fresh history entries of their own.

use easel_core::scene::Scene;
use std::time::Duration;

use crate::commands::{Command, MERGE_WINDOW};

/// Default cap on undo depth.
pub const DEFAULT_MAX_HISTORY: usize = 100;

/// What a history UI needs after each change: button states plus how many
/// steps back the user can travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryState {
    pub can_undo: bool,
    pub can_redo: bool,
    pub depth: usize,
}

pub struct CommandManager {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
    max_history: usize,
    merge_window: Duration,
    replaying: bool,
    on_change: Option<Box<dyn FnMut(&HistoryState)>>,
}

impl CommandManager {
    pub fn new(max_history: usize) -> Self {
        Self {
            undo_stack: Vec::with_capacity(max_history),
            redo_stack: Vec::with_capacity(max_history),
            max_history,
            merge_window: MERGE_WINDOW,
            replaying: false,
            on_change: None,
        }
    }

    /// Override the merge window. Tests pass `Duration::ZERO` to switch
    /// merging off without sleeping through the real window.
    pub fn set_merge_window(&mut self, window: Duration) {
        self.merge_window = window;
    }

    /// Run `cmd` against the scene and record it. The command either merges
    /// into the top undo entry or pushes a new one; any redoable future is
    /// discarded either way.
    pub fn execute(&mut self, scene: &mut Scene, mut cmd: Command) {
        cmd.apply(scene);

        if let Some(top) = self.undo_stack.last_mut()
            && top.can_absorb(&cmd, self.merge_window)
        {
            top.absorb(cmd);
            log::debug!("merged `{}` into the top entry", top.label());
        } else {
            let label = cmd.label();
            self.undo_stack.push(cmd);
            if self.undo_stack.len() > self.max_history {
                let evicted = self.undo_stack.remove(0);
                log::debug!("history full, dropping oldest entry: {}", evicted.label());
            }
            log::debug!("executed `{label}` (depth {})", self.undo_stack.len());
        }

        self.redo_stack.clear();
        self.notify();
    }

    /// Revert the most recent command. Returns its label, or `None` when
    /// there is nothing to undo.
    pub fn undo(&mut self, scene: &mut Scene) -> Option<String> {
        let mut cmd = self.undo_stack.pop()?;
        let label = cmd.label();
        log::debug!("undo `{label}`");
        self.replaying = true;
        cmd.revert(scene);
        self.replaying = false;
        self.redo_stack.push(cmd);
        self.notify();
        Some(label)
    }

    /// Re-apply the most recently undone command. Returns its label, or
    /// `None` when there is nothing to redo.
    pub fn redo(&mut self, scene: &mut Scene) -> Option<String> {
        let mut cmd = self.redo_stack.pop()?;
        let label = cmd.label();
        log::debug!("redo `{label}`");
        self.replaying = true;
        cmd.apply(scene);
        self.replaying = false;
        self.undo_stack.push(cmd);
        self.notify();
        Some(label)
    }

    /// Drop both stacks. Used after operations that invalidate recorded
    /// object references wholesale, like importing a document.
    pub fn clear(&mut self) {
        log::debug!("history cleared ({} undo entries dropped)", self.undo_stack.len());
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.notify();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// True while the manager itself is mutating the scene. Capture paths
    /// consult this and skip recording.
    pub fn is_replaying(&self) -> bool {
        self.replaying
    }

    /// Label of the entry the next undo would revert.
    pub fn peek_undo_label(&self) -> Option<String> {
        self.undo_stack.last().map(Command::label)
    }

    pub fn peek_redo_label(&self) -> Option<String> {
        self.redo_stack.last().map(Command::label)
    }

    pub fn state(&self) -> HistoryState {
        HistoryState {
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            depth: self.depth(),
        }
    }

    /// Install a listener invoked after every stack change.
    pub fn set_on_change(&mut self, listener: impl FnMut(&HistoryState) + 'static) {
        self.on_change = Some(Box::new(listener));
    }

    fn notify(&mut self) {
        let state = self.state();
        if let Some(listener) = self.on_change.as_mut() {
            listener(&state);
        }
    }

    #[cfg(test)]
    pub(crate) fn force_replaying(&mut self, on: bool) {
        self.replaying = on;
    }
}

impl Default for CommandManager {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::ChangeKind;
    use easel_core::model::SceneObject;
    use easel_core::snapshot::Snapshot;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn shifted(scene: &Scene, id: easel_core::ObjectId, dx: f32) -> Snapshot {
        let mut copy = scene.get(id).unwrap().clone();
        copy.props.left += dx;
        copy.update_coords();
        Snapshot::of(&copy)
    }

    #[test]
    fn undo_then_redo_restores_both_states() {
        let mut scene = Scene::new();
        let mut history = CommandManager::default();

        history.execute(&mut scene, Command::add(SceneObject::rect(), true));
        let id = scene.objects()[0].id();
        assert!(history.can_undo());
        assert!(!history.can_redo());

        assert_eq!(history.undo(&mut scene).as_deref(), Some("add rect"));
        assert!(scene.is_empty());
        assert!(history.can_redo());

        assert_eq!(history.redo(&mut scene).as_deref(), Some("add rect"));
        assert!(scene.contains(id));
    }

    #[test]
    fn empty_stacks_return_none() {
        let mut scene = Scene::new();
        let mut history = CommandManager::default();
        assert_eq!(history.undo(&mut scene), None);
        assert_eq!(history.redo(&mut scene), None);
    }

    #[test]
    fn new_work_discards_the_redo_stack() {
        let mut scene = Scene::new();
        let mut history = CommandManager::default();

        history.execute(&mut scene, Command::add(SceneObject::rect(), false));
        history.undo(&mut scene);
        assert!(history.can_redo());

        history.execute(&mut scene, Command::add(SceneObject::circle(), false));
        assert!(!history.can_redo());
        assert_eq!(history.depth(), 1);
    }

    #[test]
    fn depth_is_capped_and_oldest_falls_off() {
        let mut scene = Scene::new();
        let mut history = CommandManager::new(3);
        history.set_merge_window(Duration::ZERO);

        let id = scene.add(SceneObject::rect());
        for _ in 0..5 {
            let before = Snapshot::of(scene.get(id).unwrap());
            let after = shifted(&scene, id, 10.0);
            history.execute(
                &mut scene,
                Command::modify(id, before, after, ChangeKind::Transform),
            );
        }
        assert_eq!(history.depth(), 3);
        assert_eq!(scene.get(id).unwrap().props.left, 170.0);

        // Only the newest three steps are reachable.
        while history.undo(&mut scene).is_some() {}
        assert_eq!(scene.get(id).unwrap().props.left, 140.0);
    }

    #[test]
    fn zero_capacity_history_keeps_nothing() {
        let mut scene = Scene::new();
        let mut history = CommandManager::new(0);

        // The command still runs; only the record of it is dropped.
        history.execute(&mut scene, Command::add(SceneObject::rect(), false));
        assert_eq!(scene.len(), 1);
        assert_eq!(history.depth(), 0);
        assert!(!history.can_undo());

        history.execute(&mut scene, Command::add(SceneObject::circle(), false));
        assert_eq!(scene.len(), 2);
        assert!(!history.can_undo());
    }

    #[test]
    fn rapid_modifies_merge_into_one_entry() {
        let mut scene = Scene::new();
        let mut history = CommandManager::default();
        let id = scene.add(SceneObject::rect());

        for _ in 0..3 {
            let before = Snapshot::of(scene.get(id).unwrap());
            let after = shifted(&scene, id, 10.0);
            history.execute(
                &mut scene,
                Command::modify(id, before, after, ChangeKind::Transform),
            );
        }
        assert_eq!(history.depth(), 1);

        // One undo rewinds the whole run.
        history.undo(&mut scene);
        assert_eq!(scene.get(id).unwrap().props.left, 120.0);
        history.redo(&mut scene);
        assert_eq!(scene.get(id).unwrap().props.left, 150.0);
    }

    #[test]
    fn zero_window_disables_merging() {
        let mut scene = Scene::new();
        let mut history = CommandManager::default();
        history.set_merge_window(Duration::ZERO);
        let id = scene.add(SceneObject::rect());

        for _ in 0..3 {
            let before = Snapshot::of(scene.get(id).unwrap());
            let after = shifted(&scene, id, 10.0);
            history.execute(
                &mut scene,
                Command::modify(id, before, after, ChangeKind::Transform),
            );
        }
        assert_eq!(history.depth(), 3);
    }

    #[test]
    fn replay_flag_is_raised_only_during_replay() {
        let mut scene = Scene::new();
        let mut history = CommandManager::default();
        assert!(!history.is_replaying());

        history.execute(&mut scene, Command::add(SceneObject::rect(), false));
        assert!(!history.is_replaying());

        history.undo(&mut scene);
        assert!(!history.is_replaying());

        history.force_replaying(true);
        assert!(history.is_replaying());
        history.force_replaying(false);
    }

    #[test]
    fn listener_sees_every_stack_change() {
        let mut scene = Scene::new();
        let mut history = CommandManager::default();

        let seen: Rc<RefCell<Vec<HistoryState>>> = Rc::default();
        let sink = Rc::clone(&seen);
        history.set_on_change(move |state| sink.borrow_mut().push(*state));

        history.execute(&mut scene, Command::add(SceneObject::rect(), false));
        history.undo(&mut scene);
        history.redo(&mut scene);
        history.clear();

        let states = seen.borrow();
        assert_eq!(states.len(), 4);
        assert_eq!(
            states[0],
            HistoryState {
                can_undo: true,
                can_redo: false,
                depth: 1
            }
        );
        assert_eq!(
            states[1],
            HistoryState {
                can_undo: false,
                can_redo: true,
                depth: 0
            }
        );
        assert_eq!(
            states[3],
            HistoryState {
                can_undo: false,
                can_redo: false,
                depth: 0
            }
        );
    }

    #[test]
    fn peek_labels_match_stack_tops() {
        let mut scene = Scene::new();
        let mut history = CommandManager::default();
        assert_eq!(history.peek_undo_label(), None);

        history.execute(&mut scene, Command::add(SceneObject::text(), true));
        assert_eq!(history.peek_undo_label().as_deref(), Some("add text"));

        history.undo(&mut scene);
        assert_eq!(history.peek_undo_label(), None);
        assert_eq!(history.peek_redo_label().as_deref(), Some("add text"));
    }
}
