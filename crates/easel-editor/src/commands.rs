//! Reversible command variants.
//!
//! Every undoable mutation is one `Command`. A command addresses scene
//! objects by id and re-resolves against the live scene each time it runs;
//! a target that has left the scene makes the command a logged no-op, never
//! a panic. Add and Remove additionally own detached objects: an object that
//! is currently off the scene lives inside the command that took it out, and
//! moves back on the next apply. That hand-off is what lets undo/redo cycle
//! objects in and out of existence without reference-counted aliasing.
//!
//! Merging: consecutive Modify commands against the same object with the
//! same change kind collapse into one history entry while they arrive
//! within the merge window, so a drag gesture reads as one undo step.

use easel_core::id::ObjectId;
use easel_core::model::{ObjectKind, ObjectMeta, SceneObject};
use easel_core::scene::Scene;
use easel_core::snapshot::Snapshot;
use smallvec::SmallVec;
use std::time::{Duration, Instant};

/// How long two same-target, same-kind Modify commands may be apart and
/// still collapse into one history entry.
pub const MERGE_WINDOW: Duration = Duration::from_millis(600);

// ─── Change kinds ────────────────────────────────────────────────────────

/// Discriminator for Modify commands. Two Modifies only merge when their
/// kinds match, so a drag followed by a style edit stays two undo steps
/// even inside the merge window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Pointer-driven move/scale/rotate/skew.
    Transform,
    /// Inline text content or font edits.
    Text,
    /// Eraser strokes baked onto objects.
    Erase,
    /// Property-panel paint edits (fill, stroke, opacity).
    Style,
    /// Property-panel arrangement edits (visibility, locks).
    Layer,
}

impl ChangeKind {
    pub fn label(&self) -> &'static str {
        match self {
            ChangeKind::Transform => "transform",
            ChangeKind::Text => "edit text",
            ChangeKind::Erase => "erase",
            ChangeKind::Style => "edit style",
            ChangeKind::Layer => "arrange",
        }
    }
}

/// Partial metadata update. Fields left `None` keep their current value;
/// the id is not patchable, identity never changes in place.
#[derive(Debug, Clone, Default)]
pub struct MetaPatch {
    pub name: Option<String>,
    pub kind: Option<ObjectKind>,
}

// ─── Command ─────────────────────────────────────────────────────────────

/// One reversible unit of work.
#[derive(Debug)]
pub enum Command {
    /// Insert an object (or acknowledge one a tool already inserted) and
    /// optionally select it. Holds the object whenever it is off the scene.
    Add {
        object: Option<Box<SceneObject>>,
        id: ObjectId,
        kind: ObjectKind,
        select: bool,
    },
    /// Remove a set of objects, remembering the stack position each held.
    Remove {
        targets: SmallVec<[ObjectId; 4]>,
        removed: Vec<(usize, SceneObject)>,
    },
    /// Swap an object between two captured property states.
    Modify {
        target: ObjectId,
        before: Snapshot,
        after: Snapshot,
        change: ChangeKind,
        stamped: Instant,
    },
    /// Move an object between two stacking positions.
    Reorder {
        target: ObjectId,
        from: usize,
        to: usize,
    },
    /// Patch the metadata record, keeping the pre-patch state for undo.
    UpdateMeta {
        target: ObjectId,
        patch: MetaPatch,
        prior: Option<ObjectMeta>,
    },
    /// A forward sequence undone in reverse order.
    Batch {
        label: String,
        commands: Vec<Command>,
    },
}

impl Command {
    // ─── Constructors ────────────────────────────────────────────────────

    /// Add an object the scene has not seen yet.
    pub fn add(object: SceneObject, select: bool) -> Self {
        let id = object.id();
        let kind = object.kind();
        Command::Add {
            object: Some(Box::new(object)),
            id,
            kind,
            select,
        }
    }

    /// Adopt an object a tool has already placed on the scene (a completed
    /// freehand stroke). The first apply is a no-op beyond bookkeeping; undo
    /// takes the object off the scene into the command.
    pub fn add_existing(id: ObjectId, kind: ObjectKind) -> Self {
        Command::Add {
            object: None,
            id,
            kind,
            select: false,
        }
    }

    pub fn remove(targets: &[ObjectId]) -> Self {
        Command::Remove {
            targets: targets.iter().copied().collect(),
            removed: Vec::new(),
        }
    }

    pub fn modify(target: ObjectId, before: Snapshot, after: Snapshot, change: ChangeKind) -> Self {
        Command::Modify {
            target,
            before,
            after,
            change,
            stamped: Instant::now(),
        }
    }

    pub fn reorder(target: ObjectId, from: usize, to: usize) -> Self {
        Command::Reorder { target, from, to }
    }

    pub fn update_meta(target: ObjectId, patch: MetaPatch) -> Self {
        Command::UpdateMeta {
            target,
            patch,
            prior: None,
        }
    }

    pub fn batch(label: impl Into<String>, commands: Vec<Command>) -> Self {
        Command::Batch {
            label: label.into(),
            commands,
        }
    }

    // ─── Execution ───────────────────────────────────────────────────────

    /// Run the forward direction. Also serves as redo: every variant keeps
    /// enough state to re-run after a revert.
    pub fn apply(&mut self, scene: &mut Scene) {
        match self {
            Command::Add {
                object, id, select, ..
            } => {
                if let Some(obj) = object.take() {
                    scene.add(*obj);
                } else if !scene.contains(*id) {
                    log::debug!("add: object {id} neither held nor on scene");
                }
                if *select {
                    scene.select_only(*id);
                }
            }
            Command::Remove { targets, removed } => {
                removed.clear();
                scene.clear_selection();
                // Record every stacking index before the first removal;
                // removing an object shifts everything above it down.
                let spots: Vec<(ObjectId, Option<usize>)> = targets
                    .iter()
                    .map(|id| (*id, scene.index_of(*id)))
                    .collect();
                for (id, spot) in spots {
                    let Some(index) = spot else {
                        log::debug!("remove: {id} not on scene");
                        continue;
                    };
                    if let Some((_, obj)) = scene.remove(id) {
                        removed.push((index, obj));
                    }
                }
            }
            Command::Modify { target, after, .. } => {
                match scene.get_mut(*target) {
                    Some(obj) => after.apply_to(obj),
                    None => log::debug!("modify: {target} not on scene"),
                }
            }
            Command::Reorder { target, to, .. } => {
                if scene.move_to(*target, *to).is_some() {
                    scene.select_only(*target);
                } else {
                    log::debug!("reorder: {target} not on scene");
                }
            }
            Command::UpdateMeta {
                target,
                patch,
                prior,
            } => {
                let Some(obj) = scene.get_mut(*target) else {
                    log::debug!("update meta: {target} not on scene");
                    return;
                };
                // Snapshot the pre-patch record once; redo after undo must
                // not capture the already-reverted state.
                if prior.is_none() {
                    *prior = Some(obj.meta.clone());
                }
                if let Some(name) = &patch.name {
                    obj.meta.name = Some(name.clone());
                }
                if let Some(kind) = patch.kind {
                    obj.meta.kind = kind;
                }
            }
            Command::Batch { commands, .. } => {
                for cmd in commands.iter_mut() {
                    cmd.apply(scene);
                }
            }
        }
    }

    /// Run the reverse direction.
    pub fn revert(&mut self, scene: &mut Scene) {
        match self {
            Command::Add { object, id, .. } => {
                match scene.remove(*id) {
                    Some((_, obj)) => *object = Some(Box::new(obj)),
                    None => log::debug!("undo add: {id} not on scene"),
                }
                scene.clear_selection();
            }
            Command::Remove { targets, removed } => {
                let mut items = std::mem::take(removed);
                // Ascending order: each reinsertion happens at an index
                // that is valid once everything below it is back.
                items.sort_by_key(|(index, _)| *index);
                for (index, obj) in items {
                    scene.insert_clamped(index, obj);
                }
                if let [only] = targets.as_slice() {
                    scene.select_only(*only);
                }
            }
            Command::Modify { target, before, .. } => {
                match scene.get_mut(*target) {
                    Some(obj) => before.apply_to(obj),
                    None => log::debug!("undo modify: {target} not on scene"),
                }
            }
            Command::Reorder { target, from, .. } => {
                if scene.move_to(*target, *from).is_some() {
                    scene.select_only(*target);
                } else {
                    log::debug!("undo reorder: {target} not on scene");
                }
            }
            Command::UpdateMeta { target, prior, .. } => {
                match (scene.get_mut(*target), prior.as_ref()) {
                    (Some(obj), Some(prev)) => obj.meta = prev.clone(),
                    _ => log::debug!("undo update meta: {target} unavailable"),
                }
            }
            Command::Batch { commands, .. } => {
                for cmd in commands.iter_mut().rev() {
                    cmd.revert(scene);
                }
            }
        }
    }

    /// Human-readable label for history UI ("Undo add rect").
    pub fn label(&self) -> String {
        match self {
            Command::Add { kind, .. } => format!("add {}", kind.as_str()),
            Command::Remove { targets, .. } => {
                if targets.len() == 1 {
                    "delete object".to_string()
                } else {
                    format!("delete {} objects", targets.len())
                }
            }
            Command::Modify { change, .. } => change.label().to_string(),
            Command::Reorder { .. } => "reorder".to_string(),
            Command::UpdateMeta { .. } => "update metadata".to_string(),
            Command::Batch { label, .. } => label.clone(),
        }
    }

    // ─── Merging ─────────────────────────────────────────────────────────

    /// Whether `next` can collapse into this entry: both Modify, same
    /// target, same change kind, and `next` issued within `window` of this
    /// entry's last activity.
    pub(crate) fn can_absorb(&self, next: &Command, window: Duration) -> bool {
        let (
            Command::Modify {
                target: a,
                change: ka,
                stamped,
                ..
            },
            Command::Modify {
                target: b,
                change: kb,
                stamped: next_stamped,
                ..
            },
        ) = (self, next)
        else {
            return false;
        };
        a == b && ka == kb && next_stamped.saturating_duration_since(*stamped) <= window
    }

    /// Fold `next` into this entry: keep the original `before`, take the
    /// newest `after`, and refresh the timestamp so an ongoing gesture keeps
    /// extending its own window.
    pub(crate) fn absorb(&mut self, next: Command) {
        if let (
            Command::Modify { after, stamped, .. },
            Command::Modify {
                after: next_after,
                stamped: next_stamped,
                ..
            },
        ) = (self, next)
        {
            *after = next_after;
            *stamped = next_stamped;
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────
