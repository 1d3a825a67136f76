//! The document controller: owns one open project and is the only path by
//! which it changes.
//!
//! Every committed edit computes the complete next document before it is
//! published, pushes the previous document onto the undo history and
//! (re)starts the save debounce. Transient edits (live drag feedback) skip
//! both until [`DocumentController::finish_gesture`].

mod assets;
mod clipboard;
mod persist;
mod save;
mod undo;

pub use save::{SaveScheduler, SaveStatus};
pub use undo::UndoHistory;

use std::time::Instant;

use strata_types::reduce::{reduce_project, reduce_view};
use strata_types::{CaView, Clipboard, ProjectDocument, Size, ViewAction, ViewKind};

use crate::action::{DispatchResult, DomainAction};
use crate::config::EditorSettings;
use crate::store::ProjectStore;

pub struct DocumentController<S: ProjectStore> {
    store: S,
    document: ProjectDocument,
    history: UndoHistory,
    clipboard: Clipboard,
    scheduler: SaveScheduler,
    status: SaveStatus,
    /// Document as it was before the current transient gesture began.
    gesture_start: Option<ProjectDocument>,
}

impl<S: ProjectStore> DocumentController<S> {
    fn with_document(store: S, document: ProjectDocument, settings: EditorSettings) -> Self {
        Self {
            store,
            document,
            history: UndoHistory::new(settings.undo_depth),
            clipboard: Clipboard::default(),
            scheduler: SaveScheduler::new(settings.save_debounce),
            status: SaveStatus::Idle,
            gesture_start: None,
        }
    }

    pub fn document(&self) -> &ProjectDocument {
        &self.document
    }

    pub fn view(&self, kind: ViewKind) -> &CaView {
        self.document.view(kind)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn save_status(&self) -> &SaveStatus {
        &self.status
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn history(&self) -> &UndoHistory {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn canvas_size(&self) -> Size {
        Size::new(self.document.meta.width, self.document.meta.height)
    }

    /// Dispatch an action. Undoable actions that change the document push a
    /// snapshot and schedule a save.
    pub fn dispatch(&mut self, action: &DomainAction) -> DispatchResult {
        self.finish_gesture();
        log::debug!(target: "editor", "dispatch {:?}", action);

        match action {
            DomainAction::View(kind, view_action) => {
                let mut next = self.document.clone();
                let canvas = self.canvas_size();
                let changed = reduce_view(view_action, next.view_mut(*kind), canvas);
                self.commit(next, changed, action.is_undoable())
            }
            DomainAction::Project(project_action) => {
                let mut next = self.document.clone();
                let changed = reduce_project(project_action, &mut next.meta);
                if changed {
                    let current = self.document.meta.clone();
                    if let Err(e) = self.relocate_bundle(&current, &next.meta) {
                        return DispatchResult::with_status(format!("rename refused: {e}"));
                    }
                }
                self.commit(next, changed, action.is_undoable())
            }
            DomainAction::Copy(kind, ids) => self.copy(*kind, ids),
            DomainAction::Paste(kind) => self.paste(*kind),
            DomainAction::Undo => self.step_history(true),
            DomainAction::Redo => self.step_history(false),
        }
    }

    /// Undo (`back`) or redo one snapshot. A step that crosses a rename moves
    /// the stored bundle too; if that move fails the step is reverted.
    fn step_history(&mut self, back: bool) -> DispatchResult {
        let before = self.document.meta.clone();
        let stepped = if back {
            self.history.undo(&mut self.document)
        } else {
            self.history.redo(&mut self.document)
        };
        if !stepped {
            return DispatchResult::none();
        }

        let after = self.document.meta.clone();
        if let Err(e) = self.relocate_bundle(&before, &after) {
            if back {
                self.history.redo(&mut self.document);
            } else {
                self.history.undo(&mut self.document);
            }
            return DispatchResult::with_status(format!("bundle move failed: {e}"));
        }

        self.schedule_save();
        DispatchResult {
            changed: true,
            save_scheduled: true,
            ..DispatchResult::none()
        }
    }

    /// Swap in a whole view (e.g. imported CAML). Recorded like any edit.
    pub fn replace_view(&mut self, view: CaView) -> DispatchResult {
        self.finish_gesture();
        let mut next = self.document.clone();
        let kind = view.kind;
        let changed = next.view(kind) != &view;
        *next.view_mut(kind) = view;
        self.commit(next, changed, true)
    }

    pub fn undo(&mut self) -> bool {
        self.dispatch(&DomainAction::Undo).changed
    }

    pub fn redo(&mut self) -> bool {
        self.dispatch(&DomainAction::Redo).changed
    }

    /// Publish `next`. Undoable changes record the previous document and
    /// schedule a save; cursor changes (selection, active state) do neither.
    fn commit(&mut self, next: ProjectDocument, changed: bool, undoable: bool) -> DispatchResult {
        if !changed {
            return DispatchResult::none();
        }
        let previous = std::mem::replace(&mut self.document, next);
        if undoable {
            self.history.push(previous);
            self.schedule_save();
        }
        DispatchResult::applied(undoable)
    }

    /// Live-feedback edit: applied immediately, no snapshot, no save.
    pub fn apply_transient(&mut self, kind: ViewKind, action: &ViewAction) -> bool {
        let mut next = self.document.clone();
        let canvas = self.canvas_size();
        if !reduce_view(action, next.view_mut(kind), canvas) {
            return false;
        }
        let previous = std::mem::replace(&mut self.document, next);
        if self.gesture_start.is_none() {
            self.gesture_start = Some(previous);
        }
        true
    }

    /// End a transient gesture with one undo snapshot and a scheduled save.
    pub fn finish_gesture(&mut self) -> bool {
        let Some(start) = self.gesture_start.take() else {
            return false;
        };
        if start == self.document {
            return false;
        }
        self.history.push(start);
        self.schedule_save();
        true
    }

    fn schedule_save(&mut self) {
        self.scheduler.schedule(Instant::now());
        self.status = SaveStatus::Pending;
    }

    /// Flush when the debounce deadline has passed. Returns whether a write
    /// was attempted.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.scheduler.is_due(now) {
            self.flush();
            true
        } else {
            false
        }
    }

    pub fn is_save_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    /// Visibility loss: write any pending save now.
    pub fn on_hidden(&mut self) {
        self.finish_gesture();
        if self.scheduler.is_pending() {
            self.flush();
        }
    }

    /// End the session, flushing pending work.
    pub fn close(mut self) -> SaveStatus {
        self.on_hidden();
        self.status.clone()
    }
}

impl<S: ProjectStore> Drop for DocumentController<S> {
    fn drop(&mut self) {
        self.on_hidden();
    }
}
