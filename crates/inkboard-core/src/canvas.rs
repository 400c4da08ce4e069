//! The canvas engine: model operations, history and the sync boundary.
//!
//! Every model mutation goes through [`Canvas`]. Each applies locally,
//! records exactly one history entry and is forwarded to the collaborator
//! when one is connected. Pointer handling lives in [`crate::interaction`].

use crate::config::EngineConfig;
use crate::document::{CanvasDocument, EntityRef};
use crate::history::History;
use crate::interaction::{Session, TextEditRequest};
use crate::patch::EntityPatch;
use crate::path::InkPath;
use crate::selection::Selection;
use crate::shapes::{DEFAULT_FONT_SIZE, EntityId, Shape, TextShape};
use crate::snap::{GuideAxis, GuideLine, SnapCandidates, canvas_tolerance};
use crate::storage::{Storage, StorageResult, VersionedSnapshot};
use crate::sync::{ConnectionState, SyncCollaborator, SyncEvent, SyncIntent};
use crate::tools::{ToolKind, ToolManager};
use crate::viewport::Viewport;
use kurbo::{Point, Size};
use uuid::Uuid;

/// The infinite canvas.
pub struct Canvas {
    pub(crate) document: CanvasDocument,
    /// Pan and zoom.
    pub viewport: Viewport,
    /// Current tool and style for new entities.
    pub tools: ToolManager,
    pub(crate) selection: Selection,
    /// Persistent guides followed by the temporary guides of the active session.
    pub(crate) guides: Vec<GuideLine>,
    pub(crate) config: EngineConfig,
    pub(crate) history: History,
    pub(crate) session: Session,
    pub(crate) text_edit: Option<TextEditRequest>,
    collaborator: Option<Box<dyn SyncCollaborator>>,
    sync_status: ConnectionState,
    /// Intents made while the collaborator was still connecting.
    pending_intents: Vec<SyncIntent>,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("document", &self.document)
            .field("viewport", &self.viewport)
            .field("tools", &self.tools)
            .field("selection", &self.selection)
            .field("session", &self.session)
            .field("sync_status", &self.sync_status)
            .finish_non_exhaustive()
    }
}

impl Canvas {
    /// Create a new canvas with an empty document.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self::with_document(CanvasDocument::new(), config)
    }

    /// Create a canvas with an existing document. The document is the first history entry.
    pub fn with_document(document: CanvasDocument, config: EngineConfig) -> Self {
        Self {
            history: History::new(document.clone(), config.history_capacity),
            document,
            viewport: Viewport::with_scale_bounds(config.min_scale, config.max_scale),
            tools: ToolManager::from_config(&config),
            selection: Selection::new(),
            guides: Vec::new(),
            config,
            session: Session::Idle,
            text_edit: None,
            collaborator: None,
            sync_status: ConnectionState::Disconnected,
            pending_intents: Vec::new(),
        }
    }

    pub fn document(&self) -> &CanvasDocument {
        &self.document
    }

    /// Deep copy of the current paths and shapes.
    pub fn snapshot(&self) -> CanvasDocument {
        self.document.clone()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// All guides, persistent and temporary.
    pub fn guides(&self) -> &[GuideLine] {
        &self.guides
    }

    pub fn set_tool(&mut self, tool: ToolKind) {
        self.tools.set_tool(tool);
    }

    // --- Selection ---

    /// Replace the selection with `id` if it exists.
    pub fn select(&mut self, id: EntityId) -> bool {
        if !self.document.contains(id) {
            log::warn!("select: no entity {id}");
            return false;
        }
        self.selection.select(id);
        true
    }

    pub fn add_to_selection(&mut self, id: EntityId) -> bool {
        if !self.document.contains(id) {
            log::warn!("add_to_selection: no entity {id}");
            return false;
        }
        self.selection.add(id);
        true
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn select_all(&mut self) {
        self.selection.clear();
        let ids: Vec<EntityId> = self
            .document
            .paths
            .iter()
            .map(|p| p.id)
            .chain(self.document.shapes.iter().map(|s| s.id))
            .collect();
        for id in ids {
            self.selection.add(id);
        }
    }

    pub fn is_selected(&self, id: EntityId) -> bool {
        self.selection.contains(id)
    }

    fn prune_selection(&mut self) {
        let document = &self.document;
        self.selection.retain(|id| document.contains(*id));
    }

    // --- Model operations ---

    /// Add a committed freehand path. Paths with fewer than two samples are discarded.
    pub fn add_path(&mut self, path: InkPath) -> bool {
        if !path.is_valid() {
            log::debug!("discarding path {} with {} samples", path.id, path.point_count());
            return false;
        }
        self.document.add_path(path.clone());
        self.commit();
        self.forward(SyncIntent::AddPath { path });
        true
    }

    /// Add a shape on top of the z-order.
    pub fn add_shape(&mut self, shape: Shape) -> EntityId {
        let id = shape.id;
        self.document.add_shape(shape.clone());
        self.commit();
        self.forward(SyncIntent::AddShape { shape });
        id
    }

    /// Apply a partial update. Absent ids and patches that change nothing are no-ops.
    pub fn update_entity(&mut self, id: EntityId, patch: EntityPatch) -> bool {
        if patch.is_empty() {
            log::debug!("update_entity: empty patch for {id}");
            return false;
        }
        if !self.document.contains(id) {
            log::warn!("update_entity: no entity {id}");
            return false;
        }
        if !self.document.update(id, &patch) {
            return false;
        }
        self.commit();
        self.forward(SyncIntent::UpdateEntity { id, patch });
        true
    }

    /// Delete the listed entities in one batch. Returns how many were removed.
    pub fn delete_entities(&mut self, ids: &[EntityId]) -> usize {
        let present: Vec<EntityId> = ids
            .iter()
            .copied()
            .filter(|id| self.document.contains(*id))
            .collect();
        if present.is_empty() {
            log::warn!("delete_entities: none of {} ids exist", ids.len());
            return 0;
        }
        let removed = self.document.remove(&present);
        self.prune_selection();
        if self
            .text_edit
            .is_some_and(|request| request.existing.is_some_and(|id| present.contains(&id)))
        {
            self.text_edit = None;
        }
        self.commit();
        self.forward(SyncIntent::DeleteEntities { ids: present });
        removed
    }

    /// Delete every selected entity.
    pub fn delete_selected(&mut self) -> usize {
        if self.selection.is_empty() {
            return 0;
        }
        let ids = self.selection.ids().to_vec();
        self.delete_entities(&ids)
    }

    /// Remove everything from the canvas.
    pub fn clear_all(&mut self) -> bool {
        if self.document.is_empty() {
            return false;
        }
        self.document.clear();
        self.selection.clear();
        self.text_edit = None;
        self.commit();
        self.forward(SyncIntent::ClearAll);
        true
    }

    pub fn bring_to_front(&mut self, id: EntityId) -> bool {
        self.reorder(id, CanvasDocument::bring_to_front)
    }

    pub fn send_to_back(&mut self, id: EntityId) -> bool {
        self.reorder(id, CanvasDocument::send_to_back)
    }

    pub fn bring_forward(&mut self, id: EntityId) -> bool {
        self.reorder(id, CanvasDocument::bring_forward)
    }

    pub fn send_backward(&mut self, id: EntityId) -> bool {
        self.reorder(id, CanvasDocument::send_backward)
    }

    fn reorder(&mut self, id: EntityId, op: fn(&mut CanvasDocument, EntityId) -> bool) -> bool {
        if !op(&mut self.document, id) {
            return false;
        }
        self.commit();
        self.forward_full_state();
        true
    }

    /// Replace the whole document, e.g. after loading a snapshot. History restarts.
    pub fn load_document(&mut self, document: CanvasDocument) {
        log::info!(
            "loading document: {} paths, {} shapes",
            document.paths.len(),
            document.shapes.len()
        );
        self.session = Session::Idle;
        self.clear_temp_guides();
        self.text_edit = None;
        self.selection.clear();
        self.history.reset(document.clone());
        self.document = document;
        self.forward_full_state();
    }

    /// Save the current model under `name`.
    pub fn save_to(&self, storage: &dyn Storage, name: &str) -> StorageResult<()> {
        storage.save(name, &VersionedSnapshot::new(self.snapshot()))
    }

    /// Replace the model with the snapshot saved under `name`. On error the
    /// canvas is left untouched.
    pub fn load_from(&mut self, storage: &dyn Storage, name: &str) -> StorageResult<()> {
        let snapshot = storage.load(name)?;
        self.load_document(snapshot.into_document());
        Ok(())
    }

    // --- History ---

    /// Step back one history entry. Clears the selection.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo().cloned() else {
            return false;
        };
        self.restore(snapshot);
        true
    }

    /// Step forward one history entry. Clears the selection.
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo().cloned() else {
            return false;
        };
        self.restore(snapshot);
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn restore(&mut self, snapshot: CanvasDocument) {
        self.session = Session::Idle;
        self.clear_temp_guides();
        self.text_edit = None;
        self.selection.clear();
        self.document = snapshot;
        self.forward_full_state();
    }

    pub(crate) fn commit(&mut self) {
        self.history.commit(self.document.clone());
    }

    // --- Viewport ---

    /// Zoom about a client-space point, e.g. for the mouse wheel.
    pub fn zoom_at(&mut self, client: Point, factor: f64) {
        self.viewport.zoom_at(client, factor);
    }

    /// Fit the viewport to the content, or reset it for an empty canvas.
    pub fn fit_to_content(&mut self, surface: Size, padding: f64) {
        match self.document.bounds() {
            Some(bounds) => self.viewport.fit_to_bounds(bounds, surface, padding),
            None => self.viewport.reset(),
        }
    }

    // --- Guides and snapping ---

    /// Add a persistent guide. Persistent guides are snap targets and survive pointer-up.
    pub fn add_guide(&mut self, axis: GuideAxis, position: f64) -> Uuid {
        let guide = GuideLine::new(axis, position, false);
        self.guides.push(guide);
        guide.id
    }

    pub fn remove_guide(&mut self, id: Uuid) -> bool {
        let before = self.guides.len();
        self.guides.retain(|g| g.id != id);
        self.guides.len() != before
    }

    pub(crate) fn clear_temp_guides(&mut self) {
        self.guides.retain(|g| !g.is_temp);
    }

    /// Snap a canvas point against every shape not in `exclude`, replacing
    /// the temporary guides with the ones the snap produced.
    pub(crate) fn snap_point(&mut self, point: Point, exclude: &[EntityId]) -> Point {
        let tolerance = canvas_tolerance(self.config.snap_tolerance_px, self.viewport.scale());
        let result = SnapCandidates::from_shapes(&self.document.shapes, exclude)
            .with_guides(&self.guides)
            .snap(point, tolerance);
        self.clear_temp_guides();
        self.guides.extend(result.guides);
        result.point
    }

    // --- Text editing ---

    /// The open inline text-edit request, if any.
    pub fn text_edit(&self) -> Option<&TextEditRequest> {
        self.text_edit.as_ref()
    }

    /// Complete the open text edit with `content`.
    ///
    /// New text with blank content is dropped. Editing an existing shape to
    /// blank content deletes it. Returns the id of the created or edited shape.
    pub fn commit_text(&mut self, content: &str) -> Option<EntityId> {
        let request = self.text_edit.take()?;
        let blank = content.trim().is_empty();
        match request.existing {
            Some(id) => {
                if blank {
                    self.delete_entities(&[id]);
                    return None;
                }
                let font_size = self.document.shape(id)?.as_text()?.font_size;
                let (width, height) = TextShape::estimated_size(content, font_size);
                let patch = EntityPatch {
                    width: Some(width),
                    height: Some(height),
                    ..EntityPatch::new().with_text(content)
                };
                self.update_entity(id, patch);
                Some(id)
            }
            None if blank => None,
            None => {
                let text = TextShape::new(content, DEFAULT_FONT_SIZE);
                let shape = Shape::text(request.position, text).with_stroke(self.tools.stroke);
                Some(self.add_shape(shape))
            }
        }
    }

    pub fn cancel_text_edit(&mut self) {
        self.text_edit = None;
    }

    // --- Rotation (properties panel) ---

    /// Start rotating a shape. Only valid while no pointer session is active.
    pub fn begin_rotation(&mut self, id: EntityId) -> bool {
        if !matches!(self.session, Session::Idle) {
            return false;
        }
        let Some(shape) = self.document.shape(id) else {
            log::warn!("begin_rotation: no shape {id}");
            return false;
        };
        log::debug!("session: idle -> rotating {id}");
        self.session = Session::Rotating {
            id,
            original: shape.rotation,
        };
        true
    }

    /// Set the rotation (degrees) of the shape being rotated.
    pub fn update_rotation(&mut self, degrees: f64) {
        if let Session::Rotating { id, .. } = self.session {
            if let Some(shape) = self.document.shape_mut(id) {
                shape.rotation = degrees;
            }
        }
    }

    /// Finish rotating. Commits once if the angle changed.
    pub fn end_rotation(&mut self) -> bool {
        let Session::Rotating { id, original } = self.session else {
            return false;
        };
        self.session = Session::Idle;
        log::debug!("session: rotating -> idle");
        let Some(rotation) = self.document.shape(id).map(|s| s.rotation) else {
            return false;
        };
        if (rotation - original).abs() < f64::EPSILON {
            return false;
        }
        self.commit();
        self.forward(SyncIntent::UpdateEntity {
            id,
            patch: EntityPatch::new().with_rotation(rotation),
        });
        true
    }

    // --- Synchronization ---

    /// Attach an external collaborator. Its events are applied by [`Canvas::pump_sync`].
    pub fn attach_collaborator(&mut self, collaborator: Box<dyn SyncCollaborator>) {
        self.sync_status = collaborator.connection_state();
        log::info!("collaborator attached ({:?})", self.sync_status);
        self.collaborator = Some(collaborator);
    }

    /// Detach the collaborator and continue in local mode.
    pub fn detach_collaborator(&mut self) -> Option<Box<dyn SyncCollaborator>> {
        let collaborator = self.collaborator.take();
        if collaborator.is_some() {
            log::info!("collaborator detached, continuing locally");
            self.sync_status = ConnectionState::Disconnected;
            self.pending_intents.clear();
        }
        collaborator
    }

    /// Last known collaborator connection state.
    pub fn sync_status(&self) -> ConnectionState {
        self.sync_status
    }

    /// Whether intents are currently forwarded.
    pub fn is_collaborating(&self) -> bool {
        self.collaborator
            .as_ref()
            .is_some_and(|c| c.connection_state() == ConnectionState::Connected)
    }

    /// Drain and apply collaborator events. Returns the number of events handled.
    pub fn pump_sync(&mut self) -> usize {
        let Some(collaborator) = self.collaborator.as_mut() else {
            return 0;
        };
        let events = collaborator.poll_events();
        let count = events.len();
        for event in events {
            match event {
                SyncEvent::StateReplaced { paths, shapes } => self.apply_remote_state(paths, shapes),
                SyncEvent::StatusChanged(state) => {
                    log::info!("sync status: {:?} -> {:?}", self.sync_status, state);
                    self.sync_status = state;
                    match state {
                        ConnectionState::Connected => self.flush_pending_intents(),
                        ConnectionState::Error => {
                            log::error!("collaborator reported an error, continuing locally");
                            self.collaborator = None;
                            self.pending_intents.clear();
                            break;
                        }
                        ConnectionState::Disconnected => self.pending_intents.clear(),
                        ConnectionState::Connecting => {}
                    }
                }
            }
        }
        count
    }

    /// Number of intents waiting for the collaborator to connect.
    pub fn pending_intents(&self) -> usize {
        self.pending_intents.len()
    }

    fn flush_pending_intents(&mut self) {
        if self.pending_intents.is_empty() {
            return;
        }
        log::debug!("flushing {} queued intents", self.pending_intents.len());
        for intent in std::mem::take(&mut self.pending_intents) {
            self.forward(intent);
        }
    }

    /// Replace the model with authoritative state from the collaborator.
    ///
    /// Not recorded in history. Selection and text edits addressing
    /// entities that no longer exist are dropped.
    pub fn apply_remote_state(&mut self, paths: Vec<InkPath>, shapes: Vec<Shape>) {
        self.document = CanvasDocument::from_parts(paths, shapes);
        self.prune_selection();
        let stale_edit = self
            .text_edit
            .and_then(|request| request.existing)
            .is_some_and(|id| !matches!(self.document.entity(id), Some(EntityRef::Shape(_))));
        if stale_edit {
            self.text_edit = None;
        }
    }

    pub(crate) fn forward(&mut self, intent: SyncIntent) {
        let Some(collaborator) = self.collaborator.as_mut() else {
            return;
        };
        match collaborator.connection_state() {
            ConnectionState::Connected => {}
            ConnectionState::Connecting => {
                log::debug!("queueing {} until the collaborator connects", intent.name());
                self.pending_intents.push(intent);
                return;
            }
            state => {
                log::debug!("not forwarding {}: collaborator is {:?}", intent.name(), state);
                return;
            }
        }
        let name = intent.name();
        if let Err(err) = collaborator.submit(intent) {
            log::error!("failed to forward {name}: {err}; continuing locally");
            self.sync_status = ConnectionState::Error;
            self.collaborator = None;
        }
    }

    /// Forward the whole local model as a clear followed by re-adds.
    fn forward_full_state(&mut self) {
        if !self.is_collaborating() {
            return;
        }
        self.forward(SyncIntent::ClearAll);
        for path in self.document.paths.clone() {
            self.forward(SyncIntent::AddPath { path });
        }
        for shape in self.document.shapes.clone() {
            self.forward(SyncIntent::AddShape { shape });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::SerializableColor;
    use crate::sync::LoopbackCollaborator;

    fn ink(points: &[(f64, f64)]) -> InkPath {
        let points: Vec<Point> = points.iter().map(|&(x, y)| Point::new(x, y)).collect();
        InkPath::from_points(&points, SerializableColor::black(), 2.0)
    }

    #[test]
    fn test_add_shape_commits_once() {
        let mut canvas = Canvas::new();
        assert_eq!(canvas.history().len(), 1);
        canvas.add_shape(Shape::rectangle(0.0, 0.0, 10.0, 10.0));
        assert_eq!(canvas.history().len(), 2);
        assert_eq!(canvas.document().shapes.len(), 1);
    }

    #[test]
    fn test_short_path_discarded() {
        let mut canvas = Canvas::new();
        assert!(!canvas.add_path(ink(&[(1.0, 1.0)])));
        assert!(canvas.document().paths.is_empty());
        assert_eq!(canvas.history().len(), 1);
        assert!(canvas.add_path(ink(&[(0.0, 0.0), (1.0, 1.0)])));
    }

    #[test]
    fn test_delete_selected_shape() {
        let mut canvas = Canvas::new();
        let keep = canvas.add_shape(Shape::rectangle(0.0, 0.0, 10.0, 10.0));
        let doomed = canvas.add_shape(Shape::rectangle(20.0, 0.0, 10.0, 10.0));
        canvas.select(doomed);
        let entries = canvas.history().len();

        assert_eq!(canvas.delete_selected(), 1);
        assert!(canvas.selection().is_empty());
        assert!(canvas.document().shape(doomed).is_none());
        assert!(canvas.document().shape(keep).is_some());
        assert_eq!(canvas.history().len(), entries + 1);
    }

    #[test]
    fn test_absent_ids_are_noops() {
        let mut canvas = Canvas::new();
        let ghost = Uuid::new_v4();
        assert_eq!(canvas.delete_entities(&[ghost]), 0);
        assert!(!canvas.update_entity(ghost, EntityPatch::new().with_opacity(0.5)));
        assert_eq!(canvas.history().len(), 1);
    }

    #[test]
    fn test_update_entity() {
        let mut canvas = Canvas::new();
        let id = canvas.add_shape(Shape::rectangle(0.0, 0.0, 10.0, 10.0));
        assert!(canvas.update_entity(id, EntityPatch::new().with_stroke_width(7.0)));
        assert!(!canvas.update_entity(id, EntityPatch::new().with_stroke_width(7.0)));
        assert_eq!(canvas.history().len(), 3);
    }

    #[test]
    fn test_undo_redo_inverse() {
        let mut canvas = Canvas::new();
        canvas.add_shape(Shape::rectangle(0.0, 0.0, 10.0, 10.0));
        canvas.add_path(ink(&[(0.0, 0.0), (4.0, 4.0)]));
        canvas.undo();
        let before_redo = canvas.snapshot();
        assert!(canvas.redo());
        assert_eq!(canvas.document().paths.len(), 1);
        assert!(canvas.undo());
        assert_eq!(canvas.snapshot(), before_redo);
    }

    #[test]
    fn test_undo_clears_selection_and_stops_at_boundary() {
        let mut canvas = Canvas::new();
        let id = canvas.add_shape(Shape::rectangle(0.0, 0.0, 10.0, 10.0));
        canvas.select(id);
        assert!(canvas.undo());
        assert!(canvas.selection().is_empty());
        assert!(canvas.document().is_empty());
        assert!(!canvas.undo());
        assert!(canvas.redo());
        assert!(!canvas.redo());
    }

    #[test]
    fn test_clear_all() {
        let mut canvas = Canvas::new();
        assert!(!canvas.clear_all());
        let id = canvas.add_shape(Shape::rectangle(0.0, 0.0, 10.0, 10.0));
        canvas.select(id);
        assert!(canvas.clear_all());
        assert!(canvas.document().is_empty());
        assert!(canvas.selection().is_empty());
    }

    #[test]
    fn test_reorder_commits() {
        let mut canvas = Canvas::new();
        let a = canvas.add_shape(Shape::rectangle(0.0, 0.0, 10.0, 10.0));
        let b = canvas.add_shape(Shape::rectangle(0.0, 0.0, 10.0, 10.0));
        assert!(canvas.bring_to_front(a));
        assert_eq!(canvas.document().shapes[1].id, a);
        assert!(!canvas.bring_to_front(a));
        assert!(canvas.send_to_back(a));
        assert!(canvas.bring_forward(a));
        assert!(canvas.send_backward(a));
        assert_eq!(canvas.document().shapes[1].id, b);
        assert_eq!(canvas.history().len(), 7);
    }

    #[test]
    fn test_text_edit_commit() {
        let mut canvas = Canvas::new();
        canvas.text_edit = Some(TextEditRequest::create(Point::new(5.0, 5.0)));
        let id = canvas.commit_text("hello").unwrap();
        let shape = canvas.document().shape(id).unwrap();
        assert_eq!(shape.as_text().unwrap().text, "hello");
        let origin = shape.origin();
        assert!(canvas.text_edit().is_none());

        canvas.text_edit = Some(TextEditRequest::edit(id, origin));
        assert_eq!(canvas.commit_text("hello world"), Some(id));
        assert_eq!(canvas.document().shape(id).unwrap().as_text().unwrap().text, "hello world");

        canvas.text_edit = Some(TextEditRequest::edit(id, Point::new(5.0, 5.0)));
        assert_eq!(canvas.commit_text("   "), None);
        assert!(canvas.document().shape(id).is_none());

        canvas.text_edit = Some(TextEditRequest::create(Point::ZERO));
        assert_eq!(canvas.commit_text(""), None);
        assert!(canvas.document().is_empty());
    }

    #[test]
    fn test_rotation_session() {
        let mut canvas = Canvas::new();
        let id = canvas.add_shape(Shape::rectangle(0.0, 0.0, 10.0, 10.0));
        let entries = canvas.history().len();

        assert!(canvas.begin_rotation(id));
        canvas.update_rotation(30.0);
        canvas.update_rotation(45.0);
        assert!(canvas.end_rotation());
        assert!((canvas.document().shape(id).unwrap().rotation - 45.0).abs() < f64::EPSILON);
        assert_eq!(canvas.history().len(), entries + 1);

        assert!(canvas.begin_rotation(id));
        assert!(!canvas.end_rotation());
        assert_eq!(canvas.history().len(), entries + 1);
    }

    #[test]
    fn test_persistent_guides_survive_and_snap() {
        let mut canvas = Canvas::new();
        let guide = canvas.add_guide(GuideAxis::Vertical, 100.0);
        let snapped = canvas.snap_point(Point::new(96.0, 300.0), &[]);
        assert!((snapped.x - 100.0).abs() < f64::EPSILON);
        assert_eq!(canvas.guides().iter().filter(|g| g.is_temp).count(), 1);
        canvas.clear_temp_guides();
        assert_eq!(canvas.guides().len(), 1);
        assert!(canvas.remove_guide(guide));
        assert!(canvas.guides().is_empty());
    }

    #[test]
    fn test_collaborator_round_trip() {
        let mut canvas = Canvas::new();
        canvas.attach_collaborator(Box::new(LoopbackCollaborator::connected(CanvasDocument::new())));
        assert!(canvas.is_collaborating());
        canvas.pump_sync();

        let id = canvas.add_shape(Shape::rectangle(0.0, 0.0, 10.0, 10.0));
        canvas.select(id);
        assert!(canvas.pump_sync() > 0);
        assert!(canvas.document().shape(id).is_some());
        assert!(canvas.is_selected(id));
    }

    #[test]
    fn test_config_cannot_widen_zoom_range() {
        let config = EngineConfig {
            min_scale: 0.01,
            max_scale: 50.0,
            ..EngineConfig::default()
        };
        let mut canvas = Canvas::with_config(config);
        canvas.viewport.zoom_at(Point::ZERO, 0.001);
        assert!((canvas.viewport.scale() - crate::viewport::MIN_SCALE).abs() < f64::EPSILON);
        canvas.viewport.zoom_at(Point::ZERO, 1e6);
        assert!((canvas.viewport.scale() - crate::viewport::MAX_SCALE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_intents_queued_while_connecting() {
        let mut loopback = LoopbackCollaborator::new();
        loopback.begin_connect();
        let mut canvas = Canvas::new();
        canvas.attach_collaborator(Box::new(loopback));
        assert_eq!(canvas.sync_status(), ConnectionState::Connecting);

        let id = canvas.add_shape(Shape::rectangle(0.0, 0.0, 10.0, 10.0));
        assert_eq!(canvas.pending_intents(), 1);
        assert!(canvas.document().shape(id).is_some());

        assert!(canvas.detach_collaborator().is_some());
        assert_eq!(canvas.pending_intents(), 0);
    }

    #[test]
    fn test_queued_intents_flush_on_connect() {
        let mut canvas = Canvas::new();
        canvas.attach_collaborator(Box::new(ConnectsOnPoll(LoopbackCollaborator::new())));
        let id = canvas.add_shape(Shape::rectangle(0.0, 0.0, 10.0, 10.0));
        assert_eq!(canvas.pending_intents(), 1);

        canvas.pump_sync();
        assert_eq!(canvas.pending_intents(), 0);
        assert!(canvas.is_collaborating());
        canvas.pump_sync();
        assert!(canvas.document().shape(id).is_some());
    }

    /// Loopback that finishes connecting the first time it is polled.
    struct ConnectsOnPoll(LoopbackCollaborator);

    impl SyncCollaborator for ConnectsOnPoll {
        fn connection_state(&self) -> ConnectionState {
            match self.0.connection_state() {
                ConnectionState::Disconnected => ConnectionState::Connecting,
                state => state,
            }
        }

        fn submit(&mut self, intent: SyncIntent) -> crate::sync::SyncResult<()> {
            self.0.submit(intent)
        }

        fn poll_events(&mut self) -> Vec<SyncEvent> {
            if self.0.connection_state() == ConnectionState::Disconnected {
                self.0.connect();
            }
            self.0.poll_events()
        }
    }

    #[test]
    fn test_remote_state_prunes_selection() {
        let mut canvas = Canvas::new();
        let id = canvas.add_shape(Shape::rectangle(0.0, 0.0, 10.0, 10.0));
        canvas.select(id);
        let entries = canvas.history().len();

        canvas.apply_remote_state(vec![], vec![Shape::circle(0.0, 0.0, 5.0, 5.0)]);
        assert!(canvas.selection().is_empty());
        assert_eq!(canvas.document().shapes.len(), 1);
        assert_eq!(canvas.history().len(), entries);
    }

    #[test]
    fn test_collaborator_failure_falls_back_to_local() {
        let mut loopback = LoopbackCollaborator::connected(CanvasDocument::new());
        loopback.set_failing(true);
        let mut canvas = Canvas::new();
        canvas.attach_collaborator(Box::new(loopback));

        let id = canvas.add_shape(Shape::rectangle(0.0, 0.0, 10.0, 10.0));
        assert_eq!(canvas.sync_status(), ConnectionState::Error);
        assert!(!canvas.is_collaborating());
        assert!(canvas.document().shape(id).is_some());

        canvas.add_shape(Shape::rectangle(5.0, 5.0, 10.0, 10.0));
        assert_eq!(canvas.document().shapes.len(), 2);
    }

    #[test]
    fn test_empty_patch_is_not_committed() {
        let mut canvas = Canvas::new();
        let id = canvas.add_shape(Shape::rectangle(0.0, 0.0, 10.0, 10.0));
        let entries = canvas.history().len();
        assert!(!canvas.update_entity(id, EntityPatch::new()));
        assert_eq!(canvas.history().len(), entries);
    }

    #[test]
    fn test_save_and_load_through_storage() {
        let storage = crate::storage::MemoryStorage::new();
        let mut canvas = Canvas::new();
        canvas.add_shape(Shape::rectangle(0.0, 0.0, 10.0, 10.0));
        canvas.add_path(ink(&[(0.0, 0.0), (4.0, 4.0)]));
        canvas.save_to(&storage, "board").unwrap();
        let saved = canvas.snapshot();

        let mut other = Canvas::new();
        other.add_shape(Shape::circle(0.0, 0.0, 5.0, 5.0));
        assert!(other.load_from(&storage, "missing").is_err());
        assert_eq!(other.document().shapes.len(), 1);

        other.load_from(&storage, "board").unwrap();
        assert_eq!(other.snapshot(), saved);
        assert!(!other.can_undo());
    }

    #[test]
    fn test_load_document_resets_history() {
        let mut canvas = Canvas::new();
        canvas.add_shape(Shape::rectangle(0.0, 0.0, 10.0, 10.0));
        let doc = CanvasDocument::from_parts(vec![ink(&[(0.0, 0.0), (1.0, 1.0)])], vec![]);
        canvas.load_document(doc.clone());
        assert_eq!(canvas.snapshot(), doc);
        assert_eq!(canvas.history().len(), 1);
        assert!(!canvas.can_undo());
    }
}
