//! Pointer and keyboard handling: the interaction state machine.
//!
//! Exactly one [`Session`] is active at a time. Sessions start on
//! pointer-down from [`Session::Idle`] and always return to it on
//! pointer-up, which also clears the temporary snap guides.

use crate::canvas::Canvas;
use crate::document::EntityRef;
use crate::hit::{entities_at, entity_at, resize_handle_at};
use crate::input::{Key, Modifiers, PointerEvent, PointerPhase};
use crate::patch::EntityPatch;
use crate::path::MIN_PATH_POINTS;
use crate::selection::ResizeHandle;
use crate::shapes::{EntityId, Shape, ShapeKind};
use crate::sync::SyncIntent;
use crate::tools::ToolKind;
use kurbo::{Point, Vec2};

/// An entity faded by the eraser, with the opacity it had before.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchedEntity {
    pub entity: EntityRef,
    pub original_opacity: Option<f64>,
}

/// The active manipulation mode.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Session {
    #[default]
    Idle,
    /// Panning; `last` is the previous client-space pointer position.
    Panning { last: Point },
    /// Moving the selected shapes.
    Dragging {
        /// Canvas point of the pointer-down.
        anchor: Point,
        /// Origin of the shape that was grabbed, if a shape (not a path) was hit.
        primary: Option<Point>,
        /// Origin of every selected shape at pointer-down.
        origins: Vec<(EntityId, Point)>,
    },
    Resizing {
        id: EntityId,
        handle: ResizeHandle,
        /// The shape as it was at pointer-down.
        original: Shape,
    },
    /// Rotation driven from outside the canvas (properties panel).
    Rotating { id: EntityId, original: f64 },
    DrawingFreehand { points: Vec<Point> },
    DrawingShape { pending: Shape },
    Erasing { touched: Vec<TouchedEntity> },
}

impl Session {
    pub fn name(&self) -> &'static str {
        match self {
            Session::Idle => "idle",
            Session::Panning { .. } => "panning",
            Session::Dragging { .. } => "dragging",
            Session::Resizing { .. } => "resizing",
            Session::Rotating { .. } => "rotating",
            Session::DrawingFreehand { .. } => "drawing_freehand",
            Session::DrawingShape { .. } => "drawing_shape",
            Session::Erasing { .. } => "erasing",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Session::Idle)
    }

    /// The shape being drawn, if any.
    pub fn pending_shape(&self) -> Option<&Shape> {
        match self {
            Session::DrawingShape { pending } => Some(pending),
            _ => None,
        }
    }

    /// Samples of the stroke being drawn, if any.
    pub fn freehand_points(&self) -> Option<&[Point]> {
        match self {
            Session::DrawingFreehand { points } => Some(points),
            _ => None,
        }
    }

    /// Ids touched by the active eraser sweep.
    pub fn touched_ids(&self) -> Vec<EntityId> {
        match self {
            Session::Erasing { touched } => touched.iter().map(|t| t.entity.id()).collect(),
            _ => Vec::new(),
        }
    }
}

/// An inline text edit the surrounding UI should open.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextEditRequest {
    /// Canvas position of the text origin.
    pub position: Point,
    /// The text shape being edited, or `None` for new text.
    pub existing: Option<EntityId>,
}

impl TextEditRequest {
    pub fn create(position: Point) -> Self {
        Self {
            position,
            existing: None,
        }
    }

    pub fn edit(id: EntityId, position: Point) -> Self {
        Self {
            position,
            existing: Some(id),
        }
    }
}

impl Canvas {
    /// Dispatch a pointer event by phase.
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        match event.phase {
            PointerPhase::Pressed => self.pointer_down(event.position, event.modifiers),
            PointerPhase::Moved => self.pointer_move(event.position),
            PointerPhase::Released => self.pointer_up(event.position),
        }
    }

    /// Start a session for the current tool. `client` is in surface coordinates.
    pub fn pointer_down(&mut self, client: Point, modifiers: Modifiers) {
        if !self.session.is_idle() {
            // Missed release, e.g. the pointer left the surface.
            self.pointer_up(client);
        }
        let point = self.viewport.screen_to_canvas(client);

        let session = match self.tools.current_tool {
            ToolKind::Pan => Session::Panning { last: client },
            ToolKind::Eraser => {
                let mut touched = Vec::new();
                self.erase_at(point, &mut touched);
                Session::Erasing { touched }
            }
            ToolKind::Select => self.select_down(point, modifiers),
            ToolKind::Pen => Session::DrawingFreehand { points: vec![point] },
            ToolKind::Text => {
                self.text_edit = Some(self.text_request_at(point));
                Session::Idle
            }
            ToolKind::Rectangle | ToolKind::Circle | ToolKind::Arrow | ToolKind::Line => {
                let anchor = self.snap_point(point, &[]);
                match self.tools.pending_shape(anchor) {
                    Some(pending) => Session::DrawingShape { pending },
                    None => Session::Idle,
                }
            }
        };

        if !session.is_idle() {
            log::debug!("session: idle -> {}", session.name());
        }
        self.session = session;
    }

    fn select_down(&mut self, point: Point, modifiers: Modifiers) -> Session {
        let scale = self.viewport.scale();
        for &id in self.selection.ids().iter().rev() {
            let Some(shape) = self.document.shape(id) else {
                continue;
            };
            if let Some(handle) = resize_handle_at(shape, point, scale, self.config.handle_size) {
                return Session::Resizing {
                    id,
                    handle,
                    original: shape.clone(),
                };
            }
        }

        let Some(hit) = entity_at(&self.document, point, scale) else {
            if !modifiers.shift {
                self.selection.clear();
            }
            return Session::Idle;
        };

        let id = hit.id();
        if modifiers.shift {
            self.selection.add(id);
        } else if !self.selection.contains(id) {
            self.selection.select(id);
        }

        let primary = self.document.shape(id).map(Shape::origin);
        let origins = self
            .selection
            .ids()
            .iter()
            .filter_map(|id| self.document.shape(*id).map(|s| (*id, s.origin())))
            .collect();
        Session::Dragging {
            anchor: point,
            primary,
            origins,
        }
    }

    fn text_request_at(&self, point: Point) -> TextEditRequest {
        self.document
            .shapes
            .iter()
            .rev()
            .find(|s| matches!(s.kind, ShapeKind::Text(_)) && s.contains(point))
            .map(|s| TextEditRequest::edit(s.id, s.origin()))
            .unwrap_or_else(|| TextEditRequest::create(point))
    }

    /// Advance the active session.
    pub fn pointer_move(&mut self, client: Point) {
        let point = self.viewport.screen_to_canvas(client);
        let mut session = std::mem::take(&mut self.session);

        match &mut session {
            Session::Idle | Session::Rotating { .. } => {}
            Session::Panning { last } => {
                self.viewport.pan(client - *last);
                *last = client;
            }
            Session::Dragging {
                anchor,
                primary,
                origins,
            } => {
                let delta = match *primary {
                    Some(origin) => {
                        let exclude: Vec<EntityId> = origins.iter().map(|(id, _)| *id).collect();
                        self.snap_point(origin + (point - *anchor), &exclude) - origin
                    }
                    None => point - *anchor,
                };
                self.move_shapes(origins, delta);
            }
            Session::Resizing {
                id,
                handle,
                original,
            } => {
                let target = self.snap_point(point, &[*id]);
                let mut resized = original.clone();
                resized.set_bounds(handle.resize(original.bounds(), target));
                if let Some(shape) = self.document.shape_mut(*id) {
                    *shape = resized;
                }
            }
            Session::DrawingFreehand { points } => {
                if points.last() != Some(&point) {
                    points.push(point);
                }
            }
            Session::DrawingShape { pending } => {
                let target = self.snap_point(point, &[]);
                pending.extend_to(target);
            }
            Session::Erasing { touched } => self.erase_at(point, touched),
        }

        self.session = session;
    }

    fn move_shapes(&mut self, origins: &[(EntityId, Point)], delta: Vec2) {
        for (id, origin) in origins {
            if let Some(shape) = self.document.shape_mut(*id) {
                shape.set_origin(*origin + delta);
            }
        }
    }

    /// End the active session, committing whatever it produced.
    pub fn pointer_up(&mut self, client: Point) {
        let point = self.viewport.screen_to_canvas(client);
        let session = std::mem::take(&mut self.session);
        if !session.is_idle() {
            log::debug!("session: {} -> idle", session.name());
        }

        match session {
            Session::Idle | Session::Panning { .. } => {}
            Session::Dragging { origins, .. } => self.finish_drag(&origins),
            Session::Resizing { id, original, .. } => self.finish_resize(id, &original),
            Session::Rotating { id, original } => {
                self.session = Session::Rotating { id, original };
                self.end_rotation();
            }
            Session::DrawingFreehand { mut points } => {
                if points.last() != Some(&point) {
                    points.push(point);
                }
                if points.len() >= MIN_PATH_POINTS {
                    let path = self.tools.ink_path(&points);
                    self.add_path(path);
                } else {
                    log::debug!("discarding single-sample stroke");
                }
            }
            Session::DrawingShape { mut pending } => {
                let target = self.snap_point(point, &[]);
                pending.extend_to(target);
                pending.normalize();
                if pending.is_degenerate() {
                    log::debug!("discarding zero-size {}", pending.kind.name());
                } else {
                    self.add_shape(pending);
                }
            }
            Session::Erasing { touched } => {
                let ids: Vec<EntityId> = touched.iter().map(|t| t.entity.id()).collect();
                if !ids.is_empty() {
                    self.delete_entities(&ids);
                }
            }
        }

        self.clear_temp_guides();
    }

    fn finish_drag(&mut self, origins: &[(EntityId, Point)]) {
        let moved: Vec<(EntityId, EntityPatch)> = origins
            .iter()
            .filter_map(|(id, origin)| {
                let shape = self.document.shape(*id)?;
                (shape.origin() != *origin).then(|| {
                    let patch = EntityPatch {
                        x: Some(shape.x),
                        y: Some(shape.y),
                        ..EntityPatch::default()
                    };
                    (*id, patch)
                })
            })
            .collect();
        if moved.is_empty() {
            return;
        }
        self.commit();
        for (id, patch) in moved {
            self.forward(SyncIntent::UpdateEntity { id, patch });
        }
    }

    fn finish_resize(&mut self, id: EntityId, original: &Shape) {
        let Some(shape) = self.document.shape(id) else {
            return;
        };
        if shape == original {
            return;
        }
        let patch = EntityPatch::geometry_of(shape);
        self.commit();
        self.forward(SyncIntent::UpdateEntity { id, patch });
    }

    /// Fade every entity under `point` that this sweep has not touched yet.
    fn erase_at(&mut self, point: Point, touched: &mut Vec<TouchedEntity>) {
        let step = self.config.eraser_opacity_step;
        for entity in entities_at(&self.document, point, self.viewport.scale()) {
            if touched.iter().any(|t| t.entity == entity) {
                continue;
            }
            let original_opacity = match entity {
                EntityRef::Shape(id) => self.document.shape_mut(id).map(|shape| {
                    let before = shape.opacity;
                    shape.opacity = (before - step).max(0.0);
                    Some(before)
                }),
                EntityRef::Path(id) => self.document.path_mut(id).map(|path| {
                    let before = path.opacity;
                    path.opacity = Some((path.effective_opacity() - step).max(0.0));
                    before
                }),
            };
            if let Some(original_opacity) = original_opacity {
                touched.push(TouchedEntity {
                    entity,
                    original_opacity,
                });
            }
        }
    }

    /// Abort the active session, restoring anything it changed.
    pub fn cancel_session(&mut self) {
        let session = std::mem::take(&mut self.session);
        if !session.is_idle() {
            log::debug!("session: {} cancelled", session.name());
        }
        match session {
            Session::Dragging { origins, .. } => self.move_shapes(&origins, Vec2::ZERO),
            Session::Resizing { id, original, .. } => {
                if let Some(shape) = self.document.shape_mut(id) {
                    *shape = original;
                }
            }
            Session::Rotating { id, original } => {
                if let Some(shape) = self.document.shape_mut(id) {
                    shape.rotation = original;
                }
            }
            Session::Erasing { touched } => {
                for t in touched {
                    match t.entity {
                        EntityRef::Shape(id) => {
                            if let Some(shape) = self.document.shape_mut(id) {
                                shape.opacity = t.original_opacity.unwrap_or(1.0);
                            }
                        }
                        EntityRef::Path(id) => {
                            if let Some(path) = self.document.path_mut(id) {
                                path.opacity = t.original_opacity;
                            }
                        }
                    }
                }
            }
            Session::Idle
            | Session::Panning { .. }
            | Session::DrawingFreehand { .. }
            | Session::DrawingShape { .. } => {}
        }
        self.clear_temp_guides();
    }

    /// Handle a key press. Returns `true` if the key was consumed.
    pub fn key_down(&mut self, key: Key) -> bool {
        match key {
            Key::Delete => {
                if !self.session.is_idle() || self.text_edit.is_some() {
                    return false;
                }
                self.delete_selected() > 0
            }
            Key::Escape => {
                self.cancel_session();
                self.text_edit = None;
                self.selection.clear();
                true
            }
        }
    }

    /// The shape being drawn, rendered on top of committed shapes.
    pub fn pending_shape(&self) -> Option<&Shape> {
        self.session.pending_shape()
    }

    /// Samples of the stroke being drawn.
    pub fn pending_stroke(&self) -> Option<&[Point]> {
        self.session.freehand_points()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::InkPath;
    use crate::shapes::SerializableColor;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn drag(canvas: &mut Canvas, from: (f64, f64), to: (f64, f64)) {
        canvas.handle_pointer(PointerEvent::pressed(from.0, from.1));
        canvas.handle_pointer(PointerEvent::moved(to.0, to.1));
        canvas.handle_pointer(PointerEvent::released(to.0, to.1));
    }

    #[test]
    fn test_draw_rectangle() {
        init_logger();
        let mut canvas = Canvas::new();
        canvas.set_tool(ToolKind::Rectangle);
        canvas.handle_pointer(PointerEvent::pressed(10.0, 10.0));
        canvas.handle_pointer(PointerEvent::moved(60.0, 30.0));
        assert!(canvas.pending_shape().is_some());
        canvas.handle_pointer(PointerEvent::moved(110.0, 60.0));
        canvas.handle_pointer(PointerEvent::released(110.0, 60.0));

        assert!(canvas.session().is_idle());
        assert!(canvas.pending_shape().is_none());
        assert_eq!(canvas.history().len(), 2);
        let shape = &canvas.document().shapes[0];
        assert!((shape.x - 10.0).abs() < f64::EPSILON);
        assert!((shape.y - 10.0).abs() < f64::EPSILON);
        assert_eq!(shape.size(), Some((100.0, 50.0)));
    }

    #[test]
    fn test_draw_rectangle_backwards_is_normalized() {
        init_logger();
        let mut canvas = Canvas::new();
        canvas.set_tool(ToolKind::Circle);
        drag(&mut canvas, (110.0, 60.0), (10.0, 10.0));
        let shape = &canvas.document().shapes[0];
        assert_eq!(shape.origin(), Point::new(10.0, 10.0));
        assert_eq!(shape.size(), Some((100.0, 50.0)));
    }

    #[test]
    fn test_click_without_drag_creates_nothing() {
        init_logger();
        let mut canvas = Canvas::new();
        for tool in [ToolKind::Rectangle, ToolKind::Arrow] {
            canvas.set_tool(tool);
            drag(&mut canvas, (10.0, 10.0), (10.0, 10.0));
        }
        assert!(canvas.document().is_empty());
        assert_eq!(canvas.history().len(), 1);
    }

    #[test]
    fn test_draw_line_endpoints() {
        init_logger();
        let mut canvas = Canvas::new();
        canvas.set_tool(ToolKind::Line);
        drag(&mut canvas, (10.0, 10.0), (50.0, 80.0));
        let shape = &canvas.document().shapes[0];
        assert_eq!(
            shape.endpoints(),
            Some((Point::new(10.0, 10.0), Point::new(50.0, 80.0)))
        );
    }

    #[test]
    fn test_pen_path() {
        init_logger();
        let mut canvas = Canvas::new();
        canvas.set_tool(ToolKind::Pen);
        canvas.handle_pointer(PointerEvent::pressed(0.0, 0.0));
        canvas.handle_pointer(PointerEvent::moved(5.0, 5.0));
        canvas.handle_pointer(PointerEvent::moved(10.0, 0.0));
        assert_eq!(canvas.pending_stroke().map(|p| p.len()), Some(3));
        canvas.handle_pointer(PointerEvent::released(10.0, 0.0));

        assert_eq!(canvas.document().paths.len(), 1);
        assert_eq!(canvas.document().paths[0].points, vec![0.0, 0.0, 5.0, 5.0, 10.0, 0.0]);
        assert_eq!(canvas.history().len(), 2);
    }

    #[test]
    fn test_pen_click_discarded() {
        init_logger();
        let mut canvas = Canvas::new();
        canvas.set_tool(ToolKind::Pen);
        drag(&mut canvas, (4.0, 4.0), (4.0, 4.0));
        assert!(canvas.document().paths.is_empty());
        assert_eq!(canvas.history().len(), 1);
    }

    #[test]
    fn test_drag_moves_shape() {
        init_logger();
        let mut canvas = Canvas::new();
        let id = canvas.add_shape(Shape::rectangle(0.0, 0.0, 100.0, 100.0));
        let entries = canvas.history().len();

        drag(&mut canvas, (50.0, 50.0), (70.0, 70.0));

        let shape = canvas.document().shape(id).unwrap();
        assert!((shape.x - 20.0).abs() < f64::EPSILON);
        assert!((shape.y - 20.0).abs() < f64::EPSILON);
        assert!(canvas.is_selected(id));
        assert_eq!(canvas.history().len(), entries + 1);
    }

    #[test]
    fn test_click_select_without_move_does_not_commit() {
        init_logger();
        let mut canvas = Canvas::new();
        let id = canvas.add_shape(Shape::rectangle(0.0, 0.0, 100.0, 100.0));
        let entries = canvas.history().len();
        drag(&mut canvas, (50.0, 50.0), (50.0, 50.0));
        assert!(canvas.is_selected(id));
        assert_eq!(canvas.history().len(), entries);
    }

    #[test]
    fn test_drag_respects_viewport() {
        init_logger();
        let mut canvas = Canvas::new();
        let id = canvas.add_shape(Shape::rectangle(0.0, 0.0, 100.0, 100.0));
        canvas.viewport.set_scale(2.0);
        canvas.viewport.offset = Vec2::new(10.0, 10.0);

        // Client (110, 110) is canvas (50, 50); 40px on screen is 20 canvas units.
        drag(&mut canvas, (110.0, 110.0), (150.0, 150.0));
        assert_eq!(canvas.document().shape(id).unwrap().origin(), Point::new(20.0, 20.0));
    }

    #[test]
    fn test_drag_snaps_and_guides_clear() {
        init_logger();
        let mut canvas = Canvas::new();
        canvas.add_shape(Shape::rectangle(0.0, 0.0, 100.0, 100.0));
        let id = canvas.add_shape(Shape::rectangle(200.0, 0.0, 50.0, 50.0));

        canvas.handle_pointer(PointerEvent::pressed(210.0, 10.0));
        // Unsnapped origin would be (103, 0); 100 is A's right edge.
        canvas.handle_pointer(PointerEvent::moved(113.0, 10.0));
        assert_eq!(canvas.document().shape(id).unwrap().origin(), Point::new(100.0, 0.0));
        assert!(canvas.guides().iter().any(|g| g.is_temp));

        canvas.handle_pointer(PointerEvent::released(113.0, 10.0));
        assert!(canvas.guides().is_empty());
    }

    #[test]
    fn test_multi_drag_preserves_offsets() {
        init_logger();
        let mut canvas = Canvas::new();
        let a = canvas.add_shape(Shape::rectangle(0.0, 0.0, 10.0, 10.0));
        let b = canvas.add_shape(Shape::rectangle(300.0, 300.0, 10.0, 10.0));
        canvas.select(a);
        canvas.add_to_selection(b);
        let entries = canvas.history().len();

        drag(&mut canvas, (5.0, 5.0), (45.0, 25.0));
        assert_eq!(canvas.document().shape(a).unwrap().origin(), Point::new(40.0, 20.0));
        assert_eq!(canvas.document().shape(b).unwrap().origin(), Point::new(340.0, 320.0));
        assert_eq!(canvas.history().len(), entries + 1);
    }

    #[test]
    fn test_selection_rules() {
        init_logger();
        let mut canvas = Canvas::new();
        let a = canvas.add_shape(Shape::rectangle(0.0, 0.0, 10.0, 10.0));
        let b = canvas.add_shape(Shape::rectangle(100.0, 0.0, 10.0, 10.0));

        drag(&mut canvas, (5.0, 5.0), (5.0, 5.0));
        assert_eq!(canvas.selection().ids(), &[a]);

        canvas.handle_pointer(PointerEvent::pressed(105.0, 5.0).with_modifiers(Modifiers::SHIFT));
        canvas.handle_pointer(PointerEvent::released(105.0, 5.0));
        assert_eq!(canvas.selection().len(), 2);

        canvas.handle_pointer(PointerEvent::pressed(500.0, 500.0).with_modifiers(Modifiers::SHIFT));
        canvas.handle_pointer(PointerEvent::released(500.0, 500.0));
        assert_eq!(canvas.selection().len(), 2);

        drag(&mut canvas, (105.0, 5.0), (105.0, 5.0));
        assert_eq!(canvas.selection().len(), 2, "clicking a selected shape keeps the group");

        drag(&mut canvas, (500.0, 500.0), (500.0, 500.0));
        assert!(canvas.selection().is_empty());
        assert!(!canvas.is_selected(b));
    }

    #[test]
    fn test_select_path() {
        init_logger();
        let mut canvas = Canvas::new();
        let path = InkPath::from_points(
            &[Point::new(0.0, 0.0), Point::new(100.0, 0.0)],
            SerializableColor::black(),
            4.0,
        );
        let id = path.id;
        canvas.add_path(path);
        drag(&mut canvas, (50.0, 1.0), (80.0, 40.0));
        assert!(canvas.is_selected(id));
        assert_eq!(canvas.document().paths[0].points, vec![0.0, 0.0, 100.0, 0.0]);
    }

    #[test]
    fn test_resize_corner_handle() {
        init_logger();
        let mut canvas = Canvas::new();
        let id = canvas.add_shape(Shape::rectangle(0.0, 0.0, 100.0, 100.0));
        canvas.select(id);
        let entries = canvas.history().len();

        canvas.handle_pointer(PointerEvent::pressed(100.0, 100.0));
        assert!(matches!(
            canvas.session(),
            Session::Resizing { handle: ResizeHandle::Se, .. }
        ));
        canvas.handle_pointer(PointerEvent::moved(150.0, 120.0));
        canvas.handle_pointer(PointerEvent::released(150.0, 120.0));

        let shape = canvas.document().shape(id).unwrap();
        assert_eq!(shape.origin(), Point::ZERO);
        assert_eq!(shape.size(), Some((150.0, 120.0)));
        assert_eq!(canvas.history().len(), entries + 1);
    }

    #[test]
    fn test_resize_top_edge_moves_origin() {
        init_logger();
        let mut canvas = Canvas::new();
        let id = canvas.add_shape(Shape::rectangle(0.0, 0.0, 100.0, 100.0));
        canvas.select(id);
        drag(&mut canvas, (50.0, 0.0), (70.0, -20.0));

        let shape = canvas.document().shape(id).unwrap();
        assert_eq!(shape.origin(), Point::new(0.0, -20.0));
        assert_eq!(shape.size(), Some((100.0, 120.0)));
    }

    #[test]
    fn test_erase_two_overlapping_shapes() {
        init_logger();
        let mut canvas = Canvas::new();
        let a = canvas.add_shape(Shape::rectangle(0.0, 0.0, 100.0, 100.0));
        let b = canvas.add_shape(Shape::rectangle(50.0, 50.0, 100.0, 100.0));
        let entries = canvas.history().len();
        canvas.set_tool(ToolKind::Eraser);

        canvas.handle_pointer(PointerEvent::pressed(75.0, 75.0));
        canvas.handle_pointer(PointerEvent::moved(80.0, 80.0));
        assert_eq!(canvas.session().touched_ids().len(), 2);
        for id in [a, b] {
            let opacity = canvas.document().shape(id).unwrap().opacity;
            assert!((opacity - 0.5).abs() < f64::EPSILON, "faded exactly once");
        }

        canvas.handle_pointer(PointerEvent::released(80.0, 80.0));
        assert!(canvas.document().shapes.is_empty());
        assert_eq!(canvas.history().len(), entries + 1);
        assert!(canvas.session().touched_ids().is_empty());
    }

    #[test]
    fn test_erase_sweep_over_path() {
        init_logger();
        let mut canvas = Canvas::new();
        canvas.add_path(InkPath::from_points(
            &[Point::new(0.0, 50.0), Point::new(100.0, 50.0)],
            SerializableColor::black(),
            4.0,
        ));
        canvas.set_tool(ToolKind::Eraser);
        canvas.handle_pointer(PointerEvent::pressed(50.0, 0.0));
        canvas.handle_pointer(PointerEvent::moved(50.0, 51.0));
        assert_eq!(canvas.document().paths[0].opacity, Some(0.5));
        canvas.handle_pointer(PointerEvent::released(50.0, 100.0));
        assert!(canvas.document().paths.is_empty());
    }

    #[test]
    fn test_escape_restores_erased_opacity() {
        init_logger();
        let mut canvas = Canvas::new();
        let id = canvas.add_shape(Shape::rectangle(0.0, 0.0, 100.0, 100.0));
        canvas.set_tool(ToolKind::Eraser);
        canvas.handle_pointer(PointerEvent::pressed(10.0, 10.0));
        assert!(canvas.key_down(Key::Escape));
        assert!(canvas.session().is_idle());
        assert!((canvas.document().shape(id).unwrap().opacity - 1.0).abs() < f64::EPSILON);

        // The release after a cancel deletes nothing.
        canvas.handle_pointer(PointerEvent::released(10.0, 10.0));
        assert_eq!(canvas.document().shapes.len(), 1);
    }

    #[test]
    fn test_escape_cancels_drag() {
        init_logger();
        let mut canvas = Canvas::new();
        let id = canvas.add_shape(Shape::rectangle(0.0, 0.0, 100.0, 100.0));
        canvas.handle_pointer(PointerEvent::pressed(50.0, 50.0));
        canvas.handle_pointer(PointerEvent::moved(90.0, 90.0));
        canvas.key_down(Key::Escape);
        assert_eq!(canvas.document().shape(id).unwrap().origin(), Point::ZERO);
        assert!(canvas.selection().is_empty());
    }

    #[test]
    fn test_pan_updates_offset() {
        init_logger();
        let mut canvas = Canvas::new();
        canvas.set_tool(ToolKind::Pan);
        canvas.handle_pointer(PointerEvent::pressed(0.0, 0.0));
        canvas.handle_pointer(PointerEvent::moved(10.0, 15.0));
        canvas.handle_pointer(PointerEvent::moved(30.0, 40.0));
        canvas.handle_pointer(PointerEvent::released(30.0, 40.0));
        assert_eq!(canvas.viewport.offset, Vec2::new(30.0, 40.0));
        assert!(canvas.session().is_idle());
        assert!(canvas.document().is_empty());
    }

    #[test]
    fn test_text_tool_opens_editor() {
        init_logger();
        let mut canvas = Canvas::new();
        canvas.set_tool(ToolKind::Text);
        canvas.handle_pointer(PointerEvent::pressed(40.0, 30.0));
        assert!(canvas.session().is_idle());
        assert_eq!(
            canvas.text_edit(),
            Some(&TextEditRequest::create(Point::new(40.0, 30.0)))
        );
        let id = canvas.commit_text("note").unwrap();
        canvas.handle_pointer(PointerEvent::released(40.0, 30.0));

        canvas.handle_pointer(PointerEvent::pressed(41.0, 31.0));
        assert_eq!(canvas.text_edit().and_then(|r| r.existing), Some(id));
    }

    #[test]
    fn test_delete_key() {
        init_logger();
        let mut canvas = Canvas::new();
        let id = canvas.add_shape(Shape::rectangle(0.0, 0.0, 100.0, 100.0));
        assert!(!canvas.key_down(Key::Delete));
        canvas.select(id);
        assert!(canvas.key_down(Key::Delete));
        assert!(canvas.document().is_empty());
        assert!(canvas.selection().is_empty());
    }

    #[test]
    fn test_pointer_up_ends_rotation() {
        init_logger();
        let mut canvas = Canvas::new();
        let id = canvas.add_shape(Shape::rectangle(0.0, 0.0, 100.0, 100.0));
        canvas.begin_rotation(id);
        canvas.update_rotation(90.0);
        canvas.handle_pointer(PointerEvent::released(0.0, 0.0));
        assert!(canvas.session().is_idle());
        assert!(canvas.can_undo());
        canvas.undo();
        assert!(canvas.document().shape(id).unwrap().rotation.abs() < f64::EPSILON);
    }
}
