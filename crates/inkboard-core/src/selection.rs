//! Selection set and resize handles.

use crate::geometry::rect_contains;
use crate::shapes::EntityId;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Handle size in surface pixels.
pub const HANDLE_SIZE: f64 = 8.0;

/// One of the eight resize handles around a shape's un-rotated bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeHandle {
    Nw,
    Ne,
    Sw,
    Se,
    N,
    S,
    W,
    E,
}

impl ResizeHandle {
    /// All handles, corners first.
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::Nw,
        ResizeHandle::Ne,
        ResizeHandle::Sw,
        ResizeHandle::Se,
        ResizeHandle::N,
        ResizeHandle::S,
        ResizeHandle::W,
        ResizeHandle::E,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ResizeHandle::Nw => "nw",
            ResizeHandle::Ne => "ne",
            ResizeHandle::Sw => "sw",
            ResizeHandle::Se => "se",
            ResizeHandle::N => "n",
            ResizeHandle::S => "s",
            ResizeHandle::W => "w",
            ResizeHandle::E => "e",
        }
    }

    pub fn is_corner(self) -> bool {
        matches!(
            self,
            ResizeHandle::Nw | ResizeHandle::Ne | ResizeHandle::Sw | ResizeHandle::Se
        )
    }

    /// Center of this handle on the given bounds.
    pub fn position(self, bounds: Rect) -> Point {
        let c = bounds.center();
        match self {
            ResizeHandle::Nw => Point::new(bounds.x0, bounds.y0),
            ResizeHandle::Ne => Point::new(bounds.x1, bounds.y0),
            ResizeHandle::Sw => Point::new(bounds.x0, bounds.y1),
            ResizeHandle::Se => Point::new(bounds.x1, bounds.y1),
            ResizeHandle::N => Point::new(c.x, bounds.y0),
            ResizeHandle::S => Point::new(c.x, bounds.y1),
            ResizeHandle::W => Point::new(bounds.x0, c.y),
            ResizeHandle::E => Point::new(bounds.x1, c.y),
        }
    }

    /// The square covered by this handle, `size` canvas units wide.
    pub fn rect(self, bounds: Rect, size: f64) -> Rect {
        Rect::from_center_size(self.position(bounds), (size, size))
    }

    /// New bounds after dragging this handle to `point`.
    ///
    /// Corner handles move both adjacent edges; edge handles move only their
    /// own edge. Bounds are renormalized if the pointer crosses the opposite edge.
    pub fn resize(self, original: Rect, point: Point) -> Rect {
        let mut r = original;
        match self {
            ResizeHandle::Nw => {
                r.x0 = point.x;
                r.y0 = point.y;
            }
            ResizeHandle::Ne => {
                r.x1 = point.x;
                r.y0 = point.y;
            }
            ResizeHandle::Sw => {
                r.x0 = point.x;
                r.y1 = point.y;
            }
            ResizeHandle::Se => {
                r.x1 = point.x;
                r.y1 = point.y;
            }
            ResizeHandle::N => r.y0 = point.y,
            ResizeHandle::S => r.y1 = point.y,
            ResizeHandle::W => r.x0 = point.x,
            ResizeHandle::E => r.x1 = point.x,
        }
        r.abs()
    }
}

/// Find the handle of `bounds` whose square contains `point`.
///
/// `size` is in canvas units (the pixel size divided by the viewport scale).
pub fn handle_at(bounds: Rect, point: Point, size: f64) -> Option<ResizeHandle> {
    ResizeHandle::ALL
        .into_iter()
        .find(|h| rect_contains(h.rect(bounds, size), point))
}

/// The set of selected entity ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<EntityId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection with a single id.
    pub fn select(&mut self, id: EntityId) {
        self.ids.clear();
        self.ids.push(id);
    }

    /// Add to the selection; duplicates are ignored.
    pub fn add(&mut self, id: EntityId) {
        if !self.ids.contains(&id) {
            self.ids.push(id);
        }
    }

    pub fn remove(&mut self, id: EntityId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|&i| i != id);
        self.ids.len() != before
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Keep only ids for which `keep` returns true.
    pub fn retain(&mut self, keep: impl FnMut(&EntityId) -> bool) {
        self.ids.retain(keep);
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> &[EntityId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
