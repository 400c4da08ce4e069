//! The canvas object model: ink paths and shapes in z-order.
//!
//! Array position is the z-order for both collections (later is on top).
//! Reordering is always an array move; there is no separate z-index field.

use crate::patch::EntityPatch;
use crate::path::InkPath;
use crate::shapes::{EntityId, Shape};
use kurbo::Rect;
use serde::{Deserialize, Serialize};

/// Reference to a single entity in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityRef {
    Shape(EntityId),
    Path(EntityId),
}

impl EntityRef {
    pub fn id(self) -> EntityId {
        match self {
            EntityRef::Shape(id) | EntityRef::Path(id) => id,
        }
    }
}

/// All paths and shapes on the canvas.
///
/// This is also the snapshot format: `{"paths": [...], "shapes": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanvasDocument {
    #[serde(default)]
    pub paths: Vec<InkPath>,
    #[serde(default)]
    pub shapes: Vec<Shape>,
}

impl CanvasDocument {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(paths: Vec<InkPath>, shapes: Vec<Shape>) -> Self {
        Self { paths, shapes }
    }

    /// Append a path on top of existing paths.
    pub fn add_path(&mut self, path: InkPath) {
        self.paths.push(path);
    }

    /// Append a shape on top of existing shapes.
    pub fn add_shape(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    pub fn shape(&self, id: EntityId) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id == id)
    }

    pub fn shape_mut(&mut self, id: EntityId) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|s| s.id == id)
    }

    pub fn path(&self, id: EntityId) -> Option<&InkPath> {
        self.paths.iter().find(|p| p.id == id)
    }

    pub fn path_mut(&mut self, id: EntityId) -> Option<&mut InkPath> {
        self.paths.iter_mut().find(|p| p.id == id)
    }

    /// Resolve an id to the collection it lives in.
    pub fn entity(&self, id: EntityId) -> Option<EntityRef> {
        if self.shape(id).is_some() {
            Some(EntityRef::Shape(id))
        } else if self.path(id).is_some() {
            Some(EntityRef::Path(id))
        } else {
            None
        }
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entity(id).is_some()
    }

    /// Apply a partial update. Returns `false` if the id is absent or nothing changed.
    pub fn update(&mut self, id: EntityId, patch: &EntityPatch) -> bool {
        if let Some(shape) = self.shape_mut(id) {
            return patch.apply_to_shape(shape);
        }
        if let Some(path) = self.path_mut(id) {
            return patch.apply_to_path(path);
        }
        false
    }

    /// Remove every listed entity. Returns the number actually removed.
    pub fn remove(&mut self, ids: &[EntityId]) -> usize {
        let before = self.len();
        self.shapes.retain(|s| !ids.contains(&s.id));
        self.paths.retain(|p| !ids.contains(&p.id));
        before - self.len()
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.paths.clear();
        self.shapes.clear();
    }

    /// Move a shape to the top of the z-order.
    pub fn bring_to_front(&mut self, id: EntityId) -> bool {
        let Some(pos) = self.shape_index(id) else {
            return false;
        };
        let last = self.shapes.len() - 1;
        if pos == last {
            return false;
        }
        let shape = self.shapes.remove(pos);
        self.shapes.push(shape);
        true
    }

    /// Move a shape to the bottom of the z-order.
    pub fn send_to_back(&mut self, id: EntityId) -> bool {
        match self.shape_index(id) {
            Some(pos) if pos > 0 => {
                let shape = self.shapes.remove(pos);
                self.shapes.insert(0, shape);
                true
            }
            _ => false,
        }
    }

    /// Move a shape one layer forward (towards front).
    /// Returns true if the shape was moved, false if already at front.
    pub fn bring_forward(&mut self, id: EntityId) -> bool {
        match self.shape_index(id) {
            Some(pos) if pos + 1 < self.shapes.len() => {
                self.shapes.swap(pos, pos + 1);
                true
            }
            _ => false,
        }
    }

    /// Move a shape one layer backward (towards back).
    /// Returns true if the shape was moved, false if already at back.
    pub fn send_backward(&mut self, id: EntityId) -> bool {
        match self.shape_index(id) {
            Some(pos) if pos > 0 => {
                self.shapes.swap(pos, pos - 1);
                true
            }
            _ => false,
        }
    }

    fn shape_index(&self, id: EntityId) -> Option<usize> {
        self.shapes.iter().position(|s| s.id == id)
    }

    /// Get the bounding box of all paths and shapes.
    pub fn bounds(&self) -> Option<Rect> {
        self.shapes
            .iter()
            .map(Shape::bounds)
            .chain(self.paths.iter().filter(|p| p.point_count() > 0).map(InkPath::bounds))
            .reduce(|a, b| a.union(b))
    }

    /// Check if the document is empty.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty() && self.shapes.is_empty()
    }

    /// Total number of entities.
    pub fn len(&self) -> usize {
        self.paths.len() + self.shapes.len()
    }

    /// Serialize the document to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a document from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
