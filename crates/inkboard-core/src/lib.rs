//! Inkboard Core Library
//!
//! Platform-agnostic model, geometry and interaction logic for the Inkboard
//! infinite canvas.

pub mod canvas;
pub mod config;
pub mod document;
pub mod geometry;
pub mod history;
pub mod hit;
pub mod input;
pub mod interaction;
pub mod outline;
pub mod patch;
pub mod path;
pub mod selection;
pub mod shapes;
pub mod snap;
pub mod storage;
pub mod sync;
pub mod tools;
pub mod viewport;

pub use canvas::Canvas;
pub use config::{ConfigError, EngineConfig};
pub use document::{CanvasDocument, EntityRef};
pub use history::History;
pub use input::{Key, Modifiers, PointerEvent, PointerPhase};
pub use interaction::{Session, TextEditRequest};
pub use outline::{OutlineOptions, stroke_outline};
pub use patch::EntityPatch;
pub use path::InkPath;
pub use selection::{ResizeHandle, Selection};
pub use shapes::{EntityId, ImageFilter, SerializableColor, Shape, ShapeKind};
pub use snap::{GuideAxis, GuideLine, SnapResult};
pub use storage::{Storage, StorageError, VersionedSnapshot};
pub use sync::{ConnectionState, LoopbackCollaborator, SyncCollaborator, SyncError, SyncEvent, SyncIntent};
pub use tools::{ToolKind, ToolManager};
pub use viewport::Viewport;
