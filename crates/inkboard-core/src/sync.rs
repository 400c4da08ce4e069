//! Boundary to an external synchronization collaborator.
//!
//! The canvas forwards local mutation intents and receives authoritative
//! snapshots back. Transport and conflict resolution live on the other side
//! of [`SyncCollaborator`].

use crate::document::CanvasDocument;
use crate::patch::EntityPatch;
use crate::path::InkPath;
use crate::shapes::{EntityId, Shape};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Error,
}

/// A local mutation forwarded to the collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncIntent {
    AddPath { path: InkPath },
    AddShape { shape: Shape },
    UpdateEntity { id: EntityId, patch: EntityPatch },
    DeleteEntities { ids: Vec<EntityId> },
    ClearAll,
}

impl SyncIntent {
    /// Short name used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            SyncIntent::AddPath { .. } => "add_path",
            SyncIntent::AddShape { .. } => "add_shape",
            SyncIntent::UpdateEntity { .. } => "update_entity",
            SyncIntent::DeleteEntities { .. } => "delete_entities",
            SyncIntent::ClearAll => "clear_all",
        }
    }

    /// Apply the intent to a document. Returns whether anything changed.
    pub fn apply(&self, document: &mut CanvasDocument) -> bool {
        match self {
            SyncIntent::AddPath { path } => {
                document.add_path(path.clone());
                true
            }
            SyncIntent::AddShape { shape } => {
                document.add_shape(shape.clone());
                true
            }
            SyncIntent::UpdateEntity { id, patch } => document.update(*id, patch),
            SyncIntent::DeleteEntities { ids } => document.remove(ids) > 0,
            SyncIntent::ClearAll => {
                let changed = !document.is_empty();
                document.clear();
                changed
            }
        }
    }
}

/// Events from the collaborator, drained on the canvas event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// The authoritative state changed; replace the local model.
    StateReplaced {
        paths: Vec<InkPath>,
        shapes: Vec<Shape>,
    },
    /// The connection state changed.
    StatusChanged(ConnectionState),
}

/// Synchronization errors.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Not connected")]
    NotConnected,
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Rejected intent {intent}: {reason}")]
    Rejected { intent: &'static str, reason: String },
}

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// An external collaborator that owns the authoritative document.
///
/// Implementations must deliver events through [`SyncCollaborator::poll_events`]
/// rather than calling back into the canvas from another thread.
pub trait SyncCollaborator {
    fn connection_state(&self) -> ConnectionState;

    /// Forward a local mutation.
    fn submit(&mut self, intent: SyncIntent) -> SyncResult<()>;

    /// Drain pending events.
    fn poll_events(&mut self) -> Vec<SyncEvent>;
}

/// In-process collaborator that applies intents to its own document and
/// echoes the result back as [`SyncEvent::StateReplaced`].
#[derive(Debug, Default)]
pub struct LoopbackCollaborator {
    document: CanvasDocument,
    state: ConnectionState,
    events: Vec<SyncEvent>,
    fail_submissions: bool,
}

impl LoopbackCollaborator {
    /// Create a disconnected loopback collaborator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a connected collaborator seeded with `document`.
    pub fn connected(document: CanvasDocument) -> Self {
        let mut collaborator = Self {
            document,
            ..Self::default()
        };
        collaborator.connect();
        collaborator
    }

    pub fn connect(&mut self) {
        self.set_state(ConnectionState::Connected);
        self.push_state();
    }

    /// Enter the connecting state; submissions are not accepted yet.
    pub fn begin_connect(&mut self) {
        self.set_state(ConnectionState::Connecting);
    }

    pub fn disconnect(&mut self) {
        self.set_state(ConnectionState::Disconnected);
    }

    /// Make every following submission fail with a connection error.
    pub fn set_failing(&mut self, failing: bool) {
        self.fail_submissions = failing;
    }

    /// The authoritative document.
    pub fn document(&self) -> &CanvasDocument {
        &self.document
    }

    /// Apply a change as if it came from a remote peer.
    pub fn apply_remote(&mut self, intent: SyncIntent) {
        if intent.apply(&mut self.document) {
            self.push_state();
        }
    }

    fn set_state(&mut self, state: ConnectionState) {
        if self.state != state {
            log::info!("loopback collaborator: {:?} -> {:?}", self.state, state);
            self.state = state;
            self.events.push(SyncEvent::StatusChanged(state));
        }
    }

    fn push_state(&mut self) {
        self.events.push(SyncEvent::StateReplaced {
            paths: self.document.paths.clone(),
            shapes: self.document.shapes.clone(),
        });
    }
}

impl SyncCollaborator for LoopbackCollaborator {
    fn connection_state(&self) -> ConnectionState {
        self.state
    }

    fn submit(&mut self, intent: SyncIntent) -> SyncResult<()> {
        if self.state != ConnectionState::Connected {
            return Err(SyncError::NotConnected);
        }
        if self.fail_submissions {
            self.set_state(ConnectionState::Error);
            return Err(SyncError::Connection(format!("{} dropped", intent.name())));
        }
        intent.apply(&mut self.document);
        // Confirmations echo even no-op intents so the sender converges.
        self.push_state();
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<SyncEvent> {
        std::mem::take(&mut self.events)
    }
}
