//! Reference converter pairing a text buffer with a block workspace.
//!
//! `BlockMirror` keeps two views of one program. Text edits reach the
//! blocks and block edits reach the text only when events are not
//! suppressed, or when a block change is signalled explicitly.

use std::fmt;

use serde::Serialize;

use crate::blocks::{self, Workspace};
use crate::converter::{BidirectionalConverter, ConverterError};
use crate::editor::TextBuffer;

/// Which side of the mirror a change started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeOrigin {
    Text,
    Blocks,
}

/// Emitted to listeners whenever a change propagates between the views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeEvent {
    pub origin: ChangeOrigin,
    /// Text revision after the change
    pub revision: u64,
    /// Blocks in the workspace after the change
    pub block_count: usize,
    /// Whether the blocks were built from the text at `revision`
    pub in_sync: bool,
}

type Listener = Box<dyn FnMut(&ChangeEvent)>;

pub struct BlockMirror {
    text: TextBuffer,
    workspace: Option<Workspace>,
    /// Text revision the workspace was last built from or rendered to
    synced_revision: Option<u64>,
    listeners: Vec<Listener>,
}

impl BlockMirror {
    /// Create a mirror with an empty text buffer and an empty workspace.
    pub fn new() -> Self {
        Self {
            text: TextBuffer::empty(),
            workspace: Some(Workspace::empty()),
            synced_revision: Some(0),
            listeners: Vec::new(),
        }
    }

    /// Create a mirror whose block side was never loaded.
    ///
    /// Block operations fail with [`ConverterError::Unavailable`] and
    /// [`BidirectionalConverter::ready`] reports the missing workspace.
    pub fn unloaded() -> Self {
        Self {
            text: TextBuffer::empty(),
            workspace: None,
            synced_revision: None,
            listeners: Vec::new(),
        }
    }

    /// Register a callback invoked for every propagated change.
    pub fn add_change_listener(&mut self, listener: impl FnMut(&ChangeEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// The current block workspace, if loaded.
    pub const fn workspace(&self) -> Option<&Workspace> {
        self.workspace.as_ref()
    }

    /// The text buffer.
    pub const fn buffer(&self) -> &TextBuffer {
        &self.text
    }

    /// Whether the workspace reflects the current text.
    ///
    /// False after a suppressed `set_text`, or after blocks were imported
    /// from text other than the buffer's.
    pub fn is_synced(&self) -> bool {
        self.synced_revision == Some(self.text.revision())
    }

    fn loaded_workspace(&self) -> Result<&Workspace, ConverterError> {
        self.workspace
            .as_ref()
            .ok_or_else(|| ConverterError::Unavailable("block workspace not loaded".to_string()))
    }

    fn import(&mut self, code: &str) -> Result<(), ConverterError> {
        self.loaded_workspace()?;
        let workspace = blocks::parse(code).map_err(|e| ConverterError::Import(e.to_string()))?;
        self.workspace = Some(workspace);
        self.synced_revision = self.text.matches(code).then(|| self.text.revision());
        Ok(())
    }

    fn export(&mut self) -> Result<(), ConverterError> {
        let rendered = blocks::render(self.loaded_workspace()?);
        self.text.set_text(&rendered);
        self.synced_revision = Some(self.text.revision());
        Ok(())
    }

    fn emit(&mut self, origin: ChangeOrigin) {
        let event = ChangeEvent {
            origin,
            revision: self.text.revision(),
            block_count: self.workspace.as_ref().map_or(0, Workspace::block_count),
            in_sync: self.is_synced(),
        };
        tracing::trace!(
            origin = ?event.origin,
            revision = event.revision,
            block_count = event.block_count,
            in_sync = event.in_sync,
            "mirror change"
        );
        for listener in &mut self.listeners {
            listener(&event);
        }
    }
}

impl Default for BlockMirror {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BlockMirror {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockMirror")
            .field("text", &self.text)
            .field("workspace", &self.workspace)
            .field("synced_revision", &self.synced_revision)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl BidirectionalConverter for BlockMirror {
    fn set_text(&mut self, code: &str, suppress_events: bool) -> Result<(), ConverterError> {
        self.text.set_text(code);
        if !suppress_events {
            self.import(code)?;
            self.emit(ChangeOrigin::Text);
        }
        Ok(())
    }

    fn text(&self) -> Result<String, ConverterError> {
        Ok(self.text.text())
    }

    fn sync_blocks_from_text(
        &mut self,
        code: &str,
        suppress_events: bool,
    ) -> Result<(), ConverterError> {
        self.import(code)?;
        if !suppress_events {
            self.export()?;
            self.emit(ChangeOrigin::Blocks);
        }
        Ok(())
    }

    fn notify_blocks_changed(&mut self) -> Result<(), ConverterError> {
        self.export()?;
        self.emit(ChangeOrigin::Blocks);
        Ok(())
    }

    fn ready(&self) -> Result<(), ConverterError> {
        self.loaded_workspace().map(|_| ())
    }
}
