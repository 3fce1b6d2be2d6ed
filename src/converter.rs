//! The converter capability consumed by the verifier.
//!
//! A converter holds two views of the same program: a text representation
//! and a block representation. The verifier only ever drives it through
//! [`BidirectionalConverter`], so any editor that can implement these
//! operations is substitutable.

use thiserror::Error;

/// Errors a converter may raise while being driven.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConverterError {
    /// The converter is not initialised (no block workspace, missing
    /// dependency, etc).
    #[error("converter unavailable: {0}")]
    Unavailable(String),
    /// The text could not be imported into blocks.
    #[error("failed to import text into blocks: {0}")]
    Import(String),
}

/// Bidirectional text/block translation capability.
///
/// `suppress_events` mirrors the host editor convention: when set, the
/// operation updates its own side only and does not propagate a change
/// event to the other representation.
pub trait BidirectionalConverter {
    /// Replace the text representation.
    ///
    /// # Errors
    /// Returns an error if the text side rejects the content.
    fn set_text(&mut self, code: &str, suppress_events: bool) -> Result<(), ConverterError>;

    /// Read the current text representation.
    ///
    /// # Errors
    /// Returns an error if the text cannot be produced.
    fn text(&self) -> Result<String, ConverterError>;

    /// Rebuild the block representation from `code`.
    ///
    /// # Errors
    /// Returns an error if `code` cannot be imported as blocks.
    fn sync_blocks_from_text(
        &mut self,
        code: &str,
        suppress_events: bool,
    ) -> Result<(), ConverterError>;

    /// Signal that the block representation changed, as a user edit would.
    ///
    /// # Errors
    /// Returns an error if the change cannot be propagated.
    fn notify_blocks_changed(&mut self) -> Result<(), ConverterError>;

    /// Probe whether the converter can be driven at all.
    ///
    /// # Errors
    /// Returns [`ConverterError::Unavailable`] when a required part of the
    /// converter is missing.
    fn ready(&self) -> Result<(), ConverterError> {
        Ok(())
    }
}

impl<C: BidirectionalConverter + ?Sized> BidirectionalConverter for &mut C {
    fn set_text(&mut self, code: &str, suppress_events: bool) -> Result<(), ConverterError> {
        (**self).set_text(code, suppress_events)
    }

    fn text(&self) -> Result<String, ConverterError> {
        (**self).text()
    }

    fn sync_blocks_from_text(
        &mut self,
        code: &str,
        suppress_events: bool,
    ) -> Result<(), ConverterError> {
        (**self).sync_blocks_from_text(code, suppress_events)
    }

    fn notify_blocks_changed(&mut self) -> Result<(), ConverterError> {
        (**self).notify_blocks_changed()
    }

    fn ready(&self) -> Result<(), ConverterError> {
        (**self).ready()
    }
}
