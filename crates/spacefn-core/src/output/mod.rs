// Spacefn Output Layer
// Sink contract for emitting transformed events

mod uinput;

pub use uinput::VirtualOutput;

use crate::event::RawEvent;
use crate::{Action, Key};

/// Errors from the virtual output device.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("failed to create virtual device: {0}")]
    Create(std::io::Error),

    #[error("failed to write event: {0}")]
    Write(std::io::Error),
}

/// Synchronous sink for transformed events.
///
/// `emit` writes one key event (followed by a synchronization marker)
/// and `forward` relays a non-key event verbatim. Implementations must
/// not reorder with respect to call order.
pub trait OutputSink {
    fn emit(&mut self, key: Key, action: Action) -> Result<(), SinkError>;
    fn forward(&mut self, event: &RawEvent) -> Result<(), SinkError>;
}
