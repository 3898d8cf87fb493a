// Spacefn Event Source Contract
// Normalized input events and the blocking source abstraction

use std::time::Duration;

use crate::{Action, Key};

/// A normalized key event read from the physical device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub action: Action,
}

impl KeyEvent {
    pub fn new(key: Key, action: Action) -> Self {
        Self { key, action }
    }
}

/// A non-key event (synchronization markers, misc events) carried
/// through verbatim for forwarding to the output sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEvent {
    pub event_type: u16,
    pub code: u16,
    pub value: i32,
}

/// One event read from the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceEvent {
    /// A key press/release/repeat to run through the state machine
    Key(KeyEvent),
    /// Anything else; forwarded to the sink unchanged
    Passthrough(RawEvent),
}

/// Errors from the physical event source. All of these are fatal to
/// the run loop.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to read from input device: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0} is not a keyboard")]
    NotAKeyboard(String),

    #[error("failed to grab input device: {0}")]
    Grab(std::io::Error),
}

/// Blocking source of input events.
///
/// `poll` with `None` blocks until an event arrives; with a timeout it
/// waits at most that long and returns `Ok(None)` when the wait
/// elapses. An interrupted wait (EINTR) is also reported as `Ok(None)`
/// so the caller can observe its shutdown flag.
pub trait EventSource {
    fn poll(&mut self, timeout: Option<Duration>) -> Result<Option<SourceEvent>, SourceError>;
}
