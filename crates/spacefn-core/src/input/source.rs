// Spacefn Input Layer - Evdev Event Source
// Blocking and bounded reads from one grabbed physical device

use std::collections::VecDeque;
use std::os::unix::io::AsRawFd;
use std::path::Path;
use std::time::Duration;

use evdev::{Device, EventType};
use log::debug;

use super::device::{capabilities_of, is_keyboard};
use super::vendor::{detect_profile, KeyboardProfile};
use crate::event::{EventSource, KeyEvent, RawEvent, SourceError, SourceEvent};
use crate::{Action, Key};

/// Event source backed by one physical evdev device.
///
/// Events are fetched in batches from the kernel and handed out one at
/// a time, so caller-visible ordering matches arrival order exactly.
pub struct EvdevSource {
    device: Device,
    pending: VecDeque<SourceEvent>,
    grabbed: bool,
}

impl EvdevSource {
    /// Open a device node and verify it is a keyboard.
    ///
    /// Non-keyboard devices (mice, touchpads, consumer-control nodes)
    /// are rejected before any grab is attempted.
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let device = Device::open(path)?;

        let caps = capabilities_of(&device);
        if !is_keyboard(&caps) {
            return Err(SourceError::NotAKeyboard(path.display().to_string()));
        }

        debug!(
            "opened {} ({}, {} keys)",
            path.display(),
            device.name().unwrap_or("Unknown"),
            caps.supported_keys.len()
        );

        Ok(Self {
            device,
            pending: VecDeque::new(),
            grabbed: false,
        })
    }

    /// Grab the device so the original events never reach the system.
    ///
    /// Ungrabs first to recover cleanly if a previous instance crashed
    /// while holding the grab.
    pub fn grab(&mut self) -> Result<(), SourceError> {
        let _ = self.device.ungrab();
        self.device.grab().map_err(SourceError::Grab)?;
        self.grabbed = true;
        Ok(())
    }

    /// Release the grab (also runs on drop)
    pub fn ungrab(&mut self) {
        if self.grabbed {
            let _ = self.device.ungrab();
            self.grabbed = false;
        }
    }

    /// Device name as reported by the kernel
    pub fn name(&self) -> &str {
        self.device.name().unwrap_or("Unknown")
    }

    /// Classify the keyboard from its vendor identity and name
    pub fn profile(&self) -> KeyboardProfile {
        detect_profile(self.name(), self.device.input_id().vendor())
    }

    fn convert(event: evdev::InputEvent) -> SourceEvent {
        if event.event_type() == EventType::KEY {
            if let Some(action) = Action::from_i32(event.value()) {
                return SourceEvent::Key(KeyEvent::new(Key::from(event.code()), action));
            }
        }
        SourceEvent::Passthrough(RawEvent {
            event_type: event.event_type().0,
            code: event.code(),
            value: event.value(),
        })
    }

    fn fill_pending(&mut self) -> Result<(), SourceError> {
        let events = self.device.fetch_events()?;
        for event in events {
            self.pending.push_back(Self::convert(event));
        }
        Ok(())
    }
}

/// Convert a bounded wait into a poll(2) timeout, rounding partial
/// milliseconds up. Callers treat an empty bounded wait as their
/// deadline firing, so expiring even a fraction early would cut the
/// decision window short.
fn poll_timeout_ms(timeout: Option<Duration>) -> i32 {
    match timeout {
        Some(d) => d.as_nanos().div_ceil(1_000_000).min(i32::MAX as u128) as i32,
        None => -1,
    }
}

impl EventSource for EvdevSource {
    fn poll(&mut self, timeout: Option<Duration>) -> Result<Option<SourceEvent>, SourceError> {
        if let Some(event) = self.pending.pop_front() {
            return Ok(Some(event));
        }

        let timeout_ms = poll_timeout_ms(timeout);

        let mut pollfd = libc::pollfd {
            fd: self.device.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        };

        let ready = unsafe { libc::poll(&mut pollfd, 1, timeout_ms) };
        if ready < 0 {
            let err = std::io::Error::last_os_error();
            // EINTR means a signal arrived (e.g. Ctrl+C); report it as
            // an empty wait so the caller can check its shutdown flag.
            if err.raw_os_error() == Some(libc::EINTR) {
                return Ok(None);
            }
            return Err(SourceError::Io(err));
        }
        if ready == 0 {
            return Ok(None);
        }

        self.fill_pending()?;
        Ok(self.pending.pop_front())
    }
}

// The grab MUST be released when the source goes away, including
// during panic unwinding, or the physical keyboard stays dead.
impl Drop for EvdevSource {
    fn drop(&mut self) {
        self.ungrab();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_timeout_blocks_indefinitely() {
        assert_eq!(poll_timeout_ms(None), -1);
    }

    #[test]
    fn whole_milliseconds_pass_through() {
        assert_eq!(poll_timeout_ms(Some(Duration::from_millis(200))), 200);
    }

    #[test]
    fn partial_milliseconds_round_up() {
        assert_eq!(poll_timeout_ms(Some(Duration::from_micros(1500))), 2);
        assert_eq!(poll_timeout_ms(Some(Duration::from_nanos(1))), 1);
    }

    #[test]
    fn oversized_waits_clamp_to_poll_max() {
        assert_eq!(poll_timeout_ms(Some(Duration::MAX)), i32::MAX);
    }
}
