// Spacefn Output Layer - uinput Virtual Device
// Virtual device creation and key event emission

use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{AttributeSet, EventType, InputEvent};
use log::trace;

use super::{OutputSink, SinkError};
use crate::event::RawEvent;
use crate::{Action, Key};

/// Virtual uinput device for key output
pub struct VirtualOutput {
    device: VirtualDevice,
}

impl VirtualOutput {
    /// Name given to the virtual device node
    pub const DEVICE_NAME: &'static str = "spacefn (virtual) keyboard";

    /// Create a new virtual uinput device with full keyboard support.
    pub fn new() -> Result<Self, SinkError> {
        // Advertise all standard keyboard keys so any mapped or
        // passed-through code can be emitted.
        let mut keys = AttributeSet::new();
        for code in 0..256u16 {
            keys.insert(evdev::Key::new(code));
        }

        let device = VirtualDeviceBuilder::new()
            .map_err(SinkError::Create)?
            .name(Self::DEVICE_NAME)
            .with_keys(&keys)
            .map_err(SinkError::Create)?
            .build()
            .map_err(SinkError::Create)?;

        Ok(Self { device })
    }
}

impl OutputSink for VirtualOutput {
    fn emit(&mut self, key: Key, action: Action) -> Result<(), SinkError> {
        trace!("emit {} {}", key, action);
        let key_event = InputEvent::new(EventType::KEY, key.code(), action.to_i32());
        // SYN event is required for the kernel to process the key event
        let syn_event = InputEvent::new(EventType::SYNCHRONIZATION, 0, 0);
        self.device
            .emit(&[key_event, syn_event])
            .map_err(SinkError::Write)
    }

    fn forward(&mut self, event: &RawEvent) -> Result<(), SinkError> {
        let raw = InputEvent::new(EventType(event.event_type), event.code, event.value);
        self.device.emit(&[raw]).map_err(SinkError::Write)
    }
}
