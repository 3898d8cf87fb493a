// Spacefn Input Layer
// Device classification and the evdev-backed event source

mod device;
mod source;
mod vendor;

pub use device::{capabilities_of, is_keyboard, DeviceCapabilities};
pub use source::EvdevSource;
pub use vendor::{detect_profile, KeyboardProfile};
