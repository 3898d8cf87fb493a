// Spacefn Core Library
// Key-overloading state machine and device plumbing

pub mod action;
pub mod buffer;
pub mod event;
pub mod input;
pub mod key;
pub mod layer;
pub mod machine;
pub mod output;
pub mod remap;

pub use action::Action;
pub use buffer::{Append, KeyBuffer};
pub use event::{EventSource, KeyEvent, RawEvent, SourceError, SourceEvent};
pub use input::{capabilities_of, detect_profile, is_keyboard, DeviceCapabilities, EvdevSource, KeyboardProfile};
pub use key::Key;
pub use layer::{Layer, Mapped, Mods};
pub use machine::{MachineError, State, StateMachine, DECISION_WINDOW};
pub use output::{OutputSink, SinkError, VirtualOutput};
pub use remap::remap_modifier;
