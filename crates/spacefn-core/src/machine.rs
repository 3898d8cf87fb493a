// Spacefn State Machine Controller
// Tap-vs-hold disambiguation under a bounded decision window

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::buffer::{Append, KeyBuffer};
use crate::event::{EventSource, KeyEvent, SourceError, SourceEvent};
use crate::input::KeyboardProfile;
use crate::key::codes;
use crate::layer::{self, Layer, Mapped, Mods};
use crate::output::{OutputSink, SinkError};
use crate::remap::remap_modifier;
use crate::{Action, Key};

/// How long a held trigger waits for a qualifying event before the
/// layer shifts anyway.
pub const DECISION_WINDOW: Duration = Duration::from_millis(200);

/// Pressing this key halts the process from any state. Kept out of the
/// layer tables so the maps stay pure.
const ESCAPE_HATCH: Key = Key(codes::BRIGHTNESSDOWN);

/// Controller state. Exactly one is active; transitions are the only
/// place the layer and buffer are reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Forwarding everything, watching for a trigger press
    Idle,
    /// Trigger held, tap-vs-hold not yet decided
    Deciding,
    /// Trigger acting as a live layer modifier
    Shifted,
}

#[derive(Debug, thiserror::Error)]
pub enum MachineError {
    #[error("input device error: {0}")]
    Source(#[from] SourceError),

    #[error("output device error: {0}")]
    Sink(#[from] SinkError),
}

/// Result of one blocking wait.
enum Wait {
    Key(KeyEvent),
    TimedOut,
    Interrupted,
}

/// Whether a state handler wants the run loop to keep going.
#[derive(PartialEq)]
enum Flow {
    Continue,
    Halt,
}

/// The event-classification state machine.
///
/// Owns all mutable state (current state, active layer, key buffer)
/// and drives the source and sink from a single thread. Every physical
/// press is guaranteed a balanced press/release on the sink by the
/// time the machine returns to [`State::Idle`].
pub struct StateMachine<S, O> {
    source: S,
    sink: O,
    is_apple: bool,
    state: State,
    layer: Layer,
    buffer: KeyBuffer,
    window: Duration,
    shutdown: Arc<AtomicBool>,
}

impl<S: EventSource, O: OutputSink> StateMachine<S, O> {
    pub fn new(source: S, sink: O, profile: KeyboardProfile, shutdown: Arc<AtomicBool>) -> Self {
        Self {
            source,
            sink,
            is_apple: profile.is_apple,
            state: State::Idle,
            layer: Layer::Standard,
            buffer: KeyBuffer::new(),
            window: DECISION_WINDOW,
            shutdown,
        }
    }

    /// Override the decision window (used by tests)
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn layer(&self) -> Layer {
        self.layer
    }

    /// The output sink, for inspection after a run
    pub fn sink(&self) -> &O {
        &self.sink
    }

    /// Run until the escape hatch is pressed, the shutdown flag is
    /// set, or a device error occurs.
    pub fn run(&mut self) -> Result<(), MachineError> {
        while !self.shutdown.load(Ordering::SeqCst) {
            debug!("state {:?}", self.state);
            let flow = match self.state {
                State::Idle => self.run_idle()?,
                State::Deciding => self.run_deciding()?,
                State::Shifted => self.run_shifted()?,
            };
            if flow == Flow::Halt {
                break;
            }
        }
        Ok(())
    }

    /// Forward everything unchanged until a trigger key goes down.
    fn run_idle(&mut self) -> Result<Flow, MachineError> {
        loop {
            let event = match self.wait(None)? {
                Wait::Key(event) => event,
                _ => return Ok(Flow::Continue),
            };
            let key = remap_modifier(event.key, self.is_apple);

            if key == ESCAPE_HATCH && event.action.just_pressed() {
                info!("escape hatch pressed, halting");
                return Ok(Flow::Halt);
            }

            if event.action.just_pressed() {
                if let Some(layer) = Layer::for_trigger(key) {
                    // Suppress the press; its fate depends on what
                    // happens inside the decision window.
                    debug!("trigger {} down, entering decision window", key);
                    self.layer = layer;
                    self.state = State::Deciding;
                    return Ok(Flow::Continue);
                }
            }

            self.sink.emit(key, event.action)?;
        }
    }

    /// Wait out the decision window, buffering presses, until the
    /// trigger tap or a hold is confirmed.
    fn run_deciding(&mut self) -> Result<Flow, MachineError> {
        self.buffer.clear();
        let Some(trigger) = self.layer.trigger() else {
            // Deciding is only ever entered from a trigger press
            self.state = State::Idle;
            return Ok(Flow::Continue);
        };
        let deadline = Instant::now() + self.window;

        loop {
            let event = match self.wait(Some(deadline))? {
                Wait::Key(event) => event,
                Wait::TimedOut => {
                    debug!("decision window elapsed, shifting to {:?}", self.layer);
                    self.state = State::Shifted;
                    self.reconcile_buffer()?;
                    return Ok(Flow::Continue);
                }
                Wait::Interrupted => return Ok(Flow::Continue),
            };
            let key = remap_modifier(event.key, self.is_apple);

            if key == ESCAPE_HATCH && event.action.just_pressed() {
                info!("escape hatch pressed, halting");
                return Ok(Flow::Halt);
            }

            match event.action {
                Action::Press => {
                    if self.buffer.append(key) == Append::Full {
                        // The key still reaches the output through the
                        // unmapped path once its release arrives.
                        warn!("key buffer full, {} not buffered", key);
                    }
                }
                // Repeats never qualify and are never buffered.
                Action::Repeat => {}
                Action::Release if key == trigger => {
                    // Tap: the trigger acts as itself, then the keys
                    // pressed during the window land in order with
                    // their physical identity.
                    debug!("trigger {} tapped", trigger);
                    self.sink.emit(trigger, Action::Press)?;
                    self.sink.emit(trigger, Action::Release)?;
                    for key in self.buffer.take() {
                        self.sink.emit(key, Action::Press)?;
                    }
                    self.layer = Layer::Standard;
                    self.state = State::Idle;
                    return Ok(Flow::Continue);
                }
                Action::Release if self.buffer.remove(key) => {
                    // Hold confirmed: the released key fires through
                    // the layer as a complete wrapped tap.
                    debug!("hold confirmed by {} release", key);
                    let mapped = layer::map(key, self.layer, self.is_apple)
                        .unwrap_or(Mapped::plain(key));
                    self.emit_wrapped_tap(mapped)?;
                    self.state = State::Shifted;
                    self.reconcile_buffer()?;
                    return Ok(Flow::Continue);
                }
                Action::Release => {
                    // Pressed before the window opened; let it finish.
                    self.sink.emit(key, Action::Release)?;
                }
            }
        }
    }

    /// Map everything live through the layer until the trigger is
    /// released.
    fn run_shifted(&mut self) -> Result<Flow, MachineError> {
        let Some(trigger) = self.layer.trigger() else {
            self.state = State::Idle;
            return Ok(Flow::Continue);
        };

        loop {
            let event = match self.wait(None)? {
                Wait::Key(event) => event,
                _ => return Ok(Flow::Continue),
            };
            let key = remap_modifier(event.key, self.is_apple);

            if key == ESCAPE_HATCH && event.action.just_pressed() {
                info!("escape hatch pressed, halting");
                return Ok(Flow::Halt);
            }

            if key == trigger {
                if event.action.is_released() {
                    // Flush releases for every outstanding virtual
                    // press before leaving the layer.
                    debug!("trigger {} up, leaving {:?}", trigger, self.layer);
                    for key in self.buffer.take() {
                        self.sink.emit(key, Action::Release)?;
                    }
                    self.layer = Layer::Standard;
                    self.state = State::Idle;
                    return Ok(Flow::Continue);
                }
                // Held trigger repeats are swallowed
                continue;
            }

            match layer::map(key, self.layer, self.is_apple) {
                Some(mapped) => match event.action {
                    Action::Press => match self.buffer.append(mapped.key) {
                        Append::Added => self.emit_wrapped_press(mapped)?,
                        // Another physical key already holds this
                        // output code down; a second press would owe
                        // a second release nothing ever emits.
                        Append::Duplicate => {}
                        Append::Full => {
                            warn!("key buffer full, {} dropped", mapped.key);
                        }
                    },
                    Action::Release => {
                        // Only keys with an outstanding virtual press
                        // owe a release.
                        if self.buffer.remove(mapped.key) {
                            self.sink.emit(mapped.key, Action::Release)?;
                        }
                    }
                    Action::Repeat => {
                        // A wrapped press already closed its modifier
                        // burst, so a bare repeat of the output code
                        // would fire without the modifier held.
                        if mapped.mods == Mods::NONE {
                            self.sink.emit(mapped.key, Action::Repeat)?;
                        }
                    }
                },
                None => self.sink.emit(key, event.action)?,
            }
        }
    }

    /// Re-derive the buffer on the Deciding -> Shifted transition.
    ///
    /// Buffered codes were recorded with their physical identity, but
    /// Shifted tracks mapped output codes so later releases route
    /// correctly. Each distinct mapped code gets one wrapped press;
    /// unmapped codes are emitted with their physical identity but not
    /// tracked, since their physical release arrives separately and
    /// passes through. The buffer must always reflect exactly the
    /// outstanding virtual presses owed a release, or keys end up
    /// stuck down on the virtual device.
    fn reconcile_buffer(&mut self) -> Result<(), MachineError> {
        let physical = self.buffer.take();
        for key in physical {
            match layer::map(key, self.layer, self.is_apple) {
                Some(mapped) => {
                    // Distinct physical codes can map to the same
                    // output code; only the first occurrence gets a
                    // press, since the buffer tracks the code once
                    // and the trigger flush releases it once.
                    if self.buffer.append(mapped.key) == Append::Added {
                        self.emit_wrapped_press(mapped)?;
                    }
                }
                None => {
                    self.sink.emit(key, Action::Press)?;
                }
            }
        }
        Ok(())
    }

    /// Emit a complete synthetic tap: modifiers down in nesting order,
    /// press and release of the output key, modifiers up in reverse.
    fn emit_wrapped_tap(&mut self, mapped: Mapped) -> Result<(), MachineError> {
        let mods = mapped.mods.keys();
        for &key in &mods {
            self.sink.emit(key, Action::Press)?;
        }
        self.sink.emit(mapped.key, Action::Press)?;
        self.sink.emit(mapped.key, Action::Release)?;
        for &key in mods.iter().rev() {
            self.sink.emit(key, Action::Release)?;
        }
        Ok(())
    }

    /// Emit a press with its modifier burst closed immediately: the
    /// output key stays down bare and its eventual release is emitted
    /// unwrapped. Deferring the modifier releases to the key release
    /// would strand a modifier if the trigger went up first.
    fn emit_wrapped_press(&mut self, mapped: Mapped) -> Result<(), MachineError> {
        let mods = mapped.mods.keys();
        for &key in &mods {
            self.sink.emit(key, Action::Press)?;
        }
        self.sink.emit(mapped.key, Action::Press)?;
        for &key in mods.iter().rev() {
            self.sink.emit(key, Action::Release)?;
        }
        Ok(())
    }

    /// Block for the next key event, forwarding passthrough events as
    /// they appear. With a deadline the wait is bounded; the remaining
    /// time is recomputed from the monotonic deadline on every
    /// iteration rather than carried across waits.
    fn wait(&mut self, deadline: Option<Instant>) -> Result<Wait, MachineError> {
        loop {
            if self.shutdown.load(Ordering::SeqCst) {
                return Ok(Wait::Interrupted);
            }

            let timeout = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return Ok(Wait::TimedOut);
                    }
                    Some(remaining)
                }
                None => None,
            };

            match self.source.poll(timeout)? {
                Some(SourceEvent::Key(event)) => return Ok(Wait::Key(event)),
                Some(SourceEvent::Passthrough(raw)) => {
                    self.sink.forward(&raw)?;
                }
                None => {
                    if deadline.is_some() {
                        // Elapsed (or interrupted, which we fold into
                        // the timeout path like the poll loop does).
                        return Ok(Wait::TimedOut);
                    }
                    // Interrupted blocking wait; re-check the flag.
                }
            }
        }
    }
}
