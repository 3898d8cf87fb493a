// Spacefn Key Type
// Represents a single key code from Linux input-event-codes.h

use std::fmt;

/// Represents a single keyboard key code.
///
/// This is a newtype wrapper around u16 for type safety.
/// The numeric values match Linux input-event-codes.h definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Key(pub u16);

impl Key {
    /// Get the raw numeric code value
    pub fn code(self) -> u16 {
        self.0
    }

    /// Get the name of this key
    pub fn name(self) -> &'static str {
        key_name(self.0)
    }
}

impl From<u16> for Key {
    fn from(code: u16) -> Self {
        Key(code)
    }
}

impl From<Key> for u16 {
    fn from(key: Key) -> Self {
        key.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Key codes from input-event-codes.h used by the remap and layer tables.
pub mod codes {
    pub const ESC: u16 = 1;
    pub const KEY_1: u16 = 2;
    pub const KEY_2: u16 = 3;
    pub const KEY_3: u16 = 4;
    pub const KEY_4: u16 = 5;
    pub const KEY_5: u16 = 6;
    pub const KEY_6: u16 = 7;
    pub const KEY_7: u16 = 8;
    pub const KEY_8: u16 = 9;
    pub const KEY_9: u16 = 10;
    pub const KEY_0: u16 = 11;
    pub const MINUS: u16 = 12;
    pub const EQUAL: u16 = 13;
    pub const BACKSPACE: u16 = 14;
    pub const TAB: u16 = 15;
    pub const Q: u16 = 16;
    pub const W: u16 = 17;
    pub const E: u16 = 18;
    pub const R: u16 = 19;
    pub const T: u16 = 20;
    pub const Y: u16 = 21;
    pub const U: u16 = 22;
    pub const I: u16 = 23;
    pub const O: u16 = 24;
    pub const P: u16 = 25;
    pub const ENTER: u16 = 28;
    pub const LEFT_CTRL: u16 = 29;
    pub const A: u16 = 30;
    pub const S: u16 = 31;
    pub const D: u16 = 32;
    pub const F: u16 = 33;
    pub const G: u16 = 34;
    pub const H: u16 = 35;
    pub const J: u16 = 36;
    pub const K: u16 = 37;
    pub const L: u16 = 38;
    pub const LEFT_SHIFT: u16 = 42;
    pub const Z: u16 = 44;
    pub const X: u16 = 45;
    pub const C: u16 = 46;
    pub const V: u16 = 47;
    pub const B: u16 = 48;
    pub const N: u16 = 49;
    pub const M: u16 = 50;
    pub const COMMA: u16 = 51;
    pub const DOT: u16 = 52;
    pub const SLASH: u16 = 53;
    pub const RIGHT_SHIFT: u16 = 54;
    pub const LEFT_ALT: u16 = 56;
    pub const SPACE: u16 = 57;
    pub const CAPSLOCK: u16 = 58;
    pub const F1: u16 = 59;
    pub const F2: u16 = 60;
    pub const F3: u16 = 61;
    pub const F4: u16 = 62;
    pub const F5: u16 = 63;
    pub const F6: u16 = 64;
    pub const F7: u16 = 65;
    pub const F8: u16 = 66;
    pub const F9: u16 = 67;
    pub const F10: u16 = 68;
    pub const F11: u16 = 87;
    pub const F12: u16 = 88;
    pub const RIGHT_CTRL: u16 = 97;
    pub const SYSRQ: u16 = 99;
    pub const RIGHT_ALT: u16 = 100;
    pub const HOME: u16 = 102;
    pub const UP: u16 = 103;
    pub const PAGE_UP: u16 = 104;
    pub const LEFT: u16 = 105;
    pub const RIGHT: u16 = 106;
    pub const END: u16 = 107;
    pub const DOWN: u16 = 108;
    pub const PAGE_DOWN: u16 = 109;
    pub const LEFT_META: u16 = 125;
    pub const RIGHT_META: u16 = 126;
    pub const F13: u16 = 183;
    pub const F14: u16 = 184;
    pub const F15: u16 = 185;
    pub const F16: u16 = 186;
    pub const BRIGHTNESSDOWN: u16 = 224;
}

/// Display name for a key code
pub fn key_name(code: u16) -> &'static str {
    use codes::*;
    match code {
        ESC => "ESC",
        KEY_1 => "1",
        KEY_2 => "2",
        KEY_3 => "3",
        KEY_4 => "4",
        KEY_5 => "5",
        KEY_6 => "6",
        KEY_7 => "7",
        KEY_8 => "8",
        KEY_9 => "9",
        KEY_0 => "0",
        MINUS => "MINUS",
        EQUAL => "EQUAL",
        BACKSPACE => "BACKSPACE",
        TAB => "TAB",
        Q => "Q",
        W => "W",
        E => "E",
        R => "R",
        T => "T",
        Y => "Y",
        U => "U",
        I => "I",
        O => "O",
        P => "P",
        ENTER => "ENTER",
        LEFT_CTRL => "LEFT_CTRL",
        A => "A",
        S => "S",
        D => "D",
        F => "F",
        G => "G",
        H => "H",
        J => "J",
        K => "K",
        L => "L",
        LEFT_SHIFT => "LEFT_SHIFT",
        Z => "Z",
        X => "X",
        C => "C",
        V => "V",
        B => "B",
        N => "N",
        M => "M",
        COMMA => "COMMA",
        DOT => "DOT",
        SLASH => "SLASH",
        RIGHT_SHIFT => "RIGHT_SHIFT",
        LEFT_ALT => "LEFT_ALT",
        SPACE => "SPACE",
        CAPSLOCK => "CAPSLOCK",
        F1 => "F1",
        F2 => "F2",
        F3 => "F3",
        F4 => "F4",
        F5 => "F5",
        F6 => "F6",
        F7 => "F7",
        F8 => "F8",
        F9 => "F9",
        F10 => "F10",
        F11 => "F11",
        F12 => "F12",
        RIGHT_CTRL => "RIGHT_CTRL",
        SYSRQ => "SYSRQ",
        RIGHT_ALT => "RIGHT_ALT",
        HOME => "HOME",
        UP => "UP",
        PAGE_UP => "PAGE_UP",
        LEFT => "LEFT",
        RIGHT => "RIGHT",
        END => "END",
        DOWN => "DOWN",
        PAGE_DOWN => "PAGE_DOWN",
        LEFT_META => "LEFT_META",
        RIGHT_META => "RIGHT_META",
        F13 => "F13",
        F14 => "F14",
        F15 => "F15",
        F16 => "F16",
        BRIGHTNESSDOWN => "BRIGHTNESSDOWN",
        _ => "UNKNOWN",
    }
}
