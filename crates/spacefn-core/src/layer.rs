// Spacefn Layer Key Map
// Static per-layer lookup tables with synthetic modifier flags

use smallvec::SmallVec;

use crate::key::codes;
use crate::Key;

/// The active key-mapping layer.
///
/// Exactly one layer is active at any time; `Standard` maps nothing
/// and every key passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Standard,
    /// Layer held behind the spacebar
    Space,
    /// Layer held behind the dot key
    Dot,
}

impl Layer {
    /// The layer activated by a given trigger key, if any
    pub fn for_trigger(key: Key) -> Option<Layer> {
        match key.code() {
            codes::SPACE => Some(Layer::Space),
            codes::DOT => Some(Layer::Dot),
            _ => None,
        }
    }

    /// The trigger key that holds this layer active
    pub fn trigger(self) -> Option<Key> {
        match self {
            Layer::Standard => None,
            Layer::Space => Some(Key(codes::SPACE)),
            Layer::Dot => Some(Key(codes::DOT)),
        }
    }
}

/// Synthetic modifier flags to wrap around an output key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Mods {
    pub alt: bool,
    pub ctrl: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Mods {
    pub const NONE: Mods = Mods {
        alt: false,
        ctrl: false,
        shift: false,
        meta: false,
    };
    pub const CTRL: Mods = Mods {
        ctrl: true,
        ..Mods::NONE
    };
    pub const META: Mods = Mods {
        meta: true,
        ..Mods::NONE
    };

    pub fn is_empty(self) -> bool {
        self == Mods::NONE
    }

    /// The modifier keys to press, in the fixed outward-in nesting
    /// order Alt, Ctrl, Shift, Meta. Callers release in reverse.
    pub fn keys(self) -> SmallVec<[Key; 4]> {
        let mut keys = SmallVec::new();
        if self.alt {
            keys.push(Key(codes::LEFT_ALT));
        }
        if self.ctrl {
            keys.push(Key(codes::LEFT_CTRL));
        }
        if self.shift {
            keys.push(Key(codes::LEFT_SHIFT));
        }
        if self.meta {
            keys.push(Key(codes::LEFT_META));
        }
        keys
    }
}

/// A layer lookup result: the output key plus the synthetic modifiers
/// to wrap around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mapped {
    pub key: Key,
    pub mods: Mods,
}

impl Mapped {
    /// A bare output key with no synthetic modifiers
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            mods: Mods::NONE,
        }
    }

    fn with(key: u16, mods: Mods) -> Option<Self> {
        Some(Self {
            key: Key(key),
            mods,
        })
    }
}

/// Look up a key in the active layer's table.
///
/// Pure per-layer lookup. Returns None when the layer does not
/// recognize the key, in which case the caller must pass the physical
/// code through unmodified with no synthetic modifiers.
///
/// `is_apple` selects the command modifier for clipboard-style combos:
/// Ctrl on PC keyboards, Meta (Command) on Apple keyboards.
pub fn map(key: Key, layer: Layer, is_apple: bool) -> Option<Mapped> {
    match layer {
        Layer::Standard => None,
        Layer::Space => map_space(key, is_apple),
        Layer::Dot => map_dot(key),
    }
}

fn map_space(key: Key, is_apple: bool) -> Option<Mapped> {
    let cmd = if is_apple { Mods::META } else { Mods::CTRL };
    match key.code() {
        // navigation
        codes::H => Mapped::with(codes::LEFT, Mods::NONE),
        codes::J => Mapped::with(codes::DOWN, Mods::NONE),
        codes::K => Mapped::with(codes::UP, Mods::NONE),
        codes::L => Mapped::with(codes::RIGHT, Mods::NONE),

        // editing
        codes::B => Mapped::with(codes::ENTER, Mods::NONE),
        codes::N => Mapped::with(codes::ESC, Mods::NONE),
        codes::M => Mapped::with(codes::BACKSPACE, Mods::NONE),
        codes::Y => Mapped::with(codes::SPACE, Mods::NONE),

        // line and page movement
        codes::U => Mapped::with(codes::HOME, Mods::NONE),
        codes::I => Mapped::with(codes::END, Mods::NONE),
        codes::O => Mapped::with(codes::HOME, Mods::NONE),
        codes::P => Mapped::with(codes::END, Mods::NONE),
        codes::COMMA => Mapped::with(codes::PAGE_DOWN, Mods::NONE),
        codes::DOT => Mapped::with(codes::PAGE_UP, Mods::NONE),

        // clipboard combos
        codes::X => Mapped::with(codes::X, cmd),
        codes::C => Mapped::with(codes::C, cmd),
        codes::V => Mapped::with(codes::V, cmd),

        // shortcuts
        codes::W => Mapped::with(codes::S, cmd),
        codes::E => Mapped::with(codes::TAB, cmd),

        // function row
        codes::A => Mapped::with(codes::F13, Mods::NONE),
        codes::S => Mapped::with(codes::F14, Mods::NONE),
        codes::D => Mapped::with(codes::F15, Mods::NONE),
        codes::F => Mapped::with(codes::F16, Mods::NONE),

        _ => None,
    }
}

fn map_dot(key: Key) -> Option<Mapped> {
    match key.code() {
        // window management
        codes::H => Mapped::with(codes::LEFT, Mods::META),
        codes::J => Mapped::with(codes::DOWN, Mods::META),
        codes::K => Mapped::with(codes::UP, Mods::META),
        codes::L => Mapped::with(codes::RIGHT, Mods::META),
        codes::F => Mapped::with(codes::F, Mods::META),
        codes::Q => Mapped::with(codes::Q, Mods::META),
        codes::B => Mapped::with(codes::ENTER, Mods::META),

        // function row on the number row
        codes::KEY_1 => Mapped::with(codes::F1, Mods::NONE),
        codes::KEY_2 => Mapped::with(codes::F2, Mods::NONE),
        codes::KEY_3 => Mapped::with(codes::F3, Mods::NONE),
        codes::KEY_4 => Mapped::with(codes::F4, Mods::NONE),
        codes::KEY_5 => Mapped::with(codes::F5, Mods::NONE),
        codes::KEY_6 => Mapped::with(codes::F6, Mods::NONE),
        codes::KEY_7 => Mapped::with(codes::F7, Mods::NONE),
        codes::KEY_8 => Mapped::with(codes::F8, Mods::NONE),
        codes::KEY_9 => Mapped::with(codes::F9, Mods::NONE),
        codes::KEY_0 => Mapped::with(codes::F10, Mods::NONE),
        codes::MINUS => Mapped::with(codes::F11, Mods::NONE),
        codes::EQUAL => Mapped::with(codes::F12, Mods::NONE),

        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_roundtrip() {
        assert_eq!(Layer::for_trigger(Key(codes::SPACE)), Some(Layer::Space));
        assert_eq!(Layer::for_trigger(Key(codes::DOT)), Some(Layer::Dot));
        assert_eq!(Layer::for_trigger(Key(codes::A)), None);
        assert_eq!(Layer::Space.trigger(), Some(Key(codes::SPACE)));
        assert_eq!(Layer::Dot.trigger(), Some(Key(codes::DOT)));
        assert_eq!(Layer::Standard.trigger(), None);
    }

    #[test]
    fn test_standard_layer_maps_nothing() {
        for code in [codes::H, codes::X, codes::KEY_1, codes::SPACE] {
            assert_eq!(map(Key(code), Layer::Standard, false), None);
        }
    }

    #[test]
    fn test_space_navigation() {
        assert_eq!(
            map(Key(codes::H), Layer::Space, false),
            Some(Mapped::plain(Key(codes::LEFT)))
        );
        assert_eq!(
            map(Key(codes::J), Layer::Space, false),
            Some(Mapped::plain(Key(codes::DOWN)))
        );
        assert_eq!(
            map(Key(codes::K), Layer::Space, false),
            Some(Mapped::plain(Key(codes::UP)))
        );
        assert_eq!(
            map(Key(codes::L), Layer::Space, false),
            Some(Mapped::plain(Key(codes::RIGHT)))
        );
    }

    #[test]
    fn test_space_clipboard_pc() {
        let copy = map(Key(codes::C), Layer::Space, false).unwrap();
        assert_eq!(copy.key, Key(codes::C));
        assert_eq!(copy.mods, Mods::CTRL);
    }

    #[test]
    fn test_space_clipboard_apple() {
        let copy = map(Key(codes::C), Layer::Space, true).unwrap();
        assert_eq!(copy.key, Key(codes::C));
        assert_eq!(copy.mods, Mods::META);
    }

    #[test]
    fn test_space_function_row() {
        assert_eq!(
            map(Key(codes::A), Layer::Space, false),
            Some(Mapped::plain(Key(codes::F13)))
        );
        assert_eq!(
            map(Key(codes::F), Layer::Space, false),
            Some(Mapped::plain(Key(codes::F16)))
        );
    }

    #[test]
    fn test_space_page_navigation() {
        assert_eq!(
            map(Key(codes::COMMA), Layer::Space, false),
            Some(Mapped::plain(Key(codes::PAGE_DOWN)))
        );
        assert_eq!(
            map(Key(codes::DOT), Layer::Space, false),
            Some(Mapped::plain(Key(codes::PAGE_UP)))
        );
    }

    #[test]
    fn test_space_unmapped() {
        assert_eq!(map(Key(codes::G), Layer::Space, false), None);
        assert_eq!(map(Key(codes::TAB), Layer::Space, false), None);
    }

    #[test]
    fn test_dot_window_management() {
        let snap = map(Key(codes::H), Layer::Dot, false).unwrap();
        assert_eq!(snap.key, Key(codes::LEFT));
        assert_eq!(snap.mods, Mods::META);
    }

    #[test]
    fn test_dot_function_row() {
        assert_eq!(
            map(Key(codes::KEY_1), Layer::Dot, false),
            Some(Mapped::plain(Key(codes::F1)))
        );
        assert_eq!(
            map(Key(codes::EQUAL), Layer::Dot, false),
            Some(Mapped::plain(Key(codes::F12)))
        );
    }

    #[test]
    fn test_mods_nesting_order() {
        let all = Mods {
            alt: true,
            ctrl: true,
            shift: true,
            meta: true,
        };
        let keys = all.keys();
        assert_eq!(
            keys.as_slice(),
            &[
                Key(codes::LEFT_ALT),
                Key(codes::LEFT_CTRL),
                Key(codes::LEFT_SHIFT),
                Key(codes::LEFT_META),
            ]
        );
        assert!(Mods::NONE.keys().is_empty());
        assert!(Mods::NONE.is_empty());
        assert!(!Mods::CTRL.is_empty());
    }
}
