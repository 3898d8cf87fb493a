// Spacefn Modifier Remap Table
// Fixed physical-modifier substitutions applied before any layer logic

use crate::key::codes;
use crate::Key;

/// Apply the fixed modifier swap table to a physical key code.
///
/// Runs on every key event, in every state, before trigger detection
/// and layer lookup. Pure and total: unmapped codes pass through
/// unchanged.
///
/// The table:
/// - LEFT_CTRL becomes LEFT_META on every keyboard.
/// - On PC keyboards LEFT_ALT and LEFT_META swap with each other, so
///   the key adjacent to the spacebar always acts as Meta; Apple
///   keyboards already have that arrangement and are left alone.
/// - Both right-hand Meta and Alt collapse to RIGHT_SHIFT.
/// - CAPSLOCK becomes ESC.
/// - SYSRQ becomes RIGHT_ALT.
pub fn remap_modifier(key: Key, is_apple: bool) -> Key {
    let code = match key.code() {
        codes::LEFT_CTRL => codes::LEFT_META,
        codes::LEFT_ALT if !is_apple => codes::LEFT_META,
        codes::LEFT_META if !is_apple => codes::LEFT_ALT,
        codes::RIGHT_META | codes::RIGHT_ALT => codes::RIGHT_SHIFT,
        codes::CAPSLOCK => codes::ESC,
        codes::SYSRQ => codes::RIGHT_ALT,
        other => other,
    };
    Key(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_left_ctrl_becomes_meta_everywhere() {
        assert_eq!(
            remap_modifier(Key(codes::LEFT_CTRL), false),
            Key(codes::LEFT_META)
        );
        assert_eq!(
            remap_modifier(Key(codes::LEFT_CTRL), true),
            Key(codes::LEFT_META)
        );
    }

    #[test]
    fn test_alt_meta_swap_on_pc() {
        assert_eq!(
            remap_modifier(Key(codes::LEFT_ALT), false),
            Key(codes::LEFT_META)
        );
        assert_eq!(
            remap_modifier(Key(codes::LEFT_META), false),
            Key(codes::LEFT_ALT)
        );
    }

    #[test]
    fn test_alt_meta_untouched_on_apple() {
        assert_eq!(
            remap_modifier(Key(codes::LEFT_ALT), true),
            Key(codes::LEFT_ALT)
        );
        assert_eq!(
            remap_modifier(Key(codes::LEFT_META), true),
            Key(codes::LEFT_META)
        );
    }

    #[test]
    fn test_right_side_collapses_to_shift() {
        for is_apple in [false, true] {
            assert_eq!(
                remap_modifier(Key(codes::RIGHT_META), is_apple),
                Key(codes::RIGHT_SHIFT)
            );
            assert_eq!(
                remap_modifier(Key(codes::RIGHT_ALT), is_apple),
                Key(codes::RIGHT_SHIFT)
            );
        }
    }

    #[test]
    fn test_capslock_becomes_esc() {
        assert_eq!(remap_modifier(Key(codes::CAPSLOCK), false), Key(codes::ESC));
    }

    #[test]
    fn test_sysrq_becomes_right_alt() {
        assert_eq!(
            remap_modifier(Key(codes::SYSRQ), true),
            Key(codes::RIGHT_ALT)
        );
    }

    #[test]
    fn test_identity_for_ordinary_keys() {
        for code in [codes::A, codes::SPACE, codes::ENTER, codes::F5] {
            assert_eq!(remap_modifier(Key(code), false), Key(code));
            assert_eq!(remap_modifier(Key(code), true), Key(code));
        }
    }
}
