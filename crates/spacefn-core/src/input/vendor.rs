// Spacefn Input Layer - Keyboard Vendor Detection
// One-shot Apple vs PC classification at startup

/// Keyboard profile derived once at startup.
///
/// Read-only for the lifetime of the process; threads through to the
/// modifier remap table and the layer key map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardProfile {
    pub is_apple: bool,
}

/// Apple USB vendor ID
const APPLE_VENDOR_ID: u16 = 0x05ac;

/// Name patterns for Apple keyboards
const APPLE_NAME_PATTERNS: &[&str] = &["apple", "magic keyboard", "macbook", "imac"];

/// Classify a keyboard from its device identity.
///
/// The vendor ID is the most reliable signal; the name patterns catch
/// Apple keyboards behind generic USB bridges.
pub fn detect_profile(name: &str, vendor_id: u16) -> KeyboardProfile {
    if vendor_id == APPLE_VENDOR_ID {
        return KeyboardProfile { is_apple: true };
    }

    let name_lower = name.to_lowercase();
    let is_apple = APPLE_NAME_PATTERNS
        .iter()
        .any(|pattern| name_lower.contains(pattern));

    KeyboardProfile { is_apple }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_apple_by_vendor_id() {
        let profile = detect_profile("Generic Keyboard", APPLE_VENDOR_ID);
        assert!(profile.is_apple);
    }

    #[test]
    fn test_detect_apple_by_name() {
        assert!(detect_profile("Apple Magic Keyboard", 0x1234).is_apple);
        assert!(detect_profile("MacBook Internal Keyboard", 0).is_apple);
    }

    #[test]
    fn test_detect_pc() {
        assert!(!detect_profile("Logitech USB Keyboard", 0x046d).is_apple);
        assert!(!detect_profile("AT Translated Set 2 keyboard", 0).is_apple);
    }
}
