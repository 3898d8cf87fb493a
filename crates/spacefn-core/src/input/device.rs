// Spacefn Input Layer - Device Detection
// Device capability analysis and keyboard detection

use std::collections::HashSet;

use evdev::{Device, EventType};

/// Device capabilities extracted from an evdev device
#[derive(Debug, Clone)]
pub struct DeviceCapabilities {
    /// Whether the device supports EV_KEY events
    pub has_ev_key: bool,
    /// List of supported key codes (EV_KEY capability codes)
    pub supported_keys: Vec<u16>,
}

impl DeviceCapabilities {
    pub fn new(has_ev_key: bool, supported_keys: Vec<u16>) -> Self {
        Self {
            has_ev_key,
            supported_keys,
        }
    }

    /// Check if a specific key code is supported
    pub fn supports_key(&self, key_code: u16) -> bool {
        self.supported_keys.contains(&key_code)
    }
}

// QWERTY row key codes: Q, W, E, R, T, Y
const QWERTY_CODES: &[u16] = &[16, 17, 18, 19, 20, 21];

// Representative A-Z and SPACE codes for keyboard detection
const A_Z_SPACE_CODES: &[u16] = &[57, 30, 44]; // SPACE, A, Z

/// Determine if a device is a keyboard based on its capabilities.
///
/// A device is considered a keyboard if:
/// 1. It supports EV_KEY events
/// 2. All QWERTY row keys (Q, W, E, R, T, Y) are present
/// 3. Representative A-Z keys (A, Z) and SPACE are present
pub fn is_keyboard(capabilities: &DeviceCapabilities) -> bool {
    if !capabilities.has_ev_key {
        return false;
    }

    let key_set: HashSet<u16> = capabilities.supported_keys.iter().copied().collect();

    let qwerty_present = QWERTY_CODES.iter().all(|code| key_set.contains(code));
    let az_present = A_Z_SPACE_CODES.iter().all(|code| key_set.contains(code));

    qwerty_present && az_present
}

/// Extract capabilities from an opened evdev device.
pub fn capabilities_of(device: &Device) -> DeviceCapabilities {
    let has_ev_key = device.supported_events().contains(EventType::KEY);
    let supported_keys = device
        .supported_keys()
        .map(|keys| keys.iter().map(|k| k.code()).collect())
        .unwrap_or_default();
    DeviceCapabilities::new(has_ev_key, supported_keys)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keyboard_caps() -> DeviceCapabilities {
        let mut keys = vec![0];
        keys.extend_from_slice(QWERTY_CODES);
        keys.extend_from_slice(A_Z_SPACE_CODES);
        keys.extend_from_slice(&[2, 3, 4, 5, 6, 7, 8, 9, 10, 11]); // Numbers
        keys.extend_from_slice(&[14, 15, 28, 29, 42, 56]); // BACKSPACE, TAB, ENTER, CTRL, SHIFT, ALT
        DeviceCapabilities::new(true, keys)
    }

    #[test]
    fn test_is_keyboard_with_full_keyboard() {
        let caps = make_keyboard_caps();
        assert!(is_keyboard(&caps));
    }

    #[test]
    fn test_is_keyboard_without_qwerty() {
        let mut keys = vec![0];
        keys.extend_from_slice(A_Z_SPACE_CODES);
        let caps = DeviceCapabilities::new(true, keys);
        assert!(!is_keyboard(&caps));
    }

    #[test]
    fn test_is_keyboard_without_az() {
        let mut keys = vec![0];
        keys.extend_from_slice(QWERTY_CODES);
        let caps = DeviceCapabilities::new(true, keys);
        assert!(!is_keyboard(&caps));
    }

    #[test]
    fn test_is_keyboard_with_no_ev_key() {
        let caps = DeviceCapabilities::new(false, vec![]);
        assert!(!is_keyboard(&caps));
    }

    #[test]
    fn test_is_keyboard_mouse_device() {
        // Mouse has BTN_LEFT, BTN_RIGHT but no letter keys
        let caps = DeviceCapabilities::new(true, vec![272, 273, 274]);
        assert!(!is_keyboard(&caps));
    }

    #[test]
    fn test_supports_key() {
        let caps = DeviceCapabilities::new(true, vec![16, 30, 57]);
        assert!(caps.supports_key(16));
        assert!(!caps.supports_key(100));
    }
}
