//! System property lookups (sysctl).
//!
//! # Example
//!
//! ```no_run
//! use device_identity::properties::{Sysctl, SystemProperties};
//!
//! match Sysctl.read("hw.machine") {
//!     Some(machine) => println!("Machine: {machine}"),
//!     None => println!("hw.machine not available"),
//! }
//! ```

use crate::ffi;
use std::ffi::CStr;
use tracing::{debug, trace};

/// Key/value reads against the kernel's system properties.
///
/// Absence is a normal outcome: unknown keys and values that are not text
/// come back as `None`.
pub trait SystemProperties {
    /// Read `key` and decode it as UTF-8 text.
    fn read(&self, key: &str) -> Option<String>;
}

/// System properties backed by `sysctlbyname`.
///
/// Always returns `None` on platforms without sysctl.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sysctl;

impl SystemProperties for Sysctl {
    fn read(&self, key: &str) -> Option<String> {
        let Some(bytes) = ffi::sysctl::read_by_name(key) else {
            debug!(key, "sysctl key not available");
            return None;
        };
        let value = decode_text(&bytes);
        trace!(key, ?value, "sysctl read");
        value
    }
}

impl<T: SystemProperties + ?Sized> SystemProperties for &T {
    fn read(&self, key: &str) -> Option<String> {
        (**self).read(key)
    }
}

/// Decode a raw property value as text.
///
/// Only C strings are text: the bytes must end in a single NUL with none
/// before it, and the rest must be UTF-8. Integer and struct values, which
/// carry NUL bytes anywhere or no terminator at all, are `None`.
#[must_use]
pub fn decode_text(bytes: &[u8]) -> Option<String> {
    let text = CStr::from_bytes_with_nul(bytes).ok()?;
    text.to_str().ok().map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tracing_test::traced_test;

    struct MapProperties(HashMap<&'static str, &'static str>);

    impl SystemProperties for MapProperties {
        fn read(&self, key: &str) -> Option<String> {
            self.0.get(key).map(|v| (*v).to_owned())
        }
    }

    #[test]
    fn test_decode_nul_terminated() {
        assert_eq!(decode_text(b"arm64\0"), Some("arm64".to_owned()));
    }

    #[test]
    fn test_decode_without_terminator() {
        assert!(decode_text(b"x86_64h").is_none());
    }

    #[test]
    fn test_decode_interior_nul() {
        assert!(decode_text(b"iPhone14,2\0\0").is_none());
        assert!(decode_text(b"iPhone14,2\0junk\0").is_none());
    }

    #[test]
    fn test_decode_integer_values() {
        // hw.ncpu and hw.memsize style values
        assert!(decode_text(&8u32.to_ne_bytes()).is_none());
        assert!(decode_text(&17_179_869_184u64.to_ne_bytes()).is_none());
        assert!(decode_text(&0u32.to_ne_bytes()).is_none());
    }

    #[test]
    fn test_decode_empty() {
        assert!(decode_text(b"").is_none());
        assert_eq!(decode_text(b"\0"), Some(String::new()));
    }

    #[test]
    fn test_decode_invalid_utf8() {
        assert!(decode_text(&[0xff, 0xfe, 0x00]).is_none());
    }

    #[test]
    fn test_decode_multibyte_utf8() {
        assert_eq!(decode_text("Mac ñ\0".as_bytes()), Some("Mac ñ".to_owned()));
    }

    #[test]
    fn test_reference_forwards() {
        let props = MapProperties(HashMap::from([("hw.machine", "arm64")]));
        let by_ref = &props;
        assert_eq!(by_ref.read("hw.machine"), Some("arm64".to_owned()));
        assert!(by_ref.read("hw.model").is_none());
    }

    #[test]
    fn test_sysctl_unknown_key() {
        assert!(Sysctl.read("device.identity.no.such.key").is_none());
    }

    #[test]
    fn test_sysctl_interior_nul_key() {
        assert!(Sysctl.read("hw.\0machine").is_none());
    }

    #[test]
    #[cfg(target_vendor = "apple")]
    fn test_sysctl_integer_key_is_not_text() {
        assert!(Sysctl.read("hw.ncpu").is_none());
        assert!(Sysctl.read("hw.memsize").is_none());
    }

    #[test]
    #[cfg(target_vendor = "apple")]
    fn test_sysctl_machine_present() {
        let machine = Sysctl.read("hw.machine");
        assert!(machine.is_some_and(|m| !m.is_empty()));
    }

    #[test]
    #[cfg(not(target_vendor = "apple"))]
    fn test_sysctl_absent_off_apple() {
        assert!(Sysctl.read("hw.machine").is_none());
    }

    #[test]
    #[traced_test]
    fn test_missing_key_is_logged() {
        let _ = Sysctl.read("device.identity.no.such.key");
        assert!(logs_contain("sysctl key not available"));
    }
}
