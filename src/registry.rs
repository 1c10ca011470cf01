//! Hardware registry (IOKit device tree) lookups.
//!
//! The registry is read through two layers:
//!
//! - [`RegistryBackend`]: raw open / read / release of a registry entry.
//! - [`RegistryReader`]: opens the device-tree root, reads one property,
//!   decodes it, and always releases the entry again.
//!
//! [`DeviceRegistry`] is what the model resolver consumes. On platforms
//! without IOKit (watchOS, non-Apple targets, or the `registry` feature
//! disabled) [`PlatformRegistry`] is [`NoRegistry`], which is never available.
//!
//! # Example
//!
//! ```no_run
//! use device_identity::registry::{DeviceRegistry, PlatformRegistry};
//!
//! let registry = PlatformRegistry::default();
//! if registry.is_available() {
//!     println!("{:?}", registry.read_device_property("model"));
//! }
//! ```

use crate::properties::decode_text;
use tracing::{debug, trace};

/// Registry path of the device-tree root node.
pub const DEVICE_TREE_ROOT: &str = "IODeviceTree:/";

/// A loosely typed registry property value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryValue {
    /// A string property.
    Text(String),
    /// A data blob, usually a NUL-terminated C string.
    Bytes(Vec<u8>),
    /// Any other property type (numbers, dictionaries, ...).
    Other,
}

impl RegistryValue {
    /// Interpret the value as text.
    ///
    /// Strings are returned as-is, data blobs go through [`decode_text`],
    /// everything else is `None`.
    #[must_use]
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text),
            Self::Bytes(bytes) => decode_text(&bytes),
            Self::Other => None,
        }
    }
}

/// Raw access to registry entries.
///
/// Every entry returned by [`open`](Self::open) must be passed to
/// [`release`](Self::release) exactly once. [`RegistryReader`] upholds this.
pub trait RegistryBackend {
    /// An open registry entry.
    type Entry;

    /// Open the entry at `path`. `None` means the open failed.
    fn open(&self, path: &str) -> Option<Self::Entry>;

    /// Read one property of an open entry.
    fn property(&self, entry: &Self::Entry, key: &str) -> Option<RegistryValue>;

    /// Release an open entry.
    fn release(&self, entry: Self::Entry);
}

/// Device-tree property reads, as consumed by the model resolver.
pub trait DeviceRegistry {
    /// Whether the registry exists on this platform.
    fn is_available(&self) -> bool {
        true
    }

    /// Read `key` from the device-tree root as text.
    fn read_device_property(&self, key: &str) -> Option<String>;
}

impl<T: DeviceRegistry + ?Sized> DeviceRegistry for &T {
    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn read_device_property(&self, key: &str) -> Option<String> {
        (**self).read_device_property(key)
    }
}

/// Releases an open entry when dropped.
struct EntryGuard<'a, B: RegistryBackend> {
    backend: &'a B,
    entry: Option<B::Entry>,
}

impl<'a, B: RegistryBackend> EntryGuard<'a, B> {
    const fn new(backend: &'a B, entry: B::Entry) -> Self {
        Self {
            backend,
            entry: Some(entry),
        }
    }

    fn property(&self, key: &str) -> Option<RegistryValue> {
        self.entry
            .as_ref()
            .and_then(|entry| self.backend.property(entry, key))
    }
}

impl<B: RegistryBackend> Drop for EntryGuard<'_, B> {
    fn drop(&mut self) {
        if let Some(entry) = self.entry.take() {
            self.backend.release(entry);
        }
    }
}

/// Reads properties of the device-tree root through a [`RegistryBackend`].
#[derive(Debug, Clone, Default)]
pub struct RegistryReader<B> {
    backend: B,
}

impl<B: RegistryBackend> RegistryReader<B> {
    /// Create a reader over `backend`.
    #[must_use]
    pub const fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    /// Get the underlying backend.
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: RegistryBackend> DeviceRegistry for RegistryReader<B> {
    fn read_device_property(&self, key: &str) -> Option<String> {
        let Some(entry) = self.backend.open(DEVICE_TREE_ROOT) else {
            debug!(path = DEVICE_TREE_ROOT, "registry entry could not be opened");
            return None;
        };
        let guard = EntryGuard::new(&self.backend, entry);

        let Some(value) = guard.property(key) else {
            debug!(key, "registry property not present");
            return None;
        };
        trace!(key, ?value, "registry read");

        let text = value.into_text();
        if text.is_none() {
            debug!(key, "registry property is not text");
        }
        text
    }
}

/// Registry stand-in for platforms without IOKit.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRegistry;

impl DeviceRegistry for NoRegistry {
    fn is_available(&self) -> bool {
        false
    }

    fn read_device_property(&self, _key: &str) -> Option<String> {
        None
    }
}

#[cfg(all(target_vendor = "apple", not(target_os = "watchos"), feature = "registry"))]
mod iokit_backend {
    use super::{RegistryBackend, RegistryValue};
    use crate::ffi::iokit;

    /// [`RegistryBackend`] over the IOKit registry.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct IoKitBackend;

    impl RegistryBackend for IoKitBackend {
        type Entry = iokit::RegistryEntry;

        fn open(&self, path: &str) -> Option<Self::Entry> {
            iokit::entry_from_path(path)
        }

        fn property(&self, entry: &Self::Entry, key: &str) -> Option<RegistryValue> {
            iokit::copy_property(entry, key)
        }

        fn release(&self, entry: Self::Entry) {
            iokit::release(entry);
        }
    }
}

#[cfg(all(target_vendor = "apple", not(target_os = "watchos"), feature = "registry"))]
pub use iokit_backend::IoKitBackend;

/// The registry used on this platform.
#[cfg(all(target_vendor = "apple", not(target_os = "watchos"), feature = "registry"))]
pub type PlatformRegistry = RegistryReader<IoKitBackend>;

/// The registry used on this platform.
#[cfg(not(all(target_vendor = "apple", not(target_os = "watchos"), feature = "registry")))]
pub type PlatformRegistry = NoRegistry;

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use tracing_test::traced_test;

    /// Backend that counts opens and releases.
    #[derive(Default)]
    struct CountingBackend {
        open_fails: bool,
        properties: HashMap<&'static str, RegistryValue>,
        opens: Cell<usize>,
        releases: Cell<usize>,
        paths: RefCell<Vec<String>>,
    }

    impl CountingBackend {
        fn with(key: &'static str, value: RegistryValue) -> Self {
            Self {
                properties: HashMap::from([(key, value)]),
                ..Self::default()
            }
        }

        fn balanced(&self) -> bool {
            self.opens.get() == self.releases.get()
        }
    }

    impl RegistryBackend for CountingBackend {
        type Entry = usize;

        fn open(&self, path: &str) -> Option<usize> {
            self.paths.borrow_mut().push(path.to_owned());
            if self.open_fails {
                return None;
            }
            self.opens.set(self.opens.get() + 1);
            Some(self.opens.get())
        }

        fn property(&self, _entry: &usize, key: &str) -> Option<RegistryValue> {
            self.properties.get(key).cloned()
        }

        fn release(&self, _entry: usize) {
            self.releases.set(self.releases.get() + 1);
        }
    }

    #[test]
    fn test_text_property() {
        let reader = RegistryReader::with_backend(CountingBackend::with(
            "model",
            RegistryValue::Text("iPhone14,2".into()),
        ));
        assert_eq!(reader.read_device_property("model"), Some("iPhone14,2".into()));
        assert_eq!(reader.backend().opens.get(), 1);
        assert!(reader.backend().balanced());
    }

    #[test]
    fn test_bytes_property() {
        let reader = RegistryReader::with_backend(CountingBackend::with(
            "model",
            RegistryValue::Bytes(b"MacBookPro18,3\0".to_vec()),
        ));
        assert_eq!(
            reader.read_device_property("model"),
            Some("MacBookPro18,3".into())
        );
        assert!(reader.backend().balanced());
    }

    #[test]
    fn test_missing_property_still_releases() {
        let reader = RegistryReader::with_backend(CountingBackend::default());
        assert!(reader.read_device_property("model").is_none());
        assert_eq!(reader.backend().opens.get(), 1);
        assert_eq!(reader.backend().releases.get(), 1);
    }

    #[test]
    fn test_non_text_property_still_releases() {
        let reader =
            RegistryReader::with_backend(CountingBackend::with("model", RegistryValue::Other));
        assert!(reader.read_device_property("model").is_none());
        assert!(reader.backend().balanced());
    }

    #[test]
    fn test_undecodable_bytes_still_release() {
        let reader = RegistryReader::with_backend(CountingBackend::with(
            "model",
            RegistryValue::Bytes(vec![0xc3, 0x28]),
        ));
        assert!(reader.read_device_property("model").is_none());
        assert!(reader.backend().balanced());
    }

    #[test]
    fn test_failed_open_releases_nothing() {
        let reader = RegistryReader::with_backend(CountingBackend {
            open_fails: true,
            ..CountingBackend::default()
        });
        assert!(reader.read_device_property("model").is_none());
        assert_eq!(reader.backend().opens.get(), 0);
        assert_eq!(reader.backend().releases.get(), 0);
    }

    #[test]
    fn test_repeated_reads_balanced() {
        let reader = RegistryReader::with_backend(CountingBackend::with(
            "model",
            RegistryValue::Text("iPad13,4".into()),
        ));
        for _ in 0..5 {
            let _ = reader.read_device_property("model");
            let _ = reader.read_device_property("missing");
        }
        assert_eq!(reader.backend().opens.get(), 10);
        assert!(reader.backend().balanced());
    }

    #[test]
    fn test_opens_device_tree_root() {
        let reader = RegistryReader::with_backend(CountingBackend::default());
        let _ = reader.read_device_property("model");
        assert_eq!(*reader.backend().paths.borrow(), vec![DEVICE_TREE_ROOT.to_owned()]);
    }

    #[test]
    fn test_release_on_panicking_read() {
        struct PanickingBackend {
            releases: Cell<usize>,
        }

        impl RegistryBackend for PanickingBackend {
            type Entry = ();

            fn open(&self, _path: &str) -> Option<()> {
                Some(())
            }

            #[allow(clippy::panic)]
            fn property(&self, _entry: &(), _key: &str) -> Option<RegistryValue> {
                panic!("backend failure");
            }

            fn release(&self, _entry: ()) {
                self.releases.set(self.releases.get() + 1);
            }
        }

        let reader = RegistryReader::with_backend(PanickingBackend {
            releases: Cell::new(0),
        });
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            reader.read_device_property("model")
        }));
        assert!(result.is_err());
        assert_eq!(reader.backend().releases.get(), 1);
    }

    #[test]
    fn test_into_text_variants() {
        assert_eq!(RegistryValue::Text("a".into()).into_text(), Some("a".into()));
        assert_eq!(RegistryValue::Bytes(b"b\0".to_vec()).into_text(), Some("b".into()));
        assert!(RegistryValue::Other.into_text().is_none());
    }

    #[test]
    fn test_no_registry() {
        assert!(!NoRegistry.is_available());
        assert!(NoRegistry.read_device_property("model").is_none());
    }

    #[test]
    fn test_reference_forwards() {
        let registry = &NoRegistry;
        assert!(!registry.is_available());
        assert!(registry.read_device_property("model").is_none());
    }

    #[test]
    fn test_platform_registry_no_panic() {
        let registry = PlatformRegistry::default();
        let _ = registry.read_device_property("model");
    }

    #[test]
    #[traced_test]
    fn test_missing_property_is_logged() {
        let reader = RegistryReader::with_backend(CountingBackend::default());
        let _ = reader.read_device_property("model");
        assert!(logs_contain("registry property not present"));
    }
}
