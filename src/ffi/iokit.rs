//! IOKit bindings for device-tree property reads.
//!
//! # Safety
//!
//! This module contains unsafe FFI code. All unsafe blocks are documented
//! with SAFETY comments explaining why they are sound.
//!
//! # Ownership
//!
//! [`RegistryEntry`] does not release itself. Releasing is the caller's job
//! through [`release`], which consumes the entry so it cannot be released
//! twice. The safe layer in `crate::registry` pairs every open with a release
//! through a drop guard.

use crate::registry::RegistryValue;
use core_foundation::base::{kCFAllocatorDefault, CFType, TCFType};
use core_foundation::data::CFData;
use core_foundation::string::CFString;
use core_foundation_sys::base::{CFAllocatorRef, CFTypeRef};
use core_foundation_sys::string::CFStringRef;
use mach2::kern_return::kern_return_t;
use mach2::port::{mach_port_t, MACH_PORT_NULL};
use std::ffi::{c_char, CString};

// io_object_t and io_registry_entry_t are both mach ports.
type IoRegistryEntryT = mach_port_t;

const IO_OBJECT_NULL: IoRegistryEntryT = 0;

// kIOMainPortDefault is defined as MACH_PORT_NULL.
const MAIN_PORT_DEFAULT: mach_port_t = MACH_PORT_NULL;

// io_string_t is char[512]; paths must fit including the NUL.
const IO_STRING_LEN: usize = 512;

#[link(name = "IOKit", kind = "framework")]
extern "C" {
    fn IORegistryEntryFromPath(main_port: mach_port_t, path: *const c_char) -> IoRegistryEntryT;
    fn IORegistryEntryCreateCFProperty(
        entry: IoRegistryEntryT,
        key: CFStringRef,
        allocator: CFAllocatorRef,
        options: u32,
    ) -> CFTypeRef;
    fn IOObjectRelease(object: IoRegistryEntryT) -> kern_return_t;
}

/// An open IOKit registry entry.
///
/// # Thread Safety
///
/// This type is `!Send` and `!Sync`; the entry is opened, read and released
/// on one thread within a single call.
#[derive(Debug)]
pub struct RegistryEntry {
    entry: IoRegistryEntryT,
    _not_send_sync: std::marker::PhantomData<*const ()>,
}

/// Open the registry entry at `path` using the default main port.
///
/// # Returns
///
/// - `Some(RegistryEntry)` for a valid entry, which must be passed to [`release`]
/// - `None` if the path does not resolve or does not fit an `io_string_t`
///   (nothing to release)
pub fn entry_from_path(path: &str) -> Option<RegistryEntry> {
    if path.len() >= IO_STRING_LEN {
        return None;
    }
    let path = CString::new(path).ok()?;

    // SAFETY: path is a valid NUL-terminated C string that fits io_string_t
    // (length checked above).
    // IORegistryEntryFromPath returns IO_OBJECT_NULL on failure.
    let entry = unsafe { IORegistryEntryFromPath(MAIN_PORT_DEFAULT, path.as_ptr()) };

    if entry == IO_OBJECT_NULL {
        None
    } else {
        Some(RegistryEntry {
            entry,
            _not_send_sync: std::marker::PhantomData,
        })
    }
}

/// Copy one property of `entry` as a loosely typed value.
///
/// Strings and data blobs are converted; any other CF type is reported as
/// [`RegistryValue::Other`].
pub fn copy_property(entry: &RegistryEntry, key: &str) -> Option<RegistryValue> {
    let cf_key = CFString::new(key);

    // SAFETY: entry.entry is a valid registry entry (not yet released) and
    // cf_key outlives the call. The returned object follows the create rule.
    let raw = unsafe {
        IORegistryEntryCreateCFProperty(
            entry.entry,
            cf_key.as_concrete_TypeRef(),
            kCFAllocatorDefault,
            0,
        )
    };

    if raw.is_null() {
        return None;
    }

    // SAFETY: raw is a non-null CF object we own under the create rule.
    // CFType releases it on drop.
    let value = unsafe { CFType::wrap_under_create_rule(raw) };

    if let Some(text) = value.downcast::<CFString>() {
        return Some(RegistryValue::Text(text.to_string()));
    }
    if let Some(data) = value.downcast::<CFData>() {
        return Some(RegistryValue::Bytes(data.bytes().to_vec()));
    }
    Some(RegistryValue::Other)
}

/// Release an entry obtained from [`entry_from_path`].
pub fn release(entry: RegistryEntry) {
    // SAFETY: entry.entry is a valid io_object_t from IORegistryEntryFromPath.
    // Taking the entry by value guarantees it is released at most once.
    unsafe {
        IOObjectRelease(entry.entry);
    }
}
