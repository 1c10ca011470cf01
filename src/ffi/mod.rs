//! FFI Quarantine Zone - All unsafe code isolated here.
//!
//! # Safety Architecture
//!
//! This module contains ALL unsafe code in the crate. The public API in
//! `src/lib.rs` uses `#![deny(unsafe_code)]`, ensuring no unsafe code can
//! leak into the user-facing interface.
//!
//! ## Safety Rules
//!
//! - Every `unsafe` block has a `// SAFETY:` comment
//! - No raw pointers escape this module; mach ports leave only inside
//!   `iokit::RegistryEntry`, which is released by value through `iokit::release`
//! - C strings are built with `CString::new`, so interior NULs are rejected
//! - CF objects are wrapped under the create rule and released on drop
//! - Every opened registry entry is handed back to `iokit::release`
//!
//! # Module Structure
//!
//! ```text
//! ffi/
//! ├── mod.rs          # This file - module router
//! ├── sysctl.rs       # sysctlbyname (system properties)
//! └── iokit.rs        # IORegistryEntryFromPath (device tree)
//! ```

// Allow unsafe in this module only - quarantine zone
#![allow(unsafe_code)]

#[cfg(target_vendor = "apple")]
pub mod sysctl;

// watchOS ships no IOKit; the `registry` feature turns it off everywhere.
#[cfg(all(target_vendor = "apple", not(target_os = "watchos"), feature = "registry"))]
pub mod iokit;

// Stub module for non-Apple platforms
#[cfg(not(target_vendor = "apple"))]
pub mod sysctl {
    //! Stub sysctl module for non-Apple platforms.

    /// Stub: Always returns None off Apple platforms.
    pub const fn read_by_name(_name: &str) -> Option<Vec<u8>> {
        None
    }
}
