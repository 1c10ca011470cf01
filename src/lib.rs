//! device-identity: Stable Device Identity for Apple Platforms
//!
//! Reports two facts about the machine the process runs on:
//!
//! - a persistent per-user **device identifier**, derived from the user's
//!   home directory;
//! - the **device model** (`iPhone14,2`, `MacBookPro18,3`, ...), read from
//!   the IOKit device tree with sysctl as fallback.
//!
//! # Sources
//!
//! | Fact | Primary | Fallback | Last resort |
//! |------|---------|----------|-------------|
//! | Model | IOKit `IODeviceTree:/` `model` | sysctl `hw.machine` | `"Unknown"` |
//! | Identifier | home directory | - | error |
//!
//! Values reported by Apple's virtualization framework instead of real
//! hardware (`VirtualMac2,1`) are skipped.
//!
//! # Quick Start
//!
//! ```no_run
//! println!("Model: {}", device_identity::device_model());
//! println!("ID: {}", device_identity::device_id()?);
//! # Ok::<(), device_identity::Error>(())
//! ```
//!
//! # Feature Flags
//!
//! - `registry` (default) - Read the IOKit device tree. Without it, or on
//!   watchOS and non-Apple targets, the model comes from sysctl only.
//!
//! # Safety Guarantees
//!
//! This crate uses `#![deny(unsafe_code)]` at the library level. All FFI
//! code is quarantined in the internal `ffi` module, which is not exported.
//!
//! # Error Handling
//!
//! Missing or undecodable values are `None`, never errors. Only identifier
//! derivation returns [`Result<T, Error>`], for a missing home directory or a
//! malformed seed.
//!
//! # Thread Safety
//!
//! Resolvers keep no state between calls and may be used from several
//! threads at once.

// SAFETY: This crate denies unsafe code at the library level.
// All unsafe FFI code is quarantined in src/ffi/, which is not exported.
// We use deny (not forbid) so it can be overridden in the ffi module.
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)] // Allow IOKit, sysctl, etc. without backticks

pub mod error;
pub mod identity;
pub mod model;
pub mod properties;
pub mod registry;

// FFI module is internal only - not exported
mod ffi;

// Re-export main types for convenience
pub use error::{Capability, Error, Result};
pub use identity::{identifier_from_seed, IdentityResolver, SeedSource};
pub use model::{ModelCandidate, ModelConfig, ModelResolver, ModelSource, UNKNOWN_MODEL};
pub use properties::{Sysctl, SystemProperties};
pub use registry::{DeviceRegistry, NoRegistry, PlatformRegistry};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Check if the hardware registry is compiled in for this target.
#[must_use]
pub const fn has_registry() -> bool {
    cfg!(all(
        target_vendor = "apple",
        not(target_os = "watchos"),
        feature = "registry"
    ))
}

/// Get the device identifier of the current user.
///
/// # Errors
///
/// Returns an error if the home directory is unavailable or malformed.
pub fn device_id() -> Result<String> {
    IdentityResolver::new().resolve_identifier()
}

/// Get the device model. Never empty; `"Unknown"` if no source answered.
#[must_use]
pub fn device_model() -> String {
    ModelResolver::new().resolve_model()
}

/// Get the model from the hardware registry only, unfiltered.
#[must_use]
pub fn device_model_main() -> Option<String> {
    ModelResolver::new().model_main()
}

/// Get the model from sysctl only, unfiltered.
#[must_use]
pub fn device_model_fallback() -> Option<String> {
    ModelResolver::new().model_fallback()
}

/// Read any sysctl value as text, for diagnostics.
#[must_use]
pub fn query_system_property(name: &str) -> Option<String> {
    Sysctl.read(name)
}

/// Identifier and model of the current device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    /// Per-user device identifier.
    pub id: String,
    /// Device model.
    pub model: String,
}

impl DeviceIdentity {
    /// Read both facts from the platform sources.
    ///
    /// # Errors
    ///
    /// Returns an error if the identifier cannot be derived.
    pub fn probe() -> Result<Self> {
        Ok(Self {
            id: device_id()?,
            model: device_model(),
        })
    }
}
