//! Error types for device-identity.
//!
//! Most lookups in this crate report absence through `Option` rather than
//! errors. The variants here cover the few outcomes a caller has to act on:
//! a malformed identifier seed, a missing home directory, or an invalid
//! model configuration.

use std::fmt;
use thiserror::Error;

/// Primary error type for device-identity operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A system capability does not exist on this platform.
    #[error("capability not available: {capability}")]
    NotAvailable {
        /// The capability that was requested.
        capability: Capability,
    },

    /// Invalid input was provided to an API.
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// Description of what was invalid.
        reason: String,
    },
}

/// System capabilities consumed by the resolvers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Kernel system properties (sysctl).
    SystemProperties,
    /// Hardware registry (IOKit device tree).
    HardwareRegistry,
    /// Home directory of the current user.
    HomeDirectory,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SystemProperties => write!(f, "system properties"),
            Self::HardwareRegistry => write!(f, "hardware registry"),
            Self::HomeDirectory => write!(f, "home directory"),
        }
    }
}

/// Result type alias for device-identity operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new `NotAvailable` error.
    #[must_use]
    pub const fn not_available(capability: Capability) -> Self {
        Self::NotAvailable { capability }
    }

    /// Create a new `InvalidInput` error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Check if this error indicates a capability is unavailable.
    #[must_use]
    pub const fn is_not_available(&self) -> bool {
        matches!(self, Self::NotAvailable { .. })
    }

    /// Check if this error was caused by invalid input.
    #[must_use]
    pub const fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput { .. })
    }
}
