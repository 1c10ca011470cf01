//! Device model resolution.
//!
//! The model comes from one of two sources:
//!
//! 1. the `model` property of the hardware registry's device-tree root
//!    (e.g. `iPhone14,2`, `MacBookPro18,3`), when the registry exists;
//! 2. the `hw.machine` system property (e.g. `arm64`, `x86_64h`).
//!
//! A value equal to a known virtualization placeholder is never trusted and
//! sends the resolver on to the next source. When nothing is left the
//! resolver answers [`UNKNOWN_MODEL`] instead of failing.
//!
//! # Example
//!
//! ```no_run
//! use device_identity::model::ModelResolver;
//!
//! let model = ModelResolver::new().resolve_model();
//! println!("Running on {model}");
//! ```

use crate::error::{Error, Result};
use crate::properties::{Sysctl, SystemProperties};
use crate::registry::{DeviceRegistry, PlatformRegistry};
use std::fmt;
use tracing::{debug, instrument};

/// Registry key holding the device model.
pub const REGISTRY_MODEL_KEY: &str = "model";

/// System property holding the hardware model.
pub const SYSCTL_MODEL_KEY: &str = "hw.machine";

/// Model reported by Apple's virtualization framework instead of real hardware.
pub const VIRTUAL_MACHINE_MODEL: &str = "VirtualMac2,1";

/// Returned when no source produced an acceptable model.
pub const UNKNOWN_MODEL: &str = "Unknown";

/// Where a model candidate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelSource {
    /// Hardware registry (device-tree root).
    Registry,
    /// System properties (sysctl).
    Sysctl,
}

impl fmt::Display for ModelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registry => write!(f, "registry"),
            Self::Sysctl => write!(f, "sysctl"),
        }
    }
}

/// One raw value obtained from a model source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCandidate {
    /// Source the value was read from.
    pub source: ModelSource,
    /// Raw value; `None` if the source had nothing.
    pub value: Option<String>,
}

impl ModelCandidate {
    /// Create a candidate. Empty values are stored as `None`.
    #[must_use]
    pub fn new(source: ModelSource, value: Option<String>) -> Self {
        Self {
            source,
            value: value.filter(|v| !v.is_empty()),
        }
    }

    /// Check if the candidate equals one of `placeholders`.
    #[must_use]
    pub fn is_placeholder(&self, placeholders: &[String]) -> bool {
        self.value
            .as_deref()
            .is_some_and(|v| placeholders.iter().any(|p| p == v))
    }

    /// Consume the candidate, keeping the value only if it is non-empty and
    /// not a placeholder.
    #[must_use]
    pub fn accept(self, placeholders: &[String]) -> Option<String> {
        if self.is_placeholder(placeholders) {
            debug!(source = %self.source, value = ?self.value, "rejected placeholder model");
            return None;
        }
        self.value
    }
}

/// Keys and sentinel values used by [`ModelResolver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    /// Registry property read first.
    pub registry_key: String,
    /// System property read as fallback.
    pub sysctl_key: String,
    /// Values that never count as a real model.
    pub placeholders: Vec<String>,
    /// Answer when no source produced a model.
    pub unknown_model: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelConfig {
    /// Create the default configuration.
    ///
    /// Reads `model` from the registry, falls back to `hw.machine`, rejects
    /// `VirtualMac2,1` and answers `Unknown` when nothing is found.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry_key: REGISTRY_MODEL_KEY.to_owned(),
            sysctl_key: SYSCTL_MODEL_KEY.to_owned(),
            placeholders: vec![VIRTUAL_MACHINE_MODEL.to_owned()],
            unknown_model: UNKNOWN_MODEL.to_owned(),
        }
    }

    /// Set the registry key.
    #[must_use]
    pub fn with_registry_key(mut self, key: impl Into<String>) -> Self {
        self.registry_key = key.into();
        self
    }

    /// Set the system property key.
    #[must_use]
    pub fn with_sysctl_key(mut self, key: impl Into<String>) -> Self {
        self.sysctl_key = key.into();
        self
    }

    /// Add a placeholder value to reject.
    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholders.push(placeholder.into());
        self
    }

    /// Set the answer used when no model is found.
    #[must_use]
    pub fn with_unknown_model(mut self, unknown: impl Into<String>) -> Self {
        self.unknown_model = unknown.into();
        self
    }

    /// Check the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if a key or the unknown-model answer is
    /// empty, or if the unknown-model answer is itself a placeholder.
    pub fn validate(&self) -> Result<()> {
        if self.registry_key.is_empty() {
            return Err(Error::invalid_input("registry key cannot be empty"));
        }
        if self.sysctl_key.is_empty() {
            return Err(Error::invalid_input("sysctl key cannot be empty"));
        }
        if self.unknown_model.is_empty() {
            return Err(Error::invalid_input("unknown model cannot be empty"));
        }
        if self.placeholders.contains(&self.unknown_model) {
            return Err(Error::invalid_input(format!(
                "unknown model {:?} is also a placeholder",
                self.unknown_model
            )));
        }
        Ok(())
    }
}

/// Resolves the device model from the registry and system properties.
///
/// Holds no state besides its sources and configuration; every call
/// queries the sources again.
#[derive(Debug, Clone)]
pub struct ModelResolver<R = PlatformRegistry, P = Sysctl> {
    registry: R,
    properties: P,
    config: ModelConfig,
}

impl ModelResolver {
    /// Create a resolver over the platform registry and sysctl.
    #[must_use]
    pub fn new() -> Self {
        Self::with_sources(PlatformRegistry::default(), Sysctl)
    }
}

impl Default for ModelResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: DeviceRegistry, P: SystemProperties> ModelResolver<R, P> {
    /// Create a resolver over custom sources with the default configuration.
    #[must_use]
    pub fn with_sources(registry: R, properties: P) -> Self {
        Self {
            registry,
            properties,
            config: ModelConfig::new(),
        }
    }

    /// Replace the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails [`ModelConfig::validate`].
    pub fn with_config(mut self, config: ModelConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Get the active configuration.
    #[must_use]
    pub const fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Read the registry candidate.
    ///
    /// The value is `None` when the registry is unavailable on this platform.
    #[must_use]
    pub fn main_candidate(&self) -> ModelCandidate {
        let value = if self.registry.is_available() {
            self.registry.read_device_property(&self.config.registry_key)
        } else {
            debug!("hardware registry unavailable on this platform");
            None
        };
        ModelCandidate::new(ModelSource::Registry, value)
    }

    /// Read the system property candidate.
    #[must_use]
    pub fn fallback_candidate(&self) -> ModelCandidate {
        let value = self.properties.read(&self.config.sysctl_key);
        ModelCandidate::new(ModelSource::Sysctl, value)
    }

    /// Raw registry model, without the placeholder filter.
    #[must_use]
    pub fn model_main(&self) -> Option<String> {
        self.main_candidate().value
    }

    /// Raw system property model, without the placeholder filter.
    #[must_use]
    pub fn model_fallback(&self) -> Option<String> {
        self.fallback_candidate().value
    }

    /// Resolve the device model.
    ///
    /// Tries the registry first and system properties second, skipping
    /// placeholder values. Never returns an empty string.
    #[instrument(level = "debug", skip(self))]
    pub fn resolve_model(&self) -> String {
        let placeholders = &self.config.placeholders;

        if let Some(model) = self.main_candidate().accept(placeholders) {
            debug!(%model, "model resolved from registry");
            return model;
        }

        if let Some(model) = self.fallback_candidate().accept(placeholders) {
            debug!(%model, "model resolved from sysctl");
            return model;
        }

        debug!("no model source available");
        self.config.unknown_model.clone()
    }
}
