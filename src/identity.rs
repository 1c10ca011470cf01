//! Per-user device identifier.
//!
//! The identifier is a name-based UUID (version 5, URL namespace) of the
//! current user's home directory, written as a directory file URL:
//!
//! ```text
//! /Users/alice  ->  file:///Users/alice/  ->  UUIDv5(URL, ...)  ->  uppercase hyphenated
//! ```
//!
//! The same home directory always yields the same identifier. It is unique
//! per local account in practice, not globally, and it is not a secret.
//!
//! # Example
//!
//! ```no_run
//! use device_identity::identity::IdentityResolver;
//!
//! let id = IdentityResolver::new().resolve_identifier()?;
//! println!("Device ID: {id}");
//! # Ok::<(), device_identity::Error>(())
//! ```

use crate::error::{Capability, Error, Result};
use tracing::{debug, instrument};
use uuid::Uuid;

/// Provides the namespace seed an identifier is derived from.
pub trait SeedSource {
    /// Return the seed.
    ///
    /// # Errors
    ///
    /// Returns an error if the seed cannot be obtained.
    fn seed(&self) -> Result<String>;
}

/// Seeds from the current user's home directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct HomeDirectory;

impl SeedSource for HomeDirectory {
    fn seed(&self) -> Result<String> {
        let home = dirs::home_dir().ok_or(Error::not_available(Capability::HomeDirectory))?;
        home.into_os_string()
            .into_string()
            .map_err(|path| Error::invalid_input(format!("home directory {path:?} is not UTF-8")))
    }
}

/// A fixed seed, mostly useful for tests and tooling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedSeed(pub String);

impl SeedSource for FixedSeed {
    fn seed(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Derives the device identifier from a [`SeedSource`].
#[derive(Debug, Clone, Default)]
pub struct IdentityResolver<S = HomeDirectory> {
    source: S,
}

impl IdentityResolver {
    /// Create a resolver seeded by the home directory.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            source: HomeDirectory,
        }
    }
}

impl<S: SeedSource> IdentityResolver<S> {
    /// Create a resolver over a custom seed source.
    #[must_use]
    pub const fn with_source(source: S) -> Self {
        Self { source }
    }

    /// Resolve the identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the seed is unavailable or malformed.
    #[instrument(level = "debug", skip(self))]
    pub fn resolve_identifier(&self) -> Result<String> {
        let seed = self.source.seed()?;
        let id = identifier_from_seed(&seed)?;
        debug!(%id, "identifier resolved");
        Ok(id)
    }
}

/// Derive an identifier from `seed`.
///
/// `seed` must be an absolute path. Trailing slashes are ignored, so
/// `/Users/alice` and `/Users/alice/` give the same identifier.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if `seed` is empty, relative, or contains
/// a NUL byte.
///
/// # Example
///
/// ```
/// use device_identity::identity::identifier_from_seed;
///
/// let a = identifier_from_seed("/Users/alice")?;
/// let b = identifier_from_seed("/Users/alice/")?;
/// assert_eq!(a, b);
/// assert_eq!(a.len(), 36);
/// # Ok::<(), device_identity::Error>(())
/// ```
pub fn identifier_from_seed(seed: &str) -> Result<String> {
    let url = seed_url(seed)?;
    let uuid = Uuid::new_v5(&Uuid::NAMESPACE_URL, url.as_bytes());
    Ok(uuid
        .hyphenated()
        .encode_upper(&mut Uuid::encode_buffer())
        .to_owned())
}

/// Validate `seed` and express it as a directory file URL.
fn seed_url(seed: &str) -> Result<String> {
    if seed.is_empty() {
        return Err(Error::invalid_input("seed cannot be empty"));
    }
    if seed.contains('\0') {
        return Err(Error::invalid_input("seed cannot contain NUL bytes"));
    }
    if !seed.starts_with('/') {
        return Err(Error::invalid_input(format!(
            "seed {seed:?} must be an absolute path"
        )));
    }

    let trimmed = seed.trim_end_matches('/');
    Ok(format!("file://{trimmed}/"))
}
