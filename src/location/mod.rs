//! Resolving the user's current position.
//!
//! The map view asks a [`LocationProvider`] exactly once per session. Failure
//! is never fatal: the view keeps using its configured center.

pub mod ip;

use std::time::Duration;

use async_trait::async_trait;

use crate::core::geo::LatLng;

pub use ip::IpLocation;

/// Why no position could be resolved.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LocationError {
    #[error("location access denied")]
    Denied,

    #[error("location unavailable: {0}")]
    Unavailable(String),

    #[error("location lookup timed out after {0:?}")]
    Timeout(Duration),
}

/// A one-shot source of the user's position.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Name for logging.
    fn name(&self) -> &str;

    /// Single attempt, no retry.
    async fn resolve_once(&self) -> Result<LatLng, LocationError>;
}

#[async_trait]
impl<L: LocationProvider + ?Sized> LocationProvider for Box<L> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn resolve_once(&self) -> Result<LatLng, LocationError> {
        (**self).resolve_once().await
    }
}

/// Always resolves to the same position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedLocation(pub LatLng);

#[async_trait]
impl LocationProvider for FixedLocation {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn resolve_once(&self) -> Result<LatLng, LocationError> {
        Ok(self.0)
    }
}

/// Never resolves: geolocation denied or unsupported.
#[derive(Debug, Clone, PartialEq)]
pub struct UnavailableLocation(pub LocationError);

impl UnavailableLocation {
    pub fn denied() -> Self {
        Self(LocationError::Denied)
    }
}

#[async_trait]
impl LocationProvider for UnavailableLocation {
    fn name(&self) -> &str {
        "unavailable"
    }

    async fn resolve_once(&self) -> Result<LatLng, LocationError> {
        Err(self.0.clone())
    }
}

/// Gives up on the inner provider after `timeout`.
#[cfg(feature = "tokio-runtime")]
pub struct TimeoutLocation<L> {
    inner: L,
    timeout: Duration,
}

#[cfg(feature = "tokio-runtime")]
impl<L: LocationProvider> TimeoutLocation<L> {
    pub fn new(inner: L, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[cfg(feature = "tokio-runtime")]
#[async_trait]
impl<L: LocationProvider> LocationProvider for TimeoutLocation<L> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn resolve_once(&self) -> Result<LatLng, LocationError> {
        match tokio::time::timeout(self.timeout, self.inner.resolve_once()).await {
            Ok(result) => result,
            Err(_) => Err(LocationError::Timeout(self.timeout)),
        }
    }
}
