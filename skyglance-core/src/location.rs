//! Device location for "use my location" lookups.

use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

use crate::{config::LocationConfig, error::LocationError, model::Coordinates};

#[async_trait]
pub trait LocationSource: Send + Sync + Debug {
    async fn current_location(&self) -> Result<Coordinates, LocationError>;
}

/// Always reports the same position.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinates);

#[async_trait]
impl LocationSource for FixedLocation {
    async fn current_location(&self) -> Result<Coordinates, LocationError> {
        Ok(self.0)
    }
}

/// Location has been switched off by the user.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeniedLocation;

#[async_trait]
impl LocationSource for DeniedLocation {
    async fn current_location(&self) -> Result<Coordinates, LocationError> {
        Err(LocationError::PermissionDenied)
    }
}

/// No location capability at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocation;

#[async_trait]
impl LocationSource for NoLocation {
    async fn current_location(&self) -> Result<Coordinates, LocationError> {
        Err(LocationError::Unsupported)
    }
}

/// Pick a location source. Explicit coordinates win over the config section.
pub fn location_from_config(
    explicit: Option<Coordinates>,
    config: Option<&LocationConfig>,
) -> Arc<dyn LocationSource> {
    if let Some(coords) = explicit {
        return Arc::new(FixedLocation(coords));
    }

    match config {
        Some(loc) if !loc.enabled => Arc::new(DeniedLocation),
        Some(loc) => match loc.coordinates() {
            Some(coords) => Arc::new(FixedLocation(coords)),
            None => Arc::new(NoLocation),
        },
        None => Arc::new(NoLocation),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn located(lat: f64, lon: f64, enabled: bool) -> LocationConfig {
        LocationConfig {
            latitude: Some(lat),
            longitude: Some(lon),
            enabled,
        }
    }

    #[tokio::test]
    async fn explicit_coordinates_take_precedence() {
        let cfg = located(1.0, 2.0, false);
        let source = location_from_config(Some(Coordinates::new(3.0, 4.0)), Some(&cfg));

        assert_eq!(
            source.current_location().await,
            Ok(Coordinates::new(3.0, 4.0))
        );
    }

    #[tokio::test]
    async fn configured_coordinates_are_used() {
        let cfg = located(59.91, 10.75, true);
        let source = location_from_config(None, Some(&cfg));

        assert_eq!(
            source.current_location().await,
            Ok(Coordinates::new(59.91, 10.75))
        );
    }

    #[tokio::test]
    async fn disabled_location_is_denied() {
        let cfg = located(59.91, 10.75, false);
        let source = location_from_config(None, Some(&cfg));

        assert_eq!(
            source.current_location().await,
            Err(LocationError::PermissionDenied)
        );
    }

    #[tokio::test]
    async fn missing_location_is_unsupported() {
        let source = location_from_config(None, None);
        assert_eq!(
            source.current_location().await,
            Err(LocationError::Unsupported)
        );

        let partial = LocationConfig {
            latitude: Some(1.0),
            longitude: None,
            enabled: true,
        };
        let source = location_from_config(None, Some(&partial));
        assert_eq!(
            source.current_location().await,
            Err(LocationError::Unsupported)
        );
    }
}
