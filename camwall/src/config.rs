//! Configuration types and defaults

use camwall_core::{CamwallError, CamwallResult};
use camwall_media::{OverlayStyle, SurfaceSize};
use camwall_remote::RemoteConfig;
use serde::Deserialize;

/// Slot count of the wall when the host does not choose one
pub const DEFAULT_MAX_SLOTS: usize = 21;

/// Grid controller configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Slots created by [`crate::GridController::initialize_default`]
    pub max_slots: usize,
    /// Box and label styling for detection overlays
    pub overlay: OverlayStyle,
    /// Size of the overlay surface created for each slot
    pub surface_size: SurfaceSize,
    /// Backend endpoint settings
    pub remote: RemoteConfig,
    /// Buffered grid events per subscriber
    pub event_capacity: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            max_slots: DEFAULT_MAX_SLOTS,
            overlay: OverlayStyle::default(),
            surface_size: SurfaceSize::VGA,
            remote: RemoteConfig::default(),
            event_capacity: 256,
        }
    }
}

impl GridConfig {
    /// Parse a JSON configuration, filling omitted fields with defaults
    pub fn from_json_str(json: &str) -> CamwallResult<Self> {
        let config: GridConfig =
            serde_json::from_str(json).map_err(|e| CamwallError::InvalidConfiguration {
                message: format!("Failed to parse grid config: {}", e),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> CamwallResult<()> {
        if self.overlay.stroke.line_width <= 0.0 {
            return Err(CamwallError::InvalidConfiguration {
                message: "overlay.stroke.line_width must be > 0".to_string(),
            });
        }
        if self.surface_size.width == 0 || self.surface_size.height == 0 {
            return Err(CamwallError::InvalidConfiguration {
                message: "surface_size must be non-zero".to_string(),
            });
        }
        if self.event_capacity == 0 {
            return Err(CamwallError::InvalidConfiguration {
                message: "event_capacity must be > 0".to_string(),
            });
        }
        self.remote.validate()
    }
}
