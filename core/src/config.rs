use serde::{Deserialize, Serialize};

/// Camera movement and zoom tuning.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub zoom_min: f32,
    pub zoom_max: f32,
    /// Keyboard pan speed, in screen widths per second at zoom 1.
    pub move_speed: f32,
    pub zoom_speed: f32,
    /// Fraction of keyboard velocity kept per 60Hz frame.
    pub elasticity: f32,
    pub wheel_zoom_speed: f32,
    /// Fraction of each buffered wheel delta kept per 60Hz frame.
    pub wheel_elasticity: f32,
    /// Screen-space drag distance after which a held click no longer counts as a click.
    pub drag_invalidate_distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            zoom_min: 0.005,
            zoom_max: 256.0,
            move_speed: 1.0 / 3.0,
            zoom_speed: 0.4,
            elasticity: 0.75,
            wheel_zoom_speed: 125.0,
            wheel_elasticity: 0.85,
            drag_invalidate_distance: 0.0125,
        }
    }
}

/// Hard caps for every portal graph traversal. Reaching a cap truncates silently.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalLimits {
    pub max_root_changes: u32,
    pub max_promotion_depth: u32,
    pub promotion_tolerance: f32,
    /// Minimum on-screen size in pixels for a child board to be expanded.
    pub visibility_threshold: f32,
    pub max_visible_boards: usize,
    pub neighbor_depth: u32,
    /// Placements are only queued while at most this many have been visited.
    pub neighbor_max_boards: usize,
    pub neighbor_probe_margin: f32,
}

impl Default for TraversalLimits {
    fn default() -> Self {
        Self {
            max_root_changes: 4,
            max_promotion_depth: 8,
            promotion_tolerance: 0.000_001,
            visibility_threshold: 0.004,
            max_visible_boards: 255,
            neighbor_depth: 4,
            neighbor_max_boards: 63,
            neighbor_probe_margin: 0.001,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub camera: CameraConfig,
    pub limits: TraversalLimits,
    /// Inset of a cell, as a fraction of its size, that does not count as hovering it.
    pub hover_margin: f32,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            limits: TraversalLimits::default(),
            hover_margin: 0.025,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: CoreConfig =
            serde_json::from_str(r#"{"limits": {"neighbor_depth": 6}}"#).unwrap();

        assert_eq!(config.limits.neighbor_depth, 6);
        assert_eq!(config.limits.neighbor_max_boards, 63);
        assert_eq!(config.camera, CameraConfig::default());
        assert_eq!(config.hover_margin, 0.025);
    }

    #[test]
    fn json_roundtrip() {
        let config = CoreConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: CoreConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
