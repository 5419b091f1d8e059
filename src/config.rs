use crate::error::{BoardError, Result};
use crate::geometry::{Point, Size};
use log::{info, warn};
use serde::Deserialize;
use wasm_bindgen::JsValue;

/// Global the host page may define to override defaults.
pub const CONFIG_GLOBAL: &str = "__TASK_BOARD_CONFIG__";

#[derive(Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct BoardConfig {
    pub node_width: f64,
    pub node_height: f64,
    /// Width of the band at each side of a card that starts a link instead of a drag.
    pub handle_zone: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    pub zoom_step: f64,
    pub wheel_zoom_factor: f64,
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub new_task_offset_x: f64,
    pub new_task_offset_y: f64,
    pub connector_hit_width: f64,
    pub analysis_delay_ms: u32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            node_width: 420.0,
            node_height: 64.0,
            handle_zone: 20.0,
            min_scale: 0.3,
            max_scale: 2.0,
            zoom_step: 0.1,
            wheel_zoom_factor: 1.1,
            canvas_width: 4000.0,
            canvas_height: 3000.0,
            new_task_offset_x: 80.0,
            new_task_offset_y: 32.0,
            connector_hit_width: 12.0,
            analysis_delay_ms: 3000,
        }
    }
}

impl BoardConfig {
    /// The one size every card is drawn and routed with.
    pub fn node_size(&self) -> Size {
        Size::new(self.node_width, self.node_height)
    }

    pub fn canvas_size(&self) -> Size {
        Size::new(self.canvas_width, self.canvas_height)
    }

    pub fn new_task_offset(&self) -> Point {
        Point::new(self.new_task_offset_x, self.new_task_offset_y)
    }

    pub fn validate(self) -> Result<Self> {
        let invalid = |reason: &str| {
            Err(BoardError::InvalidConfig {
                reason: reason.to_string(),
            })
        };
        if !(self.min_scale > 0.0) {
            return invalid("min_scale must be positive");
        }
        if self.min_scale > self.max_scale {
            return invalid("min_scale must not exceed max_scale");
        }
        if !(self.node_width > 0.0 && self.node_height > 0.0) {
            return invalid("node size must be positive");
        }
        if self.handle_zone < 0.0 || self.handle_zone * 2.0 > self.node_width {
            return invalid("handle_zone must fit twice inside node_width");
        }
        if !(self.zoom_step > 0.0) || !(self.wheel_zoom_factor > 1.0) {
            return invalid("zoom steps must grow the scale");
        }
        Ok(self)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str::<BoardConfig>(json)
            .map_err(|e| BoardError::InvalidConfig { reason: e.to_string() })?
            .validate()
    }

    fn from_js(value: JsValue) -> Result<Self> {
        serde_wasm_bindgen::from_value::<BoardConfig>(value)
            .map_err(|e| BoardError::InvalidConfig { reason: e.to_string() })?
            .validate()
    }
}

/// Reads `window.__TASK_BOARD_CONFIG__`, falling back to defaults when the
/// global is absent or invalid.
pub fn load_config() -> BoardConfig {
    let value = web_sys::window()
        .and_then(|w| js_sys::Reflect::get(&w, &JsValue::from_str(CONFIG_GLOBAL)).ok())
        .filter(|v| !v.is_undefined() && !v.is_null());

    match value {
        None => BoardConfig::default(),
        Some(value) => match BoardConfig::from_js(value) {
            Ok(config) => {
                info!("task-board: using config from window.{}", CONFIG_GLOBAL);
                config
            }
            Err(e) => {
                warn!("task-board: {}; using defaults", e);
                BoardConfig::default()
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_card_layout() {
        let config = BoardConfig::default();
        assert_eq!(config.node_size(), Size::new(420.0, 64.0));
        assert_eq!(config.handle_zone, 20.0);
        assert_eq!((config.min_scale, config.max_scale), (0.3, 2.0));
        assert_eq!(config.new_task_offset(), Point::new(80.0, 32.0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config = BoardConfig::from_json(r#"{ "node_width": 320, "node_height": 180 }"#).unwrap();
        assert_eq!(config.node_size(), Size::new(320.0, 180.0));
        assert_eq!(config.zoom_step, 0.1);
        assert_eq!(config.connector_hit_width, 12.0);
    }

    #[test]
    fn empty_object_is_default() {
        assert_eq!(BoardConfig::from_json("{}").unwrap(), BoardConfig::default());
    }

    #[test]
    fn rejects_non_positive_min_scale() {
        let err = BoardConfig::from_json(r#"{ "min_scale": 0 }"#).unwrap_err();
        assert!(matches!(err, BoardError::InvalidConfig { .. }));
    }

    #[test]
    fn rejects_inverted_scale_range() {
        let err = BoardConfig::from_json(r#"{ "min_scale": 3.0 }"#).unwrap_err();
        assert!(err.to_string().contains("max_scale"));
    }

    #[test]
    fn rejects_oversized_handle_zone() {
        assert!(BoardConfig::from_json(r#"{ "handle_zone": 300 }"#).is_err());
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(BoardConfig::from_json("{ node_width: ").is_err());
    }
}
