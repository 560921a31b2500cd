//! Canonicalisation of raw camera configurations.
//!
//! A camera's live `config.json` (or a file exported from it) lists every
//! V4L control in `properties`, including vendor `raw_*` duplicates and the
//! auto/manual pairs for white balance and exposure.  The settings document
//! keeps the well-known controls as top-level fields instead.

use frcvision_types::{CameraConfig, ControlValue, PropertyKv};
use serde_json::Value;

const BRIGHTNESS: &str = "brightness";
const WHITE_BALANCE_AUTO: &str = "white_balance_temperature_auto";
const WHITE_BALANCE: &str = "white_balance_temperature";
const EXPOSURE_AUTO: &str = "exposure_auto";
const EXPOSURE: &str = "exposure_absolute";
const RAW_PREFIX: &str = "raw_";

/// V4L `exposure_auto` menu value meaning aperture-priority (automatic).
const EXPOSURE_AUTO_APERTURE_PRIORITY: f64 = 3.0;

fn has_control(properties: &[PropertyKv], name: &str, pred: impl Fn(&Value) -> bool) -> bool {
    properties.iter().any(|p| p.name == name && pred(&p.value))
}

/// Produce the canonical form of `data`.
///
/// `existing` is the display entry being replaced; its `name` and `path`
/// fill in when `data` lacks them.  Nothing else is merged.
pub fn normalize_camera(mut data: CameraConfig, existing: &CameraConfig) -> CameraConfig {
    if data.name.is_none() {
        data.name = existing.name.clone();
    }
    if data.path.is_none() {
        data.path = existing.path.clone();
    }

    let Some(properties) = data.properties.take() else {
        return data;
    };

    let wb_auto = has_control(&properties, WHITE_BALANCE_AUTO, |v| *v == Value::Bool(true));
    let exposure_auto = has_control(&properties, EXPOSURE_AUTO, |v| {
        v.as_f64() == Some(EXPOSURE_AUTO_APERTURE_PRIORITY)
    });

    let mut kept = Vec::with_capacity(properties.len());
    for prop in properties {
        match prop.name.as_str() {
            name if name.starts_with(RAW_PREFIX) => {}
            BRIGHTNESS => {
                if let Some(v) = ControlValue::from_json(&prop.value) {
                    data.brightness = Some(v);
                }
            }
            WHITE_BALANCE_AUTO | EXPOSURE_AUTO => {}
            WHITE_BALANCE => {
                if !wb_auto && let Some(v) = ControlValue::from_json(&prop.value) {
                    data.white_balance = Some(v);
                }
            }
            EXPOSURE => {
                if !exposure_auto && let Some(v) = ControlValue::from_json(&prop.value) {
                    data.exposure = Some(v);
                }
            }
            _ => kept.push(prop),
        }
    }

    if wb_auto {
        data.white_balance = Some(ControlValue::auto());
    }
    if exposure_auto {
        data.exposure = Some(ControlValue::auto());
    }
    data.properties = Some(kept);
    data
}
