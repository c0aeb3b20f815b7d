use serde_json::Value;

fn config_f64(cfg: &Value, path: &[&str]) -> Option<f64> {
    let mut cur = cfg;
    for key in path {
        cur = cur.get(*key)?;
    }
    cur.as_f64()
        .or_else(|| cur.as_i64().map(|n| n as f64))
        .or_else(|| cur.as_u64().map(|n| n as f64))
}

/// Layout constants for one diagram.
///
/// `unit_width`/`unit_height` are the pixel footprint of a single layout leaf;
/// every internal node's width is a whole multiple of `unit_width`.
#[derive(Debug, Clone, PartialEq)]
pub struct DsTreeConfig {
    pub unit_width: f64,
    pub unit_height: f64,
    /// Duration of enter/update/exit transitions, in milliseconds.
    pub transition_ms: f64,
}

impl Default for DsTreeConfig {
    fn default() -> Self {
        Self {
            unit_width: 100.0,
            unit_height: 42.0,
            transition_ms: 500.0,
        }
    }
}

impl DsTreeConfig {
    /// Reads recognized options (`unitWidth`, `unitHeight`, `transitionMs`)
    /// from a JSON options object. Unrecognized keys are ignored; missing or
    /// non-numeric values fall back to the defaults.
    pub fn from_value(options: &Value) -> Self {
        let defaults = Self::default();
        Self {
            unit_width: config_f64(options, &["unitWidth"])
                .filter(|w| *w > 0.0)
                .unwrap_or(defaults.unit_width),
            unit_height: config_f64(options, &["unitHeight"])
                .filter(|h| *h > 0.0)
                .unwrap_or(defaults.unit_height),
            transition_ms: config_f64(options, &["transitionMs"])
                .filter(|d| *d >= 0.0)
                .unwrap_or(defaults.transition_ms),
        }
    }
}
