//! Energy site live status

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Envelope wrapping every Fleet API payload
#[derive(Debug, Deserialize)]
pub struct LiveStatusEnvelope {
    pub response: Option<LiveStatus>,
}

/// Point-in-time power flows and operating mode of an energy site.
///
/// Every field is optional; `null` and absent are equivalent. Fields not
/// listed here are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LiveStatus {
    pub solar_power: Option<f64>,
    /// Positive when discharging
    pub battery_power: Option<f64>,
    /// Positive when importing
    pub grid_power: Option<f64>,
    pub load_power: Option<f64>,
    pub percentage_charged: Option<f64>,
    pub generator_power: Option<f64>,
    /// "Active" while the utility grid is up
    #[serde(default, deserialize_with = "string_or_none")]
    pub grid_status: Option<String>,
    /// "on_grid" or one of the islanded states
    #[serde(default, deserialize_with = "string_or_none")]
    pub island_status: Option<String>,
    #[serde(default, deserialize_with = "truthy")]
    pub storm_mode_active: Option<bool>,
}

/// Keep string values only. Any other JSON type can never match a status
/// name, so it is dropped instead of failing the whole payload.
fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

/// Loose truthiness: zero, empty strings and empty containers are false.
fn truthy<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::Bool(b)) => Some(b),
        Some(Value::Number(n)) => Some(n.as_f64().map_or(false, |n| n != 0.0)),
        Some(Value::String(s)) => Some(!s.is_empty()),
        Some(Value::Array(a)) => Some(!a.is_empty()),
        Some(Value::Object(o)) => Some(!o.is_empty()),
    })
}

impl LiveStatus {
    pub fn grid_active(&self) -> bool {
        self.grid_status.as_deref() == Some("Active")
    }

    pub fn on_grid(&self) -> bool {
        self.island_status.as_deref() == Some("on_grid")
    }

    pub fn storm_mode(&self) -> bool {
        self.storm_mode_active == Some(true)
    }
}
