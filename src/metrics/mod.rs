//! Prometheus text exposition of a live status snapshot

use std::fmt;

use crate::models::LiveStatus;

/// Content type served with the rendered document
pub const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Ordered exposition lines, one HELP/TYPE/value group per gauge.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MetricsDocument {
    lines: Vec<String>,
}

impl MetricsDocument {
    fn gauge(&mut self, name: &str, help: &str, value: impl fmt::Display) {
        self.lines.push(format!("# HELP {} {}", name, help));
        self.lines.push(format!("# TYPE {} gauge", name));
        self.lines.push(format!("{} {}", name, value));
    }

    /// Emit the group only when the source field is present. Zero counts as
    /// present.
    fn optional_gauge(&mut self, name: &str, help: &str, value: Option<f64>) {
        if let Some(v) = value {
            self.gauge(name, help, v);
        }
    }
}

impl fmt::Display for MetricsDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

fn flag(value: bool) -> u8 {
    u8::from(value)
}

/// Render a snapshot. Metric names follow the community Powerwall Grafana
/// dashboard (ID 16053).
pub fn render(status: &LiveStatus) -> MetricsDocument {
    let mut doc = MetricsDocument::default();

    doc.optional_gauge(
        "tesla_solar_instant_power",
        "Solar power production in watts",
        status.solar_power,
    );
    doc.optional_gauge(
        "tesla_battery_instant_power",
        "Battery power in watts (positive=discharging)",
        status.battery_power,
    );
    doc.optional_gauge(
        "tesla_site_instant_power",
        "Grid power in watts (positive=importing)",
        status.grid_power,
    );
    doc.optional_gauge(
        "tesla_load_instant_power",
        "Home power consumption in watts",
        status.load_power,
    );
    doc.optional_gauge(
        "tesla_powerwall_state_of_charge_percentage",
        "Battery charge percentage",
        status.percentage_charged,
    );
    doc.optional_gauge(
        "tesla_powerwall_generator_power_watts",
        "Generator power in watts",
        status.generator_power,
    );

    // Mode flags are always emitted; a missing field reads as 0.
    doc.gauge(
        "tesla_powerwall_grid_active",
        "Whether grid is active (1=active, 0=down)",
        flag(status.grid_active()),
    );
    doc.gauge(
        "tesla_powerwall_on_grid",
        "Whether system is on grid (1=on_grid, 0=islanded)",
        flag(status.on_grid()),
    );
    doc.gauge(
        "tesla_powerwall_storm_mode_active",
        "Whether storm mode is active",
        flag(status.storm_mode()),
    );

    doc
}
