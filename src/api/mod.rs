//! Fleet API client for energy site telemetry

pub mod client;

pub use client::FleetClient;
