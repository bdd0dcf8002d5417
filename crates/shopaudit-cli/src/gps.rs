//! `gps` subcommands: single-visit validation from flags and whole-shop
//! reports from a JSON dump of the shop record.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Subcommand;
use shopaudit_core::{
    gps_report, validate_visit, AppConfig, Coordinates, EventLocation, VisitEvent, VisitLocation,
};

#[derive(Debug, Subcommand)]
pub enum GpsCommands {
    /// Validate one visit's event coordinates against the shop
    Validate {
        #[arg(long, allow_negative_numbers = true)]
        shop_lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        shop_lng: f64,
        #[arg(long, allow_negative_numbers = true, requires = "start_lng")]
        start_lat: Option<f64>,
        #[arg(long, allow_negative_numbers = true, requires = "start_lat")]
        start_lng: Option<f64>,
        #[arg(long, allow_negative_numbers = true, requires = "photo_lng")]
        photo_lat: Option<f64>,
        #[arg(long, allow_negative_numbers = true, requires = "photo_lat")]
        photo_lng: Option<f64>,
        #[arg(long, allow_negative_numbers = true, requires = "proceed_lng")]
        proceed_lat: Option<f64>,
        #[arg(long, allow_negative_numbers = true, requires = "proceed_lat")]
        proceed_lng: Option<f64>,
        /// Acceptable drift in meters (defaults to `SHOPAUDIT_GPS_RADIUS_M`)
        #[arg(long)]
        radius: Option<f64>,
    },
    /// Validate every visit stored on a shop record
    Report {
        /// JSON file holding the shop record with its visits
        path: PathBuf,
        /// Acceptable drift in meters (defaults to `SHOPAUDIT_GPS_RADIUS_M`)
        #[arg(long)]
        radius: Option<f64>,
    },
}

pub(crate) fn run(config: &AppConfig, command: GpsCommands) -> anyhow::Result<()> {
    match command {
        GpsCommands::Validate {
            shop_lat,
            shop_lng,
            start_lat,
            start_lng,
            photo_lat,
            photo_lng,
            proceed_lat,
            proceed_lng,
            radius,
        } => {
            let radius = resolve_radius(radius, config)?;
            let mut visit = VisitLocation::default();
            for (event, lat, lng) in [
                (VisitEvent::StartAudit, start_lat, start_lng),
                (VisitEvent::PhotoClick, photo_lat, photo_lng),
                (VisitEvent::ProceedClick, proceed_lat, proceed_lng),
            ] {
                if lat.is_some() || lng.is_some() {
                    visit.set_event(
                        event,
                        EventLocation {
                            latitude: lat,
                            longitude: lng,
                        },
                    );
                }
            }

            let result = validate_visit(Some(Coordinates::new(shop_lat, shop_lng)), &visit, radius);
            crate::print_json(&result)
        }
        GpsCommands::Report { path, radius } => {
            let radius = resolve_radius(radius, config)?;
            let shop = read_json(&path)?;
            let report = gps_report(&shop, radius);
            tracing::info!(
                path = %path.display(),
                visits = report.total_visits,
                valid = report.counts.valid,
                "shop GPS report built"
            );
            crate::print_json(&report)
        }
    }
}

/// Flag override, falling back to the configured default radius.
pub(crate) fn resolve_radius(requested: Option<f64>, config: &AppConfig) -> anyhow::Result<f64> {
    match requested {
        None => Ok(config.gps_radius_m),
        Some(r) if r.is_finite() && r >= 0.0 => Ok(r),
        Some(r) => anyhow::bail!("--radius must be a non-negative number of meters, got {r}"),
    }
}

pub(crate) fn read_json(path: &Path) -> anyhow::Result<serde_json::Value> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not valid JSON", path.display()))
}
