use std::time::Duration;

use clap::Parser;
use curvy_backend::{
    corridor::PgCorridorSource,
    curvy::CurvyRouteFinder,
    database::Database,
    engine::OsrmEngine,
    models::{validate_options, validate_waypoint, CurvyRouteOptions, Waypoint},
};
use shared::CurvyRouteResponse;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Find a route between two points that detours through curvy roads"
)]
struct Args {
    #[arg(long, allow_hyphen_values = true)]
    start_lng: f64,
    #[arg(long, allow_hyphen_values = true)]
    start_lat: f64,
    #[arg(long, allow_hyphen_values = true)]
    end_lng: f64,
    #[arg(long, allow_hyphen_values = true)]
    end_lat: f64,

    /// Search distance around the direct route, in meters
    #[arg(long, default_value_t = 15_000)]
    corridor_width: u32,
    #[arg(long, default_value_t = 500)]
    min_curvature: u32,
    /// Minimum segment length, in meters
    #[arg(long, default_value_t = 500)]
    min_segment_length: u32,
    #[arg(long, default_value_t = 20)]
    max_waypoints: usize,
    /// Longest acceptable route as a multiple of the direct route
    #[arg(long, default_value_t = 2.5)]
    max_detour_ratio: f64,

    #[arg(long, env = "OSRM_URL", default_value = "http://localhost:5000")]
    osrm_url: String,
    #[arg(long, env = "OSRM_TIMEOUT_SECS", default_value_t = 30)]
    osrm_timeout_secs: u64,
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,
    #[arg(long, env = "CORRIDOR_TIMEOUT_SECS", default_value_t = 10)]
    corridor_timeout_secs: u64,
}

impl Args {
    fn options(&self) -> CurvyRouteOptions {
        CurvyRouteOptions {
            corridor_width_m: self.corridor_width,
            min_curvature: self.min_curvature,
            min_segment_length_m: self.min_segment_length,
            max_waypoints: self.max_waypoints,
            max_detour_ratio: self.max_detour_ratio,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let start = Waypoint::new(args.start_lng, args.start_lat);
    let end = Waypoint::new(args.end_lng, args.end_lat);
    let options = args.options();
    validate_waypoint(&start)?;
    validate_waypoint(&end)?;
    validate_options(&options)?;

    let db = Database::connect(&args.database_url, 1).await?;
    let corridor = PgCorridorSource::new(
        db.into_pool(),
        Duration::from_secs(args.corridor_timeout_secs),
    );
    let engine = OsrmEngine::new(
        args.osrm_url.as_str(),
        Duration::from_secs(args.osrm_timeout_secs),
    )?;
    let finder = CurvyRouteFinder::new(engine, corridor);

    tracing::info!("finding curvy route {:?} -> {:?}", start, end);
    let result = finder.find_curvy_route(start, end, &options).await?;
    tracing::info!(
        "{:.1} km vs {:.1} km direct, {} segments, ratio {:.2}",
        result.route.distance_m / 1000.0,
        result.baseline_distance_m / 1000.0,
        result.waypoints_used,
        result.detour_ratio
    );

    let response = CurvyRouteResponse::from(result);
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}
