use anyhow::Result;
use clap::Parser;
use floodroute_cli::{init_tracing, parse_coordinate, Config};
use floodroute_core::engine::{EdgeCostRequest, RouteRiskEngine};
use floodroute_inference::InferenceClient;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Inference backend URL (defaults to FLOODROUTE_INFERENCE_URL)
    #[arg(long)]
    url: Option<String>,

    /// Edge start as LAT,LON
    #[arg(long)]
    from: String,

    /// Edge end as LAT,LON
    #[arg(long)]
    to: String,

    /// Current traffic speed in km/h
    #[arg(long, default_value_t = 40.0)]
    speed_kmh: f64,

    /// Rain intensity multiplier
    #[arg(long, default_value_t = 1.0)]
    rain: f64,

    /// Precomputed edge length in meters (haversine when omitted)
    #[arg(long)]
    distance_m: Option<f64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = Config::from_env();

    let start = parse_coordinate(&args.from)?;
    let end = parse_coordinate(&args.to)?;

    let url = args.url.unwrap_or(config.inference_url);
    let engine = RouteRiskEngine::new(InferenceClient::new(url, config.inference_token));
    let cost = engine
        .edge_cost(
            start,
            end,
            EdgeCostRequest {
                distance_m: args.distance_m,
                traffic_speed_kmh: args.speed_kmh,
                rain_multiplier: args.rain,
            },
        )
        .await?;

    println!("Edge cost: {cost:.6} hours");

    Ok(())
}
