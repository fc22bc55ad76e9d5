use anyhow::Result;
use clap::Parser;
use floodroute_cli::{init_tracing, load_route, parse_coordinate, Config};
use floodroute_core::engine::{route_advisories, RouteRiskEngine};
use floodroute_inference::InferenceClient;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Inference backend URL (defaults to FLOODROUTE_INFERENCE_URL)
    #[arg(long)]
    url: Option<String>,

    /// Route file: JSON array of [lat, lon] pairs
    #[arg(long, conflicts_with_all = ["from", "to"])]
    route: Option<PathBuf>,

    /// Origin as LAT,LON
    #[arg(long, requires = "to")]
    from: Option<String>,

    /// Destination as LAT,LON
    #[arg(long, requires = "from")]
    to: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = Config::from_env();

    let path = if let Some(file) = &args.route {
        load_route(file)?
    } else if let (Some(from), Some(to)) = (&args.from, &args.to) {
        vec![parse_coordinate(from)?, parse_coordinate(to)?]
    } else {
        anyhow::bail!("provide --route or --from/--to");
    };

    let url = args.url.unwrap_or(config.inference_url);
    let engine = RouteRiskEngine::new(InferenceClient::new(url, config.inference_token));
    let analysis = engine.analyze_route(&path).await?;

    println!("Distance: {:.0} m", analysis.total_distance_m);
    println!(
        "Overall risk: {:.3} ({})",
        analysis.overall_risk,
        analysis.overall_level()
    );
    println!(
        "Max risk: {:.3}  Average risk: {:.3}",
        analysis.max_risk, analysis.average_risk
    );
    println!("Estimated time: {:.0} s", analysis.estimated_time_s);
    println!(
        "Recommended: {}",
        if analysis.is_recommended { "yes" } else { "no" }
    );

    if !analysis.segments.is_empty() {
        println!("Risk segments:");
        for segment in &analysis.segments {
            println!(
                "  {} samples {}..{} ({:.0} m)",
                segment.risk_level, segment.start_index, segment.end_index, segment.length_m
            );
        }
    }

    for advisory in route_advisories(&analysis) {
        println!("! {advisory}");
    }

    Ok(())
}
