//! Sample command - preview points drawn from the configured geofence.

use anyhow::Result;
use clap::Args;
use console::{Style, style};
use serde_json::json;

use super::{Context, geofence};

/// Arguments for the sample command.
#[derive(Args, Debug)]
pub struct SampleArgs {
    /// Number of points to draw
    #[arg(short = 'n', long, default_value_t = 5)]
    pub count: usize,
}

/// Run the sample command.
pub async fn run(args: SampleArgs, ctx: &Context) -> Result<()> {
    let loaded = ctx.load_config()?;
    let fence = geofence(&loaded.config.resolve_location()?);

    let points: Vec<_> = (0..args.count)
        .map(|_| {
            let point = fence.sample();
            (point, fence.center.distance_to(&point))
        })
        .collect();

    if ctx.json_output {
        let output: Vec<_> = points
            .iter()
            .map(|(p, distance)| {
                json!({
                    "latitude": p.latitude,
                    "longitude": p.longitude,
                    "distance_meters": (distance * 10.0).round() / 10.0,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let dim = Style::new().dim();
    println!(
        "{} {} ({} m)",
        style("Geofence").bold(),
        fence.center,
        fence.radius_meters
    );
    for (i, (point, distance)) in points.iter().enumerate() {
        println!(
            "{:>3}. {}  {}",
            style(i + 1).cyan(),
            point,
            dim.apply_to(format!("{:.1} m", distance))
        );
    }

    Ok(())
}
