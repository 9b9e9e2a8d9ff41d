//! Sketch command: toggle cells of a digit, preview the edit, optionally classify it.

use crate::gateway::GatewayClient;
use anyhow::Context;
use carnival::core_modules::coordinate_mapper::format_drawn_coords;
use carnival::core_modules::perturbation;
use carnival::{AxisOrder, SketchpadSession, Toggle};
use std::path::Path;
use tracing::{info, warn};

pub struct SketchArgs<'a> {
    pub clicks: &'a str,
    pub base: Option<&'a Path>,
    pub preview: Option<&'a Path>,
    pub order: AxisOrder,
    pub submit: bool,
    pub server: &'a str,
}

/// Parses `"px,py px,py ..."` into canvas-relative click positions.
pub fn parse_clicks(raw: &str) -> anyhow::Result<Vec<(f64, f64)>> {
    raw.split_whitespace()
        .map(|pair| {
            let (x, y) = pair
                .split_once(',')
                .with_context(|| format!("click '{pair}' is not of the form px,py"))?;
            let x: f64 = x.trim().parse().with_context(|| format!("bad x in '{pair}'"))?;
            let y: f64 = y.trim().parse().with_context(|| format!("bad y in '{pair}'"))?;
            Ok((x, y))
        })
        .collect()
}

/// Replays `clicks` on a fresh sketchpad. Clicks off the canvas are reported and skipped.
pub fn replay(clicks: &[(f64, f64)]) -> SketchpadSession {
    let mut pad = SketchpadSession::default();
    for &(px, py) in clicks {
        match pad.click(px, py) {
            Ok((point, Toggle::Added)) => println!("+ ({}, {})", point.x, point.y),
            Ok((point, Toggle::Removed)) => println!("- ({}, {})", point.x, point.y),
            Err(err) => warn!(px, py, error = %err, "click ignored"),
        }
    }
    pad
}

pub async fn run(args: SketchArgs<'_>) -> anyhow::Result<()> {
    let clicks = parse_clicks(args.clicks)?;
    let mut pad = replay(&clicks);

    println!(
        "Drawn coordinates ({}): {}",
        args.order,
        format_drawn_coords(&pad.flattened(args.order))
    );

    if let Some(path) = args.preview {
        let geometry = pad.geometry();
        let grid = match args.base {
            Some(base) => {
                let image = perturbation::load_grayscale(base)
                    .with_context(|| format!("reading base digit {}", base.display()))?;
                perturbation::perturb(&image, pad.points())
            }
            None => perturbation::mask(pad.points()),
        };
        let canvas = perturbation::upscale(&grid, geometry.canvas_size);
        perturbation::save_png(&canvas, path)
            .with_context(|| format!("writing preview {}", path.display()))?;
        info!("Preview written to {}", path.display());
    }

    if args.submit {
        let client = GatewayClient::new(args.server);
        let prediction = pad.submit(&client).await?;
        match prediction.label {
            Some(label) => println!("Prediction: {label}"),
            None => println!("Prediction: (none)"),
        }
    }

    Ok(())
}
