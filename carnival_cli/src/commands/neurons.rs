//! Neurons command: inspect the activation map at a screen position.

use anyhow::Context;
use carnival::core_modules::activation_map::{
    MAP_HEIGHT, MAP_WIDTH, ZoomTransform, default_markers, hit_test, knob_rotation,
};

/// Parses `"sx,sy"`.
pub fn parse_position(raw: &str) -> anyhow::Result<(f64, f64)> {
    let (x, y) = raw
        .split_once(',')
        .with_context(|| format!("position '{raw}' is not of the form sx,sy"))?;
    Ok((
        x.trim().parse().with_context(|| format!("bad x in '{raw}'"))?,
        y.trim().parse().with_context(|| format!("bad y in '{raw}'"))?,
    ))
}

/// Applies `steps` zoom clicks; negative steps zoom out.
pub fn zoomed(steps: i32) -> ZoomTransform {
    let mut transform = ZoomTransform::default();
    for _ in 0..steps.unsigned_abs() {
        if steps > 0 {
            transform.zoom_in();
        } else {
            transform.zoom_out();
        }
    }
    transform
}

pub fn run(at: Option<&str>, zoom: i32, radius: f64) -> anyhow::Result<()> {
    let transform = zoomed(zoom);
    let markers = default_markers();

    println!("Activation map {MAP_WIDTH}x{MAP_HEIGHT} at {:.0}%", transform.scale * 100.0);
    println!("============================");
    for marker in &markers {
        let (sx, sy) = transform.to_screen(marker.x, marker.y);
        println!("  #{:<2} {:<8} screen ({sx:>6.1}, {sy:>6.1})", marker.id, marker.label);
    }

    let Some(at) = at else {
        return Ok(());
    };
    let (sx, sy) = parse_position(at)?;
    let (mx, my) = transform.to_map(sx, sy);
    println!();
    match hit_test(&markers, mx, my, radius) {
        Some(marker) => {
            println!("{} ({:.0}, {:.0}): {}", marker.label, marker.x, marker.y, marker.description);
            // Knob shows how close the pointer is to the marker centre.
            let distance = ((marker.x - mx).powi(2) + (marker.y - my).powi(2)).sqrt();
            let strength = 1.0 - (distance / radius).min(1.0);
            println!(
                "Strength {:.2}, knob at {:.0} degrees",
                strength,
                knob_rotation(strength, 0.0, 1.0)
            );
        }
        None => println!("No feature within {radius} of map ({mx:.1}, {my:.1})"),
    }
    Ok(())
}
