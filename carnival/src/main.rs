// This file is an example of how to use the `carnival` library offline.
// The library entry point is `src/lib.rs`; live games go through
// `carnival_server` and `carnival_cli`.

use async_trait::async_trait;
use carnival::core_modules::coordinate_mapper::flatten;
use carnival::{
    AxisOrder, FeatureHuntSession, HuntEvent, InferenceError, InferenceService, LatentPosition,
    PointSet, Prediction, SketchpadSession, Word,
};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Canned answers so the walkthrough runs without network access.
struct Canned;

#[async_trait]
impl InferenceService for Canned {
    async fn classify(&self, points: &PointSet) -> Result<Prediction, InferenceError> {
        Ok(Prediction { label: Some(if points.len() > 3 { 8 } else { 3 }) })
    }

    async fn locate(&self, word: &Word) -> Result<LatentPosition, InferenceError> {
        let coords = match word.as_str() {
            "water" => [17.219, 7.771],
            "rain" => [19.5, 9.0],
            _ => [-40.0, 60.0],
        };
        Ok(LatentPosition { coords, scalar: Some(coords[0] / 20.0) })
    }

    fn name(&self) -> &'static str {
        "canned"
    }
}

#[tokio::main]
async fn main() -> Result<(), carnival::CarnivalError> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    println!("Carnival - Example Runner");
    let service = Canned;

    let mut pad = SketchpadSession::default();
    for (px, py) in [(15.0, 25.0), (35.0, 45.0), (140.0, 140.0)] {
        pad.click(px, py)?;
    }
    println!("Sketch xy: {:?}", flatten(pad.points(), AxisOrder::Xy));
    let prediction = pad.submit(&service).await?;
    println!("Classifier sees: {:?}", prediction.label);

    let mut hunt = FeatureHuntSession::default();
    for guess in ["Tree", "rain", "tree", "WATER"] {
        match hunt.guess(guess, &service).await {
            Ok(outcome) => {
                if let Some(HuntEvent::Won { word, score, attempts }) = outcome.event {
                    println!("Found '{word}' in {attempts} attempts, score {score}");
                }
            }
            Err(err) => println!("'{guess}' rejected: {err}"),
        }
    }
    for marker in hunt.markers() {
        println!("{:>10} at ({:.1}%, {:.1}%)", marker.word.as_str(), marker.left, marker.top);
    }
    Ok(())
}
