//! Hunt command: play the latent-space word hunt from the terminal.

use crate::gateway::GatewayClient;
use carnival::{FeatureHuntSession, HuntEvent, InferenceService, Target};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::info;

/// A line of player input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Guess(String),
    ZoomIn,
    ZoomOut,
    Reset,
    Clear,
    Map,
    Quit,
}

impl Input {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        Some(match line {
            ":zoom-in" | "+" => Input::ZoomIn,
            ":zoom-out" | "-" => Input::ZoomOut,
            ":reset" => Input::Reset,
            ":clear" => Input::Clear,
            ":map" => Input::Map,
            ":quit" | ":q" => Input::Quit,
            guess => Input::Guess(guess.to_string()),
        })
    }
}

pub async fn run(server: &str, target: Target) -> anyhow::Result<()> {
    info!("Connecting word hunt to {}", server);
    let client = GatewayClient::new(server);
    let stdin = BufReader::new(tokio::io::stdin());

    println!("FeatureHunt");
    println!("===========");
    println!("Guess the hidden word. Each guess lands on the latent map;");
    println!("commands: :map  :zoom-in (+)  :zoom-out (-)  :reset  :clear  :quit");
    println!();

    let session = play(stdin, &client, target).await?;
    println!("Session over after {} attempts.", session.attempts());
    Ok(())
}

/// Reads input until EOF or `:quit`, returning the final session.
pub async fn play<R>(
    input: R,
    service: &dyn InferenceService,
    target: Target,
) -> anyhow::Result<FeatureHuntSession>
where
    R: AsyncBufRead + Unpin,
{
    let mut session = FeatureHuntSession::new(target);
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await? {
        let Some(command) = Input::parse(&line) else {
            continue;
        };
        match command {
            Input::Guess(raw) => match session.guess(&raw, service).await {
                Ok(outcome) => {
                    let scalar = outcome
                        .result
                        .scalar
                        .map(|s| format!("{s:.3}"))
                        .unwrap_or_else(|| "-".to_string());
                    println!(
                        "{} -> ({:.3}, {:.3}) activation {}",
                        outcome.result.word, outcome.result.coords[0], outcome.result.coords[1], scalar
                    );
                    if let Some(HuntEvent::Won { word, score, attempts }) = outcome.event {
                        println!();
                        println!("Congratulations! You found the hidden word: {word}!");
                        println!(
                            "Your Score: {score}  (found in {attempts} {})",
                            if attempts == 1 { "attempt" } else { "attempts" }
                        );
                        println!();
                    }
                }
                Err(err) => println!("{err}"),
            },
            Input::ZoomIn => {
                session.zoom_in();
                print_map(&session);
            }
            Input::ZoomOut => {
                session.zoom_out();
                print_map(&session);
            }
            Input::Reset => {
                session.reset_view();
                print_map(&session);
            }
            Input::Clear => match session.clear() {
                Ok(()) => println!("Cleared."),
                Err(err) => println!("{err}"),
            },
            Input::Map => print_map(&session),
            Input::Quit => break,
        }
    }

    Ok(session)
}

fn print_map(session: &FeatureHuntSession) {
    let view = session.map_view();
    println!(
        "view {:.1} x {:.1}",
        view.viewport_width, view.viewport_height
    );
    for marker in session.markers() {
        println!(
            "  {:<10} left {:>5.1}%  top {:>5.1}%",
            marker.word.as_str(),
            marker.left,
            marker.top
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use carnival::{InferenceError, LatentPosition, PointSet, Prediction, Word};

    struct Echo;

    #[async_trait]
    impl InferenceService for Echo {
        async fn classify(&self, _points: &PointSet) -> Result<Prediction, InferenceError> {
            Ok(Prediction { label: None })
        }

        async fn locate(&self, word: &Word) -> Result<LatentPosition, InferenceError> {
            Ok(LatentPosition { coords: [word.as_str().len() as f64, 0.0], scalar: None })
        }
    }

    #[test]
    fn input_parsing() {
        assert_eq!(Input::parse("  "), None);
        assert_eq!(Input::parse("+"), Some(Input::ZoomIn));
        assert_eq!(Input::parse(":q"), Some(Input::Quit));
        assert_eq!(Input::parse(" Rain "), Some(Input::Guess("Rain".to_string())));
    }

    #[tokio::test]
    async fn scripted_game_stops_at_quit() {
        let script: &[u8] = b"rain\nrain\n:zoom-in\nwater\n:quit\nsnow\n";
        let session = play(script, &Echo, Target::default()).await.unwrap();
        assert_eq!(session.attempts(), 2);
        assert!(session.has_won());
        assert!((session.map_view().viewport_width - 80.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn clear_resets_mid_game() {
        let script: &[u8] = b"rain\n:clear\nsnow\n";
        let session = play(script, &Echo, Target::default()).await.unwrap();
        assert_eq!(session.attempts(), 1);
        assert_eq!(session.results()[0].word.as_str(), "snow");
    }
}
