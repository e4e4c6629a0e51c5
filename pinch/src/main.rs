//! pinch-replay - drive the pinch recognizer with a synthetic hand.
//!
//! Plays an open → close → hold → release sequence through a
//! `PinchTracker` and prints every event as an s-expression.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use pinch_gesture::vr::config::PinchConfig;
use pinch_gesture::vr::gesture::PinchTracker;
use pinch_gesture::vr::hand_tracking::Hand;
use pinch_gesture::vr::synthetic::{overhead_viewer, HandFactory, HandShape};

/// Gap between index and thumb with the hand open.
const OPEN_GAP: f32 = 0.08;
/// Gap once the pinch is closed.
const CLOSED_GAP: f32 = 0.01;

#[derive(Parser, Debug)]
#[command(name = "pinch-replay", about = "Replay a synthetic pinch through the recognizer")]
struct Cli {
    /// S-expression config file (keyword plist)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Hand to animate: left or right
    #[arg(long, default_value = "right", value_parser = parse_hand)]
    hand: Hand,

    /// Open-hand frames before the pinch closes
    #[arg(long, default_value_t = 20)]
    frames_open: usize,

    /// Frames taken to close from open to pinched
    #[arg(long, default_value_t = 10)]
    approach_frames: usize,

    /// Frames the pinch is held closed
    #[arg(long, default_value_t = 10)]
    hold_frames: usize,

    /// Open-hand frames after the release
    #[arg(long, default_value_t = 10)]
    release_frames: usize,

    /// Frame time in milliseconds
    #[arg(long, default_value_t = 11.1)]
    dt_ms: f32,

    /// Gate activation on strength velocity
    #[arg(long)]
    use_velocities: bool,

    /// Log recognizer decisions at debug level
    #[arg(long)]
    verbose: bool,
}

fn parse_hand(s: &str) -> Result<Hand, String> {
    Hand::from_str(s).ok_or_else(|| format!("unknown hand: {s}. Use: left or right"))
}

/// Index/thumb gap for every frame of the replay.
fn gap_schedule(cli: &Cli) -> Vec<f32> {
    let mut gaps = vec![OPEN_GAP; cli.frames_open];
    let steps = cli.approach_frames.max(1);
    for i in 0..cli.approach_frames {
        let t = if steps > 1 { i as f32 / (steps - 1) as f32 } else { 1.0 };
        gaps.push(OPEN_GAP + (CLOSED_GAP - OPEN_GAP) * t);
    }
    gaps.extend(std::iter::repeat(CLOSED_GAP).take(cli.hold_frames));
    gaps.extend(std::iter::repeat(OPEN_GAP).take(cli.release_frames));
    gaps
}

fn load_config(cli: &Cli) -> anyhow::Result<PinchConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            PinchConfig::from_sexp(&raw)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => PinchConfig::default(),
    };
    if cli.use_velocities {
        config.use_velocities = true;
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "pinch_gesture=debug"
    } else {
        "pinch_gesture=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli)?;
    info!("pinch-replay v{} ({} hand)", env!("CARGO_PKG_VERSION"), cli.hand.as_str());
    info!("config: {}", config.config_sexp());

    let factory = HandFactory::standard();
    let viewer = overhead_viewer(HandShape::open().position);
    let dt = cli.dt_ms / 1000.0;
    let mut tracker = PinchTracker::new(config);

    for (frame, gap) in gap_schedule(&cli).into_iter().enumerate() {
        let snapshot = factory.build(cli.hand, &HandShape::pinching(gap));
        let (left, right) = match cli.hand {
            Hand::Left => (Some(&snapshot), None),
            Hand::Right => (None, Some(&snapshot)),
        };
        for event in tracker.update(left, right, &viewer, dt) {
            println!("{} {}", frame, event.to_sexp());
        }
    }

    println!("{}", tracker.status_sexp());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gap_schedule() {
        let cli = Cli::parse_from([
            "pinch-replay",
            "--frames-open",
            "2",
            "--approach-frames",
            "3",
            "--hold-frames",
            "1",
            "--release-frames",
            "1",
        ]);
        let gaps = gap_schedule(&cli);
        assert_eq!(gaps.len(), 7);
        assert_eq!(gaps[0], OPEN_GAP);
        assert_eq!(gaps[2], OPEN_GAP);
        assert!((gaps[3] - 0.045).abs() < 1e-6, "got {}", gaps[3]);
        assert!((gaps[4] - CLOSED_GAP).abs() < 1e-6);
        assert_eq!(gaps[5], CLOSED_GAP);
        assert_eq!(gaps[6], OPEN_GAP);
    }

    #[test]
    fn test_parse_hand() {
        assert_eq!(parse_hand("left"), Ok(Hand::Left));
        assert!(parse_hand("both").is_err());
    }

    #[test]
    fn test_use_velocities_flag_overrides_config() {
        let cli = Cli::parse_from(["pinch-replay", "--use-velocities"]);
        assert!(load_config(&cli).expect("default config").use_velocities);
    }
}
