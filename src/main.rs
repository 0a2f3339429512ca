//! Headless player that drives `MpvPlayer` from a terminal and prints the
//! signals a UI host would receive.

use std::path::PathBuf;

use async_channel::Receiver;
use clap::Parser;
use mpv_declarative::{logging, CallMode, LogLevel, MpvPlayer, PlayerConfig, Signal};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
  /// File path or URL to play
  #[arg(value_name = "MEDIA")]
  media: String,

  /// Player config file (defaults to the per-user config)
  #[arg(short = 'c', long = "config", value_name = "FILE")]
  config: Option<PathBuf>,

  /// Initial volume, 0-100
  #[arg(long = "volume", value_name = "N")]
  volume: Option<i64>,

  /// Hardware decoding mode, e.g. `auto` or `no`
  #[arg(long = "hwdec", value_name = "MODE")]
  hwdec: Option<String>,

  /// Issue engine calls asynchronously
  #[arg(long = "async-calls")]
  async_calls: bool,

  /// Also decode and output video into a window of the engine's choosing
  #[arg(long = "video")]
  video: bool,

  /// Verbosity (-v info, -vv debug)
  #[arg(short = 'v', action = clap::ArgAction::Count)]
  verbose: u8,
}

fn load_config(args: &Args) -> mpv_declarative::Result<PlayerConfig> {
  let mut config = match &args.config {
    Some(path) => PlayerConfig::load(path)?,
    None => PlayerConfig::load_or_default()?,
  };
  config.log_level = match args.verbose {
    0 => LogLevel::Warning,
    1 => LogLevel::Info,
    _ => LogLevel::Debug,
  };
  if args.async_calls {
    config.call_mode = CallMode::Asynchronous;
  }
  if let Some(hwdec) = &args.hwdec {
    config.hwdec = hwdec.clone();
  }
  if !args.video {
    config.extra_options.entry("vo".to_string()).or_insert_with(|| "null".to_string());
  }
  Ok(config)
}

async fn run(mut player: MpvPlayer, signals: Receiver<Signal>) {
  let tasks = player.tasks();
  let mut started = false;

  loop {
    tokio::select! {
      task = tasks.next() => match task {
        Some(task) => player.handle_task(task),
        None => break,
      },
      signal = signals.recv() => {
        let Ok(signal) = signal else { break };
        match signal {
          Signal::PositionChanged | Signal::PercentPosChanged | Signal::AvsyncChanged | Signal::EstimatedVfFpsChanged => {
            log::trace!("{}", signal.name());
          }
          Signal::Loaded => {
            println!("loaded: {} ({} s)", player.media_title(), player.duration());
          }
          Signal::Playing => {
            started = true;
            println!("playing");
          }
          Signal::Stopped if started => {
            println!("stopped");
            break;
          }
          _ => println!("{}", signal.name()),
        }
      }
      _ = tokio::signal::ctrl_c() => {
        player.stop();
        break;
      }
    }
  }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
  let args = Args::parse();
  let config = load_config(&args)?;
  logging::init(config.log_level);

  let mut player = mpv_declarative::create_player(&config);
  let signals = player.signals();
  if let Some(volume) = args.volume {
    player.set_volume(volume);
  }
  if !player.open(&args.media) {
    return Err(format!("Cannot open {}", args.media).into());
  }

  let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
  runtime.block_on(run(player, signals));
  Ok(())
}
