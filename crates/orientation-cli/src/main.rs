//! orientation — read fused device orientation from the command line.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail};
use orientation_core::{HubConfig, OrientationSample, ProviderError};
use orientation_hub::{OrientationHub, OrientationOptions, SimulatedProvider, SimulatedProviderConfig};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Options for the `watch` command.
#[derive(Debug)]
struct WatchArgs {
    options: OrientationOptions,
    count: usize,
}

fn resolve_config_dir() -> PathBuf {
    std::env::var("ORIENTATION_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

fn parse_watch_args(args: &[String]) -> anyhow::Result<WatchArgs> {
    let mut options = OrientationOptions::default();
    let mut count = 5;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let mut value = || {
            iter.next()
                .ok_or_else(|| anyhow!("{} needs a value", arg))
        };
        match arg.as_str() {
            "--frequency" => options.frequency = Some(value()?.parse()?),
            "--count" => count = value()?.parse()?,
            "--options" => options = OrientationOptions::parse(value()?)?,
            other => bail!("Unknown option: {}", other),
        }
    }

    Ok(WatchArgs { options, count })
}

fn build_hub() -> anyhow::Result<OrientationHub> {
    let sim_config = SimulatedProviderConfig::load(&resolve_config_dir());
    info!("Simulator config: {}", sim_config.config_path.display());

    let provider = Arc::new(SimulatedProvider::new(sim_config)?);
    Ok(OrientationHub::new(provider, HubConfig::from_env())?)
}

async fn run_current() -> anyhow::Result<()> {
    let hub = build_hub()?;
    let sample = hub.current_orientation().await?;
    println!("{}", serde_json::to_string(&sample)?);
    Ok(())
}

async fn run_watch(args: WatchArgs) -> anyhow::Result<()> {
    let hub = build_hub()?;
    let (tx, mut rx) = mpsc::unbounded_channel::<Result<OrientationSample, ProviderError>>();
    let err_tx = tx.clone();

    let id = hub.watch_orientation(
        move |sample| {
            let _ = tx.send(Ok(sample));
        },
        Some(Arc::new(move |err: ProviderError| {
            let _ = err_tx.send(Err(err));
        })),
        Some(args.options),
    );
    if let Some(frequency) = hub.watch_frequency(&id) {
        info!("Watch {} reporting every {}ms", id, frequency.as_millis());
    }

    let mut received = 0;
    while received < args.count {
        tokio::select! {
            msg = rx.recv() => match msg {
                Some(Ok(sample)) => {
                    println!("{}", serde_json::to_string(&sample)?);
                    received += 1;
                }
                Some(Err(err)) => {
                    hub.clear_watch(&id);
                    bail!("Sensor error: {}", err);
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    hub.clear_watch(&id);
    info!("Final hub status: {}", serde_json::to_string(&hub.status())?);
    Ok(())
}

fn print_help() {
    println!("orientation — fused device orientation (azimuth/pitch/roll)");
    println!();
    println!("Usage: orientation <command>");
    println!();
    println!("Commands:");
    println!("  current                  Print a single reading");
    println!("  watch [options]          Print readings at a fixed interval");
    println!("      --frequency <ms>     Interval between readings (default 10000)");
    println!("      --count <n>          Stop after n readings (default 5)");
    println!("      --options <json>     Request options as JSON, e.g. '{{\"frequency\":500}}'");
    println!("  help                     Show this help message");
    println!();
    println!("Environment:");
    println!("  ORIENTATION_CONFIG_DIR            Directory holding simulator.json");
    println!("  ORIENTATION_DEFAULT_FREQUENCY_MS  Default watch interval");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("current") => run_current().await,
        Some("watch") => run_watch(parse_watch_args(&args[2..])?).await,
        None | Some("--help") | Some("-h") | Some("help") => {
            print_help();
            Ok(())
        }
        Some(other) => {
            eprintln!("Unknown command: {}. Use 'orientation help' for usage.", other);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_watch_defaults() {
        let parsed = parse_watch_args(&[]).unwrap();
        assert_eq!(parsed.count, 5);
        assert_eq!(parsed.options, OrientationOptions::default());
    }

    #[test]
    fn test_watch_flags() {
        let parsed = parse_watch_args(&args(&["--frequency", "250", "--count", "3"])).unwrap();
        assert_eq!(parsed.options.frequency, Some(250));
        assert_eq!(parsed.count, 3);

        let parsed = parse_watch_args(&args(&["--options", r#"{"frequency": 750}"#])).unwrap();
        assert_eq!(parsed.options.frequency, Some(750));
    }

    #[test]
    fn test_watch_rejects_bad_input() {
        assert!(parse_watch_args(&args(&["--frequency"])).is_err());
        assert!(parse_watch_args(&args(&["--count", "many"])).is_err());
        assert!(parse_watch_args(&args(&["--options", "[1,2]"])).is_err());
        assert!(parse_watch_args(&args(&["--loud"])).is_err());
    }
}
