//! CLI entry point for the pollwatch file watcher.
//!
//! Watches a file or directory tree by polling and prints one line per
//! change until interrupted.
//!
//! # Usage
//!
//! ```bash
//! pollwatch [OPTIONS] <PATH>
//!
//! # Watch a directory, printing "create file /path/to/new.txt" style lines
//! pollwatch ./src
//!
//! # Poll every 250ms and print JSON lines
//! pollwatch --interval-ms 250 --format json ./src
//!
//! # Load options from a file
//! pollwatch --config pollwatch.json ./src
//! ```
//!
//! The exit status is non-zero when the watch ended because the path could
//! not be watched any more, and zero after Ctrl-C or SIGTERM.

#![deny(clippy::all)]
#![warn(missing_docs)]

use std::io::Write;

use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};
use pw_core::{Config, Event, WatchConfig};
use pw_watcher::PollWatcher;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Watch a file or directory for changes by polling.
///
/// Prints one line per created, modified, or destroyed file.
#[derive(Parser, Debug)]
#[command(name = "pollwatch", version, about, long_about = None)]
struct Cli {
    /// File or directory to watch.
    #[arg(env = "POLLWATCH_PATH")]
    path: Utf8PathBuf,

    /// JSON configuration file.
    #[arg(short, long, env = "POLLWATCH_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Pause between polls in milliseconds (overrides the config file).
    #[arg(long, env = "POLLWATCH_INTERVAL_MS")]
    interval_ms: Option<u64>,

    /// Do not descend into symlinked directories.
    #[arg(long)]
    no_follow_symlinks: bool,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text, env = "POLLWATCH_FORMAT")]
    format: OutputFormat,

    /// Enable verbose logging (debug level).
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long)]
    no_color: bool,
}

/// Event output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// `<effect> <kind> <path>` lines.
    Text,
    /// One JSON object per line.
    Json,
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects the `RUST_LOG` environment variable if set. Otherwise, uses
/// `debug` level if `--verbose` is set, or `info` level by default. Logs go
/// to stderr so they never mix with event output.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(format!("{level},tokio=warn"))
    });

    // Check if colors should be disabled (flag or NO_COLOR env var)
    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(use_ansi)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Builds the watch options: config file first, then CLI overrides.
///
/// # Errors
///
/// Returns an error if the config file cannot be loaded or the result is
/// invalid.
fn build_config(cli: &Cli) -> color_eyre::Result<WatchConfig> {
    let mut config = match &cli.config {
        Some(path) => Config::from_json_file(path)?.watch,
        None => WatchConfig::default(),
    };

    if let Some(interval_ms) = cli.interval_ms {
        config.poll_interval_ms = interval_ms;
    }
    if cli.no_follow_symlinks {
        config.traversal.follow_directory_symlinks = false;
    }

    config.validate()?;
    Ok(config)
}

// =============================================================================
// COMMAND IMPLEMENTATION
// =============================================================================

/// Watches until interrupted or until the session fails.
///
/// # Errors
///
/// Returns an error if the watcher cannot start, output cannot be written,
/// or the session ended on a failure.
async fn run_watch(cli: &Cli, config: WatchConfig) -> color_eyre::Result<()> {
    let mut watcher = PollWatcher::new(&cli.path, &config).await?;
    info!(
        path = %watcher.watch_path(),
        interval_ms = config.poll_interval_ms,
        "Watching"
    );

    let printed = print_events(&mut watcher, cli.format).await;
    let session = watcher.shutdown().await;

    printed?;
    session?;
    Ok(())
}

/// Prints events as they arrive until a shutdown signal or until the
/// session ends.
async fn print_events(watcher: &mut PollWatcher, format: OutputFormat) -> color_eyre::Result<()> {
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            event = watcher.recv() => match event {
                Some(event) => print_event(&event, format)?,
                None => return Ok(()),
            },
            () = &mut shutdown => return Ok(()),
        }
    }
}

/// Writes one event to stdout.
fn print_event(event: &Event, format: OutputFormat) -> color_eyre::Result<()> {
    let line = format_event(event, format)?;
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{line}")?;
    Ok(())
}

fn format_event(event: &Event, format: OutputFormat) -> color_eyre::Result<String> {
    match format {
        OutputFormat::Text => Ok(event.to_string()),
        OutputFormat::Json => serde_json::to_string(event)
            .map_err(|e| color_eyre::eyre::eyre!("Failed to serialize event: {}", e)),
    }
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl-C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("Received SIGTERM, shutting down");
            }
            Err(err) => {
                warn!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    // 1. Install color-eyre FIRST (before any potential panics)
    color_eyre::install()?;

    // 2. Parse CLI arguments
    let cli = Cli::parse();

    // 3. Initialize tracing (handles --no-color for log output)
    init_tracing(cli.verbose, cli.no_color);

    // 4. Resolve options and watch
    let config = build_config(&cli)?;
    run_watch(&cli, config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use pw_core::{Effect, PathKind};
    use std::fs;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("pollwatch").chain(args.iter().copied()))
            .expect("Failed to parse arguments")
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["./src"]);
        assert_eq!(cli.path, "./src");
        assert_eq!(cli.format, OutputFormat::Text);

        let config = build_config(&cli).expect("Config should build");
        assert_eq!(config, WatchConfig::default());
    }

    #[test]
    fn test_overrides_apply_over_config_file() {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let file = temp.path().join("pollwatch.json");
        fs::write(
            &file,
            r#"{"watch": {"poll_interval_ms": 500, "channel_capacity": 8}}"#,
        )
        .expect("Failed to write config");
        let file = file.to_str().expect("Invalid path");

        let cli = parse(&["--config", file, "--interval-ms", "40", "--no-follow-symlinks", "."]);
        let config = build_config(&cli).expect("Config should build");

        assert_eq!(config.poll_interval_ms, 40);
        assert_eq!(config.channel_capacity, 8);
        assert!(!config.traversal.follow_directory_symlinks);
        assert!(config.traversal.skip_permission_denied);
    }

    #[test]
    fn test_invalid_config_file_is_rejected() {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let file = temp.path().join("pollwatch.json");
        fs::write(&file, r#"{"watch": {"channel_capacity": 0}}"#).expect("Failed to write config");

        let cli = parse(&["--config", file.to_str().expect("Invalid path"), "."]);
        assert!(build_config(&cli).is_err());
    }

    #[test]
    fn test_format_event() {
        let event = Event::new("/w/a.txt", Effect::Modify, PathKind::File);

        let text = format_event(&event, OutputFormat::Text).expect("Format failed");
        assert_eq!(text, "modify file /w/a.txt");

        let json = format_event(&event, OutputFormat::Json).expect("Format failed");
        assert_eq!(json, r#"{"path":"/w/a.txt","effect":"modify","kind":"file"}"#);
    }
}
