//! squitter: decode hex squitter captures from the command line.

use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use comfy_table::{Cell, Table};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use squitter_core::config::{self, validate_receiver};
use squitter_core::{
    DecodeMode, Decoder, DecoderConfig, IcaoAddress, ModeSMessage, Position, TrackCache,
};

#[derive(Parser)]
#[command(name = "squitter", version, about = "Mode S / ADS-B squitter decoder")]
struct Cli {
    /// More log output (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Clone, Debug)]
struct ConfigArgs {
    /// Config file (default ~/.squitter/config.yaml)
    #[arg(long, env = "SQUITTER_CONFIG")]
    config: Option<PathBuf>,

    /// Treat header-only messages and unresolved positions as failures
    #[arg(long)]
    full: bool,

    /// Receiver latitude, used as a local-decode reference
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Receiver longitude, used as a local-decode reference
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode hex frames from a file and print an aircraft table
    Decode {
        /// File with one hex frame per line, optionally `HEX;TIMESTAMP` (`-` for stdin)
        file: PathBuf,

        /// Print one JSON object per decoded message instead of the table
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        opts: ConfigArgs,
    },

    /// Show the effective configuration, optionally writing it to the config file
    Config {
        #[command(flatten)]
        opts: ConfigArgs,

        /// Write the effective configuration back to the config file
        #[arg(long)]
        save: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Decode { file, json, opts } => cmd_decode(&file, json, &opts),
        Commands::Config { opts, save } => cmd_config(&opts, save),
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .init();
}

/// Load the config file and apply command-line overrides.
fn resolve_config(opts: &ConfigArgs) -> squitter_core::Result<DecoderConfig> {
    let mut cfg = match &opts.config {
        Some(path) => config::load_config_from(path)?,
        None => config::load_config()?,
    };
    if opts.full {
        cfg.mode = DecodeMode::Full;
    }
    if let (Some(lat), Some(lon)) = (opts.lat, opts.lon) {
        cfg.receiver = Some(validate_receiver(lat, lon)?);
    }
    Ok(cfg)
}

fn config_or_exit(opts: &ConfigArgs) -> DecoderConfig {
    resolve_config(opts).unwrap_or_else(|e| {
        eprintln!("Error loading config: {e}");
        std::process::exit(1);
    })
}

fn cmd_decode(file: &Path, json: bool, opts: &ConfigArgs) {
    let cfg = config_or_exit(opts);
    info!(mode = %cfg.mode, receiver = ?cfg.receiver, "decoding {}", file.display());

    let reader: Box<dyn BufRead> = if file.to_str() == Some("-") {
        Box::new(io::stdin().lock())
    } else {
        let f = std::fs::File::open(file).unwrap_or_else(|e| {
            eprintln!("Error opening {}: {e}", file.display());
            std::process::exit(1);
        });
        Box::new(io::BufReader::new(f))
    };

    let decoder = Decoder::new(cfg);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let sink: Option<&mut dyn Write> = if json { Some(&mut out) } else { None };

    let stats = decode_lines(reader, &decoder, sink).unwrap_or_else(|e| {
        eprintln!("Error writing output: {e}");
        std::process::exit(1);
    });

    if !json {
        print_summary(&stats);
    }
}

fn cmd_config(opts: &ConfigArgs, save: bool) {
    let cfg = config_or_exit(opts);
    println!("mode:              {}", cfg.mode);
    println!("pair_window:       {} s", cfg.pair_window_secs);
    println!("reference_max_age: {} s", cfg.reference_max_age_secs);
    match cfg.receiver {
        Some(pos) => println!("receiver:          {pos}"),
        None => println!("receiver:          -"),
    }

    if save {
        let result = match &opts.config {
            Some(path) => config::save_config_to(&cfg, path).map(|_| path.clone()),
            None => config::save_config(&cfg),
        };
        match result {
            Ok(path) => println!("\nSaved to {}", path.display()),
            Err(e) => {
                eprintln!("Error saving config: {e}");
                std::process::exit(1);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Line decoding
// ---------------------------------------------------------------------------

/// What the table shows for one aircraft.
#[derive(Debug, Default)]
struct AircraftSummary {
    callsign: Option<String>,
    wake_category: Option<&'static str>,
    altitude_ft: Option<i32>,
    position: Option<Position>,
    messages: u32,
}

impl AircraftSummary {
    fn update(&mut self, msg: &ModeSMessage) {
        self.messages += 1;
        if let Some(callsign) = msg.trimmed_callsign() {
            self.callsign = Some(callsign.to_string());
        }
        if msg.wake_category.is_some() {
            self.wake_category = msg.wake_category;
        }
        if msg.altitude_ft.is_some() {
            self.altitude_ft = msg.altitude_ft;
        }
        if msg.position.is_some() {
            self.position = msg.position;
        }
    }
}

#[derive(Debug, Default)]
struct DecodeStats {
    lines: u64,
    decoded: u64,
    failed: u64,
    aircraft: HashMap<IcaoAddress, AircraftSummary>,
}

/// Split a `HEX` or `HEX;TIMESTAMP` line. Returns `None` for blanks and comments.
fn parse_line(line: &str, next_timestamp: f64) -> Option<(&str, f64)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    match line.split_once(';') {
        Some((hex, ts)) => {
            let ts = ts
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|t| t.is_finite())
                .unwrap_or(next_timestamp);
            Some((hex.trim(), ts))
        }
        None => Some((line, next_timestamp)),
    }
}

/// Decode every line of `reader`, writing JSON lines to `json` when given.
fn decode_lines<R: BufRead>(
    reader: R,
    decoder: &Decoder,
    mut json: Option<&mut dyn Write>,
) -> io::Result<DecodeStats> {
    let mut tracks = TrackCache::new();
    let mut stats = DecodeStats::default();
    let mut timestamp = 0.0f64;

    for (lineno, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                debug!(line = lineno + 1, error = %e, "unreadable line");
                continue;
            }
        };
        let Some((hex, ts)) = parse_line(&line, timestamp) else {
            continue;
        };
        // Auto-increment for files without timestamps
        timestamp = ts + 0.1;
        stats.lines += 1;

        match decoder.decode(&mut tracks, hex, ts) {
            Ok(msg) => {
                stats.decoded += 1;
                if let Some(out) = json.as_deref_mut() {
                    serde_json::to_writer(&mut *out, &msg)?;
                    writeln!(out)?;
                }
                stats.aircraft.entry(msg.icao).or_default().update(&msg);
            }
            Err(e) => {
                stats.failed += 1;
                debug!(line = lineno + 1, %hex, error = %e, "decode failed");
            }
        }
    }

    info!(
        lines = stats.lines,
        decoded = stats.decoded,
        failed = stats.failed,
        tracks = tracks.len(),
        "input exhausted"
    );
    Ok(stats)
}

fn print_summary(stats: &DecodeStats) {
    println!();
    println!(
        "Frames: {} read, {} decoded, {} failed, {} aircraft",
        stats.lines,
        stats.decoded,
        stats.failed,
        stats.aircraft.len()
    );
    println!();

    if stats.aircraft.is_empty() {
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![
        "ICAO", "Callsign", "Wake category", "Alt (ft)", "Lat", "Lon", "Msgs",
    ]);

    let mut sorted: Vec<_> = stats.aircraft.iter().collect();
    sorted.sort_by_key(|(icao, ac)| (std::cmp::Reverse(ac.messages), **icao));

    for (icao, ac) in sorted {
        table.add_row(vec![
            Cell::new(icao),
            Cell::new(ac.callsign.as_deref().unwrap_or("-")),
            Cell::new(ac.wake_category.unwrap_or("-")),
            Cell::new(
                ac.altitude_ft
                    .map(|a| a.to_string())
                    .unwrap_or("-".into()),
            ),
            Cell::new(
                ac.position
                    .map(|p| format!("{:.4}", p.lat))
                    .unwrap_or("-".into()),
            ),
            Cell::new(
                ac.position
                    .map(|p| format!("{:.4}", p.lon))
                    .unwrap_or("-".into()),
            ),
            Cell::new(ac.messages),
        ]);
    }

    println!("{table}");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
