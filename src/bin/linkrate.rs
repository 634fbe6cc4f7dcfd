//! linkrate - live per-interface network counter table.
//!
//! Samples `/sys/class/net/<dev>/statistics/*` every interval and prints
//! either per-interval deltas (default) or cumulative totals.
//!
//! Usage:
//!   linkrate                       # all devices, deltas, mbits
//!   linkrate --dev eth0,eth1 -s    # two devices, packets/bytes/errors only
//!   linkrate --device-regex 'eth.*' --rx-only --bytes
//!   linkrate --random -n 5         # simulated counters, five frames

use tikv_jemallocator::Jemalloc;
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::{ArgGroup, Parser};
use crossterm::cursor::MoveTo;
use crossterm::terminal::{Clear, ClearType};
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use linkrate::catalog::UnitMode;
#[cfg(target_os = "linux")]
use linkrate::collector::RealFs;
#[cfg(not(target_os = "linux"))]
use linkrate::collector::mock::MockFs;
use linkrate::collector::{
    CounterReader, DEFAULT_DEVICE_REGEX, DeviceSource, FileSystem, RandomReader, SysfsReader,
};
use linkrate::config::Settings;
use linkrate::engine::SnapshotEngine;
use linkrate::monitor::{DisplayMode, Monitor};

/// Live network interface counters.
#[derive(Parser)]
#[command(name = "linkrate", about = "Network device pps, bitrate and error monitor", version)]
#[command(group(ArgGroup::new("unit").args(["bits", "kbits", "mbits", "bytes"])))]
struct Args {
    /// Refresh interval in seconds.
    #[arg(short, long, default_value = "1")]
    interval: u64,

    /// Number of frames to print before exiting (0 = until interrupted).
    #[arg(short = 'n', long, default_value = "0")]
    iterations: u64,

    /// Comma-separated list of devices to monitor.
    #[arg(long = "devices", visible_alias = "dev", env = "LINKRATE_DEVICES", default_value = "")]
    devices: String,

    /// Regex that device names must fully match (ignored with --devices).
    #[arg(long, default_value = DEFAULT_DEVICE_REGEX)]
    device_regex: String,

    /// Hide the individual error kinds, show only packets, bytes and errors.
    #[arg(short, long)]
    simple: bool,

    /// Hide transmit counters.
    #[arg(long = "rx-only", visible_alias = "rx")]
    rx_only: bool,

    /// Show byte counters in bits.
    #[arg(long)]
    bits: bool,

    /// Show byte counters in kilobits.
    #[arg(long)]
    kbits: bool,

    /// Show byte counters in megabits (default).
    #[arg(long)]
    mbits: bool,

    /// Show byte counters unconverted.
    #[arg(long)]
    bytes: bool,

    /// Stop on read errors or when an error counter grows.
    #[arg(long = "assert-mode", visible_alias = "assert")]
    assert_mode: bool,

    /// Generate random counter values instead of reading sysfs.
    #[arg(long)]
    random: bool,

    /// Seed for --random, for reproducible output.
    #[arg(long, requires = "random")]
    seed: Option<u64>,

    /// Show cumulative totals instead of per-interval deltas.
    #[arg(long)]
    no_delta_mode: bool,

    /// Do not clear the screen between frames.
    #[arg(long)]
    no_clear: bool,

    /// Path to the network devices root (for testing/mocking).
    #[arg(long, env = "LINKRATE_NET_PATH", default_value = linkrate::collector::DEFAULT_NET_PATH)]
    net_path: PathBuf,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn unit(&self) -> UnitMode {
        if self.bits {
            UnitMode::Bits
        } else if self.kbits {
            UnitMode::Kbits
        } else if self.bytes {
            UnitMode::Bytes
        } else {
            UnitMode::Mbits
        }
    }

    fn into_settings(self) -> Settings {
        let unit = self.unit();
        Settings {
            devices: self.devices,
            device_regex: self.device_regex,
            rx_only: self.rx_only,
            simple: self.simple,
            assert_mode: self.assert_mode,
            unit,
            random: self.random,
            seed: self.seed,
            display: if self.no_delta_mode {
                DisplayMode::Raw
            } else {
                DisplayMode::Delta
            },
            net_path: self.net_path,
            interval: Duration::from_secs(self.interval),
            iterations: self.iterations,
            clear: !self.no_clear,
        }
    }
}

/// Initializes the tracing subscriber on stderr so logs do not mix with the
/// table. Default level is WARN for an interactive tool.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("linkrate={}", level).parse().expect("valid log directive"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Clears the terminal and homes the cursor.
fn clear_screen() -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    crossterm::execute!(stdout, Clear(ClearType::All), MoveTo(0, 0))
}

fn frame_title(settings: &Settings) -> String {
    format!(
        "{}  mode={} unit={}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        settings.display.name(),
        settings.unit.label()
    )
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);
    let settings = args.into_settings();

    info!("linkrate {} starting", env!("CARGO_PKG_VERSION"));
    info!(
        "Config: interval={}s, net_path={}, random={}, assert={}",
        settings.interval.as_secs(),
        settings.net_path.display(),
        settings.random,
        settings.assert_mode
    );

    #[cfg(target_os = "linux")]
    let fs = RealFs::new();
    #[cfg(not(target_os = "linux"))]
    let fs = MockFs::typical_host();

    std::process::exit(run(fs, &settings));
}

fn run<F: FileSystem + 'static>(fs: F, settings: &Settings) -> i32 {
    let source = DeviceSource::new(fs, &settings.net_path);
    let setup = match settings.setup(&source) {
        Ok(setup) => setup,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    info!("Monitoring {} device(s): {}", setup.devices.len(), setup.devices.join(","));

    let reader: Box<dyn CounterReader> = if settings.random {
        match settings.seed {
            Some(seed) => Box::new(RandomReader::with_seed(seed)),
            None => Box::new(RandomReader::new()),
        }
    } else {
        Box::new(SysfsReader::new(source.into_fs(), &settings.net_path))
    };

    let engine = SnapshotEngine::new(reader, setup.devices, setup.counters);
    let mut monitor = Monitor::new(engine, settings.display);

    // Setup graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("Failed to set Ctrl-C handler: {}", e);
    }

    let mut frames: u64 = 0;
    while running.load(Ordering::SeqCst) {
        match monitor.step() {
            Ok(table) => {
                if settings.clear
                    && let Err(e) = clear_screen()
                {
                    debug!("Failed to clear screen: {}", e);
                }
                let mut stdout = std::io::stdout().lock();
                let _ = writeln!(stdout, "{}\n{}", frame_title(settings), table);
                let _ = stdout.flush();

                if settings.assert_mode {
                    let hits = monitor.detected_errors();
                    if !hits.is_empty() {
                        for hit in &hits {
                            error!("{}: {} grew by {}", hit.device, hit.source_key, hit.value);
                        }
                        return 1;
                    }
                }
            }
            Err(e) if settings.assert_mode => {
                error!("Failed to sample counters: {}", e);
                eprintln!("Error: {}", e);
                return 1;
            }
            Err(e) => {
                warn!("Failed to sample counters: {}", e);
            }
        }

        frames += 1;
        if settings.iterations > 0 && frames >= settings.iterations {
            break;
        }

        // Sleep with periodic checks for shutdown signal
        let sleep_interval = Duration::from_millis(100);
        let mut remaining = settings.interval;
        while remaining > Duration::ZERO && running.load(Ordering::SeqCst) {
            let sleep_time = remaining.min(sleep_interval);
            std::thread::sleep(sleep_time);
            remaining = remaining.saturating_sub(sleep_time);
        }
    }

    debug!("Stopped after {} frame(s)", frames);
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_flags_are_exclusive_and_default_to_mbits() {
        let args = Args::try_parse_from(["linkrate"]).unwrap();
        assert_eq!(args.unit(), UnitMode::Mbits);

        let args = Args::try_parse_from(["linkrate", "--kbits"]).unwrap();
        assert_eq!(args.unit(), UnitMode::Kbits);

        assert!(Args::try_parse_from(["linkrate", "--bits", "--bytes"]).is_err());
    }

    #[test]
    fn aliases_map_to_settings() {
        let args = Args::try_parse_from([
            "linkrate",
            "--dev",
            "eth0,eth1",
            "--rx",
            "--assert",
            "--no-delta-mode",
            "--bytes",
        ])
        .unwrap();
        let settings = args.into_settings();
        assert_eq!(settings.devices, "eth0,eth1");
        assert!(settings.rx_only);
        assert!(settings.assert_mode);
        assert_eq!(settings.display, DisplayMode::Raw);
        assert_eq!(settings.unit, UnitMode::Bytes);
    }

    #[test]
    fn seed_requires_random() {
        assert!(Args::try_parse_from(["linkrate", "--seed", "3"]).is_err());
        let args = Args::try_parse_from(["linkrate", "--random", "--seed", "3"]).unwrap();
        assert_eq!(args.into_settings().seed, Some(3));
    }

    #[test]
    fn run_random_mode_with_iterations() {
        let settings = Settings {
            devices: "eth0".to_string(),
            random: true,
            seed: Some(9),
            iterations: 1,
            clear: false,
            ..Settings::default()
        };
        assert_eq!(run(linkrate::collector::MockFs::new(), &settings), 0);
    }

    #[test]
    fn run_fails_without_devices() {
        let settings = Settings {
            device_regex: "nothing".to_string(),
            iterations: 1,
            ..Settings::default()
        };
        assert_eq!(run(linkrate::collector::MockFs::typical_host(), &settings), 1);
    }
}
