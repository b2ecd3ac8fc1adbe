//! CAN Drive CLI Application
//!
//! This is the command-line front end for the drive-control library.
//! It adds:
//! - Configuration loading with a default fallback
//! - Transport selection (SocketCAN)
//! - Console rendering of raw and decoded frames
//! - Drive, stop and manual-frame commands

use anyhow::{Context, Result};
use can_drive_core::{
    BusTransport, ControlConfig, DriveCommand, Session, SignalBoard, TransportError,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::{Duration, Instant};

mod config;
mod console;
mod input;

/// CAN Drive - monitor and actuate a vehicle over CAN
#[derive(Parser, Debug)]
#[command(name = "can-drive")]
#[command(about = "Monitor and actuate a vehicle over a CAN bus", long_about = None)]
#[command(version)]
struct Args {
    /// Path to configuration file (JSON, or TOML by extension)
    #[arg(short, long, value_name = "FILE", default_value = config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Override the CAN interface from the configuration
    #[arg(short, long, value_name = "NAME")]
    interface: Option<String>,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show raw and decoded frames as they arrive
    Monitor {
        /// Stop after this many seconds (default: run until disconnected)
        #[arg(short, long, value_name = "SECS")]
        duration: Option<f64>,

        /// Table refresh period in milliseconds
        #[arg(long, value_name = "MS", default_value_t = 1000)]
        refresh_ms: u64,
    },

    /// Send a drive command with heartbeat, then stop the vehicle
    Drive {
        /// Speed in km/h (negative for reverse)
        #[arg(short, long, allow_hyphen_values = true)]
        speed: f64,

        /// Steering angle in degrees (positive turns left)
        #[arg(short, long, allow_hyphen_values = true, default_value_t = 0.0)]
        angle: f64,

        /// How long to keep the command active, in seconds
        #[arg(short, long, value_name = "SECS", default_value_t = 5.0)]
        duration: f64,

        /// Table refresh period in milliseconds
        #[arg(long, value_name = "MS", default_value_t = 1000)]
        refresh_ms: u64,
    },

    /// Send the stop (zero) command once
    Stop,

    /// Send one frame: ID and data bytes in hex
    Send {
        /// CAN identifier (hex)
        id: String,
        /// Data bytes (hex, up to 8)
        bytes: Vec<String>,
    },

    /// Decode one frame offline: ID and data bytes in hex
    Decode {
        /// CAN identifier (hex)
        id: String,
        /// Data bytes (hex, up to 8)
        bytes: Vec<String>,
    },
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("CAN Drive CLI v{}", env!("CARGO_PKG_VERSION"));
    log::debug!("Using protocol library v{}", can_drive_core::VERSION);

    let mut config = config::load_config_or_default(&args.config);
    if let Some(interface) = &args.interface {
        config.interface = interface.clone();
    }

    match args.command {
        Command::Decode { id, bytes } => decode_mode(&id, &bytes),
        Command::Monitor {
            duration,
            refresh_ms,
        } => monitor_mode(config, duration, refresh_ms),
        Command::Drive {
            speed,
            angle,
            duration,
            refresh_ms,
        } => drive_mode(config, speed, angle, duration, refresh_ms),
        Command::Stop => stop_mode(config),
        Command::Send { id, bytes } => send_mode(config, &id, &bytes),
    }
}

/// Decode a frame given on the command line - no bus needed
fn decode_mode(id: &str, bytes: &[String]) -> Result<()> {
    let frame = input::parse_frame(id, bytes)?;
    let decoded = can_drive_core::FrameDecoder::decode_frame(&frame);
    print!("{}", console::render_decoded(&decoded));
    Ok(())
}

/// Poll the bus and refresh the tables until the duration ends or the link drops
fn monitor_mode(config: ControlConfig, duration: Option<f64>, refresh_ms: u64) -> Result<()> {
    let mut session = connect(config)?;
    let end = duration.map(|secs| Instant::now() + secs_to_duration(secs));

    let result = run_with_refresh(&mut session, end, refresh_ms);
    println!("{}", console::render_stats(&session.stats()));
    session.disconnect();
    result
}

/// Start a drive command, keep it alive for `duration`, then stop
fn drive_mode(
    config: ControlConfig,
    speed: f64,
    angle: f64,
    duration: f64,
    refresh_ms: u64,
) -> Result<()> {
    let command = DriveCommand::new(speed, angle).context("Invalid drive command")?;
    let mut session = connect(config)?;

    println!("Driving: {}", command);
    session.start_drive(command).context("Failed to send drive command")?;

    let end = Instant::now() + secs_to_duration(duration);
    let result = run_with_refresh(&mut session, Some(end), refresh_ms);

    if session.is_connected() {
        session.stop_drive().context("Failed to send stop command")?;
        println!("Stop command sent");
    }
    println!("{}", console::render_stats(&session.stats()));
    session.disconnect();
    result
}

fn stop_mode(config: ControlConfig) -> Result<()> {
    let mut session = connect(config)?;
    session.stop_drive().context("Failed to send stop command")?;
    println!("Stop command sent");
    session.disconnect();
    Ok(())
}

fn send_mode(config: ControlConfig, id: &str, bytes: &[String]) -> Result<()> {
    let frame = input::parse_frame(id, bytes)?;
    let mut session = connect(config)?;
    session.send_raw(&frame).context("Failed to send frame")?;
    println!("Sent {}", frame);
    session.disconnect();
    Ok(())
}

type CliSession = Session<Box<dyn BusTransport>, SignalBoard>;

fn connect(config: ControlConfig) -> Result<CliSession> {
    let transport = open_transport(&config.interface)
        .with_context(|| format!("Connection to '{}' failed", config.interface))?;
    Ok(Session::new(transport, SignalBoard::new(), config))
}

#[cfg(feature = "socketcan")]
fn open_transport(interface: &str) -> std::result::Result<Box<dyn BusTransport>, TransportError> {
    let transport = can_drive_core::SocketCanTransport::connect(interface)?;
    Ok(Box::new(transport))
}

#[cfg(not(feature = "socketcan"))]
fn open_transport(interface: &str) -> std::result::Result<Box<dyn BusTransport>, TransportError> {
    Err(TransportError::Unsupported(format!(
        "cannot open '{}': built without the socketcan feature",
        interface
    )))
}

fn run_with_refresh(session: &mut CliSession, end: Option<Instant>, refresh_ms: u64) -> Result<()> {
    let refresh = Duration::from_millis(refresh_ms.max(1));
    loop {
        let mut next = Instant::now() + refresh;
        if let Some(end) = end {
            next = next.min(end);
        }
        session.run_until(next)?;
        print!("{}", console::render_board(session.sink()));

        if end.is_some_and(|end| Instant::now() >= end) {
            return Ok(());
        }
    }
}

fn secs_to_duration(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_negative_drive_values() {
        let args = Args::parse_from(["can-drive", "drive", "--speed", "-5", "--angle", "-12.5"]);
        match args.command {
            Command::Drive { speed, angle, .. } => {
                assert_eq!(speed, -5.0);
                assert_eq!(angle, -12.5);
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert_eq!(args.config, PathBuf::from("can_config.json"));
    }

    #[test]
    fn test_secs_to_duration() {
        assert_eq!(secs_to_duration(1.5), Duration::from_millis(1500));
        assert_eq!(secs_to_duration(-1.0), Duration::ZERO);
        assert_eq!(secs_to_duration(f64::NAN), Duration::ZERO);
    }
}
