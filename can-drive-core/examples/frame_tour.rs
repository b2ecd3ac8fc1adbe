//! Walk through the protocol offline
//!
//! Decodes one sample frame per known identifier, then encodes a few drive
//! commands and prints the frames that would go on the bus.
//!
//! Usage:
//!   cargo run --example frame_tour

use can_drive_core::signals::SIGNAL_TABLE;
use can_drive_core::{decode, encode, DriveCommand};

const SAMPLES: &[(u32, [u8; 8])] = &[
    (0x303, [0x01, 0x01, 0x84, 0x03, 0x00, 0x00, 0x00, 0x00]),
    (0x314, [0x01, 0x2C, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00]),
    (0x304, [0xE8, 0x03, 0x96, 0x00, 0x90, 0x01, 0x00, 0x00]),
    (0x301, [0x01, 0x90, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00]),
    (0x18F, [0x00, 0xD4, 0xFE, 0x00, 0x00, 0x00, 0x1E, 0x00]),
    (0x060, [0xF0, 0x01, 0x10, 0x27, 0x00, 0x00, 0x00, 0x00]),
    (0x160, [0x0A, 0x04, 0x29, 0x40, 0x1F, 0x00, 0x00, 0x00]),
    (0x0A0, [0x00, 0x00, 0x10, 0x01, 0x32, 0x00, 0x00, 0x5F]),
];

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("=== INBOUND ({} message types) ===", SIGNAL_TABLE.len());
    for (can_id, data) in SAMPLES {
        let decoded = decode(*can_id, data);
        println!(
            "\n0x{:03X} {}",
            can_id,
            decoded.message_name.unwrap_or("<unknown>")
        );
        for signal in &decoded.signals {
            println!("  {:<28} {}", signal.label(), signal.value);
        }
        for error in &decoded.errors {
            println!("  ! {}", error);
        }
    }

    println!("\n=== OUTBOUND ===");
    for (speed, angle) in [(10.0, 0.0), (-5.0, 0.0), (3.0, 12.5), (0.0, 0.0)] {
        let command = match DriveCommand::new(speed, angle) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("Rejected: {}", e);
                continue;
            }
        };
        println!("\n{}", command);
        for frame in &encode(&command) {
            println!("  {}", frame);
        }
    }
}
