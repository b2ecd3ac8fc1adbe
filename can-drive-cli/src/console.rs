//! Console rendering of the signal board

use can_drive_core::{DecodedFrame, SessionStats, SignalBoard};
use chrono::Local;
use std::fmt::Write;

const RULE: &str = "───────────────────────────────────────────────";

/// Render both views of the board as text tables
pub fn render_board(board: &SignalBoard) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "{:<8} {:<4} {:<18} {:>7}  {}", "CAN ID", "DLC", "Data", "Count", "Updated");
    for row in board.raw_rows() {
        let _ = writeln!(
            out,
            "0x{:<6X} {:<4} {:<18} {:>7}  {}",
            row.can_id,
            row.dlc,
            row.data,
            row.count,
            row.updated_at.with_timezone(&Local).format("%H:%M:%S%.3f")
        );
    }

    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "{:<32} {}", "Name", "Value");
    for row in board.signal_rows() {
        let _ = writeln!(out, "{:<32} {}", row.label, row.value);
    }
    let _ = writeln!(out, "{}", RULE);

    out
}

/// Render one offline-decoded frame
pub fn render_decoded(decoded: &DecodedFrame) -> String {
    let mut out = String::new();
    match decoded.message_name {
        Some(name) => {
            let _ = writeln!(out, "0x{:03X} {}", decoded.can_id, name);
        }
        None => {
            let _ = writeln!(out, "0x{:03X} is not in the signal table", decoded.can_id);
        }
    }
    for signal in &decoded.signals {
        let _ = writeln!(out, "  {:<32} {}", signal.label(), signal.value);
    }
    for error in &decoded.errors {
        let _ = writeln!(out, "  ✗ {}", error);
    }
    out
}

pub fn render_stats(stats: &SessionStats) -> String {
    format!(
        "Frames received: {}  Decode errors: {}  Drive frame sets sent: {}  Raw frames sent: {}",
        stats.frames_received, stats.decode_errors, stats.frame_sets_sent, stats.raw_frames_sent
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use can_drive_core::{decode, DisplaySink, RawFrame};

    #[test]
    fn test_render_board() {
        let mut board = SignalBoard::new();
        let data = [0x64, 0x00, 0x00, 0x00, 0, 0, 0, 0];
        board.raw_frame(&RawFrame::new(0x060, &data).unwrap());
        board.signals(0x060, &decode(0x060, &data).signals);

        let text = render_board(&board);
        assert!(text.contains("0x60"));
        assert!(text.contains("6400000000000000"));
        assert!(text.contains("Bus Voltage (V)"));
        assert!(text.contains("10.00"));
    }

    #[test]
    fn test_render_decoded_unknown() {
        let text = render_decoded(&decode(0x7FF, &[0; 8]));
        assert!(text.contains("not in the signal table"));
    }
}
