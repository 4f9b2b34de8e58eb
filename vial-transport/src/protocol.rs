//! Protocol constants and report framing for VIA/Vial keyboards

use tracing::warn;

/// Logical report length (without the hidapi report ID byte)
pub const MSG_LEN: usize = 32;

/// Buffer size handed to hidapi (report ID + payload)
pub const REPORT_SIZE: usize = MSG_LEN + 1;

/// VIA commands (id_* in the VIA firmware)
pub mod cmd {
    pub const GET_PROTOCOL_VERSION: u8 = 0x01;
    pub const GET_KEYBOARD_VALUE: u8 = 0x02;
    pub const SET_KEYBOARD_VALUE: u8 = 0x03;
    pub const GET_KEYCODE: u8 = 0x04;
    pub const SET_KEYCODE: u8 = 0x05;
    pub const MACRO_GET_COUNT: u8 = 0x0C;
    pub const MACRO_GET_BUFFER_SIZE: u8 = 0x0D;
    pub const MACRO_GET_BUFFER: u8 = 0x0E;
    pub const GET_LAYER_COUNT: u8 = 0x11;
    pub const KEYMAP_GET_BUFFER: u8 = 0x12;

    /// All Vial commands are multiplexed under this VIA command
    pub const VIAL_PREFIX: u8 = 0xFE;

    /// Get human-readable name for command byte
    pub fn name(cmd: u8) -> &'static str {
        match cmd {
            GET_PROTOCOL_VERSION => "GET_PROTOCOL_VERSION",
            GET_KEYBOARD_VALUE => "GET_KEYBOARD_VALUE",
            SET_KEYBOARD_VALUE => "SET_KEYBOARD_VALUE",
            GET_KEYCODE => "GET_KEYCODE",
            SET_KEYCODE => "SET_KEYCODE",
            MACRO_GET_COUNT => "MACRO_GET_COUNT",
            MACRO_GET_BUFFER_SIZE => "MACRO_GET_BUFFER_SIZE",
            MACRO_GET_BUFFER => "MACRO_GET_BUFFER",
            GET_LAYER_COUNT => "GET_LAYER_COUNT",
            KEYMAP_GET_BUFFER => "KEYMAP_GET_BUFFER",
            VIAL_PREFIX => "VIAL_PREFIX",
            _ => "UNKNOWN",
        }
    }
}

/// Value ids for GET_KEYBOARD_VALUE / SET_KEYBOARD_VALUE
pub mod keyboard_value {
    pub const UPTIME: u8 = 0x01;
    pub const LAYOUT_OPTIONS: u8 = 0x02;
    pub const SWITCH_MATRIX_STATE: u8 = 0x03;
}

/// Vial sub-commands (second byte after `cmd::VIAL_PREFIX`)
pub mod vial {
    pub const GET_KEYBOARD_ID: u8 = 0x00;
    pub const GET_SIZE: u8 = 0x01;
    pub const GET_DEFINITION: u8 = 0x02;
    pub const GET_ENCODER: u8 = 0x03;
    pub const SET_ENCODER: u8 = 0x04;
    pub const GET_UNLOCK_STATUS: u8 = 0x05;
    pub const UNLOCK_START: u8 = 0x06;
    pub const UNLOCK_POLL: u8 = 0x07;
    pub const LOCK: u8 = 0x08;
    pub const QMK_SETTINGS_QUERY: u8 = 0x09;
    pub const QMK_SETTINGS_GET: u8 = 0x0A;
    pub const QMK_SETTINGS_SET: u8 = 0x0B;
    pub const QMK_SETTINGS_RESET: u8 = 0x0C;
    pub const DYNAMIC_ENTRY_OP: u8 = 0x0D;

    /// DYNAMIC_ENTRY_OP sub-operation: number of tap dance / combo / key override entries
    pub const DYNAMIC_GET_NUMBER_OF_ENTRIES: u8 = 0x00;

    pub fn name(sub: u8) -> &'static str {
        match sub {
            GET_KEYBOARD_ID => "GET_KEYBOARD_ID",
            GET_SIZE => "GET_SIZE",
            GET_DEFINITION => "GET_DEFINITION",
            GET_ENCODER => "GET_ENCODER",
            SET_ENCODER => "SET_ENCODER",
            GET_UNLOCK_STATUS => "GET_UNLOCK_STATUS",
            UNLOCK_START => "UNLOCK_START",
            UNLOCK_POLL => "UNLOCK_POLL",
            LOCK => "LOCK",
            QMK_SETTINGS_QUERY => "QMK_SETTINGS_QUERY",
            QMK_SETTINGS_GET => "QMK_SETTINGS_GET",
            QMK_SETTINGS_SET => "QMK_SETTINGS_SET",
            QMK_SETTINGS_RESET => "QMK_SETTINGS_RESET",
            DYNAMIC_ENTRY_OP => "DYNAMIC_ENTRY_OP",
            _ => "UNKNOWN",
        }
    }
}

/// Generic buffer reads (keymap, macros): `[cmd, offset_hi, offset_lo, size, data...]`
pub mod buffer {
    use super::MSG_LEN;

    /// Bytes consumed by command echo, BE16 offset and size
    pub const HEADER_LEN: usize = 4;
    /// Usable payload per report
    pub const CHUNK_SIZE: usize = MSG_LEN - HEADER_LEN;
}

/// Device identification constants
pub mod device {
    /// Raw HID usage page used by VIA/Vial firmware
    pub const USAGE_PAGE: u16 = 0xFF60;
    /// Raw HID usage used by VIA/Vial firmware
    pub const USAGE: u16 = 0x61;
}

/// Build a report: `[opcode] [args...] [zero padding]`, always `MSG_LEN` bytes
pub fn build_report(opcode: u8, args: &[u8]) -> Vec<u8> {
    let mut buf = vec![0u8; MSG_LEN];
    buf[0] = opcode;
    let len = std::cmp::min(args.len(), MSG_LEN - 1);
    if len < args.len() {
        warn!(
            "Truncating {} argument bytes for 0x{:02X} to {}",
            args.len(),
            opcode,
            len
        );
    }
    buf[1..1 + len].copy_from_slice(&args[..len]);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_is_zero_padded() {
        let report = build_report(cmd::SET_KEYCODE, &[1, 2, 3, 0x00, 0x04]);
        assert_eq!(report.len(), MSG_LEN);
        assert_eq!(&report[..6], &[0x05, 1, 2, 3, 0x00, 0x04]);
        assert!(report[6..].iter().all(|&b| b == 0));
    }

    #[test]
    fn oversized_args_are_truncated() {
        let args = [0xAB; 40];
        let report = build_report(cmd::VIAL_PREFIX, &args);
        assert_eq!(report.len(), MSG_LEN);
        assert_eq!(report[0], 0xFE);
        assert!(report[1..].iter().all(|&b| b == 0xAB));
    }

    #[test]
    fn buffer_chunk_leaves_room_for_header() {
        assert_eq!(buffer::CHUNK_SIZE, 28);
        assert_eq!(REPORT_SIZE, 33);
    }

    #[test]
    fn command_names() {
        assert_eq!(cmd::name(0x12), "KEYMAP_GET_BUFFER");
        assert_eq!(vial::name(0x0B), "QMK_SETTINGS_SET");
        assert_eq!(cmd::name(0x99), "UNKNOWN");
    }
}
