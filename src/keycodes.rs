//! QMK keycode names
//!
//! Bidirectional mapping between keycode identifiers (`KC_A`, `MO(1)`,
//! `M3`) and their 16-bit codes, plus the common aliases seen in exported
//! keymaps (`KC_LCTRL`, `ENTER`).
//!
//! ```text
//! KC_A        → 0x0004
//! KC_LSHIFT   → 0x00E1   (alias of KC_LSFT)
//! MO(2)       → 0x5102
//! M10         → 0x770A
//! 0x7E01      → 0x7E01   (hex literal)
//! ```

/// Basic keycodes (HID usages plus KC_NO / KC_TRNS)
#[rustfmt::skip]
const BASIC: &[(&str, u16)] = &[
    ("KC_NO", 0x00), ("KC_TRNS", 0x01),
    ("KC_A", 0x04), ("KC_B", 0x05), ("KC_C", 0x06), ("KC_D", 0x07),
    ("KC_E", 0x08), ("KC_F", 0x09), ("KC_G", 0x0A), ("KC_H", 0x0B),
    ("KC_I", 0x0C), ("KC_J", 0x0D), ("KC_K", 0x0E), ("KC_L", 0x0F),
    ("KC_M", 0x10), ("KC_N", 0x11), ("KC_O", 0x12), ("KC_P", 0x13),
    ("KC_Q", 0x14), ("KC_R", 0x15), ("KC_S", 0x16), ("KC_T", 0x17),
    ("KC_U", 0x18), ("KC_V", 0x19), ("KC_W", 0x1A), ("KC_X", 0x1B),
    ("KC_Y", 0x1C), ("KC_Z", 0x1D),
    ("KC_1", 0x1E), ("KC_2", 0x1F), ("KC_3", 0x20), ("KC_4", 0x21),
    ("KC_5", 0x22), ("KC_6", 0x23), ("KC_7", 0x24), ("KC_8", 0x25),
    ("KC_9", 0x26), ("KC_0", 0x27),
    ("KC_ENT", 0x28), ("KC_ESC", 0x29), ("KC_BSPC", 0x2A), ("KC_TAB", 0x2B),
    ("KC_SPC", 0x2C), ("KC_MINS", 0x2D), ("KC_EQL", 0x2E), ("KC_LBRC", 0x2F),
    ("KC_RBRC", 0x30), ("KC_BSLS", 0x31), ("KC_NUHS", 0x32), ("KC_SCLN", 0x33),
    ("KC_QUOT", 0x34), ("KC_GRV", 0x35), ("KC_COMM", 0x36), ("KC_DOT", 0x37),
    ("KC_SLSH", 0x38), ("KC_CAPS", 0x39),
    ("KC_F1", 0x3A), ("KC_F2", 0x3B), ("KC_F3", 0x3C), ("KC_F4", 0x3D),
    ("KC_F5", 0x3E), ("KC_F6", 0x3F), ("KC_F7", 0x40), ("KC_F8", 0x41),
    ("KC_F9", 0x42), ("KC_F10", 0x43), ("KC_F11", 0x44), ("KC_F12", 0x45),
    ("KC_PSCR", 0x46), ("KC_SCRL", 0x47), ("KC_PAUS", 0x48), ("KC_INS", 0x49),
    ("KC_HOME", 0x4A), ("KC_PGUP", 0x4B), ("KC_DEL", 0x4C), ("KC_END", 0x4D),
    ("KC_PGDN", 0x4E), ("KC_RGHT", 0x4F), ("KC_LEFT", 0x50), ("KC_DOWN", 0x51),
    ("KC_UP", 0x52), ("KC_NUM", 0x53),
    ("KC_PSLS", 0x54), ("KC_PAST", 0x55), ("KC_PMNS", 0x56), ("KC_PPLS", 0x57),
    ("KC_PENT", 0x58), ("KC_P1", 0x59), ("KC_P2", 0x5A), ("KC_P3", 0x5B),
    ("KC_P4", 0x5C), ("KC_P5", 0x5D), ("KC_P6", 0x5E), ("KC_P7", 0x5F),
    ("KC_P8", 0x60), ("KC_P9", 0x61), ("KC_P0", 0x62), ("KC_PDOT", 0x63),
    ("KC_NUBS", 0x64), ("KC_APP", 0x65), ("KC_PWR", 0x66), ("KC_PEQL", 0x67),
    ("KC_F13", 0x68), ("KC_F14", 0x69), ("KC_F15", 0x6A), ("KC_F16", 0x6B),
    ("KC_F17", 0x6C), ("KC_F18", 0x6D), ("KC_F19", 0x6E), ("KC_F20", 0x6F),
    ("KC_F21", 0x70), ("KC_F22", 0x71), ("KC_F23", 0x72), ("KC_F24", 0x73),
    ("KC_MUTE", 0xA8), ("KC_VOLU", 0xA9), ("KC_VOLD", 0xAA),
    ("KC_MNXT", 0xAB), ("KC_MPRV", 0xAC), ("KC_MSTP", 0xAD), ("KC_MPLY", 0xAE),
    ("KC_MS_U", 0xCD), ("KC_MS_D", 0xCE), ("KC_MS_L", 0xCF), ("KC_MS_R", 0xD0),
    ("KC_BTN1", 0xD1), ("KC_BTN2", 0xD2), ("KC_BTN3", 0xD3),
    ("KC_WH_U", 0xD8), ("KC_WH_D", 0xD9),
    ("KC_LCTL", 0xE0), ("KC_LSFT", 0xE1), ("KC_LALT", 0xE2), ("KC_LGUI", 0xE3),
    ("KC_RCTL", 0xE4), ("KC_RSFT", 0xE5), ("KC_RALT", 0xE6), ("KC_RGUI", 0xE7),
    // Shifted symbols: LSFT(kc)
    ("KC_EXLM", 0x021E), ("KC_AT", 0x021F), ("KC_HASH", 0x0220), ("KC_DLR", 0x0221),
    ("KC_PERC", 0x0222), ("KC_CIRC", 0x0223), ("KC_AMPR", 0x0224), ("KC_ASTR", 0x0225),
    ("KC_LPRN", 0x0226), ("KC_RPRN", 0x0227), ("KC_UNDS", 0x022D), ("KC_PLUS", 0x022E),
    ("KC_LCBR", 0x022F), ("KC_RCBR", 0x0230), ("KC_PIPE", 0x0231), ("KC_COLN", 0x0233),
    ("KC_DQUO", 0x0234), ("KC_TILD", 0x0235), ("KC_LABK", 0x0236), ("KC_RABK", 0x0237),
    ("KC_QUES", 0x0238),
];

/// Alternative spellings, resolved to a canonical name
#[rustfmt::skip]
const ALIASES: &[(&str, &str)] = &[
    ("KC_TRANSPARENT", "KC_TRNS"), ("_______", "KC_TRNS"), ("XXXXXXX", "KC_NO"),
    ("KC_ENTER", "KC_ENT"), ("ENTER", "KC_ENT"), ("RETURN", "KC_ENT"),
    ("KC_ESCAPE", "KC_ESC"), ("ESCAPE", "KC_ESC"),
    ("KC_BSPACE", "KC_BSPC"), ("BACKSPACE", "KC_BSPC"), ("BKSP", "KC_BSPC"),
    ("KC_SPACE", "KC_SPC"), ("SPACE", "KC_SPC"),
    ("KC_MINUS", "KC_MINS"), ("KC_EQUAL", "KC_EQL"),
    ("KC_LBRACKET", "KC_LBRC"), ("KC_RBRACKET", "KC_RBRC"), ("KC_BSLASH", "KC_BSLS"),
    ("KC_SCOLON", "KC_SCLN"), ("KC_QUOTE", "KC_QUOT"), ("KC_GRAVE", "KC_GRV"),
    ("KC_COMMA", "KC_COMM"), ("KC_SLASH", "KC_SLSH"), ("KC_CAPSLOCK", "KC_CAPS"),
    ("KC_PSCREEN", "KC_PSCR"), ("KC_SCROLLLOCK", "KC_SCRL"), ("KC_PAUSE", "KC_PAUS"),
    ("KC_INSERT", "KC_INS"), ("KC_PGDOWN", "KC_PGDN"), ("KC_DELETE", "KC_DEL"),
    ("KC_RIGHT", "KC_RGHT"), ("KC_NUMLOCK", "KC_NUM"), ("KC_APPLICATION", "KC_APP"),
    ("KC_LCTRL", "KC_LCTL"), ("KC_RCTRL", "KC_RCTL"), ("LCTRL", "KC_LCTL"), ("RCTRL", "KC_RCTL"),
    ("KC_LSHIFT", "KC_LSFT"), ("KC_RSHIFT", "KC_RSFT"), ("LSHIFT", "KC_LSFT"), ("RSHIFT", "KC_RSFT"),
    ("LALT", "KC_LALT"), ("RALT", "KC_RALT"), ("KC_ALGR", "KC_RALT"),
    ("KC_LCMD", "KC_LGUI"), ("KC_RCMD", "KC_RGUI"), ("LGUI", "KC_LGUI"), ("RGUI", "KC_RGUI"),
    ("KC_AUDIO_MUTE", "KC_MUTE"), ("KC_AUDIO_VOL_UP", "KC_VOLU"), ("KC_AUDIO_VOL_DOWN", "KC_VOLD"),
];

/// Parameterised keycodes: `NAME(n)` encodes as `base + n`
const FUNCTIONS: &[(&str, u16, u16)] = &[
    ("MO", 0x5100, 0x1F),
    ("TO", 0x5200, 0x1F),
    ("TG", 0x5300, 0x1F),
    ("DF", 0x5400, 0x1F),
    ("OSL", 0x5500, 0x1F),
    ("TT", 0x5800, 0x1F),
];

/// Indexed keycodes: `PREFIXn` encodes as `base + n`
const INDEXED: &[(&str, u16, u16)] = &[
    ("USER", 0x7E00, 0x3F),
    ("TD", 0x7B00, 0xFF),
    ("M", 0x7700, 0xFF),
];

fn canonical(name: &str) -> &str {
    ALIASES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
        .map(|(_, target)| *target)
        .unwrap_or(name)
}

fn parse_hex(s: &str) -> Option<u16> {
    let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))?;
    u16::from_str_radix(digits, 16).ok()
}

fn parse_function(s: &str) -> Option<u16> {
    let (name, rest) = s.split_once('(')?;
    let arg: u16 = rest.strip_suffix(')')?.trim().parse().ok()?;
    FUNCTIONS
        .iter()
        .find(|(f, _, _)| f.eq_ignore_ascii_case(name.trim()))
        .filter(|(_, _, max)| arg <= *max)
        .map(|(_, base, _)| base + arg)
}

fn parse_indexed(s: &str) -> Option<u16> {
    INDEXED.iter().find_map(|(prefix, base, max)| {
        let digits = s.strip_prefix(prefix)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let n: u16 = digits.parse().ok()?;
        (n <= *max).then_some(base + n)
    })
}

/// Resolve a keycode identifier to its code
pub fn parse(name: &str) -> Option<u16> {
    let name = name.trim();
    if let Some(code) = parse_hex(name) {
        return Some(code);
    }

    let canon = canonical(name);
    if let Some((_, code)) = BASIC.iter().find(|(n, _)| n.eq_ignore_ascii_case(canon)) {
        return Some(*code);
    }

    parse_function(canon)
        .or_else(|| parse_indexed(canon))
        .or_else(|| parse_indexed(&canon.replace("TD(", "TD").replace(')', "")))
}

/// Canonical identifier for a code; unknown codes print as hex
pub fn stringify(code: u16) -> String {
    if let Some((name, _)) = BASIC.iter().find(|(_, c)| *c == code) {
        return (*name).to_string();
    }
    for (name, base, max) in FUNCTIONS {
        if (*base..=base + max).contains(&code) {
            return format!("{name}({})", code - base);
        }
    }
    for (prefix, base, max) in INDEXED {
        if (*base..=base + max).contains(&code) {
            return match *prefix {
                "USER" => format!("USER{:02}", code - base),
                _ => format!("{prefix}{}", code - base),
            };
        }
    }
    format!("0x{code:04X}")
}
