//! Helvetica advance widths and WinAnsi encoding for the base-14 fonts.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    pub(crate) const fn resource_name(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }

    pub(crate) const fn base_font(self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
        }
    }
}

/// Helvetica widths (1/1000 em) for U+0020..=U+007E.
const HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

/// Bold glyphs run wider than regular ones; this factor keeps wrapping conservative.
const BOLD_FACTOR: f64 = 1.08;
const FALLBACK_WIDTH: u16 = 556;

fn base_letter(ch: char) -> char {
    match ch {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'A',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'ç' => 'c',
        'Ç' => 'C',
        'ñ' => 'n',
        'Ñ' => 'N',
        other => other,
    }
}

fn glyph_width(ch: char) -> u16 {
    let ch = base_letter(ch);
    match ch {
        ' '..='~' => HELVETICA_ASCII[(ch as usize) - 0x20],
        '•' => 350,
        '–' => 556,
        '—' => 1000,
        '\u{a0}' => 278,
        _ => FALLBACK_WIDTH,
    }
}

/// Advance width of `text` in points.
pub fn text_width(font: Font, text: &str, size: f64) -> f64 {
    let units: u32 = text.chars().map(|ch| u32::from(glyph_width(ch))).sum();
    let width = f64::from(units) * size / 1000.0;
    match font {
        Font::Regular => width,
        Font::Bold => width * BOLD_FACTOR,
    }
}

/// Maps a character to its WinAnsiEncoding byte; unsupported characters become `?`.
pub fn win_ansi_byte(ch: char) -> u8 {
    match ch {
        '\u{20}'..='\u{7e}' => ch as u8,
        '\u{a0}'..='\u{ff}' => ch as u32 as u8,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '€' => 0x80,
        _ => b'?',
    }
}

/// Encodes `text` as a PDF literal string body. Non-ASCII bytes are written as
/// octal escapes so content streams stay 7-bit clean.
pub fn encode_literal(text: &str) -> String {
    let mut encoded = String::with_capacity(text.len() + 8);
    for ch in text.chars() {
        match win_ansi_byte(ch) {
            b'(' => encoded.push_str("\\("),
            b')' => encoded.push_str("\\)"),
            b'\\' => encoded.push_str("\\\\"),
            byte if byte.is_ascii() => encoded.push(byte as char),
            byte => encoded.push_str(&format!("\\{byte:03o}")),
        }
    }
    encoded
}
