//! Standard Type1 font metrics and WinAnsi text encoding.
//!
//! The exporter only uses the two base-14 fonts every PDF reader ships
//! (Helvetica and Helvetica-Bold), so nothing is embedded. Advance widths
//! come from the Adobe AFM files, in 1/1000 em.

/// Fonts available to the layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Helvetica,
    HelveticaBold,
}

#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,                               // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015,                                             // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,                // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,                // 'N'..'Z'
    278, 278, 278, 469, 556, 333,                                                   // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,                // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,                // 'n'..'z'
    334, 260, 334, 584,                                                             // '{'..'~'
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

impl Font {
    /// PostScript name used in the font dictionary.
    pub fn base_font(self) -> &'static str {
        match self {
            Font::Helvetica => "Helvetica",
            Font::HelveticaBold => "Helvetica-Bold",
        }
    }

    /// Resource name referenced by the `Tf` operator.
    pub fn resource_name(self) -> &'static str {
        match self {
            Font::Helvetica => "F1",
            Font::HelveticaBold => "F2",
        }
    }

    /// Advance width of a WinAnsi-encoded byte, in 1/1000 em.
    fn byte_width(self, b: u8) -> u16 {
        let table = match self {
            Font::Helvetica => &HELVETICA_WIDTHS,
            Font::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
        };
        match b {
            32..=126 => table[(b - 32) as usize],
            // ellipsis, em dash, per mille, trademark
            0x85 | 0x97 | 0x89 | 0x99 => 1000,
            0x91 | 0x92 => match self {
                Font::Helvetica => 222,
                Font::HelveticaBold => 278,
            },
            _ => 556,
        }
    }

    /// Width of `text` in points at `size`.
    pub fn text_width(self, text: &str, size: f32) -> f32 {
        let units: u32 = text
            .chars()
            .map(|c| self.byte_width(encode_char(c)) as u32)
            .sum();
        units as f32 * size / 1000.0
    }
}

/// Map a character to its WinAnsiEncoding byte; unrepresentable characters
/// become `?`.
pub fn encode_char(c: char) -> u8 {
    match c {
        ' '..='~' => c as u8,
        '\u{00A0}'..='\u{00FF}' => c as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => b'?',
    }
}

/// Encode a whole string for a WinAnsi font.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(encode_char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_passes_through() {
        assert_eq!(encode_win_ansi("a <b> & (c)\\"), b"a <b> & (c)\\".to_vec());
    }

    #[test]
    fn latin1_and_punctuation() {
        assert_eq!(encode_win_ansi("café"), vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(encode_win_ansi("“hi”—…"), vec![0x93, b'h', b'i', 0x94, 0x97, 0x85]);
    }

    #[test]
    fn unrepresentable_becomes_question_mark() {
        assert_eq!(encode_win_ansi("🎨水"), b"??".to_vec());
    }

    #[test]
    fn widths_from_afm() {
        assert_eq!(Font::Helvetica.text_width("W", 1000.0), 944.0);
        assert_eq!(Font::Helvetica.text_width("i", 1000.0), 222.0);
        assert_eq!(Font::HelveticaBold.text_width("i", 1000.0), 278.0);
        assert_eq!(Font::Helvetica.text_width("", 12.0), 0.0);
        // 'space' is 278 units: 12pt → 3.336pt
        assert!((Font::Helvetica.text_width(" ", 12.0) - 3.336).abs() < 1e-4);
    }

    #[test]
    fn tables_cover_printable_ascii() {
        assert_eq!(HELVETICA_WIDTHS.len(), ('~' as usize) - (' ' as usize) + 1);
        assert_eq!(Font::Helvetica.byte_width(b'~'), 584);
        assert_eq!(Font::HelveticaBold.byte_width(b'z'), 500);
    }
}
