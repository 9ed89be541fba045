//! A small, format-agnostic hex+ASCII dump writer.

use std::io::{self, Write};

const BYTES_PER_LINE: usize = 16;

/// Writes `bytes` as a classic offset/hex/ASCII dump, one line per 16
/// bytes, stopping after `limit` bytes and appending a `"[…]"`
/// continuation marker if more remain.
///
/// # Errors
/// Propagates any I/O error from `w`.
pub fn write_hexdump<W: Write>(w: &mut W, bytes: &[u8], limit: usize) -> io::Result<()> {
    let shown = bytes.len().min(limit);
    for (line_no, chunk) in bytes[..shown].chunks(BYTES_PER_LINE).enumerate() {
        let offset = line_no * BYTES_PER_LINE;
        write!(w, "{offset:08x}  ")?;
        for i in 0..BYTES_PER_LINE {
            if let Some(byte) = chunk.get(i) {
                write!(w, "{byte:02x} ")?;
            } else {
                write!(w, "   ")?;
            }
            if i == 7 {
                write!(w, " ")?;
            }
        }
        write!(w, " ")?;
        for &byte in chunk {
            let glyph = if byte.is_ascii_graphic() || byte == b' ' {
                byte as char
            } else {
                '.'
            };
            write!(w, "{glyph}")?;
        }
        writeln!(w)?;
    }
    if bytes.len() > shown {
        writeln!(w, "[\u{2026}]")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_dump_has_no_truncation_marker() {
        let mut out = Vec::new();
        write_hexdump(&mut out, b"hello", 256).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("68 65 6c 6c 6f"));
        assert!(text.contains("hello"));
        assert!(!text.contains('\u{2026}'));
    }

    #[test]
    fn long_dump_truncates_with_marker() {
        let bytes = vec![b'A'; 64];
        let mut out = Vec::new();
        write_hexdump(&mut out, &bytes, 16).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains('\u{2026}'));
        assert_eq!(text.lines().filter(|l| l.starts_with("00000000")).count(), 1);
    }
}
