//! Unicode escape pre-pass.
//!
//! `\uXXXX` escapes are translated before token boundaries are decided, so
//! an escaped backslash or quote takes part in literal scanning exactly like
//! the character it denotes. Every decoded character remembers the raw byte
//! offset it came from.

/// A `\u` sequence that is not followed by four hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct InvalidEscape {
    /// Raw byte offset of the backslash.
    pub(crate) offset: usize,
}

/// Source text after unicode escape translation.
#[derive(Debug, Clone)]
pub(crate) struct Decoded {
    /// Logical characters.
    pub(crate) chars: Vec<char>,
    /// Raw byte offset of each logical character, plus one trailing entry
    /// holding the raw length.
    pub(crate) offsets: Vec<usize>,
}

impl Decoded {
    /// Number of logical characters.
    pub(crate) fn len(&self) -> usize {
        self.chars.len()
    }

    /// Raw byte offset for a logical index (valid up to `len()` inclusive).
    pub(crate) fn raw_offset(&self, index: usize) -> usize {
        self.offsets[index.min(self.chars.len())]
    }
}

/// Decodes unicode escapes in `raw`.
///
/// A backslash starts an escape only when it is preceded by an even number
/// of contiguous backslashes and followed by one or more `u` and exactly four
/// hex digits. A surrogate pair written as two escapes decodes to a single
/// character; a lone surrogate decodes to U+FFFD.
pub(crate) fn decode(raw: &str) -> Result<Decoded, InvalidEscape> {
    let bytes = raw.as_bytes();
    let mut chars = Vec::with_capacity(raw.len());
    let mut offsets = Vec::with_capacity(raw.len() + 1);
    let mut pos = 0;
    let mut preceding_backslashes = 0usize;

    while pos < raw.len() {
        let Some(ch) = raw[pos..].chars().next() else {
            break;
        };

        if ch == '\\' && preceding_backslashes % 2 == 0 && bytes.get(pos + 1) == Some(&b'u') {
            let (unit, next) = read_escape(raw, pos)?;
            let (decoded, end) = if (0xD800..0xDC00).contains(&unit) {
                match low_surrogate_at(raw, next) {
                    Some((low, after)) => {
                        let combined =
                            0x10000 + ((u32::from(unit) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
                        (char::from_u32(combined).unwrap_or('\u{FFFD}'), after)
                    }
                    None => ('\u{FFFD}', next),
                }
            } else {
                (char::from_u32(u32::from(unit)).unwrap_or('\u{FFFD}'), next)
            };
            chars.push(decoded);
            offsets.push(pos);
            pos = end;
            // A decoded backslash does not pair with raw backslashes.
            preceding_backslashes = 0;
            continue;
        }

        if ch == '\\' {
            preceding_backslashes += 1;
        } else {
            preceding_backslashes = 0;
        }
        chars.push(ch);
        offsets.push(pos);
        pos += ch.len_utf8();
    }

    offsets.push(raw.len());
    Ok(Decoded { chars, offsets })
}

/// Reads `\u+XXXX` starting at `start` and returns the code unit and the
/// offset after the escape.
fn read_escape(raw: &str, start: usize) -> Result<(u16, usize), InvalidEscape> {
    let bytes = raw.as_bytes();
    let mut pos = start + 1;
    while bytes.get(pos) == Some(&b'u') {
        pos += 1;
    }
    let digits = raw.get(pos..pos + 4).filter(|d| d.bytes().all(|b| b.is_ascii_hexdigit()));
    match digits.and_then(|d| u16::from_str_radix(d, 16).ok()) {
        Some(unit) => Ok((unit, pos + 4)),
        None => Err(InvalidEscape { offset: start }),
    }
}

fn low_surrogate_at(raw: &str, pos: usize) -> Option<(u16, usize)> {
    let bytes = raw.as_bytes();
    if bytes.get(pos) != Some(&b'\\') || bytes.get(pos + 1) != Some(&b'u') {
        return None;
    }
    let (unit, next) = read_escape(raw, pos).ok()?;
    (0xDC00..0xE000).contains(&unit).then_some((unit, next))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logical(raw: &str) -> String {
        decode(raw).unwrap().chars.into_iter().collect()
    }

    #[test]
    fn test_plain_text_is_unchanged() {
        let decoded = decode("int a;").unwrap();
        assert_eq!(decoded.chars.iter().collect::<String>(), "int a;");
        assert_eq!(decoded.offsets, vec![0, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_escapes_decode_with_raw_offsets() {
        let decoded = decode("a\\u0062c").unwrap();
        assert_eq!(decoded.chars, vec!['a', 'b', 'c']);
        assert_eq!(decoded.offsets, vec![0, 1, 7, 8]);
    }

    #[test]
    fn test_multiple_u_markers_are_allowed() {
        assert_eq!(logical("\\uuu0041"), "A");
    }

    #[test]
    fn test_escaped_backslash_is_not_an_escape() {
        assert_eq!(logical("\\\\u0041"), "\\\\u0041");
        assert_eq!(logical("\\\\\\u0041"), "\\\\A");
    }

    #[test]
    fn test_surrogate_pairs_combine() {
        assert_eq!(logical("\\uD83D\\uDE00"), "\u{1F600}");
        assert_eq!(logical("\\uD83Dx"), "\u{FFFD}x");
    }

    #[test]
    fn test_malformed_escape_is_an_error() {
        let err = decode("x = \"\\u00G1\";").unwrap_err();
        assert_eq!(err, InvalidEscape { offset: 5 });
    }
}
