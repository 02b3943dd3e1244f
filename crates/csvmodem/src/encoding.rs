//! Encoding detection and incremental decoding.
//!
//! The sniffer inspects the first chunk of bytes once, before any
//! character-level scanning, and fixes the session's encoding for the rest
//! of the parse. Decoding is incremental: a multi-byte sequence split across
//! chunk reads is retained and completed by the next chunk rather than
//! discarded.

use encoding_rs::{CoderResult, ISO_2022_JP, MACINTOSH, UTF_8, UTF_16BE, UTF_16LE};

/// How many leading bytes are inspected to determine the encoding.
pub(crate) const SNIFF_LEN: usize = 512;

/// A text encoding the parser can decode.
///
/// Returned by detection or supplied up front via
/// [`ParserOptions::encoding`](crate::ParserOptions::encoding).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TextEncoding {
    /// UTF-8, the no-marker default.
    Utf8,
    /// UTF-16, big-endian.
    Utf16Be,
    /// UTF-16, little-endian.
    Utf16Le,
    /// UTF-32, big-endian.
    Utf32Be,
    /// UTF-32, little-endian.
    Utf32Le,
    /// ISO-2022-JP, selected by its escape-sequence marker.
    Iso2022Jp,
    /// Mac OS Roman, the single-byte fallback; decodes any byte sequence.
    MacRoman,
}

/// Detects the encoding of `prefix` and the number of leading marker bytes
/// to discard before decoding resumes. First match wins.
pub(crate) fn sniff(prefix: &[u8]) -> (TextEncoding, usize) {
    if prefix.starts_with(&[0x00, 0x00, 0xFE, 0xFF]) {
        return (TextEncoding::Utf32Be, 4);
    }
    if prefix.starts_with(&[0xFF, 0xFE, 0x00, 0x00]) {
        return (TextEncoding::Utf32Le, 4);
    }
    if prefix.starts_with(&[0x1B, 0x24, 0x29, 0x43]) {
        return (TextEncoding::Iso2022Jp, 4);
    }
    if prefix.starts_with(&[0xFE, 0xFF]) {
        return (TextEncoding::Utf16Be, 2);
    }
    if prefix.starts_with(&[0xFF, 0xFE]) {
        return (TextEncoding::Utf16Le, 2);
    }
    if prefix.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return (TextEncoding::Utf8, 3);
    }

    // No marker. Probe for UTF-8, shortening the attempted range by one
    // byte up to three times so a multi-byte sequence truncated at the
    // chunk boundary does not disqualify the whole prefix.
    let mut end = prefix.len();
    for _ in 0..4 {
        if std::str::from_utf8(&prefix[..end]).is_ok() {
            return (TextEncoding::Utf8, 0);
        }
        if end == 0 {
            break;
        }
        end -= 1;
    }

    (TextEncoding::MacRoman, 0)
}

/// Incremental decoder fixed to one [`TextEncoding`].
///
/// Malformed sequences decode to U+FFFD; they never abort the parse.
pub(crate) enum StreamDecoder {
    /// Encodings `encoding_rs` covers. Its `Decoder` retains a split
    /// multi-byte sequence internally until the next chunk arrives.
    Rs(encoding_rs::Decoder),
    /// UTF-32, which `encoding_rs` does not provide. Retains up to three
    /// pending bytes of an incomplete code unit.
    Utf32 {
        big_endian: bool,
        pending: Vec<u8>,
    },
}

impl StreamDecoder {
    pub(crate) fn new(encoding: TextEncoding) -> Self {
        let rs = match encoding {
            TextEncoding::Utf8 => UTF_8,
            TextEncoding::Utf16Be => UTF_16BE,
            TextEncoding::Utf16Le => UTF_16LE,
            TextEncoding::Iso2022Jp => ISO_2022_JP,
            TextEncoding::MacRoman => MACINTOSH,
            TextEncoding::Utf32Be => {
                return Self::Utf32 {
                    big_endian: true,
                    pending: Vec::new(),
                };
            }
            TextEncoding::Utf32Le => {
                return Self::Utf32 {
                    big_endian: false,
                    pending: Vec::new(),
                };
            }
        };
        Self::Rs(rs.new_decoder_without_bom_handling())
    }

    /// Appends the decodable portion of `bytes` to `out`, retaining any
    /// trailing incomplete sequence for the next call.
    pub(crate) fn decode(&mut self, bytes: &[u8], out: &mut String) {
        match self {
            Self::Rs(decoder) => {
                if let Some(needed) = decoder.max_utf8_buffer_length(bytes.len()) {
                    out.reserve(needed);
                }
                let (result, read, _) = decoder.decode_to_string(bytes, out, false);
                debug_assert_eq!(result, CoderResult::InputEmpty);
                debug_assert_eq!(read, bytes.len());
            }
            Self::Utf32 {
                big_endian,
                pending,
            } => {
                pending.extend_from_slice(bytes);
                let whole = pending.len() - pending.len() % 4;
                for quad in pending[..whole].chunks_exact(4) {
                    let raw = [quad[0], quad[1], quad[2], quad[3]];
                    let scalar = if *big_endian {
                        u32::from_be_bytes(raw)
                    } else {
                        u32::from_le_bytes(raw)
                    };
                    out.push(char::from_u32(scalar).unwrap_or(char::REPLACEMENT_CHARACTER));
                }
                pending.drain(..whole);
            }
        }
    }

    /// Flushes decoder state at end-of-stream. A trailing incomplete
    /// sequence decodes to U+FFFD.
    pub(crate) fn finish(&mut self, out: &mut String) {
        match self {
            Self::Rs(decoder) => {
                if let Some(needed) = decoder.max_utf8_buffer_length(0) {
                    out.reserve(needed);
                }
                let (result, _, _) = decoder.decode_to_string(&[], out, true);
                debug_assert_eq!(result, CoderResult::InputEmpty);
            }
            Self::Utf32 { pending, .. } => {
                if !pending.is_empty() {
                    pending.clear();
                    out.push(char::REPLACEMENT_CHARACTER);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf32_split_across_chunks() {
        let mut decoder = StreamDecoder::new(TextEncoding::Utf32Be);
        let mut out = String::new();
        let bytes = 0x0001_F600_u32.to_be_bytes(); // 😀
        decoder.decode(&bytes[..2], &mut out);
        assert_eq!(out, "");
        decoder.decode(&bytes[2..], &mut out);
        decoder.finish(&mut out);
        assert_eq!(out, "😀");
    }

    #[test]
    fn utf32_truncated_tail_is_replaced() {
        let mut decoder = StreamDecoder::new(TextEncoding::Utf32Le);
        let mut out = String::new();
        decoder.decode(&[0x61, 0x00, 0x00, 0x00, 0x62], &mut out);
        decoder.finish(&mut out);
        assert_eq!(out, "a\u{FFFD}");
    }

    #[test]
    fn sniff_prefers_longer_markers() {
        assert_eq!(
            sniff(&[0xFF, 0xFE, 0x00, 0x00]),
            (TextEncoding::Utf32Le, 4)
        );
        assert_eq!(sniff(&[0xFF, 0xFE, 0x61, 0x00]), (TextEncoding::Utf16Le, 2));
    }
}
