use encoding_rs::{Encoding, ISO_8859_15, UTF_8, UTF_16BE, UTF_16LE, WINDOWS_1252};

type Decoder = fn(&[u8]) -> Option<String>;

/// Candidate decoders in order of preference.
///
/// windows-1252 maps every byte, so it never reports malformed input;
/// ISO-8859-15 and the lossy fallback after it are never reached in practice.
const DECODERS: [(&str, Decoder); 4] = [
    ("UTF-8", decode_utf8),
    ("UTF-16", decode_wide),
    ("windows-1252", decode_windows_1252),
    ("ISO-8859-15", decode_iso_8859_15),
];

/// Decodes `bytes` into text, trying each candidate encoding in turn.
///
/// The first candidate decoding without malformed sequences wins.
/// If none does, the bytes are decoded as lossy UTF-8, which always succeeds.
pub(crate) fn decode_text(bytes: &[u8]) -> String {
    for (name, decoder) in DECODERS {
        match decoder(bytes) {
            Some(text) => return text,
            None => log::trace!("Content is not decodable as {name}"),
        }
    }
    String::from_utf8_lossy(bytes).into_owned()
}

/// Any BOM present selects its own encoding.
///
/// BOM-less UTF-16 is also valid UTF-8 when mostly ASCII, so input showing
/// the UTF-16 NUL pattern is left to the wide candidate.
fn decode_utf8(bytes: &[u8]) -> Option<String> {
    if wide_encoding(bytes).is_some() {
        return None;
    }
    decode_strict(UTF_8, bytes)
}

fn decode_wide(bytes: &[u8]) -> Option<String> {
    wide_encoding(bytes).and_then(|encoding| decode_strict(encoding, bytes))
}

fn decode_windows_1252(bytes: &[u8]) -> Option<String> {
    decode_strict(WINDOWS_1252, bytes)
}

fn decode_iso_8859_15(bytes: &[u8]) -> Option<String> {
    decode_strict(ISO_8859_15, bytes)
}

fn decode_strict(encoding: &'static Encoding, bytes: &[u8]) -> Option<String> {
    // A BOM overrides `encoding`
    let (text, _, malformed) = encoding.decode(bytes);
    (!malformed).then(|| text.into_owned())
}

/// Guesses the byte order of BOM-less UTF-16 from where its NUL bytes land.
///
/// Mostly-ASCII UTF-16 has a NUL in every other byte.
fn wide_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    if bytes.len() < 2 || bytes.len() % 2 != 0 {
        return None;
    }
    let units = bytes.len() / 2;
    let (even_nul, odd_nul) = bytes
        .chunks_exact(2)
        .fold((0, 0), |(even, odd), pair| {
            (even + usize::from(pair[0] == 0), odd + usize::from(pair[1] == 0))
        });

    if odd_nul * 2 > units && even_nul * 2 <= units {
        Some(UTF_16LE)
    } else if even_nul * 2 > units && odd_nul * 2 <= units {
        Some(UTF_16BE)
    } else {
        None
    }
}
