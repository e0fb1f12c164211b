//! Sentence framing and the NMEA XOR checksum.

/// Longest legal sentence including the leading delimiter and trailing CRLF.
pub const MAX_SENTENCE_LEN: usize = 82;

/// Line terminator for every sentence.
pub const TERMINATOR: &str = "\r\n";

/// XOR of every byte in `body`.
///
/// `body` is the text between the leading `$`/`!` and the `*`.
pub fn checksum(body: &[u8]) -> u8 {
    body.iter().fold(0, |acc, b| acc ^ b)
}

/// Wrap a sentence body as `<delimiter><body>*HH\r\n`.
pub fn frame(delimiter: char, body: &str) -> String {
    format!(
        "{}{}*{:02X}{}",
        delimiter,
        body,
        checksum(body.as_bytes()),
        TERMINATOR
    )
}

/// Check a framed sentence's checksum.
///
/// Accepts sentences with or without the CRLF terminator. Returns false for
/// anything that is not `$`/`!`-delimited with a two-digit hex checksum.
pub fn verify(sentence: &str) -> bool {
    body(sentence).is_some()
}

/// The checksummed body of a framed sentence, if the checksum matches.
pub fn body(sentence: &str) -> Option<&str> {
    let line = sentence.trim_end_matches(['\r', '\n']);
    let rest = line
        .strip_prefix('$')
        .or_else(|| line.strip_prefix('!'))?;
    let (body, hex) = rest.rsplit_once('*')?;
    if hex.len() != 2 {
        return None;
    }
    let expected = u8::from_str_radix(hex, 16).ok()?;
    (checksum(body.as_bytes()) == expected).then_some(body)
}
