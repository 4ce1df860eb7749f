// PEM утилиты
//
// `-----BEGIN <TYPE>-----`, Base64 body wrapped at a fixed width, then
// `-----END <TYPE>-----`. Encoding uses the host line separator; decoding
// accepts `\n`, `\r` and `\r\n`.

use crate::error::{CryptoError, Result};
use crate::utils::b64;

#[cfg(windows)]
pub const LINE_SEPARATOR: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_SEPARATOR: &str = "\n";

/// Base64 characters per body line.
pub const LINE_WIDTH: usize = 64;

pub fn encode(label: &str, der: &[u8]) -> String {
    let body = b64::encode(der);

    let mut lines = Vec::with_capacity(body.len() / LINE_WIDTH + 3);
    lines.push(format!("-----BEGIN {}-----", label));
    // Base64 output is ASCII, so byte chunks are char boundaries
    lines.extend(
        body.as_bytes()
            .chunks(LINE_WIDTH)
            .map(|chunk| String::from_utf8_lossy(chunk).into_owned()),
    );
    lines.push(format!("-----END {}-----", label));

    let mut pem = lines.join(LINE_SEPARATOR);
    pem.push_str(LINE_SEPARATOR);
    pem
}

/// Returns the DER bytes carried by a single PEM block.
pub fn decode(text: &str) -> Result<Vec<u8>> {
    let lines = split_lines(text);

    let malformed = |reason: &str| CryptoError::MalformedInput(format!("PEM: {}", reason));

    let (first, rest) = lines.split_first().ok_or_else(|| malformed("empty input"))?;
    if !is_boundary(first.text, "BEGIN") || !first.terminated {
        return Err(malformed("missing BEGIN line"));
    }

    let (last, body) = rest.split_last().ok_or_else(|| malformed("missing END line"))?;
    if !is_boundary(last.text, "END") {
        return Err(malformed("missing END line"));
    }

    for (i, line) in body.iter().enumerate() {
        let is_final = i + 1 == body.len();
        let len_ok = if is_final {
            (1..=LINE_WIDTH).contains(&line.text.len())
        } else {
            line.text.len() == LINE_WIDTH
        };
        if !len_ok || !line.terminated || !line.text.bytes().all(is_base64_char) {
            return Err(malformed("body is not wrapped Base64"));
        }
    }

    let joined: String = body.iter().map(|line| line.text).collect();
    b64::decode(&joined)
}

struct Line<'a> {
    text: &'a str,
    terminated: bool,
}

fn split_lines(text: &str) -> Vec<Line<'_>> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\r' | b'\n' => {
                lines.push(Line {
                    text: &text[start..i],
                    terminated: true,
                });
                if bytes[i] == b'\r' && bytes.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
                i += 1;
                start = i;
            }
            _ => i += 1,
        }
    }
    if start < bytes.len() {
        lines.push(Line {
            text: &text[start..],
            terminated: false,
        });
    }
    lines
}

fn is_boundary(line: &str, kind: &str) -> bool {
    let prefix = format!("-----{} ", kind);
    line.len() >= prefix.len() + 5 && line.starts_with(&prefix) && line.ends_with("-----")
}

fn is_base64_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'+' || b == b'/' || b == b'='
}
