/// Remove C-style backslash escapes from a quoted literal.
///
/// Recognizes `\n \t \r \v \f \a \b`, `\xHH` (one or two hex digits) and
/// `\NNN` (one to three octal digits). Any other escaped character stands for
/// itself, so `\'`, `\"` and `\\` lose their backslash. Byte escapes are
/// assembled before UTF-8 decoding so `\xC3\xA9` yields `é`.
pub fn unescape(raw: &str) -> String {
    if !raw.contains('\\') {
        return raw.to_string();
    }

    let mut out: Vec<u8> = Vec::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    let mut buf = [0u8; 4];

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }

        let Some(next) = chars.next() else {
            // Trailing lone backslash is kept as-is
            out.push(b'\\');
            break;
        };

        match next {
            'n' => out.push(b'\n'),
            't' => out.push(b'\t'),
            'r' => out.push(b'\r'),
            'v' => out.push(0x0B),
            'f' => out.push(0x0C),
            'a' => out.push(0x07),
            'b' => out.push(0x08),
            'x' if chars.peek().is_some_and(|c| c.is_ascii_hexdigit()) => {
                let mut value: u32 = 0;
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(16)) {
                        Some(d) => {
                            value = value * 16 + d;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.push(value as u8);
            }
            '0'..='7' => {
                let mut value: u32 = next.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(d) => {
                            value = value * 8 + d;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.push((value & 0xFF) as u8);
            }
            other => out.extend_from_slice(other.encode_utf8(&mut buf).as_bytes()),
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}
