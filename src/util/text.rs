use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Ellipsis appended by [`truncate_to_width`].
const ELLIPSIS: &str = "...";
const ELLIPSIS_WIDTH: usize = 3;

/// Display width of a string in terminal columns (CJK and emoji count as 2).
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncates a string to fit within `max_width` terminal columns.
///
/// Appends `...` when text is cut. Widths of 3 or less have no room for the
/// ellipsis, so as many characters as fit are returned instead.
///
/// ```
/// use feedcycle::util::truncate_to_width;
///
/// assert_eq!(truncate_to_width("Short", 10), "Short");
/// assert_eq!(truncate_to_width("Hello World", 8), "Hello...");
/// assert_eq!(truncate_to_width("Test", 2), "Te");
/// ```
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if max_width == 0 {
        return Cow::Borrowed("");
    }

    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }

    let (budget, suffix) = if max_width <= ELLIPSIS_WIDTH {
        (max_width, "")
    } else {
        (max_width - ELLIPSIS_WIDTH, ELLIPSIS)
    };

    let mut width = 0;
    let mut cut = 0;
    for (idx, c) in s.char_indices() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if width + w > budget {
            break;
        }
        width += w;
        cut = idx + c.len_utf8();
    }

    Cow::Owned(format!("{}{}", &s[..cut], suffix))
}

fn is_stripped_control(b: u8) -> bool {
    b == 0x1b || b == 0x7f || (b < 0x20 && b != b'\t' && b != b'\n' && b != b'\r')
}

/// Strip terminal control characters and ANSI escape sequences.
///
/// Feed titles and bodies are remote input and end up on the terminal
/// verbatim, so CSI (`ESC [ ... final`) and OSC (`ESC ] ... BEL|ST`)
/// sequences are dropped along with bare ASCII control bytes. Tab, newline
/// and carriage return are kept.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    let bytes = s.as_bytes();
    if !bytes.iter().any(|&b| is_stripped_control(b)) {
        return Cow::Borrowed(s);
    }

    let len = bytes.len();
    let mut out = String::with_capacity(len);
    let mut i = 0;

    while i < len {
        let b = bytes[i];
        if b == 0x1b {
            match bytes.get(i + 1) {
                Some(b'[') => {
                    i += 2;
                    while i < len {
                        let c = bytes[i];
                        i += 1;
                        if (0x40..=0x7e).contains(&c) {
                            break;
                        }
                    }
                }
                Some(b']') => {
                    i += 2;
                    while i < len {
                        if bytes[i] == 0x07 {
                            i += 1;
                            break;
                        }
                        if bytes[i] == 0x1b && bytes.get(i + 1) == Some(&b'\\') {
                            i += 2;
                            break;
                        }
                        i += 1;
                    }
                }
                _ => i += 1,
            }
        } else if is_stripped_control(b) {
            i += 1;
        } else {
            let start = i;
            while i < len && !is_stripped_control(bytes[i]) {
                i += 1;
            }
            // Only ASCII bytes stop the run, so this never splits a code point.
            out.push_str(&s[start..i]);
        }
    }

    Cow::Owned(out)
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let num = entity.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

/// Reduce an HTML fragment from a feed body to a single line of plain text.
///
/// Tags are dropped, common entities decoded and runs of whitespace
/// collapsed. Unknown entities are kept literally. The result has control
/// characters removed.
pub fn html_to_text(html: &str) -> String {
    let mut raw = String::with_capacity(html.len());
    let mut chars = html.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        match c {
            '<' => {
                // Tags act as word separators so "a<br>b" does not become "ab".
                raw.push(' ');
                for (_, t) in chars.by_ref() {
                    if t == '>' {
                        break;
                    }
                }
            }
            '&' => {
                let rest = &html[idx + 1..];
                let decoded = rest
                    .find(';')
                    .filter(|&end| end <= 10)
                    .and_then(|end| decode_entity(&rest[..end]).map(|ch| (ch, end)));
                match decoded {
                    Some((ch, end)) => {
                        raw.push(ch);
                        for _ in 0..=end {
                            chars.next();
                        }
                    }
                    None => raw.push('&'),
                }
            }
            _ => raw.push(c),
        }
    }

    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    strip_control_chars(&collapsed).into_owned()
}
