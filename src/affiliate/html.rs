//! HTML entity decoding for links copied out of rich-text task descriptions.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static ENTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]{2,8});")
        .expect("static regex compiles")
});

/// Decode named and numeric HTML entities in a single pass.
///
/// Unknown entities are left as-is, and `&amp;lt;` decodes to `&lt;`
/// (no double decoding).
pub fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }

    ENTITY_RE
        .replace_all(input, |caps: &Captures| {
            let body = &caps[1];
            match decode_one(body) {
                Some(ch) => ch.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Like [`decode_entities`], but also returns where each decoded byte came
/// from: `offsets[i]` is the byte offset in `input` of decoded byte `i`, and
/// the last element is `input.len()`.
pub(crate) fn decode_entities_mapped(input: &str) -> (String, Vec<usize>) {
    let mut out = String::with_capacity(input.len());
    let mut offsets = Vec::with_capacity(input.len() + 1);
    let mut last = 0;

    for caps in ENTITY_RE.captures_iter(input) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&input[last..whole.start()]);
        offsets.extend(last..whole.start());
        match decode_one(&caps[1]) {
            Some(ch) => {
                out.push(ch);
                // 实体解码出的每个字节都指向实体起点
                offsets.extend(std::iter::repeat_n(whole.start(), ch.len_utf8()));
            }
            None => {
                out.push_str(whole.as_str());
                offsets.extend(whole.range());
            }
        }
        last = whole.end();
    }

    out.push_str(&input[last..]);
    offsets.extend(last..=input.len());
    (out, offsets)
}

fn decode_one(body: &str) -> Option<char> {
    if let Some(num) = body.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }

    let ch = match body {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "equals" => '=',
        "quest" => '?',
        "sol" => '/',
        "colon" => ':',
        "num" => '#',
        "percnt" => '%',
        _ => return None,
    };
    Some(ch)
}
