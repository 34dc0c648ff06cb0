//! Tracking-parameter resolution and substitution for affiliate URLs.
//!
//! Resolution tries, in order: an exact key match over [`TRACKING_PARAMS`],
//! a case-insensitive key match, and (only when the string does not parse as
//! an absolute URL) a regex scan for `name=value` pairs. The first tier that
//! yields a non-empty value wins.
//!
//! Rewrites splice the new value into the original text so every other
//! parameter stays byte-for-byte identical.

use std::borrow::Cow;
use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::html::{decode_entities, decode_entities_mapped};
use crate::config::TS_EXPORT_PATH;

/// Known tracking-parameter names, highest priority first.
///
/// The order is significant: `payload` is checked before `subid`, which is
/// checked before the generic click/affiliate ids.
pub const TRACKING_PARAMS: &[&str] = &[
    "payload",
    "subid",
    "sub_id",
    "subid1",
    "sub_id1",
    "sub1",
    "aff_sub",
    "aff_sub1",
    "aff_sub2",
    "aff_click_id",
    "affid",
    "aff_id",
    "affiliate_id",
    "clickid",
    "click_id",
    "clickref",
    "cid",
    "tracking_id",
    "trackingid",
    "tracker",
    "track",
    "tid",
    "t",
    "s1",
    "s2",
    "s3",
    "sid",
    "sub",
    "var",
    "var1",
    "btag",
    "tag",
    "ref",
    "ref_id",
    "refid",
    "reference",
    "pid",
    "p",
    "campaign",
    "campaign_id",
    "utm_campaign",
    "utm_content",
    "utm_term",
    "source",
    "src",
    "data1",
    "data2",
    "afp",
    "afp1",
    "zoneid",
    "placement",
    "label",
    "dynamic",
    "dyn",
    "subtracking",
    "lp",
    "visit_id",
    "uid",
    "user_id",
    "token",
];

/// Characters that terminate a parameter value in free text.
const VALUE_CLASS: &str = r#"[^&#\s"'|<>]*"#;

static FALLBACK_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    TRACKING_PARAMS
        .iter()
        .map(|name| {
            let pattern = format!(
                r"(?i)(?:^|[?&;#\s])({})=({})",
                regex::escape(name),
                VALUE_CLASS
            );
            Regex::new(&pattern).expect("static regex compiles")
        })
        .collect()
});

static ANY_PAIR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?:^|[?&;#\s])([A-Za-z0-9_.\-\[\]]+)=({})", VALUE_CLASS))
        .expect("static regex compiles")
});

/// A resolved tracking parameter: the key as it appears in the URL and its
/// percent-decoded value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct TrackingParam {
    pub name: String,
    pub value: String,
}

/// Where a parameter value sits inside the (entity-decoded) text.
#[derive(Debug)]
struct Located {
    name: String,
    value: String,
    range: Range<usize>,
}

/// One `key=value` pair of a raw query string with byte offsets into the
/// text it was cut from.
struct RawPair<'a> {
    key: Cow<'a, str>,
    raw_key: &'a str,
    raw_value: &'a str,
    value: Cow<'a, str>,
    range: Range<usize>,
}

impl RawPair<'_> {
    fn value_equals(&self, expected: &str) -> bool {
        self.raw_value == expected || self.value == expected
    }
}

pub fn is_known_tracking_param(name: &str) -> bool {
    TRACKING_PARAMS.iter().any(|p| p.eq_ignore_ascii_case(name))
}

/// Find the highest-priority tracking parameter with a non-empty value.
pub fn resolve_tracking_param(url: &str) -> Option<TrackingParam> {
    let text = decode_entities(url);
    locate_any(&text).map(|found| TrackingParam {
        name: found.name,
        value: found.value,
    })
}

/// Replace the value of the highest-priority tracking parameter.
///
/// Returns the input unchanged when no tracking parameter is present.
pub fn substitute_tracking_value(url: &str, new_value: &str) -> String {
    let (text, offsets) = decode_entities_mapped(url);
    match locate_any(&text) {
        Some(found) => splice(url, original_range(&offsets, found.range), new_value),
        None => url.to_string(),
    }
}

/// Replace a parameter value only where it equals `old_value`.
///
/// Known tracking parameters are checked first in priority order; if none
/// carries `old_value`, any other query parameter holding exactly that value
/// is rewritten instead. Parameters with different values are never
/// touched, even when they rank higher.
pub fn substitute_tracking_value_matching(url: &str, old_value: &str, new_value: &str) -> String {
    let old_value = old_value.trim();
    if old_value.is_empty() {
        return substitute_tracking_value(url, new_value);
    }

    let (text, offsets) = decode_entities_mapped(url);
    match locate_by_value(&text, old_value) {
        Some(found) => splice(url, original_range(&offsets, found.range), new_value),
        None => url.to_string(),
    }
}

/// Map a byte range of the entity-decoded text back onto the input.
fn original_range(offsets: &[usize], decoded: Range<usize>) -> Range<usize> {
    offsets[decoded.start]..offsets[decoded.end]
}

fn splice(text: &str, range: Range<usize>, new_value: &str) -> String {
    let encoded = urlencoding::encode(new_value);
    let mut out = String::with_capacity(text.len() + encoded.len());
    out.push_str(&text[..range.start]);
    out.push_str(&encoded);
    out.push_str(&text[range.end..]);
    out
}

fn locate_any(text: &str) -> Option<Located> {
    match parsed_query_pairs(text) {
        Some(pairs) => scan_known(&pairs, |pair| !pair.value.is_empty()),
        None => fallback_scan(text, |value| !value.is_empty()),
    }
}

fn locate_by_value(text: &str, old_value: &str) -> Option<Located> {
    match parsed_query_pairs(text) {
        Some(pairs) => scan_known(&pairs, |pair| pair.value_equals(old_value)).or_else(|| {
            pairs
                .iter()
                .find(|pair| pair.value_equals(old_value))
                .map(to_located)
        }),
        None => fallback_scan(text, |value| value_matches(value, old_value)).or_else(|| {
            ANY_PAIR_RE
                .captures_iter(text)
                .find(|caps| value_matches(&caps[2], old_value))
                .and_then(|caps| captures_to_located(&caps))
        }),
    }
}

/// Exact pass, then case-insensitive pass, over the priority list.
fn scan_known<F>(pairs: &[RawPair<'_>], accept: F) -> Option<Located>
where
    F: Fn(&RawPair<'_>) -> bool,
{
    for name in TRACKING_PARAMS {
        if let Some(pair) = pairs.iter().find(|p| p.key == *name && accept(*p)) {
            return Some(to_located(pair));
        }
    }

    for name in TRACKING_PARAMS {
        if let Some(pair) = pairs
            .iter()
            .find(|p| p.key.eq_ignore_ascii_case(name) && accept(*p))
        {
            return Some(to_located(pair));
        }
    }

    None
}

fn fallback_scan<F>(text: &str, accept: F) -> Option<Located>
where
    F: Fn(&str) -> bool,
{
    FALLBACK_RES.iter().find_map(|re| {
        re.captures_iter(text)
            .find(|caps| accept(&caps[2]))
            .and_then(|caps| captures_to_located(&caps))
    })
}

fn value_matches(raw: &str, expected: &str) -> bool {
    raw == expected || percent_decode(raw) == expected
}

fn captures_to_located(caps: &regex::Captures<'_>) -> Option<Located> {
    let name = caps.get(1)?;
    let value = caps.get(2)?;
    Some(Located {
        name: name.as_str().to_string(),
        value: percent_decode(value.as_str()).into_owned(),
        range: value.range(),
    })
}

fn to_located(pair: &RawPair<'_>) -> Located {
    Located {
        name: pair.raw_key.to_string(),
        value: pair.value.to_string(),
        range: pair.range.clone(),
    }
}

fn percent_decode(raw: &str) -> Cow<'_, str> {
    urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw))
}

/// Split the query of an absolute URL into pairs, or `None` when the text is
/// not a parseable absolute URL.
fn parsed_query_pairs(text: &str) -> Option<Vec<RawPair<'_>>> {
    let parsed = url::Url::parse(text.trim()).ok()?;
    if !parsed.has_host() {
        return None;
    }

    let mut pairs = Vec::new();
    if parsed.query().is_none() {
        return Some(pairs);
    }

    let Some(query_start) = text.find('?').map(|i| i + 1) else {
        return Some(pairs);
    };
    if text[..query_start].contains('#') {
        return Some(pairs);
    }
    let query_end = text[query_start..]
        .find('#')
        .map(|i| query_start + i)
        .unwrap_or_else(|| text.trim_end().len().max(query_start));

    let mut offset = query_start;
    for segment in text[query_start..query_end].split('&') {
        let seg_start = offset;
        offset += segment.len() + 1;
        if segment.is_empty() {
            continue;
        }

        let (raw_key, value_start) = match segment.find('=') {
            Some(eq) => (&segment[..eq], seg_start + eq + 1),
            None => (segment, seg_start + segment.len()),
        };
        let range = value_start..seg_start + segment.len();
        let raw_value = &text[range.clone()];

        pairs.push(RawPair {
            key: percent_decode(raw_key),
            raw_key,
            raw_value,
            value: percent_decode(raw_value),
            range,
        });
    }

    Some(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(name: &str, value: &str) -> Option<TrackingParam> {
        Some(TrackingParam {
            name: name.to_string(),
            value: value.to_string(),
        })
    }

    #[test]
    fn test_payload_wins_over_later_params() {
        assert_eq!(
            resolve_tracking_param("https://t.example/go?subid=abc&payload=xyz&clickid=1"),
            param("payload", "xyz")
        );
    }

    #[test]
    fn test_empty_values_are_skipped() {
        assert_eq!(
            resolve_tracking_param("https://t.example/go?payload=&subid=s-1"),
            param("subid", "s-1")
        );
    }

    #[test]
    fn test_exact_pass_runs_before_case_insensitive_pass() {
        assert_eq!(
            resolve_tracking_param("https://t.example/go?SUBID=upper&clickid=lower"),
            param("clickid", "lower")
        );
        assert_eq!(
            resolve_tracking_param("https://t.example/go?ClickID=abc"),
            param("ClickID", "abc")
        );
    }

    #[test]
    fn test_entities_are_decoded_before_parsing() {
        assert_eq!(
            resolve_tracking_param("https://t.example/go?x=1&amp;clickid=abc"),
            param("clickid", "abc")
        );
    }

    #[test]
    fn test_regex_fallback_for_unparseable_url() {
        assert_eq!(
            resolve_tracking_param("aff.example.com/click?ClickId=86abc123 | more"),
            param("ClickId", "86abc123")
        );
        assert_eq!(resolve_tracking_param("not a url at all"), None);
    }

    #[test]
    fn test_no_param_returns_input_unchanged() {
        let url = "https://t.example/landing?lang=en";
        assert_eq!(resolve_tracking_param(url), None);
        assert_eq!(substitute_tracking_value(url, "SID-1"), url);
        assert_eq!(substitute_tracking_value_matching(url, "abc", "SID-1"), url);
    }

    #[test]
    fn test_substitution_preserves_other_params_byte_for_byte() {
        let url = "https://a.example/c?x=%2Fkeep&clickid=86abc123&y=a+b#frag";
        assert_eq!(
            substitute_tracking_value_matching(url, "86abc123", "SID-42"),
            "https://a.example/c?x=%2Fkeep&clickid=SID-42&y=a+b#frag"
        );
    }

    #[test]
    fn test_substitution_keeps_escaped_separators() {
        let url = "https://a.example/c?x=1&amp;clickid=86abc&amp;y=2";
        assert_eq!(
            substitute_tracking_value_matching(url, "86abc", "S"),
            "https://a.example/c?x=1&amp;clickid=S&amp;y=2"
        );
        assert_eq!(
            substitute_tracking_value(url, "S"),
            "https://a.example/c?x=1&amp;clickid=S&amp;y=2"
        );
        // 值本身含实体时整段替换
        assert_eq!(
            substitute_tracking_value_matching("https://a.example/c?clickid=86&#97;bc", "86abc", "S"),
            "https://a.example/c?clickid=S"
        );
    }

    #[test]
    fn test_value_equality_skips_higher_priority_params() {
        let url = "https://a.example/c?subid=unrelated&clickid=86abc";
        assert_eq!(
            substitute_tracking_value_matching(url, "86abc", "SID-1"),
            "https://a.example/c?subid=unrelated&clickid=SID-1"
        );
        // 不带 old value 时按优先级替换
        assert_eq!(
            substitute_tracking_value(url, "SID-1"),
            "https://a.example/c?subid=SID-1&clickid=86abc"
        );
    }

    #[test]
    fn test_value_equality_falls_back_to_unknown_param_names() {
        let url = "https://a.example/c?lang=en&zz_ref=86abc";
        assert_eq!(
            substitute_tracking_value_matching(url, "86abc", "SID-1"),
            "https://a.example/c?lang=en&zz_ref=SID-1"
        );
    }

    #[test]
    fn test_fallback_substitution() {
        assert_eq!(
            substitute_tracking_value_matching("go.example/x?clickid=86abc&s=1", "86abc", "SID 9"),
            "go.example/x?clickid=SID%209&s=1"
        );
    }

    #[test]
    fn test_resolve_substitute_resolve_round_trip() {
        let url = "https://a.example/c?aff_id=77&btag=old";
        assert_eq!(resolve_tracking_param(url), param("aff_id", "77"));
        let rewritten = substitute_tracking_value(url, "SID-42");
        assert_eq!(resolve_tracking_param(&rewritten), param("aff_id", "SID-42"));
    }

    #[test]
    fn test_priority_list_has_no_duplicates() {
        let mut seen = std::collections::HashSet::new();
        for name in TRACKING_PARAMS {
            assert!(seen.insert(*name), "duplicate tracking param {}", name);
        }
        assert_eq!(TRACKING_PARAMS[0], "payload");
        assert!(is_known_tracking_param("ClickID"));
    }
}
