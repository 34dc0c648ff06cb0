//! Locates the `🎯 TOP PICKS LINEUP` block inside a task description and
//! rebuilds its rows into logical lines.
//!
//! Descriptions are pasted from spreadsheets and rich-text editors, so a
//! single table row may be wrapped across several physical lines and an
//! affiliate URL may be cut in the middle of its query string. Rows are
//! re-joined before any URL is read out of them.

use once_cell::sync::Lazy;
use regex::Regex;

/// Hostname of the link-masking service. Links through it are never rewritten.
pub const CLOAKED_HOST: &str = "go.linkcloak.io";

pub const SECTION_TITLE: &str = "TOP PICKS LINEUP";

static MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"🎯[\s*_#]*TOP PICKS LINEUP").expect("static regex compiles")
});

// 一级/二级标题结束本段，三级及以下标题属于段内内容
static HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s{0,3}#{1,2}(?:\s|$)").expect("static regex compiles"));

pub(crate) static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"https?://[^\s"'|<>]+"#).expect("static regex compiles"));

static SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\s|:\-=*_+~]+$").expect("static regex compiles"));

// 换行后紧跟的 query 续写：`=value`、`&key=value`
static CONTINUATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(?:=[^\s"'|<>]*|&[A-Za-z0-9_.\-\[\]]+=[^\s"'|<>]*)"#)
        .expect("static regex compiles")
});

static BARE_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_\-]+").expect("static regex compiles"));

/// Literal header cells, compared case-insensitively after trimming.
const HEADER_CELLS: &[&str] = &[
    "#",
    "no",
    "no.",
    "pos",
    "pos.",
    "position",
    "rank",
    "brand",
    "brands",
    "brand name",
    "casino",
    "operator",
    "link",
    "links",
    "url",
    "aff link",
    "affiliate link",
    "affiliate url",
    "tracking link",
    "bonus",
    "offer",
    "notes",
    "comment",
    "comments",
];

/// Return the section from the marker line up to (not including) the next
/// level-1/2 heading, or `None` if the marker is absent.
pub fn find_section(description: &str) -> Option<&str> {
    let marker = MARKER_RE.find(description)?;
    let start = description[..marker.start()]
        .rfind('\n')
        .map(|i| i + 1)
        .unwrap_or(0);

    let body_start = description[marker.end()..]
        .find('\n')
        .map(|i| marker.end() + i + 1)
        .unwrap_or(description.len());

    let mut offset = body_start;
    for line in description[body_start..].split_inclusive('\n') {
        if HEADING_RE.is_match(line.trim_end_matches(['\r', '\n'])) {
            return Some(description[start..offset].trim_end());
        }
        offset += line.len();
    }

    Some(description[start..].trim_end())
}

/// Content rows of a section with wrapped URLs re-joined.
///
/// The marker line, blank lines, separator rows and header rows are dropped.
pub fn section_lines(section: &str) -> Vec<String> {
    let mut logical: Vec<String> = Vec::new();

    for raw in section.lines().skip(1) {
        if let Some(prev) = logical.last_mut()
            && let Some(joined) = join_wrapped_line(prev, raw)
        {
            *prev = joined;
            continue;
        }
        logical.push(raw.to_string());
    }

    logical
        .into_iter()
        .map(|line| rejoin_inline(&line))
        .filter(|line| !is_skippable(line))
        .collect()
}

/// First non-cloaked URL of every content row of the lineup section.
pub fn extract_links(description: &str) -> Option<Vec<String>> {
    let section = find_section(description)?;
    Some(
        section_lines(section)
            .iter()
            .filter_map(|line| first_url(line))
            .filter(|url| !is_cloaked(url))
            .map(|url| url.to_string())
            .collect(),
    )
}

pub fn first_url(line: &str) -> Option<&str> {
    URL_RE.find(line).map(|m| trim_url(m.as_str()))
}

/// Whether the URL points at the link-masking host (or one of its subdomains).
pub fn is_cloaked(url: &str) -> bool {
    match url::Url::parse(url) {
        Ok(parsed) => parsed
            .host_str()
            .is_some_and(|host| host_is_cloaked(&host.to_ascii_lowercase())),
        Err(_) => {
            let rest = url
                .split_once("://")
                .map(|(_, rest)| rest)
                .unwrap_or(url);
            let host = rest
                .split(['/', '?', '#', ':'])
                .next()
                .unwrap_or_default()
                .to_ascii_lowercase();
            host_is_cloaked(&host)
        }
    }
}

fn host_is_cloaked(host: &str) -> bool {
    host == CLOAKED_HOST || host.ends_with(&format!(".{}", CLOAKED_HOST))
}

/// Strip trailing punctuation that belongs to the surrounding prose.
pub(crate) fn trim_url(url: &str) -> &str {
    url.trim_end_matches([',', '.', ')', ']', ';', '*'])
}

fn is_skippable(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty()
        || SEPARATOR_RE.is_match(trimmed)
        || MARKER_RE.is_match(trimmed)
        || is_header_row(trimmed)
}

fn is_header_row(line: &str) -> bool {
    if URL_RE.is_match(line) {
        return false;
    }
    let mut cells = line
        .split('|')
        .map(|cell| cell.trim().trim_matches('*').trim())
        .filter(|cell| !cell.is_empty())
        .peekable();
    if cells.peek().is_none() {
        return false;
    }
    cells.all(|cell| {
        HEADER_CELLS
            .iter()
            .any(|header| header.eq_ignore_ascii_case(cell))
    })
}

/// The URL running into the end of `line`, if any.
fn trailing_url(line: &str) -> Option<regex::Match<'_>> {
    let trimmed = line.trim_end();
    URL_RE
        .find_iter(trimmed)
        .last()
        .filter(|m| m.end() == trimmed.len())
}

/// Join `next` onto `prev` when `prev` ends in a URL and `next` starts with
/// what looks like the rest of its query string.
fn join_wrapped_line(prev: &str, next: &str) -> Option<String> {
    let url = trailing_url(prev)?;
    let next_trimmed = next.trim_start();

    if !CONTINUATION_RE.is_match(next_trimmed) {
        let token = BARE_TOKEN_RE.find(next_trimmed)?;
        let rest = next_trimmed[token.end()..].trim();
        let url_open = url.as_str().ends_with(['=', '?', '&']);
        let lone_token = rest.is_empty() || rest == "|";
        if !url_open && !lone_token {
            return None;
        }
    }

    let mut joined = prev.trim_end().to_string();
    joined.push_str(next_trimmed);
    Some(joined)
}

/// Re-join a URL split by whitespace inside one line, e.g.
/// `https://x/?clickid= 86abc` or `https://x/?a=1 &clickid=2`.
fn rejoin_inline(line: &str) -> String {
    let mut current = line.to_string();
    let mut search_from = 0;

    while let Some(m) = URL_RE.find_at(&current, search_from) {
        let (url_start, url_end) = (m.start(), m.end());
        let url_open = m.as_str().ends_with(['=', '?', '&']);
        let after = &current[url_end..];
        let rest = after.trim_start();
        let gap = after.len() - rest.len();

        let continues = gap > 0
            && !rest.is_empty()
            && (CONTINUATION_RE.is_match(rest) || (url_open && BARE_TOKEN_RE.is_match(rest)));

        if continues {
            // 去掉空白后从同一起点重新匹配，URL 可能还有下一段
            current.replace_range(url_end..url_end + gap, "");
            search_from = url_start;
        } else {
            search_from = url_end;
        }
    }

    current
}
