//! Builds the rich-text comment posted back to the task tracker.
//!
//! The comment is the task's TOP PICKS LINEUP with every affiliate link
//! re-pointed from the task id to the Sub-ID. Without a lineup section the
//! comment degrades to a single `Sub-ID: <value>` line.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::lineup::{SECTION_TITLE, URL_RE, find_section, is_cloaked, section_lines, trim_url};
use super::params::substitute_tracking_value_matching;
use crate::config::TS_EXPORT_PATH;

/// Upper bound on per-URL rewrites; a link never carries more task ids than this.
const MAX_URL_REWRITES: usize = 16;

/// 代码块语言标记
const CODE_BLOCK_LANGUAGE: &str = "plain";

static SPACES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]{2,}").expect("static regex compiles"));

static TRAILING_EMPTY_CELLS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\|\s*){2,}$").expect("static regex compiles"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct CodeBlock {
    #[serde(rename = "code-block")]
    pub code_block: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct SegmentAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub bold: Option<bool>,
    #[serde(rename = "code-block", default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub code_block: Option<CodeBlock>,
}

impl SegmentAttributes {
    pub fn is_empty(&self) -> bool {
        self.bold.is_none() && self.code_block.is_none()
    }
}

/// One run of text with its formatting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct CommentSegment {
    pub text: String,
    #[serde(default, skip_serializing_if = "SegmentAttributes::is_empty")]
    pub attributes: SegmentAttributes,
}

impl CommentSegment {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attributes: SegmentAttributes::default(),
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attributes: SegmentAttributes {
                bold: Some(true),
                code_block: None,
            },
        }
    }

    /// Line break closing a code-block line.
    pub fn code_line_break() -> Self {
        Self {
            text: "\n".to_string(),
            attributes: SegmentAttributes {
                bold: None,
                code_block: Some(CodeBlock {
                    code_block: CODE_BLOCK_LANGUAGE.to_string(),
                }),
            },
        }
    }
}

/// Comment body in the tracker's structured format, ready to POST.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct TrackerComment {
    pub comment: Vec<CommentSegment>,
    #[serde(default)]
    pub notify_all: bool,
}

impl TrackerComment {
    pub fn fallback(sub_id: &str) -> Self {
        Self {
            comment: vec![CommentSegment::plain(fallback_text(sub_id))],
            notify_all: false,
        }
    }

    /// Concatenated text of all segments.
    pub fn plain_text(&self) -> String {
        self.comment.iter().map(|s| s.text.as_str()).collect()
    }

    pub fn is_fallback(&self) -> bool {
        self.comment.len() == 1 && self.comment[0].attributes.is_empty()
    }
}

pub fn fallback_text(sub_id: &str) -> String {
    format!("Sub-ID: {}", sub_id)
}

/// Build the comment for `sub_id` from a task description.
pub fn build_comment(description: &str, task_id: &str, sub_id: &str) -> TrackerComment {
    let Some(section) = find_section(description) else {
        return TrackerComment::fallback(sub_id);
    };

    let rewriter = LineRewriter::new(task_id, sub_id);
    let lines: Vec<String> = section_lines(section)
        .iter()
        .filter_map(|line| rewriter.rewrite(line))
        .collect();

    if lines.is_empty() {
        return TrackerComment::fallback(sub_id);
    }

    let mut segments = Vec::with_capacity(lines.len() * 2 + 4);
    segments.push(CommentSegment::bold(format!("🎯 {}", SECTION_TITLE)));
    segments.push(CommentSegment::plain("\n"));
    segments.push(CommentSegment::bold(fallback_text(sub_id)));
    segments.push(CommentSegment::plain("\n"));
    for line in lines {
        segments.push(CommentSegment::plain(line));
        segments.push(CommentSegment::code_line_break());
    }

    TrackerComment {
        comment: segments,
        notify_all: false,
    }
}

/// Per-comment state: the task id matcher is compiled once.
struct LineRewriter<'a> {
    task_id: &'a str,
    sub_id: &'a str,
    task_id_re: Option<Regex>,
}

impl<'a> LineRewriter<'a> {
    fn new(task_id: &'a str, sub_id: &'a str) -> Self {
        let task_id = task_id.trim();
        let bare = task_id.trim_start_matches('#');
        let task_id_re = if bare.is_empty() {
            None
        } else {
            Regex::new(&format!(r"(?i)#?\b{}\b", regex::escape(bare))).ok()
        };
        Self {
            task_id,
            sub_id,
            task_id_re,
        }
    }

    /// Rewrite one lineup row. `None` drops the row.
    fn rewrite(&self, line: &str) -> Option<String> {
        let mut out = String::with_capacity(line.len() + 16);
        let mut last = 0;
        let mut total = 0;
        let mut cloaked = 0;

        for m in URL_RE.find_iter(line) {
            let url = trim_url(m.as_str());
            out.push_str(&self.strip_task_id(&line[last..m.start()]));
            total += 1;
            if is_cloaked(url) {
                cloaked += 1;
            } else {
                out.push_str(&self.rewrite_url(url));
            }
            last = m.start() + url.len();
        }
        out.push_str(&self.strip_task_id(&line[last..]));

        if total > 0 && cloaked == total {
            return None;
        }

        let tidy = SPACES_RE.replace_all(out.trim_end(), " ");
        let tidy = TRAILING_EMPTY_CELLS_RE.replace(&tidy, "|").into_owned();
        if tidy.trim().chars().all(|c| c == '|' || c.is_whitespace()) {
            return None;
        }
        Some(tidy)
    }

    /// Re-point every parameter whose value is the task id.
    fn rewrite_url(&self, url: &str) -> String {
        let mut current = substitute_tracking_value_matching(url, self.task_id, self.sub_id);
        if self.task_id.is_empty() || self.task_id == self.sub_id {
            return current;
        }

        for _ in 1..MAX_URL_REWRITES {
            let next = substitute_tracking_value_matching(&current, self.task_id, self.sub_id);
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    fn strip_task_id(&self, text: &str) -> String {
        match &self.task_id_re {
            Some(re) => re.replace_all(text, "").into_owned(),
            None => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_without_section() {
        let comment = build_comment("Just a brief, no lineup.", "86abc123", "SID-42");
        assert_eq!(comment.plain_text(), "Sub-ID: SID-42");
        assert!(comment.is_fallback());
        assert_eq!(
            serde_json::to_value(&comment).unwrap(),
            serde_json::json!({
                "comment": [{ "text": "Sub-ID: SID-42" }],
                "notify_all": false
            })
        );
    }

    #[test]
    fn test_rewrites_task_id_to_sub_id() {
        let description = "🎯 TOP PICKS LINEUP\nBrand X | https://aff.example.com/click?clickid=86abc123 |";
        let comment = build_comment(description, "86abc123", "SID-42");
        let text = comment.plain_text();
        assert!(text.contains("https://aff.example.com/click?clickid=SID-42"));
        assert!(!text.contains("86abc123"));
        assert!(!comment.is_fallback());
    }

    #[test]
    fn test_cloaked_links_are_dropped() {
        let description = "## 🎯 TOP PICKS LINEUP\n\
                           | Brand | Link |\n\
                           |---|---|\n\
                           | A | https://go.linkcloak.io/a?clickid=86abc123 |\n\
                           | B | https://b.example.com/?subid=86abc123 https://go.linkcloak.io/b |";
        let text = build_comment(description, "86abc123", "SID-7").plain_text();
        assert!(!text.contains("linkcloak"));
        assert!(!text.contains("| A |"));
        assert!(text.contains("| B | https://b.example.com/?subid=SID-7 |"));
    }

    #[test]
    fn test_stray_task_id_artifacts_are_removed() {
        let description = "🎯 TOP PICKS LINEUP\n\
                           | Brand X | https://aff.example.com/c?btag=86abc123 | 86abc123 |\n\
                           | 86abc123 |";
        let comment = build_comment(description, "86abc123", "SID-1");
        let text = comment.plain_text();
        assert!(!text.contains("86abc123"));
        assert!(text.contains("| Brand X | https://aff.example.com/c?btag=SID-1 |\n"));
    }

    #[test]
    fn test_task_id_in_several_params() {
        let description = "🎯 TOP PICKS LINEUP\nBrand X | https://aff.example.com/click?clickid=86abc123&sub1=86abc123&lang=en |";
        let text = build_comment(description, "86abc123", "SID-42").plain_text();
        assert!(text.contains("https://aff.example.com/click?clickid=SID-42&sub1=SID-42&lang=en"));
        assert!(!text.contains("86abc123"));
    }

    #[test]
    fn test_wrapped_task_id_with_letters_only_tail() {
        let description = "🎯 TOP PICKS LINEUP\nBrand X | https://aff.example.com/click?clickid=86abc\ndef |";
        let text = build_comment(description, "86abcdef", "SID-42").plain_text();
        assert!(text.contains("Brand X | https://aff.example.com/click?clickid=SID-42 |"));
        assert!(!text.contains("86abc"));
        assert!(!text.contains("def |"));
    }

    #[test]
    fn test_unrelated_params_untouched() {
        let description = "🎯 TOP PICKS LINEUP\nBrand | https://a.example.com/?subid=keep&clickid=86abc123";
        let text = build_comment(description, "86abc123", "SID-2").plain_text();
        assert!(text.contains("?subid=keep&clickid=SID-2"));
    }

    #[test]
    fn test_segment_layout() {
        let description = "🎯 TOP PICKS LINEUP\nBrand | https://a.example.com/?clickid=t1";
        let comment = build_comment(description, "t1", "S1");
        assert_eq!(comment.comment[0], CommentSegment::bold("🎯 TOP PICKS LINEUP"));
        assert_eq!(comment.comment[2], CommentSegment::bold("Sub-ID: S1"));
        let last = comment.comment.last().unwrap();
        assert_eq!(last.text, "\n");
        assert_eq!(
            serde_json::to_value(&last.attributes).unwrap(),
            serde_json::json!({ "code-block": { "code-block": "plain" } })
        );
    }

    #[test]
    fn test_empty_section_falls_back() {
        let description = "🎯 TOP PICKS LINEUP\n| Brand | Link |\n|---|---|\n## Next";
        assert!(build_comment(description, "t1", "S1").is_fallback());
    }
}
