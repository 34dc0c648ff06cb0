//! Sub-ID value templates
//!
//! A website's `format_pattern` mixes literal text with tokens:
//! `{YYYY}` `{YY}` `{MM}` `{DD}` (UTC date), `{RAND:n}` and `{SEQ:n}`.

use chrono::{DateTime, Datelike, Utc};

use crate::errors::{Result, TrackdeskError};
use crate::utils::generate_random_code;

pub const DEFAULT_PATTERN: &str = "{RAND:8}";
pub const MAX_RAND_LENGTH: usize = 32;
pub const MAX_SEQ_WIDTH: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Year4,
    Year2,
    Month,
    Day,
    Rand(usize),
    Seq(usize),
}

/// Parsed `format_pattern`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubIdPattern {
    tokens: Vec<Token>,
}

impl SubIdPattern {
    /// 解析模板；空模板等价于 `{RAND:8}`
    pub fn parse(pattern: &str) -> Result<Self> {
        let pattern = pattern.trim();
        let pattern = if pattern.is_empty() {
            DEFAULT_PATTERN
        } else {
            pattern
        };

        let mut tokens = Vec::new();
        let mut literal = String::new();
        let mut rest = pattern;

        while let Some(c) = rest.chars().next() {
            match c {
                '{' => {
                    let Some(end) = rest.find('}') else {
                        return Err(TrackdeskError::validation(format!(
                            "Unclosed token in pattern '{}'",
                            pattern
                        )));
                    };
                    if !literal.is_empty() {
                        tokens.push(Token::Literal(std::mem::take(&mut literal)));
                    }
                    tokens.push(parse_token(&rest[1..end])?);
                    rest = &rest[end + 1..];
                }
                '}' => {
                    return Err(TrackdeskError::validation(format!(
                        "Unexpected '}}' in pattern '{}'",
                        pattern
                    )));
                }
                _ => {
                    literal.push(c);
                    rest = &rest[c.len_utf8()..];
                }
            }
        }
        if !literal.is_empty() {
            tokens.push(Token::Literal(literal));
        }

        Ok(Self { tokens })
    }

    pub fn uses_sequence(&self) -> bool {
        self.tokens.iter().any(|t| matches!(t, Token::Seq(_)))
    }

    /// 模板不含 RAND/SEQ 时每次生成的值相同
    pub fn is_constant_per_day(&self) -> bool {
        !self
            .tokens
            .iter()
            .any(|t| matches!(t, Token::Rand(_) | Token::Seq(_)))
    }

    pub fn render(&self, date: DateTime<Utc>, seq: u64) -> String {
        let mut out = String::new();
        for token in &self.tokens {
            match token {
                Token::Literal(s) => out.push_str(s),
                Token::Year4 => out.push_str(&format!("{:04}", date.year())),
                Token::Year2 => out.push_str(&format!("{:02}", date.year().rem_euclid(100))),
                Token::Month => out.push_str(&format!("{:02}", date.month())),
                Token::Day => out.push_str(&format!("{:02}", date.day())),
                Token::Rand(n) => out.push_str(&generate_random_code(*n)),
                Token::Seq(width) => out.push_str(&format!("{:0width$}", seq, width = *width)),
            }
        }
        out
    }
}

fn parse_token(body: &str) -> Result<Token> {
    let body = body.trim();
    match body.to_ascii_uppercase().as_str() {
        "YYYY" => return Ok(Token::Year4),
        "YY" => return Ok(Token::Year2),
        "MM" => return Ok(Token::Month),
        "DD" => return Ok(Token::Day),
        _ => {}
    }

    let Some((name, arg)) = body.split_once(':') else {
        return Err(unknown_token(body));
    };
    let width = arg.trim().parse::<usize>().map_err(|_| {
        TrackdeskError::validation(format!("Token '{{{}}}' needs a numeric length", body))
    })?;

    match name.trim().to_ascii_uppercase().as_str() {
        "RAND" if (1..=MAX_RAND_LENGTH).contains(&width) => Ok(Token::Rand(width)),
        "SEQ" if (1..=MAX_SEQ_WIDTH).contains(&width) => Ok(Token::Seq(width)),
        "RAND" => Err(TrackdeskError::validation(format!(
            "RAND length must be between 1 and {}",
            MAX_RAND_LENGTH
        ))),
        "SEQ" => Err(TrackdeskError::validation(format!(
            "SEQ width must be between 1 and {}",
            MAX_SEQ_WIDTH
        ))),
        _ => Err(unknown_token(body)),
    }
}

fn unknown_token(body: &str) -> TrackdeskError {
    TrackdeskError::validation(format!("Unknown token '{{{}}}'", body))
}
