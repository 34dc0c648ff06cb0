use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString};
use ts_rs::TS;

use crate::config::TS_EXPORT_PATH;

/// Positions 1..=10 are "featured"; rankings without a position are "other".
pub const MIN_POSITION: i32 = 1;
pub const MAX_POSITION: i32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct Website {
    pub id: i32,
    pub name: String,
    pub format_pattern: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct SubId {
    pub id: i32,
    pub website_id: i32,
    pub value: String,
    pub url: Option<String>,
    pub task_id: Option<String>,
    pub comment_posted: bool,
    pub is_immutable: bool,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a Sub-ID.
#[derive(Debug, Clone, Default)]
pub struct NewSubId {
    pub website_id: i32,
    pub value: String,
    pub url: Option<String>,
    pub task_id: Option<String>,
    pub comment_posted: bool,
    pub is_immutable: bool,
}

/// Sub-ID 列表过滤条件
#[derive(Debug, Clone, Default)]
pub struct SubIdFilter {
    /// 模糊匹配 value / url / task_id
    pub search: Option<String>,
    /// Some(true) 只返回已关联任务的，Some(false) 只返回未关联的
    pub linked: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct Geo {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub sort_order: i32,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    TS,
    EnumIter,
    EnumString,
    AsRefStr,
)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum BrandStatus {
    #[default]
    Active,
    Paused,
    Retired,
}

impl std::fmt::Display for BrandStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct Brand {
    pub id: i32,
    pub name: String,
    pub default_url: Option<String>,
    pub status: BrandStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct BrandList {
    pub id: i32,
    pub geo_id: i32,
    pub name: String,
    pub sort_order: i32,
}

/// A GEO-brand ranking joined with the brand's name and default URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct Ranking {
    pub id: i32,
    pub geo_id: i32,
    pub brand_id: i32,
    pub brand_name: String,
    pub brand_default_url: Option<String>,
    pub position: Option<i32>,
    pub affiliate_link: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Ranking {
    pub fn is_featured(&self) -> bool {
        self.position.is_some()
    }

    /// Affiliate link, or the brand's default URL when none is set.
    pub fn effective_link(&self) -> Option<&str> {
        self.affiliate_link
            .as_deref()
            .filter(|l| !l.trim().is_empty())
            .or(self.brand_default_url.as_deref())
            .filter(|l| !l.trim().is_empty())
    }
}

/// Insert/update payload for a ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct RankingInput {
    pub brand_id: i32,
    #[serde(default)]
    #[ts(optional)]
    pub position: Option<i32>,
    #[serde(default)]
    #[ts(optional)]
    pub affiliate_link: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_brand_status_parsing() {
        assert_eq!(BrandStatus::from_str("Paused").unwrap(), BrandStatus::Paused);
        assert_eq!(BrandStatus::Retired.to_string(), "retired");
        assert!(BrandStatus::from_str("gone").is_err());
        assert_eq!(
            serde_json::to_string(&BrandStatus::Active).unwrap(),
            "\"active\""
        );
    }

    #[test]
    fn test_effective_link_prefers_affiliate_link() {
        let mut ranking = Ranking {
            id: 1,
            geo_id: 1,
            brand_id: 1,
            brand_name: "Brand X".into(),
            brand_default_url: Some("https://x.example.com/?btag=default".into()),
            position: Some(1),
            affiliate_link: Some("https://x.example.com/?btag=aff".into()),
            updated_at: Utc::now(),
        };
        assert_eq!(
            ranking.effective_link(),
            Some("https://x.example.com/?btag=aff")
        );
        ranking.affiliate_link = Some("  ".into());
        assert_eq!(
            ranking.effective_link(),
            Some("https://x.example.com/?btag=default")
        );
        ranking.brand_default_url = None;
        assert_eq!(ranking.effective_link(), None);
    }
}
