//! GEO brand-ranking service

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;
use ts_rs::TS;

use super::{BatchOutcome, DEFAULT_MAX_BATCH_SIZE, check_batch_size};
use crate::affiliate::lineup::is_cloaked;
use crate::affiliate::params::{TrackingParam, resolve_tracking_param, substitute_tracking_value};
use crate::config::TS_EXPORT_PATH;
use crate::errors::{Result, TrackdeskError};
use crate::storage::models::{MAX_POSITION, MIN_POSITION};
use crate::storage::{Geo, Ranking, RankingInput, SeaOrmStorage};
use crate::utils::url_validator::normalize_optional_url;

/// One featured brand of a GEO with its link carrying a Sub-ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct LineupEntry {
    pub position: i32,
    pub brand_id: i32,
    pub brand_name: String,
    /// Affiliate link or the brand's default URL, before rewriting
    pub source_link: Option<String>,
    pub link: Option<String>,
    /// Parameter that now carries the Sub-ID; None when nothing was rewritten
    pub tracking_param: Option<TrackingParam>,
    pub cloaked: bool,
}

pub struct RankingService {
    storage: Arc<SeaOrmStorage>,
    max_batch_size: usize,
}

impl RankingService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self {
            storage,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }

    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size.max(1);
        self
    }

    async fn geo(&self, geo_id: i32) -> Result<Geo> {
        self.storage
            .get_geo(geo_id)
            .await?
            .ok_or_else(|| TrackdeskError::not_found(format!("GEO {} not found", geo_id)))
    }

    pub async fn list_rankings(&self, geo_id: i32) -> Result<Vec<Ranking>> {
        self.geo(geo_id).await?;
        self.storage.list_rankings(geo_id).await
    }

    pub async fn upsert_ranking(&self, geo_id: i32, input: RankingInput) -> Result<Ranking> {
        self.geo(geo_id).await?;
        let input = self.validate_input(input).await?;
        let ranking = self.storage.upsert_ranking(geo_id, &input).await?;
        info!(
            "RankingService: GEO {} brand '{}' -> {:?}",
            geo_id, ranking.brand_name, ranking.position
        );
        Ok(ranking)
    }

    /// 逐项 upsert，失败项记录后继续
    pub async fn bulk_upsert(
        &self,
        geo_id: i32,
        inputs: Vec<RankingInput>,
    ) -> Result<BatchOutcome<Ranking>> {
        check_batch_size(inputs.len(), self.max_batch_size)?;
        self.geo(geo_id).await?;

        let mut outcome = BatchOutcome::default();
        for input in inputs {
            let key = format!("brand {}", input.brand_id);
            let result = match self.validate_input(input).await {
                Ok(input) => self.storage.upsert_ranking(geo_id, &input).await,
                Err(e) => Err(e),
            };
            outcome.record(key, result);
        }
        Ok(outcome)
    }

    /// 整体替换：先完整校验，再在一个事务内删除并插入
    pub async fn replace_rankings(
        &self,
        geo_id: i32,
        inputs: Vec<RankingInput>,
    ) -> Result<Vec<Ranking>> {
        self.geo(geo_id).await?;
        if inputs.len() > self.max_batch_size {
            return Err(TrackdeskError::validation(format!(
                "Batch size {} exceeds the maximum of {}",
                inputs.len(),
                self.max_batch_size
            )));
        }

        let mut brands = HashSet::new();
        let mut positions = HashSet::new();
        let mut validated = Vec::with_capacity(inputs.len());
        for input in inputs {
            if !brands.insert(input.brand_id) {
                return Err(TrackdeskError::validation(format!(
                    "Brand {} appears more than once",
                    input.brand_id
                )));
            }
            if let Some(position) = input.position
                && !positions.insert(position)
            {
                return Err(TrackdeskError::validation(format!(
                    "Position {} is assigned more than once",
                    position
                )));
            }
            validated.push(self.validate_input(input).await?);
        }

        self.storage.replace_rankings(geo_id, &validated).await?;
        self.storage.list_rankings(geo_id).await
    }

    pub async fn delete_ranking(&self, geo_id: i32, ranking_id: i32) -> Result<()> {
        if !self.storage.delete_ranking(geo_id, ranking_id).await? {
            return Err(TrackdeskError::not_found(format!(
                "Ranking {} not found in GEO {}",
                ranking_id, geo_id
            )));
        }
        Ok(())
    }

    /// 精选位的链接替换为携带 `sub_id` 的版本；伪装链接原样保留
    pub async fn lineup(&self, geo_id: i32, sub_id: &str) -> Result<Vec<LineupEntry>> {
        let sub_id = sub_id.trim();
        if sub_id.is_empty() {
            return Err(TrackdeskError::validation("sub_id cannot be empty"));
        }

        let rankings = self.list_rankings(geo_id).await?;
        Ok(rankings
            .iter()
            .filter_map(|r| r.position.map(|p| lineup_entry(r, p, sub_id)))
            .collect())
    }

    async fn validate_input(&self, input: RankingInput) -> Result<RankingInput> {
        validate_position(input.position)?;
        if self.storage.get_brand(input.brand_id).await?.is_none() {
            return Err(TrackdeskError::not_found(format!(
                "Brand {} not found",
                input.brand_id
            )));
        }
        let affiliate_link = normalize_optional_url(input.affiliate_link.as_deref())?;
        Ok(RankingInput {
            affiliate_link,
            ..input
        })
    }
}

fn validate_position(position: Option<i32>) -> Result<()> {
    match position {
        Some(p) if !(MIN_POSITION..=MAX_POSITION).contains(&p) => {
            Err(TrackdeskError::validation(format!(
                "Position {} is outside {}..={}",
                p, MIN_POSITION, MAX_POSITION
            )))
        }
        _ => Ok(()),
    }
}

fn lineup_entry(ranking: &Ranking, position: i32, sub_id: &str) -> LineupEntry {
    let source = ranking.effective_link().map(String::from);
    let cloaked = source.as_deref().is_some_and(is_cloaked);

    let (link, tracking_param) = match source.as_deref() {
        Some(url) if !cloaked => {
            let rewritten = substitute_tracking_value(url, sub_id);
            let param = if rewritten != url {
                resolve_tracking_param(&rewritten)
            } else {
                None
            };
            (Some(rewritten), param)
        }
        other => (other.map(String::from), None),
    };

    LineupEntry {
        position,
        brand_id: ranking.brand_id,
        brand_name: ranking.brand_name.clone(),
        source_link: source,
        link,
        tracking_param,
        cloaked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn ranking(link: Option<&str>, default_url: Option<&str>) -> Ranking {
        Ranking {
            id: 1,
            geo_id: 1,
            brand_id: 7,
            brand_name: "Brand X".into(),
            brand_default_url: default_url.map(String::from),
            position: Some(1),
            affiliate_link: link.map(String::from),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_validate_position() {
        assert!(validate_position(None).is_ok());
        assert!(validate_position(Some(1)).is_ok());
        assert!(validate_position(Some(10)).is_ok());
        assert!(validate_position(Some(0)).is_err());
        assert!(validate_position(Some(11)).is_err());
    }

    #[test]
    fn test_lineup_entry_rewrites_tracking_param() {
        let entry = lineup_entry(
            &ranking(Some("https://aff.example.com/click?clickid=OLD&lang=en"), None),
            1,
            "SID-42",
        );
        assert_eq!(
            entry.link.as_deref(),
            Some("https://aff.example.com/click?clickid=SID-42&lang=en")
        );
        let param = entry.tracking_param.unwrap();
        assert_eq!(param.name, "clickid");
        assert_eq!(param.value, "SID-42");
        assert!(!entry.cloaked);
    }

    #[test]
    fn test_lineup_entry_falls_back_to_default_url() {
        let entry = lineup_entry(&ranking(None, Some("https://x.example.com/?subid=A")), 2, "B");
        assert_eq!(entry.position, 2);
        assert_eq!(entry.link.as_deref(), Some("https://x.example.com/?subid=B"));
    }

    #[test]
    fn test_lineup_entry_keeps_cloaked_link() {
        let url = "https://go.linkcloak.io/brand-x?subid=A";
        let entry = lineup_entry(&ranking(Some(url), None), 1, "B");
        assert!(entry.cloaked);
        assert_eq!(entry.link.as_deref(), Some(url));
        assert!(entry.tracking_param.is_none());
    }

    #[test]
    fn test_lineup_entry_without_param_is_unchanged() {
        let url = "https://x.example.com/landing";
        let entry = lineup_entry(&ranking(Some(url), None), 1, "B");
        assert_eq!(entry.link.as_deref(), Some(url));
        assert!(entry.tracking_param.is_none());
    }
}
