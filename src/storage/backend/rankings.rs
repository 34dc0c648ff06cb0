//! GEO-brand ranking queries and mutations.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter,
    TransactionTrait,
};
use tracing::info;

use super::converters::model_to_ranking;
use super::{SeaOrmStorage, db_err};
use crate::errors::{Result, TrackdeskError};
use crate::storage::models::{Ranking, RankingInput};

use migration::entities::{brand, geo_brand_ranking as ranking};

/// Featured rows by position, then "other" rows by brand name.
pub fn sort_rankings(rankings: &mut [Ranking]) {
    rankings.sort_by(|a, b| match (a.position, b.position) {
        (Some(pa), Some(pb)) => pa.cmp(&pb),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a
            .brand_name
            .to_lowercase()
            .cmp(&b.brand_name.to_lowercase())
            .then(a.id.cmp(&b.id)),
    });
}

impl SeaOrmStorage {
    pub async fn list_rankings(&self, geo_id: i32) -> Result<Vec<Ranking>> {
        let db = &self.db;
        let rows = self
            .retry
            .run(&format!("list_rankings({})", geo_id), || async {
                ranking::Entity::find()
                    .filter(ranking::Column::GeoId.eq(geo_id))
                    .find_also_related(brand::Entity)
                    .all(db)
                    .await
            })
            .await
            .map_err(|e| db_err("Failed to list rankings", e))?;

        let mut rankings: Vec<Ranking> = rows
            .into_iter()
            .map(|(model, brand)| model_to_ranking(model, brand))
            .collect();
        sort_rankings(&mut rankings);
        Ok(rankings)
    }

    pub async fn get_ranking(&self, id: i32) -> Result<Option<Ranking>> {
        let row = ranking::Entity::find_by_id(id)
            .find_also_related(brand::Entity)
            .one(&self.db)
            .await
            .map_err(|e| db_err("Failed to load ranking", e))?;

        Ok(row.map(|(model, brand)| model_to_ranking(model, brand)))
    }

    /// 插入或更新 (geo, brand) 排名；位置被其它品牌占用时返回 Conflict
    pub async fn upsert_ranking(&self, geo_id: i32, input: &RankingInput) -> Result<Ranking> {
        use sea_orm::ActiveValue::*;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| db_err("Failed to start transaction", e))?;

        ensure_position_free(&txn, geo_id, input).await?;

        let existing = ranking::Entity::find()
            .filter(ranking::Column::GeoId.eq(geo_id))
            .filter(ranking::Column::BrandId.eq(input.brand_id))
            .one(&txn)
            .await
            .map_err(|e| db_err("Failed to look up ranking", e))?;

        let model = match existing {
            Some(current) => ranking::ActiveModel {
                id: Unchanged(current.id),
                position: Set(input.position),
                affiliate_link: Set(input.affiliate_link.clone()),
                updated_at: Set(Utc::now()),
                ..Default::default()
            }
            .update(&txn)
            .await
            .map_err(|e| db_err("Failed to update ranking", e))?,
            None => ranking::ActiveModel {
                id: NotSet,
                geo_id: Set(geo_id),
                brand_id: Set(input.brand_id),
                position: Set(input.position),
                affiliate_link: Set(input.affiliate_link.clone()),
                updated_at: Set(Utc::now()),
            }
            .insert(&txn)
            .await
            .map_err(|e| db_err("Failed to insert ranking", e))?,
        };

        txn.commit()
            .await
            .map_err(|e| db_err("Failed to commit ranking", e))?;

        let brand = brand::Entity::find_by_id(model.brand_id)
            .one(&self.db)
            .await
            .map_err(|e| db_err("Failed to load brand", e))?;
        Ok(model_to_ranking(model, brand))
    }

    /// 在单个事务内删除 GEO 的全部排名并写入新集合，失败时原排名保持不变
    pub async fn replace_rankings(&self, geo_id: i32, inputs: &[RankingInput]) -> Result<()> {
        use sea_orm::ActiveValue::*;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| db_err("Failed to start transaction", e))?;

        let deleted = ranking::Entity::delete_many()
            .filter(ranking::Column::GeoId.eq(geo_id))
            .exec(&txn)
            .await
            .map_err(|e| db_err("Failed to clear rankings", e))?;

        if !inputs.is_empty() {
            let now = Utc::now();
            let models = inputs.iter().map(|input| ranking::ActiveModel {
                id: NotSet,
                geo_id: Set(geo_id),
                brand_id: Set(input.brand_id),
                position: Set(input.position),
                affiliate_link: Set(input.affiliate_link.clone()),
                updated_at: Set(now),
            });

            ranking::Entity::insert_many(models)
                .exec(&txn)
                .await
                .map_err(|e| db_err("Failed to insert rankings", e))?;
        }

        txn.commit()
            .await
            .map_err(|e| db_err("Failed to commit rankings", e))?;

        info!(
            "Rankings replaced for GEO {}: {} removed, {} inserted",
            geo_id,
            deleted.rows_affected,
            inputs.len()
        );
        Ok(())
    }

    pub async fn delete_ranking(&self, geo_id: i32, id: i32) -> Result<bool> {
        let result = ranking::Entity::delete_many()
            .filter(ranking::Column::Id.eq(id))
            .filter(ranking::Column::GeoId.eq(geo_id))
            .exec(&self.db)
            .await
            .map_err(|e| db_err("Failed to delete ranking", e))?;
        Ok(result.rows_affected > 0)
    }
}

async fn ensure_position_free(
    txn: &DatabaseTransaction,
    geo_id: i32,
    input: &RankingInput,
) -> Result<()> {
    let Some(position) = input.position else {
        return Ok(());
    };

    let holder = ranking::Entity::find()
        .filter(ranking::Column::GeoId.eq(geo_id))
        .filter(ranking::Column::Position.eq(position))
        .one(txn)
        .await
        .map_err(|e| db_err("Failed to check ranking position", e))?;

    if let Some(holder) = holder
        && holder.brand_id != input.brand_id
    {
        return Err(TrackdeskError::conflict(format!(
            "Position {} in GEO {} is already held by brand {}",
            position, geo_id, holder.brand_id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranking(id: i32, name: &str, position: Option<i32>) -> Ranking {
        Ranking {
            id,
            geo_id: 1,
            brand_id: id,
            brand_name: name.to_string(),
            brand_default_url: None,
            position,
            affiliate_link: None,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_sort_featured_then_other_by_name() {
        let mut rows = vec![
            ranking(1, "zeta", None),
            ranking(2, "Beta", Some(3)),
            ranking(3, "alpha", None),
            ranking(4, "Gamma", Some(1)),
        ];
        sort_rankings(&mut rows);
        let order: Vec<i32> = rows.iter().map(|r| r.id).collect();
        assert_eq!(order, vec![4, 2, 3, 1]);
    }
}
