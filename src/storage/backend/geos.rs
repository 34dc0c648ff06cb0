//! GEO queries and mutations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use tracing::info;

use super::converters::model_to_geo;
use super::{SeaOrmStorage, db_err};
use crate::errors::{Result, TrackdeskError};
use crate::storage::models::Geo;

use migration::entities::geo;

impl SeaOrmStorage {
    /// 按 sort_order、code 排序
    pub async fn list_geos(&self) -> Result<Vec<Geo>> {
        let db = &self.db;
        let models = self
            .retry
            .run("list_geos", || async {
                geo::Entity::find()
                    .order_by_asc(geo::Column::SortOrder)
                    .order_by_asc(geo::Column::Code)
                    .all(db)
                    .await
            })
            .await
            .map_err(|e| db_err("Failed to list GEOs", e))?;

        Ok(models.into_iter().map(model_to_geo).collect())
    }

    pub async fn get_geo(&self, id: i32) -> Result<Option<Geo>> {
        let model = geo::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| db_err("Failed to load GEO", e))?;

        Ok(model.map(model_to_geo))
    }

    pub async fn find_geo_by_code(&self, code: &str) -> Result<Option<Geo>> {
        let model = geo::Entity::find()
            .filter(geo::Column::Code.eq(code))
            .one(&self.db)
            .await
            .map_err(|e| db_err("Failed to look up GEO", e))?;

        Ok(model.map(model_to_geo))
    }

    pub async fn insert_geo(&self, code: &str, name: &str, sort_order: i32) -> Result<Geo> {
        use sea_orm::ActiveValue::*;

        let model = geo::ActiveModel {
            id: NotSet,
            code: Set(code.to_string()),
            name: Set(name.to_string()),
            sort_order: Set(sort_order),
        }
        .insert(&self.db)
        .await
        .map_err(|e| db_err(&format!("Failed to create GEO '{}'", code), e))?;

        info!("GEO created: {} (id={})", model.code, model.id);
        Ok(model_to_geo(model))
    }

    pub async fn update_geo(&self, geo: &Geo) -> Result<Geo> {
        use sea_orm::ActiveValue::*;

        let model = geo::ActiveModel {
            id: Unchanged(geo.id),
            code: Set(geo.code.clone()),
            name: Set(geo.name.clone()),
            sort_order: Set(geo.sort_order),
        }
        .update(&self.db)
        .await
        .map_err(|e| match e {
            sea_orm::DbErr::RecordNotUpdated => {
                TrackdeskError::not_found(format!("GEO {} not found", geo.id))
            }
            other => db_err("Failed to update GEO", other),
        })?;

        Ok(model_to_geo(model))
    }

    /// 删除 GEO，排名与品牌列表级联删除
    pub async fn delete_geo(&self, id: i32) -> Result<bool> {
        let result = geo::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| db_err("Failed to delete GEO", e))?;

        if result.rows_affected > 0 {
            info!("GEO deleted: id={}", id);
        }
        Ok(result.rows_affected > 0)
    }

    /// `ids[i]` 的 sort_order 设为 `i`，任一 id 不存在则整体回滚
    pub async fn reorder_geos(&self, ids: &[i32]) -> Result<()> {
        use sea_orm::ActiveValue::*;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| db_err("Failed to start transaction", e))?;

        for (index, id) in ids.iter().enumerate() {
            geo::ActiveModel {
                id: Unchanged(*id),
                sort_order: Set(index as i32),
                ..Default::default()
            }
            .update(&txn)
            .await
            .map_err(|e| match e {
                sea_orm::DbErr::RecordNotUpdated => {
                    TrackdeskError::not_found(format!("GEO {} not found", id))
                }
                other => db_err("Failed to reorder GEOs", other),
            })?;
        }

        txn.commit()
            .await
            .map_err(|e| db_err("Failed to commit GEO order", e))?;

        info!("Reordered {} GEOs", ids.len());
        Ok(())
    }
}
