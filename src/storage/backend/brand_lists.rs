//! Brand-list queries and mutations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};

use super::converters::model_to_brand_list;
use super::{SeaOrmStorage, db_err};
use crate::errors::{Result, TrackdeskError};
use crate::storage::models::BrandList;

use migration::entities::brand_list;

impl SeaOrmStorage {
    pub async fn list_brand_lists(&self, geo_id: i32) -> Result<Vec<BrandList>> {
        let models = brand_list::Entity::find()
            .filter(brand_list::Column::GeoId.eq(geo_id))
            .order_by_asc(brand_list::Column::SortOrder)
            .order_by_asc(brand_list::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| db_err("Failed to list brand lists", e))?;

        Ok(models.into_iter().map(model_to_brand_list).collect())
    }

    pub async fn get_brand_list(&self, id: i32) -> Result<Option<BrandList>> {
        let model = brand_list::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| db_err("Failed to load brand list", e))?;

        Ok(model.map(model_to_brand_list))
    }

    pub async fn insert_brand_list(
        &self,
        geo_id: i32,
        name: &str,
        sort_order: i32,
    ) -> Result<BrandList> {
        use sea_orm::ActiveValue::*;

        let model = brand_list::ActiveModel {
            id: NotSet,
            geo_id: Set(geo_id),
            name: Set(name.to_string()),
            sort_order: Set(sort_order),
        }
        .insert(&self.db)
        .await
        .map_err(|e| db_err("Failed to create brand list", e))?;

        Ok(model_to_brand_list(model))
    }

    pub async fn rename_brand_list(&self, id: i32, name: &str) -> Result<BrandList> {
        use sea_orm::ActiveValue::*;

        let model = brand_list::ActiveModel {
            id: Unchanged(id),
            name: Set(name.to_string()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(|e| match e {
            sea_orm::DbErr::RecordNotUpdated => {
                TrackdeskError::not_found(format!("Brand list {} not found", id))
            }
            other => db_err("Failed to rename brand list", other),
        })?;

        Ok(model_to_brand_list(model))
    }

    pub async fn delete_brand_list(&self, id: i32) -> Result<bool> {
        let result = brand_list::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| db_err("Failed to delete brand list", e))?;
        Ok(result.rows_affected > 0)
    }

    /// 仅重排属于 `geo_id` 的列表；出现其它 GEO 的 id 视为不存在
    pub async fn reorder_brand_lists(&self, geo_id: i32, ids: &[i32]) -> Result<()> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| db_err("Failed to start transaction", e))?;

        for (index, id) in ids.iter().enumerate() {
            let result = brand_list::Entity::update_many()
                .col_expr(
                    brand_list::Column::SortOrder,
                    sea_orm::sea_query::Expr::value(index as i32),
                )
                .filter(brand_list::Column::Id.eq(*id))
                .filter(brand_list::Column::GeoId.eq(geo_id))
                .exec(&txn)
                .await
                .map_err(|e| db_err("Failed to reorder brand lists", e))?;

            if result.rows_affected == 0 {
                return Err(TrackdeskError::not_found(format!(
                    "Brand list {} not found in GEO {}",
                    id, geo_id
                )));
            }
        }

        txn.commit()
            .await
            .map_err(|e| db_err("Failed to commit brand list order", e))?;
        Ok(())
    }
}
