//! Brand queries and mutations.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use tracing::info;

use super::converters::model_to_brand;
use super::{SeaOrmStorage, db_err};
use crate::errors::{Result, TrackdeskError};
use crate::storage::models::{Brand, BrandStatus};

use migration::entities::brand;

impl SeaOrmStorage {
    pub async fn list_brands(&self, status: Option<BrandStatus>) -> Result<Vec<Brand>> {
        let mut query = brand::Entity::find();
        if let Some(status) = status {
            query = query.filter(brand::Column::Status.eq(status.as_ref()));
        }

        let models = query
            .order_by_asc(brand::Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| db_err("Failed to list brands", e))?;

        Ok(models.into_iter().map(model_to_brand).collect())
    }

    pub async fn get_brand(&self, id: i32) -> Result<Option<Brand>> {
        let model = brand::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| db_err("Failed to load brand", e))?;

        Ok(model.map(model_to_brand))
    }

    pub async fn find_brand_by_name(&self, name: &str) -> Result<Option<Brand>> {
        let model = brand::Entity::find()
            .filter(brand::Column::Name.eq(name))
            .one(&self.db)
            .await
            .map_err(|e| db_err("Failed to look up brand", e))?;

        Ok(model.map(model_to_brand))
    }

    pub async fn insert_brand(
        &self,
        name: &str,
        default_url: Option<String>,
        status: BrandStatus,
    ) -> Result<Brand> {
        use sea_orm::ActiveValue::*;

        let model = brand::ActiveModel {
            id: NotSet,
            name: Set(name.to_string()),
            default_url: Set(default_url),
            status: Set(status.as_ref().to_string()),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await
        .map_err(|e| db_err(&format!("Failed to create brand '{}'", name), e))?;

        info!("Brand created: {} (id={})", model.name, model.id);
        Ok(model_to_brand(model))
    }

    pub async fn update_brand(&self, brand: &Brand) -> Result<Brand> {
        use sea_orm::ActiveValue::*;

        let model = brand::ActiveModel {
            id: Unchanged(brand.id),
            name: Set(brand.name.clone()),
            default_url: Set(brand.default_url.clone()),
            status: Set(brand.status.as_ref().to_string()),
            created_at: NotSet,
        }
        .update(&self.db)
        .await
        .map_err(|e| match e {
            sea_orm::DbErr::RecordNotUpdated => {
                TrackdeskError::not_found(format!("Brand {} not found", brand.id))
            }
            other => db_err("Failed to update brand", other),
        })?;

        Ok(model_to_brand(model))
    }

    /// 删除品牌，其所有 GEO 排名级联删除
    pub async fn delete_brand(&self, id: i32) -> Result<bool> {
        let result = brand::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| db_err("Failed to delete brand", e))?;

        if result.rows_affected > 0 {
            info!("Brand deleted: id={}", id);
        }
        Ok(result.rows_affected > 0)
    }
}
