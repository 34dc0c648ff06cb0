use std::str::FromStr;

use tracing::warn;

use crate::storage::models::{
    Brand, BrandList, BrandStatus, Geo, NewSubId, Ranking, SubId, Website,
};
use migration::entities::{brand, brand_list, geo, geo_brand_ranking, sub_id, website};

pub fn model_to_website(model: website::Model) -> Website {
    Website {
        id: model.id,
        name: model.name,
        format_pattern: model.format_pattern,
        created_at: model.created_at,
    }
}

pub fn model_to_sub_id(model: sub_id::Model) -> SubId {
    SubId {
        id: model.id,
        website_id: model.website_id,
        value: model.value,
        url: model.url,
        task_id: model.task_id,
        comment_posted: model.comment_posted,
        is_immutable: model.is_immutable,
        created_at: model.created_at,
    }
}

/// 新建 Sub-ID 的 ActiveModel（id 由数据库生成）
pub fn new_sub_id_to_active_model(
    new: &NewSubId,
    created_at: chrono::DateTime<chrono::Utc>,
) -> sub_id::ActiveModel {
    use sea_orm::ActiveValue::*;

    sub_id::ActiveModel {
        id: NotSet,
        website_id: Set(new.website_id),
        value: Set(new.value.clone()),
        url: Set(new.url.clone()),
        task_id: Set(new.task_id.clone()),
        comment_posted: Set(new.comment_posted),
        is_immutable: Set(new.is_immutable),
        created_at: Set(created_at),
    }
}

/// 已有 Sub-ID 的 ActiveModel：website 与创建时间不可变更
pub fn sub_id_to_active_model(record: &SubId) -> sub_id::ActiveModel {
    use sea_orm::ActiveValue::*;

    sub_id::ActiveModel {
        id: Unchanged(record.id),
        website_id: NotSet,
        value: Set(record.value.clone()),
        url: Set(record.url.clone()),
        task_id: Set(record.task_id.clone()),
        comment_posted: Set(record.comment_posted),
        is_immutable: Set(record.is_immutable),
        created_at: NotSet,
    }
}

pub fn model_to_geo(model: geo::Model) -> Geo {
    Geo {
        id: model.id,
        code: model.code,
        name: model.name,
        sort_order: model.sort_order,
    }
}

pub fn model_to_brand(model: brand::Model) -> Brand {
    let status = BrandStatus::from_str(&model.status).unwrap_or_else(|_| {
        warn!(
            "Brand {} has unknown status '{}', treating as active",
            model.id, model.status
        );
        BrandStatus::Active
    });

    Brand {
        id: model.id,
        name: model.name,
        default_url: model.default_url,
        status,
        created_at: model.created_at,
    }
}

pub fn model_to_brand_list(model: brand_list::Model) -> BrandList {
    BrandList {
        id: model.id,
        geo_id: model.geo_id,
        name: model.name,
        sort_order: model.sort_order,
    }
}

/// 排名记录与其品牌合并；品牌缺失时名称为空
pub fn model_to_ranking(model: geo_brand_ranking::Model, brand: Option<brand::Model>) -> Ranking {
    let (brand_name, brand_default_url) = match brand {
        Some(b) => (b.name, b.default_url),
        None => (String::new(), None),
    };

    Ranking {
        id: model.id,
        geo_id: model.geo_id,
        brand_id: model.brand_id,
        brand_name,
        brand_default_url,
        position: model.position,
        affiliate_link: model.affiliate_link,
        updated_at: model.updated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::ActiveValue;

    fn sub_id_model() -> sub_id::Model {
        sub_id::Model {
            id: 7,
            website_id: 3,
            value: "SID-42".to_string(),
            url: Some("https://site.example.com/?sub=SID-42".to_string()),
            task_id: Some("86abc123".to_string()),
            comment_posted: true,
            is_immutable: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_model_to_sub_id() {
        let model = sub_id_model();
        let record = model_to_sub_id(model.clone());
        assert_eq!(record.id, 7);
        assert_eq!(record.website_id, 3);
        assert_eq!(record.value, "SID-42");
        assert_eq!(record.task_id.as_deref(), Some("86abc123"));
        assert!(record.is_immutable);
        assert_eq!(record.created_at, model.created_at);
    }

    #[test]
    fn test_sub_id_update_model_keeps_owner_and_timestamp() {
        let record = model_to_sub_id(sub_id_model());
        let active = sub_id_to_active_model(&record);
        assert_eq!(active.id, ActiveValue::Unchanged(7));
        assert_eq!(active.website_id, ActiveValue::NotSet);
        assert_eq!(active.created_at, ActiveValue::NotSet);
        assert_eq!(active.comment_posted, ActiveValue::Set(true));
    }

    #[test]
    fn test_new_sub_id_active_model() {
        let now = Utc::now();
        let active = new_sub_id_to_active_model(
            &NewSubId {
                website_id: 1,
                value: "A1".into(),
                ..Default::default()
            },
            now,
        );
        assert_eq!(active.id, ActiveValue::NotSet);
        assert_eq!(active.url, ActiveValue::Set(None));
        assert_eq!(active.created_at, ActiveValue::Set(now));
    }

    #[test]
    fn test_unknown_brand_status_defaults_to_active() {
        let brand = model_to_brand(brand::Model {
            id: 1,
            name: "Brand X".into(),
            default_url: None,
            status: "archived".into(),
            created_at: Utc::now(),
        });
        assert_eq!(brand.status, BrandStatus::Active);
    }
}
