use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::sea_query::OnConflict;

use crate::storage::ShortLink;
use migration::entities::short_link;

pub fn model_to_shortlink(model: short_link::Model) -> ShortLink {
    ShortLink {
        short_id: model.short_id,
        original_url: model.original_url,
        owner_id: model.user_id,
        deleted: model.is_deleted,
    }
}

/// 新记录的 ActiveModel，`id` 由数据库生成
pub fn new_active_model(owner_id: &str, short_id: &str, url: &str) -> short_link::ActiveModel {
    short_link::ActiveModel {
        id: NotSet,
        short_id: Set(short_id.to_string()),
        original_url: Set(url.to_string()),
        user_id: Set(owner_id.to_string()),
        is_deleted: Set(false),
    }
}

/// 批量插入时遇到任意唯一约束冲突都跳过该行
pub fn skip_on_conflict() -> OnConflict {
    OnConflict::new().do_nothing().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_to_shortlink_maps_columns() {
        let model = short_link::Model {
            id: 7,
            short_id: "Ab3dE6gH".to_string(),
            original_url: "https://example.com/a".to_string(),
            user_id: "u1".to_string(),
            is_deleted: true,
        };

        let link = model_to_shortlink(model);
        assert_eq!(link.short_id, "Ab3dE6gH");
        assert_eq!(link.original_url, "https://example.com/a");
        assert_eq!(link.owner_id, "u1");
        assert!(link.deleted);
    }

    #[test]
    fn test_new_active_model_leaves_id_unset() {
        let model = new_active_model("", "Ab3dE6gH", "https://example.com/a");
        assert!(matches!(model.id, NotSet));
        assert_eq!(model.user_id, Set(String::new()));
        assert_eq!(model.is_deleted, Set(false));
    }
}
