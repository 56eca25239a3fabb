use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::errors::Result;
use crate::storage::{Logger, Owner, Visitor};
use migration::entities::{logger, user, visitor};

/// 将 Sea-ORM Model 转换为 Logger（visitors 另行加载）
pub fn model_to_logger(model: logger::Model, visitors: Vec<Visitor>) -> Logger {
    Logger {
        id: model.id,
        url: model.url,
        dashboard: model.dashboard_token,
        api_key: model.api_key,
        clicks: model.clicks.max(0) as u64,
        created_at: model.created_at,
        visitors,
    }
}

/// Fixed-length key behind the one-logger-per-url constraint.
pub fn url_hash(url: &str) -> String {
    hex::encode(Sha256::digest(url.as_bytes()))
}

/// 新建 Logger 的 ActiveModel（clicks 从 0 开始）
pub fn logger_to_active_model(logger: &Logger) -> logger::ActiveModel {
    use sea_orm::ActiveValue::Set;

    logger::ActiveModel {
        id: Set(logger.id.clone()),
        url: Set(logger.url.clone()),
        url_hash: Set(url_hash(&logger.url)),
        dashboard_token: Set(logger.dashboard.clone()),
        api_key: Set(logger.api_key.clone()),
        clicks: Set(logger.clicks as i64),
        created_at: Set(logger.created_at),
    }
}

/// A row whose `ips` column isn't a JSON array still yields a visitor; the raw
/// text is kept as the only entry.
pub fn model_to_visitor(model: visitor::Model) -> Visitor {
    let ips = match serde_json::from_str::<Vec<String>>(&model.ips) {
        Ok(ips) => ips,
        Err(e) => {
            warn!(
                "Visitor {} of logger {} has malformed ips column: {}",
                model.id, model.logger_id, e
            );
            vec![model.ips]
        }
    };

    Visitor {
        ips,
        clicked_at: model.clicked_at,
    }
}

pub fn visitor_to_active_model(logger_id: &str, visitor: &Visitor) -> Result<visitor::ActiveModel> {
    use sea_orm::ActiveValue::{NotSet, Set};

    Ok(visitor::ActiveModel {
        id: NotSet,
        logger_id: Set(logger_id.to_string()),
        ips: Set(serde_json::to_string(&visitor.ips)?),
        clicked_at: Set(visitor.clicked_at),
    })
}

pub fn model_to_owner(model: user::Model) -> Owner {
    Owner {
        email: model.email,
        api_key: model.api_key,
    }
}

pub fn owner_to_active_model(owner: &Owner) -> user::ActiveModel {
    use sea_orm::ActiveValue::Set;

    user::ActiveModel {
        email: Set(owner.email.clone()),
        api_key: Set(owner.api_key.clone()),
        created_at: Set(Utc::now()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ActiveValue;

    fn create_test_model() -> logger::Model {
        logger::Model {
            id: "abc1234".to_string(),
            url: "https://example.com".to_string(),
            url_hash: url_hash("https://example.com"),
            dashboard_token: "dash".to_string(),
            api_key: "key".to_string(),
            clicks: 42,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_model_to_logger_basic() {
        let model = create_test_model();
        let logger = model_to_logger(model, Vec::new());

        assert_eq!(logger.id, "abc1234");
        assert_eq!(logger.url, "https://example.com");
        assert_eq!(logger.dashboard, "dash");
        assert_eq!(logger.api_key, "key");
        assert_eq!(logger.clicks, 42);
        assert!(logger.visitors.is_empty());
    }

    #[test]
    fn test_model_to_logger_negative_clicks_clamped() {
        let mut model = create_test_model();
        model.clicks = -5;
        assert_eq!(model_to_logger(model, Vec::new()).clicks, 0);
    }

    #[test]
    fn test_url_hash_is_stable_and_distinct() {
        assert_eq!(url_hash("http://a.test"), url_hash("http://a.test"));
        assert_ne!(url_hash("http://a.test"), url_hash("http://a.test/"));
        assert_eq!(url_hash("http://a.test").len(), 64);
    }

    #[test]
    fn test_active_model_carries_url_hash() {
        let logger = Logger::new(
            "abc1234".to_string(),
            "http://a.test".to_string(),
            "dash".to_string(),
            "key".to_string(),
        );
        let ActiveValue::Set(hash) = logger_to_active_model(&logger).url_hash else {
            panic!("url_hash should be set");
        };
        assert_eq!(hash, url_hash("http://a.test"));
    }

    #[test]
    fn test_visitor_ips_round_trip_through_column() {
        let visitor = Visitor {
            ips: vec!["198.51.100.1".to_string(), "10.0.0.2".to_string()],
            clicked_at: Utc::now(),
        };
        let active = visitor_to_active_model("abc1234", &visitor).unwrap();

        let ActiveValue::Set(ips) = active.ips else {
            panic!("ips should be set");
        };
        assert_eq!(ips, r#"["198.51.100.1","10.0.0.2"]"#);
        assert!(matches!(active.id, ActiveValue::NotSet));

        let back = model_to_visitor(visitor::Model {
            id: 1,
            logger_id: "abc1234".to_string(),
            ips,
            clicked_at: visitor.clicked_at,
        });
        assert_eq!(back, visitor);
    }

    #[test]
    fn test_malformed_ips_column_is_preserved() {
        let back = model_to_visitor(visitor::Model {
            id: 7,
            logger_id: "abc1234".to_string(),
            ips: "203.0.113.9".to_string(),
            clicked_at: Utc::now(),
        });
        assert_eq!(back.ips, vec!["203.0.113.9".to_string()]);
    }
}
