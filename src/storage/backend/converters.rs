use sea_orm::ActiveValue::{NotSet, Set};

use crate::storage::SessionRecord;
use migration::entities::session;

/// 将 Sea-ORM Model 转换为 SessionRecord
pub fn model_to_record(model: session::Model) -> SessionRecord {
    SessionRecord {
        id: model.id,
        user_id: model.user_id,
        ip_address: model.ip_address,
        user_agent: model.user_agent,
        payload: model.payload,
        last_activity: model.last_activity,
    }
}

/// 将 SessionRecord 转换为 ActiveModel（用于元数据 upsert）
///
/// payload 属于宿主应用，这里不写入。
pub fn record_to_active_model(record: &SessionRecord) -> session::ActiveModel {
    session::ActiveModel {
        id: Set(record.id.clone()),
        user_id: Set(record.user_id.clone()),
        ip_address: Set(record.ip_address.clone()),
        user_agent: Set(record.user_agent.clone()),
        payload: match record.payload {
            Some(ref payload) => Set(Some(payload.clone())),
            None => NotSet,
        },
        last_activity: Set(record.last_activity),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ActiveValue;

    fn create_test_model() -> session::Model {
        session::Model {
            id: "sess-1".to_string(),
            user_id: Some("42".to_string()),
            ip_address: Some("203.0.113.9".to_string()),
            user_agent: Some("Mozilla/5.0".to_string()),
            payload: Some("a:0:{}".to_string()),
            last_activity: 1_700_000_000,
        }
    }

    #[test]
    fn test_model_to_record() {
        let record = model_to_record(create_test_model());
        assert_eq!(record.id, "sess-1");
        assert_eq!(record.user_id.as_deref(), Some("42"));
        assert_eq!(record.payload.as_deref(), Some("a:0:{}"));
        assert_eq!(record.last_activity, 1_700_000_000);
    }

    #[test]
    fn test_touch_record_leaves_payload_unset() {
        let record = SessionRecord::touch("sess-1", "42", None, Some("UA".into()), 10);
        let model = record_to_active_model(&record);

        assert!(matches!(model.payload, ActiveValue::NotSet));
        assert!(matches!(model.ip_address, ActiveValue::Set(None)));
        assert!(matches!(model.last_activity, ActiveValue::Set(10)));
    }
}
