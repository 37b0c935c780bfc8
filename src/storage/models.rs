use serde::{Deserialize, Serialize};

/// `sessions` 表中的一行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub user_id: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    /// 宿主应用的会话数据，元数据写入不会改动
    #[serde(default)]
    pub payload: Option<String>,
    /// 最后活动时间（unix 秒）
    pub last_activity: i64,
}

impl SessionRecord {
    /// 元数据写入使用的记录（不带 payload）
    pub fn touch(
        id: impl Into<String>,
        user_id: impl Into<String>,
        ip_address: Option<String>,
        user_agent: Option<String>,
        last_activity: i64,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: Some(user_id.into()),
            ip_address,
            user_agent,
            payload: None,
            last_activity,
        }
    }
}
