use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const STATUSES: [&str; 4] = ["online", "idle", "dnd", "invisible"];

/// 봇 상태 메시지 한 줄
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotActivity {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
}

/// 봇 런타임 설정
///
/// 필드 이름은 봇 런타임이 읽는 camelCase 그대로 저장됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default = "default_activities")]
    pub activities: Vec<BotActivity>,
    #[serde(default)]
    pub randomize_activities: bool,
    /// 상태 메시지 교체 주기 (초)
    #[serde(default = "default_activity_interval")]
    pub activity_interval: u32,
    #[serde(default)]
    pub current_activity: u32,
    #[serde(default)]
    pub modules: Map<String, Value>,
}

fn default_status() -> String {
    "online".to_string()
}

fn default_activities() -> Vec<BotActivity> {
    vec![BotActivity { kind: "PLAYING".to_string(), name: "a game!".to_string() }]
}

fn default_activity_interval() -> u32 {
    300
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            guild: None,
            prefix: None,
            status: default_status(),
            activities: default_activities(),
            randomize_activities: false,
            activity_interval: default_activity_interval(),
            current_activity: 0,
            modules: Map::new(),
        }
    }
}

impl BotSettings {
    /// 요청에 들어온 최상위 키만 덮어쓴 새 설정을 만듭니다.
    pub fn merged(&self, patch: &Map<String, Value>) -> Result<Self, String> {
        let mut current = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            Ok(_) => Map::new(),
            Err(e) => return Err(e.to_string()),
        };
        current.extend(patch.iter().map(|(k, v)| (k.clone(), v.clone())));

        let merged: BotSettings = serde_json::from_value(Value::Object(current))
            .map_err(|e| format!("Invalid bot settings: {}", e))?;

        if !STATUSES.contains(&merged.status.as_str()) {
            return Err(format!("Unknown bot status: {}", merged.status));
        }
        if merged.activity_interval == 0 {
            return Err("activityInterval must be positive".to_string());
        }
        Ok(merged)
    }
}

/// 워크스페이스마다 하나인 Discord 봇
///
/// `token`은 저장소에만 남고 API 응답에는 [`BotView`](crate::domain::dto::BotView)로 빠집니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bot {
    pub id: String,
    pub workspace: String,
    /// 봇을 등록한 사용자 ID
    pub owner: String,
    /// 토큰 검증 시 확인한 봇 계정의 Discord ID
    #[serde(default)]
    pub discord_id: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub settings: BotSettings,
    #[serde(default)]
    pub permissions: Value,
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Bot {
    pub fn new(
        workspace: impl Into<String>,
        owner: impl Into<String>,
        token: impl Into<String>,
        settings: BotSettings,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            workspace: workspace.into(),
            owner: owner.into(),
            discord_id: None,
            region: None,
            settings,
            permissions: Value::Object(Map::new()),
            token: token.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// 봇 런타임이 주기적으로 기록하는 사용량 스냅샷
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotAnalytics {
    pub bot: String,
    #[serde(default)]
    pub commands: i64,
    #[serde(default)]
    pub members: i64,
    #[serde(default)]
    pub messages: i64,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use super::*;

    fn patch(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_settings_defaults() {
        let settings: BotSettings = serde_json::from_value(json!({})).unwrap();

        assert_eq!(settings, BotSettings::default());
        assert_eq!(settings.activity_interval, 300);
        assert_eq!(settings.activities[0].kind, "PLAYING");
    }

    #[test]
    fn test_merge_overrides_only_given_keys() {
        let current = BotSettings { prefix: Some("!".into()), ..Default::default() };

        let merged = current.merged(&patch(json!({ "status": "dnd", "randomizeActivities": true }))).unwrap();

        assert_eq!(merged.prefix.as_deref(), Some("!"));
        assert_eq!(merged.status, "dnd");
        assert!(merged.randomize_activities);
        assert_eq!(merged.activities, current.activities);
    }

    #[test]
    fn test_merge_rejects_bad_values() {
        let current = BotSettings::default();

        assert!(current.merged(&patch(json!({ "status": "sleeping" }))).is_err());
        assert!(current.merged(&patch(json!({ "activityInterval": 0 }))).is_err());
        assert!(current.merged(&patch(json!({ "activities": "PLAYING" }))).is_err());
    }

    #[test]
    fn test_settings_use_camel_case() {
        let value = serde_json::to_value(BotSettings::default()).unwrap();

        assert_eq!(value["activityInterval"], 300);
        assert_eq!(value["activities"][0]["type"], "PLAYING");
        assert!(value.get("guild").is_none());
    }
}
