//! 워크스페이스 응답 DTO

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use crate::domain::entities::bots::{Bot, BotSettings};

/// 토큰을 뺀 봇 정보
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BotView {
    pub id: String,
    pub workspace: String,
    pub owner: String,
    pub discord_id: Option<String>,
    pub region: Option<String>,
    pub settings: BotSettings,
    pub permissions: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Bot> for BotView {
    fn from(bot: Bot) -> Self {
        Self {
            id: bot.id,
            workspace: bot.workspace,
            owner: bot.owner,
            discord_id: bot.discord_id,
            region: bot.region,
            settings: bot.settings,
            permissions: bot.permissions,
            created_at: bot.created_at,
            updated_at: bot.updated_at,
        }
    }
}
