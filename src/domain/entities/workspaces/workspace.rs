//! Workspace Entity Implementation
//!
//! 멤버와 역할, 요금제를 가지는 테넌트 단위 그룹입니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 워크스페이스 요금제
///
/// 저장소에는 정수(1=free, 2=starter, 3=pro)로 기록됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Plan {
    Free,
    Starter,
    Pro,
}

impl Plan {
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "free" => Ok(Plan::Free),
            "starter" => Ok(Plan::Starter),
            "pro" => Ok(Plan::Pro),
            _ => Err(format!("Unknown plan: {}", s)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Starter => "starter",
            Plan::Pro => "pro",
        }
    }

    pub fn is_paid(&self) -> bool {
        !matches!(self, Plan::Free)
    }
}

impl TryFrom<u8> for Plan {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Plan::Free),
            2 => Ok(Plan::Starter),
            3 => Ok(Plan::Pro),
            other => Err(format!("Unknown plan id: {}", other)),
        }
    }
}

impl From<Plan> for u8 {
    fn from(plan: Plan) -> Self {
        match plan {
            Plan::Free => 1,
            Plan::Starter => 2,
            Plan::Pro => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    #[default]
    Private,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSettings {
    #[serde(default)]
    pub is_paid_plan: bool,
    #[serde(default)]
    pub description: String,
    /// 결제 프로바이더 구독 ID (유료 요금제만)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    pub id: String,
    /// 소유자 프로필 ID
    pub owner: String,
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub settings: WorkspaceSettings,
    pub plan: Plan,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub pending: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Workspace {
    pub fn new(
        owner: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        visibility: Visibility,
        plan: Plan,
        subscription: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            owner: owner.into(),
            name: name.into(),
            logo: None,
            settings: WorkspaceSettings {
                is_paid_plan: plan.is_paid(),
                description: description.into(),
                subscription,
            },
            plan,
            visibility,
            pending: false,
            created_at: now,
            updated_at: now,
        }
    }
}
