//! Database Connection Management Module
//!
//! MongoDB 데이터베이스 연결 관리를 담당하는 모듈입니다.
//! 연결 설정은 [`DatabaseConfig`]로 전달받으며, 환경 변수를 직접 읽지 않습니다.
//!
//! # 기본 사용법
//!
//! ```rust,ignore
//! use crate::db::Database;
//!
//! let database = Database::connect(&config.database).await?;
//! let providers = MongoProviderRepository::new(&database);
//! providers.create_indexes().await?;
//! ```

use std::time::Duration;
use mongodb::{Client, Collection, options::ClientOptions};
use log::info;
use crate::config::DatabaseConfig;

/// 컬렉션 이름
pub mod collections {
    pub const PROVIDERS: &str = "providers";
    pub const PROFILES: &str = "profiles";
    pub const BLACKLIST: &str = "blacklist";
    pub const MODERATION_ACTIONS: &str = "moderation_actions";
    pub const BOTS: &str = "bots";
    pub const BOT_ANALYTICS: &str = "bot_analytics";
    pub const WORKSPACES: &str = "workspaces";
    pub const WORKSPACE_MEMBERS: &str = "workspace_members";
    pub const WORKSPACE_INTEGRATIONS: &str = "workspace_integrations";
}

/// MongoDB 데이터베이스 연결 래퍼
///
/// MongoDB 클라이언트와 데이터베이스 연결을 관리하며,
/// 리포지토리 계층에서 컬렉션에 접근하기 위한 기본 인터페이스를 제공합니다.
#[derive(Clone)]
pub struct Database {
    client: Client,
    database_name: String,
}

impl Database {
    /// 새 MongoDB 데이터베이스 연결을 생성합니다.
    ///
    /// 연결 타임아웃과 서버 선택 타임아웃을 설정하여, 저장소가 응답하지 않을 때
    /// 요청이 무기한 대기하지 않도록 합니다. 생성 시 `ping`으로 연결을 검증합니다.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, mongodb::error::Error> {
        let mut client_options = ClientOptions::parse(&config.uri).await?;

        let timeout = Duration::from_secs(config.timeout_secs);
        client_options.app_name = Some("identity_link".to_string());
        client_options.connect_timeout = Some(timeout);
        client_options.server_selection_timeout = Some(timeout);

        let client = Client::with_options(client_options)?;

        client
            .database(&config.database_name)
            .run_command(mongodb::bson::doc! { "ping": 1 })
            .await?;

        info!("✅ MongoDB 연결 성공: {}", config.database_name);

        Ok(Self {
            client,
            database_name: config.database_name.clone(),
        })
    }

    /// MongoDB 데이터베이스 인스턴스를 반환합니다.
    pub fn get_database(&self) -> mongodb::Database {
        self.client.database(&self.database_name)
    }

    /// 타입이 지정된 컬렉션 핸들을 반환합니다.
    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.get_database().collection::<T>(name)
    }
}
