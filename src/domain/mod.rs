//! # Domain Layer Module
//!
//! 도메인 계층을 구성하는 핵심 모듈로, 저장되는 엔티티와 요청 처리 중에만
//! 존재하는 모델, HTTP 경계의 DTO를 담당합니다.
//!
//! ## 아키텍처 개요
//!
//! ```text
//! Domain Layer (이 모듈)
//! ├── Entities      - 저장소 컬렉션과 대응되는 영속 객체
//! ├── DTOs          - 데이터 전송 객체 (Request/Response)
//! └── Models        - 세션 토큰, 인증 컨텍스트, 외부 API 형태
//!      │
//!      ▼
//! Application Layer (Services)
//!      │
//!      ▼
//! Infrastructure Layer (Repositories, DB, Clients)
//! ```
//!
//! ## 모듈 구성
//!
//! ### [`entities`] - 영속 엔티티
//!
//! - `LinkedProvider`: 사용자와 외부 아이덴티티 하나의 연결 (`providers` 컬렉션)
//! - `Profile`: 앵커 프로바이더(Discord)로부터 만들어지는 사용자 프로필
//! - `Workspace`, `WorkspaceMember`: 워크스페이스와 멤버십
//!
//! ### [`dto`] - 데이터 전송 객체
//!
//! 모든 JSON 응답은 [`dto::ApiResponse`] 봉투(`result`, `error`, `code`)로 감쌉니다.
//! 요청 DTO는 `validator`로 검증하고, 쿼리/폼 파라미터는 공백을 `None`으로 정리합니다.
//!
//! ### [`models`] - 비영속 모델
//!
//! - `ProviderIdentity`: 프로바이더 인증 결과를 정규화한 값
//! - `SessionClaims`: 세션 토큰에 담기는 클레임
//! - `AuthenticatedUser`, `AuthContext`: 미들웨어가 요청마다 채우는 인증 정보
//!
//! ## 설계 원칙
//!
//! 프로바이더별 부가 데이터는 자유 형식 맵이 아닌 `ProviderData` 열거형으로 다룹니다.
//! 저장 형식(`provider_data` 문서)과의 변환은 엔티티 경계에서 한 번만 일어납니다.

pub mod entities;
pub mod dto;
pub mod models;
