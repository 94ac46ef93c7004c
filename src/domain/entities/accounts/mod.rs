//! 계정 단위 부가 레코드 (블랙리스트, 모더레이션 기록)
//!
//! GDPR 내보내기와 계정 삭제에서만 사용됩니다.

pub mod records;

pub use records::*;
