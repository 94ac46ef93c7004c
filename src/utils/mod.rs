//! 공통 유틸리티 함수 모듈
//!
//! # Modules
//!
//! - [`string_utils`] - 선택적 문자열 정리, 리다이렉트 URL 쿼리 조립
//!
//! # Examples
//!
//! ```rust,ignore
//! use crate::utils::string_utils::append_query;
//!
//! let url = append_query("https://astralapp.io/done", "code", "tiger otter");
//! ```

pub mod string_utils;
