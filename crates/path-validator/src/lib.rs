#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`validator`]: 경로 검사 규칙과 파일 스캔 (`PathValidator`, `Violation`, `ScanReport`)
//! - [`error`]: 도메인 에러 타입
//!
//! 상관 분석 엔진과 독립적으로 PATH 라인의 원시 텍스트만 사용합니다.

pub mod error;
pub mod validator;

// --- 주요 타입 re-export ---

pub use error::PathValidatorError;
pub use validator::{LineCheck, PathValidator, ScanReport, Violation};
