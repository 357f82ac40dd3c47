//! roadlog 공통 크레이트
//!
//! 시뮬레이션 로그 상관 분석(correlator)과 경로 검증기(path-validator),
//! CLI가 공유하는 에러 타입, 설정, 도메인 타입을 제공합니다.
//!
//! # 모듈 구성
//!
//! - [`config`]: `roadlog.toml` 파싱 및 환경변수 오버라이드
//! - [`error`]: 최상위 에러 타입 [`RoadlogError`]
//! - [`types`]: [`EntityRecord`], [`SchemaDescriptor`], [`RunGroupKey`]
//! - [`metrics`]: 메트릭 이름 상수

pub mod config;
pub mod error;
pub mod metrics;
pub mod types;

// --- 주요 타입 re-export ---
// 각 모듈의 핵심 타입을 크레이트 루트에서 바로 사용할 수 있도록 합니다.

// 에러
pub use error::{ConfigError, ParseError, RoadlogError, StreamError};

// 설정
pub use config::{CorrelatorSection, DuplicatePathPolicy, GeneralConfig, RoadlogConfig, ValidatorConfig};

// 도메인 타입
pub use types::{EntityRecord, RunGroupKey, SchemaDescriptor};
