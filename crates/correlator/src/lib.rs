#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`classifier`]: 마커 토큰 기반 로그 라인 분류 (PATH, MOVE, STOP, TICK, INVALID)
//! - [`identity`]: 실행 인스턴스 접두어를 붙인 복합 id 생성
//! - [`cursor`]: 틱 라인 기반 시뮬레이션 시계
//! - [`store`]: 복합 id -> 엔티티 레코드 저장소 (중복 PATH 정책)
//! - [`enricher`]: 시뮬레이션 설정 문서(XML) 기반 전략 보강
//! - [`emitter`]: 고정 스키마 구분자 테이블 출력
//! - [`discovery`]: 데이터 디렉토리 파일 쌍 탐색 및 실행 그룹 구성
//! - [`engine`]: 실행 그룹 하나의 동기 처리 (`RunGroupContext`)
//! - [`correlator`]: 비동기 오케스트레이터 (병렬 처리, 커밋)
//! - [`config`]: 엔진 설정 (core 설정 확장)
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! *.log --> LineClassifier --> IdentityResolver --> EntityRecordStore <-- MetadataEnricher <-- *.xml
//!                 |                                        |
//!            TimeCursor                              TableEmitter --> *.csv
//! ```

pub mod classifier;
pub mod config;
pub mod correlator;
pub mod cursor;
pub mod discovery;
pub mod emitter;
pub mod engine;
pub mod enricher;
pub mod error;
pub mod identity;
pub mod store;

// --- 주요 타입 re-export ---

// 오케스트레이터
pub use correlator::{Correlator, GroupFailure, GroupSummary, RunReport};

// 설정
pub use config::{CorrelatorConfig, CorrelatorConfigBuilder};

// 에러
pub use error::CorrelatorError;

// 처리 단계
pub use classifier::{EventKind, LineClassifier, LineEvent};
pub use cursor::TimeCursor;
pub use discovery::{FilePair, RunGroup, discover_run_groups};
pub use emitter::{TableBuffer, TableEmitter};
pub use engine::{GroupOutcome, RunGroupContext, process_run_group};
pub use enricher::{ConfigDocument, EnrichStats, MetadataEnricher};
pub use identity::IdentityResolver;
pub use store::{EntityRecordStore, PathOutcome};
