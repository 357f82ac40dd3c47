//! 설정 관리: roadlog.toml 파싱 및 런타임 설정
//!
//! [`RoadlogConfig`]는 모든 모듈의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`ROADLOG_VALIDATOR_ROW_WIDTH=84` 형식)
//! 3. 설정 파일 (`roadlog.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), roadlog_core::error::RoadlogError> {
//! use roadlog_core::config::RoadlogConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = RoadlogConfig::load("roadlog.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = RoadlogConfig::parse("[validator]\nrow_width = 84")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, RoadlogError};
use crate::types::SchemaDescriptor;

/// roadlog 통합 설정
///
/// `roadlog.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 모듈은 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoadlogConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 상관 분석 엔진 설정
    #[serde(default)]
    pub correlator: CorrelatorSection,
    /// 경로 검증기 설정
    #[serde(default)]
    pub validator: ValidatorConfig,
}

impl RoadlogConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    /// 3. 유효성 검증
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, RoadlogError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 설정 파일이 없으면 기본값(+ 환경변수)으로 대체합니다.
    ///
    /// CLI의 기본 설정 경로처럼 파일이 선택 사항인 경우에 사용합니다.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self, RoadlogError> {
        let path = path.as_ref();
        match tokio::fs::try_exists(path).await {
            Ok(true) => Self::load(path).await,
            _ => {
                tracing::debug!(path = %path.display(), "config file not found, using defaults");
                let mut config = Self::default();
                config.apply_env_overrides();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, RoadlogError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RoadlogError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                RoadlogError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, RoadlogError> {
        toml::from_str(toml_str).map_err(|e| {
            RoadlogError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `ROADLOG_{SECTION}_{FIELD}`
    /// 예: `ROADLOG_CORRELATOR_OUTPUT_DIR=/tmp/tables`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "ROADLOG_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "ROADLOG_GENERAL_LOG_FORMAT");

        // Correlator
        override_string(
            &mut self.correlator.output_dir,
            "ROADLOG_CORRELATOR_OUTPUT_DIR",
        );
        override_string(&mut self.correlator.delimiter, "ROADLOG_CORRELATOR_DELIMITER");
        override_bool(&mut self.correlator.parallel, "ROADLOG_CORRELATOR_PARALLEL");
        if let Ok(val) = std::env::var("ROADLOG_CORRELATOR_DUPLICATE_PATH") {
            match DuplicatePathPolicy::from_str_loose(&val) {
                Some(policy) => self.correlator.duplicate_path = policy,
                None => warn!(
                    env_key = "ROADLOG_CORRELATOR_DUPLICATE_PATH",
                    value = val.as_str(),
                    "unknown duplicate path policy in env var, ignoring"
                ),
            }
        }

        // Schema
        override_bool(
            &mut self.correlator.schema.invalid_column,
            "ROADLOG_CORRELATOR_SCHEMA_INVALID_COLUMN",
        );
        override_bool(
            &mut self.correlator.schema.group_by_instance,
            "ROADLOG_CORRELATOR_SCHEMA_GROUP_BY_INSTANCE",
        );
        override_bool(
            &mut self.correlator.schema.default_strategy_fallback,
            "ROADLOG_CORRELATOR_SCHEMA_DEFAULT_STRATEGY_FALLBACK",
        );

        // Validator
        override_i64(&mut self.validator.row_width, "ROADLOG_VALIDATOR_ROW_WIDTH");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), RoadlogError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        // 구분자는 개행이 아닌 ASCII 1바이트
        self.correlator.delimiter_byte()?;

        if self.validator.row_width <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "validator.row_width".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 중복 PATH 이벤트 처리 정책
///
/// 같은 실행 그룹 안에서 이미 존재하는 복합 id로 PATH가 다시 들어온 경우의 동작입니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePathPolicy {
    /// 새 레코드로 덮어씀 (누적 카운터 초기화, 기본값)
    #[default]
    Overwrite,
    /// 기존 레코드를 그대로 유지 (첫 경로와 누적 상태 보존)
    Merge,
    /// 스트림 일관성 에러로 처리
    Reject,
}

impl DuplicatePathPolicy {
    /// 대소문자를 구분하지 않고 정책 이름을 파싱합니다.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "overwrite" => Some(Self::Overwrite),
            "merge" => Some(Self::Merge),
            "reject" => Some(Self::Reject),
            _ => None,
        }
    }

    /// 정책 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Overwrite => "overwrite",
            Self::Merge => "merge",
            Self::Reject => "reject",
        }
    }
}

/// 상관 분석 엔진 설정 섹션
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelatorSection {
    /// 실행 그룹별 테이블 출력 디렉토리
    pub output_dir: String,
    /// 테이블 필드 구분자 (ASCII 1문자)
    pub delimiter: String,
    /// 중복 PATH 처리 정책
    pub duplicate_path: DuplicatePathPolicy,
    /// 실행 그룹 병렬 처리 여부
    pub parallel: bool,
    /// 스키마 서술자
    pub schema: SchemaDescriptor,
}

impl CorrelatorSection {
    /// 구분자를 바이트로 변환합니다.
    pub fn delimiter_byte(&self) -> Result<u8, ConfigError> {
        match self.delimiter.as_bytes() {
            [b] if b.is_ascii() && *b != b'\n' && *b != b'\r' => Ok(*b),
            _ => Err(ConfigError::InvalidValue {
                field: "correlator.delimiter".to_owned(),
                reason: format!(
                    "must be a single ASCII character other than a newline, got '{}'",
                    self.delimiter
                ),
            }),
        }
    }
}

impl Default for CorrelatorSection {
    fn default() -> Self {
        Self {
            output_dir: ".".to_owned(),
            delimiter: ",".to_owned(),
            duplicate_path: DuplicatePathPolicy::Overwrite,
            parallel: true,
            schema: SchemaDescriptor::full(),
        }
    }
}

/// 경로 검증기 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// 격자 한 행의 노드 수 (인접 노드 차이가 이 값이면 잘못된 경계 넘김)
    pub row_width: i64,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self { row_width: 84 }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_i64(target: &mut i64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<i64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse i64 from env var, ignoring"
            ),
        }
    }
}
