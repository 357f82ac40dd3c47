//! 상관 분석 엔진 설정
//!
//! [`CorrelatorConfig`]는 core의 [`CorrelatorSection`](roadlog_core::config::CorrelatorSection)을
//! 기반으로 엔진 전용 설정을 제공합니다.
//!
//! # 사용 예시
//! ```ignore
//! use roadlog_core::config::RoadlogConfig;
//! use roadlog_correlator::config::CorrelatorConfig;
//!
//! let core_config = RoadlogConfig::default();
//! let config = CorrelatorConfig::from_core(&core_config.correlator)?;
//! ```

use std::path::PathBuf;

use roadlog_core::config::{CorrelatorSection, DuplicatePathPolicy};
use roadlog_core::types::SchemaDescriptor;

use crate::error::CorrelatorError;

/// 상관 분석 엔진 설정
///
/// core 섹션에서 파생되며, 구분자는 미리 바이트로 검증해 둡니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelatorConfig {
    /// 실행 그룹별 테이블 출력 디렉토리
    pub output_dir: PathBuf,
    /// 지정되면 모든 실행 그룹을 이 파일 하나로 병합 출력
    pub merged_output: Option<PathBuf>,
    /// 테이블 필드 구분자
    pub delimiter: u8,
    /// 중복 PATH 처리 정책
    pub duplicate_path: DuplicatePathPolicy,
    /// 실행 그룹 병렬 처리 여부
    pub parallel: bool,
    /// 스키마 서술자
    pub schema: SchemaDescriptor,
}

impl Default for CorrelatorConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            merged_output: None,
            delimiter: b',',
            duplicate_path: DuplicatePathPolicy::Overwrite,
            parallel: true,
            schema: SchemaDescriptor::full(),
        }
    }
}

impl CorrelatorConfig {
    /// core의 `CorrelatorSection`에서 엔진 설정을 생성합니다.
    ///
    /// 병합 출력 파일은 core 설정에 없으므로 `None`입니다.
    pub fn from_core(core: &CorrelatorSection) -> Result<Self, CorrelatorError> {
        let delimiter = core
            .delimiter_byte()
            .map_err(|e| CorrelatorError::Config {
                field: "delimiter".to_owned(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            output_dir: PathBuf::from(&core.output_dir),
            merged_output: None,
            delimiter,
            duplicate_path: core.duplicate_path,
            parallel: core.parallel,
            schema: core.schema,
        })
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), CorrelatorError> {
        if !self.delimiter.is_ascii() || matches!(self.delimiter, b'\n' | b'\r') {
            return Err(CorrelatorError::Config {
                field: "delimiter".to_owned(),
                reason: "must be a single ASCII character other than a newline".to_owned(),
            });
        }

        if self.output_dir.as_os_str().is_empty() {
            return Err(CorrelatorError::Config {
                field: "output_dir".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }

        if let Some(path) = &self.merged_output {
            if path.file_name().is_none() {
                return Err(CorrelatorError::Config {
                    field: "merged_output".to_owned(),
                    reason: format!("'{}' does not name a file", path.display()),
                });
            }
        }

        Ok(())
    }
}

/// 엔진 설정 빌더
#[derive(Default)]
pub struct CorrelatorConfigBuilder {
    config: CorrelatorConfig,
}

impl CorrelatorConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 기존 설정에서 빌더를 시작합니다.
    pub fn from_config(config: CorrelatorConfig) -> Self {
        Self { config }
    }

    /// 출력 디렉토리를 설정합니다.
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    /// 병합 출력 파일을 설정합니다.
    pub fn merged_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.merged_output = Some(path.into());
        self
    }

    /// 구분자를 설정합니다.
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.config.delimiter = delimiter;
        self
    }

    /// 중복 PATH 정책을 설정합니다.
    pub fn duplicate_path(mut self, policy: DuplicatePathPolicy) -> Self {
        self.config.duplicate_path = policy;
        self
    }

    /// 병렬 처리 여부를 설정합니다.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    /// 스키마 서술자를 설정합니다.
    pub fn schema(mut self, schema: SchemaDescriptor) -> Self {
        self.config.schema = schema;
        self
    }

    /// 설정을 검증하고 `CorrelatorConfig`를 생성합니다.
    pub fn build(self) -> Result<CorrelatorConfig, CorrelatorError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        CorrelatorConfig::default().validate().unwrap();
    }

    #[test]
    fn from_core_preserves_values() {
        let core = CorrelatorSection {
            output_dir: "/tmp/tables".to_owned(),
            delimiter: ";".to_owned(),
            duplicate_path: DuplicatePathPolicy::Reject,
            parallel: false,
            schema: SchemaDescriptor::basic(),
        };
        let config = CorrelatorConfig::from_core(&core).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("/tmp/tables"));
        assert_eq!(config.delimiter, b';');
        assert_eq!(config.duplicate_path, DuplicatePathPolicy::Reject);
        assert!(!config.parallel);
        assert_eq!(config.schema, SchemaDescriptor::basic());
        assert!(config.merged_output.is_none());
    }

    #[test]
    fn from_core_rejects_multi_char_delimiter() {
        let core = CorrelatorSection {
            delimiter: ", ".to_owned(),
            ..Default::default()
        };
        let err = CorrelatorConfig::from_core(&core).unwrap_err();
        assert!(matches!(err, CorrelatorError::Config { .. }));
    }

    #[test]
    fn validate_rejects_newline_delimiter() {
        let config = CorrelatorConfig {
            delimiter: b'\n',
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_output_dir() {
        let config = CorrelatorConfig {
            output_dir: PathBuf::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn builder_creates_valid_config() {
        let config = CorrelatorConfigBuilder::new()
            .output_dir("/data/out")
            .merged_output("/data/out/all.csv")
            .delimiter(b'\t')
            .parallel(false)
            .build()
            .unwrap();
        assert_eq!(config.delimiter, b'\t');
        assert_eq!(
            config.merged_output.as_deref(),
            Some(std::path::Path::new("/data/out/all.csv"))
        );
        assert!(!config.parallel);
    }

    #[test]
    fn builder_rejects_invalid_config() {
        let result = CorrelatorConfigBuilder::new().delimiter(0xFF).build();
        assert!(result.is_err());
    }

    #[test]
    fn builder_rejects_merged_output_without_file_name() {
        let result = CorrelatorConfigBuilder::new().merged_output("/").build();
        assert!(result.is_err());
    }
}
