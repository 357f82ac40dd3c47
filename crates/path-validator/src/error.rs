//! 경로 검증기 에러 타입
//!
//! 잘못된 인접 쌍은 에러가 아니라 검사 결과([`Violation`](crate::Violation))입니다.
//! 여기에는 파일을 읽지 못했거나 설정이 잘못된 경우만 정의합니다.

use roadlog_core::error::{ConfigError, RoadlogError};

/// 경로 검증기 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum PathValidatorError {
    /// 로그 파일 I/O 에러
    #[error("io error: {path}: {source}")]
    Io {
        /// 관련 파일 경로
        path: String,
        /// 원본 I/O 에러
        source: std::io::Error,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },
}

impl From<PathValidatorError> for RoadlogError {
    fn from(err: PathValidatorError) -> Self {
        match err {
            PathValidatorError::Io { source, .. } => RoadlogError::Io(source),
            PathValidatorError::Config { field, reason } => {
                RoadlogError::Config(ConfigError::InvalidValue { field, reason })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts() {
        let err: RoadlogError = PathValidatorError::Config {
            field: "row_width".to_owned(),
            reason: "must be greater than 0".to_owned(),
        }
        .into();
        assert!(matches!(err, RoadlogError::Config(_)));
        assert!(err.to_string().contains("row_width"));
    }

    #[test]
    fn io_error_display_has_path() {
        let err = PathValidatorError::Io {
            path: "/data/10-5-0.log".to_owned(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.to_string().contains("/data/10-5-0.log"));
    }
}
