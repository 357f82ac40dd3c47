//! 상관 분석 엔진 에러 타입
//!
//! [`CorrelatorError`]는 실행 그룹 탐색, 로그 스트림 처리, 설정 문서 파싱,
//! 테이블 출력 중에 발생하는 모든 에러를 표현합니다.
//! `From<CorrelatorError> for RoadlogError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.
//!
//! # 에러 카테고리
//!
//! - **스트림 일관성**: `UnknownEntity`, `DuplicatePath`
//! - **파싱**: `LineParse`, `ConfigDocument`
//! - **파일 누락**: `MissingFile`
//! - **출력**: `Emit`
//! - **설정**: `Config`
//! - **I/O, 태스크**: `Io`, `Task`

use roadlog_core::error::{ConfigError, ParseError, RoadlogError, StreamError};

/// 상관 분석 엔진 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum CorrelatorError {
    /// PATH 이벤트 없이 참조된 엔티티
    #[error("{file}:{line}: {kind} event references unknown entity '{composite_id}'")]
    UnknownEntity {
        /// 로그 파일 경로
        file: String,
        /// 1부터 시작하는 라인 번호
        line: usize,
        /// 이벤트 종류 (MOVE, STOP, INVALID)
        kind: &'static str,
        /// 조회한 복합 id
        composite_id: String,
    },

    /// `reject` 정책에서 중복 PATH 발생
    #[error("{file}:{line}: duplicate PATH for entity '{composite_id}'")]
    DuplicatePath {
        /// 로그 파일 경로
        file: String,
        /// 1부터 시작하는 라인 번호
        line: usize,
        /// 중복된 복합 id
        composite_id: String,
    },

    /// 마커는 일치했지만 하위 패턴이 맞지 않는 로그 라인
    #[error("{file}:{line}: malformed {kind} line: {reason}")]
    LineParse {
        /// 로그 파일 경로
        file: String,
        /// 1부터 시작하는 라인 번호
        line: usize,
        /// 이벤트 종류
        kind: &'static str,
        /// 실패 사유
        reason: String,
    },

    /// 설정 문서 파싱 실패
    #[error("config document error: {file}: {reason}")]
    ConfigDocument {
        /// 설정 문서 경로
        file: String,
        /// 실패 사유
        reason: String,
    },

    /// 파일 쌍의 한쪽이 없음
    #[error("missing file for run instance '{stem}': {path}")]
    MissingFile {
        /// 파일 이름 접두어 (`10-5-0`)
        stem: String,
        /// 없는 파일 경로
        path: String,
    },

    /// 테이블 출력 실패
    #[error("emit error: {0}")]
    Emit(String),

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 파일 I/O 에러
    #[error("io error: {path}: {source}")]
    Io {
        /// 관련 파일 경로
        path: String,
        /// 원본 I/O 에러
        source: std::io::Error,
    },

    /// 블로킹 태스크 실행 실패
    #[error("task error: {0}")]
    Task(String),
}

impl CorrelatorError {
    /// 경로와 함께 I/O 에러를 생성합니다.
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

impl From<CorrelatorError> for RoadlogError {
    fn from(err: CorrelatorError) -> Self {
        match err {
            CorrelatorError::UnknownEntity {
                file,
                line,
                composite_id,
                ..
            } => RoadlogError::Stream(StreamError::UnknownEntity {
                file,
                line,
                composite_id,
            }),
            CorrelatorError::MissingFile { path, .. } => {
                RoadlogError::Stream(StreamError::MissingFile { path })
            }
            CorrelatorError::LineParse {
                file, line, reason, ..
            } => RoadlogError::Parse(ParseError::Line { file, line, reason }),
            CorrelatorError::ConfigDocument { file, reason } => {
                RoadlogError::Parse(ParseError::Document { file, reason })
            }
            CorrelatorError::Config { field, reason } => {
                RoadlogError::Config(ConfigError::InvalidValue { field, reason })
            }
            CorrelatorError::Io { source, .. } => RoadlogError::Io(source),
            other => RoadlogError::Stream(StreamError::Aborted(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_entity_display() {
        let err = CorrelatorError::UnknownEntity {
            file: "data/10-5-0.log".to_owned(),
            line: 42,
            kind: "MOVE",
            composite_id: "710-5-0".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("10-5-0.log:42"));
        assert!(msg.contains("MOVE"));
        assert!(msg.contains("710-5-0"));
    }

    #[test]
    fn unknown_entity_converts_to_stream_error() {
        let err: RoadlogError = CorrelatorError::UnknownEntity {
            file: "a.log".to_owned(),
            line: 1,
            kind: "STOP",
            composite_id: "1a".to_owned(),
        }
        .into();
        assert!(matches!(
            err,
            RoadlogError::Stream(StreamError::UnknownEntity { .. })
        ));
    }

    #[test]
    fn line_parse_converts_to_parse_error() {
        let err: RoadlogError = CorrelatorError::LineParse {
            file: "a.log".to_owned(),
            line: 9,
            kind: "PATH",
            reason: "missing path list".to_owned(),
        }
        .into();
        assert!(matches!(err, RoadlogError::Parse(ParseError::Line { line: 9, .. })));
    }

    #[test]
    fn duplicate_path_converts_to_aborted_stream() {
        let err: RoadlogError = CorrelatorError::DuplicatePath {
            file: "a.log".to_owned(),
            line: 5,
            composite_id: "3a".to_owned(),
        }
        .into();
        assert!(matches!(err, RoadlogError::Stream(StreamError::Aborted(_))));
        assert!(err.to_string().contains("duplicate PATH"));
    }

    #[test]
    fn io_helper_keeps_path() {
        let err = CorrelatorError::io(
            "/data/1-1-0.log",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("/data/1-1-0.log"));
    }
}
