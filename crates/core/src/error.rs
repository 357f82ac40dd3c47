//! 에러 타입: 도메인별 에러 정의

/// roadlog 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum RoadlogError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 로그 스트림 일관성 에러
    #[error("stream error: {0}")]
    Stream(#[from] StreamError),

    /// 파싱 에러
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 로그 스트림 일관성 에러
///
/// 실행 그룹 하나를 중단시키는 치명적 에러입니다.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// PATH 이벤트 없이 참조된 엔티티
    #[error("{file}:{line}: unknown entity '{composite_id}'")]
    UnknownEntity {
        file: String,
        line: usize,
        composite_id: String,
    },

    /// 짝이 맞지 않는 파일 (로그 또는 설정 문서 누락)
    #[error("missing file: {path}")]
    MissingFile { path: String },

    /// 기타 실행 그룹 처리 실패
    #[error("{0}")]
    Aborted(String),
}

/// 파싱 에러
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// 로그 라인 파싱 실패
    #[error("{file}:{line}: {reason}")]
    Line {
        file: String,
        line: usize,
        reason: String,
    },

    /// 설정 문서 파싱 실패
    #[error("{file}: {reason}")]
    Document { file: String, reason: String },
}
