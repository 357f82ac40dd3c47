//! 라인 분류기 -- 로그 라인 하나를 시뮬레이션 이벤트로 분류
//!
//! [`LineClassifier`]는 종류별 고정 마커 토큰의 포함 여부로 라인을 분류하고,
//! 마커가 일치하면 하위 패턴으로 엔티티 id와 경로를 추출합니다.
//!
//! # 로그 형식
//! ```text
//! 0    [main] INFO  adasim.algorithm.routing - PATH: Vehicle: 3 From: 1 To: 9 Path: [1, 2, 9]
//! 12   [main] INFO  adasim.model.TrafficSimulator - SIMULATION: tick
//! 13   [main] INFO  adasim.model.Vehicle - MOVE: Vehicle: 3 At: 1 To: 2
//! 20   [main] INFO  adasim.model.Vehicle - STOP: Vehicle: 3 At: 9
//! 21   [main] INFO  adasim.model.RoadSegment - INVALID: Move: Vehicle: 4 At: 5 To: 6
//! ```
//!
//! # 우선순위
//! 하나의 라인에 여러 마커가 있으면 PATH > MOVE > STOP > TICK > INVALID 순서로
//! 처음 일치한 종류가 선택됩니다.

use regex::Regex;

use roadlog_core::types::SchemaDescriptor;

use crate::error::CorrelatorError;

/// PATH 마커
pub const PATH_MARKER: &str = "PATH: ";
/// MOVE 마커
pub const MOVE_MARKER: &str = "MOVE: ";
/// STOP 마커
pub const STOP_MARKER: &str = "STOP: ";
/// 시뮬레이션 틱 마커
pub const TICK_MARKER: &str = "SIMULATION: ";
/// INVALID 마커
pub const INVALID_MARKER: &str = "INVALID: ";

/// `Vehicle: <id>` 이후 마지막 대괄호 그룹을 경로로 추출
const PATH_PATTERN: &str = r"Vehicle: (\d+)\b.*\[([^\[\]]*)\]";
/// 마커 뒤 `Label: ` 토큰들을 건너뛰고 첫 정수를 엔티티 id로 추출
const ENTITY_PATTERN: &str = r"^(?:[A-Za-z]+: )*(\d+)";

/// 분류된 이벤트 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Path,
    Move,
    Stop,
    Tick,
    Invalid,
}

impl EventKind {
    /// 로그/에러 메시지용 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Path => "PATH",
            Self::Move => "MOVE",
            Self::Stop => "STOP",
            Self::Tick => "TICK",
            Self::Invalid => "INVALID",
        }
    }

    /// 메트릭 레이블 값
    pub fn label(&self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Move => "move",
            Self::Stop => "stop",
            Self::Tick => "tick",
            Self::Invalid => "invalid",
        }
    }
}

/// 분류 결과 이벤트
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    /// 엔티티 생성 (원본 id와 전체 경로)
    Path { raw_id: String, path: Vec<u64> },
    /// 한 칸 이동
    Move { raw_id: String },
    /// 목적지 도착
    Stop { raw_id: String },
    /// 시뮬레이션 시계 한 틱
    Tick,
    /// 잘못된 이동 시도
    Invalid { raw_id: String },
}

impl LineEvent {
    /// 이벤트 종류
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Path { .. } => EventKind::Path,
            Self::Move { .. } => EventKind::Move,
            Self::Stop { .. } => EventKind::Stop,
            Self::Tick => EventKind::Tick,
            Self::Invalid { .. } => EventKind::Invalid,
        }
    }
}

/// 마커는 일치했지만 하위 패턴이 맞지 않는 라인
///
/// 분류기는 파일 위치를 모르므로 호출자가 [`MalformedLine::at`]으로
/// 파일 이름과 라인 번호를 붙입니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedLine {
    /// 일치한 마커의 이벤트 종류
    pub kind: EventKind,
    /// 실패 사유
    pub reason: String,
}

impl MalformedLine {
    /// 파일 위치를 붙여 도메인 에러로 변환합니다.
    pub fn at(self, file: impl Into<String>, line: usize) -> CorrelatorError {
        CorrelatorError::LineParse {
            file: file.into(),
            line,
            kind: self.kind.as_str(),
            reason: self.reason,
        }
    }
}

/// 로그 라인 분류기
///
/// 정규식은 생성 시 한 번만 컴파일됩니다.
/// INVALID 종류는 스키마가 `Invalid` 열을 가질 때만 인식합니다.
#[derive(Debug, Clone)]
pub struct LineClassifier {
    path_re: Regex,
    entity_re: Regex,
    recognise_invalid: bool,
}

impl LineClassifier {
    /// 스키마에 맞는 분류기를 생성합니다.
    pub fn new(schema: &SchemaDescriptor) -> Result<Self, CorrelatorError> {
        Ok(Self {
            path_re: compile(PATH_PATTERN)?,
            entity_re: compile(ENTITY_PATTERN)?,
            recognise_invalid: schema.invalid_column,
        })
    }

    /// 라인 하나를 분류합니다.
    ///
    /// 어떤 마커도 없으면 `Ok(None)`을 반환합니다 (정상 동작).
    pub fn classify(&self, line: &str) -> Result<Option<LineEvent>, MalformedLine> {
        if let Some(pos) = line.find(PATH_MARKER) {
            return self.parse_path(&line[pos..]).map(Some);
        }
        if let Some(pos) = line.find(MOVE_MARKER) {
            let raw_id = self.parse_entity(EventKind::Move, &line[pos + MOVE_MARKER.len()..])?;
            return Ok(Some(LineEvent::Move { raw_id }));
        }
        if let Some(pos) = line.find(STOP_MARKER) {
            let raw_id = self.parse_entity(EventKind::Stop, &line[pos + STOP_MARKER.len()..])?;
            return Ok(Some(LineEvent::Stop { raw_id }));
        }
        if line.contains(TICK_MARKER) {
            return Ok(Some(LineEvent::Tick));
        }
        if self.recognise_invalid {
            if let Some(pos) = line.find(INVALID_MARKER) {
                let raw_id =
                    self.parse_entity(EventKind::Invalid, &line[pos + INVALID_MARKER.len()..])?;
                return Ok(Some(LineEvent::Invalid { raw_id }));
            }
        }
        Ok(None)
    }

    fn parse_path(&self, body: &str) -> Result<LineEvent, MalformedLine> {
        let caps = self.path_re.captures(body).ok_or_else(|| MalformedLine {
            kind: EventKind::Path,
            reason: "expected 'Vehicle: <id>' followed by a bracketed path".to_owned(),
        })?;

        // 탐욕적 `.*`이므로 두 번째 그룹은 마지막 대괄호 그룹
        let raw_id = caps[1].to_owned();
        let path = parse_path_list(&caps[2]).map_err(|reason| MalformedLine {
            kind: EventKind::Path,
            reason,
        })?;

        Ok(LineEvent::Path { raw_id, path })
    }

    fn parse_entity(&self, kind: EventKind, rest: &str) -> Result<String, MalformedLine> {
        self.entity_re
            .captures(rest)
            .map(|caps| caps[1].to_owned())
            .ok_or_else(|| MalformedLine {
                kind,
                reason: format!("missing entity id after '{}' marker", kind.as_str()),
            })
    }
}

/// 쉼표로 구분된 노드 id 목록을 파싱합니다.
///
/// 빈 목록(`[]`)은 빈 경로입니다.
pub fn parse_path_list(text: &str) -> Result<Vec<u64>, String> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    text.split(',')
        .map(|token| {
            let token = token.trim();
            token
                .parse::<u64>()
                .map_err(|_| format!("invalid path element '{token}'"))
        })
        .collect()
}

fn compile(pattern: &str) -> Result<Regex, CorrelatorError> {
    Regex::new(pattern).map_err(|e| CorrelatorError::Config {
        field: "classifier".to_owned(),
        reason: format!("invalid pattern '{pattern}': {e}"),
    })
}
