//! 경로 검증기 -- PATH 라인의 원시 경로에서 잘못된 인접 쌍 탐지
//!
//! 격자 지도에서 노드 id는 행 단위로 매겨지므로, 연속한 두 노드의 차이가
//! 정확히 행 너비와 같으면 행 경계를 잘못 넘은 이동입니다.
//!
//! # 검사 규칙
//! - `Path: [` ... `]` 구간이 있는 라인만 검사합니다.
//! - 노드 `p[0..k]`에 대해 `n = 0 ..= k-2`인 쌍 `(p[n], p[n+1])`만 봅니다.
//!   마지막 쌍 `(p[k-1], p[k])`은 검사하지 않습니다.
//! - 경로마다 *첫* 위반 쌍 하나만 보고하고 그 경로의 검사를 멈춥니다.
//! - 정수로 읽을 수 없는 경로는 에러 없이 건너뜁니다.

use std::fmt;
use std::io::{BufRead, Cursor};
use std::path::Path;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info};

use roadlog_core::config::ValidatorConfig;
use roadlog_core::metrics as m;

use crate::error::PathValidatorError;

/// 경로 구간 패턴 (마지막 `]`까지)
const PATH_TEXT_PATTERN: &str = r"Path: \[(.*)\]";

/// 잘못된 인접 쌍 하나
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// 1부터 시작하는 라인 번호
    pub line: usize,
    /// 대괄호 안의 원시 경로 텍스트
    pub path_text: String,
    /// 위반 쌍 (앞 노드, 뒤 노드)
    pub pair: (i64, i64),
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "INVALID PATH on line {}: {}: [{}, {}]",
            self.line, self.path_text, self.pair.0, self.pair.1
        )
    }
}

/// 파일 하나의 검사 결과
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    /// 읽은 라인 수
    pub lines: usize,
    /// 검사한 경로 수
    pub paths_scanned: usize,
    /// 읽을 수 없어 건너뛴 경로 수
    pub skipped: usize,
    /// 발견된 위반 (라인 순서)
    pub violations: Vec<Violation>,
}

/// 경로 검증기
#[derive(Debug, Clone)]
pub struct PathValidator {
    row_width: i64,
    path_re: Regex,
}

impl PathValidator {
    /// 행 너비를 지정하여 검증기를 생성합니다.
    pub fn new(row_width: i64) -> Result<Self, PathValidatorError> {
        if row_width <= 0 {
            return Err(PathValidatorError::Config {
                field: "row_width".to_owned(),
                reason: format!("must be greater than 0, got {row_width}"),
            });
        }

        let path_re = Regex::new(PATH_TEXT_PATTERN).map_err(|e| PathValidatorError::Config {
            field: "pattern".to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self { row_width, path_re })
    }

    /// core의 `ValidatorConfig`에서 검증기를 생성합니다.
    pub fn from_core(config: &ValidatorConfig) -> Result<Self, PathValidatorError> {
        Self::new(config.row_width)
    }

    /// 행 너비
    pub fn row_width(&self) -> i64 {
        self.row_width
    }

    /// 노드 목록에서 첫 위반 쌍을 찾습니다.
    pub fn first_violation(&self, nodes: &[i64]) -> Option<(i64, i64)> {
        let width = self.row_width.unsigned_abs();
        // 마지막 쌍은 제외
        let checked = nodes.len().saturating_sub(1);
        nodes[..checked]
            .windows(2)
            .find(|pair| pair[0].abs_diff(pair[1]) == width)
            .map(|pair| (pair[0], pair[1]))
    }

    /// 라인 하나를 검사합니다.
    ///
    /// 경로가 없는 라인은 `LineCheck::NoPath`, 읽을 수 없는 경로는 `LineCheck::Skipped`입니다.
    pub fn check_line(&self, line_no: usize, line: &str) -> LineCheck {
        let Some(caps) = self.path_re.captures(line) else {
            return LineCheck::NoPath;
        };
        let text = &caps[1];

        let nodes = match parse_nodes(text) {
            Some(nodes) => nodes,
            None => {
                debug!(line = line_no, path = text, "unparseable path, skipping");
                return LineCheck::Skipped;
            }
        };

        match self.first_violation(&nodes) {
            Some(pair) => LineCheck::Invalid(Violation {
                line: line_no,
                path_text: text.to_owned(),
                pair,
            }),
            None => LineCheck::Valid,
        }
    }

    /// 라인 스트림 전체를 검사합니다.
    ///
    /// `source`는 에러 메시지에 쓰이는 이름입니다.
    pub fn scan<R: BufRead>(
        &self,
        mut reader: R,
        source: &str,
    ) -> Result<ScanReport, PathValidatorError> {
        let mut report = ScanReport::default();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|e| PathValidatorError::Io {
                    path: source.to_owned(),
                    source: e,
                })?;
            if read == 0 {
                break;
            }
            report.lines += 1;

            let line = String::from_utf8_lossy(&buf);
            match self.check_line(report.lines, line.trim_end_matches(['\n', '\r'])) {
                LineCheck::NoPath => {}
                LineCheck::Skipped => report.skipped += 1,
                LineCheck::Valid => report.paths_scanned += 1,
                LineCheck::Invalid(violation) => {
                    report.paths_scanned += 1;
                    report.violations.push(violation);
                }
            }
        }

        metrics::counter!(m::PATH_VALIDATOR_PATHS_SCANNED_TOTAL)
            .increment(report.paths_scanned as u64);
        metrics::counter!(m::PATH_VALIDATOR_VIOLATIONS_TOTAL)
            .increment(report.violations.len() as u64);

        info!(
            source,
            lines = report.lines,
            paths = report.paths_scanned,
            skipped = report.skipped,
            violations = report.violations.len(),
            "path scan finished"
        );

        Ok(report)
    }

    /// 로그 파일 하나를 읽어 검사합니다.
    pub async fn scan_file(&self, path: impl AsRef<Path>) -> Result<ScanReport, PathValidatorError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| PathValidatorError::Io {
                path: display.clone(),
                source: e,
            })?;
        self.scan(Cursor::new(bytes), &display)
    }
}

/// 라인 하나의 검사 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineCheck {
    /// 경로 구간 없음
    NoPath,
    /// 읽을 수 없는 경로
    Skipped,
    /// 위반 없음
    Valid,
    /// 위반 발견
    Invalid(Violation),
}

fn parse_nodes(text: &str) -> Option<Vec<i64>> {
    if text.trim().is_empty() {
        return Some(Vec::new());
    }
    text.split(',')
        .map(|token| token.trim().parse::<i64>().ok())
        .collect()
}
