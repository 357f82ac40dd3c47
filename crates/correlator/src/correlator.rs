//! 상관 분석 오케스트레이터 -- 탐색, 그룹 처리, 테이블 커밋 관리
//!
//! [`Correlator`]는 데이터 디렉토리 하나에 대한 전체 집계 흐름을 관리합니다.
//!
//! # 내부 아키텍처
//!
//! ```text
//! data_dir --> discover_run_groups --> RunGroup* --(spawn_blocking)--> process_run_group
//!                                                                           |
//!                                                                     GroupOutcome
//!                                                                           |
//!                                                   +-----------------------+-----------------+
//!                                                   |                                         |
//!                                       TableEmitter::render                      TableBuffer (merged)
//!                                                   |                                         |
//!                                    <out>/<key>.csv.tmp -> rename              <file>.tmp -> rename
//! ```
//!
//! # 커밋 규칙
//! - 실행 그룹 테이블은 그룹이 완전히 성공했을 때만 기록됩니다.
//! - 병합 출력은 모든 그룹이 성공했을 때만 기록됩니다.
//! - 실패한 그룹은 어떤 파일도 남기지 않습니다.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tracing::{debug, error, info};

use roadlog_core::metrics as m;

use crate::config::CorrelatorConfig;
use crate::discovery::{RunGroup, discover_run_groups};
use crate::emitter::TableEmitter;
use crate::engine::{GroupOutcome, process_run_group};
use crate::error::CorrelatorError;

/// 실행 그룹 하나의 처리 요약
#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
    /// 그룹 키 (`10-5`)
    pub group: String,
    /// 처리한 파일 쌍 수
    pub pairs: usize,
    /// 읽은 로그 라인 수
    pub lines: usize,
    /// 출력 행 수 (= 고유 복합 id 수)
    pub rows: usize,
    /// 전략이 기록된 레코드 수
    pub enriched: usize,
    /// 커밋된 테이블 경로 (병합 모드에서는 `None`)
    pub output: Option<PathBuf>,
    /// 처리 소요 시간 (밀리초)
    pub elapsed_ms: u64,
}

/// 실패한 실행 그룹
#[derive(Debug, Clone, Serialize)]
pub struct GroupFailure {
    /// 그룹 키
    pub group: String,
    /// 실패 사유 (파일 이름과 라인 번호 포함)
    pub error: String,
}

/// 전체 실행 보고서
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// 데이터 디렉토리
    pub data_dir: PathBuf,
    /// 성공한 실행 그룹
    pub groups: Vec<GroupSummary>,
    /// 실패한 실행 그룹
    pub failures: Vec<GroupFailure>,
    /// 병합 출력 파일 (모두 성공해 커밋된 경우)
    pub merged_output: Option<PathBuf>,
    /// 전체 출력 행 수
    pub total_rows: usize,
}

impl RunReport {
    /// 모든 실행 그룹이 성공했는지 여부
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// 상관 분석 오케스트레이터
pub struct Correlator {
    config: Arc<CorrelatorConfig>,
    groups_processed: Arc<AtomicU64>,
}

impl Correlator {
    /// 검증된 설정으로 오케스트레이터를 생성합니다.
    pub fn new(config: CorrelatorConfig) -> Result<Self, CorrelatorError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            groups_processed: Arc::new(AtomicU64::new(0)),
        })
    }

    /// 엔진 설정
    pub fn config(&self) -> &CorrelatorConfig {
        &self.config
    }

    /// 지금까지 성공적으로 처리된 실행 그룹 수
    pub fn groups_processed(&self) -> u64 {
        self.groups_processed.load(Ordering::Relaxed)
    }

    /// 데이터 디렉토리의 모든 실행 그룹을 집계합니다.
    ///
    /// 탐색 단계의 에러(디렉토리 읽기 실패, 짝이 맞지 않는 파일)는 어떤 테이블도
    /// 쓰기 전에 `Err`로 반환됩니다. 그룹 처리 실패는 보고서의 `failures`에 담깁니다.
    pub async fn run(&self, data_dir: &Path) -> Result<RunReport, CorrelatorError> {
        info!(
            data_dir = %data_dir.display(),
            parallel = self.config.parallel,
            merged = self.config.merged_output.is_some(),
            "starting aggregation"
        );

        // 실행 그룹 탐색 (blocking I/O)
        let groups = {
            let dir = data_dir.to_path_buf();
            let group_by_instance = self.config.schema.group_by_instance;
            tokio::task::spawn_blocking(move || discover_run_groups(&dir, group_by_instance))
                .await
                .map_err(|e| CorrelatorError::Task(format!("spawn_blocking failed: {e}")))?
        }?;

        if groups.is_empty() {
            info!(data_dir = %data_dir.display(), "no run groups found");
        }

        // 병합 모드가 아니면 그룹마다 바로 커밋
        let commit_dir = if self.config.merged_output.is_none() {
            let dir = self.config.output_dir.clone();
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|e| CorrelatorError::io(&dir, e))?;
            Some(dir)
        } else {
            None
        };

        let results = if self.config.parallel {
            self.run_parallel(groups, commit_dir).await?
        } else {
            self.run_sequential(groups, commit_dir).await?
        };

        let mut report = RunReport {
            data_dir: data_dir.to_path_buf(),
            ..RunReport::default()
        };
        let mut outcomes = Vec::new();

        for (key, result) in results {
            match result {
                Ok((outcome, output)) => {
                    metrics::counter!(m::CORRELATOR_RUN_GROUPS_TOTAL, m::LABEL_RESULT => "success")
                        .increment(1);
                    self.groups_processed.fetch_add(1, Ordering::Relaxed);

                    let rows = outcome.store.len();
                    report.total_rows += rows;
                    report.groups.push(GroupSummary {
                        group: key,
                        pairs: outcome.pairs,
                        lines: outcome.lines,
                        rows,
                        enriched: outcome.enriched,
                        output,
                        elapsed_ms: u64::try_from(outcome.elapsed.as_millis()).unwrap_or(u64::MAX),
                    });
                    outcomes.push(outcome);
                }
                Err(e) => {
                    metrics::counter!(m::CORRELATOR_RUN_GROUPS_TOTAL, m::LABEL_RESULT => "failure")
                        .increment(1);
                    error!(group = %key, error = %e, "run group failed, no table written");
                    report.failures.push(GroupFailure {
                        group: key,
                        error: e.to_string(),
                    });
                }
            }
        }

        if let Some(merged) = self.config.merged_output.clone() {
            if report.is_success() {
                let emitter = TableEmitter::new(self.config.delimiter, self.config.schema);
                let path = merged.clone();
                let rows = tokio::task::spawn_blocking(move || -> Result<usize, CorrelatorError> {
                    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                        std::fs::create_dir_all(parent).map_err(|e| CorrelatorError::io(parent, e))?;
                    }
                    let mut buffer = emitter.begin()?;
                    for outcome in &outcomes {
                        buffer.append(&outcome.key, &outcome.store)?;
                    }
                    let rows = buffer.rows();
                    commit_table(&path, &buffer.finish()?)?;
                    Ok(rows)
                })
                .await
                .map_err(|e| CorrelatorError::Task(format!("spawn_blocking failed: {e}")))??;

                metrics::counter!(m::CORRELATOR_ROWS_EMITTED_TOTAL).increment(rows as u64);
                info!(output = %merged.display(), rows, "merged table committed");
                report.merged_output = Some(merged);
            } else {
                error!(
                    output = %merged.display(),
                    failures = report.failures.len(),
                    "merged table not written because run groups failed"
                );
            }
        }

        info!(
            groups = report.groups.len(),
            failures = report.failures.len(),
            rows = report.total_rows,
            "aggregation finished"
        );

        Ok(report)
    }

    async fn run_parallel(
        &self,
        groups: Vec<RunGroup>,
        commit_dir: Option<PathBuf>,
    ) -> Result<Vec<GroupResult>, CorrelatorError> {
        let mut handles = Vec::with_capacity(groups.len());
        for group in groups {
            let key = group.key.to_string();
            let config = Arc::clone(&self.config);
            let dir = commit_dir.clone();
            let handle =
                tokio::task::spawn_blocking(move || run_group(&group, &config, dir.as_deref()));
            handles.push((key, handle));
        }

        // 탐색 순서대로 결과 수집
        let mut results = Vec::with_capacity(handles.len());
        for (key, handle) in handles {
            let result = handle
                .await
                .map_err(|e| CorrelatorError::Task(format!("spawn_blocking failed: {e}")))?;
            results.push((key, result));
        }
        Ok(results)
    }

    async fn run_sequential(
        &self,
        groups: Vec<RunGroup>,
        commit_dir: Option<PathBuf>,
    ) -> Result<Vec<GroupResult>, CorrelatorError> {
        let mut results = Vec::with_capacity(groups.len());
        for group in groups {
            let key = group.key.to_string();
            let config = Arc::clone(&self.config);
            let dir = commit_dir.clone();
            let result =
                tokio::task::spawn_blocking(move || run_group(&group, &config, dir.as_deref()))
                    .await
                    .map_err(|e| CorrelatorError::Task(format!("spawn_blocking failed: {e}")))?;
            results.push((key, result));
        }
        Ok(results)
    }
}

type GroupResult = (
    String,
    Result<(GroupOutcome, Option<PathBuf>), CorrelatorError>,
);

/// 그룹 하나를 처리하고, 커밋 디렉토리가 있으면 테이블을 기록합니다.
fn run_group(
    group: &RunGroup,
    config: &CorrelatorConfig,
    commit_dir: Option<&Path>,
) -> Result<(GroupOutcome, Option<PathBuf>), CorrelatorError> {
    let outcome = process_run_group(group, config)?;

    let Some(dir) = commit_dir else {
        return Ok((outcome, None));
    };

    let table =
        TableEmitter::new(config.delimiter, config.schema).render(&outcome.key, &outcome.store)?;
    let path = dir.join(outcome.key.table_file_name());
    commit_table(&path, &table)?;

    let rows = outcome.store.len();
    metrics::counter!(m::CORRELATOR_ROWS_EMITTED_TOTAL).increment(rows as u64);
    info!(group = %outcome.key, output = %path.display(), rows, "table committed");

    Ok((outcome, Some(path)))
}

/// 렌더링된 테이블을 `<path>.tmp`에 쓴 뒤 원자적으로 이름을 바꿉니다.
pub fn commit_table(path: &Path, contents: &[u8]) -> Result<(), CorrelatorError> {
    commit_with(path, |file| file.write_all(contents))?;
    debug!(path = %path.display(), bytes = contents.len(), "table file written");
    Ok(())
}

/// `<path>.tmp`에 기록한 뒤 rename합니다. 기록이나 rename이 실패하면 임시 파일을 지웁니다.
fn commit_with<F>(path: &Path, write: F) -> Result<(), CorrelatorError>
where
    F: FnOnce(&mut File) -> std::io::Result<()>,
{
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let written = File::create(&tmp).and_then(|mut file| write(&mut file));
    if let Err(e) = written {
        let _ = std::fs::remove_file(&tmp);
        return Err(CorrelatorError::io(&tmp, e));
    }
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(CorrelatorError::io(path, e));
    }
    Ok(())
}
