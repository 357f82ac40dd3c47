//! 실행 그룹 탐색 -- 데이터 디렉토리의 파일 쌍을 실행 그룹으로 묶음
//!
//! 파일 이름 규칙 `{nodes}-{cars}-{instance}.(log|xml)`을 따르는 파일만
//! 대상이며, 규칙에 맞지 않는 파일은 조용히 제외합니다 (debug 로그만).
//! 로그와 설정 문서 중 한쪽만 있는 인스턴스는 어떤 테이블도 쓰기 전에
//! 전체 실행을 중단시킵니다.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::debug;

use roadlog_core::types::RunGroupKey;

use crate::error::CorrelatorError;

/// 파일 이름 규칙
const FILE_NAME_PATTERN: &str = r"^(\d+)-(\d+)-(\d+)\.(xml|log)$";

/// 로그 파일 확장자
pub const LOG_EXTENSION: &str = "log";
/// 설정 문서 확장자
pub const CONFIG_EXTENSION: &str = "xml";

/// 같은 접두어를 가진 로그 + 설정 문서 쌍
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePair {
    /// 파일 이름 접두어 (`10-5-0`)
    pub stem: String,
    /// 실행 인스턴스 번호
    pub instance: String,
    /// 로그 파일 경로
    pub log_path: PathBuf,
    /// 설정 문서 경로
    pub config_path: PathBuf,
}

/// 실행 그룹
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunGroup {
    /// 그룹 키
    pub key: RunGroupKey,
    /// 소속 파일 쌍 (인스턴스 번호 오름차순)
    pub members: Vec<FilePair>,
}

#[derive(Default)]
struct StemFiles {
    nodes: String,
    cars: String,
    instance: String,
    log: Option<PathBuf>,
    config: Option<PathBuf>,
}

/// 디렉토리를 탐색하여 실행 그룹 목록을 반환합니다.
///
/// 그룹은 (노드 수, 차량 수[, 인스턴스]) 숫자 오름차순으로 정렬됩니다.
/// `group_by_instance`가 꺼져 있으면 인스턴스마다 별도 그룹이 됩니다.
pub fn discover_run_groups(
    dir: &Path,
    group_by_instance: bool,
) -> Result<Vec<RunGroup>, CorrelatorError> {
    let pattern = Regex::new(FILE_NAME_PATTERN).map_err(|e| CorrelatorError::Config {
        field: "discovery".to_owned(),
        reason: e.to_string(),
    })?;

    // 재귀 없이 1단계만 탐색
    let entries = std::fs::read_dir(dir).map_err(|e| CorrelatorError::io(dir, e))?;

    let mut stems: BTreeMap<String, StemFiles> = BTreeMap::new();

    for entry in entries {
        let entry = entry.map_err(|e| CorrelatorError::io(dir, e))?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            debug!(path = %path.display(), "skipping non UTF-8 file name");
            continue;
        };

        let Some(caps) = pattern.captures(name) else {
            debug!(file = name, "file name does not match run naming convention, skipping");
            continue;
        };

        let stem = format!("{}-{}-{}", &caps[1], &caps[2], &caps[3]);
        let files = stems.entry(stem).or_insert_with(|| StemFiles {
            nodes: caps[1].to_owned(),
            cars: caps[2].to_owned(),
            instance: caps[3].to_owned(),
            ..StemFiles::default()
        });

        if &caps[4] == LOG_EXTENSION {
            files.log = Some(path);
        } else {
            files.config = Some(path);
        }
    }

    let mut groups: BTreeMap<String, RunGroup> = BTreeMap::new();

    for (stem, files) in stems {
        let (log_path, config_path) = match (files.log, files.config) {
            (Some(log), Some(config)) => (log, config),
            (None, _) => {
                return Err(CorrelatorError::MissingFile {
                    path: dir.join(format!("{stem}.{LOG_EXTENSION}")).display().to_string(),
                    stem,
                });
            }
            (_, None) => {
                return Err(CorrelatorError::MissingFile {
                    path: dir
                        .join(format!("{stem}.{CONFIG_EXTENSION}"))
                        .display()
                        .to_string(),
                    stem,
                });
            }
        };

        let key = RunGroupKey {
            nodes: files.nodes,
            cars: files.cars,
            instance: if group_by_instance {
                None
            } else {
                Some(files.instance.clone())
            },
        };

        groups
            .entry(key.to_string())
            .or_insert_with(|| RunGroup {
                key,
                members: Vec::new(),
            })
            .members
            .push(FilePair {
                stem,
                instance: files.instance,
                log_path,
                config_path,
            });
    }

    let mut groups: Vec<RunGroup> = groups.into_values().collect();
    for group in &mut groups {
        group
            .members
            .sort_by(|a, b| numeric_cmp(&a.instance, &b.instance));
    }
    groups.sort_by(|a, b| compare_keys(&a.key, &b.key));

    debug!(dir = %dir.display(), groups = groups.len(), "run groups discovered");
    Ok(groups)
}

/// 그룹 키를 숫자 순서로 비교합니다.
pub fn compare_keys(a: &RunGroupKey, b: &RunGroupKey) -> Ordering {
    numeric_cmp(&a.nodes, &b.nodes)
        .then_with(|| numeric_cmp(&a.cars, &b.cars))
        .then_with(|| match (&a.instance, &b.instance) {
            (Some(x), Some(y)) => numeric_cmp(x, y),
            (x, y) => x.cmp(y),
        })
}

/// 10진수 문자열을 크기 제한 없이 숫자 순서로 비교합니다.
fn numeric_cmp(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
