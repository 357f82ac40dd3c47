//! 실행 그룹 엔진 -- 파일 쌍들을 순서대로 처리하여 레코드 저장소를 구축
//!
//! [`RunGroupContext`]는 실행 그룹 하나에 한정된 가변 상태(레코드 저장소)를
//! 담는 명시적 컨텍스트입니다. 실행 그룹 간에 공유되지 않으므로 그룹 단위
//! 병렬 처리가 안전합니다.
//!
//! # 처리 흐름 (파일 쌍마다)
//! 1. 로그 스트림을 라인 순서대로 분류하여 저장소에 적용 (스트림마다 새 [`TimeCursor`])
//! 2. 설정 문서를 파싱하여 같은 [`IdentityResolver`]로 레코드 보강
//!
//! 모든 파일 핸들은 지역 변수가 소유하며 실패 경로를 포함해 drop 시 닫힙니다.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use roadlog_core::metrics as m;
use roadlog_core::types::RunGroupKey;

use crate::classifier::{LineClassifier, LineEvent};
use crate::config::CorrelatorConfig;
use crate::cursor::TimeCursor;
use crate::discovery::{FilePair, RunGroup};
use crate::enricher::{ConfigDocument, EnrichStats, MetadataEnricher};
use crate::error::CorrelatorError;
use crate::identity::IdentityResolver;
use crate::store::{EntityRecordStore, StoreError};

/// 로그 스트림 하나의 처리 통계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// 읽은 라인 수
    pub lines: usize,
    /// 이벤트로 분류된 라인 수
    pub events: usize,
    /// 마지막 틱 값
    pub ticks: u64,
}

/// 실행 그룹 처리 결과
#[derive(Debug)]
pub struct GroupOutcome {
    /// 그룹 키
    pub key: RunGroupKey,
    /// 완성된 레코드 저장소
    pub store: EntityRecordStore,
    /// 처리한 파일 쌍 수
    pub pairs: usize,
    /// 읽은 로그 라인 수
    pub lines: usize,
    /// 전략이 기록된 레코드 수
    pub enriched: usize,
    /// 처리 소요 시간
    pub elapsed: Duration,
}

/// 실행 그룹 하나의 처리 컨텍스트
pub struct RunGroupContext {
    key: RunGroupKey,
    classifier: LineClassifier,
    enricher: MetadataEnricher,
    store: EntityRecordStore,
}

impl RunGroupContext {
    /// 그룹 키와 엔진 설정으로 빈 컨텍스트를 생성합니다.
    pub fn new(key: RunGroupKey, config: &CorrelatorConfig) -> Result<Self, CorrelatorError> {
        Ok(Self {
            key,
            classifier: LineClassifier::new(&config.schema)?,
            enricher: MetadataEnricher::new(config.schema.default_strategy_fallback),
            store: EntityRecordStore::new(config.duplicate_path),
        })
    }

    /// 그룹 키
    pub fn key(&self) -> &RunGroupKey {
        &self.key
    }

    /// 현재 레코드 저장소
    pub fn store(&self) -> &EntityRecordStore {
        &self.store
    }

    /// 컨텍스트를 소비하여 저장소를 반환합니다.
    pub fn into_store(self) -> EntityRecordStore {
        self.store
    }

    /// 로그 스트림 하나를 라인 순서대로 처리합니다.
    ///
    /// `file`은 에러 메시지에 쓰이는 파일 이름입니다.
    /// 시간 커서는 스트림마다 0에서 시작합니다.
    pub fn ingest_log<R: BufRead>(
        &mut self,
        mut reader: R,
        file: &str,
        resolver: &IdentityResolver,
    ) -> Result<IngestStats, CorrelatorError> {
        let mut cursor = TimeCursor::new();
        let mut stats = IngestStats::default();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|e| CorrelatorError::io(file, e))?;
            if read == 0 {
                break;
            }
            stats.lines += 1;
            let line_no = stats.lines;

            let line = String::from_utf8_lossy(&buf);
            let line = line.trim_end_matches(['\n', '\r']);

            let event = match self.classifier.classify(line) {
                Ok(Some(event)) => event,
                Ok(None) => continue,
                Err(malformed) => return Err(malformed.at(file, line_no)),
            };

            stats.events += 1;
            metrics::counter!(
                m::CORRELATOR_LINES_CLASSIFIED_TOTAL,
                m::LABEL_EVENT_KIND => event.kind().label()
            )
            .increment(1);

            self.apply(event, &mut cursor, resolver)
                .map_err(|e| e.at(file, line_no))?;
        }

        stats.ticks = cursor.now();
        Ok(stats)
    }

    fn apply(
        &mut self,
        event: LineEvent,
        cursor: &mut TimeCursor,
        resolver: &IdentityResolver,
    ) -> Result<(), StoreError> {
        match event {
            LineEvent::Path { raw_id, path } => {
                let composite_id = resolver.resolve(&raw_id);
                self.store.insert_path(composite_id, &raw_id, path)?;
            }
            LineEvent::Move { raw_id } => {
                self.store.record_move(&resolver.resolve(&raw_id))?;
            }
            LineEvent::Stop { raw_id } => {
                self.store.record_stop(&resolver.resolve(&raw_id), cursor.now())?;
            }
            LineEvent::Tick => cursor.advance(),
            LineEvent::Invalid { raw_id } => {
                self.store.record_invalid(&resolver.resolve(&raw_id))?;
            }
        }
        Ok(())
    }

    /// 파싱된 설정 문서로 레코드를 보강합니다.
    pub fn enrich(&mut self, document: &ConfigDocument, resolver: &IdentityResolver) -> EnrichStats {
        self.enricher.enrich(document, resolver, &mut self.store)
    }

    /// 파일 쌍 하나(로그 후 설정 문서)를 처리합니다.
    pub fn process_pair(&mut self, pair: &FilePair) -> Result<PairSummary, CorrelatorError> {
        let resolver = IdentityResolver::new(pair.stem.clone());
        let log_name = pair.log_path.display().to_string();

        let ingest = {
            let file = File::open(&pair.log_path).map_err(|e| CorrelatorError::io(&pair.log_path, e))?;
            self.ingest_log(BufReader::new(file), &log_name, &resolver)?
        };

        let xml = std::fs::read_to_string(&pair.config_path)
            .map_err(|e| CorrelatorError::io(&pair.config_path, e))?;
        let document =
            ConfigDocument::parse(&xml).map_err(|reason| CorrelatorError::ConfigDocument {
                file: pair.config_path.display().to_string(),
                reason,
            })?;
        let enrich = self.enrich(&document, &resolver);

        debug!(
            group = %self.key,
            stem = %pair.stem,
            lines = ingest.lines,
            events = ingest.events,
            ticks = ingest.ticks,
            patched = enrich.patched,
            skipped = enrich.skipped,
            "file pair processed"
        );

        Ok(PairSummary { ingest, enrich })
    }
}

/// 파일 쌍 하나의 처리 통계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PairSummary {
    /// 로그 처리 통계
    pub ingest: IngestStats,
    /// 보강 통계
    pub enrich: EnrichStats,
}

/// 실행 그룹 하나를 끝까지 처리합니다 (동기, 블로킹 I/O).
///
/// 파일 쌍은 인스턴스 번호 순서로 하나씩 처리되며, 어느 하나라도 실패하면
/// 그룹 전체가 실패합니다.
pub fn process_run_group(
    group: &RunGroup,
    config: &CorrelatorConfig,
) -> Result<GroupOutcome, CorrelatorError> {
    let started = Instant::now();
    let mut ctx = RunGroupContext::new(group.key.clone(), config)?;

    let mut lines = 0;
    let mut enriched = 0;
    for pair in &group.members {
        let summary = ctx.process_pair(pair)?;
        lines += summary.ingest.lines;
        enriched += summary.enrich.patched;
    }

    metrics::counter!(m::CORRELATOR_RECORDS_ENRICHED_TOTAL).increment(enriched as u64);

    let elapsed = started.elapsed();
    metrics::histogram!(m::CORRELATOR_RUN_GROUP_DURATION_SECONDS).record(elapsed.as_secs_f64());

    let store = ctx.into_store();
    info!(
        group = %group.key,
        pairs = group.members.len(),
        records = store.len(),
        elapsed_ms = elapsed.as_millis() as u64,
        "run group processed"
    );

    Ok(GroupOutcome {
        key: group.key.clone(),
        store,
        pairs: group.members.len(),
        lines,
        enriched,
        elapsed,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use roadlog_core::config::DuplicatePathPolicy;

    use super::*;

    fn key() -> RunGroupKey {
        RunGroupKey {
            nodes: "10".to_owned(),
            cars: "5".to_owned(),
            instance: None,
        }
    }

    fn context() -> RunGroupContext {
        RunGroupContext::new(key(), &CorrelatorConfig::default()).unwrap()
    }

    const LOG: &str = "\
0 [main] INFO routing - PATH: Vehicle: 3 From: 1 To: 3 Path: [1, 2, 3]
1 [main] INFO sim - SIMULATION: tick
2 [main] INFO vehicle - MOVE: Vehicle: 3 At: 1 To: 2
3 [main] INFO vehicle - STOP: Vehicle: 3 At: 3
";

    #[test]
    fn ingest_counts_hops_and_time() {
        let mut ctx = context();
        let resolver = IdentityResolver::new("10-5-0");
        let stats = ctx
            .ingest_log(Cursor::new(LOG), "10-5-0.log", &resolver)
            .unwrap();

        assert_eq!(stats.lines, 4);
        assert_eq!(stats.events, 4);
        assert_eq!(stats.ticks, 1);

        let record = ctx.store().get("310-5-0").unwrap();
        assert_eq!(record.hop_count, 1);
        assert_eq!(record.completion_time, Some(1));
    }

    #[test]
    fn move_for_unknown_entity_reports_line() {
        let mut ctx = context();
        let resolver = IdentityResolver::new("10-5-0");
        let log = "INFO - SIMULATION: tick\nINFO - MOVE: 7\n";
        let err = ctx
            .ingest_log(Cursor::new(log), "10-5-0.log", &resolver)
            .unwrap_err();
        match err {
            CorrelatorError::UnknownEntity {
                line, composite_id, ..
            } => {
                assert_eq!(line, 2);
                assert_eq!(composite_id, "710-5-0");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn stop_for_unknown_entity_reports_line() {
        let mut ctx = context();
        let resolver = IdentityResolver::new("10-5-0");
        let log = "INFO - PATH: Vehicle: 3 Path: [1, 2]\nINFO - STOP: Vehicle: 9 At: 2\n";
        let err = ctx
            .ingest_log(Cursor::new(log), "10-5-0.log", &resolver)
            .unwrap_err();
        match err {
            CorrelatorError::UnknownEntity {
                file,
                line,
                kind,
                composite_id,
            } => {
                assert_eq!(file, "10-5-0.log");
                assert_eq!(line, 2);
                assert_eq!(kind, "STOP");
                assert_eq!(composite_id, "910-5-0");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_line_reports_line() {
        let mut ctx = context();
        let resolver = IdentityResolver::new("1-1-0");
        let log = "noise\nINFO - PATH: Vehicle: 1 Path: [1, two]\n";
        let err = ctx
            .ingest_log(Cursor::new(log), "1-1-0.log", &resolver)
            .unwrap_err();
        assert!(matches!(err, CorrelatorError::LineParse { line: 2, .. }));
    }

    #[test]
    fn cursor_restarts_per_stream() {
        let mut ctx = context();
        let first = IdentityResolver::new("10-5-0");
        let second = IdentityResolver::new("10-5-1");
        let log = "INFO - PATH: Vehicle: 1 Path: [1]\n\
                   INFO - SIMULATION: tick\n\
                   INFO - SIMULATION: tick\n\
                   INFO - STOP: Vehicle: 1\n";
        ctx.ingest_log(Cursor::new(log), "a.log", &first).unwrap();
        ctx.ingest_log(Cursor::new(log), "b.log", &second).unwrap();

        assert_eq!(ctx.store().get("110-5-0").unwrap().completion_time, Some(2));
        assert_eq!(ctx.store().get("110-5-1").unwrap().completion_time, Some(2));
        assert_eq!(ctx.store().len(), 2);
    }

    #[test]
    fn crlf_line_endings_are_accepted() {
        let mut ctx = context();
        let resolver = IdentityResolver::new("1-1-0");
        let log = "INFO - PATH: Vehicle: 2 Path: [4, 5]\r\nINFO - MOVE: Vehicle: 2\r\n";
        ctx.ingest_log(Cursor::new(log), "1-1-0.log", &resolver)
            .unwrap();
        assert_eq!(ctx.store().get("21-1-0").unwrap().path, vec![4, 5]);
    }

    #[test]
    fn duplicate_path_reject_aborts_stream() {
        let config = CorrelatorConfig {
            duplicate_path: DuplicatePathPolicy::Reject,
            ..Default::default()
        };
        let mut ctx = RunGroupContext::new(key(), &config).unwrap();
        let resolver = IdentityResolver::new("1-1-0");
        let log = "PATH: Vehicle: 2 Path: [4]\nPATH: Vehicle: 2 Path: [5]\n";
        let err = ctx
            .ingest_log(Cursor::new(log), "1-1-0.log", &resolver)
            .unwrap_err();
        assert!(matches!(err, CorrelatorError::DuplicatePath { line: 2, .. }));
    }

    #[test]
    fn enrich_uses_same_resolver() {
        let mut ctx = context();
        let resolver = IdentityResolver::new("10-5-0");
        ctx.ingest_log(Cursor::new(LOG), "10-5-0.log", &resolver)
            .unwrap();
        let doc = ConfigDocument::parse(
            r#"<simulation><cars default_strategy="D"><car id="3" strategy="Shortest"/></cars></simulation>"#,
        )
        .unwrap();
        let stats = ctx.enrich(&doc, &resolver);
        assert_eq!(stats.patched, 1);
        assert_eq!(ctx.store().get("310-5-0").unwrap().strategy, "Shortest");
    }

    #[test]
    fn process_pair_missing_log_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let pair = FilePair {
            stem: "1-1-0".to_owned(),
            instance: "0".to_owned(),
            log_path: dir.path().join("1-1-0.log"),
            config_path: dir.path().join("1-1-0.xml"),
        };
        let err = context().process_pair(&pair).unwrap_err();
        assert!(matches!(err, CorrelatorError::Io { .. }));
    }

    #[test]
    fn process_pair_bad_document_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("1-1-0.log"), LOG).unwrap();
        std::fs::write(dir.path().join("1-1-0.xml"), "<simulation/>").unwrap();
        let pair = FilePair {
            stem: "1-1-0".to_owned(),
            instance: "0".to_owned(),
            log_path: dir.path().join("1-1-0.log"),
            config_path: dir.path().join("1-1-0.xml"),
        };
        let err = context().process_pair(&pair).unwrap_err();
        assert!(matches!(err, CorrelatorError::ConfigDocument { .. }));
    }

    // Property-based tests using proptest
    #[cfg(test)]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn hops_and_time_follow_stream(
                moves in prop::collection::vec(0usize..6, 1..8),
                ticks in 0u64..10,
            ) {
                let mut log = String::new();
                for id in 0..moves.len() {
                    log.push_str(&format!("INFO - PATH: Vehicle: {id} Path: [1, 2]\n"));
                }
                for _ in 0..ticks {
                    log.push_str("INFO - SIMULATION: tick\n");
                }
                for (id, count) in moves.iter().enumerate() {
                    for _ in 0..*count {
                        log.push_str(&format!("INFO - MOVE: Vehicle: {id} At: 1\n"));
                    }
                    log.push_str(&format!("INFO - STOP: Vehicle: {id} At: 2\n"));
                }

                let mut ctx = context();
                let resolver = IdentityResolver::new("3-3-0");
                ctx.ingest_log(Cursor::new(log), "3-3-0.log", &resolver).unwrap();

                prop_assert_eq!(ctx.store().len(), moves.len());
                for (id, count) in moves.iter().enumerate() {
                    let record = ctx.store().get(&resolver.resolve(&id.to_string())).unwrap();
                    prop_assert_eq!(record.hop_count, *count as u64);
                    prop_assert_eq!(record.completion_time, Some(ticks));
                }
            }
        }
    }
}
