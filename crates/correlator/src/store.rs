//! 엔티티 레코드 저장소 -- 복합 id -> 레코드 매핑
//!
//! 실행 그룹 하나의 로그 스트림들로부터 점진적으로 구축됩니다.
//! `BTreeMap`을 사용하므로 순회 순서(= 출력 행 순서)는 복합 id 오름차순입니다.
//!
//! # 이벤트별 동작
//! - PATH: 레코드 생성 (중복은 [`DuplicatePathPolicy`]에 따름)
//! - MOVE: `hop_count` 1 증가
//! - STOP: `completion_time` 기록 (반복 시 마지막 값 유지)
//! - INVALID: `invalid_move` 설정
//!
//! 존재하지 않는 복합 id를 참조하는 MOVE/STOP/INVALID는 치명적 에러입니다.

use std::collections::BTreeMap;

use roadlog_core::config::DuplicatePathPolicy;
use roadlog_core::types::EntityRecord;

use crate::classifier::EventKind;
use crate::error::CorrelatorError;

/// PATH 이벤트 적용 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathOutcome {
    /// 새 레코드 생성
    Created,
    /// 기존 레코드를 새 레코드로 교체 (`overwrite`)
    Replaced,
    /// 기존 레코드 유지 (`merge`)
    Kept,
}

/// 저장소 조작 실패
///
/// 파일 위치는 호출자가 [`StoreError::at`]으로 붙입니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// PATH 없이 참조된 복합 id
    UnknownEntity {
        kind: EventKind,
        composite_id: String,
    },
    /// `reject` 정책에서의 중복 PATH
    DuplicatePath { composite_id: String },
}

impl StoreError {
    /// 파일 위치를 붙여 도메인 에러로 변환합니다.
    pub fn at(self, file: impl Into<String>, line: usize) -> CorrelatorError {
        match self {
            Self::UnknownEntity { kind, composite_id } => CorrelatorError::UnknownEntity {
                file: file.into(),
                line,
                kind: kind.as_str(),
                composite_id,
            },
            Self::DuplicatePath { composite_id } => CorrelatorError::DuplicatePath {
                file: file.into(),
                line,
                composite_id,
            },
        }
    }
}

/// 엔티티 레코드 저장소
#[derive(Debug, Clone, Default)]
pub struct EntityRecordStore {
    records: BTreeMap<String, EntityRecord>,
    policy: DuplicatePathPolicy,
}

impl EntityRecordStore {
    /// 중복 PATH 정책을 지정하여 빈 저장소를 생성합니다.
    pub fn new(policy: DuplicatePathPolicy) -> Self {
        Self {
            records: BTreeMap::new(),
            policy,
        }
    }

    /// PATH 이벤트를 적용합니다.
    pub fn insert_path(
        &mut self,
        composite_id: String,
        raw_id: &str,
        path: Vec<u64>,
    ) -> Result<PathOutcome, StoreError> {
        if self.records.contains_key(&composite_id) {
            return match self.policy {
                DuplicatePathPolicy::Overwrite => {
                    let record = EntityRecord::new(composite_id.clone(), raw_id, path);
                    self.records.insert(composite_id, record);
                    Ok(PathOutcome::Replaced)
                }
                DuplicatePathPolicy::Merge => Ok(PathOutcome::Kept),
                DuplicatePathPolicy::Reject => Err(StoreError::DuplicatePath { composite_id }),
            };
        }

        let record = EntityRecord::new(composite_id.clone(), raw_id, path);
        self.records.insert(composite_id, record);
        Ok(PathOutcome::Created)
    }

    /// MOVE 이벤트를 적용합니다.
    pub fn record_move(&mut self, composite_id: &str) -> Result<(), StoreError> {
        let record = self.lookup(EventKind::Move, composite_id)?;
        record.hop_count = record.hop_count.saturating_add(1);
        Ok(())
    }

    /// STOP 이벤트를 적용합니다. 반복되면 마지막 값이 남습니다.
    pub fn record_stop(&mut self, composite_id: &str, now: u64) -> Result<(), StoreError> {
        let record = self.lookup(EventKind::Stop, composite_id)?;
        record.completion_time = Some(now);
        Ok(())
    }

    /// INVALID 이벤트를 적용합니다.
    pub fn record_invalid(&mut self, composite_id: &str) -> Result<(), StoreError> {
        let record = self.lookup(EventKind::Invalid, composite_id)?;
        record.invalid_move = true;
        Ok(())
    }

    /// 복합 id로 레코드를 조회합니다.
    pub fn get(&self, composite_id: &str) -> Option<&EntityRecord> {
        self.records.get(composite_id)
    }

    /// 복합 id로 가변 레코드를 조회합니다.
    pub fn get_mut(&mut self, composite_id: &str) -> Option<&mut EntityRecord> {
        self.records.get_mut(composite_id)
    }

    /// 복합 id 오름차순으로 레코드를 순회합니다.
    pub fn iter(&self) -> impl Iterator<Item = &EntityRecord> {
        self.records.values()
    }

    /// 레코드 수
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// 비어 있는지 여부
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn lookup(
        &mut self,
        kind: EventKind,
        composite_id: &str,
    ) -> Result<&mut EntityRecord, StoreError> {
        self.records
            .get_mut(composite_id)
            .ok_or_else(|| StoreError::UnknownEntity {
                kind,
                composite_id: composite_id.to_owned(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(policy: DuplicatePathPolicy) -> EntityRecordStore {
        let mut store = EntityRecordStore::new(policy);
        store
            .insert_path("3a".to_owned(), "3", vec![1, 2, 3])
            .unwrap();
        store
    }

    #[test]
    fn path_creates_record() {
        let store = store_with(DuplicatePathPolicy::Overwrite);
        let record = store.get("3a").unwrap();
        assert_eq!(record.raw_id, "3");
        assert_eq!(record.path, vec![1, 2, 3]);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn move_increments_hop_count() {
        let mut store = store_with(DuplicatePathPolicy::Overwrite);
        store.record_move("3a").unwrap();
        store.record_move("3a").unwrap();
        assert_eq!(store.get("3a").unwrap().hop_count, 2);
    }

    #[test]
    fn move_on_unknown_entity_fails() {
        let mut store = store_with(DuplicatePathPolicy::Overwrite);
        let err = store.record_move("7a").unwrap_err();
        assert_eq!(
            err,
            StoreError::UnknownEntity {
                kind: EventKind::Move,
                composite_id: "7a".to_owned(),
            }
        );
    }

    #[test]
    fn stop_on_unknown_entity_fails() {
        let mut store = store_with(DuplicatePathPolicy::Overwrite);
        let err = store.record_stop("9a", 3).unwrap_err();
        assert_eq!(
            err,
            StoreError::UnknownEntity {
                kind: EventKind::Stop,
                composite_id: "9a".to_owned(),
            }
        );
        assert!(store.get("9a").is_none());
    }

    #[test]
    fn repeated_stop_is_last_write_wins() {
        let mut store = store_with(DuplicatePathPolicy::Overwrite);
        store.record_stop("3a", 4).unwrap();
        store.record_stop("3a", 9).unwrap();
        assert_eq!(store.get("3a").unwrap().completion_time, Some(9));
    }

    #[test]
    fn invalid_sets_flag() {
        let mut store = store_with(DuplicatePathPolicy::Overwrite);
        store.record_invalid("3a").unwrap();
        assert!(store.get("3a").unwrap().invalid_move);
        assert!(store.record_invalid("nope").is_err());
    }

    #[test]
    fn duplicate_path_overwrite_resets_record() {
        let mut store = store_with(DuplicatePathPolicy::Overwrite);
        store.record_move("3a").unwrap();
        let outcome = store.insert_path("3a".to_owned(), "3", vec![5]).unwrap();
        assert_eq!(outcome, PathOutcome::Replaced);
        let record = store.get("3a").unwrap();
        assert_eq!(record.hop_count, 0);
        assert_eq!(record.path, vec![5]);
    }

    #[test]
    fn duplicate_path_merge_keeps_first_record() {
        let mut store = store_with(DuplicatePathPolicy::Merge);
        store.record_move("3a").unwrap();
        let outcome = store.insert_path("3a".to_owned(), "3", vec![5]).unwrap();
        assert_eq!(outcome, PathOutcome::Kept);
        let record = store.get("3a").unwrap();
        assert_eq!(record.hop_count, 1);
        assert_eq!(record.path, vec![1, 2, 3]);
    }

    #[test]
    fn duplicate_path_reject_fails() {
        let mut store = store_with(DuplicatePathPolicy::Reject);
        let err = store.insert_path("3a".to_owned(), "3", vec![5]).unwrap_err();
        assert!(matches!(err, StoreError::DuplicatePath { .. }));
        let located = err.at("10-5-0.log", 8);
        assert!(located.to_string().contains("10-5-0.log:8"));
    }

    #[test]
    fn iteration_is_ascending_by_composite_id() {
        let mut store = EntityRecordStore::new(DuplicatePathPolicy::Overwrite);
        for id in ["9x", "10x", "1x"] {
            store.insert_path(id.to_owned(), "0", Vec::new()).unwrap();
        }
        let ids: Vec<&str> = store.iter().map(|r| r.composite_id.as_str()).collect();
        assert_eq!(ids, vec!["10x", "1x", "9x"]);
    }
}
