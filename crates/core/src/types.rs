//! 도메인 타입: 시스템 전역에서 사용되는 공통 타입
//!
//! 상관 분석 엔진, 테이블 출력기, CLI가 공유하는 데이터 구조를 정의합니다.

use std::fmt;

use serde::{Deserialize, Serialize};

/// 엔티티 레코드
///
/// 실행 그룹 하나 안에서 시뮬레이션 에이전트(차량) 하나의 누적 상태를 나타냅니다.
///
/// [`EntityRecord::new`]는 호출마다 경로와 전략 문자열을 새로 할당하므로
/// 두 레코드가 저장 공간을 공유하는 일은 없습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// 원본 id + 실행 인스턴스 접두어 (실행 그룹 내에서 유일)
    pub composite_id: String,
    /// 로그/설정 문서에 나타나는 원본 id
    pub raw_id: String,
    /// 노드 id 순서열 (생성 시 한 번만 설정)
    pub path: Vec<u64>,
    /// MOVE 이벤트 수
    pub hop_count: u64,
    /// STOP 시점의 틱 값 (STOP 전에는 `None`)
    pub completion_time: Option<u64>,
    /// 설정 문서에서 가져온 전략 이름
    pub strategy: String,
    /// INVALID 이벤트 발생 여부
    pub invalid_move: bool,
}

impl EntityRecord {
    /// PATH 이벤트로부터 새 레코드를 생성합니다.
    pub fn new(composite_id: impl Into<String>, raw_id: impl Into<String>, path: Vec<u64>) -> Self {
        Self {
            composite_id: composite_id.into(),
            raw_id: raw_id.into(),
            path,
            hop_count: 0,
            completion_time: None,
            strategy: String::new(),
            invalid_move: false,
        }
    }
}

impl fmt::Display for EntityRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} hops={} time={} strategy={}",
            self.composite_id,
            self.hop_count,
            self.completion_time
                .map_or_else(|| "-".to_owned(), |t| t.to_string()),
            self.strategy,
        )
    }
}

/// 로그/설정 스키마 서술자
///
/// 관찰된 세 가지 스키마 변형을 하나의 서술자로 표현합니다.
///
/// - `invalid_column`: INVALID 이벤트 인식 및 `Invalid` 열 출력
/// - `group_by_instance`: 같은 `{nodes}-{cars}` 접두어의 인스턴스를 한 실행 그룹으로 묶음
/// - `default_strategy_fallback`: 에이전트별 전략이 없을 때 문서 기본 전략 사용
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaDescriptor {
    pub invalid_column: bool,
    pub group_by_instance: bool,
    pub default_strategy_fallback: bool,
}

impl SchemaDescriptor {
    /// 모든 기능이 활성화된 스키마 (기본값)
    pub const fn full() -> Self {
        Self {
            invalid_column: true,
            group_by_instance: true,
            default_strategy_fallback: true,
        }
    }

    /// INVALID 열과 기본 전략 대체가 없는 초기 스키마
    pub const fn basic() -> Self {
        Self {
            invalid_column: false,
            group_by_instance: true,
            default_strategy_fallback: false,
        }
    }

    /// 출력 테이블의 헤더 열 이름 목록
    pub fn columns(&self) -> Vec<&'static str> {
        let mut columns = vec!["Nodes", "Cars", "Car", "Hops"];
        if self.invalid_column {
            columns.push("Invalid");
        }
        columns.extend(["Time", "Strategy"]);
        columns
    }
}

impl Default for SchemaDescriptor {
    fn default() -> Self {
        Self::full()
    }
}

/// 실행 그룹 키
///
/// 파일 이름 규칙 `{nodes}-{cars}-{instance}`에서 추출합니다.
/// `instance`는 인스턴스별 그룹화가 꺼진 경우에만 채워집니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RunGroupKey {
    /// 노드 수
    pub nodes: String,
    /// 차량 수
    pub cars: String,
    /// 실행 인스턴스 (그룹화 비활성 시)
    pub instance: Option<String>,
}

impl RunGroupKey {
    /// 출력 테이블 파일 이름 (`10-5.csv`)
    pub fn table_file_name(&self) -> String {
        format!("{self}.csv")
    }
}

impl fmt::Display for RunGroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.instance {
            Some(instance) => write!(f, "{}-{}-{}", self.nodes, self.cars, instance),
            None => write!(f, "{}-{}", self.nodes, self.cars),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_has_zeroed_state() {
        let record = EntityRecord::new("310-5-0", "3", vec![1, 2, 3]);
        assert_eq!(record.hop_count, 0);
        assert_eq!(record.completion_time, None);
        assert!(record.strategy.is_empty());
        assert!(!record.invalid_move);
        assert_eq!(record.path, vec![1, 2, 3]);
    }

    #[test]
    fn records_do_not_share_storage() {
        let mut a = EntityRecord::new("1x", "1", Vec::new());
        let b = EntityRecord::new("2x", "2", Vec::new());
        a.path.push(9);
        a.strategy.push_str("Shortest");
        assert!(b.path.is_empty());
        assert!(b.strategy.is_empty());
    }

    #[test]
    fn full_schema_columns() {
        assert_eq!(
            SchemaDescriptor::full().columns(),
            vec!["Nodes", "Cars", "Car", "Hops", "Invalid", "Time", "Strategy"]
        );
    }

    #[test]
    fn basic_schema_has_no_invalid_column() {
        let columns = SchemaDescriptor::basic().columns();
        assert!(!columns.contains(&"Invalid"));
        assert_eq!(columns.len(), 6);
    }

    #[test]
    fn run_group_key_display() {
        let grouped = RunGroupKey {
            nodes: "100".to_owned(),
            cars: "20".to_owned(),
            instance: None,
        };
        assert_eq!(grouped.to_string(), "100-20");
        assert_eq!(grouped.table_file_name(), "100-20.csv");

        let single = RunGroupKey {
            instance: Some("3".to_owned()),
            ..grouped
        };
        assert_eq!(single.to_string(), "100-20-3");
    }

    #[test]
    fn schema_deserializes_partial() {
        let schema: SchemaDescriptor = toml::from_str("invalid_column = false").unwrap();
        assert!(!schema.invalid_column);
        assert!(schema.group_by_instance);
        assert!(schema.default_strategy_fallback);
    }
}
