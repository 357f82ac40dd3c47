//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()` 매크로를 호출합니다.
//! 레코더가 설치되지 않은 경우 모든 호출은 no-op입니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `roadlog_`
//! - 모듈명: `correlator_`, `path_validator_`
//! - 접미어: `_total` (counter), `_seconds` (histogram)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(roadlog_core::metrics::CORRELATOR_LINES_CLASSIFIED_TOTAL, "kind" => "move").increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 이벤트 종류 레이블 키 (path, move, stop, tick, invalid)
pub const LABEL_EVENT_KIND: &str = "kind";

/// 결과 레이블 키 (success, failure)
pub const LABEL_RESULT: &str = "result";

// ─── Correlator 메트릭 ─────────────────────────────────────────────

/// Correlator: 분류된 로그 라인 수 (counter, label: kind)
pub const CORRELATOR_LINES_CLASSIFIED_TOTAL: &str = "roadlog_correlator_lines_classified_total";

/// Correlator: 처리된 실행 그룹 수 (counter, label: result)
pub const CORRELATOR_RUN_GROUPS_TOTAL: &str = "roadlog_correlator_run_groups_total";

/// Correlator: 출력된 테이블 행 수 (counter)
pub const CORRELATOR_ROWS_EMITTED_TOTAL: &str = "roadlog_correlator_rows_emitted_total";

/// Correlator: 전략이 채워진 레코드 수 (counter)
pub const CORRELATOR_RECORDS_ENRICHED_TOTAL: &str = "roadlog_correlator_records_enriched_total";

/// Correlator: 실행 그룹 처리 소요 시간 (histogram, 초)
pub const CORRELATOR_RUN_GROUP_DURATION_SECONDS: &str =
    "roadlog_correlator_run_group_duration_seconds";

// ─── Path Validator 메트릭 ─────────────────────────────────────────

/// Path Validator: 검사한 경로 수 (counter)
pub const PATH_VALIDATOR_PATHS_SCANNED_TOTAL: &str = "roadlog_path_validator_paths_scanned_total";

/// Path Validator: 발견된 잘못된 인접 쌍 수 (counter)
pub const PATH_VALIDATOR_VIOLATIONS_TOTAL: &str = "roadlog_path_validator_violations_total";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_histogram};

    describe_counter!(
        CORRELATOR_LINES_CLASSIFIED_TOTAL,
        "Log lines classified as a simulation event, by kind"
    );
    describe_counter!(
        CORRELATOR_RUN_GROUPS_TOTAL,
        "Run-groups processed, by result"
    );
    describe_counter!(
        CORRELATOR_ROWS_EMITTED_TOTAL,
        "Table rows rendered across all run-groups"
    );
    describe_counter!(
        CORRELATOR_RECORDS_ENRICHED_TOTAL,
        "Entity records patched with a strategy from configuration"
    );
    describe_histogram!(
        CORRELATOR_RUN_GROUP_DURATION_SECONDS,
        "Time to process a single run-group in seconds"
    );

    describe_counter!(
        PATH_VALIDATOR_PATHS_SCANNED_TOTAL,
        "Paths inspected by the path validator"
    );
    describe_counter!(
        PATH_VALIDATOR_VIOLATIONS_TOTAL,
        "Invalid adjacencies reported by the path validator"
    );
}
