//! 식별자 해석기 -- 실행 간 충돌 없는 복합 id 생성
//!
//! 원본 id는 파일 쌍 하나 안에서만 유일하므로, 여러 실행 인스턴스를 한
//! 실행 그룹으로 묶을 때 파일 쌍 접두어를 이어 붙여 복합 id를 만듭니다.
//! 로그 수집과 설정 문서 보강이 같은 [`IdentityResolver`]를 공유해야
//! 조회가 일치합니다.

/// 복합 id 생성기
///
/// `composite_id = raw_id ++ stem` (구분자 없음).
/// 예: 원본 id `3`, 파일 `10-5-0.log` -> `310-5-0`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityResolver {
    stem: String,
}

impl IdentityResolver {
    /// 파일 쌍 접두어(`{nodes}-{cars}-{instance}`)로 생성합니다.
    pub fn new(stem: impl Into<String>) -> Self {
        Self { stem: stem.into() }
    }

    /// 실행 인스턴스 접두어
    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// 원본 id에 접두어를 붙여 복합 id를 만듭니다.
    pub fn resolve(&self, raw_id: &str) -> String {
        let mut composite = String::with_capacity(raw_id.len() + self.stem.len());
        composite.push_str(raw_id);
        composite.push_str(&self.stem);
        composite
    }
}
