//! 시간 커서 -- 틱 라인 수를 세는 단조 증가 카운터
//!
//! STOP 이벤트는 읽은 시점의 *현재* 값을 완료 시간으로 기록하므로
//! 스트림 하나는 반드시 파일 순서대로 처리되어야 합니다.

/// 로그 스트림 하나의 시뮬레이션 시계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeCursor {
    ticks: u64,
}

impl TimeCursor {
    /// 0에서 시작하는 커서를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 틱 하나만큼 전진합니다.
    pub fn advance(&mut self) {
        self.ticks = self.ticks.saturating_add(1);
    }

    /// 현재 틱 값
    pub fn now(&self) -> u64 {
        self.ticks
    }
}
