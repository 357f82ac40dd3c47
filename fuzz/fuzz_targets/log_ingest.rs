#![no_main]

use std::io::Cursor;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use roadlog_core::types::RunGroupKey;
use roadlog_correlator::{CorrelatorConfig, IdentityResolver, RunGroupContext};

/// 퍼저용 구조적 입력: 마커가 붙은 라인 시퀀스
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    /// 라인 목록 (최대 64개로 제한)
    lines: Vec<FuzzLine>,
}

#[derive(Arbitrary, Debug)]
enum FuzzLine {
    Path { id: u8, nodes: Vec<u16> },
    Move { id: u8 },
    Stop { id: u8 },
    Invalid { id: u8 },
    Tick,
    Raw(String),
}

impl FuzzLine {
    fn render(&self) -> String {
        match self {
            Self::Path { id, nodes } => {
                let list = nodes
                    .iter()
                    .take(32)
                    .map(|n| n.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("INFO - PATH: Vehicle: {id} Path: [{list}]")
            }
            Self::Move { id } => format!("INFO - MOVE: Vehicle: {id} At: 1"),
            Self::Stop { id } => format!("INFO - STOP: Vehicle: {id} At: 2"),
            Self::Invalid { id } => format!("INFO - INVALID: Move: Vehicle: {id} At: 1 To: 9"),
            Self::Tick => "INFO - SIMULATION: tick".to_owned(),
            Self::Raw(s) => s.replace('\n', " "),
        }
    }
}

fuzz_target!(|input: FuzzInput| {
    let log = input
        .lines
        .iter()
        .take(64)
        .map(FuzzLine::render)
        .collect::<Vec<_>>()
        .join("\n");

    let key = RunGroupKey {
        nodes: "10".to_owned(),
        cars: "5".to_owned(),
        instance: None,
    };
    let config = CorrelatorConfig::default();
    let resolver = IdentityResolver::new("10-5-0");

    if let Ok(mut ctx) = RunGroupContext::new(key, &config) {
        // 스트림 일관성 에러는 정상 결과, 패닉만 없으면 됨
        let _ = ctx.ingest_log(Cursor::new(log.into_bytes()), "fuzz.log", &resolver);
    }
});
