//! 메타데이터 보강기 -- 시뮬레이션 설정 문서로 레코드의 전략을 채움
//!
//! 설정 문서(XML)의 `cars` 요소에서 에이전트 목록과 기본 전략을 읽고,
//! 각 에이전트의 복합 id를 로그 수집과 같은 [`IdentityResolver`]로 계산합니다.
//! 일치하는 레코드가 이미 있을 때만 `strategy`를 기록하며,
//! 에이전트별 지정 전략이 문서 기본 전략보다 우선합니다.
//!
//! # 문서 형식
//! ```xml
//! <simulation>
//!   <cars default_strategy="adasim.algorithm.routing.ShortestPathRoutingAlgorithm">
//!     <car id="3" start="1" end="9" strategy="adasim.algorithm.routing.TrafficLookaheadRoutingAlgorithm"/>
//!     <car id="4" start="2" end="7"/>
//!   </cars>
//! </simulation>
//! ```

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;

use crate::identity::IdentityResolver;
use crate::store::EntityRecordStore;

/// 에이전트 목록 요소
const CARS_TAG: &[u8] = b"cars";
/// 에이전트 요소
const CAR_TAG: &[u8] = b"car";

/// 설정 문서에 선언된 에이전트 하나
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentDeclaration {
    /// 원본 id
    pub raw_id: String,
    /// 에이전트별 지정 전략
    pub strategy: Option<String>,
}

/// 파싱된 시뮬레이션 설정 문서
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDocument {
    /// 첫 번째 `cars` 요소의 `default_strategy` 속성
    pub default_strategy: Option<String>,
    /// 선언된 에이전트 (문서 순서)
    pub agents: Vec<AgentDeclaration>,
}

impl ConfigDocument {
    /// XML 문자열을 파싱합니다.
    ///
    /// `cars` 요소가 없거나, XML이 깨졌거나, `id` 없는 `car`가 있으면
    /// 실패 사유 문자열을 반환합니다.
    pub fn parse(xml: &str) -> Result<Self, String> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut document = Self::default();
        let mut found_cars = false;
        let mut cars_depth = 0usize;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    if e.name().as_ref() == CARS_TAG && cars_depth == 0 {
                        if !found_cars {
                            document.default_strategy = attribute(&e, "default_strategy")?;
                        }
                        found_cars = true;
                        cars_depth = 1;
                    } else if cars_depth > 0 {
                        if e.name().as_ref() == CAR_TAG {
                            document.agents.push(agent(&e)?);
                        }
                        cars_depth += 1;
                    }
                }
                Ok(Event::Empty(e)) => {
                    if e.name().as_ref() == CARS_TAG && cars_depth == 0 {
                        if !found_cars {
                            document.default_strategy = attribute(&e, "default_strategy")?;
                        }
                        found_cars = true;
                    } else if cars_depth > 0 && e.name().as_ref() == CAR_TAG {
                        document.agents.push(agent(&e)?);
                    }
                }
                Ok(Event::End(_)) => {
                    cars_depth = cars_depth.saturating_sub(1);
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(format!(
                        "malformed XML at byte {}: {e}",
                        reader.buffer_position()
                    ));
                }
                Ok(_) => {}
            }
        }

        if !found_cars {
            return Err("missing 'cars' element".to_owned());
        }

        Ok(document)
    }
}

/// 보강 결과 통계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichStats {
    /// 전략이 기록된 레코드 수
    pub patched: usize,
    /// 일치하는 레코드가 없어 건너뛴 에이전트 수
    pub skipped: usize,
}

/// 메타데이터 보강기
#[derive(Debug, Clone, Copy)]
pub struct MetadataEnricher {
    default_strategy_fallback: bool,
}

impl MetadataEnricher {
    /// 보강기를 생성합니다.
    ///
    /// `default_strategy_fallback`이 꺼져 있으면 에이전트별 지정 전략만 기록합니다.
    pub fn new(default_strategy_fallback: bool) -> Self {
        Self {
            default_strategy_fallback,
        }
    }

    /// 문서의 에이전트 정보로 저장소 레코드를 보강합니다.
    ///
    /// 같은 입력으로 여러 번 호출해도 결과가 같습니다.
    pub fn enrich(
        &self,
        document: &ConfigDocument,
        resolver: &IdentityResolver,
        store: &mut EntityRecordStore,
    ) -> EnrichStats {
        let mut stats = EnrichStats::default();

        for agent in &document.agents {
            let composite_id = resolver.resolve(&agent.raw_id);
            let Some(record) = store.get_mut(&composite_id) else {
                // 출발하지 않은 에이전트
                stats.skipped += 1;
                continue;
            };

            let strategy = agent.strategy.as_ref().or(if self.default_strategy_fallback {
                document.default_strategy.as_ref()
            } else {
                None
            });

            if let Some(strategy) = strategy {
                record.strategy.clone_from(strategy);
                stats.patched += 1;
            }
        }

        debug!(
            stem = resolver.stem(),
            patched = stats.patched,
            skipped = stats.skipped,
            "records enriched from config document"
        );

        stats
    }
}

fn agent(e: &BytesStart<'_>) -> Result<AgentDeclaration, String> {
    let raw_id = attribute(e, "id")?.ok_or_else(|| "'car' element without 'id'".to_owned())?;
    let strategy = attribute(e, "strategy")?;
    Ok(AgentDeclaration { raw_id, strategy })
}

fn attribute(e: &BytesStart<'_>, key: &str) -> Result<Option<String>, String> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| format!("malformed attribute: {err}"))?;
        if attr.key.as_ref() == key.as_bytes() {
            let value = attr
                .unescape_value()
                .map_err(|err| format!("malformed attribute '{key}': {err}"))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}
