//! 테이블 출력기 -- 레코드를 고정 스키마 구분자 테이블로 직렬화
//!
//! 헤더는 `Nodes,Cars,Car,Hops,[Invalid,]Time,Strategy`이며
//! `Invalid` 열은 스키마가 지원할 때만 포함됩니다.
//! 필드에 구분자가 없다고 가정하므로 이스케이프하지 않습니다.
//! STOP이 없는 엔티티의 `Time`은 `0`으로 기록됩니다.
//!
//! 출력은 메모리 버퍼에 렌더링되며, 디스크 기록은 오케스트레이터가
//! 실행 그룹 성공 후에 수행합니다.

use csv::{QuoteStyle, Terminator, WriterBuilder};

use roadlog_core::types::{EntityRecord, RunGroupKey, SchemaDescriptor};

use crate::error::CorrelatorError;
use crate::store::EntityRecordStore;

/// 테이블 출력기
#[derive(Debug, Clone, Copy)]
pub struct TableEmitter {
    delimiter: u8,
    schema: SchemaDescriptor,
}

impl TableEmitter {
    /// 구분자와 스키마로 출력기를 생성합니다.
    pub fn new(delimiter: u8, schema: SchemaDescriptor) -> Self {
        Self { delimiter, schema }
    }

    /// 헤더가 기록된 빈 테이블 버퍼를 시작합니다.
    pub fn begin(&self) -> Result<TableBuffer, CorrelatorError> {
        let writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .quote_style(QuoteStyle::Never)
            .terminator(Terminator::Any(b'\n'))
            .has_headers(false)
            .from_writer(Vec::new());

        let mut buffer = TableBuffer {
            writer,
            schema: self.schema,
            rows: 0,
        };
        buffer.write_fields(self.schema.columns())?;
        Ok(buffer)
    }

    /// 실행 그룹 하나의 테이블(헤더 + 행)을 렌더링합니다.
    pub fn render(
        &self,
        key: &RunGroupKey,
        store: &EntityRecordStore,
    ) -> Result<Vec<u8>, CorrelatorError> {
        let mut buffer = self.begin()?;
        buffer.append(key, store)?;
        buffer.finish()
    }
}

/// 렌더링 중인 테이블
///
/// 헤더는 한 번만 기록되고, 여러 실행 그룹의 행을 이어 붙일 수 있습니다.
pub struct TableBuffer {
    writer: csv::Writer<Vec<u8>>,
    schema: SchemaDescriptor,
    rows: usize,
}

impl TableBuffer {
    /// 실행 그룹의 모든 레코드를 저장소 순회 순서대로 추가합니다.
    ///
    /// 추가된 행 수를 반환합니다.
    pub fn append(
        &mut self,
        key: &RunGroupKey,
        store: &EntityRecordStore,
    ) -> Result<usize, CorrelatorError> {
        let mut appended = 0;
        for record in store.iter() {
            let fields = row_fields(key, record, &self.schema);
            self.write_fields(fields.iter().map(String::as_str))?;
            appended += 1;
        }
        self.rows += appended;
        Ok(appended)
    }

    /// 지금까지 추가된 데이터 행 수 (헤더 제외)
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// 버퍼를 닫고 렌더링된 바이트를 반환합니다.
    pub fn finish(self) -> Result<Vec<u8>, CorrelatorError> {
        self.writer
            .into_inner()
            .map_err(|e| CorrelatorError::Emit(e.error().to_string()))
    }

    fn write_fields<'a>(
        &mut self,
        fields: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), CorrelatorError> {
        self.writer
            .write_record(fields)
            .map_err(|e| CorrelatorError::Emit(e.to_string()))
    }
}

fn row_fields(key: &RunGroupKey, record: &EntityRecord, schema: &SchemaDescriptor) -> Vec<String> {
    let mut fields = vec![
        key.nodes.clone(),
        key.cars.clone(),
        record.composite_id.clone(),
        record.hop_count.to_string(),
    ];
    if schema.invalid_column {
        fields.push(if record.invalid_move { "True" } else { "False" }.to_owned());
    }
    fields.push(record.completion_time.unwrap_or(0).to_string());
    fields.push(record.strategy.clone());
    fields
}
