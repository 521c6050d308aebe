use crate::error::DbsError;
use futures::stream::BoxStream;
use futures::TryStreamExt;

/// One result row: column (or return alias) name to value.
///
/// PostgreSQL records keep column order. Neo4j rows carry no key order, so theirs is arbitrary.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Lazily produced, finite sequence of records. Dropping it cancels the underlying query.
pub type RecordStream = BoxStream<'static, Result<Record, DbsError>>;

/// Drains a record stream. Stops at the first error.
pub async fn collect_records(stream: RecordStream) -> Result<Vec<Record>, DbsError> {
    stream.try_collect().await
}

/// Builds a single-entry record.
pub fn message_record(message: &str) -> Record {
    let mut record = Record::new();
    record.insert(
        "message".to_string(),
        serde_json::Value::String(message.to_string()),
    );
    record
}
