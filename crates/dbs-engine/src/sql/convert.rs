//! PostgreSQL value projection.
//!
//! Converts `PgRow`s into [`Record`]s keyed by column name, dispatching on the
//! column's type name.

use crate::record::Record;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::postgres::types::{Oid, PgTimeTz};
use sqlx::postgres::PgRow;
use sqlx::{Column, Decode, Postgres, Row, Type, TypeInfo, ValueRef};
use uuid::Uuid;

/// How a column is decoded, chosen from its Postgres type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoder {
    Bool,
    Int2,
    Int4,
    Int8,
    Float4,
    Float8,
    Numeric,
    Text,
    Bytea,
    Date,
    Time,
    TimeTz,
    Timestamp,
    TimestampTz,
    Uuid,
    Json,
    Oid,
    Int4Array,
    Int8Array,
    TextArray,
    BoolArray,
    Float8Array,
    /// Checked text decode; anything without a text wire type becomes null.
    Fallback,
}

pub fn decoder_for(type_name: &str) -> Decoder {
    match type_name {
        "BOOL" => Decoder::Bool,
        "INT2" => Decoder::Int2,
        "INT4" => Decoder::Int4,
        "INT8" => Decoder::Int8,
        "FLOAT4" => Decoder::Float4,
        "FLOAT8" => Decoder::Float8,
        "NUMERIC" => Decoder::Numeric,
        "TEXT" | "VARCHAR" | "CHAR" | "BPCHAR" | "NAME" | "CITEXT" => Decoder::Text,
        "BYTEA" => Decoder::Bytea,
        "DATE" => Decoder::Date,
        "TIME" => Decoder::Time,
        "TIMETZ" => Decoder::TimeTz,
        "TIMESTAMP" => Decoder::Timestamp,
        "TIMESTAMPTZ" => Decoder::TimestampTz,
        "UUID" => Decoder::Uuid,
        "JSON" | "JSONB" => Decoder::Json,
        "OID" => Decoder::Oid,
        "_INT4" | "INT4[]" => Decoder::Int4Array,
        "_INT8" | "INT8[]" => Decoder::Int8Array,
        "_TEXT" | "TEXT[]" | "_VARCHAR" | "VARCHAR[]" | "_BPCHAR" | "_NAME" => Decoder::TextArray,
        "_BOOL" | "BOOL[]" => Decoder::BoolArray,
        "_FLOAT8" | "FLOAT8[]" => Decoder::Float8Array,
        _ => Decoder::Fallback,
    }
}

/// Projects every column of `row`, preserving column order.
pub fn row_to_record(row: &PgRow) -> Record {
    row.columns()
        .iter()
        .map(|col| {
            let value = extract_value(row, col.ordinal(), col.type_info().name());
            (col.name().to_string(), value)
        })
        .collect()
}

fn extract_value(row: &PgRow, index: usize, type_name: &str) -> Value {
    match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Err(_) => return Value::Null,
        _ => {}
    }
    decode(row, index, decoder_for(type_name))
}

fn get<'r, T, F>(row: &'r PgRow, index: usize, to_json: F) -> Value
where
    T: Decode<'r, Postgres> + Type<Postgres>,
    F: FnOnce(T) -> Value,
{
    row.try_get::<T, _>(index).map(to_json).unwrap_or(Value::Null)
}

fn array<'r, T>(row: &'r PgRow, index: usize) -> Value
where
    T: Into<Value>,
    Vec<T>: Decode<'r, Postgres> + Type<Postgres>,
{
    get::<Vec<T>, _>(row, index, |items| {
        Value::Array(items.into_iter().map(Into::into).collect())
    })
}

fn display<T: ToString>(value: T) -> Value {
    Value::String(value.to_string())
}

fn decode(row: &PgRow, index: usize, decoder: Decoder) -> Value {
    match decoder {
        Decoder::Bool => get::<bool, _>(row, index, Value::Bool),
        Decoder::Int2 => get::<i16, _>(row, index, Value::from),
        Decoder::Int4 => get::<i32, _>(row, index, Value::from),
        Decoder::Int8 => get::<i64, _>(row, index, Value::from),
        Decoder::Float4 => get::<f32, _>(row, index, |v| Value::from(f64::from(v))),
        Decoder::Float8 => get::<f64, _>(row, index, Value::from),
        // Kept as a string so no precision is lost.
        Decoder::Numeric => get::<Decimal, _>(row, index, display),
        Decoder::Text => get::<String, _>(row, index, Value::String),
        Decoder::Bytea => get::<Vec<u8>, _>(row, index, |v| {
            Value::String(format!("\\x{}", hex::encode(v)))
        }),
        Decoder::Date => get::<NaiveDate, _>(row, index, display),
        Decoder::Time => get::<NaiveTime, _>(row, index, display),
        Decoder::TimeTz => get::<PgTimeTz<NaiveTime, FixedOffset>, _>(row, index, |v| {
            Value::String(format!("{}{}", v.time, v.offset))
        }),
        Decoder::Timestamp => get::<NaiveDateTime, _>(row, index, |v| {
            Value::String(v.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
        }),
        Decoder::TimestampTz => {
            get::<DateTime<Utc>, _>(row, index, |v| Value::String(v.to_rfc3339()))
        }
        Decoder::Uuid => get::<Uuid, _>(row, index, display),
        Decoder::Json => get::<Value, _>(row, index, |v| v),
        Decoder::Oid => get::<Oid, _>(row, index, |v| Value::from(v.0)),
        Decoder::Int4Array => array::<i32>(row, index),
        Decoder::Int8Array => array::<i64>(row, index),
        Decoder::TextArray => array::<String>(row, index),
        Decoder::BoolArray => array::<bool>(row, index),
        Decoder::Float8Array => array::<f64>(row, index),
        // Enums and unknown types: the checked decode rejects non-text wire types.
        Decoder::Fallback => get::<String, _>(row, index, Value::String),
    }
}
