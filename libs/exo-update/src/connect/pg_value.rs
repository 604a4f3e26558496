// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Binding [`Value`]s to Postgres parameters and reading them back from rows.

use std::error::Error;

use bytes::{Bytes, BytesMut};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tokio_postgres::types::{FromSql, IsNull, Kind, ToSql, Type, to_sql_checked};
use uuid::Uuid;

use crate::sql::value::Value;

type BoxedError = Box<dyn Error + Sync + Send>;

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxedError> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(b) => b.to_sql(ty, out),
            Value::Int(i) => match *ty {
                Type::INT2 => i16::try_from(*i)?.to_sql(ty, out),
                Type::INT4 => i32::try_from(*i)?.to_sql(ty, out),
                Type::FLOAT4 => (*i as f32).to_sql(ty, out),
                Type::FLOAT8 => (*i as f64).to_sql(ty, out),
                _ => i.to_sql(ty, out),
            },
            Value::Float(f) => match *ty {
                Type::FLOAT4 => (*f as f32).to_sql(ty, out),
                _ => f.to_sql(ty, out),
            },
            Value::Text(s) => s.as_str().to_sql(ty, out),
            Value::Bytes(bytes) => {
                let bytes: &[u8] = bytes.as_ref();
                bytes.to_sql(ty, out)
            }
            Value::Timestamp(ts) => match *ty {
                Type::TIMESTAMP => ts.naive_utc().to_sql(ty, out),
                _ => ts.to_sql(ty, out),
            },
            Value::Date(date) => date.to_sql(ty, out),
            Value::Uuid(uuid) => uuid.to_sql(ty, out),
            Value::Json(json) => json.to_sql(ty, out),
            Value::Object(_) => self.to_json().to_sql(ty, out),
            Value::Array(values) => match ty.kind() {
                Kind::Array(_) => values.as_slice().to_sql(ty, out),
                _ => self.to_json().to_sql(ty, out),
            },
            Value::Typed { value, .. } => value.to_sql(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

impl FromSql<'_> for Value {
    fn from_sql(ty: &Type, raw: &[u8]) -> Result<Self, BoxedError> {
        if let Kind::Array(_) = ty.kind() {
            return Ok(Value::Array(Vec::<Value>::from_sql(ty, raw)?));
        }

        let value = match *ty {
            Type::BOOL => Value::Bool(bool::from_sql(ty, raw)?),
            Type::INT2 => Value::Int(i16::from_sql(ty, raw)?.into()),
            Type::INT4 => Value::Int(i32::from_sql(ty, raw)?.into()),
            Type::INT8 => Value::Int(i64::from_sql(ty, raw)?),
            Type::FLOAT4 => Value::Float(f32::from_sql(ty, raw)?.into()),
            Type::FLOAT8 => Value::Float(f64::from_sql(ty, raw)?),
            Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => {
                Value::Text(String::from_sql(ty, raw)?)
            }
            Type::BYTEA => Value::Bytes(Bytes::copy_from_slice(<&[u8]>::from_sql(ty, raw)?)),
            Type::TIMESTAMPTZ => Value::Timestamp(DateTime::<Utc>::from_sql(ty, raw)?),
            Type::TIMESTAMP => Value::Timestamp(NaiveDateTime::from_sql(ty, raw)?.and_utc()),
            Type::DATE => Value::Date(NaiveDate::from_sql(ty, raw)?),
            Type::UUID => Value::Uuid(Uuid::from_sql(ty, raw)?),
            Type::JSON | Type::JSONB => Value::Json(serde_json::Value::from_sql(ty, raw)?),
            _ => return Err(format!("Unsupported column type {ty}").into()),
        };

        Ok(value)
    }

    fn from_sql_null(_ty: &Type) -> Result<Self, BoxedError> {
        Ok(Value::Null)
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(value: &Value, ty: &Type) -> (IsNull, BytesMut) {
        let mut out = BytesMut::new();
        let is_null = value.to_sql(ty, &mut out).unwrap();
        (is_null, out)
    }

    #[test]
    fn integers_follow_column_width() {
        let (_, out) = encode(&Value::Int(7), &Type::INT4);
        assert_eq!(i32::from_sql(&Type::INT4, &out).unwrap(), 7);

        let (_, out) = encode(&Value::Int(7), &Type::INT8);
        assert_eq!(i64::from_sql(&Type::INT8, &out).unwrap(), 7);

        let mut out = BytesMut::new();
        assert!(Value::Int(i64::MAX).to_sql(&Type::INT2, &mut out).is_err());
    }

    #[test]
    fn null_and_typed_values() {
        let (is_null, _) = encode(&Value::Null, &Type::TEXT);
        assert!(matches!(is_null, IsNull::Yes));

        let typed = Value::Typed {
            native_type: "text".into(),
            value: Box::new(Value::from("Ana")),
        };
        let (_, out) = encode(&typed, &Type::TEXT);
        assert_eq!(String::from_sql(&Type::TEXT, &out).unwrap(), "Ana");
    }

    #[test]
    fn reads_scalars_back() {
        let (_, out) = encode(&Value::from("Ana"), &Type::VARCHAR);
        assert_eq!(
            Value::from_sql(&Type::VARCHAR, &out).unwrap(),
            Value::from("Ana")
        );

        let (_, out) = encode(&Value::Int(3), &Type::INT2);
        assert_eq!(Value::from_sql(&Type::INT2, &out).unwrap(), Value::Int(3));

        assert_eq!(Value::from_sql_null(&Type::INT4).unwrap(), Value::Null);
    }
}
