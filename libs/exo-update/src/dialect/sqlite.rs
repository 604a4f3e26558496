// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::{
    metadata::{column_metadata::ColumnMetadata, column_type::ColumnType},
    sql::value::Value,
};

use super::{Dialect, DialectKind, prepare_common_value, standard_native_type};

pub struct Sqlite;

impl Dialect for Sqlite {
    fn kind(&self) -> DialectKind {
        DialectKind::Sqlite
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".into()
    }

    /// SQLite has no boolean, timestamp or json storage classes
    fn prepare_persistent_value(&self, column: &ColumnMetadata, value: Value) -> Value {
        match (&column.column_type, value) {
            (ColumnType::Json, Value::Null) => Value::Null,
            (ColumnType::Json, value) => Value::Text(value.to_json().to_string()),
            (_, Value::Bool(b)) => Value::Int(b as i64),
            (_, Value::Timestamp(timestamp)) => {
                Value::Text(timestamp.format("%Y-%m-%d %H:%M:%S%.3f").to_string())
            }
            (column_type, value) => prepare_common_value(column_type, value),
        }
    }

    fn native_type(&self, column_type: &ColumnType) -> String {
        match column_type {
            ColumnType::SmallInt | ColumnType::Int | ColumnType::BigInt | ColumnType::Boolean => {
                "integer".into()
            }
            ColumnType::Float | ColumnType::Double => "real".into(),
            ColumnType::Binary => "blob".into(),
            ColumnType::Timestamp { .. } => "datetime".into(),
            ColumnType::Numeric { .. } => standard_native_type(column_type),
            _ => "text".into(),
        }
    }

    fn requires_recursive_hint(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn timestamps_are_stored_as_utc_text() {
        let updated = ColumnMetadata::new("updatedAt", "updated_at", ColumnType::Timestamp {
            timezone: false,
        });
        let timestamp = Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap();

        assert_eq!(
            Sqlite.prepare_persistent_value(&updated, Value::Timestamp(timestamp)),
            Value::from("2024-03-01 10:30:00.000")
        );
    }

    #[test]
    fn json_columns_keep_booleans() {
        let flags = ColumnMetadata::new("flags", "flags", ColumnType::Json);
        let active = ColumnMetadata::new("active", "active", ColumnType::Boolean);

        assert_eq!(
            Sqlite.prepare_persistent_value(&flags, Value::Bool(true)),
            Value::from("true")
        );
        assert_eq!(
            Sqlite.prepare_persistent_value(&active, Value::Bool(true)),
            Value::Int(1)
        );
    }
}
