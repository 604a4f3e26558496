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

use super::{Dialect, DialectKind, prepare_common_value};

/// Oracle. RETURNING on UPDATE requires out-binds, which the query runner contract does not
/// model, so it is reported as unsupported.
pub struct Oracle;

impl Dialect for Oracle {
    fn kind(&self) -> DialectKind {
        DialectKind::Oracle
    }

    fn placeholder(&self, index: usize) -> String {
        format!(":{}", index + 1)
    }

    fn prepare_persistent_value(&self, column: &ColumnMetadata, value: Value) -> Value {
        match value {
            Value::Bool(b) => Value::Int(b as i64),
            value => prepare_common_value(&column.column_type, value),
        }
    }

    fn native_type(&self, column_type: &ColumnType) -> String {
        match column_type {
            ColumnType::SmallInt => "number(5)".into(),
            ColumnType::Int => "number(10)".into(),
            ColumnType::BigInt => "number(19)".into(),
            ColumnType::Float | ColumnType::Double => "binary_double".into(),
            ColumnType::Numeric { precision, scale } => match (precision, scale) {
                (Some(precision), Some(scale)) => format!("number({precision}, {scale})"),
                _ => "number".into(),
            },
            ColumnType::Boolean => "number(1)".into(),
            ColumnType::Varchar { length } => format!("varchar2({})", length.unwrap_or(255)),
            ColumnType::Text
            | ColumnType::Json
            | ColumnType::SimpleArray
            | ColumnType::SimpleJson => "clob".into(),
            ColumnType::Timestamp { timezone: true } => "timestamp with time zone".into(),
            ColumnType::Timestamp { timezone: false } => "timestamp".into(),
            ColumnType::Date | ColumnType::Time => "date".into(),
            ColumnType::Uuid => "varchar2(36)".into(),
            ColumnType::Binary => "blob".into(),
            ColumnType::Geometry | ColumnType::Geography | ColumnType::Point => {
                "sdo_geometry".into()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_placeholders() {
        assert_eq!(Oracle.placeholder(0), ":1");
        assert_eq!(Oracle.placeholder(4), ":5");
        assert!(!Oracle.reuses_placeholders());
    }
}
