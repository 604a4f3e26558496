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

use super::{Dialect, DialectKind, MutationKind, ReturningSyntax, prepare_common_value};

/// MySQL and MariaDB. They differ only in MariaDB's support for RETURNING, which does not extend
/// to UPDATE statements.
pub struct MySql {
    mariadb: bool,
    /// Use the pre-5.7 geometry constructor names (`GeomFromText` rather than `ST_GeomFromText`)
    legacy_spatial_support: bool,
}

impl MySql {
    pub fn mysql(legacy_spatial_support: bool) -> Self {
        Self {
            mariadb: false,
            legacy_spatial_support,
        }
    }

    pub fn mariadb(legacy_spatial_support: bool) -> Self {
        Self {
            mariadb: true,
            legacy_spatial_support,
        }
    }
}

impl Dialect for MySql {
    fn kind(&self) -> DialectKind {
        if self.mariadb {
            DialectKind::MariaDb
        } else {
            DialectKind::MySql
        }
    }

    fn escape(&self, identifier: &str) -> String {
        format!("`{}`", identifier.replace('`', "``"))
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".into()
    }

    fn returning_syntax(&self) -> Option<ReturningSyntax> {
        self.mariadb.then_some(ReturningSyntax::Returning)
    }

    fn supports_returning(&self, kind: MutationKind) -> bool {
        self.mariadb && matches!(kind, MutationKind::Insert | MutationKind::Delete)
    }

    fn supports_limit_on_update(&self) -> bool {
        true
    }

    fn spatial_literal(&self, column: &ColumnMetadata, placeholder: &str) -> Option<String> {
        if !column.column_type.is_spatial() {
            return None;
        }

        let constructor = if self.legacy_spatial_support {
            "GeomFromText"
        } else {
            "ST_GeomFromText"
        };

        Some(match column.srid {
            Some(srid) => format!("{constructor}({placeholder}, {srid})"),
            None => format!("{constructor}({placeholder})"),
        })
    }

    fn prepare_persistent_value(&self, column: &ColumnMetadata, value: Value) -> Value {
        match (&column.column_type, value) {
            (ColumnType::Json, Value::Null) => Value::Null,
            (ColumnType::Json, value) => Value::Text(value.to_json().to_string()),
            (_, Value::Bool(b)) => Value::Int(b as i64),
            (column_type, value) => prepare_common_value(column_type, value),
        }
    }

    fn native_type(&self, column_type: &ColumnType) -> String {
        match column_type {
            ColumnType::SmallInt => "smallint".into(),
            ColumnType::Int => "int".into(),
            ColumnType::BigInt => "bigint".into(),
            ColumnType::Float => "float".into(),
            ColumnType::Double => "double".into(),
            ColumnType::Numeric { precision, scale } => format!(
                "decimal({}, {})",
                precision.unwrap_or(10),
                scale.unwrap_or(0)
            ),
            ColumnType::Boolean => "tinyint".into(),
            ColumnType::Varchar { length } => format!("varchar({})", length.unwrap_or(255)),
            ColumnType::Text | ColumnType::SimpleArray | ColumnType::SimpleJson => "text".into(),
            ColumnType::Timestamp { .. } => "datetime(6)".into(),
            ColumnType::Date => "date".into(),
            ColumnType::Time => "time".into(),
            ColumnType::Json => "json".into(),
            ColumnType::Uuid => "varchar(36)".into(),
            ColumnType::Binary => "blob".into(),
            ColumnType::Geometry | ColumnType::Geography => "geometry".into(),
            ColumnType::Point => "point".into(),
        }
    }

    fn requires_recursive_hint(&self) -> bool {
        true
    }
}
