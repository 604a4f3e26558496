// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Per-database rules consulted while compiling an update.
//!
//! Each supported database has one [`Dialect`] implementation. The compiler queries it for
//! everything that differs between databases (identifier quoting, placeholders, RETURNING/OUTPUT,
//! LIMIT, NULL assignment and spatial literals), so no other part of the crate branches on the
//! database kind.

use std::{fmt::Display, str::FromStr, sync::Arc};

use crate::{
    metadata::{column_metadata::ColumnMetadata, column_type::ColumnType},
    sql::value::Value,
};

mod mssql;
mod mysql;
mod oracle;
mod postgres;
mod sap;
mod sqlite;

pub use mssql::SqlServer;
pub use mysql::MySql;
pub use oracle::Oracle;
pub use postgres::Postgres;
pub use sap::Sap;
pub use sqlite::Sqlite;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialectKind {
    Postgres,
    MySql,
    MariaDb,
    SqlServer,
    Sqlite,
    Oracle,
    Sap,
}

impl DialectKind {
    /// Create the dialect strategy for this kind. `legacy_spatial_support` only affects the MySQL
    /// family, which has renamed its geometry constructors.
    pub fn dialect(self, legacy_spatial_support: bool) -> Arc<dyn Dialect> {
        match self {
            DialectKind::Postgres => Arc::new(Postgres),
            DialectKind::MySql => Arc::new(MySql::mysql(legacy_spatial_support)),
            DialectKind::MariaDb => Arc::new(MySql::mariadb(legacy_spatial_support)),
            DialectKind::SqlServer => Arc::new(SqlServer),
            DialectKind::Sqlite => Arc::new(Sqlite),
            DialectKind::Oracle => Arc::new(Oracle),
            DialectKind::Sap => Arc::new(Sap),
        }
    }
}

impl Display for DialectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DialectKind::Postgres => "postgres",
            DialectKind::MySql => "mysql",
            DialectKind::MariaDb => "mariadb",
            DialectKind::SqlServer => "mssql",
            DialectKind::Sqlite => "sqlite",
            DialectKind::Oracle => "oracle",
            DialectKind::Sap => "sap",
        };
        f.write_str(name)
    }
}

impl FromStr for DialectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(DialectKind::Postgres),
            "mysql" => Ok(DialectKind::MySql),
            "mariadb" => Ok(DialectKind::MariaDb),
            "mssql" | "sqlserver" => Ok(DialectKind::SqlServer),
            "sqlite" => Ok(DialectKind::Sqlite),
            "oracle" => Ok(DialectKind::Oracle),
            "sap" | "hana" => Ok(DialectKind::Sap),
            _ => Err(format!(
                "Unknown database dialect '{s}'. Expected one of postgres, mysql, mariadb, mssql, sqlite, oracle, sap"
            )),
        }
    }
}

/// The statement kind a capability is asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Insert,
    Update,
    Delete,
}

/// How returned columns are requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturningSyntax {
    /// `... WHERE <predicate> RETURNING <columns>`
    Returning,
    /// `... SET <assignments> OUTPUT INSERTED.<column> INTO <table> WHERE <predicate>`, which needs
    /// a table variable declared before the statement and selected from after it.
    Output,
}

/// How a `NULL` assignment is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullAssignment {
    /// `column = <placeholder>` with a bound null
    Placeholder,
    /// `column = NULL`
    Literal,
}

pub trait Dialect: Send + Sync {
    fn kind(&self) -> DialectKind;

    /// Quote an identifier
    fn escape(&self, identifier: &str) -> String {
        format!("\"{}\"", identifier.replace('"', "\"\""))
    }

    /// The placeholder for the parameter at (zero-based) `index` in the bound parameter list.
    fn placeholder(&self, index: usize) -> String;

    /// Whether a parameter referenced several times binds once and reuses its placeholder
    /// (`$1 ... $1`), or binds once per occurrence (`? ... ?`).
    fn reuses_placeholders(&self) -> bool {
        false
    }

    fn returning_syntax(&self) -> Option<ReturningSyntax> {
        None
    }

    fn supports_returning(&self, kind: MutationKind) -> bool {
        let _ = kind;
        self.returning_syntax().is_some()
    }

    fn supports_limit_on_update(&self) -> bool {
        false
    }

    fn null_assignment(&self) -> NullAssignment {
        NullAssignment::Placeholder
    }

    /// Wrap a bound placeholder in the geometry constructor for a spatial column. Returns `None`
    /// for columns (or dialects) that bind spatial values as-is.
    fn spatial_literal(&self, column: &ColumnMetadata, placeholder: &str) -> Option<String> {
        let _ = (column, placeholder);
        None
    }

    /// Transform a value right before it is bound (for example, to tag it with a native type).
    fn parametrize(&self, column: &ColumnMetadata, value: Value) -> Value {
        let _ = column;
        value
    }

    /// Convert a value to the representation the database stores for the column type.
    fn prepare_persistent_value(&self, column: &ColumnMetadata, value: Value) -> Value {
        prepare_common_value(&column.column_type, value)
    }

    /// The native type used to declare a column of the given type
    fn native_type(&self, column_type: &ColumnType) -> String;

    /// The statement declaring a table variable with the given columns, for dialects that
    /// retrieve returned rows through one.
    fn table_variable_declaration(&self, name: &str, columns: &[&ColumnMetadata]) -> Option<String> {
        let _ = (name, columns);
        None
    }

    /// Whether a recursive common table expression must be marked `RECURSIVE`
    fn requires_recursive_hint(&self) -> bool {
        false
    }

    /// Whether `MATERIALIZED`/`NOT MATERIALIZED` may be specified for a common table expression
    fn supports_materialized_hint(&self) -> bool {
        false
    }
}

/// Value coercion shared by every dialect: simple arrays become comma separated text and
/// simple JSON becomes JSON text. Null passes through untouched.
pub(crate) fn prepare_common_value(column_type: &ColumnType, value: Value) -> Value {
    match (column_type, value) {
        (_, Value::Null) => Value::Null,
        (ColumnType::SimpleArray, Value::Array(elements)) => Value::Text(
            elements
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(","),
        ),
        (ColumnType::SimpleJson, value) => Value::Text(value.to_json().to_string()),
        (ColumnType::Json, value @ (Value::Object(_) | Value::Array(_))) => {
            Value::Json(value.to_json())
        }
        (_, value) => value,
    }
}

/// Native type names shared by the dialects that follow the SQL standard closely.
pub(crate) fn standard_native_type(column_type: &ColumnType) -> String {
    match column_type {
        ColumnType::SmallInt => "smallint".into(),
        ColumnType::Int => "integer".into(),
        ColumnType::BigInt => "bigint".into(),
        ColumnType::Float => "real".into(),
        ColumnType::Double => "double precision".into(),
        ColumnType::Numeric { precision, scale } => match (precision, scale) {
            (Some(precision), Some(scale)) => format!("numeric({precision}, {scale})"),
            (Some(precision), None) => format!("numeric({precision})"),
            _ => "numeric".into(),
        },
        ColumnType::Boolean => "boolean".into(),
        ColumnType::Varchar { length } => match length {
            Some(length) => format!("varchar({length})"),
            None => "varchar".into(),
        },
        ColumnType::Text | ColumnType::SimpleArray | ColumnType::SimpleJson => "text".into(),
        ColumnType::Timestamp { timezone } => {
            if *timezone {
                "timestamp with time zone".into()
            } else {
                "timestamp".into()
            }
        }
        ColumnType::Date => "date".into(),
        ColumnType::Time => "time".into(),
        ColumnType::Json => "json".into(),
        ColumnType::Uuid => "uuid".into(),
        ColumnType::Binary => "bytea".into(),
        ColumnType::Geometry => "geometry".into(),
        ColumnType::Geography => "geography".into(),
        ColumnType::Point => "point".into(),
    }
}
