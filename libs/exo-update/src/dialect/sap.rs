// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::metadata::column_type::ColumnType;

use super::{Dialect, DialectKind, NullAssignment};

/// SAP HANA. The driver cannot bind an untyped null, so nulls are written as literals.
pub struct Sap;

impl Dialect for Sap {
    fn kind(&self) -> DialectKind {
        DialectKind::Sap
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".into()
    }

    fn null_assignment(&self) -> NullAssignment {
        NullAssignment::Literal
    }

    fn native_type(&self, column_type: &ColumnType) -> String {
        match column_type {
            ColumnType::SmallInt => "smallint".into(),
            ColumnType::Int => "integer".into(),
            ColumnType::BigInt => "bigint".into(),
            ColumnType::Float => "real".into(),
            ColumnType::Double => "double".into(),
            ColumnType::Numeric { .. } => "decimal".into(),
            ColumnType::Boolean => "boolean".into(),
            ColumnType::Varchar { length } => format!("nvarchar({})", length.unwrap_or(255)),
            ColumnType::Text
            | ColumnType::Json
            | ColumnType::SimpleArray
            | ColumnType::SimpleJson => "nclob".into(),
            ColumnType::Timestamp { .. } => "timestamp".into(),
            ColumnType::Date => "date".into(),
            ColumnType::Time => "time".into(),
            ColumnType::Uuid => "nvarchar(36)".into(),
            ColumnType::Binary => "blob".into(),
            ColumnType::Geometry | ColumnType::Geography | ColumnType::Point => {
                "st_geometry".into()
            }
        }
    }
}
