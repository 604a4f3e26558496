// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::metadata::{column_metadata::ColumnMetadata, column_type::ColumnType};

use super::{Dialect, DialectKind, ReturningSyntax, standard_native_type};

pub struct Postgres;

impl Dialect for Postgres {
    fn kind(&self) -> DialectKind {
        DialectKind::Postgres
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${}", index + 1)
    }

    fn reuses_placeholders(&self) -> bool {
        true
    }

    fn returning_syntax(&self) -> Option<ReturningSyntax> {
        Some(ReturningSyntax::Returning)
    }

    /// PostGIS takes GeoJSON and the SRID has to be set separately
    fn spatial_literal(&self, column: &ColumnMetadata, placeholder: &str) -> Option<String> {
        let type_name = match column.column_type {
            ColumnType::Geometry | ColumnType::Geography => column.column_type.spatial_name()?,
            _ => return None,
        };

        Some(match column.srid {
            Some(srid) => {
                format!("ST_SetSRID(ST_GeomFromGeoJSON({placeholder}), {srid})::{type_name}")
            }
            None => format!("ST_GeomFromGeoJSON({placeholder})::{type_name}"),
        })
    }

    fn native_type(&self, column_type: &ColumnType) -> String {
        match column_type {
            ColumnType::Json => "jsonb".into(),
            ColumnType::Timestamp { timezone: true } => "timestamptz".into(),
            other => standard_native_type(other),
        }
    }

    fn requires_recursive_hint(&self) -> bool {
        true
    }

    fn supports_materialized_hint(&self) -> bool {
        true
    }
}
