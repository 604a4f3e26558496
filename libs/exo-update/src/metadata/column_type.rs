// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use serde::{Deserialize, Serialize};

/// The logical type of a column. Dialects map it to a native type when they need to spell it out
/// (for example, when declaring an output table variable), and use it to decide on value
/// coercion and spatial literal wrapping.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnType {
    SmallInt,
    Int,
    BigInt,
    Float,
    Double,
    Numeric {
        precision: Option<u32>,
        scale: Option<u32>,
    },
    Boolean,
    Varchar {
        length: Option<u32>,
    },
    Text,
    Timestamp {
        timezone: bool,
    },
    Date,
    Time,
    Json,
    Uuid,
    Binary,
    /// A list of strings persisted as a single comma separated text value
    SimpleArray,
    /// An arbitrary object persisted as JSON text
    SimpleJson,
    Geometry,
    Geography,
    Point,
}

impl ColumnType {
    /// Is this one of the spatial types whose values must be wrapped in a geometry constructor
    pub fn is_spatial(&self) -> bool {
        matches!(
            self,
            ColumnType::Geometry | ColumnType::Geography | ColumnType::Point
        )
    }

    /// The lower-case type name used by casts such as `::geometry`.
    pub fn spatial_name(&self) -> Option<&'static str> {
        match self {
            ColumnType::Geometry => Some("geometry"),
            ColumnType::Geography => Some("geography"),
            ColumnType::Point => Some("point"),
            _ => None,
        }
    }
}
