// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::dialect::ReturningSyntax;

use super::{ExpressionBuilder, SQLBuilder};

/// Name of the table variable `OUTPUT ... INTO` writes to.
pub const OUTPUT_TABLE: &str = "@OutputTable";

#[derive(Debug, Clone, PartialEq)]
pub enum ReturningColumns {
    /// Physical column names
    Columns(Vec<String>),
    /// Caller supplied text, pushed verbatim
    Raw(String),
}

/// `RETURNING <columns>` or `OUTPUT INSERTED.<column>, ... [INTO <table>]`, depending on the
/// dialect's syntax. Rendered with a leading space so it can be appended to a statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturningClause {
    pub syntax: ReturningSyntax,
    pub columns: ReturningColumns,
    /// The table variable OUTPUT writes into (declared by a preceding statement)
    pub into_table: Option<String>,
}

impl ExpressionBuilder for ReturningClause {
    fn build(&self, builder: &mut SQLBuilder) {
        match self.syntax {
            ReturningSyntax::Returning => builder.push_str(" RETURNING "),
            ReturningSyntax::Output => builder.push_str(" OUTPUT "),
        }

        match &self.columns {
            ReturningColumns::Raw(text) => builder.push_str(text),
            ReturningColumns::Columns(columns) => {
                builder.push_iter(columns.iter(), ", ", |builder, column| {
                    if self.syntax == ReturningSyntax::Output {
                        builder.push_str("INSERTED.");
                    }
                    builder.push_identifier(column);
                });
                if let Some(table) = &self.into_table {
                    builder.push_str(" INTO ");
                    builder.push_str(table);
                }
            }
        }
    }
}
