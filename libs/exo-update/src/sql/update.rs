// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::dialect::ReturningSyntax;

use super::{
    ExpressionBuilder, SQLBuilder,
    column_assignment::ColumnAssignment,
    cte::{CommonTableExpression, WithPreamble},
    limit::Limit,
    order::OrderBy,
    predicate::WherePredicate,
    returning::ReturningClause,
};

/// An update statement, with every piece already resolved to physical names.
#[derive(Debug)]
pub struct Update {
    /// Free text rendered as a leading `/* ... */` comment
    pub comment: Option<String>,
    pub ctes: Vec<CommonTableExpression>,
    /// The (possibly schema qualified) table name
    pub table: String,
    /// The columns to update and their values. Never empty.
    pub assignments: Vec<ColumnAssignment>,
    pub predicate: WherePredicate,
    pub returning: Option<ReturningClause>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<Limit>,
}

impl ExpressionBuilder for Update {
    /// Build the update statement for the form `[/* comment */] [WITH ...] UPDATE <table> SET
    /// <column = value, ...> [OUTPUT ...] [WHERE <predicate>] [RETURNING ...] [ORDER BY ...]
    /// [LIMIT n]`. The `WHERE` is omitted if there are no predicates, making the update
    /// unconditional.
    fn build(&self, builder: &mut SQLBuilder) {
        if let Some(comment) = &self.comment {
            builder.push_str("/* ");
            builder.push_str(comment.replace("*/", ""));
            builder.push_str(" */ ");
        }

        WithPreamble(&self.ctes).build(builder);

        builder.push_str("UPDATE ");
        builder.push_table_name(&self.table);

        builder.push_str(" SET ");
        builder.push_elems(&self.assignments, ", ");

        // OUTPUT comes before the WHERE clause, RETURNING after it
        let (output, returning) = match &self.returning {
            Some(clause) if clause.syntax == ReturningSyntax::Output => (Some(clause), None),
            clause => (None, clause.as_ref()),
        };

        if let Some(output) = output {
            output.build(builder);
        }

        if !self.predicate.is_empty() {
            builder.push_str(" WHERE ");
            self.predicate.build(builder);
        }

        if let Some(returning) = returning {
            returning.build(builder);
        }

        if let Some(order_by) = &self.order_by {
            builder.push_space();
            order_by.build(builder);
        }

        if let Some(limit) = &self.limit {
            builder.push_space();
            limit.build(builder);
        }
    }
}
