// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use super::{ExpressionBuilder, SQLBuilder};

/// A common table expression prepended to the statement: `<alias>(<columns>) AS
/// [[NOT] MATERIALIZED] (<query>)`. The query is already built SQL; its parameters are merged
/// into the statement's named parameters by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct CommonTableExpression {
    pub alias: String,
    pub query: String,
    pub column_names: Vec<String>,
    pub recursive: bool,
    pub materialized: Option<bool>,
}

impl CommonTableExpression {
    pub fn new(alias: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            query: query.into(),
            column_names: vec![],
            recursive: false,
            materialized: None,
        }
    }

    pub fn with_columns(mut self, column_names: Vec<String>) -> Self {
        self.column_names = column_names;
        self
    }

    pub fn recursive(mut self) -> Self {
        self.recursive = true;
        self
    }

    pub fn materialized(mut self, materialized: bool) -> Self {
        self.materialized = Some(materialized);
        self
    }
}

/// The `WITH ... ` preamble (with a trailing space) for a list of expressions. `RECURSIVE` applies
/// to the whole list, so it follows `WITH` once if any expression is recursive.
#[derive(Debug)]
pub struct WithPreamble<'a>(pub &'a [CommonTableExpression]);

impl ExpressionBuilder for WithPreamble<'_> {
    fn build(&self, builder: &mut SQLBuilder) {
        if self.0.is_empty() {
            return;
        }
        builder.push_str("WITH ");
        if self.0.iter().any(|cte| cte.recursive) && builder.dialect().requires_recursive_hint() {
            builder.push_str("RECURSIVE ");
        }
        builder.push_elems(self.0, ", ");
        builder.push_space();
    }
}

impl ExpressionBuilder for CommonTableExpression {
    fn build(&self, builder: &mut SQLBuilder) {
        let dialect = builder.dialect();

        builder.push_identifier(&self.alias);
        if !self.column_names.is_empty() {
            builder.push('(');
            builder.push_iter(self.column_names.iter(), ", ", |builder, column| {
                builder.push_identifier(column)
            });
            builder.push(')');
        }

        builder.push_str(" AS ");
        match self.materialized {
            Some(true) if dialect.supports_materialized_hint() => {
                builder.push_str("MATERIALIZED ")
            }
            Some(false) if dialect.supports_materialized_hint() => {
                builder.push_str("NOT MATERIALIZED ")
            }
            _ => {}
        }

        builder.push('(');
        builder.push_str(&self.query);
        builder.push(')');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{Postgres, SqlServer};

    #[test]
    fn recursive_materialized_cte() {
        let ctes = vec![
            CommonTableExpression::new("tree", "SELECT id FROM nodes")
                .with_columns(vec!["id".into()])
                .recursive()
                .materialized(true),
        ];

        assert_binding!(
            WithPreamble(&ctes).to_sql(&Postgres),
            r#"WITH RECURSIVE "tree"("id") AS MATERIALIZED (SELECT id FROM nodes) "#
        );
        assert_binding!(
            WithPreamble(&ctes).to_sql(&SqlServer),
            "WITH [tree]([id]) AS (SELECT id FROM nodes) "
        );
    }

    #[test]
    fn recursive_hint_is_written_once() {
        let ctes = vec![
            CommonTableExpression::new("a", "SELECT 1"),
            CommonTableExpression::new("b", "SELECT 2").recursive(),
            CommonTableExpression::new("c", "SELECT 3").recursive(),
        ];

        assert_binding!(
            WithPreamble(&ctes).to_sql(&Postgres),
            r#"WITH RECURSIVE "a" AS (SELECT 1), "b" AS (SELECT 2), "c" AS (SELECT 3) "#
        );
    }

    #[test]
    fn no_expressions() {
        assert_binding!(WithPreamble(&[]).to_sql(&Postgres), "");
    }
}
