// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use super::{ExpressionBuilder, SQLBuilder, value::Value};

/// How a predicate joins the ones before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    /// The predicate set by `where_`, which is always first
    Simple,
    And,
    Or,
}

/// A comparison of a column against a value. Produced from object conditions.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub column: String,
    pub operand: Operand,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Eq(Value),
    IsNull,
    In(Vec<Value>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Caller supplied condition text, possibly with named parameters and property references
    Text(String),
    /// A nested group, rendered as `(...)` or `NOT(...)`
    Brackets {
        negated: bool,
        clauses: Vec<(Connective, Predicate)>,
    },
    /// A conjunction of comparisons. An empty conjunction is always true.
    Match(Vec<Comparison>),
    /// A disjunction of conjunctions. An empty disjunction is never true.
    AnyOf(Vec<Vec<Comparison>>),
}

/// The predicates of a WHERE clause (without the `WHERE` keyword).
///
/// A lone predicate renders as-is. With two or more, each one is parenthesized so that a
/// caller's `a OR b` cannot change the meaning of its neighbours: `(X) AND (Y) OR (Z)`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WherePredicate {
    pub clauses: Vec<(Connective, Predicate)>,
}

impl WherePredicate {
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

impl ExpressionBuilder for WherePredicate {
    fn build(&self, builder: &mut SQLBuilder) {
        build_clauses(&self.clauses, builder);
    }
}

fn build_clauses(clauses: &[(Connective, Predicate)], builder: &mut SQLBuilder) {
    let wrap = clauses.len() > 1;

    for (index, (connective, predicate)) in clauses.iter().enumerate() {
        if index > 0 {
            match connective {
                Connective::Or => builder.push_str(" OR "),
                Connective::And | Connective::Simple => builder.push_str(" AND "),
            }
        }
        predicate.build_wrapped(builder, wrap);
    }
}

impl Predicate {
    fn build_wrapped(&self, builder: &mut SQLBuilder, wrap: bool) {
        match self {
            Predicate::Text(text) => {
                if wrap {
                    builder.push('(');
                    builder.push_str(text);
                    builder.push(')');
                } else {
                    builder.push_str(text);
                }
            }
            Predicate::Brackets { negated, clauses } => {
                if *negated {
                    builder.push_str("NOT");
                }
                builder.push('(');
                build_clauses(clauses, builder);
                builder.push(')');
            }
            Predicate::Match(comparisons) => build_conjunction(comparisons, builder, wrap),
            Predicate::AnyOf(alternatives) => match alternatives.as_slice() {
                [] => builder.push_str("0=1"),
                [single] => build_conjunction(single, builder, wrap),
                _ => {
                    if wrap {
                        builder.push('(');
                    }
                    builder.push_iter(alternatives.iter(), " OR ", |builder, comparisons| {
                        build_conjunction(comparisons, builder, true)
                    });
                    if wrap {
                        builder.push(')');
                    }
                }
            },
        }
    }
}

impl ExpressionBuilder for Predicate {
    fn build(&self, builder: &mut SQLBuilder) {
        self.build_wrapped(builder, false);
    }
}

fn build_conjunction(comparisons: &[Comparison], builder: &mut SQLBuilder, wrap: bool) {
    if comparisons.is_empty() {
        builder.push_str("1=1");
        return;
    }

    let wrap = wrap && comparisons.len() > 1;
    if wrap {
        builder.push('(');
    }
    builder.push_elems(comparisons, " AND ");
    if wrap {
        builder.push(')');
    }
}

impl ExpressionBuilder for Comparison {
    fn build(&self, builder: &mut SQLBuilder) {
        builder.push_identifier(&self.column);

        match &self.operand {
            Operand::Eq(value) => {
                builder.push_str(" = ");
                builder.push_param(value.clone());
            }
            Operand::IsNull => builder.push_str(" IS NULL"),
            Operand::In(values) => {
                builder.push_str(" IN (");
                builder.push_spread_param(values.clone());
                builder.push(')');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Postgres;

    fn eq(column: &str, value: impl Into<Value>) -> Comparison {
        Comparison {
            column: column.into(),
            operand: Operand::Eq(value.into()),
        }
    }

    fn text(text: &str) -> Predicate {
        Predicate::Text(text.into())
    }

    #[test]
    fn single_predicate_is_not_wrapped() {
        let predicate = WherePredicate {
            clauses: vec![(Connective::Simple, text("id = :id"))],
        };

        assert_binding!(predicate.to_sql(&Postgres), "id = :id");
    }

    #[test]
    fn multiple_predicates_keep_call_order() {
        let predicate = WherePredicate {
            clauses: vec![
                (Connective::Simple, text("a = 1")),
                (Connective::And, text("b = 2")),
                (Connective::Or, text("c = 3")),
            ],
        };

        assert_binding!(predicate.to_sql(&Postgres), "(a = 1) AND (b = 2) OR (c = 3)");
    }

    #[test]
    fn brackets() {
        let predicate = WherePredicate {
            clauses: vec![
                (Connective::Simple, text("active")),
                (
                    Connective::And,
                    Predicate::Brackets {
                        negated: true,
                        clauses: vec![
                            (Connective::Simple, text("a = 1")),
                            (Connective::Or, text("b = 2")),
                        ],
                    },
                ),
            ],
        };

        assert_binding!(
            predicate.to_sql(&Postgres),
            "(active) AND NOT((a = 1) OR (b = 2))"
        );
    }

    #[test]
    fn object_conditions() {
        let predicate = Predicate::AnyOf(vec![
            vec![eq("a", 1), eq("b", 2)],
            vec![eq("a", 3), eq("b", 4)],
        ]);

        assert_binding!(
            predicate.to_sql(&Postgres),
            r#"("a" = :update_param_0 AND "b" = :update_param_1) OR ("a" = :update_param_2 AND "b" = :update_param_3)"#,
            1,
            2,
            3,
            4
        );
    }

    #[test]
    fn null_and_list_operands() {
        let predicate = Predicate::Match(vec![
            Comparison {
                column: "deleted_at".into(),
                operand: Operand::IsNull,
            },
            Comparison {
                column: "id".into(),
                operand: Operand::In(vec![Value::from(1), Value::from(2)]),
            },
        ]);

        assert_binding!(
            predicate.to_sql(&Postgres),
            r#""deleted_at" IS NULL AND "id" IN (:...update_param_0)"#,
            vec![1, 2]
        );
    }

    #[test]
    fn empty_groups() {
        assert_binding!(Predicate::Match(vec![]).to_sql(&Postgres), "1=1");
        assert_binding!(Predicate::AnyOf(vec![]).to_sql(&Postgres), "0=1");
    }
}
