// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::sql::{
    predicate::Connective,
    value::{ObjectLiteral, Parameters, Value},
};

/// A condition before property paths are resolved to columns.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Text(String),
    Brackets {
        negated: bool,
        clauses: Vec<WhereClause>,
    },
    /// Every property equals the given value
    Object(ObjectLiteral),
    /// At least one of the objects matches
    Objects(Vec<ObjectLiteral>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    pub connective: Connective,
    pub condition: Condition,
}

/// An already built sub-select used by `EXISTS (...)`, along with the named parameters it refers
/// to.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubQuery {
    pub sql: String,
    pub parameters: Parameters,
}

impl SubQuery {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            parameters: Parameters::new(),
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }
}

type BracketsFactory<'f> = Box<dyn FnOnce(&mut WhereBuilder) + 'f>;
type ConditionCallback<'f> = Box<dyn FnOnce(&mut WhereBuilder) -> String + 'f>;

/// The shapes a condition can be supplied in.
pub enum WhereExpression<'f> {
    /// Condition text such as `id = :id`
    Text(String),
    /// Conditions added to a fresh builder, grouped in parentheses
    Brackets(BracketsFactory<'f>),
    /// Like `Brackets`, but negated: `NOT(...)`
    NotBrackets(BracketsFactory<'f>),
    /// Produces condition text, with access to this builder (for example to set parameters)
    Callback(ConditionCallback<'f>),
    /// Equality with each property of the object, joined by AND
    Object(ObjectLiteral),
    /// Disjunction of object conditions
    Objects(Vec<ObjectLiteral>),
    /// `EXISTS (<sub-select>)`
    Exists(SubQuery),
}

impl<'f> WhereExpression<'f> {
    pub fn brackets(factory: impl FnOnce(&mut WhereBuilder) + 'f) -> Self {
        WhereExpression::Brackets(Box::new(factory))
    }

    pub fn not_brackets(factory: impl FnOnce(&mut WhereBuilder) + 'f) -> Self {
        WhereExpression::NotBrackets(Box::new(factory))
    }

    pub fn callback(callback: impl FnOnce(&mut WhereBuilder) -> String + 'f) -> Self {
        WhereExpression::Callback(Box::new(callback))
    }
}

impl From<&str> for WhereExpression<'_> {
    fn from(text: &str) -> Self {
        WhereExpression::Text(text.to_string())
    }
}

impl From<String> for WhereExpression<'_> {
    fn from(text: String) -> Self {
        WhereExpression::Text(text)
    }
}

impl From<ObjectLiteral> for WhereExpression<'_> {
    fn from(object: ObjectLiteral) -> Self {
        WhereExpression::Object(object)
    }
}

impl From<Vec<ObjectLiteral>> for WhereExpression<'_> {
    fn from(objects: Vec<ObjectLiteral>) -> Self {
        WhereExpression::Objects(objects)
    }
}

impl From<SubQuery> for WhereExpression<'_> {
    fn from(sub_query: SubQuery) -> Self {
        WhereExpression::Exists(sub_query)
    }
}

/// Accumulates WHERE predicates in call order, along with the named parameters they use.
///
/// `where_` replaces every predicate added so far, while `and_where` and `or_where` append.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereBuilder {
    clauses: Vec<WhereClause>,
    parameters: Parameters,
}

impl WhereBuilder {
    pub fn where_<'f>(&mut self, expression: impl Into<WhereExpression<'f>>) -> &mut Self {
        // Cleared before evaluating, since a callback may add predicates of its own
        self.clauses.clear();
        if let Some(condition) = self.evaluate(expression.into()) {
            self.clauses = vec![WhereClause {
                connective: Connective::Simple,
                condition,
            }];
        }
        self
    }

    pub fn and_where<'f>(&mut self, expression: impl Into<WhereExpression<'f>>) -> &mut Self {
        if let Some(condition) = self.evaluate(expression.into()) {
            self.push(Connective::And, condition);
        }
        self
    }

    pub fn or_where<'f>(&mut self, expression: impl Into<WhereExpression<'f>>) -> &mut Self {
        if let Some(condition) = self.evaluate(expression.into()) {
            self.push(Connective::Or, condition);
        }
        self
    }

    pub fn set_parameter(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn set_parameters(&mut self, parameters: Parameters) -> &mut Self {
        self.parameters.extend(parameters);
        self
    }

    pub fn clauses(&self) -> &[WhereClause] {
        &self.clauses
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Add a condition with the given connective. A `Simple` connective replaces the predicates
    /// added so far, like `where_`.
    pub(crate) fn push(&mut self, connective: Connective, condition: Condition) {
        if connective == Connective::Simple {
            self.clauses.clear();
        }
        self.clauses.push(WhereClause {
            connective,
            condition,
        });
    }

    fn evaluate(&mut self, expression: WhereExpression<'_>) -> Option<Condition> {
        match expression {
            WhereExpression::Text(text) => {
                (!text.trim().is_empty()).then_some(Condition::Text(text))
            }
            WhereExpression::Brackets(factory) => self.evaluate_brackets(factory, false),
            WhereExpression::NotBrackets(factory) => self.evaluate_brackets(factory, true),
            WhereExpression::Callback(callback) => {
                let text = callback(self);
                self.evaluate(WhereExpression::Text(text))
            }
            WhereExpression::Object(object) => Some(Condition::Object(object)),
            WhereExpression::Objects(objects) => Some(Condition::Objects(objects)),
            WhereExpression::Exists(sub_query) => {
                self.parameters.extend(sub_query.parameters);
                Some(Condition::Text(format!("EXISTS ({})", sub_query.sql)))
            }
        }
    }

    fn evaluate_brackets(
        &mut self,
        factory: BracketsFactory<'_>,
        negated: bool,
    ) -> Option<Condition> {
        let mut nested = WhereBuilder::default();
        factory(&mut nested);
        self.parameters.extend(nested.parameters);

        (!nested.clauses.is_empty()).then_some(Condition::Brackets {
            negated,
            clauses: nested.clauses,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object;

    fn text(connective: Connective, text: &str) -> WhereClause {
        WhereClause {
            connective,
            condition: Condition::Text(text.into()),
        }
    }

    #[test]
    fn where_replaces_previous_predicates() {
        let mut replaced = WhereBuilder::default();
        replaced.where_("a = 1").and_where("b = 2").where_("c = 3");

        let mut direct = WhereBuilder::default();
        direct.where_("c = 3");

        assert_eq!(replaced, direct);
    }

    #[test]
    fn and_or_append_in_call_order() {
        let mut builder = WhereBuilder::default();
        builder.where_("x").and_where("y").or_where("z");

        assert_eq!(
            builder.clauses(),
            &[
                text(Connective::Simple, "x"),
                text(Connective::And, "y"),
                text(Connective::Or, "z"),
            ]
        );
    }

    #[test]
    fn callback_can_set_parameters() {
        let mut builder = WhereBuilder::default();
        builder.where_(WhereExpression::callback(|builder| {
            builder.set_parameter("name", "Ana");
            "name = :name".into()
        }));

        assert_eq!(builder.clauses(), &[text(Connective::Simple, "name = :name")]);
        assert_eq!(builder.parameters().get("name"), Some(&Value::from("Ana")));
    }

    #[test]
    fn callback_predicates_are_replaced_by_its_result() {
        let mut builder = WhereBuilder::default();
        builder.where_("stale").where_(WhereExpression::callback(|builder| {
            builder.and_where("added during evaluation");
            "fresh".into()
        }));

        assert_eq!(builder.clauses(), &[text(Connective::Simple, "fresh")]);
    }

    #[test]
    fn brackets_collect_nested_predicates_and_parameters() {
        let mut builder = WhereBuilder::default();
        builder.where_("active").and_where(WhereExpression::not_brackets(|nested| {
            nested
                .where_("role = :role")
                .or_where("banned")
                .set_parameter("role", "guest");
        }));

        assert_eq!(
            builder.clauses()[1],
            WhereClause {
                connective: Connective::And,
                condition: Condition::Brackets {
                    negated: true,
                    clauses: vec![
                        text(Connective::Simple, "role = :role"),
                        text(Connective::Or, "banned"),
                    ],
                },
            }
        );
        assert_eq!(builder.parameters().get("role"), Some(&Value::from("guest")));
    }

    #[test]
    fn exists_wraps_sub_query() {
        let mut builder = WhereBuilder::default();
        builder.where_(
            SubQuery::new("SELECT 1 FROM posts WHERE posts.author_id = users.id AND posts.draft = :draft")
                .with_parameter("draft", true),
        );

        assert_eq!(
            builder.clauses(),
            &[text(
                Connective::Simple,
                "EXISTS (SELECT 1 FROM posts WHERE posts.author_id = users.id AND posts.draft = :draft)"
            )]
        );
        assert_eq!(builder.parameters().get("draft"), Some(&Value::Bool(true)));
    }

    #[test]
    fn objects() {
        let mut builder = WhereBuilder::default();
        builder.where_(vec![object! { "a" => 1 }, object! { "a" => 2 }]);

        assert_eq!(
            builder.clauses()[0].condition,
            Condition::Objects(vec![object! { "a" => 1 }, object! { "a" => 2 }])
        );
    }

    #[test]
    fn blank_conditions_are_ignored() {
        let mut builder = WhereBuilder::default();
        builder.where_("a").and_where("  ");

        assert_eq!(builder.clauses().len(), 1);
    }
}
