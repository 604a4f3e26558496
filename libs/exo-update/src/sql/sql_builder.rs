// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::dialect::Dialect;

use super::{ExpressionBuilder, value::Parameters, value::Value};

/// Prefix of the parameter names generated while compiling a statement.
pub(crate) const GENERATED_PARAMETER_PREFIX: &str = "update_param_";

pub struct SQLBuilder<'d> {
    /// The dialect that decides identifier quoting
    dialect: &'d dyn Dialect,
    /// The SQL being built with a named placeholder (`:name`) for each parameter
    sql: String,
    /// Parameters generated while building, in the order they were bound
    params: Parameters,
    /// Prefix of generated parameter names
    param_prefix: String,
}

impl<'d> SQLBuilder<'d> {
    pub fn new(dialect: &'d dyn Dialect) -> Self {
        Self {
            dialect,
            sql: String::new(),
            params: Parameters::new(),
            param_prefix: GENERATED_PARAMETER_PREFIX.to_string(),
        }
    }

    /// Use a prefix for generated parameter names other than [`GENERATED_PARAMETER_PREFIX`], so
    /// they cannot shadow parameters supplied by the caller.
    pub fn with_parameter_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.param_prefix = prefix.into();
        self
    }

    pub fn dialect(&self) -> &'d dyn Dialect {
        self.dialect
    }

    /// Push a string
    pub fn push_str<T: AsRef<str>>(&mut self, s: T) {
        self.sql.push_str(s.as_ref());
    }

    /// Push a character
    pub fn push(&mut self, c: char) {
        self.sql.push(c);
    }

    /// Push a space. This is a common operation, so it is provided as a separate method.
    pub fn push_space(&mut self) {
        self.sql.push(' ');
    }

    /// Push an identifier (column name, alias) quoted the way the dialect expects.
    pub fn push_identifier<T: AsRef<str>>(&mut self, s: T) {
        let escaped = self.dialect.escape(s.as_ref());
        self.sql.push_str(&escaped);
    }

    /// Push a possibly schema-qualified table name. Each dotted component is quoted separately,
    /// so `public.users` becomes `"public"."users"` on Postgres.
    pub fn push_table_name<T: AsRef<str>>(&mut self, name: T) {
        let components: Vec<_> = name.as_ref().split('.').collect();
        self.push_iter(components.into_iter(), ".", |builder, component| {
            builder.push_identifier(component)
        });
    }

    /// Register a parameter and return its named placeholder without pushing it. Useful when the
    /// placeholder must be wrapped by a dialect-specific expression.
    pub fn bind(&mut self, value: Value) -> String {
        let name = format!("{}{}", self.param_prefix, self.params.len());
        self.params.insert(name.clone(), value);
        format!(":{name}")
    }

    /// Push a parameter, which will be replaced with a dialect placeholder once the statement is
    /// complete.
    pub fn push_param(&mut self, value: Value) {
        let placeholder = self.bind(value);
        self.push_str(placeholder);
    }

    /// Push an array parameter that expands into one placeholder per element.
    pub fn push_spread_param(&mut self, values: Vec<Value>) {
        let placeholder = self.bind(Value::Array(values));
        self.push_str(placeholder.replacen(':', ":...", 1));
    }

    /// Push elements of an iterator, separated by `sep`. The `push_elem` function provides
    /// the flexibility to map the elements (compared to [`SQLBuilder::push_elems`], which assumes that
    /// the elements implement [`ExpressionBuilder`] and [`build`](ExpressionBuilder::build) is all you need to call).
    pub fn push_iter<T>(
        &mut self,
        iter: impl ExactSizeIterator<Item = T>,
        sep: &str,
        push_elem: impl Fn(&mut Self, T),
    ) {
        let len = iter.len();
        for (i, item) in iter.enumerate() {
            push_elem(self, item);

            if i < len - 1 {
                self.sql.push_str(sep);
            }
        }
    }

    /// Push elements of a slice, separated by `sep`. The elements must themselves implement
    /// `ExpressionBuilder`.
    pub fn push_elems<T: ExpressionBuilder>(&mut self, elems: &[T], sep: &str) {
        self.push_iter(elems.iter(), sep, |builder, elem| {
            elem.build(builder);
        });
    }

    /// Get the SQL string and the generated parameters. Calling this method should be the final
    /// step in building an SQL expression, and thus this builder consumes the `self`.
    pub fn into_sql(self) -> (String, Parameters) {
        (self.sql, self.params)
    }
}
