// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

#[cfg(test)]
use crate::dialect::Dialect;

#[cfg(test)]
use super::value::Parameters;

use super::SQLBuilder;

/// A trait for types that can build themselves into an SQL expression.
///
/// Each constituent of an update statement (assignment, predicate, ordering, etc.) implements
/// this trait, which can then be used to hierarchically build an SQL string and the parameters
/// to be supplied to it.
pub trait ExpressionBuilder {
    /// Build the SQL expression into the given SQL builder
    fn build(&self, builder: &mut SQLBuilder);

    /// Build the SQL expression into a string with named placeholders and return it along with
    /// the generated parameters. Useful for testing.
    #[cfg(test)]
    fn to_sql(&self, dialect: &dyn Dialect) -> (String, Parameters) {
        let mut builder = SQLBuilder::new(dialect);
        self.build(&mut builder);
        builder.into_sql()
    }
}

impl<T> ExpressionBuilder for Box<T>
where
    T: ExpressionBuilder,
{
    fn build(&self, builder: &mut SQLBuilder) {
        self.as_ref().build(builder)
    }
}

impl<T> ExpressionBuilder for &T
where
    T: ExpressionBuilder,
{
    fn build(&self, builder: &mut SQLBuilder) {
        (**self).build(builder)
    }
}
