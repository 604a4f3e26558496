// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use serde::{Deserialize, Serialize};

use super::{ExpressionBuilder, SQLBuilder};

#[derive(Debug, Clone, PartialEq, Eq, Copy, Serialize, Deserialize)]
pub enum Ordering {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Copy, Serialize, Deserialize)]
pub enum NullsOrdering {
    First,
    Last,
}

/// An ORDER BY entry. The sort expression is caller supplied text (typically a column or a
/// `Entity.property` reference resolved later), so it is pushed verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByElement(pub String, pub Ordering, pub Option<NullsOrdering>);

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy(pub Vec<OrderByElement>);

impl ExpressionBuilder for OrderByElement {
    fn build(&self, builder: &mut SQLBuilder) {
        builder.push_str(&self.0);
        builder.push_space();

        if self.1 == Ordering::Asc {
            builder.push_str("ASC");
        } else {
            builder.push_str("DESC");
        }

        match self.2 {
            Some(NullsOrdering::First) => builder.push_str(" NULLS FIRST"),
            Some(NullsOrdering::Last) => builder.push_str(" NULLS LAST"),
            None => {}
        }
    }
}

impl ExpressionBuilder for OrderBy {
    fn build(&self, builder: &mut SQLBuilder) {
        builder.push_str("ORDER BY ");
        builder.push_elems(&self.0, ", ");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Postgres;

    #[test]
    fn single_column() {
        let order_by = OrderBy(vec![OrderByElement("name".into(), Ordering::Asc, None)]);

        assert_binding!(order_by.to_sql(&Postgres), "ORDER BY name ASC");
    }

    #[test]
    fn multiple_columns_keep_order() {
        let order_by = OrderBy(vec![
            OrderByElement("name".into(), Ordering::Asc, None),
            OrderByElement("age".into(), Ordering::Desc, Some(NullsOrdering::Last)),
        ]);

        assert_binding!(
            order_by.to_sql(&Postgres),
            "ORDER BY name ASC, age DESC NULLS LAST"
        );
    }
}
