// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::{
    metadata::entity_metadata::EntityMetadata,
    sql::{
        cte::CommonTableExpression,
        order::{NullsOrdering, Ordering},
        value::{ObjectLiteral, Value},
    },
};

use super::where_builder::WhereBuilder;

/// Raw SQL produced on demand and inlined verbatim into a SET list (`views + 1`). Property
/// references such as `Post.views` inside it are resolved to column names.
#[derive(Clone)]
pub struct RawSql(Arc<dyn Fn() -> String + Send + Sync>);

impl RawSql {
    pub fn new(sql: impl Fn() -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(sql))
    }

    pub fn sql(&self) -> String {
        (self.0)()
    }
}

impl std::fmt::Debug for RawSql {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RawSql({})", self.sql())
    }
}

/// The value assigned to a property (or, for a plain table, a column).
#[derive(Debug, Clone)]
pub enum SetValue {
    /// Not assigned. Distinct from [`Value::Null`], which assigns a null.
    Unset,
    Value(Value),
    Raw(RawSql),
}

impl SetValue {
    pub fn raw(sql: impl Fn() -> String + Send + Sync + 'static) -> Self {
        SetValue::Raw(RawSql::new(sql))
    }
}

macro_rules! set_value_from {
    ($($ty:ty),+) => {
        $(impl From<$ty> for SetValue {
            fn from(value: $ty) -> Self {
                SetValue::Value(Value::from(value))
            }
        })+
    };
}

set_value_from!(Value, bool, i32, i64, f64, &str, String, ObjectLiteral);

impl From<RawSql> for SetValue {
    fn from(raw: RawSql) -> Self {
        SetValue::Raw(raw)
    }
}

impl<T: Into<Value>> From<Option<T>> for SetValue {
    fn from(value: Option<T>) -> Self {
        SetValue::Value(Value::from(value))
    }
}

/// Assignments in the order the caller supplied them.
pub type ValuesSet = IndexMap<String, SetValue>;

/// Build a [`ValuesSet`] from `key => value` pairs.
#[macro_export]
macro_rules! values {
    ($($key:expr => $value:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut values = $crate::ValuesSet::new();
        $(values.insert($key.to_string(), $crate::SetValue::from($value));)*
        values
    }};
}

/// What the update targets: a mapped entity or a plain table addressed by column names.
#[derive(Debug, Clone)]
pub enum UpdateTarget<'m> {
    Entity(&'m EntityMetadata),
    Table(String),
}

impl<'m> UpdateTarget<'m> {
    pub fn metadata(&self) -> Option<&'m EntityMetadata> {
        match self {
            UpdateTarget::Entity(metadata) => Some(metadata),
            UpdateTarget::Table(_) => None,
        }
    }

    pub fn table_name(&self) -> &str {
        match self {
            UpdateTarget::Entity(metadata) => &metadata.table_name,
            UpdateTarget::Table(name) => name,
        }
    }

    /// The name used in messages
    pub fn name(&self) -> &str {
        match self {
            UpdateTarget::Entity(metadata) => &metadata.target_name,
            UpdateTarget::Table(name) => name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderByCondition {
    pub ordering: Ordering,
    pub nulls: Option<NullsOrdering>,
}

/// Sort expressions in the order they were added.
pub type OrderBys = IndexMap<String, OrderByCondition>;

#[derive(Debug, Clone, PartialEq)]
pub enum Returning {
    /// Property paths (or column names for a plain table)
    Columns(Vec<String>),
    Raw(String),
}

impl From<&str> for Returning {
    fn from(raw: &str) -> Self {
        Returning::Raw(raw.to_string())
    }
}

impl From<String> for Returning {
    fn from(raw: String) -> Self {
        Returning::Raw(raw)
    }
}

impl From<Vec<&str>> for Returning {
    fn from(columns: Vec<&str>) -> Self {
        Returning::Columns(columns.into_iter().map(String::from).collect())
    }
}

impl From<Vec<String>> for Returning {
    fn from(columns: Vec<String>) -> Self {
        Returning::Columns(columns)
    }
}

/// Everything the caller declared about an update. Created fresh for every builder and compiled
/// (possibly more than once) into a statement.
#[derive(Debug, Clone)]
pub struct AbstractUpdate<'m> {
    pub target: UpdateTarget<'m>,
    pub values: ValuesSet,
    /// Predicates and the named parameters they refer to
    pub wheres: WhereBuilder,
    pub order_bys: OrderBys,
    pub limit: Option<u64>,
    pub returning: Option<Returning>,
    pub comment: Option<String>,
    pub ctes: Vec<CommonTableExpression>,
    /// Refresh the entities passed to `where_entity` with returned values
    pub update_entity: bool,
    pub use_transaction: bool,
    pub call_listeners: bool,
}

impl<'m> AbstractUpdate<'m> {
    pub fn new(target: UpdateTarget<'m>) -> Self {
        Self {
            target,
            values: ValuesSet::new(),
            wheres: WhereBuilder::default(),
            order_bys: OrderBys::new(),
            limit: None,
            returning: None,
            comment: None,
            ctes: vec![],
            update_entity: true,
            use_transaction: false,
            call_listeners: true,
        }
    }
}
