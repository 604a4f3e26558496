// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use crate::sql::value::{ObjectLiteral, Value, set_path};

use super::column_type::ColumnType;

/// Converts values between their in-memory and persisted representation for a single column.
pub trait ValueTransformer: Send + Sync {
    /// Applied to a value before it is bound to a statement
    fn to_database(&self, value: Value) -> Value;
    /// Applied to a value read back from the database (for example, a returned column)
    fn from_database(&self, value: Value) -> Value;
}

/// A column of the entity being updated, along with the property path it is exposed as.
#[derive(Clone)]
pub struct ColumnMetadata {
    /// Dotted path of the property holding this column's value, e.g. `name`, `address.city`
    /// (embedded) or `author` (join column of a relation)
    pub property_path: String,
    /// The physical column name
    pub database_name: String,
    pub column_type: ColumnType,
    /// Spatial reference id for spatial columns
    pub srid: Option<i32>,
    pub is_primary: bool,
    pub is_nullable: bool,
    /// Can this column be written by an UPDATE
    pub is_update: bool,
    /// Is the value computed by the database
    pub is_generated: bool,
    /// Optimistic-lock version column (incremented on every update)
    pub is_version: bool,
    /// Timestamp column refreshed on every update
    pub is_update_date: bool,
    /// For join columns, the column of the related entity this column points to. Its property
    /// path locates the value inside the related object.
    pub referenced_column: Option<Box<ColumnMetadata>>,
    pub transformer: Option<Arc<dyn ValueTransformer>>,
}

impl ColumnMetadata {
    pub fn new(
        property_path: impl Into<String>,
        database_name: impl Into<String>,
        column_type: ColumnType,
    ) -> Self {
        Self {
            property_path: property_path.into(),
            database_name: database_name.into(),
            column_type,
            srid: None,
            is_primary: false,
            is_nullable: true,
            is_update: true,
            is_generated: false,
            is_version: false,
            is_update_date: false,
            referenced_column: None,
            transformer: None,
        }
    }

    pub fn primary(mut self) -> Self {
        self.is_primary = true;
        self.is_nullable = false;
        self
    }

    pub fn generated(mut self) -> Self {
        self.is_generated = true;
        self
    }

    pub fn version(mut self) -> Self {
        self.is_version = true;
        self
    }

    pub fn update_date(mut self) -> Self {
        self.is_update_date = true;
        self
    }

    /// Mark the column as not updatable; assignments to it are silently skipped.
    pub fn readonly(mut self) -> Self {
        self.is_update = false;
        self
    }

    pub fn with_srid(mut self, srid: i32) -> Self {
        self.srid = Some(srid);
        self
    }

    pub fn references(mut self, referenced_column: ColumnMetadata) -> Self {
        self.referenced_column = Some(Box::new(referenced_column));
        self
    }

    pub fn with_transformer(mut self, transformer: Arc<dyn ValueTransformer>) -> Self {
        self.transformer = Some(transformer);
        self
    }

    /// The value of this column's property inside `object`, following embedded paths. The value is
    /// returned as-is: a join column yields the related object (see
    /// [`ColumnMetadata::dereference`]).
    pub fn get_entity_value<'v>(&self, object: &'v ObjectLiteral) -> Option<&'v Value> {
        let (head, rest) = match self.property_path.split_once('.') {
            Some((head, rest)) => (head, rest),
            None => (self.property_path.as_str(), ""),
        };
        object.get(head)?.get_path(rest)
    }

    /// Replace a related object with the value of the referenced column inside it. Values that
    /// are not structured objects are returned unchanged.
    pub fn dereference(&self, value: &Value) -> Option<Value> {
        match (&self.referenced_column, value) {
            (Some(referenced_column), Value::Object(related)) => referenced_column
                .get_entity_value(related)
                .map(|value| referenced_column.dereference(value).unwrap_or(value.clone())),
            _ => Some(value.clone()),
        }
    }

    /// Write `value` under this column's property path, creating embedded objects as needed.
    /// For join columns the value is written inside the related object, under the referenced
    /// column's path.
    pub fn set_entity_value(&self, object: &mut ObjectLiteral, value: Value) {
        match &self.referenced_column {
            Some(referenced_column) => {
                let mut related = ObjectLiteral::new();
                referenced_column.set_entity_value(&mut related, value);
                set_path(object, &self.property_path, Value::Object(related));
            }
            None => set_path(object, &self.property_path, value),
        }
    }
}

/// A compact implementation of Debug. The derived implementation would include every flag and
/// obscure the useful information.
impl std::fmt::Debug for ColumnMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Column: {} ({}: {:?})",
            self.database_name, self.property_path, self.column_type
        )
    }
}

impl PartialEq for ColumnMetadata {
    fn eq(&self, other: &Self) -> bool {
        self.database_name == other.database_name && self.property_path == other.property_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object;

    #[test]
    fn embedded_values() {
        let city = ColumnMetadata::new("address.city", "address_city", ColumnType::Text);
        let entity = object! { "address" => object! { "city" => "Oslo" } };

        assert_eq!(city.get_entity_value(&entity), Some(&Value::from("Oslo")));
        assert_eq!(city.get_entity_value(&object! { "name" => "x" }), None);
    }

    #[test]
    fn join_column_dereferences_related_object() {
        let profile_id = ColumnMetadata::new("profile", "profile_id", ColumnType::Int)
            .references(ColumnMetadata::new("id", "id", ColumnType::Int).primary());

        let related = Value::Object(object! { "id" => 12, "bio" => "..." });
        assert_eq!(profile_id.dereference(&related), Some(Value::from(12)));

        // Already a plain id
        assert_eq!(profile_id.dereference(&Value::from(12)), Some(Value::from(12)));

        // A related object without the referenced property
        let incomplete = Value::Object(object! { "bio" => "..." });
        assert_eq!(profile_id.dereference(&incomplete), None);
    }

    #[test]
    fn set_entity_value_writes_through_relations() {
        let profile_id = ColumnMetadata::new("profile", "profile_id", ColumnType::Int)
            .references(ColumnMetadata::new("id", "id", ColumnType::Int));

        let mut entity = ObjectLiteral::new();
        profile_id.set_entity_value(&mut entity, Value::from(3));

        assert_eq!(entity, object! { "profile" => object! { "id" => 3 } });
    }
}
