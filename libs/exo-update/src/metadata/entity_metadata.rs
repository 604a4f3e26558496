// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::{
    sql::value::{ObjectLiteral, Value},
    update_error::UpdateError,
};

use super::column_metadata::ColumnMetadata;

/// The mapped entity an update targets.
#[derive(Debug, Clone)]
pub struct EntityMetadata {
    /// The name used to refer to the entity in conditions (`User.name`)
    pub target_name: String,
    /// The (possibly schema qualified) physical table name
    pub table_name: String,
    pub columns: Vec<ColumnMetadata>,
}

impl EntityMetadata {
    pub fn new(
        target_name: impl Into<String>,
        table_name: impl Into<String>,
        columns: Vec<ColumnMetadata>,
    ) -> Self {
        Self {
            target_name: target_name.into(),
            table_name: table_name.into(),
            columns,
        }
    }

    /// Find the columns a property path maps to.
    ///
    /// Tries, in order:
    /// - columns whose property path matches exactly (several join columns may share one path)
    /// - the `relation.referencedProperty` form, which selects the join column of `relation`
    ///   pointing to `referencedProperty`
    /// - every column below an embedded object (`address` selects `address.city`, `address.zip`)
    pub fn find_columns_with_property_path(&self, property_path: &str) -> Vec<&ColumnMetadata> {
        let exact: Vec<_> = self
            .columns
            .iter()
            .filter(|column| column.property_path == property_path)
            .collect();
        if !exact.is_empty() {
            return exact;
        }

        if let Some((relation, referenced)) = property_path.rsplit_once('.') {
            let relation_columns: Vec<_> = self
                .columns
                .iter()
                .filter(|column| {
                    column.property_path == relation
                        && column
                            .referenced_column
                            .as_ref()
                            .is_some_and(|referenced_column| {
                                referenced_column.property_path == referenced
                            })
                })
                .collect();
            if !relation_columns.is_empty() {
                return relation_columns;
            }
        }

        let prefix = format!("{property_path}.");
        self.columns
            .iter()
            .filter(|column| column.property_path.starts_with(&prefix))
            .collect()
    }

    pub fn primary_columns(&self) -> impl Iterator<Item = &ColumnMetadata> {
        self.columns.iter().filter(|column| column.is_primary)
    }

    pub fn has_multiple_primary_keys(&self) -> bool {
        self.primary_columns().count() > 1
    }

    pub fn version_column(&self) -> Option<&ColumnMetadata> {
        self.columns.iter().find(|column| column.is_version)
    }

    pub fn update_date_column(&self) -> Option<&ColumnMetadata> {
        self.columns.iter().find(|column| column.is_update_date)
    }

    /// Columns whose value is computed by the database
    pub fn generated_columns(&self) -> impl Iterator<Item = &ColumnMetadata> {
        self.columns.iter().filter(|column| column.is_generated)
    }

    /// Extract the primary key values of an entity, keyed by property path.
    ///
    /// Returns `None` if any primary value is missing or null, since such an entity cannot be
    /// located in the database.
    pub fn get_entity_id_map(&self, entity: &ObjectLiteral) -> Option<ObjectLiteral> {
        let mut id_map = ObjectLiteral::new();
        let mut found_any = false;

        for column in self.primary_columns() {
            let value = column.get_entity_value(entity)?;
            let value = column.dereference(value)?;
            if value.is_null() {
                return None;
            }
            column.set_entity_value(&mut id_map, value);
            found_any = true;
        }

        found_any.then_some(id_map)
    }

    /// Normalize an id into an id map. Objects are taken to be id maps already; a bare value is
    /// only accepted when the entity has a single primary column.
    pub fn ensure_entity_id_map(&self, id: Value) -> Result<ObjectLiteral, UpdateError> {
        match id {
            Value::Object(id_map) => Ok(id_map),
            id => {
                let mut primary_columns = self.primary_columns();
                match (primary_columns.next(), primary_columns.next()) {
                    (Some(primary), None) => {
                        let mut id_map = ObjectLiteral::new();
                        primary.set_entity_value(&mut id_map, id);
                        Ok(id_map)
                    }
                    _ => Err(UpdateError::CannotCreateEntityIdMap {
                        entity: self.target_name.clone(),
                        id: id.to_string(),
                    }),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{metadata::column_type::ColumnType, object};

    fn post_metadata() -> EntityMetadata {
        EntityMetadata::new(
            "Post",
            "posts",
            vec![
                ColumnMetadata::new("id", "id", ColumnType::Int).primary(),
                ColumnMetadata::new("title", "title", ColumnType::Text),
                ColumnMetadata::new("author", "author_id", ColumnType::Int)
                    .references(ColumnMetadata::new("id", "id", ColumnType::Int)),
                ColumnMetadata::new("counters.likes", "counters_likes", ColumnType::Int),
                ColumnMetadata::new("counters.views", "counters_views", ColumnType::Int),
            ],
        )
    }

    fn database_names(columns: Vec<&ColumnMetadata>) -> Vec<&str> {
        columns
            .into_iter()
            .map(|column| column.database_name.as_str())
            .collect()
    }

    #[test]
    fn property_path_resolution() {
        let metadata = post_metadata();

        assert_eq!(
            database_names(metadata.find_columns_with_property_path("title")),
            vec!["title"]
        );
        assert_eq!(
            database_names(metadata.find_columns_with_property_path("author.id")),
            vec!["author_id"]
        );
        assert_eq!(
            database_names(metadata.find_columns_with_property_path("counters")),
            vec!["counters_likes", "counters_views"]
        );
        assert!(metadata.find_columns_with_property_path("missing").is_empty());
        assert!(metadata.find_columns_with_property_path("author.name").is_empty());
    }

    #[test]
    fn entity_id_maps() {
        let metadata = post_metadata();

        assert_eq!(
            metadata.get_entity_id_map(&object! { "id" => 4, "title" => "t" }),
            Some(object! { "id" => 4 })
        );
        assert_eq!(metadata.get_entity_id_map(&object! { "title" => "t" }), None);
        assert_eq!(
            metadata.get_entity_id_map(&object! { "id" => Value::Null }),
            None
        );

        assert_eq!(
            metadata.ensure_entity_id_map(Value::from(9)).unwrap(),
            object! { "id" => 9 }
        );
    }

    #[test]
    fn composite_keys_need_id_maps() {
        let metadata = EntityMetadata::new(
            "Membership",
            "memberships",
            vec![
                ColumnMetadata::new("userId", "user_id", ColumnType::Int).primary(),
                ColumnMetadata::new("groupId", "group_id", ColumnType::Int).primary(),
            ],
        );

        assert!(metadata.has_multiple_primary_keys());
        assert!(matches!(
            metadata.ensure_entity_id_map(Value::from(1)),
            Err(UpdateError::CannotCreateEntityIdMap { .. })
        ));
        assert_eq!(
            metadata
                .ensure_entity_id_map(Value::Object(object! { "userId" => 1, "groupId" => 2 }))
                .unwrap(),
            object! { "userId" => 1, "groupId" => 2 }
        );
    }
}
