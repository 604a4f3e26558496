// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use async_trait::async_trait;

use crate::{
    dialect::{Dialect, MutationKind},
    metadata::{column_metadata::ColumnMetadata, entity_metadata::EntityMetadata},
    sql::value::{Entity, ObjectLiteral},
    update_error::UpdateError,
};

use super::update_result::UpdateResult;

/// Brings entities targeted by `where_entity` up to date with values the database computed
/// during the update.
#[async_trait]
pub trait EntityRefresher: Send + Sync {
    /// Columns to return from the update in addition to the ones requested
    fn additional_returning_columns<'m>(
        &self,
        metadata: &'m EntityMetadata,
        dialect: &dyn Dialect,
    ) -> Vec<&'m ColumnMetadata>;

    /// Merge the update's result into the entities (in the order they were targeted) and
    /// record what was merged in the result's generated maps.
    async fn refresh(
        &self,
        metadata: &EntityMetadata,
        result: &mut UpdateResult,
        entities: &mut [Entity],
    ) -> Result<(), UpdateError>;
}

/// Refreshes entities from the rows returned by RETURNING/OUTPUT: row `i` is merged into
/// entity `i`. Does nothing on dialects that cannot return rows from an update.
pub struct ReturningResultsEntityUpdater;

impl ReturningResultsEntityUpdater {
    fn refreshed_columns(metadata: &EntityMetadata) -> impl Iterator<Item = &ColumnMetadata> {
        metadata
            .columns
            .iter()
            .filter(|column| column.is_version || column.is_update_date || column.is_generated)
    }
}

#[async_trait]
impl EntityRefresher for ReturningResultsEntityUpdater {
    fn additional_returning_columns<'m>(
        &self,
        metadata: &'m EntityMetadata,
        dialect: &dyn Dialect,
    ) -> Vec<&'m ColumnMetadata> {
        if !dialect.supports_returning(MutationKind::Update) {
            return vec![];
        }
        Self::refreshed_columns(metadata).collect()
    }

    async fn refresh(
        &self,
        metadata: &EntityMetadata,
        result: &mut UpdateResult,
        entities: &mut [Entity],
    ) -> Result<(), UpdateError> {
        let mut generated_maps = Vec::with_capacity(entities.len());

        for (entity, row) in entities.iter_mut().zip(result.raw.iter()) {
            let mut generated_map = ObjectLiteral::new();

            for column in Self::refreshed_columns(metadata) {
                if let Some(value) = row.get(&column.database_name) {
                    let value = match &column.transformer {
                        Some(transformer) => transformer.from_database(value.clone()),
                        None => value.clone(),
                    };
                    column.set_entity_value(&mut generated_map, value.clone());
                    column.set_entity_value(entity, value);
                }
            }

            generated_maps.push(generated_map);
        }

        result.generated_maps = generated_maps;
        Ok(())
    }
}
