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
    asql::update::ValuesSet, database_error::DatabaseError,
    metadata::entity_metadata::EntityMetadata,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadcastEvent {
    BeforeUpdate,
    AfterUpdate,
}

/// Notifies subscribers around an entity update. Receives the assignments as the caller supplied
/// them (before property paths are resolved).
///
/// A failing subscriber fails the update (and rolls back a transaction the update started).
#[async_trait]
pub trait Broadcaster: Send + Sync {
    async fn broadcast(
        &self,
        event: BroadcastEvent,
        metadata: &EntityMetadata,
        values: &ValuesSet,
    ) -> Result<(), DatabaseError>;
}

/// A broadcaster without subscribers
pub struct NoopBroadcaster;

#[async_trait]
impl Broadcaster for NoopBroadcaster {
    async fn broadcast(
        &self,
        _event: BroadcastEvent,
        _metadata: &EntityMetadata,
        _values: &ValuesSet,
    ) -> Result<(), DatabaseError> {
        Ok(())
    }
}
