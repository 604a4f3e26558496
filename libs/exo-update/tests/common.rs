// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use exo_update::{
    BroadcastEvent, Broadcaster, ColumnMetadata, ColumnType, EntityMetadata, QueryResult,
    QueryRunner, QueryRunnerFactory, Value, ValuesSet, database_error::DatabaseError,
};

/// Everything the fakes saw, in order
pub type Log = Arc<Mutex<Vec<String>>>;

pub fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// How a fake runner behaves
#[derive(Clone, Default)]
pub struct Behavior {
    pub transaction_active: bool,
    pub fail_query: bool,
    pub fail_commit: bool,
    pub fail_rollback: bool,
    pub fail_release: bool,
    pub result: QueryResult,
}

pub struct RecordingRunner {
    log: Log,
    behavior: Behavior,
    transaction_active: bool,
    pub parameters: Vec<Vec<Value>>,
}

impl RecordingRunner {
    pub fn new(log: Log, behavior: Behavior) -> Self {
        Self {
            log,
            transaction_active: behavior.transaction_active,
            behavior,
            parameters: vec![],
        }
    }

    fn record(&self, entry: impl Into<String>) {
        self.log.lock().unwrap().push(entry.into());
    }

    fn outcome(&self, fail: bool, what: &str) -> Result<(), DatabaseError> {
        if fail {
            Err(DatabaseError::Transaction(format!("{what} failed")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl QueryRunner for RecordingRunner {
    fn is_transaction_active(&self) -> bool {
        self.transaction_active
    }

    async fn start_transaction(&mut self) -> Result<(), DatabaseError> {
        self.record("start");
        self.transaction_active = true;
        Ok(())
    }

    async fn commit_transaction(&mut self) -> Result<(), DatabaseError> {
        self.record("commit");
        self.outcome(self.behavior.fail_commit, "commit")?;
        self.transaction_active = false;
        Ok(())
    }

    async fn rollback_transaction(&mut self) -> Result<(), DatabaseError> {
        self.record("rollback");
        self.transaction_active = false;
        self.outcome(self.behavior.fail_rollback, "rollback")
    }

    async fn query(&mut self, sql: &str, parameters: &[Value]) -> Result<QueryResult, DatabaseError> {
        self.record(format!("query: {sql}"));
        self.parameters.push(parameters.to_vec());
        self.outcome(self.behavior.fail_query, "query")?;
        Ok(self.behavior.result.clone())
    }

    async fn release(&mut self) -> Result<(), DatabaseError> {
        self.record("release");
        self.outcome(self.behavior.fail_release, "release")
    }
}

pub struct RecordingFactory {
    pub log: Log,
    pub behavior: Behavior,
}

impl RecordingFactory {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            log: Log::default(),
            behavior,
        }
    }
}

#[async_trait]
impl QueryRunnerFactory for RecordingFactory {
    async fn create_query_runner(&self) -> Result<Box<dyn QueryRunner>, DatabaseError> {
        self.log.lock().unwrap().push("create".into());
        Ok(Box::new(RecordingRunner::new(
            self.log.clone(),
            self.behavior.clone(),
        )))
    }
}

pub struct RecordingBroadcaster {
    pub log: Log,
    pub fail_after: bool,
}

#[async_trait]
impl Broadcaster for RecordingBroadcaster {
    async fn broadcast(
        &self,
        event: BroadcastEvent,
        metadata: &EntityMetadata,
        values: &ValuesSet,
    ) -> Result<(), DatabaseError> {
        let keys: Vec<_> = values.keys().map(String::as_str).collect();
        self.log
            .lock()
            .unwrap()
            .push(format!("{event:?} {} [{}]", metadata.target_name, keys.join(", ")));

        if self.fail_after && event == BroadcastEvent::AfterUpdate {
            Err(DatabaseError::Validation("subscriber rejected the update".into()))
        } else {
            Ok(())
        }
    }
}

pub fn users() -> EntityMetadata {
    EntityMetadata::new(
        "User",
        "users",
        vec![
            ColumnMetadata::new("id", "id", ColumnType::Int).primary(),
            ColumnMetadata::new("name", "name", ColumnType::Text),
            ColumnMetadata::new("version", "version", ColumnType::Int).version(),
        ],
    )
}
