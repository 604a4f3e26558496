// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::{
    dialect::MutationKind,
    execution::{
        orchestrator::execute_update, query_runner::QueryRunner, update_result::UpdateResult,
    },
    sql::{
        cte::CommonTableExpression,
        order::{NullsOrdering, Ordering},
        predicate::Connective,
        value::{Entity, Parameters, Value},
    },
    transform::update_transformer::compile,
    update_error::UpdateError,
};

use super::{
    database_executor::DatabaseExecutor,
    update::{AbstractUpdate, OrderByCondition, Returning, UpdateTarget, ValuesSet},
    where_builder::{Condition, SubQuery, WhereExpression},
};

/// Builds an UPDATE statement through chained calls, then compiles (`get_query`) or runs it
/// (`execute`).
///
/// A builder is meant to be used by one caller: it is consumed by `execute`.
pub struct UpdateQueryBuilder<'a> {
    update: AbstractUpdate<'a>,
    executor: &'a DatabaseExecutor,
    query_runner: Option<&'a mut dyn QueryRunner>,
    where_entities: Option<&'a mut [Entity]>,
}

impl<'a> UpdateQueryBuilder<'a> {
    pub(crate) fn new(executor: &'a DatabaseExecutor, target: UpdateTarget<'a>) -> Self {
        Self {
            update: AbstractUpdate::new(target),
            executor,
            query_runner: None,
            where_entities: None,
        }
    }

    /// Replace the assignments. Keys are property paths (column names for a plain table).
    pub fn set(mut self, values: ValuesSet) -> Self {
        self.update.values = values;
        self
    }

    /// Replace every predicate added so far.
    pub fn where_<'f>(mut self, expression: impl Into<WhereExpression<'f>>) -> Self {
        self.update.wheres.where_(expression);
        self
    }

    pub fn and_where<'f>(mut self, expression: impl Into<WhereExpression<'f>>) -> Self {
        self.update.wheres.and_where(expression);
        self
    }

    pub fn or_where<'f>(mut self, expression: impl Into<WhereExpression<'f>>) -> Self {
        self.update.wheres.or_where(expression);
        self
    }

    /// Match rows by primary key. An id is either a primary key value (for an entity with a
    /// single primary column) or a map of primary key properties.
    pub fn where_in_ids<V: Into<Value>>(
        self,
        ids: impl IntoIterator<Item = V>,
    ) -> Result<Self, UpdateError> {
        self.push_ids(Connective::Simple, ids, "where_in_ids")
    }

    pub fn and_where_in_ids<V: Into<Value>>(
        self,
        ids: impl IntoIterator<Item = V>,
    ) -> Result<Self, UpdateError> {
        self.push_ids(Connective::And, ids, "and_where_in_ids")
    }

    pub fn or_where_in_ids<V: Into<Value>>(
        self,
        ids: impl IntoIterator<Item = V>,
    ) -> Result<Self, UpdateError> {
        self.push_ids(Connective::Or, ids, "or_where_in_ids")
    }

    /// Match the rows of the given entities (replacing other predicates). After `execute`, the
    /// entities hold the values the database computed (see `update_entity`).
    pub fn where_entity(mut self, entities: &'a mut [Entity]) -> Result<Self, UpdateError> {
        let metadata = self
            .update
            .target
            .metadata()
            .ok_or(UpdateError::MissingMetadata {
                operation: "where_entity",
            })?;

        if entities.is_empty() {
            return Err(UpdateError::EntityIdsMissing);
        }

        let id_maps = entities
            .iter()
            .map(|entity| {
                metadata
                    .get_entity_id_map(entity)
                    .ok_or(UpdateError::EntityIdsMissing)
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.update
            .wheres
            .push(Connective::Simple, Condition::Objects(id_maps));
        self.where_entities = Some(entities);
        Ok(self)
    }

    pub fn where_exists(self, sub_query: SubQuery) -> Self {
        self.where_(WhereExpression::Exists(sub_query))
    }

    pub fn and_where_exists(self, sub_query: SubQuery) -> Self {
        self.and_where(WhereExpression::Exists(sub_query))
    }

    pub fn or_where_exists(self, sub_query: SubQuery) -> Self {
        self.or_where(WhereExpression::Exists(sub_query))
    }

    pub fn set_parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.update.wheres.set_parameter(name, value);
        self
    }

    pub fn set_parameters(mut self, parameters: Parameters) -> Self {
        self.update.wheres.set_parameters(parameters);
        self
    }

    /// Return columns (a list of property paths) or a raw expression from the updated rows.
    /// Fails right away on dialects that cannot return rows from an UPDATE.
    pub fn returning(mut self, returning: impl Into<Returning>) -> Result<Self, UpdateError> {
        let dialect = self.executor.dialect();
        if !dialect.supports_returning(MutationKind::Update) {
            return Err(UpdateError::ReturningStatementNotSupported {
                dialect: dialect.kind().to_string(),
            });
        }

        self.update.returning = Some(returning.into());
        Ok(self)
    }

    /// Same as [`UpdateQueryBuilder::returning`]
    pub fn output(self, output: impl Into<Returning>) -> Result<Self, UpdateError> {
        self.returning(output)
    }

    /// Replace the ordering.
    pub fn order_by(
        mut self,
        sort: impl Into<String>,
        ordering: Ordering,
        nulls: Option<NullsOrdering>,
    ) -> Self {
        self.update.order_bys.clear();
        self.add_order_by(sort, ordering, nulls)
    }

    pub fn add_order_by(
        mut self,
        sort: impl Into<String>,
        ordering: Ordering,
        nulls: Option<NullsOrdering>,
    ) -> Self {
        self.update
            .order_bys
            .insert(sort.into(), OrderByCondition { ordering, nulls });
        self
    }

    /// Cap the number of updated rows. A limit of 0 removes the cap.
    pub fn limit(mut self, limit: u64) -> Self {
        self.update.limit = (limit > 0).then_some(limit);
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.update.comment = Some(comment.into());
        self
    }

    /// Prepend a `WITH` expression. Its parameters must be set with `set_parameter`.
    pub fn add_common_table_expression(mut self, cte: CommonTableExpression) -> Self {
        self.update.ctes.push(cte);
        self
    }

    /// Run inside a transaction (started here unless the runner already has one).
    pub fn use_transaction(mut self, enabled: bool) -> Self {
        self.update.use_transaction = enabled;
        self
    }

    pub fn call_listeners(mut self, enabled: bool) -> Self {
        self.update.call_listeners = enabled;
        self
    }

    /// Whether entities passed to `where_entity` are refreshed with returned values.
    pub fn update_entity(mut self, enabled: bool) -> Self {
        self.update.update_entity = enabled;
        self
    }

    /// Run on the caller's runner instead of one from the executor. The caller keeps ownership:
    /// the runner is not released, and a transaction the caller started is not committed.
    pub fn with_query_runner(mut self, query_runner: &'a mut dyn QueryRunner) -> Self {
        self.query_runner = Some(query_runner);
        self
    }

    pub fn abstract_update(&self) -> &AbstractUpdate<'a> {
        &self.update
    }

    pub fn get_query(&self) -> Result<String, UpdateError> {
        Ok(compile(&self.update, self.executor.dialect(), &[])?.sql)
    }

    pub fn get_query_and_parameters(&self) -> Result<(String, Vec<Value>), UpdateError> {
        let compiled = compile(&self.update, self.executor.dialect(), &[])?;
        Ok((compiled.sql, compiled.parameters))
    }

    pub async fn execute(self) -> Result<UpdateResult, UpdateError> {
        let Self {
            update,
            executor,
            query_runner,
            where_entities,
        } = self;

        execute_update(&update, executor, query_runner, where_entities).await
    }

    fn push_ids<V: Into<Value>>(
        mut self,
        connective: Connective,
        ids: impl IntoIterator<Item = V>,
        operation: &'static str,
    ) -> Result<Self, UpdateError> {
        let metadata = self
            .update
            .target
            .metadata()
            .ok_or(UpdateError::MissingMetadata { operation })?;

        let id_maps = ids
            .into_iter()
            .map(|id| metadata.ensure_entity_id_map(id.into()))
            .collect::<Result<Vec<_>, _>>()?;

        if id_maps.is_empty() {
            return Err(UpdateError::EntityIdsMissing);
        }

        self.update
            .wheres
            .push(connective, Condition::Objects(id_maps));
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::{
        asql::update::SetValue,
        database_error::DatabaseError,
        dialect::{Dialect, MySql, Postgres, SqlServer},
        execution::query_runner::QueryRunnerFactory,
        metadata::{
            column_metadata::ColumnMetadata, column_type::ColumnType,
            entity_metadata::EntityMetadata,
        },
        object, values,
    };

    struct NoRunners;

    #[async_trait]
    impl QueryRunnerFactory for NoRunners {
        async fn create_query_runner(&self) -> Result<Box<dyn QueryRunner>, DatabaseError> {
            Err(DatabaseError::Config("no database in unit tests".into()))
        }
    }

    fn executor(dialect: impl Dialect + 'static) -> DatabaseExecutor {
        DatabaseExecutor::new(Arc::new(dialect), Arc::new(NoRunners))
    }

    fn users() -> EntityMetadata {
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

    fn memberships() -> EntityMetadata {
        EntityMetadata::new(
            "Membership",
            "memberships",
            vec![
                ColumnMetadata::new("userId", "user_id", ColumnType::Int).primary(),
                ColumnMetadata::new("groupId", "group_id", ColumnType::Int).primary(),
                ColumnMetadata::new("role", "role", ColumnType::Text),
            ],
        )
    }

    #[test]
    fn users_scenario() {
        let executor = executor(Postgres);
        let metadata = users();

        let (sql, parameters) = executor
            .update(&metadata)
            .set(values! { "name" => "Ana" })
            .where_("id = :id")
            .set_parameter("id", 7)
            .get_query_and_parameters()
            .unwrap();

        assert_eq!(
            sql,
            r#"UPDATE "users" SET "name" = $1, "version" = "version" + 1 WHERE id = $2"#
        );
        assert_eq!(parameters, vec![Value::from("Ana"), Value::from(7)]);
    }

    #[test]
    fn where_replaces_and_appends_in_call_order() {
        let executor = executor(Postgres);
        let metadata = users();

        let replaced = executor
            .update(&metadata)
            .set(values! { "name" => "Ana" })
            .where_("name = 'Bob'")
            .where_("id = 1")
            .get_query()
            .unwrap();
        let direct = executor
            .update(&metadata)
            .set(values! { "name" => "Ana" })
            .where_("id = 1")
            .get_query()
            .unwrap();
        assert_eq!(replaced, direct);

        let chained = executor
            .update(&metadata)
            .set(values! { "name" => "Ana" })
            .where_("id = 1")
            .and_where("name = 'Bob'")
            .or_where("version > 3")
            .get_query()
            .unwrap();
        assert!(chained.ends_with(" WHERE (id = 1) AND (name = 'Bob') OR (version > 3)"));
    }

    #[test]
    fn unset_values_are_missing() {
        let executor = executor(Postgres);
        let metadata = users();

        let result = executor
            .update(&metadata)
            .set(values! { "name" => SetValue::Unset })
            .get_query();
        assert!(matches!(result, Err(UpdateError::UpdateValuesMissing)));
    }

    #[test]
    fn returning_is_rejected_when_the_call_is_made() {
        let executor = executor(MySql::mysql(false));
        let metadata = users();

        let result = executor.update(&metadata).returning(vec!["id"]);
        assert!(matches!(
            result,
            Err(UpdateError::ReturningStatementNotSupported { dialect }) if dialect == "mysql"
        ));
    }

    #[test]
    fn output_is_an_alias_of_returning() {
        let executor = executor(SqlServer);
        let metadata = users();

        let sql = executor
            .update(&metadata)
            .set(values! { "name" => "Ana" })
            .where_in_ids(vec![1])
            .unwrap()
            .output(vec!["id", "name"])
            .unwrap()
            .get_query()
            .unwrap();

        assert_eq!(
            sql,
            "UPDATE [users] SET [name] = @0, [version] = [version] + 1 \
             OUTPUT INSERTED.[id], INSERTED.[name] INTO @OutputTable WHERE [id] = @1"
        );
    }

    #[test]
    fn ids_expand_to_primary_key_equalities() {
        let executor = executor(Postgres);
        let metadata = users();

        let (sql, parameters) = executor
            .update(&metadata)
            .set(values! { "name" => "Ana" })
            .where_in_ids(vec![1, 2])
            .unwrap()
            .and_where("version < 10")
            .get_query_and_parameters()
            .unwrap();

        assert_eq!(
            sql,
            r#"UPDATE "users" SET "name" = $1, "version" = "version" + 1 WHERE ("id" = $2 OR "id" = $3) AND (version < 10)"#
        );
        assert_eq!(
            parameters,
            vec![Value::from("Ana"), Value::from(1), Value::from(2)]
        );
    }

    #[test]
    fn composite_ids_need_maps() {
        let executor = executor(Postgres);
        let metadata = memberships();

        let (sql, _) = executor
            .update(&metadata)
            .set(values! { "role" => "admin" })
            .where_in_ids(vec![object! { "userId" => 1, "groupId" => 2 }])
            .unwrap()
            .get_query_and_parameters()
            .unwrap();
        assert_eq!(
            sql,
            r#"UPDATE "memberships" SET "role" = $1 WHERE "user_id" = $2 AND "group_id" = $3"#
        );

        let result = executor.update(&metadata).where_in_ids(vec![1]);
        assert!(matches!(
            result,
            Err(UpdateError::CannotCreateEntityIdMap { .. })
        ));
    }

    #[test]
    fn ids_need_metadata_and_values() {
        let executor = executor(Postgres);

        let result = executor.update_table("users").where_in_ids(vec![1]);
        assert!(matches!(
            result,
            Err(UpdateError::MissingMetadata {
                operation: "where_in_ids"
            })
        ));

        let metadata = users();
        let result = executor
            .update(&metadata)
            .or_where_in_ids(Vec::<Value>::new());
        assert!(matches!(result, Err(UpdateError::EntityIdsMissing)));
    }

    #[test]
    fn where_entity_matches_by_id_map() {
        let executor = executor(Postgres);
        let metadata = users();
        let mut entities = vec![
            object! { "id" => 1, "name" => "Ana", "version" => 1 },
            object! { "id" => 2, "name" => "Bob", "version" => 4 },
        ];

        let builder = executor
            .update(&metadata)
            .set(values! { "name" => "Eve" })
            .where_("name = 'ignored'")
            .where_entity(&mut entities)
            .unwrap();

        assert_eq!(
            builder.get_query().unwrap(),
            r#"UPDATE "users" SET "name" = $1, "version" = "version" + 1 WHERE "id" = $2 OR "id" = $3"#
        );
    }

    #[test]
    fn where_entity_requires_ids() {
        let executor = executor(Postgres);
        let metadata = users();
        let mut entities = vec![object! { "name" => "Ana" }];

        let result = executor.update(&metadata).where_entity(&mut entities);
        assert!(matches!(result, Err(UpdateError::EntityIdsMissing)));
    }

    #[test]
    fn exists_sub_queries_carry_parameters() {
        let executor = executor(Postgres);
        let metadata = users();

        let (sql, parameters) = executor
            .update(&metadata)
            .set(values! { "name" => "Ana" })
            .where_exists(
                SubQuery::new("SELECT 1 FROM bans WHERE bans.user_id = users.id AND reason = :reason")
                    .with_parameter("reason", "spam"),
            )
            .or_where_exists(SubQuery::new("SELECT 1 FROM audits"))
            .get_query_and_parameters()
            .unwrap();

        assert!(sql.ends_with(
            " WHERE (EXISTS (SELECT 1 FROM bans WHERE bans.user_id = users.id AND reason = $2)) OR (EXISTS (SELECT 1 FROM audits))"
        ));
        assert_eq!(parameters, vec![Value::from("Ana"), Value::from("spam")]);
    }

    #[test]
    fn order_by_replaces_and_add_order_by_appends() {
        let executor = executor(MySql::mysql(false));

        let sql = executor
            .update_table("jobs")
            .set(values! { "state" => "queued" })
            .order_by("priority", Ordering::Desc, None)
            .order_by("created_at", Ordering::Asc, None)
            .add_order_by("id", Ordering::Asc, None)
            .limit(5)
            .get_query()
            .unwrap();

        assert_eq!(
            sql,
            "UPDATE `jobs` SET `state` = ? ORDER BY created_at ASC, id ASC LIMIT 5"
        );
    }

    #[test]
    fn zero_limit_removes_the_cap() {
        let executor = executor(Postgres);

        let builder = executor
            .update_table("jobs")
            .set(values! { "state" => "queued" })
            .limit(0);

        assert_eq!(builder.abstract_update().limit, None);
        assert_eq!(
            builder.get_query().unwrap(),
            r#"UPDATE "jobs" SET "state" = $1"#
        );
    }

    #[test]
    fn toggles_are_recorded() {
        let executor = executor(Postgres);
        let metadata = users();

        let builder = executor
            .update(&metadata)
            .use_transaction(true)
            .call_listeners(false)
            .update_entity(false)
            .comment("nightly");

        let update = builder.abstract_update();
        assert!(update.use_transaction);
        assert!(!update.call_listeners);
        assert!(!update.update_entity);
        assert_eq!(update.comment.as_deref(), Some("nightly"));
    }
}
