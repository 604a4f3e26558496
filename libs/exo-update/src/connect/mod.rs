// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! A Postgres transport on a `deadpool-postgres` pool.

mod pg_connection;
mod pg_query_runner;
mod pg_value;

pub use pg_connection::PgConnection;
pub use pg_query_runner::PgQueryRunner;
