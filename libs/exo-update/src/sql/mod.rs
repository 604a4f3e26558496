// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Low level SQL primitives. Each statement piece implements [`ExpressionBuilder`] and renders
//! itself through a [`SQLBuilder`], which collects generated parameters along the way.

#[cfg(test)]
#[macro_use]
pub(crate) mod test_util;

pub(crate) mod column_assignment;
pub(crate) mod cte;
pub(crate) mod expression_builder;
pub(crate) mod limit;
pub(crate) mod order;
pub(crate) mod predicate;
pub(crate) mod returning;
pub(crate) mod sql_builder;
pub(crate) mod update;
pub mod value;

pub(crate) use expression_builder::ExpressionBuilder;
pub(crate) use sql_builder::SQLBuilder;
