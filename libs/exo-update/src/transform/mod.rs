// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Compiles an [`AbstractUpdate`](crate::AbstractUpdate) into SQL for a dialect.

pub(crate) mod parameters;
pub(crate) mod property_names;
pub(crate) mod update_transformer;
pub(crate) mod value_normalizer;
pub(crate) mod where_transformer;
