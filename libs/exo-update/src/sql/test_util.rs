// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

/// Assert that a built expression has the given SQL and generated parameters (in binding order).
///
/// # Example:
/// ```
/// assert_binding!(
///     assignment.to_sql(&Postgres),
///     r#""name" = :update_param_0"#,
///     "Ana"
/// );
/// ```
macro_rules! assert_binding {
    ($actual:expr, $expected_stmt:expr) => {
        let (actual_stmt, actual_params) = $actual;
        assert_eq!(actual_stmt, $expected_stmt);
        assert!(actual_params.is_empty(), "Extra actual parameters: {:?}", actual_params);
    };
    ($actual:expr, $expected_stmt:expr, $($expected_param:expr),+) => {
        let (actual_stmt, actual_params) = $actual;
        assert_eq!(actual_stmt, $expected_stmt);
        let actual_values: Vec<$crate::Value> = actual_params.into_values().collect();
        let expected_values: Vec<$crate::Value> = vec![$($crate::Value::from($expected_param)),+];
        assert_eq!(actual_values, expected_values, "Parameter mismatch");
    };
}
