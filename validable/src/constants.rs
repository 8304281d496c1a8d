//! Step naming constants.
//!
//! Centralized location for the reserved names the engine assigns to steps.

/// Name given to the record that lifts the starting value into a pipeline.
pub const INITIAL_STEP_NAME: &str = "v0";

/// Prefix for steps applied without an explicit name.
///
/// The full name is the prefix followed by the sequence length at the time
/// the step is applied, so the first step after the initial lift is `v1`.
pub const DEFAULT_STEP_PREFIX: &str = "v";

/// Environment variable consulted by [`crate::logging::init_logging`].
pub const LOG_FILTER_ENV: &str = "VALIDABLE_LOG";

/// Filter used when neither an explicit filter nor the env var is set.
pub const DEFAULT_LOG_FILTER: &str = "info";
