//! Asynchronous result/validation pipelines.
//!
//! A [`Validable`] threads a value through fallible, possibly asynchronous
//! steps. Failures short-circuit every later [`chain`](Validable::chain)
//! until an [`or_else`](Validable::or_else) recovers, and every step's output
//! is recorded under a name so later steps can read it from the [`Bag`].
//!
//! ```ignore
//! use serde_json::json;
//! use validable::{create, sync_step};
//!
//! let value = create(10)
//!     .chain(sync_step(|_, _| Err(json!("error"))))
//!     .chain(sync_step(|v, _| Ok(json!(v.as_i64().unwrap_or(0) * 10))))
//!     .or_else(sync_step(|_, _| Ok(json!(100))))
//!     .value()
//!     .await;
//! assert_eq!(value, json!(100));
//! ```

pub mod bag;
pub mod constants;
mod engine;
pub mod errors;
pub mod failure;
pub mod logging;
pub mod pipeline;
pub mod record;
pub mod step;

pub use bag::Bag;
pub use errors::{ValidableError, ValidableResult};
pub use failure::{
    FailureContext, FailureHandlers, FailureTransformer, reset_failure_transformer,
    set_failure_transformer, set_failure_transformer_fn,
};
pub use logging::init_logging;
pub use pipeline::{Deferred, IntoValidable, MatchArms, Validable, create, deferred, of};
pub use record::{Outcome, Sequence, Settlement, StepRecord};
pub use step::{BoxedStep, FnStep, Step, StepResult, StepSpec, SyncStep, step_fn, sync_step};
