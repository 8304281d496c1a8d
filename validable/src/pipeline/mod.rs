//! Pipeline composition and resolution.
//!
//! A [`Validable`] holds one shared asynchronous computation that settles to
//! a step lineage on either the success or the failure channel.
//!
//! ## Architecture
//!
//! ```text
//! create(10) ──chain(f)──▶ [v0, v1] ──chain(g)──▶ [v0, v1, v2] ──match──▶ value
//!                              │
//!                              ╰── f rejects: [v0, v1!] ──chain(g)──▶ [v0, v1!]  (g skipped)
//!                                                       ──or_else(h)─▶ [v0, v1!, v2]
//! ```
//!
//! - Composition (`chain`, `or_else`, `mchain`) never touches the source
//!   pipeline; it derives a new one that awaits the source's settlement.
//!   Each link is spawned on the current tokio runtime when it is created.
//! - `chain` only runs on the success channel, `or_else` only on the failure
//!   channel. The other channel passes through with the identical lineage.
//! - Terminal operations (`fold`, `match_with`, `value`, `is_valid`, `render`,
//!   `for_each`, `tap`) read the settled lineage.
//!
//! ## Example
//!
//! ```ignore
//! use validable::{create, sync_step, StepSpec};
//!
//! let total = create(10)
//!     .chain_named("incremented", sync_step(|v, _| Ok(json!(v.as_i64().unwrap() + 1))))
//!     .chain_named("duplicated", sync_step(|v, _| Ok(json!(v.as_i64().unwrap() * 2))))
//!     .chain(sync_step(|_, bag| Ok(json!(bag["incremented"].as_i64().unwrap() + bag["duplicated"].as_i64().unwrap()))))
//!     .value()
//!     .await; // 33
//! ```

mod lift;
mod terminal;
mod validable;

pub use lift::{Deferred, IntoValidable, create, deferred, of};
pub use terminal::MatchArms;
pub use validable::Validable;
