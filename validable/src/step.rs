//! Step trait and adapters.
//!
//! A step receives the value of the previous record and the [`Bag`] of the
//! whole lineage, and either resolves to a new value or rejects with a raw
//! error. Both sides are JSON values so steps can reshape data freely.

use crate::bag::Bag;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::future::Future;

/// `Ok` resolves the step, `Err` carries the raw error of a rejection.
pub type StepResult = Result<Value, Value>;

/// Trait for transformation steps applied by a pipeline.
///
/// Implement this for reusable steps; closures go through [`step_fn`] or
/// [`sync_step`].
#[async_trait]
pub trait Step: Send + Sync {
    async fn run(&self, last: Value, bag: Bag) -> StepResult;
}

pub type BoxedStep = Box<dyn Step>;

/// Step backed by an async closure. See [`step_fn`].
pub struct FnStep<F> {
    f: F,
}

/// Wrap an async closure as a [`Step`].
///
/// ```ignore
/// let fetch = step_fn(|id, _bag| async move { lookup(id).await });
/// ```
pub fn step_fn<F, Fut>(f: F) -> FnStep<F>
where
    F: Fn(Value, Bag) -> Fut + Send + Sync,
    Fut: Future<Output = StepResult> + Send + 'static,
{
    FnStep { f }
}

#[async_trait]
impl<F, Fut> Step for FnStep<F>
where
    F: Fn(Value, Bag) -> Fut + Send + Sync,
    Fut: Future<Output = StepResult> + Send + 'static,
{
    async fn run(&self, last: Value, bag: Bag) -> StepResult {
        (self.f)(last, bag).await
    }
}

/// Step backed by a plain closure. See [`sync_step`].
pub struct SyncStep<F> {
    f: F,
}

/// Wrap a synchronous closure as a [`Step`].
pub fn sync_step<F>(f: F) -> SyncStep<F>
where
    F: Fn(Value, &Bag) -> StepResult + Send + Sync,
{
    SyncStep { f }
}

#[async_trait]
impl<F> Step for SyncStep<F>
where
    F: Fn(Value, &Bag) -> StepResult + Send + Sync,
{
    async fn run(&self, last: Value, bag: Bag) -> StepResult {
        (self.f)(last, &bag)
    }
}

/// A step plus the optional name it is recorded under.
///
/// Unnamed steps get the default `v<len>` name when applied.
pub struct StepSpec {
    name: Option<String>,
    step: BoxedStep,
}

impl StepSpec {
    pub fn new(step: impl Step + 'static) -> Self {
        Self {
            name: None,
            step: Box::new(step),
        }
    }

    pub fn named(name: impl Into<String>, step: impl Step + 'static) -> Self {
        Self {
            name: Some(name.into()),
            step: Box::new(step),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn into_parts(self) -> (Option<String>, BoxedStep) {
        (self.name, self.step)
    }
}

impl<S: Step + 'static> From<S> for StepSpec {
    fn from(step: S) -> Self {
        Self::new(step)
    }
}

impl fmt::Debug for StepSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepSpec")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
