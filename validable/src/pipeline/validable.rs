//! The pipeline handle and its composition operators.

use crate::engine;
use crate::record::{Outcome, Sequence, Settlement};
use crate::step::StepSpec;
use futures::future::{self, BoxFuture, Shared};
use futures::FutureExt;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::panic;
use tokio::runtime::Handle;

type SharedSettlement = Shared<BoxFuture<'static, Settlement>>;

/// Handle to one linear, asynchronously running pipeline.
///
/// **Scheduling**: every link starts as soon as it is created (inside a tokio
/// runtime) and runs to completion whether or not anything awaits it.
///
/// **Cloning**: clones share the same computation. Each step of a lineage runs
/// exactly once, however many derived pipelines or terminal operations await
/// it.
#[derive(Clone)]
pub struct Validable {
    settlement: SharedSettlement,
}

impl Validable {
    /// Start `settlement` right away on the current tokio runtime.
    ///
    /// The spawned task owns the computation, so it keeps running when every
    /// handle is dropped and a failing step meets the failure transformer
    /// installed when it fails, not when somebody first awaits it. Outside a
    /// runtime the computation is driven by whoever awaits it first.
    fn from_settlement<F>(settlement: F) -> Self
    where
        F: Future<Output = Settlement> + Send + 'static,
    {
        let settlement = match Handle::try_current() {
            Ok(runtime) => {
                let task = runtime.spawn(settlement);
                async move {
                    match task.await {
                        Ok(settlement) => settlement,
                        Err(err) if err.is_panic() => panic::resume_unwind(err.into_panic()),
                        Err(err) => panic!("pipeline task did not complete: {}", err),
                    }
                }
                .boxed()
            }
            Err(_) => settlement.boxed(),
        };

        Self {
            settlement: settlement.shared(),
        }
    }

    pub(super) fn shared_settlement(&self) -> SharedSettlement {
        self.settlement.clone()
    }

    /// Lift anything [`IntoValidable`](super::IntoValidable) into a pipeline.
    pub fn of(source: impl super::IntoValidable) -> Self {
        source.into_validable()
    }

    /// Lift a plain value: a one-record success lineage.
    pub fn new(value: impl Into<Value>) -> Self {
        let sequence = Sequence::initial(value.into(), Outcome::Resolved);
        Self::from_settlement(future::ready(Ok(sequence)))
    }

    /// Lift an in-flight computation. Fulfillment becomes a one-record success
    /// lineage, rejection a one-record failure lineage holding the raw error.
    pub fn from_future<F, T, E>(fut: F) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
        T: Into<Value>,
        E: Into<Value>,
    {
        Self::from_settlement(async move {
            match fut.await {
                Ok(value) => Ok(Sequence::initial(value.into(), Outcome::Resolved)),
                Err(err) => Err(Sequence::initial(err.into(), Outcome::Rejected)),
            }
        })
    }

    /// New pipeline settling exactly like `source`, without re-running steps.
    pub fn from_validable(source: &Validable) -> Self {
        Self::from_settlement(source.shared_settlement())
    }

    /// Continue on the success channel.
    ///
    /// A failed source passes through unchanged and `step` is never run.
    pub fn chain(&self, step: impl Into<StepSpec>) -> Validable {
        let (name, step) = step.into().into_parts();
        let source = self.shared_settlement();

        Self::from_settlement(async move {
            match source.await {
                Ok(sequence) => engine::apply(step, name, sequence).await,
                Err(sequence) => {
                    tracing::trace!(steps = sequence.len(), "chain skipped on failed pipeline");
                    Err(sequence)
                }
            }
        })
    }

    pub fn chain_named(&self, name: impl Into<String>, step: impl crate::Step + 'static) -> Validable {
        self.chain(StepSpec::named(name, step))
    }

    /// Recover on the failure channel.
    ///
    /// A valid source passes through unchanged and `step` is never run. The
    /// recovery step sees the failed lineage, including the rejected record.
    pub fn or_else(&self, step: impl Into<StepSpec>) -> Validable {
        let (name, step) = step.into().into_parts();
        let source = self.shared_settlement();

        Self::from_settlement(async move {
            match source.await {
                Ok(sequence) => {
                    tracing::trace!(steps = sequence.len(), "or_else skipped on valid pipeline");
                    Ok(sequence)
                }
                Err(sequence) => engine::apply(step, name, sequence).await,
            }
        })
    }

    pub fn or_else_named(&self, name: impl Into<String>, step: impl crate::Step + 'static) -> Validable {
        self.or_else(StepSpec::named(name, step))
    }

    /// Left fold of [`chain`](Self::chain) over `steps`.
    pub fn mchain<I>(&self, steps: I) -> Validable
    where
        I: IntoIterator,
        I::Item: Into<StepSpec>,
    {
        steps
            .into_iter()
            .fold(self.clone(), |pipeline, step| pipeline.chain(step))
    }
}

impl fmt::Debug for Validable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.settlement.peek() {
            Some(Ok(sequence)) => f.debug_tuple("Validable::Success").field(sequence).finish(),
            Some(Err(sequence)) => f.debug_tuple("Validable::Fail").field(sequence).finish(),
            None => f.write_str("Validable::Pending"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::StepRecord;
    use crate::step::sync_step;
    use serde_json::json;

    #[tokio::test]
    async fn test_new_settles_immediately() {
        let v = Validable::new(json!(10));
        let seq = v.settle().await.unwrap();
        assert_eq!(seq.records(), &[StepRecord::resolved("v0", json!(10))]);
    }

    #[tokio::test]
    async fn test_from_future_rejection() {
        let v = Validable::from_future(async { Err::<i64, _>("nope") });
        let seq = v.settle().await.unwrap_err();
        assert_eq!(seq.records(), &[StepRecord::rejected("v0", json!("nope"))]);
    }

    #[tokio::test]
    async fn test_from_validable_preserves_channel() {
        let failed = Validable::new(1).chain(sync_step(|_, _| Err(json!("bad"))));
        let copy = Validable::from_validable(&failed);

        assert_eq!(copy.settle().await, failed.settle().await);
        assert!(copy.is_invalid().await);
    }

    #[tokio::test]
    async fn test_debug_reports_settled_state() {
        let v = Validable::new(1);
        assert_eq!(format!("{:?}", v), "Validable::Pending");

        v.settle().await.unwrap();
        assert!(format!("{:?}", v).starts_with("Validable::Success"));
    }
}
