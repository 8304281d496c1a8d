//! Operations that resolve a pipeline into caller-facing values.

use super::Validable;
use crate::bag::Bag;
use crate::errors::{ValidableError, ValidableResult};
use crate::record::{Sequence, Settlement};
use serde_json::Value;
use std::fmt;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

type Arm = Box<dyn FnOnce(Value, Bag) -> Value + Send>;

/// Named callbacks for [`Validable::match_with`].
///
/// Either arm may be left out; a missing arm returns the last value unchanged.
#[derive(Default)]
pub struct MatchArms {
    on_success: Option<Arm>,
    on_failure: Option<Arm>,
}

impl MatchArms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_success<F>(mut self, arm: F) -> Self
    where
        F: FnOnce(Value, Bag) -> Value + Send + 'static,
    {
        self.on_success = Some(Box::new(arm));
        self
    }

    pub fn on_failure<F>(mut self, arm: F) -> Self
    where
        F: FnOnce(Value, Bag) -> Value + Send + 'static,
    {
        self.on_failure = Some(Box::new(arm));
        self
    }
}

impl fmt::Debug for MatchArms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchArms")
            .field("on_success", &self.on_success.is_some())
            .field("on_failure", &self.on_failure.is_some())
            .finish()
    }
}

impl Validable {
    /// Wait for the pipeline and return its lineage on the settled channel.
    pub async fn settle(&self) -> Settlement {
        self.shared_settlement().await
    }

    /// Lineage regardless of channel.
    pub async fn sequence(&self) -> Sequence {
        match self.settle().await {
            Ok(sequence) | Err(sequence) => sequence,
        }
    }

    pub async fn bag(&self) -> Bag {
        self.sequence().await.bag()
    }

    /// Resolve through one of two callbacks, chosen by the settled channel.
    /// Both receive the last value and the bag.
    ///
    /// Both arms are required here. To supply only one and keep the last value
    /// on the other channel, use [`match_with`](Self::match_with).
    pub async fn fold<T, S, F>(&self, on_success: S, on_failure: F) -> T
    where
        S: FnOnce(Value, Bag) -> T,
        F: FnOnce(Value, Bag) -> T,
    {
        match self.settle().await {
            Ok(sequence) => on_success(sequence.last_value(), sequence.bag()),
            Err(sequence) => on_failure(sequence.last_value(), sequence.bag()),
        }
    }

    /// Like [`fold`](Self::fold) with optional arms defaulting to identity.
    pub async fn match_with(&self, arms: MatchArms) -> Value {
        let (arm, sequence) = match self.settle().await {
            Ok(sequence) => (arms.on_success, sequence),
            Err(sequence) => (arms.on_failure, sequence),
        };

        match arm {
            Some(arm) => arm(sequence.last_value(), sequence.bag()),
            None => sequence.last_value(),
        }
    }

    /// Last value on whichever channel the pipeline settled.
    pub async fn value(&self) -> Value {
        self.match_with(MatchArms::new()).await
    }

    pub async fn is_valid(&self) -> bool {
        self.settle().await.is_ok()
    }

    pub async fn is_invalid(&self) -> bool {
        self.settle().await.is_err()
    }

    /// Run `fx` with the last value and the bag once the pipeline settles on
    /// the success channel. Nothing runs on the failure channel.
    ///
    /// The pipeline is driven on a spawned tokio task; the returned handle can
    /// be awaited or dropped.
    pub fn for_each<F>(&self, fx: F) -> ValidableResult<JoinHandle<()>>
    where
        F: FnOnce(Value, Bag) + Send + 'static,
    {
        let runtime = Handle::try_current().map_err(|e| ValidableError::NoRuntime(e.to_string()))?;
        let settlement = self.shared_settlement();

        Ok(runtime.spawn(async move {
            match settlement.await {
                Ok(sequence) => fx(sequence.last_value(), sequence.bag()),
                Err(sequence) => {
                    tracing::trace!(steps = sequence.len(), "for_each skipped on failed pipeline");
                }
            }
        }))
    }

    /// [`for_each`](Self::for_each) that hands back this pipeline, for inline
    /// taps inside a composition.
    pub fn tap<F>(&self, fx: F) -> ValidableResult<Validable>
    where
        F: FnOnce(Value, Bag) + Send + 'static,
    {
        self.for_each(fx)?;
        Ok(self.clone())
    }

    /// `"Success - <value>"` or `"Fail - <value>"`.
    ///
    /// Strings render without quotes, integral floats without a fraction
    /// (`1.0` is `1`), and arrays as their items joined by `,` with nulls left
    /// empty. Objects render as JSON.
    pub async fn render(&self) -> String {
        match self.settle().await {
            Ok(sequence) => format!("Success - {}", display_value(&sequence.last_value())),
            Err(sequence) => format!("Fail - {}", display_value(&sequence.last_value())),
        }
    }

    /// Channel inversion. Reserved: its semantics are undefined, so it always
    /// fails with [`ValidableError::Unsupported`].
    pub fn swap(&self) -> ValidableResult<Validable> {
        Err(ValidableError::Unsupported("swap"))
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => match number.as_f64() {
            Some(float) if number.is_f64() => float.to_string(),
            _ => number.to_string(),
        },
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => display_value(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::sync_step;
    use serde_json::json;

    fn failed() -> Validable {
        Validable::new(10).chain(sync_step(|_, _| Err(json!("error"))))
    }

    #[tokio::test]
    async fn test_match_arms_default_independently() {
        let on_success_only = MatchArms::new().on_success(|_, _| json!("ok"));
        assert_eq!(failed().match_with(on_success_only).await, json!("error"));

        let on_failure_only = MatchArms::new().on_failure(|_, _| json!("recovered"));
        assert_eq!(failed().match_with(on_failure_only).await, json!("recovered"));
        assert_eq!(
            Validable::new(1)
                .match_with(MatchArms::new().on_failure(|_, _| json!(0)))
                .await,
            json!(1)
        );
    }

    #[tokio::test]
    async fn test_fold_passes_bag() {
        let names = failed()
            .fold(|_, _| Vec::new(), |_, bag| bag.keys().cloned().collect::<Vec<_>>())
            .await;
        assert_eq!(names, vec!["v0".to_string(), "v1".to_string()]);
    }

    #[tokio::test]
    async fn test_render() {
        assert_eq!(Validable::new(11).render().await, "Success - 11");
        assert_eq!(failed().render().await, "Fail - error");
        assert_eq!(
            Validable::new(json!({ "a": 1 })).render().await,
            r#"Success - {"a":1}"#
        );
    }

    #[tokio::test]
    async fn test_render_numbers_and_arrays() {
        assert_eq!(Validable::new(1.0).render().await, "Success - 1");
        assert_eq!(Validable::new(2.5).render().await, "Success - 2.5");
        assert_eq!(
            Validable::new(json!([1, "a", null, [2, 3]])).render().await,
            "Success - 1,a,,2,3"
        );
        assert_eq!(Validable::new(json!([])).render().await, "Success - ");
    }

    #[tokio::test]
    async fn test_swap_is_unsupported() {
        assert_eq!(
            Validable::new(1).swap().unwrap_err(),
            ValidableError::Unsupported("swap")
        );
    }

    #[test]
    fn test_for_each_requires_runtime() {
        let err = Validable::new(1).for_each(|_, _| {}).unwrap_err();
        assert!(matches!(err, ValidableError::NoRuntime(_)));
    }
}
