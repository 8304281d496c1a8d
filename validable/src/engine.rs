//! Step application.
//!
//! [`apply`] is the only place failures are captured and reshaped. Every
//! composition operator delegates to it: it names the step, checks the name
//! against the lineage, runs the step with the last value and the bag, and
//! appends exactly one record on the matching channel.

use crate::errors::ValidableError;
use crate::failure::{self, FailureContext};
use crate::record::{Sequence, Settlement, StepRecord};
use crate::step::BoxedStep;
use futures::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Instant;

/// Run `step` against `sequence`.
///
/// Returns `Ok` with a resolved record appended, or `Err` with a rejected
/// record appended whose value went through the failure transformer. The
/// channel `sequence` came from does not matter here.
pub(crate) async fn apply(step: BoxedStep, name: Option<String>, sequence: Sequence) -> Settlement {
    let name = name.unwrap_or_else(|| sequence.next_default_name());

    if sequence.contains(&name) {
        tracing::warn!(step = %name, "Step name already recorded in lineage");
        let raw = Value::String(ValidableError::NameCollision(name.clone()).to_string());
        return Err(reject(&sequence, name, raw));
    }

    let step_start = Instant::now();
    let run = step.run(sequence.last_value(), sequence.bag());

    match AssertUnwindSafe(run).catch_unwind().await {
        Ok(Ok(value)) => {
            tracing::debug!(
                step = %name,
                duration_ms = step_start.elapsed().as_millis() as u64,
                "Step resolved"
            );
            Ok(sequence.append(StepRecord::resolved(name, value)))
        }
        Ok(Err(raw)) => {
            tracing::debug!(
                step = %name,
                duration_ms = step_start.elapsed().as_millis() as u64,
                error = %raw,
                "Step rejected"
            );
            Err(reject(&sequence, name, raw))
        }
        Err(payload) => {
            let err = ValidableError::StepPanicked {
                step: name.clone(),
                message: panic_message(payload.as_ref()),
            };
            tracing::warn!(step = %name, "{}", err);
            Err(reject(&sequence, name, Value::String(err.to_string())))
        }
    }
}

fn reject(sequence: &Sequence, name: String, raw: Value) -> Sequence {
    let value = failure::transform(&FailureContext {
        error: &raw,
        last: sequence.last(),
        sequence,
    });
    sequence.append(StepRecord::rejected(name, value))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Outcome;
    use crate::step::{step_fn, sync_step};
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn start(value: Value) -> Sequence {
        Sequence::initial(value, Outcome::Resolved)
    }

    #[tokio::test]
    async fn test_resolved_step_appends_default_name() {
        let step = Box::new(sync_step(|v, _| Ok(json!(v.as_i64().unwrap_or(0) + 1))));
        let seq = apply(step, None, start(json!(10))).await.unwrap();

        assert_eq!(seq.len(), 2);
        let last = seq.last().unwrap();
        assert_eq!(last.name, "v1");
        assert_eq!(last.value, json!(11));
        assert_eq!(last.outcome, Outcome::Resolved);
    }

    #[tokio::test]
    async fn test_rejected_step_keeps_lineage() {
        let step = Box::new(step_fn(|_, _| async { Err(json!("error")) }));
        let seq = apply(step, Some("check".into()), start(json!(10)))
            .await
            .unwrap_err();

        assert_eq!(seq.records()[0], StepRecord::resolved("v0", json!(10)));
        assert_eq!(seq.records()[1], StepRecord::rejected("check", json!("error")));
    }

    #[tokio::test]
    async fn test_collision_rejects_before_running() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        let step = Box::new(sync_step(move |v, _| {
            flag.store(true, Ordering::SeqCst);
            Ok(v)
        }));

        let seq = apply(step, Some("v0".into()), start(json!(1)))
            .await
            .unwrap_err();

        assert!(!ran.load(Ordering::SeqCst));
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.last_value(), json!("Variable 'v0' already exists"));
    }

    #[tokio::test]
    async fn test_default_name_collision() {
        // Two records, so the next unnamed step would be "v2", which is taken.
        let seq = start(json!(1)).append(StepRecord::resolved("v2", json!(2)));
        let step = Box::new(sync_step(|v, _| Ok(v)));

        let seq = apply(step, None, seq).await.unwrap_err();
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.records()[2].name, "v2");
        assert_eq!(seq.last_value(), json!("Variable 'v2' already exists"));
    }

    #[tokio::test]
    async fn test_panic_becomes_failure() {
        let step = Box::new(sync_step(|_, _| panic!("exploded")));
        let seq = apply(step, None, start(json!(1))).await.unwrap_err();

        assert_eq!(seq.last_value(), json!("step 'v1' panicked: exploded"));
    }

    #[tokio::test]
    async fn test_step_sees_full_bag() {
        let seq = start(json!(10))
            .append(StepRecord::resolved("incremented", json!(11)))
            .append(StepRecord::resolved("duplicated", json!(22)));
        let step = Box::new(sync_step(|_, bag| {
            let sum = bag["incremented"].as_i64().unwrap_or(0) + bag["duplicated"].as_i64().unwrap_or(0);
            Ok(json!(sum))
        }));

        let seq = apply(step, None, seq).await.unwrap();
        assert_eq!(seq.last().unwrap().name, "v3");
        assert_eq!(seq.last_value(), json!(33));
    }
}
