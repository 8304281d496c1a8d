//! Process-wide failure transformer.
//!
//! Whenever a step rejects (including name collisions and panics), the raw
//! error is passed through the active transformer and the result becomes the
//! value of the rejected record. The default is the identity: the raw error is
//! stored as-is.
//!
//! **Shared state**: there is exactly one active transformer per process. It
//! is read on every failing step of every pipeline, so replacing it while
//! other pipelines are failing gives no guarantee which transformer they see.
//! Install it once at startup.

use crate::record::{Sequence, StepRecord};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Everything a transformer may inspect about a failure.
#[derive(Debug, Clone, Copy)]
pub struct FailureContext<'a> {
    /// Raw error produced by the step (or by the engine).
    pub error: &'a Value,
    /// Last record before the failing step.
    pub last: Option<&'a StepRecord>,
    /// Lineage the failing step was applied to.
    pub sequence: &'a Sequence,
}

pub type FailureTransformer = Arc<dyn Fn(&FailureContext<'_>) -> Value + Send + Sync>;

type FailureHandler = Box<dyn Fn(&Value) -> Value + Send + Sync>;

/// `None` means identity.
static FAILURE_TRANSFORMER: RwLock<Option<FailureTransformer>> = parking_lot::const_rwlock(None);

/// Named handlers that reshape a raw error into a structured object.
///
/// Each handler contributes one field of the stored failure value:
///
/// ```ignore
/// set_failure_transformer(
///     FailureHandlers::new()
///         .field("code", |e| json!(format!("ERR:{}", e.as_str().unwrap_or_default())))
///         .field("raw", |e| e.clone()),
/// );
/// ```
#[derive(Default)]
pub struct FailureHandlers {
    fields: Vec<(String, FailureHandler)>,
}

impl FailureHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an output field computed from the raw error. Re-using a field name
    /// replaces the earlier handler.
    pub fn field<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        let name = name.into();
        self.fields.retain(|(existing, _)| *existing != name);
        self.fields.push((name, Box::new(handler)));
        self
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Build the transformer without installing it.
    pub fn into_transformer(self) -> FailureTransformer {
        let fields = self.fields;
        transformer(move |ctx| {
            let object: Map<String, Value> = fields
                .iter()
                .map(|(name, handler)| (name.clone(), handler(ctx.error)))
                .collect();
            Value::Object(object)
        })
    }
}

impl fmt::Debug for FailureHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.field_names()).finish()
    }
}

/// Replace the active transformer with one built from `handlers`.
pub fn set_failure_transformer(handlers: FailureHandlers) {
    tracing::debug!(
        fields = ?handlers.field_names().collect::<Vec<_>>(),
        "Installing failure transformer"
    );
    install(Some(handlers.into_transformer()));
}

/// Replace the active transformer with an arbitrary function of the failure.
pub fn set_failure_transformer_fn<F>(transformer: F)
where
    F: Fn(&FailureContext<'_>) -> Value + Send + Sync + 'static,
{
    tracing::debug!("Installing custom failure transformer");
    install(Some(self::transformer(transformer)));
}

fn transformer<F>(f: F) -> FailureTransformer
where
    F: Fn(&FailureContext<'_>) -> Value + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Restore the identity transformer.
pub fn reset_failure_transformer() {
    tracing::debug!("Resetting failure transformer to identity");
    install(None);
}

fn install(transformer: Option<FailureTransformer>) {
    *FAILURE_TRANSFORMER.write() = transformer;
}

/// Reshape a raw failure with the active transformer.
pub(crate) fn transform(ctx: &FailureContext<'_>) -> Value {
    // Clone out so user code never runs under the lock.
    let active = FAILURE_TRANSFORMER.read().clone();
    match active {
        Some(transformer) => transformer(ctx),
        None => ctx.error.clone(),
    }
}
