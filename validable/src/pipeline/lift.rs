//! Conversions that lift values into pipelines.

use super::Validable;
use serde_json::Value;
use std::future::Future;

/// Anything a pipeline can start from: a plain value, an existing pipeline,
/// or a [`Deferred`] in-flight computation.
pub trait IntoValidable {
    fn into_validable(self) -> Validable;
}

impl IntoValidable for Validable {
    fn into_validable(self) -> Validable {
        Validable::from_validable(&self)
    }
}

impl IntoValidable for &Validable {
    fn into_validable(self) -> Validable {
        Validable::from_validable(self)
    }
}

macro_rules! into_validable_from_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoValidable for $ty {
                fn into_validable(self) -> Validable {
                    Validable::new(self)
                }
            }
        )*
    };
}

into_validable_from_value!(Value, bool, i32, i64, u32, u64, f64, String, &str);

/// In-flight computation waiting to be lifted. See [`deferred`].
pub struct Deferred<F>(F);

/// Mark a future so [`create`] lifts its outcome rather than the future itself.
pub fn deferred<F, T, E>(fut: F) -> Deferred<F>
where
    F: Future<Output = Result<T, E>> + Send + 'static,
    T: Into<Value>,
    E: Into<Value>,
{
    Deferred(fut)
}

impl<F, T, E> IntoValidable for Deferred<F>
where
    F: Future<Output = Result<T, E>> + Send + 'static,
    T: Into<Value>,
    E: Into<Value>,
{
    fn into_validable(self) -> Validable {
        Validable::from_future(self.0)
    }
}

/// Start a pipeline from `source`.
pub fn create(source: impl IntoValidable) -> Validable {
    source.into_validable()
}

/// Alias of [`create`].
pub fn of(source: impl IntoValidable) -> Validable {
    create(source)
}
