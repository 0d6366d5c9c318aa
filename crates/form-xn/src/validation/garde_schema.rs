//! Adapter for [`garde`] schemas.
//!
//! The flat record is decoded into `T` first, then `T`'s garde rules run with
//! the adapter's context. Every reported error is filed under its path.
//!
//! ```ignore
//! use garde::Validate;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, Validate)]
//! struct TodoInput {
//!     #[garde(length(min = 1))]
//!     title: String,
//! }
//!
//! let validator = form_xn::garde_validator::<TodoInput>();
//! ```

use super::{catch_engine_panic, decode_fields, FieldErrors, SafeValidator, ValidationResult};
use crate::query::QueryParams;
use serde::de::DeserializeOwned;
use std::fmt;
use std::marker::PhantomData;

/// Validates with a garde schema after decoding the record into `T`.
pub struct GardeValidator<T: garde::Validate> {
    context: T::Context,
    _marker: PhantomData<fn() -> T>,
}

impl<T: garde::Validate> GardeValidator<T> {
    /// Validator using an explicit garde context.
    pub fn with_context(context: T::Context) -> Self {
        Self {
            context,
            _marker: PhantomData,
        }
    }
}

impl<T> GardeValidator<T>
where
    T: garde::Validate,
    T::Context: Default,
{
    pub fn new() -> Self {
        Self::with_context(T::Context::default())
    }
}

impl<T> Default for GardeValidator<T>
where
    T: garde::Validate,
    T::Context: Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for GardeValidator<T>
where
    T: garde::Validate,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GardeValidator")
            .field("schema", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T> SafeValidator<T> for GardeValidator<T>
where
    T: garde::Validate + DeserializeOwned,
    T::Context: Send + Sync,
{
    fn safe_parse(&self, input: &QueryParams) -> ValidationResult<T> {
        catch_engine_panic(|| {
            let data: T = match decode_fields(input) {
                Ok(data) => data,
                Err(errors) => return ValidationResult::Failure(errors),
            };

            match data.validate_with(&self.context) {
                Ok(()) => ValidationResult::Success(data),
                Err(report) => ValidationResult::Failure(report_to_errors(&report)),
            }
        })
    }
}

/// Shorthand for [`GardeValidator::new`].
pub fn garde_validator<T>() -> GardeValidator<T>
where
    T: garde::Validate,
    T::Context: Default,
{
    GardeValidator::new()
}

fn report_to_errors(report: &garde::Report) -> FieldErrors {
    report
        .iter()
        .map(|(path, error)| (path.to_string(), error.message().to_string()))
        .collect()
}
