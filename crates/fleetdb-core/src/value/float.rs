use serde::{Serialize, Serializer};
use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
};
use thiserror::Error as ThisError;

///
/// FloatError
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, ThisError)]
pub enum FloatError {
    #[error("float value must be finite")]
    NonFinite,
}

///
/// Float64
///
/// Finite `f64` with a total order.
/// Negative zero is normalized to zero so equality and ordering agree.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct Float64(f64);

impl Float64 {
    pub fn try_new(value: f64) -> Result<Self, FloatError> {
        if !value.is_finite() {
            return Err(FloatError::NonFinite);
        }

        // -0.0 == 0.0 must hold under Eq and Ord
        let value = if value == 0.0 { 0.0 } else { value };

        Ok(Self(value))
    }

    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Float64 {
    type Error = FloatError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl PartialEq for Float64 {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for Float64 {}

impl PartialOrd for Float64 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Float64 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for Float64 {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl fmt::Display for Float64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Float64 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.0)
    }
}
