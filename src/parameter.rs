/*!
Typed option values. Every value reaches the resolver as a string; the
traits here turn it into a [`ParamValue`] according to the option's declared
[`ValueType`], checking numeric bounds along the way.
 */

use std::{
    fmt::{self, Display},
    str::FromStr,
};

use crate::descriptor::ValueType;

/// A concrete value for a tunable parameter
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Boolean(bool),
    Integer(i64),
    Double(f64),
    String(String),
}

impl ParamValue {
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            ParamValue::Boolean(value) => Some(value),
            _ => None,
        }
    }

    #[inline]
    pub fn as_integer(&self) -> Option<i64> {
        match *self {
            ParamValue::Integer(value) => Some(value),
            _ => None,
        }
    }

    #[inline]
    pub fn as_double(&self) -> Option<f64> {
        match *self {
            ParamValue::Double(value) => Some(value),
            _ => None,
        }
    }
}

impl Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Boolean(value) => value.fmt(f),
            ParamValue::Integer(value) => value.fmt(f),
            ParamValue::Double(value) => value.fmt(f),
            ParamValue::String(value) => value.fmt(f),
        }
    }
}

/// The inclusive bound that a value violated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bound {
    Minimum(String),
    Maximum(String),
}

impl Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Minimum(min) => write!(f, "must be at least {min}"),
            Bound::Maximum(max) => write!(f, "must be at most {max}"),
        }
    }
}

/// Error for things that can go wrong while converting a value
pub trait Error {
    /// The option requires a value, and none was provided
    fn needs_arg() -> Self;

    /// The value failed to parse into an instance of the type
    fn parse_error(arg: &str, msg: impl Display) -> Self;

    /// The value parsed, but is outside of the declared bounds
    fn out_of_range(arg: &str, bound: Bound) -> Self;
}

/// Types that can be parsed from a single option value
pub trait Value: Sized {
    fn from_arg<E: Error>(arg: &str) -> Result<Self, E>;
}

/// For types with a [`FromStr`] implementation, [`ParsedValue`] automatically
/// gives them a [`Value`] implementation.
pub trait ParsedValue: FromStr {}

impl<T> Value for T
where
    T: ParsedValue,
    T::Err: Display,
{
    #[inline]
    fn from_arg<E: Error>(arg: &str) -> Result<Self, E> {
        arg.trim().parse().map_err(|err| E::parse_error(arg, err))
    }
}

impl ParsedValue for i64 {}
impl ParsedValue for f64 {}

/// Booleans are matched case-insensitively, so `True` and `FALSE` both work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Switch(bool);

impl Value for Switch {
    fn from_arg<E: Error>(arg: &str) -> Result<Self, E> {
        match arg.trim() {
            s if s.eq_ignore_ascii_case("true") => Ok(Switch(true)),
            s if s.eq_ignore_ascii_case("false") => Ok(Switch(false)),
            _ => Err(E::parse_error(arg, "expected true or false")),
        }
    }
}

fn check_bounds<T, E>(arg: &str, value: T, min: T, max: T) -> Result<T, E>
where
    T: PartialOrd + Display,
    E: Error,
{
    if value < min {
        Err(E::out_of_range(arg, Bound::Minimum(min.to_string())))
    } else if value > max {
        Err(E::out_of_range(arg, Bound::Maximum(max.to_string())))
    } else {
        Ok(value)
    }
}

/**
Convert a value according to its declared type. `arg` is [`None`] when the
option was present without a value, which is only valid for booleans (where
it means `true`).
 */
pub fn parse_typed<E: Error>(value_type: &ValueType, arg: Option<&str>) -> Result<ParamValue, E> {
    let arg = match (value_type, arg) {
        (ValueType::Boolean, None) => return Ok(ParamValue::Boolean(true)),
        (_, None) => return Err(E::needs_arg()),
        (_, Some(arg)) => arg,
    };

    match *value_type {
        ValueType::Boolean => Switch::from_arg(arg).map(|Switch(value)| ParamValue::Boolean(value)),
        ValueType::Integer { min, max } => i64::from_arg(arg)
            .and_then(|value| check_bounds(arg, value, min, max))
            .map(ParamValue::Integer),
        ValueType::Double { min, max } => f64::from_arg(arg)
            .and_then(|value| match value.is_finite() {
                true => Ok(value),
                false => Err(E::parse_error(arg, "expected a finite number")),
            })
            .and_then(|value| check_bounds(arg, value, min, max))
            .map(ParamValue::Double),
        ValueType::String => Ok(ParamValue::String(arg.to_owned())),
    }
}

/// Basic implementation of [`Error`], without any context about the option
/// the value belongs to.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    #[error("a value is required")]
    NeedsArgument,

    #[error("failed to parse {arg:?}: {message}")]
    Parse { arg: String, message: String },

    #[error("{arg} is out of range: {bound}")]
    OutOfRange { arg: String, bound: Bound },
}

impl Error for ValueError {
    #[inline]
    fn needs_arg() -> Self {
        Self::NeedsArgument
    }

    #[inline]
    fn parse_error(arg: &str, msg: impl Display) -> Self {
        Self::Parse {
            arg: arg.to_owned(),
            message: msg.to_string(),
        }
    }

    #[inline]
    fn out_of_range(arg: &str, bound: Bound) -> Self {
        Self::OutOfRange {
            arg: arg.to_owned(),
            bound,
        }
    }
}
