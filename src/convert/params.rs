// In: src/convert/params.rs

//! The parameter encoder: host values → the nested structures Simplace expects.
//!
//! Simplace receives parameters as `Object[][]` (`[[name, value], ...]`) and
//! parameter lists as `Object[][][]`. This module only decides what every value
//! becomes; building the actual Java arrays is the JNI layer's job.
//!
//! Dispatch rule per value:
//!
//! | host value                         | encoded as                  |
//! |------------------------------------|-----------------------------|
//! | list of integers only (or empty)   | `int[]`                     |
//! | any other list                     | `double[]`                  |
//! | integer scalar                     | boxed `java.lang.Integer`   |
//! | anything else                      | passed through unchanged    |

use log::debug;
use num_traits::ToPrimitive;
use serde_json::{Map, Value};

use crate::convert::table::VarTable;
use crate::error::SimplaceError;

/// A single parameter value on the host side.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue<O> {
    /// A value of the host's dynamic data model.
    Json(Value),
    /// A handle that already lives on the Java side.
    Foreign(O),
}

impl<O> From<Value> for ParamValue<O> {
    fn from(value: Value) -> Self {
        ParamValue::Json(value)
    }
}

/// Insertion-ordered parameter map: SimVariable name → value.
pub type Parameters<O> = VarTable<ParamValue<O>>;

impl<O> From<Map<String, Value>> for VarTable<ParamValue<O>> {
    fn from(map: Map<String, Value>) -> Self {
        map.into_iter()
            .map(|(name, value)| (name, ParamValue::Json(value)))
            .collect()
    }
}

impl<O> TryFrom<Value> for VarTable<ParamValue<O>> {
    type Error = SimplaceError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(map.into()),
            other => Err(SimplaceError::UnsupportedParameter {
                name: "<parameters>".into(),
                reason: format!("expected a JSON object, got {}", other),
            }),
        }
    }
}

/// What a single parameter turns into on the Java side.
#[derive(Debug, Clone, PartialEq)]
pub enum EncodedValue<O> {
    IntArray(Vec<i32>),
    DoubleArray(Vec<f64>),
    BoxedInt(i32),
    PassThrough(ParamValue<O>),
}

/// `[[name, value], ...]` in input order.
pub type EncodedParameters<O> = Vec<(String, EncodedValue<O>)>;

fn is_integer(value: &Value) -> bool {
    matches!(value, Value::Number(n) if n.is_i64() || n.is_u64())
}

fn to_java_int(name: &str, value: &Value) -> Result<i32, SimplaceError> {
    value
        .as_i64()
        .and_then(|v| v.to_i32())
        .ok_or_else(|| SimplaceError::ParameterOutOfRange {
            name: name.to_string(),
            value: value.to_string(),
        })
}

/// Booleans inside a list count as `1.0` and `0.0`.
fn to_java_double(name: &str, value: &Value) -> Result<f64, SimplaceError> {
    match value {
        Value::Bool(b) => Ok(f64::from(u8::from(*b))),
        _ => value
            .as_f64()
            .ok_or_else(|| SimplaceError::UnsupportedParameter {
                name: name.to_string(),
                reason: format!("list element {} is not a number", value),
            }),
    }
}

/// Encodes one parameter value.
///
/// Note the asymmetry: `[1, 2.0]` becomes a `double[]` because one element is a
/// float, `[1, 2]` an `int[]`, and a bare `5` a boxed `Integer` while `5.0` stays a
/// plain double. Simplace's existing clients rely on exactly this mapping.
pub fn encode_value<O: Clone>(
    name: &str,
    value: &ParamValue<O>,
) -> Result<EncodedValue<O>, SimplaceError> {
    let encoded = match value {
        ParamValue::Json(Value::Array(items)) if items.iter().all(is_integer) => {
            EncodedValue::IntArray(
                items
                    .iter()
                    .map(|v| to_java_int(name, v))
                    .collect::<Result<_, _>>()?,
            )
        }
        ParamValue::Json(Value::Array(items)) => EncodedValue::DoubleArray(
            items
                .iter()
                .map(|v| to_java_double(name, v))
                .collect::<Result<_, _>>()?,
        ),
        ParamValue::Json(scalar) if is_integer(scalar) => {
            EncodedValue::BoxedInt(to_java_int(name, scalar)?)
        }
        other => EncodedValue::PassThrough(other.clone()),
    };
    Ok(encoded)
}

/// Encodes a parameter map. `None` stays `None`: Simplace then receives `null`
/// instead of an empty array.
pub fn encode_parameters<O: Clone>(
    parameters: Option<&Parameters<O>>,
) -> Result<Option<EncodedParameters<O>>, SimplaceError> {
    let Some(parameters) = parameters else {
        return Ok(None);
    };
    let encoded = parameters
        .iter()
        .map(|(name, value)| -> Result<_, SimplaceError> {
            Ok((name.to_string(), encode_value(name, value)?))
        })
        .collect::<Result<EncodedParameters<O>, _>>()?;
    debug!("encoded {} simulation parameter(s)", encoded.len());
    Ok(Some(encoded))
}

/// Encodes one parameter map per queued simulation, keeping their order.
pub fn encode_parameter_lists<O: Clone>(
    parameter_lists: Option<&[Parameters<O>]>,
) -> Result<Option<Vec<EncodedParameters<O>>>, SimplaceError> {
    let Some(lists) = parameter_lists else {
        return Ok(None);
    };
    lists
        .iter()
        .map(|parameters| {
            // `Some` in, `Some` out.
            encode_parameters(Some(parameters)).map(Option::unwrap_or_default)
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}
