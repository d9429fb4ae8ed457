// In: src/jvm/marshal.rs

//! Builds the Java argument structures for session calls.
//!
//! `EncodedParameters` become `Object[][]` (`[[name, value], ...]`) and lists of
//! them `Object[][][]`. A missing map is passed as `null`, never as an empty array.

use jni::objects::{JObject, JValue};
use jni::sys::jsize;
use jni::JNIEnv;
use serde_json::Value;
use std::path::Path;

use super::object::JavaObject;
use crate::convert::{EncodedParameters, EncodedValue, ParamValue};
use crate::error::SimplaceError;

fn java_len(len: usize) -> Result<jsize, SimplaceError> {
    jsize::try_from(len).map_err(|_| {
        SimplaceError::Foreign(format!("{} elements do not fit into a Java array", len))
    })
}

//==================================================================================
// I. Strings
//==================================================================================

pub(crate) fn string<'local>(
    env: &mut JNIEnv<'local>,
    value: &str,
) -> Result<JObject<'local>, SimplaceError> {
    Ok(env.new_string(value)?.into())
}

pub(crate) fn optional_string<'local>(
    env: &mut JNIEnv<'local>,
    value: Option<&str>,
) -> Result<JObject<'local>, SimplaceError> {
    match value {
        Some(value) => string(env, value),
        None => Ok(JObject::null()),
    }
}

pub(crate) fn optional_path<'local>(
    env: &mut JNIEnv<'local>,
    path: Option<&Path>,
) -> Result<JObject<'local>, SimplaceError> {
    match path {
        Some(path) => string(env, &path.to_string_lossy()),
        None => Ok(JObject::null()),
    }
}

/// `String[]`, or `null` for `None`.
pub(crate) fn string_array<'local>(
    env: &mut JNIEnv<'local>,
    values: Option<&[String]>,
) -> Result<JObject<'local>, SimplaceError> {
    let Some(values) = values else {
        return Ok(JObject::null());
    };
    let array = env.new_object_array(java_len(values.len())?, "java/lang/String", JObject::null())?;
    for (i, value) in values.iter().enumerate() {
        let item = string(env, value)?;
        env.set_object_array_element(&array, java_len(i)?, &item)?;
        env.delete_local_ref(item)?;
    }
    Ok(array.into())
}

//==================================================================================
// II. Single Values
//==================================================================================

fn boxed<'local>(
    env: &mut JNIEnv<'local>,
    class: &str,
    signature: &str,
    value: JValue,
) -> Result<JObject<'local>, SimplaceError> {
    Ok(env.call_static_method(class, "valueOf", signature, &[value])?.l()?)
}

fn json_value<'local>(
    env: &mut JNIEnv<'local>,
    name: &str,
    value: &Value,
) -> Result<JObject<'local>, SimplaceError> {
    match value {
        Value::Null => Ok(JObject::null()),
        Value::Bool(b) => boxed(
            env,
            "java/lang/Boolean",
            "(Z)Ljava/lang/Boolean;",
            JValue::Bool(u8::from(*b)),
        ),
        Value::Number(n) => {
            let number = n.as_f64().ok_or_else(|| SimplaceError::UnsupportedParameter {
                name: name.to_string(),
                reason: format!("{} is not representable as a double", n),
            })?;
            boxed(env, "java/lang/Double", "(D)Ljava/lang/Double;", JValue::Double(number))
        }
        Value::String(s) => string(env, s),
        Value::Array(_) | Value::Object(_) => Err(SimplaceError::UnsupportedParameter {
            name: name.to_string(),
            reason: "nested structures have no Java counterpart".into(),
        }),
    }
}

fn foreign_value<'local>(
    env: &mut JNIEnv<'local>,
    value: &JavaObject,
) -> Result<JObject<'local>, SimplaceError> {
    match value.global() {
        Some(global) => Ok(env.new_local_ref(global.as_obj())?),
        None => Ok(JObject::null()),
    }
}

/// The Java object for one encoded parameter value.
pub(crate) fn encoded_value<'local>(
    env: &mut JNIEnv<'local>,
    name: &str,
    value: &EncodedValue<JavaObject>,
) -> Result<JObject<'local>, SimplaceError> {
    match value {
        EncodedValue::IntArray(values) => {
            let array = env.new_int_array(java_len(values.len())?)?;
            env.set_int_array_region(&array, 0, values)?;
            Ok(array.into())
        }
        EncodedValue::DoubleArray(values) => {
            let array = env.new_double_array(java_len(values.len())?)?;
            env.set_double_array_region(&array, 0, values)?;
            Ok(array.into())
        }
        EncodedValue::BoxedInt(v) => boxed(
            env,
            "java/lang/Integer",
            "(I)Ljava/lang/Integer;",
            JValue::Int(*v),
        ),
        EncodedValue::PassThrough(ParamValue::Json(value)) => json_value(env, name, value),
        EncodedValue::PassThrough(ParamValue::Foreign(value)) => foreign_value(env, value),
    }
}

//==================================================================================
// III. Parameter Arrays
//==================================================================================

/// `Object[][]` of `[name, value]` pairs.
pub(crate) fn parameter_array<'local>(
    env: &mut JNIEnv<'local>,
    params: &EncodedParameters<JavaObject>,
) -> Result<JObject<'local>, SimplaceError> {
    let outer = env.new_object_array(
        java_len(params.len())?,
        "[Ljava/lang/Object;",
        JObject::null(),
    )?;
    for (i, (name, value)) in params.iter().enumerate() {
        let pair = env.new_object_array(2, "java/lang/Object", JObject::null())?;
        let key = string(env, name)?;
        let val = encoded_value(env, name, value)?;
        env.set_object_array_element(&pair, 0, &key)?;
        env.set_object_array_element(&pair, 1, &val)?;
        env.set_object_array_element(&outer, java_len(i)?, &pair)?;
        env.delete_local_ref(key)?;
        env.delete_local_ref(val)?;
        env.delete_local_ref(pair)?;
    }
    Ok(outer.into())
}

pub(crate) fn optional_parameter_array<'local>(
    env: &mut JNIEnv<'local>,
    params: Option<&EncodedParameters<JavaObject>>,
) -> Result<JObject<'local>, SimplaceError> {
    match params {
        Some(params) => parameter_array(env, params),
        None => Ok(JObject::null()),
    }
}

/// `Object[][][]`, one `Object[][]` per simulation, or `null`.
pub(crate) fn parameter_arrays<'local>(
    env: &mut JNIEnv<'local>,
    lists: Option<&[EncodedParameters<JavaObject>]>,
) -> Result<JObject<'local>, SimplaceError> {
    let Some(lists) = lists else {
        return Ok(JObject::null());
    };
    let outer = env.new_object_array(
        java_len(lists.len())?,
        "[[Ljava/lang/Object;",
        JObject::null(),
    )?;
    for (i, params) in lists.iter().enumerate() {
        let inner = parameter_array(env, params)?;
        env.set_object_array_element(&outer, java_len(i)?, &inner)?;
        env.delete_local_ref(inner)?;
    }
    Ok(outer.into())
}
