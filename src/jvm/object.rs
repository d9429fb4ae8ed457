// In: src/jvm/object.rs

//! `JavaObject`: a reference to one Java value, kept alive by a `GlobalRef`.
//!
//! The same handle type serves plain values (boxed numbers, strings, arrays)
//! and Simplace's `Result`/`VarMap` objects, which is why it implements both
//! [`ForeignObject`] and [`ResultTable`].

use jni::objects::{
    GlobalRef, JBooleanArray, JDoubleArray, JIntArray, JObject, JObjectArray, JString,
};
use jni::{JNIEnv, JavaVM};
use std::fmt;
use std::sync::Arc;

use super::reflect::{invoke_object, Arg};
use super::with_env;
use crate::error::SimplaceError;
use crate::traits::{ForeignObject, ResultTable};

const OBJECT_ARRAY: &str = "[Ljava/lang/Object;";
const COLLECTION: &str = "java/util/Collection";

#[derive(Clone)]
pub struct JavaObject {
    vm: Arc<JavaVM>,
    /// `None` is Java `null`.
    inner: Option<GlobalRef>,
}

impl fmt::Debug for JavaObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Some(global) => write!(f, "JavaObject({:p})", global.as_obj().as_raw()),
            None => f.write_str("JavaObject(null)"),
        }
    }
}

impl JavaObject {
    /// Pins a local reference as a new handle.
    pub(crate) fn from_local(
        vm: &Arc<JavaVM>,
        env: &mut JNIEnv,
        obj: &JObject,
    ) -> Result<Self, SimplaceError> {
        let inner = if obj.is_null() {
            None
        } else {
            Some(env.new_global_ref(obj)?)
        };
        Ok(Self {
            vm: Arc::clone(vm),
            inner,
        })
    }

    pub fn is_null(&self) -> bool {
        self.inner.is_none()
    }

    /// The underlying reference, `None` for `null`.
    pub(crate) fn global(&self) -> Option<&GlobalRef> {
        self.inner.as_ref()
    }

    fn target(&self) -> Result<&GlobalRef, SimplaceError> {
        self.inner
            .as_ref()
            .ok_or_else(|| SimplaceError::Foreign("unexpected Java null".into()))
    }

    fn with_env<T, F>(&self, f: F) -> Result<T, SimplaceError>
    where
        F: FnOnce(&mut JNIEnv, &JObject) -> Result<T, SimplaceError>,
    {
        let target = self.target()?;
        with_env(&self.vm, |env| f(env, target.as_obj()))
    }
}

//==================================================================================
// I. Array Access
//==================================================================================

/// The elements of an `Object[]`, or of a `Collection` via `toArray()`.
pub(crate) fn object_elements<'local>(
    env: &mut JNIEnv<'local>,
    obj: &JObject,
) -> Result<JObjectArray<'local>, SimplaceError> {
    let array = if env.is_instance_of(obj, OBJECT_ARRAY)? {
        env.new_local_ref(obj)?
    } else if env.is_instance_of(obj, COLLECTION)? {
        env.call_method(obj, "toArray", "()[Ljava/lang/Object;", &[])?
            .l()?
    } else {
        return Err(SimplaceError::Foreign(
            "expected an object array or a collection".into(),
        ));
    };
    Ok(JObjectArray::from(array))
}

/// Pins every element of an object array or collection.
pub(crate) fn pinned_elements(
    vm: &Arc<JavaVM>,
    env: &mut JNIEnv,
    obj: &JObject,
) -> Result<Vec<JavaObject>, SimplaceError> {
    let array = object_elements(env, obj)?;
    let len = env.get_array_length(&array)?;
    let mut items = Vec::with_capacity(len as usize);
    for i in 0..len {
        let item = env.get_object_array_element(&array, i)?;
        items.push(JavaObject::from_local(vm, env, &item)?);
        env.delete_local_ref(item)?;
    }
    Ok(items)
}

/// `toString()` of every element; Java nulls stay `None`.
pub(crate) fn optional_strings(
    env: &mut JNIEnv,
    obj: &JObject,
) -> Result<Vec<Option<String>>, SimplaceError> {
    if obj.is_null() {
        return Ok(Vec::new());
    }
    let array = object_elements(env, obj)?;
    let len = env.get_array_length(&array)?;
    let mut out = Vec::with_capacity(len as usize);
    for i in 0..len {
        let item = env.get_object_array_element(&array, i)?;
        out.push(if item.is_null() {
            None
        } else {
            Some(display_string(env, &item)?)
        });
        env.delete_local_ref(item)?;
    }
    Ok(out)
}

/// Like [`optional_strings`], with nulls as empty strings.
pub(crate) fn strings(env: &mut JNIEnv, obj: &JObject) -> Result<Vec<String>, SimplaceError> {
    Ok(optional_strings(env, obj)?
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect())
}

pub(crate) fn display_string(env: &mut JNIEnv, obj: &JObject) -> Result<String, SimplaceError> {
    let text = env
        .call_method(obj, "toString", "()Ljava/lang/String;", &[])?
        .l()?;
    let text = JString::from(text);
    let value: String = env.get_string(&text)?.into();
    env.delete_local_ref(text)?;
    Ok(value)
}

/// Unboxes an array of `java.lang.Number`/`Boolean` one element at a time.
fn unbox_each<T>(
    env: &mut JNIEnv,
    obj: &JObject,
    mut unbox: impl FnMut(&mut JNIEnv, &JObject) -> Result<T, SimplaceError>,
) -> Result<Vec<T>, SimplaceError> {
    let array = object_elements(env, obj)?;
    let len = env.get_array_length(&array)?;
    let mut out = Vec::with_capacity(len as usize);
    for i in 0..len {
        let item = env.get_object_array_element(&array, i)?;
        out.push(unbox(env, &item)?);
        env.delete_local_ref(item)?;
    }
    Ok(out)
}

fn double_array(env: &mut JNIEnv, obj: &JObject) -> Result<Vec<f64>, SimplaceError> {
    let array = JDoubleArray::from(env.new_local_ref(obj)?);
    let mut buf = vec![0.0; env.get_array_length(&array)? as usize];
    env.get_double_array_region(&array, 0, &mut buf)?;
    Ok(buf)
}

fn int_array(env: &mut JNIEnv, obj: &JObject) -> Result<Vec<i32>, SimplaceError> {
    let array = JIntArray::from(env.new_local_ref(obj)?);
    let mut buf = vec![0; env.get_array_length(&array)? as usize];
    env.get_int_array_region(&array, 0, &mut buf)?;
    Ok(buf)
}

fn boolean_array(env: &mut JNIEnv, obj: &JObject) -> Result<Vec<bool>, SimplaceError> {
    let array = JBooleanArray::from(env.new_local_ref(obj)?);
    let mut buf = vec![0u8; env.get_array_length(&array)? as usize];
    env.get_boolean_array_region(&array, 0, &mut buf)?;
    Ok(buf.into_iter().map(|b| b != 0).collect())
}

fn double_value(env: &mut JNIEnv, obj: &JObject) -> Result<f64, SimplaceError> {
    Ok(env.call_method(obj, "doubleValue", "()D", &[])?.d()?)
}

fn int_value(env: &mut JNIEnv, obj: &JObject) -> Result<i32, SimplaceError> {
    Ok(env.call_method(obj, "intValue", "()I", &[])?.i()?)
}

//==================================================================================
// II. ForeignObject
//==================================================================================

impl ForeignObject for JavaObject {
    fn display_string(&self) -> Result<String, SimplaceError> {
        if self.is_null() {
            return Ok("null".to_string());
        }
        self.with_env(|env, obj| display_string(env, obj))
    }

    fn elements(&self) -> Result<Vec<Self>, SimplaceError> {
        self.with_env(|env, obj| pinned_elements(&self.vm, env, obj))
    }

    /// A null element of a `Double[]` becomes `NaN`.
    fn unbox_doubles(&self) -> Result<Vec<f64>, SimplaceError> {
        self.with_env(|env, obj| {
            if env.is_instance_of(obj, "[D")? {
                double_array(env, obj)
            } else if env.is_instance_of(obj, "[I")? {
                Ok(int_array(env, obj)?.into_iter().map(f64::from).collect())
            } else {
                unbox_each(env, obj, |env, item| {
                    if item.is_null() {
                        Ok(f64::NAN)
                    } else {
                        double_value(env, item)
                    }
                })
            }
        })
    }

    fn unbox_ints(&self) -> Result<Vec<i32>, SimplaceError> {
        self.with_env(|env, obj| {
            if env.is_instance_of(obj, "[I")? {
                int_array(env, obj)
            } else {
                unbox_each(env, obj, |env, item| {
                    if item.is_null() {
                        return Err(SimplaceError::Foreign("null in an INT column".into()));
                    }
                    int_value(env, item)
                })
            }
        })
    }

    fn unbox_booleans(&self) -> Result<Vec<bool>, SimplaceError> {
        self.with_env(|env, obj| {
            if env.is_instance_of(obj, "[Z")? {
                boolean_array(env, obj)
            } else {
                unbox_each(env, obj, |env, item| {
                    if item.is_null() {
                        return Err(SimplaceError::Foreign("null in a BOOLEAN column".into()));
                    }
                    Ok(env.call_method(item, "booleanValue", "()Z", &[])?.z()?)
                })
            }
        })
    }

    fn double_value(&self) -> Result<f64, SimplaceError> {
        self.with_env(|env, obj| double_value(env, obj))
    }

    fn int_value(&self) -> Result<i32, SimplaceError> {
        self.with_env(|env, obj| int_value(env, obj))
    }
}

//==================================================================================
// III. ResultTable
//==================================================================================

impl JavaObject {
    fn header(&self, method: &str) -> Result<Vec<String>, SimplaceError> {
        self.with_env(|env, obj| {
            let names = invoke_object(env, obj, method, &[])?;
            strings(env, &names)
        })
    }
}

impl ResultTable for JavaObject {
    type Object = JavaObject;

    fn header_strings(&self) -> Result<Vec<String>, SimplaceError> {
        self.header("getHeaderStrings")
    }

    fn type_strings(&self) -> Result<Vec<String>, SimplaceError> {
        self.header("getTypeStrings")
    }

    fn header_units(&self) -> Result<Vec<String>, SimplaceError> {
        self.header("getHeaderUnits")
    }

    fn data_objects(&self) -> Result<Vec<JavaObject>, SimplaceError> {
        self.with_env(|env, obj| {
            let data = invoke_object(env, obj, "getDataObjects", &[])?;
            pinned_elements(&self.vm, env, &data)
        })
    }

    fn data_objects_range(&self, start: i32, end: i32) -> Result<Vec<JavaObject>, SimplaceError> {
        self.with_env(|env, obj| {
            let window = [Arg::Int(start), Arg::Int(end)];
            let data = invoke_object(env, obj, "getDataObjects", &window)?;
            pinned_elements(&self.vm, env, &data)
        })
    }
}
