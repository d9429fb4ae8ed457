// In: src/jvm/reflect.rs

//! Reflective method calls.
//!
//! JNI needs an exact method descriptor for every call, and the Simplace
//! wrapper's signatures differ between releases (`getSimulationIDs` returning a
//! `String[]` in one and a `List` in another, `setSlotCount` taking an `int` or
//! a boxed `Integer`). Instead of hard-coding them, the descriptor is looked up
//! once through `java.lang.reflect` by name and arity and cached per process.
//! Scalar arguments are boxed whenever the resolved slot is a reference type.

use jni::objects::{JObject, JObjectArray, JString, JValue, JValueGen, JValueOwned};
use jni::JNIEnv;
use log::debug;
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock, PoisonError};

use crate::error::SimplaceError;

/// A host-side argument to a reflective call.
#[derive(Debug, Clone, Copy)]
pub enum Arg<'a, 'local> {
    Object(&'a JObject<'local>),
    Int(i32),
    Boolean(bool),
}

static SIGNATURES: OnceLock<Mutex<HashMap<String, String>>> = OnceLock::new();

//==================================================================================
// I. Descriptors
//==================================================================================

/// JNI descriptor of the class named `class_name` (as returned by `Class.getName()`).
pub(crate) fn type_descriptor(class_name: &str) -> String {
    match class_name {
        "void" => "V".to_string(),
        "boolean" => "Z".to_string(),
        "byte" => "B".to_string(),
        "char" => "C".to_string(),
        "short" => "S".to_string(),
        "int" => "I".to_string(),
        "long" => "J".to_string(),
        "float" => "F".to_string(),
        "double" => "D".to_string(),
        array if array.starts_with('[') => array.replace('.', "/"),
        name => format!("L{};", name.replace('.', "/")),
    }
}

/// The parameter descriptors of a method descriptor, e.g.
/// `(I[DLjava/lang/String;)V` → `["I", "[D", "Ljava/lang/String;"]`.
pub(crate) fn parameter_descriptors(signature: &str) -> Vec<&str> {
    let inner = signature
        .strip_prefix('(')
        .and_then(|rest| rest.split(')').next())
        .unwrap_or("");
    let bytes = inner.as_bytes();
    let mut params = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        let start = pos;
        while pos < bytes.len() && bytes[pos] == b'[' {
            pos += 1;
        }
        if pos < bytes.len() && bytes[pos] == b'L' {
            pos = inner[pos..].find(';').map_or(bytes.len(), |end| pos + end + 1);
        } else {
            pos += 1;
        }
        params.push(&inner[start..pos.min(bytes.len())]);
    }
    params
}

fn is_primitive(descriptor: &str) -> bool {
    descriptor.len() == 1
}

//==================================================================================
// II. Lookup
//==================================================================================

fn string_of(env: &mut JNIEnv, obj: JObject) -> Result<String, SimplaceError> {
    let text = JString::from(obj);
    let value: String = env.get_string(&text)?.into();
    env.delete_local_ref(text)?;
    Ok(value)
}

fn class_name(env: &mut JNIEnv, class: &JObject) -> Result<String, SimplaceError> {
    let name = env
        .call_method(class, "getName", "()Ljava/lang/String;", &[])?
        .l()?;
    string_of(env, name)
}

/// Descriptor of `method` if its name and arity match.
fn matching_descriptor(
    env: &mut JNIEnv,
    method: &JObject,
    name: &str,
    arity: usize,
) -> Result<Option<String>, SimplaceError> {
    let method_name = env
        .call_method(method, "getName", "()Ljava/lang/String;", &[])?
        .l()?;
    if string_of(env, method_name)? != name {
        return Ok(None);
    }
    let count = env
        .call_method(method, "getParameterCount", "()I", &[])?
        .i()?;
    if usize::try_from(count).ok() != Some(arity) {
        return Ok(None);
    }

    let types = JObjectArray::from(
        env.call_method(method, "getParameterTypes", "()[Ljava/lang/Class;", &[])?
            .l()?,
    );
    let mut descriptor = String::from("(");
    for i in 0..env.get_array_length(&types)? {
        let param = env.get_object_array_element(&types, i)?;
        descriptor.push_str(&type_descriptor(&class_name(env, &param)?));
        env.delete_local_ref(param)?;
    }
    descriptor.push(')');
    let ret = env
        .call_method(method, "getReturnType", "()Ljava/lang/Class;", &[])?
        .l()?;
    descriptor.push_str(&type_descriptor(&class_name(env, &ret)?));
    Ok(Some(descriptor))
}

/// Resolves the descriptor of the public method `name` taking `arity` arguments
/// on the class object `class`.
fn resolve(
    env: &mut JNIEnv,
    class: &JObject,
    name: &str,
    arity: usize,
) -> Result<String, SimplaceError> {
    let key = format!("{}#{}/{}", class_name(env, class)?, name, arity);
    let cache = SIGNATURES.get_or_init(|| Mutex::new(HashMap::new()));
    if let Some(found) = cache
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&key)
    {
        return Ok(found.clone());
    }

    let methods = JObjectArray::from(
        env.call_method(class, "getMethods", "()[Ljava/lang/reflect/Method;", &[])?
            .l()?,
    );
    let mut signature = None;
    for i in 0..env.get_array_length(&methods)? {
        let found = env.with_local_frame(16, |env| -> Result<_, SimplaceError> {
            let method = env.get_object_array_element(&methods, i)?;
            matching_descriptor(env, &method, name, arity)
        })?;
        if found.is_some() {
            signature = found;
            break;
        }
    }
    let signature = signature.ok_or_else(|| {
        SimplaceError::Foreign(format!("no public method {} taking {} argument(s)", key, arity))
    })?;

    debug!("resolved {} as {}", key, signature);
    cache
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(key, signature.clone());
    Ok(signature)
}

//==================================================================================
// III. Calls
//==================================================================================

fn boxed<'local>(
    env: &mut JNIEnv<'local>,
    arg: &Arg,
    descriptor: &str,
) -> Result<Option<JObject<'local>>, SimplaceError> {
    if is_primitive(descriptor) {
        return Ok(None);
    }
    let obj = match *arg {
        Arg::Object(_) => return Ok(None),
        Arg::Int(v) => env
            .call_static_method(
                "java/lang/Integer",
                "valueOf",
                "(I)Ljava/lang/Integer;",
                &[JValue::Int(v)],
            )?
            .l()?,
        Arg::Boolean(b) => env
            .call_static_method(
                "java/lang/Boolean",
                "valueOf",
                "(Z)Ljava/lang/Boolean;",
                &[JValue::Bool(u8::from(b))],
            )?
            .l()?,
    };
    Ok(Some(obj))
}

fn primitive<'a, 'local>(arg: &Arg<'a, 'local>, descriptor: &str) -> JValue<'local, 'a> {
    match (*arg, descriptor) {
        (Arg::Object(obj), _) => JValue::Object(obj),
        (Arg::Int(v), "J") => JValue::Long(i64::from(v)),
        (Arg::Int(v), "D") => JValue::Double(f64::from(v)),
        (Arg::Int(v), _) => JValue::Int(v),
        (Arg::Boolean(b), _) => JValue::Bool(u8::from(b)),
    }
}

/// Converts `args` to the JNI values expected by `signature` and runs `call` with them.
fn with_values<'local, T>(
    env: &mut JNIEnv<'local>,
    signature: &str,
    args: &[Arg],
    call: impl FnOnce(&mut JNIEnv<'local>, &[JValue]) -> Result<T, SimplaceError>,
) -> Result<T, SimplaceError> {
    let params = parameter_descriptors(signature);
    let boxes = args
        .iter()
        .zip(&params)
        .map(|(arg, descriptor)| boxed(env, arg, descriptor))
        .collect::<Result<Vec<_>, _>>()?;
    let values: Vec<JValue> = args
        .iter()
        .zip(&params)
        .zip(&boxes)
        .map(|((arg, descriptor), boxed)| match boxed {
            Some(obj) => JValue::Object(obj),
            None => primitive(arg, descriptor),
        })
        .collect();
    call(env, &values)
}

/// Calls the public instance method `name` of `target`.
pub(crate) fn invoke<'local>(
    env: &mut JNIEnv<'local>,
    target: &JObject,
    name: &str,
    args: &[Arg],
) -> Result<JValueOwned<'local>, SimplaceError> {
    let class = env.get_object_class(target)?;
    let signature = resolve(env, &class, name, args.len())?;
    env.delete_local_ref(class)?;
    with_values(env, &signature, args, |env, values| {
        Ok(env.call_method(target, name, signature.as_str(), values)?)
    })
}

/// Calls the public static method `name` of the class `class_name` (in `a/b/C` form).
pub(crate) fn invoke_static<'local>(
    env: &mut JNIEnv<'local>,
    class_name: &str,
    name: &str,
    args: &[Arg],
) -> Result<JValueOwned<'local>, SimplaceError> {
    let class = env.find_class(class_name)?;
    let signature = resolve(env, &class, name, args.len())?;
    env.delete_local_ref(class)?;
    with_values(env, &signature, args, |env, values| {
        Ok(env.call_static_method(class_name, name, signature.as_str(), values)?)
    })
}

/// Like [`invoke`], for methods returning an object. `void` and primitive
/// results come back as `null`.
pub(crate) fn invoke_object<'local>(
    env: &mut JNIEnv<'local>,
    target: &JObject,
    name: &str,
    args: &[Arg],
) -> Result<JObject<'local>, SimplaceError> {
    match invoke(env, target, name, args)? {
        JValueGen::Object(obj) => Ok(obj),
        _ => Ok(JObject::null()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_descriptors() {
        assert_eq!(type_descriptor("int"), "I");
        assert_eq!(type_descriptor("boolean"), "Z");
        assert_eq!(type_descriptor("void"), "V");
        assert_eq!(type_descriptor("java.lang.String"), "Ljava/lang/String;");
        assert_eq!(
            type_descriptor("net.simplace.core.logging.Logger$LOGLEVEL"),
            "Lnet/simplace/core/logging/Logger$LOGLEVEL;"
        );
        assert_eq!(type_descriptor("[[Ljava.lang.Object;"), "[[Ljava/lang/Object;");
        assert_eq!(type_descriptor("[D"), "[D");
    }

    #[test]
    fn test_parameter_descriptors() {
        assert_eq!(
            parameter_descriptors(
                "(I[[Ljava/lang/Object;[Ljava/lang/String;I)Lnet/simplace/sim/util/VarMap;"
            ),
            vec!["I", "[[Ljava/lang/Object;", "[Ljava/lang/String;", "I"]
        );
        assert_eq!(parameter_descriptors("()V"), Vec::<&str>::new());
        assert_eq!(parameter_descriptors("(Z[DJ)V"), vec!["Z", "[D", "J"]);
    }

    #[test]
    fn test_primitive_slots() {
        assert!(is_primitive("I"));
        assert!(!is_primitive("Ljava/lang/Integer;"));
        assert!(!is_primitive("[I"));
    }
}
