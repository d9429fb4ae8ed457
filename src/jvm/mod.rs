// In: src/jvm/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The JNI Layer
// ====================================================================================
//
// Everything that talks to a live JVM lives below this module:
//
//   runtime.rs  -> starts the one JVM of the process, engine-wide statics
//   wrapper.rs  -> `JavaSession`, the `EngineSession` over a SimplaceWrapper
//   object.rs   -> `JavaObject`, the `ForeignObject`/`ResultTable` over a GlobalRef
//   marshal.rs  -> encoded parameters -> Object[][] / Object[][][]
//   reflect.rs  -> descriptor lookup and boxing for reflective calls
//
// Every call goes through `with_env`: the current thread is attached (once,
// permanently), the work runs inside a local reference frame, and a pending Java
// exception is cleared and turned into a `SimplaceError`. Handles that outlive
// a call are always `GlobalRef`s.
//
// ====================================================================================
pub mod marshal;
pub mod object;
pub mod reflect;
pub mod runtime;
pub mod wrapper;

pub use object::JavaObject;
pub use runtime::JvmRuntime;
pub use wrapper::JavaSession;

use jni::objects::JString;
use jni::{JNIEnv, JavaVM};

use crate::error::SimplaceError;

/// Local references a single bridge call may create before the frame grows.
const LOCAL_FRAME_CAPACITY: i32 = 64;

/// Runs `f` on the current thread's JNI environment inside a fresh local frame.
pub(crate) fn with_env<T, F>(vm: &JavaVM, f: F) -> Result<T, SimplaceError>
where
    F: FnOnce(&mut JNIEnv) -> Result<T, SimplaceError>,
{
    let mut env = vm.attach_current_thread_permanently()?;
    match env.with_local_frame(LOCAL_FRAME_CAPACITY, f) {
        Err(SimplaceError::Jni(jni::errors::Error::JavaException)) => {
            Err(take_exception(&mut env))
        }
        other => other,
    }
}

/// Clears the pending exception and describes it.
fn take_exception(env: &mut JNIEnv) -> SimplaceError {
    let throwable = match env.exception_occurred() {
        Ok(throwable) => throwable,
        Err(err) => return err.into(),
    };
    let _ = env.exception_clear();
    let described = env.with_local_frame(8, |env| -> Result<String, SimplaceError> {
        let text = env
            .call_method(&*throwable, "toString", "()Ljava/lang/String;", &[])?
            .l()?;
        let text = JString::from(text);
        let message: String = env.get_string(&text)?.into();
        Ok(message)
    });
    let _ = env.delete_local_ref(throwable);
    match described {
        Ok(message) => SimplaceError::Foreign(format!("Java exception: {}", message)),
        Err(err) => {
            let _ = env.exception_clear();
            err
        }
    }
}
