// In: src/jvm/runtime.rs

//! The one JVM of the process.
//!
//! JNI allows a single JVM per process and it can never be restarted, so
//! [`JvmRuntime::start`] succeeds at most once. The returned token is cheap to
//! clone and is what every session is built from.

use jni::errors::StartJvmError;
use jni::objects::JValue;
use jni::{InitArgsBuilder, JNIVersion, JavaVM};
use log::{debug, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::marshal;
use super::reflect::{invoke_static, Arg};
use super::with_env;
use crate::config::{EngineLogLevel, RuntimeOptions};
use crate::error::SimplaceError;
use crate::install::join_classpath;

static JVM_STARTED: AtomicBool = AtomicBool::new(false);

const LOGGER_CLASS: &str = "net/simplace/core/logging/Logger";
const LOGLEVEL_CLASS: &str = "net/simplace/core/logging/Logger$LOGLEVEL";
const ENGINE_CLASS: &str = "net/simplace/sim/FWSimEngine";

/// The JVM options for `options`: the classpath first, then the user's options.
pub(crate) fn jvm_options(options: &RuntimeOptions) -> Result<Vec<String>, SimplaceError> {
    let mut jvm_options = Vec::with_capacity(options.java_parameters.len() + 1);
    if !options.classpath.is_empty() {
        let classpath = join_classpath(&options.classpath)?;
        jvm_options.push(format!("-Djava.class.path={}", classpath.to_string_lossy()));
    }
    jvm_options.extend(options.java_parameters.iter().cloned());
    Ok(jvm_options)
}

#[derive(Clone)]
pub struct JvmRuntime {
    vm: Arc<JavaVM>,
}

impl std::fmt::Debug for JvmRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JvmRuntime").finish_non_exhaustive()
    }
}

impl JvmRuntime {
    /// Starts the JVM with Simplace on the classpath.
    ///
    /// Fails with [`SimplaceError::RuntimeAlreadyStarted`] once a JVM has been
    /// created, and also after a failed `JNI_CreateJavaVM`. A start that fails
    /// earlier (bad options, `libjvm` not found or not loadable) can be retried.
    pub fn start(options: &RuntimeOptions) -> Result<Self, SimplaceError> {
        if JVM_STARTED.swap(true, Ordering::SeqCst) {
            return Err(SimplaceError::RuntimeAlreadyStarted);
        }
        let vm = match Self::launch(options) {
            Ok(vm) => vm,
            Err(err) => {
                if !matches!(err, SimplaceError::StartJvm(StartJvmError::Create(_))) {
                    JVM_STARTED.store(false, Ordering::SeqCst);
                }
                return Err(err);
            }
        };
        info!(
            "JVM started with {} classpath entries",
            options.classpath.len()
        );
        Ok(Self { vm: Arc::new(vm) })
    }

    fn launch(options: &RuntimeOptions) -> Result<JavaVM, SimplaceError> {
        let mut builder = InitArgsBuilder::new()
            .version(JNIVersion::V8)
            .ignore_unrecognized(true);
        for option in jvm_options(options)? {
            debug!("JVM option {}", option);
            builder = builder.option(option);
        }
        let args = builder.build()?;

        let vm = match &options.jvm_library {
            Some(library) => {
                let library = library.clone();
                JavaVM::with_libjvm(args, move || Ok(library))?
            }
            None => JavaVM::new(args)?,
        };
        Ok(vm)
    }

    pub(crate) fn vm(&self) -> &Arc<JavaVM> {
        &self.vm
    }

    /// Sets the verbosity of Simplace's own logger.
    pub fn set_log_level(&self, level: EngineLogLevel) -> Result<(), SimplaceError> {
        with_env(&self.vm, |env| {
            let name = marshal::string(env, level.as_str())?;
            let level_obj = env
                .call_static_method(
                    LOGLEVEL_CLASS,
                    "valueOf",
                    "(Ljava/lang/String;)Lnet/simplace/core/logging/Logger$LOGLEVEL;",
                    &[JValue::Object(&name)],
                )?
                .l()?;
            invoke_static(env, LOGGER_CLASS, "setLogLevel", &[Arg::Object(&level_obj)])?;
            Ok(())
        })?;
        info!("Simplace log level set to {}", level);
        Ok(())
    }

    /// Sets the maximum number of processor cores used when running projects.
    pub fn set_slot_count(&self, count: i32) -> Result<(), SimplaceError> {
        with_env(&self.vm, |env| {
            invoke_static(env, ENGINE_CLASS, "setSlotCount", &[Arg::Int(count)])?;
            Ok(())
        })
    }
}
