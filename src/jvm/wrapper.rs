// In: src/jvm/wrapper.rs

//! `JavaSession`: the [`EngineSession`] backed by a live
//! `net.simplace.sim.wrapper.SimplaceWrapper`.

use jni::objects::{GlobalRef, JObject, JValue};
use jni::{JNIEnv, JavaVM};
use log::info;
use std::sync::Arc;

use super::marshal;
use super::object::{optional_strings, pinned_elements, strings, JavaObject};
use super::reflect::{invoke, invoke_object, Arg};
use super::runtime::JvmRuntime;
use super::with_env;
use crate::config::{RuntimeOptions, SessionDirs, SimplaceConfig};
use crate::convert::EncodedParameters;
use crate::error::SimplaceError;
use crate::install::{build_classpath, find_first_installation};
use crate::session::Simplace;
use crate::traits::EngineSession;

const WRAPPER_CLASS: &str = "net/simplace/sim/wrapper/SimplaceWrapper";
const WRAPPER_CONSTRUCTOR: &str =
    "(Ljava/lang/String;Ljava/lang/String;Ljava/lang/String;Ljava/lang/String;)V";

pub struct JavaSession {
    vm: Arc<JavaVM>,
    wrapper: GlobalRef,
}

impl std::fmt::Debug for JavaSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JavaSession").finish_non_exhaustive()
    }
}

impl JavaSession {
    /// Creates a `SimplaceWrapper` for the given directories. Unset directories
    /// are passed as `null`.
    pub fn new(runtime: &JvmRuntime, dirs: &SessionDirs) -> Result<Self, SimplaceError> {
        let vm = Arc::clone(runtime.vm());
        let wrapper = with_env(&vm, |env| {
            let work = marshal::optional_path(env, dirs.work_dir.as_deref())?;
            let output = marshal::optional_path(env, dirs.output_dir.as_deref())?;
            let projects = marshal::optional_path(env, dirs.projects_dir.as_deref())?;
            let data = marshal::optional_path(env, dirs.data_dir.as_deref())?;
            let wrapper = env.new_object(
                WRAPPER_CLASS,
                WRAPPER_CONSTRUCTOR,
                &[
                    JValue::Object(&work),
                    JValue::Object(&output),
                    JValue::Object(&projects),
                    JValue::Object(&data),
                ],
            )?;
            Ok(env.new_global_ref(wrapper)?)
        })?;
        info!("Simplace session created (work dir {:?})", dirs.work_dir);
        Ok(Self { vm, wrapper })
    }

    /// Runs `f` with the wrapper object.
    fn call<T, F>(&self, f: F) -> Result<T, SimplaceError>
    where
        F: FnOnce(&mut JNIEnv, &JObject) -> Result<T, SimplaceError>,
    {
        let wrapper = self.wrapper.as_obj();
        with_env(&self.vm, |env| f(env, wrapper))
    }

    fn call_void(&self, method: &str, args: &[Arg]) -> Result<(), SimplaceError> {
        self.call(|env, wrapper| {
            invoke(env, wrapper, method, args)?;
            Ok(())
        })
    }

    fn pin(&self, env: &mut JNIEnv, obj: &JObject) -> Result<JavaObject, SimplaceError> {
        JavaObject::from_local(&self.vm, env, obj)
    }
}

impl EngineSession for JavaSession {
    type Object = JavaObject;
    type Table = JavaObject;

    fn prepare_session(
        &mut self,
        project: Option<&str>,
        solution: &str,
        params: Option<&EncodedParameters<JavaObject>>,
    ) -> Result<(), SimplaceError> {
        self.call(|env, wrapper| {
            let project = marshal::optional_string(env, project)?;
            let solution = marshal::string(env, solution)?;
            let params = marshal::optional_parameter_array(env, params)?;
            invoke(
                env,
                wrapper,
                "prepareSession",
                &[Arg::Object(&project), Arg::Object(&solution), Arg::Object(&params)],
            )?;
            Ok(())
        })
    }

    fn run(&mut self) -> Result<(), SimplaceError> {
        self.call_void("run", &[])
    }

    fn set_project_lines(&mut self, lines: &str) -> Result<(), SimplaceError> {
        self.call(|env, wrapper| {
            let lines = marshal::string(env, lines)?;
            invoke(env, wrapper, "setProjectLines", &[Arg::Object(&lines)])?;
            Ok(())
        })
    }

    fn create_simulation(
        &mut self,
        params: Option<&EncodedParameters<JavaObject>>,
    ) -> Result<(), SimplaceError> {
        self.call(|env, wrapper| {
            let params = marshal::optional_parameter_array(env, params)?;
            invoke(env, wrapper, "createSimulation", &[Arg::Object(&params)])?;
            Ok(())
        })
    }

    fn simulation_ids(&self) -> Result<Vec<String>, SimplaceError> {
        self.call(|env, wrapper| {
            let ids = invoke_object(env, wrapper, "getSimulationIDs", &[])?;
            strings(env, &ids)
        })
    }

    fn set_simulation_values(
        &mut self,
        params: Option<&EncodedParameters<JavaObject>>,
    ) -> Result<(), SimplaceError> {
        self.call(|env, wrapper| {
            let params = marshal::optional_parameter_array(env, params)?;
            invoke(env, wrapper, "setSimulationValues", &[Arg::Object(&params)])?;
            Ok(())
        })
    }

    fn set_all_simulation_values(
        &mut self,
        params: Option<&[EncodedParameters<JavaObject>]>,
    ) -> Result<(), SimplaceError> {
        self.call(|env, wrapper| {
            let params = marshal::parameter_arrays(env, params)?;
            invoke(env, wrapper, "setAllSimulationValues", &[Arg::Object(&params)])?;
            Ok(())
        })
    }

    fn run_simulations(&mut self, select_simulation: bool) -> Result<(), SimplaceError> {
        self.call_void("runSimulations", &[Arg::Boolean(select_simulation)])
    }

    fn step_specific(
        &mut self,
        simulation_number: i32,
        params: Option<&EncodedParameters<JavaObject>>,
        var_filter: Option<&[String]>,
        count: i32,
    ) -> Result<JavaObject, SimplaceError> {
        self.call(|env, wrapper| {
            let params = marshal::optional_parameter_array(env, params)?;
            let filter = marshal::string_array(env, var_filter)?;
            let varmap = invoke_object(
                env,
                wrapper,
                "stepSpecific",
                &[
                    Arg::Int(simulation_number),
                    Arg::Object(&params),
                    Arg::Object(&filter),
                    Arg::Int(count),
                ],
            )?;
            self.pin(env, &varmap)
        })
    }

    fn step_all(
        &mut self,
        params: Option<&[EncodedParameters<JavaObject>]>,
        var_filter: Option<&[String]>,
        count: i32,
    ) -> Result<Vec<JavaObject>, SimplaceError> {
        self.call(|env, wrapper| {
            let params = marshal::parameter_arrays(env, params)?;
            let filter = marshal::string_array(env, var_filter)?;
            let varmaps = invoke_object(
                env,
                wrapper,
                "stepAll",
                &[Arg::Object(&params), Arg::Object(&filter), Arg::Int(count)],
            )?;
            pinned_elements(&self.vm, env, &varmaps)
        })
    }

    fn result(
        &self,
        output: &str,
        simulation_id: Option<&str>,
    ) -> Result<JavaObject, SimplaceError> {
        self.call(|env, wrapper| {
            let output = marshal::string(env, output)?;
            let simulation = marshal::optional_string(env, simulation_id)?;
            let result = invoke_object(
                env,
                wrapper,
                "getResult",
                &[Arg::Object(&output), Arg::Object(&simulation)],
            )?;
            self.pin(env, &result)
        })
    }

    fn set_directories(&mut self, dirs: &SessionDirs) -> Result<(), SimplaceError> {
        self.call(|env, wrapper| {
            let work = marshal::optional_path(env, dirs.work_dir.as_deref())?;
            let output = marshal::optional_path(env, dirs.output_dir.as_deref())?;
            let projects = marshal::optional_path(env, dirs.projects_dir.as_deref())?;
            let data = marshal::optional_path(env, dirs.data_dir.as_deref())?;
            invoke(
                env,
                wrapper,
                "setDirectories",
                &[
                    Arg::Object(&work),
                    Arg::Object(&output),
                    Arg::Object(&projects),
                    Arg::Object(&data),
                ],
            )?;
            Ok(())
        })
    }

    fn directories(&self) -> Result<Vec<Option<String>>, SimplaceError> {
        self.call(|env, wrapper| {
            let dirs = invoke_object(env, wrapper, "getDirectories", &[])?;
            optional_strings(env, &dirs)
        })
    }

    fn set_check_level(&mut self, level: &str) -> Result<(), SimplaceError> {
        self.call(|env, wrapper| {
            let level = marshal::string(env, level)?;
            invoke(env, wrapper, "setCheckLevel", &[Arg::Object(&level)])?;
            Ok(())
        })
    }

    fn shut_down(&mut self) -> Result<(), SimplaceError> {
        self.call_void("shutDown", &[])
    }
}

//==================================================================================
// Start-up
//==================================================================================

impl Simplace<JavaSession> {
    /// Finds Simplace, starts the JVM and opens a session.
    ///
    /// The installation is `config.install_dir` or, when unset, the first one
    /// `config.search` finds. Work and output directories default to the
    /// layout selected by `config.setting`.
    pub fn init(config: &SimplaceConfig) -> Result<(JvmRuntime, Self), SimplaceError> {
        let install_dir = match &config.install_dir {
            Some(dir) => dir.clone(),
            None => {
                find_first_installation(&config.search).ok_or(SimplaceError::InstallationNotFound)?
            }
        };
        info!("using Simplace installation at {}", install_dir.display());

        let dirs = config.session_dirs(&install_dir)?;
        let runtime = JvmRuntime::start(&RuntimeOptions {
            classpath: build_classpath(&install_dir, &config.additional_classpath)?,
            java_parameters: config.java_parameters.clone(),
            jvm_library: config.jvm_library.clone(),
        })?;
        let session = JavaSession::new(&runtime, &dirs)?;
        Ok((runtime, Simplace::new(session)))
    }
}
