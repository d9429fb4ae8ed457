// In: src/session.rs

//! The user-facing session API.
//!
//! [`Simplace`] wraps one engine session and does the host-side work around
//! each call: resolving project paths, encoding parameters and shaping results.
//! It is generic over [`EngineSession`] so the same code drives the JVM-backed
//! `JavaSession` and the in-memory fakes used by the tests.
//!
//! A typical run:
//!
//! ```ignore
//! let (runtime, mut sp) = Simplace::init(&SimplaceConfig::default())?;
//! sp.open_project("Maize.sol.xml", None, None)?;
//! let id = sp.create_simulation(Some(&params))?;
//! sp.run_simulations(false)?;
//! let table = result_to_list(&sp.result("YearOut", Some(&id))?, &DecodeOptions::default())?;
//! sp.shut_down()?;
//! ```

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::{CheckLevel, SessionDirs};
use crate::convert::{
    datatypes_of_result, encode_parameter_lists, encode_parameters, result_to_list,
    units_of_result, varmap_to_list, Column, DecodeOptions, Parameters, Value, VarTable,
};
use crate::error::SimplaceError;
use crate::traits::{EngineSession, ResultTable};

//==================================================================================
// I. Argument & Result Shapes
//==================================================================================

/// Which lines of the project data file to simulate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectLines {
    /// A line specification such as `"3-10,15,30-33"`, passed on verbatim.
    Spec(String),
    /// Individual line numbers.
    Numbers(Vec<u32>),
}

impl ProjectLines {
    /// The line specification string Simplace expects.
    pub fn to_line_spec(&self) -> String {
        match self {
            ProjectLines::Spec(spec) => spec.clone(),
            ProjectLines::Numbers(numbers) => numbers
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

impl From<&str> for ProjectLines {
    fn from(spec: &str) -> Self {
        ProjectLines::Spec(spec.to_string())
    }
}

impl From<String> for ProjectLines {
    fn from(spec: String) -> Self {
        ProjectLines::Spec(spec)
    }
}

impl From<Vec<u32>> for ProjectLines {
    fn from(numbers: Vec<u32>) -> Self {
        ProjectLines::Numbers(numbers)
    }
}

impl From<&[u32]> for ProjectLines {
    fn from(numbers: &[u32]) -> Self {
        ProjectLines::Numbers(numbers.to_vec())
    }
}

/// The directories a session currently uses.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SimplaceDirectories {
    #[serde(rename = "_WORKDIR_")]
    pub work_dir: Option<String>,
    #[serde(rename = "_OUTPUTDIR_")]
    pub output_dir: Option<String>,
    #[serde(rename = "_PROJECTSDIR_")]
    pub projects_dir: Option<String>,
    #[serde(rename = "_DATADIR_")]
    pub data_dir: Option<String>,
}

impl SimplaceDirectories {
    fn from_list(dirs: Vec<Option<String>>) -> Self {
        let mut dirs = dirs.into_iter();
        Self {
            work_dir: dirs.next().flatten(),
            output_dir: dirs.next().flatten(),
            projects_dir: dirs.next().flatten(),
            data_dir: dirs.next().flatten(),
        }
    }
}

/// `path` itself if it exists, otherwise the same path below `work_dir` if that
/// exists, otherwise `path` unchanged.
fn resolve_in_work_dir(path: &str, work_dir: Option<&str>) -> String {
    if Path::new(path).exists() {
        return path.to_string();
    }
    if let Some(work_dir) = work_dir {
        let relative = path.trim_start_matches(|c: char| c == '/' || c == '\\');
        let candidate = Path::new(work_dir).join(relative);
        if candidate.exists() {
            debug!("resolved '{}' to {}", path, candidate.display());
            return candidate.to_string_lossy().into_owned();
        }
    }
    path.to_string()
}

//==================================================================================
// II. The Session
//==================================================================================

#[derive(Debug)]
pub struct Simplace<E: EngineSession> {
    engine: E,
}

impl<E: EngineSession> Simplace<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Prepares a session from a solution and an optional project file.
    ///
    /// Paths that do not exist as given are tried relative to the work
    /// directory (leading `/` and `\` stripped).
    pub fn open_project(
        &mut self,
        solution: &str,
        project: Option<&str>,
        params: Option<&Parameters<E::Object>>,
    ) -> Result<(), SimplaceError> {
        let dirs = self.directories()?;
        let work_dir = dirs.work_dir.as_deref();
        let solution = resolve_in_work_dir(solution, work_dir);
        let project = project.map(|p| resolve_in_work_dir(p, work_dir));
        let params = encode_parameters(params)?;

        info!("opening solution {}", solution);
        self.engine
            .prepare_session(project.as_deref(), &solution, params.as_ref())
    }

    /// Closes the project. The session can open another one afterwards.
    pub fn close_project(&mut self) -> Result<(), SimplaceError> {
        info!("closing project");
        self.engine.shut_down()
    }

    /// Selects the lines of the project data file, e.g. `"3-10,15"` or `vec![1, 3, 8]`.
    pub fn set_project_lines(
        &mut self,
        lines: impl Into<ProjectLines>,
    ) -> Result<(), SimplaceError> {
        let spec = lines.into().to_line_spec();
        self.engine.set_project_lines(&spec)
    }

    pub fn run_project(&mut self) -> Result<(), SimplaceError> {
        info!("running project");
        self.engine.run()
    }

    /// Creates one simulation and returns its id.
    pub fn create_simulation(
        &mut self,
        params: Option<&Parameters<E::Object>>,
    ) -> Result<String, SimplaceError> {
        let params = encode_parameters(params)?;
        self.engine.create_simulation(params.as_ref())?;
        self.engine
            .simulation_ids()?
            .pop()
            .ok_or_else(|| SimplaceError::Foreign("no simulation was created".into()))
    }

    /// Ids of the simulations ready to run.
    pub fn simulation_ids(&self) -> Result<Vec<String>, SimplaceError> {
        self.engine.simulation_ids()
    }

    /// Sets values of the simulation that runs stepwise.
    pub fn set_simulation_values(
        &mut self,
        params: Option<&Parameters<E::Object>>,
    ) -> Result<(), SimplaceError> {
        let params = encode_parameters(params)?;
        self.engine.set_simulation_values(params.as_ref())
    }

    /// Sets values of every queued simulation, one map per simulation.
    pub fn set_all_simulation_values(
        &mut self,
        params: Option<&[Parameters<E::Object>]>,
    ) -> Result<(), SimplaceError> {
        let params = encode_parameter_lists(params)?;
        self.engine.set_all_simulation_values(params.as_deref())
    }

    pub fn run_simulations(&mut self, select_simulation: bool) -> Result<(), SimplaceError> {
        info!("running simulations");
        self.engine.run_simulations(select_simulation)
    }

    /// Runs `count` steps of the simulation at `simulation_number` in the queue
    /// and returns its variables (decode with `varmap_to_list`).
    pub fn step_simulation(
        &mut self,
        count: i32,
        params: Option<&Parameters<E::Object>>,
        var_filter: Option<&[String]>,
        simulation_number: i32,
    ) -> Result<E::Table, SimplaceError> {
        let params = encode_parameters(params)?;
        self.engine
            .step_specific(simulation_number, params.as_ref(), var_filter, count)
    }

    /// Runs `count` steps of every queued simulation.
    pub fn step_all_simulations(
        &mut self,
        count: i32,
        params: Option<&[Parameters<E::Object>]>,
        var_filter: Option<&[String]>,
    ) -> Result<Vec<E::Table>, SimplaceError> {
        let params = encode_parameter_lists(params)?;
        self.engine.step_all(params.as_deref(), var_filter, count)
    }

    /// A memory output of finished simulations, of all of them when
    /// `simulation` is `None` (decode with `result_to_list`).
    pub fn result(
        &self,
        output: &str,
        simulation: Option<&str>,
    ) -> Result<E::Table, SimplaceError> {
        self.engine.result(output, simulation)
    }

    pub fn set_directories(&mut self, dirs: &SessionDirs) -> Result<(), SimplaceError> {
        self.engine.set_directories(dirs)
    }

    pub fn directories(&self) -> Result<SimplaceDirectories, SimplaceError> {
        Ok(SimplaceDirectories::from_list(self.engine.directories()?))
    }

    pub fn set_check_level(&mut self, level: CheckLevel) -> Result<(), SimplaceError> {
        self.engine.set_check_level(level.as_str())
    }

    /// Ends the session. The JVM keeps running until the process exits.
    pub fn shut_down(mut self) -> Result<(), SimplaceError> {
        info!("shutting down Simplace session");
        self.engine.shut_down()
    }
}

//==================================================================================
// III. Result Handles
//==================================================================================

/// A finished simulation's output, as returned by [`Simplace::result`].
#[derive(Debug, Clone)]
pub struct SimplaceResult<T: ResultTable> {
    table: T,
}

impl<T: ResultTable> SimplaceResult<T> {
    pub fn new(table: T) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &T {
        &self.table
    }

    pub fn into_inner(self) -> T {
        self.table
    }

    pub fn to_list(
        &self,
        options: &DecodeOptions,
    ) -> Result<VarTable<Column<T::Object>>, SimplaceError> {
        result_to_list(&self.table, options)
    }

    pub fn units(&self) -> Result<VarTable<String>, SimplaceError> {
        units_of_result(&self.table)
    }

    pub fn datatypes(&self) -> Result<VarTable<String>, SimplaceError> {
        datatypes_of_result(&self.table)
    }
}

impl<T: ResultTable> From<T> for SimplaceResult<T> {
    fn from(table: T) -> Self {
        Self::new(table)
    }
}

/// The variables of one step, as returned by [`Simplace::step_simulation`].
#[derive(Debug, Clone)]
pub struct SimplaceVarmap<T: ResultTable> {
    table: T,
}

impl<T: ResultTable> SimplaceVarmap<T> {
    pub fn new(table: T) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &T {
        &self.table
    }

    pub fn into_inner(self) -> T {
        self.table
    }

    pub fn to_list(
        &self,
        expand: bool,
        legacy: bool,
    ) -> Result<VarTable<Value<T::Object>>, SimplaceError> {
        varmap_to_list(&self.table, expand, legacy)
    }

    pub fn units(&self) -> Result<VarTable<String>, SimplaceError> {
        units_of_result(&self.table)
    }
}

impl<T: ResultTable> From<T> for SimplaceVarmap<T> {
    fn from(table: T) -> Self {
        Self::new(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{EncodedValue, ParamValue, Series};
    use crate::testing::{FakeEngine, FakeObject, FakeTable};
    use ndarray::array;
    use serde_json::json;
    use std::fs;
    use std::path::PathBuf;

    fn params(value: serde_json::Value) -> Parameters<FakeObject> {
        Parameters::<FakeObject>::try_from(value).unwrap()
    }

    fn session_in(work_dir: &Path) -> Simplace<FakeEngine> {
        let mut sp = Simplace::new(FakeEngine::default());
        sp.set_directories(&SessionDirs {
            work_dir: Some(work_dir.to_path_buf()),
            output_dir: Some(PathBuf::from("/out")),
            ..Default::default()
        })
        .unwrap();
        sp
    }

    #[test]
    fn test_open_project_resolves_paths_in_work_dir() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("sol")).unwrap();
        fs::write(tmp.path().join("sol/Maize.sol.xml"), b"<solution/>").unwrap();
        let mut sp = session_in(tmp.path());

        sp.open_project("/sol/Maize.sol.xml", Some("missing.proj.xml"), None)
            .unwrap();

        let expected = tmp.path().join("sol/Maize.sol.xml");
        assert_eq!(
            sp.engine().calls.last().unwrap(),
            &format!(
                "prepareSession({:?}, {:?})",
                Some("missing.proj.xml"),
                expected.to_string_lossy()
            )
        );
        assert_eq!(sp.engine().last_params, None);
    }

    #[test]
    fn test_open_project_keeps_existing_paths() {
        let tmp = tempfile::tempdir().unwrap();
        let solution = tmp.path().join("abs.sol.xml");
        fs::write(&solution, b"").unwrap();
        let mut sp = session_in(Path::new("/nowhere"));

        let solution = solution.to_string_lossy().into_owned();
        sp.open_project(&solution, None, Some(&params(json!({"vLUE": 3}))))
            .unwrap();

        assert_eq!(
            sp.engine().calls.last().unwrap(),
            &format!("prepareSession(None, {:?})", solution)
        );
        assert_eq!(
            sp.engine().last_params,
            Some(vec![("vLUE".to_string(), EncodedValue::BoxedInt(3))])
        );
    }

    #[test]
    fn test_project_lines_are_joined() {
        let mut sp = Simplace::new(FakeEngine::default());
        sp.set_project_lines(vec![1u32, 3, 8, 9, 17]).unwrap();
        sp.set_project_lines("3-10,15").unwrap();

        assert_eq!(
            sp.engine().calls,
            vec![
                "setProjectLines(\"1,3,8,9,17\")".to_string(),
                "setProjectLines(\"3-10,15\")".to_string(),
            ]
        );
        assert_eq!(ProjectLines::Numbers(vec![]).to_line_spec(), "");
    }

    #[test]
    fn test_create_simulation_returns_last_id() {
        let mut sp = Simplace::new(FakeEngine::default());
        let first = sp.create_simulation(None).unwrap();
        let second = sp
            .create_simulation(Some(&params(json!({"vLUE": 3.2, "vSLA": [1, 2]}))))
            .unwrap();

        assert_eq!(first, "sim1");
        assert_eq!(second, "sim2");
        assert_eq!(sp.simulation_ids().unwrap(), vec!["sim1", "sim2"]);
        assert_eq!(
            sp.engine().last_params,
            Some(vec![
                (
                    "vLUE".to_string(),
                    EncodedValue::PassThrough(ParamValue::Json(json!(3.2)))
                ),
                ("vSLA".to_string(), EncodedValue::IntArray(vec![1, 2])),
            ])
        );
    }

    #[test]
    fn test_stepping_forwards_arguments() {
        let mut engine = FakeEngine::default();
        engine.table = FakeTable::new().column("x", "INT", "", FakeObject::Int(1));
        let mut sp = Simplace::new(engine);
        sp.create_simulation(None).unwrap();
        sp.create_simulation(None).unwrap();

        let filter = vec!["x".to_string()];
        let varmap = sp.step_simulation(5, None, Some(&filter), 1).unwrap();
        assert_eq!(varmap.names, vec!["x"]);

        let lists = vec![params(json!({"a": 1})), params(json!({"b": [0.5]}))];
        let varmaps = sp.step_all_simulations(2, Some(&lists), None).unwrap();
        assert_eq!(varmaps.len(), 2);

        let calls = &sp.engine().calls;
        assert_eq!(calls[2], "stepSpecific(1, Some([\"x\"]), 5)");
        assert_eq!(calls[3], "stepAll(None, 2)");
        assert_eq!(
            sp.engine().last_param_lists,
            Some(vec![
                vec![("a".to_string(), EncodedValue::BoxedInt(1))],
                vec![("b".to_string(), EncodedValue::DoubleArray(vec![0.5]))],
            ])
        );
    }

    #[test]
    fn test_set_simulation_values_encodes_parameters() {
        let mut sp = Simplace::new(FakeEngine::default());
        sp.set_simulation_values(Some(&params(json!({"vLUE": 3, "vSLA": [0.5, 1]}))))
            .unwrap();

        assert_eq!(sp.engine().calls, vec!["setSimulationValues()"]);
        assert_eq!(
            sp.engine().last_params,
            Some(vec![
                ("vLUE".to_string(), EncodedValue::BoxedInt(3)),
                ("vSLA".to_string(), EncodedValue::DoubleArray(vec![0.5, 1.0])),
            ])
        );

        sp.set_simulation_values(None).unwrap();
        assert_eq!(sp.engine().last_params, None);
    }

    #[test]
    fn test_result_is_decoded() {
        let mut engine = FakeEngine::default();
        engine.table = FakeTable::new()
            .column("Yield", "DOUBLE", "kg/ha", FakeObject::doubles(&[1.0, 2.0, 3.0]))
            .column("Day", "INT", "d", FakeObject::ints(&[1, 2, 3]));
        let sp = Simplace::new(engine);
        let result = SimplaceResult::from(sp.result("YearOut", Some("sim1")).unwrap());

        let table = result.to_list(&DecodeOptions::default()).unwrap();
        assert_eq!(
            table.get("Yield"),
            Some(&Column::Doubles(Series::Vector(array![1.0, 2.0, 3.0])))
        );
        assert_eq!(
            table.get("Day"),
            Some(&Column::Ints(Series::Vector(array![1, 2, 3])))
        );

        let window = result
            .to_list(&DecodeOptions::default().window(1, 2))
            .unwrap();
        assert_eq!(
            window.get("Day"),
            Some(&Column::Ints(Series::Vector(array![2, 3])))
        );
        assert_eq!(result.table().windows.borrow().as_slice(), &[(1, 2)]);

        let units = result.units().unwrap();
        assert_eq!(units.get("Yield").map(String::as_str), Some("kg/ha"));
        let types = result.datatypes().unwrap();
        assert_eq!(types.get("Day").map(String::as_str), Some("INT"));
    }

    #[test]
    fn test_step_varmap_is_decoded() {
        let mut engine = FakeEngine::default();
        engine.table = FakeTable::new()
            .column("LAI", "DOUBLE", "m2/m2", FakeObject::Double(0.5))
            .column("CurrentDate", "DATE", "", FakeObject::str("2020-01-15T00:00:00"));
        let mut sp = Simplace::new(engine);
        sp.create_simulation(None).unwrap();

        let varmap = SimplaceVarmap::from(sp.step_simulation(1, None, None, 0).unwrap());
        let values = varmap.to_list(true, false).unwrap();

        assert_eq!(values.get("LAI"), Some(&Value::Double(0.5)));
        assert_eq!(
            values.get("CurrentDate"),
            Some(&Value::Date("2020-01-15".to_string()))
        );
        let units = varmap.units().unwrap();
        assert_eq!(units.get("LAI").map(String::as_str), Some("m2/m2"));
    }

    #[test]
    fn test_set_all_simulation_values_with_none() {
        let mut sp = Simplace::new(FakeEngine::default());
        sp.set_all_simulation_values(None).unwrap();
        assert_eq!(sp.engine().last_param_lists, None);
        assert_eq!(sp.engine().calls, vec!["setAllSimulationValues()"]);
    }

    #[test]
    fn test_directories_are_named() {
        let sp = session_in(Path::new("/work"));
        let dirs = sp.directories().unwrap();

        assert_eq!(dirs.work_dir.as_deref(), Some("/work"));
        assert_eq!(dirs.output_dir.as_deref(), Some("/out"));
        assert_eq!(dirs.projects_dir, None);

        let as_json = serde_json::to_value(&dirs).unwrap();
        assert_eq!(as_json["_WORKDIR_"], json!("/work"));
        assert_eq!(as_json["_DATADIR_"], json!(null));
    }

    #[test]
    fn test_check_level_close_and_shut_down() {
        let mut sp = Simplace::new(FakeEngine::default());
        sp.set_check_level(CheckLevel::Strict).unwrap();
        sp.close_project().unwrap();
        sp.run_project().unwrap();
        sp.run_simulations(true).unwrap();
        assert_eq!(
            sp.engine().calls,
            vec![
                "setCheckLevel(\"STRICT\")",
                "shutDown()",
                "run()",
                "runSimulations(true)"
            ]
        );
        sp.shut_down().unwrap();
    }

    #[test]
    fn test_engine_errors_pass_through() {
        let sp = Simplace::new(FakeEngine::default());
        assert!(matches!(sp.result("", None), Err(SimplaceError::Foreign(_))));
    }
}
