//! In-memory stand-ins for the Java side, used by the unit tests.
//!
//! `FakeObject` models the handful of Java values Simplace hands out, `FakeTable`
//! a `Result`/`VarMap`, and `FakeEngine` a session wrapper that records every
//! call it receives.

use std::cell::RefCell;

use crate::config::SessionDirs;
use crate::convert::EncodedParameters;
use crate::error::SimplaceError;
use crate::traits::{EngineSession, ForeignObject, ResultTable};

#[derive(Debug, Clone, PartialEq)]
pub enum FakeObject {
    Null,
    Str(String),
    Double(f64),
    Int(i32),
    Bool(bool),
    Array(Vec<FakeObject>),
}

impl FakeObject {
    pub fn str(s: &str) -> Self {
        FakeObject::Str(s.to_string())
    }

    pub fn doubles(values: &[f64]) -> Self {
        FakeObject::Array(values.iter().copied().map(FakeObject::Double).collect())
    }

    pub fn ints(values: &[i32]) -> Self {
        FakeObject::Array(values.iter().copied().map(FakeObject::Int).collect())
    }

    pub fn bools(values: &[bool]) -> Self {
        FakeObject::Array(values.iter().copied().map(FakeObject::Bool).collect())
    }

    pub fn strs(values: &[&str]) -> Self {
        FakeObject::Array(values.iter().map(|s| FakeObject::str(s)).collect())
    }

    pub fn array(items: Vec<FakeObject>) -> Self {
        FakeObject::Array(items)
    }

    fn mismatch(&self, wanted: &str) -> SimplaceError {
        SimplaceError::Foreign(format!("{:?} is not {}", self, wanted))
    }
}

impl ForeignObject for FakeObject {
    fn display_string(&self) -> Result<String, SimplaceError> {
        Ok(match self {
            FakeObject::Null => "null".to_string(),
            FakeObject::Str(s) => s.clone(),
            FakeObject::Double(d) => format!("{:?}", d),
            FakeObject::Int(i) => i.to_string(),
            FakeObject::Bool(b) => b.to_string(),
            FakeObject::Array(items) => format!("[Ljava.lang.Object;@{}", items.len()),
        })
    }

    fn elements(&self) -> Result<Vec<Self>, SimplaceError> {
        match self {
            FakeObject::Array(items) => Ok(items.clone()),
            other => Err(other.mismatch("an array")),
        }
    }

    fn unbox_doubles(&self) -> Result<Vec<f64>, SimplaceError> {
        self.elements()?.iter().map(|o| o.double_value()).collect()
    }

    fn unbox_ints(&self) -> Result<Vec<i32>, SimplaceError> {
        self.elements()?.iter().map(|o| o.int_value()).collect()
    }

    fn unbox_booleans(&self) -> Result<Vec<bool>, SimplaceError> {
        self.elements()?
            .iter()
            .map(|o| match o {
                FakeObject::Bool(b) => Ok(*b),
                other => Err(other.mismatch("a Boolean")),
            })
            .collect()
    }

    fn double_value(&self) -> Result<f64, SimplaceError> {
        match self {
            FakeObject::Double(d) => Ok(*d),
            FakeObject::Int(i) => Ok(f64::from(*i)),
            other => Err(other.mismatch("a Number")),
        }
    }

    fn int_value(&self) -> Result<i32, SimplaceError> {
        match self {
            FakeObject::Int(i) => Ok(*i),
            FakeObject::Double(d) => Ok(*d as i32),
            other => Err(other.mismatch("a Number")),
        }
    }
}

/// A `Result` (columns are per-step arrays) or `VarMap` (columns are scalars).
#[derive(Debug, Clone, Default)]
pub struct FakeTable {
    pub names: Vec<String>,
    pub types: Vec<String>,
    pub units: Vec<String>,
    pub columns: Vec<FakeObject>,
    /// Windows passed to `data_objects_range`, in call order.
    pub windows: RefCell<Vec<(i32, i32)>>,
}

impl FakeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column(mut self, name: &str, tag: &str, unit: &str, data: FakeObject) -> Self {
        self.names.push(name.to_string());
        self.types.push(tag.to_string());
        self.units.push(unit.to_string());
        self.columns.push(data);
        self
    }
}

impl ResultTable for FakeTable {
    type Object = FakeObject;

    fn header_strings(&self) -> Result<Vec<String>, SimplaceError> {
        Ok(self.names.clone())
    }

    fn type_strings(&self) -> Result<Vec<String>, SimplaceError> {
        Ok(self.types.clone())
    }

    fn header_units(&self) -> Result<Vec<String>, SimplaceError> {
        Ok(self.units.clone())
    }

    fn data_objects(&self) -> Result<Vec<FakeObject>, SimplaceError> {
        Ok(self.columns.clone())
    }

    /// Steps `start..=end` of every column, clipped to the available steps.
    fn data_objects_range(&self, start: i32, end: i32) -> Result<Vec<FakeObject>, SimplaceError> {
        self.windows.borrow_mut().push((start, end));
        let (start, end) = (start as usize, end as usize);
        self.columns
            .iter()
            .map(|column| -> Result<_, SimplaceError> {
                let steps = column.elements()?;
                let stop = (end + 1).min(steps.len());
                let begin = start.min(stop);
                Ok(FakeObject::Array(steps[begin..stop].to_vec()))
            })
            .collect()
    }
}

/// Records every call as a line of text and answers from canned data.
#[derive(Debug, Default)]
pub struct FakeEngine {
    pub calls: Vec<String>,
    pub ids: Vec<String>,
    pub dirs: Vec<Option<String>>,
    pub table: FakeTable,
    pub last_params: Option<EncodedParameters<FakeObject>>,
    pub last_param_lists: Option<Vec<EncodedParameters<FakeObject>>>,
}

impl EngineSession for FakeEngine {
    type Object = FakeObject;
    type Table = FakeTable;

    fn prepare_session(
        &mut self,
        project: Option<&str>,
        solution: &str,
        params: Option<&EncodedParameters<FakeObject>>,
    ) -> Result<(), SimplaceError> {
        self.calls
            .push(format!("prepareSession({:?}, {:?})", project, solution));
        self.last_params = params.cloned();
        Ok(())
    }

    fn run(&mut self) -> Result<(), SimplaceError> {
        self.calls.push("run()".into());
        Ok(())
    }

    fn set_project_lines(&mut self, lines: &str) -> Result<(), SimplaceError> {
        self.calls.push(format!("setProjectLines({:?})", lines));
        Ok(())
    }

    fn create_simulation(
        &mut self,
        params: Option<&EncodedParameters<FakeObject>>,
    ) -> Result<(), SimplaceError> {
        self.calls.push("createSimulation()".into());
        self.last_params = params.cloned();
        self.ids.push(format!("sim{}", self.ids.len() + 1));
        Ok(())
    }

    fn simulation_ids(&self) -> Result<Vec<String>, SimplaceError> {
        Ok(self.ids.clone())
    }

    fn set_simulation_values(
        &mut self,
        params: Option<&EncodedParameters<FakeObject>>,
    ) -> Result<(), SimplaceError> {
        self.calls.push("setSimulationValues()".into());
        self.last_params = params.cloned();
        Ok(())
    }

    fn set_all_simulation_values(
        &mut self,
        params: Option<&[EncodedParameters<FakeObject>]>,
    ) -> Result<(), SimplaceError> {
        self.calls.push("setAllSimulationValues()".into());
        self.last_param_lists = params.map(<[_]>::to_vec);
        Ok(())
    }

    fn run_simulations(&mut self, select_simulation: bool) -> Result<(), SimplaceError> {
        self.calls.push(format!("runSimulations({})", select_simulation));
        Ok(())
    }

    fn step_specific(
        &mut self,
        simulation_number: i32,
        params: Option<&EncodedParameters<FakeObject>>,
        var_filter: Option<&[String]>,
        count: i32,
    ) -> Result<FakeTable, SimplaceError> {
        self.calls.push(format!(
            "stepSpecific({}, {:?}, {})",
            simulation_number, var_filter, count
        ));
        self.last_params = params.cloned();
        Ok(self.table.clone())
    }

    fn step_all(
        &mut self,
        params: Option<&[EncodedParameters<FakeObject>]>,
        var_filter: Option<&[String]>,
        count: i32,
    ) -> Result<Vec<FakeTable>, SimplaceError> {
        self.calls
            .push(format!("stepAll({:?}, {})", var_filter, count));
        self.last_param_lists = params.map(<[_]>::to_vec);
        Ok(vec![self.table.clone(); self.ids.len()])
    }

    fn result(
        &self,
        output: &str,
        _simulation_id: Option<&str>,
    ) -> Result<FakeTable, SimplaceError> {
        if output.is_empty() {
            return Err(SimplaceError::Foreign("no such output".into()));
        }
        Ok(self.table.clone())
    }

    fn set_directories(&mut self, dirs: &SessionDirs) -> Result<(), SimplaceError> {
        self.calls.push(format!("setDirectories({:?})", dirs.work_dir));
        let to_string = |p: &Option<std::path::PathBuf>| {
            p.as_ref().map(|p| p.to_string_lossy().into_owned())
        };
        self.dirs = vec![
            to_string(&dirs.work_dir),
            to_string(&dirs.output_dir),
            to_string(&dirs.projects_dir),
            to_string(&dirs.data_dir),
        ];
        Ok(())
    }

    fn directories(&self) -> Result<Vec<Option<String>>, SimplaceError> {
        Ok(self.dirs.clone())
    }

    fn set_check_level(&mut self, level: &str) -> Result<(), SimplaceError> {
        self.calls.push(format!("setCheckLevel({:?})", level));
        Ok(())
    }

    fn shut_down(&mut self) -> Result<(), SimplaceError> {
        self.calls.push("shutDown()".into());
        Ok(())
    }
}
