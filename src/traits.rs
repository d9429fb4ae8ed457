//! This module defines the capability traits the bridge is written against.
//!
//! Everything that needs a live Java object goes through one of these traits:
//!
//! * [`ForeignObject`]: an opaque handle to one Java value (a boxed number, a
//!   string, an array, ...). Only the handful of operations the decoders need are
//!   exposed.
//! * [`ResultTable`]: the read side of a Simplace `Result` or `VarMap`: aligned
//!   header names, type tags, units and the raw per-column data.
//! * [`EngineSession`]: the methods of the Simplace session wrapper.
//!
//! The JNI-backed implementations live in `crate::jvm`. The marshalling code in
//! `crate::convert` never touches JNI directly, which keeps it testable with
//! plain in-memory fakes.

use std::fmt::Debug;

use crate::config::SessionDirs;
use crate::convert::EncodedParameters;
use crate::error::SimplaceError;

/// An opaque reference to a value living on the Java side.
pub trait ForeignObject: Clone + Debug {
    /// The value's `toString()`.
    fn display_string(&self) -> Result<String, SimplaceError>;

    /// The elements of an object array (or of a `java.util.Collection`).
    fn elements(&self) -> Result<Vec<Self>, SimplaceError>;

    /// Unboxes a `double[]`, or an array of `java.lang.Number`, into host doubles.
    fn unbox_doubles(&self) -> Result<Vec<f64>, SimplaceError>;

    /// Unboxes an `int[]`, or an array of `java.lang.Number`, into host ints.
    fn unbox_ints(&self) -> Result<Vec<i32>, SimplaceError>;

    /// Unboxes a `boolean[]` or a `Boolean[]`.
    fn unbox_booleans(&self) -> Result<Vec<bool>, SimplaceError>;

    /// `Number.doubleValue()`.
    fn double_value(&self) -> Result<f64, SimplaceError>;

    /// `Number.intValue()`.
    fn int_value(&self) -> Result<i32, SimplaceError>;
}

/// Read access to a Simplace `Result` (many steps) or `VarMap` (one step).
///
/// `header_strings`, `type_strings`, `header_units` and `data_objects` are index
/// aligned: entry `i` of each describes column `i`.
pub trait ResultTable {
    type Object: ForeignObject;

    fn header_strings(&self) -> Result<Vec<String>, SimplaceError>;
    fn type_strings(&self) -> Result<Vec<String>, SimplaceError>;
    fn header_units(&self) -> Result<Vec<String>, SimplaceError>;

    /// One raw value per column. For a `Result` each value is the per-step array
    /// of that column, for a `VarMap` it is the value of the single step.
    fn data_objects(&self) -> Result<Vec<Self::Object>, SimplaceError>;

    /// Like [`ResultTable::data_objects`], restricted to the steps `start..=end`.
    fn data_objects_range(&self, start: i32, end: i32)
        -> Result<Vec<Self::Object>, SimplaceError>;
}

/// The Simplace session wrapper (`net.simplace.sim.wrapper.SimplaceWrapper`).
///
/// Methods mirror the Java API one to one. Parameters arrive already encoded.
pub trait EngineSession {
    type Object: ForeignObject;
    /// Both `Result` and `VarMap` handles.
    type Table: ResultTable<Object = Self::Object>;

    fn prepare_session(
        &mut self,
        project: Option<&str>,
        solution: &str,
        params: Option<&EncodedParameters<Self::Object>>,
    ) -> Result<(), SimplaceError>;

    fn run(&mut self) -> Result<(), SimplaceError>;

    fn set_project_lines(&mut self, lines: &str) -> Result<(), SimplaceError>;

    fn create_simulation(
        &mut self,
        params: Option<&EncodedParameters<Self::Object>>,
    ) -> Result<(), SimplaceError>;

    fn simulation_ids(&self) -> Result<Vec<String>, SimplaceError>;

    fn set_simulation_values(
        &mut self,
        params: Option<&EncodedParameters<Self::Object>>,
    ) -> Result<(), SimplaceError>;

    fn set_all_simulation_values(
        &mut self,
        params: Option<&[EncodedParameters<Self::Object>]>,
    ) -> Result<(), SimplaceError>;

    fn run_simulations(&mut self, select_simulation: bool) -> Result<(), SimplaceError>;

    fn step_specific(
        &mut self,
        simulation_number: i32,
        params: Option<&EncodedParameters<Self::Object>>,
        var_filter: Option<&[String]>,
        count: i32,
    ) -> Result<Self::Table, SimplaceError>;

    fn step_all(
        &mut self,
        params: Option<&[EncodedParameters<Self::Object>]>,
        var_filter: Option<&[String]>,
        count: i32,
    ) -> Result<Vec<Self::Table>, SimplaceError>;

    fn result(
        &self,
        output: &str,
        simulation_id: Option<&str>,
    ) -> Result<Self::Table, SimplaceError>;

    fn set_directories(&mut self, dirs: &SessionDirs) -> Result<(), SimplaceError>;

    /// Work, output, projects and data directory, in that order. Unset entries are `None`.
    fn directories(&self) -> Result<Vec<Option<String>>, SimplaceError>;

    fn set_check_level(&mut self, level: &str) -> Result<(), SimplaceError>;

    fn shut_down(&mut self) -> Result<(), SimplaceError>;
}
