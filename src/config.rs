// In: src/config.rs

//! The single source of truth for all bridge configuration.
//!
//! `SimplaceConfig` is created once at the application boundary (e.g. from a
//! JSON file or built in code) and describes where Simplace lives, which
//! directories the session uses and how the JVM is started.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::SimplaceError;
use crate::install::InstallationSearch;

//==================================================================================
// I. Directory Layouts
//==================================================================================

/// Which default work and output directories to use when none are configured.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InitSetting {
    /// **Default:** `simplace_run/simulation/` and `simplace_run/output/`.
    #[default]
    Run,
    /// `simplace_modules/test/` and `simplace_modules/output/`.
    Modules,
    /// `lapclient/data/` and `lapclient/output/`.
    Lapclient,
    /// `~/SIMPLACE_WORK/` and `~/SIMPLACE_WORK/output/`, as laid out by the Windows installer.
    Wininstall,
}

impl InitSetting {
    /// Default `(work_dir, output_dir)` for an installation at `install_dir`.
    ///
    /// `Wininstall` needs the user's home directory and fails without one.
    pub fn default_dirs(&self, install_dir: &Path) -> Result<(PathBuf, PathBuf), SimplaceError> {
        self.default_dirs_in(install_dir, dirs::home_dir())
    }

    fn default_dirs_in(
        &self,
        install_dir: &Path,
        home: Option<PathBuf>,
    ) -> Result<(PathBuf, PathBuf), SimplaceError> {
        let layout = match self {
            InitSetting::Run => (
                install_dir.join("simplace_run/simulation/"),
                install_dir.join("simplace_run/output/"),
            ),
            InitSetting::Modules => (
                install_dir.join("simplace_modules/test/"),
                install_dir.join("simplace_modules/output/"),
            ),
            InitSetting::Lapclient => (
                install_dir.join("lapclient/data/"),
                install_dir.join("lapclient/output/"),
            ),
            InitSetting::Wininstall => {
                let home = home.ok_or_else(|| {
                    SimplaceError::Config("no home directory for the wininstall layout".into())
                })?;
                (
                    home.join("SIMPLACE_WORK/"),
                    home.join("SIMPLACE_WORK/output/"),
                )
            }
        };
        Ok(layout)
    }
}

impl FromStr for InitSetting {
    type Err = SimplaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "run" => Ok(InitSetting::Run),
            "modules" => Ok(InitSetting::Modules),
            "lapclient" => Ok(InitSetting::Lapclient),
            "wininstall" => Ok(InitSetting::Wininstall),
            _ => Err(SimplaceError::InvalidLevel {
                kind: "init setting",
                value: s.to_string(),
            }),
        }
    }
}

/// The directories of one Simplace session. Unset entries are passed as `null`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct SessionDirs {
    pub work_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub projects_dir: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
}

//==================================================================================
// II. Engine Levels
//==================================================================================

/// Verbosity of Simplace's own logger, from least (`Fatal`) to most (`Trace`) verbose.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "UPPERCASE")]
pub enum EngineLogLevel {
    Fatal,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl EngineLogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineLogLevel::Fatal => "FATAL",
            EngineLogLevel::Error => "ERROR",
            EngineLogLevel::Warn => "WARN",
            EngineLogLevel::Info => "INFO",
            EngineLogLevel::Debug => "DEBUG",
            EngineLogLevel::Trace => "TRACE",
        }
    }
}

impl FromStr for EngineLogLevel {
    type Err = SimplaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "FATAL" => Ok(EngineLogLevel::Fatal),
            "ERROR" => Ok(EngineLogLevel::Error),
            "WARN" => Ok(EngineLogLevel::Warn),
            "INFO" => Ok(EngineLogLevel::Info),
            "DEBUG" => Ok(EngineLogLevel::Debug),
            "TRACE" => Ok(EngineLogLevel::Trace),
            _ => Err(SimplaceError::InvalidLevel {
                kind: "log level",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for EngineLogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How strictly Simplace checks a solution. `Off` does no checks, `Strict` the most severe ones.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckLevel {
    Custom,
    Strict,
    Intense,
    Lazy,
    Off,
    Only,
}

impl CheckLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckLevel::Custom => "CUSTOM",
            CheckLevel::Strict => "STRICT",
            CheckLevel::Intense => "INTENSE",
            CheckLevel::Lazy => "LAZY",
            CheckLevel::Off => "OFF",
            CheckLevel::Only => "ONLY",
        }
    }
}

impl FromStr for CheckLevel {
    type Err = SimplaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CUSTOM" => Ok(CheckLevel::Custom),
            "STRICT" => Ok(CheckLevel::Strict),
            "INTENSE" => Ok(CheckLevel::Intense),
            "LAZY" => Ok(CheckLevel::Lazy),
            "OFF" => Ok(CheckLevel::Off),
            "ONLY" => Ok(CheckLevel::Only),
            _ => Err(SimplaceError::InvalidLevel {
                kind: "check level",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for CheckLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//==================================================================================
// III. JVM Start-up
//==================================================================================

/// Everything needed to start the JVM.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct RuntimeOptions {
    pub classpath: Vec<PathBuf>,
    /// Raw JVM options such as `-Xmx4g`. Unrecognized options are ignored by the JVM.
    pub java_parameters: Vec<String>,
    /// Explicit `libjvm` to load. Located through `JAVA_HOME` when unset.
    pub jvm_library: Option<PathBuf>,
}

//==================================================================================
// IV. The Unified SimplaceConfig
//==================================================================================

/// The single, unified configuration for starting a Simplace session.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, rename_all = "snake_case")]
pub struct SimplaceConfig {
    /// Where `simplace_core`, `simplace_modules`, `simplace_run` etc. reside.
    /// Searched for with `search` when unset.
    pub install_dir: Option<PathBuf>,

    /// Working directory for solutions and projects.
    pub work_dir: Option<PathBuf>,

    /// Output files are written there.
    pub output_dir: Option<PathBuf>,

    /// Optional folder for project data.
    pub projects_dir: Option<PathBuf>,

    /// Optional folder for input data.
    pub data_dir: Option<PathBuf>,

    /// Picks the default work and output directories.
    pub setting: InitSetting,

    /// Extra classpath entries appended after Simplace's own.
    pub additional_classpath: Vec<PathBuf>,

    /// Options passed to the JVM.
    pub java_parameters: Vec<String>,

    /// Explicit `libjvm` to load.
    pub jvm_library: Option<PathBuf>,

    /// How to look for an installation when `install_dir` is unset.
    pub search: InstallationSearch,
}

impl SimplaceConfig {
    pub fn from_json_str(json: &str) -> Result<Self, SimplaceError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SimplaceError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// The session directories for an installation at `install_dir`. Explicit
    /// directories win over the defaults of `setting`.
    pub fn session_dirs(&self, install_dir: &Path) -> Result<SessionDirs, SimplaceError> {
        self.session_dirs_in(install_dir, dirs::home_dir())
    }

    fn session_dirs_in(
        &self,
        install_dir: &Path,
        home: Option<PathBuf>,
    ) -> Result<SessionDirs, SimplaceError> {
        let (work_dir, output_dir) = match (&self.work_dir, &self.output_dir) {
            (Some(work_dir), Some(output_dir)) => (work_dir.clone(), output_dir.clone()),
            _ => {
                let (work_dir, output_dir) = self.setting.default_dirs_in(install_dir, home)?;
                (
                    self.work_dir.clone().unwrap_or(work_dir),
                    self.output_dir.clone().unwrap_or(output_dir),
                )
            }
        };
        Ok(SessionDirs {
            work_dir: Some(work_dir),
            output_dir: Some(output_dir),
            projects_dir: self.projects_dir.clone(),
            data_dir: self.data_dir.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_minimal_json_uses_defaults() {
        let config = SimplaceConfig::from_json_str(r#"{"install_dir": "/opt/simplace"}"#).unwrap();

        assert_eq!(config.install_dir, Some(PathBuf::from("/opt/simplace")));
        assert_eq!(config.setting, InitSetting::Run);
        assert!(config.additional_classpath.is_empty());
        assert!(config.search.try_standard_dirs);
    }

    #[test]
    fn test_session_dirs_prefers_explicit_directories() {
        let config = SimplaceConfig {
            output_dir: Some(PathBuf::from("/out")),
            data_dir: Some(PathBuf::from("/data")),
            setting: InitSetting::Modules,
            ..Default::default()
        };
        let dirs = config.session_dirs(Path::new("/ws")).unwrap();

        assert_eq!(dirs.work_dir, Some(PathBuf::from("/ws/simplace_modules/test/")));
        assert_eq!(dirs.output_dir, Some(PathBuf::from("/out")));
        assert_eq!(dirs.projects_dir, None);
        assert_eq!(dirs.data_dir, Some(PathBuf::from("/data")));
    }

    #[test]
    fn test_wininstall_dirs_live_under_home() {
        let (work, output) = InitSetting::Wininstall
            .default_dirs_in(Path::new("/ws"), Some(PathBuf::from("/home/ada")))
            .unwrap();

        assert_eq!(work, PathBuf::from("/home/ada/SIMPLACE_WORK/"));
        assert_eq!(output, PathBuf::from("/home/ada/SIMPLACE_WORK/output/"));
    }

    #[test]
    fn test_wininstall_without_home_is_a_config_error() {
        let err = InitSetting::Wininstall
            .default_dirs_in(Path::new("/ws"), None)
            .unwrap_err();
        assert!(matches!(err, SimplaceError::Config(_)));

        let config = SimplaceConfig {
            setting: InitSetting::Wininstall,
            ..Default::default()
        };
        assert!(matches!(
            config.session_dirs_in(Path::new("/ws"), None),
            Err(SimplaceError::Config(_))
        ));
    }

    #[test]
    fn test_explicit_dirs_do_not_need_home() {
        let config = SimplaceConfig {
            work_dir: Some(PathBuf::from("/work")),
            output_dir: Some(PathBuf::from("/out")),
            setting: InitSetting::Wininstall,
            ..Default::default()
        };
        let dirs = config.session_dirs_in(Path::new("/ws"), None).unwrap();

        assert_eq!(dirs.work_dir, Some(PathBuf::from("/work")));
        assert_eq!(dirs.output_dir, Some(PathBuf::from("/out")));
    }

    #[test]
    fn test_levels_parse_case_insensitively() {
        assert_eq!("trace".parse::<EngineLogLevel>().unwrap(), EngineLogLevel::Trace);
        assert_eq!("Lazy".parse::<CheckLevel>().unwrap(), CheckLevel::Lazy);
        assert_eq!("lapclient".parse::<InitSetting>().unwrap(), InitSetting::Lapclient);
        assert!(EngineLogLevel::Fatal < EngineLogLevel::Trace);

        let err = "LOUD".parse::<EngineLogLevel>().unwrap_err();
        assert!(err.to_string().contains("log level"));
    }
}
