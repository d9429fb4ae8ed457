//! Finds Simplace installations on disk.
//!
//! An installation is a directory that contains `simplace_core`,
//! `simplace_modules` and (unless told otherwise) the simulations directory.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const STANDARD_PARENTS: [&str; 5] = ["d:", "c:", "e:", "f:", "g:"];
const STANDARD_SUBDIRS: [&str; 4] = [
    "workspace/",
    "simplace/",
    "java/simplace/",
    "simplace/workspace/",
];

/// Where and how to look for installations.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct InstallationSearch {
    /// Checked first, in order.
    pub directories: Vec<PathBuf>,
    /// Also check the common locations below the home directory, the Windows
    /// drive roots and the current directory.
    pub try_standard_dirs: bool,
    pub first_match_only: bool,
    /// Directory that holds the user's simulations.
    pub simulations_dir: String,
    pub ignore_simulations_dir: bool,
    /// Report an empty or ambiguous search through the log.
    pub verbose: bool,
}

impl Default for InstallationSearch {
    fn default() -> Self {
        Self {
            directories: Vec::new(),
            try_standard_dirs: true,
            first_match_only: false,
            simulations_dir: "simplace_run".to_string(),
            ignore_simulations_dir: false,
            verbose: true,
        }
    }
}

impl InstallationSearch {
    pub fn in_directories<I, P>(directories: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            directories: directories.into_iter().map(Into::into).collect(),
            try_standard_dirs: false,
            ..Self::default()
        }
    }

    /// Every directory this search will probe, in probing order.
    pub fn candidates(&self) -> Vec<PathBuf> {
        let mut candidates = self.directories.clone();
        if self.try_standard_dirs {
            let mut parents: Vec<PathBuf> = dirs::home_dir().into_iter().collect();
            parents.extend(STANDARD_PARENTS.iter().map(PathBuf::from));
            if let Ok(cwd) = std::env::current_dir() {
                parents.push(cwd);
            }
            for parent in &parents {
                for sub in STANDARD_SUBDIRS {
                    candidates.push(parent.join(sub));
                }
            }
        }
        candidates
    }

    fn required_entries(&self) -> Vec<&str> {
        let mut required = vec!["simplace_core", "simplace_modules"];
        if !self.ignore_simulations_dir {
            required.push(self.simulations_dir.as_str());
        }
        required
    }
}

fn is_installation(dir: &Path, required: &[&str]) -> bool {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return false;
    };
    let present: HashSet<String> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    required.iter().all(|name| present.contains(*name))
}

/// Returns all matching installations. An empty result is not an error.
pub fn find_installations(search: &InstallationSearch) -> Vec<PathBuf> {
    let required = search.required_entries();
    let mut found: Vec<PathBuf> = search
        .candidates()
        .into_iter()
        .filter(|dir| is_installation(dir, &required))
        .collect();

    if search.verbose {
        if found.is_empty() {
            warn!("Could not detect Simplace automatically");
        }
        if search.first_match_only && found.len() > 1 {
            info!("Found more than one Simplace installation. Returning first one.");
        }
    }
    if search.first_match_only {
        found.truncate(1);
    }
    found
}

/// The first installation found, searched quietly.
pub fn find_first_installation(search: &InstallationSearch) -> Option<PathBuf> {
    let search = InstallationSearch {
        first_match_only: true,
        verbose: false,
        ..search.clone()
    };
    find_installations(&search).into_iter().next()
}
