//! Assembles the JVM classpath for a Simplace installation.

use log::debug;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::SimplaceError;

/// Class and resource directories, relative to the installation.
pub const CLASS_DIRS: [&str; 6] = [
    "simplace_core/build/classes",
    "simplace_core/conf",
    "simplace_modules/build/classes",
    "simplace_run/build/classes",
    "simplace_run/conf",
    "simplace_core/res/files",
];

/// Directories searched recursively for `.jar` files.
pub const LIB_DIRS: [&str; 2] = ["simplace_core/lib", "lib"];

fn is_jar(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().to_lowercase().ends_with(".jar"))
        .unwrap_or(false)
}

/// Every `.jar` below `root`, sorted. A missing `root` yields nothing.
pub fn find_jars(root: &Path) -> Result<Vec<PathBuf>, SimplaceError> {
    if !root.is_dir() {
        return Ok(Vec::new());
    }
    let mut jars = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        if entry.file_type().is_file() && is_jar(entry.path()) {
            jars.push(entry.into_path());
        }
    }
    jars.sort();
    Ok(jars)
}

/// Class directories, then library jars, then `additional` entries.
pub fn build_classpath(
    install_dir: &Path,
    additional: &[PathBuf],
) -> Result<Vec<PathBuf>, SimplaceError> {
    let mut classpath: Vec<PathBuf> = CLASS_DIRS.iter().map(|d| install_dir.join(d)).collect();
    for lib in LIB_DIRS {
        classpath.extend(find_jars(&install_dir.join(lib))?);
    }
    classpath.extend(additional.iter().cloned());
    debug!(
        "classpath for {} has {} entries",
        install_dir.display(),
        classpath.len()
    );
    Ok(classpath)
}

/// Joins classpath entries with the platform separator.
pub fn join_classpath(entries: &[PathBuf]) -> Result<OsString, SimplaceError> {
    std::env::join_paths(entries).map_err(|e| SimplaceError::Config(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_classpath_order_and_jar_filter() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("simplace_core/lib/nested")).unwrap();
        fs::create_dir_all(root.join("lib")).unwrap();
        fs::write(root.join("simplace_core/lib/b.jar"), b"").unwrap();
        fs::write(root.join("simplace_core/lib/nested/A.JAR"), b"").unwrap();
        fs::write(root.join("simplace_core/lib/readme.txt"), b"").unwrap();
        fs::write(root.join("lib/extra.Jar"), b"").unwrap();

        let extra = PathBuf::from("/my/classes");
        let classpath = build_classpath(root, &[extra.clone()]).unwrap();

        assert_eq!(classpath[0], root.join("simplace_core/build/classes"));
        assert_eq!(classpath[5], root.join("simplace_core/res/files"));
        assert_eq!(
            &classpath[6..],
            &[
                root.join("simplace_core/lib/b.jar"),
                root.join("simplace_core/lib/nested/A.JAR"),
                root.join("lib/extra.Jar"),
                extra,
            ]
        );
    }

    #[test]
    fn test_missing_lib_dirs_are_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let classpath = build_classpath(tmp.path(), &[]).unwrap();
        assert_eq!(classpath.len(), CLASS_DIRS.len());
    }

    #[test]
    fn test_join_classpath_round_trips() {
        let entries = vec![PathBuf::from("/a/b.jar"), PathBuf::from("/c")];
        let joined = join_classpath(&entries).unwrap();
        let split: Vec<PathBuf> = std::env::split_paths(&joined).collect();
        assert_eq!(split, entries);
    }
}
