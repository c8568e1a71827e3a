// src/script/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::dag::TaskGraph;
use crate::errors::Result;
use crate::script::compile::compile;
use crate::script::model::{RawScriptFile, ScriptFile};

/// Read and deserialize a build script without semantic checks.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawScriptFile> {
    let contents = fs::read_to_string(path.as_ref())?;
    let script: RawScriptFile = toml::from_str(&contents)?;
    Ok(script)
}

/// Read, deserialize and validate a build script.
///
/// Checks for:
/// - at least one task,
/// - empty or duplicate (case-insensitive) task names,
/// - conflicting error handling settings.
///
/// Graph-level checks (unknown dependencies, cycles) happen in
/// [`compile`](crate::script::compile).
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ScriptFile> {
    let raw = load_from_path(path)?;
    ScriptFile::try_from(raw)
}

/// Load, validate and compile a build script in one go.
pub fn load_graph(path: impl AsRef<Path>) -> Result<(ScriptFile, TaskGraph)> {
    let script = load_and_validate(path)?;
    let graph = compile(&script)?;
    Ok((script, graph))
}

/// Script file name used when `--script` is not given.
pub const DEFAULT_SCRIPT: &str = "Taskhost.toml";

/// Directory commands of the script run in: the script's parent directory,
/// or the current directory for a bare file name.
pub fn script_root_dir(script_path: &Path) -> PathBuf {
    match script_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}
