// src/script/mod.rs

//! TOML build scripts.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a script from disk (`loader.rs`).
//! - Validate script-level invariants (`validate.rs`).
//! - Compile tasks into a [`TaskGraph`](crate::dag::TaskGraph) whose actions
//!   run shell commands (`compile.rs`).

pub mod compile;
pub mod loader;
pub mod model;
pub mod validate;

pub use compile::compile;
pub use loader::{load_and_validate, load_from_path, load_graph, script_root_dir, DEFAULT_SCRIPT};
pub use model::{CriterionSpec, RawScriptFile, ScriptFile, TaskSpec};
