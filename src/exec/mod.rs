// src/exec/mod.rs

//! Process execution for script-defined tasks.
//!
//! The engine itself never spawns processes; only task actions built by the
//! script compiler call into [`shell`].

pub mod shell;

pub use shell::run_shell_command;
