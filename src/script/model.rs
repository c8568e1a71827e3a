// src/script/model.rs

use serde::Deserialize;

/// Top-level build script as read from a TOML file.
///
/// ```toml
/// default_target = "Test"
///
/// [[task]]
/// name = "Clean"
/// cmd = ["rm -rf out"]
/// criteria = [{ has_argument = "rebuild" }]
///
/// [[task]]
/// name = "Build"
/// depends_on = ["Clean"]
/// cmd = ["make"]
/// ```
///
/// Tasks are an array of tables so that registration order follows the file.
/// Unknown keys are rejected so a misspelled field cannot silently drop an
/// edge.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RawScriptFile {
    /// Target run when none is given on the command line.
    #[serde(default)]
    pub default_target: Option<String>,

    /// All `[[task]]` entries, in file order.
    #[serde(default)]
    pub task: Vec<TaskSpec>,
}

/// A validated script. Only obtainable through `TryFrom<RawScriptFile>`.
#[derive(Debug, Clone)]
pub struct ScriptFile {
    pub default_target: Option<String>,
    pub task: Vec<TaskSpec>,
}

impl ScriptFile {
    pub(crate) fn new_unchecked(default_target: Option<String>, task: Vec<TaskSpec>) -> Self {
        Self {
            default_target,
            task,
        }
    }
}

/// One `[[task]]` entry.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct TaskSpec {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Commands run in order; each is one action.
    #[serde(default)]
    pub cmd: Vec<String>,

    /// Tasks that must run before this one.
    #[serde(default)]
    pub depends_on: Vec<String>,

    /// Like `depends_on`, but a missing task is ignored.
    #[serde(default)]
    pub optional_depends_on: Vec<String>,

    /// Tasks this one must run before.
    #[serde(default)]
    pub dependee_of: Vec<String>,

    /// All must hold for the commands to run.
    #[serde(default)]
    pub criteria: Vec<CriterionSpec>,

    /// Command run when one of `cmd` fails; the run then continues.
    #[serde(default)]
    pub on_error: Option<String>,

    /// Log failures of `cmd` and continue.
    #[serde(default)]
    pub continue_on_error: bool,

    /// Command always run after `cmd` (and `on_error`), unless skipped.
    #[serde(default)]
    pub finally: Option<String>,
}

/// A criterion as written in the script, e.g. `{ env_set = "CI" }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionSpec {
    /// The script argument is present.
    HasArgument(String),
    /// The script argument has exactly this value (case-insensitive).
    ArgumentEquals { name: String, value: String },
    EnvSet(String),
    EnvNotSet(String),
    /// Path relative to the working directory exists.
    PathExists(String),
}
