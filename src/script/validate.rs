// src/script/validate.rs

use std::collections::HashSet;

use crate::errors::{Result, TaskhostError};
use crate::script::model::{RawScriptFile, ScriptFile};
use crate::types::task_key;

impl TryFrom<RawScriptFile> for ScriptFile {
    type Error = TaskhostError;

    fn try_from(raw: RawScriptFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_script(&raw)?;
        Ok(ScriptFile::new_unchecked(raw.default_target, raw.task))
    }
}

fn validate_raw_script(script: &RawScriptFile) -> Result<()> {
    ensure_has_tasks(script)?;
    validate_task_names(script)?;
    validate_error_handling(script)?;
    Ok(())
}

fn ensure_has_tasks(script: &RawScriptFile) -> Result<()> {
    if script.task.is_empty() {
        return Err(TaskhostError::ScriptError(
            "script must contain at least one [[task]] entry".to_string(),
        ));
    }
    Ok(())
}

fn validate_task_names(script: &RawScriptFile) -> Result<()> {
    let mut seen = HashSet::new();
    for task in &script.task {
        if task.name.trim().is_empty() {
            return Err(TaskhostError::EmptyTaskName);
        }
        if !seen.insert(task_key(&task.name)) {
            return Err(TaskhostError::DuplicateTask(task.name.clone()));
        }
    }
    Ok(())
}

fn validate_error_handling(script: &RawScriptFile) -> Result<()> {
    for task in &script.task {
        if task.on_error.is_some() && task.continue_on_error {
            return Err(TaskhostError::ScriptError(format!(
                "task '{}' cannot set both `on_error` and `continue_on_error`",
                task.name
            )));
        }
    }
    Ok(())
}
