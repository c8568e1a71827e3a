// tests/script_loading.rs

use std::fs;
use std::path::{Path, PathBuf};

use taskhost::arguments::Arguments;
use taskhost::engine::{DefaultExecutionStrategy, Engine, ExecutionContext, RunSettings};
use taskhost::errors::TaskhostError;
use taskhost::report::TaskOutcome;
use taskhost::script::{compile, load_and_validate, load_graph, CriterionSpec};
use taskhost_test_utils::init_tracing;
use tempfile::TempDir;

fn write_script(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("Taskhost.toml");
    fs::write(&path, contents).expect("write script");
    path
}

#[test]
fn parses_tasks_in_file_order() {
    let dir = TempDir::new().unwrap();
    let path = write_script(
        dir.path(),
        r#"
default_target = "Test"

[[task]]
name = "Clean"
description = "Remove build output"
cmd = ["rm -rf out"]
criteria = [{ has_argument = "rebuild" }]

[[task]]
name = "Build"
depends_on = ["Clean"]
optional_depends_on = ["Restore"]
cmd = ["make", "make docs"]

[[task]]
name = "Test"
depends_on = ["Build"]
criteria = [
    { env_not_set = "SKIP_TESTS" },
    { argument_equals = { name = "configuration", value = "debug" } },
]
"#,
    );

    let script = load_and_validate(&path).unwrap();

    assert_eq!(script.default_target.as_deref(), Some("Test"));
    let names: Vec<_> = script.task.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Clean", "Build", "Test"]);
    assert_eq!(script.task[1].cmd, vec!["make", "make docs"]);
    assert_eq!(script.task[1].optional_depends_on, vec!["Restore"]);
    assert_eq!(
        script.task[2].criteria,
        vec![
            CriterionSpec::EnvNotSet("SKIP_TESTS".to_string()),
            CriterionSpec::ArgumentEquals {
                name: "configuration".to_string(),
                value: "debug".to_string(),
            },
        ]
    );
}

#[test]
fn compiled_graph_resolves_like_the_script_reads() {
    let dir = TempDir::new().unwrap();
    let path = write_script(
        dir.path(),
        r#"
[[task]]
name = "Clean"

[[task]]
name = "Build"
depends_on = ["clean"]

[[task]]
name = "Restore"
dependee_of = ["Build"]

[[task]]
name = "Test"
depends_on = ["Build"]
"#,
    );

    let (_, graph) = load_graph(&path).unwrap();
    let order: Vec<_> = graph
        .resolve("Test")
        .unwrap()
        .iter()
        .map(|t| t.name().to_string())
        .collect();

    assert_eq!(order, vec!["Clean", "Restore", "Build", "Test"]);
    assert_eq!(graph.get("Test").unwrap().actions().len(), 0);
}

#[test]
fn empty_script_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_script(dir.path(), "default_target = \"Build\"\n");

    assert!(matches!(
        load_and_validate(&path),
        Err(TaskhostError::ScriptError(_))
    ));
}

#[test]
fn duplicate_task_names_are_rejected_ignoring_case() {
    let dir = TempDir::new().unwrap();
    let path = write_script(
        dir.path(),
        r#"
[[task]]
name = "Build"

[[task]]
name = "build"
"#,
    );

    match load_and_validate(&path) {
        Err(TaskhostError::DuplicateTask(name)) => assert_eq!(name, "build"),
        other => panic!("expected DuplicateTask, got {other:?}"),
    }
}

#[test]
fn blank_task_name_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_script(dir.path(), "[[task]]\nname = \"  \"\n");

    assert!(matches!(
        load_and_validate(&path),
        Err(TaskhostError::EmptyTaskName)
    ));
}

#[test]
fn conflicting_error_settings_are_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_script(
        dir.path(),
        r#"
[[task]]
name = "Lint"
cmd = ["lint"]
on_error = "echo lint failed"
continue_on_error = true
"#,
    );

    match load_and_validate(&path) {
        Err(TaskhostError::ScriptError(msg)) => assert!(msg.contains("Lint")),
        other => panic!("expected ScriptError, got {other:?}"),
    }
}

#[test]
fn mistyped_field_is_a_toml_error() {
    let dir = TempDir::new().unwrap();
    let path = write_script(dir.path(), "[[task]]\nname = \"Build\"\ncmd = \"make\"\n");

    assert!(matches!(
        load_and_validate(&path),
        Err(TaskhostError::TomlError(_))
    ));
}

#[test]
fn misspelled_keys_are_rejected() {
    let dir = TempDir::new().unwrap();
    let task_key = write_script(
        dir.path(),
        "[[task]]\nname = \"Clean\"\n\n[[task]]\nname = \"Build\"\ndepend_on = [\"Clean\"]\n",
    );
    match load_and_validate(&task_key) {
        Err(TaskhostError::TomlError(err)) => assert!(err.to_string().contains("depend_on")),
        other => panic!("expected TomlError, got {other:?}"),
    }

    let top_level = write_script(
        dir.path(),
        "default_taget = \"Build\"\n\n[[task]]\nname = \"Build\"\n",
    );
    assert!(matches!(
        load_and_validate(&top_level),
        Err(TaskhostError::TomlError(_))
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        load_and_validate(dir.path().join("nope.toml")),
        Err(TaskhostError::IoError(_))
    ));
}

#[test]
fn compile_rejects_unknown_dependency() {
    let dir = TempDir::new().unwrap();
    let path = write_script(
        dir.path(),
        r#"
[[task]]
name = "Build"
depends_on = ["Restore"]
"#,
    );

    let script = load_and_validate(&path).unwrap();
    match compile(&script) {
        Err(TaskhostError::MissingDependency { task, dependency }) => {
            assert_eq!(task, "Build");
            assert_eq!(dependency, "Restore");
        }
        other => panic!("expected MissingDependency, got {other:?}"),
    }
}

#[test]
fn compile_rejects_dangling_dependee_and_cycles() {
    let dir = TempDir::new().unwrap();
    let dangling = write_script(
        dir.path(),
        r#"
[[task]]
name = "Sign"
dependee_of = ["Pack"]
"#,
    );
    assert!(matches!(
        load_graph(&dangling),
        Err(TaskhostError::MissingDependee { .. })
    ));

    let cyclic = write_script(
        dir.path(),
        r#"
[[task]]
name = "A"
depends_on = ["B"]

[[task]]
name = "B"
depends_on = ["A"]

[[task]]
name = "Solo"
"#,
    );
    assert!(matches!(
        load_graph(&cyclic),
        Err(TaskhostError::CyclicDependency(_))
    ));
}

#[cfg(unix)]
mod shell {
    use super::*;

    fn context(dir: &Path, args: &[&str]) -> ExecutionContext {
        ExecutionContext::builder()
            .working_directory(dir)
            .arguments(Arguments::parse(args))
            .build()
    }

    const SCRIPT: &str = r#"
[[task]]
name = "Clean"
cmd = ["touch cleaned"]
criteria = [{ has_argument = "rebuild" }]

[[task]]
name = "Build"
depends_on = ["Clean"]
cmd = ["touch built", "test -f built && touch built-twice"]
finally = "touch build-finally"

[[task]]
name = "Test"
depends_on = ["Build"]
cmd = ["touch tested"]
criteria = [{ path_exists = "built" }]
"#;

    #[tokio::test]
    async fn commands_run_in_the_working_directory() {
        init_tracing();

        let dir = TempDir::new().unwrap();
        let path = write_script(dir.path(), SCRIPT);
        let (_, graph) = load_graph(&path).unwrap();
        let engine = Engine::new(graph);

        let report = engine
            .run_target(
                &context(dir.path(), &[]),
                &DefaultExecutionStrategy::new(),
                &RunSettings::new("Test"),
            )
            .await
            .unwrap();

        assert_eq!(
            report.outcomes(),
            vec![
                ("Clean", TaskOutcome::Skipped),
                ("Build", TaskOutcome::Succeeded),
                ("Test", TaskOutcome::Succeeded),
            ]
        );
        assert!(!dir.path().join("cleaned").exists());
        assert!(dir.path().join("built-twice").exists());
        assert!(dir.path().join("build-finally").exists());
        assert!(dir.path().join("tested").exists());
    }

    #[tokio::test]
    async fn argument_criterion_enables_task() {
        let dir = TempDir::new().unwrap();
        let path = write_script(dir.path(), SCRIPT);
        let (_, graph) = load_graph(&path).unwrap();
        let engine = Engine::new(graph);

        let report = engine
            .run_target(
                &context(dir.path(), &["--rebuild"]),
                &DefaultExecutionStrategy::new(),
                &RunSettings::new("Clean"),
            )
            .await
            .unwrap();

        assert_eq!(report.outcomes(), vec![("Clean", TaskOutcome::Succeeded)]);
        assert!(dir.path().join("cleaned").exists());
    }

    #[tokio::test]
    async fn failing_command_fails_the_run_after_finally() {
        let dir = TempDir::new().unwrap();
        let path = write_script(
            dir.path(),
            r#"
[[task]]
name = "Build"
cmd = ["false", "touch unreachable"]
finally = "touch finally-ran"

[[task]]
name = "Test"
depends_on = ["Build"]
cmd = ["touch tested"]
"#,
        );
        let (_, graph) = load_graph(&path).unwrap();
        let engine = Engine::new(graph);

        let err = engine
            .run_target(
                &context(dir.path(), &[]),
                &DefaultExecutionStrategy::new(),
                &RunSettings::new("Test"),
            )
            .await
            .expect_err("false exits non-zero");

        assert_eq!(err.report.outcomes(), vec![("Build", TaskOutcome::Failed)]);
        assert!(err.report.get("Build").unwrap().error.as_deref().unwrap().contains("exited with code 1"));
        assert!(!dir.path().join("unreachable").exists());
        assert!(dir.path().join("finally-ran").exists());
        assert!(!dir.path().join("tested").exists());
    }

    #[tokio::test]
    async fn on_error_command_delegates() {
        let dir = TempDir::new().unwrap();
        let path = write_script(
            dir.path(),
            r#"
[[task]]
name = "Lint"
cmd = ["exit 3"]
on_error = "touch lint-handled"

[[task]]
name = "Build"
depends_on = ["Lint"]
cmd = ["touch built"]
"#,
        );
        let (_, graph) = load_graph(&path).unwrap();
        let engine = Engine::new(graph);

        let report = engine
            .run_target(
                &context(dir.path(), &[]),
                &DefaultExecutionStrategy::new(),
                &RunSettings::new("Build"),
            )
            .await
            .unwrap();

        assert_eq!(
            report.outcomes(),
            vec![("Lint", TaskOutcome::Delegated), ("Build", TaskOutcome::Succeeded)]
        );
        assert!(dir.path().join("lint-handled").exists());
        assert!(dir.path().join("built").exists());
    }

    #[tokio::test]
    async fn continue_on_error_keeps_going() {
        let dir = TempDir::new().unwrap();
        let path = write_script(
            dir.path(),
            r#"
[[task]]
name = "Lint"
cmd = ["false"]
continue_on_error = true

[[task]]
name = "Build"
depends_on = ["Lint"]
cmd = ["touch built"]
"#,
        );
        let (_, graph) = load_graph(&path).unwrap();
        let engine = Engine::new(graph);

        let report = engine
            .run_target(
                &context(dir.path(), &[]),
                &DefaultExecutionStrategy::new(),
                &RunSettings::new("Build"),
            )
            .await
            .unwrap();

        assert_eq!(report.get("Lint").unwrap().outcome, TaskOutcome::Delegated);
        assert!(dir.path().join("built").exists());
    }
}
