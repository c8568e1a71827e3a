// tests/graph_resolution.rs

use taskhost::dag::{TaskBuilder, TaskDependency, TaskGraph};
use taskhost::errors::TaskhostError;
use taskhost_test_utils::builders::{clean_build_test, GraphBuilder, Journal};

fn names(graph: &TaskGraph, target: &str) -> Vec<String> {
    graph
        .resolve(target)
        .expect("resolution should succeed")
        .iter()
        .map(|t| t.name().to_string())
        .collect()
}

#[test]
fn clean_build_test_resolves_in_dependency_order() {
    let graph = clean_build_test(&Journal::new()).build();
    assert_eq!(names(&graph, "Test"), vec!["Clean", "Build", "Test"]);
}

#[test]
fn resolution_only_includes_what_the_target_needs() {
    let graph = clean_build_test(&Journal::new()).build();
    assert_eq!(names(&graph, "Build"), vec!["Clean", "Build"]);
}

#[test]
fn unrelated_missing_dependency_still_fails_resolution() {
    let journal = Journal::new();
    let graph = clean_build_test(&journal)
        .with_task("Publish", &["DoesNotExist"])
        .build();

    for result in [graph.resolve("Build"), graph.resolve_exclusive("Build")] {
        match result {
            Err(TaskhostError::MissingDependency { task, dependency }) => {
                assert_eq!(task, "Publish");
                assert_eq!(dependency, "DoesNotExist");
            }
            other => panic!("expected MissingDependency, got {other:?}"),
        }
    }
}

#[test]
fn dangling_required_dependee_fails_resolution() {
    let journal = Journal::new();
    let graph = clean_build_test(&journal)
        .with(TaskBuilder::new("Lint").is_dependee_of("NeverRegistered"))
        .build();

    for target in ["Lint", "Build"] {
        match graph.resolve(target) {
            Err(TaskhostError::MissingDependee { task, dependee }) => {
                assert_eq!(task, "Lint");
                assert_eq!(dependee, "NeverRegistered");
            }
            other => panic!("expected MissingDependee, got {other:?}"),
        }
    }
}

#[test]
fn dangling_optional_dependee_does_not_fail_resolution() {
    let journal = Journal::new();
    let graph = clean_build_test(&journal)
        .with(TaskBuilder::new("Lint").with_dependee(TaskDependency::optional("NeverRegistered")))
        .build();

    assert_eq!(names(&graph, "Lint"), vec!["Lint"]);
}

#[test]
fn target_lookup_ignores_case() {
    let graph = clean_build_test(&Journal::new()).build();
    assert_eq!(names(&graph, "tEsT"), vec!["Clean", "Build", "Test"]);
}

#[test]
fn siblings_follow_declaration_order() {
    let journal = Journal::new();
    let graph = GraphBuilder::new(&journal)
        .with_task("Zeta", &[])
        .with_task("Alpha", &[])
        .with_task("Mid", &[])
        .with_task("Default", &["Mid", "Zeta", "Alpha"])
        .build();

    assert_eq!(
        names(&graph, "Default"),
        vec!["Mid", "Zeta", "Alpha", "Default"]
    );
}

#[test]
fn shared_dependency_runs_once() {
    // Diamond: Default -> {Left, Right} -> Base
    let journal = Journal::new();
    let graph = GraphBuilder::new(&journal)
        .with_task("Base", &[])
        .with_task("Left", &["Base"])
        .with_task("Right", &["Base"])
        .with_task("Default", &["Left", "Right"])
        .build();

    assert_eq!(
        names(&graph, "Default"),
        vec!["Base", "Left", "Right", "Default"]
    );
}

#[test]
fn duplicate_names_are_rejected_ignoring_case() {
    let mut graph = TaskGraph::new();
    graph.add_task(TaskBuilder::new("Build")).unwrap();

    match graph.add_task(TaskBuilder::new("BUILD")) {
        Err(TaskhostError::DuplicateTask(name)) => assert_eq!(name, "BUILD"),
        other => panic!("expected DuplicateTask, got {other:?}"),
    }
    assert_eq!(graph.len(), 1);
}

#[test]
fn empty_names_are_rejected() {
    let mut graph = TaskGraph::new();
    assert!(matches!(
        graph.add_task(TaskBuilder::new("   ")),
        Err(TaskhostError::EmptyTaskName)
    ));
}

#[test]
fn unknown_target_is_task_not_found() {
    let graph = clean_build_test(&Journal::new()).build();
    match graph.resolve("Deploy") {
        Err(TaskhostError::TaskNotFound(name)) => assert_eq!(name, "Deploy"),
        other => panic!("expected TaskNotFound, got {other:?}"),
    }
}

#[test]
fn missing_required_dependency_is_reported() {
    let journal = Journal::new();
    let graph = GraphBuilder::new(&journal)
        .with_task("Build", &["Restore"])
        .build();

    match graph.resolve("Build") {
        Err(TaskhostError::MissingDependency { task, dependency }) => {
            assert_eq!(task, "Build");
            assert_eq!(dependency, "Restore");
        }
        other => panic!("expected MissingDependency, got {other:?}"),
    }
}

#[test]
fn missing_optional_dependency_is_ignored() {
    let mut graph = TaskGraph::new();
    graph
        .add_task(TaskBuilder::new("Build").with_dependency(TaskDependency::optional("Restore")))
        .unwrap();

    assert_eq!(names(&graph, "Build"), vec!["Build"]);
}

#[test]
fn cycle_is_reported_with_its_members() {
    let journal = Journal::new();
    let graph = GraphBuilder::new(&journal)
        .with_task("A", &["C"])
        .with_task("B", &["A"])
        .with_task("C", &["B"])
        .with_task("Default", &["A"])
        .build();

    match graph.resolve("Default") {
        Err(TaskhostError::CyclicDependency(cycle)) => {
            assert_eq!(cycle, vec!["A", "C", "B", "A"]);
        }
        other => panic!("expected CyclicDependency, got {other:?}"),
    }
}

#[test]
fn self_dependency_is_a_cycle() {
    let journal = Journal::new();
    let graph = GraphBuilder::new(&journal).with_task("Loop", &["loop"]).build();

    assert!(matches!(
        graph.resolve("Loop"),
        Err(TaskhostError::CyclicDependency(_))
    ));
}

#[test]
fn cycle_not_reachable_from_target_does_not_block_it() {
    let journal = Journal::new();
    let graph = GraphBuilder::new(&journal)
        .with_task("A", &["B"])
        .with_task("B", &["A"])
        .with_task("Solo", &[])
        .build();

    assert_eq!(names(&graph, "Solo"), vec!["Solo"]);
    assert!(matches!(
        graph.validate(),
        Err(TaskhostError::CyclicDependency(_))
    ));
}

#[test]
fn dependee_becomes_dependency_of_its_target() {
    let journal = Journal::new();
    let graph = clean_build_test(&journal)
        .with(TaskBuilder::new("Restore").is_dependee_of("Build"))
        .build();

    assert_eq!(
        names(&graph, "Test"),
        vec!["Clean", "Restore", "Build", "Test"]
    );
    let restore = graph.get("Restore").unwrap();
    assert_eq!(restore.dependees()[0].name, "Build");
}

#[test]
fn dependee_declared_before_its_target_is_merged_on_registration() {
    let mut graph = TaskGraph::new();
    graph
        .add_task(TaskBuilder::new("From-Recipe").is_dependee_of("Clean"))
        .unwrap();
    graph.add_task(TaskBuilder::new("Clean")).unwrap();
    graph
        .add_task(TaskBuilder::new("Build").is_dependent_on("Clean"))
        .unwrap();

    let order: Vec<_> = graph
        .resolve("Build")
        .unwrap()
        .iter()
        .map(|t| t.name().to_string())
        .collect();
    assert_eq!(order, vec!["From-Recipe", "Clean", "Build"]);
    graph.validate().unwrap();
}

#[test]
fn add_dependency_and_dependee_after_registration() {
    let mut graph = TaskGraph::new();
    graph.add_task(TaskBuilder::new("Pack")).unwrap();
    graph.add_task(TaskBuilder::new("Test")).unwrap();
    graph.add_task(TaskBuilder::new("Sign")).unwrap();

    graph.add_dependency("Pack", "Test").unwrap();
    graph.add_dependee("Sign", "Pack");

    let order: Vec<_> = graph
        .resolve("Pack")
        .unwrap()
        .iter()
        .map(|t| t.name().to_string())
        .collect();
    assert_eq!(order, vec!["Test", "Sign", "Pack"]);
}

#[test]
fn add_dependency_to_unknown_task_fails() {
    let mut graph = TaskGraph::new();
    assert!(matches!(
        graph.add_dependency("Ghost", "Build"),
        Err(TaskhostError::TaskNotFound(_))
    ));
}

#[test]
fn validate_reports_dangling_required_dependee() {
    let mut graph = TaskGraph::new();
    graph
        .add_task(TaskBuilder::new("Lint").is_dependee_of("Build"))
        .unwrap();

    match graph.validate() {
        Err(TaskhostError::MissingDependee { task, dependee }) => {
            assert_eq!(task, "Lint");
            assert_eq!(dependee, "Build");
        }
        other => panic!("expected MissingDependee, got {other:?}"),
    }
}

#[test]
fn validate_ignores_dangling_optional_dependee() {
    let mut graph = TaskGraph::new();
    graph
        .add_task(TaskBuilder::new("Lint").with_dependee(TaskDependency::optional("Build")))
        .unwrap();

    graph.validate().unwrap();
}

#[test]
fn exclusive_resolution_returns_only_the_target() {
    let graph = clean_build_test(&Journal::new()).build();
    let tasks = graph.resolve_exclusive("test").unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].name(), "Test");
}
