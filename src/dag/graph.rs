// src/dag/graph.rs

use std::collections::HashMap;

use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;
use tracing::debug;

use crate::dag::task::{Task, TaskDependency};
use crate::errors::{Result, TaskhostError};
use crate::types::{task_key, TaskName};

/// The set of registered tasks plus the ordering edges between them.
///
/// Tasks are kept in registration order and looked up by case-folded name.
/// "Runs before" (dependee) edges are normalised at registration time into
/// plain dependency edges on the task that runs after, so resolution only
/// ever follows one kind of edge.
#[derive(Debug, Clone, Default)]
pub struct TaskGraph {
    tasks: Vec<Task>,
    index: HashMap<String, usize>,
    /// Dependee edges pointing at tasks that are not registered yet, keyed by
    /// the case-folded name of the task that must run after.
    pending: HashMap<String, Vec<PendingEdge>>,
}

#[derive(Debug, Clone)]
struct PendingEdge {
    /// Display name of the task the edge points at.
    target: TaskName,
    dependency: TaskDependency,
}

impl TaskGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task.
    ///
    /// Fails with [`TaskhostError::DuplicateTask`] if a task with the same
    /// name (ignoring case) already exists. Dependee declarations on the task
    /// are turned into dependency edges on their targets, and dependee edges
    /// registered earlier toward this task are merged into it.
    pub fn add_task(&mut self, task: impl Into<Task>) -> Result<()> {
        let mut task = task.into();
        let key = task_key(task.name());

        if key.is_empty() {
            return Err(TaskhostError::EmptyTaskName);
        }
        if self.index.contains_key(&key) {
            return Err(TaskhostError::DuplicateTask(task.name().to_string()));
        }

        if let Some(edges) = self.pending.remove(&key) {
            for edge in edges {
                debug!(
                    task = %task.name(),
                    dependency = %edge.dependency.name,
                    "merging pending dependee edge"
                );
                task.push_dependency(edge.dependency);
            }
        }

        let name = task.name().to_string();
        let dependees = task.dependees().to_vec();

        self.index.insert(key, self.tasks.len());
        self.tasks.push(task);
        debug!(task = %name, "registered task");

        for dependee in dependees {
            self.link_dependee(&name, dependee);
        }

        Ok(())
    }

    /// Record that `task` runs after `dependency`.
    ///
    /// `dependency` does not need to exist yet; it is checked at resolution.
    pub fn add_dependency(&mut self, task: &str, dependency: impl Into<TaskDependency>) -> Result<()> {
        let idx = self
            .index_of(task)
            .ok_or_else(|| TaskhostError::TaskNotFound(task.to_string()))?;
        self.tasks[idx].push_dependency(dependency.into());
        Ok(())
    }

    /// Record that `task` runs before `dependee`.
    ///
    /// Neither side has to be registered yet. If `dependee` is unknown the
    /// edge is held until it gets registered.
    pub fn add_dependee(&mut self, task: &str, dependee: impl Into<TaskDependency>) {
        let dependee = dependee.into();
        if let Some(idx) = self.index_of(task) {
            self.tasks[idx].push_dependee(dependee.clone());
        }
        self.link_dependee(task, dependee);
    }

    fn link_dependee(&mut self, task: &str, dependee: TaskDependency) {
        let edge = TaskDependency {
            name: task.to_string(),
            required: dependee.required,
        };

        match self.index_of(&dependee.name) {
            Some(target) => {
                self.tasks[target].push_dependency(edge);
            }
            None => {
                debug!(
                    task = %task,
                    dependee = %dependee.name,
                    "dependee not registered yet; holding edge"
                );
                self.pending
                    .entry(task_key(&dependee.name))
                    .or_default()
                    .push(PendingEdge {
                        target: dependee.name,
                        dependency: edge,
                    });
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Task> {
        self.index_of(name).map(|idx| &self.tasks[idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// All tasks in registration order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(&task_key(name)).copied()
    }

    /// Ordered run-list for `target`: every dependency before its dependents,
    /// siblings in declaration order, each task at most once.
    ///
    /// Fails if any registered task has a required edge toward a task that
    /// does not exist, even one the target never reaches. Cycles are only
    /// reported when the target reaches them.
    pub fn resolve(&self, target: &str) -> Result<Vec<&Task>> {
        let root = self
            .index_of(target)
            .ok_or_else(|| TaskhostError::TaskNotFound(target.to_string()))?;
        self.check_edges()?;

        let mut walk = Walk {
            visited: vec![false; self.tasks.len()],
            stack: Vec::new(),
            order: Vec::new(),
        };
        self.visit(root, &mut walk)?;

        Ok(walk.order.into_iter().map(|idx| &self.tasks[idx]).collect())
    }

    /// Only the target itself, ignoring its dependencies.
    pub fn resolve_exclusive(&self, target: &str) -> Result<Vec<&Task>> {
        let task = self
            .get(target)
            .ok_or_else(|| TaskhostError::TaskNotFound(target.to_string()))?;
        self.check_edges()?;
        Ok(vec![task])
    }

    fn visit(&self, idx: usize, walk: &mut Walk) -> Result<()> {
        if walk.visited[idx] {
            return Ok(());
        }

        if let Some(pos) = walk.stack.iter().position(|&i| i == idx) {
            let mut cycle: Vec<String> = walk.stack[pos..]
                .iter()
                .map(|&i| self.tasks[i].name().to_string())
                .collect();
            cycle.push(self.tasks[idx].name().to_string());
            return Err(TaskhostError::CyclicDependency(cycle));
        }

        walk.stack.push(idx);

        let task = &self.tasks[idx];
        // Required edges were checked up front; anything missing is optional.
        for dependency in task.dependencies() {
            match self.index_of(&dependency.name) {
                Some(dep_idx) => self.visit(dep_idx, walk)?,
                None => {
                    debug!(
                        task = %task.name(),
                        dependency = %dependency.name,
                        "optional dependency not registered; ignoring"
                    );
                }
            }
        }

        walk.stack.pop();
        walk.visited[idx] = true;
        walk.order.push(idx);
        Ok(())
    }

    /// Check the whole graph, not just what one target reaches.
    ///
    /// - every required dependency exists
    /// - every required dependee target got registered
    /// - there are no cycles
    pub fn validate(&self) -> Result<()> {
        self.check_edges()?;

        // Edge direction: dependency -> task.
        let mut graph: DiGraphMap<usize, ()> = DiGraphMap::new();
        for (idx, task) in self.tasks.iter().enumerate() {
            graph.add_node(idx);
            for dependency in task.dependencies() {
                if let Some(dep_idx) = self.index_of(&dependency.name) {
                    graph.add_edge(dep_idx, idx, ());
                }
            }
        }

        for component in tarjan_scc(&graph) {
            let is_cycle = component.len() > 1
                || component
                    .first()
                    .is_some_and(|&n| graph.contains_edge(n, n));
            if is_cycle {
                let mut members = component;
                members.sort_unstable();
                let names = members
                    .iter()
                    .map(|&i| self.tasks[i].name().to_string())
                    .collect();
                return Err(TaskhostError::CyclicDependency(names));
            }
        }

        Ok(())
    }

    /// Every required dependency names a registered task, and no required
    /// dependee edge is still waiting for its target.
    fn check_edges(&self) -> Result<()> {
        for task in &self.tasks {
            for dependency in task.dependencies() {
                if dependency.required && !self.contains(&dependency.name) {
                    return Err(TaskhostError::MissingDependency {
                        task: task.name().to_string(),
                        dependency: dependency.name.clone(),
                    });
                }
            }
        }

        let mut waiting: Vec<&String> = self.pending.keys().collect();
        waiting.sort();
        for key in waiting {
            if let Some(edge) = self.pending[key].iter().find(|e| e.dependency.required) {
                return Err(TaskhostError::MissingDependee {
                    task: edge.dependency.name.clone(),
                    dependee: edge.target.clone(),
                });
            }
        }

        Ok(())
    }
}

struct Walk {
    visited: Vec<bool>,
    /// Tasks on the current DFS path.
    stack: Vec<usize>,
    order: Vec<usize>,
}
