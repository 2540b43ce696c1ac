use chrono::Local;
use serde::{Deserialize, Serialize};

pub type TaskId = String;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub description: String,
    pub created: String,
    pub due: Option<String>,
    pub started: bool,
    pub completed: bool,
    pub time_spent: String,
    pub subtasks: Vec<Subtask>,
}

// Carried on the record but never populated; no creation path exists yet.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Subtask {
    pub id: String,
    pub name: String,
    pub completed: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TaskGroup {
    pub name: String,
    pub tasks: Vec<Task>,
}

/// Fields the caller supplies when creating a task; everything else is stamped.
#[derive(Debug, Default, Clone)]
pub struct TaskDraft {
    pub name: String,
    pub description: Option<String>,
    pub due: Option<String>,
}

/// Partial update merged into an existing task. Absent fields are untouched;
/// the name is immutable after creation.
#[derive(Debug, Default, Clone)]
pub struct TaskPatch {
    pub description: Option<String>,
    pub due: Option<String>,
    pub started: Option<bool>,
    pub completed: Option<bool>,
}

/// Snapshot of the task shown in the detail view, plus the coordinates used
/// to route edits back. A derived view only; writes go through the store.
#[derive(Debug, Clone)]
pub struct Selection {
    pub task: Task,
    pub group_index: usize,
    pub task_index: usize,
}

#[derive(thiserror::Error, Debug)]
pub enum TaskError {
    #[error("no group at index {0}")]
    GroupOutOfRange(usize),
    #[error("no task at index {1} in group {0}")]
    TaskOutOfRange(usize, usize),
    #[error("task name cannot be empty")]
    EmptyName,
}

#[derive(Debug, Clone)]
pub struct TaskStore {
    groups: Vec<TaskGroup>,
    selection: Option<Selection>,
}

impl Default for TaskStore {
    fn default() -> Self {
        TaskStore::new()
    }
}

impl TaskStore {
    pub fn new() -> Self {
        TaskStore {
            groups: vec![TaskGroup {
                name: "My Tasks".into(),
                tasks: Vec::new(),
            }],
            selection: None,
        }
    }

    pub fn groups(&self) -> &[TaskGroup] {
        &self.groups
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn add_group(&mut self) {
        self.groups.push(TaskGroup {
            name: format!("Group {}", self.groups.len() + 1),
            tasks: Vec::new(),
        });
    }

    /// Removes the group at `index`, shifting later groups down. The selection
    /// is cleared even when it pointed somewhere else entirely.
    pub fn delete_group(&mut self, index: usize) -> Result<(), TaskError> {
        if index >= self.groups.len() {
            return Err(TaskError::GroupOutOfRange(index));
        }
        self.groups.remove(index);
        self.selection = None;
        Ok(())
    }

    pub fn add_task(&mut self, group_index: usize, draft: TaskDraft) -> Result<(), TaskError> {
        if draft.name.trim().is_empty() {
            return Err(TaskError::EmptyName);
        }
        let group = self
            .groups
            .get_mut(group_index)
            .ok_or(TaskError::GroupOutOfRange(group_index))?;
        group.tasks.push(Task {
            id: generate_id(),
            name: draft.name,
            description: draft.description.unwrap_or_default(),
            created: Local::now().format("%d/%m/%Y").to_string(),
            due: draft.due,
            started: false,
            completed: false,
            time_spent: "0h 0m".into(),
            subtasks: Vec::new(),
        });
        Ok(())
    }

    /// Shallow-merges `patch` into the task at (group_index, task_index). If
    /// the selection points at that exact slot it is refreshed with the
    /// merged result.
    pub fn update_task(
        &mut self,
        group_index: usize,
        task_index: usize,
        patch: TaskPatch,
    ) -> Result<(), TaskError> {
        let task = self.task_mut(group_index, task_index)?;
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(due) = patch.due {
            task.due = Some(due);
        }
        if let Some(started) = patch.started {
            task.started = started;
        }
        if let Some(completed) = patch.completed {
            task.completed = completed;
        }
        let merged = task.clone();
        if let Some(sel) = &mut self.selection {
            if sel.group_index == group_index && sel.task_index == task_index {
                sel.task = merged;
            }
        }
        Ok(())
    }

    /// Removes the task, shifting later tasks in the group down. Clears the
    /// selection unconditionally, matching delete_group.
    pub fn delete_task(&mut self, group_index: usize, task_index: usize) -> Result<(), TaskError> {
        self.task_mut(group_index, task_index)?;
        self.groups[group_index].tasks.remove(task_index);
        self.selection = None;
        Ok(())
    }

    pub fn toggle_completed(
        &mut self,
        group_index: usize,
        task_index: usize,
    ) -> Result<(), TaskError> {
        let current = self.task_mut(group_index, task_index)?.completed;
        self.update_task(
            group_index,
            task_index,
            TaskPatch {
                completed: Some(!current),
                ..TaskPatch::default()
            },
        )
    }

    pub fn toggle_started(
        &mut self,
        group_index: usize,
        task_index: usize,
    ) -> Result<(), TaskError> {
        let current = self.task_mut(group_index, task_index)?.started;
        self.update_task(
            group_index,
            task_index,
            TaskPatch {
                started: Some(!current),
                ..TaskPatch::default()
            },
        )
    }

    pub fn select(&mut self, group_index: usize, task_index: usize) -> Result<(), TaskError> {
        let task = self.task_mut(group_index, task_index)?.clone();
        self.selection = Some(Selection {
            task,
            group_index,
            task_index,
        });
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    fn task_mut(&mut self, group_index: usize, task_index: usize) -> Result<&mut Task, TaskError> {
        let group = self
            .groups
            .get_mut(group_index)
            .ok_or(TaskError::GroupOutOfRange(group_index))?;
        group
            .tasks
            .get_mut(task_index)
            .ok_or(TaskError::TaskOutOfRange(group_index, task_index))
    }
}

fn generate_id() -> String {
    use rand::{distributions::Alphanumeric, Rng};
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(10)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str) -> TaskDraft {
        TaskDraft {
            name: name.into(),
            ..TaskDraft::default()
        }
    }

    #[test]
    fn new_store_has_default_group() {
        let store = TaskStore::new();
        assert_eq!(store.groups().len(), 1);
        assert_eq!(store.groups()[0].name, "My Tasks");
        assert!(store.groups()[0].tasks.is_empty());
    }

    #[test]
    fn add_group_auto_names_from_count() {
        let mut store = TaskStore::new();
        store.add_group();
        store.add_group();
        assert_eq!(store.groups()[1].name, "Group 2");
        assert_eq!(store.groups()[2].name, "Group 3");
    }

    #[test]
    fn add_task_fills_defaults() {
        let mut store = TaskStore::new();
        store.add_task(0, draft("Buy milk")).unwrap();
        let task = &store.groups()[0].tasks[0];
        assert_eq!(task.name, "Buy milk");
        assert!(!task.started);
        assert!(!task.completed);
        assert_eq!(task.time_spent, "0h 0m");
        assert!(task.subtasks.is_empty());
        assert!(!task.id.is_empty());
    }

    #[test]
    fn add_task_only_touches_target_group() {
        let mut store = TaskStore::new();
        store.add_group();
        store.add_task(1, draft("a")).unwrap();
        assert!(store.groups()[0].tasks.is_empty());
        assert_eq!(store.groups()[1].tasks.len(), 1);
    }

    #[test]
    fn add_task_rejects_blank_name() {
        let mut store = TaskStore::new();
        assert!(matches!(
            store.add_task(0, draft("   ")),
            Err(TaskError::EmptyName)
        ));
        assert!(matches!(
            store.add_task(5, draft("x")),
            Err(TaskError::GroupOutOfRange(5))
        ));
    }

    #[test]
    fn update_merges_only_present_fields() {
        let mut store = TaskStore::new();
        store.add_task(0, draft("a")).unwrap();
        store
            .update_task(
                0,
                0,
                TaskPatch {
                    description: Some("details".into()),
                    ..TaskPatch::default()
                },
            )
            .unwrap();
        let task = &store.groups()[0].tasks[0];
        assert_eq!(task.description, "details");
        assert_eq!(task.name, "a");
        assert!(!task.completed);
    }

    #[test]
    fn update_refreshes_matching_selection() {
        let mut store = TaskStore::new();
        store.add_task(0, draft("a")).unwrap();
        store.add_task(0, draft("b")).unwrap();
        store.select(0, 1).unwrap();
        store.toggle_completed(0, 1).unwrap();
        assert!(store.selection().unwrap().task.completed);
        // updating a different slot leaves the snapshot alone
        store.toggle_completed(0, 0).unwrap();
        assert_eq!(store.selection().unwrap().task.name, "b");
    }

    #[test]
    fn toggle_twice_is_identity() {
        let mut store = TaskStore::new();
        store.add_task(0, draft("a")).unwrap();
        let before = store.groups()[0].tasks[0].clone();
        store.toggle_completed(0, 0).unwrap();
        assert!(store.groups()[0].tasks[0].completed);
        store.toggle_completed(0, 0).unwrap();
        let after = &store.groups()[0].tasks[0];
        assert_eq!(after.completed, before.completed);
        assert_eq!(after.name, before.name);
        assert_eq!(after.description, before.description);
        assert_eq!(after.id, before.id);
    }

    #[test]
    fn delete_task_shifts_and_clears_selection() {
        let mut store = TaskStore::new();
        store.add_task(0, draft("a")).unwrap();
        store.add_task(0, draft("b")).unwrap();
        store.add_task(0, draft("c")).unwrap();
        store.select(0, 2).unwrap();
        store.delete_task(0, 1).unwrap();
        assert_eq!(store.groups()[0].tasks.len(), 2);
        assert_eq!(store.groups()[0].tasks[1].name, "c");
        assert!(store.selection().is_none());
    }

    #[test]
    fn delete_group_clears_unrelated_selection() {
        let mut store = TaskStore::new();
        store.add_group();
        store.add_task(0, draft("a")).unwrap();
        store.select(0, 0).unwrap();
        store.delete_group(1).unwrap();
        assert_eq!(store.groups().len(), 1);
        assert!(store.selection().is_none());
    }

    #[test]
    fn out_of_range_indices_are_rejected() {
        let mut store = TaskStore::new();
        store.add_task(0, draft("a")).unwrap();
        assert!(matches!(
            store.delete_group(3),
            Err(TaskError::GroupOutOfRange(3))
        ));
        assert!(matches!(
            store.delete_task(0, 9),
            Err(TaskError::TaskOutOfRange(0, 9))
        ));
        assert!(matches!(
            store.update_task(2, 0, TaskPatch::default()),
            Err(TaskError::GroupOutOfRange(2))
        ));
        assert!(matches!(store.select(0, 1), Err(TaskError::TaskOutOfRange(0, 1))));
    }

    #[test]
    fn end_to_end_session_flow() {
        let mut store = TaskStore::new();
        store.add_group();
        assert_eq!(store.groups().len(), 2);
        store.add_task(0, draft("Buy milk")).unwrap();
        assert_eq!(store.groups()[0].tasks.len(), 1);
        assert!(!store.groups()[0].tasks[0].completed);
        store.toggle_completed(0, 0).unwrap();
        assert!(store.groups()[0].tasks[0].completed);
        store.delete_group(0).unwrap();
        assert_eq!(store.groups().len(), 1);
        assert!(store.selection().is_none());
    }
}
