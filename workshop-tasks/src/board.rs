/**
 * TASK BOARD - the task collection and its id rules
 *
 * - ids are picked as max + 1 unless the caller brings its own
 * - a caller-provided id must be unused, on create as on update
 */

use std::path::Path;
use std::sync::Arc;
use tracing::info;
use workshop_kit::store::next_id;
use workshop_kit::{ApiError, ApiResult, JsonCollection, StoreError};

use crate::models::{Task, TaskInput};

pub const TASKS_FILE: &str = "tasks.json";

pub type SharedBoard = Arc<TaskBoard>;

#[derive(Debug)]
pub struct TaskBoard {
    tasks: JsonCollection<Task>,
}

fn task_not_found(id: u64) -> ApiError {
    ApiError::not_found(format!("Task with ID {id} not found"))
}

fn id_taken(id: u64) -> ApiError {
    ApiError::conflict(format!("Task with ID {id} already exists"))
}

impl TaskBoard {
    pub fn open(data_dir: &Path) -> Result<Self, StoreError> {
        Ok(Self {
            tasks: JsonCollection::open(data_dir.join(TASKS_FILE))?,
        })
    }

    /// All tasks, or only those whose flag equals `completed`
    pub fn tasks(&self, completed: Option<bool>) -> Vec<Task> {
        self.tasks.read(|tasks| {
            tasks
                .iter()
                .filter(|t| completed.map_or(true, |c| t.completed == c))
                .cloned()
                .collect()
        })
    }

    pub fn task(&self, id: u64) -> ApiResult<Task> {
        self.tasks.find(id).ok_or_else(|| task_not_found(id))
    }

    pub fn create(&self, input: TaskInput, auto_id: bool) -> ApiResult<Task> {
        let task = self.tasks.transact(|tasks| -> ApiResult<Task> {
            let id = match input.id {
                Some(id) if !auto_id => {
                    if tasks.iter().any(|t| t.id == id) {
                        return Err(id_taken(id));
                    }
                    id
                }
                _ => next_id(tasks),
            };
            let task = input.into_task(id);
            tasks.push(task.clone());
            Ok(task)
        })?;
        info!("[tasks] created #{} \"{}\"", task.id, task.title);
        Ok(task)
    }

    /// Full replace. The body may renumber the task to a free id.
    pub fn update(&self, id: u64, input: TaskInput) -> ApiResult<Task> {
        self.tasks.transact(|tasks| -> ApiResult<Task> {
            let new_id = input.id.unwrap_or(id);
            if new_id != id && tasks.iter().any(|t| t.id == new_id) {
                return Err(id_taken(new_id));
            }
            let slot = tasks
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| task_not_found(id))?;
            *slot = input.into_task(new_id);
            Ok(slot.clone())
        })
    }

    pub fn delete(&self, id: u64) -> ApiResult<Task> {
        let task = self.tasks.transact(|tasks| {
            let pos = tasks
                .iter()
                .position(|t| t.id == id)
                .ok_or_else(|| task_not_found(id))?;
            Ok::<_, ApiError>(tasks.remove(pos))
        })?;
        info!("[tasks] deleted #{id}");
        Ok(task)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn flush(&self) -> Result<(), StoreError> {
        self.tasks.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_board() -> (tempfile::TempDir, TaskBoard) {
        let dir = tempfile::tempdir().unwrap();
        let board = TaskBoard::open(dir.path()).unwrap();
        (dir, board)
    }

    fn input(id: Option<u64>, title: &str) -> TaskInput {
        TaskInput {
            id,
            title: title.into(),
            description: "something to do".into(),
            completed: false,
        }
    }

    #[test]
    fn test_ids_follow_the_largest() {
        let (_dir, board) = open_board();
        assert_eq!(board.create(input(None, "a"), false).unwrap().id, 1);
        assert_eq!(board.create(input(Some(10), "b"), false).unwrap().id, 10);
        assert_eq!(board.create(input(None, "c"), false).unwrap().id, 11);
        // auto_id ignores the body id
        assert_eq!(board.create(input(Some(1), "d"), true).unwrap().id, 12);
    }

    #[test]
    fn test_duplicate_id_is_a_conflict() {
        let (_dir, board) = open_board();
        board.create(input(Some(5), "a"), false).unwrap();
        let err = board.create(input(Some(5), "b"), false).unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn test_update_renumbers_to_a_free_id() {
        let (_dir, board) = open_board();
        board.create(input(None, "a"), false).unwrap();
        board.create(input(None, "b"), false).unwrap();

        assert!(matches!(board.update(1, input(Some(2), "a")), Err(ApiError::Conflict(_))));
        assert!(matches!(board.update(9, input(None, "x")), Err(ApiError::NotFound(_))));

        let mut done = input(Some(7), "a, done");
        done.completed = true;
        let task = board.update(1, done).unwrap();
        assert_eq!(task.id, 7);
        assert!(board.task(1).is_err());
        assert_eq!(board.tasks(Some(true)), vec![task]);
    }

    #[test]
    fn test_tasks_survive_reopen() {
        let (dir, board) = open_board();
        board.create(input(None, "persist me"), false).unwrap();
        drop(board);

        let board = TaskBoard::open(dir.path()).unwrap();
        assert_eq!(board.task(1).unwrap().title, "persist me");
    }
}
