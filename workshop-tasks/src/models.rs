use serde::{Deserialize, Serialize};
use validator::Validate;
use workshop_kit::{Normalize, Record};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

impl Record for Task {
    fn id(&self) -> u64 {
        self.id
    }
}

/// Body of `POST /tasks` and `PUT /tasks/{id}`. Without an `id` the board
/// picks one (create) or keeps the current one (update).
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TaskInput {
    pub id: Option<u64>,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

impl Normalize for TaskInput {
    fn normalize(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self
    }
}

impl TaskInput {
    pub fn into_task(self, id: u64) -> Task {
        Task {
            id,
            title: self.title,
            description: self.description,
            completed: self.completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completed_defaults_to_false() {
        let input: TaskInput =
            serde_json::from_str(r#"{"title": "Buy milk", "description": "2 litres"}"#).unwrap();
        assert!(!input.completed);
        assert_eq!(input.id, None);

        let stored: Task =
            serde_json::from_str(r#"{"id": 3, "title": "Old", "description": ""}"#).unwrap();
        assert!(!stored.completed);
    }

    #[test]
    fn test_blank_title_is_rejected() {
        let input = TaskInput {
            id: None,
            title: "   ".into(),
            description: String::new(),
            completed: false,
        }
        .normalize();
        assert!(input.title.is_empty());
        assert!(input.validate().is_err());
    }
}
