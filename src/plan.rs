//! Plan types returned to callers.
//!
//! Field names are part of the wire contract consumed by frontends and must not change.

use serde::{Deserialize, Serialize};

/// The structured final answer produced by the planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub task_list: Vec<Task>,
}

/// One entry of a plan.
///
/// `sub_tasks` is the wire form. `actions` keeps the title and description
/// apart when the model sent structured sub tasks; it is never serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawTask")]
pub struct Task {
    pub task_title: String,
    pub task_description: String,
    pub sub_tasks: Vec<String>,
    #[serde(skip)]
    pub actions: Vec<SubTask>,
}

/// A sub task with its description kept separate.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubTask {
    pub title: String,
    pub description: String,
}

impl Plan {
    /// Whether the plan carries at least one task.
    pub fn has_tasks(&self) -> bool {
        !self.task_list.is_empty()
    }

    /// Total number of sub tasks across all tasks.
    pub fn sub_task_count(&self) -> usize {
        self.task_list.iter().map(|t| t.sub_tasks.len()).sum()
    }
}

impl Task {
    /// Sub tasks as title/description pairs.
    ///
    /// Falls back to the string form when no structured sub tasks were decoded.
    pub fn actions(&self) -> Vec<SubTask> {
        if self.actions.len() == self.sub_tasks.len() {
            return self.actions.clone();
        }
        self.sub_tasks
            .iter()
            .map(|s| SubTask {
                title: s.clone(),
                description: String::new(),
            })
            .collect()
    }
}

#[derive(Deserialize)]
struct RawTask {
    task_title: String,
    #[serde(default)]
    task_description: String,
    #[serde(default)]
    sub_tasks: Vec<RawSubTask>,
}

/// Models sometimes emit sub tasks as `{action_title, action_description}` objects
/// instead of plain strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawSubTask {
    Text(String),
    Action {
        action_title: String,
        #[serde(default)]
        action_description: Option<String>,
    },
}

impl From<RawSubTask> for SubTask {
    fn from(raw: RawSubTask) -> Self {
        match raw {
            RawSubTask::Text(title) => SubTask {
                title,
                description: String::new(),
            },
            RawSubTask::Action {
                action_title,
                action_description,
            } => SubTask {
                title: action_title,
                description: action_description.unwrap_or_default(),
            },
        }
    }
}

impl From<RawTask> for Task {
    fn from(raw: RawTask) -> Self {
        let actions: Vec<SubTask> = raw.sub_tasks.into_iter().map(SubTask::from).collect();
        let sub_tasks = actions
            .iter()
            .map(|a| {
                if a.description.trim().is_empty() {
                    a.title.clone()
                } else {
                    format!("{}: {}", a.title, a.description)
                }
            })
            .collect();

        Task {
            task_title: raw.task_title,
            task_description: raw.task_description,
            sub_tasks,
            actions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plan_field_names_are_preserved() {
        let plan = Plan {
            title: "DSA Roadmap".to_string(),
            description: "Interview prep".to_string(),
            task_list: vec![Task {
                task_title: "Arrays".to_string(),
                task_description: "Basics".to_string(),
                sub_tasks: vec!["Two pointers".to_string()],
                actions: vec![],
            }],
        };

        let value = serde_json::to_value(&plan).unwrap();
        assert_eq!(
            value,
            json!({
                "title": "DSA Roadmap",
                "description": "Interview prep",
                "task_list": [{
                    "task_title": "Arrays",
                    "task_description": "Basics",
                    "sub_tasks": ["Two pointers"]
                }]
            })
        );
    }

    #[test]
    fn test_sub_tasks_accept_action_objects() {
        let task: Task = serde_json::from_value(json!({
            "task_title": "Day 1",
            "task_description": "Arrive",
            "sub_tasks": [
                "Check in",
                {"action_title": "Botanical Garden", "action_description": "Morning walk"},
                {"action_title": "Lake"}
            ]
        }))
        .unwrap();

        assert_eq!(
            task.sub_tasks,
            vec!["Check in", "Botanical Garden: Morning walk", "Lake"]
        );

        let actions = task.actions();
        assert_eq!(actions[1].title, "Botanical Garden");
        assert_eq!(actions[1].description, "Morning walk");
        assert_eq!(actions[2].description, "");

        let value = serde_json::to_value(&task).unwrap();
        assert!(value.get("actions").is_none());
        assert_eq!(value["sub_tasks"][0], "Check in");
    }

    #[test]
    fn test_actions_fall_back_to_strings() {
        let task = Task {
            task_title: "Arrays".to_string(),
            task_description: String::new(),
            sub_tasks: vec!["Two pointers".to_string()],
            actions: vec![],
        };
        assert_eq!(
            task.actions(),
            vec![SubTask {
                title: "Two pointers".to_string(),
                description: String::new(),
            }]
        );
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let plan: Plan = serde_json::from_value(json!({"title": "Bare"})).unwrap();
        assert!(plan.description.is_empty());
        assert!(!plan.has_tasks());
        assert_eq!(plan.sub_task_count(), 0);
    }
}
