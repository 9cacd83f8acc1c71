//! Prompt templates for Planetary.
//!
//! Prompts can be customized by placing a `planner.toml` file in the custom prompts directory.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub planner: PlannerPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts for the planning loop.
///
/// `system` receives `{{tools}}`; `user` receives `{{input}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerPrompts {
    pub system: String,
    pub user: String,
}

impl Default for PlannerPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a helpful assistant that builds detailed plans. The user describes something they want to achieve and you turn it into a plan. For example the user may say "I want to learn DSA to crack interviews." or "I want to visit Ooty, make an itinerary".

You have access to the following tools:
{{tools}}

When you need a tool, reply with "tool_calling_required" set to true. For example:
{
    "tool_calling_required": true,
    "tool_name": "webSearchTool",
    "args": {
        "query": "What is the roadmap for learning Full Stack development"
    }
}

Do NOT make up tool calls if you don't have enough information.
If you have just received tool outputs, use them together with the chat history to build your answer.

Rules:
1. Your final answer must be a single JSON object that can be parsed directly. It is rendered by a frontend application.
2. Tasks and sub tasks must be elaborate and thorough and form a complete roadmap. You may call the web search tool several times to gather more detail.
3. When you have the final answer, "tool_calling_required" must be false.

Structure of the final answer:
{
    "tool_calling_required": false,
    "final_answer": {
        "title": <Title of the plan>,
        "description": <Description of the plan>,
        "task_list": <List of Task objects>
    }
}

Structure of a Task object:
{
    "task_title": <Title of the task>,
    "task_description": <Description of the task>,
    "sub_tasks": <List of actions, each a string, that complete this task>
}"#
            .to_string(),

            user: "{{input}}".to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let planner_path = custom_path.join("planner.toml");
            if planner_path.exists() {
                let content = std::fs::read_to_string(&planner_path)?;
                prompts.planner = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Placeholders are substituted in one pass, so substituted values are never
    /// scanned for further placeholders. Unknown placeholders are left as is.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        placeholder()
            .replace_all(template, |caps: &Captures<'_>| match vars.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{\{([A-Za-z0-9_]+)\}\}").expect("Invalid regex"))
}
