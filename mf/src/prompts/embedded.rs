//! Embedded fallback prompts
//!
//! These are compiled into the binary and used when template files are not found.

/// Goal planning: expand a free-text goal into several tasks
pub const PLAN_GOAL: &str = r#"Create a detailed action plan for the following goal: "{{goal}}".
Break it down into 3-5 concrete tasks.
For each task, assign a priority (Low, Medium, High) and a category (Work, Personal, Health, Learning, General).
Add 2-3 subtasks for each main task."#;

/// Subtask suggestion: break one task into steps
pub const SUGGEST_SUBTASKS: &str = r#"I have a task: "{{title}}". Suggest 3 to 5 actionable substeps to complete this task. Return a simple JSON array of strings."#;

/// Priority suggestion: classify one task
pub const SUGGEST_PRIORITY: &str = r#"Analyze the urgency and importance of this task: "{{title}}". Return only one word: "High", "Medium", or "Low"."#;

/// Look up an embedded template by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    match name {
        "plan-goal" => Some(PLAN_GOAL),
        "suggest-subtasks" => Some(SUGGEST_SUBTASKS),
        "suggest-priority" => Some(SUGGEST_PRIORITY),
        _ => None,
    }
}
