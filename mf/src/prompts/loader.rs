//! Prompt Loader
//!
//! Loads prompt templates from an override directory or falls back to embedded defaults.

use std::path::{Path, PathBuf};

use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::debug;

use super::embedded;

/// Variables available to prompt templates
#[derive(Debug, Clone, Default, Serialize)]
pub struct PromptContext {
    /// Free-text goal (goal planning)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    /// Task title (subtask and priority suggestion)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl PromptContext {
    pub fn goal(goal: impl Into<String>) -> Self {
        Self {
            goal: Some(goal.into()),
            ..Default::default()
        }
    }

    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }
}

/// Loads and renders prompt templates
pub struct PromptLoader {
    /// Handlebars template engine
    hbs: Handlebars<'static>,
    /// User override directory (e.g., `.mindflow/prompts/`)
    override_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Create a loader that looks for `.mindflow/prompts/` under `root`
    pub fn new(root: impl AsRef<Path>) -> Self {
        let override_dir = root.as_ref().join(".mindflow/prompts");
        Self {
            hbs: Self::engine(),
            override_dir: if override_dir.exists() { Some(override_dir) } else { None },
        }
    }

    /// Create a loader that only uses embedded prompts
    pub fn embedded_only() -> Self {
        Self {
            hbs: Self::engine(),
            override_dir: None,
        }
    }

    fn engine() -> Handlebars<'static> {
        let mut hbs = Handlebars::new();
        // Prompts are plain text; HTML escaping would mangle quotes
        hbs.register_escape_fn(handlebars::no_escape);
        hbs.set_strict_mode(true);
        hbs
    }

    /// Load a template by name
    ///
    /// Checks in order:
    /// 1. Override: `.mindflow/prompts/{name}.pmt`
    /// 2. Embedded fallback
    fn load_template(&self, name: &str) -> Result<String> {
        if let Some(ref dir) = self.override_dir {
            let path = dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!("Loading prompt from override: {:?}", path);
                return std::fs::read_to_string(&path)
                    .map_err(|e| eyre!("Failed to read prompt {}: {}", path.display(), e));
            }
        }

        if let Some(content) = embedded::get_embedded(name) {
            debug!("Using embedded prompt: {}", name);
            return Ok(content.to_string());
        }

        Err(eyre!("Prompt template not found: {}", name))
    }

    /// Render a template with the given context
    pub fn render(&self, template_name: &str, context: &PromptContext) -> Result<String> {
        let template = self.load_template(template_name)?;
        self.hbs
            .render_template(&template, context)
            .map_err(|e| eyre!("Failed to render template {}: {}", template_name, e))
    }
}

impl Default for PromptLoader {
    fn default() -> Self {
        Self::embedded_only()
    }
}
