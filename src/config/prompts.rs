//! Prompt templates for Recap.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{\{(\w+)\}\}").expect("Invalid regex"))
}

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Prompts {
    pub summary: SummaryPrompts,
    pub chat: ChatPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts for transcript summarization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryPrompts {
    pub system: String,
    /// Rendered with `{{transcript}}` and `{{language_instruction}}`.
    pub user: String,
    /// Rendered with `{{language}}`; empty when no language is requested.
    pub language_instruction: String,
}

impl Default for SummaryPrompts {
    fn default() -> Self {
        Self {
            system: "You are a helpful assistant that creates detailed summaries of YouTube videos."
                .to_string(),

            user: r#"You are an advanced AI specializing in text summarization. Your task is to generate a structured and detailed summary of a YouTube transcript.

Instructions:
1. Extract all key points, facts, and relevant details
2. Provide a well-organized, structured summary
3. Use clear and engaging language
4. Focus on the main topics and important information
5. Be concise but comprehensive
6. Avoid repetition
7. Do not include any reasoning steps or self-reflections
8. Do not mention sponsorships or brand names
9. End with "Have a nice day!"

Output Format:
1. Summary: A clear overview of the main topics
2. Key Points: Important facts and details in bullet points
3. Insights: Deep observations and analysis
{{language_instruction}}
Now, please summarize the following transcript:

{{transcript}}"#
                .to_string(),

            language_instruction: "\nWrite the entire summary in {{language}}.\n".to_string(),
        }
    }
}

/// Prompts for chatting about a video.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatPrompts {
    pub system: String,
    /// Rendered with `{{transcript}}` and `{{question}}`.
    pub user: String,
}

impl Default for ChatPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a helpful assistant answering questions about a YouTube video.

Guidelines:
- Answer using the video transcript provided with the latest question
- Remember previous questions in the conversation for follow-ups
- If the transcript doesn't cover the question, say so honestly"#
                .to_string(),

            user: "Based on this video transcript: {{transcript}}\n\nQuestion: {{question}}\n\nAnswer:"
                .to_string(),
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

            let summary_path = custom_path.join("summary.toml");
            if summary_path.exists() {
                let content = std::fs::read_to_string(&summary_path)?;
                prompts.summary = toml::from_str(&content)?;
            }

            let chat_path = custom_path.join("chat.toml");
            if chat_path.exists() {
                let content = std::fs::read_to_string(&chat_path)?;
                prompts.chat = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Single pass over the template: substituted values are never scanned
    /// again, and unknown placeholders are left as written.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        placeholder_regex()
            .replace_all(template, |caps: &Captures| match vars.get(&caps[1]) {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.summary.user.contains("{{transcript}}"));
        assert!(prompts.chat.user.contains("{{question}}"));
        assert!(!prompts.chat.system.is_empty());
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_substituted_values_are_not_rendered_again() {
        let template = "Based on this video transcript: {{transcript}}\n\nQuestion: {{question}}\n\nAnswer:";
        let mut vars = HashMap::new();
        vars.insert("transcript".to_string(), "TRANSCRIPT-BODY".to_string());
        vars.insert(
            "question".to_string(),
            "what does {{transcript}} mean in Jinja?".to_string(),
        );

        assert_eq!(
            Prompts::render(template, &vars),
            "Based on this video transcript: TRANSCRIPT-BODY\n\nQuestion: what does {{transcript}} mean in Jinja?\n\nAnswer:"
        );
    }

    #[test]
    fn test_unknown_placeholder_kept() {
        let vars = HashMap::new();
        assert_eq!(Prompts::render("Hi {{who}} {{}}", &vars), "Hi {{who}} {{}}");
    }

    #[test]
    fn test_provided_vars_override_custom() {
        let mut prompts = Prompts::default();
        prompts.variables.insert("tone".to_string(), "formal".to_string());
        prompts.variables.insert("name".to_string(), "config".to_string());

        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "call".to_string());

        let result = prompts.render_with_custom("{{tone}} / {{name}}", &vars);
        assert_eq!(result, "formal / call");
    }

    #[test]
    fn test_load_custom_chat_prompts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("chat.toml"),
            "user = \"T={{transcript}} Q={{question}}\"\n",
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.chat.user, "T={{transcript}} Q={{question}}");
        // Unset fields fall back to defaults.
        assert_eq!(prompts.chat.system, ChatPrompts::default().system);
        assert_eq!(prompts.summary.user, SummaryPrompts::default().user);
    }
}
