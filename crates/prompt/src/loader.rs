//! Prompt loader for YAML prompt definitions.

use crate::defaults;
use crate::types::PromptDefinition;
use guardiane_core::{AppError, AppResult};
use std::path::Path;

/// Load a prompt definition by ID.
///
/// Looks for `<workspace>/.guardiane/prompts/<id>.yml` first and falls back
/// to the built-in definition of the same id.
///
/// # Example
/// ```no_run
/// use guardiane_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new("."), "rag.answer")?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = workspace_path
        .join(".guardiane/prompts")
        .join(format!("{}.yml", prompt_id));

    if prompt_file.exists() {
        tracing::debug!("Loading prompt from: {:?}", prompt_file);

        let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
            AppError::Prompt(format!(
                "Failed to read prompt file {:?}: {}",
                prompt_file, e
            ))
        })?;

        let definition = parse_prompt(&contents)
            .map_err(|e| AppError::Prompt(format!("{:?}: {}", prompt_file, e)))?;

        tracing::info!("Loaded prompt override: {} ({})", definition.id, definition.title);
        return Ok(definition);
    }

    match defaults::builtin_source(prompt_id) {
        Some(source) => parse_prompt(source),
        None => Err(AppError::Prompt(format!(
            "Prompt '{}' not found in {:?} and no built-in definition exists",
            prompt_id, prompt_file
        ))),
    }
}

fn parse_prompt(contents: &str) -> AppResult<PromptDefinition> {
    let definition: PromptDefinition = serde_yaml::from_str(contents)
        .map_err(|e| AppError::Prompt(format!("Failed to parse prompt YAML: {}", e)))?;

    validate_prompt(&definition)?;

    Ok(definition)
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.template.trim().is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_prompt(dir: &Path, id: &str, content: &str) {
        let prompts_dir = dir.join(".guardiane/prompts");
        fs::create_dir_all(&prompts_dir).unwrap();
        fs::write(prompts_dir.join(format!("{}.yml", id)), content).unwrap();
    }

    #[test]
    fn test_builtin_prompts_parse() {
        let temp_dir = TempDir::new().unwrap();

        let answer = load_prompt(temp_dir.path(), defaults::RAG_ANSWER_ID).unwrap();
        assert_eq!(answer.id, "rag.answer");
        assert!(answer.template.contains("{{context}}"));
        assert!(answer.template.contains("{{question}}"));
        assert!(answer.system.unwrap().contains("Guardiané"));

        let expand = load_prompt(temp_dir.path(), defaults::RAG_EXPAND_ID).unwrap();
        assert!(expand.template.contains("{{count}}"));
    }

    #[test]
    fn test_workspace_override_wins() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(
            temp_dir.path(),
            "rag.answer",
            r#"
id: rag.answer
title: "Custom"
apiVersion: "1.1"
template: "Q: {{question}}"
"#,
        );

        let prompt = load_prompt(temp_dir.path(), "rag.answer").unwrap();
        assert_eq!(prompt.title, "Custom");
        assert!(prompt.system.is_none());
    }

    #[test]
    fn test_load_unknown_prompt() {
        let temp_dir = TempDir::new().unwrap();
        let result = load_prompt(temp_dir.path(), "nonexistent");
        assert!(matches!(result, Err(AppError::Prompt(_))));
    }

    #[test]
    fn test_load_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(temp_dir.path(), "broken", "invalid: yaml: content:");

        let result = load_prompt(temp_dir.path(), "broken");
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_api_version() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(
            temp_dir.path(),
            "versionless",
            "id: versionless\ntitle: T\napiVersion: \"1\"\ntemplate: \"x\"\n",
        );

        let result = load_prompt(temp_dir.path(), "versionless");
        assert!(result.is_err());
    }
}
