use anyhow::Context;
use pagecraft_editor::EditorConfig;
use std::path::Path;

/// Load an explicit config file, or `pagecraft.config.json` from `cwd`
pub fn load(cwd: &Path, explicit: Option<&Path>) -> anyhow::Result<EditorConfig> {
    match explicit {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Cannot read config {}", path.display()))?;
            EditorConfig::from_json_str(&content)
                .with_context(|| format!("Invalid config {}", path.display()))
        }
        None => EditorConfig::load(cwd).context("Invalid pagecraft.config.json"),
    }
}
