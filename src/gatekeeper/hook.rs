//! Hook input parsing and path resolution.

use crate::error::{AgentLockError, Result};
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};

/// JSON payload the host tool passes to its pre/post operation hooks.
///
/// Only the fields agentlock needs are modeled; everything else is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HookInput {
    #[serde(default)]
    pub session_id: Option<String>,

    #[serde(default)]
    pub tool_name: Option<String>,

    #[serde(default)]
    pub tool_input: ToolInput,

    /// Working directory of the agent; relative paths resolve against it.
    #[serde(default)]
    pub cwd: Option<String>,
}

/// The path-bearing part of a tool invocation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolInput {
    #[serde(default)]
    pub file_path: Option<String>,

    #[serde(default)]
    pub path: Option<String>,

    #[serde(default)]
    pub notebook_path: Option<String>,
}

impl HookInput {
    /// Parse hook input from its JSON text.
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| AgentLockError::UserError(format!("invalid hook input: {}", e)))
    }

    /// The raw target path, if the tool names one.
    pub fn target_path(&self) -> Option<&str> {
        [
            &self.tool_input.file_path,
            &self.tool_input.notebook_path,
            &self.tool_input.path,
        ]
        .into_iter()
        .flatten()
        .map(String::as_str)
        .find(|p| !p.trim().is_empty())
    }

    /// The target path made absolute against `cwd` (or `fallback_cwd`) and
    /// lexically normalized, so every agent derives the same key for the
    /// same file.
    pub fn resolved_target(&self, fallback_cwd: &Path) -> Option<PathBuf> {
        let raw = Path::new(self.target_path()?);
        let base = self.cwd.as_deref().map(Path::new).unwrap_or(fallback_cwd);
        Some(normalize_lexically(&base.join(raw)))
    }

    /// The operation label recorded on the lease.
    pub fn operation(&self) -> String {
        operation_for_tool(self.tool_name.as_deref())
    }
}

/// Map a tool name to the operation recorded on its lease.
pub fn operation_for_tool(tool_name: Option<&str>) -> String {
    match tool_name {
        Some("Edit") | Some("MultiEdit") | Some("NotebookEdit") => "editing".to_string(),
        Some("Write") => "writing".to_string(),
        Some(name) if !name.trim().is_empty() => name.trim().to_lowercase(),
        _ => "modifying".to_string(),
    }
}

/// Resolve `.` and `..` components without touching the filesystem.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_edit_payload() {
        let input = HookInput::from_json(
            r#"{
                "session_id": "abc",
                "tool_name": "Edit",
                "tool_input": {"file_path": "/repo/src/x.go", "old_string": "a"},
                "cwd": "/repo",
                "hook_event_name": "PreToolUse"
            }"#,
        )
        .unwrap();

        assert_eq!(input.session_id.as_deref(), Some("abc"));
        assert_eq!(input.target_path(), Some("/repo/src/x.go"));
        assert_eq!(input.operation(), "editing");
    }

    #[test]
    fn notebook_and_generic_path_fields() {
        let notebook =
            HookInput::from_json(r#"{"tool_input": {"notebook_path": "n.ipynb"}}"#).unwrap();
        assert_eq!(notebook.target_path(), Some("n.ipynb"));

        let generic = HookInput::from_json(r#"{"tool_input": {"path": "p.txt"}}"#).unwrap();
        assert_eq!(generic.target_path(), Some("p.txt"));

        let none = HookInput::from_json(r#"{"tool_name": "Bash"}"#).unwrap();
        assert_eq!(none.target_path(), None);
    }

    #[test]
    fn relative_target_resolves_against_cwd() {
        let input = HookInput::from_json(
            r#"{"cwd": "/repo/sub", "tool_input": {"file_path": "../src/./x.go"}}"#,
        )
        .unwrap();

        assert_eq!(
            input.resolved_target(Path::new("/ignored")),
            Some(PathBuf::from("/repo/src/x.go"))
        );
    }

    #[test]
    fn relative_target_falls_back_to_process_cwd() {
        let input = HookInput::from_json(r#"{"tool_input": {"file_path": "a.rs"}}"#).unwrap();
        assert_eq!(
            input.resolved_target(Path::new("/work")),
            Some(PathBuf::from("/work/a.rs"))
        );
    }

    #[test]
    fn operation_labels() {
        assert_eq!(operation_for_tool(Some("Write")), "writing");
        assert_eq!(operation_for_tool(Some("MultiEdit")), "editing");
        assert_eq!(operation_for_tool(Some("Formatter")), "formatter");
        assert_eq!(operation_for_tool(None), "modifying");
    }

    #[test]
    fn invalid_json_is_user_error() {
        assert!(matches!(
            HookInput::from_json("not json"),
            Err(AgentLockError::UserError(_))
        ));
    }
}
