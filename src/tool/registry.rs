// Tool registry
#![allow(dead_code)]

use crate::runner::{Runner, RunnerConfig};
use crate::tool::error::{Result, ToolError};
use crate::tool::exec::{ExecTool, default_exec_description};
use crate::tool::tool::ToolImpl;
use crate::tool::types::{ToolDefinition, ToolOutput};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// Name-to-tool dispatch table
pub struct ToolRegistry {
    tools: RwLock<HashMap<String, Arc<dyn ToolImpl>>>,
}

impl ToolRegistry {
    /// Initialize with the built-in tools
    pub fn new(config: RunnerConfig) -> Self {
        let mut tools: HashMap<String, Arc<dyn ToolImpl>> = HashMap::new();

        let exec_tool = Arc::new(ExecTool::new(
            Runner::new(config),
            default_exec_description(),
        )) as Arc<dyn ToolImpl>;
        tools.insert("exec".to_string(), exec_tool);

        info!(tool_count = tools.len(), "tool registry initialized");

        Self {
            tools: RwLock::new(tools),
        }
    }

    /// Register an additional tool under its own name
    pub fn register(&self, tool: Arc<dyn ToolImpl>) {
        let name = tool.name();
        let mut tools = self.tools.write().unwrap();
        tools.insert(name, tool);
    }

    /// Get all tool definitions for an inference request
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let tools = self.tools.read().unwrap();
        tools.values().map(|t| t.definition()).collect()
    }

    /// Execute a tool by name with JSON input
    pub async fn execute(&self, tool_name: &str, input: serde_json::Value) -> Result<ToolOutput> {
        debug!(tool_name = %tool_name, "looking up tool");

        let tool = {
            let tools = self.tools.read().unwrap();
            tools.get(tool_name).cloned()
        };

        let tool = tool.ok_or_else(|| ToolError::UnknownTool(tool_name.to_string()))?;

        tool.run(input).await
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new(RunnerConfig::default())
    }
}
