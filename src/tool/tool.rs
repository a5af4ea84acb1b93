// Tool trait
#![allow(dead_code)]

use crate::tool::error::Result;
use crate::tool::types::{ToolDefinition, ToolOutput};
use async_trait::async_trait;

/// Internal trait for tool implementations
#[async_trait]
pub trait ToolImpl: Send + Sync {
    /// Get the tool definition (name, description, input_schema)
    fn definition(&self) -> ToolDefinition;

    /// Run the tool with JSON input
    async fn run(&self, input: serde_json::Value) -> Result<ToolOutput>;

    /// Get tool name
    fn name(&self) -> String {
        self.definition().name.clone()
    }
}
