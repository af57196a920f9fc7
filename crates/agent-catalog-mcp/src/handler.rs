//! MCP server handler that exposes the agent catalog as read-only tools.
//!
//! Two tools are advertised: `list_agents` (optional `search`, `color`, and
//! comma-separated `tools` filters) and `get_agent` (required `id`). Results
//! are returned as JSON text content.

use std::collections::HashMap;

use async_trait::async_trait;
use rust_mcp_sdk::schema::{
    CallToolResult, ClientRequest, ListToolsResult, RpcError, TextContent, Tool, ToolInputSchema,
    schema_utils::{NotificationFromClient, RequestFromClient, ResultFromServer},
};
use rust_mcp_sdk::{
    McpServer,
    mcp_server::{ServerHandlerCore, enforce_compatible_protocol_version},
};
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::catalog::Catalog;
use crate::error::CatalogError;
use crate::model::{AgentFilters, AgentResponse};

pub const LIST_AGENTS_TOOL: &str = "list_agents";
pub const GET_AGENT_TOOL: &str = "get_agent";

type ToolArgs = JsonMap<String, JsonValue>;

/// Routes MCP requests to the catalog.
pub struct CatalogServerHandler {
    catalog: Catalog,
}

impl CatalogServerHandler {
    pub fn new(catalog: Catalog) -> Self {
        tracing::debug!(
            "initialized CatalogServerHandler (agents_dir={}, extension={})",
            catalog.settings().agents_dir.display(),
            catalog.settings().extension
        );
        Self { catalog }
    }

    /// Build the list of tool definitions exposed by this server.
    fn tool_definitions(&self) -> Vec<Tool> {
        vec![
            tool_definition(
                LIST_AGENTS_TOOL,
                "List agent definitions, optionally filtered. All filters must match.",
                &[
                    (
                        "search",
                        "Case-insensitive text matched against name, description, system prompt, and tools.",
                    ),
                    ("color", "Exact color to match."),
                    (
                        "tools",
                        "Comma-separated tool names; an agent matches if it has any of them.",
                    ),
                ],
                &[],
            ),
            tool_definition(
                GET_AGENT_TOOL,
                "Fetch a single agent definition by id (its filename without extension).",
                &[("id", "Agent id.")],
                &["id"],
            ),
        ]
    }

    /// Execute a tool call and return its JSON payload.
    async fn call_tool(&self, tool: &str, args: Option<&ToolArgs>) -> Result<JsonValue, RpcError> {
        match tool {
            LIST_AGENTS_TOOL => {
                let filters = AgentFilters::from_query(
                    string_arg(args, "search")?,
                    string_arg(args, "color")?,
                    string_arg(args, "tools")?,
                );
                let resp = self.catalog.list(filters).await.map_err(map_catalog_error)?;
                tracing::info!("list_agents matched {} agent(s)", resp.total);
                to_json(&resp)
            }
            GET_AGENT_TOOL => {
                let id = string_arg(args, "id")?.ok_or_else(|| {
                    tracing::error!("missing required 'id' in arguments (tool={})", tool);
                    RpcError::invalid_params().with_message("missing required 'id' string".to_string())
                })?;
                let agent = self.catalog.get(id).await.map_err(map_catalog_error)?;
                tracing::info!("get_agent resolved '{}'", agent.id);
                to_json(&AgentResponse { agent })
            }
            other => {
                tracing::warn!("unknown tool: {}", other);
                Err(RpcError::method_not_found().with_message(format!("Unknown tool '{}'", other)))
            }
        }
    }
}

fn tool_definition(name: &str, description: &str, params: &[(&str, &str)], required: &[&str]) -> Tool {
    let mut props = HashMap::<String, JsonMap<String, JsonValue>>::new();
    for (param, help) in params {
        let mut schema = JsonMap::new();
        schema.insert("type".to_string(), JsonValue::String("string".to_string()));
        schema.insert(
            "description".to_string(),
            JsonValue::String((*help).to_string()),
        );
        props.insert((*param).to_string(), schema);
    }
    Tool {
        annotations: None,
        description: Some(description.to_string()),
        input_schema: ToolInputSchema::new(
            required.iter().map(|s| s.to_string()).collect(),
            Some(props),
        ),
        meta: None,
        name: name.to_string(),
        output_schema: None,
        title: None,
    }
}

/// Read an optional string argument; present but non-string is rejected.
fn string_arg<'a>(args: Option<&'a ToolArgs>, key: &str) -> Result<Option<&'a str>, RpcError> {
    match args.and_then(|m| m.get(key)) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(s)) => Ok(Some(s.as_str())),
        Some(other) => {
            tracing::error!("argument '{}' must be a string (got {})", key, other);
            Err(RpcError::invalid_params().with_message(format!("'{key}' must be a string")))
        }
    }
}

fn map_catalog_error(err: CatalogError) -> RpcError {
    match err {
        CatalogError::NotFound(id) => {
            tracing::info!("agent '{}' not found", id);
            RpcError::invalid_params().with_message("Agent not found".to_string())
        }
        other => {
            tracing::error!("catalog request failed: {}", other);
            RpcError::internal_error().with_message("Internal server error".to_string())
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<JsonValue, RpcError> {
    serde_json::to_value(value).map_err(|e| {
        tracing::error!("failed to serialize response: {}", e);
        RpcError::internal_error().with_message("Internal server error".to_string())
    })
}

#[async_trait]
impl ServerHandlerCore for CatalogServerHandler {
    async fn handle_request(
        &self,
        request: RequestFromClient,
        runtime: &dyn McpServer,
    ) -> std::result::Result<ResultFromServer, RpcError> {
        let method_name = request.method().to_owned();
        tracing::info!("handle_request: method={}", method_name);
        match request {
            RequestFromClient::ClientRequest(client_request) => match client_request {
                ClientRequest::InitializeRequest(initialize_request) => {
                    tracing::debug!(
                        "initialize_request: client_protocol={}",
                        initialize_request.params.protocol_version
                    );
                    let mut server_info = runtime.server_info().to_owned();
                    if let Some(updated_protocol_version) = enforce_compatible_protocol_version(
                        &initialize_request.params.protocol_version,
                        &server_info.protocol_version,
                    )
                    .map_err(|err| {
                        tracing::error!(
                            "incompatible protocol version (client={}, server={})",
                            initialize_request.params.protocol_version,
                            server_info.protocol_version
                        );
                        RpcError::internal_error().with_message(err.to_string())
                    })? {
                        server_info.protocol_version = updated_protocol_version;
                    }
                    tracing::info!("initialized (protocol={})", server_info.protocol_version);
                    Ok(server_info.into())
                }

                ClientRequest::ListToolsRequest(_) => {
                    let tools = self.tool_definitions();
                    tracing::info!("list_tools (count={})", tools.len());
                    Ok(ListToolsResult {
                        meta: None,
                        next_cursor: None,
                        tools,
                    }
                    .into())
                }

                ClientRequest::CallToolRequest(request) => {
                    let tool = request.tool_name().to_string();
                    let arg_keys = request
                        .params
                        .arguments
                        .as_ref()
                        .map(|m| m.keys().cloned().collect::<Vec<_>>())
                        .unwrap_or_default();
                    tracing::info!("call_tool request: tool={}, arg_keys={:?}", tool, arg_keys);
                    let payload = self
                        .call_tool(&tool, request.params.arguments.as_ref())
                        .await?;
                    Ok(
                        CallToolResult::text_content(vec![TextContent::from(payload.to_string())])
                            .into(),
                    )
                }

                _ => {
                    tracing::warn!("method not implemented: {}", method_name);
                    Err(RpcError::method_not_found()
                        .with_message(format!("No handler is implemented for '{method_name}'.")))
                }
            },
            RequestFromClient::CustomRequest(_) => {
                tracing::warn!("custom request not implemented");
                Err(RpcError::method_not_found()
                    .with_message("No handler is implemented for custom requests.".to_string()))
            }
        }
    }

    async fn handle_notification(
        &self,
        notification: NotificationFromClient,
        _: &dyn McpServer,
    ) -> std::result::Result<(), RpcError> {
        match &notification {
            NotificationFromClient::ClientNotification(_) => {
                tracing::debug!("handle_notification: client notification")
            }
            NotificationFromClient::CustomNotification(_) => {
                tracing::debug!("handle_notification: custom notification")
            }
        }
        Ok(())
    }

    async fn handle_error(
        &self,
        error: &RpcError,
        _: &dyn McpServer,
    ) -> std::result::Result<(), RpcError> {
        tracing::error!(
            "handle_error from client (code={:?}, message={:?})",
            error.code,
            error.message
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogSettings;
    use serde_json::json;

    const REVIEWER: &str = "---\nname: Reviewer\ndescription: Reviews code\ntools: Read, Write\ncolor: blue\n---\nYou review code.\n";
    const HELPER: &str = "---\nname: Helper\ndescription: Helps\nwith refactoring\ncolor: red\n---\nYou help.\n";

    fn handler_with_fixtures() -> (tempfile::TempDir, CatalogServerHandler) {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("reviewer.md"), REVIEWER).expect("write");
        std::fs::write(dir.path().join("helper.md"), HELPER).expect("write");
        let catalog = Catalog::new(CatalogSettings::new(dir.path().to_path_buf()));
        (dir, CatalogServerHandler::new(catalog))
    }

    fn args(v: JsonValue) -> ToolArgs {
        v.as_object().cloned().expect("object")
    }

    #[test]
    fn tool_schemas_declare_required_params() {
        let (_dir, h) = handler_with_fixtures();
        let tools = h.tool_definitions();
        let by_name: HashMap<String, JsonValue> = tools
            .iter()
            .map(|t| (t.name.clone(), serde_json::to_value(t).expect("serialize tool")))
            .collect();

        let get = &by_name[GET_AGENT_TOOL];
        assert_eq!(get["inputSchema"]["required"], json!(["id"]));
        assert!(get["inputSchema"]["properties"]["id"].is_object());

        let list = &by_name[LIST_AGENTS_TOOL];
        for p in ["search", "color", "tools"] {
            assert!(list["inputSchema"]["properties"][p].is_object(), "missing {p}");
        }
    }

    #[tokio::test]
    async fn list_agents_applies_filters() {
        let (_dir, h) = handler_with_fixtures();
        let a = args(json!({"search": "REFACTOR", "tools": ""}));
        let payload = h.call_tool(LIST_AGENTS_TOOL, Some(&a)).await.expect("ok");
        assert_eq!(payload["total"], 1);
        assert_eq!(payload["agents"][0]["id"], "helper");
        assert_eq!(payload["agents"][0]["description"], "Helps with refactoring");
        assert_eq!(payload["filters"], json!({"search": "REFACTOR"}));

        let all = h.call_tool(LIST_AGENTS_TOOL, None).await.expect("ok");
        assert_eq!(all["total"], 2);
    }

    #[tokio::test]
    async fn get_agent_returns_record_with_camel_case_keys() {
        let (_dir, h) = handler_with_fixtures();
        let a = args(json!({"id": "reviewer"}));
        let payload = h.call_tool(GET_AGENT_TOOL, Some(&a)).await.expect("ok");
        assert_eq!(payload["agent"]["systemPrompt"], "You review code.");
        assert_eq!(payload["agent"]["tools"], json!(["Read", "Write"]));
        assert_eq!(payload["agent"]["filename"], "reviewer.md");
    }

    #[tokio::test]
    async fn get_agent_errors_are_distinct() {
        let (_dir, h) = handler_with_fixtures();

        let missing = args(json!({"id": "nope"}));
        let err = h.call_tool(GET_AGENT_TOOL, Some(&missing)).await.expect_err("not found");
        assert_eq!(err.message, "Agent not found");

        let err = h.call_tool(GET_AGENT_TOOL, None).await.expect_err("no id");
        assert!(err.message.contains("'id'"));

        let bad = args(json!({"id": 7}));
        assert!(h.call_tool(GET_AGENT_TOOL, Some(&bad)).await.is_err());

        let err = h.call_tool("delete_agent", None).await.expect_err("unknown");
        assert!(err.message.contains("delete_agent"));
    }

    #[tokio::test]
    async fn list_agents_on_missing_directory_sets_error_flag() {
        let dir = tempfile::tempdir().expect("tempdir");
        let catalog = Catalog::new(CatalogSettings::new(dir.path().join("gone")));
        let h = CatalogServerHandler::new(catalog);
        let payload = h.call_tool(LIST_AGENTS_TOOL, None).await.expect("ok");
        assert_eq!(payload["agents"], json!([]));
        assert_eq!(payload["error"], "Unable to read agents directory");
    }
}
