use anyhow::Result;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::io::{self, BufRead, BufReader, Write};
use std::sync::Arc;
use tracing::{info, warn};

use crate::use_cases::{AdminUseCase, ReportUseCase, TicketUseCase};

const PARSE_ERROR: i32 = -32700;
const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;
const INTERNAL_ERROR: i32 = -32603;

#[derive(Debug, serde::Deserialize)]
struct JsonRpcRequest {
    #[serde(default = "default_jsonrpc")]
    #[allow(dead_code)]
    jsonrpc: String,
    method: String,
    params: Option<Value>,
    id: Option<Value>,
}

fn default_jsonrpc() -> String {
    "2.0".to_string()
}

#[derive(Debug, serde::Serialize)]
struct JsonRpcResponse {
    jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
    id: Option<Value>,
}

impl JsonRpcResponse {
    fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id: Some(id.unwrap_or(json!(1))),
        }
    }

    fn failure(id: Option<Value>, code: i32, message: String, data: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(JsonRpcError {
                code,
                message,
                data,
            }),
            id,
        }
    }
}

#[derive(Debug, serde::Serialize)]
struct JsonRpcError {
    code: i32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

#[derive(Debug, serde::Serialize)]
struct Tool {
    name: String,
    description: String,
    #[serde(rename = "inputSchema")]
    input_schema: Value,
}

impl Tool {
    fn new(name: &str, description: &str, input_schema: Value) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            input_schema,
        }
    }
}

fn user_only_schema(description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "user": {
                "type": "string",
                "description": description
            }
        },
        "required": ["user"]
    })
}

pub struct MCPHandler {
    ticket_use_case: Arc<TicketUseCase>,
    admin_use_case: Arc<AdminUseCase>,
    report_use_case: Arc<ReportUseCase>,
}

impl MCPHandler {
    pub fn new(
        ticket_use_case: Arc<TicketUseCase>,
        admin_use_case: Arc<AdminUseCase>,
        report_use_case: Arc<ReportUseCase>,
    ) -> Self {
        Self {
            ticket_use_case,
            admin_use_case,
            report_use_case,
        }
    }

    pub async fn serve<R, W>(self, reader: R, mut writer: W) -> Result<()>
    where
        R: BufRead,
        W: Write,
    {
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let request: JsonRpcRequest = match serde_json::from_str::<JsonRpcRequest>(&line) {
                Ok(req) => req,
                Err(e) => {
                    warn!("Failed to parse request: {} - Line: {}", e, line);
                    let error_response = JsonRpcResponse::failure(
                        None,
                        PARSE_ERROR,
                        "Parse error".to_string(),
                        Some(json!(e.to_string())),
                    );
                    writeln!(writer, "{}", serde_json::to_string(&error_response)?)?;
                    writer.flush()?;
                    continue;
                }
            };

            // Notifications never get a response
            let is_notification =
                request.id.is_none() || request.method.starts_with("notifications/");

            if is_notification {
                if request.method == "notifications/initialized" {
                    info!("🎰 Client initialized");
                }
                continue;
            }

            let response = self.handle_request(request).await;
            writeln!(writer, "{}", serde_json::to_string(&response)?)?;
            writer.flush()?;
        }

        Ok(())
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id),
            "tools/list" => self.handle_list_tools(request.id),
            "tools/call" => self.handle_call_tool(request.params, request.id).await,
            _ => JsonRpcResponse::failure(
                Some(request.id.unwrap_or(json!(1))),
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
                None,
            ),
        }
    }

    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        info!("🎰 Initializing lotto round server");
        JsonRpcResponse::success(
            id,
            json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {
                    "tools": {}
                },
                "serverInfo": {
                    "name": env!("CARGO_PKG_NAME"),
                    "version": env!("CARGO_PKG_VERSION")
                }
            }),
        )
    }

    fn handle_list_tools(&self, id: Option<Value>) -> JsonRpcResponse {
        JsonRpcResponse::success(id, json!({ "tools": self.get_tools() }))
    }

    async fn handle_call_tool(&self, params: Option<Value>, id: Option<Value>) -> JsonRpcResponse {
        let id = Some(id.unwrap_or(json!(1)));

        let Some(params) = params else {
            return JsonRpcResponse::failure(id, INVALID_PARAMS, "Missing params".to_string(), None);
        };

        let Some(tool_name) = params.get("name").and_then(|n| n.as_str()) else {
            return JsonRpcResponse::failure(
                id,
                INVALID_PARAMS,
                "Missing tool name".to_string(),
                None,
            );
        };

        let arguments = params.get("arguments").cloned().unwrap_or(json!({}));
        let arguments_map: HashMap<String, Value> = match serde_json::from_value(arguments) {
            Ok(map) => map,
            Err(e) => {
                return JsonRpcResponse::failure(
                    id,
                    INVALID_PARAMS,
                    format!("Arguments must be an object: {}", e),
                    None,
                );
            }
        };

        match self.execute_tool(tool_name, &arguments_map).await {
            Ok(content) => JsonRpcResponse::success(
                id,
                json!({
                    "content": [
                        {
                            "type": "text",
                            "text": content
                        }
                    ]
                }),
            ),
            Err(e) => {
                warn!(tool = tool_name, error = %e, "tool call failed");
                JsonRpcResponse::failure(
                    id,
                    INTERNAL_ERROR,
                    format!("Tool execution error: {}", e),
                    None,
                )
            }
        }
    }

    async fn execute_tool(&self, tool_name: &str, arguments: &HashMap<String, Value>) -> Result<String> {
        match tool_name {
            "current_round" => self.ticket_use_case.current_round(arguments).await,
            "purchase_manual" => self.ticket_use_case.purchase_manual(arguments).await,
            "purchase_auto" => self.ticket_use_case.purchase_auto(arguments).await,
            "check_winnings" => self.ticket_use_case.check_winnings(arguments).await,
            "admin_dashboard" => self.admin_use_case.admin_dashboard(arguments).await,
            "create_next_round" => self.admin_use_case.create_next_round(arguments).await,
            "finalize_round" => self.admin_use_case.finalize_round(arguments).await,
            "delete_round" => self.admin_use_case.delete_round(arguments).await,
            "generate_sales_report" => self.report_use_case.generate_sales_report(arguments).await,
            _ => Err(anyhow::anyhow!("Unknown tool: {}", tool_name)),
        }
    }

    fn get_tools(&self) -> Vec<Tool> {
        let number_field = json!({
            "type": ["integer", "string"],
            "description": "A number from 1 to 45"
        });

        vec![
            Tool::new(
                "current_round",
                "Show the round currently open for sales, if any",
                json!({ "type": "object", "properties": {} }),
            ),
            Tool::new(
                "purchase_manual",
                "Buy a ticket with six hand-picked distinct numbers for the open round",
                json!({
                    "type": "object",
                    "properties": {
                        "user": { "type": "string", "description": "Buyer" },
                        "p_num1": number_field,
                        "p_num2": number_field,
                        "p_num3": number_field,
                        "p_num4": number_field,
                        "p_num5": number_field,
                        "p_num6": number_field
                    },
                    "required": ["user", "p_num1", "p_num2", "p_num3", "p_num4", "p_num5", "p_num6"]
                }),
            ),
            Tool::new(
                "purchase_auto",
                "Buy a ticket with six randomly picked numbers for the open round",
                user_only_schema("Buyer"),
            ),
            Tool::new(
                "check_winnings",
                "List a user's tickets with their draw results and prize rank",
                user_only_schema("Ticket owner"),
            ),
            Tool::new(
                "admin_dashboard",
                "Latest round, next round number and sales performance of every drawn round",
                user_only_schema("Admin user"),
            ),
            Tool::new(
                "create_next_round",
                "Open the next round for sales",
                user_only_schema("Admin user"),
            ),
            Tool::new(
                "finalize_round",
                "Draw winning numbers for the open round, close it and tally its sales",
                user_only_schema("Admin user"),
            ),
            Tool::new(
                "delete_round",
                "Delete a round; its tickets are kept without a round",
                json!({
                    "type": "object",
                    "properties": {
                        "user": { "type": "string", "description": "Admin user" },
                        "round_number": { "type": "integer", "description": "Round to delete" }
                    },
                    "required": ["user", "round_number"]
                }),
            ),
            Tool::new(
                "generate_sales_report",
                "Write the sales performance HTML report to the report directory",
                user_only_schema("Admin user"),
            ),
        ]
    }
}

pub fn stdio() -> (BufReader<io::Stdin>, io::Stdout) {
    (BufReader::new(io::stdin()), io::stdout())
}
