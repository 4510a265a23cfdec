use std::sync::Arc;

use rmcp::{
    ServerHandler,
    ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult,
        Content,
        Implementation,
        ServerCapabilities,
        ServerInfo,
    },
    tool,
    tool_handler,
    tool_router,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    entry::CollectionKind,
    error,
    search::{self, FinalResult, SearchParams},
    settings,
    store::EntryStore,
};

struct QuickfixState {
    store: EntryStore,
}

#[derive(Clone)]
pub struct QuickfixMcpServer {
    state: Arc<QuickfixState>,
    tool_router: ToolRouter<Self>,
}

impl QuickfixMcpServer {
    fn new(state: QuickfixState) -> Self {
        Self {
            state: Arc::new(state),
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router(router = tool_router)]
impl QuickfixMcpServer {
    /// Keyword search over quick fixes and quick guides.
    #[tool(
        name = "quickfix_search",
        description = "Find quick fixes and field guides relevant to a fault description. Searches fixes then guides unless a collection is given."
    )]
    pub async fn quickfix_search(
        &self,
        params: Parameters<SearchToolParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let params = params.0;
        let store = &self.state.store;

        let collections = match params.collection.as_deref() {
            Some(name) => vec![
                name.parse::<CollectionKind>()
                    .map_err(|e| invalid_params(e.to_string()))?,
            ],
            None => CollectionKind::ALL.to_vec(),
        };

        let config = settings::match_config(store, params.tag_bonus)
            .map_err(settings_error)?;
        let limit =
            settings::limit(store, params.limit).map_err(settings_error)?;

        let mut results = Vec::new();
        for collection in collections {
            let search_params = SearchParams {
                query: params.query.clone(),
                collection,
                limit,
                all: params.all.unwrap_or(false),
                config,
            };
            results.extend(
                search::execute_search(&search_params, store)
                    .map_err(|e| mcp_error("search failed", e))?,
            );
        }

        let summary = format_search_summary(&results, &params.query);
        let structured = serde_json::to_value(search::SearchResponse {
            query: &params.query,
            result_count: results.len(),
            results: &results,
        })
        .map_err(|e| mcp_error("failed to serialize search results", e))?;

        let mut result = CallToolResult::success(vec![Content::text(summary)]);
        result.structured_content = Some(structured);
        Ok(result)
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for QuickfixMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_server_info(
                Implementation::new("quickfix", env!("CARGO_PKG_VERSION"))
                    .with_title("quickfix MCP"),
            )
            .with_instructions(
                "Use quickfix_search with the engineer's fault description. Include the panel or equipment name in the query so tagged fixes rank first.",
            )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchToolParams {
    /// Fault description or question.
    pub query: String,
    /// Restrict to "fixes" or "guides".
    pub collection: Option<String>,
    /// Maximum number of results per collection.
    pub limit: Option<usize>,
    /// Return every matching entry.
    pub all: Option<bool>,
    /// Score bonus for entries whose tag appears in the query.
    pub tag_bonus: Option<usize>,
}

fn format_search_summary(results: &[FinalResult], query: &str) -> String {
    if results.is_empty() {
        return format!("No quick fixes or guides match \"{query}\"");
    }

    let mut lines = Vec::with_capacity(results.len() + 1);
    let suffix = if results.len() == 1 { "" } else { "es" };
    lines.push(format!(
        "Found {} match{} for \"{query}\":",
        results.len(),
        suffix
    ));

    for r in results {
        lines.push(format!(
            "{}:{} [{}] {}\n{}",
            r.collection, r.id, r.score, r.title, r.body
        ));
    }

    lines.join("\n")
}

fn invalid_params(message: String) -> rmcp::ErrorData {
    rmcp::ErrorData::invalid_params(message, None)
}

/// Invalid setting values map to `invalid_params`.
fn settings_error(error: error::Error) -> rmcp::ErrorData {
    match error {
        error::Error::Config(message) => invalid_params(message),
        other => mcp_error("failed to resolve settings", other),
    }
}

fn mcp_error(message: &str, error: impl std::fmt::Display) -> rmcp::ErrorData {
    rmcp::ErrorData::internal_error(
        message.to_string(),
        Some(json!({ "error": error.to_string() })),
    )
}

pub fn run_mcp(store: EntryStore) -> error::Result<()> {
    let server = QuickfixMcpServer::new(QuickfixState { store });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| {
            error::Error::Config(format!("failed to start tokio runtime: {e}"))
        })?;

    runtime.block_on(async move {
        let transport = rmcp::transport::stdio();
        let running = server.serve(transport).await.map_err(|e| {
            error::Error::Config(format!(
                "MCP server initialization failed: {e}"
            ))
        })?;
        running.waiting().await.map_err(|e| {
            error::Error::Config(format!("MCP server error: {e}"))
        })?;
        Ok(())
    })
}
