//! Tool registry for MCP tools.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::mcp::trial_tools::{FetchTrialHandler, SearchBatchTrialsHandler};
use crate::registries::{CtGovClient, CtisClient};
use crate::search::RelevanceSearch;

/// An MCP tool that can be called by the client
#[derive(Clone)]
pub struct Tool {
    /// Tool name (e.g., "fetch_trial")
    pub name: String,

    /// Human-readable description
    pub description: String,

    /// JSON Schema for input parameters
    pub input_schema: serde_json::Value,

    /// Handler function to execute the tool
    pub handler: Arc<dyn ToolHandler>,
}

impl std::fmt::Debug for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("input_schema", &self.input_schema)
            .finish()
    }
}

/// Handler for executing a tool
#[async_trait::async_trait]
pub trait ToolHandler: Send + Sync + std::fmt::Debug {
    /// Execute the tool with the given arguments
    async fn execute(&self, args: Value) -> Result<Value, String>;
}

/// Registry for all MCP tools
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Tool>,
}

impl ToolRegistry {
    /// Create a registry with both trial tools wired to the given clients.
    pub fn new(ctis: CtisClient, ctgov: CtGovClient, search: RelevanceSearch) -> Self {
        let mut registry = Self {
            tools: HashMap::new(),
        };

        registry.register(Tool {
            name: "fetch_trial".to_string(),
            description: "Fetch full trial information from euclinicaltrials.eu or \
                          ClinicalTrials.gov based on trial ID. Send in either EU trial ID or \
                          NCT ID, not both."
                .to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "eu_ct_id": {
                        "type": "string",
                        "description": "Specific EU trial identifier number (ctNumber) to look up"
                    },
                    "trial_ct_id": {
                        "type": "string",
                        "description": "Specific NCT ID to look up"
                    }
                }
            }),
            handler: Arc::new(FetchTrialHandler {
                ctis: ctis.clone(),
                ctgov: ctgov.clone(),
            }),
        });

        registry.register(Tool {
            name: "search_batch_trials".to_string(),
            description: "Search for clinical trials based on user request and search terms. \
                          Fetch data from both EU Clinical Trials and ClinicalTrials.gov."
                .to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "user_request": {
                        "type": "string",
                        "description": "User's specific request or question regarding clinical trials."
                    },
                    "search_terms": {
                        "type": "string",
                        "description": "Keywords or phrases to search for in clinical trials."
                    },
                    "condition": {
                        "type": "string",
                        "description": "Specific condition or disease to filter trials."
                    },
                    "location": {
                        "type": "string",
                        "description": "Trial's location (city, state, country)."
                    },
                    "sponsor": {
                        "type": "string",
                        "description": "Sponsor of the trial."
                    },
                    "status": {
                        "type": "integer",
                        "description": "Status of the trial - 8 for ended, 5 for ongoing recruitment ended, 1 for authorised, 4 for ongoing recruiting.",
                        "default": 8
                    },
                    "no_of_trials": {
                        "type": "integer",
                        "description": "Number of trials to fetch from each source",
                        "default": 10
                    }
                },
                "required": ["user_request", "search_terms"]
            }),
            handler: Arc::new(SearchBatchTrialsHandler { search }),
        });

        registry
    }

    /// Register a tool
    pub fn register(&mut self, tool: Tool) {
        self.tools.insert(tool.name.clone(), tool);
    }

    /// Get all tools
    pub fn all(&self) -> Vec<&Tool> {
        self.tools.values().collect()
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.get(name)
    }

    /// Execute a tool by name
    pub async fn execute(&self, name: &str, args: Value) -> Result<Value, String> {
        let tool = self
            .get(name)
            .ok_or_else(|| format!("Tool '{}' not found", name))?;

        tool.handler.execute(args).await
    }
}
