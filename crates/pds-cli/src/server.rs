use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::app::{
    App, AppError, ChartRequest, DiamondRequest, FamilyRequest, ProfilesRequest,
};

#[derive(Clone)]
pub struct PdsServer {
    app: Arc<Mutex<App>>,
    tool_router: ToolRouter<Self>,
}

impl PdsServer {
    pub fn new(app: App) -> Self {
        Self {
            app: Arc::new(Mutex::new(app)),
            tool_router: Self::tool_router(),
        }
    }
}

fn to_mcp(e: AppError) -> McpError {
    match e {
        AppError::InvalidInput(_) | AppError::NotFound(_) => {
            McpError::invalid_params(e.to_string(), None)
        }
        AppError::Internal(_) => McpError::internal_error(e.to_string(), None),
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

#[tool_router]
impl PdsServer {
    #[tool(
        description = "Compute a birth chart: life path, soul/persona/destiny numbers from the Latin name, temperament, inner and personal-year numbers, and the natal triangle with its missing digits."
    )]
    async fn pds_chart(
        &self,
        Parameters(req): Parameters<ChartRequest>,
    ) -> Result<CallToolResult, McpError> {
        let app = self.app.lock().await;
        let chart = app.chart(&req).map_err(to_mcp)?;
        json_result(&chart)
    }

    #[tool(
        description = "Compute the diamond chart: four life stages with their age ranges, pinnacle numbers and challenge numbers."
    )]
    async fn pds_diamond(
        &self,
        Parameters(req): Parameters<DiamondRequest>,
    ) -> Result<CallToolResult, McpError> {
        let app = self.app.lock().await;
        let diamond = app.diamond(&req).map_err(to_mcp)?;
        json_result(&diamond)
    }

    #[tool(
        description = "Analyze family or group dynamics. The first member is the reference; each other member gets a relationship tip, and the group gets a digit radar. With no members, uses the user's saved roster."
    )]
    async fn pds_family(
        &self,
        Parameters(req): Parameters<FamilyRequest>,
    ) -> Result<CallToolResult, McpError> {
        let app = self.app.lock().await;
        let report = app.family(&req).map_err(to_mcp)?;
        json_result(&report)
    }

    #[tool(description = "List the user's saved profiles grouped into category tabs.")]
    async fn pds_profiles(
        &self,
        Parameters(req): Parameters<ProfilesRequest>,
    ) -> Result<CallToolResult, McpError> {
        let app = self.app.lock().await;
        let view = app.profiles(&req).map_err(to_mcp)?;
        json_result(&view)
    }
}

#[tool_handler]
impl ServerHandler for PdsServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "PDS energy charts from birth dates and Latin names.\n\n\
                 - pds_chart: one person's full chart. Dates are YYYY-MM-DD, 1900 or later.\n\
                 - pds_diamond: pinnacles and challenges across four life stages.\n\
                 - pds_family: relationship tips relative to the first member, plus a digit radar. \
                   Pass no members to analyze the user's saved roster.\n\
                 - pds_profiles: the saved roster grouped into tabs."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::MemberRequest;
    use crate::app::tests::make_app;

    fn make_server() -> PdsServer {
        PdsServer::new(make_app())
    }

    fn text_from_result(result: &CallToolResult) -> String {
        result
            .content
            .iter()
            .filter_map(|c| match &c.raw {
                RawContent::Text(t) => Some(t.text.clone()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    fn parse_result(result: &CallToolResult) -> serde_json::Value {
        let text = text_from_result(result);
        serde_json::from_str(&text).expect("handler should return valid JSON")
    }

    #[tokio::test]
    async fn test_pds_chart() {
        let server = make_server();
        let result = server
            .pds_chart(Parameters(ChartRequest {
                birth_date: "1990-01-01".into(),
                name: Some("ABC".into()),
            }))
            .await
            .unwrap();
        let json = parse_result(&result);

        assert_eq!(json["birth_date"], "1990-01-01");
        assert_eq!(json["life_path"], "21/3");
        assert_eq!(json["anchor"], "213");
        assert_eq!(json["personal_year"], 3);
        assert_eq!(json["temperament"]["mind"], 1);
    }

    #[tokio::test]
    async fn test_pds_chart_rejects_bad_date() {
        let server = make_server();
        let err = server
            .pds_chart(Parameters(ChartRequest {
                birth_date: "1990-02-30".into(),
                name: None,
            }))
            .await
            .unwrap_err();
        assert!(err.message.contains("day 30 out of range"));
    }

    #[tokio::test]
    async fn test_pds_diamond() {
        let server = make_server();
        let result = server
            .pds_diamond(Parameters(DiamondRequest {
                birth_date: "1987-12-29".into(),
            }))
            .await
            .unwrap();
        let json = parse_result(&result);

        assert_eq!(json["birthday"], "1987/12/29");
        let stages = json["stages"].as_array().unwrap();
        assert_eq!(stages.len(), 4);
        let pinnacles: Vec<_> = stages.iter().map(|s| s["pinnacle"].as_u64().unwrap()).collect();
        assert_eq!(pinnacles, vec![5, 9, 5, 1]);
    }

    #[tokio::test]
    async fn test_pds_family() {
        let server = make_server();
        let result = server
            .pds_family(Parameters(FamilyRequest {
                members: vec![
                    MemberRequest {
                        name: "Ann".into(),
                        birth_date: "1990-01-01".into(),
                        latin_name: None,
                    },
                    MemberRequest {
                        name: "Bo".into(),
                        birth_date: "1987-12-29".into(),
                        latin_name: None,
                    },
                ],
                ..Default::default()
            }))
            .await
            .unwrap();
        let json = parse_result(&result);

        assert_eq!(json["tips"][0]["to"], "Bo");
        assert_eq!(json["tips"][0]["kind"], "mirror");
        assert_eq!(json["radar"].as_object().unwrap().len(), 9);
    }

    #[tokio::test]
    async fn test_pds_profiles_empty_roster() {
        let server = make_server();
        let result = server
            .pds_profiles(Parameters(ProfilesRequest::default()))
            .await
            .unwrap();
        let json = parse_result(&result);

        assert_eq!(json["user"], "me");
        assert_eq!(json["tabs"][0]["name"], "All");
        assert_eq!(json["tabs"][0]["entries"][0]["id"]["type"], "me");
    }

    #[test]
    fn test_tool_registration() {
        let server = make_server();
        let info = server.get_info();

        assert!(info.instructions.is_some());
        assert!(info.capabilities.tools.is_some());
    }
}
