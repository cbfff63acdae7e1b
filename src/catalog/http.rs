//! External catalog client over GraphQL
//!
//! Every catalog list is one POST of `{query, variables}` to the configured
//! endpoint, authenticated with the operator's bearer token.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use url::Url;

use super::traits::{CatalogError, ExternalCatalogClient};
use crate::config::ExternalConfig;
use crate::taxonomy::{CatalogEntry, Operator};

const PROGRAMS_QUERY: &str = r#"
query ($organization_id: ID!) {
  organization(organization_id: $organization_id) {
    programs { id name }
  }
}"#;

const SUBJECTS_QUERY: &str = r#"
query ($program_id: ID!) {
  program(id: $program_id) {
    subjects { id name }
  }
}"#;

const CATEGORIES_QUERY: &str = r#"
query ($program_id: ID!) {
  program(id: $program_id) {
    categories { id name }
  }
}"#;

const AGES_QUERY: &str = r#"
query ($program_id: ID!) {
  program(id: $program_id) {
    age_ranges { id name }
  }
}"#;

const GRADES_QUERY: &str = r#"
query ($program_id: ID!) {
  program(id: $program_id) {
    grades { id name }
  }
}"#;

const SUB_CATEGORIES_QUERY: &str = r#"
query ($category_id: ID!) {
  category(id: $category_id) {
    subcategories { id name }
  }
}"#;

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct OrganizationData {
    organization: Option<OrganizationNode>,
}

#[derive(Debug, Deserialize)]
struct OrganizationNode {
    programs: Option<Vec<CatalogEntry>>,
}

#[derive(Debug, Deserialize)]
struct ProgramData {
    program: Option<ProgramNode>,
}

#[derive(Debug, Default, Deserialize)]
struct ProgramNode {
    subjects: Option<Vec<CatalogEntry>>,
    categories: Option<Vec<CatalogEntry>>,
    age_ranges: Option<Vec<CatalogEntry>>,
    grades: Option<Vec<CatalogEntry>>,
}

#[derive(Debug, Deserialize)]
struct CategoryData {
    category: Option<CategoryNode>,
}

#[derive(Debug, Deserialize)]
struct CategoryNode {
    subcategories: Option<Vec<CatalogEntry>>,
}

/// Decode a GraphQL envelope, surfacing remote errors before data
fn decode_envelope<T: DeserializeOwned>(body: &str) -> Result<T, CatalogError> {
    let envelope: GraphQlResponse<T> = serde_json::from_str(body)?;

    if !envelope.errors.is_empty() {
        let messages: Vec<&str> = envelope.errors.iter().map(|e| e.message.as_str()).collect();
        return Err(CatalogError::Remote(messages.join("; ")));
    }

    envelope
        .data
        .ok_or_else(|| CatalogError::MissingData("response".to_string()))
}

/// `ExternalCatalogClient` backed by the external GraphQL API
pub struct HttpCatalogClient {
    client: Client,
    endpoint: Url,
}

impl HttpCatalogClient {
    pub fn new(config: &ExternalConfig) -> Result<Self, CatalogError> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| CatalogError::Transport(format!("invalid endpoint: {}", e)))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, endpoint })
    }

    async fn query<T: DeserializeOwned>(
        &self,
        operator: &Operator,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, CatalogError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(operator.token())
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(CatalogError::Unauthorized(format!(
                    "operator {} rejected with {}",
                    operator.user_id, status
                )));
            }
            s if !s.is_success() => {
                return Err(CatalogError::Status {
                    status: s.as_u16(),
                    body,
                });
            }
            _ => {}
        }

        decode_envelope(&body)
    }

    async fn program_node(
        &self,
        operator: &Operator,
        query: &str,
        program_id: &str,
    ) -> Result<ProgramNode, CatalogError> {
        let data: ProgramData = self
            .query(operator, query, json!({ "program_id": program_id }))
            .await?;
        data.program
            .ok_or_else(|| CatalogError::MissingData(format!("program {}", program_id)))
    }
}

#[async_trait]
impl ExternalCatalogClient for HttpCatalogClient {
    async fn programs_by_organization(
        &self,
        operator: &Operator,
    ) -> Result<Vec<CatalogEntry>, CatalogError> {
        let data: OrganizationData = self
            .query(
                operator,
                PROGRAMS_QUERY,
                json!({ "organization_id": operator.org_id }),
            )
            .await?;

        let programs = data
            .organization
            .ok_or_else(|| CatalogError::MissingData(format!("organization {}", operator.org_id)))?
            .programs
            .unwrap_or_default();

        tracing::debug!(org_id = %operator.org_id, count = programs.len(), "Fetched external programs");
        Ok(programs)
    }

    async fn subjects_by_program(
        &self,
        operator: &Operator,
        program_id: &str,
    ) -> Result<Vec<CatalogEntry>, CatalogError> {
        let node = self.program_node(operator, SUBJECTS_QUERY, program_id).await?;
        Ok(node.subjects.unwrap_or_default())
    }

    async fn categories_by_program(
        &self,
        operator: &Operator,
        program_id: &str,
    ) -> Result<Vec<CatalogEntry>, CatalogError> {
        let node = self
            .program_node(operator, CATEGORIES_QUERY, program_id)
            .await?;
        Ok(node.categories.unwrap_or_default())
    }

    async fn ages_by_program(
        &self,
        operator: &Operator,
        program_id: &str,
    ) -> Result<Vec<CatalogEntry>, CatalogError> {
        let node = self.program_node(operator, AGES_QUERY, program_id).await?;
        Ok(node.age_ranges.unwrap_or_default())
    }

    async fn grades_by_program(
        &self,
        operator: &Operator,
        program_id: &str,
    ) -> Result<Vec<CatalogEntry>, CatalogError> {
        let node = self.program_node(operator, GRADES_QUERY, program_id).await?;
        Ok(node.grades.unwrap_or_default())
    }

    async fn sub_categories_by_category(
        &self,
        operator: &Operator,
        category_id: &str,
    ) -> Result<Vec<CatalogEntry>, CatalogError> {
        let data: CategoryData = self
            .query(
                operator,
                SUB_CATEGORIES_QUERY,
                json!({ "category_id": category_id }),
            )
            .await?;

        Ok(data
            .category
            .ok_or_else(|| CatalogError::MissingData(format!("category {}", category_id)))?
            .subcategories
            .unwrap_or_default())
    }
}
