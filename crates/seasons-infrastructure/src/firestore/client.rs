//! Authenticated access to the Firestore REST documents API.

use std::sync::Arc;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use seasons_core::config::BackendConfig;
use seasons_core::error::{Result, SeasonsError};
use seasons_core::identity::IdentityProvider;

use super::document::Document;

const FIRESTORE_API: &str = "https://firestore.googleapis.com/v1";

/// Whether a request reads or writes; decides the error variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Read,
    Write,
}

impl Access {
    fn error(self, message: String) -> SeasonsError {
        match self {
            Access::Read => SeasonsError::Query(message),
            Access::Write => SeasonsError::Write(message),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RunQueryItem {
    #[serde(default)]
    document: Option<Document>,
}

/// Thin Firestore REST client scoped to one project.
///
/// Requests carry the project API key and, when the identity provider has
/// one, the signed-in user's bearer token so security rules apply.
#[derive(Clone)]
pub struct FirestoreClient {
    http: Client,
    documents_url: String,
    api_key: String,
    identity: Option<Arc<dyn IdentityProvider>>,
}

impl FirestoreClient {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        config.ensure_complete()?;
        Ok(Self::with_base_url(
            format!(
                "{}/projects/{}/databases/(default)/documents",
                FIRESTORE_API, config.project_id
            ),
            config.api_key.clone(),
        ))
    }

    /// Points the client at an arbitrary documents root (emulators).
    pub fn with_base_url(documents_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            documents_url: documents_url.into(),
            api_key: api_key.into(),
            identity: None,
        }
    }

    /// Attaches the provider whose ID token authorizes each request.
    pub fn with_identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = Some(identity);
        self
    }

    async fn authorize(&self, request: RequestBuilder, access: Access) -> Result<RequestBuilder> {
        let request = request.query(&[("key", self.api_key.as_str())]);
        let token = match &self.identity {
            Some(identity) => identity
                .id_token()
                .await
                .map_err(|e| access.error(format!("could not obtain ID token: {}", e)))?,
            None => None,
        };
        Ok(match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        })
    }

    async fn send(&self, request: RequestBuilder, access: Access) -> Result<Response> {
        let response = self
            .authorize(request, access)
            .await?
            .send()
            .await
            .map_err(|e| access.error(format!("transport failure: {}", e)))?;
        Ok(response)
    }

    async fn expect_success(response: Response, access: Access) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(access.error(format!("Firestore returned {}: {}", status, body.trim())))
    }

    /// Runs a structured query against the documents root.
    pub async fn run_query(&self, structured_query: Value) -> Result<Vec<Document>> {
        let url = format!("{}:runQuery", self.documents_url);
        let request = self
            .http
            .post(url)
            .json(&json!({ "structuredQuery": structured_query }));

        let response = self.send(request, Access::Read).await?;
        let response = Self::expect_success(response, Access::Read).await?;
        let items: Vec<RunQueryItem> = response
            .json()
            .await
            .map_err(|e| SeasonsError::query(format!("malformed query response: {}", e)))?;

        Ok(items.into_iter().filter_map(|item| item.document).collect())
    }

    /// Fetches `collection/id`; `Ok(None)` when the document does not exist.
    pub async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let url = format!("{}/{}/{}", self.documents_url, collection, id);
        let response = self.send(self.http.get(url), Access::Read).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = Self::expect_success(response, Access::Read).await?;
        let document = response
            .json()
            .await
            .map_err(|e| SeasonsError::query(format!("malformed document: {}", e)))?;
        Ok(Some(document))
    }

    /// Creates a document with a store-assigned id.
    pub async fn create_document(
        &self,
        collection: &str,
        fields: Map<String, Value>,
    ) -> Result<Document> {
        let url = format!("{}/{}", self.documents_url, collection);
        let request = self.http.post(url).json(&Document::with_fields(fields));
        let response = self.send(request, Access::Write).await?;
        let response = Self::expect_success(response, Access::Write).await?;
        response
            .json()
            .await
            .map_err(|e| SeasonsError::write(format!("malformed create response: {}", e)))
    }

    /// Writes exactly the fields named in `mask`.
    ///
    /// With `must_exist` the write fails instead of creating the document.
    pub async fn patch_document(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
        mask: &[&str],
        must_exist: bool,
    ) -> Result<()> {
        let url = format!("{}/{}/{}", self.documents_url, collection, id);
        let mut params: Vec<(&str, &str)> = mask
            .iter()
            .map(|field| ("updateMask.fieldPaths", *field))
            .collect();
        if must_exist {
            params.push(("currentDocument.exists", "true"));
        }

        let request = self
            .http
            .patch(url)
            .query(&params)
            .json(&Document::with_fields(fields));
        let response = self.send(request, Access::Write).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(SeasonsError::write(format!(
                "{}/{} does not exist",
                collection, id
            )));
        }
        Self::expect_success(response, Access::Write).await?;
        Ok(())
    }
}
