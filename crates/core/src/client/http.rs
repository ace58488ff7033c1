//! reqwest-backed ticket service client.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::{ClientError, TicketService};
use crate::config::ClientConfig;
use crate::ticket::{Priority, Ticket, TicketDraft, TicketPatch};

/// Error body returned by the service.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Talks to the ticket REST API under `{base_url}/api/tickets`.
#[derive(Debug, Clone)]
pub struct HttpTicketService {
    client: Client,
    base_url: String,
}

impl HttpTicketService {
    /// Create a client for the service at `base_url` (e.g. `http://localhost:5000`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Create a client from configuration.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.base_url.trim())
    }

    /// Create a client reusing an existing reqwest client.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Get the base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn tickets_url(&self) -> String {
        format!("{}/api/tickets", self.base_url)
    }

    fn ticket_url(&self, id: &str) -> String {
        format!("{}/api/tickets/{}", self.base_url, urlencoding::encode(id))
    }

    /// Send a request, turning transport failures and non-2xx answers into errors.
    async fn send(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or_else(|_| body.chars().take(200).collect());

        Err(ClientError::Service {
            status: status.as_u16(),
            message,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let status = response.status().as_u16();
        response.json::<T>().await.map_err(|e| ClientError::Service {
            status,
            message: format!("invalid response body: {}", e),
        })
    }
}

#[async_trait]
impl TicketService for HttpTicketService {
    async fn list_tickets(&self) -> Result<Vec<Ticket>, ClientError> {
        let response = self.send(self.client.get(self.tickets_url())).await?;
        let tickets: Vec<Ticket> = Self::decode(response).await?;
        debug!(count = tickets.len(), "Fetched tickets");
        Ok(tickets)
    }

    async fn create_ticket(&self, draft: &TicketDraft) -> Result<Ticket, ClientError> {
        let response = self
            .send(self.client.post(self.tickets_url()).json(draft))
            .await?;
        Self::decode(response).await
    }

    async fn delete_ticket(&self, id: &str) -> Result<(), ClientError> {
        self.send(self.client.delete(self.ticket_url(id))).await?;
        Ok(())
    }

    async fn update_ticket_priority(
        &self,
        id: &str,
        priority: Priority,
    ) -> Result<Ticket, ClientError> {
        let response = self
            .send(
                self.client
                    .patch(self.ticket_url(id))
                    .json(&TicketPatch::priority(priority)),
            )
            .await?;
        Self::decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_strip_trailing_slash() {
        let service = HttpTicketService::new("http://localhost:5000/");
        assert_eq!(service.base_url(), "http://localhost:5000");
        assert_eq!(service.tickets_url(), "http://localhost:5000/api/tickets");
    }

    #[test]
    fn test_from_config_trims_base_url() {
        let config = ClientConfig {
            base_url: " http://tickets.internal:8080/ ".to_string(),
        };
        let service = HttpTicketService::from_config(&config);
        assert_eq!(service.base_url(), "http://tickets.internal:8080");
        assert_eq!(
            service.tickets_url(),
            "http://tickets.internal:8080/api/tickets"
        );
    }

    #[test]
    fn test_ticket_url_encodes_id() {
        let service = HttpTicketService::new("http://localhost:5000");
        assert_eq!(
            service.ticket_url("a b/c"),
            "http://localhost:5000/api/tickets/a%20b%2Fc"
        );
    }

    #[tokio::test]
    async fn test_unreachable_service_is_network_error() {
        // Port 9 (discard) on localhost is not expected to accept HTTP
        let service = HttpTicketService::new("http://127.0.0.1:9");
        let result = service.list_tickets().await;
        assert!(matches!(result, Err(ClientError::Network(_))));
        assert_eq!(result.unwrap_err().status(), None);
    }
}
