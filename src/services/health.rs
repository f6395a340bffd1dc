use crate::client::Client;
use crate::error::Result;
use crate::models::{HealthAntivirus, HealthQueue, HealthStatus, HealthTime};
use crate::request::Request;

/// Status checks for the server and its dependencies.
#[derive(Debug, Clone)]
pub struct Health {
    client: Client,
}

impl Health {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Check the HTTP server is up and responsive.
    pub async fn get(&self) -> Result<HealthStatus> {
        self.client.call_json(Request::get("/health")).await
    }

    pub async fn get_antivirus(&self) -> Result<HealthAntivirus> {
        self.client.call_json(Request::get("/health/anti-virus")).await
    }

    pub async fn get_cache(&self) -> Result<HealthStatus> {
        self.client.call_json(Request::get("/health/cache")).await
    }

    pub async fn get_db(&self) -> Result<HealthStatus> {
        self.client.call_json(Request::get("/health/db")).await
    }

    /// Certificates waiting to be issued.
    pub async fn get_queue_certificates(&self) -> Result<HealthQueue> {
        self.client
            .call_json(Request::get("/health/queue/certificates"))
            .await
    }

    pub async fn get_queue_functions(&self) -> Result<HealthQueue> {
        self.client
            .call_json(Request::get("/health/queue/functions"))
            .await
    }

    pub async fn get_queue_logs(&self) -> Result<HealthQueue> {
        self.client.call_json(Request::get("/health/queue/logs")).await
    }

    pub async fn get_queue_usage(&self) -> Result<HealthQueue> {
        self.client.call_json(Request::get("/health/queue/usage")).await
    }

    pub async fn get_queue_webhooks(&self) -> Result<HealthQueue> {
        self.client
            .call_json(Request::get("/health/queue/webhooks"))
            .await
    }

    pub async fn get_storage_local(&self) -> Result<HealthStatus> {
        self.client
            .call_json(Request::get("/health/storage/local"))
            .await
    }

    /// Compare the server clock against an NTP source.
    pub async fn get_time(&self) -> Result<HealthTime> {
        self.client.call_json(Request::get("/health/time")).await
    }
}
