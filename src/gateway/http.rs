use super::TaskGateway;
use crate::errors::{AppError, AppResult};
use crate::models::Task;
use crate::utils::date::format_date;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;

/// Gateway speaking the REST contract of the sync server.
pub struct HttpGateway {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct MessageBody {
    #[serde(default)]
    message: String,
}

impl HttpGateway {
    pub fn new(base_url: &str, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::GatewayUnreachable(format!("http client error: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn ensure_success(response: Response, what: &str) -> AppResult<Response> {
        if !response.status().is_success() {
            return Err(AppError::GatewayUnreachable(format!(
                "{what} returned status {}",
                response.status()
            )));
        }
        Ok(response)
    }

    async fn get_list(&self, url: String, what: &str) -> AppResult<Vec<Task>> {
        let response = self.client.get(&url).send().await?;
        let response = Self::ensure_success(response, what)?;
        Ok(response.json::<Vec<Task>>().await?)
    }

    /// Seed and clear answer with `{"message": "... N tasks ..."}`.
    fn count_from_message(message: &str) -> usize {
        message
            .split_whitespace()
            .find_map(|w| w.parse::<usize>().ok())
            .unwrap_or(0)
    }
}

#[async_trait]
impl TaskGateway for HttpGateway {
    fn name(&self) -> &str {
        "http"
    }

    async fn health(&self) -> AppResult<()> {
        let response = self.client.get(self.url("/health")).send().await?;
        Self::ensure_success(response, "health check")?;
        Ok(())
    }

    async fn fetch_by_date(&self, date: NaiveDate) -> AppResult<Vec<Task>> {
        let url = self.url(&format!("/api/tasks?date={}", format_date(&date)));
        self.get_list(url, "fetch by date").await
    }

    async fn fetch_by_id(&self, id: &str) -> AppResult<Option<Task>> {
        let response = self
            .client
            .get(self.url(&format!("/api/tasks/{id}")))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = Self::ensure_success(response, "fetch by id")?;
        Ok(Some(response.json::<Task>().await?))
    }

    async fn fetch_all(&self) -> AppResult<Vec<Task>> {
        self.get_list(self.url("/api/tasks"), "fetch all").await
    }

    async fn upsert(&self, task: &Task) -> AppResult<Task> {
        let response = self
            .client
            .post(self.url("/api/tasks"))
            .json(task)
            .send()
            .await?;
        let response = Self::ensure_success(response, "upsert")?;
        Ok(response.json::<Task>().await?)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let response = self
            .client
            .delete(self.url(&format!("/api/tasks/{id}")))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        Self::ensure_success(response, "delete")?;
        Ok(())
    }

    async fn clear(&self) -> AppResult<usize> {
        let response = self
            .client
            .delete(self.url("/api/tasks/clear"))
            .send()
            .await?;
        let response = Self::ensure_success(response, "clear")?;
        let body: MessageBody = response.json().await?;
        Ok(Self::count_from_message(&body.message))
    }

    async fn seed(&self) -> AppResult<usize> {
        let response = self
            .client
            .post(self.url("/api/tasks/seed"))
            .send()
            .await?;
        let response = Self::ensure_success(response, "seed")?;
        let body: MessageBody = response.json().await?;
        Ok(Self::count_from_message(&body.message))
    }
}
