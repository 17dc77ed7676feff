//! HTTP client a display uses to reach the state holder.

use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use url::Url;

use super::wire::{
    AddRestIdeaRequest, AddTaskRequest, ErrorBody, FocusResponse, GardenResponse, IdeaResponse,
    PlantRequest, SetFocusRequest, StateResponse, TaskResponse, TimerControlRequest,
    TimerResponse, TimerSetRequest, ToggleDoneRequest,
};
use crate::error::SyncError;
use crate::storage::ClientConfig;
use crate::timer::{TimerAction, TimerMode};

pub struct SyncClient {
    http: Client,
    base: Url,
}

impl SyncClient {
    /// # Errors
    /// Returns an error if `base_url` is not a URL or the HTTP client cannot
    /// be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SyncError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, SyncError> {
        Self::new(
            &config.base_url,
            Duration::from_millis(config.request_timeout_ms),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, SyncError> {
        Ok(self.base.join(path)?)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, SyncError> {
        let url = self.endpoint(path)?;
        debug!(%url, "GET");
        let resp = self.http.get(url).query(query).send().await?;
        decode(resp).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, SyncError> {
        let url = self.endpoint(path)?;
        debug!(%url, "POST");
        let resp = self.http.post(url).json(body).send().await?;
        decode(resp).await
    }

    pub async fn health(&self) -> Result<serde_json::Value, SyncError> {
        self.get("health", &[]).await
    }

    /// Current snapshot and the events newer than `since`.
    pub async fn state(&self, since: u64) -> Result<StateResponse, SyncError> {
        self.get("api/state", &[("since", since.to_string())]).await
    }

    pub async fn add_task(&self, text: &str) -> Result<TaskResponse, SyncError> {
        let body = AddTaskRequest { text: text.into() };
        self.post("api/tasks", &body).await
    }

    pub async fn toggle_done(&self, id: &str) -> Result<TaskResponse, SyncError> {
        let body = ToggleDoneRequest { id: id.into() };
        self.post("api/tasks/toggle_done", &body).await
    }

    pub async fn set_focus(&self, task_id: &str) -> Result<FocusResponse, SyncError> {
        let body = SetFocusRequest {
            task_id: task_id.into(),
        };
        self.post("api/focus/set", &body).await
    }

    pub async fn timer_control(&self, action: TimerAction) -> Result<TimerResponse, SyncError> {
        self.post("api/timer/control", &TimerControlRequest { action })
            .await
    }

    pub async fn timer_set(
        &self,
        mode: TimerMode,
        duration_min: u32,
        bound_task_id: Option<String>,
    ) -> Result<TimerResponse, SyncError> {
        let body = TimerSetRequest {
            mode,
            duration_min,
            bound_task_id,
        };
        self.post("api/timer/set", &body).await
    }

    pub async fn plant(&self, task_id: Option<String>) -> Result<GardenResponse, SyncError> {
        self.post("api/garden/plant", &PlantRequest { task_id }).await
    }

    pub async fn rest_idea(&self) -> Result<IdeaResponse, SyncError> {
        self.get("api/rest-ideas/suggestion", &[]).await
    }

    pub async fn add_rest_idea(&self, text: &str) -> Result<IdeaResponse, SyncError> {
        let body = AddRestIdeaRequest { text: text.into() };
        self.post("api/rest-ideas", &body).await
    }
}

/// 2xx decodes as `T`; 4xx with an error body is a rejection; everything
/// else is transient.
async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, SyncError> {
    let status = resp.status();
    if status.is_success() {
        return resp
            .json::<T>()
            .await
            .map_err(|e| SyncError::Transient(format!("undecodable response body: {e}")));
    }
    if status.is_server_error() {
        return Err(SyncError::Transient(format!("server error {status}")));
    }
    match resp.json::<ErrorBody>().await {
        Ok(body) => Err(SyncError::Rejected {
            status: status.as_u16(),
            kind: body.error.kind,
            message: body.error.message,
        }),
        Err(e) => Err(SyncError::Transient(format!(
            "undecodable error body ({status}): {e}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_trailing_slash() {
        let client = SyncClient::new("http://127.0.0.1:8000/potato", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url().as_str(), "http://127.0.0.1:8000/potato/");
        assert_eq!(
            client.endpoint("api/state").unwrap().as_str(),
            "http://127.0.0.1:8000/potato/api/state"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(
            SyncClient::new("not a url", Duration::from_secs(1)),
            Err(SyncError::InvalidUrl(_))
        ));
    }
}
