use crate::task::{NewTask, Task, TaskId};
use async_trait::async_trait;
use reqwest::{Client, Method, Response, StatusCode, Url};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{method} {url} returned {status}")]
    Status {
        method: Method,
        url: Url,
        status: StatusCode,
    },
    #[error("invalid endpoint: {0}")]
    Endpoint(String),
}

/// The remote task store. Every failure is handed back to the caller as-is;
/// there is no retry and no caching behind this trait.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskApi: Send + Sync {
    async fn list(&self) -> Result<Vec<Task>, ClientError>;
    async fn create(&self, draft: &NewTask) -> Result<Task, ClientError>;
    async fn update(&self, id: &TaskId, task: &Task) -> Result<(), ClientError>;
    async fn delete(&self, id: &TaskId) -> Result<(), ClientError>;
}

pub struct TaskClient {
    client: Client,
    endpoint: Url,
}

impl TaskClient {
    /// Client for the collection at `{base}/tasks`.
    pub fn new(base: &Url) -> Result<Self, ClientError> {
        let mut endpoint = base.clone();
        endpoint
            .path_segments_mut()
            .map_err(|_| ClientError::Endpoint(base.to_string()))?
            .pop_if_empty()
            .push("tasks");
        Ok(Self {
            client: Client::new(),
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn task_url(&self, id: &TaskId) -> Result<Url, ClientError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::Endpoint(self.endpoint.to_string()))?
            .push(&id.to_string());
        Ok(url)
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<Response, ClientError> {
        debug!(%method, %url, "sending request");
        let mut request = self.client.request(method.clone(), url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }
        let res = request.send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                method,
                url,
                status,
            });
        }
        Ok(res)
    }
}

#[async_trait]
impl TaskApi for TaskClient {
    async fn list(&self) -> Result<Vec<Task>, ClientError> {
        let res = self
            .send::<()>(Method::GET, self.endpoint.clone(), None)
            .await?;
        let raw: Vec<Value> = res.json().await?;
        Ok(raw
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<Task>(value) {
                Ok(task) => Some(task),
                Err(err) => {
                    warn!(error = %err, "skipping undecodable task");
                    None
                }
            })
            .collect())
    }

    async fn create(&self, draft: &NewTask) -> Result<Task, ClientError> {
        let res = self
            .send(Method::POST, self.endpoint.clone(), Some(draft))
            .await?;
        Ok(res.json().await?)
    }

    async fn update(&self, id: &TaskId, task: &Task) -> Result<(), ClientError> {
        let url = self.task_url(id)?;
        self.send(Method::PUT, url, Some(task)).await?;
        Ok(())
    }

    async fn delete(&self, id: &TaskId) -> Result<(), ClientError> {
        let url = self.task_url(id)?;
        self.send::<()>(Method::DELETE, url, None).await?;
        Ok(())
    }
}
