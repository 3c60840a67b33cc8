// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Outbound webhook notifications.
//!
//! Delivery is best effort: callers log and report failures but never undo
//! the write that triggered the notification.

use sst_api::TrainingScheduledEvent;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Path appended to the webhook base URL for scheduled trainings.
pub const TRAINING_SCHEDULED_PATH: &str = "capacitacion-programada";

/// Webhook delivery errors.
#[derive(Debug, Error)]
pub enum NotifierError {
    /// The HTTP client could not be built.
    #[error("Failed to build webhook client: {0}")]
    Client(#[source] reqwest::Error),
    /// The request failed or timed out.
    #[error("Webhook request to {url} failed: {source}")]
    Request {
        /// The target URL.
        url: String,
        /// The underlying error.
        #[source]
        source: reqwest::Error,
    },
    /// The webhook answered with a non-success status.
    #[error("Webhook {url} answered {status}")]
    Status {
        /// The target URL.
        url: String,
        /// The status received.
        status: reqwest::StatusCode,
    },
}

/// Posts domain events to an external automation webhook.
#[derive(Debug, Clone)]
pub struct Notifier {
    client: reqwest::Client,
    base_url: String,
}

impl Notifier {
    /// Creates a notifier for `base_url` with a bounded request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, NotifierError> {
        let client: reqwest::Client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(NotifierError::Client)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Returns the URL scheduled-training events are posted to.
    #[must_use]
    pub fn training_scheduled_url(&self) -> String {
        format!("{}/{TRAINING_SCHEDULED_PATH}", self.base_url)
    }

    /// Announces a newly scheduled training.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, times out, or is answered
    /// with a non-success status.
    pub async fn training_scheduled(
        &self,
        event: &TrainingScheduledEvent,
    ) -> Result<(), NotifierError> {
        let url: String = self.training_scheduled_url();
        debug!(url = %url, training_id = event.capacitacion_id, "Posting training event");

        let response: reqwest::Response = self
            .client
            .post(&url)
            .json(event)
            .send()
            .await
            .map_err(|source| NotifierError::Request {
                url: url.clone(),
                source,
            })?;

        let status: reqwest::StatusCode = response.status();
        if !status.is_success() {
            return Err(NotifierError::Status { url, status });
        }

        info!(training_id = event.capacitacion_id, "Training event delivered");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
    use tokio::sync::mpsc;

    fn sample_event() -> TrainingScheduledEvent {
        TrainingScheduledEvent {
            capacitacion_id: 7,
            codigo: String::from("CAP-001"),
            tema: String::from("Uso de extintores"),
            fecha: String::from("2026-02-15T09:00:00"),
            area: String::from("Producción, Almacén"),
        }
    }

    async fn receive(
        State(tx): State<mpsc::Sender<TrainingScheduledEvent>>,
        Json(event): Json<TrainingScheduledEvent>,
    ) -> StatusCode {
        tx.send(event).await.unwrap();
        StatusCode::OK
    }

    #[test]
    fn test_url_joins_base_without_double_slash() {
        let notifier: Notifier =
            Notifier::new("http://hooks.local/webhook/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            notifier.training_scheduled_url(),
            "http://hooks.local/webhook/capacitacion-programada"
        );
    }

    #[tokio::test]
    async fn test_training_scheduled_posts_event() {
        let (tx, mut rx) = mpsc::channel::<TrainingScheduledEvent>(1);
        let app: Router = Router::new()
            .route("/capacitacion-programada", post(receive))
            .with_state(tx);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let notifier: Notifier =
            Notifier::new(&format!("http://{addr}"), Duration::from_secs(5)).unwrap();
        notifier.training_scheduled(&sample_event()).await.unwrap();

        assert_eq!(rx.recv().await.unwrap(), sample_event());
    }

    #[tokio::test]
    async fn test_unreachable_webhook_is_an_error() {
        let notifier: Notifier =
            Notifier::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
        let result = notifier.training_scheduled(&sample_event()).await;
        assert!(matches!(result, Err(NotifierError::Request { .. })));
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let app: Router = Router::new().route(
            "/capacitacion-programada",
            post(|| async { StatusCode::SERVICE_UNAVAILABLE }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let notifier: Notifier =
            Notifier::new(&format!("http://{addr}"), Duration::from_secs(5)).unwrap();
        match notifier.training_scheduled(&sample_event()).await {
            Err(NotifierError::Status { status, .. }) => {
                assert_eq!(status, reqwest::StatusCode::SERVICE_UNAVAILABLE);
            }
            other => panic!("expected Status error, got {other:?}"),
        }
    }
}
