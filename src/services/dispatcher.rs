use std::fmt;

use reqwest::{Client, StatusCode};

use crate::{configuration::WebhookSettings, domain::ProblemRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryFailureKind {
    HttpStatus,
    Connection,
    Timeout,
    Generic,
}

impl DeliveryFailureKind {
    pub fn label(&self) -> &'static str {
        match self {
            DeliveryFailureKind::HttpStatus => "HttpStatusError",
            DeliveryFailureKind::Connection => "ConnectionError",
            DeliveryFailureKind::Timeout => "TimeoutError",
            DeliveryFailureKind::Generic => "GenericRequestError",
        }
    }

    fn classify(e: &reqwest::Error) -> Self {
        if e.is_status() {
            DeliveryFailureKind::HttpStatus
        } else if e.is_timeout() {
            DeliveryFailureKind::Timeout
        } else if e.is_connect() {
            DeliveryFailureKind::Connection
        } else {
            DeliveryFailureKind::Generic
        }
    }
}

impl fmt::Display for DeliveryFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of the single webhook attempt. Delivery failures are not fatal to
/// a run, so they are reported here rather than as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered { status: StatusCode },
    Failed {
        kind: DeliveryFailureKind,
        reason: String,
    },
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered { .. })
    }
}

pub struct WebhookClient {
    client: Client,
    url: String,
}

impl WebhookClient {
    pub fn new(settings: &WebhookSettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(settings.timeout()).build()?;

        Ok(WebhookClient {
            client,
            url: settings.url.clone(),
        })
    }

    /// Posts `record` as JSON exactly once. No retry.
    pub async fn deliver(&self, record: &ProblemRecord) -> DeliveryOutcome {
        let result = match self.client.post(&self.url).json(record).send().await {
            Ok(res) => res.error_for_status(),
            Err(e) => Err(e),
        };

        match result {
            Ok(res) => DeliveryOutcome::Delivered {
                status: res.status(),
            },
            Err(e) => {
                let kind = DeliveryFailureKind::classify(&e);
                // The webhook url is a credential, keep it out of the logs
                let reason = e.without_url().to_string();
                log::error!("{}: {}", kind, reason);

                DeliveryOutcome::Failed { kind, reason }
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use reqwest::StatusCode;

    use crate::{configuration::WebhookSettings, domain::ProblemRecord};

    use super::{mock_webhook, DeliveryFailureKind, DeliveryOutcome, WebhookClient};

    fn two_sum() -> ProblemRecord {
        ProblemRecord {
            name: "Two Sum".to_string(),
            url: "https://leetcode.com/problems/two-sum/".to_string(),
            difficulty: "Easy".to_string(),
        }
    }

    fn client(url: String, timeout_secs: u64) -> WebhookClient {
        WebhookClient::new(&WebhookSettings { url, timeout_secs }).unwrap()
    }

    #[tokio::test]
    async fn posts_record_as_json() {
        let webhook = mock_webhook::spawn(200);

        let outcome = client(webhook.url(), 5).deliver(&two_sum()).await;

        assert_eq!(
            outcome,
            DeliveryOutcome::Delivered {
                status: StatusCode::OK
            }
        );
        let received = webhook.received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(
            received[0].content_type.as_deref(),
            Some("application/json")
        );
        let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
        assert_eq!(body["questionName"], "Two Sum");
        assert_eq!(body["questionUrl"], "https://leetcode.com/problems/two-sum/");
        assert_eq!(body["questionDifficulty"], "Easy");
        assert_eq!(body.as_object().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn server_error_is_http_status_failure() {
        let webhook = mock_webhook::spawn(500);

        let outcome = client(webhook.url(), 5).deliver(&two_sum()).await;

        match outcome {
            DeliveryOutcome::Failed { kind, reason } => {
                assert_eq!(kind, DeliveryFailureKind::HttpStatus);
                assert!(reason.contains("500"));
                assert!(!reason.contains("127.0.0.1"));
            }
            other => panic!("expected a failed delivery, got {:?}", other),
        }
        assert_eq!(webhook.received_count(), 1);
    }

    #[tokio::test]
    async fn refused_connection_is_connection_failure() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let outcome = client(format!("http://127.0.0.1:{}/webhook", port), 5)
            .deliver(&two_sum())
            .await;

        assert!(matches!(
            outcome,
            DeliveryOutcome::Failed {
                kind: DeliveryFailureKind::Connection,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn slow_endpoint_is_timeout_failure() {
        let webhook = mock_webhook::spawn(200);
        let mut client = client(webhook.slow_url(), 1);
        client.client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(200))
            .build()
            .unwrap();

        let outcome = client.deliver(&two_sum()).await;

        assert!(matches!(
            outcome,
            DeliveryOutcome::Failed {
                kind: DeliveryFailureKind::Timeout,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn unbuildable_request_is_generic_failure() {
        let outcome = client("not a url".to_string(), 5)
            .deliver(&two_sum())
            .await;

        assert!(matches!(
            outcome,
            DeliveryOutcome::Failed {
                kind: DeliveryFailureKind::Generic,
                ..
            }
        ));
    }

    #[test]
    fn labels_match_failure_categories() {
        assert_eq!(DeliveryFailureKind::HttpStatus.to_string(), "HttpStatusError");
        assert_eq!(DeliveryFailureKind::Connection.to_string(), "ConnectionError");
        assert_eq!(DeliveryFailureKind::Timeout.to_string(), "TimeoutError");
        assert_eq!(DeliveryFailureKind::Generic.to_string(), "GenericRequestError");
    }
}
