use std::time::Duration;

use async_trait::async_trait;
use thirtyfour::error::WebDriverError;
use tokio::time::{sleep, Instant};

use crate::configuration::ReadinessSettings;

const FAR_FUTURE_SECS: u64 = 86_400 * 365 * 30;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Browser session failed: {0}")]
    Browser(#[from] WebDriverError),
    #[error("Page not ready: #{element_id} still visible after {timeout:?}")]
    PageNotReady {
        element_id: String,
        timeout: Duration,
    },
}

/// The subset of a browser automation session the fetcher needs.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<(), FetchError>;

    /// An element that is absent from the page counts as not visible.
    async fn is_element_visible(&self, element_id: &str) -> Result<bool, FetchError>;

    async fn current_markup(&self) -> Result<String, FetchError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Readiness {
    /// Poll until the loading indicator is gone, failing once `timeout` passes.
    WaitForInvisible {
        element_id: String,
        timeout: Duration,
        poll_interval: Duration,
    },
    /// Sleep unconditionally. Never fails, never verifies anything.
    FixedDelay(Duration),
}

impl From<&ReadinessSettings> for Readiness {
    fn from(settings: &ReadinessSettings) -> Self {
        match settings {
            ReadinessSettings::WaitForInvisible {
                element_id,
                timeout_secs,
                poll_interval_millis,
            } => Readiness::WaitForInvisible {
                element_id: element_id.clone(),
                timeout: Duration::from_secs(*timeout_secs),
                poll_interval: Duration::from_millis(*poll_interval_millis),
            },
            ReadinessSettings::FixedDelay { delay_secs } => {
                Readiness::FixedDelay(Duration::from_secs(*delay_secs))
            }
        }
    }
}

impl Readiness {
    pub async fn wait(&self, session: &impl BrowserSession) -> Result<(), FetchError> {
        match self {
            Readiness::WaitForInvisible {
                element_id,
                timeout,
                poll_interval,
            } => {
                let now = Instant::now();
                // Saturate to a far-future deadline for very large timeouts
                let deadline = now
                    .checked_add(*timeout)
                    .unwrap_or_else(|| now + Duration::from_secs(FAR_FUTURE_SECS));
                loop {
                    if !session.is_element_visible(element_id).await? {
                        return Ok(());
                    }
                    if Instant::now() >= deadline {
                        return Err(FetchError::PageNotReady {
                            element_id: element_id.clone(),
                            timeout: *timeout,
                        });
                    }
                    sleep(*poll_interval).await;
                }
            }
            Readiness::FixedDelay(delay) => {
                sleep(*delay).await;
                Ok(())
            }
        }
    }
}

/// Navigates to `url`, blocks until `readiness` is satisfied and returns the
/// rendered markup.
pub async fn fetch_page(
    session: &impl BrowserSession,
    url: &str,
    readiness: &Readiness,
) -> Result<String, FetchError> {
    session.navigate(url).await?;
    log::info!("Opened problem page: {}", url);

    readiness.wait(session).await?;
    log::info!("Page finished loading");

    session.current_markup().await
}
