use std::{fmt::Debug, future::Future};

use serde_json::Value;
use thirtyfour::error::WebDriverError;
use url::Url;

use crate::{
    configuration::Settings,
    services::{
        BrowserSession, Droid, Pipeline, PipelineError, Readiness, RunReport, WebhookClient,
    },
};

pub const TRIGGER_EVENT_VAR: &str = "APP_TRIGGER_EVENT";

#[derive(Debug, thiserror::Error)]
pub enum InvocationError {
    #[error("Invalid page origin: {0}")]
    Origin(#[from] url::ParseError),
    #[error("Failed to build webhook client: {0}")]
    WebhookClient(#[from] reqwest::Error),
    #[error("Failed to open browser session: {0}")]
    Browser(#[from] WebDriverError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Runs the pipeline on `session`, then hands the session to `release`
/// whatever the pipeline returned. A failed release is logged and does not
/// replace the pipeline result.
pub async fn run_with_session<S, R, Fut, E>(
    session: S,
    release: R,
    pipeline: &Pipeline<'_>,
) -> Result<RunReport, PipelineError>
where
    S: BrowserSession,
    R: FnOnce(S) -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: Debug,
{
    let result = pipeline.run(&session).await;

    if let Err(e) = release(session).await {
        log::warn!("Failed to close browser session: {:?}", e);
    }

    result
}

/// One complete invocation: acquire a browser session, run the pipeline,
/// release the session.
pub async fn run_once(settings: &Settings) -> Result<RunReport, InvocationError> {
    let origin = Url::parse(&settings.page.origin)?;
    let readiness = Readiness::from(&settings.page.readiness);
    let webhook = WebhookClient::new(&settings.webhook)?;
    let pipeline = Pipeline {
        page_url: &settings.page.url,
        origin: &origin,
        readiness: &readiness,
        webhook: &webhook,
    };

    let droid = Droid::launch(&settings.browser).await?;

    Ok(run_with_session(droid, Droid::quit, &pipeline).await?)
}

/// Entry point for trigger-driven deployments. The event payload carries
/// nothing the pipeline uses.
pub async fn handle_trigger(
    event: Value,
    settings: &Settings,
) -> Result<RunReport, InvocationError> {
    log::debug!("Ignoring trigger event: {}", event);
    run_once(settings).await
}

/// Decodes the trigger event handed over in `APP_TRIGGER_EVENT`. Missing or
/// blank means no event; text that is not JSON is kept as a JSON string.
pub fn trigger_event(raw: Option<String>) -> Value {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Value::Null,
        Some(raw) => serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string())),
    }
}
