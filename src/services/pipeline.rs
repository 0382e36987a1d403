use url::Url;

use crate::domain::ProblemRecord;

use super::{
    extract_problem, fetch_page, BrowserSession, DeliveryOutcome, ExtractError, FetchError,
    Readiness, WebhookClient,
};

/// Failures that abort a run before anything is delivered.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

#[derive(Debug)]
pub struct RunReport {
    pub record: ProblemRecord,
    pub outcome: DeliveryOutcome,
}

pub struct Pipeline<'a> {
    pub page_url: &'a str,
    pub origin: &'a Url,
    pub readiness: &'a Readiness,
    pub webhook: &'a WebhookClient,
}

impl Pipeline<'_> {
    /// Fetch, extract, deliver. Fetch and extraction failures propagate, a
    /// delivery failure is returned inside the report.
    pub async fn run(&self, session: &impl BrowserSession) -> Result<RunReport, PipelineError> {
        let markup = fetch_page(session, self.page_url, self.readiness).await?;
        let record = extract_problem(&markup, self.origin)?;

        let outcome = self.webhook.deliver(&record).await;
        log::info!("Webhook sent");

        Ok(RunReport { record, outcome })
    }
}
