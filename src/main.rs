use anyhow::Context;
use env_logger::Env;
use herald::{
    configuration::{get_configuration, Environment},
    services::DeliveryOutcome,
    startup::{handle_trigger, run_once, trigger_event, TRIGGER_EVENT_VAR},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let configuration = get_configuration().context("Failed to read configuration.")?;

    let report = match Environment::current()? {
        Environment::Local => run_once(&configuration).await?,
        Environment::Serverless => {
            let event = trigger_event(std::env::var(TRIGGER_EVENT_VAR).ok());
            handle_trigger(event, &configuration).await?
        }
    };

    // Delivery failures are already logged by the dispatcher and do not fail the run
    match report.outcome {
        DeliveryOutcome::Delivered { status } => log::info!(
            "Delivered \"{}\" ({}) with status {}",
            report.record.name,
            report.record.difficulty,
            status
        ),
        DeliveryOutcome::Failed { kind, .. } => log::warn!(
            "\"{}\" was not delivered ({})",
            report.record.name,
            kind
        ),
    }

    Ok(())
}
