use std::sync::Arc;

use crate::use_case_app_container::UseCaseAppContainer;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use in_memory_store::Repository;
use serde::Deserialize;
use use_cases::clock::SystemClock;
use use_cases::pricing::PricingConfig;
use use_cases::randomness::ThreadRngRandomness;
use use_cases::AppImpl;

mod authentication;
mod errors;
mod payment_gateway;
mod routes;
mod use_case_app_container;

#[derive(Deserialize)]
struct ServerSettings {
    host: String,
    port: u16,
}

#[derive(Deserialize)]
struct Settings {
    server: ServerSettings,
    pricing: PricingConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    shared_kernel::tracing::config_telemetry();

    let settings = shared_kernel::configuration::config::<Settings>()?;
    let repository = Repository::new();
    let pricing = settings.pricing.clone();

    HttpServer::new(move || {
        let app = AppImpl::new(
            repository.clone(),
            Arc::new(SystemClock),
            Arc::new(ThreadRngRandomness),
            Arc::new(payment_gateway::AutoApproveGateway),
            pricing.clone(),
        );
        let app_container = UseCaseAppContainer::new(app);
        App::new()
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(routes::config)
            .app_data(web::Data::new(app_container))
    })
    .bind((settings.server.host.as_str(), settings.server.port))?
    .run()
    .await
    .context("Server failed to run")
}
