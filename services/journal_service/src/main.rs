mod assignment;
mod context;
mod ddb_interop;
mod group;
mod journal;
mod operations;
mod report;
mod routes;
mod session;
#[cfg(test)]
mod testing;
mod uploads;
mod user_account;

use actix_web::{web, App, HttpServer};
pub(crate) use context::Context;
use service_core::telemetry::{init_subscriber, make_subscriber};
use tracing_actix_web::TracingLogger;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let subscriber = make_subscriber("journal_service", "info");
    init_subscriber(subscriber);

    let ctx = web::Data::new(Context::from_env().await);
    let bind_address = ctx.bind_address.clone();
    let max_payload_bytes = ctx.max_payload_bytes;
    log::info!("Starting journal_service on {}.", &bind_address);

    HttpServer::new(move || {
        App::new()
            .app_data(ctx.clone())
            .app_data(web::PayloadConfig::new(max_payload_bytes))
            .app_data(web::JsonConfig::default().limit(max_payload_bytes))
            .wrap(TracingLogger::default())
            .configure(routes::configure_service)
    })
    .bind(bind_address)?
    .run()
    .await
}
