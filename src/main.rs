use crate::config::Config;
use crate::http_handler::HandlerDeps;
use crate::notifier::TelegramNotifier;
use http_handler::function_handler;
use lambda_http::{run, service_fn, tracing, Error};

mod config;
mod http_handler;
mod message;
mod notifier;
mod order;
mod utils;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();
    let config = Config::load()?;
    tracing::info!("Loaded configuration: {:?}", config);

    let http_client = reqwest::Client::builder()
        .timeout(config.timeout())
        .build()?;
    let notifier = match config.bot_token() {
        Ok(bot_token) => Some(TelegramNotifier::new(
            http_client,
            &config.telegram_api_base_url,
            bot_token,
        )),
        Err(e) => {
            tracing::warn!("{}, every order will be answered with 500", e);
            None
        }
    };
    let deps = HandlerDeps {
        chat_id: config.telegram_admin_chat_id.clone(),
        notifier,
    };

    run(service_fn(|event| function_handler(&deps, event))).await
}
