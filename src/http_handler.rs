use crate::config::{ChatId, ConfigurationError};
use crate::message::build_order_notification;
use crate::notifier::{Notifier, SendMessage};
use crate::order::Order;
use crate::utils::{error_response, json_response, preflight_response};
use lambda_http::{
    http::{Method, StatusCode},
    Error, IntoResponse, Request, Response,
};
use serde::Serialize;

const ORDER_SENT: &str = "Заказ отправлен";

#[derive(Serialize)]
struct OrderSentResponse {
    success: bool,
    message: &'static str,
}

/// `notifier` is `None` when no bot token was configured at startup.
pub(crate) struct HandlerDeps<N: Notifier> {
    pub chat_id: ChatId,
    pub notifier: Option<N>,
}

#[tracing::instrument(skip(deps, event), fields(method = %event.method()))]
pub(crate) async fn function_handler<N: Notifier>(
    deps: &HandlerDeps<N>,
    event: Request,
) -> Result<impl IntoResponse, Error> {
    match *event.method() {
        Method::OPTIONS => preflight_response(),
        Method::POST => send_order(deps, event.body().as_ref()).await,
        _ => error_response(&StatusCode::METHOD_NOT_ALLOWED, "Method not allowed"),
    }
}

async fn send_order<N: Notifier>(
    deps: &HandlerDeps<N>,
    body: &[u8],
) -> Result<Response<String>, Error> {
    let Some(notifier) = &deps.notifier else {
        tracing::error!("TELEGRAM_BOT_TOKEN is not set, cannot forward order");
        return error_response(
            &StatusCode::INTERNAL_SERVER_ERROR,
            ConfigurationError::MissingBotToken,
        );
    };

    let order = match Order::from_body(body) {
        Ok(order) => order,
        Err(e) => {
            tracing::warn!("Rejecting order: {}", e);
            return error_response(&StatusCode::BAD_REQUEST, e);
        }
    };
    tracing::info!(items = order.items().len(), "Forwarding order to Telegram");

    let message = SendMessage::html(deps.chat_id.clone(), build_order_notification(&order));
    match notifier.send_message(&message).await {
        Ok(()) => json_response(
            &StatusCode::OK,
            &OrderSentResponse {
                success: true,
                message: ORDER_SENT,
            },
        ),
        Err(e) => {
            tracing::error!("Failed to deliver order notification: {:?}", e);
            error_response(&StatusCode::INTERNAL_SERVER_ERROR, e)
        }
    }
}
