//! Clients for the services the walk tracker depends on: Open-Meteo for the current temperature and the Telegram Bot
//! API for walk status messages.
use thiserror::Error;

mod open_meteo;
mod telegram;

pub use open_meteo::OpenMeteoClient;
pub use telegram::TelegramClient;

#[derive(Debug, Clone, Error)]
pub enum IntegrationError {
    #[error("Could not initialize the client. {0}")]
    Initialization(String),
    #[error("The request could not be completed. {0}")]
    RequestError(String),
    #[error("The response could not be read. {0}")]
    JsonError(String),
    #[error("The service rejected the request with status {status}. {message}")]
    QueryError { status: u16, message: String },
}
