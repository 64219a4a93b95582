pub mod app;
pub mod client;
pub mod config;
pub mod domain;
pub mod http;
pub mod infra;

use std::sync::Arc;

use crate::app::broker::Broker;
use crate::infra::{directory::UserDirectory, mailer::Mailer, store::NotificationStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn NotificationStore>,
    pub directory: Arc<dyn UserDirectory>,
    pub mailer: Arc<dyn Mailer>,
    pub broker: Arc<Broker>,
}
