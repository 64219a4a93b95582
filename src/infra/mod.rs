pub mod db;
pub mod directory;
pub mod mailer;
pub mod memory;
pub mod postgres;
pub mod store;
