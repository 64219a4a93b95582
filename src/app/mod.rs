pub mod broker;
pub mod dispatch;
