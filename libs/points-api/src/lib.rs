pub mod broker;
pub mod error;
pub mod event;
pub mod handler;
pub mod history;
pub mod model;
pub mod record;
pub mod store;
