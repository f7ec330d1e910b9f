pub mod config;
pub mod logging;

pub mod http;
pub mod notify;
pub mod poller;
pub mod remote;
pub mod state;
