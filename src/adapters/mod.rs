//! Adapters - Concrete implementations of the ports, plus the HTTP surface.

pub mod http;
pub mod reqwest_client;

pub use reqwest_client::ReqwestClient;
