pub mod client;
pub mod error;
pub mod http;
pub mod protocol;
pub mod transport;

pub use client::ChatClient;
pub use transport::ServerEndpoint;
