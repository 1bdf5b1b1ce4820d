#![doc = include_str!("../README.md")]

pub mod api;
pub mod client;
pub mod clock;
pub mod config;
pub mod error;
pub mod gateway;
pub mod outcome;
pub mod pipeline;
pub mod session;
pub mod transport;
pub mod types;
pub mod validation;

#[cfg(test)]
mod test_support;

// Re-exports for convenient access
pub use api::{ApiRequest, ApiResponse, Method};
pub use client::ApiClient;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::ClientConfig;
pub use error::Error;
pub use gateway::{Ack, AuthGateway, OtpCooldown};
pub use outcome::{AuthError, ErrorKind, FieldErrors, Outcome};
pub use pipeline::{Authorization, RequestPipeline, is_public_path};
pub use session::{
    FileSessionStore, MemorySessionStore, Session, SessionEvents, SessionState, SessionStore,
    is_access_token_valid,
};
#[cfg(feature = "http")]
pub use transport::ReqwestTransport;
pub use transport::{Transport, TransportError};
pub use types::{AccessToken, EpochMillis, RefreshToken};
