//! Application layer for Tidytrack.
//!
//! This crate provides the session use cases, the service facade the UI
//! drives, and the context object that wires adapters to them.

pub mod context;
pub mod session_service;
pub mod session_usecase;

#[cfg(test)]
mod test_support;

pub use context::AppContext;
pub use session_service::SessionService;
pub use session_usecase::SessionUseCase;
