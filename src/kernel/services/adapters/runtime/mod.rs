//! Async runtime adapter: executes data-service effects and sends messages back to the UI loop.

mod async_runtime;
mod message;

pub use async_runtime::AsyncRuntime;
pub use message::AppMessage;
