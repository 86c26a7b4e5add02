//! HTTP surface for the assistant.

pub mod assistant_http;

pub use assistant_http::{build_router, AssistantHttpConfig, AssistantHttpServer, ErrorResponse, USER_ID_HEADER};
