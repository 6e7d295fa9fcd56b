//! Collaborator implementations: REST transport, token storage and in-memory doubles.

pub mod http;
pub mod in_memory;
pub mod token;
