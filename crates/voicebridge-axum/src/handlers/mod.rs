//! HTTP request handlers for the voice edge. Each submodule owns one
//! endpoint family; handlers are thin wrappers delegating to the shared
//! `AxumContext` services.

pub mod conversation;
pub mod health;
pub mod reset;
pub mod side_channel;
