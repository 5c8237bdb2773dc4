//! Core domain types and utilities for the voice-relay service.
//!
//! This crate provides the identifiers and error handling foundation
//! shared by the conversation store, the collaborator clients, and the
//! update dispatcher.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{CallbackId, ChatId, FileId, ParseIdError, RequestId, UpdateId};
