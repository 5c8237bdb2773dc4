//! Conversation state for the voice-relay service.
//!
//! This crate provides:
//!
//! - **History Store**: per-chat bounded log of user/assistant turns
//! - **Context Policy**: per-chat number of prior turns replayed to the model
//! - **Chat locks**: per-chat serialization of read-modify-write pipelines
//!
//! Both stores are traits so the dispatcher can be handed an in-memory
//! implementation or an external key-value backend.

pub mod context;
pub mod conversation;
pub mod error;
pub mod history;
pub mod lock;
pub mod memory;
pub mod message;

pub use context::ContextPolicy;
pub use conversation::{CHAT_MAX_NUM, Conversation, context_messages};
pub use error::StoreError;
pub use history::HistoryStore;
pub use lock::ChatLocks;
pub use memory::InMemoryConversationStore;
pub use message::{Message, MessageRole, Turn};
