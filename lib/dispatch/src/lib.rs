//! Update dispatch for the voice-relay service.
//!
//! This crate provides:
//!
//! - **Classifier**: [`classify`] maps a webhook update to an [`Intent`]
//! - **Command table**: slash commands, callback payloads and their menus
//! - **Controller**: [`Relay`], the conversation pipeline behind
//!   [`Relay::handle_inbound_update`]
//! - **Delivery ledger**: drops webhook redeliveries by `update_id`

pub mod command;
pub mod controller;
pub mod dedup;
pub mod error;
pub mod intent;
pub mod replies;

pub use command::{Callback, Command, depth_menu, main_menu};
pub use controller::{Collaborators, InboundOutcome, Relay};
pub use dedup::DeliveryLedger;
pub use error::DispatchError;
pub use intent::{Intent, classify};
pub use replies::Replies;
