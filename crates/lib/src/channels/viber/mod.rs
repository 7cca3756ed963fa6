//! Viber channel driver: webhook ingestion, signature checks, event classification, and the
//! translation of outgoing messages into `send_message` bodies.

mod driver;
mod error;
mod event;
mod message;
mod outbound;
mod payload;
pub mod signature;
mod template;
mod user;

pub use driver::{BotIdentity, ViberConfig, ViberDriver, DRIVER_NAME, VIBER_API_BASE};
pub use error::DriverError;
pub use event::ViberEvent;
pub use message::{extract_message, Answer, ChatMessage};
pub use outbound::{build_outbound_payload, deep_merge};
pub use payload::{InboundPayload, SIGNATURE_HEADER};
pub use template::{
    ContactTemplate, FileTemplate, KeyboardButton, KeyboardTemplate, LinkTemplate,
    LocationTemplate, OutgoingMessage, PictureTemplate, VideoTemplate,
};
pub use user::User;
