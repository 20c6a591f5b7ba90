//! Strongly-typed views over collection documents.
//!
//! Only the fields the API itself inspects get real types (`email`, `role`,
//! `status`); everything else rides along in a flattened [`Document`].
//!
//! [`Document`]: crate::database::Document

pub mod order;
pub mod review;
pub mod user;
pub mod watch;

pub use order::{Order, StatusUpdate};
pub use review::Review;
pub use user::{AdminPromotion, AdminStatus, Role, User};
pub use watch::Watch;
