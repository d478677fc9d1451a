//! External delivery channels for notifications.
//!
//! Only SMTP email is supported.

pub mod email;
