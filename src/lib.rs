//! Interaction and contact-form core of the portfolio site.
//!
//! The sensors ([`viewport`], [`pointer`], [`scroll`]) turn raw viewport
//! and pointer measurements into the state the UI animates from. The contact
//! flow runs [`validation`] on the client through [`form::ContactForm`] and
//! again on the server inside [`submission::SubmissionPipeline`], which owns
//! the only network call to the email provider.

pub mod config;
pub mod email;
#[cfg(not(target_arch = "wasm32"))]
pub mod emailjs;
pub mod form;
pub mod listener;
pub mod motion;
pub mod pointer;
pub mod scroll;
pub mod submission;
pub mod validation;
pub mod viewport;
