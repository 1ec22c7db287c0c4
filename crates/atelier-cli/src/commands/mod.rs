//! Command handlers grouped by concern.

pub(crate) mod catalog;
pub(crate) mod moderation;
