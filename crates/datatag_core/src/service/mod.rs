//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate reconciliation, filtering and persistence into the
//!   add/submit annotation workflow.
//! - Keep CLI/UI layers decoupled from collaborator implementations.

pub mod session;
