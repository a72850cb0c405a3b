// src/discord/mod.rs
mod client;
mod events;
pub mod attachment;
pub mod commands;
pub mod errors;
pub mod icon;
pub mod resolver;
pub mod roles;
#[cfg(test)]
pub(crate) mod testing;
pub use client::DiscordClient;
pub use commands::role_icon::{Reply, RoleIconDispatcher, RoleIconInvocation, RoleIconRequest};
pub use icon::{IconClassifier, IconSpec};
pub use resolver::RoleIconResolver;
pub use roles::{RoleDirectory, SerenityRoleDirectory};
