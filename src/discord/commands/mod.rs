// src/discord/commands/mod.rs
pub mod role_icon;
