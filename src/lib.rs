//! Hex Rail Library
//!
//! Engine for a turn-based rail building and racing game on a hex map,
//! plus a basic bot that can play it headless.

pub mod bot;
pub mod game;
