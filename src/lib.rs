//! TrophyTroopa: random game picks from the RetroAchievements catalog and
//! Flashpoint collections, for the command line, a small web frontend and
//! Discord slash commands.

pub mod cache;
pub mod cli;
pub mod config;
pub mod context;
pub mod discord;
pub mod error;
pub mod flashpoint;
pub mod output;
pub mod retroachievements;
pub mod web;
