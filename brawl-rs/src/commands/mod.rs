//! Command implementations for brawl-rs

pub mod anm;
