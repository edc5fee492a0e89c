//! Track Auditor - default audio/subtitle track enforcement for anime libraries
//!
//! Audits the Matroska episode files Sonarr knows about and makes Japanese
//! audio plus English subtitles the default tracks, leaving files that
//! Transmission is seeding untouched.

pub mod app;
pub mod cli;
pub mod config;
pub mod jobs;
pub mod media;
pub mod services;
pub mod torrent;
