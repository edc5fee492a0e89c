//! Torrent-side matching logic

pub mod seeding;

pub use seeding::{
    PathMapping, SeedIndex, SeedMatch, SeedMatchConfig, is_seeded, match_seeded, normalize_path,
};
