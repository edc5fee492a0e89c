//! Minimal CLI parsing for run overrides.

use std::env;

use crate::config::Config;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct CliOptions {
    pub run_once: bool,
    pub dry_run: bool,
}

impl CliOptions {
    pub fn from_args() -> Self {
        Self::parse(env::args().skip(1))
    }

    pub fn parse<I>(args: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut options = CliOptions::default();
        for arg in args {
            match arg.as_ref() {
                "--once" => options.run_once = true,
                "--dry-run" => options.dry_run = true,
                _ => {}
            }
        }
        options
    }

    /// Flags only switch behaviour on; they never turn off what the env enabled
    pub fn apply(&self, config: &mut Config) {
        config.run_once |= self.run_once;
        config.dry_run |= self.dry_run;
    }
}
