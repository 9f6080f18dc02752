use clap::{ArgGroup, Parser};

use crate::logging::DEFAULT_LOG_FILE;
use crate::theme::Bucket;

/// AcePlan tennis blog generator and scheduler
#[derive(Debug, Parser)]
#[command(name = "racket_blog")]
#[command(version)]
#[command(group(ArgGroup::new("mode").args(["immediate", "theme", "batch", "start", "setup_cron", "export_index"])))]
pub struct Cli {
    /// Generate one post now for a time slot (morning, afternoon, evening, 9am, 12pm, 3pm, 5pm, 7pm)
    #[arg(long, value_name = "SLOT")]
    pub immediate: Option<Bucket>,

    /// Generate one post for a theme id
    #[arg(long, value_name = "ID")]
    pub theme: Option<String>,

    /// Generate N posts with random themes
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub batch: Option<u32>,

    /// Run the scheduler until interrupted
    #[arg(long)]
    pub start: bool,

    /// Write cron runner scripts and cron-setup.txt
    #[arg(long)]
    pub setup_cron: bool,

    /// Write the post ledger as JSON
    #[arg(long, value_name = "PATH")]
    pub export_index: Option<String>,

    /// Send posts to the publish endpoint instead of writing files
    #[arg(long)]
    pub publish: bool,

    /// JSON config file
    #[arg(long, env = "RACKET_BLOG_CONFIG", value_name = "PATH")]
    pub config: Option<String>,

    #[arg(long, default_value = DEFAULT_LOG_FILE, value_name = "PATH")]
    pub log_file: String,

    /// Overrides output_dir from the config file
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<String>,
}

impl Cli {
    pub fn has_mode(&self) -> bool {
        self.immediate.is_some()
            || self.theme.is_some()
            || self.batch.is_some()
            || self.start
            || self.setup_cron
            || self.export_index.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn slot_aliases_parse() {
        let cli = Cli::try_parse_from(["racket_blog", "--immediate", "9am"]).unwrap();
        assert_eq!(cli.immediate, Some(Bucket::Morning));

        let cli = Cli::try_parse_from(["racket_blog", "--immediate", "morning"]).unwrap();
        assert_eq!(cli.immediate, Some(Bucket::Morning));
        assert!(cli.has_mode());
    }

    #[test]
    fn unknown_slot_is_rejected() {
        let err = Cli::try_parse_from(["racket_blog", "--immediate", "midnight"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn modes_are_mutually_exclusive() {
        let err = Cli::try_parse_from(["racket_blog", "--start", "--setup-cron"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn no_mode_means_menu() {
        let cli = Cli::try_parse_from(["racket_blog", "--publish", "--output-dir", "out"]).unwrap();
        assert!(!cli.has_mode());
        assert_eq!(cli.log_file, DEFAULT_LOG_FILE);
        assert_eq!(cli.output_dir.as_deref(), Some("out"));
    }

    #[test]
    fn zero_batch_is_rejected() {
        assert!(Cli::try_parse_from(["racket_blog", "--batch", "0"]).is_err());
    }
}
