use clap::{Parser, Subcommand};

use crate::constants::Gamemode;

#[derive(Parser, Clone)]
#[command(
    name = "reverie",
    about = "Computes performance ratings from ranked scores"
)]
pub struct Args {
    /// Gamemode to process
    #[arg(value_enum)]
    pub mode: Gamemode,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Clone)]
pub enum Command {
    /// Watch for new scores and newly ranked beatmap sets
    Monitor,
    /// Recompute every user across a worker pool
    All {
        /// Start over from user id 0 instead of the stored checkpoint
        #[arg(long, action = clap::ArgAction::SetTrue)]
        reprocess: bool,

        /// Size of the worker pool
        #[arg(long, default_value_t = 1)]
        threads: u32,
    },
    /// Recompute the given user ids and print a summary
    Users {
        #[arg(required = true)]
        users: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_keywords_parse() {
        let args = Args::try_parse_from(["reverie", "osu_mania"]).unwrap();
        assert_eq!(args.mode, Gamemode::Mania);
        assert!(args.command.is_none());
    }

    #[test]
    fn all_takes_reprocess_and_threads() {
        let args =
            Args::try_parse_from(["reverie", "taiko", "all", "--reprocess", "--threads", "8"])
                .unwrap();

        match args.command {
            Some(Command::All { reprocess, threads }) => {
                assert!(reprocess);
                assert_eq!(threads, 8);
            },
            _ => unreachable!(),
        }
    }

    #[test]
    fn users_requires_at_least_one_id() {
        assert!(Args::try_parse_from(["reverie", "osu", "users"]).is_err());
        assert!(Args::try_parse_from(["reverie", "osu", "users", "123", "456"]).is_ok());
    }
}
