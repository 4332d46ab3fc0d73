use clap::Parser;
use std::path::PathBuf;
use whotweeted_quiz::setup::normalize_handle;

#[derive(Debug, Parser)]
#[command(
    name = "whotweeted",
    version,
    about = "Guess which of two Twitter accounts wrote each tweet."
)]
pub struct Cli {
    /// YAML config file. Without it, ./whotweeted.yaml is used when present.
    #[arg(short, long, env = "WHOTWEETED_CONFIG")]
    pub config: Option<PathBuf>,

    /// Lives to start with; overrides `game.lives`.
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub lives: Option<u32>,

    /// Handle of the first account (skips the prompt, needs SECOND too).
    #[arg(requires = "second")]
    pub first: Option<String>,

    /// Handle of the second account.
    pub second: Option<String>,
}

impl Cli {
    /// Both handles, when given on the command line and non-empty.
    pub fn accounts(&self) -> Option<(String, String)> {
        let first = normalize_handle(self.first.as_deref()?);
        let second = normalize_handle(self.second.as_deref()?);
        if first.is_empty() || second.is_empty() {
            return None;
        }
        Some((first.to_string(), second.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_handles_are_normalised() {
        let cli = Cli::try_parse_from(["whotweeted", "@jack", "biz"]).unwrap();
        assert_eq!(cli.accounts(), Some(("jack".into(), "biz".into())));
    }

    #[test]
    fn no_handles_means_prompting() {
        let cli = Cli::try_parse_from(["whotweeted", "--lives", "5"]).unwrap();
        assert_eq!(cli.accounts(), None);
        assert_eq!(cli.lives, Some(5));
    }

    #[test]
    fn one_handle_alone_is_rejected() {
        assert!(Cli::try_parse_from(["whotweeted", "jack"]).is_err());
    }

    #[test]
    fn zero_lives_are_rejected() {
        assert!(Cli::try_parse_from(["whotweeted", "-l", "0"]).is_err());
    }

    #[test]
    fn blank_handles_fall_back_to_prompting() {
        let cli = Cli::try_parse_from(["whotweeted", "@", "biz"]).unwrap();
        assert_eq!(cli.accounts(), None);
    }
}
