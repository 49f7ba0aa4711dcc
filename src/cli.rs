use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Debug, Parser)]
#[command(
    name = "dataviz-finder",
    about = "Browse, search and retrieve data-visualization example scripts"
)]
pub struct Cli {
    /// Catalog root containing the python/ and R/ example directories
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Path to a TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List every example in the catalog
    List(ListArgs),
    /// Search examples by tag keywords
    Search(SearchArgs),
    /// Print the metadata of one example
    Show(ShowArgs),
    /// Print the source code of one example
    Code(CodeArgs),
    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsArgs),
}

// -- List --

#[derive(Debug, Parser)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Search --

#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// Keywords matched against example tags
    #[arg(required = true, num_args = 1..)]
    pub words: Vec<String>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

impl SearchArgs {
    pub fn query(&self) -> String {
        self.words.join(" ")
    }
}

// -- Show --

#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Example index, as printed by `list` and `search`
    #[arg(allow_negative_numbers = true)]
    pub index: i64,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Code --

#[derive(Debug, Parser)]
pub struct CodeArgs {
    /// Example index, as printed by `list` and `search`
    #[arg(allow_negative_numbers = true)]
    pub index: i64,
}

// -- Completions --

#[derive(Debug, Parser)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsArgs {
    /// Generate shell completions and print to stdout.
    pub fn generate(&self) {
        let mut cmd = Cli::command();
        clap_complete::generate(
            self.shell,
            &mut cmd,
            "dataviz-finder",
            &mut std::io::stdout(),
        );
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn parse_search_joins_words() {
        let cli = Cli::parse_from(["dataviz-finder", "search", "colour", "by", "sign"]);
        match cli.command {
            Command::Search(args) => {
                assert_eq!(args.query(), "colour by sign");
                assert!(!args.json);
            }
            _ => panic!("expected search command"),
        }
    }

    #[test]
    fn search_requires_words() {
        assert!(Cli::try_parse_from(["dataviz-finder", "search"]).is_err());
    }

    #[test]
    fn show_accepts_negative_index() {
        let cli = Cli::parse_from(["dataviz-finder", "show", "-1", "--json"]);
        match cli.command {
            Command::Show(args) => {
                assert_eq!(args.index, -1);
                assert!(args.json);
            }
            _ => panic!("expected show command"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "dataviz-finder",
            "list",
            "--root",
            "/tmp/catalog",
            "-vv",
        ]);
        assert_eq!(cli.root, Some(PathBuf::from("/tmp/catalog")));
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Command::List(ListArgs { json: false })));
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
