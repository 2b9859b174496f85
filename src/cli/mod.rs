//! Command line surface: argument definitions, action dispatch and CI outputs

pub mod orchestration;
pub mod output;

use crate::changelog::ChangelogTemplate;
use clap::builder::PossibleValuesParser;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "releaser",
    about = "Merge release content into v<major> branches, tag and push semantic versions"
)]
#[command(version)]
pub struct Cli {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub action: Action,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Action {
    #[command(about = "Release the next version if the source branch warrants one")]
    Release {
        #[arg(short, long, default_value = "main", help = "Branch to release from")]
        source: String,

        #[arg(short, long, help = "Make every local change but skip the push")]
        dry_run: bool,

        #[arg(
            short = 't',
            long,
            help = "Changelog template name",
            value_parser = PossibleValuesParser::new(ChangelogTemplate::names())
        )]
        changelog_template: Option<String>,

        #[arg(help = "Path to the repository clone")]
        repository: PathBuf,
    },

    #[command(about = "Validate commit messages made since a branch")]
    Check {
        #[arg(
            short = 'f',
            long,
            default_value = "main",
            help = "Branch the checked range starts from"
        )]
        check_from: String,

        #[arg(help = "Path to the repository clone")]
        repository: PathBuf,
    },
}

impl Action {
    pub fn repository(&self) -> &PathBuf {
        match self {
            Action::Release { repository, .. } | Action::Check { repository, .. } => repository,
        }
    }
}
