//! CLI flag definitions and dispatch
//!
//! denv is driven by flags rather than subcommands. Exactly one operation runs
//! per invocation; [`Operation::resolve`] picks it from the flag set using a
//! fixed precedence order.

use clap::Parser;

use denv_core::{ConfigManager, Credentials, Error, ObjectStore, Paths, StoreClient};
use denv_s3::S3Store;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

pub mod completion;
mod delete;
mod download;
pub mod help;
mod list;
mod rename;
pub mod setup;
mod upload;

/// denv - stash and retrieve env files in an S3 bucket
#[derive(Parser, Debug, Default)]
#[command(name = "denv")]
#[command(author, version, about, long_about = None)]
#[command(disable_help_flag = true)]
pub struct Cli {
    /// See how to use the CLI
    #[arg(long)]
    pub help: bool,

    /// Start the app config
    #[arg(long)]
    pub config: bool,

    /// Upload some file (or directory with --r)
    #[arg(long, value_name = "PATH")]
    pub up: Option<String>,

    /// Nickname of the file to upload or download; new name when renaming
    #[arg(long, value_name = "NICKNAME")]
    pub name: Option<String>,

    /// Local file name for a download
    #[arg(long, value_name = "PATH")]
    pub out: Option<String>,

    /// List all files in the bucket
    #[arg(long)]
    pub list: bool,

    /// Delete some file in the bucket
    #[arg(long, value_name = "NICKNAME")]
    pub del: Option<String>,

    /// Rename a file in the bucket (new name goes in --name)
    #[arg(long, value_name = "NICKNAME")]
    pub rename: Option<String>,

    /// Upload a directory recursively (it will be zipped)
    #[arg(short = 'r', long = "r")]
    pub recursive: bool,

    /// List files for shell completion (internal use)
    #[arg(long, hide = true)]
    pub completion_files: bool,

    /// Setup zsh completion for denv commands
    #[arg(long)]
    pub setup_completion: bool,

    /// Output format: human-readable or JSON
    #[arg(long, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, default_value = "false")]
    pub no_color: bool,

    /// Suppress non-error output
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, default_value = "false")]
    pub debug: bool,
}

impl Cli {
    /// Output settings taken from the modifier flags
    pub fn output_config(&self) -> OutputConfig {
        OutputConfig {
            json: self.json,
            no_color: self.no_color,
            quiet: self.quiet,
        }
    }
}

/// A lifecycle operation against the bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transfer {
    /// Upload `source` under `name`
    Upload {
        source: String,
        name: String,
        recursive: bool,
    },
    /// Rename `from` to `to`
    Rename { from: String, to: String },
    /// Download `name`, optionally into `out`
    Download { name: String, out: Option<String> },
    /// List the bucket
    List,
    /// Delete `name`
    Delete { name: String },
}

/// What a single invocation does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Print bucket keys for the completion script
    CompletionFiles,
    /// Install the completion script
    SetupCompletion,
    /// Print usage
    Help,
    /// Prompt for credentials and save them
    Configure,
    /// Talk to the bucket
    Remote(Transfer),
    /// --up without --name
    MissingNickname,
    /// --rename without --name
    MissingNewName,
    /// Nothing matched
    Hint,
}

/// Treat an empty string flag as unset
fn flag(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl Operation {
    /// Pick the operation for a flag set
    ///
    /// Guards are evaluated top to bottom and the first match wins.
    pub fn resolve(cli: &Cli) -> Self {
        let up = flag(&cli.up);
        let name = flag(&cli.name);
        let rename = flag(&cli.rename);
        let del = flag(&cli.del);

        if cli.completion_files {
            return Self::CompletionFiles;
        }
        if cli.setup_completion {
            return Self::SetupCompletion;
        }
        if cli.help {
            return Self::Help;
        }
        if cli.config {
            return Self::Configure;
        }
        if let (Some(source), Some(name)) = (up, name) {
            return Self::Remote(Transfer::Upload {
                source: source.to_string(),
                name: name.to_string(),
                recursive: cli.recursive,
            });
        }
        if let (Some(from), Some(to)) = (rename, name) {
            return Self::Remote(Transfer::Rename {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        if let (Some(name), None, None) = (name, up, rename) {
            return Self::Remote(Transfer::Download {
                name: name.to_string(),
                out: flag(&cli.out).map(str::to_string),
            });
        }
        if cli.list {
            return Self::Remote(Transfer::List);
        }
        if let Some(name) = del {
            return Self::Remote(Transfer::Delete {
                name: name.to_string(),
            });
        }
        if up.is_some() && name.is_none() {
            return Self::MissingNickname;
        }
        if rename.is_some() && name.is_none() {
            return Self::MissingNewName;
        }
        Self::Hint
    }
}

/// Execute the CLI and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let formatter = Formatter::new(cli.output_config());
    let operation = Operation::resolve(&cli);
    tracing::debug!(?operation, "resolved operation");

    let transfer = match operation {
        Operation::CompletionFiles => return completion::print_keys().await,
        Operation::SetupCompletion => return completion::execute_setup(&formatter),
        Operation::Help => {
            help::print_help();
            return ExitCode::Success;
        }
        Operation::MissingNickname => {
            formatter.error("Please, provide a nickname to your file using --name flag");
            return ExitCode::UsageError;
        }
        Operation::MissingNewName => {
            formatter.error("Please, provide a new name for the file using --name flag");
            return ExitCode::UsageError;
        }
        Operation::Hint => {
            help::print_hint(&formatter);
            return ExitCode::Success;
        }
        Operation::Configure => None,
        Operation::Remote(transfer) => Some(transfer),
    };

    let manager = match Paths::resolve() {
        Ok(paths) => ConfigManager::new(paths),
        Err(e) => return report(&formatter, "Failed to locate configuration", e),
    };
    if let Err(e) = manager.ensure() {
        return report(&formatter, "Failed to initialize configuration", e);
    }

    let Some(transfer) = transfer else {
        return setup::execute(&manager, &formatter);
    };

    let credentials = match validate(&manager, &formatter) {
        Ok(credentials) => credentials,
        Err(code) => return code,
    };

    let store = match S3Store::new(&credentials).await {
        Ok(store) => store,
        Err(e) => return report(&formatter, "Failed to create S3 client", e),
    };

    run(&StoreClient::new(store), transfer, &formatter).await
}

/// Confirm the credentials are complete before any remote call
///
/// Shows the setup prompt and returns the exit code to use when they are not.
pub fn validate(manager: &ConfigManager, formatter: &Formatter) -> Result<Credentials, ExitCode> {
    let credentials = match manager.load_with_env() {
        Ok(credentials) => credentials,
        Err(e) => return Err(report(formatter, "Failed to read configuration", e)),
    };

    if let Err(e) = credentials.require_complete() {
        tracing::debug!("{e}");
        help::print_setup_message(formatter);
        return Err(ExitCode::UsageError);
    }

    Ok(credentials)
}

/// Run a lifecycle operation against the bucket
pub async fn run<S: ObjectStore>(
    client: &StoreClient<S>,
    transfer: Transfer,
    formatter: &Formatter,
) -> ExitCode {
    match transfer {
        Transfer::Upload {
            source,
            name,
            recursive,
        } => upload::execute(client, &source, &name, recursive, formatter).await,
        Transfer::Rename { from, to } => rename::execute(client, &from, &to, formatter).await,
        Transfer::Download { name, out } => {
            download::execute(client, &name, out.as_deref(), formatter).await
        }
        Transfer::List => list::execute(client, formatter).await,
        Transfer::Delete { name } => delete::execute(client, &name, formatter).await,
    }
}

/// Print an error with context and map it to an exit code
pub(crate) fn report(formatter: &Formatter, context: &str, err: Error) -> ExitCode {
    formatter.error(&format!("{context}: {err}"));
    ExitCode::from_error(&err)
}
