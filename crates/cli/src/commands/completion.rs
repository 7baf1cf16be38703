//! Shell completion: the zsh script installer and the key lister it calls

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use denv_core::{ConfigManager, Paths, StoreClient};
use denv_s3::S3Store;

use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// zsh completion function, installed as `_denv`
const ZSH_SCRIPT: &str = r#"#compdef denv

_denv_files() {
  local -a files
  files=(${(s: :)"$(denv --completion-files 2>/dev/null)"})
  _describe -t files "files" files
}

_denv() {
  _arguments \
    '--help[See how to use the CLI]' \
    '--config[Start the app config]' \
    '--up[Upload some file]:file:_files' \
    '--name[Nickname for the file]:file:_denv_files' \
    '--out[Optional output name]:filename:_files' \
    '--list[List all files in the bucket]' \
    '--del[Delete some file in the bucket]:file:_denv_files' \
    '--rename[Rename a file in the bucket]:file:_denv_files' \
    '--r[Upload a directory recursively]' \
    '--json[Print results as JSON]' \
    '--quiet[Only print errors]' \
    '--no-color[Disable colored output]' \
    '--debug[Log what denv is doing]' \
    '--setup-completion[Setup shell completion for denv commands]'
}

compdef _denv denv
"#;

/// Print every key in the bucket on one line, separated by spaces
///
/// Called by the completion script on each tab press, so it never prints
/// errors and always exits successfully.
pub async fn print_keys() -> ExitCode {
    let keys = list_keys().await;
    if !keys.is_empty() {
        let mut stdout = std::io::stdout().lock();
        let _ = writeln!(stdout, "{}", keys.join(" "));
    }
    ExitCode::Success
}

async fn list_keys() -> Vec<String> {
    let loaded = Paths::resolve().and_then(|paths| ConfigManager::new(paths).load_with_env());
    let credentials = match loaded {
        Ok(credentials) if credentials.is_complete() => credentials,
        Ok(_) => return Vec::new(),
        Err(e) => {
            tracing::debug!("completion skipped: {e}");
            return Vec::new();
        }
    };

    match S3Store::new(&credentials).await {
        Ok(store) => StoreClient::new(store).list_keys().await,
        Err(e) => {
            tracing::debug!("completion skipped: {e}");
            Vec::new()
        }
    }
}

/// Install the zsh completion script for the current user
pub fn execute_setup(formatter: &Formatter) -> ExitCode {
    let result = dirs::home_dir()
        .context("Could not determine home directory")
        .and_then(|home| install(&home));

    match result {
        Ok(script) => {
            tracing::debug!(path = %script.display(), "installed completion script");
            formatter.println("🎉 ZSH completion has been set up successfully!");
            formatter.println("ℹ️  You need to restart your shell or run 'source ~/.zshrc' to enable it.");
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!("Failed to set up completion: {e:#}"));
            ExitCode::GeneralError
        }
    }
}

/// Write `_denv` under `home/.zsh/functions` and register that directory in
/// `home/.zshrc` when the file exists and does not mention it yet
///
/// Returns the path of the installed script.
pub fn install(home: &Path) -> Result<PathBuf> {
    let functions_dir = home.join(".zsh").join("functions");
    std::fs::create_dir_all(&functions_dir)
        .with_context(|| format!("could not create {}", functions_dir.display()))?;

    let script = functions_dir.join("_denv");
    std::fs::write(&script, ZSH_SCRIPT)
        .with_context(|| format!("could not write {}", script.display()))?;

    let zshrc = home.join(".zshrc");
    if zshrc.exists() {
        let content = std::fs::read_to_string(&zshrc)
            .with_context(|| format!("could not read {}", zshrc.display()))?;
        let dir = functions_dir.display().to_string();

        if !content.contains(&dir) {
            let mut file = std::fs::OpenOptions::new()
                .append(true)
                .open(&zshrc)
                .with_context(|| format!("could not open {} for appending", zshrc.display()))?;
            write!(
                file,
                "\n# Added by denv for completion\nfpath=({dir} $fpath)\nautoload -Uz compinit\ncompinit\n"
            )
            .with_context(|| format!("could not update {}", zshrc.display()))?;
        }
    }

    Ok(script)
}
