//! Download a file, unpacking bundles into a directory

use std::path::{Path, PathBuf};

use serde::Serialize;

use denv_core::{Error, ObjectStore, StoreClient, archive, keys};

use super::report;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, Spinner};

#[derive(Debug, Serialize)]
struct DownloadOutput {
    status: &'static str,
    key: String,
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    extracted_to: Option<String>,
}

/// What happened to a downloaded bundle
enum Unpacked {
    /// Not a bundle
    Skipped,
    /// Extracted into this directory and the bundle removed
    Into(PathBuf),
    /// Extraction failed, the bundle is still on disk
    Kept(Error),
}

pub(super) async fn execute<S: ObjectStore>(
    client: &StoreClient<S>,
    name: &str,
    out: Option<&str>,
    formatter: &Formatter,
) -> ExitCode {
    let spinner = Spinner::start(formatter.config(), &format!("Downloading {name}"));
    let path = match client.get(name, out.map(Path::new)).await {
        Ok(path) => path,
        Err(Error::NotFound(_)) => {
            spinner.finish();
            formatter.error(&format!("File '{name}' not found in the bucket"));
            return ExitCode::NotFound;
        }
        Err(e) => {
            spinner.finish();
            return report(formatter, &format!("Failed to download '{name}'"), e);
        }
    };

    spinner.set_message(&format!("Unpacking {}", path.display()));
    let unpacked = unpack_bundle(&path);
    spinner.finish();

    match &unpacked {
        Unpacked::Kept(e) if e.leaves_partial_state() => {
            formatter.error(&format!("{e}. The bundle was kept at {}", path.display()));
            return ExitCode::from_error(e);
        }
        Unpacked::Kept(e) => {
            formatter.warning(&format!(
                "Could not unpack '{}': {e}. The bundle was kept",
                path.display()
            ));
        }
        Unpacked::Skipped | Unpacked::Into(_) => {}
    }

    let extracted_to = match &unpacked {
        Unpacked::Into(dir) => Some(dir.display().to_string()),
        _ => None,
    };

    if formatter.is_json() {
        formatter.json(&DownloadOutput {
            status: "success",
            key: name.to_string(),
            path: path.display().to_string(),
            extracted_to,
        });
    } else {
        match extracted_to {
            Some(dir) => formatter.success(&format!("Downloaded '{name}' into {dir}/")),
            None => formatter.success(&format!("Downloaded '{name}' to {}", path.display())),
        }
    }

    ExitCode::Success
}

/// Extract `path` next to itself when its name marks a bundle
///
/// `backups/configs.zip` extracts into `backups/configs`. A file named just
/// `.zip` has no directory name to extract into and is left as is. The bundle
/// is removed only after a successful extraction.
fn unpack_bundle(path: &Path) -> Unpacked {
    let Some(stem) = path
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(keys::strip_archive_suffix)
        .filter(|stem| !stem.is_empty())
    else {
        return Unpacked::Skipped;
    };
    let dest = path.with_file_name(stem);

    if let Err(e) = archive::unpack(path, &dest) {
        tracing::debug!(bundle = %path.display(), "unpack failed: {e}");
        return Unpacked::Kept(e);
    }

    if let Err(e) = std::fs::remove_file(path) {
        tracing::warn!(bundle = %path.display(), "could not remove bundle after unpack: {e}");
    }

    Unpacked::Into(dest)
}
