//! Upload a file, or a whole directory packed into a bundle

use std::path::Path;

use serde::Serialize;

use denv_core::{Error, ObjectStore, StoreClient, archive, keys};

use super::report;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, Spinner};

#[derive(Debug, Serialize)]
struct UploadOutput {
    status: &'static str,
    source: String,
    key: String,
    recursive: bool,
}

pub(super) async fn execute<S: ObjectStore>(
    client: &StoreClient<S>,
    source: &str,
    name: &str,
    recursive: bool,
    formatter: &Formatter,
) -> ExitCode {
    let source_path = match std::path::absolute(source) {
        Ok(path) => path,
        Err(e) => return report(formatter, &format!("Invalid path '{source}'"), e.into()),
    };

    let result = if recursive {
        upload_directory(client, &source_path, name, formatter).await
    } else {
        upload_file(client, &source_path, name, formatter).await
    };

    match result {
        Ok(key) => {
            if formatter.is_json() {
                formatter.json(&UploadOutput {
                    status: "success",
                    source: source.to_string(),
                    key,
                    recursive,
                });
            } else {
                formatter.success(&format!("Uploaded '{source}' as '{key}'"));
            }
            ExitCode::Success
        }
        Err(Error::InvalidInput(message)) if !recursive && source_path.is_dir() => {
            formatter.error(&format!("{message}. Add --r to upload a directory"));
            ExitCode::UsageError
        }
        Err(e) => report(formatter, &format!("Failed to upload '{source}'"), e),
    }
}

async fn upload_file<S: ObjectStore>(
    client: &StoreClient<S>,
    source: &Path,
    name: &str,
    formatter: &Formatter,
) -> denv_core::Result<String> {
    let key = keys::derive_key(name, source);
    let spinner = Spinner::start(formatter.config(), &format!("Uploading {key}"));
    let key = client.put(source, &key).await?;
    spinner.finish();
    Ok(key)
}

async fn upload_directory<S: ObjectStore>(
    client: &StoreClient<S>,
    source: &Path,
    name: &str,
    formatter: &Formatter,
) -> denv_core::Result<String> {
    let key = keys::with_archive_suffix(name);
    let spinner = Spinner::start(formatter.config(), &format!("Packing {}", source.display()));

    let bundle = archive::pack_to_scratch(source)?;
    tracing::debug!(bundle = %bundle.path().display(), "packed directory");

    spinner.set_message(&format!("Uploading {key}"));
    let key = client.put_bundle(bundle, &key).await?;
    spinner.finish();

    Ok(key)
}
