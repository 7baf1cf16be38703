//! Rename a file in the bucket

use serde::Serialize;

use denv_core::{Error, ObjectStore, StoreClient};

use super::report;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, Spinner};

#[derive(Debug, Serialize)]
struct RenameOutput {
    status: &'static str,
    from: String,
    to: String,
}

pub(super) async fn execute<S: ObjectStore>(
    client: &StoreClient<S>,
    from: &str,
    to: &str,
    formatter: &Formatter,
) -> ExitCode {
    let spinner = Spinner::start(formatter.config(), &format!("Renaming {from}"));
    let result = client.rename(from, to).await;
    spinner.finish();

    let new_key = match result {
        Ok(key) => key,
        Err(Error::NotFound(_)) => {
            formatter.error(&format!("File '{from}' not found in the bucket"));
            return ExitCode::NotFound;
        }
        Err(e) if e.leaves_partial_state() => {
            formatter.error(&format!("{e}. Delete one of them with denv --del to finish"));
            return ExitCode::from_error(&e);
        }
        Err(e) => return report(formatter, &format!("Failed to rename '{from}'"), e),
    };

    if formatter.is_json() {
        formatter.json(&RenameOutput {
            status: "success",
            from: from.to_string(),
            to: new_key,
        });
    } else {
        formatter.success(&format!("Renamed '{from}' to '{new_key}'"));
    }
    ExitCode::Success
}
