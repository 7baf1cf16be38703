//! Delete a file from the bucket

use serde::Serialize;

use denv_core::{ObjectStore, StoreClient};

use super::report;
use crate::exit_code::ExitCode;
use crate::output::Formatter;

#[derive(Debug, Serialize)]
struct DeleteOutput {
    status: &'static str,
    key: String,
}

pub(super) async fn execute<S: ObjectStore>(
    client: &StoreClient<S>,
    name: &str,
    formatter: &Formatter,
) -> ExitCode {
    if let Err(e) = client.delete(name).await {
        return report(formatter, &format!("Failed to delete '{name}'"), e);
    }

    if formatter.is_json() {
        formatter.json(&DeleteOutput {
            status: "success",
            key: name.to_string(),
        });
    } else {
        formatter.success(&format!("Deleted '{name}'"));
    }
    ExitCode::Success
}
