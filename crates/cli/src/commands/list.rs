//! List every file in the bucket

use denv_core::{ObjectStore, StoreClient};

use super::report;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, Spinner};

pub(super) async fn execute<S: ObjectStore>(
    client: &StoreClient<S>,
    formatter: &Formatter,
) -> ExitCode {
    let spinner = Spinner::start(formatter.config(), "Listing files");
    let result = client.list().await;
    spinner.finish();

    match result {
        Ok(items) => {
            tracing::debug!(count = items.len(), "listed bucket");
            formatter.listing(&items);
            ExitCode::Success
        }
        Err(e) => report(formatter, "Failed to list files", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputConfig;
    use denv_core::MemoryStore;

    fn quiet() -> Formatter {
        Formatter::new(OutputConfig {
            quiet: true,
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_list_empty_bucket() {
        let client = StoreClient::new(MemoryStore::new());
        assert_eq!(execute(&client, &quiet()).await, ExitCode::Success);
    }

    #[tokio::test]
    async fn test_list_populated_bucket() {
        let store = MemoryStore::new();
        store.put_object("prod.env", b"A=1".to_vec()).await.unwrap();
        store.put_object("configs.zip", vec![0; 16]).await.unwrap();

        let client = StoreClient::new(store);
        assert_eq!(execute(&client, &quiet()).await, ExitCode::Success);
    }
}
