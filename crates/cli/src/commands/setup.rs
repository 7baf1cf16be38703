//! Interactive credential setup (`--config`)

use std::io::{self, BufRead, Write};

use denv_core::{ConfigManager, Credentials};

use super::{help, report};
use crate::exit_code::ExitCode;
use crate::output::Formatter;

pub fn execute(manager: &ConfigManager, formatter: &Formatter) -> ExitCode {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    let credentials = match prompt_credentials(stdin.lock(), &mut stdout) {
        Ok(credentials) => credentials,
        Err(e) => {
            formatter.error(&format!("Configuration aborted: {e}"));
            return ExitCode::UsageError;
        }
    };

    if let Err(e) = manager.save(&credentials) {
        return report(formatter, "Failed to save configuration", e);
    }
    tracing::debug!(path = %manager.paths().env_file.display(), "saved credentials");

    // Reading back catches values the loader would reject, such as a bad endpoint
    if let Err(e) = manager.load() {
        return report(formatter, "Saved configuration is invalid", e);
    }

    help::print_configured(formatter);
    ExitCode::Success
}

/// Ask for each credential field on `output`, reading answers from `input`
///
/// Required fields are asked again when left blank. The endpoint is optional.
pub fn prompt_credentials<R: BufRead, W: Write>(
    mut input: R,
    output: &mut W,
) -> io::Result<Credentials> {
    let access_key = ask(&mut input, output, "🚧 Insert your AWS Access key", true)?;
    let secret_key = ask(&mut input, output, "🚧 Insert your AWS Secret key", true)?;
    let bucket_name = ask(&mut input, output, "🚧 Insert your AWS Bucket name", true)?;
    let bucket_region = ask(&mut input, output, "🚧 Insert your AWS Bucket region", true)?;
    let endpoint = ask(
        &mut input,
        output,
        "🚧 Insert a custom S3 endpoint URL (leave empty for AWS)",
        false,
    )?;

    Ok(Credentials {
        access_key,
        secret_key,
        bucket_name,
        bucket_region,
        endpoint: (!endpoint.is_empty()).then_some(endpoint),
    })
}

fn ask<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
    required: bool,
) -> io::Result<String> {
    loop {
        writeln!(output, "{prompt}")?;
        output.flush()?;

        let mut line = String::new();
        let read = input.read_line(&mut line)?;
        let value = line.trim();

        if read == 0 {
            if required {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "input ended before every field was answered",
                ));
            }
            return Ok(String::new());
        }
        if !value.is_empty() || !required {
            return Ok(value.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use denv_core::Paths;
    use tempfile::TempDir;

    #[test]
    fn test_prompt_reads_every_field() {
        let input = b"AKIA123\ns3cr3t\nmy-bucket\nus-east-1\n\n";
        let mut output = Vec::new();

        let credentials = prompt_credentials(&input[..], &mut output).unwrap();

        assert_eq!(credentials.access_key, "AKIA123");
        assert_eq!(credentials.secret_key, "s3cr3t");
        assert_eq!(credentials.bucket_name, "my-bucket");
        assert_eq!(credentials.bucket_region, "us-east-1");
        assert!(credentials.endpoint.is_none());

        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("Insert your AWS Access key"));
        assert!(shown.contains("Insert your AWS Bucket region"));
    }

    #[test]
    fn test_prompt_repeats_blank_required_field() {
        let input = b"\n  \nAKIA123\ns3cr3t\nmy-bucket\nus-east-1\nhttp://localhost:9000\n";
        let mut output = Vec::new();

        let credentials = prompt_credentials(&input[..], &mut output).unwrap();

        assert_eq!(credentials.access_key, "AKIA123");
        assert_eq!(credentials.endpoint.as_deref(), Some("http://localhost:9000"));
        let shown = String::from_utf8(output).unwrap();
        assert_eq!(shown.matches("Insert your AWS Access key").count(), 3);
    }

    #[test]
    fn test_prompt_eof_before_required_field() {
        let input = b"AKIA123\n";
        let mut output = Vec::new();

        let err = prompt_credentials(&input[..], &mut output).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_prompt_eof_on_optional_endpoint() {
        let input = b"AKIA123\ns3cr3t\nmy-bucket\nus-east-1";
        let mut output = Vec::new();

        let credentials = prompt_credentials(&input[..], &mut output).unwrap();
        assert!(credentials.is_complete());
        assert!(credentials.endpoint.is_none());
    }

    #[test]
    fn test_prompted_credentials_round_trip_through_manager() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::new(Paths::in_dir(temp.path().join("denv")));
        let input = b"AKIA123\ns3cr3t\nmy-bucket\nus-east-1\n\n";

        let credentials = prompt_credentials(&input[..], &mut Vec::new()).unwrap();
        manager.save(&credentials).unwrap();

        assert!(manager.load().unwrap().is_complete());
    }
}
