//! Usage text and hints

use crate::output::Formatter;

/// One line per supported invocation
const USAGE: &[&str] = &[
    "denv --config to start the CLI configuration",
    "denv --up [file path] --name [file nickname] to upload some env file",
    "denv --up [dir path] --name [nickname] --r to upload a whole directory as a zip",
    "denv --name [file nickname] to download some env file you have uploaded",
    "denv --name [file nickname] --out [file name] to download some env file you have uploaded with some specific name",
    "denv --list to list all files in the bucket",
    "denv --del [file nickname] to delete some file in the bucket",
    "denv --rename [file nickname] --name [new nickname] to rename a file in the bucket",
    "denv --setup-completion to install tab completion for commands (zsh)",
];

/// Output modifiers accepted alongside any operation
const MODIFIERS: &[&str] = &[
    "--json       print results as JSON",
    "--quiet, -q  only print errors",
    "--no-color   disable colored output",
    "--debug      log what denv is doing to stderr",
];

const HINT: &str = "🤓 Type denv --help if you want to see how to use the CLI.";

/// Usage text printed by `--help`
pub fn usage() -> String {
    let mut text = USAGE.join("\n");
    text.push_str("\n\nOptions:\n");
    for line in MODIFIERS {
        text.push_str("  ");
        text.push_str(line);
        text.push('\n');
    }
    text
}

pub fn print_help() {
    print!("{}", usage());
}

pub fn print_hint(formatter: &Formatter) {
    if formatter.is_json() {
        formatter.json(&serde_json::json!({ "hint": HINT }));
        return;
    }
    formatter.println(HINT);
}

/// Shown when an operation needs credentials that are not configured yet
pub fn print_setup_message(formatter: &Formatter) {
    if formatter.is_json() {
        formatter.error("denv is not configured. Run 'denv --config' first");
        return;
    }
    formatter.println("🤔 Hello! Type 'denv --config' to start setting up the application");
}

/// Shown after credentials were saved
pub fn print_configured(formatter: &Formatter) {
    formatter.println("🔥 Thank you! Everything is right!");
    formatter.println(HINT);
    formatter.println("🫢 Type denv --config again if the CLI is not working properly.");
}
