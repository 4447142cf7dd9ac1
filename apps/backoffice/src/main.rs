//! # ConstruFlow Back Office Entry Point
//!
//! ```text
//! construflow [--db PATH] [--json] <subcommand>
//!        │
//!        ▼
//! lib.rs::run ──► logging, database, state ──► cli::execute ──► commands/
//! ```
//!
//! The actual setup is in lib.rs so the commands stay testable.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    construflow_backoffice::run().await
}
