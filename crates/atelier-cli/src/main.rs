#![forbid(unsafe_code)]
#![deny(warnings, clippy::all, clippy::pedantic)]

//! Thin entrypoint for the `atelier` binary.

use std::process;

#[tokio::main]
async fn main() {
    process::exit(atelier_cli::run().await);
}
