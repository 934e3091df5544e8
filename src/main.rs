//! Blog Backend - binary entry point
//! Delegates to the library for all app logic.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match blog_backend::run().await {
        Ok(()) => ExitCode::SUCCESS,
        // Already logged by run()
        Err(_) => ExitCode::FAILURE,
    }
}
