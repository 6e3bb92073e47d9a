//! RustGallery - Local Image Gallery Viewer
//!
//! Entry point for the RustGallery CLI application.

use clap::Parser;
use rustgallery::{
    cli::Cli,
    error::{ExitCode, StructuredError},
};
use yansi::Paint;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version are reported through the same error path.
            let code = if err.use_stderr() {
                ExitCode::Usage
            } else {
                ExitCode::Success
            };
            let _ = err.print();
            std::process::exit(code.as_i32());
        }
    };
    let json_errors = cli.json_errors;
    if cli.no_color {
        yansi::disable();
    }

    match rustgallery::run_app(cli) {
        Ok(code) => std::process::exit(code.as_i32()),
        Err(err) => {
            let exit_code = ExitCode::from_error(&err);

            if json_errors {
                let structured = StructuredError::new(&err, exit_code);
                match serde_json::to_string_pretty(&structured) {
                    Ok(json) => eprintln!("{}", json),
                    Err(_) => eprintln!("[{}] Error: {:#}", exit_code.code_prefix(), err),
                }
            } else {
                eprintln!(
                    "[{}] {} {:#}",
                    exit_code.code_prefix(),
                    "Error:".red().bold(),
                    err
                );
            }

            std::process::exit(exit_code.as_i32());
        }
    }
}
