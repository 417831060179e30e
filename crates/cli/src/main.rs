//! c2pa-verify binary

#![allow(clippy::print_stdout, clippy::print_stderr)]

use c2pa_verifier_cli::cli::{self, exit_code_for, render_error};
use c2pa_verifier_cli::tracing::{TracingConfig, TracingFormat, init_tracing};

#[tokio::main]
async fn main() {
    // NOTE: eprintln! here because the subscriber may be unusable during a panic
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {panic_info}");
        eprintln!("Internal error occurred. Run with RUST_LOG=debug for more information.");
    }));

    let cli = cli::parse();
    let json_mode = cli.json;

    let tracing_config = TracingConfig {
        format: if json_mode {
            TracingFormat::Json
        } else {
            TracingFormat::Compact
        },
        level: cli.level.into(),
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("{e:?}");
    }

    let exit_code = match c2pa_verifier_cli::run(cli).await {
        Ok(output) => {
            print!("{}", output.stdout);
            output.exit_code
        }
        Err(e) => {
            render_error(&e, json_mode);
            exit_code_for(&e)
        }
    };
    std::process::exit(exit_code);
}
