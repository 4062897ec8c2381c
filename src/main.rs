use brace::cli::{generate_completions, Args, Commands};
use brace::config::AppConfig;
use brace::diagnostic::render_diagnostics;
use brace::interpreter::builtins::{standard_natives, stdout_sink};
use brace::interpreter::{parse_source, Error, Interpreter};
use clap::Parser;
use owo_colors::OwoColorize;
use std::io::{self, Read};
use std::path::Path;
use tracing::debug;

fn main() {
    let args = Args::parse();

    if let Some(Commands::Complete { shell }) = args.command {
        generate_completions(shell);
        return;
    }

    let config = AppConfig::from_args(&args);
    init_tracing(&config);

    let (source, file_name) = match read_source(&args) {
        Ok(input) => input,
        Err(e) => {
            error_message(&config, &e);
            std::process::exit(1);
        }
    };
    debug!(bytes = source.len(), file = %file_name, "read source");

    if let Err(error) = execute(&source, &config) {
        debug!(%error, "run failed");
        let rendered = render_diagnostics(&source, &file_name, &[error.to_diagnostic()], config.color_enabled);
        eprint!("{}", rendered);
        std::process::exit(1);
    }
}

fn execute(source: &str, config: &AppConfig) -> Result<(), Error> {
    let program = parse_source(source)?;
    if config.dump_ast {
        eprintln!("{:#?}", program);
    }

    let interpreter = Interpreter::new();
    interpreter.run(&program)?;

    if config.run_main {
        interpreter.run_main(standard_natives(stdout_sink()))?;
    }
    Ok(())
}

fn read_source(args: &Args) -> Result<(String, String), String> {
    if let Some(script) = &args.script {
        Ok((read_file(script)?, script.display().to_string()))
    } else if let Some(source) = &args.eval {
        Ok((source.clone(), "<eval>".to_string()))
    } else {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| format!("Failed to read from stdin: {}", e))?;
        Ok((buffer, "<stdin>".to_string()))
    }
}

fn read_file(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))
}

fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = match config.log_directive() {
        Some(directive) => EnvFilter::new(directive),
        None if std::env::var("RUST_LOG").is_ok() => EnvFilter::from_default_env(),
        None => return,
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(config.color_enabled)
                .with_target(true),
        )
        .with(filter)
        .init();
}

fn error_message(config: &AppConfig, message: &str) {
    if config.color_enabled {
        eprintln!("{}", message.red().bold());
    } else {
        eprintln!("{}", message);
    }
}
