use crate::cli::{Args, ColorChoice};

pub struct AppConfig {
    pub color_enabled: bool,
    pub verbose: bool,
    pub dump_ast: bool,
    pub run_main: bool,
}

impl AppConfig {
    pub fn from_args(args: &Args) -> Self {
        let color_enabled = match args.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => atty::is(atty::Stream::Stderr) && atty::is(atty::Stream::Stdout),
        };

        AppConfig {
            color_enabled,
            verbose: args.verbose,
            dump_ast: args.dump_ast,
            run_main: !args.no_main,
        }
    }

    /// Directive for the tracing subscriber; `None` defers to `RUST_LOG`.
    pub fn log_directive(&self) -> Option<&'static str> {
        if self.verbose {
            Some("brace=debug")
        } else {
            None
        }
    }
}
