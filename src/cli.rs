use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "brace")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Interpreter for the brace scripting language", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Args {
    /// Script to run; reads stdin when neither a script nor --eval is given
    #[arg(value_name = "SCRIPT")]
    pub script: Option<PathBuf>,

    #[arg(short, long = "eval", value_name = "SOURCE", conflicts_with = "script")]
    pub eval: Option<String>,

    #[arg(long = "color", value_name = "WHEN", default_value = "auto")]
    pub color: ColorChoice,

    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Print the parse tree to stderr before running
    #[arg(long = "dump-ast")]
    pub dump_ast: bool,

    /// Only run the top-level statements
    #[arg(long = "no-main")]
    pub no_main: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print shell completions
    Complete {
        #[arg(value_name = "SHELL")]
        shell: Shell,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorChoice {
    Auto,
    Always,
    Never,
}

impl std::str::FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ColorChoice::Auto),
            "always" => Ok(ColorChoice::Always),
            "never" => Ok(ColorChoice::Never),
            _ => Err(format!(
                "Invalid color choice: {}. Must be 'auto', 'always', or 'never'",
                s
            )),
        }
    }
}

pub fn generate_completions(shell: Shell) {
    let mut cmd = Args::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, &bin_name, &mut io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script_and_flags() {
        let args = Args::try_parse_from(["brace", "main.br", "--dump-ast", "-v", "--color", "never"]).unwrap();
        assert_eq!(args.script, Some(PathBuf::from("main.br")));
        assert!(args.dump_ast);
        assert!(args.verbose);
        assert!(!args.no_main);
        assert_eq!(args.color, ColorChoice::Never);
    }

    #[test]
    fn test_script_conflicts_with_eval() {
        assert!(Args::try_parse_from(["brace", "main.br", "-e", "let x = 1;"]).is_err());
    }

    #[test]
    fn test_complete_subcommand() {
        let args = Args::try_parse_from(["brace", "complete", "bash"]).unwrap();
        assert!(matches!(args.command, Some(Commands::Complete { shell: Shell::Bash })));
    }

    #[test]
    fn test_invalid_color_choice() {
        assert!("sometimes".parse::<ColorChoice>().is_err());
        assert_eq!("ALWAYS".parse::<ColorChoice>(), Ok(ColorChoice::Always));
    }
}
