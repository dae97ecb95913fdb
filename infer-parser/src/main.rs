use clap::Parser;
use tracing_subscriber::EnvFilter;

use infer_parser::registry::Config;

/// Parse command line tokens as typed values
#[derive(Parser)]
#[command(author, version, about)]
enum Cli {
    /// Parse tokens as a type, printing the parsed value to stdout
    #[command(after_help = PARSE_COMMAND_AFTER_HELP)]
    Parse {
        /// The type to parse the tokens as
        #[arg(long = "type", value_name = "TYPE", display_order = 0)]
        ty: String,
        /// A token that stands for no value. Defaults to `None`
        #[arg(long = "absent-token", value_name = "ABSENT_TOKEN", display_order = 1)]
        absent_tokens: Vec<String>,
        /// The tokens to parse
        #[arg(value_name = "TOKEN", allow_hyphen_values = true)]
        tokens: Vec<String>,
    },
    /// Print the canonical form of a type
    Show {
        /// The type to print
        #[arg(long = "type", value_name = "TYPE")]
        ty: String,
    },
}

const PARSE_COMMAND_AFTER_HELP: &str = "\
Examples:

  $ infer-parser parse --type 'int | float' 3
  $ infer-parser parse --type 'list[int]' 1 2 3
  $ infer-parser parse --type '{host: str, port: int = 8080}' host=localhost
";

const MAX_PRETTY_WIDTH: usize = 80;

fn get_pretty_width() -> usize {
    let term_width = termsize::get().map_or(usize::MAX, |size| usize::from(size.cols));
    std::cmp::min(term_width, MAX_PRETTY_WIDTH)
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("INFER_PARSER_LOG")
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ! {
    init_logging();

    match Cli::parse() {
        Cli::Parse {
            ty,
            absent_tokens,
            tokens,
        } => {
            let config = match absent_tokens.is_empty() {
                true => Config::default(),
                false => Config { absent_tokens },
            };
            let mut driver = infer_parser::Driver::with_config(config);
            driver.set_emit_width(get_pretty_width());

            let file_id = driver.load_type_string("<TYPE>".to_owned(), ty);
            let status = driver.parse_and_emit(file_id, &tokens);

            std::process::exit(status.exit_code());
        }
        Cli::Show { ty } => {
            let mut driver = infer_parser::Driver::new();
            driver.set_emit_width(get_pretty_width());

            let file_id = driver.load_type_string("<TYPE>".to_owned(), ty);
            let status = driver.show_and_emit_type(file_id);

            std::process::exit(status.exit_code());
        }
    }
}
