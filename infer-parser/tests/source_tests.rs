//! Data driven tests, read from the TOML files under `tests/cases`.
//!
//! Each file names a type, and lists inputs that should parse to a value and
//! inputs that should fail:
//!
//! ```toml
//! type = "list[int]"
//!
//! [[ok]]
//! input = ["1", "2"]
//! value = "[1, 2]"
//!
//! [[err]]
//! input = ["1", "x"]
//! kind = "InElement"
//! ```
//!
//! Strings in inputs are tokens, TOML integers, floats and booleans are
//! loosely typed scalars, arrays are sequences and tables are named values.
//! A missing input is the absent sentinel.

use infer_parser::registry::{Config, Registry};
use infer_parser::surface::parse_type;
use infer_parser::value::Input;
use libtest_mimic::{Arguments, Failed, Trial};
use serde::Deserialize;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

fn main() {
    let args = Arguments::from_args();

    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("cases");
    let tests = find_case_files(&root)
        .map(|path| {
            let name = (path.strip_prefix(&root))
                .unwrap_or(&path)
                .display()
                .to_string();
            Trial::test(name, move || run_test(&path))
        })
        .collect();

    libtest_mimic::run(&args, tests).exit();
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
#[serde(rename_all = "kebab-case")]
struct Case {
    r#type: String,
    #[serde(default)]
    ignore: bool,
    absent_tokens: Option<Vec<String>>,
    /// The expected resolve error, for types that are not supported.
    unsupported: Option<String>,
    #[serde(default)]
    ok: Vec<OkCase>,
    #[serde(default)]
    err: Vec<ErrCase>,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct OkCase {
    input: Option<toml::Value>,
    /// The value, printed in its canonical form.
    value: String,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct ErrCase {
    input: Option<toml::Value>,
    /// The name of the error kind.
    kind: Option<String>,
    /// The error message.
    message: Option<String>,
}

/// Recursively walk over case files under a file path.
fn find_case_files(root: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| matches!(entry.path().extension(), Some(ext) if ext == "toml"))
        .map(|entry| entry.into_path())
}

fn to_input(value: Option<&toml::Value>) -> Input {
    match value {
        None => Input::Absent,
        Some(toml::Value::String(token)) => Input::token(token.as_str()),
        Some(toml::Value::Integer(int)) => Input::Int(*int),
        Some(toml::Value::Float(float)) => Input::Float(*float),
        Some(toml::Value::Boolean(value)) => Input::Bool(*value),
        Some(toml::Value::Datetime(datetime)) => Input::token(datetime.to_string()),
        Some(toml::Value::Array(items)) => {
            Input::Seq(items.iter().map(|item| to_input(Some(item))).collect())
        }
        Some(toml::Value::Table(table)) => Input::Map(
            (table.iter())
                .map(|(key, item)| (key.clone(), to_input(Some(item))))
                .collect(),
        ),
    }
}

fn run_test(path: &Path) -> Result<(), Failed> {
    let source = std::fs::read_to_string(path).map_err(|error| error.to_string())?;
    let case: Case = toml::from_str(&source).map_err(|error| error.to_string())?;

    if case.ignore {
        return Ok(());
    }

    let ty = parse_type(&case.r#type).map_err(|error| format!("syntax error: {error}"))?;
    let registry = Registry::with_config(match case.absent_tokens {
        Some(absent_tokens) => Config { absent_tokens },
        None => Config::default(),
    });

    let parser = match (registry.resolve(&ty), &case.unsupported) {
        (Ok(parser), None) => parser,
        (Err(error), Some(expected)) if error.reason().to_string() == *expected => return Ok(()),
        (Err(error), _) => return Err(format!("unexpected resolve error: {error}").into()),
        (Ok(_), Some(expected)) => {
            return Err(format!("expected resolve error `{expected}`").into());
        }
    };

    let mut failures = String::new();

    for ok in &case.ok {
        let input = to_input(ok.input.as_ref());
        match parser.parse(&input) {
            Ok(value) if value.to_string() == ok.value => {}
            Ok(value) => {
                writeln!(failures, "{input}: expected {}, found {value}", ok.value).unwrap();
            }
            Err(error) => {
                writeln!(failures, "{input}: unexpected error").unwrap();
                writeln!(failures, "{}", error.render_tree()).unwrap();
            }
        }
    }

    for err in &case.err {
        let input = to_input(err.input.as_ref());
        let error = match parser.parse(&input) {
            Ok(value) => {
                writeln!(failures, "{input}: expected an error, found {value}").unwrap();
                continue;
            }
            Err(error) => error,
        };

        let kind = format!("{:?}", error.kind());
        if let Some(expected) = &err.kind {
            let name = kind.split(|c: char| !c.is_alphanumeric()).next();
            if name != Some(expected.as_str()) {
                writeln!(failures, "{input}: expected {expected} error, found {kind}").unwrap();
            }
        }
        if let Some(expected) = &err.message {
            if error.to_string() != *expected {
                writeln!(failures, "{input}: expected message {expected:?}, found {:?}", error.to_string())
                    .unwrap();
            }
        }
    }

    match failures.is_empty() {
        true => Ok(()),
        false => Err(failures.into()),
    }
}
