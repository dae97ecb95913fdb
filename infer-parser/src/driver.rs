//! Reading types from text, parsing tokens with them, and reporting the
//! results as diagnostics, for the command line.

use codespan_reporting::diagnostic::{Diagnostic, Severity};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term::termcolor::{BufferedStandardStream, ColorChoice, WriteColor};
use std::cell::RefCell;
use std::io::Write;
use tracing::{debug, info};

use crate::core::pretty;
use crate::core::{Shape, TypeSpec};
use crate::parse::Parser;
use crate::registry::{Config, Registry};
use crate::surface;
use crate::value::Input;

pub type FileId = usize;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Status {
    Ok,
    Error,
}

impl Status {
    pub fn exit_code(self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::Error => 1,
        }
    }
}

/// Reads types from text, parses tokens with them, and reports the results.
pub struct Driver {
    files: SimpleFiles<String, String>,
    registry: Registry,

    seen_errors: RefCell<bool>,
    codespan_config: codespan_reporting::term::Config,
    diagnostic_writer: RefCell<Box<dyn WriteColor>>,

    emit_width: usize,
    emit_writer: RefCell<Box<dyn WriteColor>>,
}

impl Driver {
    pub fn new() -> Driver {
        Driver::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Driver {
        Driver {
            files: SimpleFiles::new(),
            registry: Registry::with_config(config),

            seen_errors: RefCell::new(false),
            codespan_config: codespan_reporting::term::Config::default(),
            diagnostic_writer: RefCell::new(Box::new(BufferedStandardStream::stderr(
                if atty::is(atty::Stream::Stderr) {
                    ColorChoice::Auto
                } else {
                    ColorChoice::Never
                },
            ))),

            emit_width: usize::MAX,
            emit_writer: RefCell::new(Box::new(BufferedStandardStream::stdout(
                if atty::is(atty::Stream::Stdout) {
                    ColorChoice::Auto
                } else {
                    ColorChoice::Never
                },
            ))),
        }
    }

    /// Set the writer to use when rendering diagnostics
    pub fn set_diagnostic_writer(&mut self, stream: impl 'static + WriteColor) {
        self.diagnostic_writer = RefCell::new(Box::new(stream) as Box<dyn WriteColor>);
    }

    /// Set the width to use when emitting types and values
    pub fn set_emit_width(&mut self, emit_width: usize) {
        self.emit_width = emit_width;
    }

    /// Set the writer to use when emitting types and values
    pub fn set_emit_writer(&mut self, stream: impl 'static + WriteColor) {
        self.emit_writer = RefCell::new(Box::new(stream) as Box<dyn WriteColor>);
    }

    /// Returns true if an error diagnostic has been emitted.
    pub fn seen_errors(&self) -> bool {
        *self.seen_errors.borrow()
    }

    /// Load the source of a type into the file database.
    pub fn load_type_string(&mut self, name: String, source: String) -> FileId {
        self.files.add(name, source)
    }

    /// Print the canonical form of a type.
    pub fn show_and_emit_type(&mut self, file_id: FileId) -> Status {
        let (ty, _) = match self.resolve_type(file_id) {
            Some(resolved) => resolved,
            None => return Status::Error,
        };

        self.emit_doc(pretty::Context::new().ty(&ty));
        Status::Ok
    }

    /// Parse tokens as a type, printing the value.
    pub fn parse_and_emit(&mut self, file_id: FileId, tokens: &[String]) -> Status {
        let (ty, parser) = match self.resolve_type(file_id) {
            Some(resolved) => resolved,
            None => return Status::Error,
        };

        let input = match shape_tokens(&ty, tokens) {
            Ok(input) => input,
            Err(token) => {
                self.emit_diagnostic(
                    Diagnostic::error()
                        .with_message(format!("expected `name=value`, found `{token}`"))
                        .with_notes(vec![format!("`{ty}` is parsed from named values")]),
                );
                return Status::Error;
            }
        };
        info!(%input, "parsing input");

        match parser.parse(&input) {
            Ok(value) => {
                self.emit_doc(pretty::Context::new().value(&value));
                Status::Ok
            }
            Err(error) => {
                self.emit_diagnostic(error.to_diagnostic());
                Status::Error
            }
        }
    }

    fn resolve_type(&self, file_id: FileId) -> Option<(TypeSpec, Parser)> {
        let source = match self.files.get(file_id) {
            Ok(file) => file.source(),
            Err(error) => {
                self.emit_diagnostic(Diagnostic::bug().with_message(error.to_string()));
                return None;
            }
        };

        let ty = match surface::parse_type(source) {
            Ok(ty) => ty,
            Err(error) => {
                self.emit_diagnostic(error.to_diagnostic(file_id));
                return None;
            }
        };

        match self.registry.resolve(&ty) {
            Ok(parser) => Some((ty, parser)),
            Err(error) => {
                self.emit_diagnostic(error.to_diagnostic());
                None
            }
        }
    }

    fn emit_doc(&self, doc: ::pretty::RcDoc<'static>) {
        let mut emit_writer = self.emit_writer.borrow_mut();
        let result = writeln!(emit_writer, "{}", doc.pretty(self.emit_width))
            .and_then(|()| emit_writer.flush());
        if let Err(error) = result {
            debug!(%error, "failed to write output");
        }
    }

    pub fn emit_diagnostic(&self, diagnostic: Diagnostic<FileId>) {
        let mut writer = self.diagnostic_writer.borrow_mut();
        let config = &self.codespan_config;

        let result = codespan_reporting::term::emit(&mut *writer, config, &self.files, &diagnostic);
        if let Err(error) = result.map_err(|e| e.to_string()).and_then(|()| {
            writer.flush().map_err(|e| e.to_string())
        }) {
            debug!(%error, "failed to write diagnostic");
        }

        if diagnostic.severity >= Severity::Error {
            *self.seen_errors.borrow_mut() = true;
        }
    }
}

impl Default for Driver {
    fn default() -> Driver {
        Driver::new()
    }
}

/// Arrange command line tokens into the input expected by a type.
///
/// Types that expect a sequence take one token per element, and types that
/// expect named values take `name=value` tokens. Other types take a single
/// token, or no token for the absent sentinel. On failure the offending
/// token is returned.
pub fn shape_tokens(ty: &TypeSpec, tokens: &[String]) -> Result<Input, String> {
    match (ty.shape(), tokens) {
        (Shape::Seq, tokens) => Ok(Input::tokens(tokens.iter().cloned())),
        (Shape::Map, tokens) => (tokens.iter())
            .map(|token| match token.split_once('=') {
                Some((name, value)) => Ok((name.to_owned(), Input::token(value))),
                None => Err(token.clone()),
            })
            .collect::<Result<_, _>>()
            .map(Input::Map),
        (Shape::Scalar, []) => Ok(Input::Absent),
        (Shape::Scalar, [token]) => Ok(Input::token(token.as_str())),
        (Shape::Scalar, tokens) => Ok(Input::tokens(tokens.iter().cloned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codespan_reporting::term::termcolor::NoColor;
    use std::io::Write;
    use std::rc::Rc;

    /// A writer that can be read back after the driver is done with it.
    #[derive(Clone, Default)]
    struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.borrow_mut().write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.borrow().clone()).unwrap()
        }
    }

    fn driver() -> (Driver, SharedBuffer, SharedBuffer) {
        let (output, diagnostics) = (SharedBuffer::default(), SharedBuffer::default());
        let mut driver = Driver::new();
        driver.set_emit_writer(NoColor::new(output.clone()));
        driver.set_diagnostic_writer(NoColor::new(diagnostics.clone()));
        (driver, output, diagnostics)
    }

    fn tokens(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|token| token.to_string()).collect()
    }

    #[test]
    fn shaping() {
        let int = TypeSpec::INT;
        assert_eq!(shape_tokens(&int, &[]), Ok(Input::Absent));
        assert_eq!(shape_tokens(&int, &tokens(&["1"])), Ok(Input::token("1")));
        assert_eq!(
            shape_tokens(&TypeSpec::sequence(int.clone()), &tokens(&["1"])),
            Ok(Input::tokens(["1"])),
        );
        assert_eq!(
            shape_tokens(
                &TypeSpec::mapping(TypeSpec::STR, int),
                &tokens(&["a=1", "b==2"]),
            ),
            Ok(Input::named([("a", "1"), ("b", "=2")])),
        );
        assert_eq!(
            shape_tokens(&TypeSpec::record(None, []), &tokens(&["oops"])),
            Err("oops".to_owned()),
        );
    }

    #[test]
    fn parse_and_emit_values() {
        let (mut driver, output, diagnostics) = driver();
        let file_id = driver.load_type_string("<TYPE>".to_owned(), "list[int | None]".to_owned());

        let status = driver.parse_and_emit(file_id, &tokens(&["1", "None", "-3"]));
        assert_eq!(status, Status::Ok);
        assert_eq!(output.contents(), "[1, None, -3]\n");
        assert_eq!(diagnostics.contents(), "");
        assert!(!driver.seen_errors());
    }

    #[test]
    fn parse_errors_are_reported() {
        let (mut driver, output, diagnostics) = driver();
        let file_id = driver.load_type_string("<TYPE>".to_owned(), "int | None".to_owned());

        let status = driver.parse_and_emit(file_id, &tokens(&["abc"]));
        assert_eq!(status, Status::Error);
        assert_eq!(output.contents(), "");
        assert!(diagnostics
            .contents()
            .starts_with("error: \"abc\" does not match any alternative of `int | None`"));
        assert!(driver.seen_errors());
    }

    #[test]
    fn syntax_errors_are_reported() {
        let (mut driver, _, diagnostics) = driver();
        let file_id = driver.load_type_string("<TYPE>".to_owned(), "list[int".to_owned());

        assert_eq!(driver.show_and_emit_type(file_id), Status::Error);
        assert!(diagnostics
            .contents()
            .starts_with("error: unexpected end of type"));
    }

    #[test]
    fn show_canonical_types() {
        let (mut driver, output, _) = driver();
        let file_id =
            driver.load_type_string("<TYPE>".to_owned(), "optional[tuple[int,...]]".to_owned());

        assert_eq!(driver.show_and_emit_type(file_id), Status::Ok);
        assert_eq!(output.contents(), "list[int] | None\n");
    }
}
