use std::fmt;

use once_cell::sync::Lazy;

static INTERNER: Lazy<lasso::ThreadedRodeo> = Lazy::new(lasso::ThreadedRodeo::new);

/// An interned name: record field labels, enum member names and the markers
/// of custom types.
///
/// Symbols are cheap to copy and compare, and can be shared between threads.
/// The interner lives for the whole process, so resolved strings are
/// `'static`.
///
/// ## Example
///
/// ```rust
/// use infer_parser::symbol::Symbol;
///
/// assert_eq!(Symbol::intern("port"), Symbol::intern("port"));
/// assert_eq!(Symbol::intern("port").resolve(), "port");
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(lasso::Spur);

impl Symbol {
    pub fn intern(sym: impl AsRef<str>) -> Symbol {
        Symbol(INTERNER.get_or_intern(sym))
    }

    pub fn intern_static(sym: &'static str) -> Symbol {
        Symbol(INTERNER.get_or_intern_static(sym))
    }

    pub fn resolve(self) -> &'static str {
        let interner: &'static lasso::ThreadedRodeo = &INTERNER;
        interner.resolve(&self.0)
    }

    /// Returns the symbol in `candidates` closest to `name` by edit distance,
    /// if it is close enough to be a plausible typo.
    pub fn closest(name: &str, candidates: impl IntoIterator<Item = Symbol>) -> Option<Symbol> {
        closest_by(name, candidates, |symbol| symbol.resolve())
    }
}

/// Pick the candidate closest to `name`, allowing two edits or one edit for
/// every three characters, whichever is larger. A suggestion never replaces
/// the whole name.
pub(crate) fn closest_by<T>(
    name: &str,
    candidates: impl IntoIterator<Item = T>,
    to_str: impl Fn(&T) -> &str,
) -> Option<T> {
    let len = name.chars().count();
    let max_distance = std::cmp::max(2, len / 3);

    candidates
        .into_iter()
        .map(|candidate| (levenshtein::levenshtein(name, to_str(&candidate)), candidate))
        .filter(|(distance, _)| *distance <= max_distance && *distance < len)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, candidate)| candidate)
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        self.resolve()
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.resolve())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.resolve())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_is_stable() {
        let x = Symbol::intern("x");
        assert_eq!(x, Symbol::intern_static("x"));
        assert_ne!(x, Symbol::intern("y"));
        assert_eq!(x.to_string(), "x");
    }

    #[test]
    fn closest_finds_typos() {
        let fields = [Symbol::intern("width"), Symbol::intern("height")];

        assert_eq!(Symbol::closest("widht", fields), Some(fields[0]));
        assert_eq!(Symbol::closest("heigth", fields), Some(fields[1]));
        assert_eq!(Symbol::closest("depth", fields), None);
    }
}
