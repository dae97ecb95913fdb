use logos::Logos;

use crate::reporting::SyntaxError;

#[derive(Clone, Debug, PartialEq, Logos)]
pub enum Token<'source> {
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Name(&'source str),
    #[regex(r#""([^"\\]|\\.)*""#, |lex| &lex.slice()[1..(lex.slice().len() - 1)])]
    StringLiteral(&'source str),
    #[regex(r#"b"[^"]*""#, |lex| &lex.slice()[2..(lex.slice().len() - 1)])]
    BytesLiteral(&'source str),
    #[regex(r"[+-]?[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?")]
    #[regex(r"[+-](inf|NaN)")]
    NumberLiteral(&'source str),

    #[token("enum")]
    KeywordEnum,
    #[token("literal")]
    KeywordLiteral,

    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token("=")]
    Equals,
    #[token("...")]
    Ellipsis,
    #[token("|")]
    Pipe,
    #[token("{")]
    OpenBrace,
    #[token("}")]
    CloseBrace,
    #[token("[")]
    OpenBracket,
    #[token("]")]
    CloseBracket,
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,

    #[error]
    #[regex(r"\p{Whitespace}", logos::skip)]
    Error,
}

pub type Spanned<Tok, Loc> = (Loc, Tok, Loc);

pub fn tokens(
    source: &str,
) -> impl Iterator<Item = Result<Spanned<Token<'_>, usize>, SyntaxError>> {
    Token::lexer(source)
        .spanned()
        .map(|(token, range)| match token {
            Token::Error => Err(SyntaxError::InvalidToken { range }),
            token => Ok((range.start, token, range.end)),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<Token<'_>> {
        tokens(source).map(|result| result.unwrap().1).collect()
    }

    #[test]
    fn words_and_punctuation() {
        assert_eq!(
            lex("dict[str, list[int]] | None"),
            vec![
                Token::Name("dict"),
                Token::OpenBracket,
                Token::Name("str"),
                Token::Comma,
                Token::Name("list"),
                Token::OpenBracket,
                Token::Name("int"),
                Token::CloseBracket,
                Token::CloseBracket,
                Token::Pipe,
                Token::Name("None"),
            ],
        );
        assert_eq!(
            lex("tuple[int, ...]")[3..],
            [Token::Ellipsis, Token::CloseBracket],
        );
    }

    #[test]
    fn literals() {
        assert_eq!(
            lex(r#"1 -2 3.5 1e-3 "a \"b\"" b"00ff" bytes"#),
            vec![
                Token::NumberLiteral("1"),
                Token::NumberLiteral("-2"),
                Token::NumberLiteral("3.5"),
                Token::NumberLiteral("1e-3"),
                Token::StringLiteral(r#"a \"b\""#),
                Token::BytesLiteral("00ff"),
                Token::Name("bytes"),
            ],
        );
        assert_eq!(
            lex("-inf +NaN inf"),
            vec![
                Token::NumberLiteral("-inf"),
                Token::NumberLiteral("+NaN"),
                Token::Name("inf"),
            ],
        );
    }

    #[test]
    fn keywords() {
        assert_eq!(
            lex("enum literal enums literally"),
            vec![
                Token::KeywordEnum,
                Token::KeywordLiteral,
                Token::Name("enums"),
                Token::Name("literally"),
            ],
        );
    }

    #[test]
    fn invalid_characters() {
        let results = tokens("int & str").collect::<Vec<_>>();
        assert_eq!(results[1], Err(SyntaxError::InvalidToken { range: 4..5 }));
    }
}
