use chumsky::prelude::*;
use thiserror::Error;

use crate::diagnostic::{line_col, Diagnostic, Label, Span};
use crate::token::{Token, TokenKind};

#[derive(Debug, Clone, Error)]
#[error("{message} (line {line})")]
pub struct LexError {
    pub message: String,
    pub span: Span,
    pub line: usize,
}

impl LexError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.message.clone())
            .with_code("E0001")
            .with_line(self.line)
            .with_label(Label::primary(self.span, ""))
    }
}

pub fn lexer<'a>() -> impl Parser<'a, &'a str, Vec<(TokenKind, SimpleSpan)>, extra::Err<Rich<'a, char>>> {
    let exponent = one_of("eE").then(one_of("+-").or_not()).then(text::digits(10));

    let number = text::int(10)
        .then(just('.').then(text::digits(10)).or_not())
        .then(exponent.or_not())
        .to_slice()
        .try_map(|s: &str, span| {
            s.parse::<f64>()
                .map(TokenKind::Number)
                .map_err(|_| Rich::custom(span, format!("Bad number '{}'", s)))
        });

    let escape = just('\\').ignore_then(choice((
        just('\\'),
        just('/'),
        just('"'),
        just('\''),
        just('b').to('\u{8}'),
        just('f').to('\u{c}'),
        just('n').to('\n'),
        just('r').to('\r'),
        just('t').to('\t'),
    )));

    let double_quoted = just('"')
        .ignore_then(none_of("\\\"").or(escape.clone()).repeated().collect::<String>())
        .then_ignore(just('"'));

    let single_quoted = just('\'')
        .ignore_then(none_of("\\'").or(escape).repeated().collect::<String>())
        .then_ignore(just('\''));

    let string = double_quoted.or(single_quoted).map(TokenKind::String);

    let name = text::ident().map(|s: &str| TokenKind::Name(s.to_string()));

    // Longest spellings first so `===` is not split.
    let compound = choice((
        just("==="),
        just("!=="),
        just("..."),
        just("**"),
        just("<="),
        just(">="),
        just("&&"),
        just("||"),
    ))
    .map(|op: &str| TokenKind::Operator(op.to_string()));

    // Any other visible character is an operator; the grammar rejects unknown ones.
    // A stray quote is an unterminated string, not an operator.
    let single = any()
        .filter(|c: &char| !c.is_whitespace() && *c != '"' && *c != '\'')
        .map(|c: char| TokenKind::Operator(c.to_string()));

    let comment = just("//")
        .then(any().and_is(just('\n').not()).repeated())
        .padded();

    let token = choice((number, string, name, compound, single)).map_with(|kind, e| (kind, e.span()));

    token
        .padded_by(comment.repeated())
        .padded()
        .repeated()
        .collect()
        .then_ignore(end())
}

/// Scan `source` into the token stream consumed by the parser.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let spanned = lexer().parse(source).into_result().map_err(|errors| {
        let (message, span) = errors
            .first()
            .map(|error| (error.to_string(), Span::new(error.span().start, error.span().end)))
            .unwrap_or_else(|| ("Unrecognised input".to_string(), Span::dummy()));
        LexError {
            message,
            span,
            line: line_col(source, span.start).0,
        }
    })?;

    let mut tokens = Vec::with_capacity(spanned.len());
    let mut line = 1;
    let mut cursor = 0;
    for (kind, span) in spanned {
        line += source[cursor..span.start].matches('\n').count();
        cursor = span.start;
        tokens.push(Token::new(kind, Span::new(span.start, span.end), line));
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .expect("Lexer failed")
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    fn op(s: &str) -> TokenKind {
        TokenKind::Operator(s.to_string())
    }

    #[test]
    fn test_empty_source() {
        assert!(kinds("").is_empty());
        assert!(kinds("   \n\t ").is_empty());
    }

    #[test]
    fn test_names_and_keywords_are_names() {
        assert_eq!(
            kinds("let foo_1 while"),
            vec![
                TokenKind::Name("let".to_string()),
                TokenKind::Name("foo_1".to_string()),
                TokenKind::Name("while".to_string()),
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(kinds("42"), vec![TokenKind::Number(42.0)]);
        assert_eq!(kinds("3.14"), vec![TokenKind::Number(3.14)]);
        assert_eq!(kinds("1e3"), vec![TokenKind::Number(1000.0)]);
        assert_eq!(kinds("2.5E-1"), vec![TokenKind::Number(0.25)]);
    }

    #[test]
    fn test_strings_and_escapes() {
        assert_eq!(kinds(r#""hello""#), vec![TokenKind::String("hello".to_string())]);
        assert_eq!(kinds("'single'"), vec![TokenKind::String("single".to_string())]);
        assert_eq!(kinds(r#""a\nb""#), vec![TokenKind::String("a\nb".to_string())]);
        assert_eq!(kinds(r#"'it\'s'"#), vec![TokenKind::String("it's".to_string())]);
    }

    #[test]
    fn test_compound_operators() {
        assert_eq!(
            kinds("a === b !== c ** d ...e <= >= && ||"),
            vec![
                TokenKind::Name("a".to_string()),
                op("==="),
                TokenKind::Name("b".to_string()),
                op("!=="),
                TokenKind::Name("c".to_string()),
                op("**"),
                TokenKind::Name("d".to_string()),
                op("..."),
                TokenKind::Name("e".to_string()),
                op("<="),
                op(">="),
                op("&&"),
                op("||"),
            ]
        );
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(
            kinds("f(x)[0];"),
            vec![
                TokenKind::Name("f".to_string()),
                op("("),
                TokenKind::Name("x".to_string()),
                op(")"),
                op("["),
                TokenKind::Number(0.0),
                op("]"),
                op(";"),
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            kinds("// leading\nx // trailing\n// last"),
            vec![TokenKind::Name("x".to_string())]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let error = tokenize("let s = 'open;\nlet t = 1;").unwrap_err();
        assert!(error.line >= 1);
        assert_eq!(error.to_diagnostic().code.as_deref(), Some("E0001"));
    }

    #[test]
    fn test_lines_and_spans() {
        let tokens = tokenize("let a = 1;\n\nlet b = \"x\ny\";\nb;").unwrap();
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[0].span, Span::new(0, 3));
        assert_eq!(tokens[5].line, 3);
        let last = tokens.last().unwrap();
        assert_eq!(last.kind, op(";"));
        assert_eq!(last.line, 5);
    }
}
