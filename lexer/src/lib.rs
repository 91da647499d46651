use logos::Logos;
use shared_context::Span;

pub mod token;
pub use token::Token;

/// One lexeme, its classified `Token` kind, and its location in the
/// source text.
pub struct SpannedToken<'source> {
    pub token: Token,
    pub lexeme: &'source str,
    pub span: Span,
}

impl<'source> SpannedToken<'source> {
    pub fn get_token(&self) -> Token {
        self.token
    }

    pub fn get_lexeme(&self) -> &'source str {
        self.lexeme
    }

    pub fn get_span(&self) -> Span {
        self.span
    }
}

/// A lexeme `logos` could not classify, or an explicitly-invalid
/// pattern (a numeric literal glued to an identifier, e.g. `9main`).
#[derive(Debug)]
pub struct LexError<'source> {
    pub lexeme: &'source str,
    pub span: Span,
}

impl<'source> std::fmt::Display for LexError<'source> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid token '{}'", self.lexeme)
    }
}

impl<'source> std::error::Error for LexError<'source> {}

pub struct Lexer<'source> {
    iter: logos::Lexer<'source, Token>,
    input: &'source str,
    line: usize,
    last_pos: usize,
}

impl<'source> Lexer<'source> {
    pub fn new(input: &'source str) -> Self {
        Self {
            iter: Token::lexer(input),
            input,
            line: 1,
            last_pos: 0,
        }
    }

    /// Returns the next token, or `None` at end of input.
    ///
    /// A lexeme matched by the `Invalid` pattern, or one `logos` rejects
    /// outright, is surfaced as `Err` rather than a panic: lexical
    /// errors are user errors, not internal bugs, and the driver reports
    /// them the same way it reports parse/semantic errors.
    pub fn next(&mut self) -> Option<Result<SpannedToken<'source>, LexError<'source>>> {
        let matched = self.iter.next()?;
        let byte_span = self.iter.span();
        let lexeme = self.iter.slice();

        self.count_lines(byte_span.start);
        let span = Span::new(byte_span.start, byte_span.end, self.line);
        self.last_pos = byte_span.end;

        match matched {
            Ok(Token::Invalid) => Some(Err(LexError { lexeme, span })),
            Ok(token) => Some(Ok(SpannedToken {
                token,
                lexeme,
                span,
            })),
            Err(()) => Some(Err(LexError { lexeme, span })),
        }
    }

    /// Advances the line counter past every newline between the last
    /// token's end and `start`, covering newlines inside skipped
    /// whitespace/comments (which never surface as a token of their
    /// own).
    fn count_lines(&mut self, start: usize) {
        for ch in self.input[self.last_pos..start].chars() {
            if ch == '\n' {
                self.line += 1;
            }
        }
    }

    pub fn get_source_code(&self) -> &'source str {
        self.input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(input: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(input);
        let mut tokens = Vec::new();
        while let Some(tok) = lexer.next() {
            tokens.push(tok.expect("unexpected lex error").token);
        }
        tokens
    }

    #[test]
    fn lexes_a_minimal_function() {
        let tokens = collect("int main(void) { return 0; }");
        assert_eq!(
            tokens,
            vec![
                Token::Int,
                Token::Identifier,
                Token::LeftParenthesis,
                Token::Void,
                Token::RightParenthesis,
                Token::LeftCurlyBracket,
                Token::Return,
                Token::ConstantInt,
                Token::Semicolon,
                Token::RightCurlyBracket,
            ]
        );
    }

    #[test]
    fn distinguishes_integer_suffixes() {
        let tokens = collect("10 10L 10U 10UL 10lu");
        assert_eq!(
            tokens,
            vec![
                Token::ConstantInt,
                Token::ConstantLong,
                Token::ConstantUInt,
                Token::ConstantULong,
                Token::ConstantULong,
            ]
        );
    }

    #[test]
    fn lexes_a_double_constant() {
        let tokens = collect("1.5 .5 3. 1e10 2.5e-3");
        assert_eq!(tokens, vec![Token::ConstantDouble; 5]);
    }

    #[test]
    fn rejects_digit_glued_to_identifier() {
        let mut lexer = Lexer::new("9main");
        let err = lexer.next().unwrap();
        assert!(err.is_err());
    }

    #[test]
    fn tracks_line_numbers_across_comments_and_blanks() {
        let mut lexer = Lexer::new("int a;\n// comment\nint b;");
        let first = lexer.next().unwrap().unwrap();
        assert_eq!(first.span.line, 1);

        // skip to the second `int`
        lexer.next().unwrap().unwrap(); // a
        lexer.next().unwrap().unwrap(); // ;
        let second = lexer.next().unwrap().unwrap();
        assert_eq!(second.token, Token::Int);
        assert_eq!(second.span.line, 3);
    }
}
