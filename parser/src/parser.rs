use crate::ast::*;
use crate::parse_err::{ErrorType, ParseErr};
use lexer::{Lexer, Token};
use shared_context::{CompilerContext, Identifier, Span, SpannedIdentifier};

mod declarations;
mod expressions;
mod statements;

struct Lexeme<'src> {
    token: Token,
    text: &'src str,
    span: Span,
}

/// A hand-rolled recursive-descent parser: the whole input is lexed up
/// front into `tokens` so declarator and expression parsing can peek
/// ahead without re-driving the lexer, matching the teacher's
/// single-pass-then-walk style in `semantic_analysis`.
pub struct Parser<'src, 'ctx> {
    tokens: Vec<Lexeme<'src>>,
    pos: usize,
    ctx: &'ctx mut CompilerContext<'src>,
}

impl<'src, 'ctx> Parser<'src, 'ctx> {
    fn new(tokens: Vec<Lexeme<'src>>, ctx: &'ctx mut CompilerContext<'src>) -> Self {
        Self {
            tokens,
            pos: 0,
            ctx,
        }
    }

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).map(|t| t.token)
    }

    fn peek_nth(&self, n: usize) -> Option<Token> {
        self.tokens.get(self.pos + n).map(|t| t.token)
    }

    /// The span of the most recently consumed token; used to compute a
    /// node's full span by merging it with the span the node started
    /// at.
    fn previous_span(&self) -> Span {
        self.tokens
            .get(self.pos.saturating_sub(1))
            .map(|t| t.span)
            .unwrap_or_default()
    }

    fn current_span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .map(|t| t.span)
            .or_else(|| self.tokens.last().map(|t| t.span))
            .unwrap_or_default()
    }

    fn advance(&mut self) -> Option<&Lexeme<'src>> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    /// Consumes the current token if it matches `expected`, erroring
    /// with `what` (a human description) otherwise.
    fn expect(&mut self, expected: Token, what: &'static str) -> Result<Span, ErrorType> {
        match self.peek() {
            Some(found) if found == expected => {
                let span = self.current_span();
                self.advance();
                Ok(span)
            }
            Some(found) => Err(ErrorType::UnexpectedToken {
                expected: what,
                found,
                span: self.current_span(),
            }),
            None => Err(ErrorType::UnexpectedEof { expected: what }),
        }
    }

    fn expect_identifier(&mut self) -> Result<SpannedIdentifier, ErrorType> {
        match self.peek() {
            Some(Token::Identifier) => {
                let lexeme = self.tokens[self.pos].text;
                let span = self.current_span();
                self.advance();
                let symbol = self.ctx.interner.intern(lexeme);
                Ok(SpannedIdentifier::new(Identifier::new(symbol, 0), span))
            }
            Some(found) => Err(ErrorType::UnexpectedToken {
                expected: "an identifier",
                found,
                span: self.current_span(),
            }),
            None => Err(ErrorType::UnexpectedEof {
                expected: "an identifier",
            }),
        }
    }

    fn parse_program(&mut self) -> Result<Program, ErrorType> {
        let mut declarations = Vec::new();
        while self.peek().is_some() {
            declarations.push(self.parse_file_scope_declaration()?);
        }
        Ok(Program::new(declarations))
    }
}

/// Lexes `lexer` to completion and parses the resulting token stream
/// into a `Program`, reporting the first lexical or syntactic error.
pub fn parse<'src, 'ctx>(
    mut lexer: Lexer<'src>,
    ctx: &'ctx mut CompilerContext<'src>,
) -> Result<Program, ParseErr> {
    let mut tokens = Vec::new();
    while let Some(tok) = lexer.next() {
        match tok {
            Ok(spanned) => tokens.push(Lexeme {
                token: spanned.token,
                text: spanned.lexeme,
                span: spanned.span,
            }),
            Err(lex_err) => {
                return Err(ParseErr::new(
                    ErrorType::LexFailure {
                        lexeme: lex_err.lexeme.to_string(),
                        span: lex_err.span,
                    },
                    &ctx.source_map,
                ));
            }
        }
    }

    let mut parser = Parser::new(tokens, &mut *ctx);
    let result = parser.parse_program();
    drop(parser);
    result.map_err(|err| ParseErr::new(err, &ctx.source_map))
}
