use super::Parser;
use crate::ast::*;
use crate::parse_err::ErrorType;
use lexer::Token;
use shared_context::Type;

/// Maps a binary-operator token to its `BinaryOP`. Only called once
/// `Token::is_binary` has confirmed the token belongs to this set.
fn to_binary_op(tok: Token) -> BinaryOP {
    match tok {
        Token::Add => BinaryOP::Add,
        Token::Neg => BinaryOP::Subtract,
        Token::Mul => BinaryOP::Multiply,
        Token::Div => BinaryOP::Divide,
        Token::Mod => BinaryOP::Remainder,
        Token::LogicalAnd => BinaryOP::LogicalAnd,
        Token::LogicalOr => BinaryOP::LogicalOr,
        Token::Equal => BinaryOP::Equal,
        Token::NotEqual => BinaryOP::NotEqual,
        Token::LessThan => BinaryOP::LessThan,
        Token::GreaterThan => BinaryOP::GreaterThan,
        Token::LessThanOrEq => BinaryOP::LessThanOrEq,
        Token::GreaterThanOrEq => BinaryOP::GreaterThanOrEq,
        _ => unreachable!("to_binary_op called on a non-binary token"),
    }
}

/// Maps a compound-assignment token (`+=`, `-=`, ...) to the binary
/// operator it implicitly applies.
fn to_compound_op(tok: Token) -> BinaryOP {
    match tok {
        Token::AddAssign => BinaryOP::Add,
        Token::SubAssign => BinaryOP::Subtract,
        Token::MulAssign => BinaryOP::Multiply,
        Token::DivAssign => BinaryOP::Divide,
        Token::ModAssign => BinaryOP::Remainder,
        _ => unreachable!("to_compound_op called on a non-compound-assignment token"),
    }
}

impl<'src, 'ctx> Parser<'src, 'ctx> {
    /// Precedence-climbing entry point for the full expression grammar:
    /// assignment, the ternary, and every binary operator, built on top
    /// of `parse_cast_expression` for unary/cast/postfix/primary forms.
    pub(super) fn parse_expression(&mut self, min_prec: usize) -> Result<Expression, ErrorType> {
        let start = self.current_span();
        let mut left = self.parse_cast_expression()?;

        loop {
            let tok = match self.peek() {
                Some(tok) => tok,
                None => break,
            };
            let prec = tok.precedence();
            if prec < min_prec {
                break;
            }

            if tok == Token::Assignment {
                self.advance();
                let rvalue = self.parse_expression(prec)?;
                let span = start.merge(&self.previous_span());
                left = Expression::new(
                    ExpressionType::Assignment {
                        lvalue: Box::new(left),
                        rvalue: Box::new(rvalue),
                    },
                    Type::Int,
                    span,
                );
            } else if tok.is_compound_assignment() {
                self.advance();
                let operator = to_compound_op(tok);
                let rvalue = self.parse_expression(prec)?;
                let span = start.merge(&self.previous_span());
                left = Expression::new(
                    ExpressionType::CompoundAssignment {
                        operator,
                        lvalue: Box::new(left),
                        rvalue: Box::new(rvalue),
                    },
                    Type::Int,
                    span,
                );
            } else if tok == Token::QuestionMark {
                self.advance();
                let cons = self.parse_expression(0)?;
                self.expect(Token::Colon, "':'")?;
                let alt = self.parse_expression(prec)?;
                let span = start.merge(&self.previous_span());
                left = Expression::new(
                    ExpressionType::Conditional {
                        cond: Box::new(left),
                        cons: Box::new(cons),
                        alt: Box::new(alt),
                    },
                    Type::Int,
                    span,
                );
            } else if tok.is_binary() {
                self.advance();
                let operator = to_binary_op(tok);
                let right = self.parse_expression(prec + 1)?;
                let span = start.merge(&self.previous_span());
                left = Expression::new(
                    ExpressionType::Binary {
                        operator,
                        operand1: Box::new(left),
                        operand2: Box::new(right),
                    },
                    Type::Int,
                    span,
                );
            } else {
                break;
            }
        }

        Ok(left)
    }

    /// Returns true if `tok` can start a type-name (used to disambiguate
    /// a parenthesized cast from a parenthesized expression).
    fn starts_type_name(tok: Option<Token>) -> bool {
        matches!(
            tok,
            Some(Token::Int | Token::Long | Token::Unsigned | Token::Double | Token::Void)
        )
    }

    /// `cast-expression := '(' type-name ')' cast-expression | unary-expression`
    fn parse_cast_expression(&mut self) -> Result<Expression, ErrorType> {
        if self.peek() == Some(Token::LeftParenthesis) && Self::starts_type_name(self.peek_nth(1))
        {
            let start = self.current_span();
            self.advance(); // '('
            let specifiers = self.parse_specifiers()?;
            let base = specifiers
                .base
                .ok_or_else(|| ErrorType::InvalidTypeSpecifier(start))?;
            let pointer_count = self.parse_pointer_stars();
            let target_type = self.apply_pointers(base, pointer_count);
            self.expect(Token::RightParenthesis, "')'")?;
            let expr = self.parse_cast_expression()?;
            let span = start.merge(&self.previous_span());
            Ok(Expression::new(
                ExpressionType::Cast {
                    target_type,
                    expr: Box::new(expr),
                },
                target_type,
                span,
            ))
        } else {
            self.parse_unary_expression()
        }
    }

    /// `unary-expression := ('-' | '~' | '!' | '&' | '*') cast-expression
    ///                    | postfix-expression`
    fn parse_unary_expression(&mut self) -> Result<Expression, ErrorType> {
        let start = self.current_span();
        match self.peek() {
            Some(Token::Neg) => {
                self.advance();
                let operand = self.parse_cast_expression()?;
                let span = start.merge(&self.previous_span());
                Ok(Expression::new(
                    ExpressionType::Unary {
                        operator: UnaryOP::Negate,
                        operand: Box::new(operand),
                    },
                    Type::Int,
                    span,
                ))
            }
            Some(Token::Not) => {
                self.advance();
                let operand = self.parse_cast_expression()?;
                let span = start.merge(&self.previous_span());
                Ok(Expression::new(
                    ExpressionType::Unary {
                        operator: UnaryOP::Complement,
                        operand: Box::new(operand),
                    },
                    Type::Int,
                    span,
                ))
            }
            Some(Token::LogicalNot) => {
                self.advance();
                let operand = self.parse_cast_expression()?;
                let span = start.merge(&self.previous_span());
                Ok(Expression::new(
                    ExpressionType::Unary {
                        operator: UnaryOP::LogicalNot,
                        operand: Box::new(operand),
                    },
                    Type::Int,
                    span,
                ))
            }
            Some(Token::Ampersand) => {
                self.advance();
                let operand = self.parse_cast_expression()?;
                let span = start.merge(&self.previous_span());
                Ok(Expression::new(
                    ExpressionType::AddrOf(Box::new(operand)),
                    Type::Int,
                    span,
                ))
            }
            Some(Token::Mul) => {
                self.advance();
                let operand = self.parse_cast_expression()?;
                let span = start.merge(&self.previous_span());
                Ok(Expression::new(
                    ExpressionType::Dereference(Box::new(operand)),
                    Type::Int,
                    span,
                ))
            }
            _ => self.parse_postfix_expression(),
        }
    }

    /// `postfix-expression := primary-expression ('[' expression ']')*`
    fn parse_postfix_expression(&mut self) -> Result<Expression, ErrorType> {
        let start = self.current_span();
        let mut expr = self.parse_primary_expression()?;

        while self.peek() == Some(Token::LeftBracket) {
            self.advance();
            let index = self.parse_expression(0)?;
            self.expect(Token::RightBracket, "']'")?;
            let span = start.merge(&self.previous_span());
            expr = Expression::new(
                ExpressionType::Subscript {
                    array: Box::new(expr),
                    index: Box::new(index),
                },
                Type::Int,
                span,
            );
        }

        Ok(expr)
    }

    fn parse_primary_expression(&mut self) -> Result<Expression, ErrorType> {
        let start = self.current_span();
        match self.peek() {
            Some(Token::ConstantInt) => {
                let text = self.tokens[self.pos].text;
                self.advance();
                // An unsuffixed literal too large for `int` is still valid C;
                // it just takes on `long` instead (6.4.4.1).
                if let Ok(value) = text.parse::<i32>() {
                    Ok(Expression::new(
                        ExpressionType::Constant(Constant::Int(value)),
                        Type::Int,
                        start,
                    ))
                } else {
                    let value: i64 = text
                        .parse()
                        .map_err(|_| ErrorType::InvalidDeclarator(start))?;
                    Ok(Expression::new(
                        ExpressionType::Constant(Constant::Long(value)),
                        Type::Long,
                        start,
                    ))
                }
            }
            Some(Token::ConstantLong) => {
                let text = self.tokens[self.pos].text.trim_end_matches(['l', 'L']);
                self.advance();
                let value: i64 = text
                    .parse()
                    .map_err(|_| ErrorType::InvalidDeclarator(start))?;
                Ok(Expression::new(
                    ExpressionType::Constant(Constant::Long(value)),
                    Type::Long,
                    start,
                ))
            }
            Some(Token::ConstantUInt) => {
                let text = self.tokens[self.pos].text.trim_end_matches(['u', 'U']);
                self.advance();
                let value: u32 = text
                    .parse()
                    .map_err(|_| ErrorType::InvalidDeclarator(start))?;
                Ok(Expression::new(
                    ExpressionType::Constant(Constant::UInt(value)),
                    Type::UInt,
                    start,
                ))
            }
            Some(Token::ConstantULong) => {
                let text = self.tokens[self.pos]
                    .text
                    .trim_end_matches(['u', 'U', 'l', 'L']);
                self.advance();
                let value: u64 = text
                    .parse()
                    .map_err(|_| ErrorType::InvalidDeclarator(start))?;
                Ok(Expression::new(
                    ExpressionType::Constant(Constant::ULong(value)),
                    Type::ULong,
                    start,
                ))
            }
            Some(Token::ConstantDouble) => {
                let text = self.tokens[self.pos].text;
                self.advance();
                let value: f64 = text
                    .parse()
                    .map_err(|_| ErrorType::InvalidDeclarator(start))?;
                Ok(Expression::new(
                    ExpressionType::Constant(Constant::Double(value)),
                    Type::Double,
                    start,
                ))
            }
            Some(Token::Identifier) if self.peek_nth(1) == Some(Token::LeftParenthesis) => {
                let name = self.expect_identifier()?;
                self.advance(); // '('
                let mut args = Vec::new();
                if self.peek() != Some(Token::RightParenthesis) {
                    loop {
                        args.push(Box::new(self.parse_expression(0)?));
                        if self.peek() == Some(Token::Comma) {
                            self.advance();
                            continue;
                        }
                        break;
                    }
                }
                self.expect(Token::RightParenthesis, "')'")?;
                let span = start.merge(&self.previous_span());
                Ok(Expression::new(
                    ExpressionType::FunctionCall { name, args },
                    Type::Int,
                    span,
                ))
            }
            Some(Token::Identifier) => {
                let name = self.expect_identifier()?;
                Ok(Expression::new(ExpressionType::Var(name), Type::Int, start))
            }
            Some(Token::LeftParenthesis) => {
                self.advance();
                let expr = self.parse_expression(0)?;
                self.expect(Token::RightParenthesis, "')'")?;
                Ok(expr)
            }
            Some(found) => Err(ErrorType::UnexpectedToken {
                expected: "an expression",
                found,
                span: start,
            }),
            None => Err(ErrorType::UnexpectedEof {
                expected: "an expression",
            }),
        }
    }
}
