use super::Parser;
use crate::ast::*;
use crate::parse_err::ErrorType;
use lexer::Token;
use shared_context::Identifier;

impl<'src, 'ctx> Parser<'src, 'ctx> {
    pub(super) fn parse_block(&mut self) -> Result<Block, ErrorType> {
        let start = self.expect(Token::LeftCurlyBracket, "'{'")?;
        let mut items = Vec::new();
        while self.peek() != Some(Token::RightCurlyBracket) {
            items.push(self.parse_block_item()?);
        }
        let end = self.expect(Token::RightCurlyBracket, "'}'")?;
        Ok(Block::new(items, start.merge(&end)))
    }

    fn parse_block_item(&mut self) -> Result<BlockItem, ErrorType> {
        if self.at_declaration_start() {
            Ok(BlockItem::D(self.parse_declaration()?))
        } else {
            Ok(BlockItem::S(self.parse_statement()?))
        }
    }

    pub(super) fn parse_statement(&mut self) -> Result<Statement, ErrorType> {
        let start = self.current_span();

        let kind = match self.peek() {
            Some(Token::Return) => {
                self.advance();
                let expr = self.parse_expression(0)?;
                self.expect(Token::Semicolon, "';'")?;
                StatementType::Return(expr)
            }
            Some(Token::Semicolon) => {
                self.advance();
                StatementType::Null
            }
            Some(Token::LeftCurlyBracket) => StatementType::Compound(self.parse_block()?),
            Some(Token::If) => self.parse_if_statement()?,
            Some(Token::While) => self.parse_while_statement()?,
            Some(Token::Do) => self.parse_do_while_statement()?,
            Some(Token::For) => self.parse_for_statement()?,
            Some(Token::Break) => {
                self.advance();
                self.expect(Token::Semicolon, "';'")?;
                StatementType::Break(Identifier::default())
            }
            Some(Token::Continue) => {
                self.advance();
                self.expect(Token::Semicolon, "';'")?;
                StatementType::Continue(Identifier::default())
            }
            Some(Token::Goto) => {
                self.advance();
                let target = self.expect_identifier()?;
                self.expect(Token::Semicolon, "';'")?;
                StatementType::Goto(target)
            }
            Some(Token::Identifier) if self.peek_nth(1) == Some(Token::Colon) => {
                let label = self.expect_identifier()?;
                self.advance(); // ':'
                let inner = Box::new(self.parse_statement()?);
                StatementType::Label(label, inner)
            }
            _ => {
                let expr = self.parse_expression(0)?;
                self.expect(Token::Semicolon, "';'")?;
                StatementType::ExprStatement(expr)
            }
        };

        let span = start.merge(&self.previous_span());
        Ok(Statement::new(kind, span))
    }

    fn parse_if_statement(&mut self) -> Result<StatementType, ErrorType> {
        self.advance(); // 'if'
        self.expect(Token::LeftParenthesis, "'('")?;
        let condition = self.parse_expression(0)?;
        self.expect(Token::RightParenthesis, "')'")?;
        let if_clause = Box::new(self.parse_statement()?);
        let else_clause = if self.peek() == Some(Token::Else) {
            self.advance();
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(StatementType::IfStatement {
            condition,
            if_clause,
            else_clause,
        })
    }

    fn parse_while_statement(&mut self) -> Result<StatementType, ErrorType> {
        self.advance(); // 'while'
        self.expect(Token::LeftParenthesis, "'('")?;
        let condition = self.parse_expression(0)?;
        self.expect(Token::RightParenthesis, "')'")?;
        let body = Box::new(self.parse_statement()?);
        Ok(StatementType::While {
            condition,
            body,
            label: Identifier::default(),
        })
    }

    fn parse_do_while_statement(&mut self) -> Result<StatementType, ErrorType> {
        self.advance(); // 'do'
        let body = Box::new(self.parse_statement()?);
        self.expect(Token::While, "'while'")?;
        self.expect(Token::LeftParenthesis, "'('")?;
        let condition = self.parse_expression(0)?;
        self.expect(Token::RightParenthesis, "')'")?;
        self.expect(Token::Semicolon, "';'")?;
        Ok(StatementType::DoWhile {
            condition,
            body,
            label: Identifier::default(),
        })
    }

    fn parse_for_statement(&mut self) -> Result<StatementType, ErrorType> {
        self.advance(); // 'for'
        self.expect(Token::LeftParenthesis, "'('")?;
        let init = self.parse_for_init()?;
        let condition = if self.peek() == Some(Token::Semicolon) {
            None
        } else {
            Some(self.parse_expression(0)?)
        };
        self.expect(Token::Semicolon, "';'")?;
        let post = if self.peek() == Some(Token::RightParenthesis) {
            None
        } else {
            Some(self.parse_expression(0)?)
        };
        self.expect(Token::RightParenthesis, "')'")?;
        let body = Box::new(self.parse_statement()?);
        Ok(StatementType::For {
            init,
            condition,
            post,
            body,
            label: Identifier::default(),
        })
    }

    fn parse_for_init(&mut self) -> Result<ForInit, ErrorType> {
        if self.at_declaration_start() {
            let decl = self.parse_variable_declaration()?;
            self.expect(Token::Semicolon, "';'")?;
            Ok(ForInit::D(decl))
        } else if self.peek() == Some(Token::Semicolon) {
            self.advance();
            Ok(ForInit::E(None))
        } else {
            let expr = self.parse_expression(0)?;
            self.expect(Token::Semicolon, "';'")?;
            Ok(ForInit::E(Some(expr)))
        }
    }
}
