//! SQL Parser
//!
//! This module parses SQL tokens into an AST. Each query string yields
//! exactly one statement; trailing input other than a `;` is an error.

use tracing::debug;

use super::ast::*;
use super::lexer::Lexer;
use super::token::Token;
use crate::catalog::DataType;
use crate::error::{Error, Result};
use crate::storage::Value;

/// SQL Parser
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    /// Create a new parser from a SQL string
    pub fn new(sql: &str) -> Result<Self> {
        let mut lexer = Lexer::new(sql);
        let tokens = lexer.tokenize()?;

        Ok(Self {
            tokens,
            position: 0,
        })
    }

    /// Parse a single SQL statement
    pub fn parse(&mut self) -> Result<Statement> {
        let stmt = self.parse_statement()?;

        // Consume optional semicolon
        if self.check(&Token::Semicolon) {
            self.advance();
        }

        if !self.is_at_end() {
            return Err(self.unexpected("end of statement"));
        }

        debug!(statement = stmt.kind(), "parsed statement");
        Ok(stmt)
    }

    /// Parse a script of `;`-separated statements
    pub fn parse_all(&mut self) -> Result<Vec<Statement>> {
        let mut statements = Vec::new();

        loop {
            while self.check(&Token::Semicolon) {
                self.advance();
            }
            if self.is_at_end() {
                break;
            }

            statements.push(self.parse_statement()?);

            if !self.check(&Token::Semicolon) && !self.is_at_end() {
                return Err(self.unexpected("; or end of script"));
            }
        }

        Ok(statements)
    }

    /// Parse a single statement
    fn parse_statement(&mut self) -> Result<Statement> {
        match self.current() {
            Token::Create => self.parse_create_table().map(Statement::CreateTable),
            Token::Drop => self.parse_drop_table().map(Statement::DropTable),
            Token::Insert => self.parse_insert().map(Statement::Insert),
            Token::Select => self.parse_select().map(Statement::Select),
            Token::Update => self.parse_update().map(Statement::Update),
            Token::Delete => self.parse_delete().map(Statement::Delete),
            Token::Show => self.parse_show(),
            Token::Describe | Token::Desc => {
                self.advance();
                Ok(Statement::Describe(self.expect_identifier()?))
            }
            Token::Eof => Err(self.unexpected("a statement")),
            other => Err(Error::UnsupportedStatement(other.to_string())),
        }
    }

    /// `<KEYWORD> <next>` where `next` is not the word that makes the statement supported
    fn unsupported(&self, keyword: &str) -> Error {
        Error::UnsupportedStatement(format!("{} {}", keyword, self.current()))
    }

    // ========== CREATE TABLE ==========

    fn parse_create_table(&mut self) -> Result<CreateTableStatement> {
        self.expect(&Token::Create)?;
        if !self.check(&Token::Table) {
            return Err(self.unsupported("CREATE"));
        }
        self.advance();

        let if_not_exists = if self.check(&Token::If) {
            self.advance();
            self.expect(&Token::Not)?;
            self.expect(&Token::Exists)?;
            true
        } else {
            false
        };

        let table_name = self.expect_identifier()?;

        self.expect(&Token::LParen)?;
        let mut columns = Vec::new();
        loop {
            columns.push(self.parse_column_def()?);

            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }
        self.expect(&Token::RParen)?;

        Ok(CreateTableStatement {
            table_name,
            columns,
            if_not_exists,
        })
    }

    fn parse_column_def(&mut self) -> Result<ColumnDef> {
        let name = self.expect_identifier()?;
        let type_name = self.parse_type_name()?;
        let data_type = DataType::from_sql_name(&type_name);

        let mut primary_key = false;
        let mut unique = false;
        let mut not_null = false;
        let mut default = None;

        // Parse column constraints
        loop {
            match self.current() {
                Token::Primary => {
                    self.advance();
                    self.expect(&Token::Key)?;
                    primary_key = true;
                    not_null = true;
                }
                Token::Unique => {
                    self.advance();
                    unique = true;
                }
                Token::Not => {
                    self.advance();
                    self.expect(&Token::Null)?;
                    not_null = true;
                }
                Token::Null => {
                    // explicit NULL is the default
                    self.advance();
                }
                Token::Default => {
                    self.advance();
                    default = Some(self.parse_value()?);
                }
                _ => break,
            }
        }

        Ok(ColumnDef {
            name,
            type_name,
            data_type,
            primary_key,
            unique,
            not_null,
            default,
        })
    }

    /// Type words plus any parenthesised arguments, e.g. `varchar(255)` or
    /// `timestamp with time zone`
    fn parse_type_name(&mut self) -> Result<String> {
        let mut words: Vec<String> = Vec::new();

        while let Token::Identifier(word) = self.current().clone() {
            self.advance();
            let mut word = word;

            if self.check(&Token::LParen) {
                self.advance();
                let mut args = Vec::new();
                while !self.check(&Token::RParen) {
                    if self.is_at_end() {
                        return Err(self.unexpected(")"));
                    }
                    if !self.check(&Token::Comma) {
                        args.push(self.current().to_string());
                    }
                    self.advance();
                }
                self.advance(); // consume )
                word = format!("{}({})", word, args.join(","));
            }
            words.push(word);
        }

        if words.is_empty() {
            return Err(self.unexpected("column type"));
        }
        Ok(words.join(" "))
    }

    // ========== DROP TABLE ==========

    fn parse_drop_table(&mut self) -> Result<DropTableStatement> {
        self.expect(&Token::Drop)?;
        if !self.check(&Token::Table) {
            return Err(self.unsupported("DROP"));
        }
        self.advance();

        let if_exists = if self.check(&Token::If) {
            self.advance();
            self.expect(&Token::Exists)?;
            true
        } else {
            false
        };

        let table_name = self.expect_identifier()?;

        Ok(DropTableStatement {
            table_name,
            if_exists,
        })
    }

    // ========== INSERT Statement ==========

    fn parse_insert(&mut self) -> Result<InsertStatement> {
        self.expect(&Token::Insert)?;
        if !self.check(&Token::Into) {
            return Err(self.unsupported("INSERT"));
        }
        self.advance();

        let table_name = self.expect_identifier()?;

        // Optional column list
        let columns = if self.check(&Token::LParen) {
            self.advance();
            let cols = self.parse_identifier_list()?;
            self.expect(&Token::RParen)?;
            Some(cols)
        } else {
            None
        };

        self.expect(&Token::Values)?;

        // Parse value rows
        let mut values = Vec::new();
        loop {
            self.expect(&Token::LParen)?;
            let mut row = Vec::new();
            loop {
                row.push(self.parse_value()?);
                if !self.check(&Token::Comma) {
                    break;
                }
                self.advance();
            }
            self.expect(&Token::RParen)?;
            values.push(row);

            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }

        Ok(InsertStatement {
            table_name,
            columns,
            values,
        })
    }

    // ========== SELECT Statement ==========

    fn parse_select(&mut self) -> Result<SelectStatement> {
        self.expect(&Token::Select)?;

        let columns = if self.check(&Token::Asterisk) {
            self.advance();
            vec!["*".to_string()]
        } else {
            let mut cols = Vec::new();
            loop {
                cols.push(self.parse_column_ref()?);
                if !self.check(&Token::Comma) {
                    break;
                }
                self.advance();
            }
            cols
        };

        self.expect(&Token::From)?;
        let table_name = self.expect_identifier()?;

        let join = if self.is_join_keyword() {
            let join = self.parse_join(&table_name)?;
            if self.is_join_keyword() {
                return Err(Error::InvalidJoin(
                    "only one JOIN per SELECT is supported".to_string(),
                ));
            }
            Some(join)
        } else {
            None
        };

        let where_clause = self.parse_where()?;

        Ok(SelectStatement {
            columns,
            table_name,
            join,
            where_clause,
        })
    }

    fn is_join_keyword(&self) -> bool {
        matches!(self.current(), Token::Join | Token::Inner | Token::Left)
    }

    fn parse_join(&mut self, from_table: &str) -> Result<JoinClause> {
        let join_type = match self.current() {
            Token::Inner => {
                self.advance();
                JoinType::Inner
            }
            Token::Left => {
                self.advance();
                if self.check(&Token::Outer) {
                    self.advance();
                }
                JoinType::Left
            }
            // Just JOIN means INNER JOIN
            _ => JoinType::Inner,
        };
        self.expect(&Token::Join)?;

        let table_name = self.expect_identifier()?;
        self.expect(&Token::On)?;

        let (first_table, first_column) = self.parse_qualified_column()?;
        self.expect(&Token::Eq)?;
        let (second_table, second_column) = self.parse_qualified_column()?;

        let (left_column, right_column) =
            if first_table == from_table && second_table == table_name {
                (first_column, second_column)
            } else if first_table == table_name && second_table == from_table {
                (second_column, first_column)
            } else {
                return Err(Error::InvalidJoin(format!(
                    "join condition must compare a column of '{}' with a column of '{}'",
                    from_table, table_name
                )));
            };

        Ok(JoinClause {
            join_type,
            table_name,
            left_column,
            right_column,
        })
    }

    // ========== UPDATE Statement ==========

    fn parse_update(&mut self) -> Result<UpdateStatement> {
        self.expect(&Token::Update)?;

        let table_name = self.expect_identifier()?;

        self.expect(&Token::Set)?;

        let mut assignments = Vec::new();
        loop {
            let column = self.expect_identifier()?;
            self.expect(&Token::Eq)?;
            let value = self.parse_value()?;
            assignments.push((column, value));

            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }

        let where_clause = self.parse_where()?;

        Ok(UpdateStatement {
            table_name,
            assignments,
            where_clause,
        })
    }

    // ========== DELETE Statement ==========

    fn parse_delete(&mut self) -> Result<DeleteStatement> {
        self.expect(&Token::Delete)?;
        if !self.check(&Token::From) {
            return Err(self.unsupported("DELETE"));
        }
        self.advance();

        let table_name = self.expect_identifier()?;
        let where_clause = self.parse_where()?;

        Ok(DeleteStatement {
            table_name,
            where_clause,
        })
    }

    // ========== SHOW TABLES ==========

    fn parse_show(&mut self) -> Result<Statement> {
        self.expect(&Token::Show)?;
        if !self.check(&Token::Tables) {
            return Err(self.unsupported("SHOW"));
        }
        self.advance();
        Ok(Statement::ShowTables)
    }

    // ========== WHERE clause ==========

    /// Optional `WHERE c OP v [AND c OP v]...`; empty when absent
    fn parse_where(&mut self) -> Result<Vec<Condition>> {
        let mut conditions = Vec::new();
        if !self.check(&Token::Where) {
            return Ok(conditions);
        }
        self.advance();

        loop {
            let column = self.parse_column_ref()?;
            let op = self.parse_comparison_op()?;
            let value = self.parse_value()?;
            conditions.push(Condition { column, op, value });

            if !self.check(&Token::And) {
                break;
            }
            self.advance();
        }

        Ok(conditions)
    }

    fn parse_comparison_op(&mut self) -> Result<ComparisonOp> {
        let op = match self.current() {
            Token::Eq => ComparisonOp::Eq,
            Token::Neq => ComparisonOp::Neq,
            Token::Lt => ComparisonOp::Lt,
            Token::Gt => ComparisonOp::Gt,
            Token::Lte => ComparisonOp::Lte,
            Token::Gte => ComparisonOp::Gte,
            _ => return Err(self.unexpected("comparison operator")),
        };
        self.advance();
        Ok(op)
    }

    // ========== Values and names ==========

    /// Literal value. Bare words are kept as strings.
    fn parse_value(&mut self) -> Result<Value> {
        let value = match self.current().clone() {
            Token::NumberLiteral(n) => Value::Number(n),
            Token::StringLiteral(s) => Value::String(s),
            Token::True => Value::Boolean(true),
            Token::False => Value::Boolean(false),
            Token::Null => Value::Null,
            Token::Identifier(word) => Value::String(word),
            _ => return Err(self.unexpected("value")),
        };
        self.advance();
        Ok(value)
    }

    /// `column` or `table.column`
    fn parse_column_ref(&mut self) -> Result<String> {
        let name = self.expect_identifier()?;
        if self.check(&Token::Dot) {
            self.advance();
            let column = self.expect_identifier()?;
            return Ok(format!("{}.{}", name, column));
        }
        Ok(name)
    }

    /// `table.column`, returned as (table, column)
    fn parse_qualified_column(&mut self) -> Result<(String, String)> {
        let table = self.expect_identifier()?;
        self.expect(&Token::Dot)?;
        let column = self.expect_identifier()?;
        Ok((table, column))
    }

    fn parse_identifier_list(&mut self) -> Result<Vec<String>> {
        let mut identifiers = Vec::new();

        loop {
            identifiers.push(self.expect_identifier()?);

            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }

        Ok(identifiers)
    }

    // ========== Helper functions ==========

    fn current(&self) -> &Token {
        self.tokens.get(self.position).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        matches!(self.current(), Token::Eof)
    }

    fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(self.current()) == std::mem::discriminant(token)
    }

    fn unexpected(&self, expected: &str) -> Error {
        Error::UnexpectedToken {
            expected: expected.to_string(),
            found: self.current().to_string(),
        }
    }

    fn expect(&mut self, token: &Token) -> Result<()> {
        if self.check(token) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(&token.to_string()))
        }
    }

    /// A table or column name; unreserved keywords such as `key` or `desc` qualify
    fn expect_identifier(&mut self) -> Result<String> {
        match self.current().as_name() {
            Some(name) => {
                self.advance();
                Ok(name)
            }
            None => Err(self.unexpected("identifier")),
        }
    }
}

/// Parse one statement from `sql`
pub fn parse(sql: &str) -> Result<Statement> {
    Parser::new(sql)?.parse()
}
