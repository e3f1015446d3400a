//! SQL Abstract Syntax Tree (AST)
//!
//! This module defines the statements the parser produces. A statement is
//! built once per query string and consumed once by the executor.

use crate::catalog::DataType;
use crate::storage::Value;

/// A SQL statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// CREATE TABLE statement
    CreateTable(CreateTableStatement),
    /// DROP TABLE statement
    DropTable(DropTableStatement),
    /// INSERT statement
    Insert(InsertStatement),
    /// SELECT statement
    Select(SelectStatement),
    /// UPDATE statement
    Update(UpdateStatement),
    /// DELETE statement
    Delete(DeleteStatement),
    /// SHOW TABLES
    ShowTables,
    /// DESCRIBE table
    Describe(String),
}

impl Statement {
    /// Short statement name, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Statement::CreateTable(_) => "CREATE TABLE",
            Statement::DropTable(_) => "DROP TABLE",
            Statement::Insert(_) => "INSERT",
            Statement::Select(_) => "SELECT",
            Statement::Update(_) => "UPDATE",
            Statement::Delete(_) => "DELETE",
            Statement::ShowTables => "SHOW TABLES",
            Statement::Describe(_) => "DESCRIBE",
        }
    }
}

/// CREATE TABLE statement
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStatement {
    /// Table name
    pub table_name: String,
    /// Column definitions
    pub columns: Vec<ColumnDef>,
    /// IF NOT EXISTS flag
    pub if_not_exists: bool,
}

/// Column definition
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    /// Column name
    pub name: String,
    /// Type as written, e.g. `varchar(255)`
    pub type_name: String,
    /// Normalised storage type
    pub data_type: DataType,
    /// PRIMARY KEY constraint
    pub primary_key: bool,
    /// UNIQUE constraint
    pub unique: bool,
    /// NOT NULL constraint
    pub not_null: bool,
    /// DEFAULT value
    pub default: Option<Value>,
}

/// DROP TABLE statement
#[derive(Debug, Clone, PartialEq)]
pub struct DropTableStatement {
    /// Table name
    pub table_name: String,
    /// IF EXISTS flag
    pub if_exists: bool,
}

/// INSERT statement
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    /// Target table name
    pub table_name: String,
    /// Column names (optional)
    pub columns: Option<Vec<String>>,
    /// One value list per row
    pub values: Vec<Vec<Value>>,
}

/// SELECT statement
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    /// Requested columns; `["*"]` for all
    pub columns: Vec<String>,
    /// FROM table
    pub table_name: String,
    /// Optional JOIN clause
    pub join: Option<JoinClause>,
    /// WHERE conditions, ANDed
    pub where_clause: Vec<Condition>,
}

/// JOIN clause, normalised so `left_column` belongs to the FROM table
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    /// Join type
    pub join_type: JoinType,
    /// Table to join
    pub table_name: String,
    /// Column of the FROM table
    pub left_column: String,
    /// Column of the joined table
    pub right_column: String,
}

/// Type of JOIN
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
}

/// UPDATE statement
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    /// Target table name
    pub table_name: String,
    /// SET clause (column, value) pairs
    pub assignments: Vec<(String, Value)>,
    /// WHERE conditions, ANDed
    pub where_clause: Vec<Condition>,
}

/// DELETE statement
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    /// Target table name
    pub table_name: String,
    /// WHERE conditions, ANDed
    pub where_clause: Vec<Condition>,
}

/// `column OP value`
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// Column name, possibly qualified as `table.column`
    pub column: String,
    /// Comparison operator
    pub op: ComparisonOp,
    /// Literal to compare against
    pub value: Value,
}

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Eq,
    Neq,
    Lt,
    Gt,
    Lte,
    Gte,
}
