/*!
# Abstract Syntax Tree

Nodes are immutable once built. Every node carries the column span it
came from so diagnostics can point back into the source line.

*/

use super::options::BasicOptions;
use super::Column;
use std::rc::Rc;

#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    Number(Column, f64),
    String(Column, Rc<str>),
    /// Bare variable, array element, or function call. `None` args is
    /// a bare variable; with args, function-versus-array is decided by
    /// the runtime, not the parser.
    Lookup(Column, Rc<str>, Option<Vec<Expression>>),
    Negate(Column, Box<Expression>),
    Not(Column, Box<Expression>),
    Power(Column, Box<Expression>, Box<Expression>),
    Multiply(Column, Box<Expression>, Box<Expression>),
    Divide(Column, Box<Expression>, Box<Expression>),
    DivideInt(Column, Box<Expression>, Box<Expression>),
    Modulo(Column, Box<Expression>, Box<Expression>),
    Add(Column, Box<Expression>, Box<Expression>),
    Subtract(Column, Box<Expression>, Box<Expression>),
    Equal(Column, Box<Expression>, Box<Expression>),
    NotEqual(Column, Box<Expression>, Box<Expression>),
    Less(Column, Box<Expression>, Box<Expression>),
    LessEqual(Column, Box<Expression>, Box<Expression>),
    Greater(Column, Box<Expression>, Box<Expression>),
    GreaterEqual(Column, Box<Expression>, Box<Expression>),
    And(Column, Box<Expression>, Box<Expression>),
    Or(Column, Box<Expression>, Box<Expression>),
}

impl Expression {
    pub fn column(&self) -> Column {
        use Expression::*;
        match self {
            Number(col, ..)
            | String(col, ..)
            | Lookup(col, ..)
            | Negate(col, ..)
            | Not(col, ..)
            | Power(col, ..)
            | Multiply(col, ..)
            | Divide(col, ..)
            | DivideInt(col, ..)
            | Modulo(col, ..)
            | Add(col, ..)
            | Subtract(col, ..)
            | Equal(col, ..)
            | NotEqual(col, ..)
            | Less(col, ..)
            | LessEqual(col, ..)
            | Greater(col, ..)
            | GreaterEqual(col, ..)
            | And(col, ..)
            | Or(col, ..) => col.clone(),
        }
    }
}

/// An assignment or input target.
#[derive(Debug, PartialEq, Clone)]
pub enum Variable {
    Unary(Column, Rc<str>),
    Array(Column, Rc<str>, Vec<Expression>),
}

impl Variable {
    pub fn name(&self) -> &Rc<str> {
        match self {
            Variable::Unary(_, name) => name,
            Variable::Array(_, name, _) => name,
        }
    }

    pub fn column(&self) -> Column {
        match self {
            Variable::Unary(col, _) => col.clone(),
            Variable::Array(col, ..) => col.clone(),
        }
    }
}

/// One element of a PRINT list. Separators survive into the AST
/// because the trailing-newline rule depends on them.
#[derive(Debug, PartialEq, Clone)]
pub enum PrintItem {
    Expr(Expression),
    Comma(Column),
    Semicolon(Column),
}

#[derive(Debug, PartialEq, Clone)]
pub enum Statement {
    Data(Column, Vec<Expression>),
    Def(Column, Rc<str>, Vec<Rc<str>>, Expression),
    Dim(Column, Vec<Variable>),
    End(Column),
    For(Column, Rc<str>, Expression, Expression, Option<Expression>),
    Gosub(Column, Rc<str>),
    Goto(Column, Rc<str>),
    /// Guard: when the condition is falsy, the rest of the current
    /// line is skipped.
    If(Column, Expression),
    Input(Column, Option<Rc<str>>, Vec<Variable>),
    Let(Column, Variable, Expression),
    Next(Column, Vec<Rc<str>>),
    OnGoto(Column, Expression, Vec<Rc<str>>),
    /// Already applied by the parser; a no-op at run time.
    Option(Column, Rc<str>, Rc<str>),
    Print(Column, Vec<PrintItem>),
    Read(Column, Vec<Variable>),
    Restore(Column),
    Return(Column),
    Stop(Column),
}

impl Statement {
    pub fn column(&self) -> Column {
        use Statement::*;
        match self {
            Data(col, ..)
            | Def(col, ..)
            | Dim(col, ..)
            | End(col, ..)
            | For(col, ..)
            | Gosub(col, ..)
            | Goto(col, ..)
            | If(col, ..)
            | Input(col, ..)
            | Let(col, ..)
            | Next(col, ..)
            | OnGoto(col, ..)
            | Option(col, ..)
            | Print(col, ..)
            | Read(col, ..)
            | Restore(col, ..)
            | Return(col, ..)
            | Stop(col, ..) => col.clone(),
        }
    }
}

/// A source line: optional numeric label plus its statements. A line
/// that failed to parse contributes an empty statement list.
#[derive(Debug, PartialEq, Clone)]
pub struct BasicLine {
    pub label: Option<Rc<str>>,
    pub statements: Vec<Statement>,
    /// One-based position in the source text, for diagnostics.
    pub source_line: usize,
}

/// A whole parsed program with the dialect options that were active
/// when parsing finished.
#[derive(Debug, Clone)]
pub struct BasicProgram {
    pub options: BasicOptions,
    pub lines: Vec<BasicLine>,
}
