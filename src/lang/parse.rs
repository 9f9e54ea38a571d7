use super::ast::*;
use super::lex::lex;
use super::options::{BasicOptions, VarNaming};
use super::token::{Token, TokenKind};
use super::{Column, Error};
use std::collections::HashMap;
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

/// Parse a whole program. Errors are collected per line; a line that
/// fails contributes an empty statement list and parsing continues.
pub fn parse(source: &str, options: BasicOptions) -> (BasicProgram, Vec<Error>) {
    let mut parser = Parser::new(options);
    for line in source.lines() {
        parser.enter(line);
    }
    let (program, errors, _) = parser.finish();
    (program, errors)
}

/// Maps each one-based source line to the flattened statement offset
/// its first statement occupies. Consumed by hosts for breakpoint and
/// step mapping, never by the engine itself.
#[derive(Debug, Clone, Default)]
pub struct Listing {
    offsets: Vec<usize>,
}

impl Listing {
    pub fn statement_offset(&self, source_line: usize) -> Option<usize> {
        if source_line == 0 {
            return None;
        }
        self.offsets.get(source_line - 1).copied()
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

/// Line-at-a-time program parser. Feed lines with [`Parser::enter`],
/// then take the program, the error list, and the listing map with
/// [`Parser::finish`].
pub struct Parser {
    options: BasicOptions,
    lines: Vec<BasicLine>,
    errors: Vec<Error>,
    labels: HashMap<Rc<str>, usize>,
    targets: Vec<(Rc<str>, usize, Column)>,
    listing: Listing,
    source_line: usize,
    statement_count: usize,
}

impl Parser {
    pub fn new(options: BasicOptions) -> Parser {
        Parser {
            options,
            lines: vec![],
            errors: vec![],
            labels: HashMap::new(),
            targets: Vec::new(),
            listing: Listing::default(),
            source_line: 0,
            statement_count: 0,
        }
    }

    pub fn enter(&mut self, text: &str) {
        self.source_line += 1;
        self.listing.offsets.push(self.statement_count);
        let tokens = lex(text, &self.options);
        let mut index = 0;
        let mut label = None;
        if tokens[0].kind == TokenKind::Int {
            let normalized = normalize_label(&tokens[0].text);
            if self.labels.contains_key(&normalized) {
                self.errors.push(
                    error!("Line {} is defined twice", normalized)
                        .in_line(self.source_line)
                        .in_column(&tokens[0].column),
                );
                self.lines.push(BasicLine {
                    label: None,
                    statements: vec![],
                    source_line: self.source_line,
                });
                return;
            }
            self.labels.insert(normalized.clone(), self.source_line);
            label = Some(normalized);
            index = 1;
        }
        let mut line_targets = vec![];
        let mut statements = vec![];
        let mut line = LineParser {
            tokens: &tokens,
            index,
            options: &mut self.options,
            targets: &mut line_targets,
        };
        if let Err(error) = line.line(&mut statements) {
            self.errors.push(error.in_line(self.source_line));
            statements.clear();
        }
        for (target, column) in line_targets {
            self.targets.push((target, self.source_line, column));
        }
        self.statement_count += statements.len();
        self.lines.push(BasicLine {
            label,
            statements,
            source_line: self.source_line,
        });
    }

    /// Post-parse validation: every branch target must name a declared
    /// label.
    pub fn finish(mut self) -> (BasicProgram, Vec<Error>, Listing) {
        for (label, source_line, column) in std::mem::take(&mut self.targets) {
            if !self.labels.contains_key(&label) {
                self.errors.push(
                    error!("There is no line {}", label)
                        .in_line(source_line)
                        .in_column(&column),
                );
            }
        }
        (
            BasicProgram {
                options: self.options,
                lines: self.lines,
            },
            self.errors,
            self.listing,
        )
    }
}

fn normalize_label(text: &str) -> Rc<str> {
    match text.parse::<u64>() {
        Ok(n) => n.to_string().into(),
        Err(_) => text.into(),
    }
}

const COMMANDS: &[&str] = &[
    "DATA", "DEF", "DIM", "END", "FOR", "GOSUB", "GOTO", "IF", "INPUT", "LET", "NEXT", "ON",
    "OPTION", "PRINT", "READ", "RESTORE", "RETURN", "STOP",
];

struct LineParser<'a> {
    tokens: &'a [Token],
    index: usize,
    options: &'a mut BasicOptions,
    targets: &'a mut Vec<(Rc<str>, Column)>,
}

impl<'a> LineParser<'a> {
    fn peek(&self) -> &Token {
        self.tokens
            .get(self.index)
            .unwrap_or_else(|| self.tokens.last().expect("EOL token"))
    }

    fn peek2(&self) -> &Token {
        self.tokens
            .get(self.index + 1)
            .unwrap_or_else(|| self.tokens.last().expect("EOL token"))
    }

    fn next(&mut self) -> Token {
        let token = self.peek().clone();
        if !token.is_eol() {
            self.index += 1;
        }
        token
    }

    fn at_statement_end(&self) -> bool {
        let pk = self.peek();
        pk.is_eol() || pk.kind == TokenKind::Remark || pk.text == ":"
    }

    fn expect(&mut self, text: &str) -> Result<Token> {
        let token = self.next();
        if token.text == text {
            Ok(token)
        } else if token.is_eol() {
            Err(error!("Expected \"{}\"", text).in_column(&token.column))
        } else {
            Err(error!("Expected \"{}\", found {}", text, token).in_column(&token.column))
        }
    }

    fn line(&mut self, out: &mut Vec<Statement>) -> Result<()> {
        loop {
            let pk = self.peek();
            if pk.is_eol() || pk.kind == TokenKind::Remark {
                return Ok(());
            }
            if pk.text == ":" {
                self.next();
                continue;
            }
            self.statement(out)?;
        }
    }

    fn statement(&mut self, out: &mut Vec<Statement>) -> Result<()> {
        let token = self.peek().clone();
        if token.kind != TokenKind::Ident {
            return Err(error!("There should be a command here").in_column(&token.column));
        }
        let name = token.text.as_str();
        if name == "GO" && self.peek2().text == "TO" {
            self.next();
            self.next();
            return self.command(out, "GOTO", token.column);
        }
        if name == "GO" && self.peek2().text == "SUB" {
            self.next();
            self.next();
            return self.command(out, "GOSUB", token.column);
        }
        if COMMANDS.contains(&name) {
            self.next();
            return self.command(out, &token.text, token.column);
        }
        // Implicit LET: an identifier immediately followed by `=` or `(`.
        let pk2 = self.peek2().text.as_str();
        if pk2 == "=" || pk2 == "(" {
            return self.r#let(out, token.column);
        }
        Err(
            error!("I don't know how to \"{}\". There should be a command here", name)
                .in_column(&token.column),
        )
    }

    fn command(&mut self, out: &mut Vec<Statement>, cmd: &str, column: Column) -> Result<()> {
        if !self.options.keyword_allowed(cmd) {
            return Err(
                error!("\"{}\" is not supported by this dialect", cmd).in_column(&column)
            );
        }
        match cmd {
            "DATA" => self.r#data(out, column),
            "DEF" => self.r#def(out, column),
            "DIM" => self.r#dim(out, column),
            "END" => {
                out.push(Statement::End(column));
                Ok(())
            }
            "FOR" => self.r#for(out, column),
            "GOSUB" => self.r#gosub(out, column),
            "GOTO" => self.r#goto(out, column),
            "IF" => self.r#if(out, column),
            "INPUT" => self.r#input(out, column),
            "LET" => self.r#let(out, column),
            "NEXT" => self.next_command(out, column),
            "ON" => self.r#on(out, column),
            "OPTION" => self.r#option(out, column),
            "PRINT" => self.r#print(out, column),
            "READ" => self.r#read(out, column),
            "RESTORE" => {
                out.push(Statement::Restore(column));
                Ok(())
            }
            "RETURN" => {
                out.push(Statement::Return(column));
                Ok(())
            }
            "STOP" => {
                out.push(Statement::Stop(column));
                Ok(())
            }
            _ => Err(error!("I don't know how to \"{}\"", cmd).in_column(&column)),
        }
    }

    fn label_target(&mut self) -> Result<Rc<str>> {
        let token = self.next();
        if token.kind != TokenKind::Int {
            return Err(error!("There should be a line number here").in_column(&token.column));
        }
        let label = normalize_label(&token.text);
        self.targets.push((label.clone(), token.column));
        Ok(label)
    }

    fn ident(&mut self) -> Result<Token> {
        let token = self.next();
        if token.kind != TokenKind::Ident {
            return Err(error!("There should be a name here").in_column(&token.column));
        }
        Ok(token)
    }

    fn check_var_name(&self, name: &str, column: &Column) -> Result<()> {
        let base = name.strip_suffix('$').unwrap_or(name);
        let mut chars = base.chars();
        let ok = match self.options.var_naming {
            VarNaming::Letter => base.len() == 1,
            VarNaming::LetterDigit => {
                base.len() <= 2
                    && chars.next().map_or(false, |c| c.is_ascii_alphabetic())
                    && chars.all(|c| c.is_ascii_digit())
            }
            VarNaming::Any => true,
        };
        if ok {
            Ok(())
        } else {
            Err(error!("\"{}\" is not a valid variable name in this dialect", name)
                .in_column(column))
        }
    }

    fn variable(&mut self) -> Result<Variable> {
        let token = self.ident()?;
        self.check_var_name(&token.text, &token.column)?;
        let name: Rc<str> = token.text.as_str().into();
        if self.peek().text == "(" {
            let args = self.expression_list()?;
            Ok(Variable::Array(token.column, name, args))
        } else {
            Ok(Variable::Unary(token.column, name))
        }
    }

    fn variable_list(&mut self) -> Result<Vec<Variable>> {
        let mut vars = vec![self.variable()?];
        while self.peek().text == "," {
            self.next();
            vars.push(self.variable()?);
        }
        Ok(vars)
    }

    fn r#data(&mut self, out: &mut Vec<Statement>, column: Column) -> Result<()> {
        let mut items = vec![self.expression()?];
        while self.peek().text == "," {
            self.next();
            items.push(self.expression()?);
        }
        out.push(Statement::Data(column, items));
        Ok(())
    }

    fn r#def(&mut self, out: &mut Vec<Statement>, column: Column) -> Result<()> {
        let name_token = self.ident()?;
        if !name_token.text.starts_with("FN") {
            return Err(error!("User function names must start with FN")
                .in_column(&name_token.column));
        }
        self.expect("(")?;
        let mut params: Vec<Rc<str>> = vec![];
        if self.peek().text != ")" {
            loop {
                let param = self.ident()?;
                params.push(param.text.as_str().into());
                match self.next() {
                    t if t.text == "," => continue,
                    t if t.text == ")" => break,
                    t => return Err(error!("Expected \",\" or \")\"").in_column(&t.column)),
                }
            }
        } else {
            self.next();
        }
        if params.len() > self.options.max_def_args {
            return Err(error!(
                "This dialect allows at most {} function argument(s)",
                self.options.max_def_args
            )
            .in_column(&name_token.column));
        }
        self.expect("=")?;
        let body = self.expression()?;
        out.push(Statement::Def(
            column,
            name_token.text.as_str().into(),
            params,
            body,
        ));
        Ok(())
    }

    fn r#dim(&mut self, out: &mut Vec<Statement>, column: Column) -> Result<()> {
        let vars = self.variable_list()?;
        for var in &vars {
            if let Variable::Unary(col, name) = var {
                return Err(error!("\"{}\" needs dimensions in DIM", name).in_column(col));
            }
        }
        out.push(Statement::Dim(column, vars));
        Ok(())
    }

    fn r#for(&mut self, out: &mut Vec<Statement>, column: Column) -> Result<()> {
        let var = self.ident()?;
        self.check_var_name(&var.text, &var.column)?;
        self.expect("=")?;
        let from = self.expression()?;
        let to_token = self.ident()?;
        if to_token.text != "TO" {
            return Err(error!("There should be a TO here").in_column(&to_token.column));
        }
        let to = self.expression()?;
        let step = if self.peek().text == "STEP" {
            self.next();
            Some(self.expression()?)
        } else {
            None
        };
        out.push(Statement::For(
            column,
            var.text.as_str().into(),
            from,
            to,
            step,
        ));
        Ok(())
    }

    fn r#gosub(&mut self, out: &mut Vec<Statement>, column: Column) -> Result<()> {
        let label = self.label_target()?;
        out.push(Statement::Gosub(column, label));
        Ok(())
    }

    fn r#goto(&mut self, out: &mut Vec<Statement>, column: Column) -> Result<()> {
        let label = self.label_target()?;
        out.push(Statement::Goto(column, label));
        Ok(())
    }

    fn r#if(&mut self, out: &mut Vec<Statement>, column: Column) -> Result<()> {
        let condition = self.expression()?;
        let then = self.ident()?;
        if then.text != "THEN" {
            return Err(error!("There should be a THEN here").in_column(&then.column));
        }
        out.push(Statement::If(column, condition));
        if self.peek().kind == TokenKind::Int {
            // IF X THEN 100 is an implicit GOTO.
            let token = self.next();
            let label = normalize_label(&token.text);
            self.targets.push((label.clone(), token.column.clone()));
            out.push(Statement::Goto(token.column, label));
            return Ok(());
        }
        // The rest of the line runs only when the condition held; the
        // runtime's IF skips to end-of-line on a falsy condition, so the
        // guarded statements simply follow in sequence.
        self.statement(out)
    }

    fn r#input(&mut self, out: &mut Vec<Statement>, column: Column) -> Result<()> {
        let mut prompt = None;
        if self.peek().kind == TokenKind::String {
            let token = self.next();
            prompt = Some(Rc::from(token.text.as_str()));
            self.expect(";")?;
        }
        let vars = self.variable_list()?;
        out.push(Statement::Input(column, prompt, vars));
        Ok(())
    }

    fn r#let(&mut self, out: &mut Vec<Statement>, column: Column) -> Result<()> {
        let var = self.variable()?;
        self.expect("=")?;
        let value = self.expression()?;
        out.push(Statement::Let(column, var, value));
        Ok(())
    }

    fn next_command(&mut self, out: &mut Vec<Statement>, column: Column) -> Result<()> {
        let mut vars: Vec<Rc<str>> = vec![];
        if self.peek().kind == TokenKind::Ident {
            loop {
                let token = self.ident()?;
                self.check_var_name(&token.text, &token.column)?;
                vars.push(token.text.as_str().into());
                if self.peek().text == "," {
                    if !self.options.multiple_next_vars {
                        return Err(error!(
                            "This dialect allows only one variable in NEXT"
                        )
                        .in_column(&self.peek().column));
                    }
                    self.next();
                    continue;
                }
                break;
            }
        }
        out.push(Statement::Next(column, vars));
        Ok(())
    }

    fn r#on(&mut self, out: &mut Vec<Statement>, column: Column) -> Result<()> {
        let selector = self.expression()?;
        let goto = self.ident()?;
        if goto.text != "GOTO" {
            return Err(error!("There should be a GOTO here").in_column(&goto.column));
        }
        let mut labels = vec![self.label_target()?];
        while self.peek().text == "," {
            self.next();
            labels.push(self.label_target()?);
        }
        out.push(Statement::OnGoto(column, selector, labels));
        Ok(())
    }

    fn r#option(&mut self, out: &mut Vec<Statement>, column: Column) -> Result<()> {
        let name = self.ident()?;
        let value = self.next();
        if value.is_eol() {
            return Err(error!("There should be an option value here").in_column(&value.column));
        }
        self.options
            .apply(&name.text, &value.text)
            .map_err(|e| e.in_column(&value.column))?;
        out.push(Statement::Option(
            column,
            name.text.as_str().into(),
            value.text.as_str().into(),
        ));
        Ok(())
    }

    fn r#print(&mut self, out: &mut Vec<Statement>, column: Column) -> Result<()> {
        let mut items = vec![];
        while !self.at_statement_end() {
            let pk = self.peek().clone();
            match pk.text.as_str() {
                "," => {
                    self.next();
                    items.push(PrintItem::Comma(pk.column));
                }
                ";" => {
                    self.next();
                    items.push(PrintItem::Semicolon(pk.column));
                }
                _ => items.push(PrintItem::Expr(self.expression()?)),
            }
        }
        out.push(Statement::Print(column, items));
        Ok(())
    }

    fn r#read(&mut self, out: &mut Vec<Statement>, column: Column) -> Result<()> {
        let vars = self.variable_list()?;
        out.push(Statement::Read(column, vars));
        Ok(())
    }

    // *** Expressions: precedence climbing over the dialect's
    // operator table. Ties fold left except `^`, which groups right.

    fn expression(&mut self) -> Result<Expression> {
        let lhs = self.primary()?;
        self.climb(lhs, 0)
    }

    fn climb(&mut self, mut lhs: Expression, min_prec: usize) -> Result<Expression> {
        while let Some(prec) = precedence(self.peek()) {
            if prec < min_prec {
                break;
            }
            let op = self.next();
            if !self.options.operator_allowed(&op.text) {
                return Err(
                    error!("The operator \"{}\" is not supported by this dialect", op.text)
                        .in_column(&op.column),
                );
            }
            let mut rhs = self.primary()?;
            while let Some(next_prec) = precedence(self.peek()) {
                if next_prec > prec || (next_prec == prec && op.text == "^") {
                    rhs = self.climb(rhs, next_prec)?;
                } else {
                    break;
                }
            }
            lhs = fold_binary(&op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn primary(&mut self) -> Result<Expression> {
        let token = self.next();
        match token.kind {
            TokenKind::Int | TokenKind::FloatPlain | TokenKind::FloatExp => {
                match token.text.parse::<f64>() {
                    Ok(value) => Ok(Expression::Number(token.column, value)),
                    Err(_) => {
                        Err(error!("\"{}\" is not a number", token.text).in_column(&token.column))
                    }
                }
            }
            TokenKind::String => Ok(Expression::String(
                token.column,
                Rc::from(token.text.as_str()),
            )),
            TokenKind::Ident if token.text == "NOT" => {
                if !self.options.operator_allowed("NOT") {
                    return Err(
                        error!("The operator \"NOT\" is not supported by this dialect")
                            .in_column(&token.column),
                    );
                }
                Ok(Expression::Not(token.column, Box::new(self.primary()?)))
            }
            TokenKind::Ident => self.lookup(token),
            TokenKind::Operator if token.text == "(" => {
                let expr = self.expression()?;
                self.expect(")")?;
                Ok(expr)
            }
            TokenKind::Operator if token.text == "-" => Ok(Expression::Negate(
                token.column,
                Box::new(self.primary()?),
            )),
            _ => Err(error!("There should be an expression here").in_column(&token.column)),
        }
    }

    fn lookup(&mut self, token: Token) -> Result<Expression> {
        let name: Rc<str> = token.text.as_str().into();
        if self.peek().text != "(" {
            self.check_var_name(&name, &token.column)?;
            return Ok(Expression::Lookup(token.column, name, None));
        }
        let args = self.expression_list()?;
        if BasicOptions::is_known_function(&name) {
            if !self.options.function_allowed(&name) {
                return Err(
                    error!("The function \"{}\" is not supported by this dialect", name)
                        .in_column(&token.column),
                );
            }
        } else if !name.starts_with("FN") {
            // Not a function, so it must be an array reference.
            self.check_var_name(&name, &token.column)?;
        }
        Ok(Expression::Lookup(token.column, name, Some(args)))
    }

    fn expression_list(&mut self) -> Result<Vec<Expression>> {
        self.expect("(")?;
        let mut list = vec![];
        loop {
            list.push(self.expression()?);
            let token = self.next();
            match token.text.as_str() {
                ")" => return Ok(list),
                "," => continue,
                _ => return Err(error!("Expected \",\" or \")\"").in_column(&token.column)),
            }
        }
    }
}

fn precedence(token: &Token) -> Option<usize> {
    match token.kind {
        TokenKind::Operator | TokenKind::Relational => match token.text.as_str() {
            "=" | "<>" | "<" | ">" | "<=" | ">=" => Some(50),
            "+" | "-" => Some(100),
            "%" => Some(140),
            "\\" => Some(150),
            "*" | "/" => Some(200),
            "^" => Some(300),
            _ => None,
        },
        TokenKind::Ident => match token.text.as_str() {
            "OR" => Some(7),
            "AND" => Some(8),
            "MOD" => Some(140),
            _ => None,
        },
        _ => None,
    }
}

fn fold_binary(op: &Token, lhs: Expression, rhs: Expression) -> Expression {
    let col = op.column.clone();
    let lhs = Box::new(lhs);
    let rhs = Box::new(rhs);
    match op.text.as_str() {
        "^" => Expression::Power(col, lhs, rhs),
        "*" => Expression::Multiply(col, lhs, rhs),
        "/" => Expression::Divide(col, lhs, rhs),
        "\\" => Expression::DivideInt(col, lhs, rhs),
        "%" | "MOD" => Expression::Modulo(col, lhs, rhs),
        "+" => Expression::Add(col, lhs, rhs),
        "-" => Expression::Subtract(col, lhs, rhs),
        "=" => Expression::Equal(col, lhs, rhs),
        "<>" => Expression::NotEqual(col, lhs, rhs),
        "<" => Expression::Less(col, lhs, rhs),
        "<=" => Expression::LessEqual(col, lhs, rhs),
        ">" => Expression::Greater(col, lhs, rhs),
        ">=" => Expression::GreaterEqual(col, lhs, rhs),
        "AND" => Expression::And(col, lhs, rhs),
        "OR" => Expression::Or(col, lhs, rhs),
        other => unreachable!("unhandled operator {}", other),
    }
}
