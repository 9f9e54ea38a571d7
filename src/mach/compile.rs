/*!
# Statement Compiler

Translates one parsed statement into an executable closure. The
translation is a pure function of the statement's fields and the
loaded program's label table, so the runtime caches the result
forever. Closures capture resolved addresses and dialect switches by
value and never borrow the program.

*/

use super::runtime::ForEntry;
use super::{val, Address, Function, Operation, Program, Runtime, Val};
use crate::error;
use crate::lang::ast::{Expression, PrintItem, Statement, Variable};
use crate::lang::{BasicOptions, Column, Error};
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

/// What the runtime does with the program counter after a statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Flow {
    Next,
    Jump(Address),
}

pub type StmtFn = Rc<dyn Fn(&mut Runtime) -> Result<Flow>>;
pub type ExprFn = Rc<dyn Fn(&mut Runtime) -> Result<Val>>;
pub type SetterFn = Rc<dyn Fn(&mut Runtime, Val) -> Result<()>>;

pub fn compile(program: &Program, pc: Address) -> Result<StmtFn> {
    let statement = match program.statement(pc) {
        Some(statement) => statement,
        None => return Err(error!("Nothing to execute at {}", pc)),
    };
    Compiler {
        program,
        options: program.options(),
        op: Operation::new(program.options()),
    }
    .statement(statement, pc)
}

struct Compiler<'a> {
    program: &'a Program,
    options: &'a BasicOptions,
    op: Operation,
}

impl<'a> Compiler<'a> {
    fn statement(&self, statement: &Statement, pc: Address) -> Result<StmtFn> {
        use Statement::*;
        match statement {
            Data(..) | Option(..) => Ok(Rc::new(|_| Ok(Flow::Next))),
            Def(_, name, params, body) => self.r#def(name, params, body),
            Dim(_, vars) => self.r#dim(vars),
            End(_) | Stop(_) => {
                let end = self.program.len();
                Ok(Rc::new(move |_| Ok(Flow::Jump(end))))
            }
            For(col, var, from, to, step) => self.r#for(col, var, from, to, step, pc),
            Gosub(col, label) => self.r#gosub(col, label),
            Goto(col, label) => {
                let target = self.target(col, label)?;
                Ok(Rc::new(move |_| Ok(Flow::Jump(target))))
            }
            If(_, condition) => self.r#if(condition, pc),
            Input(_, prompt, vars) => self.r#input(prompt, vars, pc),
            Let(_, var, expr) => self.r#let(var, expr),
            Next(_, vars) => self.r#next(vars),
            OnGoto(col, expr, labels) => self.on_goto(col, expr, labels),
            Print(_, items) => self.r#print(items),
            Read(_, vars) => self.r#read(vars),
            Restore(_) => Ok(Rc::new(|rt| {
                rt.restore_data();
                Ok(Flow::Next)
            })),
            Return(_) => Ok(Rc::new(|rt| match rt.pop_return() {
                Some(target) => Ok(Flow::Jump(target)),
                None => Err(error!("RETURN without GOSUB")),
            })),
        }
    }

    fn target(&self, column: &Column, label: &Rc<str>) -> Result<Address> {
        match self.program.label_pc(label) {
            Some(target) => Ok(target),
            None => Err(error!("There is no line {}", label).in_column(column)),
        }
    }

    fn r#def(&self, name: &Rc<str>, params: &[Rc<str>], body: &Expression) -> Result<StmtFn> {
        let name = name.clone();
        let params: Vec<Rc<str>> = params.to_vec();
        let body = self.expression(body)?;
        Ok(Rc::new(move |rt| {
            rt.define_fn(name.clone(), params.clone(), body.clone());
            Ok(Flow::Next)
        }))
    }

    fn r#dim(&self, vars: &[Variable]) -> Result<StmtFn> {
        let mut decls: Vec<(Rc<str>, Column, Vec<ExprFn>)> = vec![];
        for var in vars {
            if let Variable::Array(col, name, sizes) = var {
                let sizes = self.expressions(sizes)?;
                decls.push((name.clone(), col.clone(), sizes));
            }
        }
        Ok(Rc::new(move |rt| {
            for (name, col, sizes) in &decls {
                let mut dims = Vec::with_capacity(sizes.len());
                for size in sizes {
                    dims.push(size(rt)?.index().map_err(|e| e.in_column(col))?);
                }
                rt.dim_array(name.clone(), dims).map_err(|e| e.in_column(col))?;
            }
            Ok(Flow::Next)
        }))
    }

    fn r#for(
        &self,
        column: &Column,
        var: &Rc<str>,
        from: &Expression,
        to: &Expression,
        step: &Option<Expression>,
        pc: Address,
    ) -> Result<StmtFn> {
        if var.ends_with('$') {
            return Err(error!("FOR needs a numeric variable").in_column(column));
        }
        let var = var.clone();
        let from = self.expression(from)?;
        let to = self.expression(to)?;
        let step = match step {
            Some(step) => Some(self.expression(step)?),
            None => None,
        };
        let body = pc + 1;
        Ok(Rc::new(move |rt| {
            let start = from(rt)?.number()?;
            let target = to(rt)?.number()?;
            let step = match &step {
                Some(step) => step(rt)?.number()?,
                None => 1.0,
            };
            rt.store(var.clone(), Val::Number(start))?;
            rt.push_for(ForEntry {
                pc: body,
                var: var.clone(),
                target,
                step,
            });
            Ok(Flow::Next)
        }))
    }

    fn r#gosub(&self, column: &Column, label: &Rc<str>) -> Result<StmtFn> {
        let target = self.target(column, label)?;
        Ok(Rc::new(move |rt| {
            let resume = rt.return_pc();
            rt.push_return(resume);
            Ok(Flow::Jump(target))
        }))
    }

    fn r#if(&self, condition: &Expression, pc: Address) -> Result<StmtFn> {
        let condition = self.expression(condition)?;
        let skip_to = self.program.line_end_pc(pc);
        Ok(Rc::new(move |rt| {
            if condition(rt)?.is_truthy()? {
                Ok(Flow::Next)
            } else {
                Ok(Flow::Jump(skip_to))
            }
        }))
    }

    fn r#input(
        &self,
        prompt: &Option<Rc<str>>,
        vars: &[Variable],
        pc: Address,
    ) -> Result<StmtFn> {
        let prompt: Rc<str> = match prompt {
            Some(prompt) => format!("{}? ", prompt).into(),
            None => "? ".into(),
        };
        let mut entries: Vec<(bool, SetterFn)> = vec![];
        for var in vars {
            entries.push((var.name().ends_with('$'), self.setter(var)?));
        }
        Ok(Rc::new(move |rt| {
            rt.request_input(pc, prompt.clone(), entries.clone());
            Ok(Flow::Next)
        }))
    }

    fn r#let(&self, var: &Variable, expr: &Expression) -> Result<StmtFn> {
        let set = self.setter(var)?;
        let get = self.expression(expr)?;
        Ok(Rc::new(move |rt| {
            let value = get(rt)?;
            set(rt, value)?;
            Ok(Flow::Next)
        }))
    }

    fn r#next(&self, vars: &[Rc<str>]) -> Result<StmtFn> {
        let vars: Vec<Option<Rc<str>>> = if vars.is_empty() {
            vec![None]
        } else {
            vars.iter().cloned().map(Some).collect()
        };
        Ok(Rc::new(move |rt| {
            for var in &vars {
                if let Some(body) = rt.iterate(var.as_deref())? {
                    return Ok(Flow::Jump(body));
                }
            }
            Ok(Flow::Next)
        }))
    }

    fn on_goto(&self, column: &Column, expr: &Expression, labels: &[Rc<str>]) -> Result<StmtFn> {
        let selector = self.expression(expr)?;
        let mut targets = Vec::with_capacity(labels.len());
        for label in labels {
            targets.push(self.target(column, label)?);
        }
        let column = column.clone();
        Ok(Rc::new(move |rt| {
            let n = selector(rt)?.number()?.round();
            if n < 1.0 || n > targets.len() as f64 {
                return Err(error!("ON GOTO index out of range").in_column(&column));
            }
            Ok(Flow::Jump(targets[n as usize - 1]))
        }))
    }

    fn r#print(&self, items: &[PrintItem]) -> Result<StmtFn> {
        enum Emit {
            Text(ExprFn),
            Zone,
            Glue,
        }
        let mut emits: Vec<Emit> = vec![];
        for item in items {
            emits.push(match item {
                PrintItem::Expr(expr) => Emit::Text(self.expression(expr)?),
                PrintItem::Comma(_) => Emit::Zone,
                PrintItem::Semicolon(_) => Emit::Glue,
            });
        }
        // A line ending in an expression gets the newline; a trailing
        // separator suppresses it.
        let newline = matches!(items.last(), None | Some(PrintItem::Expr(_)));
        let precision = self.options.print_precision;
        Ok(Rc::new(move |rt| {
            for emit in &emits {
                match emit {
                    Emit::Text(get) => match get(rt)? {
                        Val::Number(n) => rt.emit(&val::format_number(n, precision)),
                        Val::String(s) => rt.emit(&s),
                    },
                    Emit::Zone => rt.zone_jump(),
                    Emit::Glue => {}
                }
            }
            if newline {
                rt.emit("\n");
            }
            Ok(Flow::Next)
        }))
    }

    fn r#read(&self, vars: &[Variable]) -> Result<StmtFn> {
        let mut setters: Vec<SetterFn> = vec![];
        for var in vars {
            setters.push(self.setter(var)?);
        }
        Ok(Rc::new(move |rt| {
            for set in &setters {
                let value = rt.read_data()?;
                set(rt, value)?;
            }
            Ok(Flow::Next)
        }))
    }

    fn expressions(&self, list: &[Expression]) -> Result<Vec<ExprFn>> {
        list.iter().map(|e| self.expression(e)).collect()
    }

    fn setter(&self, var: &Variable) -> Result<SetterFn> {
        let convert = self.options.type_convert;
        match var {
            Variable::Unary(col, name) => {
                let name = name.clone();
                let wants_string = name.ends_with('$');
                let col = col.clone();
                Ok(Rc::new(move |rt, value| {
                    let value =
                        val::coerce(value, wants_string, convert).map_err(|e| e.in_column(&col))?;
                    rt.store(name.clone(), value).map_err(|e| e.in_column(&col))
                }))
            }
            Variable::Array(col, name, indices) => {
                let name = name.clone();
                let wants_string = name.ends_with('$');
                let col = col.clone();
                let indices = self.expressions(indices)?;
                Ok(Rc::new(move |rt, value| {
                    let mut subscript = Vec::with_capacity(indices.len());
                    for index in &indices {
                        subscript.push(index(rt)?.index().map_err(|e| e.in_column(&col))?);
                    }
                    let value =
                        val::coerce(value, wants_string, convert).map_err(|e| e.in_column(&col))?;
                    rt.store_array(&name, &subscript, value)
                        .map_err(|e| e.in_column(&col))
                }))
            }
        }
    }

    fn expression(&self, expr: &Expression) -> Result<ExprFn> {
        use Expression::*;
        Ok(match expr {
            Number(_, n) => {
                let value = Val::Number(*n);
                Rc::new(move |_| Ok(value.clone()))
            }
            String(_, s) => {
                let value = Val::String(s.clone());
                Rc::new(move |_| Ok(value.clone()))
            }
            Lookup(col, name, None) => {
                let name = name.clone();
                let col = col.clone();
                Rc::new(move |rt| rt.fetch(&name).map_err(|e| e.in_column(&col)))
            }
            Lookup(col, name, Some(args)) => self.lookup(col, name, args)?,
            Negate(col, inner) => self.unary(col, inner, Operation::negate)?,
            Not(col, inner) => self.unary(col, inner, Operation::lnot)?,
            Power(col, lhs, rhs) => self.binary(col, lhs, rhs, Operation::power)?,
            Multiply(col, lhs, rhs) => self.binary(col, lhs, rhs, Operation::multiply)?,
            Divide(col, lhs, rhs) => self.binary(col, lhs, rhs, Operation::divide)?,
            DivideInt(col, lhs, rhs) => self.binary(col, lhs, rhs, Operation::divide_int)?,
            Modulo(col, lhs, rhs) => self.binary(col, lhs, rhs, Operation::modulo)?,
            Add(col, lhs, rhs) => self.binary(col, lhs, rhs, Operation::add)?,
            Subtract(col, lhs, rhs) => self.binary(col, lhs, rhs, Operation::subtract)?,
            Equal(col, lhs, rhs) => self.binary(col, lhs, rhs, Operation::eq)?,
            NotEqual(col, lhs, rhs) => self.binary(col, lhs, rhs, Operation::ne)?,
            Less(col, lhs, rhs) => self.binary(col, lhs, rhs, Operation::lt)?,
            LessEqual(col, lhs, rhs) => self.binary(col, lhs, rhs, Operation::le)?,
            Greater(col, lhs, rhs) => self.binary(col, lhs, rhs, Operation::gt)?,
            GreaterEqual(col, lhs, rhs) => self.binary(col, lhs, rhs, Operation::ge)?,
            And(col, lhs, rhs) => self.binary(col, lhs, rhs, Operation::and)?,
            Or(col, lhs, rhs) => self.binary(col, lhs, rhs, Operation::or)?,
        })
    }

    /// A lookup with arguments is a call when the name is a built-in
    /// or carries the user-function prefix, otherwise an array read.
    /// The split depends only on the name, so caching the closure is
    /// safe.
    fn lookup(&self, column: &Column, name: &Rc<str>, args: &[Expression]) -> Result<ExprFn> {
        let name = name.clone();
        let column = column.clone();
        let args = self.expressions(args)?;
        if BasicOptions::is_known_function(&name) {
            match Function::arity(&name) {
                Some(arity) if arity.contains(&args.len()) => {}
                _ => {
                    return Err(
                        error!("Wrong number of arguments for {}", name).in_column(&column)
                    )
                }
            }
            Ok(Rc::new(move |rt| {
                let mut vals = Vec::with_capacity(args.len());
                for arg in &args {
                    vals.push(arg(rt)?);
                }
                Function::eval(&name, &vals, rt.print_column()).map_err(|e| e.in_column(&column))
            }))
        } else if name.starts_with("FN") {
            Ok(Rc::new(move |rt| {
                let mut vals = Vec::with_capacity(args.len());
                for arg in &args {
                    vals.push(arg(rt)?);
                }
                rt.call_user_fn(&name, vals).map_err(|e| e.in_column(&column))
            }))
        } else {
            Ok(Rc::new(move |rt| {
                let mut subscript = Vec::with_capacity(args.len());
                for arg in &args {
                    subscript.push(arg(rt)?.index().map_err(|e| e.in_column(&column))?);
                }
                rt.fetch_array(&name, &subscript).map_err(|e| e.in_column(&column))
            }))
        }
    }

    fn unary(
        &self,
        column: &Column,
        inner: &Expression,
        apply: fn(&Operation, Val) -> Result<Val>,
    ) -> Result<ExprFn> {
        let op = self.op;
        let inner = self.expression(inner)?;
        let column = column.clone();
        Ok(Rc::new(move |rt| {
            let value = inner(rt)?;
            apply(&op, value).map_err(|e| e.in_column(&column))
        }))
    }

    fn binary(
        &self,
        column: &Column,
        lhs: &Expression,
        rhs: &Expression,
        apply: fn(&Operation, Val, Val) -> Result<Val>,
    ) -> Result<ExprFn> {
        let op = self.op;
        let lhs = self.expression(lhs)?;
        let rhs = self.expression(rhs)?;
        let column = column.clone();
        Ok(Rc::new(move |rt| {
            let left = lhs(rt)?;
            let right = rhs(rt)?;
            apply(&op, left, right).map_err(|e| e.in_column(&column))
        }))
    }
}

