/*!
# Runtime

Owns all mutable interpreter state and executes one statement per
`step()`. Nothing here ever blocks: hosts drive the runtime with
`execute()` and service the returned events. The only suspension
point is INPUT, which parks the runtime until `provide_input()`
resolves it.

*/

use super::compile::{self, ExprFn, Flow, SetterFn, StmtFn};
use super::{val, Address, Program, Val};
use crate::error;
use crate::lang::ast::BasicProgram;
use crate::lang::Error;
use std::collections::HashMap;
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

/// What `execute()` hands back to the host. `Print` carries
/// accumulated output, `Input` a prompt and how many values to
/// collect. `Running` means the step quota ran out with more work
/// to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Running,
    Stopped,
    Print(String),
    Input(String, usize),
    Errors(Vec<Error>),
}

/// One active FOR loop. `pc` addresses the statement after the FOR,
/// so a rewind re-runs the body without re-initializing.
#[derive(Clone)]
pub struct ForEntry {
    pub pc: Address,
    pub var: Rc<str>,
    pub target: f64,
    pub step: f64,
}

#[derive(Clone)]
struct UserFn {
    params: Vec<Rc<str>>,
    body: ExprFn,
}

struct PendingInput {
    pc: Address,
    prompt: Rc<str>,
    entries: Vec<(bool, SetterFn)>,
}

struct Array {
    base: usize,
    /// Highest valid subscript per dimension.
    maxes: Vec<usize>,
    values: Vec<Val>,
}

impl Array {
    fn new(string: bool, base: usize, maxes: Vec<usize>) -> Array {
        let count = maxes.iter().map(|max| max - base + 1).product();
        let default = if string {
            Val::String("".into())
        } else {
            Val::Number(0.0)
        };
        Array {
            base,
            maxes,
            values: vec![default; count],
        }
    }

    fn offset(&self, subscript: &[usize]) -> Result<usize> {
        if subscript.len() != self.maxes.len() {
            return Err(error!("Wrong number of subscripts"));
        }
        let mut offset = 0;
        for (index, max) in subscript.iter().zip(&self.maxes) {
            if *index < self.base || index > max {
                return Err(error!("Subscript out of range"));
            }
            offset = offset * (max - self.base + 1) + (index - self.base);
        }
        Ok(offset)
    }
}

pub struct Runtime {
    program: Program,
    compiled: Vec<Option<StmtFn>>,
    vars: HashMap<Rc<str>, Val>,
    arrays: HashMap<Rc<str>, Array>,
    defs: HashMap<Rc<str>, UserFn>,
    locals: Vec<HashMap<Rc<str>, Val>>,
    fors: Vec<ForEntry>,
    returns: Vec<Address>,
    data_cursor: usize,
    column: usize,
    curpc: Address,
    running: bool,
    pending: Option<PendingInput>,
    output: String,
    errors: Vec<Error>,
}

impl Default for Runtime {
    fn default() -> Runtime {
        Runtime::new()
    }
}

impl Runtime {
    pub fn new() -> Runtime {
        Runtime {
            program: Program::empty(),
            compiled: vec![],
            vars: HashMap::new(),
            arrays: HashMap::new(),
            defs: HashMap::new(),
            locals: vec![],
            fors: vec![],
            returns: vec![],
            data_cursor: 0,
            column: 0,
            curpc: 0,
            running: true,
            pending: None,
            output: String::new(),
            errors: vec![],
        }
    }

    /// Replace the loaded program. If the runtime was suspended at an
    /// INPUT and the new program still has the suspended line's
    /// label, variables and arrays carry over and execution resumes
    /// at that label; otherwise everything resets and the program
    /// runs from the top.
    pub fn load(&mut self, source: BasicProgram) {
        let program = match Program::load(source) {
            Ok(program) => program,
            Err(error) => {
                self.reset();
                self.running = false;
                self.errors.push(error);
                return;
            }
        };
        let resume = self
            .pending
            .take()
            .and_then(|pending| self.program.label_for_pc(pending.pc))
            .and_then(|label| program.label_pc(&label));
        let vars = std::mem::take(&mut self.vars);
        let arrays = std::mem::take(&mut self.arrays);
        self.program = program;
        self.compiled = vec![None; self.program.len()];
        self.reset();
        if let Some(pc) = resume {
            self.vars = vars;
            self.arrays = arrays;
            self.curpc = pc;
        }
    }

    /// Clear all mutable state and rewind to the first statement.
    /// The loaded program and its compiled-closure cache survive.
    pub fn reset(&mut self) {
        if self.compiled.len() != self.program.len() {
            self.compiled = vec![None; self.program.len()];
        }
        self.vars.clear();
        self.arrays.clear();
        self.defs.clear();
        self.locals.clear();
        self.fors.clear();
        self.returns.clear();
        self.data_cursor = 0;
        self.column = 0;
        self.curpc = 0;
        self.running = true;
        self.pending = None;
        self.output.clear();
        self.errors.clear();
    }

    /// Execute at most one statement. Returns false when the runtime
    /// is stopped, suspended, or has just failed.
    pub fn step(&mut self) -> bool {
        if !self.running || self.pending.is_some() {
            return false;
        }
        let pc = self.curpc;
        if self.program.statement(pc).is_none() {
            self.running = false;
            return false;
        }
        let compiled = match &self.compiled[pc] {
            Some(compiled) => compiled.clone(),
            None => match compile::compile(&self.program, pc) {
                Ok(compiled) => {
                    self.compiled[pc] = Some(compiled.clone());
                    compiled
                }
                Err(error) => {
                    self.fail(pc, error);
                    return false;
                }
            },
        };
        self.curpc = pc + 1;
        match compiled(self) {
            Ok(Flow::Next) => true,
            Ok(Flow::Jump(target)) => {
                self.curpc = target;
                true
            }
            Err(error) => {
                self.fail(pc, error);
                false
            }
        }
    }

    /// Run up to `steps` statements and report the first thing the
    /// host must handle. Output is drained before anything else so
    /// it reaches the host in program order.
    pub fn execute(&mut self, steps: usize) -> Event {
        for _ in 0..steps {
            if !self.output.is_empty() {
                return Event::Print(std::mem::take(&mut self.output));
            }
            if let Some(pending) = &self.pending {
                return Event::Input(pending.prompt.to_string(), pending.entries.len());
            }
            if !self.errors.is_empty() {
                return Event::Errors(std::mem::take(&mut self.errors));
            }
            if !self.running {
                return Event::Stopped;
            }
            self.step();
        }
        if !self.output.is_empty() {
            Event::Print(std::mem::take(&mut self.output))
        } else {
            Event::Running
        }
    }

    /// Resolve a pending INPUT with raw strings from the host, one
    /// per requested value. Returns false when the values don't fit;
    /// the statement is rewound so the next `execute()` re-prompts
    /// without consuming anything.
    pub fn provide_input(&mut self, values: &[&str]) -> bool {
        let pending = match self.pending.take() {
            Some(pending) => pending,
            None => return false,
        };
        let retry = |rt: &mut Runtime, pending: PendingInput| {
            rt.curpc = pending.pc;
            rt.running = true;
            false
        };
        if values.len() != pending.entries.len() {
            return retry(self, pending);
        }
        let mut parsed = Vec::with_capacity(values.len());
        for (raw, (string, _)) in values.iter().zip(&pending.entries) {
            if *string {
                parsed.push(Val::String((*raw).into()));
            } else {
                match raw.trim().parse::<f64>() {
                    Ok(n) => parsed.push(Val::Number(n)),
                    Err(_) => return retry(self, pending),
                }
            }
        }
        for ((_, set), value) in pending.entries.iter().zip(parsed) {
            let set = set.clone();
            if let Err(error) = set(self, value) {
                self.fail(pending.pc, error);
                return false;
            }
        }
        self.running = true;
        true
    }

    /// Coarse cancellation, safe to call from a Ctrl-C handler path.
    /// The run halts before the next statement with a Break error.
    pub fn interrupt(&mut self) {
        let pc = match self.pending.take() {
            Some(pending) => pending.pc,
            None if self.running => self.curpc,
            None => return,
        };
        self.fail(pc, error!("Break"));
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    fn fail(&mut self, pc: Address, error: Error) {
        let error = error.with_label(self.program.label_for_pc(pc));
        self.errors.push(error);
        self.running = false;
    }

    // Everything below is the surface the compiled closures run
    // against.

    /// Address the statement after the one in flight, where RETURN
    /// comes back to.
    pub(super) fn return_pc(&self) -> Address {
        self.curpc
    }

    pub(super) fn push_return(&mut self, pc: Address) {
        self.returns.push(pc);
    }

    pub(super) fn pop_return(&mut self) -> Option<Address> {
        self.returns.pop()
    }

    /// Re-entering a FOR discards any stale loop for the same
    /// variable, so GOTO-driven loops don't grow the stack.
    pub(super) fn push_for(&mut self, entry: ForEntry) {
        if let Some(at) = self.fors.iter().position(|e| e.var == entry.var) {
            self.fors.truncate(at);
        }
        self.fors.push(entry);
    }

    /// One NEXT application: advance the innermost loop, popping it
    /// when done or answering the body address to rewind to.
    pub(super) fn iterate(&mut self, var: Option<&str>) -> Result<Option<Address>> {
        let entry = match self.fors.last() {
            Some(entry) => entry.clone(),
            None => return Err(error!("NEXT without FOR")),
        };
        if let Some(var) = var {
            if &*entry.var != var {
                return Err(error!("NEXT {} does not match FOR {}", var, entry.var));
            }
        }
        let value = self.fetch(&entry.var)?.number()? + entry.step;
        self.store(entry.var.clone(), Val::Number(value))?;
        let done = if entry.step >= 0.0 {
            value > entry.target
        } else {
            value < entry.target
        };
        if done {
            self.fors.pop();
            Ok(None)
        } else {
            Ok(Some(entry.pc))
        }
    }

    pub(super) fn fetch(&self, name: &str) -> Result<Val> {
        if let Some(frame) = self.locals.last() {
            if let Some(value) = frame.get(name) {
                return Ok(value.clone());
            }
        }
        if let Some(value) = self.vars.get(name) {
            return Ok(value.clone());
        }
        if self.program.options().default_values {
            if name.ends_with('$') {
                Ok(Val::String("".into()))
            } else {
                Ok(Val::Number(0.0))
            }
        } else {
            Err(error!("Variable {} has no value", name))
        }
    }

    pub(super) fn store(&mut self, name: Rc<str>, value: Val) -> Result<()> {
        if self.program.options().shared_array_namespace && self.arrays.contains_key(&name) {
            return Err(error!("{} is already an array", name));
        }
        self.vars.insert(name, value);
        Ok(())
    }

    pub(super) fn dim_array(&mut self, name: Rc<str>, maxes: Vec<usize>) -> Result<()> {
        if self.arrays.contains_key(&name) {
            return Err(error!("Array {} is already dimensioned", name));
        }
        self.check_array_name(&name, maxes.len())?;
        let base = self.program.options().default_array_base;
        for max in &maxes {
            if *max < base {
                return Err(error!("Subscript out of range"));
            }
        }
        let array = Array::new(name.ends_with('$'), base, maxes);
        self.arrays.insert(name, array);
        Ok(())
    }

    pub(super) fn fetch_array(&mut self, name: &str, subscript: &[usize]) -> Result<Val> {
        self.auto_dim(name, subscript.len())?;
        let array = &self.arrays[name];
        let offset = array.offset(subscript)?;
        Ok(array.values[offset].clone())
    }

    pub(super) fn store_array(&mut self, name: &str, subscript: &[usize], value: Val) -> Result<()> {
        self.auto_dim(name, subscript.len())?;
        let array = self.arrays.get_mut(name).ok_or_else(|| error!("Subscript out of range"))?;
        let offset = array.offset(subscript)?;
        array.values[offset] = value;
        Ok(())
    }

    /// Subscripting an undeclared array declares it at the default
    /// size, unless the dialect demands an explicit DIM.
    fn auto_dim(&mut self, name: &str, rank: usize) -> Result<()> {
        if self.arrays.contains_key(name) {
            return Ok(());
        }
        let options = self.program.options();
        if options.dim_required {
            return Err(error!("Array {} must be declared with DIM", name));
        }
        let base = options.default_array_base;
        let size = options.default_array_size;
        self.check_array_name(name, rank)?;
        let maxes = vec![base + size - 1; rank];
        let array = Array::new(name.ends_with('$'), base, maxes);
        self.arrays.insert(name.into(), array);
        Ok(())
    }

    fn check_array_name(&self, name: &str, rank: usize) -> Result<()> {
        let options = self.program.options();
        if rank == 0 || rank > options.max_dimensions {
            return Err(error!("Arrays may have 1 or 2 dimensions"));
        }
        if options.shared_array_namespace && self.vars.contains_key(name) {
            return Err(error!("{} is already a variable", name));
        }
        Ok(())
    }

    pub(super) fn define_fn(&mut self, name: Rc<str>, params: Vec<Rc<str>>, body: ExprFn) {
        self.defs.insert(name, UserFn { params, body });
    }

    pub(super) fn call_user_fn(&mut self, name: &str, args: Vec<Val>) -> Result<Val> {
        let def = match self.defs.get(name) {
            Some(def) => def.clone(),
            None => return Err(error!("Function {} is not defined", name)),
        };
        if args.len() != def.params.len() {
            return Err(error!("Wrong number of arguments for {}", name));
        }
        let convert = self.program.options().type_convert;
        let mut frame = HashMap::with_capacity(args.len());
        for (param, arg) in def.params.iter().zip(args) {
            let value = val::coerce(arg, param.ends_with('$'), convert)?;
            frame.insert(param.clone(), value);
        }
        self.locals.push(frame);
        let result = (def.body)(self);
        self.locals.pop();
        result
    }

    pub(super) fn read_data(&mut self) -> Result<Val> {
        match self.program.data().get(self.data_cursor) {
            Some(value) => {
                self.data_cursor += 1;
                Ok(value.clone())
            }
            None => Err(error!("Ran out of DATA")),
        }
    }

    pub(super) fn restore_data(&mut self) {
        self.data_cursor = 0;
    }

    pub(super) fn request_input(&mut self, pc: Address, prompt: Rc<str>, entries: Vec<(bool, SetterFn)>) {
        self.pending = Some(PendingInput { pc, prompt, entries });
        self.running = false;
    }

    /// Append program output, tracking the print column for TAB and
    /// comma zones.
    pub(super) fn emit(&mut self, text: &str) {
        for ch in text.chars() {
            if ch == '\n' {
                self.column = 0;
            } else {
                self.column += 1;
            }
        }
        self.output.push_str(text);
    }

    /// Comma separator: pad with spaces to the next print zone.
    pub(super) fn zone_jump(&mut self) {
        let width = self.program.options().print_zone_width;
        let pad = width - self.column % width;
        self.emit(&" ".repeat(pad));
    }

    pub(super) fn print_column(&self) -> usize {
        self.column
    }
}
