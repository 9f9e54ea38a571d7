use super::{Address, Val};
use crate::error;
use crate::lang::ast::{BasicProgram, Expression, Statement};
use crate::lang::{BasicOptions, Error};
use std::collections::HashMap;
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

/// A parsed program flattened into a single program-counter space.
/// Statements from every line sit in one arena, in source order, so
/// jumps, GOSUB returns, and IF line-skips are all plain addresses.
#[derive(Debug, Clone)]
pub struct Program {
    statements: Vec<Statement>,
    /// Start address of each source line, ascending.
    line_starts: Vec<Address>,
    line_labels: Vec<Option<Rc<str>>>,
    source_lines: Vec<usize>,
    label_pcs: HashMap<Rc<str>, Address>,
    /// Every DATA constant in source order, flattened at load time.
    data: Vec<Val>,
    options: BasicOptions,
}

impl Program {
    /// A program with no statements, for a runtime before any load.
    pub fn empty() -> Program {
        Program {
            statements: vec![],
            line_starts: vec![],
            line_labels: vec![],
            source_lines: vec![],
            label_pcs: HashMap::new(),
            data: vec![],
            options: BasicOptions::default(),
        }
    }

    pub fn load(source: BasicProgram) -> Result<Program> {
        let mut program = Program {
            statements: vec![],
            line_starts: vec![],
            line_labels: vec![],
            source_lines: vec![],
            label_pcs: HashMap::new(),
            data: vec![],
            options: source.options,
        };
        for line in source.lines {
            let start = program.statements.len();
            program.line_starts.push(start);
            program.source_lines.push(line.source_line);
            if let Some(label) = &line.label {
                program.label_pcs.insert(label.clone(), start);
            }
            program.line_labels.push(line.label);
            for statement in line.statements {
                if let Statement::Data(_, items) = &statement {
                    for item in items {
                        program.data.push(data_constant(item)?);
                    }
                }
                program.statements.push(statement);
            }
        }
        Ok(program)
    }

    pub fn statement(&self, pc: Address) -> Option<&Statement> {
        self.statements.get(pc)
    }

    pub fn len(&self) -> Address {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn label_pc(&self, label: &str) -> Option<Address> {
        self.label_pcs.get(label).cloned()
    }

    /// First address past the line containing `pc`. The IF guard
    /// jumps here when its condition is false.
    pub fn line_end_pc(&self, pc: Address) -> Address {
        let line = self.line_index(pc);
        match self.line_starts.get(line + 1) {
            Some(start) => *start,
            None => self.statements.len(),
        }
    }

    /// Label of the nearest labeled line at or before `pc`, for
    /// attributing runtime errors.
    pub fn label_for_pc(&self, pc: Address) -> Option<Rc<str>> {
        let line = self.line_index(pc);
        self.line_labels[..=line]
            .iter()
            .rev()
            .find_map(|label| label.clone())
    }

    pub fn source_line_for_pc(&self, pc: Address) -> Option<usize> {
        self.source_lines.get(self.line_index(pc)).cloned()
    }

    fn line_index(&self, pc: Address) -> usize {
        self.line_starts
            .partition_point(|start| *start <= pc)
            .saturating_sub(1)
    }

    pub fn data(&self) -> &[Val] {
        &self.data
    }

    pub fn options(&self) -> &BasicOptions {
        &self.options
    }
}

/// DATA items must be literals, optionally negated.
fn data_constant(expression: &Expression) -> Result<Val> {
    match expression {
        Expression::Number(_, n) => Ok(Val::Number(*n)),
        Expression::String(_, s) => Ok(Val::String(s.clone())),
        Expression::Negate(col, inner) => match &**inner {
            Expression::Number(_, n) => Ok(Val::Number(-n)),
            _ => Err(error!("DATA values must be constants").in_column(col)),
        },
        other => Err(error!("DATA values must be constants").in_column(&other.column())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::parse;

    fn load(source: &str) -> Program {
        let (parsed, errors) = parse(source, BasicOptions::altair());
        assert!(errors.is_empty(), "{:?}", errors);
        Program::load(parsed).unwrap()
    }

    #[test]
    fn test_flattening() {
        let program = load("10 PRINT 1: PRINT 2\n20 PRINT 3\n30 END\n");
        assert_eq!(program.len(), 4);
        assert_eq!(program.label_pc("10"), Some(0));
        assert_eq!(program.label_pc("20"), Some(2));
        assert_eq!(program.label_pc("30"), Some(3));
        assert_eq!(program.label_pc("40"), None);
    }

    #[test]
    fn test_line_end_pc() {
        let program = load("10 IF 1 THEN PRINT 1: PRINT 2\n20 END\n");
        assert_eq!(program.line_end_pc(0), 3);
        assert_eq!(program.line_end_pc(3), 4);
    }

    #[test]
    fn test_label_for_pc() {
        let program = load("10 PRINT 1: PRINT 2\n20 PRINT 3\n");
        assert_eq!(program.label_for_pc(1).as_deref(), Some("10"));
        assert_eq!(program.label_for_pc(2).as_deref(), Some("20"));
    }

    #[test]
    fn test_data_flattening() {
        let program = load("10 DATA 1, -2, \"THREE\"\n20 DATA 4\n");
        assert_eq!(
            program.data(),
            &[
                Val::Number(1.0),
                Val::Number(-2.0),
                Val::String("THREE".into()),
                Val::Number(4.0)
            ]
        );
    }

    #[test]
    fn test_data_rejects_expressions() {
        let (parsed, errors) = parse("10 DATA 1+2\n", BasicOptions::altair());
        assert!(errors.is_empty());
        assert!(Program::load(parsed).is_err());
    }
}
