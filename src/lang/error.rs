use super::{Column, SourceLine};
use std::rc::Rc;

/// A compile-time or runtime failure.
///
/// Compile errors carry the one-based source line they were found on;
/// parsing continues with the next line so one pass reports them all.
/// Runtime errors carry the best-known numeric label instead and are
/// always fatal to the run.
#[derive(Clone, PartialEq)]
pub struct Error {
    message: String,
    line: SourceLine,
    column: Column,
    label: Option<Rc<str>>,
}

#[doc(hidden)]
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::lang::Error::new(format!($($arg)*))
    };
}

impl Error {
    pub fn new(message: String) -> Error {
        Error {
            message,
            line: None,
            column: 0..0,
            label: None,
        }
    }

    pub fn in_line(mut self, line: usize) -> Error {
        if self.line.is_none() {
            self.line = Some(line);
        }
        self
    }

    pub fn in_column(mut self, column: &Column) -> Error {
        if self.column == (0..0) {
            self.column = column.clone();
        }
        self
    }

    pub fn with_label(mut self, label: Option<Rc<str>>) -> Error {
        if self.label.is_none() {
            self.label = label;
        }
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn line(&self) -> SourceLine {
        self.line
    }

    pub fn column(&self) -> Column {
        self.column.clone()
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error {{ {} }}", self)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if let Some(line) = self.line {
            write!(f, "Line {}: ", line)?;
        }
        write!(f, "{}", self.message)?;
        if let Some(label) = &self.label {
            write!(f, " (in line {})", label)?;
        }
        Ok(())
    }
}
