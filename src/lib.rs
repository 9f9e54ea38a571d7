//! # BASIC dialect engine
//!
//! A two-stage engine for a line-numbered BASIC dialect.
//!
//! The [`lang`] module lexes and parses source text into an abstract
//! syntax tree, validating it against a configurable dialect. The
//! [`mach`] module indexes the tree into a flat program-counter space
//! and executes it one statement at a time, compiling each statement
//! into a closure the first time it runs.
//!
//! The runtime never blocks. Hosts drive it with
//! [`mach::Runtime::execute`] and service [`mach::Event::Print`] and
//! [`mach::Event::Input`] however they like; the bundled `basic`
//! binary is a plain console host.
//!
//! ```
//! use basic::lang::{parse, BasicOptions};
//! use basic::mach::{Event, Runtime};
//!
//! let (program, errors) = parse("10 PRINT \"HELLO\"\n20 END", BasicOptions::altair());
//! assert!(errors.is_empty());
//! let mut runtime = Runtime::new();
//! runtime.load(program);
//! loop {
//!     match runtime.execute(100) {
//!         Event::Print(s) => print!("{}", s),
//!         Event::Stopped => break,
//!         _ => {}
//!     }
//! }
//! ```

pub mod lang;
pub mod mach;
pub mod term;
