/*!
# Machine Module

Indexes a parsed program into a flat program-counter space and
executes it cooperatively, one statement per step. Statements are
compiled into closures the first time they run and the result is
memoized per statement slot.

*/

/// Index into the flattened statement arena.
pub type Address = usize;

mod compile;
mod function;
mod operation;
mod program;
mod runtime;
mod val;

pub use compile::{compile, Flow, StmtFn};
pub use function::Function;
pub use operation::Operation;
pub use program::Program;
pub use runtime::{Event, Runtime};
pub use val::Val;
