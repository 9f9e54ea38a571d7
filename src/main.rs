//! Console front end for the BASIC dialect engine.

fn main() {
    basic::term::main()
}
