use basic::lang::{parse, BasicOptions};
use basic::mach::{Event, Runtime};

/// Parse a program that must be error-free and load it into a fresh
/// runtime.
pub fn load(source: &str) -> Runtime {
    load_with(source, BasicOptions::altair())
}

pub fn load_with(source: &str, options: BasicOptions) -> Runtime {
    let (program, errors) = parse(source, options);
    assert!(errors.is_empty(), "{:?}", errors);
    let mut runtime = Runtime::new();
    runtime.load(program);
    runtime
}

/// Parse a program expected to fail to compile and return the error
/// messages.
pub fn compile_errors(source: &str) -> Vec<String> {
    compile_errors_with(source, BasicOptions::altair())
}

pub fn compile_errors_with(source: &str, options: BasicOptions) -> Vec<String> {
    let (_, errors) = parse(source, options);
    errors.iter().map(|e| e.to_string()).collect()
}

/// Drive the runtime until it stops or suspends, collecting printed
/// output and error text. A suspended INPUT contributes its prompt
/// and stops the drive so the test can provide values.
pub fn exec(runtime: &mut Runtime) -> String {
    exec_n(runtime, 5000)
}

pub fn exec_n(runtime: &mut Runtime, cycles: usize) -> String {
    let mut s = String::new();
    let mut prev_running = false;
    loop {
        let event = runtime.execute(cycles);
        match &event {
            Event::Stopped => {
                break;
            }
            Event::Errors(errors) => {
                for error in errors.iter() {
                    s.push_str(&format!("{}\n", error));
                }
            }
            Event::Running => {
                if prev_running {
                    s.push_str(&format!("\n{} Execution cycles exceeded.\n", cycles));
                    break;
                }
            }
            Event::Print(text) => {
                s.push_str(text);
            }
            Event::Input(prompt, _) => {
                s.push_str(prompt);
                break;
            }
        }
        prev_running = matches!(event, Event::Running);
    }
    s
}
