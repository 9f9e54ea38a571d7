/*!
# Terminal Host

Console front end for the engine. Loads a program from a file, runs
it, prints output to stdout, collects INPUT lines with linefeed, and
turns Ctrl-C into a runtime interrupt between statements.

*/

extern crate ansi_term;
extern crate clap;
extern crate ctrlc;
extern crate linefeed;

use crate::lang::{parse, BasicOptions, Error};
use crate::mach::{Event, Runtime};
use ansi_term::Style;
use clap::{Arg, Command};
use linefeed::{Interface, ReadResult, Signal};
use std::fs;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub fn main() {
    let matches = Command::new("basic")
        .about("A line-numbered BASIC dialect interpreter")
        .arg(
            Arg::new("file")
                .help("The program file to run")
                .value_name("FILE")
                .index(1)
                .required(true),
        )
        .arg(
            Arg::new("dialect")
                .long("dialect")
                .help("Dialect profile: ECMA55 or ALTAIR")
                .value_name("NAME")
                .default_value("ALTAIR"),
        )
        .get_matches();

    let file = matches.get_one::<String>("file").cloned().unwrap_or_default();
    let dialect = matches
        .get_one::<String>("dialect")
        .cloned()
        .unwrap_or_default();
    if let Err(error) = run(&file, &dialect) {
        eprintln!("{}", Style::new().bold().paint(error.to_string()));
        std::process::exit(1);
    }
}

fn run(file: &str, dialect: &str) -> Result<(), Box<dyn std::error::Error>> {
    let options = match BasicOptions::named(&dialect.to_uppercase()) {
        Some(options) => options,
        None => return Err(format!("Unknown dialect \"{}\"", dialect).into()),
    };
    let source = fs::read_to_string(file)?;
    let (program, errors) = parse(&source, options);
    if !errors.is_empty() {
        report(&errors);
        return Err(format!("{} error(s) in {}", errors.len(), file).into());
    }

    let interrupted = Arc::new(AtomicBool::new(false));
    let int_moved = interrupted.clone();
    ctrlc::set_handler(move || {
        int_moved.store(true, Ordering::SeqCst);
    })?;

    let input = Interface::new("input")?;
    input.set_report_signal(Signal::Interrupt, true);

    let mut runtime = Runtime::new();
    runtime.load(program);
    loop {
        if interrupted.swap(false, Ordering::SeqCst) {
            runtime.interrupt();
        }
        match runtime.execute(5000) {
            Event::Stopped => break,
            Event::Running => {}
            Event::Print(text) => {
                print!("{}", text);
                std::io::stdout().flush()?;
            }
            Event::Errors(errors) => report(&errors),
            Event::Input(prompt, count) => {
                input.set_prompt(&prompt)?;
                match input.read_line()? {
                    ReadResult::Input(line) => {
                        let values: Vec<&str> = if count <= 1 {
                            vec![line.trim()]
                        } else {
                            line.split(',').map(str::trim).collect()
                        };
                        if runtime.provide_input(&values) {
                            input.add_history_unique(line);
                        }
                    }
                    ReadResult::Signal(Signal::Interrupt) => {
                        input.lock_reader().cancel_read_line()?;
                        runtime.interrupt();
                    }
                    ReadResult::Signal(_) | ReadResult::Eof => break,
                }
            }
        }
    }
    Ok(())
}

fn report(errors: &[Error]) {
    for error in errors {
        eprintln!("{}", Style::new().bold().paint(error.to_string()));
    }
}
