mod common;
use basic::lang::{parse, BasicOptions};
use basic::mach::Program;
use common::*;

#[test]
fn test_read_in_program_order() {
    let mut r = load("10 DATA 1,2\n20 READ A,B\n30 PRINT A;B\n40 DATA 3\n50 READ C\n60 PRINT C\n");
    assert_eq!(exec(&mut r), " 1  2 \n 3 \n");
}

#[test]
fn test_data_after_read_still_counts() {
    // DATA is flattened at load time, so position in the program
    // doesn't matter relative to READ.
    let mut r = load("10 READ A\n20 PRINT A\n30 DATA 42\n");
    assert_eq!(exec(&mut r), " 42 \n");
}

#[test]
fn test_restore_rewinds_cursor() {
    let mut r = load("10 DATA 1,2\n20 READ A,B\n30 RESTORE\n40 READ C\n50 PRINT A;B;C\n");
    assert_eq!(exec(&mut r), " 1  2  1 \n");
}

#[test]
fn test_read_past_end() {
    let mut r = load("10 DATA 1\n20 READ A,B\n");
    assert_eq!(exec(&mut r), "Ran out of DATA (in line 20)\n");
}

#[test]
fn test_read_string_data() {
    let mut r = load("10 DATA \"HELLO\",-5\n20 READ A$,B\n30 PRINT A$;B\n");
    assert_eq!(exec(&mut r), "HELLO-5 \n");
}

#[test]
fn test_read_type_mismatch() {
    let mut r = load("10 DATA \"X\"\n20 READ A\n");
    assert_eq!(exec(&mut r), "Type mismatch, expected a number (in line 20)\n");
}

#[test]
fn test_data_must_be_constant() {
    let (program, errors) = parse("10 DATA 1+2\n", BasicOptions::altair());
    assert!(errors.is_empty());
    let error = Program::load(program).unwrap_err();
    assert_eq!(error.message(), "DATA values must be constants");
}

#[test]
fn test_read_into_array() {
    let mut r = load("10 DATA 5,6\n20 READ A(0),A(1)\n30 PRINT A(0);A(1)\n");
    assert_eq!(exec(&mut r), " 5  6 \n");
}
