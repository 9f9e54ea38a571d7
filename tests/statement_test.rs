mod common;
use common::*;

#[test]
fn test_implicit_let() {
    let mut r = load("10 A=5:PRINT A\n");
    assert_eq!(exec(&mut r), " 5 \n");
}

#[test]
fn test_for_loop_runs_three_times() {
    let mut r = load("10 FOR I=1 TO 3\n20 PRINT I;\n30 NEXT\n");
    assert_eq!(exec(&mut r), " 1  2  3 ");
}

#[test]
fn test_for_loop_negative_step() {
    let mut r = load("10 FOR I=5 TO 1 STEP -1:PRINT I;:NEXT\n");
    assert_eq!(exec(&mut r), " 5  4  3  2  1 ");
}

#[test]
fn test_for_loop_always_runs_once() {
    let mut r = load("10 FOR I=3 TO 0:PRINT I:NEXT I\n");
    assert_eq!(exec(&mut r), " 3 \n");
}

#[test]
fn test_nested_for_loops() {
    let mut r = load("10 FOR I=1 TO 2:FOR J=1 TO 2:PRINT I;J;:NEXT J,I\n20 PRINT \"DONE\"\n");
    assert_eq!(exec(&mut r), " 1  1  1  2  2  1  2  2 DONE\n");
}

#[test]
fn test_next_must_match_innermost_for() {
    let mut r = load("10 FOR I=1 TO 2:FOR J=1 TO 2\n20 NEXT I\n");
    assert_eq!(exec(&mut r), "NEXT I does not match FOR J (in line 20)\n");
}

#[test]
fn test_next_without_for() {
    let mut r = load("10 NEXT\n");
    assert_eq!(exec(&mut r), "NEXT without FOR (in line 10)\n");
}

#[test]
fn test_reentered_for_discards_stale_loop() {
    // GOTO abandons the loop body; re-running the FOR must not grow
    // the loop stack forever.
    let mut r = load(
        "10 C=C+1\n20 FOR I=1 TO 10\n30 IF C<50 THEN 10\n40 NEXT I\n50 PRINT C\n",
    );
    assert_eq!(exec(&mut r), " 50 \n");
}

#[test]
fn test_gosub_return() {
    let mut r = load("10 GOSUB 40\n20 PRINT \"B\"\n30 END\n40 PRINT \"A\"\n50 RETURN\n");
    assert_eq!(exec(&mut r), "A\nB\n");
}

#[test]
fn test_nested_gosub() {
    let mut r = load(
        "10 GOSUB 30\n20 END\n30 PRINT 1;\n40 GOSUB 60\n50 RETURN\n60 PRINT 2;\n70 RETURN\n",
    );
    assert_eq!(exec(&mut r), " 1  2 ");
}

#[test]
fn test_return_without_gosub() {
    let mut r = load("10 RETURN\n");
    assert_eq!(exec(&mut r), "RETURN without GOSUB (in line 10)\n");
}

#[test]
fn test_if_guards_rest_of_line() {
    let mut r = load("10 IF 0 THEN PRINT \"A\": PRINT \"B\"\n20 PRINT \"C\"\n");
    assert_eq!(exec(&mut r), "C\n");
    let mut r = load("10 IF 1 THEN PRINT \"A\": PRINT \"B\"\n20 PRINT \"C\"\n");
    assert_eq!(exec(&mut r), "A\nB\nC\n");
}

#[test]
fn test_if_then_line_number() {
    let mut r = load("10 IF 1 THEN 30\n20 PRINT \"NO\"\n30 PRINT \"YES\"\n");
    assert_eq!(exec(&mut r), "YES\n");
}

#[test]
fn test_on_goto() {
    let mut r = load("10 ON 2 GOTO 30,40\n20 END\n30 PRINT \"A\"\n40 PRINT \"B\"\n");
    assert_eq!(exec(&mut r), "B\n");
}

#[test]
fn test_on_goto_out_of_range() {
    let mut r = load("10 ON 3 GOTO 20,30\n20 PRINT \"A\"\n30 PRINT \"B\"\n");
    assert_eq!(exec(&mut r), "ON GOTO index out of range (in line 10)\n");
}

#[test]
fn test_stop_halts() {
    let mut r = load("10 PRINT \"A\"\n20 STOP\n30 PRINT \"B\"\n");
    assert_eq!(exec(&mut r), "A\n");
}

#[test]
fn test_end_halts() {
    let mut r = load("10 PRINT \"A\"\n20 END\n30 PRINT \"B\"\n");
    assert_eq!(exec(&mut r), "A\n");
}

#[test]
fn test_def_fn() {
    let mut r = load("10 DEF FNS(X) = X*X\n20 PRINT FNS(3)\n");
    assert_eq!(exec(&mut r), " 9 \n");
}

#[test]
fn test_def_fn_parameter_shadows_global() {
    let mut r = load("10 X=7\n20 DEF FND(X)=X+1\n30 PRINT FND(1);X\n");
    assert_eq!(exec(&mut r), " 2  7 \n");
}

#[test]
fn test_fn_called_before_def() {
    let mut r = load("10 PRINT FNF(1)\n20 DEF FNF(X)=X\n");
    assert_eq!(exec(&mut r), "Function FNF is not defined (in line 10)\n");
}

#[test]
fn test_goto_loop_detected_by_cycle_limit() {
    let mut r = load("10 GOTO 10\n");
    let out = exec_n(&mut r, 100);
    assert!(out.contains("Execution cycles exceeded"), "{:?}", out);
}

#[test]
fn test_interrupt_breaks_run() {
    let mut r = load("10 GOTO 10\n");
    assert_eq!(r.execute(10), basic::mach::Event::Running);
    r.interrupt();
    assert_eq!(exec(&mut r), "Break (in line 10)\n");
}
