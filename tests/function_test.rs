mod common;
use common::*;

#[test]
fn test_math_functions() {
    let mut r = load("10 PRINT ABS(-3);SGN(-9);INT(2.7);FIX(-2.7);SQR(16)\n");
    assert_eq!(exec(&mut r), " 3 -1  2 -2  4 \n");
}

#[test]
fn test_int_floors_negatives() {
    let mut r = load("10 PRINT INT(-2.5)\n");
    assert_eq!(exec(&mut r), "-3 \n");
}

#[test]
fn test_log_of_zero_halts() {
    let mut r = load("10 PRINT LOG(0)\n");
    assert_eq!(exec(&mut r), "LOG of a non-positive number (in line 10)\n");
}

#[test]
fn test_log_of_negative_halts() {
    let mut r = load("10 PRINT LOG(-1)\n");
    assert_eq!(exec(&mut r), "LOG of a non-positive number (in line 10)\n");
}

#[test]
fn test_sqr_of_negative_halts() {
    let mut r = load("10 PRINT SQR(-4)\n");
    assert_eq!(exec(&mut r), "SQR of a negative number (in line 10)\n");
}

#[test]
fn test_string_functions() {
    let mut r = load(
        "10 A$=\"HELLO\"\n20 PRINT LEFT$(A$,2);MID$(A$,2,3);RIGHT$(A$,2);LEN(A$)\n",
    );
    assert_eq!(exec(&mut r), "HEELLLO 5 \n");
}

#[test]
fn test_chr_asc_roundtrip() {
    let mut r = load("10 PRINT CHR$(65);ASC(\"A\")\n");
    assert_eq!(exec(&mut r), "A 65 \n");
}

#[test]
fn test_str_and_val() {
    let mut r = load("10 PRINT STR$(3.14);VAL(\"12.5AB\");VAL(\"XYZ\")\n");
    assert_eq!(exec(&mut r), " 3.14 12.5  0 \n");
}

#[test]
fn test_instr() {
    let mut r = load("10 PRINT INSTR(\"ABCABC\",\"BC\");INSTR(\"ABCABC\",\"BC\",3)\n");
    assert_eq!(exec(&mut r), " 2  5 \n");
}

#[test]
fn test_hex_and_space() {
    let mut r = load("10 PRINT HEX$(255);SPACE$(3);\"X\"\n");
    assert_eq!(exec(&mut r), "FF   X\n");
}

#[test]
fn test_round() {
    let mut r = load("10 PRINT ROUND(2.567,2);ROUND(2.5)\n");
    assert_eq!(exec(&mut r), " 2.57  3 \n");
}

#[test]
fn test_rnd_stays_in_range() {
    let mut r = load(
        "10 FOR I=1 TO 50\n20 X=RND(1)\n30 IF X<0 THEN PRINT \"LOW\"\n40 IF X>=1 THEN PRINT \"HIGH\"\n50 NEXT\n60 PRINT \"OK\"\n",
    );
    assert_eq!(exec(&mut r), "OK\n");
}

#[test]
fn test_wrong_argument_count_is_fatal() {
    let mut r = load("10 PRINT ABS(1,2)\n");
    assert_eq!(exec(&mut r), "Wrong number of arguments for ABS (in line 10)\n");
}
