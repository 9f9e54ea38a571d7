use super::{val, Val};
use crate::error;
use crate::lang::Error;
use rand::Rng;
use std::ops::RangeInclusive;

type Result<T> = std::result::Result<T, Error>;

/// The built-in function library. Names are matched after the lexer
/// has folded them to uppercase.
pub struct Function;

impl Function {
    /// Accepted argument counts, or None for an unknown name.
    /// The compiler checks this once; `eval` trusts it.
    pub fn arity(name: &str) -> Option<RangeInclusive<usize>> {
        match name {
            "RND" => Some(0..=1),
            "ABS" | "ASC" | "ATN" | "CHR$" | "COS" | "EXP" | "FIX" | "HEX$" | "INT" | "LEN"
            | "LOG" | "SGN" | "SIN" | "SPACE$" | "SQR" | "STR$" | "TAB" | "TAN" | "VAL" => {
                Some(1..=1)
            }
            "ROUND" => Some(1..=2),
            "LEFT$" | "RIGHT$" => Some(2..=2),
            "INSTR" | "MID$" => Some(2..=3),
            _ => None,
        }
    }

    /// Evaluate a call. `column` is the current print column, which
    /// only TAB consults.
    pub fn eval(name: &str, args: &[Val], column: usize) -> Result<Val> {
        match name {
            "ABS" => numeric(args, f64::abs),
            "ASC" => Self::asc(args),
            "ATN" => numeric(args, f64::atan),
            "CHR$" => Self::chr(args),
            "COS" => numeric(args, f64::cos),
            "EXP" => numeric(args, f64::exp),
            "FIX" => numeric(args, f64::trunc),
            "HEX$" => Self::hex(args),
            "INSTR" => Self::instr(args),
            "INT" => numeric(args, f64::floor),
            "LEFT$" => Self::left(args),
            "LEN" => Self::len(args),
            "LOG" => Self::log(args),
            "MID$" => Self::mid(args),
            "RIGHT$" => Self::right(args),
            "RND" => Self::rnd(args),
            "ROUND" => Self::round(args),
            "SGN" => numeric(args, f64::signum),
            "SIN" => numeric(args, f64::sin),
            "SPACE$" => Self::space(args),
            "SQR" => Self::sqr(args),
            "STR$" => Self::str(args),
            "TAB" => Self::tab(args, column),
            "TAN" => numeric(args, f64::tan),
            "VAL" => Self::val(args),
            _ => Err(error!("Unknown function \"{}\"", name)),
        }
    }

    fn asc(args: &[Val]) -> Result<Val> {
        let s = args[0].string()?;
        match s.chars().next() {
            Some(ch) => Ok(Val::Number(ch as u32 as f64)),
            None => Err(error!("ASC of an empty string")),
        }
    }

    fn chr(args: &[Val]) -> Result<Val> {
        let code = args[0].index()?;
        match std::char::from_u32(code as u32) {
            Some(ch) => Ok(Val::String(ch.to_string().into())),
            None => Err(error!("CHR$ code out of range")),
        }
    }

    fn hex(args: &[Val]) -> Result<Val> {
        let n = args[0].number()?.round();
        if n < i64::min_value() as f64 || n > i64::max_value() as f64 {
            return Err(error!("Numeric overflow"));
        }
        Ok(Val::String(format!("{:X}", n as i64).into()))
    }

    fn instr(args: &[Val]) -> Result<Val> {
        let haystack = args[0].string()?;
        let needle = args[1].string()?;
        let start = match args.get(2) {
            Some(v) => v.index()?.max(1),
            None => 1,
        };
        if start > haystack.chars().count() {
            return Ok(Val::Number(0.0));
        }
        let tail: String = haystack.chars().skip(start - 1).collect();
        match tail.find(&*needle) {
            Some(at) => {
                let chars_before = tail[..at].chars().count();
                Ok(Val::Number((start + chars_before) as f64))
            }
            None => Ok(Val::Number(0.0)),
        }
    }

    fn left(args: &[Val]) -> Result<Val> {
        let s = args[0].string()?;
        let n = args[1].index()?;
        let taken: String = s.chars().take(n).collect();
        Ok(Val::String(taken.into()))
    }

    fn len(args: &[Val]) -> Result<Val> {
        Ok(Val::Number(args[0].string()?.chars().count() as f64))
    }

    fn log(args: &[Val]) -> Result<Val> {
        let n = args[0].number()?;
        if n <= 0.0 {
            return Err(error!("LOG of a non-positive number"));
        }
        Ok(Val::Number(n.ln()))
    }

    fn mid(args: &[Val]) -> Result<Val> {
        let s = args[0].string()?;
        let start = args[1].index()?.max(1);
        let taken: String = match args.get(2) {
            Some(v) => s.chars().skip(start - 1).take(v.index()?).collect(),
            None => s.chars().skip(start - 1).collect(),
        };
        Ok(Val::String(taken.into()))
    }

    fn right(args: &[Val]) -> Result<Val> {
        let s = args[0].string()?;
        let n = args[1].index()?;
        let total = s.chars().count();
        let taken: String = s.chars().skip(total.saturating_sub(n)).collect();
        Ok(Val::String(taken.into()))
    }

    fn rnd(args: &[Val]) -> Result<Val> {
        let scale = match args.get(0) {
            Some(v) => v.number()?,
            None => 1.0,
        };
        let r: f64 = rand::thread_rng().gen();
        if scale <= 1.0 {
            Ok(Val::Number(r))
        } else {
            Ok(Val::Number((r * scale.trunc()).floor() + 1.0))
        }
    }

    fn round(args: &[Val]) -> Result<Val> {
        let n = args[0].number()?;
        match args.get(1) {
            Some(v) => {
                let scale = 10f64.powi(v.index()? as i32);
                Ok(Val::Number((n * scale).round() / scale))
            }
            None => Ok(Val::Number(n.round())),
        }
    }

    fn space(args: &[Val]) -> Result<Val> {
        Ok(Val::String(" ".repeat(args[0].index()?).into()))
    }

    fn sqr(args: &[Val]) -> Result<Val> {
        let n = args[0].number()?;
        if n < 0.0 {
            return Err(error!("SQR of a negative number"));
        }
        Ok(Val::Number(n.sqrt()))
    }

    fn str(args: &[Val]) -> Result<Val> {
        let n = args[0].number()?;
        let text = val::format_number(n, 11);
        Ok(Val::String(text.trim_end().into()))
    }

    fn tab(args: &[Val], column: usize) -> Result<Val> {
        let target = args[0].index()?;
        let spaces = target.saturating_sub(column + 1);
        Ok(Val::String(" ".repeat(spaces).into()))
    }

    fn val(args: &[Val]) -> Result<Val> {
        let s = args[0].string()?;
        let text = s.trim();
        let mut end = 0;
        let mut prev = ' ';
        for (i, ch) in text.char_indices() {
            let ok = ch.is_ascii_digit()
                || ch == '.'
                || ch == 'E'
                || ch == 'e'
                || ((ch == '+' || ch == '-') && (i == 0 || prev == 'E' || prev == 'e'));
            if !ok {
                break;
            }
            end = i + ch.len_utf8();
            prev = ch;
        }
        let mut slice = &text[..end];
        loop {
            match slice.parse::<f64>() {
                Ok(n) => return Ok(Val::Number(n)),
                Err(_) if !slice.is_empty() => slice = &slice[..slice.len() - 1],
                Err(_) => return Ok(Val::Number(0.0)),
            }
        }
    }
}

fn numeric(args: &[Val], f: fn(f64) -> f64) -> Result<Val> {
    Ok(Val::Number(f(args[0].number()?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::ALL_FUNCTIONS;

    #[test]
    fn test_every_builtin_has_arity() {
        for name in ALL_FUNCTIONS {
            assert!(Function::arity(name).is_some(), "{}", name);
        }
        assert!(Function::arity("NOPE").is_none());
    }

    #[test]
    fn test_domain_errors() {
        assert!(Function::eval("LOG", &[Val::Number(0.0)], 0).is_err());
        assert!(Function::eval("LOG", &[Val::Number(-1.0)], 0).is_err());
        assert!(Function::eval("SQR", &[Val::Number(-4.0)], 0).is_err());
    }

    #[test]
    fn test_int_vs_fix() {
        assert_eq!(
            Function::eval("INT", &[Val::Number(-2.5)], 0).unwrap(),
            Val::Number(-3.0)
        );
        assert_eq!(
            Function::eval("FIX", &[Val::Number(-2.5)], 0).unwrap(),
            Val::Number(-2.0)
        );
    }

    #[test]
    fn test_string_slicing() {
        let s = Val::String("HELLO".into());
        assert_eq!(
            Function::eval("LEFT$", &[s.clone(), Val::Number(2.0)], 0).unwrap(),
            Val::String("HE".into())
        );
        assert_eq!(
            Function::eval("RIGHT$", &[s.clone(), Val::Number(2.0)], 0).unwrap(),
            Val::String("LO".into())
        );
        assert_eq!(
            Function::eval("MID$", &[s.clone(), Val::Number(2.0), Val::Number(3.0)], 0).unwrap(),
            Val::String("ELL".into())
        );
        assert_eq!(
            Function::eval("MID$", &[s, Val::Number(99.0)], 0).unwrap(),
            Val::String("".into())
        );
    }

    #[test]
    fn test_instr() {
        let hay = Val::String("ABCABC".into());
        let needle = Val::String("BC".into());
        assert_eq!(
            Function::eval("INSTR", &[hay.clone(), needle.clone()], 0).unwrap(),
            Val::Number(2.0)
        );
        assert_eq!(
            Function::eval("INSTR", &[hay.clone(), needle, Val::Number(3.0)], 0).unwrap(),
            Val::Number(5.0)
        );
        assert_eq!(
            Function::eval("INSTR", &[hay, Val::String("XYZ".into())], 0).unwrap(),
            Val::Number(0.0)
        );
    }

    #[test]
    fn test_instr_counts_chars_not_bytes() {
        let hay = Val::String("ÀBC".into());
        assert_eq!(
            Function::eval(
                "INSTR",
                &[hay.clone(), Val::String("B".into()), Val::Number(2.0)],
                0
            )
            .unwrap(),
            Val::Number(2.0)
        );
        assert_eq!(
            Function::eval("INSTR", &[hay, Val::String("C".into())], 0).unwrap(),
            Val::Number(3.0)
        );
    }

    #[test]
    fn test_val_parses_prefix() {
        assert_eq!(
            Function::eval("VAL", &[Val::String("  12.5AB".into())], 0).unwrap(),
            Val::Number(12.5)
        );
        assert_eq!(
            Function::eval("VAL", &[Val::String("XYZ".into())], 0).unwrap(),
            Val::Number(0.0)
        );
        assert_eq!(
            Function::eval("VAL", &[Val::String("-3E2".into())], 0).unwrap(),
            Val::Number(-300.0)
        );
    }

    #[test]
    fn test_str_and_chr() {
        assert_eq!(
            Function::eval("STR$", &[Val::Number(3.14)], 0).unwrap(),
            Val::String(" 3.14".into())
        );
        assert_eq!(
            Function::eval("CHR$", &[Val::Number(65.0)], 0).unwrap(),
            Val::String("A".into())
        );
        assert_eq!(
            Function::eval("ASC", &[Val::String("A".into())], 0).unwrap(),
            Val::Number(65.0)
        );
    }

    #[test]
    fn test_tab() {
        assert_eq!(
            Function::eval("TAB", &[Val::Number(5.0)], 0).unwrap(),
            Val::String("    ".into())
        );
        assert_eq!(
            Function::eval("TAB", &[Val::Number(3.0)], 4).unwrap(),
            Val::String("".into())
        );
    }

    #[test]
    fn test_rnd_range() {
        for _ in 0..100 {
            let r = Function::eval("RND", &[], 0).unwrap().number().unwrap();
            assert!(r >= 0.0 && r < 1.0);
            let d = Function::eval("RND", &[Val::Number(6.0)], 0)
                .unwrap()
                .number()
                .unwrap();
            assert!(d >= 1.0 && d <= 6.0);
        }
    }
}
