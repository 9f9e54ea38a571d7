use crate::error;
use crate::lang::Error;
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

/// A runtime value cell. Variables, array elements, and DATA literals
/// all hold one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum Val {
    Number(f64),
    String(Rc<str>),
}

impl Val {
    pub fn number(&self) -> Result<f64> {
        match self {
            Val::Number(n) => Ok(*n),
            Val::String(_) => Err(error!("Type mismatch, expected a number")),
        }
    }

    pub fn string(&self) -> Result<Rc<str>> {
        match self {
            Val::String(s) => Ok(s.clone()),
            Val::Number(_) => Err(error!("Type mismatch, expected a string")),
        }
    }

    /// Anything non-zero is true; strings never are.
    pub fn is_truthy(&self) -> Result<bool> {
        Ok(self.number()? != 0.0)
    }

    /// Subscripts and sizes round to the nearest integer.
    pub fn index(&self) -> Result<usize> {
        let n = self.number()?.round();
        if n < 0.0 || n > usize::max_value() as f64 {
            return Err(error!("Subscript out of range"));
        }
        Ok(n as usize)
    }
}

impl From<f64> for Val {
    fn from(n: f64) -> Val {
        Val::Number(n)
    }
}

impl From<&str> for Val {
    fn from(s: &str) -> Val {
        Val::String(s.into())
    }
}

/// The assignment coercion LET, READ, DEF parameter binding, and
/// resolved INPUT all share. `convert` is the dialect's implicit
/// string/number conversion switch.
pub fn coerce(value: Val, wants_string: bool, convert: bool) -> Result<Val> {
    match (wants_string, value) {
        (true, Val::String(s)) => Ok(Val::String(s)),
        (false, Val::Number(n)) => Ok(Val::Number(n)),
        (true, Val::Number(n)) => {
            if convert {
                Ok(Val::String(format_number(n, 11).trim_end().into()))
            } else {
                Err(error!("Type mismatch, expected a string"))
            }
        }
        (false, Val::String(s)) => {
            if convert {
                match s.trim().parse::<f64>() {
                    Ok(n) => Ok(Val::Number(n)),
                    Err(_) => Err(error!("Type mismatch, \"{}\" is not a number", s)),
                }
            } else {
                Err(error!("Type mismatch, expected a number"))
            }
        }
    }
}

/// Format a number for PRINT in the fixed-width columnar style:
/// default notation with an uppercase exponent marker, precision shed
/// one significant digit at a time until the text fits `max_len`, the
/// leading zero of "0." dropped, a leading space on non-negatives, and
/// a trailing space always.
pub fn format_number(n: f64, max_len: usize) -> String {
    let mut s = format!("{}", n);
    if s.len() > max_len {
        for digits in (1..=16).rev() {
            s = to_precision(n, digits);
            if s.len() <= max_len {
                break;
            }
        }
    }
    if let Some(rest) = s.strip_prefix("0.") {
        s = format!(".{}", rest);
    } else if let Some(rest) = s.strip_prefix("-0.") {
        s = format!("-.{}", rest);
    }
    if n >= 0.0 {
        format!(" {} ", s)
    } else {
        format!("{} ", s)
    }
}

/// Render with `digits` significant digits, using plain notation when
/// the exponent is small enough for it and E-notation otherwise.
fn to_precision(n: f64, digits: usize) -> String {
    let s = format!("{:.*E}", digits.saturating_sub(1), n);
    let exponent: i32 = match s.split('E').nth(1).and_then(|e| e.parse().ok()) {
        Some(e) => e,
        None => return s,
    };
    if exponent >= -4 && exponent < digits as i32 {
        let decimals = (digits as i32 - 1 - exponent).max(0) as usize;
        let fixed = format!("{:.*}", decimals, n);
        if fixed.contains('.') {
            return fixed.trim_end_matches('0').trim_end_matches('.').to_string();
        }
        return fixed;
    }
    // Trim trailing zeros from the mantissa of the E-form.
    match s.split_once('E') {
        Some((mantissa, exp)) if mantissa.contains('.') => {
            let mantissa = mantissa.trim_end_matches('0').trim_end_matches('.');
            format!("{}E{}", mantissa, exp)
        }
        _ => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_simple() {
        assert_eq!(format_number(3.14, 11), " 3.14 ");
        assert_eq!(format_number(-3.14, 11), "-3.14 ");
        assert_eq!(format_number(0.0, 11), " 0 ");
        assert_eq!(format_number(42.0, 11), " 42 ");
    }

    #[test]
    fn test_format_drops_leading_zero() {
        assert_eq!(format_number(0.5, 11), " .5 ");
        assert_eq!(format_number(-0.5, 11), "-.5 ");
    }

    #[test]
    fn test_format_sheds_precision() {
        let s = format_number(std::f64::consts::PI, 11);
        assert!(s.trim().len() <= 11, "{:?}", s);
        assert!(s.starts_with(' ') && s.ends_with(' '));
        let s = format_number(123456789012345.0, 11);
        assert!(s.trim().len() <= 11, "{:?}", s);
    }

    #[test]
    fn test_truthiness() {
        assert!(Val::Number(1.0).is_truthy().unwrap());
        assert!(!Val::Number(0.0).is_truthy().unwrap());
        assert!(Val::String("x".into()).is_truthy().is_err());
    }

    #[test]
    fn test_index_rounds() {
        assert_eq!(Val::Number(1.4).index().unwrap(), 1);
        assert_eq!(Val::Number(1.5).index().unwrap(), 2);
        assert!(Val::Number(-1.0).index().is_err());
    }
}
