use super::Val;
use crate::error;
use crate::lang::{BasicOptions, Error};
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

/// Evaluates the binary and unary operators. Holds the two dialect
/// switches the operators care about so compiled closures can capture
/// a copy instead of reaching back into the options.
#[derive(Debug, Clone, Copy)]
pub struct Operation {
    string_concat: bool,
    check_overflow: bool,
}

impl Operation {
    pub fn new(options: &BasicOptions) -> Operation {
        Operation {
            string_concat: options.string_concat,
            check_overflow: options.check_overflow,
        }
    }

    fn checked(&self, n: f64) -> Result<Val> {
        if self.check_overflow && !n.is_finite() {
            return Err(error!("Numeric overflow"));
        }
        Ok(Val::Number(n))
    }

    pub fn negate(&self, v: Val) -> Result<Val> {
        self.checked(-v.number()?)
    }

    pub fn lnot(&self, v: Val) -> Result<Val> {
        Ok(Val::Number(if v.number()? == 0.0 { 1.0 } else { 0.0 }))
    }

    pub fn power(&self, lhs: Val, rhs: Val) -> Result<Val> {
        let base = lhs.number()?;
        let exp = rhs.number()?;
        if base == 0.0 && exp < 0.0 {
            return Err(error!("Division by zero"));
        }
        let n = base.powf(exp);
        if n.is_nan() {
            return Err(error!("Numeric overflow"));
        }
        self.checked(n)
    }

    pub fn multiply(&self, lhs: Val, rhs: Val) -> Result<Val> {
        self.checked(lhs.number()? * rhs.number()?)
    }

    pub fn divide(&self, lhs: Val, rhs: Val) -> Result<Val> {
        let divisor = rhs.number()?;
        if divisor == 0.0 {
            return Err(error!("Division by zero"));
        }
        self.checked(lhs.number()? / divisor)
    }

    pub fn divide_int(&self, lhs: Val, rhs: Val) -> Result<Val> {
        let divisor = rhs.number()?.trunc();
        if divisor == 0.0 {
            return Err(error!("Division by zero"));
        }
        self.checked((lhs.number()?.trunc() / divisor).trunc())
    }

    pub fn modulo(&self, lhs: Val, rhs: Val) -> Result<Val> {
        let divisor = rhs.number()?.trunc();
        if divisor == 0.0 {
            return Err(error!("Division by zero"));
        }
        self.checked(lhs.number()?.trunc() % divisor)
    }

    pub fn add(&self, lhs: Val, rhs: Val) -> Result<Val> {
        match (&lhs, &rhs) {
            (Val::String(a), Val::String(b)) => {
                if !self.string_concat {
                    return Err(error!("This dialect does not concatenate strings with +"));
                }
                let joined: Rc<str> = format!("{}{}", a, b).into();
                Ok(Val::String(joined))
            }
            _ => self.checked(lhs.number()? + rhs.number()?),
        }
    }

    pub fn subtract(&self, lhs: Val, rhs: Val) -> Result<Val> {
        self.checked(lhs.number()? - rhs.number()?)
    }

    fn boolean(b: bool) -> Result<Val> {
        Ok(Val::Number(if b { 1.0 } else { 0.0 }))
    }

    pub fn eq(&self, lhs: Val, rhs: Val) -> Result<Val> {
        match (&lhs, &rhs) {
            (Val::String(a), Val::String(b)) => Self::boolean(a == b),
            _ => Self::boolean(lhs.number()? == rhs.number()?),
        }
    }

    pub fn ne(&self, lhs: Val, rhs: Val) -> Result<Val> {
        match (&lhs, &rhs) {
            (Val::String(a), Val::String(b)) => Self::boolean(a != b),
            _ => Self::boolean(lhs.number()? != rhs.number()?),
        }
    }

    pub fn lt(&self, lhs: Val, rhs: Val) -> Result<Val> {
        match (&lhs, &rhs) {
            (Val::String(a), Val::String(b)) => Self::boolean(a < b),
            _ => Self::boolean(lhs.number()? < rhs.number()?),
        }
    }

    pub fn le(&self, lhs: Val, rhs: Val) -> Result<Val> {
        match (&lhs, &rhs) {
            (Val::String(a), Val::String(b)) => Self::boolean(a <= b),
            _ => Self::boolean(lhs.number()? <= rhs.number()?),
        }
    }

    pub fn gt(&self, lhs: Val, rhs: Val) -> Result<Val> {
        match (&lhs, &rhs) {
            (Val::String(a), Val::String(b)) => Self::boolean(a > b),
            _ => Self::boolean(lhs.number()? > rhs.number()?),
        }
    }

    pub fn ge(&self, lhs: Val, rhs: Val) -> Result<Val> {
        match (&lhs, &rhs) {
            (Val::String(a), Val::String(b)) => Self::boolean(a >= b),
            _ => Self::boolean(lhs.number()? >= rhs.number()?),
        }
    }

    pub fn and(&self, lhs: Val, rhs: Val) -> Result<Val> {
        Self::boolean(lhs.number()? != 0.0 && rhs.number()? != 0.0)
    }

    pub fn or(&self, lhs: Val, rhs: Val) -> Result<Val> {
        Self::boolean(lhs.number()? != 0.0 || rhs.number()? != 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op() -> Operation {
        Operation::new(&BasicOptions::altair())
    }

    #[test]
    fn test_divide_by_zero() {
        assert!(op().divide(Val::Number(10.0), Val::Number(0.0)).is_err());
        assert!(op().modulo(Val::Number(10.0), Val::Number(0.0)).is_err());
        assert!(op().divide_int(Val::Number(10.0), Val::Number(0.0)).is_err());
    }

    #[test]
    fn test_power() {
        assert_eq!(
            op().power(Val::Number(2.0), Val::Number(10.0)).unwrap(),
            Val::Number(1024.0)
        );
        assert!(op().power(Val::Number(0.0), Val::Number(-1.0)).is_err());
        assert!(op().power(Val::Number(-8.0), Val::Number(0.5)).is_err());
    }

    #[test]
    fn test_concat_gated_by_dialect() {
        let lax = Operation::new(&BasicOptions::altair());
        let strict = Operation::new(&BasicOptions::ecma55());
        let a = Val::String("FOO".into());
        let b = Val::String("BAR".into());
        assert_eq!(
            lax.add(a.clone(), b.clone()).unwrap(),
            Val::String("FOOBAR".into())
        );
        assert!(strict.add(a, b).is_err());
    }

    #[test]
    fn test_overflow_checked() {
        let strict = Operation::new(&BasicOptions::ecma55());
        assert!(strict
            .multiply(Val::Number(1e308), Val::Number(1e308))
            .is_err());
    }

    #[test]
    fn test_logic() {
        assert_eq!(
            op().lnot(Val::Number(0.0)).unwrap(),
            Val::Number(1.0)
        );
        assert_eq!(
            op().and(Val::Number(2.0), Val::Number(3.0)).unwrap(),
            Val::Number(1.0)
        );
        assert_eq!(
            op().or(Val::Number(0.0), Val::Number(0.0)).unwrap(),
            Val::Number(0.0)
        );
    }

    #[test]
    fn test_string_compare() {
        let a = Val::String("ABC".into());
        let b = Val::String("ABD".into());
        assert_eq!(op().lt(a.clone(), b.clone()).unwrap(), Val::Number(1.0));
        assert_eq!(op().eq(a.clone(), a.clone()).unwrap(), Val::Number(1.0));
        assert!(op().lt(a, Val::Number(1.0)).is_err());
    }
}
