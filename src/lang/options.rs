use super::Error;

/// How strict the dialect is about variable names.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VarNaming {
    /// A single letter.
    Letter,
    /// A letter plus an optional digit.
    LetterDigit,
    /// Letters and digits in any mix.
    Any,
}

/// Dialect configuration. These are data, not logic: the parser and
/// runtime consult them but never special-case a dialect by name.
#[derive(Debug, Clone)]
pub struct BasicOptions {
    pub dialect_name: &'static str,
    /// Fold the whole line, string literals included, to uppercase.
    /// Identifiers are folded regardless.
    pub uppercase_only: bool,
    pub var_naming: VarNaming,
    /// When set, `A` and `A()` refer to the same name and may not coexist.
    pub shared_array_namespace: bool,
    /// Lowest subscript, 0 or 1. `OPTION BASE` rewrites this.
    pub default_array_base: usize,
    /// Elements per dimension when an array is used without DIM.
    pub default_array_size: usize,
    pub max_dimensions: usize,
    /// Allow `+` to concatenate strings.
    pub string_concat: bool,
    /// Implicit string/number conversion on assignment instead of a
    /// type mismatch error.
    pub type_convert: bool,
    pub max_def_args: usize,
    /// When set, subscripting an undeclared array is an error instead
    /// of an automatic default-sized DIM.
    pub dim_required: bool,
    pub tick_comments: bool,
    /// `None` means unrestricted.
    pub valid_keywords: Option<&'static [&'static str]>,
    pub valid_functions: Option<&'static [&'static str]>,
    pub valid_operators: Option<&'static [&'static str]>,
    pub print_zone_width: usize,
    /// Widest numeric representation PRINT emits before shedding
    /// significant digits.
    pub print_precision: usize,
    pub check_overflow: bool,
    /// Reading an unset variable yields 0 or "" instead of an error.
    pub default_values: bool,
    /// Allow `NEXT I,J`.
    pub multiple_next_vars: bool,
}

/// Every built-in function the engine implements, for whitelist
/// checks. The runtime's function table must stay in step with this.
pub const ALL_FUNCTIONS: &[&str] = &[
    "ABS", "ASC", "ATN", "CHR$", "COS", "EXP", "FIX", "HEX$", "INSTR", "INT", "LEFT$", "LEN",
    "LOG", "MID$", "RIGHT$", "RND", "ROUND", "SGN", "SIN", "SPACE$", "SQR", "STR$", "TAB", "TAN",
    "VAL",
];

const ECMA55_KEYWORDS: &[&str] = &[
    "BASE", "DATA", "DEF", "DIM", "END", "FOR", "GO", "GOSUB", "GOTO", "IF", "INPUT", "LET",
    "NEXT", "ON", "OPTION", "PRINT", "READ", "REM", "RESTORE", "RETURN", "STEP", "STOP", "SUB",
    "THEN", "TO",
];

const ECMA55_FUNCTIONS: &[&str] = &[
    "ABS", "ATN", "COS", "EXP", "INT", "LOG", "RND", "SGN", "SIN", "SQR", "TAB", "TAN",
];

const ECMA55_OPERATORS: &[&str] = &[
    "^", "*", "/", "+", "-", "=", "<>", "<", ">", "<=", ">=",
];

impl BasicOptions {
    /// The strict ECMA-55 "minimal BASIC" profile.
    pub fn ecma55() -> BasicOptions {
        BasicOptions {
            dialect_name: "ECMA55",
            uppercase_only: true,
            var_naming: VarNaming::LetterDigit,
            shared_array_namespace: false,
            default_array_base: 0,
            default_array_size: 11,
            max_dimensions: 2,
            string_concat: false,
            type_convert: false,
            max_def_args: 1,
            dim_required: false,
            tick_comments: false,
            valid_keywords: Some(ECMA55_KEYWORDS),
            valid_functions: Some(ECMA55_FUNCTIONS),
            valid_operators: Some(ECMA55_OPERATORS),
            print_zone_width: 15,
            print_precision: 11,
            check_overflow: true,
            default_values: false,
            multiple_next_vars: false,
        }
    }

    /// The permissive Altair-style profile: every keyword, function,
    /// and operator the engine knows is allowed.
    pub fn altair() -> BasicOptions {
        BasicOptions {
            dialect_name: "ALTAIR",
            uppercase_only: false,
            var_naming: VarNaming::Any,
            shared_array_namespace: false,
            default_array_base: 0,
            default_array_size: 11,
            max_dimensions: 2,
            string_concat: true,
            type_convert: false,
            max_def_args: 8,
            dim_required: false,
            tick_comments: true,
            valid_keywords: None,
            valid_functions: None,
            valid_operators: None,
            print_zone_width: 15,
            print_precision: 11,
            check_overflow: true,
            default_values: true,
            multiple_next_vars: true,
        }
    }

    pub fn named(name: &str) -> Option<BasicOptions> {
        match name {
            "ECMA55" => Some(BasicOptions::ecma55()),
            "ALTAIR" => Some(BasicOptions::altair()),
            _ => None,
        }
    }

    /// Apply an `OPTION <name> <value>` directive in place.
    pub fn apply(&mut self, name: &str, value: &str) -> Result<(), Error> {
        match name {
            "BASE" => match value {
                "0" => {
                    self.default_array_base = 0;
                    Ok(())
                }
                "1" => {
                    self.default_array_base = 1;
                    Ok(())
                }
                _ => Err(error!("OPTION BASE must be 0 or 1")),
            },
            "DIALECT" => match BasicOptions::named(value) {
                Some(options) => {
                    *self = options;
                    Ok(())
                }
                None => Err(error!("Unknown dialect \"{}\"", value)),
            },
            _ => Err(error!("Unknown option \"{}\"", name)),
        }
    }

    pub fn is_known_function(name: &str) -> bool {
        ALL_FUNCTIONS.contains(&name)
    }

    pub fn keyword_allowed(&self, word: &str) -> bool {
        match self.valid_keywords {
            Some(list) => list.contains(&word),
            None => true,
        }
    }

    pub fn function_allowed(&self, name: &str) -> bool {
        match self.valid_functions {
            Some(list) => list.contains(&name),
            None => true,
        }
    }

    pub fn operator_allowed(&self, op: &str) -> bool {
        match self.valid_operators {
            Some(list) => list.contains(&op),
            None => true,
        }
    }
}

impl Default for BasicOptions {
    fn default() -> BasicOptions {
        BasicOptions::altair()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_base() {
        let mut options = BasicOptions::ecma55();
        assert!(options.apply("BASE", "1").is_ok());
        assert_eq!(options.default_array_base, 1);
        assert!(options.apply("BASE", "2").is_err());
    }

    #[test]
    fn test_option_dialect() {
        let mut options = BasicOptions::ecma55();
        assert!(options.apply("DIALECT", "ALTAIR").is_ok());
        assert_eq!(options.dialect_name, "ALTAIR");
        assert!(options.apply("DIALECT", "SINCLAIR").is_err());
    }

    #[test]
    fn test_whitelists() {
        let options = BasicOptions::ecma55();
        assert!(options.keyword_allowed("GOTO"));
        assert!(!options.keyword_allowed("WHILE"));
        assert!(!options.function_allowed("HEX$"));
        assert!(!options.operator_allowed("\\"));
        let options = BasicOptions::altair();
        assert!(options.operator_allowed("\\"));
    }
}
