//! # token.rs
//!
//! Token model and operation metadata table.
//!
//! A [`Token`] is one lexical/semantic unit of an expression. Operators and
//! functions carry a kind tag whose metadata (display name, precedence,
//! numeric function and derivative template) is generated at compile time by
//! the `binary_operators!` and `functions!` macros below, so the whole table is
//! immutable and can be shared freely between threads.
//!
//! Name lookup for the tokenizer goes through [`lookup`], backed by a static
//! `phf` map.

use num_complex::Complex;
use phf::Map;
use phf_macros::phf_map;

/// Precedence of every unary function except negation.
pub const FUNCTION_PRECEDENCE: u8 = 3;

/// Precedence of brackets. Brackets are never popped by precedence, the value
/// only keeps the table total.
pub const BRACKET_PRECEDENCE: u8 = 4;

/// Direction of a bracket token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bracket {
    Open,
    Close,
}

impl std::fmt::Display for Bracket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "("),
            Self::Close => write!(f, ")"),
        }
    }
}

#[doc(hidden)]
/// Internal macro to define all binary operators.
///
/// It centralizes the enum variants, symbol, precedence and apply logic.
macro_rules! binary_operators {
    ($($name:ident => {
        symbol: $symbol:expr,
        precedence: $prec:expr,
        apply: $apply:expr
    }),* $(,)?) => {
        /// Represents a binary operator in a mathematical expression.
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum BinaryOperatorKind {
            $($name),*
        }

        impl BinaryOperatorKind {
            /// Returns the operator precedence (higher binds tighter).
            pub fn precedence(&self) -> u8 {
                match self {
                    $(Self::$name => $prec,)*
                }
            }

            /// Returns the operator symbol.
            pub fn symbol(&self) -> &'static str {
                match self {
                    $(Self::$name => $symbol,)*
                }
            }

            /// Applies the operator to two complex numbers.
            pub fn apply(&self, l: Complex<f64>, r: Complex<f64>) -> Complex<f64> {
                match self {
                    $(Self::$name => $apply(l, r),)*
                }
            }

            /// Returns a list of all supported binary operator symbols.
            pub fn names() -> Vec<&'static str> {
                vec![$($symbol),*]
            }
        }

        impl std::fmt::Display for BinaryOperatorKind {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.symbol())
            }
        }
    };
}

binary_operators! {
    Add => { symbol: "+", precedence: 0, apply: |l: Complex<f64>, r: Complex<f64>| l + r },
    Sub => { symbol: "-", precedence: 0, apply: |l: Complex<f64>, r: Complex<f64>| l - r },
    Mul => { symbol: "*", precedence: 1, apply: |l: Complex<f64>, r: Complex<f64>| l * r },
    Div => { symbol: "/", precedence: 1, apply: |l: Complex<f64>, r: Complex<f64>| l / r },
    Pow => { symbol: "^", precedence: 2, apply: |l: Complex<f64>, r: Complex<f64>| l.powc(r) },
}

/// One element of a derivative template.
///
/// A template is a postfix sequence describing `f'(A)`; every
/// [`Slot::Argument`] is replaced by the argument subexpression `A`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Slot {
    Argument,
    Token(Token),
}

const fn num(re: f64) -> Slot {
    Slot::Token(Token::Constant(Complex::new(re, 0.0)))
}

const fn func(kind: FunctionKind) -> Slot {
    Slot::Token(Token::Function(kind))
}

const fn bin(kind: BinaryOperatorKind) -> Slot {
    Slot::Token(Token::BinaryOperator(kind))
}

const A: Slot = Slot::Argument;

#[doc(hidden)]
/// Internal macro for defining the unary functions.
///
/// Each function declares:
///   - The enum variant name
///   - Its canonical name, used both for lookup and display
///   - Its precedence
///   - How it is applied to its argument
///   - Its derivative template, or `None` when it has none
macro_rules! functions {
    ($( $variant:ident => {
        name: $name:expr,
        precedence: $prec:expr,
        apply: $apply:expr,
        derivative: $deriv:expr
    }, )*) => {
        /// Represents a unary function applied to one complex number.
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum FunctionKind {
            $( $variant, )*
        }

        impl FunctionKind {
            /// Returns the canonical name of the function.
            pub fn name(&self) -> &'static str {
                match self {
                    $( Self::$variant => $name, )*
                }
            }

            /// Returns the function precedence.
            pub fn precedence(&self) -> u8 {
                match self {
                    $( Self::$variant => $prec, )*
                }
            }

            /// Applies the function to a complex number.
            pub fn apply(&self, x: Complex<f64>) -> Complex<f64> {
                match self {
                    $( Self::$variant => $apply(x), )*
                }
            }

            /// Returns the postfix template of the function's own derivative.
            pub fn derivative(&self) -> Option<&'static [Slot]> {
                match self {
                    $( Self::$variant => {
                        const TEMPLATE: Option<&[Slot]> = $deriv;
                        TEMPLATE
                    }, )*
                }
            }

            /// Returns a list of all supported function names.
            pub fn names() -> Vec<&'static str> {
                vec![$($name),*]
            }
        }

        impl std::fmt::Display for FunctionKind {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.name())
            }
        }
    };
}

use BinaryOperatorKind::{Add, Div, Mul, Pow, Sub};

functions! {
    Neg     => { name: "neg",   precedence: 1, apply: |x: Complex<f64>| -x,
                 derivative: Some(&[num(-1.0)]) },
    Re      => { name: "re",    precedence: FUNCTION_PRECEDENCE, apply: |x: Complex<f64>| Complex::from(x.re),
                 derivative: None },
    Im      => { name: "im",    precedence: FUNCTION_PRECEDENCE, apply: |x: Complex<f64>| Complex::from(x.im),
                 derivative: None },
    Abs     => { name: "abs",   precedence: FUNCTION_PRECEDENCE, apply: |x: Complex<f64>| Complex::from(x.norm()),
                 derivative: None },
    Arg     => { name: "arg",   precedence: FUNCTION_PRECEDENCE, apply: |x: Complex<f64>| Complex::from(x.arg()),
                 derivative: None },
    Conj    => { name: "conj",  precedence: FUNCTION_PRECEDENCE, apply: |x: Complex<f64>| x.conj(),
                 derivative: None },
    Exp     => { name: "exp",   precedence: FUNCTION_PRECEDENCE, apply: |x: Complex<f64>| x.exp(),
                 derivative: Some(&[A, func(FunctionKind::Exp)]) },
    Log     => { name: "log",   precedence: FUNCTION_PRECEDENCE, apply: |x: Complex<f64>| x.ln(),
                 derivative: Some(&[num(1.0), A, bin(Div)]) },
    Cos     => { name: "cos",   precedence: FUNCTION_PRECEDENCE, apply: |x: Complex<f64>| x.cos(),
                 derivative: Some(&[A, func(FunctionKind::Sin), func(FunctionKind::Neg)]) },
    Sin     => { name: "sin",   precedence: FUNCTION_PRECEDENCE, apply: |x: Complex<f64>| x.sin(),
                 derivative: Some(&[A, func(FunctionKind::Cos)]) },
    Tan     => { name: "tan",   precedence: FUNCTION_PRECEDENCE, apply: |x: Complex<f64>| x.tan(),
                 derivative: Some(&[num(1.0), A, func(FunctionKind::Cos), num(2.0), bin(Pow), bin(Div)]) },
    Sec     => { name: "sec",   precedence: FUNCTION_PRECEDENCE, apply: |x: Complex<f64>| Complex::<f64>::ONE / x.cos(),
                 derivative: Some(&[A, func(FunctionKind::Sec), A, func(FunctionKind::Tan), bin(Mul)]) },
    Csc     => { name: "csc",   precedence: FUNCTION_PRECEDENCE, apply: |x: Complex<f64>| Complex::<f64>::ONE / x.sin(),
                 derivative: Some(&[A, func(FunctionKind::Csc), A, func(FunctionKind::Cot), bin(Mul),
                                    func(FunctionKind::Neg)]) },
    Cot     => { name: "cot",   precedence: FUNCTION_PRECEDENCE, apply: |x: Complex<f64>| Complex::<f64>::ONE / x.tan(),
                 derivative: Some(&[num(1.0), A, func(FunctionKind::Sin), num(2.0), bin(Pow), bin(Div),
                                    func(FunctionKind::Neg)]) },
    Acos    => { name: "acos",  precedence: FUNCTION_PRECEDENCE, apply: |x: Complex<f64>| x.acos(),
                 derivative: Some(&[num(1.0), num(1.0), A, num(2.0), bin(Pow), bin(Sub), num(0.5), bin(Pow),
                                    bin(Div), func(FunctionKind::Neg)]) },
    Asin    => { name: "asin",  precedence: FUNCTION_PRECEDENCE, apply: |x: Complex<f64>| x.asin(),
                 derivative: Some(&[num(1.0), num(1.0), A, num(2.0), bin(Pow), bin(Sub), num(0.5), bin(Pow),
                                    bin(Div)]) },
    Atan    => { name: "atan",  precedence: FUNCTION_PRECEDENCE, apply: |x: Complex<f64>| x.atan(),
                 derivative: Some(&[num(1.0), num(1.0), A, num(2.0), bin(Pow), bin(Add), bin(Div)]) },
    Cosh    => { name: "cosh",  precedence: FUNCTION_PRECEDENCE, apply: |x: Complex<f64>| x.cosh(),
                 derivative: Some(&[A, func(FunctionKind::Sinh)]) },
    Sinh    => { name: "sinh",  precedence: FUNCTION_PRECEDENCE, apply: |x: Complex<f64>| x.sinh(),
                 derivative: Some(&[A, func(FunctionKind::Cosh)]) },
    Tanh    => { name: "tanh",  precedence: FUNCTION_PRECEDENCE, apply: |x: Complex<f64>| x.tanh(),
                 derivative: Some(&[num(1.0), A, func(FunctionKind::Cosh), num(2.0), bin(Pow), bin(Div)]) },
    Acosh   => { name: "acosh", precedence: FUNCTION_PRECEDENCE, apply: |x: Complex<f64>| x.acosh(),
                 derivative: Some(&[num(1.0), A, num(1.0), bin(Sub), num(0.5), bin(Pow),
                                    A, num(1.0), bin(Add), num(0.5), bin(Pow), bin(Mul), bin(Div)]) },
    Asinh   => { name: "asinh", precedence: FUNCTION_PRECEDENCE, apply: |x: Complex<f64>| x.asinh(),
                 derivative: Some(&[num(1.0), A, num(2.0), bin(Pow), num(1.0), bin(Add), num(0.5), bin(Pow),
                                    bin(Div)]) },
    Atanh   => { name: "atanh", precedence: FUNCTION_PRECEDENCE, apply: |x: Complex<f64>| x.atanh(),
                 derivative: Some(&[num(1.0), num(1.0), A, num(2.0), bin(Pow), bin(Sub), bin(Div)]) },
    // Markers are expanded symbolically, never applied numerically.
    Deriv   => { name: "deriv", precedence: FUNCTION_PRECEDENCE, apply: |x: Complex<f64>| x,
                 derivative: None },
}

/// An operation as found by name lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Bracket(Bracket),
    Binary(BinaryOperatorKind),
    Function(FunctionKind),
}

impl Operation {
    /// Returns the token produced by this operation.
    pub fn token(self) -> Token {
        match self {
            Self::Bracket(bracket) => Token::Bracket(bracket),
            Self::Binary(kind) => Token::BinaryOperator(kind),
            Self::Function(kind) => Token::Function(kind),
        }
    }
}

/// Map of operation names and symbols to their operation.
static OPERATIONS: Map<&'static str, Operation> = phf_map! {
    "(" => Operation::Bracket(Bracket::Open),
    "{" => Operation::Bracket(Bracket::Open),
    ")" => Operation::Bracket(Bracket::Close),
    "}" => Operation::Bracket(Bracket::Close),
    "+" => Operation::Binary(BinaryOperatorKind::Add),
    "-" => Operation::Binary(BinaryOperatorKind::Sub),
    "*" => Operation::Binary(BinaryOperatorKind::Mul),
    "/" => Operation::Binary(BinaryOperatorKind::Div),
    "^" => Operation::Binary(BinaryOperatorKind::Pow),
    "neg" => Operation::Function(FunctionKind::Neg),
    "re" => Operation::Function(FunctionKind::Re),
    "im" => Operation::Function(FunctionKind::Im),
    "abs" => Operation::Function(FunctionKind::Abs),
    "arg" => Operation::Function(FunctionKind::Arg),
    "conj" => Operation::Function(FunctionKind::Conj),
    "exp" => Operation::Function(FunctionKind::Exp),
    "log" => Operation::Function(FunctionKind::Log),
    "cos" => Operation::Function(FunctionKind::Cos),
    "sin" => Operation::Function(FunctionKind::Sin),
    "tan" => Operation::Function(FunctionKind::Tan),
    "sec" => Operation::Function(FunctionKind::Sec),
    "csc" => Operation::Function(FunctionKind::Csc),
    "cot" => Operation::Function(FunctionKind::Cot),
    "acos" => Operation::Function(FunctionKind::Acos),
    "asin" => Operation::Function(FunctionKind::Asin),
    "atan" => Operation::Function(FunctionKind::Atan),
    "cosh" => Operation::Function(FunctionKind::Cosh),
    "sinh" => Operation::Function(FunctionKind::Sinh),
    "tanh" => Operation::Function(FunctionKind::Tanh),
    "acosh" => Operation::Function(FunctionKind::Acosh),
    "asinh" => Operation::Function(FunctionKind::Asinh),
    "atanh" => Operation::Function(FunctionKind::Atanh),
    "deriv" => Operation::Function(FunctionKind::Deriv),
};

/// Looks up an operation by its name or symbol.
pub fn lookup(name: &str) -> Option<Operation> {
    OPERATIONS.get(name).copied()
}

/// One lexical/semantic unit of an expression.
///
/// Only `Constant` carries a payload; every other variant is fully described
/// by its tag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token {
    /// The variable `z`.
    Variable,

    /// A complex constant.
    Constant(Complex<f64>),

    /// Binary operator (`+`, `-`, `*`, `/`, `^`).
    BinaryOperator(BinaryOperatorKind),

    /// Unary function, including negation and the derivative marker.
    Function(FunctionKind),

    /// Opening or closing bracket. Only meaningful in infix sequences.
    Bracket(Bracket),
}

impl Token {
    /// Returns a constant token holding a real value.
    pub fn real(re: f64) -> Self {
        Self::Constant(Complex::new(re, 0.0))
    }

    /// Returns the precedence of operators, functions and brackets.
    pub fn precedence(&self) -> Option<u8> {
        match self {
            Self::BinaryOperator(kind) => Some(kind.precedence()),
            Self::Function(kind) => Some(kind.precedence()),
            Self::Bracket(_) => Some(BRACKET_PRECEDENCE),
            Self::Variable | Self::Constant(_) => None,
        }
    }

    /// Returns how many operands the token consumes in postfix form.
    ///
    /// Brackets have no arity and are invalid in postfix sequences.
    pub fn arity(&self) -> Option<usize> {
        match self {
            Self::Variable | Self::Constant(_) => Some(0),
            Self::Function(_) => Some(1),
            Self::BinaryOperator(_) => Some(2),
            Self::Bracket(_) => None,
        }
    }

    /// Returns the constant value if this is a constant token.
    pub fn as_constant(&self) -> Option<Complex<f64>> {
        match self {
            Self::Constant(val) => Some(*val),
            _ => None,
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Variable => write!(f, "z"),
            Self::Constant(val) if val.im == 0.0 => write!(f, "{}", val.re),
            Self::Constant(val) => write!(f, "[{},{}]", val.re, val.im),
            Self::BinaryOperator(kind) => write!(f, "{}", kind),
            Self::Function(kind) => write!(f, "{}", kind),
            Self::Bracket(bracket) => write!(f, "{}", bracket),
        }
    }
}

#[cfg(test)]
mod binary_operator_kind_tests {
    use super::*;

    #[test]
    fn test_binary_operator_kind_precedence() {
        assert_eq!(BinaryOperatorKind::Add.precedence(), 0);
        assert_eq!(BinaryOperatorKind::Sub.precedence(), 0);
        assert_eq!(BinaryOperatorKind::Mul.precedence(), 1);
        assert_eq!(BinaryOperatorKind::Div.precedence(), 1);
        assert_eq!(BinaryOperatorKind::Pow.precedence(), 2);
    }

    #[test]
    fn test_binary_operator_kind_apply() {
        let l = Complex::new(2.0, 1.0);
        let r = Complex::new(-1.0, 3.0);
        assert_eq!(BinaryOperatorKind::Add.apply(l, r), l + r);
        assert_eq!(BinaryOperatorKind::Sub.apply(l, r), l - r);
        assert_eq!(BinaryOperatorKind::Mul.apply(l, r), l * r);
        assert_eq!(BinaryOperatorKind::Div.apply(l, r), l / r);
        assert_eq!(BinaryOperatorKind::Pow.apply(l, r), l.powc(r));
    }

    #[test]
    fn test_binary_operator_kind_names() {
        assert_eq!(BinaryOperatorKind::names(), vec!["+", "-", "*", "/", "^"]);
    }
}
