//! # zexpr
//!
//! `zexpr` is a Rust library for parsing, evaluating and symbolically
//! differentiating mathematical expressions over **complex numbers** in a
//! single variable `z`.
//!
//! ## Overview
//! - Tokenize formula text such as `\sin(z)^2 + [1,2]*z` into an infix [`Expression`].
//! - Convert infix to postfix (Reverse Polish Notation) with the Shunting-yard algorithm.
//! - Evaluate postfix expressions at any complex point.
//! - Differentiate postfix expressions symbolically, producing new postfix expressions.
//! - Compile formulas into closures for repeated evaluation without re-parsing.
//!
//! Expressions are flat token sequences; the derivative engine works on index
//! ranges of the postfix sequence instead of building a tree.
//!
//! ## Input syntax
//! - `z` is the variable; `i`, `e` and `pi` are constants.
//! - Numbers have at most one decimal point; an `i` suffix makes them imaginary.
//! - `[re,im]` is a general complex constant.
//! - Functions are written `\name(...)`, e.g. `\exp`, `\log`, `\asinh`, `\conj`.
//! - `(`, `)`, `{`, `}` are brackets; `+ - * / ^` are binary operators.
//! - A `-` at the start or right after an opening bracket is negation.
//! - `\deriv(...)` stands for the derivative of its argument.
//!
//! ## Example
//! ```rust
//! use num_complex::Complex;
//! use zexpr::{differentiate, evaluate, parse_infix, to_postfix};
//!
//! let infix = parse_infix(r"\sin(z)").unwrap();
//! let rpn = to_postfix(&infix).unwrap();
//! assert_eq!(rpn.to_string(), "[z sin]");
//!
//! let derivative = differentiate(&rpn).unwrap();
//! assert_eq!(derivative.to_string(), "[z cos]");
//!
//! let value = evaluate(&derivative, Complex::new(0.0, 0.0)).unwrap();
//! assert_eq!(value, Complex::new(1.0, 0.0));
//! ```
//!
//! ## Example: Using the Builder
//! ```rust
//! use num_complex::Complex;
//! use zexpr::Builder;
//!
//! let f = Builder::new(r"z * \exp(z)")
//!     .compile_derivative()
//!     .expect("Failed to compile formula");
//! println!("f'(1) = {}", f(Complex::new(1.0, 0.0)).unwrap());
//! ```
//!
//! ## Example: Retrieving All Names
//! ```rust
//! use zexpr::token::{BinaryOperatorKind, FunctionKind};
//!
//! let binary_names: Vec<&'static str> = BinaryOperatorKind::names();
//! println!("Binary Operators: {:?}", binary_names);
//!
//! let function_names: Vec<&'static str> = FunctionKind::names();
//! println!("Functions: {:?}", function_names);
//! ```
//!
//! ## Logging
//! Pipeline stages emit `trace` and `debug` records through the [`log`] facade.
//! The library never installs a logger.
//!
//! ## License
//! Licensed under either **MIT** or **Apache-2.0** at your option.

pub mod builder;
pub mod derivative;
pub mod error;
pub mod evaluate;
pub mod expression;
pub mod lexer;
pub mod rpn;
pub mod token;

use num_complex::Complex;

pub use builder::Builder;
pub use error::{DifferentiationError, Error, EvaluationError, ParseError, SyntaxError};
pub use expression::Expression;
pub use token::Token;

/// Tokenizes formula text into an infix expression.
///
/// See [`lexer::tokenize`] for the recognized lexemes.
pub fn parse_infix(text: &str) -> Result<Expression, ParseError> {
    lexer::tokenize(text)
}

/// Converts an infix expression to postfix. Postfix input is returned unchanged.
pub fn to_postfix(expr: &Expression) -> Result<Expression, SyntaxError> {
    rpn::to_postfix(expr)
}

/// Evaluates a postfix expression at `z`.
pub fn evaluate(expr: &Expression, z: Complex<f64>) -> Result<Complex<f64>, EvaluationError> {
    evaluate::evaluate(expr, z)
}

/// Returns the symbolic derivative of a postfix expression.
pub fn differentiate(expr: &Expression) -> Result<Expression, DifferentiationError> {
    derivative::differentiate(expr)
}

/// Replaces every `\deriv(...)` marker in a postfix expression by the
/// derivative of its argument.
pub fn expand_derivatives(expr: &Expression) -> Result<Expression, DifferentiationError> {
    derivative::expand_derivatives(expr)
}
