//! # builder.rs
//!
//! This module provides the [`Builder`], a one-stop pipeline from formula text
//! to postfix expressions, derivatives and reusable evaluation closures.

use num_complex::Complex;

use crate::derivative::{Differentiator, DEFAULT_MAX_DEPTH};
use crate::error::{Error, EvaluationError};
use crate::evaluate::evaluate;
use crate::expression::Expression;
use crate::lexer;
use crate::rpn;

/// Configures and runs the text → postfix → evaluate/differentiate pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Builder
{
    formula: String,
    max_depth: usize,
}

impl Builder
{
    /// Creates a new `Builder` for the given formula.
    ///
    /// The formula uses `z` as its only variable and `\name` for functions.
    ///
    /// # Examples
    /// ```rust
    /// use zexpr::Builder;
    /// use num_complex::Complex;
    ///
    /// let f = Builder::new(r"\sin(z) + 1").compile()
    ///     .expect(r"Failed to compile '\sin(z) + 1'");
    /// println!("sin(3) + 1 = {}", f(Complex::new(3.0, 0.0)).unwrap());
    /// ```
    pub fn new(formula: &str) -> Self
    {
        Self {
            formula: formula.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Sets the nesting depth bound used when differentiating.
    ///
    /// # Examples
    /// ```rust
    /// use zexpr::Builder;
    ///
    /// let builder = Builder::new(r"\exp(\sin(z))").with_max_depth(32);
    /// assert_eq!(builder.max_depth(), 32);
    /// ```
    pub fn with_max_depth(mut self, max_depth: usize) -> Self
    {
        self.max_depth = max_depth;
        self
    }

    /// Returns the formula text.
    pub fn formula(&self) -> &str
    {
        &self.formula
    }

    /// Returns the nesting depth bound used when differentiating.
    pub fn max_depth(&self) -> usize
    {
        self.max_depth
    }

    fn differentiator(&self) -> Differentiator
    {
        Differentiator::new().with_max_depth(self.max_depth)
    }

    /// Tokenizes the formula into an infix expression.
    pub fn parse(&self) -> Result<Expression, Error>
    {
        Ok(lexer::tokenize(&self.formula)?)
    }

    /// Tokenizes the formula and converts it to postfix.
    ///
    /// Derivative markers are kept as they are.
    pub fn postfix(&self) -> Result<Expression, Error>
    {
        Ok(rpn::to_postfix(&self.parse()?)?)
    }

    /// Returns the postfix form with every derivative marker expanded,
    /// ready for evaluation.
    pub fn expanded(&self) -> Result<Expression, Error>
    {
        Ok(self.differentiator().expand_derivatives(&self.postfix()?)?)
    }

    /// Returns the symbolic derivative of the formula in postfix form.
    pub fn derivative(&self) -> Result<Expression, Error>
    {
        Ok(self.differentiator().differentiate(&self.postfix()?)?)
    }

    /// Evaluates the formula once at `z`.
    pub fn evaluate(&self, z: Complex<f64>) -> Result<Complex<f64>, Error>
    {
        Ok(evaluate(&self.expanded()?, z)?)
    }

    /// Compiles the formula into a reusable closure.
    ///
    /// Parsing, conversion and marker expansion happen once here; the
    /// closure only runs the postfix stack machine.
    ///
    /// # Example
    /// ```rust
    /// use num_complex::Complex;
    /// use zexpr::Builder;
    ///
    /// let f = Builder::new(r"z^2 + \deriv(z^3)")
    ///     .compile()
    ///     .expect("Failed to compile formula");
    ///
    /// let result = f(Complex::new(2.0, 0.0)).unwrap();
    /// assert!((result.re - 16.0).abs() < 1.0e-9);
    /// ```
    pub fn compile(&self)
        -> Result<impl Fn(Complex<f64>) -> Result<Complex<f64>, EvaluationError> + Send + Sync + 'static, Error>
    {
        let expr = self.expanded()?;
        log::debug!("compiled {:?} into {}", self.formula, expr);
        Ok(move |z: Complex<f64>| evaluate(&expr, z))
    }

    /// Compiles the derivative of the formula into a reusable closure.
    pub fn compile_derivative(&self)
        -> Result<impl Fn(Complex<f64>) -> Result<Complex<f64>, EvaluationError> + Send + Sync + 'static, Error>
    {
        let expr = self.derivative()?;
        log::debug!("compiled derivative of {:?} into {}", self.formula, expr);
        Ok(move |z: Complex<f64>| evaluate(&expr, z))
    }
}
