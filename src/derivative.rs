//! # derivative.rs
//!
//! Symbolic differentiation of postfix expressions with respect to `z`.
//!
//! The engine never builds a tree. It recurses over index ranges of the
//! postfix token slice, splitting a binary operation into its operands with
//! [`subexpr_start`], and emits the derivative as a fresh postfix token list.
//! Pieces are glued together by the simplifying constructors ([`sum`],
//! [`difference`], [`product`], [`quotient`], [`power`], [`negation`]) so the
//! output stays free of additive zeros and multiplicative ones.
//!
//! `deriv` markers are expanded in place before the rules run, see
//! [`expand_derivatives`].

use std::ops::Range;

use num_complex::Complex;
use num_traits::{One, Zero};

use crate::error::DifferentiationError;
use crate::expression::{subexpr_start, ArityViolation, Expression};
use crate::token::{BinaryOperatorKind, FunctionKind, Slot, Token};

/// Default bound on the nesting depth the engine recurses into.
pub const DEFAULT_MAX_DEPTH: usize = 256;

fn constant_of(expr: &[Token]) -> Option<Complex<f64>> {
    match expr {
        [token] => token.as_constant(),
        _ => None,
    }
}

fn is_zero(expr: &[Token]) -> bool {
    constant_of(expr).is_some_and(|val| val.is_zero())
}

fn is_one(expr: &[Token]) -> bool {
    constant_of(expr).is_some_and(|val| val.is_one())
}

fn is_minus_one(expr: &[Token]) -> bool {
    constant_of(expr).is_some_and(|val| (-val).is_one())
}

fn zero() -> Vec<Token> {
    vec![Token::Constant(Complex::zero())]
}

fn one() -> Vec<Token> {
    vec![Token::Constant(Complex::one())]
}

/// Joins two operands with `oper`, folding the result if both are constants.
fn combine(mut l: Vec<Token>, r: Vec<Token>, oper: BinaryOperatorKind) -> Vec<Token> {
    if let (Some(a), Some(b)) = (constant_of(&l), constant_of(&r)) {
        return vec![Token::Constant(oper.apply(a, b))];
    }
    l.extend(r);
    l.push(Token::BinaryOperator(oper));
    l
}

// Every constructor below takes operands that are single well-formed postfix
// values and returns one.

/// Builds `l + r`.
pub fn sum(l: Vec<Token>, r: Vec<Token>) -> Vec<Token> {
    if is_zero(&l) {
        r
    } else if is_zero(&r) {
        l
    } else {
        combine(l, r, BinaryOperatorKind::Add)
    }
}

/// Builds `l - r`.
pub fn difference(l: Vec<Token>, r: Vec<Token>) -> Vec<Token> {
    if is_zero(&r) {
        l
    } else if is_zero(&l) {
        negation(r)
    } else {
        combine(l, r, BinaryOperatorKind::Sub)
    }
}

/// Builds `l * r`. A zero factor collapses the whole product.
pub fn product(l: Vec<Token>, r: Vec<Token>) -> Vec<Token> {
    if is_zero(&l) || is_zero(&r) {
        zero()
    } else if is_one(&l) {
        r
    } else if is_one(&r) {
        l
    } else if is_minus_one(&l) {
        negation(r)
    } else if is_minus_one(&r) {
        negation(l)
    } else {
        combine(l, r, BinaryOperatorKind::Mul)
    }
}

/// Builds `l / r`.
pub fn quotient(l: Vec<Token>, r: Vec<Token>) -> Vec<Token> {
    if is_zero(&l) {
        zero()
    } else if is_one(&r) {
        l
    } else {
        combine(l, r, BinaryOperatorKind::Div)
    }
}

/// Builds `base ^ exponent`.
pub fn power(base: Vec<Token>, exponent: Vec<Token>) -> Vec<Token> {
    if is_zero(&exponent) {
        one()
    } else if is_one(&exponent) {
        base
    } else {
        combine(base, exponent, BinaryOperatorKind::Pow)
    }
}

/// Builds `-x`. Double negations cancel.
pub fn negation(mut x: Vec<Token>) -> Vec<Token> {
    if let Some(val) = constant_of(&x) {
        return vec![Token::Constant(-val)];
    }
    if let Some(Token::Function(FunctionKind::Neg)) = x.last() {
        x.pop();
        return x;
    }
    x.push(Token::Function(FunctionKind::Neg));
    x
}

/// Builds `log(x)`, folding constants.
///
/// A zero constant folds to `-inf`. Callers rule out a zero base first, see
/// the `0^g` shortcut in [`Differentiator::derive_binary`].
fn natural_log(mut x: Vec<Token>) -> Vec<Token> {
    if let Some(val) = constant_of(&x) {
        return vec![Token::Constant(val.ln())];
    }
    x.push(Token::Function(FunctionKind::Log));
    x
}

/// Fills every argument slot of a derivative template with `argument`.
fn substitute(template: &[Slot], argument: &[Token]) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(template.len() + argument.len());
    for slot in template {
        match slot {
            Slot::Argument => tokens.extend_from_slice(argument),
            Slot::Token(token) => tokens.push(*token),
        }
    }
    tokens
}

/// Rejects infix input and sequences breaking the postfix arity invariant.
fn check(expr: &Expression) -> Result<(), DifferentiationError> {
    if !expr.is_postfix() {
        return Err(DifferentiationError::NotPostfix);
    }
    expr.validate().map_err(|violation| match violation {
        ArityViolation::Bracket { position } => DifferentiationError::UnrecognizedToken { position },
        ArityViolation::Underflow { position } => DifferentiationError::Malformed { position },
        ArityViolation::Leftover { .. } => DifferentiationError::Malformed { position: expr.len() },
    })
}

/// Differentiation engine with a configurable recursion bound.
///
/// The whole expression is at depth 0. A function argument or the right
/// operand of a binary operation is one level deeper than the range holding
/// it, while a left operand stays at its parent's level. Long left-associative
/// chains such as `z+z+...+z` therefore never hit the bound.
///
/// # Example
///
/// ```
/// use zexpr::derivative::Differentiator;
/// use zexpr::{parse_infix, to_postfix};
///
/// let rpn = to_postfix(&parse_infix(r"\sin(z)").unwrap()).unwrap();
/// let derivative = Differentiator::new().with_max_depth(16).differentiate(&rpn).unwrap();
/// assert_eq!(derivative.to_string(), "[z cos]");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Differentiator {
    max_depth: usize,
}

impl Default for Differentiator {
    fn default() -> Self {
        Self { max_depth: DEFAULT_MAX_DEPTH }
    }
}

impl Differentiator {
    /// Creates an engine bounded by [`DEFAULT_MAX_DEPTH`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the deepest operand range the engine will descend into.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Returns the configured depth bound.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Returns the derivative of a postfix expression as a new postfix expression.
    ///
    /// Derivative markers are expanded first.
    ///
    /// # Errors
    ///
    /// - [`DifferentiationError::NotPostfix`] for infix input.
    /// - [`DifferentiationError::Malformed`] if the arity invariant is broken.
    /// - [`DifferentiationError::UnrecognizedToken`] if the input holds a bracket.
    /// - [`DifferentiationError::DerivativeNotFound`] for a function without
    ///   a derivative template.
    /// - [`DifferentiationError::DepthLimitExceeded`] if the nesting is too deep.
    pub fn differentiate(&self, expr: &Expression) -> Result<Expression, DifferentiationError> {
        let expanded = self.expand_derivatives(expr)?;
        let tokens = expanded.tokens();
        let derivative = self.derive(tokens, 0..tokens.len(), 0)?;
        log::debug!("differentiated {} tokens into {} tokens", tokens.len(), derivative.len());
        Ok(Expression::from_postfix(derivative))
    }

    /// Replaces every `deriv` marker and its argument by the argument's derivative.
    ///
    /// Markers are expanded left to right into an output buffer, so an inner
    /// marker is always expanded before the marker enclosing it.
    ///
    /// # Errors
    ///
    /// Same as [`Differentiator::differentiate`].
    pub fn expand_derivatives(&self, expr: &Expression) -> Result<Expression, DifferentiationError> {
        check(expr)?;

        let mut expanded: Vec<Token> = Vec::with_capacity(expr.len());
        for (position, &token) in expr.iter().enumerate() {
            if !matches!(token, Token::Function(FunctionKind::Deriv)) {
                expanded.push(token);
                continue;
            }
            let start = subexpr_start(&expanded, expanded.len())
                .ok_or(DifferentiationError::Malformed { position })?;
            let argument = expanded.split_off(start);
            let derivative = self.derive(&argument, 0..argument.len(), 0)?;
            log::trace!("expanded derivative marker at {}", position);
            expanded.extend(derivative);
        }
        Ok(Expression::from_postfix(expanded))
    }

    /// Differentiates the single postfix value occupying `range`.
    ///
    /// The left operands of nested binary operations are collected in a loop
    /// and their derivatives folded back up, so only function arguments and
    /// right operands recurse.
    fn derive(
        &self,
        tokens: &[Token],
        range: Range<usize>,
        depth: usize,
    ) -> Result<Vec<Token>, DifferentiationError> {
        if depth > self.max_depth {
            return Err(DifferentiationError::DepthLimitExceeded { limit: self.max_depth });
        }
        log::trace!("differentiating tokens {:?} at depth {}", range, depth);

        let mut spine: Vec<(BinaryOperatorKind, Range<usize>, Range<usize>)> = Vec::new();
        let Range { start: begin, mut end } = range;
        let mut derivative = loop {
            let position = end.checked_sub(1)
                .filter(|&position| position >= begin)
                .ok_or(DifferentiationError::Malformed { position: begin })?;
            let token = *tokens.get(position)
                .ok_or(DifferentiationError::Malformed { position })?;

            match token {
                Token::Variable => break one(),
                Token::Constant(_) => break zero(),
                Token::Function(func) => {
                    if position == begin {
                        return Err(DifferentiationError::Malformed { position });
                    }
                    break self.derive_function(func, tokens, begin..position, depth)?;
                },
                Token::BinaryOperator(oper) => {
                    let mid = subexpr_start(tokens, position)
                        .filter(|&mid| mid > begin)
                        .ok_or(DifferentiationError::Malformed { position })?;
                    spine.push((oper, begin..mid, mid..position));
                    end = mid;
                },
                Token::Bracket(_) => return Err(DifferentiationError::UnrecognizedToken { position }),
            }
        };

        while let Some((oper, lhs, rhs)) = spine.pop() {
            derivative = self.derive_binary(oper, tokens, lhs, rhs, derivative, depth)?;
        }
        Ok(derivative)
    }

    /// Chain rule: `(f(g))' = g' * f'(g)`.
    fn derive_function(
        &self,
        func: FunctionKind,
        tokens: &[Token],
        arg: Range<usize>,
        depth: usize,
    ) -> Result<Vec<Token>, DifferentiationError> {
        let template = func.derivative()
            .ok_or(DifferentiationError::DerivativeNotFound(func.name()))?;
        let argument = &tokens[arg.clone()];

        match argument {
            [Token::Constant(_)] => Ok(zero()),
            [Token::Variable] => Ok(substitute(template, argument)),
            _ => {
                let inner = self.derive(tokens, arg, depth + 1)?;
                Ok(product(inner, substitute(template, argument)))
            },
        }
    }

    /// Combines `df`, the derivative of the left operand, with the derivative
    /// of the right operand according to `oper`.
    fn derive_binary(
        &self,
        oper: BinaryOperatorKind,
        tokens: &[Token],
        lhs: Range<usize>,
        rhs: Range<usize>,
        df: Vec<Token>,
        depth: usize,
    ) -> Result<Vec<Token>, DifferentiationError> {
        let f = &tokens[lhs];
        let g = &tokens[rhs.clone()];

        // natural_log below folds log(0) to -inf; this shortcut keeps a zero
        // base from ever reaching it.
        if oper == BinaryOperatorKind::Pow && is_zero(f) {
            return Ok(zero());
        }

        let dg = self.derive(tokens, rhs, depth + 1)?;

        let derivative = match oper {
            BinaryOperatorKind::Add => sum(df, dg),
            BinaryOperatorKind::Sub => difference(df, dg),
            BinaryOperatorKind::Mul => sum(product(df, g.to_vec()), product(dg, f.to_vec())),
            BinaryOperatorKind::Div => match constant_of(g) {
                Some(divisor) => product(df, vec![Token::Constant(Complex::<f64>::one() / divisor)]),
                None => quotient(
                    difference(product(df, g.to_vec()), product(dg, f.to_vec())),
                    product(g.to_vec(), g.to_vec()),
                ),
            },
            // (f^g)' = g * f^(g-1) * f' + f^g * ln(f) * g'
            BinaryOperatorKind::Pow => {
                let lowered = power(f.to_vec(), difference(g.to_vec(), one()));
                let first = product(product(g.to_vec(), lowered), df);
                let second = product(product(power(f.to_vec(), g.to_vec()), natural_log(f.to_vec())), dg);
                sum(first, second)
            },
        };
        Ok(derivative)
    }
}

/// Differentiates a postfix expression with the default depth bound.
///
/// See [`Differentiator::differentiate`].
pub fn differentiate(expr: &Expression) -> Result<Expression, DifferentiationError> {
    Differentiator::default().differentiate(expr)
}

/// Expands derivative markers with the default depth bound.
///
/// See [`Differentiator::expand_derivatives`].
pub fn expand_derivatives(expr: &Expression) -> Result<Expression, DifferentiationError> {
    Differentiator::default().expand_derivatives(expr)
}



#[cfg(test)]
mod expand_derivatives_tests {
    use super::*;
    use crate::evaluate::evaluate;
    use crate::lexer::tokenize;
    use approx::assert_abs_diff_eq;

    fn postfix(input: &str) -> Expression {
        tokenize(input).unwrap().to_postfix().unwrap()
    }

    #[test]
    fn test_expands_in_place() {
        let expanded = expand_derivatives(&postfix(r"1+\deriv(z^2)")).unwrap();
        assert_eq!(expanded.to_string(), "[1 2 z * +]");
        assert!(expanded.is_postfix());
    }

    #[test]
    fn test_without_markers_is_unchanged() {
        let expr = postfix(r"\sin(z)*z");
        assert_eq!(expand_derivatives(&expr), Ok(expr));
    }

    #[test]
    fn test_nested_markers() {
        let expanded = expand_derivatives(&postfix(r"\deriv(\deriv(z^3))")).unwrap();
        let z = Complex::new(0.5, -1.5);
        let result = evaluate(&expanded, z).unwrap();
        assert_abs_diff_eq!(result.re, 6.0 * z.re, epsilon = 1.0e-12);
        assert_abs_diff_eq!(result.im, 6.0 * z.im, epsilon = 1.0e-12);
    }

    #[test]
    fn test_differentiate_expands_first() {
        let derivative = differentiate(&postfix(r"\deriv(z^2)")).unwrap();
        assert_eq!(derivative.to_string(), "[2]");
    }

    #[test]
    fn test_marker_errors() {
        assert_eq!(
            expand_derivatives(&postfix(r"\deriv(\conj(z))")),
            Err(DifferentiationError::DerivativeNotFound("conj"))
        );
        assert_eq!(
            expand_derivatives(&tokenize(r"\deriv(z)").unwrap()),
            Err(DifferentiationError::NotPostfix)
        );
    }
}

#[cfg(test)]
mod differentiator_tests {
    use super::*;
    use crate::evaluate::evaluate;
    use crate::lexer::tokenize;

    fn postfix(input: &str) -> Expression {
        tokenize(input).unwrap().to_postfix().unwrap()
    }

    #[test]
    fn test_default_depth() {
        assert_eq!(Differentiator::new().max_depth(), DEFAULT_MAX_DEPTH);
        assert_eq!(Differentiator::new().with_max_depth(7).max_depth(), 7);
    }

    #[test]
    fn test_depth_limit() {
        let expr = postfix(r"\sin(z*z)");
        assert_eq!(
            Differentiator::new().with_max_depth(1).differentiate(&expr),
            Err(DifferentiationError::DepthLimitExceeded { limit: 1 })
        );
        assert!(Differentiator::new().with_max_depth(2).differentiate(&expr).is_ok());
        assert!(Differentiator::new().with_max_depth(0).differentiate(&postfix("z")).is_ok());
    }

    #[test]
    fn test_long_chain() {
        let input = vec!["z"; 300].join("+");
        let derivative = differentiate(&postfix(&input)).unwrap();
        assert_eq!(derivative.to_string(), "[300]");
        assert_eq!(evaluate(&derivative, Complex::new(1.0, 1.0)), Ok(Complex::new(300.0, 0.0)));

        let derivative = Differentiator::new().with_max_depth(1).differentiate(&postfix(&input)).unwrap();
        assert_eq!(derivative.to_string(), "[300]");

        let input = (1..=300).map(|k| format!("{}*z", k)).collect::<Vec<_>>().join("+");
        let derivative = differentiate(&postfix(&input)).unwrap();
        assert_eq!(derivative.to_string(), "[45150]");
    }

    #[test]
    fn test_deep_nesting() {
        let mut input = "z".to_string();
        for _ in 0..300 {
            input = format!(r"\sin({})", input);
        }
        let expr = postfix(&input);
        assert_eq!(
            differentiate(&expr),
            Err(DifferentiationError::DepthLimitExceeded { limit: DEFAULT_MAX_DEPTH })
        );
        assert!(Differentiator::new().with_max_depth(512).differentiate(&expr).is_ok());
    }
}
