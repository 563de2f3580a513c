//! # expression.rs
//!
//! An [`Expression`] is an owned, ordered sequence of [`Token`]s together with
//! a flag telling whether the sequence is in postfix (reverse-Polish) or
//! infix order.
//!
//! Besides list-like editing, this module provides the two structural queries
//! every postfix algorithm relies on:
//! - [`subexpr_start`] finds the start of the smallest self-contained
//!   subexpression ending at a given position.
//! - [`Expression::validate`] checks the postfix arity invariant.

use std::ops::{Index, Range, RangeBounds};

use num_complex::Complex;

use crate::error::{DifferentiationError, EvaluationError, SyntaxError};
use crate::token::Token;

/// Ways a sequence can break the postfix arity invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArityViolation {
    /// The token at `position` consumes more operands than are available.
    Underflow { position: usize },
    /// A bracket appears at `position`.
    Bracket { position: usize },
    /// The sequence leaves `count` values instead of exactly one.
    Leftover { count: usize },
}

/// Returns the start of the smallest self-contained postfix subexpression
/// that ends just before `end`.
///
/// For example `[3 4 *]` is the subexpression of `[5 3 4 * -]` ending at 4.
/// Returns `None` if `end` is out of bounds or the scan runs off the front,
/// which only happens for malformed sequences.
pub fn subexpr_start(tokens: &[Token], end: usize) -> Option<usize> {
    // Operands complete themselves, a function needs one more subexpression
    // to its left and a binary operator two.
    let mut demand: usize = 1;
    for start in (0..end).rev() {
        demand += match tokens.get(start)? {
            Token::Function(_) => 1,
            Token::BinaryOperator(_) => 2,
            _ => 0,
        };
        demand -= 1;
        if demand == 0 {
            return Some(start);
        }
    }
    None
}

/// Checks that `tokens` form exactly one well-formed postfix value.
pub fn validate(tokens: &[Token]) -> Result<(), ArityViolation> {
    let mut depth: usize = 0;
    for (position, token) in tokens.iter().enumerate() {
        let arity = token.arity().ok_or(ArityViolation::Bracket { position })?;
        if depth < arity {
            return Err(ArityViolation::Underflow { position });
        }
        depth = depth - arity + 1;
    }
    match depth {
        1 => Ok(()),
        count => Err(ArityViolation::Leftover { count }),
    }
}

/// A mathematical expression as a sequence of tokens.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Expression {
    tokens: Vec<Token>,
    postfix: bool,
}

impl Expression {
    /// Creates an expression from tokens in infix order.
    pub fn from_infix(tokens: Vec<Token>) -> Self {
        Self { tokens, postfix: false }
    }

    /// Creates an expression from tokens in postfix order.
    pub fn from_postfix(tokens: Vec<Token>) -> Self {
        Self { tokens, postfix: true }
    }

    /// Copies the tokens in `range` into a new expression with the same order flag.
    ///
    /// # Panics
    ///
    /// Panics if `range` is out of bounds.
    pub fn subexpression(&self, range: Range<usize>) -> Self {
        Self {
            tokens: self.tokens[range].to_vec(),
            postfix: self.postfix,
        }
    }

    /// Returns true if the tokens are in postfix order.
    pub fn is_postfix(&self) -> bool {
        self.postfix
    }

    /// Returns the tokens as a slice.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Consumes the expression and returns its tokens.
    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    /// Returns the number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns true if there are no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Iterates over the tokens in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    /// Returns the first token, if any.
    pub fn first(&self) -> Option<&Token> {
        self.tokens.first()
    }

    /// Returns the last token, if any.
    pub fn last(&self) -> Option<&Token> {
        self.tokens.last()
    }

    /// Appends a token.
    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    /// Removes and returns the last token.
    pub fn pop(&mut self) -> Option<Token> {
        self.tokens.pop()
    }

    /// Inserts a token at `index`, shifting everything after it.
    pub fn insert(&mut self, index: usize, token: Token) {
        self.tokens.insert(index, token);
    }

    /// Removes and returns the token at `index`.
    pub fn remove(&mut self, index: usize) -> Token {
        self.tokens.remove(index)
    }

    /// Appends every token of `tokens`.
    pub fn extend_from_slice(&mut self, tokens: &[Token]) {
        self.tokens.extend_from_slice(tokens);
    }

    /// Replaces the tokens in `range` with `replace_with`, returning the removed tokens.
    pub fn splice<R, I>(&mut self, range: R, replace_with: I) -> Vec<Token>
    where
        R: RangeBounds<usize>,
        I: IntoIterator<Item = Token>,
    {
        self.tokens.splice(range, replace_with).collect()
    }

    /// Removes every token, keeping the postfix flag.
    pub fn clear(&mut self) {
        self.tokens.clear();
    }

    /// Method form of [`subexpr_start`].
    pub fn subexpr_start(&self, end: usize) -> Option<usize> {
        subexpr_start(&self.tokens, end)
    }

    /// Checks the postfix arity invariant over the whole sequence.
    pub fn validate(&self) -> Result<(), ArityViolation> {
        validate(&self.tokens)
    }

    /// Returns an equivalent postfix expression. See [`crate::rpn::to_postfix`].
    pub fn to_postfix(&self) -> Result<Self, SyntaxError> {
        crate::rpn::to_postfix(self)
    }

    /// Evaluates the postfix expression at `z`. See [`crate::evaluate::evaluate`].
    pub fn evaluate(&self, z: Complex<f64>) -> Result<Complex<f64>, EvaluationError> {
        crate::evaluate::evaluate(self, z)
    }

    /// Differentiates the postfix expression. See [`crate::derivative::differentiate`].
    pub fn differentiate(&self) -> Result<Self, DifferentiationError> {
        crate::derivative::differentiate(self)
    }
}

impl Index<usize> for Expression {
    type Output = Token;

    fn index(&self, index: usize) -> &Self::Output {
        &self.tokens[index]
    }
}

impl<'a> IntoIterator for &'a Expression {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (idx, token) in self.tokens.iter().enumerate() {
            if idx > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", token)?;
        }
        write!(f, "]")
    }
}



#[cfg(test)]
mod expression_tests {
    use super::*;
    use crate::token::{BinaryOperatorKind, FunctionKind};

    #[test]
    fn test_display() {
        let expr = Expression::from_postfix(vec![
            Token::real(3.0),
            Token::real(4.0),
            Token::real(2.0),
            Token::BinaryOperator(BinaryOperatorKind::Mul),
            Token::BinaryOperator(BinaryOperatorKind::Add),
        ]);
        assert_eq!(expr.to_string(), "[3 4 2 * +]");
        assert_eq!(Expression::default().to_string(), "[]");
    }

    #[test]
    fn test_subexpression_keeps_flag() {
        let expr = Expression::from_postfix(vec![
            Token::Variable,
            Token::Function(FunctionKind::Sin),
            Token::real(2.0),
        ]);
        let sub = expr.subexpression(0..2);
        assert!(sub.is_postfix());
        assert_eq!(sub.tokens(), &[Token::Variable, Token::Function(FunctionKind::Sin)]);
    }

    #[test]
    fn test_editing() {
        let mut expr = Expression::from_postfix(vec![Token::Variable]);
        expr.push(Token::Function(FunctionKind::Cos));
        expr.insert(0, Token::real(1.0));
        assert_eq!(expr.len(), 3);
        assert_eq!(expr.remove(0), Token::real(1.0));
        assert_eq!(expr.to_string(), "[z cos]");

        let removed = expr.splice(1..2, [Token::Function(FunctionKind::Sin), Token::Function(FunctionKind::Neg)]);
        assert_eq!(removed, vec![Token::Function(FunctionKind::Cos)]);
        assert_eq!(expr.to_string(), "[z sin neg]");

        expr.extend_from_slice(&[Token::real(2.0), Token::BinaryOperator(BinaryOperatorKind::Mul)]);
        assert_eq!(expr.last(), Some(&Token::BinaryOperator(BinaryOperatorKind::Mul)));
        assert_eq!(expr.subexpr_start(3), Some(0));
        assert_eq!(expr.validate(), Ok(()));

        expr.clear();
        assert!(expr.is_empty());
        assert_eq!(expr.pop(), None);
    }
}
