//! # error.rs
//!
//! Error types for every stage of the pipeline.
//!
//! - `ParseError`: the tokenizer could not turn the input text into tokens.
//! - `SyntaxError`: the infix-to-postfix conversion found mismatched brackets.
//! - `EvaluationError`: a postfix sequence could not be evaluated.
//! - `DifferentiationError`: a postfix sequence could not be differentiated.
//!
//! `Error` wraps all of them and is what [`crate::Builder`] returns.

use thiserror::Error;

/// Errors raised while tokenizing the input text.
///
/// Every position is a byte offset into the original input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// A `\name` keyword was never followed by a terminating character.
    #[error("unterminated keyword starting at {position}")]
    UnterminatedKeyword { position: usize },
    /// A numeric literal has more than one decimal point or no digits at all.
    #[error("malformed number `{text}` at {position}")]
    MalformedNumber { text: String, position: usize },
    /// A `[re,im]` literal is missing its `,` or its closing `]`.
    #[error("unterminated complex literal starting at {position}")]
    UnterminatedComplexLiteral { position: usize },
    /// A keyword or single character does not name any known operation.
    #[error("unknown operation `{name}` at {position}")]
    UnknownOperation { name: String, position: usize },
}

/// Errors raised while converting infix to postfix.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("mismatched brackets in infix expression")]
    MismatchedBrackets,
}

/// Errors raised while evaluating a postfix expression.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationError {
    /// The expression is still in infix form.
    #[error("only postfix expressions can be evaluated")]
    NotPostfix,
    /// An operator found fewer operands on the stack than it consumes.
    #[error("stack underflow at token {position}")]
    StackUnderflow { position: usize },
    /// The stack did not hold exactly one value after the last token.
    #[error("expected exactly one value after evaluation, found {count}")]
    LeftoverValues { count: usize },
    /// A bracket survived into a postfix sequence.
    #[error("unexpected bracket at token {position}")]
    UnexpectedBracket { position: usize },
}

/// Errors raised while differentiating a postfix expression.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DifferentiationError {
    /// The expression is still in infix form.
    #[error("only postfix expressions can be differentiated")]
    NotPostfix,
    /// The sequence violates the postfix arity invariant.
    #[error("malformed postfix expression at token {position}")]
    Malformed { position: usize },
    /// The function has no entry in the derivative table.
    #[error("derivative not found for `{0}`")]
    DerivativeNotFound(&'static str),
    /// A token that cannot head a subexpression was found at a boundary.
    #[error("unrecognized token at {position}")]
    UnrecognizedToken { position: usize },
    /// Nesting went deeper than the configured limit.
    #[error("expression nesting exceeds the depth limit of {limit}")]
    DepthLimitExceeded { limit: usize },
}

/// Any error the full pipeline can produce.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("failed to parse expression: {0}")]
    Parse(#[from] ParseError),
    #[error("failed to convert expression to postfix: {0}")]
    Syntax(#[from] SyntaxError),
    #[error("failed to evaluate expression: {0}")]
    Evaluation(#[from] EvaluationError),
    #[error("failed to differentiate expression: {0}")]
    Differentiation(#[from] DifferentiationError),
}

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = ParseError::UnknownOperation { name: "sin".into(), position: 3 };
        assert_eq!(err.to_string(), "unknown operation `sin` at 3");

        let err = DifferentiationError::DerivativeNotFound("conj");
        assert_eq!(err.to_string(), "derivative not found for `conj`");
    }

    #[test]
    fn test_from_conversions() {
        let err: Error = SyntaxError::MismatchedBrackets.into();
        assert_eq!(err, Error::Syntax(SyntaxError::MismatchedBrackets));
        assert_eq!(
            err.to_string(),
            "failed to convert expression to postfix: mismatched brackets in infix expression"
        );

        let err: Error = EvaluationError::LeftoverValues { count: 2 }.into();
        assert!(matches!(err, Error::Evaluation(EvaluationError::LeftoverValues { count: 2 })));
    }
}
