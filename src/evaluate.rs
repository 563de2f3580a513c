//! # evaluate.rs
//!
//! Stack machine evaluating a postfix [`Expression`] at a point `z`.

use num_complex::Complex;

use crate::error::EvaluationError;
use crate::expression::Expression;
use crate::token::Token;

/// Pops one operand for the token at `position`.
fn pop(stack: &mut Vec<Complex<f64>>, position: usize) -> Result<Complex<f64>, EvaluationError> {
    stack.pop().ok_or(EvaluationError::StackUnderflow { position })
}

/// Evaluates a postfix expression with the variable bound to `z`.
///
/// Constants push their value and the variable pushes `z`. A function pops
/// one operand, a binary operator pops the right operand and then the left
/// one. Exactly one value must remain at the end.
///
/// # Errors
///
/// - [`EvaluationError::NotPostfix`] if the expression is flagged infix.
/// - [`EvaluationError::StackUnderflow`] if a token lacks operands.
/// - [`EvaluationError::LeftoverValues`] if zero or several values remain.
/// - [`EvaluationError::UnexpectedBracket`] if the sequence holds a bracket.
///
/// A `deriv` marker evaluates as the identity. Expand markers with
/// [`crate::expand_derivatives`] first to evaluate the derivative instead.
///
/// # Example
///
/// ```
/// use num_complex::Complex;
/// use zexpr::{evaluate, parse_infix, to_postfix};
///
/// let rpn = to_postfix(&parse_infix("3+4*2").unwrap()).unwrap();
/// assert_eq!(evaluate(&rpn, Complex::new(0.0, 0.0)).unwrap(), Complex::new(11.0, 0.0));
/// ```
pub fn evaluate(expr: &Expression, z: Complex<f64>) -> Result<Complex<f64>, EvaluationError> {
    if !expr.is_postfix() {
        return Err(EvaluationError::NotPostfix);
    }

    let mut stack: Vec<Complex<f64>> = Vec::new();
    for (position, token) in expr.iter().enumerate() {
        match token {
            Token::Constant(val) => stack.push(*val),
            Token::Variable => stack.push(z),
            Token::Function(func) => {
                let x = pop(&mut stack, position)?;
                stack.push(func.apply(x));
            },
            Token::BinaryOperator(oper) => {
                let r = pop(&mut stack, position)?;
                let l = pop(&mut stack, position)?;
                stack.push(oper.apply(l, r));
            },
            Token::Bracket(_) => return Err(EvaluationError::UnexpectedBracket { position }),
        }
    }

    match (stack.pop(), stack.len()) {
        (Some(val), 0) => Ok(val),
        (None, _) => Err(EvaluationError::LeftoverValues { count: 0 }),
        (Some(_), rest) => Err(EvaluationError::LeftoverValues { count: rest + 1 }),
    }
}
