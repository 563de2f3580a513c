//! rpn.rs
//!
//! Converts an infix [`Expression`] into Reverse Polish Notation (RPN) using
//! the Shunting-yard algorithm. The implementation handles brackets, function
//! call syntax and operator precedence. Equal-precedence chains associate to
//! the left, including `^`.

use crate::error::SyntaxError;
use crate::expression::Expression;
use crate::token::{BinaryOperatorKind, Bracket, Token};

/// Handles the case when a closing bracket is encountered.
///
/// Pops tokens from the stack and pushes them into the RPN output until an
/// opening bracket is found. The opening bracket is discarded. If a function
/// token sits directly beneath it, that function is also pushed to the output.
///
/// # Errors
///
/// Returns [`SyntaxError::MismatchedBrackets`] if no opening bracket is found.
fn make_rpn_case_of_close(rpn: &mut Vec<Token>, stack: &mut Vec<Token>) -> Result<(), SyntaxError> {
    loop {
        match stack.pop() {
            Some(Token::Bracket(Bracket::Open)) => {
                if let Some(Token::Function(_)) = stack.last() {
                    rpn.extend(stack.pop());
                }
                return Ok(());
            },
            Some(token) => rpn.push(token),
            None => return Err(SyntaxError::MismatchedBrackets),
        }
    }
}

/// Handles the case when a binary operator is encountered.
///
/// Pops operators and functions into the RPN output while the top of the stack
/// is not an opening bracket and its precedence is greater than or equal to
/// the current operator's.
fn make_rpn_case_of_operator(oper: BinaryOperatorKind, rpn: &mut Vec<Token>, stack: &mut Vec<Token>) {
    while let Some(&top) = stack.last() {
        if matches!(top, Token::Bracket(Bracket::Open)) {
            break;
        }
        match top.precedence() {
            Some(prec) if prec >= oper.precedence() => {
                stack.pop();
                rpn.push(top);
            },
            _ => break,
        }
    }
    stack.push(Token::BinaryOperator(oper));
}

/// Converts an infix expression into Reverse Polish Notation (RPN).
///
/// An expression already flagged as postfix is returned unchanged.
///
/// # Errors
///
/// Returns [`SyntaxError::MismatchedBrackets`] when a closing bracket has no
/// opening partner or an opening bracket is never closed.
///
/// # Example
///
/// ```
/// use zexpr::{parse_infix, to_postfix};
///
/// let infix = parse_infix("(3+4)*2").unwrap();
/// let rpn = to_postfix(&infix).unwrap();
/// assert_eq!(rpn.to_string(), "[3 4 + 2 *]");
/// ```
pub fn to_postfix(expr: &Expression) -> Result<Expression, SyntaxError> {
    if expr.is_postfix() {
        return Ok(expr.clone());
    }

    let mut rpn = Vec::with_capacity(expr.len());
    let mut stack = Vec::new();

    for &token in expr {
        match token {
            Token::Variable |
            Token::Constant(_)
                => rpn.push(token),

            Token::Function(_) |
            Token::Bracket(Bracket::Open)
                => stack.push(token),

            Token::Bracket(Bracket::Close)
                => make_rpn_case_of_close(&mut rpn, &mut stack)?,

            Token::BinaryOperator(oper)
                => make_rpn_case_of_operator(oper, &mut rpn, &mut stack),
        }
    }

    // Push any remaining stack contents to the RPN output
    while let Some(token) = stack.pop() {
        match token {
            Token::Bracket(_) => return Err(SyntaxError::MismatchedBrackets),
            _ => rpn.push(token),
        }
    }

    let rpn = Expression::from_postfix(rpn);
    log::trace!("converted {} to postfix {}", expr, rpn);
    Ok(rpn)
}

#[cfg(test)]
mod rpn_tests {
    use super::*;
    use crate::lexer::tokenize;

    fn rpn_text(input: &str) -> String {
        let infix = tokenize(input).unwrap();
        to_postfix(&infix).unwrap().to_string()
    }

    #[test]
    fn test_precedence() {
        assert_eq!(rpn_text("3+4*2"), "[3 4 2 * +]");
        assert_eq!(rpn_text("(3+4)*2"), "[3 4 + 2 *]");
        assert_eq!(rpn_text("z*z^2+1"), "[z z 2 ^ * 1 +]");
    }

    #[test]
    fn test_left_associativity() {
        assert_eq!(rpn_text("8-3-2"), "[8 3 - 2 -]");
        assert_eq!(rpn_text("8/4*2"), "[8 4 / 2 *]");
        assert_eq!(rpn_text("2^3^2"), "[2 3 ^ 2 ^]");
    }

    #[test]
    fn test_negation() {
        assert_eq!(rpn_text("-z^2"), "[z 2 ^ neg]");
        assert_eq!(rpn_text("-3*2"), "[3 neg 2 *]");
        assert_eq!(rpn_text("-(3)"), "[3 neg]");
        assert_eq!(rpn_text("z*(-z)"), "[z z neg *]");
    }

    #[test]
    fn test_function_calls() {
        assert_eq!(rpn_text(r"\sin(z)"), "[z sin]");
        assert_eq!(rpn_text(r"\sin(z)*2"), "[z sin 2 *]");
        assert_eq!(rpn_text(r"\exp{\sin(z)+1}"), "[z sin 1 + exp]");
        assert_eq!(rpn_text(r"\log(z)^2"), "[z log 2 ^]");
        assert_eq!(rpn_text(r"\deriv(z*z)"), "[z z * deriv]");
    }

    #[test]
    fn test_output_is_postfix() {
        let infix = tokenize("z+1").unwrap();
        let rpn = to_postfix(&infix).unwrap();
        assert!(rpn.is_postfix());
        assert!(rpn.validate().is_ok());
        assert!(to_postfix(&Expression::default()).unwrap().is_empty());
    }

    #[test]
    fn test_idempotent() {
        let infix = tokenize(r"\cos(z)/(z+[1,2])").unwrap();
        let once = to_postfix(&infix).unwrap();
        let twice = to_postfix(&once).unwrap();
        assert_eq!(once, twice);
        assert_eq!(infix.to_postfix().unwrap(), once);
    }

    #[test]
    fn test_mismatched_brackets() {
        for input in ["(3+4", "3+4)", ")", r"\sin(z", "{z}}"] {
            let infix = tokenize(input).unwrap();
            assert_eq!(to_postfix(&infix), Err(SyntaxError::MismatchedBrackets), "{}", input);
        }
    }
}
