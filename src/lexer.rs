//! # lexer.rs
//!
//! This module turns an input string into an infix [`Expression`].
//!
//! Whitespace is ignored everywhere. The recognized lexemes are, in priority
//! order:
//! - `\name` keywords naming a known operation, terminated by the next
//!   operator, bracket or escape character,
//! - a `-` at the start of the input or right after an opening bracket, which
//!   is negation rather than subtraction,
//! - numeric literals with at most one decimal point and an optional `i`
//!   suffix making them imaginary,
//! - `[re,im]` complex literals,
//! - the constants `i`, `e` and `pi`,
//! - the variable `z`,
//! - single-character operators and brackets.

use num_complex::Complex;

use crate::error::ParseError;
use crate::expression::Expression;
use crate::token::{lookup, FunctionKind, Token};

/// Char introducing a keyword such as `\sin`.
pub const ESCAPE: char = '\\';

/// Char representing the imaginary unit, alone or as a number suffix.
pub const IMAGINARY_UNIT: char = 'i';

/// Char representing the variable.
pub const VARIABLE: char = 'z';

/// Char representing Euler's number.
pub const EULER: char = 'e';

/// Chars that end a keyword.
const KEYWORD_TERMINATORS: [char; 9] = [ESCAPE, '-', '+', '*', '/', '^', '{', '(', '['];

/// Non-whitespace chars of the input with their byte offsets.
type Chars = [(usize, char)];

/// Parses a `\name` keyword starting at `start`.
///
/// Returns the token and the index just past the keyword name.
fn parse_keyword(chars: &Chars, start: usize) -> Result<(Token, usize), ParseError> {
    let position = chars[start].0;
    let end = chars[start + 1..]
        .iter()
        .position(|(_, ch)| KEYWORD_TERMINATORS.contains(ch))
        .map(|offset| start + 1 + offset)
        .ok_or(ParseError::UnterminatedKeyword { position })?;

    let name: String = chars[start + 1..end].iter().map(|(_, ch)| ch).collect();
    let operation = lookup(&name).ok_or(ParseError::UnknownOperation { name, position })?;
    Ok((operation.token(), end))
}

/// Parses a numeric literal starting at `start`.
///
/// A literal is a maximal run of digits and decimal points, optionally
/// followed by the imaginary unit.
fn parse_number(chars: &Chars, start: usize) -> Result<(Token, usize), ParseError> {
    let position = chars[start].0;
    let mut end = start;
    let mut seen_point = false;
    let mut malformed = false;

    while let Some(&(_, ch)) = chars.get(end) {
        match ch {
            '0'..='9' => {},
            '.' if seen_point => malformed = true,
            '.' => seen_point = true,
            _ => break,
        }
        end += 1;
    }

    let text: String = chars[start..end].iter().map(|(_, ch)| ch).collect();
    let value = match text.parse::<f64>() {
        Ok(value) if !malformed => value,
        _ => return Err(ParseError::MalformedNumber { text, position }),
    };

    if let Some(&(_, IMAGINARY_UNIT)) = chars.get(end) {
        return Ok((Token::Constant(Complex::new(0.0, value)), end + 1));
    }
    Ok((Token::real(value), end))
}

/// Parses one part of a `[re,im]` literal.
fn parse_part(chars: &Chars, range: std::ops::Range<usize>, fallback: usize) -> Result<f64, ParseError> {
    let position = chars.get(range.start).map_or(fallback, |(idx, _)| *idx);
    let text: String = chars[range].iter().map(|(_, ch)| ch).collect();
    text.parse::<f64>()
        .map_err(|_| ParseError::MalformedNumber { text, position })
}

/// Parses a `[re,im]` complex literal starting at `start`.
fn parse_complex(chars: &Chars, start: usize) -> Result<(Token, usize), ParseError> {
    let position = chars[start].0;
    let find = |from: usize, target: char| {
        chars[from..]
            .iter()
            .position(|(_, ch)| *ch == target)
            .map(|offset| from + offset)
            .ok_or(ParseError::UnterminatedComplexLiteral { position })
    };

    let comma = find(start + 1, ',')?;
    let close = find(comma + 1, ']')?;

    let re = parse_part(chars, start + 1..comma, position)?;
    let im = parse_part(chars, comma + 1..close, position)?;
    Ok((Token::Constant(Complex::new(re, im)), close + 1))
}

/// Returns true if a `-` at `idx` negates the following operand.
fn is_negation(chars: &Chars, idx: usize) -> bool {
    match idx.checked_sub(1).and_then(|prev| chars.get(prev)) {
        None => true,
        Some((_, prev)) => matches!(prev, '(' | '{'),
    }
}

/// Splits the input string into tokens.
///
/// # Errors
///
/// Returns a [`ParseError`] if a keyword is unterminated, a number is
/// malformed, or a name does not match any known operation.
pub fn tokenize(input: &str) -> Result<Expression, ParseError> {
    let chars: Vec<(usize, char)> = input
        .char_indices()
        .filter(|(_, ch)| !ch.is_whitespace())
        .collect();

    let mut tokens = Vec::new();
    let mut idx = 0;
    while let Some(&(position, ch)) = chars.get(idx) {
        let (token, next) = match ch {
            ESCAPE => parse_keyword(&chars, idx)?,
            '-' if is_negation(&chars, idx) => (Token::Function(FunctionKind::Neg), idx + 1),
            '0'..='9' | '.' => parse_number(&chars, idx)?,
            '[' => parse_complex(&chars, idx)?,
            IMAGINARY_UNIT => (Token::Constant(Complex::I), idx + 1),
            EULER => (Token::real(std::f64::consts::E), idx + 1),
            'p' if matches!(chars.get(idx + 1), Some((_, IMAGINARY_UNIT))) => {
                (Token::real(std::f64::consts::PI), idx + 2)
            },
            VARIABLE => (Token::Variable, idx + 1),
            _ => {
                let name = ch.to_string();
                let operation = lookup(&name).ok_or(ParseError::UnknownOperation { name, position })?;
                (operation.token(), idx + 1)
            },
        };
        tokens.push(token);
        idx = next;
    }

    let expr = Expression::from_infix(tokens);
    log::trace!("tokenized {:?} into {}", input, expr);
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{BinaryOperatorKind, Bracket};

    fn lex_text(input: &str) -> String {
        tokenize(input).unwrap().to_string()
    }

    #[test]
    fn test_empty_and_whitespace() {
        assert!(tokenize("").unwrap().is_empty());
        assert!(tokenize("   \t\n  ").unwrap().is_empty());
        assert!(!tokenize("z").unwrap().is_postfix());
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(lex_text("3+4*2"), "[3 + 4 * 2]");
        assert_eq!(lex_text("(3 + 4) * 2"), "[( 3 + 4 ) * 2]");
        assert_eq!(lex_text("{z^2}/z"), "[( z ^ 2 ) / z]");
    }

    #[test]
    fn test_keywords() {
        assert_eq!(lex_text(r"\sin(z)"), "[sin ( z )]");
        assert_eq!(lex_text(r"\exp{\log(z)}"), "[exp ( log ( z ) )]");
        assert_eq!(lex_text(r"\ a c o s (z)"), "[acos ( z )]");
        assert_eq!(lex_text(r"\deriv(z^2)"), "[deriv ( z ^ 2 )]");
    }

    #[test]
    fn test_each_keyword_maps_to_its_own_function() {
        for name in FunctionKind::names() {
            let expr = tokenize(&format!("\\{}(z)", name)).unwrap();
            match expr.first() {
                Some(Token::Function(kind)) => assert_eq!(kind.name(), name),
                other => panic!("{} lexed to {:?}", name, other),
            }
        }
    }

    #[test]
    fn test_negation() {
        let expr = tokenize("-z").unwrap();
        assert_eq!(expr[0], Token::Function(FunctionKind::Neg));

        let expr = tokenize("( -3)").unwrap();
        assert_eq!(expr[1], Token::Function(FunctionKind::Neg));

        let expr = tokenize("{-z}").unwrap();
        assert_eq!(expr[1], Token::Function(FunctionKind::Neg));

        let expr = tokenize("z-3").unwrap();
        assert_eq!(expr[1], Token::BinaryOperator(BinaryOperatorKind::Sub));

        let expr = tokenize("z*(2)-3").unwrap();
        assert_eq!(expr[5], Token::BinaryOperator(BinaryOperatorKind::Sub));
    }

    #[test]
    fn test_numbers() {
        let expr = tokenize("3.25").unwrap();
        assert_eq!(expr[0], Token::real(3.25));

        let expr = tokenize(".5 + 5.").unwrap();
        assert_eq!(
            expr.tokens(),
            &[Token::real(0.5), Token::BinaryOperator(BinaryOperatorKind::Add), Token::real(5.0)]
        );

        // whitespace is dropped before scanning, leaving ".55."
        assert!(matches!(tokenize(".5 5."), Err(ParseError::MalformedNumber { .. })));

        let expr = tokenize("2.5i").unwrap();
        assert_eq!(expr[0], Token::Constant(Complex::new(0.0, 2.5)));
    }

    #[test]
    fn test_complex_literal() {
        let expr = tokenize("[1.5, -2]").unwrap();
        assert_eq!(expr.tokens(), &[Token::Constant(Complex::new(1.5, -2.0))]);

        let expr = tokenize("z*[0,1]").unwrap();
        assert_eq!(expr[2], Token::Constant(Complex::I));
    }

    #[test]
    fn test_constants_and_variable() {
        let expr = tokenize("i e pi z").unwrap();
        assert_eq!(
            expr.tokens(),
            &[
                Token::Constant(Complex::I),
                Token::real(std::f64::consts::E),
                Token::real(std::f64::consts::PI),
                Token::Variable,
            ]
        );
    }

    #[test]
    fn test_brackets() {
        let expr = tokenize("(){}").unwrap();
        assert_eq!(
            expr.tokens(),
            &[
                Token::Bracket(Bracket::Open),
                Token::Bracket(Bracket::Close),
                Token::Bracket(Bracket::Open),
                Token::Bracket(Bracket::Close),
            ]
        );
    }

    #[test]
    fn test_malformed_number() {
        assert_eq!(
            tokenize("1.2.3"),
            Err(ParseError::MalformedNumber { text: "1.2.3".into(), position: 0 })
        );
        assert_eq!(
            tokenize("z + ."),
            Err(ParseError::MalformedNumber { text: ".".into(), position: 4 })
        );
        assert_eq!(
            tokenize("[a,2]"),
            Err(ParseError::MalformedNumber { text: "a".into(), position: 1 })
        );
    }

    #[test]
    fn test_unterminated() {
        assert_eq!(tokenize(r"\sin"), Err(ParseError::UnterminatedKeyword { position: 0 }));
        assert_eq!(tokenize(r"z*\cos z"), Err(ParseError::UnterminatedKeyword { position: 2 }));
        assert_eq!(tokenize("[1,2"), Err(ParseError::UnterminatedComplexLiteral { position: 0 }));
        assert_eq!(tokenize("[1 2]"), Err(ParseError::UnterminatedComplexLiteral { position: 0 }));
    }

    #[test]
    fn test_unknown_operation() {
        assert_eq!(
            tokenize("sin(z)"),
            Err(ParseError::UnknownOperation { name: "s".into(), position: 0 })
        );
        assert_eq!(
            tokenize(r"\sinc(z)"),
            Err(ParseError::UnknownOperation { name: "sinc".into(), position: 0 })
        );
        assert_eq!(
            tokenize("  z @ 2"),
            Err(ParseError::UnknownOperation { name: "@".into(), position: 4 })
        );
    }
}
