use std::fmt::{Display, Formatter};

use nom::IResult;
use nom::character::complete::digit1;
use nom::combinator::{all_consuming, map_res};
use nom::error::{ErrorKind, FromExternalError, ParseError};

#[derive(Debug)]
pub enum ParserError<I> {
    /// The input was well-formed but its value was rejected.
    Invalid(I, anyhow::Error),
    Syntax(I, ErrorKind),
}

impl<I: AsRef<str>> Display for ParserError<I> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(input, error) => write!(f, "invalid value '{}': {error}", input.as_ref()),
            Self::Syntax(input, _) if input.as_ref().is_empty() => {
                f.write_str("unexpected end of input")
            }
            Self::Syntax(input, kind) => write!(
                f,
                "unexpected input '{}' ({})",
                input.as_ref(),
                kind.description()
            ),
        }
    }
}

impl<I> ParseError<I> for ParserError<I> {
    fn from_error_kind(input: I, kind: ErrorKind) -> Self {
        Self::Syntax(input, kind)
    }

    fn append(_: I, _: ErrorKind, other: Self) -> Self {
        other
    }
}

impl<I, E: Into<anyhow::Error>> FromExternalError<I, E> for ParserError<I> {
    fn from_external_error(input: I, _: ErrorKind, error: E) -> Self {
        Self::Invalid(input, error.into())
    }
}

pub type NomResult<'a, Ret> = IResult<&'a str, Ret, ParserError<&'a str>>;

/// Runs `parser` and fails unless it consumes the whole `input`.
pub fn consume_all<'a, O, F>(parser: F, input: &'a str) -> anyhow::Result<O>
where
    F: FnMut(&'a str) -> NomResult<'a, O>,
{
    match all_consuming(parser)(input) {
        Ok((_, output)) => Ok(output),
        Err(nom::Err::Error(error) | nom::Err::Failure(error)) => Err(anyhow::anyhow!("{error}")),
        Err(nom::Err::Incomplete(_)) => Err(anyhow::anyhow!("unexpected end of input")),
    }
}

pub fn p_u32(input: &str) -> NomResult<'_, u32> {
    map_res(digit1, str::parse::<u32>)(input)
}

#[cfg(test)]
mod tests {
    use super::{consume_all, p_u32};

    #[test]
    fn test_parse_u32() {
        assert_eq!(consume_all(p_u32, "0").unwrap(), 0);
        assert_eq!(consume_all(p_u32, "007").unwrap(), 7);
        assert_eq!(consume_all(p_u32, "1019").unwrap(), 1019);
    }

    #[test]
    fn test_parse_u32_invalid() {
        assert!(consume_all(p_u32, "x").is_err());
        assert!(consume_all(p_u32, "-1").is_err());
        assert!(consume_all(p_u32, "1_000").is_err());
    }

    #[test]
    fn test_parse_u32_overflow() {
        let error = consume_all(p_u32, "99999999999").unwrap_err();
        assert!(error.to_string().starts_with("invalid value '99999999999'"));
    }

    #[test]
    fn test_consume_all_rejects_trailing_input() {
        let error = consume_all(p_u32, "12ab").unwrap_err();
        assert!(error.to_string().contains("'ab'"));
        let error = consume_all(p_u32, "").unwrap_err();
        assert_eq!(error.to_string(), "unexpected end of input");
    }
}
