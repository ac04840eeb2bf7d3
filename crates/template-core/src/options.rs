//! A `nom`-based parser for tag option blocks.
//!
//! An option block is a comma separated list of `key=value` (or `key: value`)
//! pairs. Values are quoted strings, numbers, booleans, `null`, or bare words.
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{take_till, take_till1, take_while1},
    character::complete::{char, multispace0},
    combinator::{map, opt, verify},
    multi::separated_list0,
    sequence::{delimited, separated_pair, terminated},
};
use serde_json::{Map, Number, Value};

/// Parsed options of a single tag.
pub type TagOptions = Map<String, Value>;

// --- Main Public Parser ---

pub fn parse_options(input: &str) -> Result<TagOptions, String> {
    let normalized = normalize_quotes(input);
    match option_list(&normalized) {
        Ok(("", pairs)) => Ok(pairs.into_iter().collect()),
        Ok((rem, _)) => Err(format!("Parser did not consume all input. Remainder: '{rem}'")),
        Err(e) => Err(e.to_string()),
    }
}

/// Replaces the typographic quotes a word processor substitutes while typing.
fn normalize_quotes(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' | '\u{201E}' => '"',
            '\u{2018}' | '\u{2019}' => '\'',
            other => other,
        })
        .collect()
}

// --- Combinators ---

fn option_list(input: &str) -> IResult<&str, Vec<(String, Value)>> {
    delimited(
        multispace0,
        terminated(separated_list0(ws(char(',')), option_pair), opt(ws(char(',')))),
        multispace0,
    )
    .parse(input)
}

fn option_pair(input: &str) -> IResult<&str, (String, Value)> {
    separated_pair(ws(key), alt((char('='), char(':'))), ws(value)).parse(input)
}

fn key(input: &str) -> IResult<&str, String> {
    alt((
        map(double_quoted, str::to_string),
        map(single_quoted, str::to_string),
        map(
            take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '-'),
            str::to_string,
        ),
    ))
    .parse(input)
}

// --- Value Parsers ---

fn double_quoted(input: &str) -> IResult<&str, &str> {
    delimited(char('"'), take_till(|c: char| c == '"'), char('"')).parse(input)
}

fn single_quoted(input: &str) -> IResult<&str, &str> {
    delimited(char('\''), take_till(|c: char| c == '\''), char('\'')).parse(input)
}

fn bare_word(input: &str) -> IResult<&str, Value> {
    map(
        verify(take_till1(|c: char| c == ','), |raw: &str| {
            !raw.starts_with(['"', '\''])
        }),
        |raw: &str| classify_bare(raw.trim()),
    )
    .parse(input)
}

fn value(input: &str) -> IResult<&str, Value> {
    alt((
        map(double_quoted, |s: &str| Value::String(s.to_string())),
        map(single_quoted, |s: &str| Value::String(s.to_string())),
        bare_word,
    ))
    .parse(input)
}

fn classify_bare(raw: &str) -> Value {
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" => Value::Null,
        _ => {
            if let Ok(int) = raw.parse::<i64>() {
                return Value::from(int);
            }
            raw.parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(raw.to_string()))
        }
    }
}

/// A combinator that takes a parser `inner` and produces a parser that consumes surrounding whitespace.
fn ws<'a, F, O, E>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
    E: nom::error::ParseError<&'a str>,
{
    delimited(multispace0, inner, multispace0)
}
