use sluice_core::{Error, Result, consume_while, truncate_long};

/// Statements the in-memory service knows how to answer on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Statement {
    /// `SELECT x FROM UNNEST(GENERATE_ARRAY(a, b)) AS x`
    GenerateArray { column: String, start: i64, end: i64 },
    /// `SELECT @param[.field] AS alias`
    Parameter {
        param: String,
        field: Option<String>,
        alias: String,
    },
}

/// Collapse whitespace and drop the trailing semicolon, registered results are keyed by this.
pub(crate) fn normalize(sql: &str) -> String {
    sql.trim_end()
        .trim_end_matches(';')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

impl Statement {
    pub(crate) fn parse(sql: &str) -> Result<Self> {
        let mut input = sql.trim();
        let input = &mut input;
        let unsupported = || Error::msg(format!("Unsupported statement: {}", truncate_long!(sql)));
        if !keyword(input, "SELECT") {
            return Err(unsupported());
        }
        let statement = if symbol(input, '@') {
            let param = identifier(input).ok_or_else(unsupported)?;
            let field = if symbol(input, '.') {
                Some(identifier(input).ok_or_else(unsupported)?)
            } else {
                None
            };
            if !keyword(input, "AS") {
                return Err(unsupported());
            }
            Statement::Parameter {
                param,
                field,
                alias: identifier(input).ok_or_else(unsupported)?,
            }
        } else {
            let column = identifier(input).ok_or_else(unsupported)?;
            if !(keyword(input, "FROM")
                && keyword(input, "UNNEST")
                && symbol(input, '(')
                && keyword(input, "GENERATE_ARRAY")
                && symbol(input, '('))
            {
                return Err(unsupported());
            }
            let start = integer(input).ok_or_else(unsupported)?;
            if !symbol(input, ',') {
                return Err(unsupported());
            }
            let end = integer(input).ok_or_else(unsupported)?;
            if !(symbol(input, ')') && symbol(input, ')') && keyword(input, "AS")) {
                return Err(unsupported());
            }
            let alias = identifier(input).ok_or_else(unsupported)?;
            if alias != column {
                return Err(Error::msg(format!(
                    "Unrecognized name `{column}`, the array is aliased as `{alias}`"
                )));
            }
            Statement::GenerateArray { column, start, end }
        };
        symbol(input, ';');
        if !input.trim_start().is_empty() {
            return Err(unsupported());
        }
        Ok(statement)
    }
}

fn keyword(input: &mut &str, word: &str) -> bool {
    let trimmed = input.trim_start();
    match trimmed.get(..word.len()) {
        Some(head)
            if head.eq_ignore_ascii_case(word)
                && !trimmed[word.len()..].starts_with(|c: char| c.is_alphanumeric() || c == '_') =>
        {
            *input = &trimmed[word.len()..];
            true
        }
        _ => false,
    }
}

fn symbol(input: &mut &str, symbol: char) -> bool {
    let trimmed = input.trim_start();
    match trimmed.strip_prefix(symbol) {
        Some(rest) => {
            *input = rest;
            true
        }
        None => false,
    }
}

fn identifier(input: &mut &str) -> Option<String> {
    *input = input.trim_start();
    if !input.starts_with(|c: char| c.is_alphabetic() || c == '_') {
        return None;
    }
    Some(consume_while(input, |c| c.is_alphanumeric() || *c == '_').to_string())
}

fn integer(input: &mut &str) -> Option<i64> {
    let mut attempt = input.trim_start();
    let sign = if symbol(&mut attempt, '-') { -1 } else { 1 };
    let digits = consume_while(&mut attempt, char::is_ascii_digit);
    let value = digits.parse::<i64>().ok()? * sign;
    *input = attempt;
    Some(value)
}
