pub fn separated_by<T, F>(
    out: &mut String,
    values: impl IntoIterator<Item = T>,
    mut f: F,
    separator: &str,
) where
    F: FnMut(&mut String, T),
{
    let mut len = out.len();
    for v in values {
        if out.len() > len {
            out.push_str(separator);
        }
        len = out.len();
        f(out, v);
    }
}

pub fn consume_while<'s>(input: &mut &'s str, predicate: impl FnMut(&char) -> bool) -> &'s str {
    let len = input
        .chars()
        .take_while(predicate)
        .map(char::len_utf8)
        .sum();
    if len == 0 {
        return "";
    }
    let result = &input[..len];
    *input = &input[len..];
    result
}

/// Longest prefix of `value` with at most `max` characters, and whether something was cut.
pub fn truncate_at(value: &str, max: usize) -> (&str, bool) {
    match value.char_indices().nth(max) {
        Some((i, _)) => (&value[..i], true),
        None => (value, false),
    }
}

#[macro_export]
macro_rules! truncate_long {
    ($query:expr) => {{
        let (head, cut) = $crate::truncate_at(&$query, 497);
        format!("{}{}", head.trim_end(), if cut { "..." } else { "" })
    }};
}
