//! Naive CSV tokenizer and serializer
//!
//! Lines are split on `'\n'` and fields on `','`. There is no quoting, so a
//! comma or newline inside a value can not be told apart from a separator.

pub const FIELD_SEPARATOR: &str = ",";
pub const LINE_SEPARATOR: &str = "\n";

/// Split raw file text into the header row and the data rows.
///
/// Data rows whose fields are all blank after trimming are dropped. Nothing
/// else is validated, ragged rows are kept as they are.
pub fn parse(text: &str) -> (Vec<String>, Vec<Vec<String>>) {
    let mut lines = text.split(LINE_SEPARATOR).map(split_fields);

    // `split` always yields at least one piece, even for an empty text.
    let headers = lines.next().unwrap_or_else(|| vec![String::new()]);
    let rows = lines.filter(|row| !is_blank(row)).collect();

    (headers, rows)
}

/// Join the header row and the data rows back into file text.
pub fn serialize(headers: &[String], rows: &[Vec<String>]) -> String {
    std::iter::once(headers)
        .chain(rows.iter().map(|r| r.as_slice()))
        .map(|row| row.join(FIELD_SEPARATOR))
        .collect::<Vec<String>>()
        .join(LINE_SEPARATOR)
}

fn split_fields(line: &str) -> Vec<String> {
    line.split(FIELD_SEPARATOR).map(str::to_string).collect()
}

fn is_blank(row: &[String]) -> bool {
    row.iter().all(|field| field.trim().is_empty())
}
