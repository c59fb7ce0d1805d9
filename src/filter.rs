use crate::transcript::Record;

/// Positional and text criteria used to cut a transcript down.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    /// Start at the first record containing this text (case-insensitive).
    pub from: Option<String>,
    /// Stop before the first record containing this text (case-insensitive).
    pub until: Option<String>,
    /// Keep only the last N exchanges.
    pub last: Option<usize>,
}

/// Text a record is matched against: text blocks only, never thinking or tool input.
pub fn plain_text(record: &Record) -> String {
    record.content.text()
}

fn find_match(records: &[Record], needle: &str) -> Option<usize> {
    let needle = needle.to_lowercase();
    records
        .iter()
        .position(|record| plain_text(record).to_lowercase().contains(&needle))
}

/// Apply `from`, then `until`, then `last`. The result is always a contiguous slice.
pub fn apply<'a>(records: &'a [Record], options: &FilterOptions) -> &'a [Record] {
    let mut selected = records;

    if let Some(from) = options.from.as_deref().filter(|s| !s.is_empty())
        && let Some(start) = find_match(selected, from)
    {
        selected = &selected[start..];
    }

    if let Some(until) = options.until.as_deref().filter(|s| !s.is_empty())
        && let Some(end) = find_match(selected, until)
    {
        selected = &selected[..end];
    }

    if let Some(n) = options.last.filter(|&n| n > 0) {
        selected = last_exchanges(selected, n);
    }

    selected
}

/// Slice starting at the N-th user record from the end. With N or fewer user
/// records the input comes back untouched, leading assistant records included.
fn last_exchanges(records: &[Record], n: usize) -> &[Record] {
    let cut = records
        .iter()
        .enumerate()
        .rev()
        .filter(|(_, record)| record.is_user())
        .nth(n - 1)
        .map(|(index, _)| index);

    let users = records.iter().filter(|r| r.is_user()).count();
    match cut {
        Some(index) if users > n => &records[index..],
        _ => records,
    }
}
