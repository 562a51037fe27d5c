//! Indentation and truncation of the rendered text

/// Prefix repeated once per depth level of a node
pub const INDENT: &str = "  ";

/// Number of characters kept from a name made only of hexadecimal characters (e.g. a container ID)
pub const SHORT_ID_LENGTH: usize = 12;

/// Appended to a name cut to fit its column
const TRUNCATION_MARK: &str = "..";

/// Returns the prefix displayed before the name of a node at the given depth
pub fn indent(depth: usize) -> String {
    INDENT.repeat(depth)
}

/// Keeps only the first characters of a name made exclusively of hexadecimal characters, which is
/// how container runtimes name their nodes. Other names are returned unchanged.
pub fn shorten_name(name: &str) -> &str {
    if !name.is_empty() && name.chars().all(|c| c.is_ascii_hexdigit()) {
        &name[..name.len().min(SHORT_ID_LENGTH)]
    } else {
        name
    }
}

/// Cuts `name` so that it holds in `width` characters, marking that it was cut
pub fn fit_name(name: &str, width: usize) -> String {
    if name.chars().count() <= width {
        return name.to_string();
    }

    match width.checked_sub(TRUNCATION_MARK.len()) {
        Some(kept) if kept > 0 => format!("{}{}", name.chars().take(kept).collect::<String>(), TRUNCATION_MARK),
        _ => name.chars().take(width).collect(),
    }
}

/// Cuts a line so that it does not exceed `width` characters
pub fn truncate_line(line: &str, width: usize) -> String {
    line.chars().take(width).collect()
}
