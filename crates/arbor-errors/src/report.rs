use std::io::{self, Write};

use crate::Location;

/// Writes `FILE:LINE: MESSAGE` followed by the located source lines, each
/// underlined with carets.
///
/// Columns before the span are blanked, columns inside it become `^`, and
/// tabs are kept so the carets line up with the echoed text. On the first
/// line the span starts at the first column, on the last it stops at the last
/// column, and lines in between are underlined in full.
///
/// Bytes that are not UTF-8 are echoed as `U+FFFD`.
///
/// Without a file the header uses `<file>` and nothing else is printed. A
/// file that cannot be read, or a span starting past its end, also leaves
/// just the header.
pub fn report_error(
    out: &mut impl Write,
    message: &str,
    location: Option<&Location>,
) -> io::Result<()> {
    let Some(location) = location else {
        return writeln!(out, "<file>: {message}");
    };
    writeln!(out, "{location}: {message}")?;

    let Some(file) = location.file() else { return Ok(()) };
    let text = match std::fs::read(file) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(err) => {
            tracing::debug!(%file, %err, "cannot echo source for diagnostic");
            return Ok(());
        }
    };

    let last_line = location.last_line.max(location.first_line);
    let lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .skip(location.first_line.saturating_sub(1))
        .take_while(|&(line_no, _)| line_no <= last_line);
    let mut echoed = false;
    for (line_no, line) in lines {
        echoed = true;
        let start = if line_no == location.first_line { location.first_column } else { 1 };
        let end = if line_no == last_line { location.last_column } else { line.chars().count() };

        writeln!(out, "{line}")?;
        writeln!(out, "{}", underline(line, start, end))?;
    }
    if !echoed {
        tracing::debug!(%file, line = location.first_line, "diagnostic starts past end of file");
    }
    Ok(())
}

/// [`report_error`] to standard error.
pub fn eprint_error(message: &str, location: Option<&Location>) -> io::Result<()> {
    report_error(&mut io::stderr().lock(), message, location)
}

/// Builds the caret line for 1-based columns `start..=end`.
fn underline(line: &str, start: usize, end: usize) -> String {
    let mut chars = line.chars();
    (1..=end)
        .map(|column| match chars.next() {
            Some('\t') => '\t',
            _ if column < start => ' ',
            _ => '^',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::underline;

    #[test]
    fn underline_keeps_tabs() {
        assert_eq!(underline("\tfoo(bar)", 2, 4), "\t^^^");
        assert_eq!(underline("\tfoo(\tbar)", 6, 10), "\t    \t^^^^");
    }

    #[test]
    fn underline_past_line_end() {
        assert_eq!(underline("ab", 2, 4), " ^^^");
    }

    #[test]
    fn underline_empty_span() {
        assert_eq!(underline("abc", 3, 2), "  ");
    }
}
