//! Reading attribute labels from line-based UTF-8 input.

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use tracing::instrument;

use crate::{Result, error::AuraError};

/// Reads every line of `reader`, stripping `\n` and `\r\n` terminators.
///
/// Blank lines are kept as empty labels. An empty reader yields no lines.
///
/// # Errors
/// Returns any [`io::Error`] raised by the reader, including invalid UTF-8.
///
/// # Examples
/// ```
/// use std::io::Cursor;
/// use aura_core::read_lines;
///
/// let lines = read_lines(Cursor::new("Customer ID\r\nOrder Date\n\n"))?;
/// assert_eq!(lines, ["Customer ID", "Order Date", ""]);
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn read_lines<R: BufRead>(reader: R) -> io::Result<Vec<String>> {
    reader.lines().collect()
}

/// Opens `path` and reads its lines with [`read_lines`].
///
/// # Errors
/// Returns [`AuraError::ReadInput`] when the file cannot be opened or read.
#[instrument(name = "core.read_input", err, fields(path = %path.display()))]
pub fn read_lines_from_path(path: &Path) -> Result<Vec<String>> {
    let wrap = |source| AuraError::ReadInput {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(wrap)?;
    read_lines(BufReader::new(file)).map_err(wrap)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use rstest::rstest;

    #[rstest]
    #[case("alpha\nbeta\n", &["alpha", "beta"])]
    #[case("carriage\r\nreturn\r\n", &["carriage", "return"])]
    #[case("lonely", &["lonely"])]
    #[case("trailing\n\n\n", &["trailing", "", ""])]
    #[case("", &[])]
    fn read_lines_strips_terminators(#[case] raw: &str, #[case] expected: &[&str]) {
        let lines = read_lines(Cursor::new(raw)).expect("reading must succeed");
        assert_eq!(lines, expected);
    }

    #[test]
    fn read_lines_from_path_reports_missing_file() {
        let err = read_lines_from_path(Path::new("/definitely/not/here.txt"))
            .expect_err("missing file must fail");
        assert!(matches!(err, AuraError::ReadInput { .. }));
    }
}
