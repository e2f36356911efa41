use crate::model::{TIMESTAMP_HEADER, Table};
use crate::render::PLACEHOLDER;
use std::io::{self, Write};

/// Write the table as delimiter separated values.
///
/// Values are written verbatim; they never contain the separator in practice
/// so there is no quoting.
pub fn render_csv<W: Write>(
    out: &mut W,
    table: &Table,
    separator: &str,
    sorted: bool,
) -> io::Result<()> {
    let mut header = vec![TIMESTAMP_HEADER.to_string()];
    header.extend(table.columns().iter().map(|c| c.key.to_string()));
    writeln!(out, "{}", header.join(separator))?;

    for row in table.rows(sorted) {
        let mut line = vec![row.timestamp.as_str()];
        line.extend((0..table.columns().len()).map(|i| row.get(i).unwrap_or(PLACEHOLDER)));
        writeln!(out, "{}", line.join(separator))?;
    }

    Ok(())
}
