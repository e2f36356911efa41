//! Fixed-width report with a minimum/maximum footer.
//!
//! Layout:
//!
//! ```text
//!
//! timestamp  hana   hana
//!           current max
//! ========= ======= ====
//! T1            100    -
//!
//!            hana   hana
//!           current max
//! ========= ======= ====
//!   minimum     100    -
//!   maximum     100    -
//! ```

use crate::model::{Column, Extrema, TIMESTAMP_HEADER, Table};
use crate::render::PLACEHOLDER;
use std::io::{self, Write};

/// Write the human-readable report.
pub fn render_table<W: Write>(out: &mut W, table: &Table, sorted: bool) -> io::Result<()> {
    let ts_width = table.timestamp_width();
    let columns = table.columns();
    let blank = " ".repeat(ts_width);

    let cgroups = header_line(columns, |c| c.key.cgroup.as_str());
    let params = header_line(columns, |c| c.key.param.as_str());
    let rule = join(
        std::iter::once("=".repeat(ts_width))
            .chain(columns.iter().map(|c| "=".repeat(c.width))),
    );

    writeln!(out)?;
    writeln!(out, "{:^ts_width$} {}", TIMESTAMP_HEADER, cgroups)?;
    writeln!(out, "{} {}", blank, params)?;
    writeln!(out, "{}", rule)?;

    let mut extrema: Vec<Extrema> = vec![Extrema::default(); columns.len()];
    for row in table.rows(sorted) {
        let cells = columns.iter().zip(extrema.iter_mut()).enumerate().map(|(i, (c, e))| {
            let value = row.get(i);
            if let Some(v) = value {
                e.observe(v);
            }
            right(value.unwrap_or(PLACEHOLDER), c.width)
        });
        let cells = join(cells);
        writeln!(out, "{:<ts_width$} {}", row.timestamp, cells)?;
    }

    writeln!(out)?;
    writeln!(out, "{} {}", blank, cgroups)?;
    writeln!(out, "{} {}", blank, params)?;
    writeln!(out, "{}", rule)?;

    let minimum = summary_line(columns, extrema.iter().map(|e| e.min()));
    let maximum = summary_line(columns, extrema.iter().map(|e| e.max()));
    writeln!(out, "{:>ts_width$} {}", "minimum", minimum)?;
    writeln!(out, "{:>ts_width$} {}", "maximum", maximum)?;

    Ok(())
}

fn header_line(columns: &[Column], text: impl Fn(&Column) -> &str) -> String {
    join(columns.iter().map(|c| format!("{:^width$}", text(c), width = c.width)))
}

fn summary_line<'a>(columns: &[Column], values: impl Iterator<Item = Option<&'a str>>) -> String {
    join(
        columns
            .iter()
            .zip(values)
            .map(|(c, v)| right(v.unwrap_or(PLACEHOLDER), c.width)),
    )
}

fn right(text: &str, width: usize) -> String {
    format!("{:>width$}", text)
}

fn join(cells: impl Iterator<Item = String>) -> String {
    cells.collect::<Vec<_>>().join(" ")
}
