//! Terminal output for command results. Every command prints either one
//! pretty JSON document (`--json`) or the plain-text layouts below.

use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    print!("{}", render_table(headers, rows));
}

pub fn print_fields(fields: &[(&str, String)]) {
    print!("{}", render_fields(fields));
}

/// Left-aligned columns two spaces apart, with a dashed rule under the
/// header. Cells beyond the header count are dropped.
fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(col, h)| {
            rows.iter()
                .filter_map(|row| row.get(col))
                .map(String::len)
                .fold(h.len(), usize::max)
        })
        .collect();

    let line = |cells: Vec<&str>| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{cell:w$}"))
            .collect();
        format!("{}\n", padded.join("  ").trim_end())
    };

    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    let mut out = line(headers.to_vec());
    out.push_str(&line(rule.iter().map(String::as_str).collect()));
    for row in rows {
        out.push_str(&line(row.iter().map(String::as_str).collect()));
    }
    out
}

/// `key:` labels padded to a common width, one field per line.
fn render_fields(fields: &[(&str, String)]) -> String {
    let width = fields.iter().map(|(k, _)| k.len() + 1).max().unwrap_or(0);
    fields
        .iter()
        .map(|(key, value)| format!("{:width$}  {value}\n", format!("{key}:")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_pads_to_widest_cell() {
        let rows = vec![
            vec!["0101-abc".to_string(), "etl".to_string(), "RUNNING".to_string()],
            vec!["0202-def".to_string(), "adhoc-analytics".to_string(), "TERMINATED".to_string()],
        ];
        assert_eq!(
            render_table(&["ID", "NAME", "STATE"], &rows),
            "ID        NAME             STATE\n\
             --------  ---------------  ----------\n\
             0101-abc  etl              RUNNING\n\
             0202-def  adhoc-analytics  TERMINATED\n"
        );
    }

    #[test]
    fn fields_align_values() {
        let out = render_fields(&[
            ("bundle", "db_sp_handler".to_string()),
            ("artifact", "dbfs:/FileStore/jars/a.whl".to_string()),
        ]);
        assert_eq!(
            out,
            "bundle:    db_sp_handler\n\
             artifact:  dbfs:/FileStore/jars/a.whl\n"
        );
    }
}
