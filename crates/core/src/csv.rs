//! CSV export of a projected card.
//!
//! Format:
//! - semicolon delimited, every field double-quoted, `"` doubled inside fields
//! - header: `"Dose/Vacina"` followed by the column names
//! - one line per dose slot: display label, then the cell text of each column
//! - a blank line and a three-line person block (name, id, identification number)
//!
//! The semicolon is what spreadsheets expect in locales where the comma is the
//! decimal separator.

use crate::constants::{
    CSV_DELIMITER, CSV_FILE_PREFIX, CSV_PERSON_IDENTIFICATION_LABEL, CSV_PERSON_ID_LABEL,
    CSV_PERSON_NAME_LABEL, GRID_CORNER_LABEL,
};
use crate::{CardConfig, CardError, CardResult, Grid, Person};
use std::fs;
use std::path::{Path, PathBuf};

/// Quote one field.
fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn push_line<'a>(out: &mut String, fields: impl IntoIterator<Item = &'a str>) {
    let line = fields
        .into_iter()
        .map(quote)
        .collect::<Vec<_>>()
        .join(&CSV_DELIMITER.to_string());
    out.push_str(&line);
    out.push('\n');
}

/// Serialise `grid` and the person block.
pub fn to_csv(grid: &Grid, person: &Person, config: &CardConfig) -> String {
    let mut out = String::new();

    push_line(
        &mut out,
        std::iter::once(GRID_CORNER_LABEL).chain(grid.columns.iter().map(String::as_str)),
    );

    for row in &grid.rows {
        let label = row.display_label();
        let texts: Vec<String> = row.cells.iter().map(|cell| cell.text(config)).collect();
        push_line(
            &mut out,
            std::iter::once(label.as_str()).chain(texts.iter().map(String::as_str)),
        );
    }

    out.push('\n');
    let id = person.id.to_string();
    push_line(&mut out, [CSV_PERSON_NAME_LABEL, person.name.as_str()]);
    push_line(&mut out, [CSV_PERSON_ID_LABEL, id.as_str()]);
    push_line(
        &mut out,
        [
            CSV_PERSON_IDENTIFICATION_LABEL,
            person.identification_number.as_str(),
        ],
    );

    out
}

/// `cartao_vacinacao_<name>_<id>.csv`, spaces in the name replaced by `_`.
///
/// Path separators are replaced as well so the result is always a bare file name.
pub fn file_name(person: &Person) -> String {
    let name: String = person
        .name
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            other => other,
        })
        .collect();
    format!("{CSV_FILE_PREFIX}_{name}_{}.csv", person.id)
}

/// Write the export into `dir`, creating it if needed. Returns the written path.
pub fn write_csv(
    dir: &Path,
    grid: &Grid,
    person: &Person,
    config: &CardConfig,
) -> CardResult<PathBuf> {
    fs::create_dir_all(dir).map_err(CardError::ExportDirCreation)?;
    let path = dir.join(file_name(person));
    fs::write(&path, to_csv(grid, person, config)).map_err(CardError::FileWrite)?;
    tracing::info!("wrote card export: {}", path.display());
    Ok(path)
}
