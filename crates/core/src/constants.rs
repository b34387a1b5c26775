//! Constants used throughout the cartão core crate.
//!
//! Labels here are part of the backend contract or of the exported file format, so
//! changing any of them breaks compatibility with existing data or spreadsheets.

/// Category shown when the operator does not pick one.
pub const DEFAULT_CATEGORY: &str = "Nacional";

/// pt-BR calendar date, the locale the cards are printed in.
pub const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y";

/// Wire format of `data_aplicacao` as emitted by the backend.
pub const WIRE_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Plain calendar date accepted on input.
pub const WIRE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Top-left header cell of both the screen table and the CSV.
pub const GRID_CORNER_LABEL: &str = "Dose/Vacina";

/// Cell prefix for an applied dose, followed by the formatted date.
pub const APPLIED_LABEL: &str = "Aplicada";

/// Cell text for a missed dose.
pub const MISSED_LABEL: &str = "Faltoso";

/// Field delimiter; comma is the decimal separator in the target locale.
pub const CSV_DELIMITER: char = ';';

/// Prefix of exported file names.
pub const CSV_FILE_PREFIX: &str = "cartao_vacinacao";

pub const CSV_PERSON_NAME_LABEL: &str = "Nome";
pub const CSV_PERSON_ID_LABEL: &str = "ID";
pub const CSV_PERSON_IDENTIFICATION_LABEL: &str = "Número de Identificação";

/// Column widths of the backend tables.
pub const MAX_NAME_LEN: usize = 100;
pub const MAX_IDENTIFICATION_LEN: usize = 50;
