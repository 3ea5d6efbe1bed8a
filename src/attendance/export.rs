use std::borrow::Cow;

use strum_macros::{AsRefStr, Display, EnumString};

use super::stats::ExportRow;

pub const CSV_HEADER: [&str; 5] = [
    "Employé",
    "Date",
    "Heure d'arrivée",
    "Horaire de référence",
    "Statut",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum CsvDialect {
    /// Fields joined with commas as-is. A comma inside a name breaks the row;
    /// kept for consumers that expect the historical byte layout.
    Legacy,
    /// Fields containing a comma, quote or line break are quoted.
    #[default]
    Rfc4180,
}

impl CsvDialect {
    fn field<'a>(self, value: &'a str) -> Cow<'a, str> {
        match self {
            CsvDialect::Legacy => Cow::Borrowed(value),
            CsvDialect::Rfc4180 => {
                if value.contains([',', '"', '\r', '\n']) {
                    Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
                } else {
                    Cow::Borrowed(value)
                }
            }
        }
    }

    fn line(self, fields: &[&str]) -> String {
        fields
            .iter()
            .map(|f| self.field(f))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Renders the daily report, or `None` when there is nothing to report.
pub fn render_csv(rows: &[ExportRow], dialect: CsvDialect) -> Option<String> {
    if rows.is_empty() {
        return None;
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(dialect.line(&CSV_HEADER));
    for row in rows {
        lines.push(dialect.line(&[
            row.employee_name.as_str(),
            row.date.as_str(),
            row.time.as_str(),
            row.reference_time_snapshot.as_str(),
            row.status.report_label(),
        ]));
    }

    Some(lines.join("\n"))
}

pub fn export_file_name(date: &str) -> String {
    format!("pointages_{date}.csv")
}
