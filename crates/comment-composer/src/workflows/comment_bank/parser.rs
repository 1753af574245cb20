use serde::{Deserialize, Deserializer};
use std::io::Read;

#[derive(Debug, Deserialize)]
pub(crate) struct OutcomeRow {
    #[serde(rename = "Lower Range")]
    pub(crate) lower_range: i32,
    #[serde(rename = "Upper Range")]
    pub(crate) upper_range: i32,
    #[serde(rename = "Comment")]
    pub(crate) comment: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PersonalizedRow {
    #[serde(rename = "Comment")]
    pub(crate) comment: String,
    #[serde(rename = "Rating", default, deserialize_with = "blank_as_none")]
    pub(crate) rating: Option<f64>,
}

pub(crate) fn parse_rows<R, T>(reader: R) -> Result<Vec<T>, csv::Error>
where
    R: Read,
    T: for<'de> Deserialize<'de>,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    csv_reader.deserialize::<T>().collect()
}

/// Spreadsheet exports leave invisible characters behind; they would defeat duplicate checks.
pub(crate) fn clean_text(value: &str) -> String {
    value
        .replace(['\u{feff}', '\u{200b}'], "")
        .trim()
        .to_string()
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<f64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
