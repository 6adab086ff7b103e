use crate::data::series::FeatureTable;
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use std::path::Path;

const DATE_FORMAT: &str = "%Y-%m-%d";

//loads a date-indexed numeric table from a csv file
//every column other than the date column must parse as f64
pub fn load_csv<P: AsRef<Path>>(path: P, date_column: &str) -> Result<FeatureTable> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .context(format!("Failed to open CSV file: {:?}", path))?;

    let headers = reader
        .headers()
        .context(format!("Failed to read CSV header of {:?}", path))?
        .clone();

    let date_idx = headers
        .iter()
        .position(|h| h == date_column)
        .ok_or_else(|| anyhow::anyhow!("Date column '{}' not found in {:?}", date_column, path))?;

    let value_names: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != date_idx)
        .map(|(i, h)| (i, h.to_string()))
        .collect();

    let mut rows: Vec<(NaiveDate, Vec<f64>)> = Vec::new();

    for (index, result) in reader.records().enumerate() {
        let line = index + 2;
        let record = result.context(format!("Failed to parse CSV record at line {}", line))?;

        //parse date
        let raw_date = record.get(date_idx).unwrap_or_default();
        let date = NaiveDate::parse_from_str(raw_date.trim(), DATE_FORMAT).context(format!(
            "Failed to parse date '{}' at line {}",
            raw_date, line
        ))?;

        //parse numeric values
        let mut values = Vec::with_capacity(value_names.len());
        for (col_idx, name) in &value_names {
            let raw = record.get(*col_idx).unwrap_or_default().trim();
            let value: f64 = raw.parse().context(format!(
                "Non-numeric value '{}' in column '{}' at line {}",
                raw, name, line
            ))?;
            values.push(value);
        }

        rows.push((date, values));
    }

    if rows.is_empty() {
        bail!("No data rows in {:?}", path);
    }

    //sort by date to ensure chronological order
    rows.sort_by(|a, b| a.0.cmp(&b.0));

    let dates: Vec<NaiveDate> = rows.iter().map(|(date, _)| *date).collect();
    let mut table = FeatureTable::new(dates).context(format!("Invalid date axis in {:?}", path))?;

    for (pos, (_, name)) in value_names.iter().enumerate() {
        let column: Vec<f64> = rows.iter().map(|(_, values)| values[pos]).collect();
        table.insert_column(name.clone(), column)?;
    }

    tracing::debug!(
        rows = table.len(),
        columns = value_names.len(),
        "loaded feature table from {:?}",
        path
    );

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_and_sorts_rows() {
        let file = write_csv(
            "DATE,storage,NG_Spot_Price\n\
             2024-01-12,3100.5,2.70\n\
             2024-01-05,3000.0,2.50\n",
        );

        let table = load_csv(file.path(), "DATE").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.dates()[0],
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
        );
        assert_eq!(table.column("NG_Spot_Price"), Some(&[2.5, 2.7][..]));
        assert_eq!(table.column("storage"), Some(&[3000.0, 3100.5][..]));
    }

    #[test]
    fn rejects_non_numeric_values() {
        let file = write_csv("DATE,price\n2024-01-05,abc\n");
        let err = load_csv(file.path(), "DATE").unwrap_err();
        assert!(format!("{:#}", err).contains("Non-numeric value 'abc'"));
    }

    #[test]
    fn rejects_missing_date_column_and_duplicates() {
        let file = write_csv("Week of,price\n2024-01-05,1.0\n");
        assert!(load_csv(file.path(), "DATE").is_err());

        let file = write_csv("DATE,price\n2024-01-05,1.0\n2024-01-05,2.0\n");
        let err = load_csv(file.path(), "DATE").unwrap_err();
        assert!(format!("{:#}", err).contains("Duplicate date"));
    }
}
