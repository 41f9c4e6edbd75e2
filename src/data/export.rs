use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use super::model::{Column, RelianceRecord, ReviewDataset};

/// One exported line. Field order follows [`Column::ALL`].
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    #[serde(rename = "Ref")]
    reference: Option<&'a str>,
    #[serde(rename = "Explanation Modality")]
    modality: Option<&'a str>,
    #[serde(rename = "Explanation Format")]
    format: Option<&'a str>,
    #[serde(rename = "AI Model")]
    ai_model: Option<&'a str>,
    #[serde(rename = "Application Domain")]
    domain: Option<&'a str>,
    #[serde(rename = "XAI Type")]
    xai_type: Option<&'a str>,
    #[serde(rename = "XAI Technique")]
    xai_technique: Option<&'a str>,
    #[serde(rename = "XAI Method")]
    xai_method: Option<&'a str>,
    #[serde(rename = "Decision-Making Task")]
    task: Option<&'a str>,
    #[serde(rename = "Audience")]
    audience: Option<&'a str>,
    #[serde(rename = "Reliance Type")]
    reliance_type: &'a str,
    #[serde(rename = "Reliance Effect")]
    effect: &'a str,
}

impl<'a> From<&'a RelianceRecord> for ExportRow<'a> {
    fn from(record: &'a RelianceRecord) -> Self {
        let attrs = &record.attributes;
        ExportRow {
            reference: attrs.reference.as_deref(),
            modality: attrs.modality.as_deref(),
            format: attrs.format.as_deref(),
            ai_model: attrs.ai_model.as_deref(),
            domain: attrs.domain.as_deref(),
            xai_type: attrs.xai_type.as_deref(),
            xai_technique: attrs.xai_technique.as_deref(),
            xai_method: attrs.xai_method.as_deref(),
            task: attrs.task.as_deref(),
            audience: attrs.audience.as_deref(),
            reliance_type: record.reliance_type.header(),
            effect: &record.effect,
        }
    }
}

/// Write the given long-table rows as CSV with the long-table headers.
/// Missing cells are written empty.
pub fn write_csv<W: Write>(writer: W, dataset: &ReviewDataset, rows: &[usize]) -> Result<()> {
    // Header written by hand so an empty selection still gets one.
    let mut out = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    out.write_record(Column::ALL.iter().map(|c| c.header()))
        .context("writing CSV header")?;

    for &idx in rows {
        let record = dataset
            .records()
            .get(idx)
            .with_context(|| format!("row {idx} is out of range"))?;
        out.serialize(ExportRow::from(record))
            .with_context(|| format!("writing row {idx}"))?;
    }

    out.flush().context("flushing CSV")?;
    Ok(())
}

/// Export rows of the dataset to a CSV file at `path`.
pub fn export_csv(path: &Path, dataset: &ReviewDataset, rows: &[usize]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_csv(file, dataset, rows)?;
    log::info!("Exported {} rows to {}", rows.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::study;

    #[test]
    fn writes_header_and_selected_rows() {
        let ds = ReviewDataset::from_studies(&[
            study("R1", "Visual", "Heatmap", ["Increase", "", "Decrease"]),
            study("", "Textual", "Rules", ["", "Decrease", ""]),
        ]);
        let mut buf = Vec::new();
        write_csv(&mut buf, &ds, &[1, 2]).expect("export");
        let text = String::from_utf8(buf).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Ref,Explanation Modality,Explanation Format"));
        assert!(lines[0].ends_with("Reliance Type,Reliance Effect"));
        assert!(lines[1].starts_with("R1,Visual,Heatmap"));
        assert!(lines[1].ends_with("Appropriate reliance,Decrease"));
        assert!(lines[2].starts_with(",Textual,Rules"));
    }

    #[test]
    fn empty_selection_still_writes_header() {
        let ds = ReviewDataset::from_studies(&[study("R1", "Visual", "Heatmap", ["Increase", "", ""])]);
        let mut buf = Vec::new();
        write_csv(&mut buf, &ds, &[]).expect("export");
        let text = String::from_utf8(buf).expect("utf8");
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn exported_columns_line_up_with_headers() {
        let ds = ReviewDataset::from_studies(&[study("", "Visual", "", ["", "Increase", ""])]);
        let mut buf = Vec::new();
        write_csv(&mut buf, &ds, &[0]).expect("export");

        let mut reader = csv::Reader::from_reader(buf.as_slice());
        let headers = reader.headers().expect("headers").clone();
        let row = reader.records().next().expect("one row").expect("valid row");
        assert_eq!(headers.len(), Column::ALL.len());
        assert_eq!(row.len(), Column::ALL.len());
        for (i, column) in Column::ALL.iter().enumerate() {
            assert_eq!(&headers[i], column.header());
            assert_eq!(&row[i], ds.records()[0].value(*column).unwrap_or(""));
        }
    }

    #[test]
    fn out_of_range_row_is_an_error() {
        let ds = ReviewDataset::from_studies(&[study("R1", "Visual", "Heatmap", ["Increase", "", ""])]);
        assert!(write_csv(Vec::new(), &ds, &[5]).is_err());
    }

    #[test]
    fn export_creates_file() {
        let ds = ReviewDataset::from_studies(&[study("R1", "Visual", "Heatmap", ["Increase", "", ""])]);
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("filtered.csv");
        export_csv(&path, &ds, &[0]).expect("export");
        let text = std::fs::read_to_string(&path).expect("read back");
        assert_eq!(text.lines().count(), 2);
    }
}
