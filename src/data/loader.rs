use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use calamine::{Data, Reader, open_workbook_auto};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{Column, RelianceType, ReviewDataset, Study};

/// Input files whose shape does not match the review schema.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("the file has no header row")]
    EmptyHeader,
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

/// A raw rectangular table as read from disk, before schema mapping.
#[derive(Debug, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a review spreadsheet and melt it.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xls` / `.ods` – first worksheet, first row is the header
/// * `.csv`     – header row, one study per line
/// * `.json`    – `[{ "Ref": "...", "Explanation Modality": "...", ... }, ...]`
/// * `.parquet` – one column per header, string or numeric
pub fn load_file(path: &Path) -> Result<ReviewDataset> {
    let table = read_table(path)?;
    let studies = studies_from_table(&table)?;
    let dataset = ReviewDataset::from_studies(&studies);
    log::info!(
        "Melted {} studies from {} into {} reliance records",
        dataset.study_count(),
        path.display(),
        dataset.len()
    );
    Ok(dataset)
}

/// Read any supported file into a [`RawTable`].
pub fn read_table(path: &Path) -> Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "xlsx" | "xlsm" | "xls" | "ods" => load_workbook(path),
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// Schema mapping
// ---------------------------------------------------------------------------

/// Map a raw table onto [`Study`] rows.
///
/// Header cells are trimmed and `Ref.` is accepted for `Ref`. All ten
/// identifying columns and the three outcome columns must be present;
/// extra columns are ignored. Rows with every cell empty are skipped.
pub fn studies_from_table(table: &RawTable) -> Result<Vec<Study>, SchemaError> {
    if table.headers.iter().all(|h| h.trim().is_empty()) {
        return Err(SchemaError::EmptyHeader);
    }

    let headers: Vec<&str> = table
        .headers
        .iter()
        .map(|h| match h.trim() {
            "Ref." => "Ref",
            other => other,
        })
        .collect();
    let position = |name: &str| headers.iter().position(|h| *h == name);

    let mut missing = Vec::new();
    let mut attribute_idx = Vec::with_capacity(Column::IDENTIFYING.len());
    for column in Column::IDENTIFYING {
        match position(column.header()) {
            Some(idx) => attribute_idx.push((column, idx)),
            None => missing.push(column.header().to_string()),
        }
    }
    let mut outcome_idx = Vec::with_capacity(RelianceType::ALL.len());
    for kind in RelianceType::ALL {
        match position(kind.header()) {
            Some(idx) => outcome_idx.push((kind, idx)),
            None => missing.push(kind.header().to_string()),
        }
    }
    if !missing.is_empty() {
        return Err(SchemaError::MissingColumns(missing));
    }

    let mut studies = Vec::with_capacity(table.rows.len());
    let mut blank = 0usize;
    for row in &table.rows {
        if row.iter().all(Option::is_none) {
            blank += 1;
            continue;
        }
        let cell = |idx: usize| row.get(idx).cloned().flatten();

        let mut study = Study::default();
        for &(column, idx) in &attribute_idx {
            if let Some(slot) = study.attributes.slot_mut(column) {
                *slot = cell(idx);
            }
        }
        for &(kind, idx) in &outcome_idx {
            study.set_outcome(kind, cell(idx));
        }
        studies.push(study);
    }
    if blank > 0 {
        log::debug!("Skipped {blank} blank rows");
    }

    Ok(studies)
}

/// Trim a text cell; blank cells become `None`.
fn text_cell(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Render a float the way a spreadsheet shows it: whole numbers without `.0`.
fn float_cell(v: f64) -> Option<String> {
    if v.is_nan() {
        return None;
    }
    if v.fract() == 0.0 && v.abs() < 1e15 {
        Some(format!("{}", v as i64))
    } else {
        Some(v.to_string())
    }
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

fn load_workbook(path: &Path) -> Result<RawTable> {
    let mut workbook = open_workbook_auto(path).context("opening workbook")?;
    let range = workbook
        .worksheet_range_at(0)
        .context("workbook has no worksheets")?
        .context("reading first worksheet")?;

    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(header_row) => header_row
            .iter()
            .map(|c| workbook_cell(c).unwrap_or_default())
            .collect(),
        None => Vec::new(),
    };
    let rows = rows
        .map(|row| row.iter().map(workbook_cell).collect())
        .collect();

    Ok(RawTable { headers, rows })
}

fn workbook_cell(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => text_cell(s),
        Data::Float(f) => float_cell(*f),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        other => text_cell(&other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(record.iter().map(text_cell).collect());
    }

    Ok(RawTable { headers, rows })
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`:
///
/// ```json
/// [
///   { "Ref": "R1", "Explanation Modality": "Visual", "Over-reliance": "Increase", ... },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(|rec| rec.as_object())
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).and_then(json_cell))
                .collect()
        })
        .collect();

    Ok(RawTable { headers, rows })
}

fn json_cell(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::Null => None,
        JsonValue::String(s) => text_cell(s),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Some(i.to_string()),
            None => n.as_f64().and_then(float_cell),
        },
        JsonValue::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .map(|col| arrow_cell(col, row))
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("Row {row}"))?;
            rows.push(cells);
        }
    }

    Ok(RawTable { headers, rows })
}

/// Extract a single cell from an Arrow column as text.
fn arrow_cell(col: &Arc<dyn Array>, row: usize) -> Result<Option<String>> {
    if col.is_null(row) {
        return Ok(None);
    }
    let cell = match col.data_type() {
        DataType::Utf8 => text_cell(col.as_string::<i32>().value(row)),
        DataType::LargeUtf8 => text_cell(col.as_string::<i64>().value(row)),
        DataType::Int32 => Some(col.as_primitive::<Int32Type>().value(row).to_string()),
        DataType::Int64 => Some(col.as_primitive::<Int64Type>().value(row).to_string()),
        DataType::Float32 => float_cell(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => float_cell(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => Some(col.as_boolean().value(row).to_string()),
        // Dictionary-encoded categoricals and anything else go through Arrow's formatter.
        _ => {
            let text = arrow::util::display::array_value_to_string(col, row)
                .context("formatting parquet cell")?;
            text_cell(&text)
        }
    };
    Ok(cell)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use arrow::array::{Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    const HEADER: &str = "Ref.,Explanation Modality,Explanation Format,AI Model,Application Domain,\
XAI Type,XAI Technique,XAI Method,Decision-Making Task,Audience,Over-reliance,Under-reliance,\
Appropriate reliance";

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .expect("temp file");
        file.write_all(contents.as_bytes()).expect("write fixture");
        file
    }

    #[test]
    fn csv_with_dotted_ref_header_loads_and_melts() {
        let file = write_temp(
            ".csv",
            &format!(
                "{HEADER}\n\
R1,Visual,Heatmap,CNN,Healthcare,Post-hoc,Attribution,SHAP,Diagnosis,Experts,Increase,,Decrease\n\
R2,Textual,Rules,GBM,Finance,Intrinsic,Rules,Anchors,Loan approval,Lay users,, Decrease ,\n"
            ),
        );
        let ds = load_file(file.path()).expect("load csv");

        assert_eq!(ds.study_count(), 2);
        assert_eq!(ds.len(), 3);
        let r2 = &ds.records()[2];
        assert_eq!(r2.value(Column::Ref), Some("R2"));
        assert_eq!(r2.reliance_type, RelianceType::UnderReliance);
        assert_eq!(r2.effect, "Decrease");
    }

    #[test]
    fn short_csv_rows_pad_with_missing_cells() {
        let file = write_temp(
            ".csv",
            &format!("{HEADER}\nR1,Visual,Heatmap,CNN,Healthcare,Post-hoc,Attribution,SHAP,Diagnosis,Experts,Increase\n"),
        );
        let ds = load_file(file.path()).expect("load csv");
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records()[0].reliance_type, RelianceType::OverReliance);
    }

    #[test]
    fn blank_rows_are_skipped() {
        let table = RawTable {
            headers: HEADER.split(',').map(str::to_string).collect(),
            rows: vec![vec![None; 13]],
        };
        assert!(studies_from_table(&table).expect("schema ok").is_empty());
    }

    #[test]
    fn missing_columns_are_all_reported() {
        let table = RawTable {
            headers: vec!["Ref".into(), "Explanation Modality".into(), "Audience".into()],
            rows: Vec::new(),
        };
        let err = studies_from_table(&table).expect_err("schema should be rejected");
        let missing = match err {
            SchemaError::MissingColumns(missing) => missing,
            other => panic!("unexpected error: {other}"),
        };
        assert_eq!(missing.len(), 10);
        assert!(missing.contains(&"Explanation Format".to_string()));
        assert!(missing.contains(&"Appropriate reliance".to_string()));
    }

    #[test]
    fn empty_header_is_rejected() {
        let table = RawTable::default();
        assert_eq!(studies_from_table(&table), Err(SchemaError::EmptyHeader));
    }

    #[test]
    fn json_records_load_with_numeric_refs() {
        let file = write_temp(
            ".json",
            r#"[
  {"Ref": 7, "Explanation Modality": "Visual", "Explanation Format": "Saliency map",
   "AI Model": "CNN", "Application Domain": "Healthcare", "XAI Type": "Post-hoc",
   "XAI Technique": "Attribution", "XAI Method": "Grad-CAM", "Decision-Making Task": "Diagnosis",
   "Audience": "Experts", "Over-reliance": null, "Under-reliance": "Increase",
   "Appropriate reliance": ""}
]"#,
        );
        let ds = load_file(file.path()).expect("load json");
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records()[0].value(Column::Ref), Some("7"));
        assert_eq!(ds.records()[0].reliance_type, RelianceType::UnderReliance);
    }

    #[test]
    fn parquet_columns_load_as_text() {
        let mut fields = Vec::new();
        let mut columns: Vec<Arc<dyn Array>> = Vec::new();
        fields.push(Field::new("Ref", DataType::Int64, false));
        columns.push(Arc::new(Int64Array::from(vec![1, 2])));
        for header in HEADER.split(',').skip(1) {
            fields.push(Field::new(header, DataType::Utf8, true));
            let values: Vec<Option<&str>> = match header {
                "Over-reliance" => vec![Some("Increase"), None],
                "Under-reliance" => vec![None, None],
                "Appropriate reliance" => vec![Some("Decrease"), Some("Increase")],
                _ => vec![Some("x"), Some("y")],
            };
            columns.push(Arc::new(StringArray::from(values)));
        }
        let schema = Arc::new(Schema::new(fields));
        let batch = RecordBatch::try_new(schema.clone(), columns).expect("batch");

        let file = tempfile::Builder::new()
            .suffix(".parquet")
            .tempfile()
            .expect("temp file");
        let mut writer =
            ArrowWriter::try_new(file.reopen().expect("reopen"), schema, None).expect("writer");
        writer.write(&batch).expect("write batch");
        writer.close().expect("close writer");

        let ds = load_file(file.path()).expect("load parquet");
        assert_eq!(ds.study_count(), 2);
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.records()[2].value(Column::Ref), Some("2"));
        assert_eq!(ds.records()[2].value(Column::Modality), Some("y"));
    }

    #[test]
    fn xlsx_workbook_loads_with_numeric_ref_and_padded_cells() {
        let file = tempfile::Builder::new()
            .suffix(".xlsx")
            .tempfile()
            .expect("temp file");

        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, header) in HEADER.split(',').enumerate() {
            sheet.write_string(0, col as u16, header).expect("header cell");
        }
        sheet.write_number(1, 0, 7.0).expect("ref cell");
        let attributes = [
            "Visual", "Saliency map", "CNN", "Healthcare", "Post-hoc",
            "Attribution", "Grad-CAM", "Diagnosis", "Experts",
        ];
        for (offset, value) in attributes.iter().enumerate() {
            sheet.write_string(1, 1 + offset as u16, *value).expect("attribute cell");
        }
        // Over-reliance (col 10) left blank.
        sheet.write_string(1, 11, "  Increase ").expect("under cell");
        sheet.write_string(1, 12, "Decrease").expect("appropriate cell");
        workbook.save(file.path()).expect("save workbook");

        let ds = load_file(file.path()).expect("load xlsx");
        assert_eq!(ds.study_count(), 1);
        assert_eq!(ds.len(), 2);

        let under = &ds.records()[0];
        assert_eq!(under.value(Column::Ref), Some("7"));
        assert_eq!(under.value(Column::Format), Some("Saliency map"));
        assert_eq!(under.reliance_type, RelianceType::UnderReliance);
        assert_eq!(under.effect, "Increase");

        let appropriate = &ds.records()[1];
        assert_eq!(appropriate.reliance_type, RelianceType::AppropriateReliance);
        assert_eq!(appropriate.effect, "Decrease");
    }

    #[test]
    fn unknown_extension_is_an_error() {
        let file = write_temp(".txt", "nothing");
        assert!(load_file(file.path()).is_err());

        let binary_workbook = write_temp(".xlsb", "nothing");
        let err = load_file(binary_workbook.path()).expect_err("xlsb is not offered");
        assert!(err.to_string().contains("Unsupported file extension"));
    }

    #[test]
    fn floats_render_like_spreadsheet_cells() {
        assert_eq!(float_cell(3.0).as_deref(), Some("3"));
        assert_eq!(float_cell(2.5).as_deref(), Some("2.5"));
        assert_eq!(float_cell(f64::NAN), None);
    }
}
