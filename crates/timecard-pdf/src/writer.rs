//! PDF output
//!
//! Builds a fresh single-page document from records and a structure model:
//! header row, one record per row at the model's column positions, a totals
//! line underneath. The file is materialized through a temporary file in the
//! target directory and persisted only on full success.

use std::io::Write;
use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use timecard_types::AttendanceRecord;

use crate::analyzer::StructureModel;
use crate::error::PdfError;
use crate::fonts;
use crate::rtl;

/// Render records and write the result to `path` atomically.
pub fn write_records(
    records: &[AttendanceRecord],
    model: &StructureModel,
    path: &Path,
) -> Result<(), PdfError> {
    if records.is_empty() {
        return Err(PdfError::Operation("no records to write".into()));
    }
    let bytes = render(records, model)?;

    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(dir) = dir {
        std::fs::create_dir_all(dir)?;
    }
    let mut tmp = match dir {
        Some(dir) => NamedTempFile::new_in(dir)?,
        None => NamedTempFile::new()?,
    };
    tmp.write_all(&bytes)?;
    tmp.persist(path).map_err(|e| PdfError::Io(e.error))?;

    info!(path = %path.display(), records = records.len(), "PDF written");
    Ok(())
}

/// Render records to PDF bytes without touching the filesystem.
pub fn render(records: &[AttendanceRecord], model: &StructureModel) -> Result<Vec<u8>, PdfError> {
    let font = fonts::resolve_with_chain(&model.font_name, fonts::FALLBACK_CHAIN)?;
    debug!(font, columnar = model.is_columnar(), "rendering document");

    let mut operations = Vec::new();
    if model.is_columnar() {
        render_table(records, model, &mut operations);
    } else {
        render_lines(records, model, &mut operations);
    }

    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => font,
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        content
            .encode()
            .map_err(|e| PdfError::Operation(format!("content encode: {}", e)))?,
    ));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![
            0.into(),
            0.into(),
            Object::Real(model.page_width as f32),
            Object::Real(model.page_height as f32),
        ],
        "Contents" => content_id,
        "Resources" => resources_id,
    });

    let pages = dictionary! {
        "Type" => "Pages",
        "Count" => 1,
        "Kids" => vec![Object::Reference(page_id)],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| PdfError::Operation(format!("document save: {}", e)))?;
    Ok(buffer)
}

fn render_table(records: &[AttendanceRecord], model: &StructureModel, ops: &mut Vec<Operation>) {
    // Text-showing operations must come out in reading order: extractors
    // recover text in operation order, not by position.
    for column in &model.columns {
        draw_text(ops, model, column.x, model.row_y(0), &column.label);
    }
    for (row, record) in records.iter().enumerate() {
        for (col, column) in model.columns.iter().enumerate() {
            if let Some(cell) = cell_text(record, col) {
                draw_text(ops, model, column.x, model.row_y(row + 1), &cell);
            }
        }
    }
    draw_totals(records, model, records.len() + 1, ops);
}

fn render_lines(records: &[AttendanceRecord], model: &StructureModel, ops: &mut Vec<Operation>) {
    for (row, record) in records.iter().enumerate() {
        let dto = record.to_dto();
        let mut parts = vec![dto.date];
        parts.extend(dto.start);
        parts.extend(dto.end);
        parts.extend(dto.break_duration);
        draw_text(ops, model, model.left_margin, model.row_y(row), &parts.join("  "));
    }
    draw_totals(records, model, records.len(), ops);
}

fn draw_totals(
    records: &[AttendanceRecord],
    model: &StructureModel,
    row: usize,
    ops: &mut Vec<Operation>,
) {
    let total: f64 = records.iter().filter_map(AttendanceRecord::worked_hours).sum();
    let text = format!("Total hours: {:.2}", total);
    draw_text(ops, model, model.left_margin, model.row_y(row + 1), &text);
}

/// Field text for one record cell, matching the column order Date, Start,
/// End, Break.
fn cell_text(record: &AttendanceRecord, column: usize) -> Option<String> {
    let dto = record.to_dto();
    match column {
        0 => Some(dto.date),
        1 => dto.start,
        2 => dto.end,
        3 => dto.break_duration,
        _ => None,
    }
}

fn draw_text(ops: &mut Vec<Operation>, model: &StructureModel, x: f64, y: f64, text: &str) {
    let visual = rtl::to_visual_order(text);
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new(
        "Tf",
        vec![
            Object::Name(b"F1".to_vec()),
            Object::Real(model.font_size as f32),
        ],
    ));
    ops.push(Operation::new(
        "Td",
        vec![Object::Real(x as f32), Object::Real(y as f32)],
    ));
    ops.push(Operation::new(
        "Tj",
        vec![Object::String(visual.into_bytes(), StringFormat::Literal)],
    ));
    ops.push(Operation::new("ET", vec![]));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, NaiveTime};
    use pretty_assertions::assert_eq;

    use crate::geometry::{first_page_fragments, fragments_to_lines};

    fn record(day: u32, start: (u32, u32), end: (u32, u32)) -> AttendanceRecord {
        AttendanceRecord {
            date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            start: NaiveTime::from_hms_opt(start.0, start.1, 0),
            end: NaiveTime::from_hms_opt(end.0, end.1, 0),
            break_duration: Some(Duration::minutes(30)),
        }
    }

    #[test]
    fn test_render_produces_loadable_pdf() {
        let records = vec![record(1, (8, 0), (17, 0)), record(2, (8, 30), (16, 45))];
        let bytes = render(&records, &StructureModel::default()).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_rendered_rows_carry_record_fields() {
        let records = vec![record(1, (8, 0), (17, 0))];
        let bytes = render(&records, &StructureModel::default()).unwrap();
        let (fragments, _) = first_page_fragments(&bytes).unwrap();
        let lines = fragments_to_lines(&fragments, 2.0);

        assert_eq!(lines[0], "Date Start End Break");
        assert_eq!(lines[1], "2024-05-01 08:00 17:00 00:30");
    }

    #[test]
    fn test_cells_are_emitted_in_reading_order() {
        let records = vec![record(1, (8, 0), (17, 0)), record(2, (8, 30), (16, 45))];
        let bytes = render(&records, &StructureModel::default()).unwrap();
        // Fragments come back in content-stream order: header row, then each
        // record's cells left to right, row by row.
        let (fragments, _) = first_page_fragments(&bytes).unwrap();
        let texts: Vec<&str> = fragments.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(
            &texts[..12],
            &[
                "Date", "Start", "End", "Break",
                "2024-05-01", "08:00", "17:00", "00:30",
                "2024-05-02", "08:30", "16:45", "00:30",
            ][..]
        );
    }

    #[test]
    fn test_totals_row_sums_net_hours() {
        // 9h minus 30m break, twice.
        let records = vec![record(1, (8, 0), (17, 0)), record(2, (8, 0), (17, 0))];
        let bytes = render(&records, &StructureModel::default()).unwrap();
        let (fragments, _) = first_page_fragments(&bytes).unwrap();
        let lines = fragments_to_lines(&fragments, 2.0);
        assert_eq!(lines.last().unwrap(), "Total hours: 17.00");
    }

    #[test]
    fn test_empty_record_list_is_an_error() {
        let err = write_records(&[], &StructureModel::default(), Path::new("out.pdf")).unwrap_err();
        assert!(matches!(err, PdfError::Operation(_)));
    }

    #[test]
    fn test_write_records_persists_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pdf");
        let records = vec![record(1, (8, 0), (17, 0))];
        write_records(&records, &StructureModel::default(), &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(Document::load_mem(&bytes).is_ok());
    }
}
