//! XLSX serialization.
//!
//! Writes a [`Workbook`] as an OOXML spreadsheet: a ZIP archive holding
//! the content-types manifest, relationships, workbook and worksheet
//! parts, a minimal stylesheet, and document properties. String cells use
//! inline strings, which keeps the writer single-pass with no shared
//! string table.

use std::io::{Seek, Write};
use std::path::Path;

use quick_xml::escape::escape;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{Error, Result};
use crate::model::{format_number, CellValue, Metadata};

use super::workbook::{Sheet, Workbook};

const SPREADSHEET_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Serialize a workbook into `writer` as a complete `.xlsx` archive.
///
/// Fails if the workbook has no sheets: a valid workbook part must
/// reference at least one worksheet.
pub fn write_to<W: Write + Seek>(
    workbook: &Workbook,
    metadata: Option<&Metadata>,
    writer: W,
) -> Result<()> {
    if workbook.is_empty() {
        return Err(Error::XlsxWrite("workbook has no sheets".to_string()));
    }

    let mut zip = ZipWriter::new(writer);
    // Fixed timestamp keeps output byte-identical across runs
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default());

    let n = workbook.sheet_count();

    zip.start_file("[Content_Types].xml", options)?;
    zip.write_all(content_types(n).as_bytes())?;

    zip.start_file("_rels/.rels", options)?;
    zip.write_all(root_rels().as_bytes())?;

    zip.start_file("xl/workbook.xml", options)?;
    zip.write_all(workbook_part(workbook).as_bytes())?;

    zip.start_file("xl/_rels/workbook.xml.rels", options)?;
    zip.write_all(workbook_rels(n).as_bytes())?;

    zip.start_file("xl/styles.xml", options)?;
    zip.write_all(styles_part().as_bytes())?;

    for (i, sheet) in workbook.sheets().iter().enumerate() {
        zip.start_file(format!("xl/worksheets/sheet{}.xml", i + 1), options)?;
        zip.write_all(worksheet_part(sheet).as_bytes())?;
    }

    zip.start_file("docProps/core.xml", options)?;
    zip.write_all(core_properties(metadata).as_bytes())?;

    zip.start_file("docProps/app.xml", options)?;
    zip.write_all(app_properties().as_bytes())?;

    zip.finish()?;
    Ok(())
}

/// Serialize a workbook to the given path, atomically.
///
/// The archive is written to a temporary file in the destination
/// directory and renamed into place, so a failed write never leaves a
/// partial or corrupt file at the destination.
pub fn save<P: AsRef<Path>>(
    workbook: &Workbook,
    metadata: Option<&Metadata>,
    path: P,
) -> Result<()> {
    let path = path.as_ref();
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());

    let temp = match dir {
        Some(dir) => tempfile::NamedTempFile::new_in(dir)?,
        None => tempfile::NamedTempFile::new_in(".")?,
    };

    write_to(workbook, metadata, temp.as_file())?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    log::info!(
        "wrote {} sheet(s) to {}",
        workbook.sheet_count(),
        path.display()
    );
    Ok(())
}

fn content_types(sheet_count: usize) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
"#,
    );
    for i in 1..=sheet_count {
        xml.push_str(&format!(
            "<Override PartName=\"/xl/worksheets/sheet{}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml\"/>\n",
            i
        ));
    }
    xml.push_str(
        r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
<Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>
</Types>"#,
    );
    xml
}

fn root_rels() -> String {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/>
</Relationships>"#
        .to_string()
}

fn workbook_part(workbook: &Workbook) -> String {
    let mut xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<workbook xmlns=\"{}\" xmlns:r=\"{}\">\n<sheets>\n",
        SPREADSHEET_NS, RELATIONSHIPS_NS
    );
    for (i, sheet) in workbook.sheets().iter().enumerate() {
        xml.push_str(&format!(
            "<sheet name=\"{}\" sheetId=\"{}\" r:id=\"rId{}\"/>\n",
            escape(&sheet.name),
            i + 1,
            i + 1
        ));
    }
    xml.push_str("</sheets>\n</workbook>");
    xml
}

fn workbook_rels(sheet_count: usize) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
"#,
    );
    for i in 1..=sheet_count {
        xml.push_str(&format!(
            "<Relationship Id=\"rId{}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet\" Target=\"worksheets/sheet{}.xml\"/>\n",
            i, i
        ));
    }
    xml.push_str(&format!(
        "<Relationship Id=\"rId{}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles\" Target=\"styles.xml\"/>\n</Relationships>",
        sheet_count + 1
    ));
    xml
}

fn styles_part() -> String {
    // Minimal stylesheet: Excel requires the two base fills
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="{}">
<fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts>
<fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>
<borders count="1"><border/></borders>
<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>
<cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs>
</styleSheet>"#,
        SPREADSHEET_NS
    )
}

fn worksheet_part(sheet: &Sheet) -> String {
    let mut xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<worksheet xmlns=\"{}\">\n<sheetData>\n",
        SPREADSHEET_NS
    );

    for (row_idx, row) in sheet.rows.iter().enumerate() {
        let r = row_idx + 1;
        xml.push_str(&format!("<row r=\"{}\">", r));
        for (col_idx, cell) in row.cells.iter().enumerate() {
            write_cell(&mut xml, r, col_idx, cell);
        }
        xml.push_str("</row>\n");
    }

    xml.push_str("</sheetData>\n</worksheet>");
    xml
}

fn write_cell(xml: &mut String, row: usize, col_idx: usize, cell: &CellValue) {
    let cell_ref = format!("{}{}", column_name(col_idx), row);
    match cell {
        CellValue::Empty => {}
        CellValue::Text(text) => {
            xml.push_str(&format!(
                "<c r=\"{}\" t=\"inlineStr\"><is><t xml:space=\"preserve\">{}</t></is></c>",
                cell_ref,
                escape(&strip_invalid_xml_chars(text))
            ));
        }
        CellValue::Number(n) => {
            xml.push_str(&format!("<c r=\"{}\"><v>{}</v></c>", cell_ref, format_number(*n)));
        }
        CellValue::Bool(b) => {
            xml.push_str(&format!(
                "<c r=\"{}\" t=\"b\"><v>{}</v></c>",
                cell_ref,
                if *b { 1 } else { 0 }
            ));
        }
    }
}

fn core_properties(metadata: Option<&Metadata>) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
"#,
    );

    if let Some(meta) = metadata {
        if let Some(ref title) = meta.title {
            xml.push_str(&format!("<dc:title>{}</dc:title>\n", escape(title)));
        }
        if let Some(ref author) = meta.author {
            xml.push_str(&format!("<dc:creator>{}</dc:creator>\n", escape(author)));
        }
        if let Some(ref subject) = meta.subject {
            xml.push_str(&format!("<dc:subject>{}</dc:subject>\n", escape(subject)));
        }
        // Source document timestamps keep the output deterministic; no
        // wall-clock time is written.
        if let Some(created) = meta.created {
            xml.push_str(&format!(
                "<dcterms:created xsi:type=\"dcterms:W3CDTF\">{}</dcterms:created>\n",
                created.format("%Y-%m-%dT%H:%M:%SZ")
            ));
        }
        if let Some(modified) = meta.modified {
            xml.push_str(&format!(
                "<dcterms:modified xsi:type=\"dcterms:W3CDTF\">{}</dcterms:modified>\n",
                modified.format("%Y-%m-%dT%H:%M:%SZ")
            ));
        }
    }

    xml.push_str("</cp:coreProperties>");
    xml
}

fn app_properties() -> String {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties">
<Application>pdf2xls</Application>
</Properties>"#
        .to_string()
}

/// Spreadsheet column name for a 0-based index (0 → A, 25 → Z, 26 → AA).
pub fn column_name(mut index: usize) -> String {
    let mut name = String::new();
    loop {
        name.insert(0, (b'A' + (index % 26) as u8) as char);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    name
}

/// Remove characters that are not legal in XML 1.0 documents.
fn strip_invalid_xml_chars(text: &str) -> String {
    text.chars()
        .filter(|&c| c == '\t' || c == '\n' || c == '\r' || c >= '\u{20}')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    fn read_part(data: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(data.to_vec())).unwrap();
        let mut part = archive.by_name(name).unwrap();
        let mut content = String::new();
        part.read_to_string(&mut content).unwrap();
        content
    }

    fn write_to_vec(wb: &Workbook) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        write_to(wb, None, &mut cursor).unwrap();
        cursor.into_inner()
    }

    #[test]
    fn test_column_name() {
        assert_eq!(column_name(0), "A");
        assert_eq!(column_name(1), "B");
        assert_eq!(column_name(25), "Z");
        assert_eq!(column_name(26), "AA");
        assert_eq!(column_name(27), "AB");
        assert_eq!(column_name(701), "ZZ");
        assert_eq!(column_name(702), "AAA");
    }

    #[test]
    fn test_empty_workbook_is_rejected() {
        let wb = Workbook::new();
        let mut cursor = Cursor::new(Vec::new());
        assert!(matches!(
            write_to(&wb, None, &mut cursor),
            Err(Error::XlsxWrite(_))
        ));
    }

    #[test]
    fn test_archive_contains_required_parts() {
        let mut wb = Workbook::new();
        wb.add_sheet("One").push_text_row("hello");
        wb.add_sheet("Two").push_text_row("world");

        let data = write_to_vec(&wb);
        let mut archive = zip::ZipArchive::new(Cursor::new(data)).unwrap();
        for name in [
            "[Content_Types].xml",
            "_rels/.rels",
            "xl/workbook.xml",
            "xl/_rels/workbook.xml.rels",
            "xl/styles.xml",
            "xl/worksheets/sheet1.xml",
            "xl/worksheets/sheet2.xml",
            "docProps/core.xml",
            "docProps/app.xml",
        ] {
            assert!(archive.by_name(name).is_ok(), "missing part {}", name);
        }
    }

    #[test]
    fn test_worksheet_cells() {
        let mut wb = Workbook::new();
        let sheet = wb.add_sheet("Data");
        sheet.push_row(vec![
            CellValue::text("Name"),
            CellValue::Number(30.0),
            CellValue::Bool(true),
            CellValue::Empty,
        ]);

        let data = write_to_vec(&wb);
        let xml = read_part(&data, "xl/worksheets/sheet1.xml");

        assert!(xml.contains(r#"<c r="A1" t="inlineStr"><is><t xml:space="preserve">Name</t></is></c>"#));
        assert!(xml.contains(r#"<c r="B1"><v>30</v></c>"#));
        assert!(xml.contains(r#"<c r="C1" t="b"><v>1</v></c>"#));
        // Empty cells are omitted entirely
        assert!(!xml.contains(r#"r="D1""#));
    }

    #[test]
    fn test_text_is_escaped() {
        let mut wb = Workbook::new();
        wb.add_sheet("Esc").push_text_row("a < b & c > \"d\"");

        let data = write_to_vec(&wb);
        let xml = read_part(&data, "xl/worksheets/sheet1.xml");
        assert!(xml.contains("a &lt; b &amp; c &gt;"));
        assert!(!xml.contains("a < b"));
    }

    #[test]
    fn test_sheet_names_in_workbook_part() {
        let mut wb = Workbook::new();
        wb.add_sheet("Text_Body").push_text_row("x");
        wb.add_sheet("Table_Page_1_1").push_text_row("y");

        let data = write_to_vec(&wb);
        let xml = read_part(&data, "xl/workbook.xml");
        assert!(xml.contains(r#"<sheet name="Text_Body" sheetId="1" r:id="rId1"/>"#));
        assert!(xml.contains(r#"<sheet name="Table_Page_1_1" sheetId="2" r:id="rId2"/>"#));
    }

    #[test]
    fn test_core_properties_from_metadata() {
        use chrono::TimeZone;

        let mut wb = Workbook::new();
        wb.add_sheet("S").push_text_row("x");

        let mut meta = Metadata::with_version("1.7");
        meta.title = Some("Report & Summary".to_string());
        meta.created = Some(chrono::Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap());

        let mut cursor = Cursor::new(Vec::new());
        write_to(&wb, Some(&meta), &mut cursor).unwrap();
        let xml = read_part(&cursor.into_inner(), "docProps/core.xml");

        assert!(xml.contains("<dc:title>Report &amp; Summary</dc:title>"));
        assert!(xml.contains("2024-01-15T09:30:00Z"));
    }

    #[test]
    fn test_save_is_atomic_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.xlsx");
        std::fs::write(&dest, b"pre-existing").unwrap();

        // Empty workbook fails before any write to the destination
        let wb = Workbook::new();
        assert!(save(&wb, None, &dest).is_err());
        assert_eq!(std::fs::read(&dest).unwrap(), b"pre-existing");
    }

    #[test]
    fn test_save_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.xlsx");

        let mut wb = Workbook::new();
        wb.add_sheet("S").push_text_row("content");
        save(&wb, None, &dest).unwrap();

        let data = std::fs::read(&dest).unwrap();
        // ZIP local file header magic
        assert_eq!(&data[..2], b"PK");
    }

    #[test]
    fn test_strip_invalid_xml_chars() {
        assert_eq!(strip_invalid_xml_chars("a\u{0}b\u{8}c"), "abc");
        assert_eq!(strip_invalid_xml_chars("keep\ttabs\nand\rbreaks"), "keep\ttabs\nand\rbreaks");
    }
}
