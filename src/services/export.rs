use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use quick_xml::escape::escape;
use regex::Regex;
use serde::Serialize;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{CoreError, Result};
use crate::model::term::TranslatedTerm;

pub const SHEET_NAME: &str = "词条翻译";
pub const DEFAULT_FILE_NAME: &str = "词条翻译结果.xlsx";
pub const HEADERS: [&str; 6] = [
    "*编码",
    "*类型",
    "*分组",
    "*内容(zh_CN)",
    "*内容(zh_HK)",
    "*内容(en_US)",
];

const COLUMNS: [&str; 6] = ["A", "B", "C", "D", "E", "F"];

#[derive(Debug, Serialize)]
pub struct ExportSummary {
    pub path: String,
    pub rows: usize,
}

/// Flat spreadsheet record for one row, in header order.
pub fn record(t: &TranslatedTerm) -> [&str; 6] {
    [
        t.code.as_str(),
        t.kind.as_str(),
        t.group.as_str(),
        t.term.zh_cn.as_str(),
        t.term.zh_hk.as_deref().unwrap_or(""),
        t.term.en_us.as_deref().unwrap_or(""),
    ]
}

/// Writes the rows as a single-sheet workbook. Nothing is written for an
/// empty set.
pub fn write_xlsx(rows: &[TranslatedTerm], path: &Path) -> Result<ExportSummary> {
    if rows.is_empty() {
        return Err(CoreError::NothingToExport);
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp = tmp_path(path);
    let written = write_package(rows, &tmp);
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }

    if let Err(e) = replace_file(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }

    log::info!("exported {} row(s) to {}", rows.len(), path.display());

    Ok(ExportSummary {
        path: path.to_string_lossy().to_string(),
        rows: rows.len(),
    })
}

fn write_package(rows: &[TranslatedTerm], path: &Path) -> Result<()> {
    let f = File::create(path)?;
    let mut zout = ZipWriter::new(f);

    let parts: [(&str, String); 5] = [
        ("[Content_Types].xml", content_types_xml().to_string()),
        ("_rels/.rels", root_rels_xml().to_string()),
        ("xl/workbook.xml", workbook_xml()),
        ("xl/_rels/workbook.xml.rels", workbook_rels_xml().to_string()),
        ("xl/worksheets/sheet1.xml", sheet_xml(rows)),
    ];

    for (name, data) in parts.iter() {
        let opts = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        zout.start_file(*name, opts)?;
        zout.write_all(data.as_bytes())?;
    }

    zout.finish()?;
    Ok(())
}

fn replace_file(from: &Path, to: &Path) -> Result<()> {
    // rename only replaces an existing target in place on unix
    #[cfg(windows)]
    if to.exists() {
        fs::remove_file(to)?;
    }
    fs::rename(from, to)?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut p = path.to_path_buf();
    let file_name = match path.file_name().and_then(|s| s.to_str()) {
        Some(n) => n.to_string(),
        None => "export".to_string(),
    };
    p.set_file_name(format!("{file_name}.tmp"));
    p
}

fn content_types_xml() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#
}

fn root_rels_xml() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#
}

fn workbook_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        escape(SHEET_NAME)
    )
}

fn workbook_rels_xml() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#
}

fn sheet_xml(rows: &[TranslatedTerm]) -> String {
    let mut s = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );

    push_row(&mut s, 1, &HEADERS);
    for (i, t) in rows.iter().enumerate() {
        push_row(&mut s, i + 2, &record(t));
    }

    s.push_str("</sheetData></worksheet>");
    s
}

fn push_row(out: &mut String, row: usize, cells: &[&str; 6]) {
    out.push_str(&format!(r#"<row r="{row}">"#));
    for (col, value) in COLUMNS.iter().zip(cells.iter()) {
        out.push_str(&format!(
            r#"<c r="{col}{row}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
            escape(&encode_cell(value))
        ));
    }
    out.push_str("</row>");
}

fn escaped_sequence() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"_(x[0-9A-Fa-f]{4}_)").expect("valid escape regex"))
}

/// Writes characters XML 1.0 cannot carry as `_xHHHH_`. Text that already
/// looks like such an escape gets its underscore escaped so it reads back
/// unchanged.
fn encode_cell(value: &str) -> String {
    let value = escaped_sequence().replace_all(value, "_x005F_$1");

    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        let legal = matches!(c, '\t' | '\n' | '\r')
            || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}');
        if legal {
            out.push(c);
        } else {
            out.push_str(&format!("_x{:04X}_", c as u32));
        }
    }
    out
}
