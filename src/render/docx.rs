use std::fmt::Write as _;
use std::io::{Cursor, Write};

use quick_xml::escape::escape;
use zip::write::FileOptions;

use super::{DocumentEncoder, DocumentModel};
use crate::error::RenderError;

/// Writes a minimal WordprocessingML package: content types, the package
/// relationship and `word/document.xml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxEncoder;

impl DocumentEncoder for DocxEncoder {
    fn encode(&self, doc: &DocumentModel) -> Result<Vec<u8>, RenderError> {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut buffer);
            let options =
                FileOptions::<()>::default().compression_method(zip::CompressionMethod::Deflated);

            zip.start_file("[Content_Types].xml", options)?;
            zip.write_all(CONTENT_TYPES_XML.as_bytes())?;

            zip.start_file("_rels/.rels", options)?;
            zip.write_all(RELS_XML.as_bytes())?;

            zip.start_file("word/document.xml", options)?;
            zip.write_all(document_xml(doc).as_bytes())?;

            zip.finish()?;
        }
        Ok(buffer.into_inner())
    }
}

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>
"#;

const RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>
"#;

const TABLE_PROPERTIES: &str = concat!(
    r#"<w:tblPr><w:tblW w:w="5000" w:type="pct"/><w:tblBorders>"#,
    r#"<w:top w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#,
    r#"<w:left w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#,
    r#"<w:bottom w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#,
    r#"<w:right w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#,
    r#"<w:insideH w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#,
    r#"<w:insideV w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#,
    r#"</w:tblBorders></w:tblPr>"#,
);

/// Text column of a letter page with one-inch margins.
const TEXT_WIDTH_TWIPS: usize = 9360;

fn document_xml(doc: &DocumentModel) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#,
    );

    let size = doc.title_half_points;
    let _ = write!(
        xml,
        r#"<w:p><w:r><w:rPr><w:b/><w:sz w:val="{size}"/><w:szCs w:val="{size}"/></w:rPr>{}</w:r></w:p>"#,
        text_xml(&doc.title)
    );

    // A table needs at least one row and every row at least one cell.
    if !doc.table.is_empty() {
        xml.push_str("<w:tbl>");
        xml.push_str(TABLE_PROPERTIES);
        let columns = doc.table.iter().map(Vec::len).max().unwrap_or(0).max(1);
        xml.push_str("<w:tblGrid>");
        for _ in 0..columns {
            let _ = write!(xml, r#"<w:gridCol w:w="{}"/>"#, TEXT_WIDTH_TWIPS / columns);
        }
        xml.push_str("</w:tblGrid>");
        for row in &doc.table {
            xml.push_str("<w:tr>");
            if row.is_empty() {
                xml.push_str(&cell_xml(""));
            }
            for cell in row {
                xml.push_str(&cell_xml(cell));
            }
            xml.push_str("</w:tr>");
        }
        xml.push_str("</w:tbl>");
    }

    xml.push_str("<w:sectPr/></w:body></w:document>");
    xml
}

fn cell_xml(text: &str) -> String {
    format!(
        r#"<w:tc><w:tcPr><w:tcW w:w="0" w:type="auto"/></w:tcPr><w:p><w:r>{}</w:r></w:p></w:tc>"#,
        text_xml(text)
    )
}

fn text_xml(text: &str) -> String {
    // XML 1.0 forbids most C0 control characters even when escaped.
    let clean: String = text
        .chars()
        .filter(|c| matches!(c, '\t' | '\n' | '\r') || *c >= ' ')
        .filter(|c| !matches!(c, '\u{FFFE}' | '\u{FFFF}'))
        .collect();
    format!(r#"<w:t xml:space="preserve">{}</w:t>"#, escape(clean.as_str()))
}
