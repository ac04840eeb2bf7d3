//! Builders for Word-shaped XML used across the integration tests.

/// Wrap body content in a main document part with the usual namespaces.
pub fn document(body: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#,
            r#" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships""#,
            r#" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing""#,
            r#" xmlns:w14="http://schemas.microsoft.com/office/word/2010/wordml""#,
            r#" xmlns:w15="http://schemas.microsoft.com/office/word/2012/wordml">"#,
            "<w:body>{}</w:body></w:document>"
        ),
        body
    )
}

/// A header part holding the given paragraphs.
pub fn header(content: &str) -> String {
    format!(
        r#"<w:hdr xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">{content}</w:hdr>"#
    )
}

/// A paragraph with a single run.
pub fn paragraph(text: &str) -> String {
    format!(r#"<w:p><w:r><w:t xml:space="preserve">{text}</w:t></w:r></w:p>"#)
}

/// A paragraph with one run per piece, the way editors fragment typed text.
pub fn fragmented_paragraph(pieces: &[&str]) -> String {
    let runs: String = pieces
        .iter()
        .map(|piece| format!(r#"<w:r><w:rPr><w:i/></w:rPr><w:t xml:space="preserve">{piece}</w:t></w:r>"#))
        .collect();
    format!("<w:p>{runs}</w:p>")
}

/// A numbered list item.
pub fn list_paragraph(text: &str) -> String {
    format!(
        r#"<w:p><w:pPr><w:numPr><w:ilvl w:val="0"/><w:numId w:val="1"/></w:numPr></w:pPr><w:r><w:t xml:space="preserve">{text}</w:t></w:r></w:p>"#
    )
}

/// A table row with one single-paragraph cell per entry.
pub fn table_row(cells: &[&str]) -> String {
    let cells: String = cells
        .iter()
        .map(|text| format!("<w:tc>{}</w:tc>", paragraph(text)))
        .collect();
    format!("<w:tr>{cells}</w:tr>")
}

pub fn table(rows: &[String]) -> String {
    format!("<w:tbl><w:tblPr/>{}</w:tbl>", rows.concat())
}

/// A checkbox content control whose text is `text`.
pub fn checkbox(text: &str) -> String {
    format!(
        concat!(
            "<w:sdt><w:sdtPr><w14:checkbox>",
            r#"<w14:checked w14:val="0"/>"#,
            r#"<w14:checkedState w14:val="2612" w14:font="MS Gothic"/>"#,
            r#"<w14:uncheckedState w14:val="2610" w14:font="MS Gothic"/>"#,
            "</w14:checkbox></w:sdtPr><w:sdtContent>{}</w:sdtContent></w:sdt>"
        ),
        paragraph(text)
    )
}

/// The final paragraph of a body that carries the section break.
pub fn section_break_paragraph(text: &str) -> String {
    format!(
        r#"<w:p><w:pPr><w:sectPr><w:pgSz w:w="11906" w:h="16838"/></w:sectPr></w:pPr><w:r><w:t xml:space="preserve">{text}</w:t></w:r></w:p>"#
    )
}
