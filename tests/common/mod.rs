//! Fixture builders shared by the integration tests.

#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const NS: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships""#;

/// `<w:p>` with a single run.
pub fn para(text: &str) -> String {
    format!(r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#, text)
}

/// `<w:tbl>` with one paragraph per cell.
pub fn table(rows: &[&[&str]]) -> String {
    let mut xml = String::from("<w:tbl>");
    for row in rows {
        xml.push_str("<w:tr>");
        for cell in *row {
            xml.push_str(&format!("<w:tc>{}</w:tc>", para(cell)));
        }
        xml.push_str("</w:tr>");
    }
    xml.push_str("</w:tbl>");
    xml
}

/// Section properties referencing default header/footer relationships.
pub fn sect(header: Option<&str>, footer: Option<&str>) -> String {
    let mut xml = String::from("<w:sectPr>");
    if let Some(id) = header {
        xml.push_str(&format!(r#"<w:headerReference w:type="default" r:id="{}"/>"#, id));
    }
    if let Some(id) = footer {
        xml.push_str(&format!(r#"<w:footerReference w:type="default" r:id="{}"/>"#, id));
    }
    xml.push_str("</w:sectPr>");
    xml
}

/// A paragraph that ends a section.
pub fn section_break(header: Option<&str>, footer: Option<&str>) -> String {
    format!("<w:p><w:pPr>{}</w:pPr></w:p>", sect(header, footer))
}

/// A header or footer part holding `inner`.
pub fn story_part(root: &str, inner: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:{root} {NS}>{inner}</w:{root}>"#
    )
}

/// A minimal DOCX package.
#[derive(Default)]
pub struct DocxBuilder {
    body: String,
    parts: Vec<(String, String)>,
    relationships: Vec<(String, String)>,
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body(mut self, xml: impl AsRef<str>) -> Self {
        self.body.push_str(xml.as_ref());
        self
    }

    pub fn header(self, rel_id: &str, file: &str, inner: &str) -> Self {
        self.part(rel_id, file, story_part("hdr", inner))
    }

    pub fn footer(self, rel_id: &str, file: &str, inner: &str) -> Self {
        self.part(rel_id, file, story_part("ftr", inner))
    }

    fn part(mut self, rel_id: &str, file: &str, xml: String) -> Self {
        self.relationships.push((rel_id.to_string(), file.to_string()));
        self.parts.push((format!("word/{}", file), xml));
        self
    }

    pub fn write(&self, path: &Path) {
        let file = File::create(path).unwrap();
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default();

        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(br#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#).unwrap();

        zip.start_file("word/document.xml", options).unwrap();
        let document = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document {NS}><w:body>{}</w:body></w:document>"#,
            self.body
        );
        zip.write_all(document.as_bytes()).unwrap();

        zip.start_file("word/_rels/document.xml.rels", options).unwrap();
        let mut rels = String::from(
            r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for (id, target) in &self.relationships {
            rels.push_str(&format!(
                r#"<Relationship Id="{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/header" Target="{}"/>"#,
                id, target
            ));
        }
        rels.push_str("</Relationships>");
        zip.write_all(rels.as_bytes()).unwrap();

        for (name, xml) in &self.parts {
            zip.start_file(name.as_str(), options).unwrap();
            zip.write_all(xml.as_bytes()).unwrap();
        }

        zip.finish().unwrap();
    }
}

/// Write a PDF with one page per entry; each line is `(x, y, text)` in
/// 12pt Helvetica.
pub fn write_pdf(path: &Path, pages: &[Vec<(i64, i64, &str)>]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids: Vec<Object> = Vec::new();
    for lines in pages {
        let mut operations = Vec::new();
        for &(x, y, text) in lines {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
            operations.push(Operation::new("Td", vec![x.into(), y.into()]));
            operations.push(Operation::new("Tj", vec![Object::string_literal(text)]));
            operations.push(Operation::new("ET", vec![]));
        }
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}
