//! End-to-end conversion tests.

mod common;

use std::fs;

use common::{para, sect, table, write_pdf, DocxBuilder};
use serde_json::json;
use tempfile::TempDir;
use untext::{convert, ConversionEngine, Error, PluginSide, ReadOptions, WriteOptions};

#[test]
fn test_docx_to_txt() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("sample.docx");
    let output = dir.path().join("sample.txt");
    DocxBuilder::new()
        .body(para("Hello World"))
        .body(para("  some text  with   extra  spaces "))
        .write(&input);

    let written = convert(&input, &output, &ReadOptions::default(), &WriteOptions::default())
        .unwrap();

    assert_eq!(written, vec![output.clone()]);
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "Hello World\nsome text with extra spaces\n"
    );
}

#[test]
fn test_docx_with_table_and_headers() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("Report.DOCX");
    let output = dir.path().join("report.txt");
    DocxBuilder::new()
        .header("rId1", "header1.xml", &para("Acme"))
        .body(para("Intro"))
        .body(table(&[&["Name", "Age"], &["Alice", "30"]]))
        .body(sect(Some("rId1"), None))
        .write(&input);

    let engine = ConversionEngine::with_defaults();
    engine
        .convert(
            &input,
            &output,
            &ReadOptions::default().with_headers(true),
            &WriteOptions::default(),
        )
        .unwrap();

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "[HEADER] Section 1\n[HEADER] Acme\nIntro\n[TABLE]\nName\tAge\nAlice\t30\n"
    );
}

#[test]
fn test_pdf_to_txt() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("memo.pdf");
    let output = dir.path().join("memo.txt");
    write_pdf(&input, &[vec![(72, 720, "First line"), (72, 700, "Second line")]]);

    convert(&input, &output, &ReadOptions::default(), &WriteOptions::default()).unwrap();

    assert_eq!(fs::read_to_string(&output).unwrap(), "First line\nSecond line\n");
}

#[test]
fn test_unsupported_input_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("notes.xyz");
    let output = dir.path().join("notes.txt");
    fs::write(&input, "plain").unwrap();

    let err = convert(&input, &output, &ReadOptions::default(), &WriteOptions::default())
        .unwrap_err();

    assert!(matches!(
        err,
        Error::UnsupportedExtension {
            side: PluginSide::Reader,
            ..
        }
    ));
    assert!(err.to_string().contains(".xyz"));
    assert!(!output.exists());
}

#[test]
fn test_unsupported_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("a.docx");
    DocxBuilder::new().body(para("x")).write(&input);

    let err = convert(
        &input,
        dir.path().join("a.html"),
        &ReadOptions::default(),
        &WriteOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        Error::UnsupportedExtension {
            side: PluginSide::Writer,
            ..
        }
    ));
}

#[test]
fn test_corrupt_input_is_conversion_failure() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("broken.docx");
    fs::write(&input, b"PK\x03\x04 truncated").unwrap();

    let err = convert(
        &input,
        dir.path().join("broken.txt"),
        &ReadOptions::default(),
        &WriteOptions::default(),
    )
    .unwrap_err();

    assert!(err.is_conversion_failed());
    assert!(err.to_string().starts_with("Conversion failed:"));
}

#[test]
fn test_options_from_map() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("mapped.docx");
    let output = dir.path().join("mapped.txt");
    DocxBuilder::new()
        .body(para("Top"))
        .body(table(&[&["a", "b"], &["c"]]))
        .write(&input);

    let map = match json!({
        "table_format": "pipe",
        "utf8_bom": true,
        "markers": { "table": "<table>" },
        "unrelated": "ignored"
    }) {
        serde_json::Value::Object(map) => map,
        _ => unreachable!(),
    };
    let read = ReadOptions::from_map(&map).unwrap();
    let write = WriteOptions::from_map(&map).unwrap();

    convert(&input, &output, &read, &write).unwrap();

    let bytes = fs::read(&output).unwrap();
    assert_eq!(&bytes[..3], b"\xEF\xBB\xBF");
    assert_eq!(
        std::str::from_utf8(&bytes[3..]).unwrap(),
        "Top\n<table>\n| a | b |\n| c |  |\n"
    );
}
