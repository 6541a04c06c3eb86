//! Integration tests for the plain text writer.

use std::fs;

use tempfile::TempDir;
use untext::{
    DocumentModel, DocumentWriter, ParagraphBlock, TableBlock, TableFormat, TextWriter,
    WriteOptions,
};

fn sample() -> DocumentModel {
    DocumentModel::from_blocks(vec![
        ParagraphBlock::header("Acme Corp").into(),
        ParagraphBlock::new("Intro").into(),
        TableBlock::from_strings(vec![vec!["Name", "Age"], vec!["Alice"]]).into(),
        ParagraphBlock::new("Outro").into(),
    ])
}

#[test]
fn test_write_single_file() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("nested").join("sample.txt");

    let written = TextWriter::new()
        .write(&sample(), &out, &WriteOptions::default())
        .unwrap();

    assert_eq!(written, vec![out.clone()]);
    assert_eq!(
        fs::read_to_string(&out).unwrap(),
        "[HEADER] Acme Corp\nIntro\n[TABLE]\nName\tAge\nAlice\n\nOutro\n"
    );
}

#[test]
fn test_write_pipe_tables() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("pipe.txt");
    let opts = WriteOptions::default().with_table_format(TableFormat::Pipe);

    TextWriter::new().write(&sample(), &out, &opts).unwrap();

    let text = fs::read_to_string(&out).unwrap();
    assert!(text.contains("[TABLE]\n| Name | Age |\n| Alice |  |\n\nOutro"));
}

#[test]
fn test_write_bom() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("bom.txt");
    let doc = DocumentModel::from_blocks(vec![ParagraphBlock::new("héllo").into()]);

    TextWriter::new()
        .write(&doc, &out, &WriteOptions::default().with_bom(true))
        .unwrap();

    let bytes = fs::read(&out).unwrap();
    assert_eq!(&bytes[..3], b"\xEF\xBB\xBF");
    assert_eq!(std::str::from_utf8(&bytes[3..]).unwrap(), "héllo\n");
}

#[test]
fn test_write_chunks_next_to_output() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("long.txt");
    let body: String = "abcdefghij".repeat(5);
    let doc = DocumentModel::from_blocks(vec![ParagraphBlock::new(body.clone()).into()]);
    let opts = WriteOptions::default().with_chunking(20, 5);

    let written = TextWriter::new().write(&doc, &out, &opts).unwrap();

    // 51 chars (with the trailing newline): windows start at 0, 15, 30, 45
    let names: Vec<String> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            "long_part001.txt",
            "long_part002.txt",
            "long_part003.txt",
            "long_part004.txt"
        ]
    );
    assert!(!out.exists());
    assert!(written.iter().all(|p| p.parent() == Some(dir.path())));

    let mut rebuilt = String::new();
    for (i, path) in written.iter().enumerate() {
        let chunk = fs::read_to_string(path).unwrap();
        assert!(chunk.chars().count() <= 20);
        if i == 0 {
            rebuilt.push_str(&chunk);
        } else {
            rebuilt.extend(chunk.chars().skip(5));
        }
    }
    assert_eq!(rebuilt, format!("{}\n", body));
}

#[test]
fn test_write_chunks_multibyte() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("cjk.txt");
    let doc = DocumentModel::from_blocks(vec![ParagraphBlock::new("文字列の分割テスト").into()]);
    let opts = WriteOptions::default().with_chunking(4, 1).with_bom(true);

    let written = TextWriter::new().write(&doc, &out, &opts).unwrap();
    assert!(written.len() > 1);
    for path in &written {
        let bytes = fs::read(path).unwrap();
        assert_eq!(&bytes[..3], b"\xEF\xBB\xBF");
        let text = std::str::from_utf8(&bytes[3..]).unwrap();
        assert!(text.chars().count() <= 4);
    }
}

#[test]
fn test_write_chunk_size_zero_is_one_file() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("whole.txt");
    let doc = DocumentModel::from_blocks(vec![ParagraphBlock::new("all of it").into()]);
    let opts = WriteOptions::default().with_chunking(0, 10);

    let written = TextWriter::new().write(&doc, &out, &opts).unwrap();
    assert_eq!(written.len(), 1);
    assert!(written[0].ends_with("whole_part001.txt"));
    assert_eq!(fs::read_to_string(&written[0]).unwrap(), "all of it\n");
}
