use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write as _};
use std::path::Path;

use anyhow::Context as _;

use crate::formats::{CSV_COLUMNS, InputFormat, OutputFormat, Record, sentinel};

const SOURCE_PREFIX: &str = "(Source: ";
const SOURCE_SUFFIX: &str = ")";

pub fn write_records(path: &Path, format: OutputFormat, records: &[Record]) -> anyhow::Result<()> {
    match format {
        OutputFormat::Csv => write_csv(path, records),
        OutputFormat::Text => write_text(path, records),
    }
}

pub fn read_records(path: &Path, format: InputFormat) -> anyhow::Result<Vec<Record>> {
    let format = match format {
        InputFormat::Auto => detect_format(path),
        other => other,
    };
    match format {
        InputFormat::Csv => read_csv(path),
        _ => read_text(path),
    }
}

fn detect_format(path: &Path) -> InputFormat {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        InputFormat::Csv
    } else {
        InputFormat::Text
    }
}

fn create_output(path: &Path) -> anyhow::Result<BufWriter<File>> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir: {}", parent.display()))?;
    }

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .with_context(|| format!("open output: {}", path.display()))?;
    Ok(BufWriter::new(file))
}

pub fn write_csv(path: &Path, records: &[Record]) -> anyhow::Result<()> {
    let out = create_output(path)?;
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(out);

    writer
        .write_record(CSV_COLUMNS)
        .context("write csv header")?;
    for record in records {
        writer
            .serialize(record)
            .with_context(|| format!("write csv row: {}", record.title))?;
    }
    writer
        .flush()
        .with_context(|| format!("flush csv: {}", path.display()))?;
    Ok(())
}

pub fn read_csv(path: &Path) -> anyhow::Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("open csv: {}", path.display()))?;

    let mut records = Vec::new();
    for (index, row) in reader.deserialize::<Record>().enumerate() {
        records.push(row.with_context(|| format!("parse csv row {}", index + 1))?);
    }
    Ok(records)
}

pub fn write_text(path: &Path, records: &[Record]) -> anyhow::Result<()> {
    let sentinel = sentinel();
    let breaks_line = |text: &str| text.contains(['\n', '\r']);
    if let Some(record) = records
        .iter()
        .find(|r| breaks_line(&r.title) || breaks_line(&r.source_url))
    {
        anyhow::bail!(
            "title or source of {:?} spans several lines; write it as csv instead",
            record.title
        );
    }
    if let Some(record) = records
        .iter()
        .find(|r| r.body_text.lines().any(|line| line == sentinel))
    {
        anyhow::bail!(
            "body of {:?} contains a separator line; write it as csv instead",
            record.title
        );
    }

    let mut out = create_output(path)?;
    for record in records {
        write!(
            out,
            "=== {} ===\n{SOURCE_PREFIX}{}{SOURCE_SUFFIX}\n\n{}\n\n{sentinel}\n\n",
            record.title, record.source_url, record.body_text
        )
        .with_context(|| format!("write record: {}", record.title))?;
    }
    out.flush()
        .with_context(|| format!("flush output: {}", path.display()))?;
    Ok(())
}

pub fn read_text(path: &Path) -> anyhow::Result<Vec<Record>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("read records: {}", path.display()))?;
    Ok(parse_text(&contents))
}

pub fn parse_text(contents: &str) -> Vec<Record> {
    let delimiter = format!("\n{}\n", sentinel());
    contents
        .split(delimiter.as_str())
        .filter_map(parse_chunk)
        .collect()
}

fn parse_chunk(chunk: &str) -> Option<Record> {
    let chunk = chunk.trim();
    if chunk.is_empty() {
        return None;
    }

    let mut lines = chunk.lines();
    let title_line = lines.next()?;
    let rest = lines.collect::<Vec<_>>();
    if rest.is_empty() {
        return None;
    }

    let (source_url, body_lines) = match rest.split_first() {
        Some((first, tail)) if is_source_line(first) => (source_url(first), tail),
        _ => (String::new(), rest.as_slice()),
    };

    Some(Record {
        title: strip_title_decoration(title_line.trim()).to_owned(),
        source_url,
        body_text: body_lines.join("\n").trim().to_owned(),
    })
}

fn is_source_line(line: &str) -> bool {
    let line = line.trim();
    line.starts_with(SOURCE_PREFIX) && line.ends_with(SOURCE_SUFFIX)
}

fn source_url(line: &str) -> String {
    let line = line.trim();
    line[SOURCE_PREFIX.len()..line.len() - SOURCE_SUFFIX.len()].to_owned()
}

fn strip_title_decoration(title: &str) -> &str {
    title
        .strip_prefix("=== ")
        .and_then(|t| t.strip_suffix(" ==="))
        .unwrap_or(title)
}
