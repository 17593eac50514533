//! Course archive importer
//!
//! An archive is a zip or tar file with a `courses/` directory. Zip archives
//! are recognised by their local file header magic; anything else is read as
//! tar. Each file under `courses/` is a pipe-separated section with a header
//! line:
//!
//! ```text
//! title|uuid|instructor|audit|year|id|pass|fail|avg|dept
//! ```
//!
//! Sections no longer than `MIN_SECTION_LEN` bytes hold no course rows and
//! are skipped. Blank or malformed rows are skipped with a WARN log.

use std::io::{Cursor, Read};

use tar::Archive;
use zip::ZipArchive;

use crate::observability::{log_event_with_fields, Event};
use crate::schema::{Field, Record};

use super::errors::{StoreError, StoreResult};
use super::store::DatasetKind;

/// Directory inside the archive holding course sections
pub const COURSES_DIR: &str = "courses/";

/// Sections at or below this length are skipped
pub const MIN_SECTION_LEN: usize = 70;

const COLUMNS: usize = 10;

/// Leading bytes of a zip local file header
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// A regular file read out of an archive: (path, contents)
type ArchiveFile = (String, Vec<u8>);

fn unreadable(what: &str, e: impl std::fmt::Display) -> StoreError {
    StoreError::ImportFailed(format!("unreadable {}: {}", what, e))
}

fn read_zip_files(archive: &[u8]) -> StoreResult<Vec<ArchiveFile>> {
    let mut zip = ZipArchive::new(Cursor::new(archive)).map_err(|e| unreadable("archive", e))?;
    let mut files = Vec::new();

    for index in 0..zip.len() {
        let mut entry = zip
            .by_index(index)
            .map_err(|e| unreadable("archive entry", e))?;
        if !entry.is_file() {
            continue;
        }

        let path = entry.name().to_string();
        let mut raw = Vec::new();
        entry
            .read_to_end(&mut raw)
            .map_err(|e| StoreError::ImportFailed(format!("cannot read '{}': {}", path, e)))?;
        files.push((path, raw));
    }

    Ok(files)
}

fn read_tar_files(archive: &[u8]) -> StoreResult<Vec<ArchiveFile>> {
    let mut archive = Archive::new(Cursor::new(archive));
    let entries = archive.entries().map_err(|e| unreadable("archive", e))?;
    let mut files = Vec::new();

    for entry in entries {
        let mut entry = entry.map_err(|e| unreadable("archive entry", e))?;
        if !entry.header().entry_type().is_file() {
            continue;
        }

        let path = entry
            .path()
            .map_err(|e| StoreError::ImportFailed(format!("bad entry path: {}", e)))?
            .to_string_lossy()
            .into_owned();
        let mut raw = Vec::new();
        entry
            .read_to_end(&mut raw)
            .map_err(|e| StoreError::ImportFailed(format!("cannot read '{}': {}", path, e)))?;
        files.push((path, raw));
    }

    Ok(files)
}

/// Reads every course row from a zip or tar archive, in archive order.
pub fn import_archive(archive: &[u8], kind: DatasetKind) -> StoreResult<Vec<Record>> {
    if kind != DatasetKind::Courses {
        return Err(StoreError::ImportFailed(format!(
            "{} datasets are not supported",
            kind
        )));
    }

    let files = if archive.starts_with(ZIP_MAGIC) {
        read_zip_files(archive)?
    } else {
        read_tar_files(archive)?
    };

    let mut records = Vec::new();
    let mut sections = 0usize;

    for (path, raw) in &files {
        let path = path.trim_start_matches("./");
        if !path.starts_with(COURSES_DIR) {
            continue;
        }

        let text = String::from_utf8_lossy(raw);
        if text.len() <= MIN_SECTION_LEN {
            continue;
        }

        sections += 1;
        parse_section(path, &text, &mut records);
    }

    if records.is_empty() {
        return Err(StoreError::ImportFailed(format!(
            "archive holds no course rows ({} sections read)",
            sections
        )));
    }

    Ok(records)
}

/// Appends the rows of one section, skipping the header line.
fn parse_section(name: &str, text: &str, out: &mut Vec<Record>) {
    for (line_no, line) in text.split('\n').enumerate().skip(1) {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.trim().is_empty() {
            continue;
        }

        match parse_row(line) {
            Ok(record) => out.push(record),
            Err(reason) => {
                let line_no = (line_no + 1).to_string();
                log_event_with_fields(
                    Event::ImportRowSkipped,
                    &[
                        ("line", line_no.as_str()),
                        ("reason", reason.as_str()),
                        ("section", name),
                    ],
                );
            }
        }
    }
}

/// Parses one `title|uuid|instructor|audit|year|id|pass|fail|avg|dept` row.
pub fn parse_row(line: &str) -> Result<Record, String> {
    let cols: Vec<&str> = line.split('|').collect();
    if cols.len() < COLUMNS {
        return Err(format!("expected {} columns, found {}", COLUMNS, cols.len()));
    }

    let record = Record::new()
        .with(Field::Title, cols[0])
        .with(Field::Uuid, cols[1])
        .with(Field::Instructor, cols[2])
        .with(Field::Audit, parse_count(Field::Audit, cols[3])?)
        .with(Field::Id, cols[5])
        .with(Field::Pass, parse_count(Field::Pass, cols[6])?)
        .with(Field::Fail, parse_count(Field::Fail, cols[7])?)
        .with(Field::Average, parse_average(cols[8])?)
        .with(Field::Department, cols[9]);

    Ok(record)
}

fn parse_count(field: Field, raw: &str) -> Result<f64, String> {
    raw.trim()
        .parse::<i64>()
        .map(|n| n as f64)
        .map_err(|_| format!("{} '{}' is not an integer", field.name(), raw))
}

fn parse_average(raw: &str) -> Result<f64, String> {
    match raw.trim().parse::<f64>() {
        Ok(avg) if avg.is_finite() => Ok(avg),
        _ => Err(format!("Average '{}' is not a number", raw)),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::io::{Cursor, Write};

    use tar::{Builder, Header};
    use zip::write::FileOptions;
    use zip::ZipWriter;

    pub const HEADER: &str = "title|uuid|instructor|audit|year|id|pass|fail|avg|dept";

    /// Builds a tar archive from (path, contents) pairs
    pub fn archive(files: &[(&str, &str)]) -> Vec<u8> {
        let mut builder = Builder::new(Vec::new());
        for (path, contents) in files {
            let mut header = Header::new_gnu();
            header.set_size(contents.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, path, contents.as_bytes())
                .unwrap();
        }
        builder.into_inner().unwrap()
    }

    /// Builds a zip archive from (path, contents) pairs
    pub fn zip_archive(files: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (path, contents) in files {
            writer.start_file(*path, FileOptions::default()).unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    /// A section file with the header and the given rows
    pub fn section(rows: &[&str]) -> String {
        let mut text = String::from(HEADER);
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        text.push('\n');
        text
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{archive, section, zip_archive, HEADER};
    use super::*;
    use crate::schema::Value;

    const ROW_A: &str = "intro comp sci|1001|smith, jane|0|2015|110|120|8|78.5|cpsc";
    const ROW_B: &str = "linear algebra|1002|lee, kim|2|2016|221|80|20|71.25|math\r";

    #[test]
    fn test_parse_row() {
        let record = parse_row(ROW_A).unwrap();
        assert!(record.validate_schema().is_ok());
        assert_eq!(record.get(Field::Average), Some(&Value::Number(78.5)));
        assert_eq!(record.get(Field::Id), Some(&Value::Text("110".into())));
        assert_eq!(record.get(Field::Instructor), Some(&Value::Text("smith, jane".into())));
    }

    #[test]
    fn test_parse_row_rejects_bad_numbers() {
        assert!(parse_row("t|u|i|x|2015|1|1|1|1.0|d").is_err());
        assert!(parse_row("t|u|i|0|2015|1|1|1|high|d").is_err());
        assert!(parse_row("t|u|i|0").is_err());
    }

    #[test]
    fn test_import_reads_sections_in_order() {
        let bytes = archive(&[
            ("courses/CPSC110", section(&[ROW_A]).as_str()),
            ("courses/MATH221", section(&[ROW_B]).as_str()),
        ]);

        let records = import_archive(&bytes, DatasetKind::Courses).unwrap();
        assert_eq!(records.len(), 2);
        // Trailing carriage return is trimmed from the department
        assert_eq!(records[1].get(Field::Department), Some(&Value::Text("math".into())));
    }

    #[test]
    fn test_import_skips_short_and_foreign_files() {
        let bytes = archive(&[
            ("courses/EMPTY", HEADER),
            ("readme.txt", section(&[ROW_A]).as_str()),
            ("courses/CPSC110", section(&[ROW_A, "", "garbage row"]).as_str()),
        ]);

        let records = import_archive(&bytes, DatasetKind::Courses).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_import_reads_zip_archives() {
        let bytes = zip_archive(&[
            ("courses/EMPTY", HEADER),
            ("courses/CPSC110", section(&[ROW_A]).as_str()),
            ("courses/MATH221", section(&[ROW_B]).as_str()),
        ]);
        assert!(bytes.starts_with(ZIP_MAGIC));

        let records = import_archive(&bytes, DatasetKind::Courses).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get(Field::Pass), Some(&Value::Number(120.0)));
        assert_eq!(records[1].get(Field::Department), Some(&Value::Text("math".into())));
    }

    #[test]
    fn test_truncated_zip_is_refused() {
        let bytes = zip_archive(&[("courses/CPSC110", section(&[ROW_A]).as_str())]);
        let truncated = &bytes[..bytes.len() / 2];

        assert!(matches!(
            import_archive(truncated, DatasetKind::Courses),
            Err(StoreError::ImportFailed(_))
        ));
    }

    #[test]
    fn test_import_with_no_rows_fails() {
        let bytes = archive(&[("courses/EMPTY", HEADER)]);
        assert!(matches!(
            import_archive(&bytes, DatasetKind::Courses),
            Err(StoreError::ImportFailed(_))
        ));
    }

    #[test]
    fn test_import_rejects_garbage_and_rooms() {
        assert!(import_archive(b"not a tar archive at all", DatasetKind::Courses).is_err());

        let bytes = archive(&[("courses/CPSC110", section(&[ROW_A]).as_str())]);
        assert!(matches!(
            import_archive(&bytes, DatasetKind::Rooms),
            Err(StoreError::ImportFailed(_))
        ));
    }
}
