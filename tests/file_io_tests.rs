//! End-to-end file handle and buffered reader scenarios
//!
//! Exercises open-mode semantics and separator-delimited reading through
//! the public API, the way a config-file consumer would.

use std::fs;

use localfs::{BufferedReader, FileHandle, OpenMode};
use tempfile::TempDir;

#[test]
fn test_append_then_read_back() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("journal.log");
    fs::write(&path, b"one\n")?;

    let mut writer = FileHandle::for_updating(&path)?;
    writer.write_buffer(b"two\n")?;
    writer.write_buffer(b"three\n")?;
    writer.close();

    let mut handle = FileHandle::for_reading(&path)?;
    let mut reader = BufferedReader::new(&mut handle);

    assert_eq!(reader.read_line()?, Some("one".to_string()));
    assert_eq!(reader.read_line()?, Some("two".to_string()));
    assert_eq!(reader.read_line()?, Some("three".to_string()));
    assert_eq!(reader.read_line()?, None);

    Ok(())
}

#[test]
fn test_plain_writing_discards_previous_content() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("journal.log");
    fs::write(&path, vec![b'x'; 100])?;

    let mut writer = FileHandle::open(&path, OpenMode::WRITING)?;
    writer.write_buffer(b"fresh\n")?;
    writer.close();

    assert_eq!(fs::read(&path)?, b"fresh\n");

    Ok(())
}

#[test]
fn test_config_file_scan() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("daemon.conf");
    fs::write(
        &path,
        b"# daemon configuration\n\nport = 2000\n# unused below\n\nname = Example Server\n",
    )?;

    let mut handle = FileHandle::for_reading(&path)?;
    let mut reader = BufferedReader::new(&mut handle);
    let mut directives = Vec::new();

    while let Some(line) = reader.read_config_line()? {
        directives.push(line);
    }

    assert_eq!(directives, vec!["port = 2000", "name = Example Server"]);

    Ok(())
}

#[test]
fn test_offset_survives_reader_recreation() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("lines.txt");
    fs::write(&path, b"first\nsecond\nthird\n")?;

    let mut handle = FileHandle::for_reading(&path)?;

    {
        let mut reader = BufferedReader::new(&mut handle);
        assert_eq!(reader.read_line()?, Some("first".to_string()));
    }

    // The resume position lives in the handle, not the reader.
    assert_eq!(handle.offset(), 6);

    let mut reader = BufferedReader::new(&mut handle);
    assert_eq!(reader.read_line()?, Some("second".to_string()));
    assert_eq!(reader.read_line()?, Some("third".to_string()));
    assert_eq!(reader.read_line()?, None);

    Ok(())
}

#[test]
fn test_temporary_file_line_round_trip() -> anyhow::Result<()> {
    let mut handle = FileHandle::temporary()?;
    handle.write_buffer(b"alpha\nbeta\ngamma")?;
    handle.seek(0);

    let mut reader = BufferedReader::new(&mut handle);

    assert_eq!(reader.read_line()?, Some("alpha".to_string()));
    assert_eq!(reader.read_line()?, Some("beta".to_string()));
    assert_eq!(reader.read_line()?, Some("gamma".to_string()));
    assert_eq!(reader.read_line()?, None);

    Ok(())
}

#[test]
fn test_read_to_end_after_partial_read() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("data.bin");
    fs::write(&path, b"0123456789")?;

    let mut handle = FileHandle::for_reading(&path)?;
    let mut buffer = [0u8; 4];
    handle.read_buffer(&mut buffer)?;

    let mut reader = BufferedReader::new(&mut handle);

    assert_eq!(reader.read_to_end()?, b"456789".to_vec());

    Ok(())
}
