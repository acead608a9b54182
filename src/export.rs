//! Rendering of messages for output.
//!
//! Messages are written to any `io::Write` in TXT, CSV or JSON form. The CLI
//! points this at stdout; `write_messages_to_file` targets a path.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Result;
use csv::Writer;

use crate::models::{Message, OutputFormat};

/// Date format used in every output format
const DATE_FORMAT: &str = "%b %d, %Y";

/// Write messages to `writer` in the specified format.
pub fn write_messages<W: Write>(messages: &[Message], format: OutputFormat, writer: W) -> Result<()> {
    match format {
        OutputFormat::Txt => write_txt(messages, writer),
        OutputFormat::Csv => write_csv(messages, writer),
        OutputFormat::Json => write_json(messages, writer),
    }
}

/// Write messages to a file in the specified format.
pub fn write_messages_to_file(messages: &[Message], format: OutputFormat, file_path: &Path) -> Result<()> {
    let file = File::create(file_path)?;
    write_messages(messages, format, BufWriter::new(file))
}

/// Format: `user, date, content` with a blank line between messages
fn write_txt<W: Write>(messages: &[Message], writer: W) -> Result<()> {
    let mut writer = BufWriter::new(writer);

    for message in messages {
        writeln!(
            writer,
            "{}, {}, {}",
            message.user,
            message.send_date.format(DATE_FORMAT),
            message
        )?;
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}

/// Includes header row: `ID, Room, User, Date, Message`
fn write_csv<W: Write>(messages: &[Message], writer: W) -> Result<()> {
    let mut writer = Writer::from_writer(writer);

    writer.write_record(["ID", "Room", "User", "Date", "Message"])?;

    for message in messages {
        writer.write_record([
            message.id.to_string(),
            message.room_id.to_string(),
            message.user.clone(),
            message.send_date.format(DATE_FORMAT).to_string(),
            message.content.clone(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Outputs a JSON array of message objects
fn write_json<W: Write>(messages: &[Message], writer: W) -> Result<()> {
    let mut writer = BufWriter::new(writer);
    serde_json::to_writer_pretty(&mut writer, messages)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
