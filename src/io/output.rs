//! Mapping export writers.
//!
//! The renaming core guarantees the entry list; the optional `metadata`
//! block is a free-form object other subsystems may append statistics to.

use crate::naming::{MappingEntry, RenameMap};
use anyhow::Result;
use serde_json::json;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MappingFormat {
    #[default]
    Json,
    Csv,
}

impl MappingFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "json" => Some(MappingFormat::Json),
            "csv" => Some(MappingFormat::Csv),
            _ => None,
        }
    }

    pub fn extension(&self) -> &str {
        match self {
            MappingFormat::Json => "json",
            MappingFormat::Csv => "csv",
        }
    }
}

pub trait MappingWriter {
    fn write_mapping(
        &mut self,
        map: &RenameMap,
        metadata: Option<serde_json::Value>,
    ) -> Result<()>;
}

pub struct JsonMappingWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonMappingWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> MappingWriter for JsonMappingWriter<W> {
    fn write_mapping(
        &mut self,
        map: &RenameMap,
        metadata: Option<serde_json::Value>,
    ) -> Result<()> {
        let document = match metadata {
            Some(metadata) => json!({
                "metadata": metadata,
                "entries": map.entries(),
            }),
            None => json!({ "entries": map.entries() }),
        };
        let rendered = serde_json::to_string_pretty(&document)?;
        self.writer.write_all(rendered.as_bytes())?;
        Ok(())
    }
}

pub struct CsvMappingWriter<W: Write> {
    writer: W,
}

impl<W: Write> CsvMappingWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    fn write_row(&mut self, entry: &MappingEntry) -> Result<()> {
        writeln!(
            self.writer,
            "{},{},{},{}",
            csv_field(&entry.original),
            csv_field(&entry.obfuscated),
            csv_field(&entry.kind),
            csv_field(&entry.source_file),
        )?;
        Ok(())
    }
}

impl<W: Write> MappingWriter for CsvMappingWriter<W> {
    fn write_mapping(
        &mut self,
        map: &RenameMap,
        _metadata: Option<serde_json::Value>,
    ) -> Result<()> {
        writeln!(self.writer, "original,obfuscated,type,source_file")?;
        for entry in map.entries() {
            self.write_row(entry)?;
        }
        Ok(())
    }
}

pub fn create_mapping_writer<W: Write + 'static>(
    format: MappingFormat,
    writer: W,
) -> Box<dyn MappingWriter> {
    match format {
        MappingFormat::Json => Box::new(JsonMappingWriter::new(writer)),
        MappingFormat::Csv => Box::new(CsvMappingWriter::new(writer)),
    }
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
