// Copyright (C) 2025 Ryan Daum <ryan.daum@gmail.com> This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

use crate::reader::{CodeReader, ReadError};
use crate::source::{ScriptSource, SourceError};
use arcstr::ArcStr;
use binary_layout::prelude::*;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use strum::{EnumIter, IntoEnumIterator};
use thiserror::Error;
use tracing::debug;

/// Bytes at the start of every file holding the startup code run by the script's entry point.
pub const HEADER_SIZE: usize = 42;
/// Marker between the identifier and string tables.
pub const SIGNATURE: u32 = 0xFFFF_FFFF;
/// String table size value meaning the file has no string table.
pub const STRING_TABLE_ABSENT: u32 = 0xFFFF_FFFF;

const PROCEDURE_RECORD_SIZE: usize = 24;

binary_layout!(procedure_record, BigEndian, {
    name_offset: u32,
    flags: u32,
    delay: u32,
    condition_offset: u32,
    body_offset: u32,
    argument_count: u32,
});

#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum ParseError {
    #[error("truncated container: {0}")]
    Truncated(#[from] ReadError),
    #[error("procedure #{procedure} refers to identifier offset {offset}, which is not in the identifier table")]
    UnresolvedName { procedure: usize, offset: u32 },
    #[error("{table} table declares {declared} bytes, which does not fit the {available} bytes available")]
    InvalidTableSize {
        table: &'static str,
        declared: u32,
        available: usize,
    },
    #[error("procedure `{procedure}` has {field} offset {offset} outside the code segment ({size} bytes)")]
    OffsetOutOfRange {
        procedure: ArcStr,
        field: &'static str,
        offset: u32,
        size: usize,
    },
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("could not decode script `{name}`: {error}")]
    Parse { name: String, error: ParseError },
}

/// Bit positions of the procedure flag word.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, EnumIter, strum::Display)]
pub enum ProcedureFlag {
    Timed = 0,
    Conditional = 1,
    Imported = 2,
    Exported = 3,
    Critical = 4,
}

/// The flag word of a procedure record. Bits without a known meaning are kept as-is.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct ProcedureFlags(u32);

impl ProcedureFlags {
    pub fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub fn bits(&self) -> u32 {
        self.0
    }

    pub fn contains(&self, flag: ProcedureFlag) -> bool {
        self.0 & (1 << flag as u8) != 0
    }

    pub fn set(&mut self, flag: ProcedureFlag) {
        self.0 |= 1 << flag as u8;
    }

    pub fn with(mut self, flag: ProcedureFlag) -> Self {
        self.set(flag);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = ProcedureFlag> + '_ {
        ProcedureFlag::iter().filter(|f| self.contains(*f))
    }
}

impl Display for ProcedureFlags {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self.iter().map(|flag| flag.to_string()).collect();
        if names.is_empty() {
            return write!(f, "-");
        }
        f.write_str(&names.join("|"))
    }
}

/// A named, independently callable entry point in a script.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Procedure {
    pub name: ArcStr,
    pub flags: ProcedureFlags,
    pub delay: u32,
    pub condition_offset: u32,
    pub body_offset: u32,
    pub argument_count: u32,
}

/// A decoded compiled script file.
///
/// Fully decoded up front and immutable afterwards, so a single `Arc<Container>` can back any
/// number of executions of the same script.
#[derive(Debug, Clone)]
pub struct Container {
    name: String,
    code: Bytes,
    procedures: Vec<Procedure>,
    identifiers: BTreeMap<u32, ArcStr>,
    strings: BTreeMap<u32, ArcStr>,
}

impl Container {
    pub fn load(name: &str, bytes: impl Into<Bytes>) -> Result<Container, ParseError> {
        let code = bytes.into();
        let mut reader = CodeReader::new(code.clone());
        reader.seek(HEADER_SIZE)?;

        let procedure_count = reader.read_u32()? as usize;
        let mut records = Vec::with_capacity(procedure_count.min(reader.remaining() / PROCEDURE_RECORD_SIZE));
        for _ in 0..procedure_count {
            let record = procedure_record::View::new(reader.take(PROCEDURE_RECORD_SIZE)?);
            records.push((
                record.name_offset().read(),
                Procedure {
                    name: ArcStr::new(),
                    flags: ProcedureFlags::from_bits(record.flags().read()),
                    delay: record.delay().read(),
                    condition_offset: record.condition_offset().read(),
                    body_offset: record.body_offset().read(),
                    argument_count: record.argument_count().read(),
                },
            ));
        }

        let identifier_size = reader.read_u32()?;
        let identifiers = read_table(&mut reader, "identifier", identifier_size)?;

        let signature = reader.read_u32()?;
        if signature != SIGNATURE {
            debug!(name, signature, "Unexpected table signature");
        }

        let string_size = reader.read_u32()?;
        let strings = if string_size == STRING_TABLE_ABSENT {
            BTreeMap::new()
        } else {
            read_table(&mut reader, "string", string_size)?
        };

        let mut procedures = Vec::with_capacity(records.len());
        for (index, (name_offset, mut procedure)) in records.into_iter().enumerate() {
            let Some(proc_name) = identifiers.get(&name_offset) else {
                return Err(ParseError::UnresolvedName {
                    procedure: index,
                    offset: name_offset,
                });
            };
            procedure.name = proc_name.clone();
            for (field, offset) in [
                ("body", procedure.body_offset),
                ("condition", procedure.condition_offset),
            ] {
                if offset as usize >= code.len() {
                    return Err(ParseError::OffsetOutOfRange {
                        procedure: procedure.name.clone(),
                        field,
                        offset,
                        size: code.len(),
                    });
                }
            }
            procedures.push(procedure);
        }

        debug!(
            name,
            procedures = procedures.len(),
            identifiers = identifiers.len(),
            strings = strings.len(),
            size = code.len(),
            "Decoded script container"
        );

        Ok(Container {
            name: name.to_string(),
            code,
            procedures,
            identifiers,
            strings,
        })
    }

    /// Fetch `name` through a file lookup service and decode it.
    pub fn load_from(source: &dyn ScriptSource, name: &str) -> Result<Container, LoadError> {
        let bytes = source.read(name)?;
        Container::load(name, bytes).map_err(|error| LoadError::Parse {
            name: name.to_string(),
            error,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> usize {
        self.code.len()
    }

    pub fn code(&self) -> &Bytes {
        &self.code
    }

    /// A fresh cursor at offset 0 over the code segment.
    pub fn reader(&self) -> CodeReader {
        CodeReader::new(self.code.clone())
    }

    pub fn procedures(&self) -> &[Procedure] {
        &self.procedures
    }

    pub fn procedure(&self, name: &str) -> Option<&Procedure> {
        self.procedures.iter().find(|p| p.name.as_str() == name)
    }

    pub fn procedure_index(&self, name: &str) -> Option<usize> {
        self.procedures.iter().position(|p| p.name.as_str() == name)
    }

    pub fn procedure_at(&self, index: usize) -> Option<&Procedure> {
        self.procedures.get(index)
    }

    pub fn has_procedure(&self, name: &str) -> bool {
        self.procedure(name).is_some()
    }

    pub fn identifier(&self, offset: u32) -> Option<&ArcStr> {
        self.identifiers.get(&offset)
    }

    pub fn string(&self, offset: u32) -> Option<&ArcStr> {
        self.strings.get(&offset)
    }

    pub fn identifiers(&self) -> impl Iterator<Item = (u32, &ArcStr)> {
        self.identifiers.iter().map(|(k, v)| (*k, v))
    }

    pub fn strings(&self) -> impl Iterator<Item = (u32, &ArcStr)> {
        self.strings.iter().map(|(k, v)| (*k, v))
    }
}

/// Decode a run of `(u16 length, bytes)` entries filling `declared` bytes. Each entry is keyed by
/// the offset of its first character, counted from the start of the table's size field.
fn read_table(
    reader: &mut CodeReader,
    table: &'static str,
    declared: u32,
) -> Result<BTreeMap<u32, ArcStr>, ParseError> {
    let size = declared as usize;
    let invalid = |available| ParseError::InvalidTableSize {
        table,
        declared,
        available,
    };
    if size > reader.remaining() {
        return Err(invalid(reader.remaining()));
    }

    let mut entries = BTreeMap::new();
    let mut consumed = 0usize;
    while consumed < size {
        if consumed + 2 > size {
            return Err(invalid(size - consumed));
        }
        let length = reader.read_u16()? as usize;
        consumed += 2;
        let key = (consumed + 4) as u32;
        if consumed + length > size {
            return Err(invalid(size - consumed));
        }
        // Latin-1 decoding keeps every byte; padding NULs are dropped.
        let text: String = reader
            .take(length)?
            .iter()
            .filter(|b| **b != 0)
            .map(|b| *b as char)
            .collect();
        consumed += length;
        entries.insert(key, ArcStr::from(text));
    }
    Ok(entries)
}
