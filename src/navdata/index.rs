/*
 * Copyright (c) 2003-2023. Trevor Campbell and others.
 *
 * This file is part of Kelpie FMC.
 *
 * Kelpie FMC is free software; you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation; either version 2 of the License, or
 * (at your option) any later version.
 *
 * Kelpie FMC is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Kelpie FMC; if not, write to the Free Software
 * Foundation, Inc., 59 Temple Place, Suite 330, Boston, MA  02111-1307  USA
 *
 * Contributors:
 *      Trevor Campbell
 *
 */

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RouteError};
use crate::util::open_data_file;
use crate::util::procedure_parser::ProcedureParser;

/// Byte offset of every airport section of the procedure file, cached on disk as JSON.
/// The cache is keyed by the length of the procedure file it was built from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcedureIndex {
    source_len: u64,
    offsets: HashMap<String, u64>,
}

impl ProcedureIndex {
    pub fn build(source: &Path) -> Result<Self> {
        let source_len = fs::metadata(source)?.len();
        let mut reader = open_data_file(source).map_err(data_error)?;
        let mut parser = ProcedureParser::new();
        let offsets = parser.index_airports(&mut reader).map_err(data_error)?;
        Ok(Self { source_len, offsets })
    }

    /// Reuse the index stored at `index` when it matches `source`, otherwise build and store a new one.
    pub fn load_or_build(index: Option<&Path>, source: &Path) -> Result<Self> {
        let Some(index) = index else {
            return Self::build(source);
        };
        let source_len = fs::metadata(source)?.len();
        if let Some(cached) = Self::read(index) {
            if cached.source_len == source_len {
                info!("Using procedure index {}", index.display());
                return Ok(cached);
            }
            info!("Procedure index {} is stale, rebuilding", index.display());
        }
        let built = Self::build(source)?;
        built.store(index);
        Ok(built)
    }

    pub fn get_offset(&self, airport: &str) -> Option<u64> {
        self.offsets.get(airport).copied()
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    fn read(path: &Path) -> Option<Self> {
        let file = File::open(path).ok()?;
        match serde_json::from_reader(BufReader::new(file)) {
            Ok(index) => Some(index),
            Err(e) => {
                warn!("Ignoring unreadable procedure index {}: {}", path.display(), e);
                None
            }
        }
    }

    fn store(&self, path: &Path) {
        let result = File::create(path)
            .map_err(|e| e.to_string())
            .and_then(|f| serde_json::to_writer(BufWriter::new(f), self).map_err(|e| e.to_string()));
        if let Err(e) = result {
            warn!("Unable to write procedure index {}: {}", path.display(), e);
        }
    }
}

/// Navdata sources report plain messages, surfaced as invalid data.
pub(crate) fn data_error(message: String) -> RouteError {
    RouteError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, message))
}
