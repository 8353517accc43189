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

use std::io::BufRead;

use log::{info, warn};

use crate::model::fix::Fix;

use super::{next_line, read_header, token_number};

/// Reader for `fix.dat` 600 (`lat lon id`) and 11xx (`lat lon id terminal region [type]`).
pub struct FixParserFG {
    version: u32,
}

impl FixParserFG {
    pub fn new() -> Self {
        Self { version: 0 }
    }

    pub fn load_fixes(&mut self, fixes: &mut Vec<Fix>, reader: &mut dyn BufRead) -> Result<(), String> {
        self.version = read_header(reader)?;
        info!("Reading fixes, fix.dat version {}", self.version);

        let mut buf = Vec::new();
        let mut line_number = 2;
        while let Some(line) = next_line(reader, &mut buf)? {
            line_number += 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with("//") {
                continue;
            }
            if line == "99" {
                break;
            }
            match Self::parse_fix(line) {
                Ok(fix) => fixes.push(fix),
                Err(e) => warn!("fix.dat line {}: {}", line_number, e),
            }
        }
        Ok(())
    }

    fn parse_fix(line: &str) -> Result<Fix, String> {
        let mut tokenizer = line.split_whitespace();
        let latitude = token_number::<f64>(tokenizer.next(), "latitude")?;
        let longitude = token_number::<f64>(tokenizer.next(), "longitude")?;
        let id = tokenizer.next().ok_or("missing id")?;
        let mut fix = Fix::new(id.to_string(), latitude, longitude);
        if let Some(terminal) = tokenizer.next() {
            fix = fix.with_terminal(terminal);
        }
        if let Some(region) = tokenizer.next() {
            fix = fix.with_region(region);
        }
        Ok(fix)
    }
}

impl Default for FixParserFG {
    fn default() -> Self {
        Self::new()
    }
}
