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
#![forbid(unsafe_code)]

use std::error::Error;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::GzDecoder;
use log::LevelFilter;
use rolling_file::{BasicRollingFileAppender, RollingConditionBasic};
use simplelog::{ColorChoice, CombinedLogger, Config, ConfigBuilder, TermLogger, TerminalMode, WriteLogger};

pub mod airport_parser;
pub mod airway_parser;
pub mod fix_parser;
pub mod lat_long_format;
pub mod location_filter;
pub mod navaid_parser;
pub mod procedure_parser;
pub mod procedure_parser_xml;
pub mod route_reader;
pub mod route_writer;
pub(crate) mod waypoint_codec;

/// Open a navdata source, transparently inflating `.gz` files.
pub fn open_data_file(path: &Path) -> Result<Box<dyn BufRead>, String> {
    let file = File::open(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    let gzipped = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"));
    if gzipped {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Parse a whitespace separated numeric field, naming the field on failure.
pub(crate) fn token_number<T: std::str::FromStr>(token: Option<&str>, field: &str) -> Result<T, String> {
    token
        .ok_or_else(|| format!("missing {}", field))?
        .parse::<T>()
        .map_err(|_| format!("invalid {}", field))
}

/// Read the `I`/`A` line and the version line that open every navdata file.
/// Returns the version number, 0 when it can not be determined.
pub(crate) fn read_header(reader: &mut dyn BufRead) -> Result<u32, String> {
    let mut buf = Vec::new();
    for i in 0..2 {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => return Ok(0),
            Ok(_) => (),
            Err(e) => return Err(e.to_string()),
        }
        if i == 1 {
            // Not always UTF-8, only the leading number matters
            let line = String::from_utf8_lossy(&buf);
            let version = line
                .split_whitespace()
                .next()
                .and_then(|t| t.parse::<u32>().ok())
                .unwrap_or(0);
            return Ok(version);
        }
    }
    Ok(0)
}

/// Next line of a navdata file, None at EOF. Invalid UTF-8 is replaced rather than rejected.
pub(crate) fn next_line(reader: &mut dyn BufRead, buf: &mut Vec<u8>) -> Result<Option<String>, String> {
    buf.clear();
    match reader.read_until(b'\n', buf) {
        Ok(0) => Ok(None),
        Ok(_) => Ok(Some(String::from_utf8_lossy(buf).trim_end().to_string())),
        Err(e) => Err(e.to_string()),
    }
}

pub struct Logger;

impl Logger {
    pub fn new() -> Self {
        Self::init_logger();
        Logger
    }

    fn init_logger() {
        if let Some(home_path) = home::home_dir() {
            let log_path = home_path.join("kelpie-fmc.log");
            let condition = RollingConditionBasic::new()
                .daily()
                .max_size(1024 * 1024);
            let file_appender =
                BasicRollingFileAppender::new(log_path, condition, 2);
            match file_appender {
                Ok(file) => {
                    let config = match ConfigBuilder::new().set_time_offset_to_local() {
                        Ok(builder) | Err(builder) => builder.build(),
                    };
                    let config2 = match ConfigBuilder::new()
                        .set_location_level(LevelFilter::Error)
                        .set_time_format_rfc3339()
                        .set_time_offset_to_local()
                    {
                        Ok(builder) | Err(builder) => builder.build(),
                    };
                    CombinedLogger::init(vec![
                        TermLogger::new(
                            LevelFilter::Warn,
                            config,
                            TerminalMode::Mixed,
                            ColorChoice::Auto,
                        ),
                        WriteLogger::new(
                            LevelFilter::Info,
                            config2,
                            file,
                        ),
                    ]).unwrap_or_else(|e| {
                        Self::print_error(&e);
                    });
                    return;
                }
                Err(e) => {
                    Self::print_error(&e);
                }
            }
        }
        TermLogger::init(
            LevelFilter::Warn,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ).unwrap_or_else(|e| {
            Self::print_error(&e);
        });
    }

    fn print_error(e: &dyn Error) {
        println!("Unable to initiate logger: {}", e);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        log::logger().flush();
    }
}
