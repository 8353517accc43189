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

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RouteError {
    /// A precondition of the operation was not met. Route state is unchanged.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Airport {airport} has no runway {runway}")]
    UnknownRunway { airport: String, runway: String },
    #[error("Airway {airway} does not connect {from} and {to}")]
    AirwayNotConnected {
        airway: String,
        from: String,
        to: String,
    },
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("XML error: {0}")]
    Xml(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RouteError>;

impl RouteError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        RouteError::Parse {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        RouteError::InvalidOperation(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::RouteError;

    #[test]
    fn test_messages() {
        let e = RouteError::AirwayNotConnected {
            airway: "UL607".to_string(),
            from: "SPY".to_string(),
            to: "DIK".to_string(),
        };
        assert_eq!(e.to_string(), "Airway UL607 does not connect SPY and DIK");
        assert_eq!(
            RouteError::parse(3, "bad latitude").to_string(),
            "Parse error at line 3: bad latitude"
        );
    }
}
