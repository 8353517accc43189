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

use std::fmt;

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnDirection {
    #[default]
    Auto,
    Left,
    Right,
}

impl TurnDirection {
    pub fn code(&self) -> &'static str {
        match self {
            TurnDirection::Auto => "",
            TurnDirection::Left => "L",
            TurnDirection::Right => "R",
        }
    }

    pub fn from_code(code: &str) -> Option<TurnDirection> {
        match code.trim() {
            "" | "-" | "A" => Some(TurnDirection::Auto),
            "L" => Some(TurnDirection::Left),
            "R" => Some(TurnDirection::Right),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AltitudeRestrictionKind {
    At,
    AtOrAbove,
    AtOrBelow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AltitudeRestriction {
    pub altitude_ft: i32,
    pub kind: AltitudeRestrictionKind,
}

impl AltitudeRestriction {
    pub fn new(altitude_ft: i32, kind: AltitudeRestrictionKind) -> Self {
        Self { altitude_ft, kind }
    }

    /// Whether `altitude_ft` satisfies the restriction.
    pub fn is_met_by(&self, altitude_ft: i32) -> bool {
        match self.kind {
            AltitudeRestrictionKind::At => (altitude_ft - self.altitude_ft).abs() <= 100,
            AltitudeRestrictionKind::AtOrAbove => altitude_ft >= self.altitude_ft - 100,
            AltitudeRestrictionKind::AtOrBelow => altitude_ft <= self.altitude_ft + 100,
        }
    }
}

/// Speed, altitude, overfly and turn constraints attached to a waypoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Restrictions {
    speed_kts: Option<u32>,
    altitude: Option<AltitudeRestriction>,
    overfly: bool,
    turn: TurnDirection,
}

impl Restrictions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_speed_kts(&self) -> Option<u32> {
        self.speed_kts
    }

    pub fn set_speed_kts(&mut self, speed: Option<u32>) {
        self.speed_kts = speed;
    }

    pub fn get_altitude(&self) -> Option<AltitudeRestriction> {
        self.altitude
    }

    pub fn set_altitude(&mut self, altitude: Option<AltitudeRestriction>) {
        self.altitude = altitude;
    }

    pub fn is_overfly(&self) -> bool {
        self.overfly
    }

    pub fn set_overfly(&mut self, overfly: bool) {
        self.overfly = overfly;
    }

    pub fn get_turn(&self) -> TurnDirection {
        self.turn
    }

    pub fn set_turn(&mut self, turn: TurnDirection) {
        self.turn = turn;
    }

    pub fn is_empty(&self) -> bool {
        self.speed_kts.is_none()
            && self.altitude.is_none()
            && !self.overfly
            && self.turn == TurnDirection::Auto
    }

    /// Speed/altitude/turn text, `[speed]/[altitude][A|B][;L|;R]`.
    /// Overfly is carried by the waypoint id and is not part of this text.
    pub fn to_restriction_text(&self) -> String {
        let mut text = String::new();
        if self.speed_kts.is_some() || self.altitude.is_some() {
            if let Some(speed) = self.speed_kts {
                text.push_str(&speed.to_string());
            }
            text.push('/');
            if let Some(alt) = self.altitude {
                text.push_str(&alt.altitude_ft.to_string());
                match alt.kind {
                    AltitudeRestrictionKind::At => (),
                    AltitudeRestrictionKind::AtOrAbove => text.push('A'),
                    AltitudeRestrictionKind::AtOrBelow => text.push('B'),
                }
            }
        }
        if self.turn != TurnDirection::Auto {
            text.push(';');
            text.push_str(self.turn.code());
        }
        text
    }

    /// Parse the text written by [`Restrictions::to_restriction_text`]. Overfly is left unset.
    pub fn parse(text: &str) -> Result<Restrictions, String> {
        let mut restrictions = Restrictions::new();
        let text = text.trim();
        if text.is_empty() {
            return Ok(restrictions);
        }

        let (main, turn) = match text.split_once(';') {
            Some((m, t)) => (m, Some(t)),
            None => (text, None),
        };

        if let Some(turn) = turn {
            restrictions.turn =
                TurnDirection::from_code(turn).ok_or(format!("Invalid turn direction '{}'", turn))?;
        }

        if main.is_empty() {
            return Ok(restrictions);
        }

        let (speed, altitude) = main
            .split_once('/')
            .ok_or(format!("Invalid restriction '{}'", text))?;

        if !speed.is_empty() {
            restrictions.speed_kts = Some(
                speed
                    .parse::<u32>()
                    .map_err(|_| format!("Invalid speed restriction '{}'", speed))?,
            );
        }

        if !altitude.is_empty() {
            restrictions.altitude = Some(parse_altitude(altitude)?);
        }

        Ok(restrictions)
    }
}

fn parse_altitude(text: &str) -> Result<AltitudeRestriction, String> {
    let (value, kind) = if let Some(v) = text.strip_suffix('A') {
        (v, AltitudeRestrictionKind::AtOrAbove)
    } else if let Some(v) = text.strip_suffix('B') {
        (v, AltitudeRestrictionKind::AtOrBelow)
    } else {
        (text, AltitudeRestrictionKind::At)
    };

    let altitude_ft = match value.strip_prefix("FL") {
        Some(level) => level.parse::<i32>().map(|fl| fl * 100),
        None => value.parse::<i32>(),
    }
    .map_err(|_| format!("Invalid altitude restriction '{}'", text))?;

    Ok(AltitudeRestriction::new(altitude_ft, kind))
}

impl fmt::Display for Restrictions {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_restriction_text())
    }
}

/// Speed and altitude at a waypoint, either predicted or recorded on overflight.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetaData {
    pub speed_kts: Option<f64>,
    pub altitude_ft: Option<f64>,
    pub time: Option<DateTime<Utc>>,
}

impl MetaData {
    pub fn is_set(&self) -> bool {
        self.speed_kts.is_some() || self.altitude_ft.is_some() || self.time.is_some()
    }

    pub fn clear(&mut self) {
        *self = MetaData::default();
    }
}
