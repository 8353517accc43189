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

pub struct LatLongFormat {
    pos_token: char,
    neg_token: char,
    degree_digits: usize,
}

impl LatLongFormat {
    pub fn lat_format() -> Self {
        LatLongFormat {
            pos_token: 'N',
            neg_token: 'S',
            degree_digits: 2,
        }
    }

    pub fn long_format() -> Self {
        LatLongFormat {
            pos_token: 'E',
            neg_token: 'W',
            degree_digits: 3,
        }
    }

    /// CDU style, hemisphere first with decimal minutes, e.g. `N47°15.6`.
    pub fn format(&self, number: f64) -> String {
        let token = if number < 0.0 { self.neg_token } else { self.pos_token };
        let d = number.abs();
        let mut deg = d.floor();
        let mut min = ((d - deg) * 60.0 * 10.0).round() / 10.0;

        if (60.0 - min) < 0.05 {
            min = 0.0;
            deg += 1.0;
        }

        format!(
            "{}{:0width$}\u{00b0}{:04.1}",
            token,
            deg,
            min,
            width = self.degree_digits
        )
    }
}

/// ICAO flight plan coordinate, `4620N01030E` (degrees and minutes) or `46N010E` (degrees).
pub fn parse_icao_coordinate(token: &str) -> Option<(f64, f64)> {
    let bytes = token.as_bytes();
    let lat_end = token.find(|c| c == 'N' || c == 'S')?;
    let (lat_len, lon_len) = match (lat_end, bytes.len().checked_sub(lat_end + 2)?) {
        (4, 5) => (4, 5),
        (2, 3) => (2, 3),
        _ => return None,
    };
    let lon_hemi = *bytes.last()? as char;
    if lon_hemi != 'E' && lon_hemi != 'W' {
        return None;
    }

    let lat_digits = &token[..lat_len];
    let lon_digits = &token[lat_len + 1..lat_len + 1 + lon_len];
    let lat = degrees_minutes(lat_digits, 2)?;
    let lon = degrees_minutes(lon_digits, 3)?;
    if lat > 90.0 || lon > 180.0 {
        return None;
    }

    let lat = if bytes[lat_end] as char == 'S' { -lat } else { lat };
    let lon = if lon_hemi == 'W' { -lon } else { lon };
    Some((lat, lon))
}

fn degrees_minutes(digits: &str, degree_len: usize) -> Option<f64> {
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let deg = digits[..degree_len].parse::<f64>().ok()?;
    let min = if digits.len() > degree_len {
        digits[degree_len..].parse::<f64>().ok()?
    } else {
        0.0
    };
    if min >= 60.0 {
        return None;
    }
    Some(deg + min / 60.0)
}

#[cfg(test)]
mod tests {
    use super::{LatLongFormat, parse_icao_coordinate};

    #[test]
    fn test_fmt_lat() {
        let formatter = LatLongFormat::lat_format();
        assert_eq!(formatter.format(34.5), "N34\u{00b0}30.0");
        assert_eq!(formatter.format(-34.5), "S34\u{00b0}30.0");
        assert_eq!(formatter.format(-0.25), "S00\u{00b0}15.0");
    }

    #[test]
    fn test_fmt_long() {
        let formatter = LatLongFormat::long_format();
        assert_eq!(formatter.format(15.4), "E015\u{00b0}24.0");
        assert_eq!(formatter.format(-122.5), "W122\u{00b0}30.0");
        assert_eq!(formatter.format(10.99999), "E011\u{00b0}00.0");
    }

    #[test]
    fn test_icao_coordinate() {
        assert_eq!(parse_icao_coordinate("4630N01030E"), Some((46.5, 10.5)));
        assert_eq!(parse_icao_coordinate("46S010W"), Some((-46.0, -10.0)));
        assert_eq!(parse_icao_coordinate("LOWG"), None);
        assert_eq!(parse_icao_coordinate("4699N01030E"), None);
        assert_eq!(parse_icao_coordinate("46N010X"), None);
    }
}
