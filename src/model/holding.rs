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

use log::debug;

use crate::earth::coordinate::normalize_degrees;

use super::restrictions::TurnDirection;

/// Leg time flown when a holding defines neither distance nor time.
pub const DEFAULT_LEG_TIME_MIN: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldingEntry {
    Direct,
    DirectIntercept,
    Teardrop,
    Parallel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HoldingStatus {
    #[default]
    Inactive,
    EntryToFix,
    EntryParallelOutbound,
    EntryParallelTurn,
    EntryTeardropOutbound,
    EntryTeardropTurn,
    EntryDirectIntercept,
    InsideTurn1,
    InsideLeg1,
    InsideTurn2,
    InsideLeg2,
}

/// Triggers reported by the guidance loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldingEvent {
    FixCrossed,
    LegCompleted,
    TurnCompleted,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Holding {
    inbound_track: Option<f64>,
    turn: Option<TurnDirection>,
    leg_distance_nm: Option<f64>,
    leg_time_min: Option<f64>,
    status: HoldingStatus,
    entry: Option<HoldingEntry>,
    exit_requested: bool,
}

impl Holding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_inbound_track(&self) -> f64 {
        self.inbound_track.unwrap_or(0.0)
    }

    pub fn set_inbound_track(&mut self, track: f64) {
        self.inbound_track = Some(normalize_degrees(track));
    }

    pub fn get_outbound_track(&self) -> f64 {
        normalize_degrees(self.get_inbound_track() + 180.0)
    }

    pub fn is_left_turn(&self) -> bool {
        self.turn == Some(TurnDirection::Left)
    }

    pub fn set_left_turn(&mut self, left: bool) {
        self.turn = Some(if left {
            TurnDirection::Left
        } else {
            TurnDirection::Right
        });
    }

    pub fn get_leg_distance_nm(&self) -> Option<f64> {
        self.leg_distance_nm
    }

    pub fn set_leg_distance_nm(&mut self, distance: f64) {
        self.leg_distance_nm = Some(distance);
        self.leg_time_min = None;
    }

    pub fn get_leg_time_min(&self) -> Option<f64> {
        self.leg_time_min
    }

    pub fn set_leg_time_min(&mut self, minutes: f64) {
        self.leg_time_min = Some(minutes);
        self.leg_distance_nm = None;
    }

    /// Outbound leg length flown at `ground_speed` knots.
    pub fn leg_length_nm(&self, ground_speed: f64) -> f64 {
        match (self.leg_distance_nm, self.leg_time_min) {
            (Some(distance), _) => distance,
            (None, Some(time)) => ground_speed * time / 60.0,
            (None, None) => ground_speed * DEFAULT_LEG_TIME_MIN / 60.0,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.inbound_track.is_some()
            || self.turn.is_some()
            || self.leg_distance_nm.is_some()
            || self.leg_time_min.is_some()
    }

    /// Entry procedure for an aircraft arriving at the fix on `track` degrees true.
    /// Sectors are mirrored for left hand holdings.
    pub fn entry_for_track(&self, track: f64) -> HoldingEntry {
        let mut diff = normalize_degrees(track - self.get_inbound_track());
        if self.is_left_turn() {
            diff = normalize_degrees(360.0 - diff);
        }

        if diff <= 110.0 {
            HoldingEntry::Direct
        } else if diff <= 180.0 {
            HoldingEntry::Teardrop
        } else if diff < 290.0 {
            HoldingEntry::Parallel
        } else {
            HoldingEntry::DirectIntercept
        }
    }

    pub fn get_status(&self) -> HoldingStatus {
        self.status
    }

    pub fn get_entry(&self) -> Option<HoldingEntry> {
        self.entry
    }

    pub fn is_active(&self) -> bool {
        self.status != HoldingStatus::Inactive
    }

    /// Start flying the holding, approaching the fix on `track`.
    pub fn activate(&mut self, track: f64) {
        let entry = self.entry_for_track(track);
        debug!("Holding activated with {:?} entry", entry);
        self.entry = Some(entry);
        self.status = HoldingStatus::EntryToFix;
        self.exit_requested = false;
    }

    pub fn deactivate(&mut self) {
        self.status = HoldingStatus::Inactive;
        self.entry = None;
        self.exit_requested = false;
    }

    /// Leave the holding at the next fix crossing.
    pub fn request_exit(&mut self, exit: bool) {
        self.exit_requested = exit;
    }

    pub fn is_exit_requested(&self) -> bool {
        self.exit_requested
    }

    pub fn handle(&mut self, event: HoldingEvent) -> HoldingStatus {
        use HoldingEvent::*;
        use HoldingStatus::*;

        let next = match (self.status, event) {
            (EntryToFix, FixCrossed) => match self.entry {
                Some(HoldingEntry::Parallel) => EntryParallelOutbound,
                Some(HoldingEntry::Teardrop) => EntryTeardropOutbound,
                Some(HoldingEntry::DirectIntercept) => EntryDirectIntercept,
                _ => InsideTurn1,
            },
            (EntryParallelOutbound, LegCompleted) => EntryParallelTurn,
            (EntryParallelTurn, TurnCompleted) => InsideLeg2,
            (EntryTeardropOutbound, LegCompleted) => EntryTeardropTurn,
            (EntryTeardropTurn, TurnCompleted) => InsideLeg2,
            (EntryDirectIntercept, TurnCompleted) => InsideLeg1,
            (InsideTurn1, TurnCompleted) => InsideLeg1,
            (InsideLeg1, LegCompleted) => InsideTurn2,
            (InsideTurn2, TurnCompleted) => InsideLeg2,
            (InsideLeg2, FixCrossed) if self.exit_requested => {
                self.entry = None;
                self.exit_requested = false;
                Inactive
            }
            (InsideLeg2, FixCrossed) => InsideTurn1,
            (status, event) => {
                debug!("Holding ignores {:?} in {:?}", event, status);
                status
            }
        };
        self.status = next;
        next
    }
}

#[cfg(test)]
mod tests {
    use super::{Holding, HoldingEntry, HoldingEvent, HoldingStatus};

    fn holding(inbound: f64, left: bool) -> Holding {
        let mut h = Holding::new();
        h.set_inbound_track(inbound);
        h.set_left_turn(left);
        h
    }

    #[test]
    fn test_validity_and_leg_length() {
        let mut h = Holding::new();
        assert!(!h.is_valid());
        h.set_leg_time_min(1.5);
        assert!(h.is_valid());
        assert_eq!(h.leg_length_nm(240.0), 6.0);

        h.set_leg_distance_nm(4.0);
        assert_eq!(h.get_leg_time_min(), None);
        assert_eq!(h.leg_length_nm(240.0), 4.0);

        h.set_leg_time_min(2.0);
        assert_eq!(h.get_leg_distance_nm(), None);
    }

    #[test]
    fn test_entry_right_hand() {
        let h = holding(90.0, false);
        assert_eq!(h.entry_for_track(90.0), HoldingEntry::Direct);
        assert_eq!(h.entry_for_track(200.0), HoldingEntry::Direct);
        assert_eq!(h.entry_for_track(250.0), HoldingEntry::Teardrop);
        assert_eq!(h.entry_for_track(300.0), HoldingEntry::Parallel);
        assert_eq!(h.entry_for_track(60.0), HoldingEntry::DirectIntercept);
    }

    #[test]
    fn test_entry_left_hand_mirrored() {
        let h = holding(90.0, true);
        assert_eq!(h.entry_for_track(340.0), HoldingEntry::Direct);
        assert_eq!(h.entry_for_track(290.0), HoldingEntry::Teardrop);
        assert_eq!(h.entry_for_track(240.0), HoldingEntry::Parallel);
        assert_eq!(h.entry_for_track(120.0), HoldingEntry::DirectIntercept);
    }

    #[test]
    fn test_parallel_entry_then_exit() {
        let mut h = holding(0.0, false);
        h.activate(200.0);
        assert_eq!(h.get_status(), HoldingStatus::EntryToFix);
        assert_eq!(h.handle(HoldingEvent::FixCrossed), HoldingStatus::EntryParallelOutbound);
        assert_eq!(h.handle(HoldingEvent::LegCompleted), HoldingStatus::EntryParallelTurn);
        assert_eq!(h.handle(HoldingEvent::TurnCompleted), HoldingStatus::InsideLeg2);
        assert_eq!(h.handle(HoldingEvent::FixCrossed), HoldingStatus::InsideTurn1);
        assert_eq!(h.handle(HoldingEvent::TurnCompleted), HoldingStatus::InsideLeg1);
        assert_eq!(h.handle(HoldingEvent::LegCompleted), HoldingStatus::InsideTurn2);
        assert_eq!(h.handle(HoldingEvent::TurnCompleted), HoldingStatus::InsideLeg2);

        h.request_exit(true);
        assert_eq!(h.handle(HoldingEvent::FixCrossed), HoldingStatus::Inactive);
        assert!(!h.is_active());
        assert!(!h.is_exit_requested());
    }

    #[test]
    fn test_unexpected_event_ignored() {
        let mut h = holding(0.0, false);
        assert_eq!(h.handle(HoldingEvent::FixCrossed), HoldingStatus::Inactive);
        h.activate(0.0);
        assert_eq!(h.handle(HoldingEvent::LegCompleted), HoldingStatus::EntryToFix);
        assert_eq!(h.handle(HoldingEvent::FixCrossed), HoldingStatus::InsideTurn1);
    }
}
