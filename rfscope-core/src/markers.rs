//! User-placed markers and the live cursor marker.

use std::collections::HashSet;

use crate::scale::round_to;
use crate::types::Pane;

pub const DEFAULT_MAX_MARKERS: usize = 16;

/// A persisted, user-placed marker.
#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    /// Canvas position at placement, truncated to whole pixels.
    pub x: i32,
    pub y: i32,
    pub freq_mhz: f64,
    pub power_db: f64,
    /// Seconds since the first frame of the session.
    pub time: f64,
    pub visible: bool,
    /// History input count when placed; spectrogram markers scroll with it.
    pub input_count: u64,
    pub pane: Pane,
    /// Frequency difference (MHz) to the marker that was last at insertion.
    pub delta_mhz: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaceOutcome {
    Added(usize),
    DuplicatePosition,
    Full,
}

/// One row of the marker table, already formatted for display.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkerRow {
    pub index: usize,
    pub frequency: String,
    pub power: String,
    pub time: String,
    pub delta: String,
    pub visible: bool,
}

/// Insertion-ordered markers, unique by canvas x.
pub struct MarkerSet {
    markers: Vec<Marker>,
    positions: HashSet<i32>,
    capacity: usize,
}

impl MarkerSet {
    pub fn new(capacity: usize) -> Self {
        Self {
            markers: Vec::new(),
            positions: HashSet::new(),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.markers.len() >= self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Marker> {
        self.markers.get(index)
    }

    pub fn last(&self) -> Option<&Marker> {
        self.markers.last()
    }

    /// Add a marker, computing its delta against the current last marker.
    #[allow(clippy::too_many_arguments)]
    pub fn place(
        &mut self,
        freq_mhz: f64,
        power_db: f64,
        time: f64,
        x: f64,
        y: f64,
        input_count: u64,
        pane: Pane,
    ) -> PlaceOutcome {
        let delta_mhz = self
            .last()
            .map(|prev| round_to(freq_mhz - prev.freq_mhz, 3))
            .unwrap_or(0.0);
        self.insert(Marker {
            x: x as i32,
            y: y as i32,
            freq_mhz,
            power_db,
            time,
            visible: true,
            input_count,
            pane,
            delta_mhz,
        })
    }

    fn insert(&mut self, marker: Marker) -> PlaceOutcome {
        if self.is_full() {
            return PlaceOutcome::Full;
        }
        if !self.positions.insert(marker.x) {
            return PlaceOutcome::DuplicatePosition;
        }
        self.markers.push(marker);
        PlaceOutcome::Added(self.markers.len() - 1)
    }

    /// Remove the marker at display index `index` by clearing the set and
    /// re-inserting every other marker in order. Deltas and visibility are
    /// carried over from the original records; indices after `index` shift
    /// down by one.
    pub fn delete(&mut self, index: usize) -> Option<Marker> {
        if index >= self.markers.len() {
            return None;
        }
        let old = std::mem::take(&mut self.markers);
        self.positions.clear();
        let mut removed = None;
        for (i, marker) in old.into_iter().enumerate() {
            if i == index {
                removed = Some(marker);
            } else {
                self.insert(marker);
            }
        }
        removed
    }

    pub fn toggle_visibility(&mut self, index: usize) -> Option<bool> {
        let marker = self.markers.get_mut(index)?;
        marker.visible = !marker.visible;
        Some(marker.visible)
    }

    pub fn clear(&mut self) {
        self.markers.clear();
        self.positions.clear();
    }

    pub fn rows(&self) -> Vec<MarkerRow> {
        self.markers
            .iter()
            .enumerate()
            .map(|(index, m)| MarkerRow {
                index,
                frequency: format!("{:.3}", m.freq_mhz),
                power: format!("{:.1}", m.power_db),
                time: format!("{:.6}", m.time),
                delta: format!("{:.3}", m.delta_mhz),
                visible: m.visible,
            })
            .collect()
    }
}

/// Which guides the live marker draws.
///
/// Any combination is valid. The right mouse button steps through
/// off → triangle → frequency + level → level → frequency → off.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LiveMarkerFlags(u8);

impl LiveMarkerFlags {
    pub const NONE: Self = Self(0);
    /// Vertical line at the cursor frequency.
    pub const FREQUENCY_LINE: Self = Self(1);
    /// Horizontal line at the signal level (spectrum) or row time (waterfall).
    pub const LEVEL_OR_TIME_LINE: Self = Self(2);
    /// Small triangle on the trace under the cursor (spectrum only).
    pub const TRIANGLE: Self = Self(4);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn next_on_right_click(self) -> Self {
        match self.0 {
            0 => Self::TRIANGLE,
            n => Self(n - 1),
        }
    }

    /// On/off toggle used by the toolbar button and the `l` key.
    pub fn toggled(self) -> Self {
        if self.is_empty() {
            Self::TRIANGLE
        } else {
            Self::NONE
        }
    }
}

/// Values resolved under a canvas position.
#[derive(Clone, Debug, PartialEq)]
pub struct Readout {
    pub freq_hz: f64,
    pub power_db: f64,
    pub time: f64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub pane: Pane,
    /// The spectrogram row under the cursor, when there is one.
    pub row: Option<std::sync::Arc<[f32]>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(set: &mut MarkerSet, freq: f64, x: f64) -> PlaceOutcome {
        set.place(freq, -40.0, 1.0, x, 10.0, 0, Pane::Spectrum)
    }

    #[test]
    fn test_duplicate_x_rejected() {
        let mut set = MarkerSet::new(16);
        assert_eq!(place(&mut set, 100.0, 50.0), PlaceOutcome::Added(0));
        assert_eq!(place(&mut set, 101.0, 50.4), PlaceOutcome::DuplicatePosition);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_capacity_rejects_seventeenth() {
        let mut set = MarkerSet::new(16);
        for i in 0..16 {
            assert_eq!(place(&mut set, 100.0 + i as f64, i as f64 * 10.0), PlaceOutcome::Added(i));
        }
        assert_eq!(place(&mut set, 200.0, 999.0), PlaceOutcome::Full);
        assert_eq!(set.len(), 16);
    }

    #[test]
    fn test_delta_against_previous_marker() {
        let mut set = MarkerSet::new(16);
        place(&mut set, 100.0, 1.0);
        place(&mut set, 100.25, 2.0);
        place(&mut set, 99.5, 3.0);
        let deltas: Vec<f64> = set.iter().map(|m| m.delta_mhz).collect();
        assert_eq!(deltas, vec![0.0, 0.25, -0.75]);
    }

    #[test]
    fn test_delete_middle_preserves_order_and_deltas() {
        let mut set = MarkerSet::new(16);
        for (i, f) in [100.0, 101.0, 103.0, 106.0].iter().enumerate() {
            place(&mut set, *f, i as f64 * 10.0);
        }
        set.toggle_visibility(3);
        let before: Vec<Marker> = set.iter().cloned().collect();

        let removed = set.delete(1).unwrap();
        assert_eq!(removed, before[1]);

        let after: Vec<Marker> = set.iter().cloned().collect();
        let expected: Vec<Marker> = before
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != 1)
            .map(|(_, m)| m.clone())
            .collect();
        assert_eq!(after, expected);
        assert!(!after[2].visible, "visibility survives the rebuild");

        // The freed x position can be reused.
        assert_eq!(place(&mut set, 200.0, 10.0), PlaceOutcome::Added(3));
    }

    #[test]
    fn test_delete_out_of_range() {
        let mut set = MarkerSet::new(16);
        place(&mut set, 1.0, 1.0);
        assert!(set.delete(5).is_none());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_toggle_visibility_keeps_slot() {
        let mut set = MarkerSet::new(16);
        place(&mut set, 1.0, 1.0);
        assert_eq!(set.toggle_visibility(0), Some(false));
        assert_eq!(set.len(), 1);
        assert_eq!(set.toggle_visibility(0), Some(true));
        assert_eq!(set.toggle_visibility(4), None);
    }

    #[test]
    fn test_rows_formatting() {
        let mut set = MarkerSet::new(16);
        set.place(433.92, -47.3, 1.5, 5.0, 5.0, 0, Pane::Spectrogram);
        let rows = set.rows();
        assert_eq!(
            rows[0],
            MarkerRow {
                index: 0,
                frequency: "433.920".into(),
                power: "-47.3".into(),
                time: "1.500000".into(),
                delta: "0.000".into(),
                visible: true,
            }
        );
    }

    #[test]
    fn test_live_flags_right_click_cycle() {
        let mut f = LiveMarkerFlags::NONE;
        let mut seen = Vec::new();
        for _ in 0..5 {
            f = f.next_on_right_click();
            seen.push(f);
        }
        assert_eq!(seen[0], LiveMarkerFlags::TRIANGLE);
        assert_eq!(
            seen[1],
            LiveMarkerFlags::FREQUENCY_LINE.union(LiveMarkerFlags::LEVEL_OR_TIME_LINE)
        );
        assert_eq!(seen[2], LiveMarkerFlags::LEVEL_OR_TIME_LINE);
        assert_eq!(seen[3], LiveMarkerFlags::FREQUENCY_LINE);
        assert_eq!(seen[4], LiveMarkerFlags::NONE);
        assert!(seen[1].contains(LiveMarkerFlags::FREQUENCY_LINE));
        assert!(!seen[1].contains(LiveMarkerFlags::TRIANGLE));
    }
}
