//! Clocked layout
//!
//! Adds clock phases to a tile grid. Signal-flow direction between adjacent
//! tiles follows from their phases: `t2` feeds `t1` iff
//! `clock(t2) + 1 == clock(t1) (mod K)`.
//!
//! Crossing-layer tiles share the phase of the ground tile below them.

use crate::clocking::{default_clocking_scheme, get_clocking_scheme, ClockingScheme};
use crate::error::{LayoutError, Result};
use crate::tile::{Tile, TileLayout, Topology};
use std::collections::HashMap;
use std::sync::Arc;

/// Clock queries shared by clocked and gate-level layouts
pub trait Clocked: Topology {
    fn clocking_scheme(&self) -> &ClockingScheme;

    fn get_clock_number(&self, t: &Tile) -> u8;

    /// Extra full clock cycles a synchronization element on `t` holds a signal
    fn get_synchronization_element(&self, _t: &Tile) -> u8 {
        0
    }

    fn num_clocks(&self) -> u8 {
        self.clocking_scheme().num_clocks
    }

    fn is_regularly_clocked(&self) -> bool {
        self.clocking_scheme().is_regular()
    }

    fn is_clocking_scheme(&self, name: &str) -> bool {
        self.clocking_scheme().name.eq_ignore_ascii_case(name)
    }

    /// `t2` can send information into `t1`
    fn is_incoming_clocked(&self, t1: &Tile, t2: &Tile) -> bool {
        if t1 == t2 {
            return false;
        }
        let k = self.num_clocks();
        (self.get_clock_number(t2) + 1) % k == self.get_clock_number(t1)
    }

    /// `t1` can send information into `t2`
    fn is_outgoing_clocked(&self, t1: &Tile, t2: &Tile) -> bool {
        if t1 == t2 {
            return false;
        }
        let k = self.num_clocks();
        (self.get_clock_number(t1) + 1) % k == self.get_clock_number(t2)
    }

    /// Cardinal neighbors that can feed `t`
    fn incoming_clocked_zones(&self, t: &Tile) -> Vec<Tile> {
        self.adjacent_coordinates(t)
            .into_iter()
            .filter(|n| self.is_incoming_clocked(t, n))
            .collect()
    }

    /// Cardinal neighbors that `t` can feed
    fn outgoing_clocked_zones(&self, t: &Tile) -> Vec<Tile> {
        self.adjacent_coordinates(t)
            .into_iter()
            .filter(|n| self.is_outgoing_clocked(t, n))
            .collect()
    }

    fn in_degree(&self, t: &Tile) -> usize {
        self.incoming_clocked_zones(t).len()
    }

    fn out_degree(&self, t: &Tile) -> usize {
        self.outgoing_clocked_zones(t).len()
    }

    fn degree(&self, t: &Tile) -> usize {
        self.in_degree(t) + self.out_degree(t)
    }
}

/// Tile layout with a clocking scheme
#[derive(Debug, Clone)]
pub struct ClockedLayout {
    tiles: TileLayout,
    scheme: Arc<ClockingScheme>,
    /// Phases of irregular schemes, keyed by ground tile
    clock_numbers: HashMap<Tile, u8>,
    synchronization_elements: HashMap<Tile, u8>,
}

impl ClockedLayout {
    /// Layout clocked with the default scheme
    pub fn new(aspect_ratio: Tile) -> Self {
        Self::with_scheme(aspect_ratio, default_clocking_scheme())
    }

    pub fn with_scheme(aspect_ratio: Tile, scheme: Arc<ClockingScheme>) -> Self {
        Self {
            tiles: TileLayout::new(aspect_ratio),
            scheme,
            clock_numbers: HashMap::new(),
            synchronization_elements: HashMap::new(),
        }
    }

    /// Layout clocked with the scheme called `name`
    pub fn with_scheme_name(aspect_ratio: Tile, name: &str) -> Result<Self> {
        let scheme = get_clocking_scheme(name)
            .ok_or_else(|| LayoutError::UnknownClockingScheme(name.to_string()))?;
        Ok(Self::with_scheme(aspect_ratio, scheme))
    }

    pub fn resize(&mut self, aspect_ratio: Tile) {
        self.tiles.resize(aspect_ratio);
    }

    pub fn shared_clocking_scheme(&self) -> Arc<ClockingScheme> {
        Arc::clone(&self.scheme)
    }

    /// Set the phase of `t`. Regular schemes fix all phases, so the call
    /// has no effect on them.
    pub fn assign_clock_number(&mut self, t: &Tile, clock: u8) {
        if self.scheme.is_regular() {
            log::debug!(
                "Ignoring clock number {} for {} under regular scheme {}",
                clock,
                t,
                self.scheme.name
            );
            return;
        }
        self.clock_numbers
            .insert(Tile::ground(t.x, t.y), clock % self.scheme.num_clocks);
    }

    /// Let the wire on `t` hold its signal for `cycles` extra clock cycles
    pub fn assign_synchronization_element(&mut self, t: &Tile, cycles: u8) {
        let key = Tile::ground(t.x, t.y);
        if cycles == 0 {
            self.synchronization_elements.remove(&key);
        } else {
            self.synchronization_elements.insert(key, cycles);
        }
    }

    pub fn is_synchronization_element(&self, t: &Tile) -> bool {
        self.get_synchronization_element(t) > 0
    }

    /// Number of tiles carrying a synchronization element
    pub fn num_se(&self) -> usize {
        self.synchronization_elements.len()
    }
}

impl Topology for ClockedLayout {
    fn aspect_ratio(&self) -> Tile {
        self.tiles.aspect_ratio()
    }
}

impl Clocked for ClockedLayout {
    fn clocking_scheme(&self) -> &ClockingScheme {
        &self.scheme
    }

    fn get_clock_number(&self, t: &Tile) -> u8 {
        if self.scheme.is_regular() {
            self.scheme.clock_number(&Tile::ground(t.x, t.y))
        } else {
            self.clock_numbers
                .get(&Tile::ground(t.x, t.y))
                .copied()
                .unwrap_or(0)
        }
    }

    fn get_synchronization_element(&self, t: &Tile) -> u8 {
        self.synchronization_elements
            .get(&Tile::ground(t.x, t.y))
            .copied()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scheme() {
        let lyt = ClockedLayout::new(Tile::new(3, 3, 0));
        assert!(lyt.is_clocking_scheme("2DDWave"));
        assert!(lyt.is_regularly_clocked());
        assert_eq!(lyt.num_clocks(), 4);
    }

    #[test]
    fn test_unknown_scheme_is_rejected() {
        let err = ClockedLayout::with_scheme_name(Tile::new(1, 1, 0), "NOPE").unwrap_err();
        assert!(matches!(err, LayoutError::UnknownClockingScheme(name) if name == "NOPE"));
    }

    #[test]
    fn test_two_d_d_wave_flows_south_east() {
        let lyt = ClockedLayout::new(Tile::new(4, 4, 1));
        for t in lyt.ground_coordinates() {
            let east = lyt.east(&t);
            let south = lyt.south(&t);
            if east != t {
                assert!(lyt.is_outgoing_clocked(&t, &east));
                assert!(lyt.is_incoming_clocked(&east, &t));
                assert_eq!(
                    lyt.get_clock_number(&east),
                    (lyt.get_clock_number(&t) + 1) % 4
                );
            }
            if south != t {
                assert!(lyt.is_outgoing_clocked(&t, &south));
                assert!(!lyt.is_outgoing_clocked(&south, &t));
            }
        }
        let center = Tile::new(2, 2, 0);
        assert_eq!(lyt.incoming_clocked_zones(&center), vec![Tile::new(2, 1, 0), Tile::new(1, 2, 0)]);
        assert_eq!(lyt.outgoing_clocked_zones(&center), vec![Tile::new(3, 2, 0), Tile::new(2, 3, 0)]);
        assert_eq!(lyt.degree(&center), 4);
        assert_eq!(lyt.in_degree(&Tile::new(0, 0, 0)), 0);
    }

    #[test]
    fn test_crossing_layer_shares_clock() {
        let lyt = ClockedLayout::new(Tile::new(2, 2, 1));
        assert_eq!(
            lyt.get_clock_number(&Tile::new(1, 2, 1)),
            lyt.get_clock_number(&Tile::new(1, 2, 0))
        );
    }

    #[test]
    fn test_assign_clock_number() {
        let mut regular = ClockedLayout::new(Tile::new(2, 2, 0));
        regular.assign_clock_number(&Tile::new(1, 1, 0), 3);
        assert_eq!(regular.get_clock_number(&Tile::new(1, 1, 0)), 2);

        let mut open = ClockedLayout::with_scheme_name(Tile::new(2, 2, 0), "Open").unwrap();
        assert_eq!(open.get_clock_number(&Tile::new(1, 1, 0)), 0);
        open.assign_clock_number(&Tile::new(1, 1, 0), 3);
        open.assign_clock_number(&Tile::new(2, 1, 0), 0);
        assert_eq!(open.get_clock_number(&Tile::new(1, 1, 0)), 3);
        assert!(open.is_outgoing_clocked(&Tile::new(1, 1, 0), &Tile::new(2, 1, 0)));
    }

    #[test]
    fn test_synchronization_elements() {
        let mut lyt = ClockedLayout::new(Tile::new(2, 2, 0));
        let t = Tile::new(1, 0, 0);
        lyt.assign_synchronization_element(&t, 2);
        assert!(lyt.is_synchronization_element(&t));
        assert_eq!(lyt.get_synchronization_element(&t), 2);
        assert_eq!(lyt.num_se(), 1);
        lyt.assign_synchronization_element(&t, 0);
        assert_eq!(lyt.num_se(), 0);
    }
}
