//! A* path finding on clocked layouts
//!
//! Paths follow the information flow of the clocking scheme: every step goes
//! from a tile into one of its outgoing clocked zones. On gate-level layouts
//! occupied tiles block the way, except that a wire may be crossed on the
//! crossing layer when crossings are enabled.

use super::distance::manhattan_distance;
use fcn_layout::{Clocked, ClockedLayout, GateLevelLayout, Tile, Topology};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

/// Layouts A* can search
pub trait Obstruction: Clocked {
    /// `t` cannot take a new wire
    fn is_obstructed(&self, _t: &Tile) -> bool {
        false
    }

    /// A wire on the crossing layer may pass over `t`
    fn is_crossable(&self, _t: &Tile) -> bool {
        false
    }
}

impl Obstruction for ClockedLayout {}

impl Obstruction for GateLevelLayout {
    fn is_obstructed(&self, t: &Tile) -> bool {
        !self.is_empty_tile(t)
    }

    fn is_crossable(&self, t: &Tile) -> bool {
        self.is_ground_layer(t) && self.is_wire_tile(t)
    }
}

/// A* configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AStarParams {
    /// Allow hopping over wires on the crossing layer
    pub crossings: bool,
}

/// A* search node
#[derive(Clone, Copy, PartialEq, Eq)]
struct AStarNode {
    tile: Tile,
    g_score: u64,
    f_score: u64,
}

impl Ord for AStarNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse for min-heap; deeper nodes first on ties
        other
            .f_score
            .cmp(&self.f_score)
            .then_with(|| self.g_score.cmp(&other.g_score))
            .then_with(|| other.tile.cmp(&self.tile))
    }
}

impl PartialOrd for AStarNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Shortest clocked path from `source` to `target`, both included.
///
/// Returns `None` if `target` cannot be reached.
pub fn a_star<L: Obstruction>(
    layout: &L,
    source: Tile,
    target: Tile,
    params: &AStarParams,
) -> Option<Vec<Tile>> {
    if !layout.is_within_bounds(&source) || !layout.is_within_bounds(&target) {
        return None;
    }

    let mut open_set = BinaryHeap::new();
    let mut came_from: HashMap<Tile, Tile> = HashMap::new();
    let mut g_scores: HashMap<Tile, u64> = HashMap::new();
    let mut closed_set: HashSet<Tile> = HashSet::new();

    g_scores.insert(source, 0);
    open_set.push(AStarNode {
        tile: source,
        g_score: 0,
        f_score: manhattan_distance(&source, &target),
    });

    while let Some(current) = open_set.pop() {
        if current.tile == target {
            return Some(reconstruct_path(source, target, &came_from));
        }
        if !closed_set.insert(current.tile) {
            continue;
        }

        for neighbor in expand(layout, &current.tile, &target, params) {
            if closed_set.contains(&neighbor) {
                continue;
            }
            let tentative_g = current.g_score + 1;
            let neighbor_g = g_scores.get(&neighbor).copied().unwrap_or(u64::MAX);
            if tentative_g < neighbor_g {
                came_from.insert(neighbor, current.tile);
                g_scores.insert(neighbor, tentative_g);
                open_set.push(AStarNode {
                    tile: neighbor,
                    g_score: tentative_g,
                    f_score: tentative_g + manhattan_distance(&neighbor, &target),
                });
            }
        }
    }

    None
}

/// Number of steps of the shortest clocked path, if one exists
pub fn a_star_distance<L: Obstruction>(
    layout: &L,
    source: Tile,
    target: Tile,
    params: &AStarParams,
) -> Option<u64> {
    a_star(layout, source, target, params).map(|path| path.len() as u64 - 1)
}

/// Tiles reachable from `t` in one step
fn expand<L: Obstruction>(layout: &L, t: &Tile, target: &Tile, params: &AStarParams) -> Vec<Tile> {
    let ground = Tile::ground(t.x, t.y);
    let mut next = Vec::new();
    for zone in layout.outgoing_clocked_zones(&ground) {
        if zone.x == target.x && zone.y == target.y {
            next.push(*target);
        } else if !layout.is_obstructed(&zone) {
            next.push(zone);
        } else if params.crossings && layout.z() > 0 && layout.is_crossable(&zone) {
            let above = layout.above(&zone);
            if !layout.is_obstructed(&above) {
                next.push(above);
            }
        }
    }
    next
}

fn reconstruct_path(source: Tile, target: Tile, came_from: &HashMap<Tile, Tile>) -> Vec<Tile> {
    let mut path = vec![target];
    let mut current = target;
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
        if current == source {
            break;
        }
    }
    path.reverse();
    path
}
