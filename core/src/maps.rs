//! Typed coordinate maps describing the special structure of a level.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{CellCoord, EntanglementMode};

/// Two superposed cells whose collapse outcomes are linked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntangledPair {
    /// First member of the pair.
    pub first: CellCoord,
    /// Second member of the pair.
    pub second: CellCoord,
    /// Correlation between the members.
    pub mode: EntanglementMode,
}

/// Symmetric map from an entangled cell to its partner and mode.
///
/// Entries are only ever inserted in pairs, so `a -> (b, m)` always implies
/// `b -> (a, m)`. Entries are never removed; a pair simply stops propagating
/// once either member is no longer superposed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntanglementMap {
    links: HashMap<CellCoord, (CellCoord, EntanglementMode)>,
    pairs: Vec<EntangledPair>,
}

impl EntanglementMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Links two cells. Refuses self-links and cells that are already linked.
    pub fn insert_pair(
        &mut self,
        first: CellCoord,
        second: CellCoord,
        mode: EntanglementMode,
    ) -> bool {
        if first == second || self.links.contains_key(&first) || self.links.contains_key(&second)
        {
            return false;
        }

        let _ = self.links.insert(first, (second, mode));
        let _ = self.links.insert(second, (first, mode));
        self.pairs.push(EntangledPair {
            first,
            second,
            mode,
        });
        true
    }

    /// Partner and mode linked to the cell, if any.
    #[must_use]
    pub fn partner(&self, cell: CellCoord) -> Option<(CellCoord, EntanglementMode)> {
        self.links.get(&cell).copied()
    }

    /// Pairs in insertion order.
    #[must_use]
    pub fn pairs(&self) -> &[EntangledPair] {
        &self.pairs
    }

    /// Number of pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Reports whether no pair exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Symmetric one-to-one links between teleport tiles.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeleportMap {
    links: HashMap<CellCoord, CellCoord>,
}

impl TeleportMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Links two teleports. Refuses self-links and teleports already linked.
    pub fn link(&mut self, first: CellCoord, second: CellCoord) -> bool {
        if first == second || self.links.contains_key(&first) || self.links.contains_key(&second)
        {
            return false;
        }

        let _ = self.links.insert(first, second);
        let _ = self.links.insert(second, first);
        true
    }

    /// Teleport linked to the cell, if any.
    #[must_use]
    pub fn destination(&self, cell: CellCoord) -> Option<CellCoord> {
        self.links.get(&cell).copied()
    }

    /// Number of linked pairs.
    #[must_use]
    pub fn pair_count(&self) -> usize {
        self.links.len() / 2
    }
}

/// Hidden path from start to exit whose cells always resolve to open floor.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafeSet {
    path: Vec<CellCoord>,
    members: HashSet<CellCoord>,
}

impl SafeSet {
    /// Builds the set from the carved path, keeping the path order.
    #[must_use]
    pub fn from_path(path: Vec<CellCoord>) -> Self {
        let members = path.iter().copied().collect();
        Self { path, members }
    }

    /// Reports whether the cell lies on the safe path.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.members.contains(&cell)
    }

    /// Carved path from start to exit, in walking order.
    #[must_use]
    pub fn path(&self) -> &[CellCoord] {
        &self.path
    }

    /// Number of distinct cells on the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Reports whether the path is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entanglement_links_are_symmetric() {
        let mut map = EntanglementMap::new();
        let a = CellCoord::new(2, 3);
        let b = CellCoord::new(6, 1);

        assert!(map.insert_pair(a, b, EntanglementMode::Opposite));
        assert_eq!(map.partner(a), Some((b, EntanglementMode::Opposite)));
        assert_eq!(map.partner(b), Some((a, EntanglementMode::Opposite)));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn entanglement_refuses_reused_cells() {
        let mut map = EntanglementMap::new();
        let a = CellCoord::new(2, 3);
        let b = CellCoord::new(6, 1);
        let c = CellCoord::new(4, 4);

        assert!(map.insert_pair(a, b, EntanglementMode::Same));
        assert!(!map.insert_pair(b, c, EntanglementMode::Same));
        assert!(!map.insert_pair(c, c, EntanglementMode::Same));
        assert_eq!(map.partner(c), None);
        assert_eq!(map.pairs().len(), 1);
    }

    #[test]
    fn teleport_links_are_symmetric() {
        let mut map = TeleportMap::new();
        let a = CellCoord::new(3, 3);
        let b = CellCoord::new(9, 7);

        assert!(map.link(a, b));
        assert!(!map.link(a, CellCoord::new(1, 1)));
        assert_eq!(map.destination(a), Some(b));
        assert_eq!(map.destination(b), Some(a));
        assert_eq!(map.pair_count(), 1);
    }

    #[test]
    fn safe_set_deduplicates_membership_but_keeps_path() {
        let path = vec![
            CellCoord::new(1, 1),
            CellCoord::new(2, 1),
            CellCoord::new(2, 1),
        ];
        let safe = SafeSet::from_path(path);

        assert_eq!(safe.path().len(), 3);
        assert_eq!(safe.len(), 2);
        assert!(safe.contains(CellCoord::new(2, 1)));
        assert!(!safe.contains(CellCoord::new(3, 1)));
    }
}
