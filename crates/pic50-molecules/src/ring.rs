//! Ring perception.
//!
//! Builds a smallest set of smallest rings from the shortest cycle through
//! every ring bond, keeping candidates that are linearly independent over
//! GF(2) until the cyclomatic number is reached.

use std::collections::VecDeque;

use crate::molecule::Molecule;

/// Ring membership for a molecule.
#[derive(Debug, Clone, Default)]
pub struct RingInfo {
    /// Atom indices of each ring, in traversal order.
    pub rings: Vec<Vec<usize>>,
    /// Bond indices of each ring.
    pub ring_bonds: Vec<Vec<usize>>,
    /// Number of rings each atom belongs to.
    pub atom_ring_count: Vec<usize>,
    /// Number of rings each bond belongs to.
    pub bond_ring_count: Vec<usize>,
}

impl RingInfo {
    pub fn perceive(mol: &Molecule) -> Self {
        let n_bonds = mol.bond_count();
        let mut candidates: Vec<(Vec<usize>, Vec<usize>)> = Vec::new();

        for bi in 0..n_bonds {
            if let Some(cycle) = shortest_cycle_through(mol, bi) {
                let mut key = cycle.1.clone();
                key.sort_unstable();
                if !candidates.iter().any(|(_, b)| {
                    let mut other = b.clone();
                    other.sort_unstable();
                    other == key
                }) {
                    candidates.push(cycle);
                }
            }
        }

        candidates.sort_by(|a, b| {
            a.0.len().cmp(&b.0.len()).then_with(|| {
                let mut sa = a.0.clone();
                let mut sb = b.0.clone();
                sa.sort_unstable();
                sb.sort_unstable();
                sa.cmp(&sb)
            })
        });

        let components = mol.components().len();
        let cyclomatic = (n_bonds + components).saturating_sub(mol.atom_count());

        let words = n_bonds / 64 + 1;
        let mut basis: Vec<Vec<u64>> = Vec::new();
        let mut info = RingInfo {
            atom_ring_count: vec![0; mol.atom_count()],
            bond_ring_count: vec![0; n_bonds],
            ..Default::default()
        };

        for (atoms, bonds) in candidates {
            if info.rings.len() >= cyclomatic {
                break;
            }
            let mut vector = vec![0u64; words];
            for &b in &bonds {
                vector[b / 64] |= 1 << (b % 64);
            }
            if reduce(&basis, &mut vector) {
                basis.push(vector);
                basis.sort_by(|a, b| leading_bit(b).cmp(&leading_bit(a)));
                for &a in &atoms {
                    info.atom_ring_count[a] += 1;
                }
                for &b in &bonds {
                    info.bond_ring_count[b] += 1;
                }
                info.rings.push(atoms);
                info.ring_bonds.push(bonds);
            }
        }

        info
    }

    pub fn num_rings(&self) -> usize {
        self.rings.len()
    }

    pub fn atom_in_ring(&self, atom: usize) -> bool {
        self.atom_ring_count.get(atom).copied().unwrap_or(0) > 0
    }

    pub fn bond_in_ring(&self, bond: usize) -> bool {
        self.bond_ring_count.get(bond).copied().unwrap_or(0) > 0
    }

    /// A ring is aromatic when every member atom is.
    pub fn is_aromatic(&self, mol: &Molecule, ring: usize) -> bool {
        self.rings[ring].iter().all(|&a| mol.atoms[a].is_aromatic)
    }

    pub fn is_heterocycle(&self, mol: &Molecule, ring: usize) -> bool {
        self.rings[ring].iter().any(|&a| mol.atoms[a].atomic_number() != 6)
    }

    /// No multiple or aromatic bonds inside the ring.
    pub fn is_saturated(&self, mol: &Molecule, ring: usize) -> bool {
        self.ring_bonds[ring]
            .iter()
            .all(|&b| mol.bonds[b].order == crate::molecule::BondOrder::Single)
    }
}

/// Eliminate `vector` against an echelon basis; true if anything remains.
fn reduce(basis: &[Vec<u64>], vector: &mut [u64]) -> bool {
    for row in basis {
        if let Some(pivot) = leading_bit(row) {
            if vector[pivot / 64] & (1 << (pivot % 64)) != 0 {
                for (v, r) in vector.iter_mut().zip(row.iter()) {
                    *v ^= r;
                }
            }
        }
    }
    vector.iter().any(|&w| w != 0)
}

fn leading_bit(v: &[u64]) -> Option<usize> {
    v.iter()
        .enumerate()
        .rev()
        .find(|(_, &w)| w != 0)
        .map(|(i, &w)| i * 64 + 63 - w.leading_zeros() as usize)
}

/// Shortest cycle containing bond `bi`: BFS between its ends without it.
fn shortest_cycle_through(mol: &Molecule, bi: usize) -> Option<(Vec<usize>, Vec<usize>)> {
    let bond = &mol.bonds[bi];
    let (start, goal) = (bond.atom1, bond.atom2);
    let n = mol.atom_count();
    let mut parent: Vec<Option<(usize, usize)>> = vec![None; n];
    let mut seen = vec![false; n];
    let mut queue = VecDeque::new();
    seen[start] = true;
    queue.push_back(start);

    while let Some(curr) = queue.pop_front() {
        if curr == goal {
            break;
        }
        for &(next, via) in &mol.adjacency[curr] {
            if via == bi || seen[next] {
                continue;
            }
            seen[next] = true;
            parent[next] = Some((curr, via));
            queue.push_back(next);
        }
    }

    if !seen[goal] {
        return None;
    }

    let mut atoms = vec![goal];
    let mut bonds = vec![bi];
    let mut curr = goal;
    while let Some((prev, via)) = parent[curr] {
        atoms.push(prev);
        bonds.push(via);
        curr = prev;
    }
    Some((atoms, bonds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::parse_smiles;

    #[test]
    fn test_benzene_single_ring() {
        let mol = parse_smiles("c1ccccc1").unwrap();
        let info = RingInfo::perceive(&mol);
        assert_eq!(info.num_rings(), 1);
        assert_eq!(info.rings[0].len(), 6);
        assert!(info.is_aromatic(&mol, 0));
        assert!(!info.is_saturated(&mol, 0));
    }

    #[test]
    fn test_naphthalene_two_rings() {
        let mol = parse_smiles("c1ccc2ccccc2c1").unwrap();
        let info = RingInfo::perceive(&mol);
        assert_eq!(info.num_rings(), 2);
        assert!(info.rings.iter().all(|r| r.len() == 6));
        let fused = info.atom_ring_count.iter().filter(|&&c| c == 2).count();
        assert_eq!(fused, 2);
    }

    #[test]
    fn test_acyclic_has_no_rings() {
        let mol = parse_smiles("CCCCO").unwrap();
        let info = RingInfo::perceive(&mol);
        assert_eq!(info.num_rings(), 0);
        assert!(!info.atom_in_ring(0));
    }

    #[test]
    fn test_spiro_rings() {
        let mol = parse_smiles("C1CCC2(C1)CCCC2").unwrap();
        let info = RingInfo::perceive(&mol);
        assert_eq!(info.num_rings(), 2);
        assert_eq!(info.atom_ring_count.iter().filter(|&&c| c == 2).count(), 1);
    }
}
