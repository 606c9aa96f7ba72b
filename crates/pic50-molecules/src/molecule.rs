//! Molecular graph representation.

use crate::element::{Element, HYDROGEN};

/// Bond order classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BondOrder {
    Single,
    Double,
    Triple,
    Quadruple,
    Aromatic,
}

impl BondOrder {
    /// Numeric bond order for valence-style sums.
    pub fn as_f64(self) -> f64 {
        match self {
            BondOrder::Single => 1.0,
            BondOrder::Double => 2.0,
            BondOrder::Triple => 3.0,
            BondOrder::Quadruple => 4.0,
            BondOrder::Aromatic => 1.5,
        }
    }
}

/// An atom in a molecular graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub element: &'static Element,
    pub formal_charge: i8,
    pub isotope: Option<u16>,
    pub is_aromatic: bool,
    /// Hydrogens carried as a count rather than as graph nodes.
    pub implicit_hydrogens: u8,
    pub radical_electrons: u8,
    pub has_chirality_tag: bool,
}

impl Atom {
    pub fn new(element: &'static Element) -> Self {
        Self {
            element,
            formal_charge: 0,
            isotope: None,
            is_aromatic: false,
            implicit_hydrogens: 0,
            radical_electrons: 0,
            has_chirality_tag: false,
        }
    }

    pub fn atomic_number(&self) -> u8 {
        self.element.atomic_number
    }

    pub fn is_hydrogen(&self) -> bool {
        self.element.atomic_number == 1
    }
}

/// A bond between two atoms.
#[derive(Debug, Clone, PartialEq)]
pub struct Bond {
    pub atom1: usize,
    pub atom2: usize,
    pub order: BondOrder,
}

impl Bond {
    pub fn other(&self, atom: usize) -> usize {
        if self.atom1 == atom { self.atom2 } else { self.atom1 }
    }
}

/// A molecular graph with atoms, bonds, and adjacency information.
#[derive(Debug, Clone)]
pub struct Molecule {
    pub atoms: Vec<Atom>,
    pub bonds: Vec<Bond>,
    /// adjacency[atom_idx] = Vec<(neighbor_atom_idx, bond_idx)>
    pub adjacency: Vec<Vec<(usize, usize)>>,
}

impl Molecule {
    /// Create a new molecule, building the adjacency list from atoms and bonds.
    pub fn new(atoms: Vec<Atom>, bonds: Vec<Bond>) -> Self {
        let mut adjacency = vec![Vec::new(); atoms.len()];
        for (bi, bond) in bonds.iter().enumerate() {
            adjacency[bond.atom1].push((bond.atom2, bi));
            adjacency[bond.atom2].push((bond.atom1, bi));
        }
        Molecule { atoms, bonds, adjacency }
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    /// Number of non-hydrogen atoms.
    pub fn heavy_atom_count(&self) -> usize {
        self.atoms.iter().filter(|a| !a.is_hydrogen()).count()
    }

    pub fn neighbors(&self, atom_idx: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency[atom_idx].iter().map(|&(n, _)| n)
    }

    /// Graph degree, explicit hydrogens included.
    pub fn degree(&self, atom_idx: usize) -> usize {
        self.adjacency[atom_idx].len()
    }

    /// Number of non-hydrogen neighbours.
    pub fn heavy_degree(&self, atom_idx: usize) -> usize {
        self.neighbors(atom_idx)
            .filter(|&n| !self.atoms[n].is_hydrogen())
            .count()
    }

    /// Hydrogens on an atom whether implicit or present as graph nodes.
    pub fn hydrogen_count(&self, atom_idx: usize) -> usize {
        let explicit = self
            .neighbors(atom_idx)
            .filter(|&n| self.atoms[n].is_hydrogen())
            .count();
        explicit + self.atoms[atom_idx].implicit_hydrogens as usize
    }

    pub fn bond_between(&self, a1: usize, a2: usize) -> Option<&Bond> {
        self.adjacency[a1]
            .iter()
            .find(|&&(n, _)| n == a2)
            .map(|&(_, bi)| &self.bonds[bi])
    }

    /// Bond orders incident to an atom.
    pub fn bond_orders(&self, atom_idx: usize) -> impl Iterator<Item = BondOrder> + '_ {
        self.adjacency[atom_idx].iter().map(|&(_, bi)| self.bonds[bi].order)
    }

    pub fn has_multiple_bond(&self, atom_idx: usize) -> bool {
        self.bond_orders(atom_idx)
            .any(|o| matches!(o, BondOrder::Double | BondOrder::Triple | BondOrder::Quadruple))
    }

    /// Count neighbours of `atom_idx` with the given atomic number joined by `order`.
    pub fn count_neighbors(&self, atom_idx: usize, atomic_number: u8, order: Option<BondOrder>) -> usize {
        self.adjacency[atom_idx]
            .iter()
            .filter(|&&(n, bi)| {
                self.atoms[n].atomic_number() == atomic_number
                    && order.map_or(true, |o| self.bonds[bi].order == o)
            })
            .count()
    }

    /// Sum of bond orders plus hydrogens; aromatic bonds count 1.5.
    pub fn total_valence(&self, atom_idx: usize) -> f64 {
        let bonded: f64 = self.bond_orders(atom_idx).map(BondOrder::as_f64).sum();
        bonded + self.atoms[atom_idx].implicit_hydrogens as f64
    }

    pub fn has_explicit_hydrogens(&self) -> bool {
        self.atoms.iter().any(Atom::is_hydrogen)
    }

    /// Copy of this molecule with every implicit hydrogen turned into a
    /// graph node joined by a single bond. Heavy-atom indices are kept;
    /// the new hydrogens are appended in heavy-atom order.
    pub fn with_explicit_hydrogens(&self) -> Molecule {
        let mut atoms = self.atoms.clone();
        let mut bonds = self.bonds.clone();

        for idx in 0..self.atoms.len() {
            let count = atoms[idx].implicit_hydrogens;
            atoms[idx].implicit_hydrogens = 0;
            for _ in 0..count {
                let h_idx = atoms.len();
                atoms.push(Atom::new(&HYDROGEN));
                bonds.push(Bond { atom1: idx, atom2: h_idx, order: BondOrder::Single });
            }
        }

        Molecule::new(atoms, bonds)
    }

    /// Indices of connected components, one `Vec` per component.
    pub fn components(&self) -> Vec<Vec<usize>> {
        let n = self.atom_count();
        let mut seen = vec![false; n];
        let mut out = Vec::new();
        for start in 0..n {
            if seen[start] {
                continue;
            }
            let mut stack = vec![start];
            let mut members = Vec::new();
            seen[start] = true;
            while let Some(curr) = stack.pop() {
                members.push(curr);
                for next in self.neighbors(curr) {
                    if !seen[next] {
                        seen[next] = true;
                        stack.push(next);
                    }
                }
            }
            members.sort_unstable();
            out.push(members);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::element_by_symbol;

    fn atom(symbol: &str, h: u8) -> Atom {
        let mut a = Atom::new(element_by_symbol(symbol).unwrap());
        a.implicit_hydrogens = h;
        a
    }

    fn ethanol() -> Molecule {
        Molecule::new(
            vec![atom("C", 3), atom("C", 2), atom("O", 1)],
            vec![
                Bond { atom1: 0, atom2: 1, order: BondOrder::Single },
                Bond { atom1: 1, atom2: 2, order: BondOrder::Single },
            ],
        )
    }

    #[test]
    fn test_adjacency_and_degree() {
        let mol = ethanol();
        assert_eq!(mol.degree(1), 2);
        assert_eq!(mol.neighbors(0).collect::<Vec<_>>(), vec![1]);
        assert!(mol.bond_between(0, 2).is_none());
    }

    #[test]
    fn test_explicit_hydrogens_preserve_counts() {
        let mol = ethanol();
        let with_h = mol.with_explicit_hydrogens();
        assert_eq!(with_h.atom_count(), 9);
        assert_eq!(with_h.heavy_atom_count(), 3);
        assert_eq!(with_h.hydrogen_count(0), 3);
        assert_eq!(with_h.hydrogen_count(2), 1);
        assert_eq!(with_h.heavy_degree(1), 2);
        assert_eq!(with_h.degree(1), 4);
        assert!(with_h.atoms.iter().all(|a| a.implicit_hydrogens == 0));
    }

    #[test]
    fn test_components() {
        let mut mol = ethanol();
        mol = Molecule::new(
            {
                let mut atoms = mol.atoms.clone();
                atoms.push(atom("Cl", 0));
                atoms
            },
            mol.bonds.clone(),
        );
        assert_eq!(mol.components(), vec![vec![0, 1, 2], vec![3]]);
    }
}
