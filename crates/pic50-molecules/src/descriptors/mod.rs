//! Versioned descriptor catalog.
//!
//! Every molecule is described by the same ordered list of named scalars.
//! Descriptors are computed on the hydrogen-expanded graph; the name list
//! and order are fixed for a given [`CATALOG_VERSION`].

pub mod charge;
pub mod constitutional;
pub mod crippen;
pub mod estate;
pub mod fragments;
pub mod surface;
pub mod topological;

use std::collections::VecDeque;

use crate::molecule::{BondOrder, Molecule};
use crate::ring::RingInfo;

/// Bumped whenever a name is added, removed, reordered, or a formula changes.
pub const CATALOG_VERSION: &str = "pic50-descriptors/2";

// ── Per-molecule context ──────────────────────────────────────────────────

/// Everything the descriptor families share for one molecule.
#[derive(Debug, Clone)]
pub struct MolContext {
    /// Hydrogen-expanded molecule.
    pub mol: Molecule,
    /// Indices of non-hydrogen atoms.
    pub heavy: Vec<usize>,
    pub rings: RingInfo,
    /// Topological distances; `usize::MAX` between disconnected atoms.
    pub dist: Vec<Vec<usize>>,
    /// Gasteiger partial charge per atom.
    pub charges: Vec<f64>,
    /// Crippen (logP, MR) contribution per atom.
    pub crippen: Vec<(f64, f64)>,
    /// E-state index per atom; zero on hydrogens.
    pub estate: Vec<f64>,
    /// Labute approximate surface area.
    pub labute: surface::LabuteSurface,
    /// Polar surface contribution per atom.
    pub tpsa: Vec<f64>,
}

impl MolContext {
    pub fn new(mol: &Molecule) -> Self {
        let mol = mol.with_explicit_hydrogens();
        let heavy: Vec<usize> = (0..mol.atom_count())
            .filter(|&i| !mol.atoms[i].is_hydrogen())
            .collect();
        let rings = RingInfo::perceive(&mol);
        let dist = distance_matrix(&mol);
        let charges = charge::gasteiger_charges(&mol);
        let crippen = crippen::atom_contributions(&mol);
        let estate = estate::estate_indices(&mol, &heavy, &dist);
        let labute = surface::labute_surface(&mol);
        let tpsa = surface::tpsa_contributions(&mol);

        Self { mol, heavy, rings, dist, charges, crippen, estate, labute, tpsa }
    }
}

// ── Catalog ───────────────────────────────────────────────────────────────

type BlockFn = fn(&MolContext, &mut Vec<f64>);

struct Block {
    names: &'static [&'static str],
    compute: BlockFn,
}

static BLOCKS: &[Block] = &[
    Block { names: estate::NAMES, compute: estate::extrema },
    Block { names: constitutional::WEIGHT_NAMES, compute: constitutional::weights },
    Block { names: charge::NAMES, compute: charge::extrema },
    Block { names: topological::NAMES, compute: topological::compute },
    Block { names: surface::NAMES, compute: surface::compute },
    Block { names: constitutional::COUNT_NAMES, compute: constitutional::counts },
    Block { names: crippen::NAMES, compute: crippen::totals },
    Block { names: fragments::NAMES, compute: fragments::compute },
];

/// The fixed, ordered descriptor set.
pub struct DescriptorCatalog;

impl DescriptorCatalog {
    pub fn version() -> &'static str {
        CATALOG_VERSION
    }

    /// Descriptor names in output order.
    pub fn names() -> Vec<&'static str> {
        BLOCKS.iter().flat_map(|b| b.names.iter().copied()).collect()
    }

    pub fn len() -> usize {
        BLOCKS.iter().map(|b| b.names.len()).sum()
    }

    /// Compute every descriptor for a parsed molecule. Hydrogens are made
    /// explicit first, so the result does not depend on how they were written.
    pub fn compute(mol: &Molecule) -> Vec<f64> {
        let ctx = MolContext::new(mol);
        let mut out = Vec::with_capacity(Self::len());
        for block in BLOCKS {
            let before = out.len();
            (block.compute)(&ctx, &mut out);
            debug_assert_eq!(out.len() - before, block.names.len());
        }
        out
    }
}

// ── Shared helpers ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hybridization {
    Sp,
    Sp2,
    Sp3,
}

pub fn hybridization(mol: &Molecule, idx: usize) -> Hybridization {
    let mut doubles = 0;
    let mut aromatic = false;
    for order in mol.bond_orders(idx) {
        match order {
            BondOrder::Triple | BondOrder::Quadruple => return Hybridization::Sp,
            BondOrder::Double => doubles += 1,
            BondOrder::Aromatic => aromatic = true,
            BondOrder::Single => {}
        }
    }
    match doubles {
        0 if aromatic => Hybridization::Sp2,
        0 => Hybridization::Sp3,
        1 => Hybridization::Sp2,
        _ => Hybridization::Sp,
    }
}

/// Principal quantum number of the valence shell.
pub fn period(atomic_number: u8) -> u8 {
    match atomic_number {
        0..=2 => 1,
        3..=10 => 2,
        11..=18 => 3,
        19..=36 => 4,
        37..=54 => 5,
        55..=86 => 6,
        _ => 7,
    }
}

/// BFS distances between every pair of atoms.
pub fn distance_matrix(mol: &Molecule) -> Vec<Vec<usize>> {
    let n = mol.atom_count();
    let mut dist = vec![vec![usize::MAX; n]; n];
    for start in 0..n {
        dist[start][start] = 0;
        let mut queue = VecDeque::new();
        queue.push_back(start);
        while let Some(curr) = queue.pop_front() {
            for &(next, _) in &mol.adjacency[curr] {
                if dist[start][next] == usize::MAX {
                    dist[start][next] = dist[start][curr] + 1;
                    queue.push_back(next);
                }
            }
        }
    }
    dist
}

/// Sum `weights` into bins split at `edges`: value `v` lands in the first
/// bin whose upper edge exceeds it, or the last bin.
pub fn binned_sum(values: &[f64], weights: &[f64], edges: &[f64]) -> Vec<f64> {
    let mut bins = vec![0.0; edges.len() + 1];
    for (&v, &w) in values.iter().zip(weights) {
        let idx = edges.iter().position(|&e| v < e).unwrap_or(edges.len());
        bins[idx] += w;
    }
    bins
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::parse_smiles;
    use std::collections::HashSet;

    fn descriptor(smiles: &str, name: &str) -> f64 {
        let mol = parse_smiles(smiles).unwrap();
        let values = DescriptorCatalog::compute(&mol);
        let idx = DescriptorCatalog::names().iter().position(|n| *n == name).unwrap();
        values[idx]
    }

    #[test]
    fn test_names_unique_and_sized() {
        let names = DescriptorCatalog::names();
        assert_eq!(names.len(), DescriptorCatalog::len());
        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
        assert!(names.len() > 140);
        assert_eq!(names[0], "MaxEStateIndex");
        assert!(!names.contains(&"MW"));
    }

    #[test]
    fn test_every_block_fills_its_names() {
        for smiles in ["C", "CCO", "c1ccccc1", "CC(=O)Oc1ccccc1C(=O)O", "[Na+].[Cl-]", "C1CCC2(C1)CCCC2"] {
            let mol = parse_smiles(smiles).unwrap();
            let ctx = MolContext::new(&mol);
            for block in BLOCKS {
                let mut out = Vec::new();
                (block.compute)(&ctx, &mut out);
                assert_eq!(out.len(), block.names.len(), "{smiles}: {:?}", block.names.first());
                assert!(out.iter().all(|v| v.is_finite()), "{smiles}: {:?}", block.names.first());
            }
        }
    }

    #[test]
    fn test_molecular_weights() {
        assert!((descriptor("CCO", "MolWt") - 46.069).abs() < 1e-3);
        assert!((descriptor("c1ccccc1", "MolWt") - 78.114).abs() < 1e-3);
        assert!((descriptor("CC(=O)Oc1ccccc1C(=O)O", "MolWt") - 180.159).abs() < 1e-3);
        assert!((descriptor("CCO", "HeavyAtomMolWt") - 40.021).abs() < 1e-3);
    }

    #[test]
    fn test_tpsa() {
        assert!((descriptor("CCO", "TPSA") - 20.23).abs() < 1e-6);
        assert!((descriptor("CC(=O)Oc1ccccc1C(=O)O", "TPSA") - 63.60).abs() < 1e-6);
        assert!((descriptor("Cn1cnc2c1c(=O)n(C)c(=O)n2C", "TPSA") - 61.82).abs() < 1e-6);
        assert_eq!(descriptor("CCCC", "TPSA"), 0.0);
    }

    #[test]
    fn test_reference_surface_and_lipophilicity() {
        assert!((descriptor("C", "LabuteASA") - 8.739).abs() < 1e-2);
        assert!((descriptor("c1ccccc1", "MolLogP") - 1.6866).abs() < 1e-3);
        assert!((descriptor("CC(=O)Oc1ccccc1C(=O)O", "MolLogP") - 1.3101).abs() < 1e-3);
        assert!((descriptor("CC(=O)Oc1ccccc1C(=O)O", "MolMR") - 44.7103).abs() < 1e-3);
    }

    #[test]
    fn test_counts() {
        assert_eq!(descriptor("CCCC", "NumRotatableBonds"), 1.0);
        assert_eq!(descriptor("CCO", "HeavyAtomCount"), 3.0);
        assert_eq!(descriptor("CCO", "NumValenceElectrons"), 20.0);
        assert_eq!(descriptor("c1ccccc1", "NumAromaticCarbocycles"), 1.0);
        assert_eq!(descriptor("c1ccncc1", "NumAromaticHeterocycles"), 1.0);
        assert_eq!(descriptor("C1CCCCC1", "NumSaturatedCarbocycles"), 1.0);
        assert_eq!(descriptor("C1CCC2(C1)CCCC2", "NumSpiroAtoms"), 1.0);
        assert_eq!(descriptor("CCO", "FractionCSP3"), 1.0);
        assert_eq!(descriptor("c1ccccc1", "FractionCSP3"), 0.0);
    }

    #[test]
    fn test_hydrogen_representation_does_not_matter() {
        let implicit = DescriptorCatalog::compute(&parse_smiles("CO").unwrap());
        let explicit = DescriptorCatalog::compute(&parse_smiles("[CH3][OH]").unwrap());
        assert_eq!(implicit, explicit);
    }

    #[test]
    fn test_binned_sum() {
        let bins = binned_sum(&[-1.0, 0.0, 0.5, 2.0], &[1.0, 2.0, 3.0, 4.0], &[0.0, 1.0]);
        assert_eq!(bins, vec![1.0, 5.0, 4.0]);
    }

    #[test]
    fn test_hybridization() {
        let mol = parse_smiles("C=CC#N").unwrap();
        assert_eq!(hybridization(&mol, 0), Hybridization::Sp2);
        assert_eq!(hybridization(&mol, 2), Hybridization::Sp);
        let mol = parse_smiles("CC").unwrap();
        assert_eq!(hybridization(&mol, 0), Hybridization::Sp3);
    }
}
