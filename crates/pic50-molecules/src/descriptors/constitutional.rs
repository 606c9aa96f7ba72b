//! Weights, electron counts, and atom/ring/bond counts.
//!
//! The free functions accept any molecule, with hydrogens implicit or
//! explicit, so the Lipinski record can reuse them.

use super::{hybridization, Hybridization, MolContext};
use crate::element::HYDROGEN;
use crate::molecule::{BondOrder, Molecule};

pub const WEIGHT_NAMES: &[&str] = &[
    "MolWt",
    "HeavyAtomMolWt",
    "ExactMolWt",
    "NumValenceElectrons",
    "NumRadicalElectrons",
];

pub const COUNT_NAMES: &[&str] = &[
    "FractionCSP3",
    "HeavyAtomCount",
    "NHOHCount",
    "NOCount",
    "NumAliphaticCarbocycles",
    "NumAliphaticHeterocycles",
    "NumAliphaticRings",
    "NumAromaticCarbocycles",
    "NumAromaticHeterocycles",
    "NumAromaticRings",
    "NumHAcceptors",
    "NumHDonors",
    "NumHeteroatoms",
    "NumRotatableBonds",
    "NumSaturatedCarbocycles",
    "NumSaturatedHeterocycles",
    "NumSaturatedRings",
    "RingCount",
    "NumSpiroAtoms",
    "NumAmideBonds",
];

// ── Weights ───────────────────────────────────────────────────────────────

/// Average molecular weight, implicit hydrogens included.
pub fn mol_wt(mol: &Molecule) -> f64 {
    mol.atoms
        .iter()
        .map(|a| a.element.average_mass + a.implicit_hydrogens as f64 * HYDROGEN.average_mass)
        .sum()
}

pub fn heavy_atom_mol_wt(mol: &Molecule) -> f64 {
    mol.atoms
        .iter()
        .filter(|a| !a.is_hydrogen())
        .map(|a| a.element.average_mass)
        .sum()
}

/// Monoisotopic mass; labelled atoms use their mass number.
pub fn exact_mol_wt(mol: &Molecule) -> f64 {
    mol.atoms
        .iter()
        .map(|a| {
            let own = a.isotope.map_or(a.element.monoisotopic_mass, f64::from);
            own + a.implicit_hydrogens as f64 * HYDROGEN.monoisotopic_mass
        })
        .sum()
}

pub fn weights(ctx: &MolContext, out: &mut Vec<f64>) {
    let mol = &ctx.mol;
    let valence_electrons: i32 = mol
        .atoms
        .iter()
        .map(|a| a.element.valence_electrons as i32 - a.formal_charge as i32)
        .sum();
    let radicals: u32 = mol.atoms.iter().map(|a| a.radical_electrons as u32).sum();

    out.extend([
        mol_wt(mol),
        heavy_atom_mol_wt(mol),
        exact_mol_wt(mol),
        valence_electrons.max(0) as f64,
        radicals as f64,
    ]);
}

// ── Hydrogen-bond donors and acceptors ───────────────────────────────────

fn is_donor(mol: &Molecule, idx: usize) -> bool {
    let atom = &mol.atoms[idx];
    let h = mol.hydrogen_count(idx);
    if h == 0 {
        return false;
    }
    match atom.atomic_number() {
        7 => atom.formal_charge == 0 || atom.formal_charge == 1,
        8 | 16 => atom.formal_charge == 0,
        _ => false,
    }
}

/// Heavy neighbour carries a double bond to O, N, P, or S.
fn next_to_polar_double_bond(mol: &Molecule, idx: usize) -> bool {
    mol.neighbors(idx).any(|n| {
        mol.adjacency[n].iter().any(|&(m, bi)| {
            m != idx
                && mol.bonds[bi].order == BondOrder::Double
                && matches!(mol.atoms[m].atomic_number(), 7 | 8 | 15 | 16)
        })
    })
}

fn is_acceptor(mol: &Molecule, idx: usize) -> bool {
    let atom = &mol.atoms[idx];
    let h = mol.hydrogen_count(idx);
    let valence = mol.total_valence(idx).round() as i64;
    match atom.atomic_number() {
        8 | 16 => {
            if atom.formal_charge < 0 {
                return true;
            }
            if atom.formal_charge > 0 {
                return false;
            }
            if atom.is_aromatic {
                return h == 0;
            }
            match h {
                0 => valence == 2,
                1 => valence == 2 && !next_to_polar_double_bond(mol, idx),
                _ => false,
            }
        }
        7 => {
            if atom.formal_charge != 0 {
                return false;
            }
            if atom.is_aromatic {
                return h == 0;
            }
            valence == 3 && !next_to_polar_double_bond(mol, idx)
        }
        9 => true,
        _ => false,
    }
}

pub fn num_h_donors(mol: &Molecule) -> usize {
    (0..mol.atom_count()).filter(|&i| is_donor(mol, i)).count()
}

pub fn num_h_acceptors(mol: &Molecule) -> usize {
    (0..mol.atom_count()).filter(|&i| is_acceptor(mol, i)).count()
}

// ── Bonds ─────────────────────────────────────────────────────────────────

/// Single C–N bond where the carbon also carries C=O.
fn is_amide_bond(mol: &Molecule, bi: usize) -> bool {
    let bond = &mol.bonds[bi];
    if bond.order != BondOrder::Single {
        return false;
    }
    let carbon = match (mol.atoms[bond.atom1].atomic_number(), mol.atoms[bond.atom2].atomic_number()) {
        (6, 7) => bond.atom1,
        (7, 6) => bond.atom2,
        _ => return false,
    };
    mol.count_neighbors(carbon, 8, Some(BondOrder::Double)) > 0
}

fn is_rotatable(ctx: &MolContext, bi: usize) -> bool {
    let mol = &ctx.mol;
    let bond = &mol.bonds[bi];
    if bond.order != BondOrder::Single || ctx.rings.bond_in_ring(bi) {
        return false;
    }
    let ends = [bond.atom1, bond.atom2];
    ends.iter().all(|&a| {
        !mol.atoms[a].is_hydrogen()
            && mol.heavy_degree(a) > 1
            && hybridization(mol, a) != Hybridization::Sp
    }) && !is_amide_bond(mol, bi)
}

fn spiro_atoms(ctx: &MolContext) -> usize {
    let rings = &ctx.rings.rings;
    (0..ctx.mol.atom_count())
        .filter(|&a| ctx.rings.atom_ring_count[a] >= 2)
        .filter(|&a| {
            let containing: Vec<&Vec<usize>> = rings.iter().filter(|r| r.contains(&a)).collect();
            containing.iter().enumerate().any(|(i, ri)| {
                containing[i + 1..]
                    .iter()
                    .any(|rj| ri.iter().filter(|x| rj.contains(x)).count() == 1)
            })
        })
        .count()
}

pub fn counts(ctx: &MolContext, out: &mut Vec<f64>) {
    let mol = &ctx.mol;
    let heavy = &ctx.heavy;

    let carbons: Vec<usize> = heavy
        .iter()
        .copied()
        .filter(|&i| mol.atoms[i].atomic_number() == 6)
        .collect();
    let sp3 = carbons
        .iter()
        .filter(|&&i| !mol.atoms[i].is_aromatic && hybridization(mol, i) == Hybridization::Sp3)
        .count();
    let fraction_csp3 = if carbons.is_empty() { 0.0 } else { sp3 as f64 / carbons.len() as f64 };

    let is_no = |i: &usize| matches!(mol.atoms[*i].atomic_number(), 7 | 8);
    let nhoh: usize = heavy.iter().filter(|i| is_no(i)).map(|&i| mol.hydrogen_count(i)).sum();
    let no = heavy.iter().filter(|i| is_no(i)).count();
    let heteroatoms = heavy.iter().filter(|&&i| mol.atoms[i].atomic_number() != 6).count();

    let mut aliphatic_carbo = 0;
    let mut aliphatic_hetero = 0;
    let mut aromatic_carbo = 0;
    let mut aromatic_hetero = 0;
    let mut saturated_carbo = 0;
    let mut saturated_hetero = 0;
    for r in 0..ctx.rings.num_rings() {
        let hetero = ctx.rings.is_heterocycle(mol, r);
        if ctx.rings.is_aromatic(mol, r) {
            if hetero { aromatic_hetero += 1 } else { aromatic_carbo += 1 }
        } else {
            if hetero { aliphatic_hetero += 1 } else { aliphatic_carbo += 1 }
            if ctx.rings.is_saturated(mol, r) {
                if hetero { saturated_hetero += 1 } else { saturated_carbo += 1 }
            }
        }
    }

    let rotatable = (0..mol.bond_count()).filter(|&b| is_rotatable(ctx, b)).count();
    let amide = (0..mol.bond_count()).filter(|&b| is_amide_bond(mol, b)).count();

    out.extend([
        fraction_csp3,
        heavy.len() as f64,
        nhoh as f64,
        no as f64,
        aliphatic_carbo as f64,
        aliphatic_hetero as f64,
        (aliphatic_carbo + aliphatic_hetero) as f64,
        aromatic_carbo as f64,
        aromatic_hetero as f64,
        (aromatic_carbo + aromatic_hetero) as f64,
        num_h_acceptors(mol) as f64,
        num_h_donors(mol) as f64,
        heteroatoms as f64,
        rotatable as f64,
        saturated_carbo as f64,
        saturated_hetero as f64,
        (saturated_carbo + saturated_hetero) as f64,
        ctx.rings.num_rings() as f64,
        spiro_atoms(ctx) as f64,
        amide as f64,
    ]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::parse_smiles;

    #[test]
    fn test_donors_and_acceptors() {
        // ethanol: one OH
        let mol = parse_smiles("CCO").unwrap();
        assert_eq!(num_h_donors(&mol), 1);
        assert_eq!(num_h_acceptors(&mol), 1);
        // aspirin: acid OH is a donor, three oxygens accept
        let mol = parse_smiles("CC(=O)Oc1ccccc1C(=O)O").unwrap();
        assert_eq!(num_h_donors(&mol), 1);
        assert_eq!(num_h_acceptors(&mol), 3);
        // pyridine nitrogen accepts, pyrrole nitrogen donates
        assert_eq!(num_h_acceptors(&parse_smiles("c1ccncc1").unwrap()), 1);
        assert_eq!(num_h_donors(&parse_smiles("c1cc[nH]c1").unwrap()), 1);
    }

    #[test]
    fn test_counts_independent_of_hydrogen_form() {
        let mol = parse_smiles("CC(=O)Oc1ccccc1C(=O)O").unwrap();
        let expanded = mol.with_explicit_hydrogens();
        assert_eq!(num_h_donors(&mol), num_h_donors(&expanded));
        assert_eq!(num_h_acceptors(&mol), num_h_acceptors(&expanded));
        assert!((mol_wt(&mol) - mol_wt(&expanded)).abs() < 1e-9);
    }

    #[test]
    fn test_amide_bond_not_rotatable() {
        let mol = parse_smiles("CC(=O)NC").unwrap();
        let ctx = MolContext::new(&mol);
        let mut out = Vec::new();
        counts(&ctx, &mut out);
        let idx = |name| COUNT_NAMES.iter().position(|n| *n == name).unwrap();
        assert_eq!(out[idx("NumAmideBonds")], 1.0);
        assert_eq!(out[idx("NumRotatableBonds")], 0.0);
    }

    #[test]
    fn test_exact_mass() {
        let mol = parse_smiles("C").unwrap();
        assert!((exact_mol_wt(&mol) - 16.0313).abs() < 1e-3);
    }
}
