//! Surface-area descriptors: Labute ASA, polar surface area, and the VSA
//! families that bin per-atom surface by a second per-atom property.

use std::f64::consts::PI;

use super::{binned_sum, MolContext};
use crate::element::HYDROGEN;
use crate::molecule::{BondOrder, Molecule};

pub const NAMES: &[&str] = &[
    "LabuteASA",
    "PEOE_VSA1", "PEOE_VSA2", "PEOE_VSA3", "PEOE_VSA4", "PEOE_VSA5", "PEOE_VSA6", "PEOE_VSA7",
    "PEOE_VSA8", "PEOE_VSA9", "PEOE_VSA10", "PEOE_VSA11", "PEOE_VSA12", "PEOE_VSA13", "PEOE_VSA14",
    "SMR_VSA1", "SMR_VSA2", "SMR_VSA3", "SMR_VSA4", "SMR_VSA5",
    "SMR_VSA6", "SMR_VSA7", "SMR_VSA8", "SMR_VSA9", "SMR_VSA10",
    "SlogP_VSA1", "SlogP_VSA2", "SlogP_VSA3", "SlogP_VSA4", "SlogP_VSA5", "SlogP_VSA6",
    "SlogP_VSA7", "SlogP_VSA8", "SlogP_VSA9", "SlogP_VSA10", "SlogP_VSA11", "SlogP_VSA12",
    "TPSA",
    "EState_VSA1", "EState_VSA2", "EState_VSA3", "EState_VSA4", "EState_VSA5", "EState_VSA6",
    "EState_VSA7", "EState_VSA8", "EState_VSA9", "EState_VSA10", "EState_VSA11",
    "VSA_EState1", "VSA_EState2", "VSA_EState3", "VSA_EState4", "VSA_EState5",
    "VSA_EState6", "VSA_EState7", "VSA_EState8", "VSA_EState9", "VSA_EState10",
];

const PEOE_BINS: &[f64] = &[-0.3, -0.25, -0.2, -0.15, -0.1, -0.05, 0.0, 0.05, 0.1, 0.15, 0.2, 0.25, 0.3];
const SMR_BINS: &[f64] = &[1.29, 1.82, 2.24, 2.45, 2.75, 3.05, 3.63, 3.8, 4.0];
const SLOGP_BINS: &[f64] = &[-0.4, -0.2, 0.0, 0.1, 0.15, 0.2, 0.25, 0.3, 0.4, 0.5, 0.6];
const ESTATE_BINS: &[f64] = &[-0.39, 0.29, 0.717, 1.165, 1.54, 1.807, 2.05, 4.69, 9.17, 15.0];
const VSA_ESTATE_BINS: &[f64] = &[4.78, 5.00, 5.410, 5.740, 6.00, 6.07, 6.45, 7.00, 11.0];

// ── Labute ASA ────────────────────────────────────────────────────────────

fn bond_shrink(order: BondOrder) -> f64 {
    match order {
        BondOrder::Single => 0.0,
        BondOrder::Aromatic => 0.1,
        BondOrder::Double => 0.2,
        BondOrder::Triple | BondOrder::Quadruple => 0.3,
    }
}

/// Labute approximate surface area: one term per heavy atom plus a single
/// pooled hydrogen sphere.
#[derive(Debug, Clone, PartialEq)]
pub struct LabuteSurface {
    /// Indexed like the molecule's atoms; zero on hydrogens.
    pub atoms: Vec<f64>,
    pub hydrogen: f64,
}

impl LabuteSurface {
    pub fn total(&self) -> f64 {
        self.atoms.iter().sum::<f64>() + self.hydrogen
    }
}

/// Area of each sphere buried by the other when bonded at length `bij`.
fn buried(ri: f64, rj: f64, bij: f64) -> (f64, f64) {
    let dij = (ri - rj).abs().max(bij).min(ri + rj);
    (
        rj * rj - (ri - dij) * (ri - dij) / dij,
        ri * ri - (rj - dij) * (rj - dij) / dij,
    )
}

/// Surface of the heavy-atom graph; hydrogen nodes are ignored and replaced
/// by the pooled hydrogen sphere.
pub fn labute_surface(mol: &Molecule) -> LabuteSurface {
    let radii: Vec<f64> = mol.atoms.iter().map(|a| a.element.bond_radius).collect();
    let heavy: Vec<usize> = (0..mol.atom_count()).filter(|&i| !mol.atoms[i].is_hydrogen()).collect();
    let mut covered = vec![0.0; mol.atom_count()];

    for bond in &mol.bonds {
        let (i, j) = (bond.atom1, bond.atom2);
        if mol.atoms[i].is_hydrogen() || mol.atoms[j].is_hydrogen() {
            continue;
        }
        let (ri, rj) = (radii[i], radii[j]);
        let (ci, cj) = buried(ri, rj, ri + rj - bond_shrink(bond.order));
        covered[i] += ci;
        covered[j] += cj;
    }

    let rh = HYDROGEN.bond_radius;
    let mut h_covered = 0.0;
    for &i in &heavy {
        let (ci, ch) = buried(radii[i], rh, radii[i] + rh);
        covered[i] += ci;
        h_covered += ch;
    }

    let sphere = |r: f64, c: f64| 4.0 * PI * r * r - PI * r * c;
    let mut atoms = vec![0.0; mol.atom_count()];
    for &i in &heavy {
        atoms[i] = sphere(radii[i], covered[i]);
    }
    let hydrogen = if heavy.is_empty() { 0.0 } else { sphere(rh, h_covered) };
    LabuteSurface { atoms, hydrogen }
}

// ── Topological polar surface area ───────────────────────────────────────

fn aromatic_nitrogen_tpsa(mol: &Molecule, idx: usize, degree: usize, h: usize) -> f64 {
    let exocyclic = |order: BondOrder| {
        mol.adjacency[idx]
            .iter()
            .any(|&(n, bi)| !mol.atoms[n].is_hydrogen() && mol.bonds[bi].order == order)
    };
    if mol.atoms[idx].formal_charge > 0 {
        return match degree {
            _ if h >= 1 => 14.14,
            3 if exocyclic(BondOrder::Single) => 3.88,
            _ => 4.10,
        };
    }
    match degree {
        _ if h >= 1 => 15.79,
        3 if exocyclic(BondOrder::Single) => 4.93,
        3 if exocyclic(BondOrder::Double) => 8.39,
        3 => 4.41,
        _ => 12.89,
    }
}

fn cationic_nitrogen_tpsa(degree: usize, h: usize, has_double_bond: bool, has_triple_bond: bool) -> f64 {
    match h {
        0 if has_triple_bond => 4.36,
        0 if has_double_bond && degree == 3 => 3.01,
        0 => 0.0,
        1 if has_double_bond => 13.97,
        1 => 4.44,
        2 if has_double_bond => 25.59,
        2 => 16.61,
        _ => 27.64,
    }
}

/// Ertl fragment contribution of one atom; only N and O contribute.
fn tpsa_contribution(mol: &Molecule, idx: usize) -> f64 {
    let atom = &mol.atoms[idx];
    let degree = mol.heavy_degree(idx);
    let h = mol.hydrogen_count(idx);
    let has_double_bond = mol.bond_orders(idx).any(|o| o == BondOrder::Double);
    let has_triple_bond = mol.bond_orders(idx).any(|o| o == BondOrder::Triple);

    match atom.atomic_number() {
        7 => {
            if atom.is_aromatic {
                return aromatic_nitrogen_tpsa(mol, idx, degree, h);
            }
            if atom.formal_charge > 0 {
                return cationic_nitrogen_tpsa(degree, h, has_double_bond, has_triple_bond);
            }
            match (degree, h) {
                (1, 0) if has_triple_bond => 23.79,
                (1, 1) if has_double_bond => 23.85,
                (1, 2) => 26.02,
                (2, 0) if has_double_bond => 12.36,
                (2, 1) => 12.03,
                (3, 0) => 3.24,
                _ => match h {
                    0 => 3.24,
                    1 => 12.03,
                    _ => 26.02,
                },
            }
        }
        8 => {
            if atom.formal_charge < 0 {
                return 23.06;
            }
            if atom.is_aromatic {
                return 13.14;
            }
            match (degree, h) {
                (1, 1) => 20.23,
                (1, 0) if has_double_bond => 17.07,
                (2, 0) => 9.23,
                _ => {
                    if h >= 1 {
                        20.23
                    } else if has_double_bond {
                        17.07
                    } else {
                        9.23
                    }
                }
            }
        }
        _ => 0.0,
    }
}

pub fn tpsa_contributions(mol: &Molecule) -> Vec<f64> {
    (0..mol.atom_count()).map(|i| tpsa_contribution(mol, i)).collect()
}

// ── Block ─────────────────────────────────────────────────────────────────

pub fn compute(ctx: &MolContext, out: &mut Vec<f64>) {
    let surface = &ctx.labute.atoms;
    out.push(ctx.labute.total());

    out.extend(binned_sum(&ctx.charges, surface, PEOE_BINS));

    let log_p: Vec<f64> = ctx.crippen.iter().map(|c| c.0).collect();
    let mr: Vec<f64> = ctx.crippen.iter().map(|c| c.1).collect();
    out.extend(binned_sum(&mr, surface, SMR_BINS));
    out.extend(binned_sum(&log_p, surface, SLOGP_BINS));

    out.push(ctx.tpsa.iter().sum());

    let estate: Vec<f64> = ctx.heavy.iter().map(|&i| ctx.estate[i]).collect();
    let asa: Vec<f64> = ctx.heavy.iter().map(|&i| surface[i]).collect();
    out.extend(binned_sum(&estate, &asa, ESTATE_BINS));
    out.extend(binned_sum(&asa, &estate, VSA_ESTATE_BINS));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::parse_smiles;

    #[test]
    fn test_bin_counts_match_names() {
        let bins = PEOE_BINS.len() + SMR_BINS.len() + SLOGP_BINS.len()
            + ESTATE_BINS.len() + VSA_ESTATE_BINS.len() + 5;
        // five bin families plus LabuteASA and TPSA
        assert_eq!(NAMES.len(), bins + 2);
    }

    fn labute(smiles: &str) -> f64 {
        labute_surface(&parse_smiles(smiles).unwrap()).total()
    }

    fn tpsa(smiles: &str) -> f64 {
        tpsa_contributions(&parse_smiles(smiles).unwrap()).iter().sum()
    }

    #[test]
    fn test_labute_reference_values() {
        assert!((labute("C") - 8.739).abs() < 1e-2);
        assert!((labute("CCO") - 19.90).abs() < 2e-2);
        assert!(labute("CCCCCC") > labute("CC"));
    }

    #[test]
    fn test_labute_ignores_hydrogen_nodes() {
        let mol = parse_smiles("CC(=O)Oc1ccccc1C(=O)O").unwrap();
        let implicit = labute_surface(&mol);
        let explicit = labute_surface(&mol.with_explicit_hydrogens());
        assert!((implicit.total() - explicit.total()).abs() < 1e-9);
        assert!(explicit.atoms[mol.atom_count()..].iter().all(|&a| a == 0.0));
        assert!(implicit.atoms.iter().all(|&a| a > 0.0));
    }

    #[test]
    fn test_vsa_bins_partition_atom_area() {
        let ctx = MolContext::new(&parse_smiles("CC(=O)Oc1ccccc1C(=O)O").unwrap());
        let mut out = Vec::new();
        compute(&ctx, &mut out);
        let peoe: f64 = out[1..15].iter().sum();
        assert!((out[0] - ctx.labute.hydrogen - peoe).abs() < 1e-9);
    }

    #[test]
    fn test_nitrile_and_amine() {
        assert!((tpsa("CC#N") - 23.79).abs() < 1e-9);
        assert!((tpsa("CCN") - 26.02).abs() < 1e-9);
        assert!((tpsa("CN(C)C") - 3.24).abs() < 1e-9);
    }

    #[test]
    fn test_aromatic_nitrogen_by_connectivity() {
        assert!((tpsa("Cn1ccnc1") - 17.82).abs() < 1e-9);
        assert!((tpsa("Cn1cnc2c1c(=O)n(C)c(=O)n2C") - 61.82).abs() < 1e-9);
        assert!((tpsa("c1cc[nH]c1") - 15.79).abs() < 1e-9);
        assert!((tpsa("c1ccncc1") - 12.89).abs() < 1e-9);
    }

    #[test]
    fn test_nitro_group() {
        assert!((tpsa("O=[N+]([O-])c1ccccc1") - 43.14).abs() < 1e-9);
    }
}
