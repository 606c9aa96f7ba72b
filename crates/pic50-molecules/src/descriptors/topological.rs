//! Graph-invariant descriptors: Balaban J, Bertz complexity, Kier–Hall
//! connectivity (chi) and shape (kappa) indices.
//!
//! The simple chi indices use the full hydrogen-expanded graph; everything
//! else works on the heavy-atom skeleton.

use std::collections::HashMap;

use super::{hybridization, Hybridization, MolContext};
use crate::molecule::{BondOrder, Molecule};

pub const NAMES: &[&str] = &[
    "BalabanJ",
    "BertzCT",
    "Chi0",
    "Chi0n",
    "Chi0v",
    "Chi1",
    "Chi1n",
    "Chi1v",
    "Chi2n",
    "Chi2v",
    "Chi3n",
    "Chi3v",
    "Chi4n",
    "Chi4v",
    "HallKierAlpha",
    "Kappa1",
    "Kappa2",
    "Kappa3",
    "Phi",
];

const CARBON_SP3_RADIUS: f64 = 0.77;

// ── Paths ─────────────────────────────────────────────────────────────────

/// Simple paths with `length` bonds through heavy atoms, each listed once.
fn heavy_paths(ctx: &MolContext, length: usize) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    let mut path = Vec::with_capacity(length + 1);
    for &start in &ctx.heavy {
        path.push(start);
        extend_path(&ctx.mol, length, &mut path, &mut out);
        path.pop();
    }
    out
}

fn extend_path(mol: &Molecule, length: usize, path: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
    if path.len() == length + 1 {
        // keep one orientation
        if length == 0 || path[0] < path[length] {
            out.push(path.clone());
        }
        return;
    }
    let last = path[path.len() - 1];
    for next in mol.neighbors(last) {
        if mol.atoms[next].is_hydrogen() || path.contains(&next) {
            continue;
        }
        path.push(next);
        extend_path(mol, length, path, out);
        path.pop();
    }
}

// ── Atom deltas ───────────────────────────────────────────────────────────

/// Valence delta without the core-electron correction.
fn delta_n(mol: &Molecule, idx: usize) -> f64 {
    let atom = &mol.atoms[idx];
    atom.element.valence_electrons as f64 - atom.formal_charge as f64 - mol.hydrogen_count(idx) as f64
}

/// Kier–Hall valence delta, `(Zv - h) / (Z - Zv - 1)`.
fn delta_v(mol: &Molecule, idx: usize) -> f64 {
    let atom = &mol.atoms[idx];
    let zv = atom.element.valence_electrons as f64 - atom.formal_charge as f64;
    let z = atom.atomic_number() as f64;
    let numerator = zv - mol.hydrogen_count(idx) as f64;
    let core = z - zv - 1.0;
    if core > 0.0 { numerator / core } else { numerator }
}

fn chi(paths: &[Vec<usize>], deltas: &[f64]) -> f64 {
    paths
        .iter()
        .filter_map(|p| {
            let product: f64 = p.iter().map(|&i| deltas[i]).product();
            (product > 0.0).then(|| 1.0 / product.sqrt())
        })
        .sum()
}

// ── Individual indices ───────────────────────────────────────────────────

fn balaban_j(ctx: &MolContext) -> f64 {
    let mol = &ctx.mol;
    let heavy = &ctx.heavy;
    let bonds: Vec<(usize, usize)> = mol
        .bonds
        .iter()
        .filter(|b| !mol.atoms[b.atom1].is_hydrogen() && !mol.atoms[b.atom2].is_hydrogen())
        .map(|b| (b.atom1, b.atom2))
        .collect();
    let (n, m) = (heavy.len(), bonds.len());
    if n < 2 || m == 0 {
        return 0.0;
    }

    let mut sums = vec![0.0; mol.atom_count()];
    for &i in heavy {
        sums[i] = heavy
            .iter()
            .filter(|&&j| j != i && ctx.dist[i][j] != usize::MAX)
            .map(|&j| ctx.dist[i][j] as f64)
            .sum();
    }

    let components = mol
        .components()
        .iter()
        .filter(|c| c.iter().any(|&i| !mol.atoms[i].is_hydrogen()))
        .count();
    let mu = m as f64 - n as f64 + components as f64;
    let edge_sum: f64 = bonds
        .iter()
        .filter(|&&(i, j)| sums[i] > 0.0 && sums[j] > 0.0)
        .map(|&(i, j)| (sums[i] * sums[j]).powf(-0.5))
        .sum();

    m as f64 / (mu + 1.0) * edge_sum
}

fn shannon(counts: impl Iterator<Item = usize>) -> f64 {
    let counts: Vec<usize> = counts.filter(|&c| c > 0).collect();
    let total: usize = counts.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let n = total as f64;
    -counts
        .iter()
        .map(|&c| {
            let p = c as f64 / n;
            p * p.log2()
        })
        .sum::<f64>()
        * n
}

fn bertz_ct(ctx: &MolContext) -> f64 {
    let mol = &ctx.mol;
    let mut bond_types: HashMap<BondOrder, usize> = HashMap::new();
    for bond in &mol.bonds {
        if mol.atoms[bond.atom1].is_hydrogen() || mol.atoms[bond.atom2].is_hydrogen() {
            continue;
        }
        *bond_types.entry(bond.order).or_insert(0) += 1;
    }
    if bond_types.is_empty() {
        return 0.0;
    }

    let mut environments: HashMap<(u8, usize, bool), usize> = HashMap::new();
    for &i in &ctx.heavy {
        let key = (mol.atoms[i].atomic_number(), mol.heavy_degree(i), mol.atoms[i].is_aromatic);
        *environments.entry(key).or_insert(0) += 1;
    }

    // sorted so the float sums are bitwise stable
    let mut bond_counts: Vec<usize> = bond_types.into_values().collect();
    let mut atom_counts: Vec<usize> = environments.into_values().collect();
    bond_counts.sort_unstable();
    atom_counts.sort_unstable();

    2.0 * (shannon(bond_counts.into_iter()) + shannon(atom_counts.into_iter()))
}

/// Covalent-radius offset relative to sp3 carbon.
fn hall_kier_alpha_atom(mol: &Molecule, idx: usize) -> f64 {
    let hyb = hybridization(mol, idx);
    let tabulated = match (mol.atoms[idx].atomic_number(), hyb) {
        (6, Hybridization::Sp) => Some(-0.22),
        (6, Hybridization::Sp2) => Some(-0.13),
        (6, Hybridization::Sp3) => Some(0.0),
        (7, Hybridization::Sp) => Some(-0.29),
        (7, Hybridization::Sp2) => Some(-0.20),
        (7, Hybridization::Sp3) => Some(-0.04),
        (8, Hybridization::Sp3) => Some(-0.04),
        (8, _) => Some(-0.20),
        (9, _) => Some(-0.07),
        (15, Hybridization::Sp3) => Some(0.43),
        (15, _) => Some(0.30),
        (16, Hybridization::Sp3) => Some(0.35),
        (16, _) => Some(0.22),
        (17, _) => Some(0.29),
        (35, _) => Some(0.48),
        (53, _) => Some(0.73),
        _ => None,
    };
    tabulated.unwrap_or(mol.atoms[idx].element.covalent_radius / CARBON_SP3_RADIUS - 1.0)
}

fn kappas(a: f64, alpha: f64, p1: f64, p2: f64, p3: f64) -> (f64, f64, f64) {
    let ratio = |num: f64, p: f64| {
        let den = (p + alpha).powi(2);
        if den > 0.0 && num.is_finite() { num / den } else { 0.0 }
    };
    let k1 = ratio((a + alpha) * (a + alpha - 1.0).powi(2), p1);
    let k2 = ratio((a + alpha - 1.0) * (a + alpha - 2.0).powi(2), p2);
    let k3 = if (a as usize) % 2 == 1 {
        ratio((a + alpha - 1.0) * (a + alpha - 3.0).powi(2), p3)
    } else {
        ratio((a + alpha - 3.0) * (a + alpha - 2.0).powi(2), p3)
    };
    (k1, k2, k3)
}

// ── Block ─────────────────────────────────────────────────────────────────

pub fn compute(ctx: &MolContext, out: &mut Vec<f64>) {
    let mol = &ctx.mol;
    out.push(balaban_j(ctx));
    out.push(bertz_ct(ctx));

    // simple chi over the full graph
    let chi0: f64 = (0..mol.atom_count())
        .map(|i| mol.degree(i))
        .filter(|&d| d > 0)
        .map(|d| 1.0 / (d as f64).sqrt())
        .sum();
    let chi1: f64 = mol
        .bonds
        .iter()
        .map(|b| 1.0 / ((mol.degree(b.atom1) * mol.degree(b.atom2)) as f64).sqrt())
        .sum();

    let n_deltas: Vec<f64> = (0..mol.atom_count()).map(|i| delta_n(mol, i)).collect();
    let v_deltas: Vec<f64> = (0..mol.atom_count()).map(|i| delta_v(mol, i)).collect();
    let paths: Vec<Vec<Vec<usize>>> = (0..=4).map(|len| heavy_paths(ctx, len)).collect();

    out.push(chi0);
    out.push(chi(&paths[0], &n_deltas));
    out.push(chi(&paths[0], &v_deltas));
    out.push(chi1);
    out.push(chi(&paths[1], &n_deltas));
    out.push(chi(&paths[1], &v_deltas));
    for order in 2..=4 {
        out.push(chi(&paths[order], &n_deltas));
        out.push(chi(&paths[order], &v_deltas));
    }

    let alpha: f64 = ctx.heavy.iter().map(|&i| hall_kier_alpha_atom(mol, i)).sum();
    out.push(alpha);

    let a = ctx.heavy.len() as f64;
    let (k1, k2, k3) = kappas(a, alpha, paths[1].len() as f64, paths[2].len() as f64, paths[3].len() as f64);
    out.extend([k1, k2, k3]);
    out.push(if a > 0.0 { k1 * k2 / a } else { 0.0 });
}
