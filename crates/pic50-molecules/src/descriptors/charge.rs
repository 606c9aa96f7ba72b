//! Gasteiger–Marsili partial equalisation of orbital electronegativity.

use super::{hybridization, Hybridization, MolContext};
use crate::molecule::Molecule;

pub const NAMES: &[&str] = &[
    "MaxPartialCharge",
    "MinPartialCharge",
    "MaxAbsPartialCharge",
    "MinAbsPartialCharge",
];

const ITERATIONS: usize = 6;
/// Cation electronegativity used for hydrogen instead of a + b + c.
const HYDROGEN_CATION: f64 = 20.02;

/// (a, b, c) in chi = a + b*q + c*q^2.
fn parameters(mol: &Molecule, idx: usize) -> Option<(f64, f64, f64)> {
    let hyb = hybridization(mol, idx);
    let params = match (mol.atoms[idx].atomic_number(), hyb) {
        (1, _) => (7.17, 6.24, -0.56),
        (6, Hybridization::Sp3) => (7.98, 9.18, 1.88),
        (6, Hybridization::Sp2) => (8.79, 9.32, 1.51),
        (6, Hybridization::Sp) => (10.39, 9.45, 0.73),
        (7, Hybridization::Sp3) => (11.54, 10.82, 1.36),
        (7, Hybridization::Sp2) => (12.87, 11.15, 0.85),
        (7, Hybridization::Sp) => (15.68, 11.70, -0.27),
        (8, Hybridization::Sp3) => (14.18, 12.92, 1.39),
        (8, _) => (17.07, 13.79, 0.47),
        (9, _) => (14.66, 13.85, 2.31),
        (15, _) => (8.90, 8.24, 0.96),
        (16, Hybridization::Sp3) => (10.14, 9.13, 1.38),
        (16, _) => (10.88, 9.485, 1.325),
        (17, _) => (11.00, 9.69, 1.35),
        (35, _) => (10.08, 8.47, 1.16),
        (53, _) => (9.90, 7.96, 0.96),
        _ => return None,
    };
    Some(params)
}

/// Partial charge per atom. Atoms without parameters keep their formal
/// charge and take no part in the exchange.
pub fn gasteiger_charges(mol: &Molecule) -> Vec<f64> {
    let n = mol.atom_count();
    let params: Vec<Option<(f64, f64, f64)>> = (0..n).map(|i| parameters(mol, i)).collect();
    let mut q: Vec<f64> = mol.atoms.iter().map(|a| a.formal_charge as f64).collect();

    let mut damping = 1.0;
    for _ in 0..ITERATIONS {
        damping *= 0.5;
        let chi: Vec<Option<f64>> = (0..n)
            .map(|i| params[i].map(|(a, b, c)| a + b * q[i] + c * q[i] * q[i]))
            .collect();
        let mut delta = vec![0.0; n];

        for bond in &mol.bonds {
            let (i, j) = (bond.atom1, bond.atom2);
            let (Some(xi), Some(xj)) = (chi[i], chi[j]) else {
                continue;
            };
            // electrons flow toward the more electronegative end
            let (donor, acceptor, gap) = if xj > xi { (i, j, xj - xi) } else { (j, i, xi - xj) };
            let cation = if mol.atoms[donor].is_hydrogen() {
                HYDROGEN_CATION
            } else {
                params[donor].map_or(1.0, |(a, b, c)| a + b + c)
            };
            let dq = damping * gap / cation;
            delta[donor] += dq;
            delta[acceptor] -= dq;
        }

        for (qi, d) in q.iter_mut().zip(&delta) {
            *qi += d;
        }
    }
    q
}

pub fn extrema(ctx: &MolContext, out: &mut Vec<f64>) {
    if ctx.charges.is_empty() {
        out.extend([0.0; 4]);
        return;
    }
    let max = ctx.charges.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = ctx.charges.iter().copied().fold(f64::INFINITY, f64::min);
    let max_abs = ctx.charges.iter().map(|v| v.abs()).fold(0.0, f64::max);
    let min_abs = ctx.charges.iter().map(|v| v.abs()).fold(f64::INFINITY, f64::min);
    out.extend([max, min, max_abs, min_abs]);
}
