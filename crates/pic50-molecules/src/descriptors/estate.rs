//! Kier–Hall electrotopological state indices.

use super::{period, MolContext};
use crate::molecule::Molecule;

pub const NAMES: &[&str] = &[
    "MaxEStateIndex",
    "MinEStateIndex",
    "MaxAbsEStateIndex",
    "MinAbsEStateIndex",
];

/// E-state value per atom of a hydrogen-expanded molecule.
///
/// Intrinsic state `I = ((2/N)^2 * dv + 1) / d` over heavy atoms, perturbed
/// by `sum_j (I_i - I_j) / (d_ij + 1)^2`. Hydrogens get zero.
pub fn estate_indices(mol: &Molecule, heavy: &[usize], dist: &[Vec<usize>]) -> Vec<f64> {
    let intrinsic: Vec<f64> = heavy
        .iter()
        .map(|&i| {
            let atom = &mol.atoms[i];
            let n = period(atom.atomic_number()) as f64;
            let dv = atom.element.valence_electrons as f64
                - atom.formal_charge as f64
                - mol.hydrogen_count(i) as f64;
            let d = mol.heavy_degree(i).max(1) as f64;
            ((2.0 / n).powi(2) * dv + 1.0) / d
        })
        .collect();

    let mut out = vec![0.0; mol.atom_count()];
    for (a, &i) in heavy.iter().enumerate() {
        let mut perturbation = 0.0;
        for (b, &j) in heavy.iter().enumerate() {
            if a == b || dist[i][j] == usize::MAX {
                continue;
            }
            let r = (dist[i][j] + 1) as f64;
            perturbation += (intrinsic[a] - intrinsic[b]) / (r * r);
        }
        out[i] = intrinsic[a] + perturbation;
    }
    out
}

pub fn extrema(ctx: &MolContext, out: &mut Vec<f64>) {
    let values: Vec<f64> = ctx.heavy.iter().map(|&i| ctx.estate[i]).collect();
    if values.is_empty() {
        out.extend([0.0; 4]);
        return;
    }
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max_abs = values.iter().map(|v| v.abs()).fold(0.0, f64::max);
    let min_abs = values.iter().map(|v| v.abs()).fold(f64::INFINITY, f64::min);
    out.extend([max, min, max_abs, min_abs]);
}
