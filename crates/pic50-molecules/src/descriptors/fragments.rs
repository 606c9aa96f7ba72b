//! Functional-group counts (`fr_*`).

use super::MolContext;
use crate::molecule::{BondOrder, Molecule};

pub const NAMES: &[&str] = &[
    "fr_Al_OH",
    "fr_Ar_N",
    "fr_Ar_NH",
    "fr_Ar_OH",
    "fr_COO",
    "fr_C_O",
    "fr_NH0",
    "fr_NH1",
    "fr_NH2",
    "fr_aldehyde",
    "fr_alkyl_halide",
    "fr_amide",
    "fr_aniline",
    "fr_aryl_methyl",
    "fr_benzene",
    "fr_ester",
    "fr_ether",
    "fr_furan",
    "fr_halogen",
    "fr_imidazole",
    "fr_ketone",
    "fr_methoxy",
    "fr_nitrile",
    "fr_nitro",
    "fr_phenol",
    "fr_pyridine",
    "fr_sulfonamd",
    "fr_sulfone",
    "fr_thiophene",
    "fr_urea",
];

type Counter = fn(&MolContext) -> usize;

/// Same order as [`NAMES`].
static COUNTERS: &[Counter] = &[
    al_oh,
    ar_n,
    ar_nh,
    ar_oh,
    coo,
    c_o,
    nh0,
    nh1,
    nh2,
    aldehyde,
    alkyl_halide,
    amide,
    aniline,
    aryl_methyl,
    benzene,
    ester,
    ether,
    furan,
    halogen,
    imidazole,
    ketone,
    methoxy,
    nitrile,
    nitro,
    phenol,
    pyridine,
    sulfonamide,
    sulfone,
    thiophene,
    urea,
];

pub fn compute(ctx: &MolContext, out: &mut Vec<f64>) {
    out.extend(COUNTERS.iter().map(|count| count(ctx) as f64));
}

// ── Helpers ───────────────────────────────────────────────────────────────

fn z(mol: &Molecule, idx: usize) -> u8 {
    mol.atoms[idx].atomic_number()
}

fn atoms_where(ctx: &MolContext, pred: impl Fn(&Molecule, usize) -> bool) -> usize {
    ctx.heavy.iter().filter(|&&i| pred(&ctx.mol, i)).count()
}

fn heavy_neighbors(mol: &Molecule, idx: usize) -> impl Iterator<Item = usize> + '_ {
    mol.neighbors(idx).filter(move |&n| !mol.atoms[n].is_hydrogen())
}

fn double_bonds_to(mol: &Molecule, idx: usize, atomic_number: u8) -> usize {
    mol.count_neighbors(idx, atomic_number, Some(BondOrder::Double))
}

fn single_bonds_to(mol: &Molecule, idx: usize, atomic_number: u8) -> usize {
    mol.count_neighbors(idx, atomic_number, Some(BondOrder::Single))
}

fn is_carbonyl_carbon(mol: &Molecule, idx: usize) -> bool {
    z(mol, idx) == 6 && double_bonds_to(mol, idx, 8) > 0
}

fn is_hydroxyl(mol: &Molecule, idx: usize) -> bool {
    z(mol, idx) == 8 && mol.atoms[idx].formal_charge == 0 && mol.hydrogen_count(idx) == 1
        && mol.heavy_degree(idx) == 1
}

fn all_single(mol: &Molecule, idx: usize) -> bool {
    mol.bond_orders(idx).all(|o| o == BondOrder::Single)
}

/// Aromatic rings of `size` with exactly (N, O, S) heteroatoms, rest carbon.
fn aromatic_rings(ctx: &MolContext, size: usize, hetero: (usize, usize, usize)) -> usize {
    let mol = &ctx.mol;
    (0..ctx.rings.num_rings())
        .filter(|&r| ctx.rings.rings[r].len() == size && ctx.rings.is_aromatic(mol, r))
        .filter(|&r| {
            let ring = &ctx.rings.rings[r];
            let count = |an: u8| ring.iter().filter(|&&a| z(mol, a) == an).count();
            let (n, o, s) = (count(7), count(8), count(16));
            (n, o, s) == hetero && count(6) + n + o + s == size
        })
        .count()
}

// ── Counters ──────────────────────────────────────────────────────────────

fn al_oh(ctx: &MolContext) -> usize {
    atoms_where(ctx, |mol, i| {
        is_hydroxyl(mol, i)
            && heavy_neighbors(mol, i).all(|c| {
                z(mol, c) == 6 && !mol.atoms[c].is_aromatic && !mol.has_multiple_bond(c)
            })
    })
}

fn ar_n(ctx: &MolContext) -> usize {
    atoms_where(ctx, |mol, i| z(mol, i) == 7 && mol.atoms[i].is_aromatic)
}

fn ar_nh(ctx: &MolContext) -> usize {
    atoms_where(ctx, |mol, i| {
        z(mol, i) == 7 && mol.atoms[i].is_aromatic && mol.hydrogen_count(i) > 0
    })
}

fn ar_oh(ctx: &MolContext) -> usize {
    atoms_where(ctx, |mol, i| {
        is_hydroxyl(mol, i) && heavy_neighbors(mol, i).all(|c| z(mol, c) == 6 && mol.atoms[c].is_aromatic)
    })
}

fn coo(ctx: &MolContext) -> usize {
    atoms_where(ctx, |mol, i| {
        is_carbonyl_carbon(mol, i)
            && heavy_neighbors(mol, i).any(|o| {
                z(mol, o) == 8
                    && mol.heavy_degree(o) == 1
                    && mol.bond_between(i, o).map(|b| b.order) == Some(BondOrder::Single)
                    && (mol.hydrogen_count(o) == 1 || mol.atoms[o].formal_charge < 0)
            })
    })
}

fn c_o(ctx: &MolContext) -> usize {
    ctx.heavy
        .iter()
        .filter(|&&i| z(&ctx.mol, i) == 6)
        .map(|&i| double_bonds_to(&ctx.mol, i, 8))
        .sum()
}

fn amine_with_h(ctx: &MolContext, hydrogens: usize) -> usize {
    atoms_where(ctx, |mol, i| {
        z(mol, i) == 7
            && !mol.atoms[i].is_aromatic
            && mol.atoms[i].formal_charge == 0
            && mol.hydrogen_count(i) == hydrogens
            && all_single(mol, i)
            && heavy_neighbors(mol, i).all(|c| !is_carbonyl_carbon(mol, c))
    })
}

fn nh0(ctx: &MolContext) -> usize {
    amine_with_h(ctx, 0)
}

fn nh1(ctx: &MolContext) -> usize {
    amine_with_h(ctx, 1)
}

fn nh2(ctx: &MolContext) -> usize {
    amine_with_h(ctx, 2)
}

fn aldehyde(ctx: &MolContext) -> usize {
    atoms_where(ctx, |mol, i| {
        is_carbonyl_carbon(mol, i)
            && mol.hydrogen_count(i) >= 1
            && heavy_neighbors(mol, i).all(|n| z(mol, n) == 6 || z(mol, n) == 8)
            && mol.heavy_degree(i) <= 2
    })
}

fn alkyl_halide(ctx: &MolContext) -> usize {
    atoms_where(ctx, |mol, i| {
        matches!(z(mol, i), 9 | 17 | 35 | 53)
            && heavy_neighbors(mol, i).any(|c| z(mol, c) == 6 && !mol.atoms[c].is_aromatic)
    })
}

fn amide(ctx: &MolContext) -> usize {
    atoms_where(ctx, |mol, i| is_carbonyl_carbon(mol, i) && single_bonds_to(mol, i, 7) > 0)
}

fn aniline(ctx: &MolContext) -> usize {
    atoms_where(ctx, |mol, i| {
        z(mol, i) == 7
            && !mol.atoms[i].is_aromatic
            && all_single(mol, i)
            && heavy_neighbors(mol, i).any(|c| z(mol, c) == 6 && mol.atoms[c].is_aromatic)
            && heavy_neighbors(mol, i).all(|c| !is_carbonyl_carbon(mol, c))
    })
}

fn aryl_methyl(ctx: &MolContext) -> usize {
    atoms_where(ctx, |mol, i| {
        z(mol, i) == 6
            && mol.hydrogen_count(i) == 3
            && heavy_neighbors(mol, i).any(|a| mol.atoms[a].is_aromatic)
    })
}

fn benzene(ctx: &MolContext) -> usize {
    aromatic_rings(ctx, 6, (0, 0, 0))
}

fn ester(ctx: &MolContext) -> usize {
    atoms_where(ctx, |mol, i| {
        is_carbonyl_carbon(mol, i)
            && heavy_neighbors(mol, i).any(|o| {
                z(mol, o) == 8
                    && mol.heavy_degree(o) == 2
                    && all_single(mol, o)
                    && heavy_neighbors(mol, o).all(|c| z(mol, c) == 6)
            })
    })
}

fn ether(ctx: &MolContext) -> usize {
    atoms_where(ctx, |mol, i| {
        z(mol, i) == 8
            && !mol.atoms[i].is_aromatic
            && mol.heavy_degree(i) == 2
            && all_single(mol, i)
            && heavy_neighbors(mol, i).all(|c| z(mol, c) == 6)
    })
}

fn furan(ctx: &MolContext) -> usize {
    aromatic_rings(ctx, 5, (0, 1, 0))
}

fn halogen(ctx: &MolContext) -> usize {
    atoms_where(ctx, |mol, i| matches!(z(mol, i), 9 | 17 | 35 | 53))
}

fn imidazole(ctx: &MolContext) -> usize {
    aromatic_rings(ctx, 5, (2, 0, 0))
}

fn ketone(ctx: &MolContext) -> usize {
    atoms_where(ctx, |mol, i| {
        is_carbonyl_carbon(mol, i)
            && mol.heavy_degree(i) == 3
            && heavy_neighbors(mol, i).filter(|&c| z(mol, c) == 6).count() == 2
    })
}

fn methoxy(ctx: &MolContext) -> usize {
    atoms_where(ctx, |mol, i| {
        z(mol, i) == 6
            && mol.hydrogen_count(i) == 3
            && heavy_neighbors(mol, i).any(|o| {
                z(mol, o) == 8 && mol.heavy_degree(o) == 2 && all_single(mol, o)
                    && heavy_neighbors(mol, o).all(|c| z(mol, c) == 6)
            })
    })
}

fn nitrile(ctx: &MolContext) -> usize {
    atoms_where(ctx, |mol, i| z(mol, i) == 6 && mol.count_neighbors(i, 7, Some(BondOrder::Triple)) > 0)
}

fn nitro(ctx: &MolContext) -> usize {
    atoms_where(ctx, |mol, i| {
        z(mol, i) == 7 && double_bonds_to(mol, i, 8) >= 1 && mol.count_neighbors(i, 8, None) == 2
    })
}

fn phenol(ctx: &MolContext) -> usize {
    let mol = &ctx.mol;
    let in_benzene = |c: usize| {
        (0..ctx.rings.num_rings()).any(|r| {
            let ring = &ctx.rings.rings[r];
            ring.len() == 6
                && ring.contains(&c)
                && ring.iter().all(|&a| z(mol, a) == 6 && mol.atoms[a].is_aromatic)
        })
    };
    atoms_where(ctx, |mol, i| is_hydroxyl(mol, i) && heavy_neighbors(mol, i).all(&in_benzene))
}

fn pyridine(ctx: &MolContext) -> usize {
    aromatic_rings(ctx, 6, (1, 0, 0))
}

fn sulfonyl(mol: &Molecule, idx: usize) -> bool {
    z(mol, idx) == 16 && double_bonds_to(mol, idx, 8) == 2
}

fn sulfonamide(ctx: &MolContext) -> usize {
    atoms_where(ctx, |mol, i| sulfonyl(mol, i) && single_bonds_to(mol, i, 7) > 0)
}

fn sulfone(ctx: &MolContext) -> usize {
    atoms_where(ctx, |mol, i| sulfonyl(mol, i) && single_bonds_to(mol, i, 6) == 2)
}

fn thiophene(ctx: &MolContext) -> usize {
    aromatic_rings(ctx, 5, (0, 0, 1))
}

fn urea(ctx: &MolContext) -> usize {
    atoms_where(ctx, |mol, i| is_carbonyl_carbon(mol, i) && single_bonds_to(mol, i, 7) == 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::parse_smiles;

    fn fragments(smiles: &str) -> std::collections::HashMap<&'static str, f64> {
        let ctx = MolContext::new(&parse_smiles(smiles).unwrap());
        let mut out = Vec::new();
        compute(&ctx, &mut out);
        NAMES.iter().copied().zip(out).collect()
    }

    #[test]
    fn test_counter_table_matches_names() {
        assert_eq!(COUNTERS.len(), NAMES.len());
    }

    #[test]
    fn test_aspirin_groups() {
        let f = fragments("CC(=O)Oc1ccccc1C(=O)O");
        assert_eq!(f["fr_benzene"], 1.0);
        assert_eq!(f["fr_ester"], 1.0);
        assert_eq!(f["fr_COO"], 1.0);
        assert_eq!(f["fr_C_O"], 2.0);
        assert_eq!(f["fr_ether"], 1.0);
        assert_eq!(f["fr_Al_OH"], 0.0);
    }

    #[test]
    fn test_alcohols_and_phenols() {
        assert_eq!(fragments("CCO")["fr_Al_OH"], 1.0);
        let phenol = fragments("Oc1ccccc1");
        assert_eq!(phenol["fr_phenol"], 1.0);
        assert_eq!(phenol["fr_Ar_OH"], 1.0);
        assert_eq!(phenol["fr_Al_OH"], 0.0);
    }

    #[test]
    fn test_nitrogen_groups() {
        assert_eq!(fragments("CCN")["fr_NH2"], 1.0);
        assert_eq!(fragments("CNC")["fr_NH1"], 1.0);
        assert_eq!(fragments("CN(C)C")["fr_NH0"], 1.0);
        assert_eq!(fragments("CC(=O)NC")["fr_amide"], 1.0);
        assert_eq!(fragments("CC(=O)NC")["fr_NH1"], 0.0);
        assert_eq!(fragments("Nc1ccccc1")["fr_aniline"], 1.0);
        assert_eq!(fragments("NC(=O)N")["fr_urea"], 1.0);
        assert_eq!(fragments("CC#N")["fr_nitrile"], 1.0);
        assert_eq!(fragments("C[N+](=O)[O-]")["fr_nitro"], 1.0);
    }

    #[test]
    fn test_heteroaromatic_rings() {
        assert_eq!(fragments("c1ccncc1")["fr_pyridine"], 1.0);
        assert_eq!(fragments("c1ccoc1")["fr_furan"], 1.0);
        assert_eq!(fragments("c1ccsc1")["fr_thiophene"], 1.0);
        assert_eq!(fragments("c1c[nH]cn1")["fr_imidazole"], 1.0);
        assert_eq!(fragments("c1c[nH]cn1")["fr_Ar_NH"], 1.0);
        assert_eq!(fragments("c1c[nH]cn1")["fr_Ar_N"], 2.0);
    }

    #[test]
    fn test_sulfur_and_halogens() {
        assert_eq!(fragments("CS(=O)(=O)C")["fr_sulfone"], 1.0);
        assert_eq!(fragments("CS(=O)(=O)N")["fr_sulfonamd"], 1.0);
        let f = fragments("ClCc1ccc(F)cc1");
        assert_eq!(f["fr_halogen"], 2.0);
        assert_eq!(f["fr_alkyl_halide"], 1.0);
    }
}
