//! Lipinski rule-of-five descriptors.

use serde::{Deserialize, Serialize};

use crate::descriptors::{constitutional, crippen};
use crate::molecule::Molecule;

/// Column names of the Lipinski table, in row order.
pub const LIPINSKI_COLUMNS: [&str; 4] = ["MW", "LogP", "NumHDonors", "NumHAcceptors"];

/// The four rule-of-five properties of one molecule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LipinskiDescriptors {
    pub mol_wt: f64,
    pub mol_log_p: f64,
    pub num_h_donors: u32,
    pub num_h_acceptors: u32,
}

impl LipinskiDescriptors {
    /// Computed on the molecule as parsed; no hydrogen expansion needed.
    pub fn from_molecule(mol: &Molecule) -> Self {
        let (mol_log_p, _) = crippen::log_p_mr(mol);
        Self {
            mol_wt: constitutional::mol_wt(mol),
            mol_log_p,
            num_h_donors: constitutional::num_h_donors(mol) as u32,
            num_h_acceptors: constitutional::num_h_acceptors(mol) as u32,
        }
    }

    /// Values in [`LIPINSKI_COLUMNS`] order.
    pub fn to_row(&self) -> [f64; 4] {
        [
            self.mol_wt,
            self.mol_log_p,
            self.num_h_donors as f64,
            self.num_h_acceptors as f64,
        ]
    }

    /// Number of rule-of-five limits exceeded.
    pub fn rule_of_five_violations(&self) -> u32 {
        let mut violations = 0;
        if self.mol_wt > 500.0 { violations += 1; }
        if self.mol_log_p > 5.0 { violations += 1; }
        if self.num_h_donors > 5 { violations += 1; }
        if self.num_h_acceptors > 10 { violations += 1; }
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::parse_smiles;

    #[test]
    fn test_aspirin() {
        let lip = LipinskiDescriptors::from_molecule(&parse_smiles("CC(=O)Oc1ccccc1C(=O)O").unwrap());
        assert!((lip.mol_wt - 180.159).abs() < 1e-3);
        assert!((lip.mol_log_p - 1.3101).abs() < 1e-3);
        assert_eq!(lip.num_h_donors, 1);
        assert_eq!(lip.num_h_acceptors, 3);
        assert_eq!(lip.rule_of_five_violations(), 0);
    }

    #[test]
    fn test_row_order_matches_columns() {
        let lip = LipinskiDescriptors {
            mol_wt: 1.0,
            mol_log_p: 2.0,
            num_h_donors: 3,
            num_h_acceptors: 4,
        };
        assert_eq!(lip.to_row(), [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(LIPINSKI_COLUMNS[0], "MW");
    }

    #[test]
    fn test_violations() {
        let lip = LipinskiDescriptors {
            mol_wt: 650.0,
            mol_log_p: 6.2,
            num_h_donors: 2,
            num_h_acceptors: 12,
        };
        assert_eq!(lip.rule_of_five_violations(), 3);
    }
}
