//! Periodic-table data for the elements the SMILES parser accepts.

/// Static per-element properties.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Element {
    pub symbol: &'static str,
    pub atomic_number: u8,
    /// Standard atomic weight
    pub average_mass: f64,
    /// Mass of the most abundant isotope
    pub monoisotopic_mass: f64,
    pub valence_electrons: u8,
    /// Allowed valences of the neutral atom, ascending. Empty = unchecked.
    pub valences: &'static [u8],
    /// Single-bond covalent radius (Å)
    pub covalent_radius: f64,
    /// Ideal bond radius used by the Labute surface model (Å)
    pub bond_radius: f64,
}

const fn el(
    symbol: &'static str,
    atomic_number: u8,
    average_mass: f64,
    monoisotopic_mass: f64,
    valence_electrons: u8,
    valences: &'static [u8],
    covalent_radius: f64,
    bond_radius: f64,
) -> Element {
    Element {
        symbol,
        atomic_number,
        average_mass,
        monoisotopic_mass,
        valence_electrons,
        valences,
        covalent_radius,
        bond_radius,
    }
}

pub const HYDROGEN: Element = el("H", 1, 1.008, 1.007825, 1, &[1], 0.31, 0.33);

static ELEMENTS: &[Element] = &[
    HYDROGEN,
    el("Li", 3, 6.941, 7.016004, 1, &[], 1.28, 1.23),
    el("B", 5, 10.812, 11.009305, 3, &[3], 0.84, 0.88),
    el("C", 6, 12.011, 12.000000, 4, &[4], 0.76, 0.77),
    el("N", 7, 14.007, 14.003074, 5, &[3, 5], 0.71, 0.7),
    el("O", 8, 15.999, 15.994915, 6, &[2], 0.66, 0.66),
    el("F", 9, 18.998, 18.998403, 7, &[1], 0.57, 0.611),
    el("Na", 11, 22.990, 22.989770, 1, &[], 1.66, 1.54),
    el("Mg", 12, 24.305, 23.985042, 2, &[], 1.41, 1.36),
    el("Al", 13, 26.982, 26.981538, 3, &[], 1.21, 1.18),
    el("Si", 14, 28.086, 27.976927, 4, &[4], 1.11, 0.937),
    el("P", 15, 30.974, 30.973762, 5, &[3, 5, 7], 1.07, 0.89),
    el("S", 16, 32.065, 31.972071, 6, &[2, 4, 6], 1.05, 1.04),
    el("Cl", 17, 35.453, 34.968853, 7, &[1], 1.02, 0.997),
    el("K", 19, 39.098, 38.963707, 1, &[], 2.03, 2.03),
    el("Ca", 20, 40.078, 39.962591, 2, &[], 1.76, 1.74),
    el("Fe", 26, 55.845, 55.934942, 8, &[], 1.32, 1.17),
    el("Cu", 29, 63.546, 62.929601, 11, &[], 1.32, 1.17),
    el("Zn", 30, 65.390, 63.929147, 12, &[], 1.22, 1.25),
    el("As", 33, 74.922, 74.921596, 5, &[3, 5], 1.19, 1.21),
    el("Se", 34, 78.960, 79.916522, 6, &[2, 4, 6], 1.20, 1.17),
    el("Br", 35, 79.904, 78.918338, 7, &[1], 1.20, 1.141),
    el("Sn", 50, 118.710, 119.902197, 4, &[], 1.39, 1.4),
    el("I", 53, 126.904, 126.904468, 7, &[1, 3, 5], 1.39, 1.333),
    el("Pt", 78, 195.078, 194.964774, 10, &[], 1.36, 1.3),
];

pub fn element_by_number(atomic_number: u8) -> Option<&'static Element> {
    ELEMENTS.iter().find(|e| e.atomic_number == atomic_number)
}

pub fn element_by_symbol(symbol: &str) -> Option<&'static Element> {
    ELEMENTS.iter().find(|e| e.symbol == symbol)
}

impl Element {
    /// Valences allowed once a formal charge is applied.
    ///
    /// Charged atoms take the valences of their isoelectronic neighbour:
    /// N+ behaves like C, O- like F, C- like N.
    pub fn charged_valences(&self, charge: i8) -> Vec<u8> {
        if charge == 0 {
            return self.valences.to_vec();
        }
        let group_below_carbon = self.valence_electrons <= 4;
        self.valences
            .iter()
            .filter_map(|&v| {
                let adjusted = if group_below_carbon {
                    v as i16 - (charge as i16).abs()
                } else {
                    v as i16 + charge as i16
                };
                (adjusted >= 0).then_some(adjusted as u8)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_symbol_and_number() {
        let c = element_by_symbol("C").unwrap();
        assert_eq!(c.atomic_number, 6);
        assert_eq!(element_by_number(17).unwrap().symbol, "Cl");
        assert!(element_by_symbol("Xx").is_none());
    }

    #[test]
    fn test_charged_valences_follow_isoelectronic_partner() {
        let n = element_by_symbol("N").unwrap();
        assert_eq!(n.charged_valences(1), vec![4, 6]);
        let o = element_by_symbol("O").unwrap();
        assert_eq!(o.charged_valences(-1), vec![1]);
        let c = element_by_symbol("C").unwrap();
        assert_eq!(c.charged_valences(-1), vec![3]);
    }
}
