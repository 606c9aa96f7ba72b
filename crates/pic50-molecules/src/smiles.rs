//! SMILES parsing.
//!
//! Supports the organic subset, bracket atoms (isotope, chirality marks,
//! hydrogen count, charge, atom class), explicit bond symbols, branches,
//! ring closures including `%nn`, and dot-separated components.
//! Implicit hydrogens are assigned to organic-subset atoms from their
//! lowest sufficient default valence.

use std::collections::BTreeMap;
use std::iter::Peekable;
use std::str::CharIndices;

use thiserror::Error;

use crate::element::{element_by_symbol, Element};
use crate::molecule::{Atom, Bond, BondOrder, Molecule};
use crate::ring::RingInfo;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SmilesError {
    #[error("empty SMILES string")]
    Empty,

    #[error("unexpected character {ch:?} at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("unknown element {symbol:?} at position {pos}")]
    UnknownElement { symbol: String, pos: usize },

    #[error("unmatched ')' at position {pos}")]
    UnmatchedClose { pos: usize },

    #[error("branch opened but never closed")]
    UnclosedBranch,

    #[error("ring bond {label} was opened but never closed")]
    UnclosedRing { label: u32 },

    #[error("bond symbol at position {pos} is not followed by an atom")]
    DanglingBond { pos: usize },

    #[error("ring closure {label} at position {pos} joins an atom to itself or repeats a bond")]
    InvalidRingClosure { label: u32, pos: usize },

    #[error("ring closure {label} has conflicting bond orders")]
    ConflictingRingBond { label: u32 },

    #[error("bracket atom starting at position {pos} is malformed: {detail}")]
    MalformedBracket { pos: usize, detail: String },

    #[error("explicit valence {valence} of atom {index} ({symbol}) is greater than permitted")]
    ValenceExceeded { index: usize, symbol: String, valence: u32 },

    #[error("atom {index} is marked aromatic but is not in a ring")]
    AromaticOutsideRing { index: usize },
}

/// How an atom was written; bracket atoms carry their own hydrogen count.
#[derive(Debug, Clone, Copy, PartialEq)]
enum AtomSyntax {
    Organic,
    Bracket,
}

struct PendingBond {
    atom1: usize,
    atom2: usize,
    /// `None` means implicit: single, or aromatic between aromatic atoms.
    order: Option<BondOrder>,
}

struct RingOpening {
    atom: usize,
    order: Option<BondOrder>,
}

/// Parse a SMILES string into a molecule with implicit hydrogen counts.
pub fn parse_smiles(smiles: &str) -> Result<Molecule, SmilesError> {
    let text = smiles.trim();
    if text.is_empty() {
        return Err(SmilesError::Empty);
    }

    let mut atoms: Vec<Atom> = Vec::new();
    let mut syntax: Vec<AtomSyntax> = Vec::new();
    let mut bonds: Vec<PendingBond> = Vec::new();

    let mut prev: Option<usize> = None;
    let mut pending: Option<(BondOrder, usize)> = None;
    let mut branches: Vec<Option<usize>> = Vec::new();
    let mut rings: BTreeMap<u32, RingOpening> = BTreeMap::new();

    let mut chars = text.char_indices().peekable();

    while let Some(&(pos, ch)) = chars.peek() {
        match ch {
            '-' | '=' | '#' | '$' | ':' | '/' | '\\' => {
                chars.next();
                if pending.is_some() || prev.is_none() {
                    return Err(SmilesError::UnexpectedChar { ch, pos });
                }
                let order = match ch {
                    '=' => BondOrder::Double,
                    '#' => BondOrder::Triple,
                    '$' => BondOrder::Quadruple,
                    ':' => BondOrder::Aromatic,
                    _ => BondOrder::Single,
                };
                pending = Some((order, pos));
            }
            '(' => {
                chars.next();
                if prev.is_none() || pending.is_some() {
                    return Err(SmilesError::UnexpectedChar { ch, pos });
                }
                branches.push(prev);
            }
            ')' => {
                chars.next();
                if let Some((_, bond_pos)) = pending {
                    return Err(SmilesError::DanglingBond { pos: bond_pos });
                }
                prev = branches.pop().ok_or(SmilesError::UnmatchedClose { pos })?;
            }
            '.' => {
                chars.next();
                if let Some((_, bond_pos)) = pending {
                    return Err(SmilesError::DanglingBond { pos: bond_pos });
                }
                prev = None;
            }
            '0'..='9' | '%' => {
                let label = read_ring_label(&mut chars)?;
                let current = prev.ok_or(SmilesError::UnexpectedChar { ch, pos })?;
                let order = pending.take().map(|(o, _)| o);

                if let Some(open) = rings.remove(&label) {
                    if open.atom == current
                        || bonds.iter().any(|b| {
                            (b.atom1 == open.atom && b.atom2 == current)
                                || (b.atom1 == current && b.atom2 == open.atom)
                        })
                    {
                        return Err(SmilesError::InvalidRingClosure { label, pos });
                    }
                    let order = match (open.order, order) {
                        (Some(a), Some(b)) if a != b => {
                            return Err(SmilesError::ConflictingRingBond { label })
                        }
                        (a, b) => a.or(b),
                    };
                    bonds.push(PendingBond { atom1: open.atom, atom2: current, order });
                } else {
                    rings.insert(label, RingOpening { atom: current, order });
                }
            }
            '[' => {
                let atom = read_bracket_atom(&mut chars)?;
                let idx = atoms.len();
                atoms.push(atom);
                syntax.push(AtomSyntax::Bracket);
                link(&mut bonds, &mut prev, &mut pending, idx);
            }
            _ => {
                let atom = read_organic_atom(&mut chars)?;
                let idx = atoms.len();
                atoms.push(atom);
                syntax.push(AtomSyntax::Organic);
                link(&mut bonds, &mut prev, &mut pending, idx);
            }
        }
    }

    if let Some((_, pos)) = pending {
        return Err(SmilesError::DanglingBond { pos });
    }
    if !branches.is_empty() {
        return Err(SmilesError::UnclosedBranch);
    }
    if let Some((&label, _)) = rings.iter().next() {
        return Err(SmilesError::UnclosedRing { label });
    }

    let bonds: Vec<Bond> = bonds
        .into_iter()
        .map(|b| {
            let order = b.order.unwrap_or(
                if atoms[b.atom1].is_aromatic && atoms[b.atom2].is_aromatic {
                    BondOrder::Aromatic
                } else {
                    BondOrder::Single
                },
            );
            Bond { atom1: b.atom1, atom2: b.atom2, order }
        })
        .collect();

    let mut mol = Molecule::new(atoms, bonds);
    let rings = RingInfo::perceive(&mol);
    // Two aromatic atoms joined outside any ring (biphenyl) share a single bond.
    for (bi, bond) in mol.bonds.iter_mut().enumerate() {
        if bond.order == BondOrder::Aromatic && !rings.bond_in_ring(bi) {
            bond.order = BondOrder::Single;
        }
    }
    assign_hydrogens(&mut mol, &syntax)?;

    if let Some(index) = (0..mol.atom_count())
        .find(|&i| mol.atoms[i].is_aromatic && !rings.atom_in_ring(i))
    {
        return Err(SmilesError::AromaticOutsideRing { index });
    }

    Ok(mol)
}

fn link(
    bonds: &mut Vec<PendingBond>,
    prev: &mut Option<usize>,
    pending: &mut Option<(BondOrder, usize)>,
    idx: usize,
) {
    if let Some(p) = *prev {
        bonds.push(PendingBond {
            atom1: p,
            atom2: idx,
            order: pending.take().map(|(o, _)| o),
        });
    }
    *prev = Some(idx);
}

fn read_ring_label(chars: &mut Peekable<CharIndices<'_>>) -> Result<u32, SmilesError> {
    let (pos, ch) = chars.next().ok_or(SmilesError::Empty)?;
    if ch != '%' {
        return Ok(ch.to_digit(10).unwrap_or(0));
    }
    let mut label = 0;
    for _ in 0..2 {
        match chars.next() {
            Some((_, d)) if d.is_ascii_digit() => label = label * 10 + d.to_digit(10).unwrap_or(0),
            Some((p, c)) => return Err(SmilesError::UnexpectedChar { ch: c, pos: p }),
            None => return Err(SmilesError::UnexpectedChar { ch: '%', pos }),
        }
    }
    Ok(label)
}

fn read_organic_atom(chars: &mut Peekable<CharIndices<'_>>) -> Result<Atom, SmilesError> {
    let (pos, ch) = chars.next().ok_or(SmilesError::Empty)?;
    let (symbol, aromatic) = match ch {
        'B' if matches!(chars.peek(), Some((_, 'r'))) => {
            chars.next();
            ("Br", false)
        }
        'C' if matches!(chars.peek(), Some((_, 'l'))) => {
            chars.next();
            ("Cl", false)
        }
        'B' => ("B", false),
        'C' => ("C", false),
        'N' => ("N", false),
        'O' => ("O", false),
        'P' => ("P", false),
        'S' => ("S", false),
        'F' => ("F", false),
        'I' => ("I", false),
        'b' => ("B", true),
        'c' => ("C", true),
        'n' => ("N", true),
        'o' => ("O", true),
        'p' => ("P", true),
        's' => ("S", true),
        _ => return Err(SmilesError::UnexpectedChar { ch, pos }),
    };
    let element = lookup(symbol, pos)?;
    let mut atom = Atom::new(element);
    atom.is_aromatic = aromatic;
    Ok(atom)
}

fn read_bracket_atom(chars: &mut Peekable<CharIndices<'_>>) -> Result<Atom, SmilesError> {
    let (start, _) = chars.next().ok_or(SmilesError::Empty)?;
    let malformed = |detail: &str| SmilesError::MalformedBracket {
        pos: start,
        detail: detail.to_string(),
    };

    // Isotope
    let mut isotope: Option<u16> = None;
    while let Some(&(_, d)) = chars.peek() {
        if !d.is_ascii_digit() {
            break;
        }
        chars.next();
        let digit = d.to_digit(10).unwrap_or(0) as u16;
        isotope = Some(isotope.unwrap_or(0).saturating_mul(10).saturating_add(digit));
    }

    // Element symbol
    let (sym_pos, first) = chars.next().ok_or_else(|| malformed("missing element"))?;
    let (symbol, aromatic) = if first.is_ascii_uppercase() {
        let mut two = first.to_string();
        match chars.peek() {
            Some(&(_, second)) if second.is_ascii_lowercase() => {
                two.push(second);
                if element_by_symbol(&two).is_some() {
                    chars.next();
                    (two, false)
                } else {
                    (first.to_string(), false)
                }
            }
            _ => (first.to_string(), false),
        }
    } else if first.is_ascii_lowercase() {
        let mut two = first.to_string();
        if let Some(&(_, second)) = chars.peek() {
            two.push(second);
        }
        if two == "se" || two == "as" {
            chars.next();
            (capitalise(&two), true)
        } else if matches!(first, 'b' | 'c' | 'n' | 'o' | 'p' | 's') {
            (first.to_ascii_uppercase().to_string(), true)
        } else {
            return Err(SmilesError::UnknownElement { symbol: first.to_string(), pos: sym_pos });
        }
    } else {
        return Err(malformed("missing element"));
    };
    let element = lookup(&symbol, sym_pos)?;
    let mut atom = Atom::new(element);
    atom.is_aromatic = aromatic;
    atom.isotope = isotope;

    // Chirality marks; only their presence is kept
    while let Some(&(_, '@')) = chars.peek() {
        chars.next();
        atom.has_chirality_tag = true;
    }
    if atom.has_chirality_tag {
        while let Some(&(_, c)) = chars.peek() {
            if c.is_ascii_uppercase() && c != 'H' || c.is_ascii_digit() {
                chars.next();
            } else {
                break;
            }
        }
    }

    // Hydrogen count
    if let Some(&(_, 'H')) = chars.peek() {
        chars.next();
        let mut count = 1u8;
        if let Some(&(_, d)) = chars.peek() {
            if d.is_ascii_digit() {
                chars.next();
                count = d.to_digit(10).unwrap_or(1) as u8;
            }
        }
        atom.implicit_hydrogens = count;
    }

    // Charge
    if let Some(&(_, sign @ ('+' | '-'))) = chars.peek() {
        chars.next();
        let unit: i8 = if sign == '+' { 1 } else { -1 };
        let mut magnitude: i8 = 1;
        match chars.peek() {
            Some(&(_, d)) if d.is_ascii_digit() => {
                chars.next();
                magnitude = d.to_digit(10).unwrap_or(1) as i8;
            }
            _ => {
                while let Some(&(_, c)) = chars.peek() {
                    if c != sign {
                        break;
                    }
                    chars.next();
                    magnitude += 1;
                }
            }
        }
        atom.formal_charge = unit * magnitude;
    }

    // Atom class
    if let Some(&(_, ':')) = chars.peek() {
        chars.next();
        let mut any = false;
        while let Some(&(_, d)) = chars.peek() {
            if !d.is_ascii_digit() {
                break;
            }
            chars.next();
            any = true;
        }
        if !any {
            return Err(malformed("atom class without digits"));
        }
    }

    match chars.next() {
        Some((_, ']')) => Ok(atom),
        Some((pos, ch)) => Err(SmilesError::UnexpectedChar { ch, pos }),
        None => Err(malformed("missing ']'")),
    }
}

fn capitalise(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    if let Some(c) = chars.next() {
        out.push(c.to_ascii_uppercase());
    }
    out.extend(chars);
    out
}

fn lookup(symbol: &str, pos: usize) -> Result<&'static Element, SmilesError> {
    element_by_symbol(symbol).ok_or_else(|| SmilesError::UnknownElement {
        symbol: symbol.to_string(),
        pos,
    })
}

/// Fill implicit hydrogens, radicals, and reject over-valent atoms.
fn assign_hydrogens(mol: &mut Molecule, syntax: &[AtomSyntax]) -> Result<(), SmilesError> {
    for idx in 0..mol.atom_count() {
        let mut aromatic_bonds = 0u32;
        let mut other = 0u32;
        for order in mol.bond_orders(idx) {
            match order {
                BondOrder::Aromatic => aromatic_bonds += 1,
                o => other += o.as_f64() as u32,
            }
        }
        let explicit = aromatic_bonds + other;
        let atom = &mol.atoms[idx];
        let allowed = atom.element.charged_valences(atom.formal_charge);
        let symbol = atom.element.symbol.to_string();

        match syntax[idx] {
            AtomSyntax::Organic => {
                if allowed.is_empty() {
                    continue;
                }
                let hydrogens = if atom.is_aromatic && aromatic_bonds > 0 {
                    let base = allowed[0] as i64;
                    (base - (explicit as i64 + 1)).max(0) as u8
                } else {
                    let target = allowed
                        .iter()
                        .copied()
                        .find(|&v| v as u32 >= explicit)
                        .ok_or(SmilesError::ValenceExceeded {
                            index: idx,
                            symbol: symbol.clone(),
                            valence: explicit,
                        })?;
                    (target as u32 - explicit) as u8
                };
                if atom.is_aromatic && explicit > *allowed.last().unwrap_or(&0) as u32 {
                    return Err(SmilesError::ValenceExceeded { index: idx, symbol, valence: explicit });
                }
                mol.atoms[idx].implicit_hydrogens = hydrogens;
            }
            AtomSyntax::Bracket => {
                if allowed.is_empty() {
                    continue;
                }
                let used = explicit + atom.implicit_hydrogens as u32;
                let max = *allowed.last().unwrap_or(&0) as u32;
                if used > max {
                    return Err(SmilesError::ValenceExceeded { index: idx, symbol, valence: used });
                }
                if !atom.is_aromatic && used < allowed[0] as u32 {
                    mol.atoms[idx].radical_electrons = (allowed[0] as u32 - used) as u8;
                }
            }
        }
    }
    Ok(())
}
