//! Shared fixtures for pic50 tests: sample molecules, synthetic regression
//! tables, and CSV bodies shaped like the real training and upload files.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use pic50_common::{FeatureSchema, FeatureTable};
use pic50_molecules::FeatureExtractor;

/// Valid SMILES covering aromatic rings, heteroatoms, halogens and charges.
pub const SAMPLE_SMILES: &[&str] = &[
    "CCO",
    "c1ccccc1",
    "CC(=O)Oc1ccccc1C(=O)O",
    "CN1C=NC2=C1C(=O)N(C(=O)N2C)C",
    "CC(C)Cc1ccc(cc1)C(C)C(=O)O",
    "c1ccncc1",
    "Clc1ccc(cc1)C(=O)N",
    "COc1cc2ncnc(Nc3ccc(F)c(Cl)c3)c2cc1OCCCN1CCOCC1",
    "C#Cc1cccc(Nc2ncnc3cc(OCCOC)c(OCCOC)cc23)c1",
    "O=C(O)CCc1ccccc1",
    "C[N+](C)(C)CCO",
    "c1ccc2[nH]ccc2c1",
    "OC1CCCCC1",
    "CCN(CC)CC",
    "Brc1cccs1",
    "NC(=O)c1cccnc1",
];

/// Strings no SMILES parser should accept.
pub const INVALID_SMILES: &[&str] = &["not-a-smiles", "C1CC", "C(C", "", "c1cccc1X"];

/// Three noise-free columns with `label = 2 * x0 + 5`.
pub fn linear_features(n: usize) -> (FeatureTable, Vec<f64>) {
    let schema = FeatureSchema::new(["x0", "x1", "x2"]).expect("static schema");
    let rows: Vec<Vec<f64>> = (0..n)
        .map(|i| {
            let t = i as f64 / n.max(1) as f64;
            vec![t, ((i * 7) % 13) as f64, 1.0]
        })
        .collect();
    let labels = rows.iter().map(|r| 2.0 * r[0] + 5.0).collect();
    let table = FeatureTable::from_rows(schema, rows).expect("rows match schema");
    (table, labels)
}

/// `n_features` uniform columns; the label depends on the first two plus
/// seeded noise, and stays inside the usual pIC50 range.
pub fn synthetic_features(n: usize, n_features: usize, seed: u64) -> (FeatureTable, Vec<f64>) {
    assert!(n_features >= 2, "need at least two features");
    let schema = FeatureSchema::new((0..n_features).map(|i| format!("f{i}"))).expect("generated schema");
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut rows = Vec::with_capacity(n);
    let mut labels = Vec::with_capacity(n);
    for _ in 0..n {
        let row: Vec<f64> = (0..n_features).map(|_| rng.gen_range(0.0..1.0)).collect();
        let noise: f64 = rng.gen_range(-0.1..0.1);
        labels.push(6.0 + 3.0 * row[0] - 2.0 * row[1] + noise);
        rows.push(row);
    }
    let table = FeatureTable::from_rows(schema, rows).expect("rows match schema");
    (table, labels)
}

/// Training CSV body: extracted descriptor columns then `pIC50`. The label
/// is a deterministic function of the Lipinski record.
pub fn descriptor_training_csv(smiles: &[&str]) -> String {
    let extractor = FeatureExtractor::new().expect("extractor");
    let extracted = extractor.extract(smiles).expect("extraction");

    let mut writer = csv::Writer::from_writer(Vec::new());
    let mut header: Vec<String> = extracted.table.schema().columns().to_vec();
    header.push("pIC50".to_string());
    writer.write_record(&header).expect("header");

    for (row, lip) in extracted.table.rows().iter().zip(&extracted.lipinski) {
        let label = 4.0 + lip.mol_wt / 100.0 + 0.5 * lip.num_h_acceptors as f64;
        let mut record: Vec<String> = row.iter().map(f64::to_string).collect();
        record.push(label.to_string());
        writer.write_record(&record).expect("record");
    }
    String::from_utf8(writer.into_inner().expect("flush")).expect("utf8")
}

/// Upload CSV body with an id column and a `SMILES` column.
pub fn upload_csv(smiles: &[&str]) -> String {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["compound_id", "SMILES"]).expect("header");
    for (i, s) in smiles.iter().enumerate() {
        writer.write_record([format!("CPD-{i:03}"), s.to_string()]).expect("record");
    }
    String::from_utf8(writer.into_inner().expect("flush")).expect("utf8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pic50_molecules::parse_smiles;

    #[test]
    fn test_sample_smiles_parse() {
        for s in SAMPLE_SMILES {
            assert!(parse_smiles(s).is_ok(), "{s} should parse");
        }
        for s in INVALID_SMILES {
            assert!(parse_smiles(s).is_err(), "{s:?} should fail");
        }
    }

    #[test]
    fn test_synthetic_features_are_seeded() {
        let (a, ya) = synthetic_features(20, 4, 1);
        let (b, yb) = synthetic_features(20, 4, 1);
        assert_eq!(a, b);
        assert_eq!(ya, yb);
        assert!(ya.iter().all(|y| (3.5..=9.5).contains(y)));
    }
}
