#[cfg(test)]
mod tests {
    use super::super::*;
    use std::io::Write;

    #[test]
    fn test_empty_file_gives_reference_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.model.forest.n_trees, 100);
        assert_eq!(config.output.predictions_path(), PathBuf::from("./output/predictions.csv"));
        assert!(config.upload.path.is_none());
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = Config::parse(
            r#"
            [dataset]
            source = "path"
            path = "data/egfr.csv"

            [upload]
            path = "sample.csv"

            [model.forest]
            n_trees = 25
            "#,
        )
        .unwrap();
        assert_eq!(config.dataset, DatasetSource::Path { path: PathBuf::from("data/egfr.csv") });
        assert_eq!(config.upload.path, Some(PathBuf::from("sample.csv")));
        assert_eq!(config.model.forest.n_trees, 25);
        assert_eq!(config.model.forest.seed, 42);
        assert_eq!(config.model.split.seed, 8);
    }

    #[test]
    fn test_invalid_model_settings_rejected() {
        let err = Config::parse("[model.split]\ntest_fraction = 0.0\n").unwrap_err();
        assert!(err.to_string().contains("test_fraction"));
    }

    #[test]
    fn test_from_file_reports_missing_path() {
        let err = Config::from_file(Path::new("/nonexistent/pic50.toml")).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_from_file_reads_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[output]\ndir = \"results\"\ntop_features = 3").unwrap();
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.output.dir, PathBuf::from("results"));
        assert_eq!(config.output.top_features, 3);
        assert_eq!(config.output.chart_path(), PathBuf::from("results/parity_chart.json"));
    }
}
