//! pic50-model: Dataset preparation, scaling, random forest regression,
//! evaluation and inference on uploaded compound batches.

pub mod dataset;
pub mod forest;
pub mod inference;
pub mod metrics;
pub mod report;
pub mod scaler;
pub mod session;
pub mod tree;

pub use dataset::{clean, train_test_split, CleaningReport, LabeledTable, TrainTestSplit};
pub use forest::RandomForestRegressor;
pub use inference::{check_upload_compatible, InferenceAdapter, Prediction, PredictionReport, UploadBatch};
pub use metrics::Evaluation;
pub use report::{ParityChart, TablePreview, TrendLine};
pub use scaler::StandardScaler;
pub use session::{ModelArtifact, TrainedSession, TrainingSession};
