pub mod classifier;
pub mod labels;
pub mod preprocessing;

pub use classifier::{ImageClassifier, OrtImageClassifier, Prediction};
pub use labels::LabelCatalog;
pub use preprocessing::{preprocess_image, ImageTensor};
