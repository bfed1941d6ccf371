use crate::error::LabelsError;
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

/// Class names indexed by model output position.
#[derive(Debug, Clone)]
pub struct LabelCatalog {
    labels: Vec<String>,
}

impl LabelCatalog {
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }

    /// Reads one label per line. A leading WordNet id (`n01440764,tench`) is
    /// dropped; any other comma is part of the label (`tench, Tinca tinca`).
    pub fn load(filepath: &Path) -> Result<Self, LabelsError> {
        let file = File::open(filepath)?;
        let reader = BufReader::new(file);
        let mut labels = Vec::new();

        for (line_number, line_result) in reader.lines().enumerate() {
            let line = line_result?;
            let label = match line.split_once(',') {
                Some((prefix, name)) if is_wordnet_id(prefix.trim()) => name.trim(),
                _ => line.trim(),
            };
            if label.is_empty() {
                return Err(LabelsError::BlankLine(line_number + 1));
            }
            labels.push(label.to_string());
        }

        if labels.is_empty() {
            return Err(LabelsError::Empty);
        }

        tracing::info!("Loaded {} class labels from {:?}", labels.len(), filepath);
        Ok(Self { labels })
    }

    pub fn label(&self, index: usize) -> String {
        self.labels
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("class_{}", index))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

fn is_wordnet_id(token: &str) -> bool {
    match token.strip_prefix('n') {
        Some(digits) => !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}
