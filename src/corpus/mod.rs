//! Flat fingerprint corpus.
//!
//! Texts and fingerprints are two parallel vectors correlated only by position.
//! Lookups are a brute-force linear scan; there is no index structure.

pub mod builder;

pub use builder::{CorpusBuild, CorpusBuilder};

use crate::error::CorpusError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::info;

/// Length of every fingerprint (one component per SHA-256 digest byte)
pub const FINGERPRINT_DIM: usize = 32;

/// Deterministic placeholder vector for a text block.
///
/// Each digest byte is scaled to [0, 1]. Similar texts do not get similar
/// fingerprints; only identical texts match.
pub fn fingerprint(text: &str) -> Vec<f32> {
    Sha256::digest(text.as_bytes())
        .iter()
        .map(|byte| f32::from(*byte) / 255.0)
        .collect()
}

/// On-disk form of the fingerprint matrix
#[derive(Debug, Serialize, Deserialize)]
struct FlatIndex {
    dimension: usize,
    vectors: Vec<Vec<f32>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit<'a> {
    pub position: usize,
    pub distance: f32,
    pub text: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Corpus {
    texts: Vec<String>,
    fingerprints: Vec<Vec<f32>>,
}

impl Corpus {
    pub fn from_texts(texts: Vec<String>) -> Self {
        let fingerprints = texts.iter().map(|text| fingerprint(text)).collect();
        Self { texts, fingerprints }
    }

    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    pub fn fingerprints(&self) -> &[Vec<f32>] {
        &self.fingerprints
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Write both artifacts, replacing whatever was there
    pub fn save(&self, index_path: &Path, data_path: &Path) -> Result<(), CorpusError> {
        let index = FlatIndex {
            dimension: FINGERPRINT_DIM,
            vectors: self.fingerprints.clone(),
        };
        write_json(index_path, &index)?;
        write_json(data_path, &self.texts)?;

        info!(
            entries = self.len(),
            index = %index_path.display(),
            data = %data_path.display(),
            "Saved corpus"
        );
        Ok(())
    }

    /// Read both artifacts back; they must agree in length and dimension
    pub fn load(index_path: &Path, data_path: &Path) -> Result<Self, CorpusError> {
        let index: FlatIndex = read_json(index_path)?;
        let texts: Vec<String> = read_json(data_path)?;

        if index.vectors.len() != texts.len() {
            return Err(CorpusError::Mismatch {
                vectors: index.vectors.len(),
                texts: texts.len(),
            });
        }

        if index.dimension != FINGERPRINT_DIM {
            return Err(CorpusError::Header {
                found: index.dimension,
                expected: FINGERPRINT_DIM,
            });
        }

        if let Some((position, vector)) = index
            .vectors
            .iter()
            .enumerate()
            .find(|(_, v)| v.len() != FINGERPRINT_DIM)
        {
            return Err(CorpusError::Dimension {
                position,
                found: vector.len(),
                expected: FINGERPRINT_DIM,
            });
        }

        Ok(Self {
            texts,
            fingerprints: index.vectors,
        })
    }

    /// The `k` entries closest to the query's fingerprint by squared L2 distance
    pub fn search(&self, query: &str, k: usize) -> Vec<SearchHit<'_>> {
        let probe = fingerprint(query);

        let mut hits: Vec<SearchHit<'_>> = self
            .fingerprints
            .iter()
            .zip(&self.texts)
            .enumerate()
            .map(|(position, (vector, text))| SearchHit {
                position,
                distance: squared_l2(&probe, vector),
                text,
            })
            .collect();

        // stable: equal distances keep corpus order
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(k);
        hits
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), CorpusError> {
    let json = serde_json::to_vec(value).map_err(|source| CorpusError::Format {
        path: path.display().to_string(),
        source,
    })?;
    std::fs::write(path, json).map_err(|source| CorpusError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, CorpusError> {
    let bytes = std::fs::read(path).map_err(|source| CorpusError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| CorpusError::Format {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> Corpus {
        Corpus::from_texts(vec![
            "Title | MNT 1 | Bayangol | 56 м² | 2 өрөө | nice".to_string(),
            "new apartment prices: District Price Change Change%".to_string(),
            "old apartment prices: District Price Change Change%".to_string(),
        ])
    }

    #[test]
    fn fingerprint_is_deterministic_and_fixed_length() {
        let a = fingerprint("Bayangol");
        let b = fingerprint("Bayangol");
        assert_eq!(a, b);
        assert_eq!(a.len(), FINGERPRINT_DIM);
        assert_eq!(fingerprint("").len(), FINGERPRINT_DIM);
        assert_ne!(a, fingerprint("Bayangol "));
        assert!(a.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn texts_and_fingerprints_stay_parallel() {
        let corpus = sample();
        assert_eq!(corpus.texts().len(), corpus.fingerprints().len());
        for (text, vector) in corpus.texts().iter().zip(corpus.fingerprints()) {
            assert_eq!(&fingerprint(text), vector);
        }
    }

    #[test]
    fn save_then_load_preserves_order() {
        let dir = TempDir::new().unwrap();
        let index = dir.path().join("vector_store.index");
        let data = dir.path().join("vector_data.json");

        let corpus = sample();
        corpus.save(&index, &data).unwrap();
        let loaded = Corpus::load(&index, &data).unwrap();
        assert_eq!(loaded, corpus);
    }

    #[test]
    fn count_mismatch_is_reported_as_corruption() {
        let dir = TempDir::new().unwrap();
        let index = dir.path().join("vector_store.index");
        let data = dir.path().join("vector_data.json");

        sample().save(&index, &data).unwrap();
        std::fs::write(&data, r#"["only one"]"#).unwrap();

        let err = Corpus::load(&index, &data).unwrap_err();
        assert!(matches!(err, CorpusError::Mismatch { vectors: 3, texts: 1 }));
    }

    #[test]
    fn wrong_dimension_is_rejected() {
        let dir = TempDir::new().unwrap();
        let index = dir.path().join("vector_store.index");
        let data = dir.path().join("vector_data.json");

        std::fs::write(&index, r#"{"dimension":32,"vectors":[[0.5,0.5]]}"#).unwrap();
        std::fs::write(&data, r#"["short"]"#).unwrap();

        let err = Corpus::load(&index, &data).unwrap_err();
        assert!(matches!(err, CorpusError::Dimension { position: 0, found: 2, .. }));
    }

    #[test]
    fn wrong_declared_dimension_is_rejected_even_when_empty() {
        let dir = TempDir::new().unwrap();
        let index = dir.path().join("vector_store.index");
        let data = dir.path().join("vector_data.json");

        std::fs::write(&index, r#"{"dimension":16,"vectors":[]}"#).unwrap();
        std::fs::write(&data, "[]").unwrap();

        let err = Corpus::load(&index, &data).unwrap_err();
        assert!(matches!(err, CorpusError::Header { found: 16, expected: FINGERPRINT_DIM }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let err = Corpus::load(&dir.path().join("nope"), &dir.path().join("nada")).unwrap_err();
        assert!(matches!(err, CorpusError::Io { .. }));
    }

    #[test]
    fn exact_text_is_the_nearest_hit() {
        let corpus = sample();
        let hits = corpus.search("old apartment prices: District Price Change Change%", 2);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].position, 2);
        assert_eq!(hits[0].distance, 0.0);
        assert!(hits[1].distance > 0.0);
    }

    #[test]
    fn search_on_empty_corpus_is_empty() {
        assert!(Corpus::default().search("anything", 5).is_empty());
    }
}
