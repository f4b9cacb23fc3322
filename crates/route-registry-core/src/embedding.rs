//! Vectorizer trait and vector utilities.
//!
//! Defines the [`Vectorizer`] trait that all embedding backends implement,
//! the default [`HashingVectorizer`], and pure helpers for similarity
//! computation.
//!
//! Network-backed vectorizers (OpenAI-compatible endpoints) live in the
//! `route-registry` app crate and are injected through the same trait.
//!
//! # Hashing scheme
//!
//! ```text
//! text ──▶ tokens ──▶ sha256(token) ──▶ (bucket, sign) ──▶ Σ weight·sign ──▶ L2 normalize
//! ```
//!
//! Tokens are lower-cased words, with camelCase and snake_case identifiers
//! additionally split into their parts (`createThing` → `creatething`,
//! `create`, `thing`). Optionally each word also contributes its character
//! trigrams at half weight, which lets `button` match `buttons`.

use sha2::{Digest, Sha256};

use crate::error::{RegistryError, Result};

/// Default dimensionality for the hashing vectorizer.
pub const DEFAULT_DIMS: usize = 256;

const WORD_WEIGHT: f32 = 1.0;
const TRIGRAM_WEIGHT: f32 = 0.5;

/// A deterministic text → fixed-length vector function.
///
/// Implementations must return the same vector for the same input and
/// always return exactly [`dims`](Vectorizer::dims) values. The
/// [`model_id`](Vectorizer::model_id) identifies the algorithm and version;
/// vectors from different model ids are never compared.
pub trait Vectorizer: Send + Sync {
    /// Returns the model identifier (e.g. `"hashing-v1:256"`).
    fn model_id(&self) -> &str;
    /// Returns the embedding vector dimensionality.
    fn dims(&self) -> usize;
    /// Embed one text.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Feature-hashing bag-of-words vectorizer.
#[derive(Debug, Clone)]
pub struct HashingVectorizer {
    dims: usize,
    trigrams: bool,
    model_id: String,
}

impl HashingVectorizer {
    /// Create a vectorizer with `dims` buckets.
    ///
    /// # Errors
    ///
    /// Returns an embedding error when `dims` is zero.
    pub fn new(dims: usize, trigrams: bool) -> Result<Self> {
        if dims == 0 {
            return Err(RegistryError::embedding(
                "hashing-v1",
                "vector dimensionality must be at least 1",
            ));
        }
        let model_id = if trigrams {
            format!("hashing-v1+tri:{}", dims)
        } else {
            format!("hashing-v1:{}", dims)
        };
        Ok(Self {
            dims,
            trigrams,
            model_id,
        })
    }

    fn add_feature(&self, vector: &mut [f32], feature: &str, weight: f32) {
        let digest = Sha256::digest(feature.as_bytes());
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        let bucket = (u64::from_le_bytes(head) % self.dims as u64) as usize;
        let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign * weight;
    }
}

impl Default for HashingVectorizer {
    fn default() -> Self {
        Self {
            dims: DEFAULT_DIMS,
            trigrams: true,
            model_id: format!("hashing-v1+tri:{}", DEFAULT_DIMS),
        }
    }
}

impl Vectorizer for HashingVectorizer {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn dims(&self) -> usize {
        self.dims
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dims];
        for token in tokenize(text) {
            self.add_feature(&mut vector, &token, WORD_WEIGHT);
            if self.trigrams {
                let padded: Vec<char> = format!("#{}#", token).chars().collect();
                for window in padded.windows(3) {
                    let gram: String = window.iter().collect();
                    self.add_feature(&mut vector, &format!("3:{}", gram), TRIGRAM_WEIGHT);
                }
            }
        }
        l2_normalize(&mut vector);
        Ok(vector)
    }
}

/// Split text into lower-case word tokens.
///
/// Identifiers written in camelCase, PascalCase or snake_case also
/// contribute their parts, after the whole word.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for word in text.split(|c: char| !c.is_alphanumeric() && c != '_') {
        let word = word.trim_matches('_');
        if word.is_empty() {
            continue;
        }
        tokens.push(word.to_lowercase());

        let parts = split_identifier(word);
        if parts.len() > 1 {
            tokens.extend(parts.into_iter().map(|p| p.to_lowercase()));
        }
    }
    tokens
}

fn split_identifier(word: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for c in word.chars() {
        if c == '_' {
            if !current.is_empty() {
                parts.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            parts.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_numeric();
        current.push(c);
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

/// Scale a vector to unit length in place. Zero vectors are left as-is.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm < f32::EPSILON {
        return;
    }
    for v in vector.iter_mut() {
        *v /= norm;
    }
}

/// Compute cosine similarity between two embedding vectors.
///
/// Returns a value in `[-1.0, 1.0]`:
/// - `1.0` = identical direction
/// - `0.0` = orthogonal (unrelated)
/// - `-1.0` = opposite direction
///
/// Returns `0.0` when either vector has zero magnitude. Callers must
/// check lengths first; mismatched lengths are a usage error.
///
/// # Formula
///
/// ```text
///            a · b
/// cos(θ) = ─────────
///          ‖a‖ × ‖b‖
/// ```
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(RegistryError::Usage {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return Ok(0.0);
    }

    Ok((dot / denom).clamp(-1.0, 1.0))
}
