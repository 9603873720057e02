//! Vocabulary, class list and bag-of-words encoding.
//!
//! Both lists are sorted and deduplicated, so a stem's position is its feature
//! column and a label's position is its output neuron. Sorting makes the
//! layout a pure function of the corpus contents.

use std::collections::BTreeSet;
use std::sync::Arc;

use bit_vec::BitVec;
use serde::{Deserialize, Serialize};

use super::corpus::Corpus;
use super::matrix::Matrix;
use super::types::TrainingExample;
use crate::analysis::analyzer::analyzer::Analyzer;
use crate::analysis::analyzer::intent::IntentAnalyzer;
use crate::error::Result;

fn first_unsorted(items: &[String]) -> Option<usize> {
    items.windows(2).position(|w| w[0] >= w[1]).map(|i| i + 1)
}

/// Sorted, unique stems; index = input column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    stems: Vec<String>,
}

impl Vocabulary {
    /// Build from any collection of stems, sorting and deduplicating.
    pub fn from_stems<I, S>(stems: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = stems.into_iter().map(Into::into).collect();
        Vocabulary {
            stems: set.into_iter().collect(),
        }
    }

    /// Accept an already ordered list, failing with the offending position if
    /// it is not strictly increasing.
    pub fn from_sorted(stems: Vec<String>) -> std::result::Result<Self, usize> {
        match first_unsorted(&stems) {
            Some(i) => Err(i),
            None => Ok(Vocabulary { stems }),
        }
    }

    pub fn len(&self) -> usize {
        self.stems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stems.is_empty()
    }

    /// Column of `stem`, if known.
    pub fn index_of(&self, stem: &str) -> Option<usize> {
        self.stems
            .binary_search_by(|probe| probe.as_str().cmp(stem))
            .ok()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.stems.get(index).map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.stems
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.stems.iter().map(String::as_str)
    }

    /// Bag-of-words bits for a list of stems. Unknown stems are ignored.
    pub fn encode_stems<S: AsRef<str>>(&self, stems: &[S]) -> BitVec {
        let mut bits = BitVec::from_elem(self.len(), false);
        for stem in stems {
            if let Some(i) = self.index_of(stem.as_ref()) {
                bits.set(i, true);
            }
        }
        bits
    }
}

/// Sorted, unique labels; index = output neuron.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classes {
    labels: Vec<String>,
}

impl Classes {
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = labels.into_iter().map(Into::into).collect();
        Classes {
            labels: set.into_iter().collect(),
        }
    }

    /// Accept an already ordered list; see [`Vocabulary::from_sorted`].
    pub fn from_sorted(labels: Vec<String>) -> std::result::Result<Self, usize> {
        match first_unsorted(&labels) {
            Some(i) => Err(i),
            None => Ok(Classes { labels }),
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.labels
            .binary_search_by(|probe| probe.as_str().cmp(label))
            .ok()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.labels
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    /// One-hot target row for `label`.
    pub fn one_hot(&self, label: &str) -> Vec<f64> {
        let mut row = vec![0.0; self.len()];
        if let Some(i) = self.index_of(label) {
            row[i] = 1.0;
        }
        row
    }
}

/// Dense `0.0`/`1.0` view of a feature bitvector.
pub fn bits_to_dense(bits: &BitVec) -> Vec<f64> {
    bits.iter().map(|b| if b { 1.0 } else { 0.0 }).collect()
}

/// Everything training needs, derived from one corpus.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSet {
    pub vocabulary: Vocabulary,
    pub classes: Classes,
    pub examples: Vec<TrainingExample>,
}

impl TrainingSet {
    /// Input matrix, one encoded example per row.
    pub fn inputs(&self) -> Matrix {
        let mut data = Vec::with_capacity(self.examples.len() * self.vocabulary.len());
        for example in &self.examples {
            data.extend(bits_to_dense(&self.vocabulary.encode_stems(&example.stems)));
        }
        Matrix::from_parts(self.examples.len(), self.vocabulary.len(), data)
    }

    /// Target matrix, one one-hot row per example.
    pub fn targets(&self) -> Matrix {
        let mut data = Vec::with_capacity(self.examples.len() * self.classes.len());
        for example in &self.examples {
            data.extend(self.classes.one_hot(&example.label));
        }
        Matrix::from_parts(self.examples.len(), self.classes.len(), data)
    }
}

/// Turns text into stems and stems into feature vectors.
#[derive(Clone)]
pub struct FeatureBuilder {
    analyzer: Arc<dyn Analyzer>,
}

impl FeatureBuilder {
    pub fn new(analyzer: Arc<dyn Analyzer>) -> Self {
        FeatureBuilder { analyzer }
    }

    pub fn analyzer(&self) -> &Arc<dyn Analyzer> {
        &self.analyzer
    }

    /// Stems of `text` after the full analysis pipeline.
    pub fn stems(&self, text: &str) -> Result<Vec<String>> {
        self.analyzer.stems(text)
    }

    /// Derive vocabulary, classes and examples from a validated corpus.
    pub fn build(&self, corpus: &Corpus) -> Result<TrainingSet> {
        corpus.validate()?;

        let mut stems = BTreeSet::new();
        let mut labels = BTreeSet::new();
        let mut examples = Vec::with_capacity(corpus.phrase_count());

        for (tag, phrase) in corpus.phrases() {
            let phrase_stems = self.stems(phrase)?;
            stems.extend(phrase_stems.iter().cloned());
            labels.insert(tag.to_string());
            examples.push(TrainingExample {
                stems: phrase_stems,
                label: tag.to_string(),
            });
        }

        Ok(TrainingSet {
            vocabulary: Vocabulary {
                stems: stems.into_iter().collect(),
            },
            classes: Classes {
                labels: labels.into_iter().collect(),
            },
            examples,
        })
    }

    /// Bag-of-words vector of `text` against `vocabulary`.
    pub fn encode(&self, text: &str, vocabulary: &Vocabulary) -> Result<BitVec> {
        Ok(vocabulary.encode_stems(&self.stems(text)?))
    }
}

impl Default for FeatureBuilder {
    fn default() -> Self {
        Self::new(Arc::new(IntentAnalyzer::new()))
    }
}

impl std::fmt::Debug for FeatureBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureBuilder")
            .field("analyzer", &self.analyzer.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token_filter::stem::IdentityStemmer;
    use crate::ml::intent_classifier::corpus::IntentDefinition;

    fn corpus() -> Corpus {
        Corpus::new(vec![
            IntentDefinition::new("weather", &["Is it raining?", "weather today"]),
            IntentDefinition::new("greeting", &["hello there", "hello!"]),
        ])
    }

    #[test]
    fn test_vocabulary_is_sorted_and_unique() {
        let vocab = Vocabulary::from_stems(["b", "a", "c", "a"]);
        assert_eq!(vocab.as_slice(), &["a", "b", "c"]);
        assert_eq!(vocab.index_of("c"), Some(2));
        assert_eq!(vocab.index_of("z"), None);
    }

    #[test]
    fn test_from_sorted_rejects_unsorted() {
        assert!(Vocabulary::from_sorted(vec!["a".into(), "b".into()]).is_ok());
        assert_eq!(
            Vocabulary::from_sorted(vec!["b".into(), "a".into()]).unwrap_err(),
            1
        );
        assert_eq!(
            Classes::from_sorted(vec!["a".into(), "a".into()]).unwrap_err(),
            1
        );
    }

    #[test]
    fn test_build() {
        let builder = FeatureBuilder::default();
        let set = builder.build(&corpus()).unwrap();

        assert_eq!(set.classes.as_slice(), &["greeting", "weather"]);
        assert_eq!(set.examples.len(), 4);
        assert_eq!(set.examples[0].label, "weather");
        assert_eq!(set.examples[0].stems, vec!["is", "it", "rain"]);
        assert!(set.vocabulary.index_of("?").is_none());
        assert!(set.vocabulary.index_of("!").is_none());

        let sorted = Vocabulary::from_stems(set.vocabulary.iter());
        assert_eq!(sorted, set.vocabulary);
    }

    #[test]
    fn test_build_rejects_invalid_corpus() {
        let builder = FeatureBuilder::default();
        assert!(builder.build(&Corpus::default()).is_err());
    }

    #[test]
    fn test_encode_is_order_independent() {
        let builder = FeatureBuilder::default();
        let set = builder.build(&corpus()).unwrap();

        let a = builder.encode("raining weather", &set.vocabulary).unwrap();
        let b = builder.encode("weather raining", &set.vocabulary).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), set.vocabulary.len());
        assert_eq!(a.iter().filter(|bit| *bit).count(), 2);
    }

    #[test]
    fn test_encode_unknown_words_gives_zero_vector() {
        let builder = FeatureBuilder::default();
        let set = builder.build(&corpus()).unwrap();

        let bits = builder.encode("xylophone quasar", &set.vocabulary).unwrap();
        assert!(bits.none());
        assert_eq!(bits.len(), set.vocabulary.len());
    }

    #[test]
    fn test_inputs_and_targets_shapes() {
        let builder = FeatureBuilder::default();
        let set = builder.build(&corpus()).unwrap();

        let inputs = set.inputs();
        let targets = set.targets();
        assert_eq!((inputs.rows(), inputs.cols()), (4, set.vocabulary.len()));
        assert_eq!((targets.rows(), targets.cols()), (4, 2));
        // "Is it raining?" is a weather phrase, neuron 1.
        assert_eq!(targets.row(0), &[0.0, 1.0]);
    }

    #[test]
    fn test_injected_stemmer_changes_vocabulary() {
        let builder = FeatureBuilder::new(Arc::new(IntentAnalyzer::with_stemmer(Arc::new(
            IdentityStemmer::new(),
        ))));
        let set = builder.build(&corpus()).unwrap();
        assert!(set.vocabulary.index_of("raining").is_some());
        assert!(set.vocabulary.index_of("rain").is_none());
    }
}
