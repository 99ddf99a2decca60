//! Default model lists per mode and backend.

use nassai_core::{Backend, Mode, NassaiError, Result, Vectorization};

use crate::config::{EstimatorParams, NetworkParams};
use crate::model::ClassifierKind;
use crate::runner::RunEntry;

/// Vectorizations that belong to a mode.
pub fn vectorizations(mode: Mode) -> &'static [Vectorization] {
    match mode {
        Mode::Tfidf => &[Vectorization::Tfidf],
        Mode::Word2Vec => &[Vectorization::MeanEmbedding, Vectorization::TfidfEmbedding],
        Mode::Doc2Vec => &[Vectorization::DocumentEmbedding],
    }
}

pub fn check_combination(mode: Mode, vectorization: Vectorization) -> Result<()> {
    if vectorizations(mode).contains(&vectorization) {
        Ok(())
    } else {
        Err(NassaiError::UnsupportedCombination(format!(
            "{vectorization} features cannot be used in {mode} mode"
        )))
    }
}

fn suffix(vectorization: Vectorization) -> &'static str {
    match vectorization {
        Vectorization::Tfidf => "",
        Vectorization::MeanEmbedding => "_mean_embedding",
        Vectorization::TfidfEmbedding => "_tfidf_embedding",
        Vectorization::DocumentEmbedding => "_doc_embedding",
    }
}

/// The models a `train` batch runs for `mode` and `backend`, in order.
pub fn model_list(
    mode: Mode,
    backend: Backend,
    estimator: &EstimatorParams,
    network: &NetworkParams,
) -> Vec<RunEntry> {
    let kinds: &[ClassifierKind] = match (mode, backend) {
        (Mode::Tfidf, Backend::Estimator) => &[
            ClassifierKind::BernoulliNb,
            ClassifierKind::MultinomialNb,
            ClassifierKind::LinearSvm,
            ClassifierKind::LogisticRegression,
        ],
        // Embedding features can be negative, which multinomial NB rejects.
        (_, Backend::Estimator) => &[
            ClassifierKind::BernoulliNb,
            ClassifierKind::LinearSvm,
            ClassifierKind::LogisticRegression,
        ],
        (_, Backend::Network) => &[ClassifierKind::Mlp],
    };

    vectorizations(mode)
        .iter()
        .flat_map(|&vectorization| {
            kinds.iter().map(move |kind| {
                RunEntry::new(
                    format!("{kind}{}", suffix(vectorization)),
                    vectorization,
                    kind.build(estimator, network),
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(mode: Mode, backend: Backend) -> Vec<String> {
        model_list(
            mode,
            backend,
            &EstimatorParams::default(),
            &NetworkParams::default(),
        )
        .into_iter()
        .map(|e| e.name)
        .collect()
    }

    #[test]
    fn tfidf_estimators() {
        assert_eq!(
            names(Mode::Tfidf, Backend::Estimator),
            vec!["bnb", "mnb", "linear_svm", "logreg"]
        );
    }

    #[test]
    fn word2vec_covers_both_poolings() {
        let list = names(Mode::Word2Vec, Backend::Estimator);
        assert_eq!(list.len(), 6);
        assert!(list.contains(&"bnb_mean_embedding".to_string()));
        assert!(list.contains(&"logreg_tfidf_embedding".to_string()));
        assert!(!list.iter().any(|n| n.starts_with("mnb")));

        assert_eq!(
            names(Mode::Word2Vec, Backend::Network),
            vec!["mlp_mean_embedding", "mlp_tfidf_embedding"]
        );
    }

    #[test]
    fn doc2vec_uses_document_vectors() {
        let entries = model_list(
            Mode::Doc2Vec,
            Backend::Network,
            &EstimatorParams::default(),
            &NetworkParams::default(),
        );
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].vectorization, Vectorization::DocumentEmbedding);
        assert_eq!(entries[0].model.kind(), ClassifierKind::Mlp);
    }

    #[test]
    fn mismatched_mode_is_unsupported() {
        assert!(check_combination(Mode::Tfidf, Vectorization::Tfidf).is_ok());
        assert!(matches!(
            check_combination(Mode::Doc2Vec, Vectorization::MeanEmbedding),
            Err(NassaiError::UnsupportedCombination(_))
        ));
    }
}
