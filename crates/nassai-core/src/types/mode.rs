use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::NassaiError;

/// Embedding mode a batch of runs is grouped under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Tfidf,
    Word2Vec,
    Doc2Vec,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Tfidf, Mode::Word2Vec, Mode::Doc2Vec];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tfidf => "tfidf",
            Self::Word2Vec => "word2vec",
            Self::Doc2Vec => "doc2vec",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = NassaiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tfidf" => Ok(Self::Tfidf),
            "word2vec" => Ok(Self::Word2Vec),
            "doc2vec" => Ok(Self::Doc2Vec),
            other => Err(NassaiError::UnsupportedCombination(format!(
                "unknown mode {other:?}"
            ))),
        }
    }
}

/// Which classifier family a batch trains. Recorded as the `using` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Classical estimators (naive Bayes, linear models).
    Estimator,
    /// Neural networks.
    Network,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Estimator => "estimator",
            Self::Network => "network",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = NassaiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "estimator" | "sklearn" => Ok(Self::Estimator),
            "network" | "neural" | "keras" => Ok(Self::Network),
            other => Err(NassaiError::UnsupportedCombination(format!(
                "unknown backend {other:?}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_round_trips_through_str() {
        for mode in Mode::ALL {
            assert_eq!(mode.as_str().parse::<Mode>().unwrap(), mode);
        }
        assert!("glove".parse::<Mode>().is_err());
    }

    #[test]
    fn backend_accepts_legacy_names() {
        assert_eq!("sklearn".parse::<Backend>().unwrap(), Backend::Estimator);
        assert_eq!("keras".parse::<Backend>().unwrap(), Backend::Network);
        assert_eq!(Backend::Network.to_string(), "network");
    }
}
