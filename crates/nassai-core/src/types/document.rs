use serde::{Deserialize, Serialize};

/// A raw document as read from the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub text: String,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Whitespace tokenization. Cleaning happens before documents reach this crate.
    pub fn tokens(&self) -> Vec<String> {
        self.text.split_whitespace().map(str::to_string).collect()
    }
}

impl From<&str> for Document {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Document {
    fn from(text: String) -> Self {
        Self { text }
    }
}

/// Which side of the corpus a tagged document belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Split {
    Train,
    Test,
}

impl Split {
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Train => "train",
            Self::Test => "test",
        }
    }

    /// Tag for the document at `index`. Same index always yields the same tag.
    pub fn tag(&self, index: usize) -> String {
        format!("{}_{}", self.prefix(), index)
    }
}

/// A token sequence addressable by a unique tag (`train_0`, `test_12`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedDocument {
    pub tokens: Vec<String>,
    pub tag: String,
}

/// Tag every document with `{split}_{index}` in input order.
pub fn tag_documents(docs: &[Document], split: Split) -> Vec<TaggedDocument> {
    docs.iter()
        .enumerate()
        .map(|(index, doc)| TaggedDocument {
            tokens: doc.tokens(),
            tag: split.tag(index),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_split_on_any_whitespace() {
        let doc = Document::new("  the quick\tbrown\nfox ");
        assert_eq!(doc.tokens(), vec!["the", "quick", "brown", "fox"]);
        assert!(Document::new("   ").tokens().is_empty());
    }

    #[test]
    fn tags_follow_index_order() {
        let docs: Vec<Document> = vec!["a b".into(), "c".into(), "d e f".into()];
        let tagged = tag_documents(&docs, Split::Train);
        let tags: Vec<&str> = tagged.iter().map(|t| t.tag.as_str()).collect();
        assert_eq!(tags, vec!["train_0", "train_1", "train_2"]);
        assert_eq!(tagged[2].tokens, vec!["d", "e", "f"]);

        let again = tag_documents(&docs, Split::Train);
        assert_eq!(tagged, again);
    }

    #[test]
    fn test_split_prefix() {
        assert_eq!(Split::Test.tag(4), "test_4");
    }
}
