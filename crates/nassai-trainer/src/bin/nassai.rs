//! nassai command-line interface.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use nassai_core::{
    load_document_vectors, load_word_vectors, Backend, Document, DocumentEmbeddings,
    EmbeddingTable, FeatureSources, Mode, SplitConfig, Vectorization,
};
use nassai_trainer::{
    model_list, ArtifactConfig, ArtifactStore, EstimatorParams, ModelRef, NetworkParams,
    ResultsLog, RunDriver, TrainOptions,
};
use tracing::info;

#[derive(Parser)]
#[command(name = "nassai")]
#[command(about = "Train and compare text classifiers over TF-IDF, word and document embeddings")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding trained models
    #[arg(long, global = true, env = "NASSAI_MODELS", default_value = "models")]
    models: PathBuf,

    /// Word vectors in word2vec text format
    #[arg(
        long,
        global = true,
        env = "NASSAI_WORD_VECTORS",
        default_value = "models/word2vec/nassai_cbow_word2vec.vec"
    )]
    word_vectors: PathBuf,

    /// Document vectors in word2vec text format, keyed by `train_{i}`
    #[arg(
        long,
        global = true,
        env = "NASSAI_DOC_VECTORS",
        default_value = "models/doc2vec/nassai_dbow_doc2vec.vec"
    )]
    doc_vectors: PathBuf,

    /// Expected dimensionality of word and document vectors
    #[arg(long, global = true, env = "NASSAI_VECTOR_SIZE", default_value_t = 300)]
    vector_size: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Train every model of a mode and append the scores to the results log
    Train(TrainArgs),
    /// Classify one string with a saved model
    Predict(PredictArgs),
}

#[derive(Args)]
struct TrainArgs {
    /// Feature mode: tfidf, word2vec or doc2vec
    #[arg(long, value_parser = parse_mode)]
    mode: Mode,

    /// Model family: estimator (sklearn) or network (keras)
    #[arg(long, value_parser = parse_backend)]
    using: Backend,

    /// Cleaned dataset with `text` and `label` columns
    #[arg(long, env = "NASSAI_DATA", default_value = "data/clean_data.csv")]
    data: PathBuf,

    /// Results log
    #[arg(long, env = "NASSAI_RESULTS", default_value = "data/results.csv")]
    results: PathBuf,

    /// Mini-batch size for networks
    #[arg(long, default_value_t = 200)]
    batch: usize,

    /// Training epochs for networks
    #[arg(long, default_value_t = 200)]
    epoch: usize,

    /// Hidden layers for networks
    #[arg(long, default_value_t = 4)]
    layers: usize,

    /// Dropout rate for networks
    #[arg(long, default_value_t = 0.25)]
    dropout: f32,

    /// Seed for the data split and training order
    #[arg(long, env = "NASSAI_SEED", default_value_t = 42)]
    seed: u64,
}

#[derive(Args)]
struct PredictArgs {
    /// Feature mode the model was trained under
    #[arg(long, value_parser = parse_mode)]
    mode: Mode,

    /// Saved model name, e.g. `mnb` or `logreg_mean_embedding`
    #[arg(long, value_parser = parse_model_ref)]
    classifier: ModelRef,

    /// Text to classify
    #[arg(long)]
    text: String,
}

fn parse_mode(s: &str) -> Result<Mode, String> {
    s.parse().map_err(|e: nassai_core::NassaiError| e.to_string())
}

fn parse_backend(s: &str) -> Result<Backend, String> {
    s.parse().map_err(|e: nassai_core::NassaiError| e.to_string())
}

fn parse_model_ref(s: &str) -> Result<ModelRef, String> {
    s.parse().map_err(|e: nassai_core::NassaiError| e.to_string())
}

/// Embedding sources a mode needs, loaded once.
#[derive(Default)]
struct Sources {
    words: Option<EmbeddingTable>,
    documents: Option<DocumentEmbeddings>,
}

impl Sources {
    fn load(cli: &Cli, needs_words: bool, needs_documents: bool) -> Result<Self> {
        let mut sources = Self::default();
        if needs_words {
            let table = load_word_vectors(&cli.word_vectors).with_context(|| {
                format!("failed to load word vectors from {}", cli.word_vectors.display())
            })?;
            table.ensure_dim(cli.vector_size)?;
            sources.words = Some(table);
        }
        if needs_documents {
            let vectors = load_document_vectors(&cli.doc_vectors).with_context(|| {
                format!("failed to load document vectors from {}", cli.doc_vectors.display())
            })?;
            vectors.ensure_dim(cli.vector_size)?;
            sources.documents = Some(vectors);
        }
        Ok(sources)
    }

    fn borrow(&self) -> FeatureSources<'_> {
        FeatureSources {
            word_vectors: self.words.as_ref(),
            document_vectors: self.documents.as_ref(),
        }
    }
}

fn run_train(cli: &Cli, args: &TrainArgs) -> Result<()> {
    let sources = Sources::load(
        cli,
        args.mode == Mode::Word2Vec,
        args.mode == Mode::Doc2Vec,
    )?;

    let estimator = EstimatorParams::default().with_seed(args.seed);
    let network = NetworkParams::default()
        .with_batch(args.batch)
        .with_epochs(args.epoch)
        .with_layers(args.layers)
        .with_dropout(args.dropout)
        .with_seed(args.seed);
    let entries = model_list(args.mode, args.using, &estimator, &network);

    let options = TrainOptions::new(args.mode, Vectorization::Tfidf)
        .with_vector_size(cli.vector_size)
        .with_split(SplitConfig::default().with_seed(args.seed))
        .with_artifacts(ArtifactConfig::new(&cli.models));

    let driver = RunDriver::new(&args.data, options, ResultsLog::new(&args.results))
        .with_sources(sources.borrow())
        .with_using(args.using);

    info!(mode = %args.mode, using = %args.using, "training");
    let records = driver
        .run(entries, args.mode)
        .with_context(|| format!("training batch for {} failed", args.mode))?;

    for record in &records {
        println!(
            "{:<28} f1={:.4} took {:.2}s",
            record.model_name, record.f1, record.duration
        );
    }
    println!("Results appended to {}", args.results.display());
    Ok(())
}

fn run_predict(cli: &Cli, args: &PredictArgs) -> Result<()> {
    let store = ArtifactStore::new(ArtifactConfig::new(&cli.models));
    let loaded = store
        .resolve(args.mode, &args.classifier)
        .with_context(|| format!("failed to load {:?} for {}", args.classifier, args.mode))?;

    let pipeline = &loaded.manifest.pipeline;
    if pipeline.vectorization() == Vectorization::DocumentEmbedding {
        bail!("models trained on document vectors cannot classify new text");
    }
    let sources = Sources::load(cli, pipeline.vectorization().needs_word_vectors(), false)?;

    let tokens = vec![Document::new(args.text.as_str()).tokens()];
    let features = pipeline.transform(&tokens, &sources.borrow())?;
    let predicted = loaded.classifier.predict(&features)?;
    let labels = loaded.manifest.encoder().inverse_transform(&predicted)?;

    println!("TEXT : {}", args.text);
    println!();
    println!("PREDICTION: {}", labels.join(", "));
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("nassai=info")),
        )
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Commands::Train(args) => run_train(&cli, args),
        Commands::Predict(args) => run_predict(&cli, args),
    }
}
