//! Text-to-prediction building blocks shared by training and serving.

pub mod classifier;
pub mod context;
pub mod features;

pub use classifier::{Capability, Classifier, ClassifierKind, ClassifierParams};
pub use context::{clean_text, encode_context, FeedbackRecord};
pub use features::{DocFrequency, NgramRange, TfidfConfig, TfidfVectorizer};
