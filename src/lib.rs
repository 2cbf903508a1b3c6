//! Sentiment classification of school feedback.
//!
//! Training ([`training`]) and serving ([`service`]) share the same context
//! encoder and TF-IDF vectorizer ([`nlp`]), so a text is featurised identically
//! in both; the fitted pair travels between them as a [`artifact::ModelArtifact`].

pub mod api;
pub mod artifact;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod nlp;
pub mod service;
pub mod training;

pub use error::{Error, Result};
