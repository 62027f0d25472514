mod metadata;
mod scorer;

pub use scorer::ClassifierScorer;
