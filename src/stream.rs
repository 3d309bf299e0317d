pub mod classifier;
pub mod context;
pub mod rewriter;
pub mod rules;

pub use classifier::{LineClassifier, LineType};
pub use context::RewriteContext;
pub use rewriter::ManifestRewriter;
