mod artifact;
mod forest;
mod loader;
mod species;
mod tree;

pub use artifact::{ModelArtifact, Prediction};
pub use forest::{ForestParams, RandomForest, argmax};
pub use loader::ModelLoader;
pub use species::Species;
pub use tree::{DecisionTree, Node, TreeParams};
