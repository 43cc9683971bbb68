pub mod classifier_trait;
pub mod decision_tree;

pub use classifier_trait::ClassifierModel;
pub use decision_tree::{DecisionTreeClassifier, TreeNode};
