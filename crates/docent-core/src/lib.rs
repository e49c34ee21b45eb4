pub mod config;
pub mod conversation;
pub mod document;
pub mod error;
pub mod pipeline;
pub mod roles;

// Re-export common error type
pub use error::{DocentError, Result};

pub use config::{AssignmentConfig, ConfigRoot, SegmenterConfig};
pub use conversation::{ConversationStateMachine, SessionStore};
pub use document::{Embedder, HashingEmbedder, HeadingDetector, SemanticSegmenter, SemanticUnit};
pub use pipeline::{DocumentProcessor, ScriptBuilder, TeachingScript};
pub use roles::{PedagogicalRole, RoleAssigner, RoleLibrary};
