//! Document analysis.
//!
//! ## Module Structure
//!
//! - `heading` - Heading and section domain types
//! - `detector` - Structural heading detection and section splitting
//! - `embedding` - Embedding abstraction and vector math
//! - `segmenter` - Similarity-based semantic segmentation

pub mod detector;
pub mod embedding;
pub mod heading;
pub mod segmenter;

pub use detector::HeadingDetector;
pub use embedding::{Embedder, HashingEmbedder, centroid, cosine_similarity};
pub use heading::{Heading, Section, SectionType};
pub use segmenter::{SemanticSegmenter, SemanticUnit};
