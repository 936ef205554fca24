pub mod analysis;
pub mod capability;
pub mod context;
pub mod errors;
pub mod llm;
pub mod model;
pub mod speech;
pub mod transformer;
pub mod workbench;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use errors::{CapabilityError, SpeechError, TransformError};
pub use model::{
    Formality, Importance, Improvements, Situation, TransformOptions, TransformRequest,
    TransformResponse,
};
pub use transformer::ToneTransformer;
pub use workbench::{RenderState, ToneWorkbench};
