pub mod builder;
pub mod model;

pub use builder::ImageBuilder;
pub use model::{
    ImageData, ImageGenerationRequest, ImageGenerationResponse, ImageSize, ResponseFormat,
};
