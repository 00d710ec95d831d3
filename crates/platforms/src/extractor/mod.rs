pub mod factory;
pub mod platform_extractor;
pub mod platforms;
pub mod utils;

pub use factory::ExtractorRegistry;
pub use platform_extractor::PlatformLinkExtractor;
