pub mod gemini;
pub mod profile;

pub use gemini::GeminiGenerator;
pub use profile::SwedishProfile;
