//! Page Components

mod about;
mod home;
mod predict;

pub use about::AboutPage;
pub use home::HomePage;
pub use predict::PredictPage;
