//! Track library: the `Track` model, folder scanning and the track loader
//! that turns a `Track` into a decodable source.

mod loader;
mod model;
mod scan;

pub use loader::*;
pub use model::*;
pub use scan::*;
