//! Picture domain module.

mod model;
mod repository;

pub use model::{Picture, PictureType};
pub use repository::PictureRepository;
