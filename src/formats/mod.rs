// File format handlers
pub mod img;
pub mod metadata;

pub use img::{load_img, open_img, resolve_model, save_codec, save_img, ImgError};
pub use metadata::Metadata;
