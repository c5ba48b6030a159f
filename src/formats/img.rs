// .img container: raw image, magic, base64 JSON metadata
// Reference: chirp/chirp_common.py CloneModeRadio.load_mmap / save_mmap

use super::metadata::Metadata;
use crate::drivers::{detect_model, ChannelCodec, ModelDescriptor, RadioError};
use crate::memmap::MemoryMap;
use nom::bytes::complete::{tag, take_until};
use nom::{IResult, Parser};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ImgError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse metadata JSON: {0}")]
    MetadataJson(#[from] serde_json::Error),

    #[error("Unknown radio: {vendor} {model}")]
    UnknownModel { vendor: String, model: String },

    #[error("Cannot detect the radio model of a {0} byte image")]
    Undetected(usize),

    #[error(transparent)]
    Radio(#[from] RadioError),
}

pub type Result<T> = std::result::Result<T, ImgError>;

/// Separator between the image bytes and the metadata block
pub const MAGIC: &[u8] = b"\x00\xffchirp\xeeimg\x00\x01";

/// Split file contents into image bytes and the metadata block after MAGIC
fn split_container(input: &[u8]) -> IResult<&[u8], &[u8]> {
    let until: IResult<&[u8], &[u8]> = take_until(MAGIC).parse(input);
    let (rest, image) = until?;
    let magic: IResult<&[u8], &[u8]> = tag(MAGIC).parse(rest);
    let (metadata, _) = magic?;
    Ok((metadata, image))
}

/// Load an .img file. Files without the magic are taken as a bare image.
pub fn load_img(path: impl AsRef<Path>) -> Result<(MemoryMap, Metadata)> {
    let path = path.as_ref();
    let data = fs::read(path)?;

    let (image, metadata) = match split_container(&data) {
        Ok((block, image)) => match Metadata::from_base64(block) {
            Some(parsed) => (image.to_vec(), parsed?),
            None => {
                warn!("{}: metadata is not base64, ignoring it", path.display());
                (image.to_vec(), Metadata::default())
            }
        },
        Err(_) => {
            debug!("{}: no metadata", path.display());
            (data, Metadata::default())
        }
    };

    info!(
        "Loaded {} bytes from {} ({} {})",
        image.len(),
        path.display(),
        metadata.vendor,
        metadata.model
    );
    Ok((MemoryMap::from(image), metadata))
}

/// Write image bytes, MAGIC and the metadata block
pub fn save_img(path: impl AsRef<Path>, mmap: &MemoryMap, metadata: &Metadata) -> Result<()> {
    let path = path.as_ref();
    let encoded = metadata.to_base64()?;

    let mut out = Vec::with_capacity(mmap.len() + MAGIC.len() + encoded.len());
    out.extend_from_slice(mmap.get_packed());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(encoded.as_bytes());
    fs::write(path, out)?;

    info!("Saved {} bytes to {}", mmap.len(), path.display());
    Ok(())
}

/// Resolve the model of a loaded image: metadata first, then detection
pub fn resolve_model(mmap: &MemoryMap, metadata: &Metadata) -> Result<&'static ModelDescriptor> {
    if !metadata.vendor.is_empty() {
        return metadata.descriptor().ok_or_else(|| ImgError::UnknownModel {
            vendor: metadata.vendor.clone(),
            model: metadata.model.clone(),
        });
    }
    detect_model(mmap.get_packed()).ok_or(ImgError::Undetected(mmap.len()))
}

/// Load an .img file straight into a codec for its radio
pub fn open_img(path: impl AsRef<Path>) -> Result<(ChannelCodec, Metadata)> {
    let (mmap, metadata) = load_img(path)?;
    let descriptor = resolve_model(&mmap, &metadata)?;
    Ok((ChannelCodec::new(descriptor, mmap)?, metadata))
}

/// Save a codec's image with a fresh checksum and metadata naming its radio.
///
/// Keys in `previous` that this crate doesn't know are carried over.
pub fn save_codec(
    path: impl AsRef<Path>,
    codec: ChannelCodec,
    previous: Option<&Metadata>,
) -> Result<()> {
    let mut metadata = Metadata::for_model(codec.descriptor());
    if let Some(prev) = previous {
        metadata.extra = prev.extra.clone();
        metadata.variant = prev.variant.clone();
    }
    let mmap = codec.into_image()?;
    save_img(path, &mmap, &metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::{Radio, ICT70, VX3};
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_split_container() {
        let data = b"hello\x00\xffchirp\xeeimg\x00\x01world";
        let (meta, image) = split_container(data).unwrap();
        assert_eq!(image, b"hello");
        assert_eq!(meta, b"world");

        assert!(split_container(b"no magic here").is_err());
    }

    #[test]
    fn test_save_load_img() -> Result<()> {
        let file = NamedTempFile::new()?;
        let mmap = MemoryMap::new(vec![1, 2, 3, 4, 5, 6, 7, 8]);
        let metadata = Metadata::for_model(&ICT70);

        save_img(file.path(), &mmap, &metadata)?;
        let (loaded, loaded_meta) = load_img(file.path())?;

        assert_eq!(loaded, mmap);
        assert_eq!(loaded_meta, metadata);
        Ok(())
    }

    #[test]
    fn test_load_bare_image() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(&[1, 2, 3, 4, 5])?;

        let (mmap, metadata) = load_img(file.path())?;
        assert_eq!(mmap.get_packed(), &[1, 2, 3, 4, 5]);
        assert_eq!(metadata, Metadata::default());
        Ok(())
    }

    #[test]
    fn test_load_desktop_file() -> Result<()> {
        // Written by the desktop application, with keys we don't model
        let mut file = NamedTempFile::new()?;
        file.write_all(&[0xAA, 0xBB, 0xCC, 0xDD])?;
        file.write_all(MAGIC)?;
        let json = r#"{"rclass":"VX3Radio","vendor":"Yaesu","model":"VX-3","variant":"","chirp_version":"py3dev","mem_extra":{}}"#;
        file.write_all(STANDARD.encode(json).as_bytes())?;
        file.flush()?;

        let (mmap, metadata) = load_img(file.path())?;
        assert_eq!(mmap.get_packed(), &[0xAA, 0xBB, 0xCC, 0xDD]);
        assert_eq!(metadata.model, "VX-3");
        assert_eq!(metadata.chirp_version, "py3dev");
        assert!(metadata.extra.contains_key("mem_extra"));
        Ok(())
    }

    #[test]
    fn test_resolve_model() {
        let ict70 = MemoryMap::filled(ICT70.memsize, 0xFF);
        assert_eq!(
            resolve_model(&ict70, &Metadata::default()).unwrap().model,
            "IC-T70"
        );

        // Metadata wins over the image contents
        let meta = Metadata::for_model(&VX3);
        assert_eq!(resolve_model(&ict70, &meta).unwrap().model, "VX-3");

        let unknown = Metadata {
            vendor: "Baofeng".to_string(),
            model: "UV-5R".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            resolve_model(&ict70, &unknown),
            Err(ImgError::UnknownModel { .. })
        ));
        assert!(matches!(
            resolve_model(&MemoryMap::filled(10, 0), &Metadata::default()),
            Err(ImgError::Undetected(10))
        ));
    }

    #[test]
    fn test_codec_round_trip() -> Result<()> {
        let file = NamedTempFile::new()?;
        let mut image = MemoryMap::filled(VX3.memsize, 0);
        image.set_bytes(0, b"AH028").map_err(RadioError::from)?;
        let mut codec = ChannelCodec::new(&VX3, image)?;

        let mut mem = crate::core::Memory::new(12);
        mem.freq = 433_500_000;
        mem.name = "UHF".to_string();
        codec.set_memory(&mem)?;

        let mut previous = Metadata::default();
        previous.extra.insert("note".to_string(), serde_json::json!(1));
        save_codec(file.path(), codec, Some(&previous))?;

        let (codec, metadata) = open_img(file.path())?;
        assert_eq!(metadata.rclass, "VX3Radio");
        assert_eq!(metadata.extra.get("note"), Some(&serde_json::json!(1)));
        assert_eq!(codec.get_memory(12)?, mem);

        let (stored, computed) = codec.verify_checksum()?.unwrap();
        assert_eq!(stored, computed);
        Ok(())
    }
}
