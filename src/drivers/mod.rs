// Channel codec framework
pub mod bank;
pub mod checksum;
pub mod codec;
pub mod descriptor;
pub mod registry;
pub mod tables;
pub mod traits;

// Models
pub mod ict70;
pub mod vx3;

pub use codec::ChannelCodec;
pub use descriptor::ModelDescriptor;
pub use ict70::ICT70;
pub use registry::{detect_model, get_model, list_models, ModelInfo};
pub use traits::{Radio, RadioError, RadioResult};
pub use vx3::VX3;

/// Open an image with the codec for `descriptor`
pub fn open(descriptor: &'static ModelDescriptor, data: Vec<u8>) -> RadioResult<ChannelCodec> {
    ChannelCodec::new(descriptor, data.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open() {
        let codec = open(&ICT70, vec![0xFF; ICT70.memsize]).unwrap();
        assert_eq!(codec.get_name(), "Icom IC-T70");
        assert!(codec.get_memories().unwrap().is_empty());

        assert!(matches!(
            open(&VX3, vec![0; 10]),
            Err(RadioError::ImageSize { expected: 32587, actual: 10 })
        ));
    }
}
