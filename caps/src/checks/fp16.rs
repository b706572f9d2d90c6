use vulkanalia::prelude::v1_0::*;

use crate::device::{DeviceCapabilityManager, FeatureStructType};

type Storage16 = vk::PhysicalDevice16BitStorageFeatures;
type Float16Int8 = vk::PhysicalDeviceShaderFloat16Int8Features;

const REQUIRED_EXTENSIONS: [vk::Extension; 2] = [
    vk::KHR_16BIT_STORAGE_EXTENSION,
    vk::KHR_SHADER_FLOAT16_INT8_EXTENSION,
];

/// Requests 16-bit storage and float16 arithmetic.
///
/// Enables both feature blocks if the device supports the extensions and
/// reports `storage_buffer_16bit_access` and `shader_float16`. Extensions
/// which were found stay enabled even if the check fails.
#[track_caller]
pub fn check_extensions(caps: &mut DeviceCapabilityManager) -> bool {
    let mut supported = true;
    for extension in &REQUIRED_EXTENSIONS {
        if !caps.add_extension(extension) {
            tracing::info!(extension = %extension.name, "fp16 disabled, missing extension");
            supported = false;
        }
    }

    if !supported {
        return false;
    }

    let storage = caps.feature_block::<Storage16>().storage_buffer_16bit_access == vk::TRUE;
    let float16 = caps.feature_block::<Float16Int8>().shader_float16 == vk::TRUE;
    if !(storage && float16) {
        tracing::info!(storage, float16, "fp16 disabled, missing device features");
        return false;
    }

    caps.enable_feature_block(Storage16::STRUCTURE_TYPE, true);
    caps.enable_feature_block(Float16Int8::STRUCTURE_TYPE, true);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeDevice;
    use vulkanalia::vk::Handle as _;

    fn make_manager(device: &FakeDevice) -> DeviceCapabilityManager {
        let mut manager = DeviceCapabilityManager::new();
        manager
            .initialize(device, vk::PhysicalDevice::from_raw(1))
            .unwrap();
        manager
    }

    #[test]
    fn enables_blocks_when_supported() {
        let device =
            FakeDevice::with_extensions(&["VK_KHR_16bit_storage", "VK_KHR_shader_float16_int8"]);
        let mut manager = make_manager(&device);

        assert!(check_extensions(&mut manager));
        assert!(manager.is_extension_enabled(&vk::KHR_16BIT_STORAGE_EXTENSION));
        assert!(manager.is_extension_enabled(&vk::KHR_SHADER_FLOAT16_INT8_EXTENSION));

        manager.prepare_creation();
        assert_eq!(
            manager.chain().collect::<Vec<_>>(),
            [Float16Int8::STRUCTURE_TYPE, Storage16::STRUCTURE_TYPE]
        );
    }

    #[test]
    fn missing_extension_disables_fp16() {
        let device = FakeDevice::with_extensions(&["VK_KHR_16bit_storage"]);
        let mut manager = make_manager(&device);

        assert!(!check_extensions(&mut manager));
        assert!(manager.is_extension_enabled(&vk::KHR_16BIT_STORAGE_EXTENSION));
        assert!(!manager.is_feature_block_enabled(Storage16::STRUCTURE_TYPE));
        assert!(!manager.is_feature_block_enabled(Float16Int8::STRUCTURE_TYPE));
    }

    #[test]
    fn missing_feature_bit_disables_fp16() {
        let mut device =
            FakeDevice::with_extensions(&["VK_KHR_16bit_storage", "VK_KHR_shader_float16_int8"]);
        device.float16 = false;
        let mut manager = make_manager(&device);

        assert!(!check_extensions(&mut manager));
        manager.prepare_creation();
        assert_eq!(manager.chain().count(), 0);
        assert!(manager.features_chain().is_none());
    }
}
