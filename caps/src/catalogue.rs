//! The capabilities the application may ask for.
//!
//! Anything not listed here can't be queried or enabled through the
//! managers: asking for it is a contract violation.

use vulkanalia::prelude::v1_0::*;

use crate::device::FeatureBlockDecl;

/// Declared instance-level capabilities.
#[derive(Debug, Clone, Copy)]
pub struct InstanceCatalogue {
    pub extensions: &'static [vk::ExtensionName],
    pub layers: &'static [vk::ExtensionName],
}

/// Declared device-level capabilities.
#[derive(Debug, Clone, Copy)]
pub struct DeviceCatalogue {
    pub extensions: &'static [vk::ExtensionName],
    pub feature_blocks: &'static [FeatureBlockDecl],
}

pub static INSTANCE: InstanceCatalogue = InstanceCatalogue {
    extensions: INSTANCE_EXTENSIONS,
    layers: INSTANCE_LAYERS,
};

pub static DEVICE: DeviceCatalogue = DeviceCatalogue {
    extensions: DEVICE_EXTENSIONS,
    feature_blocks: DEVICE_FEATURE_BLOCKS,
};

pub const VALIDATION_LAYER: vk::ExtensionName =
    vk::ExtensionName::from_bytes(b"VK_LAYER_KHRONOS_validation");
pub const ALT_VALIDATION_LAYER: vk::ExtensionName =
    vk::ExtensionName::from_bytes(b"VK_LAYER_LUNARG_standard_validation");

pub const INSTANCE_EXTENSIONS: &[vk::ExtensionName] = &[
    vk::KHR_GET_PHYSICAL_DEVICE_PROPERTIES2_EXTENSION.name,
    vk::KHR_SURFACE_EXTENSION.name,
    vk::KHR_WIN32_SURFACE_EXTENSION.name,
    vk::KHR_XLIB_SURFACE_EXTENSION.name,
    vk::KHR_XCB_SURFACE_EXTENSION.name,
    vk::KHR_WAYLAND_SURFACE_EXTENSION.name,
    vk::EXT_DEBUG_UTILS_EXTENSION.name,
    vk::EXT_VALIDATION_FEATURES_EXTENSION.name,
];

pub const INSTANCE_LAYERS: &[vk::ExtensionName] = &[VALIDATION_LAYER, ALT_VALIDATION_LAYER];

pub const DEVICE_EXTENSIONS: &[vk::ExtensionName] = &[
    vk::KHR_SWAPCHAIN_EXTENSION.name,
    vk::KHR_MAINTENANCE1_EXTENSION.name,
    vk::KHR_16BIT_STORAGE_EXTENSION.name,
    vk::KHR_SHADER_FLOAT16_INT8_EXTENSION.name,
    vk::EXT_DESCRIPTOR_INDEXING_EXTENSION.name,
    vk::KHR_BUFFER_DEVICE_ADDRESS_EXTENSION.name,
    vk::EXT_SCALAR_BLOCK_LAYOUT_EXTENSION.name,
    vk::EXT_SAMPLER_FILTER_MINMAX_EXTENSION.name,
    vk::GOOGLE_DISPLAY_TIMING_EXTENSION.name,
];

macro_rules! declare_feature_blocks {
    ($vis:vis const $table:ident = [$($ty:ident => $sty:ident),*$(,)?];) => {
        crate::impl_feature_struct!($(vk::$ty => $sty),*);

        $vis const $table: &[FeatureBlockDecl] = &[
            $(FeatureBlockDecl::of::<vk::$ty>(stringify!($ty))),*
        ];
    };
}

declare_feature_blocks! {
    pub const DEVICE_FEATURE_BLOCKS = [
        PhysicalDevice16BitStorageFeatures => PHYSICAL_DEVICE_16BIT_STORAGE_FEATURES,
        PhysicalDeviceShaderFloat16Int8Features => PHYSICAL_DEVICE_SHADER_FLOAT16_INT8_FEATURES,
        PhysicalDeviceDescriptorIndexingFeatures => PHYSICAL_DEVICE_DESCRIPTOR_INDEXING_FEATURES,
        PhysicalDeviceBufferDeviceAddressFeatures => PHYSICAL_DEVICE_BUFFER_DEVICE_ADDRESS_FEATURES,
        PhysicalDeviceScalarBlockLayoutFeatures => PHYSICAL_DEVICE_SCALAR_BLOCK_LAYOUT_FEATURES,
    ];
}
