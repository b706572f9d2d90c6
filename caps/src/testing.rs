//! In-memory capability sources.

use std::cell::RefCell;

use vulkanalia::prelude::v1_0::*;

use crate::catalogue::{DeviceCatalogue, InstanceCatalogue};
use crate::device::FeatureBlockDecl;
use crate::source::{DeviceCapabilitySource, EnumerationError, InstanceCapabilitySource};

pub static TEST_INSTANCE: InstanceCatalogue = InstanceCatalogue {
    extensions: &[
        vk::ExtensionName::from_bytes(b"VK_EXT_a"),
        vk::ExtensionName::from_bytes(b"VK_EXT_b"),
    ],
    layers: &[
        vk::ExtensionName::from_bytes(b"VK_LAYER_a"),
        vk::ExtensionName::from_bytes(b"VK_LAYER_b"),
    ],
};

pub static TEST_DEVICE: DeviceCatalogue = DeviceCatalogue {
    extensions: &[
        vk::ExtensionName::from_bytes(b"VK_EXT_a"),
        vk::ExtensionName::from_bytes(b"VK_EXT_b"),
        vk::ExtensionName::from_bytes(b"VK_EXT_c"),
    ],
    feature_blocks: &[
        FeatureBlockDecl::of::<vk::PhysicalDevice16BitStorageFeatures>(
            "PhysicalDevice16BitStorageFeatures",
        ),
        FeatureBlockDecl::of::<vk::PhysicalDeviceShaderFloat16Int8Features>(
            "PhysicalDeviceShaderFloat16Int8Features",
        ),
        FeatureBlockDecl::of::<vk::PhysicalDeviceScalarBlockLayoutFeatures>(
            "PhysicalDeviceScalarBlockLayoutFeatures",
        ),
    ],
};

fn to_names(names: &[&str]) -> Vec<vk::ExtensionName> {
    names
        .iter()
        .map(|name| vk::ExtensionName::from_bytes(name.as_bytes()))
        .collect()
}

pub struct FakeInstance {
    pub extensions: Result<Vec<vk::ExtensionName>, vk::ErrorCode>,
    pub layers: Result<Vec<vk::ExtensionName>, vk::ErrorCode>,
}

impl FakeInstance {
    pub fn new(extensions: &[&str], layers: &[&str]) -> Self {
        Self {
            extensions: Ok(to_names(extensions)),
            layers: Ok(to_names(layers)),
        }
    }
}

impl InstanceCapabilitySource for FakeInstance {
    fn instance_extensions(&self) -> Result<Vec<vk::ExtensionName>, EnumerationError> {
        self.extensions
            .clone()
            .map_err(EnumerationError::InstanceExtensions)
    }

    fn instance_layers(&self) -> Result<Vec<vk::ExtensionName>, EnumerationError> {
        self.layers.clone().map_err(EnumerationError::InstanceLayers)
    }
}

/// A device which walks the feature chain like a driver would.
///
/// Every 16-bit storage and float16 bit is reported as supported, unless
/// `float16` is cleared.
pub struct FakeDevice {
    pub extensions: Result<Vec<vk::ExtensionName>, vk::ErrorCode>,
    pub float16: bool,
    queried: RefCell<Vec<vk::StructureType>>,
}

impl FakeDevice {
    pub fn with_extensions(extensions: &[&str]) -> Self {
        Self {
            extensions: Ok(to_names(extensions)),
            float16: true,
            queried: RefCell::default(),
        }
    }

    pub fn failing(error: vk::ErrorCode) -> Self {
        Self {
            extensions: Err(error),
            float16: true,
            queried: RefCell::default(),
        }
    }

    /// Structure types visited by the last feature query.
    pub fn queried(&self) -> Vec<vk::StructureType> {
        self.queried.borrow().clone()
    }
}

impl DeviceCapabilitySource for FakeDevice {
    fn device_extensions(
        &self,
        _physical_device: vk::PhysicalDevice,
    ) -> Result<Vec<vk::ExtensionName>, EnumerationError> {
        self.extensions
            .clone()
            .map_err(EnumerationError::DeviceExtensions)
    }

    unsafe fn physical_device_features2(
        &self,
        _physical_device: vk::PhysicalDevice,
        features: &mut vk::PhysicalDeviceFeatures2,
    ) {
        features.features.shader_int64 = vk::TRUE;

        let mut queried = self.queried.borrow_mut();
        queried.clear();

        let mut next = features.next.cast::<vk::BaseOutStructure>();
        while !next.is_null() {
            let s_type = (*next).s_type;
            if s_type == vk::StructureType::PHYSICAL_DEVICE_16BIT_STORAGE_FEATURES {
                let data = &mut *next.cast::<vk::PhysicalDevice16BitStorageFeatures>();
                data.storage_buffer_16bit_access = vk::TRUE;
            } else if s_type == vk::StructureType::PHYSICAL_DEVICE_SHADER_FLOAT16_INT8_FEATURES {
                let data = &mut *next.cast::<vk::PhysicalDeviceShaderFloat16Int8Features>();
                data.shader_float16 = if self.float16 { vk::TRUE } else { vk::FALSE };
                data.shader_int8 = vk::TRUE;
            }

            queried.push(s_type);
            next = (*next).next;
        }
    }
}
