use vulkanalia::prelude::v1_0::*;
use vulkanalia::vk::InstanceV1_1;

/// Runtime query for instance-level capabilities.
pub trait InstanceCapabilitySource {
    fn instance_extensions(&self) -> Result<Vec<vk::ExtensionName>, EnumerationError>;

    fn instance_layers(&self) -> Result<Vec<vk::ExtensionName>, EnumerationError>;
}

/// Runtime query for capabilities of a single physical device.
pub trait DeviceCapabilitySource {
    fn device_extensions(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> Result<Vec<vk::ExtensionName>, EnumerationError>;

    /// Fills `features` and every structure chained behind it.
    ///
    /// # Safety
    ///
    /// The following must be true:
    /// - every structure reachable through `features.next` is alive
    ///   and starts with a valid structure header
    unsafe fn physical_device_features2(
        &self,
        physical_device: vk::PhysicalDevice,
        features: &mut vk::PhysicalDeviceFeatures2,
    );
}

impl InstanceCapabilitySource for Entry {
    fn instance_extensions(&self) -> Result<Vec<vk::ExtensionName>, EnumerationError> {
        let properties = unsafe { self.enumerate_instance_extension_properties(None) }
            .map_err(EnumerationError::InstanceExtensions)?;
        Ok(properties
            .into_iter()
            .map(|item| item.extension_name)
            .collect())
    }

    fn instance_layers(&self) -> Result<Vec<vk::ExtensionName>, EnumerationError> {
        let properties = unsafe { self.enumerate_instance_layer_properties() }
            .map_err(EnumerationError::InstanceLayers)?;
        Ok(properties.into_iter().map(|item| item.layer_name).collect())
    }
}

impl DeviceCapabilitySource for Instance {
    fn device_extensions(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> Result<Vec<vk::ExtensionName>, EnumerationError> {
        let properties =
            unsafe { self.enumerate_device_extension_properties(physical_device, None) }
                .map_err(EnumerationError::DeviceExtensions)?;
        Ok(properties
            .into_iter()
            .map(|item| item.extension_name)
            .collect())
    }

    unsafe fn physical_device_features2(
        &self,
        physical_device: vk::PhysicalDevice,
        features: &mut vk::PhysicalDeviceFeatures2,
    ) {
        self.get_physical_device_features2(physical_device, features);
    }
}

/// An error returned when the runtime could not report its capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EnumerationError {
    #[error("failed to enumerate instance extensions: {0}")]
    InstanceExtensions(#[source] vk::ErrorCode),
    #[error("failed to enumerate instance layers: {0}")]
    InstanceLayers(#[source] vk::ErrorCode),
    #[error("failed to enumerate device extensions: {0}")]
    DeviceExtensions(#[source] vk::ErrorCode),
}

impl EnumerationError {
    /// Returns the underlying Vulkan error code.
    pub fn code(&self) -> vk::ErrorCode {
        match *self {
            Self::InstanceExtensions(code)
            | Self::InstanceLayers(code)
            | Self::DeviceExtensions(code) => code,
        }
    }
}
