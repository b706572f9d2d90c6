use anyhow::Result;
use caps::checks::{fp16, gpu_validation};
use caps::{catalogue, BaseCapabilityManager, DeviceCapabilityManager, InstanceCapabilityManager};
use vulkanalia::prelude::v1_0::*;

/// What to ask the runtime for.
#[derive(Debug, Clone, Default)]
pub struct NegotiationConfig {
    pub app_name: String,
    pub validation_layer: bool,
    pub gpu_validation: bool,
    pub fp16: bool,
    pub extensions: Vec<String>,
    pub layers: Vec<String>,
    pub device_extensions: Vec<String>,
}

/// Outcome of the device negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceNegotiation {
    pub swapchain: bool,
    pub fp16: bool,
}

impl NegotiationConfig {
    /// Enables the requested instance layers and extensions and prepares
    /// the instance creation lists.
    pub fn negotiate_instance(&self, caps: &mut InstanceCapabilityManager) -> Result<()> {
        ensure_declared(caps.extensions(), &self.extensions)?;
        ensure_declared(caps.layers(), &self.layers)?;

        if self.validation_layer {
            if caps.add_layer(&catalogue::VALIDATION_LAYER)
                || caps.add_layer(&catalogue::ALT_VALIDATION_LAYER)
            {
                caps.add_extension(&vk::EXT_DEBUG_UTILS_EXTENSION);
            } else {
                tracing::warn!("Vulkan validation layers are not available");
            }
        }

        if self.gpu_validation {
            gpu_validation::check_extensions(caps);
        }

        caps.add_extension(&vk::KHR_GET_PHYSICAL_DEVICE_PROPERTIES2_EXTENSION);

        for layer in &self.layers {
            caps.add_layer(layer.as_str());
        }
        for extension in &self.extensions {
            caps.add_extension(extension.as_str());
        }

        caps.prepare_creation();
        Ok(())
    }

    /// Enables the requested device extensions and feature blocks and
    /// prepares the device creation request.
    pub fn negotiate_device(&self, caps: &mut DeviceCapabilityManager) -> Result<DeviceNegotiation> {
        ensure_declared(caps.extensions(), &self.device_extensions)?;

        let swapchain = caps.add_extension(&vk::KHR_SWAPCHAIN_EXTENSION);
        for extension in &self.device_extensions {
            caps.add_extension(extension.as_str());
        }

        let fp16 = self.fp16 && fp16::check_extensions(caps);

        caps.prepare_creation();
        Ok(DeviceNegotiation { swapchain, fp16 })
    }
}

fn ensure_declared(caps: &BaseCapabilityManager, names: &[String]) -> Result<()> {
    for name in names {
        anyhow::ensure!(
            !name.contains('\0') && name.len() < vk::MAX_EXTENSION_NAME_SIZE as usize,
            "`{}` is not a valid {} name",
            name.escape_debug(),
            caps.kind()
        );
        anyhow::ensure!(
            caps.registry().contains(name.as_str()),
            "`{name}` is not a known {}",
            caps.kind()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use caps::{DeviceCapabilitySource, EnumerationError, InstanceCapabilitySource};
    use vulkanalia::vk::Handle as _;

    use super::*;

    struct Runtime {
        extensions: Vec<vk::ExtensionName>,
        layers: Vec<vk::ExtensionName>,
    }

    impl Runtime {
        fn new(extensions: &[&str], layers: &[&str]) -> Self {
            let to_names = |names: &[&str]| {
                names
                    .iter()
                    .map(|name| vk::ExtensionName::from_bytes(name.as_bytes()))
                    .collect()
            };

            Self {
                extensions: to_names(extensions),
                layers: to_names(layers),
            }
        }
    }

    impl InstanceCapabilitySource for Runtime {
        fn instance_extensions(&self) -> Result<Vec<vk::ExtensionName>, EnumerationError> {
            Ok(self.extensions.clone())
        }

        fn instance_layers(&self) -> Result<Vec<vk::ExtensionName>, EnumerationError> {
            Ok(self.layers.clone())
        }
    }

    impl DeviceCapabilitySource for Runtime {
        fn device_extensions(
            &self,
            _: vk::PhysicalDevice,
        ) -> Result<Vec<vk::ExtensionName>, EnumerationError> {
            Ok(self.extensions.clone())
        }

        unsafe fn physical_device_features2(
            &self,
            _: vk::PhysicalDevice,
            _: &mut vk::PhysicalDeviceFeatures2,
        ) {
        }
    }

    fn instance_caps(runtime: &Runtime) -> InstanceCapabilityManager {
        let mut caps = InstanceCapabilityManager::new();
        caps.initialize(runtime).unwrap();
        caps
    }

    fn device_caps(runtime: &Runtime) -> DeviceCapabilityManager {
        let mut caps = DeviceCapabilityManager::new();
        caps.initialize(runtime, vk::PhysicalDevice::from_raw(1))
            .unwrap();
        caps
    }

    #[test]
    fn validation_falls_back_to_alt_layer() {
        let runtime = Runtime::new(
            &["VK_EXT_debug_utils"],
            &["VK_LAYER_LUNARG_standard_validation"],
        );
        let mut caps = instance_caps(&runtime);

        let config = NegotiationConfig {
            validation_layer: true,
            ..Default::default()
        };
        config.negotiate_instance(&mut caps).unwrap();

        assert!(caps.is_layer_enabled(&catalogue::ALT_VALIDATION_LAYER));
        assert!(caps.is_extension_enabled(&vk::EXT_DEBUG_UTILS_EXTENSION));
        assert_eq!(caps.enabled_layer_count(), 1);
        assert!(caps.validation_features().is_none());
    }

    #[test]
    fn missing_validation_layer_is_not_fatal() {
        let runtime = Runtime::new(&["VK_EXT_debug_utils"], &[]);
        let mut caps = instance_caps(&runtime);

        let config = NegotiationConfig {
            validation_layer: true,
            ..Default::default()
        };
        config.negotiate_instance(&mut caps).unwrap();

        assert_eq!(caps.enabled_layer_count(), 0);
        assert!(!caps.is_extension_enabled(&vk::EXT_DEBUG_UTILS_EXTENSION));
    }

    #[test]
    fn unknown_names_are_rejected() {
        let runtime = Runtime::new(&[], &[]);
        let mut caps = instance_caps(&runtime);

        let config = NegotiationConfig {
            extensions: vec!["VK_EXT_typo".to_owned()],
            ..Default::default()
        };
        let err = config.negotiate_instance(&mut caps).unwrap_err();
        assert!(err.to_string().contains("VK_EXT_typo"));
    }

    #[test]
    fn malformed_names_are_rejected() {
        let runtime = Runtime::new(&[], &[]);
        let mut caps = instance_caps(&runtime);

        let config = NegotiationConfig {
            layers: vec!["VK_LAYER_KHRONOS_validation\0x".to_owned()],
            ..Default::default()
        };
        let err = config.negotiate_instance(&mut caps).unwrap_err();
        assert!(err.to_string().contains("not a valid instance layer name"));
    }

    #[test]
    fn device_negotiation_reports_results() {
        let runtime = Runtime::new(
            &["VK_KHR_swapchain", "VK_KHR_16bit_storage", "VK_KHR_shader_float16_int8"],
            &[],
        );
        let mut caps = device_caps(&runtime);

        let config = NegotiationConfig {
            fp16: true,
            device_extensions: vec!["VK_KHR_maintenance1".to_owned()],
            ..Default::default()
        };
        let result = config.negotiate_device(&mut caps).unwrap();

        // The runtime reports no feature bits
        assert_eq!(
            result,
            DeviceNegotiation {
                swapchain: true,
                fp16: false,
            }
        );
        assert!(!caps.is_extension_enabled(&vk::KHR_MAINTENANCE1_EXTENSION));
        assert_eq!(caps.enabled_extension_count(), 3);
        assert!(caps.features_chain().is_none());
    }
}
