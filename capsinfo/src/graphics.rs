use std::ffi::{c_void, CStr, CString};

use anyhow::Result;
use caps::{DeviceCapabilityManager, InstanceCapabilityManager};
use vulkanalia::loader::{LibloadingLoader, LIBRARY};
use vulkanalia::prelude::v1_0::*;
use vulkanalia::vk::ExtDebugUtilsExtensionInstanceCommands as _;
use vulkanalia::Instance;

use crate::config::{DeviceNegotiation, NegotiationConfig};

/// Vulkan instance created from the negotiated capabilities.
pub struct Graphics {
    instance: Instance,
    caps: InstanceCapabilityManager,
    debug_utils_messenger: vk::DebugUtilsMessengerEXT,
    _entry: Entry,
}

impl Graphics {
    /// Loads the Vulkan runtime, negotiates instance capabilities and
    /// creates the instance.
    pub fn new(config: &NegotiationConfig) -> Result<Self> {
        // Init API entry
        let loader = unsafe { LibloadingLoader::new(LIBRARY) }?;
        let entry = unsafe { Entry::new(loader) }.map_err(anyhow::Error::msg)?;

        let mut caps = InstanceCapabilityManager::new();
        caps.initialize(&entry)?;
        tracing::debug!(
            extensions = caps.extensions().supported_count(),
            layers = caps.layers().supported_count(),
            "enumerated instance capabilities"
        );

        config.negotiate_instance(&mut caps)?;

        // Prepare basic app info
        let api_version = unsafe { entry.version() }?.into();
        let app_name = CString::new(config.app_name.as_str())?;
        let app_info = vk::ApplicationInfo::builder()
            .application_name(app_name.as_bytes_with_nul())
            .application_version(vk::make_version(0, 0, 1))
            .engine_name(b"No Engine\0")
            .engine_version(vk::make_version(0, 0, 1))
            .api_version(api_version);

        let mut instance_info = vk::InstanceCreateInfo::builder()
            .application_info(&app_info)
            .enabled_extension_names(caps.enabled_extension_names())
            .enabled_layer_names(caps.enabled_layer_names());

        let debug_utils_enabled = caps.is_extension_enabled(&vk::EXT_DEBUG_UTILS_EXTENSION);
        let mut debug_info = make_debug_callback_info();
        if debug_utils_enabled {
            instance_info = instance_info.push_next(&mut debug_info);
        }

        let mut validation_features = caps.validation_features().copied();
        if let Some(validation_features) = &mut validation_features {
            instance_info = instance_info.push_next(validation_features);
        }

        let instance = unsafe { entry.create_instance(&instance_info, None) }?;

        let debug_utils_messenger = if debug_utils_enabled {
            let debug_info = make_debug_callback_info();
            match unsafe { instance.create_debug_utils_messenger_ext(&debug_info, None) } {
                Ok(messenger) => messenger,
                Err(e) => {
                    unsafe { instance.destroy_instance(None) };
                    return Err(e.into());
                }
            }
        } else {
            vk::DebugUtilsMessengerEXT::null()
        };

        Ok(Self {
            instance,
            caps,
            debug_utils_messenger,
            _entry: entry,
        })
    }

    /// Returns the capabilities the instance was created with.
    pub fn caps(&self) -> &InstanceCapabilityManager {
        &self.caps
    }

    pub fn physical_devices(&self) -> Result<Vec<vk::PhysicalDevice>> {
        let devices = unsafe { self.instance.enumerate_physical_devices() }?;
        Ok(devices)
    }

    pub fn device_name(&self, physical_device: vk::PhysicalDevice) -> String {
        let properties = unsafe {
            self.instance
                .get_physical_device_properties(physical_device)
        };
        properties.device_name.to_string()
    }

    /// Runs the device negotiation for `physical_device`.
    pub fn negotiate_device(
        &self,
        config: &NegotiationConfig,
        physical_device: vk::PhysicalDevice,
    ) -> Result<(DeviceCapabilityManager, DeviceNegotiation)> {
        let mut caps = DeviceCapabilityManager::new();
        caps.initialize(&self.instance, physical_device)?;
        let result = config.negotiate_device(&mut caps)?;
        Ok((caps, result))
    }
}

impl Drop for Graphics {
    fn drop(&mut self) {
        unsafe {
            if !self.debug_utils_messenger.is_null() {
                self.instance
                    .destroy_debug_utils_messenger_ext(self.debug_utils_messenger, None);
            }

            self.instance.destroy_instance(None);
        }
    }
}

fn make_debug_callback_info() -> vk::DebugUtilsMessengerCreateInfoEXTBuilder<'static> {
    vk::DebugUtilsMessengerCreateInfoEXT::builder()
        .message_severity(vk::DebugUtilsMessageSeverityFlagsEXT::all())
        .message_type(vk::DebugUtilsMessageTypeFlagsEXT::all())
        .user_callback(Some(debug_callback))
}

unsafe extern "system" fn debug_callback(
    severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    ty: vk::DebugUtilsMessageTypeFlagsEXT,
    data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _: *mut c_void,
) -> vk::Bool32 {
    let message = CStr::from_ptr((*data).message).to_string_lossy();

    if severity >= vk::DebugUtilsMessageSeverityFlagsEXT::ERROR {
        tracing::error!(target: "validation", ?ty, "{message}");
    } else if severity >= vk::DebugUtilsMessageSeverityFlagsEXT::WARNING {
        tracing::warn!(target: "validation", ?ty, "{message}");
    } else if severity >= vk::DebugUtilsMessageSeverityFlagsEXT::INFO {
        tracing::debug!(target: "validation", ?ty, "{message}");
    } else {
        tracing::trace!(target: "validation", ?ty, "{message}");
    };

    vk::FALSE
}
