use vulkanalia::prelude::v1_0::*;

use crate::instance::InstanceCapabilityManager;

const ENABLED_VALIDATION_FEATURES: &[vk::ValidationFeatureEnableEXT] =
    &[vk::ValidationFeatureEnableEXT::GPU_ASSISTED];

/// Requests GPU-assisted validation.
#[track_caller]
pub fn check_extensions(caps: &mut InstanceCapabilityManager) -> bool {
    let extension = vk::EXT_VALIDATION_FEATURES_EXTENSION;
    if !caps.add_extension(&extension) {
        tracing::info!(extension = %extension.name, "gpu validation disabled, missing extension");
        return false;
    }

    caps.set_validation_features(ENABLED_VALIDATION_FEATURES);
    true
}
