use std::ffi::c_char;

use vulkanalia::prelude::v1_0::*;

use crate::base::BaseCapabilityManager;
use crate::catalogue::{self, InstanceCatalogue};
use crate::registry::CapabilityName;
use crate::source::{EnumerationError, InstanceCapabilitySource};

/// Capability negotiation for the instance: extensions and layers.
///
/// After [`initialize`] nothing is enabled; callers opt in with
/// [`add_extension`] and [`add_layer`].
///
/// [`initialize`]: InstanceCapabilityManager::initialize
/// [`add_extension`]: InstanceCapabilityManager::add_extension
/// [`add_layer`]: InstanceCapabilityManager::add_layer
#[derive(Debug)]
pub struct InstanceCapabilityManager {
    extensions: BaseCapabilityManager,
    layers: BaseCapabilityManager,
    validation_enables: Vec<vk::ValidationFeatureEnableEXT>,
    validation_features: vk::ValidationFeaturesEXT,
    validation_features_enabled: bool,
    creation_prepared: bool,
}

impl Default for InstanceCapabilityManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InstanceCapabilityManager {
    /// Creates a manager for the default [`catalogue::INSTANCE`].
    pub fn new() -> Self {
        Self::with_catalogue(&catalogue::INSTANCE)
    }

    pub fn with_catalogue(catalogue: &InstanceCatalogue) -> Self {
        Self {
            extensions: BaseCapabilityManager::new(
                "instance extension",
                catalogue.extensions.iter().copied(),
            ),
            layers: BaseCapabilityManager::new("instance layer", catalogue.layers.iter().copied()),
            validation_enables: Vec::new(),
            validation_features: vk::ValidationFeaturesEXT::default(),
            validation_features_enabled: false,
            creation_prepared: false,
        }
    }

    /// Enumerates instance layers and extensions and disables all of them.
    ///
    /// Must be called exactly once. On error the manager is left untouched.
    #[track_caller]
    pub fn initialize<S>(&mut self, source: &S) -> Result<(), EnumerationError>
    where
        S: InstanceCapabilitySource + ?Sized,
    {
        let layers = source.instance_layers()?;
        let extensions = source.instance_extensions()?;

        self.layers.load_support(layers);
        self.layers.enable_all(false);

        self.extensions.load_support(extensions);
        self.extensions.enable_all(false);

        Ok(())
    }

    pub fn extensions(&self) -> &BaseCapabilityManager {
        &self.extensions
    }

    pub fn layers(&self) -> &BaseCapabilityManager {
        &self.layers
    }

    #[track_caller]
    pub fn is_extension_supported<N>(&self, name: &N) -> bool
    where
        N: CapabilityName + ?Sized,
    {
        self.extensions.is_supported(name)
    }

    #[track_caller]
    pub fn is_extension_enabled<N>(&self, name: &N) -> bool
    where
        N: CapabilityName + ?Sized,
    {
        self.extensions.is_enabled(name)
    }

    #[track_caller]
    pub fn enable_extension<N>(&mut self, name: &N, enabled: bool) -> bool
    where
        N: CapabilityName + ?Sized,
    {
        self.extensions.enable(name, enabled)
    }

    #[track_caller]
    pub fn enable_all_extensions(&mut self, enabled: bool) {
        self.extensions.enable_all(enabled);
    }

    /// Enables an instance extension. Returns `false` and logs a warning
    /// if the runtime lacks it.
    #[track_caller]
    pub fn add_extension<N>(&mut self, name: &N) -> bool
    where
        N: CapabilityName + ?Sized,
    {
        self.extensions.add(name)
    }

    #[track_caller]
    pub fn is_layer_supported<N>(&self, name: &N) -> bool
    where
        N: CapabilityName + ?Sized,
    {
        self.layers.is_supported(name)
    }

    #[track_caller]
    pub fn is_layer_enabled<N>(&self, name: &N) -> bool
    where
        N: CapabilityName + ?Sized,
    {
        self.layers.is_enabled(name)
    }

    #[track_caller]
    pub fn enable_layer<N>(&mut self, name: &N, enabled: bool) -> bool
    where
        N: CapabilityName + ?Sized,
    {
        self.layers.enable(name, enabled)
    }

    #[track_caller]
    pub fn enable_all_layers(&mut self, enabled: bool) {
        self.layers.enable_all(enabled);
    }

    /// Enables an instance layer. Returns `false` and logs a warning
    /// if the runtime lacks it.
    #[track_caller]
    pub fn add_layer<N>(&mut self, name: &N) -> bool
    where
        N: CapabilityName + ?Sized,
    {
        self.layers.add(name)
    }

    /// Sets validation features to request and enables the block.
    ///
    /// Requires `VK_EXT_validation_features` to be enabled by the caller.
    pub fn set_validation_features(&mut self, enables: &[vk::ValidationFeatureEnableEXT]) {
        self.validation_enables.clear();
        self.validation_enables.extend_from_slice(enables);

        self.validation_features.enabled_validation_feature_count =
            self.validation_enables.len() as u32;
        self.validation_features.enabled_validation_features = self.validation_enables.as_ptr();
        self.validation_features_enabled = true;
    }

    pub fn enable_validation_features(&mut self, enabled: bool) {
        self.validation_features_enabled = enabled;
    }

    pub fn is_validation_features_enabled(&self) -> bool {
        self.validation_features_enabled
    }

    /// Freezes enabled layers and extensions.
    ///
    /// May be called again after further changes.
    #[track_caller]
    pub fn prepare_creation(&mut self) {
        self.layers.prepare();
        self.extensions.prepare();
        self.creation_prepared = true;
    }

    #[track_caller]
    pub fn enabled_extension_count(&self) -> u32 {
        self.extensions.enabled_count()
    }

    #[track_caller]
    pub fn enabled_extension_names(&self) -> &[*const c_char] {
        self.extensions.enabled_names()
    }

    #[track_caller]
    pub fn enabled_layer_count(&self) -> u32 {
        self.layers.enabled_count()
    }

    #[track_caller]
    pub fn enabled_layer_names(&self) -> &[*const c_char] {
        self.layers.enabled_names()
    }

    /// Returns the validation features block to attach to the instance
    /// creation request, if it was enabled along with
    /// `VK_EXT_validation_features`.
    #[track_caller]
    pub fn validation_features(&self) -> Option<&vk::ValidationFeaturesEXT> {
        assert!(
            self.creation_prepared,
            "instance creation must be prepared first"
        );

        // Checked against the prepared names, which the creation call uses
        let extension_enabled = self
            .extensions
            .enabled_iter()
            .any(|name| *name == vk::EXT_VALIDATION_FEATURES_EXTENSION.name);

        (self.validation_features_enabled && extension_enabled)
            .then_some(&self.validation_features)
    }
}
