use std::ffi::c_char;

use vulkanalia::prelude::v1_0::*;
use vulkanalia::vk::Handle as _;

use crate::base::BaseCapabilityManager;
use crate::catalogue::{self, DeviceCatalogue};
use crate::registry::CapabilityName;
use crate::source::{DeviceCapabilitySource, EnumerationError};

pub use self::chain::{
    ChainIter, FeatureBlock, FeatureBlockDecl, FeatureBlockKey, FeatureStruct, FeatureStructType,
};

mod chain;

/// Capability negotiation for a single physical device.
///
/// After [`initialize`] every extension and every feature block is
/// disabled. Callers inspect the queried feature blocks, enable what they
/// need, and call [`prepare_creation`] to get the extension names and the
/// feature chain for the device creation request.
///
/// [`initialize`]: DeviceCapabilityManager::initialize
/// [`prepare_creation`]: DeviceCapabilityManager::prepare_creation
#[derive(Debug)]
pub struct DeviceCapabilityManager {
    physical_device: vk::PhysicalDevice,
    extensions: BaseCapabilityManager,
    feature_blocks: Vec<FeatureBlock>,
    linked: Vec<usize>,
    features2: vk::PhysicalDeviceFeatures2,
    features_queried: bool,
    creation_prepared: bool,
}

impl Default for DeviceCapabilityManager {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceCapabilityManager {
    /// Creates a manager for the default [`catalogue::DEVICE`].
    pub fn new() -> Self {
        Self::with_catalogue(&catalogue::DEVICE)
    }

    pub fn with_catalogue(catalogue: &DeviceCatalogue) -> Self {
        let feature_blocks = catalogue
            .feature_blocks
            .iter()
            .map(FeatureBlock::new)
            .collect::<Vec<_>>();

        for (i, block) in feature_blocks.iter().enumerate() {
            assert!(
                feature_blocks[i + 1..]
                    .iter()
                    .all(|other| other.name() != block.name()
                        && other.structure_type() != block.structure_type()),
                "feature block `{}` is declared more than once",
                block.name()
            );
        }

        Self {
            physical_device: vk::PhysicalDevice::null(),
            extensions: BaseCapabilityManager::new(
                "device extension",
                catalogue.extensions.iter().copied(),
            ),
            feature_blocks,
            linked: Vec::new(),
            features2: vk::PhysicalDeviceFeatures2::default(),
            features_queried: false,
            creation_prepared: false,
        }
    }

    /// Queries features and extensions of `physical_device`.
    ///
    /// Must be called exactly once. On error the manager is left untouched.
    #[track_caller]
    pub fn initialize<S>(
        &mut self,
        source: &S,
        physical_device: vk::PhysicalDevice,
    ) -> Result<(), EnumerationError>
    where
        S: DeviceCapabilitySource + ?Sized,
    {
        assert!(!physical_device.is_null(), "physical device must not be null");
        assert!(
            !self.features_queried,
            "device capabilities must be initialized only once"
        );

        let extensions = source.device_extensions(physical_device)?;

        self.physical_device = physical_device;
        self.query_features(source);
        self.extensions.load_support(extensions);

        self.extensions.enable_all(false);
        self.set_all_feature_blocks(false);

        tracing::debug!(?physical_device, "initialized device capabilities");
        Ok(())
    }

    fn query_features<S>(&mut self, source: &S)
    where
        S: DeviceCapabilitySource + ?Sized,
    {
        // Blocks start enabled, so the driver fills all of them
        chain::link_enabled(&mut self.features2, &mut self.feature_blocks, &mut self.linked);

        // SAFETY: the chain only links boxed structures owned by `self`.
        unsafe {
            source.physical_device_features2(self.physical_device, &mut self.features2);
        }

        chain::unlink_all(&mut self.features2, &mut self.feature_blocks);
        self.linked.clear();
        self.features_queried = true;
    }

    /// Returns the physical device this manager was initialized for.
    pub fn physical_device(&self) -> vk::PhysicalDevice {
        self.physical_device
    }

    pub fn extensions(&self) -> &BaseCapabilityManager {
        &self.extensions
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

    /// Enables a device extension. Returns `false` and logs a warning
    /// if the device lacks it.
    #[track_caller]
    pub fn add_extension<N>(&mut self, name: &N) -> bool
    where
        N: CapabilityName + ?Sized,
    {
        self.extensions.add(name)
    }

    /// Core features reported by the head of the query chain.
    #[track_caller]
    pub fn features(&self) -> &vk::PhysicalDeviceFeatures {
        self.assert_features_queried();
        &self.features2.features
    }

    #[track_caller]
    pub fn features_mut(&mut self) -> &mut vk::PhysicalDeviceFeatures {
        self.assert_features_queried();
        &mut self.features2.features
    }

    pub fn feature_blocks(&self) -> &[FeatureBlock] {
        &self.feature_blocks
    }

    /// Returns the queried payload of a declared feature block.
    #[track_caller]
    pub fn feature_block<T: FeatureStructType>(&self) -> &T {
        let index = self.find_block(T::STRUCTURE_TYPE.into());
        match self.feature_blocks[index].data().as_any().downcast_ref::<T>() {
            Some(data) => data,
            None => panic!(
                "feature block `{}` holds a different structure",
                self.feature_blocks[index].name()
            ),
        }
    }

    #[track_caller]
    pub fn feature_block_mut<T: FeatureStructType>(&mut self) -> &mut T {
        let index = self.find_block(T::STRUCTURE_TYPE.into());
        let block = &mut self.feature_blocks[index];
        let name = block.name();
        match block.data_mut().as_any_mut().downcast_mut::<T>() {
            Some(data) => data,
            None => panic!("feature block `{name}` holds a different structure"),
        }
    }

    #[track_caller]
    pub fn feature_block_data<'a, K>(&self, key: K) -> &dyn FeatureStruct
    where
        K: Into<FeatureBlockKey<'a>>,
    {
        let index = self.find_block(key.into());
        self.feature_blocks[index].data()
    }

    #[track_caller]
    pub fn feature_block_data_mut<'a, K>(&mut self, key: K) -> &mut dyn FeatureStruct
    where
        K: Into<FeatureBlockKey<'a>>,
    {
        let index = self.find_block(key.into());
        self.feature_blocks[index].data_mut()
    }

    #[track_caller]
    pub fn is_feature_block_enabled<'a, K>(&self, key: K) -> bool
    where
        K: Into<FeatureBlockKey<'a>>,
    {
        let index = self.find_block(key.into());
        self.feature_blocks[index].is_enabled()
    }

    /// Toggles a feature block.
    ///
    /// There is no support gate here: the caller must check the payload
    /// returned by [`feature_block`] before enabling it.
    ///
    /// [`feature_block`]: DeviceCapabilityManager::feature_block
    #[track_caller]
    pub fn enable_feature_block<'a, K>(&mut self, key: K, enabled: bool)
    where
        K: Into<FeatureBlockKey<'a>>,
    {
        let index = self.find_block(key.into());
        let block = &mut self.feature_blocks[index];
        block.set_enabled(enabled);
        tracing::trace!(name = block.name(), enabled, "feature block state changed");
    }

    #[track_caller]
    pub fn enable_all_feature_blocks(&mut self, enabled: bool) {
        self.assert_features_queried();
        self.set_all_feature_blocks(enabled);
    }

    fn set_all_feature_blocks(&mut self, enabled: bool) {
        for block in &mut self.feature_blocks {
            block.set_enabled(enabled);
        }
    }

    /// Freezes enabled extensions and links enabled feature blocks.
    ///
    /// Blocks are linked by pushing each one right after the head, so the
    /// resulting chain lists them in reverse declaration order. May be
    /// called again after further changes.
    #[track_caller]
    pub fn prepare_creation(&mut self) {
        self.assert_features_queried();

        self.extensions.prepare();
        chain::link_enabled(&mut self.features2, &mut self.feature_blocks, &mut self.linked);
        self.creation_prepared = true;

        tracing::debug!(
            extensions = self.extensions.enabled_count(),
            chain = ?self.chain().collect::<Vec<_>>(),
            "prepared device creation"
        );
    }

    #[track_caller]
    pub fn enabled_extension_count(&self) -> u32 {
        self.extensions.enabled_count()
    }

    #[track_caller]
    pub fn enabled_extension_names(&self) -> &[*const c_char] {
        self.extensions.enabled_names()
    }

    /// Returns the head of the feature chain, or `None` if no feature
    /// block is enabled.
    ///
    /// The head also carries the core features.
    #[track_caller]
    pub fn features_chain(&self) -> Option<&vk::PhysicalDeviceFeatures2> {
        self.assert_creation_prepared();
        (!self.linked.is_empty()).then_some(&self.features2)
    }

    /// Structure types of the chain linked by the last
    /// [`prepare_creation`], in traversal order.
    ///
    /// [`prepare_creation`]: DeviceCapabilityManager::prepare_creation
    pub fn chain(&self) -> ChainIter<'_> {
        ChainIter::new(&self.feature_blocks, &self.linked)
    }

    #[track_caller]
    fn find_block(&self, key: FeatureBlockKey<'_>) -> usize {
        self.assert_features_queried();
        match self.feature_blocks.iter().position(|block| block.matches(&key)) {
            Some(index) => index,
            None => panic!("feature block `{key}` is not declared in the capability catalogue"),
        }
    }

    #[track_caller]
    fn assert_features_queried(&self) {
        assert!(
            self.features_queried,
            "device features must be queried first"
        );
    }

    #[track_caller]
    fn assert_creation_prepared(&self) {
        assert!(
            self.creation_prepared,
            "device creation must be prepared first"
        );
    }
}
