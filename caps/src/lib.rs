pub use self::base::BaseCapabilityManager;
pub use self::device::{
    ChainIter, DeviceCapabilityManager, FeatureBlock, FeatureBlockDecl, FeatureBlockKey,
    FeatureStruct, FeatureStructType,
};
pub use self::instance::InstanceCapabilityManager;
pub use self::registry::{CapabilityItem, CapabilityName, CapabilityRegistry};
pub use self::source::{DeviceCapabilitySource, EnumerationError, InstanceCapabilitySource};

pub mod catalogue;
pub mod checks;

mod base;
mod device;
mod instance;
mod registry;
mod source;

#[cfg(test)]
mod testing;
