use std::any::Any;

use vulkanalia::prelude::v1_0::*;

/// A device feature structure that can be linked into a feature chain.
///
/// # Safety
///
/// The following must be true:
/// - the type is `#[repr(C)]` and starts with `s_type` and `next` fields,
///   like every Vulkan structure extending `VkPhysicalDeviceFeatures2`
pub unsafe trait FeatureStruct: Any + std::fmt::Debug {
    fn structure_type(&self) -> vk::StructureType;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    #[inline]
    fn as_base_mut(&mut self) -> *mut vk::BaseOutStructure {
        (self as *mut Self).cast()
    }
}

/// A [`FeatureStruct`] with a statically known structure type.
pub trait FeatureStructType: FeatureStruct + Default {
    const STRUCTURE_TYPE: vk::StructureType;
}

/// Implements [`FeatureStruct`] for Vulkan feature structures.
#[macro_export]
macro_rules! impl_feature_struct {
    ($($ty:ty => $sty:ident),*$(,)?) => {$(
        // SAFETY: all Vulkan feature structures start with a structure header.
        unsafe impl $crate::FeatureStruct for $ty {
            #[inline]
            fn structure_type(&self) -> ::vulkanalia::vk::StructureType {
                self.s_type
            }

            #[inline]
            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            #[inline]
            fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
                self
            }
        }

        impl $crate::FeatureStructType for $ty {
            const STRUCTURE_TYPE: ::vulkanalia::vk::StructureType =
                ::vulkanalia::vk::StructureType::$sty;
        }
    )*};
}

/// A static declaration of one feature block.
#[derive(Clone, Copy)]
pub struct FeatureBlockDecl {
    pub name: &'static str,
    pub structure_type: vk::StructureType,
    pub make: fn() -> Box<dyn FeatureStruct>,
}

impl FeatureBlockDecl {
    pub const fn of<T: FeatureStructType>(name: &'static str) -> Self {
        Self {
            name,
            structure_type: T::STRUCTURE_TYPE,
            make: make_feature_struct::<T>,
        }
    }
}

impl std::fmt::Debug for FeatureBlockDecl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureBlockDecl")
            .field("name", &self.name)
            .field("structure_type", &self.structure_type)
            .finish()
    }
}

fn make_feature_struct<T: FeatureStructType>() -> Box<dyn FeatureStruct> {
    Box::new(T::default())
}

/// One feature structure owned by a device manager.
#[derive(Debug)]
pub struct FeatureBlock {
    name: &'static str,
    structure_type: vk::StructureType,
    data: Box<dyn FeatureStruct>,
    enabled: bool,
}

impl FeatureBlock {
    pub(crate) fn new(decl: &FeatureBlockDecl) -> Self {
        let data = (decl.make)();
        assert_eq!(
            data.structure_type(),
            decl.structure_type,
            "feature block `{}` was declared with a mismatched structure type",
            decl.name
        );

        Self {
            name: decl.name,
            structure_type: decl.structure_type,
            data,
            // Everything takes part in the initial feature query
            enabled: true,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn structure_type(&self) -> vk::StructureType {
        self.structure_type
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn data(&self) -> &dyn FeatureStruct {
        self.data.as_ref()
    }

    pub fn data_mut(&mut self) -> &mut dyn FeatureStruct {
        self.data.as_mut()
    }

    pub(crate) fn matches(&self, key: &FeatureBlockKey<'_>) -> bool {
        match *key {
            FeatureBlockKey::Name(name) => self.name == name,
            FeatureBlockKey::Type(structure_type) => self.structure_type == structure_type,
        }
    }
}

/// Identifies a feature block either by name or by structure type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureBlockKey<'a> {
    Name(&'a str),
    Type(vk::StructureType),
}

impl<'a> From<&'a str> for FeatureBlockKey<'a> {
    #[inline]
    fn from(value: &'a str) -> Self {
        Self::Name(value)
    }
}

impl From<vk::StructureType> for FeatureBlockKey<'_> {
    #[inline]
    fn from(value: vk::StructureType) -> Self {
        Self::Type(value)
    }
}

impl std::fmt::Display for FeatureBlockKey<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Type(structure_type) => write!(f, "{structure_type:?}"),
        }
    }
}

/// Links the enabled blocks behind `head`, in reverse declaration order.
///
/// Any previous linkage is discarded first, so calling this again with the
/// same enabled set rebuilds the same chain. `linked` receives the indices
/// of the linked blocks in traversal order.
pub(crate) fn link_enabled(
    head: &mut vk::PhysicalDeviceFeatures2,
    blocks: &mut [FeatureBlock],
    linked: &mut Vec<usize>,
) {
    head.next = std::ptr::null_mut();
    linked.clear();
    for (index, block) in blocks.iter_mut().enumerate() {
        if !block.enabled {
            continue;
        }

        let node = block.data.as_base_mut();
        // SAFETY: `node` points to a live boxed structure owned by `block`.
        unsafe {
            debug_assert_eq!((*node).s_type, block.structure_type);
            (*node).next = std::ptr::null_mut();
            push_front(head, node);
        }
        linked.insert(0, index);
    }
}

/// Detaches every block from `head` and from each other.
pub(crate) fn unlink_all(head: &mut vk::PhysicalDeviceFeatures2, blocks: &mut [FeatureBlock]) {
    head.next = std::ptr::null_mut();
    for block in blocks.iter_mut() {
        let node = block.data.as_base_mut();
        // SAFETY: `node` points to a live boxed structure owned by `block`.
        unsafe { (*node).next = std::ptr::null_mut() };
    }
}

/// Inserts `node` right after `head`.
///
/// # Safety
///
/// `node` must point to a live structure that outlives the chain.
#[inline]
unsafe fn push_front(head: &mut vk::PhysicalDeviceFeatures2, node: *mut vk::BaseOutStructure) {
    (*node).next = head.next.cast();
    head.next = node.cast();
}

/// Iterates structure types of a linked chain, starting after the head.
pub struct ChainIter<'a> {
    blocks: &'a [FeatureBlock],
    linked: std::slice::Iter<'a, usize>,
}

impl<'a> ChainIter<'a> {
    pub(crate) fn new(blocks: &'a [FeatureBlock], linked: &'a [usize]) -> Self {
        Self {
            blocks,
            linked: linked.iter(),
        }
    }
}

impl Iterator for ChainIter<'_> {
    type Item = vk::StructureType;

    fn next(&mut self) -> Option<Self::Item> {
        let &index = self.linked.next()?;
        Some(self.blocks[index].structure_type)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.linked.size_hint()
    }
}

impl ExactSizeIterator for ChainIter<'_> {}
