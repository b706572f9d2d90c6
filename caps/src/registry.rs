use std::ffi::c_char;

use shared::FastHashMap;
use smallvec::SmallVec;
use vulkanalia::prelude::v1_0::*;

/// Something that can be used to look up a capability by name.
pub trait CapabilityName {
    fn to_capability_name(&self) -> vk::ExtensionName;
}

impl CapabilityName for str {
    #[track_caller]
    fn to_capability_name(&self) -> vk::ExtensionName {
        assert!(
            !self.as_bytes().contains(&0) && self.len() < vk::MAX_EXTENSION_NAME_SIZE as usize,
            "`{}` is not a valid capability name",
            self.escape_debug()
        );
        vk::ExtensionName::from_bytes(self.as_bytes())
    }
}

impl CapabilityName for vk::ExtensionName {
    #[inline]
    fn to_capability_name(&self) -> vk::ExtensionName {
        *self
    }
}

impl CapabilityName for vk::Extension {
    #[inline]
    fn to_capability_name(&self) -> vk::ExtensionName {
        self.name
    }
}

/// A single named capability.
#[derive(Debug, Clone, Copy)]
pub struct CapabilityItem {
    name: vk::ExtensionName,
    supported: bool,
    enabled: bool,
}

impl CapabilityItem {
    pub const fn new(name: vk::ExtensionName) -> Self {
        Self {
            name,
            supported: false,
            enabled: false,
        }
    }

    pub fn name(&self) -> &vk::ExtensionName {
        &self.name
    }

    /// Whether the runtime reported this capability.
    pub fn is_supported(&self) -> bool {
        self.supported
    }

    /// Whether this capability was requested. Never `true` unless supported.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// An ordered set of capabilities declared up front.
///
/// Items keep their declaration order, and the finalized name list
/// follows the same order.
#[derive(Debug)]
pub struct CapabilityRegistry {
    items: Vec<CapabilityItem>,
    lookup: FastHashMap<vk::ExtensionName, usize>,
    finalized: SmallVec<[usize; 16]>,
    finalized_ptrs: SmallVec<[*const c_char; 16]>,
    loaded: bool,
}

impl CapabilityRegistry {
    /// Creates a registry from the declared names.
    ///
    /// # Panics
    ///
    /// Panics if the same name is declared twice.
    pub fn new<I>(names: I) -> Self
    where
        I: IntoIterator<Item = vk::ExtensionName>,
    {
        let mut items = Vec::new();
        let mut lookup = FastHashMap::default();
        for name in names {
            let prev = lookup.insert(name, items.len());
            assert!(prev.is_none(), "`{name}` is declared more than once");
            items.push(CapabilityItem::new(name));
        }

        Self {
            items,
            lookup,
            finalized: SmallVec::new(),
            finalized_ptrs: SmallVec::new(),
            loaded: false,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[CapabilityItem] {
        &self.items
    }

    /// Returns `true` once runtime support has been applied.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Returns `true` if `name` was declared in the catalogue.
    pub fn contains<N>(&self, name: &N) -> bool
    where
        N: CapabilityName + ?Sized,
    {
        self.lookup.contains_key(&name.to_capability_name())
    }

    #[track_caller]
    pub fn is_supported<N>(&self, name: &N) -> bool
    where
        N: CapabilityName + ?Sized,
    {
        self.items[self.find(name)].supported
    }

    #[track_caller]
    pub fn is_enabled<N>(&self, name: &N) -> bool
    where
        N: CapabilityName + ?Sized,
    {
        self.items[self.find(name)].enabled
    }

    /// Requests or drops a capability.
    ///
    /// Returns `true` only if the capability ends up enabled. Requesting an
    /// unsupported capability leaves it disabled and returns `false`.
    #[track_caller]
    pub fn enable<N>(&mut self, name: &N, enabled: bool) -> bool
    where
        N: CapabilityName + ?Sized,
    {
        let index = self.find(name);
        let item = &mut self.items[index];
        item.enabled = enabled && item.supported;
        tracing::trace!(name = %item.name, enabled = item.enabled, "capability state changed");
        item.enabled
    }

    pub fn enable_all(&mut self, enabled: bool) {
        for item in &mut self.items {
            item.enabled = enabled && item.supported;
        }
    }

    /// Marks every declared name reported by the runtime as supported
    /// and enabled. Unknown names are ignored.
    ///
    /// # Panics
    ///
    /// Panics if support was already loaded.
    #[track_caller]
    pub fn load_support<I>(&mut self, found: I)
    where
        I: IntoIterator<Item = vk::ExtensionName>,
    {
        assert!(!self.loaded, "capability support must be loaded only once");
        self.loaded = true;

        for name in found {
            if let Some(&index) = self.lookup.get(&name) {
                let item = &mut self.items[index];
                item.supported = true;
                item.enabled = true;
            }
        }
    }

    /// Rebuilds the list of enabled names from the current state.
    pub fn finalize(&mut self) -> &[*const c_char] {
        self.finalized.clear();
        self.finalized_ptrs.clear();
        for (index, item) in self.items.iter().enumerate() {
            if item.enabled {
                debug_assert!(item.supported, "`{}` is enabled but not supported", item.name);
                self.finalized.push(index);
                self.finalized_ptrs.push(item.name.as_ptr());
            }
        }
        &self.finalized_ptrs
    }

    /// Names collected by the last [`finalize`] call.
    ///
    /// [`finalize`]: CapabilityRegistry::finalize
    pub fn finalized_names(&self) -> impl ExactSizeIterator<Item = &vk::ExtensionName> + '_ {
        self.finalized.iter().map(|&index| &self.items[index].name)
    }

    /// Pointers collected by the last [`finalize`] call.
    ///
    /// They point into the registry items and stay valid while the
    /// registry is alive.
    ///
    /// [`finalize`]: CapabilityRegistry::finalize
    pub fn finalized_ptrs(&self) -> &[*const c_char] {
        &self.finalized_ptrs
    }

    #[track_caller]
    fn find<N>(&self, name: &N) -> usize
    where
        N: CapabilityName + ?Sized,
    {
        let name = name.to_capability_name();
        match self.lookup.get(&name) {
            Some(&index) => index,
            None => panic!("`{name}` is not declared in the capability catalogue"),
        }
    }
}
