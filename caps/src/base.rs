use std::ffi::c_char;

use vulkanalia::prelude::v1_0::*;

use crate::registry::{CapabilityName, CapabilityRegistry};

/// Enumerate-configure-finalize lifecycle over one [`CapabilityRegistry`].
///
/// Every accessor asserts that the lifecycle is followed in order:
/// support is loaded exactly once, then items are toggled, then the
/// enabled names are prepared for the creation call.
#[derive(Debug)]
pub struct BaseCapabilityManager {
    kind: &'static str,
    registry: CapabilityRegistry,
    prepared: bool,
}

impl BaseCapabilityManager {
    /// Creates a manager over the declared names.
    ///
    /// `kind` is only used in diagnostics (e.g. `"device extension"`).
    pub fn new<I>(kind: &'static str, names: I) -> Self
    where
        I: IntoIterator<Item = vk::ExtensionName>,
    {
        Self {
            kind,
            registry: CapabilityRegistry::new(names),
            prepared: false,
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    pub fn is_enumerated(&self) -> bool {
        self.registry.is_loaded()
    }

    /// Applies the names reported by the runtime.
    #[track_caller]
    pub fn load_support<I>(&mut self, found: I)
    where
        I: IntoIterator<Item = vk::ExtensionName>,
    {
        assert!(
            !self.is_enumerated(),
            "{} support must be loaded only once",
            self.kind
        );
        self.registry.load_support(found);

        tracing::debug!(
            kind = self.kind,
            supported = self.supported_count(),
            declared = self.registry.len(),
            "loaded capability support"
        );
    }

    #[track_caller]
    pub fn is_supported<N>(&self, name: &N) -> bool
    where
        N: CapabilityName + ?Sized,
    {
        self.assert_enumerated();
        self.registry.is_supported(name)
    }

    #[track_caller]
    pub fn is_enabled<N>(&self, name: &N) -> bool
    where
        N: CapabilityName + ?Sized,
    {
        self.assert_enumerated();
        self.registry.is_enabled(name)
    }

    #[track_caller]
    pub fn enable<N>(&mut self, name: &N, enabled: bool) -> bool
    where
        N: CapabilityName + ?Sized,
    {
        self.assert_enumerated();
        self.registry.enable(name, enabled)
    }

    #[track_caller]
    pub fn enable_all(&mut self, enabled: bool) {
        self.assert_enumerated();
        self.registry.enable_all(enabled);
    }

    /// Enables a capability, logging a warning if the runtime lacks it.
    #[track_caller]
    pub fn add<N>(&mut self, name: &N) -> bool
    where
        N: CapabilityName + ?Sized,
    {
        if self.enable(name, true) {
            return true;
        }

        let name = name.to_capability_name();
        tracing::warn!(kind = self.kind, name = %name, "requested capability is not supported");
        false
    }

    /// Freezes the enabled state into the name list.
    ///
    /// May be called again after further changes.
    #[track_caller]
    pub fn prepare(&mut self) {
        self.assert_enumerated();
        let count = self.registry.finalize().len();
        self.prepared = true;

        tracing::debug!(kind = self.kind, count, "prepared enabled capability names");
    }

    #[track_caller]
    pub fn enabled_count(&self) -> u32 {
        self.assert_prepared();
        self.registry.finalized_ptrs().len() as u32
    }

    /// Returns names prepared by the last [`prepare`] call.
    ///
    /// [`prepare`]: BaseCapabilityManager::prepare
    #[track_caller]
    pub fn enabled_names(&self) -> &[*const c_char] {
        self.assert_prepared();
        self.registry.finalized_ptrs()
    }

    #[track_caller]
    pub fn enabled_iter(&self) -> impl ExactSizeIterator<Item = &vk::ExtensionName> + '_ {
        self.assert_prepared();
        self.registry.finalized_names()
    }

    pub fn supported_count(&self) -> usize {
        self.registry
            .items()
            .iter()
            .filter(|item| item.is_supported())
            .count()
    }

    #[track_caller]
    fn assert_enumerated(&self) {
        assert!(
            self.is_enumerated(),
            "{} support must be loaded from the runtime first",
            self.kind
        );
    }

    #[track_caller]
    fn assert_prepared(&self) {
        assert!(self.prepared, "{} names must be prepared first", self.kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::tests::names;

    fn ext(name: &str) -> vk::ExtensionName {
        vk::ExtensionName::from_bytes(name.as_bytes())
    }

    fn make_manager() -> BaseCapabilityManager {
        BaseCapabilityManager::new("instance extension", [ext("VK_EXT_a"), ext("VK_EXT_b")])
    }

    #[test]
    fn unsupported_extension_is_dropped() {
        let mut manager = make_manager();
        manager.load_support([ext("VK_EXT_a")]);

        assert!(!manager.add("VK_EXT_b"));
        manager.prepare();

        assert_eq!(manager.enabled_count(), 1);
        assert_eq!(names(manager.enabled_iter()), ["VK_EXT_a"]);
    }

    #[test]
    fn enable_all_then_prepare() {
        let mut manager = make_manager();
        manager.load_support([ext("VK_EXT_b"), ext("VK_EXT_a")]);

        manager.enable_all(false);
        manager.prepare();
        assert_eq!(manager.enabled_count(), 0);
        assert!(manager.enabled_names().is_empty());

        manager.enable_all(true);
        manager.prepare();
        assert_eq!(names(manager.enabled_iter()), ["VK_EXT_a", "VK_EXT_b"]);
    }

    #[test]
    fn prepare_reflects_later_changes() {
        let mut manager = make_manager();
        manager.load_support([ext("VK_EXT_a"), ext("VK_EXT_b")]);
        manager.prepare();
        assert_eq!(manager.enabled_count(), 2);

        manager.enable("VK_EXT_a", false);
        manager.prepare();
        assert_eq!(names(manager.enabled_iter()), ["VK_EXT_b"]);
    }

    #[test]
    #[should_panic(expected = "must be loaded only once")]
    fn second_load_is_rejected() {
        let mut manager = make_manager();
        manager.load_support([ext("VK_EXT_a")]);
        manager.load_support([ext("VK_EXT_b")]);
    }

    #[test]
    #[should_panic(expected = "must be loaded from the runtime first")]
    fn query_before_load_is_rejected() {
        let manager = make_manager();
        manager.is_supported("VK_EXT_a");
    }

    #[test]
    #[should_panic(expected = "must be prepared first")]
    fn names_before_prepare_are_rejected() {
        let mut manager = make_manager();
        manager.load_support([]);
        manager.enabled_names();
    }
}
