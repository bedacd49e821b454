// SPDX-FileCopyrightText: 2026 Trellis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The application context: one optional slot per plugin category plus
//! the mandatory init plugin.
//!
//! Slot types come from a [`Slots`] bundle. [`DefaultSlots`] holds every
//! category's `dyn` contract; a deployment can narrow any slot to a
//! concrete implementation by supplying its own bundle, while every filled
//! slot still satisfies the category contract.
//!
//! A context is assembled once and is read-only afterwards. It imposes no
//! activation order of its own: [`Context::activate_in`] runs exactly the
//! order the caller lists.

use std::sync::Arc;

use strum::IntoEnumIterator;
use tracing::{debug, info};
use trellis_core::traits::{
    DynAuthenticationPlugin, DynBackupPlugin, DynConfigurationPlugin, DynExecutionPlugin,
    DynHookPlugin,
};
use trellis_core::{
    Activate, AnyContext, AsPlugin, AuthenticationPlugin, BackupPlugin, CachePlugin, ChatPlugin,
    ConfigurationPlugin, Deactivate, ExecutionPlugin, FaxPlugin, HookPlugin, InitPlugin,
    LoggingPlugin, MmsPlugin, Plugin, PluginKind, SmtpPlugin, StoragePlugin, TrellisError,
};

/// The plugin type held by each context slot.
pub trait Slots: Send + Sync + 'static {
    type Authn: AuthenticationPlugin + ?Sized;
    type Backups: BackupPlugin + ?Sized;
    type Cache: CachePlugin + ?Sized;
    type Chat: ChatPlugin + ?Sized;
    type Config: ConfigurationPlugin + ?Sized;
    type Email: SmtpPlugin + ?Sized;
    type Exec: ExecutionPlugin + ?Sized;
    type Fax: FaxPlugin + ?Sized;
    type Hooks: HookPlugin + ?Sized;
    type Log: LoggingPlugin + ?Sized;
    type Mms: MmsPlugin + ?Sized;
    type Store: StoragePlugin + ?Sized;
}

/// Every slot holds the category's `dyn` contract.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSlots;

impl Slots for DefaultSlots {
    type Authn = DynAuthenticationPlugin;
    type Backups = DynBackupPlugin;
    type Cache = dyn CachePlugin;
    type Chat = dyn ChatPlugin;
    type Config = DynConfigurationPlugin;
    type Email = dyn SmtpPlugin;
    type Exec = DynExecutionPlugin;
    type Fax = dyn FaxPlugin;
    type Hooks = DynHookPlugin;
    type Log = dyn LoggingPlugin;
    type Mms = dyn MmsPlugin;
    type Store = dyn StoragePlugin;
}

/// Registry of the plugins making up a running application.
pub struct Context<S: Slots = DefaultSlots> {
    init: Arc<dyn InitPlugin>,
    authn: Option<Arc<S::Authn>>,
    backups: Option<Arc<S::Backups>>,
    cache: Option<Arc<S::Cache>>,
    chat: Option<Arc<S::Chat>>,
    config: Option<Arc<S::Config>>,
    email: Option<Arc<S::Email>>,
    exec: Option<Arc<S::Exec>>,
    fax: Option<Arc<S::Fax>>,
    hooks: Option<Arc<S::Hooks>>,
    log: Option<Arc<S::Log>>,
    mms: Option<Arc<S::Mms>>,
    store: Option<Arc<S::Store>>,
}

impl<S: Slots> Context<S> {
    /// A context with only the init slot filled.
    pub fn new(init: Arc<dyn InitPlugin>) -> Result<Self, TrellisError> {
        ContextBuilder::new(init).build()
    }

    pub fn builder(init: Arc<dyn InitPlugin>) -> ContextBuilder<S> {
        ContextBuilder::new(init)
    }

    pub fn init_plugin(&self) -> &Arc<dyn InitPlugin> {
        &self.init
    }

    pub fn authn(&self) -> Option<&Arc<S::Authn>> {
        self.authn.as_ref()
    }

    pub fn backups(&self) -> Option<&Arc<S::Backups>> {
        self.backups.as_ref()
    }

    pub fn cache(&self) -> Option<&Arc<S::Cache>> {
        self.cache.as_ref()
    }

    pub fn chat(&self) -> Option<&Arc<S::Chat>> {
        self.chat.as_ref()
    }

    pub fn config(&self) -> Option<&Arc<S::Config>> {
        self.config.as_ref()
    }

    pub fn email(&self) -> Option<&Arc<S::Email>> {
        self.email.as_ref()
    }

    pub fn exec(&self) -> Option<&Arc<S::Exec>> {
        self.exec.as_ref()
    }

    pub fn fax(&self) -> Option<&Arc<S::Fax>> {
        self.fax.as_ref()
    }

    pub fn hooks(&self) -> Option<&Arc<S::Hooks>> {
        self.hooks.as_ref()
    }

    pub fn log(&self) -> Option<&Arc<S::Log>> {
        self.log.as_ref()
    }

    pub fn mms(&self) -> Option<&Arc<S::Mms>> {
        self.mms.as_ref()
    }

    pub fn store(&self) -> Option<&Arc<S::Store>> {
        self.store.as_ref()
    }

    /// Activates the listed slots in the given order.
    ///
    /// Every listed slot must be filled; otherwise nothing is activated and
    /// `MissingSlot` is returned. Stops at the first failing activation,
    /// leaving the plugins before it active.
    pub async fn activate_in(&self, order: &[PluginKind]) -> Result<(), TrellisError> {
        for plugin in self.resolve(order)? {
            debug!(kind = %plugin.kind(), plugin = %plugin.metadata().name, "activating plugin");
            plugin.activate(Some(self)).await?;
        }
        info!(count = order.len(), "plugins activated");
        Ok(())
    }

    /// Deactivates the listed slots in the given order, with the same
    /// rules as [`activate_in`](Self::activate_in).
    pub async fn deactivate_in(&self, order: &[PluginKind]) -> Result<(), TrellisError> {
        for plugin in self.resolve(order)? {
            debug!(kind = %plugin.kind(), plugin = %plugin.metadata().name, "deactivating plugin");
            plugin.deactivate(Some(self)).await?;
        }
        info!(count = order.len(), "plugins deactivated");
        Ok(())
    }

    fn resolve(&self, order: &[PluginKind]) -> Result<Vec<&dyn Plugin>, TrellisError> {
        order
            .iter()
            .map(|&kind| {
                self.slot(kind).ok_or(TrellisError::MissingSlot {
                    slot: kind.slot_name(),
                })
            })
            .collect()
    }

    fn slot(&self, kind: PluginKind) -> Option<&dyn Plugin> {
        match kind {
            PluginKind::Init => Some(self.init.as_ref().as_plugin()),
            PluginKind::Authentication => self.authn.as_deref().map(|p| p.as_plugin()),
            PluginKind::Backup => self.backups.as_deref().map(|p| p.as_plugin()),
            PluginKind::Cache => self.cache.as_deref().map(|p| p.as_plugin()),
            PluginKind::Chat => self.chat.as_deref().map(|p| p.as_plugin()),
            PluginKind::Configuration => self.config.as_deref().map(|p| p.as_plugin()),
            PluginKind::Smtp => self.email.as_deref().map(|p| p.as_plugin()),
            PluginKind::Execution => self.exec.as_deref().map(|p| p.as_plugin()),
            PluginKind::Fax => self.fax.as_deref().map(|p| p.as_plugin()),
            PluginKind::Hook => self.hooks.as_deref().map(|p| p.as_plugin()),
            PluginKind::Logging => self.log.as_deref().map(|p| p.as_plugin()),
            PluginKind::Mms => self.mms.as_deref().map(|p| p.as_plugin()),
            PluginKind::Storage => self.store.as_deref().map(|p| p.as_plugin()),
        }
    }
}

impl<S: Slots> AnyContext for Context<S> {
    fn init(&self) -> &dyn InitPlugin {
        self.init.as_ref()
    }

    fn plugin(&self, kind: PluginKind) -> Option<&dyn Plugin> {
        self.slot(kind)
    }

    fn kinds(&self) -> Vec<PluginKind> {
        PluginKind::iter()
            .filter(|&kind| self.slot(kind).is_some())
            .collect()
    }
}

impl<S: Slots> Clone for Context<S> {
    fn clone(&self) -> Self {
        Self {
            init: self.init.clone(),
            authn: self.authn.clone(),
            backups: self.backups.clone(),
            cache: self.cache.clone(),
            chat: self.chat.clone(),
            config: self.config.clone(),
            email: self.email.clone(),
            exec: self.exec.clone(),
            fax: self.fax.clone(),
            hooks: self.hooks.clone(),
            log: self.log.clone(),
            mms: self.mms.clone(),
            store: self.store.clone(),
        }
    }
}

impl<S: Slots> std::fmt::Debug for Context<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for kind in PluginKind::iter() {
            if let Some(plugin) = self.slot(kind) {
                map.entry(&kind.slot_name(), &plugin.metadata().name);
            }
        }
        map.finish()
    }
}

/// Assembles a [`Context`], checking each plugin against its slot.
pub struct ContextBuilder<S: Slots = DefaultSlots> {
    context: Context<S>,
}

impl<S: Slots> ContextBuilder<S> {
    pub fn new(init: Arc<dyn InitPlugin>) -> Self {
        Self {
            context: Context {
                init,
                authn: None,
                backups: None,
                cache: None,
                chat: None,
                config: None,
                email: None,
                exec: None,
                fax: None,
                hooks: None,
                log: None,
                mms: None,
                store: None,
            },
        }
    }

    pub fn with_authn(mut self, plugin: Arc<S::Authn>) -> Self {
        self.context.authn = Some(plugin);
        self
    }

    pub fn with_backups(mut self, plugin: Arc<S::Backups>) -> Self {
        self.context.backups = Some(plugin);
        self
    }

    pub fn with_cache(mut self, plugin: Arc<S::Cache>) -> Self {
        self.context.cache = Some(plugin);
        self
    }

    pub fn with_chat(mut self, plugin: Arc<S::Chat>) -> Self {
        self.context.chat = Some(plugin);
        self
    }

    pub fn with_config(mut self, plugin: Arc<S::Config>) -> Self {
        self.context.config = Some(plugin);
        self
    }

    pub fn with_email(mut self, plugin: Arc<S::Email>) -> Self {
        self.context.email = Some(plugin);
        self
    }

    pub fn with_exec(mut self, plugin: Arc<S::Exec>) -> Self {
        self.context.exec = Some(plugin);
        self
    }

    pub fn with_fax(mut self, plugin: Arc<S::Fax>) -> Self {
        self.context.fax = Some(plugin);
        self
    }

    pub fn with_hooks(mut self, plugin: Arc<S::Hooks>) -> Self {
        self.context.hooks = Some(plugin);
        self
    }

    pub fn with_log(mut self, plugin: Arc<S::Log>) -> Self {
        self.context.log = Some(plugin);
        self
    }

    pub fn with_mms(mut self, plugin: Arc<S::Mms>) -> Self {
        self.context.mms = Some(plugin);
        self
    }

    pub fn with_store(mut self, plugin: Arc<S::Store>) -> Self {
        self.context.store = Some(plugin);
        self
    }

    /// Fails with `KindMismatch` if a plugin reports a kind other than
    /// the one its slot holds.
    pub fn build(self) -> Result<Context<S>, TrellisError> {
        for kind in PluginKind::iter() {
            if let Some(plugin) = self.context.slot(kind) {
                let found = plugin.kind();
                if found != kind {
                    return Err(TrellisError::KindMismatch {
                        slot: kind.slot_name(),
                        expected: kind,
                        found,
                    });
                }
            }
        }
        Ok(self.context)
    }
}

#[cfg(test)]
mod tests {
    use trellis_test_utils::{Journal, MockCache, MockInit, Probe, ProbePlugin, RecordingLogger};

    use super::*;

    fn init() -> Arc<dyn InitPlugin> {
        Arc::new(MockInit::new("urn:uuid:c0"))
    }

    #[test]
    fn init_alone_is_a_valid_context() {
        let ctx = Context::<DefaultSlots>::new(init()).unwrap();
        assert_eq!(ctx.kinds(), vec![PluginKind::Init]);
        assert!(ctx.cache().is_none());
        assert!(ctx.plugin(PluginKind::Storage).is_none());
        assert_eq!(ctx.plugin(PluginKind::Init).unwrap().kind(), PluginKind::Init);
    }

    #[test]
    fn plugin_in_the_wrong_slot_is_rejected() {
        let impostor = Arc::new(ProbePlugin::new(PluginKind::Cache));
        let err = Context::<DefaultSlots>::builder(init())
            .with_hooks(impostor)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            TrellisError::KindMismatch {
                slot: "hooks",
                expected: PluginKind::Hook,
                found: PluginKind::Cache,
            }
        ));
    }

    #[tokio::test]
    async fn activation_follows_the_given_order() {
        let journal = Journal::new();
        let cache = Arc::new(
            MockCache::new().with_probe(Probe::new("cache").with_journal(journal.clone())),
        );
        let log = Arc::new(
            RecordingLogger::new().with_probe(Probe::new("log").with_journal(journal.clone())),
        );
        let ctx = Context::<DefaultSlots>::builder(init())
            .with_cache(cache.clone())
            .with_log(log.clone())
            .build()
            .unwrap();

        ctx.activate_in(&[PluginKind::Logging, PluginKind::Cache])
            .await
            .unwrap();
        ctx.deactivate_in(&[PluginKind::Cache, PluginKind::Logging])
            .await
            .unwrap();

        assert_eq!(
            journal.entries(),
            vec!["log:activate", "cache:activate", "cache:deactivate", "log:deactivate"]
        );
    }

    #[tokio::test]
    async fn empty_slot_in_order_activates_nothing() {
        let cache = Arc::new(MockCache::new());
        let ctx = Context::<DefaultSlots>::builder(init())
            .with_cache(cache.clone())
            .build()
            .unwrap();

        let err = ctx
            .activate_in(&[PluginKind::Cache, PluginKind::Storage])
            .await
            .unwrap_err();
        assert!(matches!(err, TrellisError::MissingSlot { slot: "store" }));
        assert_eq!(cache.probe().setups(), 0);
    }

    #[tokio::test]
    async fn activation_stops_at_first_failure() {
        let cache = Arc::new(MockCache::new());
        let log = Arc::new(RecordingLogger::new());
        let hooks = Arc::new(ProbePlugin::new(PluginKind::Hook));
        cache.probe().fail_next_activation();

        let ctx = Context::<DefaultSlots>::builder(init())
            .with_cache(cache.clone())
            .with_log(log.clone())
            .with_hooks(hooks.clone())
            .build()
            .unwrap();

        let err = ctx
            .activate_in(&[PluginKind::Logging, PluginKind::Cache, PluginKind::Hook])
            .await
            .unwrap_err();
        assert!(matches!(err, TrellisError::Lifecycle { .. }));
        assert!(log.is_activated().await);
        assert!(cache.is_deactivated().await);
        assert_eq!(hooks.probe().setups(), 0);
    }

    #[test]
    fn narrowed_slots_keep_concrete_types() {
        struct CacheOnly;
        impl Slots for CacheOnly {
            type Authn = DynAuthenticationPlugin;
            type Backups = DynBackupPlugin;
            type Cache = MockCache;
            type Chat = dyn ChatPlugin;
            type Config = DynConfigurationPlugin;
            type Email = dyn SmtpPlugin;
            type Exec = DynExecutionPlugin;
            type Fax = dyn FaxPlugin;
            type Hooks = DynHookPlugin;
            type Log = dyn LoggingPlugin;
            type Mms = dyn MmsPlugin;
            type Store = dyn StoragePlugin;
        }

        let ctx = Context::<CacheOnly>::builder(init())
            .with_cache(Arc::new(MockCache::new()))
            .build()
            .unwrap();
        // Inherent `MockCache` API, not only the cache contract.
        let cache: &Arc<MockCache> = ctx.cache().unwrap();
        assert!(cache.is_empty());
        assert_eq!(ctx.kinds(), vec![PluginKind::Cache, PluginKind::Init]);
    }
}
