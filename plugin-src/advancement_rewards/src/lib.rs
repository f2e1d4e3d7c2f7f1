//! Advancement Rewards plugin
//!
//! Awards LevelZ skill points when a player unlocks an advancement that is announced in chat:
//! - **by frame**: fixed points for task / goal / challenge advancements
//! - **by record**: per-advancement JSON files naming a skill and an amount
//!
//! Rewards are applied with `/playerstats <player> add <skill> <amount>` and the player
//! is told about them one tick later.

mod config;
mod events;
mod handler;
mod host;
mod notify;
mod scheduler;
mod store;
mod text;

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::{Arc, PoisonError, RwLock};

use tokio::task::JoinHandle;

pub use config::{CommandConfig, ConfigError, NotificationConfig, RewardsConfig, StorageConfig};
pub use events::{
    Advancement, AdvancementDisplay, AdvancementFrame, AdvancementId, EventHandler, Player,
    PlayerAdvancementEvent,
};
pub use handler::{
    AdvancementRewardHandler, Grant, RewardReport, RewardSource, RewardWarning, SkipReason,
};
pub use host::{CommandDispatcher, RewardHost, ScheduledTask, Scheduler, StatCommand};
pub use notify::Notification;
pub use scheduler::{TICK_DURATION, TickScheduler};
pub use store::{JsonRewardStore, RewardRecord, RewardStore, StoreError, sanitize_id};
pub use text::{LangError, LangTranslator, TextArg, TranslatableText, Translator};

pub const PLUGIN_NAME: &str = "advancement_rewards";

type AdvancementHandlers = RwLock<Vec<Arc<dyn EventHandler<PlayerAdvancementEvent>>>>;

// ---------------------------------------------------------------------------
// Plugin lifecycle
// ---------------------------------------------------------------------------

/// Lifecycle hooks the server calls when it loads and unloads the plugin.
pub trait Plugin: Send {
    fn on_load(
        &mut self,
        context: Arc<Context>,
    ) -> Pin<Box<dyn Future<Output = Result<(), String>> + Send + '_>>;

    fn on_unload(
        &mut self,
        context: Arc<Context>,
    ) -> Pin<Box<dyn Future<Output = Result<(), String>> + Send + '_>>;
}

// ---------------------------------------------------------------------------
// Server context
// ---------------------------------------------------------------------------

/// What the server gives the plugin on load.
pub struct Context {
    data_folder: PathBuf,
    commands: Arc<dyn CommandDispatcher>,
    scheduler: Option<Arc<dyn Scheduler>>,
    advancement_handlers: AdvancementHandlers,
}

impl Context {
    pub fn new(data_folder: impl Into<PathBuf>, commands: Arc<dyn CommandDispatcher>) -> Self {
        Self {
            data_folder: data_folder.into(),
            commands,
            scheduler: None,
            advancement_handlers: RwLock::new(Vec::new()),
        }
    }

    /// Use the server's tick scheduler instead of one driven by the plugin.
    #[must_use]
    pub fn with_scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    #[must_use]
    pub fn get_data_folder(&self) -> PathBuf {
        self.data_folder.clone()
    }

    pub fn register_event(&self, handler: Arc<dyn EventHandler<PlayerAdvancementEvent>>) {
        self.advancement_handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handler);
    }

    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.advancement_handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Run every registered handler for the event, in registration order.
    pub async fn fire(&self, event: &PlayerAdvancementEvent) {
        let handlers = self
            .advancement_handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for handler in handlers {
            handler.handle(event).await;
        }
    }
}

// ---------------------------------------------------------------------------
// Tick driver
// ---------------------------------------------------------------------------

/// Scheduler owned by the plugin when the server doesn't provide one.
struct TickDriver {
    runtime: Option<tokio::runtime::Runtime>,
    task: JoinHandle<()>,
}

impl Drop for TickDriver {
    fn drop(&mut self) {
        self.task.abort();
        // Plain drop blocks, which panics when unloading from async code.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct AdvancementRewardsPlugin {
    handler: Option<Arc<AdvancementRewardHandler>>,
    driver: Option<TickDriver>,
}

impl AdvancementRewardsPlugin {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn handler(&self) -> Option<&Arc<AdvancementRewardHandler>> {
        self.handler.as_ref()
    }

    fn build_handler(&mut self, context: &Context) -> Result<Arc<AdvancementRewardHandler>, String> {
        let data_folder = context.get_data_folder();

        let config = RewardsConfig::load(&data_folder.join("config.toml")).map_err(|e| {
            log::error!("{PLUGIN_NAME}: Failed to load config: {e}");
            e.to_string()
        })?;

        let translator = match config.lang_file(&data_folder) {
            Some(path) => LangTranslator::bundled_with_overrides(&path),
            None => LangTranslator::bundled(),
        }
        .map_err(|e| {
            log::error!("{PLUGIN_NAME}: Failed to load lang file: {e}");
            e.to_string()
        })?;

        let scheduler = match &context.scheduler {
            Some(scheduler) => Arc::clone(scheduler),
            None => self.start_tick_driver()?,
        };

        let store = JsonRewardStore::new(config.reward_dir(&data_folder));
        log::info!("{PLUGIN_NAME}: Reading reward records from {:?}", store.dir());

        let host = RewardHost {
            commands: Arc::clone(&context.commands),
            scheduler,
            translator: Arc::new(translator),
            store: Arc::new(store),
        };
        Ok(Arc::new(AdvancementRewardHandler::new(config, host)))
    }

    fn start_tick_driver(&mut self) -> Result<Arc<dyn Scheduler>, String> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_time()
            .thread_name("advancement-rewards-rt")
            .build()
            .map_err(|e| {
                log::error!("{PLUGIN_NAME}: Failed to create tokio runtime: {e}");
                format!("create runtime: {e}")
            })?;

        let scheduler = Arc::new(TickScheduler::new());
        let task = {
            let _guard = runtime.enter();
            scheduler.spawn()
        };
        self.driver = Some(TickDriver {
            runtime: Some(runtime),
            task,
        });
        let scheduler: Arc<dyn Scheduler> = scheduler;
        Ok(scheduler)
    }
}

impl Plugin for AdvancementRewardsPlugin {
    fn on_load(
        &mut self,
        context: Arc<Context>,
    ) -> Pin<Box<dyn Future<Output = Result<(), String>> + Send + '_>> {
        let handler = match self.build_handler(&context) {
            Ok(handler) => handler,
            Err(e) => return Box::pin(async move { Err(e) }),
        };

        Box::pin(async move {
            context.register_event(handler.clone());
            self.handler = Some(handler);
            log::info!("{PLUGIN_NAME}: Loaded successfully");
            Ok(())
        })
    }

    fn on_unload(
        &mut self,
        _context: Arc<Context>,
    ) -> Pin<Box<dyn Future<Output = Result<(), String>> + Send + '_>> {
        Box::pin(async move {
            self.handler = None;
            if self.driver.take().is_some() {
                log::info!("{PLUGIN_NAME}: Tick driver stopped");
            }
            log::info!("{PLUGIN_NAME}: Unloaded");
            Ok(())
        })
    }
}
