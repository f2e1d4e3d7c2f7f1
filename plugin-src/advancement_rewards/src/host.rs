//! Server capabilities the reward handler calls into.
//!
//! The handler never reaches for server globals; everything it touches is passed in here.

use std::fmt;
use std::sync::Arc;

use crate::store::RewardStore;
use crate::text::Translator;

/// Runs server commands.
pub trait CommandDispatcher: Send + Sync {
    /// Run a command as the server without echoing output to operators.
    fn run_command_silent(&self, command: &str);
}

/// Deferred work run on a later server tick.
pub type ScheduledTask = Box<dyn FnOnce() + Send + 'static>;

/// Server tick scheduler.
pub trait Scheduler: Send + Sync {
    fn schedule(&self, delay_ticks: u32, task: ScheduledTask);
}

/// Bundle of capabilities handed to the reward handler at construction.
#[derive(Clone)]
pub struct RewardHost {
    pub commands: Arc<dyn CommandDispatcher>,
    pub scheduler: Arc<dyn Scheduler>,
    pub translator: Arc<dyn Translator>,
    pub store: Arc<dyn RewardStore>,
}

/// `/<root> <player> add <skill> <amount>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatCommand<'a> {
    pub root: &'a str,
    pub player: &'a str,
    pub skill: &'a str,
    pub amount: i64,
}

impl fmt::Display for StatCommand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/{} {} add {} {}",
            self.root, self.player, self.skill, self.amount
        )
    }
}
