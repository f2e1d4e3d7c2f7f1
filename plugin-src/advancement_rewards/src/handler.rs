//! The advancement reward handler.
//!
//! Two independent reward paths run for every announced advancement:
//! - by frame: a fixed amount of points per task / goal / challenge
//! - by record: the per-advancement JSON record in the reward store
//!
//! Both may fire for the same event and their rewards add up.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::config::RewardsConfig;
use crate::events::{AdvancementFrame, EventHandler, Player, PlayerAdvancementEvent};
use crate::host::{RewardHost, StatCommand};
use crate::notify::Notification;
use crate::store::RewardRecord;

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// Why an event produced no rewards at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Recipe unlocks and tree roots have no display.
    NoDisplay,
    NotAnnounced,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewardSource {
    Frame(AdvancementFrame),
    Record,
}

/// One stat command issued for an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    pub source: RewardSource,
    pub skill: String,
    pub points: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewardWarning {
    UnknownFrame(String),
    UnreadableRecord(String),
    InvalidSkill(String),
    DefaultWriteFailed(String),
}

/// What the handler did for one event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewardReport {
    pub skipped: Option<SkipReason>,
    pub grants: Vec<Grant>,
    pub default_written: bool,
    pub warnings: Vec<RewardWarning>,
}

impl RewardReport {
    fn skipped(reason: SkipReason) -> Self {
        Self {
            skipped: Some(reason),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn total_points(&self) -> i64 {
        self.grants
            .iter()
            .fold(0i64, |total, grant| total.saturating_add(grant.points))
    }
}

// ---------------------------------------------------------------------------
// Handler
// ---------------------------------------------------------------------------

pub struct AdvancementRewardHandler {
    config: RewardsConfig,
    host: RewardHost,
}

impl AdvancementRewardHandler {
    #[must_use]
    pub fn new(config: RewardsConfig, host: RewardHost) -> Self {
        Self { config, host }
    }

    #[must_use]
    pub fn config(&self) -> &RewardsConfig {
        &self.config
    }

    /// Apply every reward the event qualifies for.
    ///
    /// Only advancements that announce to chat are rewarded. Hidden advancements
    /// are rewarded too, as long as they are announced.
    pub fn process(&self, event: &PlayerAdvancementEvent) -> RewardReport {
        let advancement = &event.advancement;
        let Some(display) = &advancement.display else {
            return RewardReport::skipped(SkipReason::NoDisplay);
        };
        if !display.announce_to_chat {
            return RewardReport::skipped(SkipReason::NotAnnounced);
        }

        if self.config.debug {
            log::info!(
                "advancement_rewards: Advancement obtained: {} (\"{}\"), type: \"{}\", player: {} ({})",
                advancement.title(),
                advancement.id,
                display.frame,
                event.player.name(),
                event.player.uuid(),
            );
        }

        let mut report = RewardReport::default();
        if self.config.simple_advancement_points {
            self.reward_frame(event, &display.frame, &mut report);
        }
        if self.config.individual_advancement_points {
            self.reward_record(event, &mut report);
        }
        report
    }

    fn reward_frame(
        &self,
        event: &PlayerAdvancementEvent,
        frame: &AdvancementFrame,
        report: &mut RewardReport,
    ) {
        let points = match frame {
            AdvancementFrame::Task => self.config.task_points,
            AdvancementFrame::Goal => self.config.goal_points,
            AdvancementFrame::Challenge => self.config.challenge_points,
            AdvancementFrame::Other(name) => {
                log::warn!("advancement_rewards: Unknown advancement type: {name}");
                report.warnings.push(RewardWarning::UnknownFrame(name.clone()));
                return;
            }
        };
        if points > 0 {
            let grant = Grant {
                source: RewardSource::Frame(frame.clone()),
                skill: "points".into(),
                points,
            };
            self.award(event.get_player(), grant, Notification::Points(points), report);
        }
    }

    fn reward_record(&self, event: &PlayerAdvancementEvent, report: &mut RewardReport) {
        let id = &event.advancement.id;
        let record = match self.host.store.read(id) {
            Ok(Some(record)) => record,
            Ok(None) => {
                if self.config.write_default_reward_data {
                    match self.host.store.write_default(id, &RewardRecord::default()) {
                        Ok(()) => {
                            report.default_written = true;
                            if self.config.debug {
                                log::info!("advancement_rewards: Wrote default reward record for {id}");
                            }
                        }
                        Err(e) => {
                            log::warn!("advancement_rewards: Could not write default reward for {id}: {e}");
                            report
                                .warnings
                                .push(RewardWarning::DefaultWriteFailed(e.to_string()));
                        }
                    }
                }
                return;
            }
            // Left on disk untouched so a half-finished edit isn't lost.
            Err(e) => {
                log::warn!("advancement_rewards: Ignoring reward record for {id}: {e}");
                report
                    .warnings
                    .push(RewardWarning::UnreadableRecord(e.to_string()));
                return;
            }
        };

        if record.points <= 0 {
            return;
        }
        if !record.has_valid_skill() {
            log::warn!(
                "advancement_rewards: Reward record for {id} names invalid skill {:?}",
                record.skill
            );
            report
                .warnings
                .push(RewardWarning::InvalidSkill(record.skill.clone()));
            return;
        }

        let notification = Notification::for_stat(&record.skill, record.points);
        let grant = Grant {
            source: RewardSource::Record,
            skill: record.skill,
            points: record.points,
        };
        self.award(event.get_player(), grant, notification, report);
    }

    /// Issue the stat command now and tell the player after the notification delay.
    fn award(
        &self,
        player: &Arc<dyn Player>,
        grant: Grant,
        notification: Notification,
        report: &mut RewardReport,
    ) {
        let command = StatCommand {
            root: &self.config.commands.stat_command,
            player: player.name(),
            skill: &grant.skill,
            amount: grant.points,
        };
        self.host.commands.run_command_silent(&command.to_string());

        let player = Arc::clone(player);
        let translator = Arc::clone(&self.host.translator);
        let text = notification.to_text();
        self.host.scheduler.schedule(
            self.config.notifications.delay_ticks,
            Box::new(move || player.send_system_message(&translator.translate(&text))),
        );

        report.grants.push(grant);
    }
}

// ---------------------------------------------------------------------------
// Event handler
// ---------------------------------------------------------------------------

impl EventHandler<PlayerAdvancementEvent> for AdvancementRewardHandler {
    fn handle<'a>(
        &'a self,
        event: &'a PlayerAdvancementEvent,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(async move {
            let report = self.process(event);
            if self.config.debug && !report.grants.is_empty() {
                log::info!(
                    "advancement_rewards: {} earned {} points across {} rewards for {}",
                    event.player.name(),
                    report.total_points(),
                    report.grants.len(),
                    event.advancement.id,
                );
            }
        })
    }
}
