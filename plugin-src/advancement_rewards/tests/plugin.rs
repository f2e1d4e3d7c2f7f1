use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use advancement_rewards::{
    Advancement, AdvancementDisplay, AdvancementFrame, AdvancementId, AdvancementRewardsPlugin,
    CommandDispatcher, Context, Player, PlayerAdvancementEvent, Plugin, TickScheduler,
};
use tempfile::tempdir;
use uuid::Uuid;

#[derive(Default)]
struct Console(Mutex<Vec<String>>);

impl CommandDispatcher for Console {
    fn run_command_silent(&self, command: &str) {
        self.0.lock().unwrap().push(command.to_string());
    }
}

impl Console {
    fn commands(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

#[derive(Default)]
struct Alex(Mutex<Vec<String>>);

impl Player for Alex {
    fn name(&self) -> &str {
        "Alex"
    }

    fn uuid(&self) -> Uuid {
        Uuid::from_u128(0xec56_1538_f3fd_461d_aff5_086b_2215_4bce)
    }

    fn send_system_message(&self, message: &str) {
        self.0.lock().unwrap().push(message.to_string());
    }
}

impl Alex {
    fn messages(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

fn advancement(id: &str, frame: AdvancementFrame, announce: bool) -> Advancement {
    Advancement {
        id: AdvancementId::new(id),
        display: Some(AdvancementDisplay {
            title: "Test".into(),
            frame,
            hidden: false,
            announce_to_chat: announce,
        }),
    }
}

struct Server {
    console: Arc<Console>,
    scheduler: Arc<TickScheduler>,
    player: Arc<Alex>,
    context: Arc<Context>,
    plugin: AdvancementRewardsPlugin,
}

impl Server {
    async fn start(data_folder: &Path) -> Self {
        let console = Arc::new(Console::default());
        let scheduler = Arc::new(TickScheduler::new());
        let context = Arc::new(
            Context::new(data_folder, console.clone()).with_scheduler(scheduler.clone()),
        );
        let mut plugin = AdvancementRewardsPlugin::new();
        plugin.on_load(context.clone()).await.unwrap();
        Self {
            console,
            scheduler,
            player: Arc::new(Alex::default()),
            context,
            plugin,
        }
    }

    async fn grant(&self, advancement: Advancement) {
        let event = PlayerAdvancementEvent::new(self.player.clone(), advancement);
        self.context.fire(&event).await;
    }
}

#[tokio::test]
async fn first_load_writes_default_config() {
    let dir = tempdir().unwrap();
    let server = Server::start(dir.path()).await;

    assert!(dir.path().join("config.toml").is_file());
    assert_eq!(server.context.handler_count(), 1);
    let config = server.plugin.handler().unwrap().config();
    assert_eq!(config.task_points, 1);
    assert!(config.write_default_reward_data);
}

#[tokio::test]
async fn unannounced_advancement_changes_nothing() {
    let dir = tempdir().unwrap();
    let server = Server::start(dir.path()).await;

    server
        .grant(advancement(
            "minecraft:story/mine_stone",
            AdvancementFrame::Task,
            false,
        ))
        .await;
    server.scheduler.tick();

    assert!(server.console.commands().is_empty());
    assert!(server.player.messages().is_empty());
    assert!(!dir.path().join("kubejs").exists());
}

#[tokio::test]
async fn announced_advancement_rewards_and_writes_placeholder() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), "task_points = 50\n").unwrap();
    let server = Server::start(dir.path()).await;

    server
        .grant(advancement(
            "minecraft:story/mine_stone",
            AdvancementFrame::Task,
            true,
        ))
        .await;

    assert_eq!(server.console.commands(), ["/playerstats Alex add points 50"]);
    assert!(server.player.messages().is_empty());
    server.scheduler.tick();
    assert_eq!(
        server.player.messages(),
        ["You have been awarded 50 skill points!"]
    );

    let placeholder = dir
        .path()
        .join("kubejs/script_data/advancement_rewards/minecraft-story-mine_stone.json");
    assert_eq!(
        fs::read_to_string(placeholder).unwrap(),
        r#"{"skill":"points","points":0}"#
    );
}

#[tokio::test]
async fn edited_record_adds_to_frame_reward() {
    let dir = tempdir().unwrap();
    let rewards = dir.path().join("kubejs/script_data/advancement_rewards");
    fs::create_dir_all(&rewards).unwrap();
    fs::write(
        rewards.join("minecraft-story-smelt_iron.json"),
        r#"{ "skill": "mining", "points": 10 }"#,
    )
    .unwrap();
    let server = Server::start(dir.path()).await;

    server
        .grant(advancement(
            "minecraft:story/smelt_iron",
            AdvancementFrame::Goal,
            true,
        ))
        .await;
    server.scheduler.tick();

    assert_eq!(
        server.console.commands(),
        [
            "/playerstats Alex add points 2",
            "/playerstats Alex add mining 10",
        ]
    );
    assert_eq!(
        server.player.messages(),
        [
            "You have been awarded 2 skill points!",
            "You have been awarded 10 points in Mining!",
        ]
    );
}

#[tokio::test]
async fn custom_frame_is_ignored_by_frame_rewards() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("config.toml"),
        "individual_advancement_points = false\n",
    )
    .unwrap();
    let server = Server::start(dir.path()).await;

    server
        .grant(advancement(
            "mymod:quests/first",
            AdvancementFrame::from_name("custom"),
            true,
        ))
        .await;

    assert!(server.console.commands().is_empty());
    assert_eq!(server.scheduler.pending(), 0);
}

#[tokio::test]
async fn malformed_record_is_left_alone() {
    let dir = tempdir().unwrap();
    let rewards = dir.path().join("kubejs/script_data/advancement_rewards");
    fs::create_dir_all(&rewards).unwrap();
    let record = rewards.join("minecraft-story-smelt_iron.json");
    fs::write(&record, r#"{ "skill": "mining", "points": }"#).unwrap();
    fs::write(
        dir.path().join("config.toml"),
        "simple_advancement_points = false\n",
    )
    .unwrap();
    let server = Server::start(dir.path()).await;

    server
        .grant(advancement(
            "minecraft:story/smelt_iron",
            AdvancementFrame::Task,
            true,
        ))
        .await;

    assert!(server.console.commands().is_empty());
    assert_eq!(
        fs::read_to_string(&record).unwrap(),
        r#"{ "skill": "mining", "points": }"#
    );
}

#[tokio::test]
async fn lang_override_and_reward_dir_from_config() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("config.toml"),
        r#"simple_advancement_points = false

[storage]
reward_dir = "rewards"

[notifications]
lang_file = "de_de.json"
"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("de_de.json"),
        r#"{
  "valhelsia.advancement_levels.skills.awarded": "Du erhältst %s Punkte in %s!",
  "spritetip.levelz.archery_skill": "Bogenschießen"
}"#,
    )
    .unwrap();
    fs::create_dir_all(dir.path().join("rewards")).unwrap();
    fs::write(
        dir.path().join("rewards/minecraft-adventure-shoot_arrow.json"),
        r#"{"skill":"archery","points":3}"#,
    )
    .unwrap();
    let server = Server::start(dir.path()).await;

    server
        .grant(advancement(
            "minecraft:adventure/shoot_arrow",
            AdvancementFrame::Task,
            true,
        ))
        .await;
    server.scheduler.tick();

    assert_eq!(server.console.commands(), ["/playerstats Alex add archery 3"]);
    assert_eq!(
        server.player.messages(),
        ["Du erhältst 3 Punkte in Bogenschießen!"]
    );
}

#[tokio::test]
async fn broken_config_fails_load() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), "debug = maybe\n").unwrap();
    let context = Arc::new(
        Context::new(dir.path(), Arc::new(Console::default()))
            .with_scheduler(Arc::new(TickScheduler::new())),
    );
    let mut plugin = AdvancementRewardsPlugin::new();

    assert!(plugin.on_load(context.clone()).await.is_err());
    assert_eq!(context.handler_count(), 0);
    assert!(plugin.handler().is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn plugin_drives_its_own_ticks_without_server_scheduler() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), "task_points = 4\n").unwrap();
    let console = Arc::new(Console::default());
    let context = Arc::new(Context::new(dir.path(), console.clone()));
    let mut plugin = AdvancementRewardsPlugin::new();
    plugin.on_load(context.clone()).await.unwrap();

    let player = Arc::new(Alex::default());
    let event = PlayerAdvancementEvent::new(
        player.clone(),
        advancement("minecraft:story/root", AdvancementFrame::Task, true),
    );
    context.fire(&event).await;
    assert_eq!(console.commands(), ["/playerstats Alex add points 4"]);

    for _ in 0..500 {
        if !player.messages().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(player.messages(), ["You have been awarded 4 skill points!"]);

    plugin.on_unload(context.clone()).await.unwrap();
    assert!(plugin.handler().is_none());
}
