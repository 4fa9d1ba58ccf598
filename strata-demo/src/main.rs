mod dialogs;
mod paths;

use std::fs::File;
use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use simplelog::{Config, LevelFilter, WriteLogger};
use strata::headless::{
    HeadlessAnimator, HeadlessIndicator, HeadlessSurface, MemoryResources, template,
};
use strata::prelude::*;
use strata::global;

use dialogs::{AudioSettings, Confirm};

fn init_logging() {
    let path = paths::prepare_log_file().unwrap_or_else(|| "strata-demo.log".into());
    match File::create(&path) {
        Ok(file) => {
            if let Err(e) = WriteLogger::init(LevelFilter::Debug, Config::default(), file) {
                eprintln!("Failed to initialize logger: {}", e);
            }
        }
        Err(e) => eprintln!("Failed to create log file {}: {}", path.display(), e),
    }
}

fn load_config() -> LayerConfig {
    let Some(path) = paths::config_file().filter(|p| p.exists()) else {
        return LayerConfig::default();
    };
    match LayerConfig::load(&path) {
        Ok(config) => {
            info!("Loaded layer config from {}", path.display());
            config
        }
        Err(e) => {
            warn!("Ignoring {}: {}", path.display(), e);
            LayerConfig::default()
        }
    }
}

fn register_templates(resources: &MemoryResources, tips: &HeadlessSurface, config: &LayerConfig) {
    resources.cache("prefab/home", template(|| Instance::new("Home")));
    resources.cache("prefab/battle", template(|| Instance::new("Battle")));
    resources.remote(
        config.dialog_id("DlgSettings"),
        template(|| Instance::new("DlgSettings").dialog(AudioSettings::default())),
    );
    resources.cache(
        config.dialog_id("DlgConfirm"),
        template(|| Instance::new("DlgConfirm").dialog(Confirm::default())),
    );
    resources.remote(config.tip_template.clone(), tips.tip_template("Tip"));
}

async fn run(layers: &LayerManager, dialogs: &HeadlessSurface) -> Result<(), LayerError> {
    layers.enter_main("prefab/home")?;

    let (settings, again) = tokio::join!(
        layers.open_unique_dialog_async("DlgSettings", Args::new().arg("audio")),
        layers.open_unique_dialog_async("DlgSettings", Args::new().arg("audio")),
    );
    println!(
        "Settings opened {} time(s)",
        [settings?, again?].iter().flatten().count()
    );

    layers.show_tip(TipData::new("Settings saved").unique()).await?;
    layers.show_tip(TipData::new("Settings saved").unique()).await?;
    println!("Tips created: {}", layers.tips().created());

    let closed = layers.wait_close_dialog("DlgSettings");
    layers.dismiss_dialog("DlgSettings", Args::new());
    closed.await?;
    println!("Settings closed, {} dialog(s) left", dialogs.len());

    let confirm = layers.open_dialog("DlgConfirm", Args::new().arg("Leave town?"))?;
    let answered = confirm.wait_close();
    confirm.close(&Args::new().arg(true));
    answered.await?;

    tokio::time::sleep(Duration::from_secs(2)).await;
    println!("Tips idle in pool: {}", layers.tips().available());

    layers.open_dialog("DlgConfirm", Args::new().arg("Start battle?"))?;
    let abandoned = layers.wait_close_dialog("DlgConfirm");
    layers.enter_main("prefab/battle")?;
    if let Err(e) = abandoned.await {
        println!("Pending prompt: {}", e);
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    init_logging();
    let config = load_config();

    let tips = HeadlessSurface::new();
    let dialogs = HeadlessSurface::new();
    let loading = HeadlessIndicator::new();
    let resources = Arc::new(MemoryResources::new().with_latency(Duration::from_millis(150)));
    register_templates(&resources, &tips, &config);

    let layers = LayerManager::new(
        Surfaces {
            main: Box::new(HeadlessSurface::new()),
            dialog: Box::new(dialogs.clone()),
            tip: Box::new(tips.clone()),
            loading: Box::new(loading.clone()),
        },
        resources,
        Arc::new(
            HeadlessAnimator::new()
                .with_clip_length(Duration::from_millis(300))
                .with_tween_target(tips),
        ),
        config,
    );
    layers.on_error(|e| eprintln!("Layer error: {}", e));
    global::install(layers.clone());

    if let Err(e) = run(&layers, &dialogs).await {
        eprintln!("Error: {}", e);
    }

    layers.shutdown();
    global::uninstall();
}
