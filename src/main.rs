use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio::task;
use topictree::topictree::{DemoConfig, SharedTopicTree, TopicPath, TopicPattern};

const CONFIG_FILE: &str = "config.toml";

fn init_logger() {
    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}:{}] {} - {}",
                buf.timestamp_millis(),
                record.module_path().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.level(),
                record.args()
            )
        })
        .init();
}

fn load_config() -> std::io::Result<DemoConfig> {
    if !Path::new(CONFIG_FILE).exists() {
        info!("No {} found, using the built-in news sample", CONFIG_FILE);
        return Ok(DemoConfig::news_sample());
    }

    match DemoConfig::from_toml_file(CONFIG_FILE) {
        Ok(config) => {
            info!("Configuration loaded successfully");
            Ok(config)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
        }
    }
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_logger();

    info!("Topictree demo starting up");
    let config = load_config()?;
    let tree = Arc::new(SharedTopicTree::new());

    // Each subscriber registers from its own task
    let mut handles = Vec::with_capacity(config.subscriptions.len());
    for entry in config.subscriptions {
        let tree = Arc::clone(&tree);
        let tree_config = config.tree.clone();
        handles.push(task::spawn(async move {
            let mut paths = Vec::with_capacity(entry.topics.len());
            for topic in &entry.topics {
                let path = TopicPath::parse(topic, tree_config.separator);
                match tree_config.validate_path(path.segments()) {
                    Ok(()) => paths.push(path),
                    Err(e) => warn!("Skipping {} for {}: {}", topic, entry.subscriber, e),
                }
            }
            let added = tree.subscribe_many::<_, String>(&entry.subscriber, paths.as_slice());
            debug!("{} registered on {} topics", entry.subscriber, added);
        }));
    }
    for handle in handles {
        if let Err(e) = handle.await {
            error!("Subscription task failed: {e}");
        }
    }

    info!("{} top-level topics registered", tree.shard_count());

    for query in &config.queries {
        let pattern = TopicPattern::parse(query, config.tree.separator);
        let mut subscribers: Vec<String> = tree.matches(&pattern).into_iter().collect();
        subscribers.sort();
        info!("{} -> {:?}", query, subscribers);
    }

    match serde_json::to_string_pretty(&tree.snapshot()) {
        Ok(dump) => debug!("Subscription table:\n{}", dump),
        Err(e) => error!("Failed to render subscription table: {}", e),
    }

    Ok(())
}
