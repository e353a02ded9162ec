use netreach::cli::Cli;
use netreach::config::Config;
use netreach::core::network::{
    run_feed, ActiveNetwork, AttachableAsyncQuery, ConnectivityClassifier, ConnectivityStateMachine,
    HostReachabilityProbe, LinkState, NetworkType, QueryStatus, ReachabilityProbe, SnapshotSource,
    StatusRenderer,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse_args();

    if cli.init {
        let path = Config::init()?;
        println!("Configuration at {}", path.display());
        return Ok(());
    }

    let mut config = Config::load()?;
    if let Some(host) = cli.host {
        config.host = Some(host);
    }

    if cli.print {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    if cli.check {
        config.check()?;
        println!("✓ Configuration valid");
        return Ok(());
    }

    config.check()?;
    let probe: Arc<dyn ReachabilityProbe> = Arc::new(HostReachabilityProbe::from_config(&config)?);

    if let Some(host) = cli.probe {
        // Desktop hosts have no platform connectivity service; treat the machine as attached
        let source = Arc::new(SnapshotSource::new(
            Some(ActiveNetwork {
                network_type: NetworkType::Ethernet,
                link: LinkState::Connected,
            }),
            None,
        ));
        let classifier = ConnectivityClassifier::new(source.clone(), source);

        let query = AttachableAsyncQuery::start(host, classifier, probe, None)?;
        let result = query.wait().await;
        println!("{}", StatusRenderer::new().render_query(&result));

        if result.status != QueryStatus::Ok {
            std::process::exit(1);
        }
        return Ok(());
    }

    if cli.watch {
        return watch(config, probe).await;
    }

    Ok(())
}

async fn watch(config: Config, probe: Arc<dyn ReachabilityProbe>) -> Result<(), Box<dyn std::error::Error>> {
    let source = Arc::new(SnapshotSource::default());
    let classifier = ConnectivityClassifier::new(source.clone(), source.clone());
    let machine = ConnectivityStateMachine::new(
        classifier,
        probe,
        config.probe_host().map(str::to_string),
        config.event_capacity,
    )?;

    let mut subscription = machine.subscribe();
    let printer = tokio::spawn(async move {
        while let Some(result) = subscription.recv().await {
            match serde_json::to_string(&result) {
                Ok(line) => println!("{}", line),
                Err(e) => eprintln!("Failed to encode result: {}", e),
            }
        }
    });

    run_feed(BufReader::new(tokio::io::stdin()), &source, &machine).await?;

    // Let the last probe publish before the sink closes
    while machine.is_probe_in_flight() {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    drop(machine);
    printer.await?;

    Ok(())
}
