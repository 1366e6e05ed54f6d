use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use orand_publisher::config::{
    PublisherConfig, ENV_CONSUMER_ADDRESS, ENV_PROVIDER_ADDRESS, ENV_RPC_URL,
};
use orand_publisher::contract::AlloyConnector;
use orand_publisher::telemetry::{init_telemetry, TelemetryConfig};
use orand_publisher::{codec, EpochPublisher, EpochRecord, PublisherRegistry};

fn print_help() {
    eprintln!(
        "\
orand-publisher

USAGE:
  orand-publisher <command> [options]

COMMANDS:
  transform                       Print the structured proof for an epoch file
  verify                          Verify an epoch against the provider contract
  publish                         Publish an epoch (genesis or continuation)

COMMON OPTIONS:
  --epoch-file <path>             (required) JSON epoch record from the prover

verify / publish OPTIONS:
  --rpc-url <url>                 (defaults to env RPC_URL)
  --provider-address <address>    (defaults to env ORAND_PROVIDER_ADDRESS)
  --consumer-address <address>    (defaults to env ORAND_CONSUMER_ADDRESS)

publish OPTIONS:
  --wait                          Wait for the transaction receipt

ENV:
  WALLET_PRIVATE_KEY              (required for publish)
  ORAND_CALL_TIMEOUT_SECS         (default: 30)
  ORAND_RECEIPT_TIMEOUT_SECS      (default: 120)
  LOG_LEVEL / RUST_LOG, LOG_JSON
"
    );
}

#[derive(Default)]
struct Options {
    epoch_file: Option<PathBuf>,
    overrides: HashMap<&'static str, String>,
    wait: bool,
}

/// Parse command options; `Ok(None)` means help was requested.
fn parse_options(
    command: &str,
    args: &mut VecDeque<String>,
) -> anyhow::Result<Option<Options>> {
    let network = matches!(command, "verify" | "publish");
    let mut options = Options::default();

    while let Some(arg) = args.pop_front() {
        match arg.as_str() {
            "--epoch-file" => {
                let raw = args
                    .pop_front()
                    .ok_or_else(|| anyhow::anyhow!("missing value for --epoch-file"))?;
                options.epoch_file = Some(PathBuf::from(raw));
            }
            "--rpc-url" if network => {
                let raw = args
                    .pop_front()
                    .ok_or_else(|| anyhow::anyhow!("missing value for --rpc-url"))?;
                options.overrides.insert(ENV_RPC_URL, raw);
            }
            "--provider-address" if network => {
                let raw = args
                    .pop_front()
                    .ok_or_else(|| anyhow::anyhow!("missing value for --provider-address"))?;
                options.overrides.insert(ENV_PROVIDER_ADDRESS, raw);
            }
            "--consumer-address" if network => {
                let raw = args
                    .pop_front()
                    .ok_or_else(|| anyhow::anyhow!("missing value for --consumer-address"))?;
                options.overrides.insert(ENV_CONSUMER_ADDRESS, raw);
            }
            "--wait" if command == "publish" => options.wait = true,
            "-h" | "--help" => {
                print_help();
                return Ok(None);
            }
            other => anyhow::bail!("unexpected argument for {command}: {other}"),
        }
    }

    Ok(Some(options))
}

fn read_epoch(path: Option<&Path>) -> anyhow::Result<EpochRecord> {
    let path = path.ok_or_else(|| anyhow::anyhow!("--epoch-file is required"))?;
    EpochRecord::from_file(path)
        .map_err(|e| anyhow::anyhow!("failed to load {}: {e}", path.display()))
}

fn load_config(options: &Options) -> anyhow::Result<PublisherConfig> {
    let config = PublisherConfig::from_lookup(|name| {
        options
            .overrides
            .get(name)
            .cloned()
            .or_else(|| std::env::var(name).ok())
    })?;
    Ok(config)
}

async fn acquire(config: &PublisherConfig) -> anyhow::Result<Arc<EpochPublisher>> {
    let registry = PublisherRegistry::new(Arc::new(AlloyConnector::new(config.timeouts)));
    let publisher = registry
        .acquire(
            &config.rpc_url,
            config.provider_address,
            config.consumer_address,
        )
        .await?;
    Ok(publisher)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut args: VecDeque<String> = std::env::args().skip(1).collect();
    let Some(command) = args.pop_front() else {
        print_help();
        return Ok(());
    };

    if matches!(command.as_str(), "-h" | "--help" | "help") {
        print_help();
        return Ok(());
    }

    init_telemetry(&TelemetryConfig::from_env())
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    if !matches!(command.as_str(), "transform" | "verify" | "publish") {
        anyhow::bail!("unknown command: {command} (see --help)");
    }

    let Some(options) = parse_options(&command, &mut args)? else {
        return Ok(());
    };
    let record = read_epoch(options.epoch_file.as_deref())?;

    match command.as_str() {
        "transform" => {
            let proof = codec::transform(&record)?;
            println!("{}", serde_json::to_string_pretty(&proof)?);
            Ok(())
        }
        "verify" => {
            let config = load_config(&options)?;
            let publisher = acquire(&config).await?;
            let result = publisher.verify(&record).await?;
            println!("{}", serde_json::to_string_pretty(&result.to_json())?);
            Ok(())
        }
        "publish" => {
            let config = load_config(&options)?;
            let signer = config.signer()?;
            let publisher = acquire(&config).await?;

            let submitted = publisher.publish(&record, &signer).await?;
            println!("{}", serde_json::to_string_pretty(&submitted.to_json())?);

            if options.wait {
                let receipt = publisher.confirm(&submitted).await?;
                println!("{}", serde_json::to_string_pretty(&receipt.to_json())?);
            }
            Ok(())
        }
        other => anyhow::bail!("unknown command: {other}"),
    }
}
