//! netautoctl - preview and apply network intent
//!
//! Renders LAG, EVPN and interface changes for the configured platform
//! against a session seeded from an inventory snapshot, and optionally
//! pushes the result.

mod cli;
mod config_file;

use anyhow::{Context, Result};
use clap::Parser;
use netauto_model::{EvpnService, InventorySnapshot, Vlan, Vrf};
use netauto_reconcile::{EvpnManager, InterfaceManager, LagManager, Reconciler};
use netauto_render::Payload;
use netauto_session::{CommitResult, MockSession};
use std::fs;
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, EvpnCommand, InterfaceCommand, LagCommand, PushArgs, ServiceArgs};
use config_file::CtlConfig;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match CtlConfig::load_or_default(&cli.config).and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("netautoctl: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(cli.log_level.as_deref().unwrap_or(&config.logging.level));

    match run(cli, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();
}

fn load_snapshot(path: &Path) -> Result<InventorySnapshot> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse inventory {}", path.display()))
}

async fn run(cli: Cli, config: &CtlConfig) -> Result<()> {
    let family = config.family()?;
    let snapshot = match &cli.inventory {
        Some(path) => load_snapshot(path)?,
        None => InventorySnapshot::default(),
    };
    let mut session = MockSession::from_snapshot(family, &snapshot)
        .with_host(config.session.host.as_str())
        .with_context(config.context()?);
    info!(
        "Session {} on {} with {} interfaces",
        config.session.host,
        family,
        snapshot.interfaces.len() + snapshot.lags.len()
    );

    let dry_run = |push: &PushArgs| push.dry_run || config.session.dry_run;

    match cli.command {
        Command::Lag(LagCommand::Create {
            name,
            members,
            lacp,
            push,
        }) => {
            let ports: Vec<&str> = members.iter().map(String::as_str).collect();
            let mut manager = LagManager::new(&mut session);
            let payload = manager.create_lag(&name, &ports, lacp).await?;
            emit(&mut manager, &payload, push, dry_run(&push)).await
        }
        Command::Lag(LagCommand::Delete {
            name,
            members,
            push,
        }) => {
            let ports: Vec<&str> = members.iter().map(String::as_str).collect();
            let mut manager = LagManager::new(&mut session);
            let payload = manager.delete_lag(&name, &ports)?;
            emit(&mut manager, &payload, push, dry_run(&push)).await
        }
        Command::Evpn(EvpnCommand::Deploy {
            service,
            rd,
            rt_import,
            rt_export,
            push,
        }) => {
            let svc = build_service(&service, &config.session.host)?;
            let vrf = match rd {
                Some(rd) => Vrf::new(vrf_name(&service), rd)?
                    .with_import(rt_import)
                    .with_export(rt_export),
                None => {
                    let mut vrf = svc.vrf();
                    vrf.name = vrf_name(&service).to_string();
                    vrf
                }
            };
            let mut manager = EvpnManager::new(&mut session);
            let payload = manager.deploy_service(&svc, &vrf, service.asn).await?;
            emit(&mut manager, &payload, push, dry_run(&push)).await
        }
        Command::Evpn(EvpnCommand::Delete { service, push }) => {
            let svc = build_service(&service, &config.session.host)?;
            let mut manager = EvpnManager::new(&mut session);
            let payload = manager.delete_service(&svc, vrf_name(&service), service.asn)?;
            emit(&mut manager, &payload, push, dry_run(&push)).await
        }
        Command::Interface(InterfaceCommand::Set {
            name,
            description,
            clear_description,
            mtu,
            push,
        }) => {
            let mut manager = InterfaceManager::load(&mut session, &name).await?;
            if let Some(description) = description {
                manager.set_description(description);
            } else if clear_description {
                manager.clear_description();
            }
            if mtu.is_some() {
                manager.set_mtu(mtu);
            }
            let payload = manager.render()?;
            println!("{}", payload.to_text());
            if push.apply {
                let result = manager.apply(dry_run(&push)).await?;
                report(&result);
            }
            Ok(())
        }
    }
}

fn vrf_name(service: &ServiceArgs) -> &str {
    service.vrf.as_deref().unwrap_or(&service.name)
}

fn build_service(args: &ServiceArgs, host: &str) -> Result<EvpnService> {
    let mut service = EvpnService::new(Vlan::new(args.vlan)?, args.name.as_str(), args.vni)?
        .with_asn(args.asn);
    if let Some(interface) = &args.interface {
        service = service.with_connection(host, interface.as_str());
    }
    Ok(service)
}

/// Prints `payload` and pushes it through `manager` when requested.
async fn emit<R>(manager: &mut R, payload: &Payload, push: PushArgs, dry_run: bool) -> Result<()>
where
    R: Reconciler,
{
    println!("{}", payload.to_text());
    if push.apply {
        let result = manager.apply(payload, dry_run).await?;
        report(&result);
    }
    Ok(())
}

fn report(result: &CommitResult) {
    if result.is_noop() {
        info!("No changes on device");
        return;
    }
    print!("{}", result.diff);
    if result.committed {
        info!("Changes committed");
    } else {
        info!("Dry run, changes discarded");
    }
}
