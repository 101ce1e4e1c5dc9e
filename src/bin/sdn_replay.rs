//! 场景回放
//!
//! 把 JSON 场景中的拓扑发现与主机流量作为事件送入控制器，输出交换机收到的全部命令。

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use sdnroute_rs::ctl::{Controller, ControllerWorld, RecordingRegistry, SwitchCommand, TraceRecord};
use sdnroute_rs::dispatch::{EventLoop, EventTime, ScenarioError, ScenarioSpec};
use sdnroute_rs::net::StatsSnapshot;
use serde::Serialize;

#[derive(Debug, Parser)]
#[command(name = "sdn-replay", about = "Replay a scenario through the SDN routing core")]
struct Args {
    /// Path to scenario.json
    #[arg(long)]
    scenario: PathBuf,

    /// Write the command trace and stats as JSON
    #[arg(long)]
    out: Option<PathBuf>,

    /// Stop after this much event time (ms); defaults to running until idle
    #[arg(long)]
    until_ms: Option<u64>,

    /// Override the priority of path rules
    #[arg(long)]
    flow_priority: Option<u16>,

    /// Override the weight of discovered switch-switch links
    #[arg(long)]
    link_weight: Option<u32>,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    stats: StatsSnapshot,
    failed_events: u64,
    commands: &'a [TraceRecord],
}

fn run(args: &Args) -> Result<(), ScenarioError> {
    let spec = ScenarioSpec::from_path(&args.scenario)?;

    let mut config = spec.controller.unwrap_or_default();
    if let Some(p) = args.flow_priority {
        config.flow_priority = p;
    }
    if let Some(w) = args.link_weight {
        config.link_weight = w;
    }
    config.validate()?;

    let topo = spec.build_topology()?;
    let registry = Arc::new(RecordingRegistry::new());
    for sw in &topo.switches {
        registry.connect(sw.id);
    }

    let controller = Controller::new(config, registry.clone());
    let mut world = ControllerWorld::new(controller, registry);
    let mut ev_loop = EventLoop::default();
    spec.schedule(&mut ev_loop)?;

    match args.until_ms {
        Some(ms) => ev_loop.run_until(EventTime::from_millis(ms), &mut world),
        None => {
            ev_loop.run(&mut world);
        }
    }

    let stats = world.controller.stats();
    let flow_mods = world
        .trace
        .iter()
        .filter(|r| matches!(r.command, SwitchCommand::FlowMod { .. }))
        .count();
    println!(
        "done @ {:?}, commands={}, flow_mods={}, packet_outs={}, arp_replies={}, failed_events={}",
        ev_loop.now(),
        world.trace.len(),
        flow_mods,
        world.trace.len() - flow_mods,
        stats.arp_replies,
        world.failed
    );

    if let Some(path) = &args.out {
        let report = Report {
            stats,
            failed_events: world.failed,
            commands: &world.trace,
        };
        fs::write(path, serde_json::to_string_pretty(&report)?)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("sdn-replay: {err}");
            ExitCode::FAILURE
        }
    }
}
