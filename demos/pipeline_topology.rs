//! Build a fan-out pipeline from several threads and print its topology.
//!
//! Usage: `cargo run --example pipeline_topology`
//!
//! Set STREAMWEAVE_DAG_STAGES to change the number of worker stages (default 4).
//! Set RUST_LOG=streamweave_dag=trace to see every construction event.

use std::any::Any;
use std::env;
use std::sync::Arc;
use std::thread;

use streamweave_dag::{
  BuildSession, ChannelRef, ConstructionHook, NoSession, StageDescriptor, StageInterceptor,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_STAGES: usize = 4;

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let workers = env::var("STREAMWEAVE_DAG_STAGES")
    .ok()
    .and_then(|v| v.parse::<usize>().ok())
    .unwrap_or(DEFAULT_STAGES);
  info!(workers, "building pipeline");

  let session = Arc::new(BuildSession::new("demo"));
  let hook: Arc<dyn ConstructionHook> = Arc::new(StageInterceptor::new());

  let source_out = ChannelRef::new("numbers");
  let source = StageDescriptor::new().with_outputs([source_out.clone()]);
  hook.stage_constructed(
    session.as_ref(),
    &"source",
    Some(&source as &(dyn Any + Send + Sync)),
  );

  let results: Vec<ChannelRef> = (0..workers)
    .map(|i| ChannelRef::new(format!("squared{}", i)))
    .collect();
  let handles: Vec<_> = results
    .iter()
    .enumerate()
    .map(|(i, out)| {
      let session = Arc::clone(&session);
      let hook = Arc::clone(&hook);
      let params = StageDescriptor::new()
        .with_inputs([source_out.clone()])
        .with_outputs([out.clone()]);
      thread::spawn(move || {
        let label = format!("square{}", i);
        hook.stage_constructed(
          session.as_ref(),
          &label,
          Some(&params as &(dyn Any + Send + Sync)),
        );
      })
    })
    .collect();
  for h in handles {
    h.join().map_err(|_| "worker thread panicked")?;
  }

  let sink = StageDescriptor::new().with_inputs(results);
  hook.stage_constructed(
    session.as_ref(),
    &"collect",
    Some(&sink as &(dyn Any + Send + Sync)),
  );

  // Outside any session the hook still records, into its own fallback DAG.
  hook.stage_constructed(&NoSession, &"orphan", Some(&sink as &(dyn Any + Send + Sync)));

  let snapshot = session.dag().snapshot();
  println!("Session {} ({})", session.name(), session.id());
  println!("  Stages: {}", snapshot.node_count());
  for stage in &snapshot.stages {
    let ins: Vec<_> = stage.input_ports().iter().map(|p| p.channel().to_string()).collect();
    let outs: Vec<_> = stage.output_ports().iter().map(|p| p.channel().to_string()).collect();
    println!("    {} {}: in={:?} out={:?}", stage.handle(), stage.label(), ins, outs);
  }
  println!("  Edges: {}", snapshot.edge_count());
  println!("{}", serde_json::to_string_pretty(&snapshot)?);
  Ok(())
}
