//! Tests for `StageInterceptor`.

use std::any::Any;
use std::sync::Arc;

use crate::extract::{INPUTS_KEY, OUTPUTS_KEY, ParamBundle, ParamValue};
use crate::interceptor::{
  ConstructionHook, InterceptorOptions, Registration, SkipReason, StageInterceptor,
};
use crate::session::{BuildSession, NoSession};
use crate::test_support::with_warn_counter;
use crate::types::{ChannelRef, StageDescriptor};

fn bundle(inputs: Vec<ChannelRef>, outputs: Vec<ChannelRef>) -> ParamBundle {
  let mut params = ParamBundle::new();
  params.insert(INPUTS_KEY.to_string(), Arc::new(inputs) as ParamValue);
  params.insert(OUTPUTS_KEY.to_string(), Arc::new(outputs) as ParamValue);
  params
}

fn as_params<T: Any + Send + Sync>(value: &T) -> Option<&(dyn Any + Send + Sync)> {
  Some(value as &(dyn Any + Send + Sync))
}

#[test]
fn bundle_with_channels_registers_node() {
  let session = BuildSession::new("build");
  let interceptor = StageInterceptor::new();
  let a = ChannelRef::new("chanA");
  let b = ChannelRef::new("chanB");
  let c = ChannelRef::new("chanC");
  let params = bundle(vec![a.clone(), b.clone()], vec![c.clone()]);

  let r = interceptor.stage_constructed(&session, &"MapStage", as_params(&params));

  let handle = r.node().expect("registered");
  let stage = session.dag().stage(handle).unwrap();
  assert_eq!(stage.label(), "MapStage");
  let ins: Vec<_> = stage.input_ports().iter().map(|p| p.channel().clone()).collect();
  let outs: Vec<_> = stage.output_ports().iter().map(|p| p.channel().clone()).collect();
  assert_eq!(ins, vec![a, b]);
  assert_eq!(outs, vec![c]);
  assert!(!interceptor.is_degraded());
}

#[test]
fn empty_bundle_adds_no_node() {
  let session = BuildSession::new("build");
  let interceptor = StageInterceptor::new();
  let params = ParamBundle::new();
  let r = interceptor.stage_constructed(&session, &"Stage", as_params(&params));
  assert_eq!(r, Registration::Skipped(SkipReason::NoChannels));
  assert_eq!(session.dag().nodes().count(), 0);
}

#[test]
fn absent_params_are_skipped() {
  let session = BuildSession::new("build");
  let interceptor = StageInterceptor::new();
  let r = interceptor.stage_constructed(&session, &"Stage", None);
  assert_eq!(r, Registration::Skipped(SkipReason::NoParams));
  assert!(session.dag().is_empty());
}

#[test]
fn non_bundle_params_are_skipped() {
  let session = BuildSession::new("build");
  let interceptor = StageInterceptor::new();
  let params = vec!["inputs".to_string()];
  let r = interceptor.stage_constructed(&session, &"Stage", as_params(&params));
  assert_eq!(r, Registration::Skipped(SkipReason::UnrecognizedParams));
  assert!(session.dag().is_empty());
}

#[test]
fn malformed_lists_read_as_empty() {
  let session = BuildSession::new("build");
  let interceptor = StageInterceptor::new();
  let c = ChannelRef::new("c");
  let mut params = ParamBundle::new();
  params.insert(INPUTS_KEY.to_string(), Arc::new(17_i64) as ParamValue);
  params.insert(OUTPUTS_KEY.to_string(), Arc::new(vec![c.clone()]) as ParamValue);

  let r = interceptor.stage_constructed(&session, &"Sink", as_params(&params));

  let stage = session.dag().stage(r.node().unwrap()).unwrap();
  assert!(stage.input_ports().is_empty());
  assert_eq!(stage.output_ports()[0].channel(), &c);
}

#[test]
fn typed_descriptor_is_recognized() {
  let session = BuildSession::new("build");
  let interceptor = StageInterceptor::new();
  let a = ChannelRef::new("a");
  let d = StageDescriptor::new().with_inputs([a.clone()]);
  let r = interceptor.stage_constructed(&session, &"ForEach", as_params(&d));
  let stage = session.dag().stage(r.node().unwrap()).unwrap();
  assert_eq!(stage.input_ports()[0].channel(), &a);
  assert!(stage.output_ports().is_empty());
}

#[test]
fn portless_stage_registered_only_when_enabled() {
  let session = BuildSession::new("build");
  let params = bundle(vec![], vec![]);

  let default = StageInterceptor::new();
  let r = default.stage_constructed(&session, &"Empty", as_params(&params));
  assert_eq!(r, Registration::Skipped(SkipReason::NoChannels));

  let permissive = StageInterceptor::with_options(InterceptorOptions {
    register_portless: true,
    ..Default::default()
  });
  let r = permissive.stage_constructed(&session, &"Empty", as_params(&params));
  assert!(r.node().is_some());
  assert_eq!(session.dag().len(), 1);
}

#[test]
fn missing_session_uses_one_fallback_dag() {
  let interceptor = StageInterceptor::new();
  assert!(interceptor.fallback_dag().is_none());

  let first = bundle(vec![ChannelRef::new("a")], vec![]);
  interceptor.stage_constructed(&NoSession, &"First", as_params(&first));
  let dag1 = interceptor.fallback_dag().expect("fallback created");

  let second = bundle(vec![], vec![ChannelRef::new("b")]);
  interceptor.stage_constructed(&NoSession, &"Second", as_params(&second));
  let dag2 = interceptor.fallback_dag().unwrap();

  assert!(Arc::ptr_eq(&dag1, &dag2));
  assert_eq!(dag2.len(), 2);
  assert!(interceptor.is_degraded());
}

#[test]
fn skipped_events_do_not_create_fallback() {
  let interceptor = StageInterceptor::new();
  interceptor.stage_constructed(&NoSession, &"Stage", None);
  let empty = bundle(vec![], vec![]);
  let r = interceptor.stage_constructed(&NoSession, &"Stage", as_params(&empty));
  assert_eq!(r, Registration::Skipped(SkipReason::NoChannels));
  assert!(!interceptor.is_degraded());
}

#[test]
fn session_dag_takes_precedence_per_event() {
  let interceptor = StageInterceptor::new();
  let params = bundle(vec![ChannelRef::new("a")], vec![]);
  interceptor.stage_constructed(&NoSession, &"Orphan", as_params(&params));

  let session = BuildSession::new("later");
  interceptor.stage_constructed(&session, &"Owned", as_params(&params));

  assert_eq!(session.dag().len(), 1);
  assert_eq!(interceptor.fallback_dag().unwrap().len(), 1);
}

#[test]
fn hook_is_usable_as_trait_object() {
  let hook: Arc<dyn ConstructionHook> = Arc::new(StageInterceptor::new());
  let session = BuildSession::new("build");
  let params = bundle(vec![ChannelRef::new("a")], vec![ChannelRef::new("b")]);
  let r = hook.stage_constructed(&session, &"Zip", as_params(&params));
  assert!(matches!(r, Registration::Registered(_)));
}

#[test]
fn skip_reason_display() {
  assert_eq!(SkipReason::NoParams.to_string(), "no parameters");
  assert_eq!(SkipReason::UnrecognizedParams.to_string(), "unrecognized parameters");
  assert_eq!(SkipReason::NoChannels.to_string(), "no channels");
}

#[test]
fn no_session_warning_is_emitted_once_per_interceptor() {
  with_warn_counter(|warnings| {
    let interceptor = StageInterceptor::new();
    for i in 0..5 {
      let params = bundle(vec![ChannelRef::new(format!("c{}", i))], vec![]);
      interceptor.stage_constructed(&NoSession, &"Stage", as_params(&params));
    }
    assert_eq!(warnings(), 1);

    let other = StageInterceptor::new();
    let params = bundle(vec![ChannelRef::new("x")], vec![]);
    other.stage_constructed(&NoSession, &"Stage", as_params(&params));
    assert_eq!(warnings(), 2);
  });
}

#[test]
fn lone_channel_value_registers_nothing() {
  let session = BuildSession::new("build");
  let interceptor = StageInterceptor::new();
  let mut params = ParamBundle::new();
  params.insert(INPUTS_KEY.to_string(), Arc::new(ChannelRef::new("lone")) as ParamValue);
  let r = interceptor.stage_constructed(&session, &"Stage", as_params(&params));
  assert_eq!(r, Registration::Skipped(SkipReason::NoChannels));
  assert!(session.dag().is_empty());
}
