//! Span hierarchy of a simulation run
//!
//! 单独的测试二进制：这里会安装全局 subscriber

use omics_simulator::application::simulator::MultiOmicsSimulator;
use omics_simulator::domain::{OmicsLayer, SimulationConfig};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::span::{Attributes, Id};
use tracing::Subscriber;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

type Recorded = Arc<Mutex<Vec<(String, Option<String>)>>>;

/// 记录每个新建 span 的名字与父 span 名字
struct ParentRecorder(Recorded);

impl<S> Layer<S> for ParentRecorder
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let parent = ctx
            .span(id)
            .and_then(|span| span.parent())
            .map(|p| p.name().to_string());
        self.0
            .lock()
            .push((attrs.metadata().name().to_string(), parent));
    }
}

#[test]
fn test_layer_spans_share_run_parent() {
    let recorded: Recorded = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(ParentRecorder(recorded.clone()));
    tracing::subscriber::set_global_default(subscriber).expect("全局 subscriber 已存在");

    let mut config = SimulationConfig::default();
    config.control_samples = 10;
    config.treatment_samples = 10;
    config.features.insert(OmicsLayer::Transcriptomics, 100);
    config.features.insert(OmicsLayer::Proteomics, 100);
    config.features.insert(OmicsLayer::Metabolomics, 10);
    config.features.insert(OmicsLayer::Methylation, 100);
    MultiOmicsSimulator::new(config).unwrap().simulate().unwrap();

    let recorded = recorded.lock();
    let runs = recorded.iter().filter(|(name, _)| name == "simulate").count();
    let layers: Vec<_> = recorded
        .iter()
        .filter(|(name, _)| name == "simulate_layer")
        .collect();

    assert_eq!(runs, 1);
    assert_eq!(layers.len(), 4);
    assert!(layers
        .iter()
        .all(|(_, parent)| parent.as_deref() == Some("simulate")));
}
