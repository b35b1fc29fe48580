//! Wires the three stages (§4.10) together: parse → decompose → analyze.
//! Owns the stop flag, the worker handles, and a monitor thread that
//! polls queue occupancy every second and logs it every five.

use super::config::PipelineConfig;
use super::packet::{FunctionTask, Packet, ParsedAstInfo, SourceFileInfo};
use super::queue::BoundedQueue;
use super::stages::{
    spawn_analyze_workers, spawn_decompose_workers, spawn_parse_workers, FunctionAnalysisResult,
    StageCounters,
};
use crate::core::AstCache;
use crate::log_identifier::LogCallIdentifier;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

pub struct PipelineManager {
    running: Arc<AtomicBool>,
    parse_queue: BoundedQueue<Packet<SourceFileInfo>>,
    decompose_queue: BoundedQueue<Packet<ParsedAstInfo>>,
    analyze_queue: BoundedQueue<Packet<FunctionTask>>,
    results: Arc<Mutex<Vec<FunctionAnalysisResult>>>,
    parse_counters: Arc<StageCounters>,
    decompose_counters: Arc<StageCounters>,
    analyze_counters: Arc<StageCounters>,
    workers: Vec<JoinHandle<()>>,
    monitor: Option<JoinHandle<()>>,
    config: PipelineConfig,
}

impl PipelineManager {
    /// Starts every worker pool plus the monitor thread. Workers begin
    /// pulling from their input queue immediately.
    pub fn start(config: PipelineConfig, cache: Arc<AstCache>, identifier: Arc<LogCallIdentifier>) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let parse_queue = BoundedQueue::new(config.ast_parsing_queue_size);
        let decompose_queue = BoundedQueue::new(config.function_decomposition_queue_size);
        let analyze_queue = BoundedQueue::new(config.function_analysis_queue_size);
        let results = Arc::new(Mutex::new(Vec::new()));

        let parse_counters = Arc::new(StageCounters::default());
        let decompose_counters = Arc::new(StageCounters::default());
        let analyze_counters = Arc::new(StageCounters::default());

        let mut workers = spawn_parse_workers(
            config.ast_parsing_workers,
            running.clone(),
            parse_queue.clone(),
            decompose_queue.clone(),
            cache,
            identifier,
            parse_counters.clone(),
        );
        workers.extend(spawn_decompose_workers(
            config.function_decomposition_workers,
            running.clone(),
            decompose_queue.clone(),
            analyze_queue.clone(),
            decompose_counters.clone(),
        ));
        workers.extend(spawn_analyze_workers(
            config.function_analysis_workers,
            running.clone(),
            analyze_queue.clone(),
            results.clone(),
            analyze_counters.clone(),
        ));

        let monitor = Some(spawn_monitor(
            running.clone(),
            parse_queue.clone(),
            decompose_queue.clone(),
            analyze_queue.clone(),
            parse_counters.clone(),
            decompose_counters.clone(),
            analyze_counters.clone(),
        ));

        Self {
            running,
            parse_queue,
            decompose_queue,
            analyze_queue,
            results,
            parse_counters,
            decompose_counters,
            analyze_counters,
            workers,
            monitor,
            config,
        }
    }

    pub fn enqueue_source(&self, info: SourceFileInfo) -> bool {
        let path = info.absolute_path.clone();
        self.parse_queue.enqueue(Packet::new(info, "parse", path))
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Idempotent: calling `stop` more than once is a no-op past the
    /// first call and joins no thread twice.
    pub fn stop(&mut self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
        if let Some(monitor) = self.monitor.take() {
            let _ = monitor.join();
        }
    }

    /// Polls all stage queue sizes every 100ms; returns `true` once every
    /// queue is empty, `false` on timeout.
    pub fn wait_for_completion(&self, timeout_ms: u64) -> bool {
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);
        loop {
            if self.parse_queue.is_empty()
                && self.decompose_queue.is_empty()
                && self.analyze_queue.is_empty()
            {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(Duration::from_millis(100));
        }
    }

    pub fn results(&self) -> Vec<FunctionAnalysisResult> {
        self.results.lock().expect("results mutex poisoned").clone()
    }

    pub fn dropped_packets(&self) -> usize {
        self.parse_queue.dropped_count()
            + self.decompose_queue.dropped_count()
            + self.analyze_queue.dropped_count()
    }
}

#[allow(clippy::too_many_arguments)]
fn spawn_monitor(
    running: Arc<AtomicBool>,
    parse_queue: BoundedQueue<Packet<SourceFileInfo>>,
    decompose_queue: BoundedQueue<Packet<ParsedAstInfo>>,
    analyze_queue: BoundedQueue<Packet<FunctionTask>>,
    parse_counters: Arc<StageCounters>,
    decompose_counters: Arc<StageCounters>,
    analyze_counters: Arc<StageCounters>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let mut ticks = 0u64;
        while running.load(Ordering::Relaxed) {
            std::thread::sleep(Duration::from_secs(1));
            ticks += 1;
            if ticks % 5 == 0 {
                tracing::info!(
                    parse_queue = parse_queue.len(),
                    decompose_queue = decompose_queue.len(),
                    analyze_queue = analyze_queue.len(),
                    parse_processed = parse_counters.processed.load(Ordering::Relaxed),
                    decompose_processed = decompose_counters.processed.load(Ordering::Relaxed),
                    analyze_processed = analyze_counters.processed.load(Ordering::Relaxed),
                    parse_dropped = parse_queue.dropped_count(),
                    decompose_dropped = decompose_queue.dropped_count(),
                    analyze_dropped = analyze_queue.dropped_count(),
                    "pipeline progress"
                );
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AstCacheConfig;

    fn test_manager() -> PipelineManager {
        let mut config = PipelineConfig::default();
        config.ast_parsing_workers = 1;
        config.function_decomposition_workers = 1;
        config.function_analysis_workers = 1;
        let cache = Arc::new(AstCache::new(AstCacheConfig::default()));
        let identifier = Arc::new(LogCallIdentifier::new().build());
        PipelineManager::start(config, cache, identifier)
    }

    #[test]
    fn stop_is_idempotent() {
        let mut manager = test_manager();
        manager.stop();
        manager.stop();
        assert!(!manager.is_running());
    }

    #[test]
    fn wait_for_completion_true_when_nothing_enqueued() {
        let mut manager = test_manager();
        assert!(manager.wait_for_completion(1000));
        manager.stop();
    }
}
