use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use serde_json::Value;

use tmplview_core::config::ManagerConfig;
use tmplview_core::loader::{CountingLoader, FsLoader};
use tmplview_core::Manager;

use crate::helpers;
use crate::output;

/// Outcome of one benchmark run.
#[derive(Debug, Clone)]
pub struct BenchReport {
    pub renders: u32,
    pub loads: usize,
    pub elapsed: Duration,
}

/// Render the same view `iterations` times without, then with, the template cache.
///
/// Each run builds its own manager and shares it across `concurrency` blocking workers.
pub async fn run(
    config: &ManagerConfig,
    path: &str,
    layout: Option<&str>,
    data_path: Option<&Path>,
    iterations: u32,
    concurrency: usize,
) -> Result<()> {
    output::print_header("tmplview bench");
    output::print_key_value("View", path);
    output::print_key_value("Layout", layout.unwrap_or("-"));
    output::print_key_value("Iterations", &iterations.to_string());
    output::print_key_value("Workers", &concurrency.max(1).to_string());

    let data = Arc::new(super::load_data(data_path)?);

    for (step, caching) in [false, true].into_iter().enumerate() {
        let label = if caching { "With cache" } else { "Without cache" };
        output::print_step(step as u32 + 1, 2, label);

        let report = bench_once(
            config,
            caching,
            path,
            layout,
            Arc::clone(&data),
            iterations,
            concurrency,
        )
        .await?;
        output::print_key_value("Elapsed", &format!("{:.2?}", report.elapsed));
        output::print_key_value("Per render", &format!("{:.2?}", per_render(&report)));
        output::print_key_value("Loader calls", &report.loads.to_string());
    }

    Ok(())
}

pub async fn bench_once(
    config: &ManagerConfig,
    caching: bool,
    path: &str,
    layout: Option<&str>,
    data: Arc<Value>,
    iterations: u32,
    concurrency: usize,
) -> Result<BenchReport> {
    let loader = Arc::new(CountingLoader::new(FsLoader));
    let config = ManagerConfig {
        caching,
        ..config.clone()
    };
    let manager = Arc::new(Manager::from_config(&config, loader.clone(), helpers::funcs()));

    let workers = concurrency.max(1) as u32;
    let (share, remainder) = (iterations / workers, iterations % workers);

    let start = Instant::now();
    let mut handles = Vec::with_capacity(workers as usize);
    for w in 0..workers {
        let count = share + u32::from(w < remainder);
        let manager = Arc::clone(&manager);
        let data = Arc::clone(&data);
        let path = path.to_string();
        let layout = layout.map(str::to_string);

        handles.push(tokio::task::spawn_blocking(move || -> tmplview_core::Result<()> {
            for _ in 0..count {
                match &layout {
                    Some(layout) => manager.render_in_layout(io::sink(), &path, layout, &*data)?,
                    None => manager.render(io::sink(), &path, &*data)?,
                }
            }
            Ok(())
        }));
    }

    for handle in handles {
        handle.await??;
    }

    let report = BenchReport {
        renders: iterations,
        loads: loader.calls(),
        elapsed: start.elapsed(),
    };
    tracing::debug!(?report, "bench run finished");
    Ok(report)
}

fn per_render(report: &BenchReport) -> Duration {
    if report.renders == 0 {
        return Duration::ZERO;
    }
    report.elapsed / report.renders
}
