use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{recommended_watcher, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{broadcast, mpsc};
use tokio::time::Instant;

use blogpress_core::SiteConfig;
use blogpress_engine::{pipeline, RunReport, SystemClock};

use crate::error::{io_err, WatchError};

/// Window inside which repeated events for one file collapse into one.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(500);

/// Start the watch runtime and block the current thread until it exits.
pub fn start_blocking(root: &Path, config: SiteConfig) -> Result<(), WatchError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(root.to_path_buf(), config))
}

/// Watch the posts directory and reconcile changed files until ctrl-c.
pub async fn run(root: PathBuf, config: SiteConfig) -> Result<(), WatchError> {
    let posts_dir = config.posts_dir(&root);
    if !posts_dir.exists() {
        fs::create_dir_all(&posts_dir).map_err(|e| io_err(&posts_dir, e))?;
    }
    tracing::info!(root = %root.display(), posts = %posts_dir.display(), "watching for changes");

    let (job_tx, job_rx) = mpsc::channel::<PathBuf>(256);
    let (shutdown_tx, _) = broadcast::channel::<()>(16);

    let watcher_handle = {
        let shutdown = shutdown_tx.clone();
        let extension = config.extension.clone();
        tokio::spawn(async move {
            let result = watcher_task(posts_dir, extension, job_tx, shutdown.subscribe()).await;
            let _ = shutdown.send(());
            result
        })
    };

    let processor_handle = {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            let result = processor_task(root, config, job_rx, shutdown.subscribe()).await;
            let _ = shutdown.send(());
            result
        })
    };

    let signal_handle = {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            let mut shutdown_rx = shutdown.subscribe();
            tokio::select! {
                _ = shutdown_rx.recv() => Ok(()),
                signal = tokio::signal::ctrl_c() => {
                    match signal {
                        Ok(()) => {
                            tracing::info!("received ctrl-c, shutting down watcher");
                            let _ = shutdown.send(());
                            Ok(())
                        }
                        Err(err) => Err(WatchError::Task {
                            task: "signal_handler",
                            reason: format!("ctrl-c handler failed: {err}"),
                        }),
                    }
                }
            }
        })
    };

    let (watcher_result, processor_result, signal_result) =
        tokio::join!(watcher_handle, processor_handle, signal_handle);

    handle_join("watcher", watcher_result)?;
    handle_join("processor", processor_result)?;
    handle_join("signal_handler", signal_result)?;
    Ok(())
}

async fn watcher_task(
    posts_dir: PathBuf,
    extension: String,
    job_tx: mpsc::Sender<PathBuf>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), WatchError> {
    // Canonicalize so that event paths (which arrive as real paths, e.g.
    // /private/var/... on macOS) match the `starts_with` checks below.
    let posts_dir = fs::canonicalize(&posts_dir).unwrap_or(posts_dir);

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<notify::Result<Event>>();
    let mut watcher: RecommendedWatcher = recommended_watcher(move |event| {
        let _ = event_tx.send(event);
    })?;
    watcher.watch(&posts_dir, RecursiveMode::Recursive)?;

    let mut debounce = HashMap::<PathBuf, Instant>::new();

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            event = event_rx.recv() => {
                let Some(event) = event else { break };
                let event = match event {
                    Ok(event) => event,
                    Err(err) => {
                        tracing::warn!(error = %err, "watcher event error");
                        continue;
                    }
                };
                if !is_relevant_event_kind(&event.kind) {
                    continue;
                }

                for path in event.paths {
                    if !is_content_file(&path, &posts_dir, &extension) {
                        continue;
                    }
                    if !should_process_event(&mut debounce, &path, Instant::now()) {
                        continue;
                    }
                    tracing::debug!(path = %path.display(), "queued candidate");
                    if job_tx.send(path).await.is_err() {
                        return Err(WatchError::Task {
                            task: "watcher",
                            reason: "processor channel closed".to_string(),
                        });
                    }
                }
            }
        }
    }

    Ok(())
}

/// Runs one reconciliation at a time; everything queued while a run is in
/// flight is folded into the next batch.
async fn processor_task(
    root: PathBuf,
    config: SiteConfig,
    mut job_rx: mpsc::Receiver<PathBuf>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), WatchError> {
    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            maybe_path = job_rx.recv() => {
                let Some(first) = maybe_path else { break };
                let batch = drain_batch(first, &mut job_rx);
                let started = Instant::now();

                let root_for_run = root.clone();
                let config_for_run = config.clone();
                let paths = batch.clone();
                let outcome = tokio::task::spawn_blocking(move || {
                    run_batch(&root_for_run, &config_for_run, &paths)
                })
                .await
                .map_err(|err| WatchError::Task {
                    task: "processor",
                    reason: format!("reconcile task join error: {err}"),
                })?;

                match outcome {
                    Ok(report) => {
                        let touched: Vec<String> = report
                            .touched()
                            .map(|c| format!("{}:{}", c.label(), c.slug()))
                            .collect();
                        tracing::info!(
                            candidates = batch.len(),
                            written = report.written,
                            records = report.records,
                            changes = %touched.join(" "),
                            duration_ms = started.elapsed().as_millis() as u64,
                            "watcher-triggered reconcile completed",
                        );
                    }
                    // The index is untouched on failure; keep watching so the
                    // next save of the offending file can fix it.
                    Err(err) => tracing::error!(error = %err, "watcher-triggered reconcile failed"),
                }
            }
        }
    }

    Ok(())
}

fn run_batch(root: &Path, config: &SiteConfig, paths: &[String]) -> Result<RunReport, WatchError> {
    Ok(pipeline::run(root, config, paths, false, &SystemClock)?)
}

/// `first` plus everything already waiting on `rx`, deduplicated.
fn drain_batch(first: PathBuf, rx: &mut mpsc::Receiver<PathBuf>) -> Vec<String> {
    let mut batch = BTreeSet::new();
    batch.insert(first);
    while let Ok(next) = rx.try_recv() {
        batch.insert(next);
    }
    batch
        .into_iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect()
}

fn is_relevant_event_kind(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Create(_) | EventKind::Modify(_))
}

fn is_content_file(path: &Path, posts_dir: &Path, extension: &str) -> bool {
    path.starts_with(posts_dir)
        && path
            .file_name()
            .map(|n| {
                let name = n.to_string_lossy();
                name.ends_with(extension) && !name.starts_with('.')
            })
            .unwrap_or(false)
}

fn should_process_event(
    debounce: &mut HashMap<PathBuf, Instant>,
    path: &Path,
    now: Instant,
) -> bool {
    should_process_event_with_threshold(debounce, path, now, DEBOUNCE_WINDOW)
}

fn should_process_event_with_threshold(
    debounce: &mut HashMap<PathBuf, Instant>,
    path: &Path,
    now: Instant,
    threshold: Duration,
) -> bool {
    debounce.retain(|_, seen_at| now.duration_since(*seen_at) <= Duration::from_secs(30));
    match debounce.get(path) {
        Some(last_seen) if now.duration_since(*last_seen) < threshold => false,
        _ => {
            debounce.insert(path.to_path_buf(), now);
            true
        }
    }
}

fn handle_join(
    task: &'static str,
    result: Result<Result<(), WatchError>, tokio::task::JoinError>,
) -> Result<(), WatchError> {
    match result {
        Ok(inner) => inner,
        Err(err) => Err(WatchError::Task {
            task,
            reason: format!("join failure: {err}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use blogpress_core::index_store;
    use tempfile::TempDir;
    use tokio::time::advance;

    fn write_post(root: &Path, slug: &str, publish: bool) -> PathBuf {
        let dir = SiteConfig::default().posts_dir(root);
        fs::create_dir_all(&dir).expect("mkdir");
        let path = dir.join(format!("{slug}.md"));
        fs::write(&path, format!("---\ntitle: {slug}\npublish: {publish}\n---\n")).expect("write");
        path
    }

    #[tokio::test(start_paused = true, flavor = "current_thread")]
    async fn debounce_coalesces_rapid_events() {
        let threshold = Duration::from_millis(100);
        let mut debounce = HashMap::<PathBuf, Instant>::new();
        let path = PathBuf::from("/blog/content/posts/hello.md");
        let mut triggers = 0usize;

        for _ in 0..5 {
            if should_process_event_with_threshold(&mut debounce, &path, Instant::now(), threshold)
            {
                triggers += 1;
            }
            advance(Duration::from_millis(10)).await;
        }
        assert_eq!(triggers, 1, "rapid saves should collapse to one trigger");

        advance(Duration::from_millis(150)).await;
        assert!(should_process_event_with_threshold(
            &mut debounce,
            &path,
            Instant::now(),
            threshold
        ));
    }

    #[test]
    fn content_file_filter() {
        let posts = Path::new("/blog/content/posts");
        assert!(is_content_file(&posts.join("a.md"), posts, ".md"));
        assert!(is_content_file(&posts.join("2024/a.md"), posts, ".md"));
        assert!(!is_content_file(&posts.join("a.txt"), posts, ".md"));
        assert!(!is_content_file(&posts.join(".a.md"), posts, ".md"));
        assert!(!is_content_file(Path::new("/blog/drafts/a.md"), posts, ".md"));
    }

    #[test]
    fn relevant_event_kinds() {
        use notify::event::{CreateKind, RemoveKind};
        assert!(is_relevant_event_kind(&EventKind::Create(CreateKind::File)));
        assert!(!is_relevant_event_kind(&EventKind::Remove(RemoveKind::File)));
    }

    #[tokio::test]
    async fn drain_batch_dedupes_queued_paths() {
        let (tx, mut rx) = mpsc::channel::<PathBuf>(8);
        tx.send(PathBuf::from("b.md")).await.expect("send");
        tx.send(PathBuf::from("a.md")).await.expect("send");
        tx.send(PathBuf::from("b.md")).await.expect("send");

        let batch = drain_batch(PathBuf::from("a.md"), &mut rx);
        assert_eq!(batch, vec!["a.md".to_string(), "b.md".to_string()]);
    }

    #[tokio::test]
    async fn processor_reconciles_queued_files_then_exits() {
        let root = TempDir::new().expect("root");
        let config = SiteConfig::default();
        let hello = write_post(root.path(), "hello", true);
        let draft = write_post(root.path(), "draft", false);

        let (job_tx, job_rx) = mpsc::channel::<PathBuf>(8);
        let (shutdown_tx, _) = broadcast::channel::<()>(1);
        job_tx.send(hello).await.expect("send");
        job_tx.send(draft).await.expect("send");
        drop(job_tx);

        processor_task(
            root.path().to_path_buf(),
            config.clone(),
            job_rx,
            shutdown_tx.subscribe(),
        )
        .await
        .expect("processor");

        let loaded = index_store::load_at(&config.index_path(root.path())).expect("load");
        let slugs: Vec<_> = loaded.records.iter().map(|r| r.slug.as_str()).collect();
        assert_eq!(slugs, ["hello"]);
    }

    #[tokio::test]
    async fn processor_survives_failed_run() {
        let root = TempDir::new().expect("root");
        let config = SiteConfig::default();
        let dir = config.posts_dir(root.path());
        fs::create_dir_all(&dir).expect("mkdir");
        let broken = dir.join("broken.md");
        fs::write(&broken, "---\ntitle: [unclosed\n---\n").expect("write");
        let good = write_post(root.path(), "good", true);

        let (job_tx, job_rx) = mpsc::channel::<PathBuf>(8);
        let (shutdown_tx, _) = broadcast::channel::<()>(1);
        let handle = tokio::spawn(processor_task(
            root.path().to_path_buf(),
            config.clone(),
            job_rx,
            shutdown_tx.subscribe(),
        ));

        job_tx.send(broken).await.expect("send broken");
        // Let the failing batch run on its own before queueing the next one.
        tokio::time::sleep(Duration::from_millis(500)).await;
        job_tx.send(good).await.expect("send good");
        drop(job_tx);
        handle.await.expect("join").expect("processor keeps going");

        let loaded = index_store::load_at(&config.index_path(root.path())).expect("load");
        assert_eq!(loaded.records.len(), 1);
        assert_eq!(loaded.records[0].slug.as_str(), "good");
    }
}
