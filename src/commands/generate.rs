//! Generate static files

use anyhow::Result;
use notify::Watcher;
use std::sync::mpsc::channel;
use std::time::{Duration, Instant};

use crate::generator::{GenerateReport, Generator};
use crate::Site;

/// Generate the static site
pub fn run(site: &Site) -> Result<()> {
    run_with_report(site).map(|_| ())
}

/// Generate and return what was written
pub fn run_with_report(site: &Site) -> Result<GenerateReport> {
    let start = Instant::now();

    let generator = Generator::new(site)?;
    let report = generator.generate()?;

    tracing::info!(
        "Generated {} posts, {} pages and {} assets in {:.2}s",
        report.posts,
        report.pages,
        report.assets,
        start.elapsed().as_secs_f64()
    );

    Ok(report)
}

/// Watch for file changes and regenerate
pub async fn watch(site: &Site) -> Result<()> {
    let (tx, rx) = channel();

    let mut watcher = notify::recommended_watcher(move |res| {
        if let Ok(event) = res {
            let _ = tx.send(event);
        }
    })?;

    if site.content_dir.exists() {
        watcher.watch(&site.content_dir, notify::RecursiveMode::Recursive)?;
    }
    if site.static_dir.exists() {
        watcher.watch(&site.static_dir, notify::RecursiveMode::Recursive)?;
    }

    let config_path = site.base_dir.join(crate::CONFIG_FILE);
    if config_path.exists() {
        watcher.watch(&config_path, notify::RecursiveMode::NonRecursive)?;
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    let mut site = site.clone();
    let mut schedule = RebuildSchedule::new(Duration::from_millis(500));

    loop {
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(event) => {
                schedule.record(event.paths.iter().any(|p| p == &config_path));
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {}
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => {
                break;
            }
        }

        let Some(reload_config) = schedule.take_due(Instant::now()) else {
            continue;
        };

        if reload_config {
            match Site::new(&site.base_dir) {
                Ok(reloaded) => site = reloaded,
                Err(e) => {
                    tracing::error!("Failed to reload {}: {:#}", crate::CONFIG_FILE, e);
                    continue;
                }
            }
        }

        tracing::info!("File changed, regenerating...");
        if let Err(e) = run(&site) {
            tracing::error!("Generation failed: {:#}", e);
        }
    }

    Ok(())
}

/// Coalesces file events into at most one rebuild per `interval`.
///
/// Events inside the interval are kept pending, not dropped, so the last
/// save in a burst is always picked up.
#[derive(Debug)]
struct RebuildSchedule {
    interval: Duration,
    last_rebuild: Option<Instant>,
    pending: bool,
    reload_config: bool,
}

impl RebuildSchedule {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_rebuild: None,
            pending: false,
            reload_config: false,
        }
    }

    fn record(&mut self, config_changed: bool) {
        self.pending = true;
        self.reload_config |= config_changed;
    }

    /// `Some(reload_config)` when a rebuild should run at `now`
    fn take_due(&mut self, now: Instant) -> Option<bool> {
        if !self.pending {
            return None;
        }
        if let Some(last) = self.last_rebuild {
            if now.duration_since(last) <= self.interval {
                return None;
            }
        }
        self.pending = false;
        self.last_rebuild = Some(now);
        Some(std::mem::take(&mut self.reload_config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_schedule_keeps_events_inside_interval() {
        let interval = Duration::from_millis(500);
        let start = Instant::now();
        let mut schedule = RebuildSchedule::new(interval);

        assert_eq!(schedule.take_due(start), None);

        schedule.record(false);
        assert_eq!(schedule.take_due(start), Some(false));

        // A second save right after the rebuild waits for the interval
        schedule.record(true);
        assert_eq!(schedule.take_due(start + Duration::from_millis(100)), None);
        assert_eq!(
            schedule.take_due(start + Duration::from_millis(600)),
            Some(true)
        );
        assert_eq!(schedule.take_due(start + Duration::from_millis(1200)), None);
    }

    #[test]
    fn test_run_reports_counts() {
        let dir = TempDir::new().unwrap();
        let posts = dir.path().join("content/posts");
        fs::create_dir_all(&posts).unwrap();
        fs::write(posts.join("a.md"), "---\ntitle: A\n---\n").unwrap();

        let site = Site::new(dir.path()).unwrap();
        let report = run_with_report(&site).unwrap();
        assert_eq!(report.posts, 1);
        assert_eq!(report.pages, 0);
        assert!(site.public_dir.join("blog/a/index.html").exists());
    }

    #[test]
    fn test_run_fails_on_bad_front_matter() {
        let dir = TempDir::new().unwrap();
        let posts = dir.path().join("content/posts");
        fs::create_dir_all(&posts).unwrap();
        fs::write(posts.join("quebrado.md"), "---\ntitle: [sem fim\n---\n").unwrap();

        let site = Site::new(dir.path()).unwrap();
        assert!(run(&site).is_err());
    }
}
