//! Section Worker
//! One background thread that builds section reports strictly one at a time.

use crate::config::AppConfig;
use crate::report::{self, Section, SectionReport};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;

/// Section evaluation result from the worker thread
pub enum EvalResult {
    Complete(SectionReport),
    Error(String),
}

/// Handle to the worker; dropping it lets the thread finish its current job and exit.
pub struct SectionWorker {
    request_tx: Sender<Section>,
    result_rx: Receiver<(Section, EvalResult)>,
}

impl SectionWorker {
    pub fn spawn(config: AppConfig) -> Self {
        let (request_tx, request_rx) = channel::<Section>();
        let (result_tx, result_rx) = channel();

        thread::spawn(move || {
            while let Ok(mut section) = request_rx.recv() {
                // Skip requests superseded while the previous one ran
                while let Ok(newer) = request_rx.try_recv() {
                    section = newer;
                }

                let result = match report::build_section(section, &config) {
                    Ok(report) => EvalResult::Complete(report),
                    Err(e) => {
                        tracing::error!(section = section.label(), error = %e, "section failed");
                        EvalResult::Error(e.to_string())
                    }
                };
                if result_tx.send((section, result)).is_err() {
                    break;
                }
            }
            tracing::debug!("section worker stopped");
        });

        Self {
            request_tx,
            result_rx,
        }
    }

    /// Queue a section; returns false when the worker thread is gone.
    pub fn submit(&self, section: Section) -> bool {
        self.request_tx.send(section).is_ok()
    }

    /// Next finished evaluation, if any.
    pub fn try_recv(&self) -> Option<(Section, EvalResult)> {
        self.result_rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn wait_for(worker: &SectionWorker) -> (Section, EvalResult) {
        let deadline = Instant::now() + Duration::from_secs(30);
        loop {
            if let Some(result) = worker.try_recv() {
                return result;
            }
            assert!(Instant::now() < deadline, "worker did not answer");
            thread::sleep(Duration::from_millis(5));
        }
    }

    fn missing_files() -> AppConfig {
        AppConfig {
            raw_data_path: "does/not/exist.csv".into(),
            clean_data_path: "does/not/exist_clean.csv".into(),
            ..AppConfig::default()
        }
    }

    #[test]
    fn builds_requested_section() {
        let worker = SectionWorker::spawn(missing_files());
        assert!(worker.submit(Section::Objective));

        let (section, result) = wait_for(&worker);
        assert_eq!(section, Section::Objective);
        assert!(matches!(result, EvalResult::Complete(r) if r.section == Section::Objective));
    }

    #[test]
    fn failures_come_back_as_errors() {
        let worker = SectionWorker::spawn(missing_files());
        worker.submit(Section::Eda);

        let (section, result) = wait_for(&worker);
        assert_eq!(section, Section::Eda);
        assert!(matches!(result, EvalResult::Error(message) if message.contains("not found")));
    }

    #[test]
    fn burst_of_requests_ends_with_the_newest() {
        let worker = SectionWorker::spawn(missing_files());
        let burst = [
            Section::ProblemStatement,
            Section::Objective,
            Section::ImportLibraries,
            Section::BusinessInsights,
            Section::FinalResults,
        ];
        for section in burst {
            worker.submit(section);
        }

        let mut answered = Vec::new();
        loop {
            let (section, _) = wait_for(&worker);
            answered.push(section);
            if section == Section::FinalResults {
                break;
            }
        }
        assert!(answered.len() <= burst.len());
        // Results arrive in request order, never interleaved
        let positions: Vec<usize> = answered
            .iter()
            .map(|s| burst.iter().position(|b| b == s).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }
}
