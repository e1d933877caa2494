use crate::ui::progress_message::{ProgressMessage, ProgressPhase};
use crate::ui::theme;
use crate::ui::Icons;
use indicatif::{HumanDuration, MultiProgress, ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::thread;
use std::time::Duration;

pub struct ProgressManager {
    mp: MultiProgress,
    discovering: ProgressBar,
    exporting: ProgressBar,
    handle: Option<thread::JoinHandle<()>>,
}

fn visible(bar: ProgressBar) -> ProgressBar {
    if console::Term::stdout().is_term() {
        bar
    } else {
        ProgressBar::hidden()
    }
}

impl ProgressManager {
    /// Spawn the render thread; the exporter drives it through the sender
    pub fn new() -> (Self, crossbeam::channel::Sender<ProgressMessage>) {
        let (tx, rx) = crossbeam::channel::unbounded::<ProgressMessage>();

        let mp = MultiProgress::new();

        let discovering = visible(mp.add(ProgressBar::new_spinner().with_message("Discovering units")));
        let exporting = visible(mp.add(ProgressBar::new(0).with_message("Exporting units")));
        if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}") {
            exporting.set_style(style);
        }

        let discovering_clone = discovering.clone();
        let exporting_clone = exporting.clone();

        let handle = thread::spawn(move || {
            for msg in rx {
                match msg {
                    ProgressMessage::Started {
                        phase: ProgressPhase::Discovering,
                        total: _,
                    } => {
                        discovering_clone.enable_steady_tick(Duration::from_millis(100));
                    }
                    ProgressMessage::Finished {
                        phase: ProgressPhase::Discovering,
                    } => {
                        discovering_clone.finish_with_message("Units discovered");
                    }
                    ProgressMessage::Started {
                        phase: ProgressPhase::Exporting,
                        total,
                    } => {
                        exporting_clone.set_length(total as u64);
                    }
                    ProgressMessage::Progress {
                        phase: ProgressPhase::Exporting,
                        current,
                        unit,
                    } => {
                        exporting_clone.set_position(current as u64);
                        if let Some(ref u) = unit {
                            exporting_clone.set_message(format!("Exporting: {}", u));
                        }
                    }
                    ProgressMessage::UnitFailed(unit) => {
                        exporting_clone.println(format!("{} skipped unit {}", Icons::WARN, unit));
                    }
                    ProgressMessage::Finished {
                        phase: ProgressPhase::Exporting,
                    } => {
                        exporting_clone.finish_with_message("Done");
                    }
                    _ => {}
                }
            }
        });

        (
            Self {
                mp,
                discovering,
                exporting,
                handle: Some(handle),
            },
            tx,
        )
    }

    /// Wait for the render thread to drain; all senders must be dropped first
    pub fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.join().ok();
        }
    }

    pub fn clear(&self) {
        self.discovering.finish_and_clear();
        self.exporting.finish_and_clear();
        self.mp.clear().ok();
    }

    pub fn finish_with_summary(&self, duration: Duration, units: usize, symbols: usize, occurrences: usize) {
        self.clear();
        println!();
        println!(
            "{} {}",
            Icons::CHECK.style(theme().success.clone()),
            format!("Complete in {}", HumanDuration(duration)).style(theme().success.clone())
        );
        println!(
            "  {} {}  {} {}  {} {}",
            Icons::FILE.style(theme().info.clone()),
            units,
            Icons::PACKAGE.style(theme().info.clone()),
            symbols,
            Icons::LINK.style(theme().info.clone()),
            occurrences
        );
    }
}
