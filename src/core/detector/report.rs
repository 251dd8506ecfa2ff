//! Structural presentation of a detected cycle and of the table state.
//!
//! The reporter deliberately re-reads the tables under the standard locking
//! discipline instead of reusing the detection snapshot: the report shows
//! live diagnostic state, not the historical instant of detection.

use crate::core::detector::Detector;
use std::fmt::Write;

impl Detector {
    /// Diagnostic report of the current suspected cycle
    ///
    /// Enumerates each thread in the last-built wait-for graph with the
    /// lock it is waiting for and that lock's current holder, then renders
    /// the graph structure.
    pub fn print_deadlock_info(&self) {
        print!("{}", self.format_deadlock_report());
    }

    /// Diagnostic dump of the three observation tables
    pub fn print_status(&self) {
        print!("{}", self.format_status());
    }

    pub(crate) fn format_deadlock_report(&self) -> String {
        let graph = self.graph.lock();
        let snapshot = self.tables.snapshot();

        let mut out = String::new();
        let _ = writeln!(out);
        let _ = writeln!(out, "================================================");
        let _ = writeln!(out, "  DEADLOCK DETECTED");
        let _ = writeln!(out, "================================================");
        let _ = writeln!(out);

        let mut threads = graph.nodes();
        threads.sort_unstable();

        let _ = writeln!(out, "Threads involved in deadlock:");
        for thread_id in threads {
            match snapshot.waiters.get(&thread_id) {
                Some(&lock_id) => {
                    let _ = write!(
                        out,
                        "  Thread {thread_id} is waiting for lock {lock_id:#x}"
                    );
                    match snapshot.holders.get(&lock_id) {
                        Some(owner) => {
                            let _ = writeln!(out, " (held by Thread {owner})");
                        }
                        None => {
                            let _ = writeln!(out, " (holder unknown)");
                        }
                    }
                }
                // The wait resolved between detection and this report
                None => {
                    let _ = writeln!(out, "  Thread {thread_id} is no longer waiting");
                }
            }
            if let Some(context) = snapshot.contexts.get(&thread_id) {
                let _ = writeln!(out, "    context: {context}");
            }
        }

        let _ = writeln!(out);
        let _ = write!(out, "{}", graph.render());
        let _ = writeln!(
            out,
            "Recommendation: check the lock acquisition order in your code."
        );
        out
    }

    pub(crate) fn format_status(&self) -> String {
        let snapshot = self.tables.snapshot();

        let mut out = String::new();
        let _ = writeln!(out);
        let _ = writeln!(out, "========== Deadlock Detector Status ==========");

        let mut held: Vec<_> = snapshot.holders.iter().collect();
        held.sort_unstable();
        let _ = writeln!(out, "Lock Owners ({} locks held):", held.len());
        for (lock_id, thread_id) in held {
            let _ = writeln!(out, "  Lock {lock_id:#x} -> Thread {thread_id}");
        }

        let mut waiting: Vec<_> = snapshot.waiters.iter().collect();
        waiting.sort_unstable();
        let _ = writeln!(out, "Threads Waiting ({} threads):", waiting.len());
        for (thread_id, lock_id) in waiting {
            let _ = writeln!(out, "  Thread {thread_id} -> waiting for lock {lock_id:#x}");
        }

        let _ = writeln!(out, "=============================================");
        out
    }
}
