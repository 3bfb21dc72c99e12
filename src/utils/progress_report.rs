//! Progress reporting for index builds.
//!
//! A build walks the entry list once per stage (enhancement, source-language
//! index, target-language index, fuzzy index). Each stage owns a [`ProgressState`]
//! that calls an optional reporter at regular intervals. The reporter gives the
//! host a chance to yield to its event loop, and may cancel the build by
//! returning `true`.
//!
//! # Examples
//!
//! ```
//! use ndowe_dict::utils::progress_report::{ProgressState, ProgressReportFn};
//!
//! fn my_reporter(state: &mut ProgressState) -> bool {
//!     println!("{}: {}/{}", state.state_id, state.current, state.total);
//!     false // Return true to cancel the build
//! }
//!
//! let mut progress = ProgressState::new("fuzzy_index", 100, 10, Some(my_reporter));
//! for i in 0..100 {
//!     if progress.report(i) {
//!         break;
//!     }
//! }
//! ```

/// Function type for progress reporting callbacks.
///
/// The function receives a mutable reference to the progress state and
/// returns `true` to cancel the operation, or `false` to continue.
pub type ProgressReportFn = fn(&mut ProgressState) -> bool;

/// State information for progress reporting.
pub struct ProgressState {
    /// Identifier for the stage being reported (e.g. "source_index")
    pub state_id: String,
    /// Total number of items to process
    pub total: u64,
    /// Current item being processed
    pub current: u64,
    /// Last item at which progress was reported
    pub last: u64,
    /// Number of items between progress reports
    pub report_interval: u64,
    /// Optional reporter function to call
    pub reporter: Option<ProgressReportFn>,
}

impl ProgressState {
    /// Creates a new progress state.
    ///
    /// # Arguments
    ///
    /// * `state_id` - Identifier for this progress state
    /// * `total` - Total number of items to process
    /// * `report_interval_percent` - Percentage of items between reports (0-100)
    /// * `reporter` - Optional reporter function
    pub fn new(state_id: &str, total: u64, report_interval_percent: u64, reporter: Option<ProgressReportFn>) -> Self {
        Self {
            state_id: state_id.to_string(),
            total,
            current: 0,
            last: 0,
            report_interval: total * report_interval_percent / 100,
            reporter,
        }
    }

    /// Reports progress for the current item.
    ///
    /// The reporter runs when more than `report_interval` items passed since the
    /// last report, and always for the final item.
    ///
    /// # Returns
    ///
    /// Returns `true` if the operation should be cancelled, `false` otherwise.
    pub fn report(&mut self, current: u64) -> bool {
        let Some(reporter) = self.reporter else {
            return false;
        };
        let is_last = current + 1 >= self.total;
        if current.saturating_sub(self.last) > self.report_interval || is_last {
            self.current = current;
            let cancelled = reporter(self);
            self.last = current;
            cancelled
        } else {
            false
        }
    }

    /// Reports a stage that has no items (e.g. an empty dictionary).
    ///
    /// The reporter is still called once so hosts see every stage.
    pub fn report_empty(&mut self) -> bool {
        match self.reporter {
            Some(reporter) => reporter(self),
            None => false,
        }
    }
}
