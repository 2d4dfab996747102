//! Crawl frontier: pending URLs, visited URLs, and the order they are served in
//!
//! The frontier keeps two FIFO queues, one per [`Priority`] class. `next()`
//! drains the high-priority queue before touching the normal one, so any URL
//! matching a priority pattern is served before every non-matching URL while
//! discovery order is preserved within each class.
//!
//! A URL lives in at most one of {visited, queued}. The visited set only grows.

use crate::url::{Priority, UrlClassifier};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

/// Persisted form of a frontier
///
/// Priority classes are not stored; they are recomputed from the classifier
/// on restore. `queue` lists high-priority URLs first, each class in FIFO order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontierState {
    /// Every URL already dequeued, sorted for stable output
    pub visited: Vec<String>,

    /// Pending URLs in serving order
    pub queue: Vec<String>,
}

/// Result of offering a URL to the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// Added to the queue of the given class
    Queued(Priority),
    /// Already processed in this or a previous run
    AlreadyVisited,
    /// Already waiting in the queue
    AlreadyQueued,
    /// Queue is at capacity; the URL was dropped
    QueueFull,
}

impl EnqueueOutcome {
    /// Returns true if the URL was added
    pub fn is_queued(&self) -> bool {
        matches!(self, EnqueueOutcome::Queued(_))
    }
}

/// Priority-ordered, deduplicated work queue
pub struct Frontier {
    classifier: Arc<UrlClassifier>,
    high: VecDeque<String>,
    normal: VecDeque<String>,
    queued: HashSet<String>,
    visited: HashSet<String>,
    max_queue_size: usize,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new(classifier: Arc<UrlClassifier>, max_queue_size: usize) -> Self {
        Self {
            classifier,
            high: VecDeque::new(),
            normal: VecDeque::new(),
            queued: HashSet::new(),
            visited: HashSet::new(),
            max_queue_size,
        }
    }

    /// Rebuilds a frontier from a persisted state
    ///
    /// Queue entries that are already visited or repeated are dropped, so a
    /// hand-edited or partially written state still satisfies the frontier
    /// invariants. The queue cap is not applied to restored entries.
    pub fn restore(
        state: FrontierState,
        classifier: Arc<UrlClassifier>,
        max_queue_size: usize,
    ) -> Self {
        let mut frontier = Self::new(classifier, max_queue_size);
        frontier.visited = state.visited.into_iter().collect();

        for url in state.queue {
            if frontier.visited.contains(&url) || frontier.queued.contains(&url) {
                continue;
            }
            frontier.push(url);
        }

        frontier
    }

    /// Offers a canonical URL to the frontier
    ///
    /// The caller is responsible for canonicalization and for the domain and
    /// skip filters; the frontier only deduplicates, classifies and bounds.
    pub fn enqueue(&mut self, url: &str) -> EnqueueOutcome {
        if self.visited.contains(url) {
            return EnqueueOutcome::AlreadyVisited;
        }

        if self.queued.contains(url) {
            return EnqueueOutcome::AlreadyQueued;
        }

        if self.len() >= self.max_queue_size {
            return EnqueueOutcome::QueueFull;
        }

        EnqueueOutcome::Queued(self.push(url.to_string()))
    }

    fn push(&mut self, url: String) -> Priority {
        let priority = self.classifier.priority_of(&url);
        self.queued.insert(url.clone());
        match priority {
            Priority::High => self.high.push_back(url),
            Priority::Normal => self.normal.push_back(url),
        }
        priority
    }

    /// The URL `next()` would return, without dequeuing it
    pub fn peek(&self) -> Option<&str> {
        self.high.front().or_else(|| self.normal.front()).map(String::as_str)
    }

    /// Removes and returns the next URL to process, marking it visited
    pub fn next(&mut self) -> Option<String> {
        let url = self
            .high
            .pop_front()
            .or_else(|| self.normal.pop_front())?;

        self.queued.remove(&url);
        self.visited.insert(url.clone());
        Some(url)
    }

    /// Marks a URL visited without dequeuing it (e.g. a redirect target)
    ///
    /// If the URL is waiting in the queue it is removed from it.
    /// Returns false if the URL was already visited.
    pub fn mark_visited(&mut self, url: &str) -> bool {
        if self.visited.contains(url) {
            return false;
        }

        if self.queued.remove(url) {
            self.high.retain(|u| u != url);
            self.normal.retain(|u| u != url);
        }

        self.visited.insert(url.to_string());
        true
    }

    /// Returns true if the URL has already been dequeued or marked
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Returns true if no URL is waiting
    pub fn is_exhausted(&self) -> bool {
        self.high.is_empty() && self.normal.is_empty()
    }

    /// Number of pending URLs
    pub fn len(&self) -> usize {
        self.high.len() + self.normal.len()
    }

    /// Returns true if no URL is waiting
    pub fn is_empty(&self) -> bool {
        self.is_exhausted()
    }

    /// Number of pending high-priority URLs
    pub fn high_priority_len(&self) -> usize {
        self.high.len()
    }

    /// Number of visited URLs
    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }

    /// Captures the full frontier state for persistence
    pub fn snapshot(&self) -> FrontierState {
        let mut visited: Vec<String> = self.visited.iter().cloned().collect();
        visited.sort();

        let queue = self.high.iter().chain(self.normal.iter()).cloned().collect();

        FrontierState { visited, queue }
    }
}
