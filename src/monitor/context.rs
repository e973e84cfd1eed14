//! Collaborators injected into a monitor

use std::rc::Rc;
use std::sync::Arc;

use crate::delivery::{DeliveryQueue, ReadinessSource};
use crate::dom::SlotHost;
use crate::scheduler::Scheduler;

use super::detection::{AdsenseClassifier, FillClassifier};

/// Everything a monitor talks to outside its own state.
///
/// Cloning is cheap; every slot on a page shares the same context.
#[derive(Clone)]
pub struct MonitorContext {
    pub scheduler: Rc<dyn Scheduler>,
    pub readiness: Arc<dyn ReadinessSource>,
    pub queue: Rc<dyn DeliveryQueue>,
    pub host: Rc<dyn SlotHost>,
    pub classifier: Rc<dyn FillClassifier>,
}

impl MonitorContext {
    /// Context using the AdSense classification heuristics.
    pub fn new(
        scheduler: Rc<dyn Scheduler>,
        readiness: Arc<dyn ReadinessSource>,
        queue: Rc<dyn DeliveryQueue>,
        host: Rc<dyn SlotHost>,
    ) -> Self {
        Self {
            scheduler,
            readiness,
            queue,
            host,
            classifier: Rc::new(AdsenseClassifier),
        }
    }

    pub fn with_classifier(mut self, classifier: Rc<dyn FillClassifier>) -> Self {
        self.classifier = classifier;
        self
    }
}
