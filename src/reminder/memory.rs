//! In-memory notification scheduler.
//!
//! Backs tests and hosts without a platform notification service. Keeps a
//! flat registry of pending requests; duplicate tags are allowed (the
//! same slot tag can cover several concrete instants), each with its own
//! handle.

use std::sync::Mutex;

use super::scheduler::{
    NotificationScheduler, ReminderHandle, ReminderRequest, ScheduledEntry,
};
use super::ReminderError;

#[derive(Default)]
struct Registry {
    next_handle: u64,
    entries: Vec<(ReminderHandle, ReminderRequest)>,
}

#[derive(Default)]
pub struct MemoryScheduler {
    registry: Mutex<Registry>,
}

impl MemoryScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all pending requests, in scheduling order.
    pub fn pending(&self) -> Vec<ReminderRequest> {
        match self.registry.lock() {
            Ok(reg) => reg.entries.iter().map(|(_, req)| req.clone()).collect(),
            Err(_) => Vec::new(),
        }
    }
}

impl NotificationScheduler for MemoryScheduler {
    fn schedule(&self, request: &ReminderRequest) -> Result<ReminderHandle, ReminderError> {
        let mut reg = self
            .registry
            .lock()
            .map_err(|_| ReminderError::Unavailable("scheduler registry poisoned".into()))?;
        reg.next_handle += 1;
        let handle = ReminderHandle(format!("mem-{}", reg.next_handle));
        reg.entries.push((handle.clone(), request.clone()));
        Ok(handle)
    }

    fn list_scheduled(&self) -> Result<Vec<ScheduledEntry>, ReminderError> {
        let reg = self
            .registry
            .lock()
            .map_err(|_| ReminderError::Unavailable("scheduler registry poisoned".into()))?;
        Ok(reg
            .entries
            .iter()
            .map(|(handle, req)| ScheduledEntry {
                tag: req.tag.clone(),
                handle: handle.clone(),
            })
            .collect())
    }

    fn cancel(&self, handle: &ReminderHandle) -> Result<(), ReminderError> {
        let mut reg = self
            .registry
            .lock()
            .map_err(|_| ReminderError::Unavailable("scheduler registry poisoned".into()))?;
        reg.entries.retain(|(h, _)| h != handle);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reminder::scheduler::{ReminderPayload, ReminderTrigger};
    use chrono::NaiveTime;

    fn request(tag: &str) -> ReminderRequest {
        ReminderRequest {
            tag: tag.into(),
            trigger: ReminderTrigger::Daily(NaiveTime::from_hms_opt(9, 0, 0).unwrap()),
            payload: ReminderPayload {
                title: "t".into(),
                body: "b".into(),
            },
        }
    }

    #[test]
    fn schedule_then_list_then_cancel() {
        let scheduler = MemoryScheduler::new();
        let h1 = scheduler.schedule(&request("a-0")).unwrap();
        let h2 = scheduler.schedule(&request("a-1")).unwrap();
        assert_ne!(h1, h2);
        assert_eq!(scheduler.list_scheduled().unwrap().len(), 2);

        scheduler.cancel(&h1).unwrap();
        let remaining = scheduler.list_scheduled().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].tag, "a-1");
    }

    #[test]
    fn duplicate_tags_get_distinct_handles() {
        let scheduler = MemoryScheduler::new();
        let h1 = scheduler.schedule(&request("same")).unwrap();
        let h2 = scheduler.schedule(&request("same")).unwrap();
        assert_ne!(h1, h2);
        assert_eq!(scheduler.list_scheduled().unwrap().len(), 2);
    }

    #[test]
    fn cancel_unknown_handle_is_noop() {
        let scheduler = MemoryScheduler::new();
        scheduler.schedule(&request("a-0")).unwrap();
        scheduler.cancel(&ReminderHandle("mem-999".into())).unwrap();
        assert_eq!(scheduler.list_scheduled().unwrap().len(), 1);
    }
}
