//! In-memory repository for renewal tasks and their collaborator records.
//!
//! The general CRUD data model lives outside this crate; the repository
//! holds the working set a batch operation needs: tasks, matters and
//! clients. `BTreeMap` keys give the deterministic iteration order the
//! batch contract relies on.

use std::collections::BTreeMap;

use crate::models::{Client, Matter, RenewalTask};

/// The working set of tasks, matters and clients for batch operations.
///
/// Tasks are mutated exclusively through the workflow engine; matters only
/// gain case events; clients are read-only.
#[derive(Debug, Default, Clone)]
pub struct Repository {
    tasks: BTreeMap<String, RenewalTask>,
    matters: BTreeMap<String, Matter>,
    clients: BTreeMap<String, Client>,
}

impl Repository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a renewal task.
    pub fn insert_task(&mut self, task: RenewalTask) {
        self.tasks.insert(task.id.clone(), task);
    }

    /// Inserts or replaces a matter.
    pub fn insert_matter(&mut self, matter: Matter) {
        self.matters.insert(matter.id.clone(), matter);
    }

    /// Inserts or replaces a client.
    pub fn insert_client(&mut self, client: Client) {
        self.clients.insert(client.id.clone(), client);
    }

    /// Looks up a task by id.
    pub fn task(&self, id: &str) -> Option<&RenewalTask> {
        self.tasks.get(id)
    }

    /// Looks up a task mutably by id.
    pub fn task_mut(&mut self, id: &str) -> Option<&mut RenewalTask> {
        self.tasks.get_mut(id)
    }

    /// Looks up a matter by id.
    pub fn matter(&self, id: &str) -> Option<&Matter> {
        self.matters.get(id)
    }

    /// Looks up a matter mutably by id.
    pub fn matter_mut(&mut self, id: &str) -> Option<&mut Matter> {
        self.matters.get_mut(id)
    }

    /// Looks up a client by id.
    pub fn client(&self, id: &str) -> Option<&Client> {
        self.clients.get(id)
    }

    /// Returns the client owning a task, resolved through its matter.
    pub fn client_for_task(&self, task: &RenewalTask) -> Option<&Client> {
        self.matter(&task.matter_id)
            .and_then(|m| self.client(&m.client_id))
    }

    /// Returns all tasks, in id order.
    pub fn tasks(&self) -> impl Iterator<Item = &RenewalTask> {
        self.tasks.values()
    }
}
