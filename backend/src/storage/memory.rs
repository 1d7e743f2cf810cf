//! In-memory storage backend.
//!
//! Mirrors the SQLite store's ordering and cascade rules so domain services
//! can be exercised without a database. Writes touching a student can be made
//! to fail on demand to test per-member batch failure reporting.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use shared::ChallanStatus;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use super::traits::{ChallanFilter, ChallanStorage, Connection, StudentStorage};
use super::StorageError;
use crate::domain::models::{
    Challan, ChallanId, FeeLine, NewChallan, NewStudent, Student, StudentId,
};

#[derive(Default)]
struct MemoryState {
    students: BTreeMap<StudentId, Student>,
    challans: BTreeMap<ChallanId, (Challan, Vec<FeeLine>)>,
    last_student_id: StudentId,
    last_challan_id: ChallanId,
    failing_students: HashSet<StudentId>,
}

impl MemoryState {
    fn check_writable(&self, student_id: StudentId) -> Result<()> {
        if self.failing_students.contains(&student_id) {
            return Err(anyhow!("simulated write failure for student {}", student_id));
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MemoryConnection {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write that touches this student fail.
    pub fn fail_writes_for(&self, student_id: StudentId) {
        self.state
            .lock()
            .expect("memory store lock poisoned")
            .failing_students
            .insert(student_id);
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))
    }
}

impl Connection for MemoryConnection {
    type StudentRepository = MemoryConnection;
    type ChallanRepository = MemoryConnection;

    fn create_student_repository(&self) -> Self::StudentRepository {
        self.clone()
    }

    fn create_challan_repository(&self) -> Self::ChallanRepository {
        self.clone()
    }
}

#[async_trait]
impl StudentStorage for MemoryConnection {
    async fn get_student(&self, id: StudentId) -> Result<Option<Student>> {
        Ok(self.lock()?.students.get(&id).cloned())
    }

    async fn list_students(&self, search_term: Option<&str>) -> Result<Vec<Student>> {
        let needle = search_term
            .map(|term| term.trim().to_lowercase())
            .filter(|term| !term.is_empty());
        let state = self.lock()?;
        Ok(state
            .students
            .values()
            .filter(|student| match &needle {
                Some(needle) => student.full_name.to_lowercase().contains(needle),
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn insert_student(&self, student: &NewStudent) -> Result<StudentId> {
        let mut state = self.lock()?;
        state.last_student_id += 1;
        let id = state.last_student_id;
        state.students.insert(id, student.clone().with_id(id));
        Ok(id)
    }

    async fn update_student(&self, id: StudentId, student: &NewStudent) -> Result<bool> {
        let mut state = self.lock()?;
        state.check_writable(id)?;
        match state.students.get_mut(&id) {
            Some(existing) => {
                *existing = student.clone().with_id(id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_student(&self, id: StudentId) -> Result<bool> {
        let mut state = self.lock()?;
        state.check_writable(id)?;
        if state.students.remove(&id).is_none() {
            return Ok(false);
        }
        state.challans.retain(|_, (challan, _)| challan.student_id != id);
        Ok(true)
    }
}

#[async_trait]
impl ChallanStorage for MemoryConnection {
    async fn insert_challan(&self, challan: &NewChallan) -> Result<ChallanId> {
        let mut state = self.lock()?;
        state.check_writable(challan.student_id())?;
        if !state.students.contains_key(&challan.student_id()) {
            return Err(StorageError::Conflict(format!(
                "student {} does not exist",
                challan.student_id()
            ))
            .into());
        }

        state.last_challan_id += 1;
        let id = state.last_challan_id;
        let stored = Challan {
            id,
            student_id: challan.student_id(),
            issue_date: challan.issue_date(),
            due_date: challan.due_date(),
            status: ChallanStatus::Unpaid,
            payment_date: None,
            total_amount: challan.total_amount(),
            arrears: challan.arrears(),
            fine: challan.fine(),
        };
        state.challans.insert(id, (stored, challan.items().to_vec()));
        Ok(id)
    }

    async fn get_challan(&self, id: ChallanId) -> Result<Option<Challan>> {
        Ok(self.lock()?.challans.get(&id).map(|(challan, _)| challan.clone()))
    }

    async fn get_challan_items(&self, id: ChallanId) -> Result<Vec<FeeLine>> {
        Ok(self
            .lock()?
            .challans
            .get(&id)
            .map(|(_, items)| items.clone())
            .unwrap_or_default())
    }

    async fn list_challans(&self, filter: &ChallanFilter) -> Result<Vec<Challan>> {
        let state = self.lock()?;
        let mut challans: Vec<Challan> = state
            .challans
            .values()
            .map(|(challan, _)| challan)
            .filter(|challan| filter.matches(challan))
            .cloned()
            .collect();
        challans.sort_by(|a, b| b.issue_date.cmp(&a.issue_date).then(b.id.cmp(&a.id)));
        Ok(challans)
    }

    async fn update_challan_status(
        &self,
        id: ChallanId,
        status: ChallanStatus,
        payment_date: Option<NaiveDate>,
    ) -> Result<bool> {
        let mut state = self.lock()?;
        let owner = match state.challans.get(&id) {
            Some((challan, _)) => challan.student_id,
            None => return Ok(false),
        };
        state.check_writable(owner)?;
        if let Some((challan, _)) = state.challans.get_mut(&id) {
            challan.status = status;
            challan.payment_date = payment_date;
        }
        Ok(true)
    }
}
