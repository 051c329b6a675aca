//! Relationship Index: joins profiles and interviews on (employee, manager).
//!
//! Interview history is keyed on the manager recorded *on each interview row*,
//! not the employee's current manager: after a reassignment the new manager
//! sees only the interviews they conducted.

use std::collections::HashMap;

use thiserror::Error;

use crate::models::interview::InterviewRecord;
use crate::models::profile::EmployeeProfile;
use crate::roster::schema::{InterviewLog, ProfileTable};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("No employees are assigned to manager '{manager_id}'")]
    NoTeam { manager_id: String },

    #[error("Employee '{emp_id}' is not on manager '{manager_id}''s team")]
    EmployeeNotInTeam { emp_id: String, manager_id: String },
}

/// Positions into the owning snapshot's tables, grouped by join key.
#[derive(Debug, Clone, Default)]
pub struct RelationshipIndex {
    by_manager: HashMap<String, Vec<usize>>,
    by_employee: HashMap<String, usize>,
    interviews_by_pair: HashMap<(String, String), Vec<usize>>,
}

impl RelationshipIndex {
    pub fn build(profiles: &ProfileTable, interviews: &InterviewLog) -> Self {
        let mut index = Self::default();

        for (pos, profile) in profiles.profiles.iter().enumerate() {
            index
                .by_manager
                .entry(profile.manager_id.clone())
                .or_default()
                .push(pos);
            index.by_employee.insert(profile.emp_id.clone(), pos);
        }

        for (pos, record) in interviews.records.iter().enumerate() {
            index
                .interviews_by_pair
                .entry((record.emp_id.clone(), record.manager_id.clone()))
                .or_default()
                .push(pos);
        }

        index
    }

    /// Profiles whose current manager is exactly `manager_id`, in load order.
    /// An empty result is a valid answer.
    pub fn team<'a>(
        &self,
        profiles: &'a ProfileTable,
        manager_id: &str,
    ) -> Vec<&'a EmployeeProfile> {
        self.by_manager
            .get(manager_id)
            .map(|positions| positions.iter().map(|&p| &profiles.profiles[p]).collect())
            .unwrap_or_default()
    }

    /// The profile of `emp_id`, provided they currently report to `manager_id`.
    pub fn team_member<'a>(
        &self,
        profiles: &'a ProfileTable,
        manager_id: &str,
        emp_id: &str,
    ) -> Result<&'a EmployeeProfile, LookupError> {
        self.by_employee
            .get(emp_id)
            .map(|&p| &profiles.profiles[p])
            .filter(|profile| profile.manager_id == manager_id)
            .ok_or_else(|| LookupError::EmployeeNotInTeam {
                emp_id: emp_id.to_string(),
                manager_id: manager_id.to_string(),
            })
    }

    /// Interviews of `emp_id` conducted by `manager_id`, in load order.
    pub fn interviews<'a>(
        &self,
        interviews: &'a InterviewLog,
        emp_id: &str,
        manager_id: &str,
    ) -> Vec<&'a InterviewRecord> {
        self.interviews_by_pair
            .get(&(emp_id.to_string(), manager_id.to_string()))
            .map(|positions| positions.iter().map(|&p| &interviews.records[p]).collect())
            .unwrap_or_default()
    }
}
