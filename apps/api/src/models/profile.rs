use serde::Serialize;

/// A single non-identifier profile column and its value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileAttribute {
    pub name: String,
    pub value: String,
}

/// Static record describing one employee, including the current manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeProfile {
    pub emp_id: String,
    pub manager_id: String,
    /// Remaining profile columns, in sheet column order.
    pub attributes: Vec<ProfileAttribute>,
}

#[cfg(test)]
impl EmployeeProfile {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }
}
